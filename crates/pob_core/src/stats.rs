//! Player stat sheet, read from the `<PlayerStat stat=".." value=".."/>`
//! children of `<Build>`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core_api::{Error, Result};
use crate::document::Element;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatField {
    pub key: &'static str,
    pub name: &'static str,
}

macro_rules! stat_fields {
    ($( $field:ident => $key:literal, )*) => {
        /// Stats the planner computed for the build; `None` when it did not
        /// export the stat (most depend on the main skill).
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct Stats {
            $( pub $field: Option<f64>, )*
        }

        #[rustfmt::skip]
        pub const STAT_FIELDS: &[StatField] = &[
            $( StatField { key: $key, name: stringify!($field) }, )*
        ];

        impl Stats {
            fn assign(&mut self, key: &str, value: f64) -> bool {
                match key {
                    $( $key => { self.$field = Some(value); true } )*
                    _ => false,
                }
            }

            /// `(name, value)` for every exported stat, in declaration order.
            pub fn present(&self) -> Vec<(&'static str, f64)> {
                let mut out = Vec::new();
                $(
                    if let Some(value) = self.$field {
                        out.push((stringify!($field), value));
                    }
                )*
                out
            }
        }
    };
}

stat_fields! {
    average_hit => "AverageHit",
    average_damage => "AverageDamage",
    speed => "Speed",
    trap_throwing_speed => "TrapThrowingSpeed",
    trap_cooldown => "TrapCooldown",
    mine_laying_speed => "MineLayingSpeed",
    totem_placement_speed => "TotemPlacementSpeed",
    pre_effective_crit_chance => "PreEffectiveCritChance",
    crit_chance => "CritChance",
    crit_multiplier => "CritMultiplier",
    hit_chance => "HitChance",
    total_dps => "TotalDPS",
    total_dot => "TotalDot",
    bleed_dps => "BleedDPS",
    ignite_dps => "IgniteDPS",
    ignite_damage => "IgniteDamage",
    total_dps_with_ignite => "WithIgniteDPS",
    average_damage_with_ignite => "WithIgniteAverageDamage",
    poison_dps => "PoisonDPS",
    poison_damage => "PoisonDamage",
    total_dps_with_poison => "WithPoisonDPS",
    average_damage_with_poison => "WithPoisonAverageDamage",
    decay_dps => "DecayDPS",
    skill_cooldown => "Cooldown",
    area_of_effect_radius => "AreaOfEffectRadius",
    mana_cost => "ManaCost",
    strength => "Str",
    strength_required => "ReqStr",
    dexterity => "Dex",
    dexterity_required => "ReqDex",
    intelligence => "Int",
    intelligence_required => "ReqInt",
    life => "Life",
    life_increased => "Spec:LifeInc",
    life_unreserved => "LifeUnreserved",
    life_unreserved_percent => "LifeUnreservedPercent",
    life_regen => "LifeRegen",
    life_leech_rate_per_hit => "LifeLeechRate",
    life_leech_gain_per_hit => "LifeLeechGainPerHit",
    mana => "Mana",
    mana_increased => "Spec:ManaInc",
    mana_unreserved => "ManaUnreserved",
    mana_unreserved_percent => "ManaUnreservedPercent",
    mana_regen => "ManaRegen",
    mana_leech_rate_per_hit => "ManaLeechRate",
    mana_leech_gain_per_hit => "ManaLeechGainPerHit",
    total_degen => "TotalDegen",
    net_life_regen => "NetLifeRegen",
    net_mana_regen => "NetManaRegen",
    energy_shield => "EnergyShield",
    energy_shield_increased => "Spec:EnergyShieldInc",
    energy_shield_regen => "EnergyShieldRegen",
    energy_shield_leech_rate_per_hit => "EnergyShieldLeechRate",
    energy_shield_leech_gain_per_hit => "EnergyShieldLeechGainPerHit",
    evasion => "Evasion",
    evasion_increased => "Spec:EvasionInc",
    melee_evade_chance => "MeleeEvadeChance",
    projectile_evade_chance => "ProjectileEvadeChance",
    armour => "Armour",
    armour_increased => "Spec:ArmourInc",
    physical_damage_reduction => "PhysicalDamageReduction",
    effective_movement_speed_modifier => "EffectiveMovementSpeedMod",
    block_chance => "BlockChance",
    spell_block_chance => "SpellBlockChance",
    attack_dodge_chance => "AttackDodgeChance",
    spell_dodge_chance => "SpellDodgeChance",
    fire_resistance => "FireResist",
    cold_resistance => "ColdResist",
    lightning_resistance => "LightningResist",
    chaos_resistance => "ChaosResist",
    fire_resistance_over_cap => "FireResistOverCap",
    cold_resistance_over_cap => "ColdResistOverCap",
    lightning_resistance_over_cap => "LightningResistOverCap",
    chaos_resistance_over_cap => "ChaosResistOverCap",
    power_charges => "PowerCharges",
    power_charges_maximum => "PowerChargesMax",
    frenzy_charges => "FrenzyCharges",
    frenzy_charges_maximum => "FrenzyChargesMax",
    endurance_charges => "EnduranceCharges",
    endurance_charges_maximum => "EnduranceChargesMax",
    active_totem_limit => "ActiveTotemLimit",
    active_minion_limit => "ActiveMinionLimit",
}

pub fn field_for_key(key: &str) -> Option<&'static StatField> {
    STAT_FIELDS.iter().find(|field| field.key == key)
}

impl Stats {
    /// Collect the `<PlayerStat>` children of `build`. Unknown stat names are
    /// skipped; a value that is not a number is an error.
    pub fn from_element(build: &Element) -> Result<Self> {
        let mut stats = Self::default();
        let mut skipped = 0usize;

        for stat in build.children("PlayerStat") {
            let key = stat.require_attr("stat")?;
            let raw = stat.require_attr("value")?;
            let value: f64 = raw.trim().parse().map_err(|_| {
                Error::malformed_document(format!("player stat {key:?} has value {raw:?}"))
            })?;
            if !stats.assign(key, value) {
                debug!(stat = key, "skipping unknown player stat");
                skipped += 1;
            }
        }

        debug!(skipped, "read player stats");
        Ok(stats)
    }
}
