//! Build configuration options.
//!
//! Each `<Config><Input .../>` element carries the option's key in `name` and
//! its value in exactly one of the `boolean`, `number` or `string` attributes.
//! The flat [`Config`] record and the [`CONFIG_FIELDS`] table are generated
//! from one declaration list, so a field's canonical name, source key and
//! declared type cannot drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core_api::{Error, Result, UnknownOptionPolicy};
use crate::document::Element;
use crate::monster;

pub const DEFAULT_RESISTANCE_PENALTY: i64 = -60;
/// Highest enemy level derived from the character level.
pub const MAX_DERIVED_ENEMY_LEVEL: u32 = 84;
const ENEMY_HIT_DAMAGE_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigKind {
    Bool,
    Integer,
    Float,
    Text,
    /// A checkbox that later became a list: a boolean or a string.
    Choice,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "a boolean",
            Self::Integer => "an integer",
            Self::Float => "a number",
            Self::Text => "a string",
            Self::Choice => "a boolean or a string",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigField {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: ConfigKind,
}

/// Raw value of one `<Input>` element.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    Number(f64),
    Str(String),
}

impl ConfigValue {
    pub fn from_input(input: &Element) -> Result<Self> {
        let name = input.attr("name").unwrap_or_default();
        if let Some(raw) = input.attr("boolean") {
            return match raw {
                "true" => Ok(Self::Bool(true)),
                "false" => Ok(Self::Bool(false)),
                _ => Err(Error::malformed_document(format!(
                    "config option {name:?} has boolean value {raw:?}"
                ))),
            };
        }
        if let Some(raw) = input.attr("number") {
            return raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Self::Number)
                .ok_or_else(|| {
                    Error::malformed_document(format!(
                        "config option {name:?} has number value {raw:?}"
                    ))
                });
        }
        if let Some(raw) = input.attr("string") {
            return Ok(Self::Str(raw.to_string()));
        }
        Err(Error::malformed_document(format!(
            "config option {name:?} has no boolean, number or string value"
        )))
    }

    fn kind(&self) -> ConfigKind {
        match self {
            Self::Bool(_) => ConfigKind::Bool,
            Self::Number(n) if n.fract() == 0.0 => ConfigKind::Integer,
            Self::Number(_) => ConfigKind::Float,
            Self::Str(_) => ConfigKind::Text,
        }
    }
}

trait ConfigType: Sized {
    const KIND: ConfigKind;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self>;
}

fn mismatch(key: &str, expected: ConfigKind, value: &ConfigValue) -> Error {
    Error::malformed_document(format!(
        "config option {key:?} expects {expected}, found {}",
        value.kind()
    ))
}

impl ConfigType for bool {
    const KIND: ConfigKind = ConfigKind::Bool;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Bool(b) => Ok(b),
            other => Err(mismatch(key, Self::KIND, &other)),
        }
    }
}

impl ConfigType for i64 {
    const KIND: ConfigKind = ConfigKind::Integer;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Number(n) if n.fract() == 0.0 => Ok(n as i64),
            other => Err(mismatch(key, Self::KIND, &other)),
        }
    }
}

impl ConfigType for f64 {
    const KIND: ConfigKind = ConfigKind::Float;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Number(n) => Ok(n),
            other => Err(mismatch(key, Self::KIND, &other)),
        }
    }
}

impl ConfigType for String {
    const KIND: ConfigKind = ConfigKind::Text;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Str(s) => Ok(capitalize(&s)),
            other => Err(mismatch(key, Self::KIND, &other)),
        }
    }
}

/// Boss setting of the enemy. Older exports write a checkbox
/// (`boolean="true"`), newer ones the selected list entry (`string="SHAPER"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyBoss {
    #[default]
    None,
    Standard,
    Shaper,
}

impl EnemyBoss {
    /// Parse a list entry. Boss names other than Shaper count as a standard boss.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "" | "NONE" | "FALSE" => Self::None,
            "SHAPER" => Self::Shaper,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match *self {
            Self::None => "None",
            Self::Standard => "Standard",
            Self::Shaper => "Shaper",
        }
    }
}

impl fmt::Display for EnemyBoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigType for EnemyBoss {
    const KIND: ConfigKind = ConfigKind::Choice;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        match value {
            ConfigValue::Bool(true) => Ok(Self::Standard),
            ConfigValue::Bool(false) => Ok(Self::None),
            ConfigValue::Str(s) => Ok(Self::from_raw(&s)),
            other => Err(mismatch(key, Self::KIND, &other)),
        }
    }
}

impl<T: ConfigType> ConfigType for Option<T> {
    const KIND: ConfigKind = T::KIND;

    fn from_value(key: &str, value: ConfigValue) -> Result<Self> {
        T::from_value(key, value).map(Some)
    }
}

/// First character upper-cased, the rest lower-cased.
pub fn capitalize(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

macro_rules! config_fields {
    ($( $field:ident : $ty:ty => $key:literal, )*) => {
        /// Flat build configuration. Options the document leaves out keep
        /// their defaults: `false`, `None`, or a value derived from the
        /// character level.
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        pub struct Config {
            $( pub $field: $ty, )*
        }

        #[rustfmt::skip]
        pub const CONFIG_FIELDS: &[ConfigField] = &[
            $( ConfigField { key: $key, name: stringify!($field), kind: <$ty as ConfigType>::KIND }, )*
        ];

        impl Config {
            fn blank() -> Self {
                Self {
                    $( $field: Default::default(), )*
                }
            }

            fn assign(&mut self, key: &str, value: ConfigValue) -> Result<Option<&'static str>> {
                match key {
                    $(
                        $key => {
                            self.$field = <$ty as ConfigType>::from_value(key, value)?;
                            Ok(Some(stringify!($field)))
                        }
                    )*
                    _ => Ok(None),
                }
            }
        }
    };
}

config_fields! {
    // General
    resistance_penalty: i64 => "resistancePenalty",
    enemy_level: i64 => "enemyLevel",
    enemy_physical_hit_damage: f64 => "enemyPhysicalHit",
    detonate_dead_corpse_life: i64 => "detonateDeadCorpseLife",
    is_stationary: bool => "conditionStationary",
    is_moving: bool => "conditionMoving",
    on_full_life: bool => "conditionFullLife",
    on_low_life: bool => "conditionLowLife",
    on_full_energy_shield: bool => "conditionFullEnergyShield",
    has_energy_shield: bool => "conditionHaveEnergyShield",
    minions_on_full_life: bool => "minionsConditionFullLife",
    ignite_mode: Option<String> => "igniteMode",

    // Skills
    aspect_of_the_avian_avians_might: bool => "aspectOfTheAvianAviansMight",
    aspect_of_the_avian_avians_flight: bool => "aspectOfTheAvianAviansFlight",
    aspect_of_the_cat_cats_stealth: bool => "aspectOfTheCatCatsStealth",
    aspect_of_the_cat_cats_agility: bool => "aspectOfTheCatCatsAgility",
    override_crab_barriers: Option<i64> => "overrideCrabBarriers",
    aspect_of_the_spider_web_stacks: Option<i64> => "aspectOfTheSpiderWebStacks",
    dark_pact_skeleton_life: Option<i64> => "darkPactSkeletonLife",
    ice_nova_cast_on_frostbolt: bool => "iceNovaCastOnFrostbolt",
    innervate_innervation: bool => "innervateInnervation",
    raise_spectres_spectre_level: Option<i64> => "raiseSpectreSpectreLevel",
    siphoning_trap_affected_enemies: Option<i64> => "siphoningTrapAffectedEnemies",
    raise_spectres_enable_curses: bool => "raiseSpectreEnableCurses",
    raise_spectres_blade_vortex_blade_count: Option<i64> => "raiseSpectreBladeVortexBladeCount",
    summon_lightning_golem_enable_wrath: bool => "summonLightningGolemEnableWrath",
    vortex_cast_on_frostbolt: bool => "vortexCastOnFrostbolt",

    // Map modifiers
    enemy_physical_reduction: Option<i64> => "mapEnemyPhysicalReduction",
    enemy_hexproof: bool => "enemyHexproof",
    less_curse_effect: Option<i64> => "lessCurseEffect",
    enemy_avoid_poison_blind_bleed: Option<i64> => "enemyAvoidPoisonBlindBleed",
    enemy_resistances: Option<String> => "enemyResistances",
    elemental_equilibrium: bool => "mapElementalEquilibrium",
    no_leech: bool => "playerCannotLeech",
    reduced_flask_charges: Option<i64> => "playerGainsReducedFlaskCharges",
    minus_max_resists: Option<i64> => "playerHasMinusMaxResist",
    less_aoe: Option<i64> => "playerHasLessAreaOfEffect",
    enemy_avoid_status_ailment: Option<i64> => "enemyChanceToAvoidAilments",
    enemy_increased_accuracy: Option<i64> => "enemyHasIncreasedAccuracy",
    less_armour_block: Option<String> => "playerHasLessArmourAndBlock",
    point_blank: bool => "mapPointBlank",
    less_recovery: Option<i64> => "playerHasLessLifeESRecovery",
    no_regen: bool => "playerCannotRegen",
    enemy_takes_reduced_extra_crit_damage: Option<i64> => "enemyTakesReducedExtraCritDamage",
    curse_assassins_mark: Option<i64> => "playerCursedWithAssassinsMark",
    curse_conductivity: Option<i64> => "playerCursedWithConductivity",
    curse_despair: Option<i64> => "playerCursedWithDespair",
    curse_elemental_weakness: Option<i64> => "playerCursedWithElementalWeakness",
    curse_enfeeble: Option<i64> => "playerCursedWithEnfeeble",
    curse_flammability: Option<i64> => "playerCursedWithFlammability",
    curse_frostbite: Option<i64> => "playerCursedWithFrostbite",
    curse_poachers_mark: Option<i64> => "playerCursedWithPoachersMark",
    curse_projectile_weakness: Option<i64> => "playerCursedWithProjectileWeakness",
    curse_punishment: Option<i64> => "playerCursedWithPunishment",
    curse_temporal_chains: Option<i64> => "playerCursedWithTemporalChains",
    curse_vulnerability: Option<i64> => "playerCursedWithVulnerability",
    curse_warlords_mark: Option<i64> => "playerCursedWithWarlordsMark",

    // Combat
    use_power_charges: bool => "usePowerCharges",
    max_power_charges: Option<i64> => "overridePowerCharges",
    use_frenzy_charges: bool => "useFrenzyCharges",
    max_frenzy_charges: Option<i64> => "overrideFrenzyCharges",
    use_endurance_charges: bool => "useEnduranceCharges",
    max_endurance_charges: Option<i64> => "overrideEnduranceCharges",
    use_siphoning_charges: bool => "useSiphoningCharges",
    max_siphoning_charges: Option<i64> => "overrideSiphoningCharges",
    minions_use_power_charges: bool => "minionsUsePowerCharges",
    minions_use_frenzy_charges: bool => "minionsUseFrenzyCharges",
    minions_use_endurance_charges: bool => "minionsUseEnduranceCharges",
    onslaught: bool => "buffOnslaught",
    unholy_might: bool => "buffUnholyMight",
    phasing: bool => "buffPhasing",
    fortify: bool => "buffFortify",
    tailwind: bool => "buffTailwind",
    adrenaline: bool => "buffAdrenaline",
    rage: bool => "conditionRage",
    leeching: bool => "conditionLeeching",
    using_flask: bool => "conditionUsingFlask",
    has_totem: bool => "conditionHaveTotem",
    on_consecrated_ground: bool => "conditionOnConsecratedGround",
    on_burning_ground: bool => "conditionOnBurningGround",
    on_chilled_ground: bool => "conditionOnChilledGround",
    on_shocked_ground: bool => "conditionOnShockedGround",
    burning: bool => "conditionBurning",
    ignited: bool => "conditionIgnited",
    chilled: bool => "conditionChilled",
    frozen: bool => "conditionFrozen",
    shocked: bool => "conditionShocked",
    bleeding: bool => "conditionBleeding",
    poisoned: bool => "conditionPoisoned",
    number_of_poison_stacks: Option<i64> => "multiplierPoisonOnSelf",
    only_one_nearby_enemy: bool => "conditionOnlyOneNearbyEnemy",
    hit_recently: bool => "conditionHitRecently",
    crit_recently: bool => "conditionCritRecently",
    killed_recently: bool => "conditionKilledRecently",
    number_of_enemies_killed_recently: Option<i64> => "multiplierEnemyKilledRecently",
    totems_killed_recently: bool => "conditionTotemsKilledRecently",
    number_of_totems_killed_recently: Option<i64> => "multiplierTotemsKilledRecently",
    minions_killed_recently: bool => "conditionMinionsKilledRecently",
    number_of_minions_killed_recently: Option<i64> => "multiplierMinionsKilledRecently",
    killed_affected_by_dot: bool => "conditionKilledAffectedByDoT",
    number_of_shocked_enemies_killed_recently: Option<i64> => "multiplierShockedEnemyKilledRecently",
    frozen_enemy_recently: bool => "conditionFrozenEnemyRecently",
    shattered_enemy_recently: bool => "conditionShatteredEnemyRecently",
    ignited_enemy_recently: bool => "conditionIgnitedEnemyRecently",
    shocked_enemy_recently: bool => "conditionShockedEnemyRecently",
    number_of_poisons_applied_recently: Option<i64> => "multiplierPoisonAppliedRecently",
    been_hit_recently: bool => "conditionBeenHitRecently",
    been_crit_recently: bool => "conditionBeenCritRecently",
    been_savage_hit_recently: bool => "conditionBeenSavageHitRecently",
    hit_by_fire_damage_recently: bool => "conditionHitByFireDamage",
    hit_by_cold_damage_recently: bool => "conditionHitByColdDamage",
    hit_by_lightning_damage_recently: bool => "conditionHitByLightningDamage",
    blocked_recently: bool => "conditionBlockedRecently",
    blocked_attack_recently: bool => "conditionBlockedAttackRecently",
    blocked_spell_recently: bool => "conditionBlockedSpellRecently",
    energy_shield_recharge_started_recently: bool => "conditionEnergyShieldRechargeRecently",
    pendulum_of_destruction: Option<String> => "buffPendulum",
    elemental_conflux: Option<String> => "buffConflux",
    bastion_of_hope: bool => "buffBastionOfHope",
    her_embrace: bool => "buffHerEmbrace",
    used_skill_recently: bool => "conditionUsedSkillRecently",
    attacked_recently: bool => "conditionAttackedRecently",
    cast_spell_recently: bool => "conditionCastSpellRecently",
    used_fire_skill_recently: bool => "conditionUsedFireSkillRecently",
    used_cold_skill_recently: bool => "conditionUsedColdSkillRecently",
    used_minion_skill_recently: bool => "conditionUsedMinionSkillRecently",
    used_movement_skill_recently: bool => "conditionUsedMovementSkillRecently",
    used_vaal_skill_recently: bool => "conditionUsedVaalSkillRecently",
    used_warcry_recently: bool => "conditionUsedWarcryRecently",
    number_of_mines_detonated_recently: Option<i64> => "multiplierMineDetonatedRecently",
    number_of_traps_triggered_recently: Option<i64> => "multiplierTrapTriggeredRecently",
    consumed_corpses_recently: bool => "conditionConsumedCorpseRecently",
    number_of_corpses_consumed_recently: Option<i64> => "multiplierCorpseConsumedRecently",
    taunted_enemy_recently: bool => "conditionTauntedEnemyRecently",
    blocked_hit_from_unique_enemy_in_past_ten_seconds: bool => "conditionBlockedHitFromUniqueEnemyInPast10Sec",

    // Damage calculation
    lucky_crits: bool => "critChanceLucky",
    number_of_times_skill_has_chained: Option<i64> => "skillChainCount",
    projectile_distance: Option<i64> => "projectileDistance",
    enemy_in_close_range: bool => "conditionAtCloseRange",
    enemy_moving: bool => "conditionEnemyMoving",
    enemy_on_full_life: bool => "conditionEnemyFullLife",
    enemy_on_low_life: bool => "conditionEnemyLowLife",
    enemy_cursed: bool => "conditionEnemyCursed",
    enemy_bleeding: bool => "conditionEnemyBleeding",
    enemy_poisoned: bool => "conditionEnemyPoisoned",
    enemy_number_of_poison_stacks: Option<i64> => "multiplierPoisonOnEnemy",
    enemy_maimed: bool => "conditionEnemyMaimed",
    enemy_hindered: bool => "conditionEnemyHindered",
    enemy_blinded: bool => "conditionEnemyBlinded",
    enemy_taunted: bool => "conditionEnemyTaunted",
    enemy_burning: bool => "conditionEnemyBurning",
    enemy_ignited: bool => "conditionEnemyIgnited",
    enemy_chilled: bool => "conditionEnemyChilled",
    enemy_frozen: bool => "conditionEnemyFrozen",
    enemy_shocked: bool => "conditionEnemyShocked",
    enemy_number_of_freeze_shock_ignite: Option<i64> => "multiplierFreezeShockIgniteOnEnemy",
    enemy_intimidated: bool => "conditionEnemyIntimidated",
    enemy_covered_in_ash: bool => "conditionEnemyCoveredInAsh",
    enemy_rare_or_unique: bool => "conditionEnemyRareOrUnique",
    enemy_boss: EnemyBoss => "enemyIsBoss",
    enemy_physical_damage_reduction: Option<i64> => "enemyPhysicalReduction",
    enemy_fire_resist: Option<i64> => "enemyFireResist",
    enemy_cold_resist: Option<i64> => "enemyColdResist",
    enemy_lightning_resist: Option<i64> => "enemyLightningResist",
    enemy_chaos_resist: Option<i64> => "enemyChaosResist",
    enemy_hit_by_fire_damage: bool => "enemyConditionHitByFireDamage",
    enemy_hit_by_cold_damage: bool => "enemyConditionHitByColdDamage",
    enemy_hit_by_lightning_damage: bool => "enemyConditionHitByLightningDamage",
    elemental_equilibrium_ignore_hit_damage: bool => "EEIgnoreHitDamage",
}

pub fn field_for_key(key: &str) -> Option<&'static ConfigField> {
    CONFIG_FIELDS.iter().find(|field| field.key == key)
}

impl Config {
    /// Configuration with no explicit options for a character of `level`.
    pub fn for_level(character_level: u32) -> Self {
        let mut config = Self::blank();
        config.fill_level_defaults(character_level, &[]);
        config
    }

    /// Read the `<Input>` children of a `<Config>` element. A build without
    /// one gets [`Config::for_level`].
    pub fn from_element(
        element: Option<&Element>,
        character_level: u32,
        policy: UnknownOptionPolicy,
    ) -> Result<Self> {
        let mut config = Self::blank();
        let mut explicit = Vec::new();

        for input in element.into_iter().flat_map(|e| e.children("Input")) {
            let key = input.require_attr("name")?;
            if field_for_key(key).is_none() {
                match policy {
                    UnknownOptionPolicy::Ignore => {
                        warn!(option = key, "ignoring unrecognized config option");
                        continue;
                    }
                    UnknownOptionPolicy::Reject => {
                        return Err(Error::UnrecognizedOption {
                            name: key.to_string(),
                        });
                    }
                }
            }
            let value = ConfigValue::from_input(input)?;
            if let Some(name) = config.assign(key, value)? {
                explicit.push(name);
            }
        }

        debug!(options = explicit.len(), "read build configuration");
        config.fill_level_defaults(character_level, &explicit);
        Ok(config)
    }

    fn fill_level_defaults(&mut self, character_level: u32, explicit: &[&str]) {
        let is_explicit = |name: &str| explicit.iter().any(|e| *e == name);

        if !is_explicit("resistance_penalty") {
            self.resistance_penalty = DEFAULT_RESISTANCE_PENALTY;
        }
        if !is_explicit("enemy_level") {
            self.enemy_level = i64::from(character_level.clamp(1, MAX_DERIVED_ENEMY_LEVEL));
        }
        if !is_explicit("enemy_physical_hit_damage") {
            self.enemy_physical_hit_damage =
                monster::damage(self.enemy_level) * ENEMY_HIT_DAMAGE_MULTIPLIER;
        }
        if !is_explicit("detonate_dead_corpse_life") {
            self.detonate_dead_corpse_life = i64::from(monster::life(self.enemy_level));
        }
    }
}
