use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::item::Item;
use crate::keystones;
use crate::passive_tree::TreeHeader;
use crate::slot::ItemSlot;
use crate::transport::DEFAULT_FETCH_TIMEOUT;

use super::error::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildInfo {
    pub class_name: String,
    pub ascendancy_name: Option<String>,
    pub level: u32,
    pub bandit: Option<String>,
    pub target_version: Option<String>,
    /// 1-based index into the skill groups.
    pub main_socket_group: u32,
    pub notes: String,
    pub second_weapon_set: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GemAbility {
    pub name: String,
    pub enabled: bool,
    pub level: u32,
    pub quality: u32,
    pub support: bool,
}

/// A skill granted by an item rather than a socketed gem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrantedAbility {
    pub name: String,
    pub enabled: bool,
    pub level: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Gem(GemAbility),
    Granted(GrantedAbility),
}

impl Ability {
    pub fn name(&self) -> &str {
        match self {
            Self::Gem(gem) => &gem.name,
            Self::Granted(granted) => &granted.name,
        }
    }

    pub fn enabled(&self) -> bool {
        match self {
            Self::Gem(gem) => gem.enabled,
            Self::Granted(granted) => granted.enabled,
        }
    }

    pub fn level(&self) -> u32 {
        match self {
            Self::Gem(gem) => gem.level,
            Self::Granted(granted) => granted.level,
        }
    }

    pub fn is_support(&self) -> bool {
        matches!(self, Self::Gem(gem) if gem.support)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGroup {
    pub enabled: bool,
    pub label: String,
    pub slot: Option<String>,
    /// 1-based index of the main ability, always within `abilities`.
    pub active: Option<u32>,
    pub abilities: Vec<Ability>,
}

impl SkillGroup {
    pub fn active_ability(&self) -> Option<&Ability> {
        let index = self.active?.checked_sub(1)?;
        self.abilities.get(index as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveTreeSpec {
    pub title: Option<String>,
    pub url: String,
    pub header: TreeHeader,
    pub nodes: Vec<u16>,
    /// Jewel socket node id to the id of the item socketed there.
    pub sockets: BTreeMap<u16, u32>,
}

impl PassiveTreeSpec {
    pub fn keystones(&self) -> Vec<&'static str> {
        keystones::allocated(&self.nodes)
    }
}

/// One `<Item>` of the build. Items fail independently of each other.
#[derive(Debug)]
pub struct ItemEntry {
    /// `None` when the `<Item>` carries no usable `id`; `item` is then the error.
    pub id: Option<u32>,
    pub item: Result<Item, Error>,
}

impl ItemEntry {
    pub fn ok(&self) -> Option<&Item> {
        self.item.as_ref().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemSet {
    pub id: u32,
    pub title: Option<String>,
    /// Filled slots only; a slot holding item id 0 is empty.
    pub slots: BTreeMap<ItemSlot, u32>,
}

impl ItemSet {
    pub fn get(&self, slot: ItemSlot) -> Option<u32> {
        self.slots.get(&slot).copied()
    }
}

/// What to do with a config option name the field table does not know.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownOptionPolicy {
    /// Skip it and log a warning.
    #[default]
    Ignore,
    /// Fail the config section with `UnrecognizedOption`.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    pub unknown_options: UnknownOptionPolicy,
    pub fetch_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            unknown_options: UnknownOptionPolicy::Ignore,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}
