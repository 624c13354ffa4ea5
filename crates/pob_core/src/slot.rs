use std::fmt;

use serde::{Deserialize, Serialize};

/// Equipment slots an item set can fill, named as the planner writes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemSlot {
    Weapon1,
    Weapon1AbyssalSocket1,
    Weapon1AbyssalSocket2,
    Weapon1Swap,
    Weapon1SwapAbyssalSocket1,
    Weapon1SwapAbyssalSocket2,
    Weapon2,
    Weapon2AbyssalSocket1,
    Weapon2AbyssalSocket2,
    Weapon2Swap,
    Weapon2SwapAbyssalSocket1,
    Weapon2SwapAbyssalSocket2,
    Helmet,
    HelmetAbyssalSocket1,
    HelmetAbyssalSocket2,
    BodyArmour,
    BodyArmourAbyssalSocket1,
    BodyArmourAbyssalSocket2,
    Gloves,
    GlovesAbyssalSocket1,
    GlovesAbyssalSocket2,
    Boots,
    BootsAbyssalSocket1,
    BootsAbyssalSocket2,
    Amulet,
    Ring1,
    Ring2,
    Belt,
    BeltAbyssalSocket1,
    BeltAbyssalSocket2,
    Flask1,
    Flask2,
    Flask3,
    Flask4,
    Flask5,
}

#[rustfmt::skip]
const SLOT_NAMES: &[(ItemSlot, &str)] = &[
    (ItemSlot::Weapon1,                   "Weapon 1"),
    (ItemSlot::Weapon1AbyssalSocket1,     "Weapon 1 Abyssal Socket 1"),
    (ItemSlot::Weapon1AbyssalSocket2,     "Weapon 1 Abyssal Socket 2"),
    (ItemSlot::Weapon1Swap,               "Weapon 1 Swap"),
    (ItemSlot::Weapon1SwapAbyssalSocket1, "Weapon 1 Swap Abyssal Socket 1"),
    (ItemSlot::Weapon1SwapAbyssalSocket2, "Weapon 1 Swap Abyssal Socket 2"),
    (ItemSlot::Weapon2,                   "Weapon 2"),
    (ItemSlot::Weapon2AbyssalSocket1,     "Weapon 2 Abyssal Socket 1"),
    (ItemSlot::Weapon2AbyssalSocket2,     "Weapon 2 Abyssal Socket 2"),
    (ItemSlot::Weapon2Swap,               "Weapon 2 Swap"),
    (ItemSlot::Weapon2SwapAbyssalSocket1, "Weapon 2 Swap Abyssal Socket 1"),
    (ItemSlot::Weapon2SwapAbyssalSocket2, "Weapon 2 Swap Abyssal Socket 2"),
    (ItemSlot::Helmet,                    "Helmet"),
    (ItemSlot::HelmetAbyssalSocket1,      "Helmet Abyssal Socket 1"),
    (ItemSlot::HelmetAbyssalSocket2,      "Helmet Abyssal Socket 2"),
    (ItemSlot::BodyArmour,                "Body Armour"),
    (ItemSlot::BodyArmourAbyssalSocket1,  "Body Armour Abyssal Socket 1"),
    (ItemSlot::BodyArmourAbyssalSocket2,  "Body Armour Abyssal Socket 2"),
    (ItemSlot::Gloves,                    "Gloves"),
    (ItemSlot::GlovesAbyssalSocket1,      "Gloves Abyssal Socket 1"),
    (ItemSlot::GlovesAbyssalSocket2,      "Gloves Abyssal Socket 2"),
    (ItemSlot::Boots,                     "Boots"),
    (ItemSlot::BootsAbyssalSocket1,       "Boots Abyssal Socket 1"),
    (ItemSlot::BootsAbyssalSocket2,       "Boots Abyssal Socket 2"),
    (ItemSlot::Amulet,                    "Amulet"),
    (ItemSlot::Ring1,                     "Ring 1"),
    (ItemSlot::Ring2,                     "Ring 2"),
    (ItemSlot::Belt,                      "Belt"),
    (ItemSlot::BeltAbyssalSocket1,        "Belt Abyssal Socket 1"),
    (ItemSlot::BeltAbyssalSocket2,        "Belt Abyssal Socket 2"),
    (ItemSlot::Flask1,                    "Flask 1"),
    (ItemSlot::Flask2,                    "Flask 2"),
    (ItemSlot::Flask3,                    "Flask 3"),
    (ItemSlot::Flask4,                    "Flask 4"),
    (ItemSlot::Flask5,                    "Flask 5"),
];

impl ItemSlot {
    pub fn from_raw(raw: &str) -> Option<Self> {
        SLOT_NAMES
            .iter()
            .find(|(_, name)| *name == raw)
            .map(|(slot, _)| *slot)
    }

    pub fn raw(&self) -> &'static str {
        SLOT_NAMES
            .iter()
            .find(|(slot, _)| slot == self)
            .map_or("", |(_, name)| name)
    }

    pub fn all() -> impl Iterator<Item = ItemSlot> {
        SLOT_NAMES.iter().map(|(slot, _)| *slot)
    }
}

impl fmt::Display for ItemSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw())
    }
}
