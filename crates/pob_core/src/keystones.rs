//! Keystone passives, recognised by node id in a decoded tree.

struct Keystone {
    id: u16,
    name: &'static str,
}

#[rustfmt::skip]
const KEYSTONES: &[Keystone] = &[
    Keystone { id: 54307, name: "Acrobatics" },
    Keystone { id: 10661, name: "Ancestral Bond" },
    Keystone { id: 23407, name: "Arrow Dancing" },
    Keystone { id: 11455, name: "Avatar of Fire" },
    Keystone { id:  6769, name: "Blood Magic" },
    Keystone { id: 56075, name: "Chaos Inoculation" },
    Keystone { id: 18663, name: "Conduit" },
    Keystone { id: 63425, name: "Crimson Dance" },
    Keystone { id: 56076, name: "Eldritch Battery" },
    Keystone { id: 39085, name: "Elemental Equilibrium" },
    Keystone { id: 22088, name: "Ghost Reaver" },
    Keystone { id: 41891, name: "Iron Grip" },
    Keystone { id: 24426, name: "Iron Reflexes" },
    Keystone { id: 34098, name: "Mind Over Matter" },
    Keystone { id: 48768, name: "Minion Instability" },
    Keystone { id: 45175, name: "Necromantic Aegis" },
    Keystone { id: 31703, name: "Pain Attunement" },
    Keystone { id: 62802, name: "Perfect Agony" },
    Keystone { id: 10808, name: "Phase Acrobatics" },
    Keystone { id:  2214, name: "Point Blank" },
    Keystone { id: 31961, name: "Resolute Technique" },
    Keystone { id:  9880, name: "Runebinder" },
    Keystone { id: 39530, name: "Unwavering Stance" },
    Keystone { id: 57257, name: "Vaal Pact" },
    Keystone { id: 40907, name: "Wicked Ward" },
    Keystone { id: 60247, name: "Zealot's Oath" },
];

/// Keystone name for a passive node id.
pub fn lookup(node_id: u16) -> Option<&'static str> {
    KEYSTONES.iter().find(|k| k.id == node_id).map(|k| k.name)
}

/// Keystones allocated in `nodes`, in table order and without repeats.
pub fn allocated(nodes: &[u16]) -> Vec<&'static str> {
    KEYSTONES
        .iter()
        .filter(|k| nodes.contains(&k.id))
        .map(|k| k.name)
        .collect()
}

pub fn all() -> impl Iterator<Item = (u16, &'static str)> {
    KEYSTONES.iter().map(|k| (k.id, k.name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let mut ids: Vec<u16> = all().map(|(id, _)| id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), KEYSTONES.len());
    }

    #[test]
    fn allocated_ignores_order_and_repeats() {
        let nodes = [31961, 1, 56075, 31961];
        assert_eq!(allocated(&nodes), vec!["Chaos Inoculation", "Resolute Technique"]);
        assert_eq!(lookup(56075), Some("Chaos Inoculation"));
        assert_eq!(lookup(1), None);
    }
}
