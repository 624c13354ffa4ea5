use std::fmt::Write as _;

use pob_core::core_api::{Ability, Error, ItemEntry, PassiveTreeSpec, Session, SkillGroup};
use pob_core::config::EnemyBoss;
use pob_core::item::Item;
use pob_core::slot::ItemSlot;
use serde_json::{Map as JsonMap, Value as JsonValue};

const SUMMARY_LABEL_WIDTH: usize = 28;
const SUMMARY_SLOT_WIDTH: usize = 16;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FieldSelection {
    pub build: bool,
    pub main_skill: bool,
    pub stats: bool,
    pub skills: bool,
    pub items: bool,
    pub tree: bool,
    pub config: bool,
}

impl FieldSelection {
    pub fn is_any_selected(&self) -> bool {
        self.build
            || self.main_skill
            || self.stats
            || self.skills
            || self.items
            || self.tree
            || self.config
    }
}

pub fn render_json_full(session: &Session) -> JsonValue {
    JsonValue::Object(default_json(session))
}

pub fn render_json_selected(session: &Session, fields: &FieldSelection) -> JsonValue {
    JsonValue::Object(selected_json(fields, session))
}

fn default_json(session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();
    insert_build(&mut out, session);
    out.insert("main_skill".to_string(), main_skill_to_json(session));
    out.insert("stats".to_string(), stats_to_json(session));
    out.insert("skill_groups".to_string(), skill_groups_to_json(session));
    insert_items(&mut out, session);
    out.insert("trees".to_string(), trees_to_json(session));
    out.insert("config".to_string(), config_to_json(session));
    out
}

fn selected_json(fields: &FieldSelection, session: &Session) -> JsonMap<String, JsonValue> {
    let mut out = JsonMap::new();

    if fields.build {
        insert_build(&mut out, session);
    }
    if fields.main_skill {
        out.insert("main_skill".to_string(), main_skill_to_json(session));
    }
    if fields.stats {
        out.insert("stats".to_string(), stats_to_json(session));
    }
    if fields.skills {
        out.insert("skill_groups".to_string(), skill_groups_to_json(session));
    }
    if fields.items {
        insert_items(&mut out, session);
    }
    if fields.tree {
        out.insert("trees".to_string(), trees_to_json(session));
    }
    if fields.config {
        out.insert("config".to_string(), config_to_json(session));
    }

    out
}

fn insert_build(out: &mut JsonMap<String, JsonValue>, session: &Session) {
    let info = session.info();
    out.insert(
        "class".to_string(),
        JsonValue::String(info.class_name.clone()),
    );
    out.insert(
        "ascendancy".to_string(),
        optional_string(info.ascendancy_name.as_deref()),
    );
    out.insert("level".to_string(), JsonValue::from(info.level));
    out.insert(
        "bandit".to_string(),
        optional_string(info.bandit.as_deref()),
    );
}

fn insert_items(out: &mut JsonMap<String, JsonValue>, session: &Session) {
    let (items, errors) = items_to_json(session);
    out.insert("items".to_string(), items);
    out.insert("item_errors".to_string(), errors);
}

fn optional_string(value: Option<&str>) -> JsonValue {
    match value {
        Some(v) => JsonValue::String(v.to_string()),
        None => JsonValue::Null,
    }
}

fn error_to_json(err: &Error) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("error".to_string(), JsonValue::String(err.to_string()));
    JsonValue::Object(obj)
}

fn main_skill_to_json(session: &Session) -> JsonValue {
    match session.active_ability() {
        Ok(Some(ability)) => JsonValue::String(ability.name().to_string()),
        Ok(None) => JsonValue::Null,
        Err(err) => error_to_json(&err),
    }
}

fn stats_to_json(session: &Session) -> JsonValue {
    let stats = match session.stats() {
        Ok(stats) => stats,
        Err(err) => return error_to_json(&err),
    };
    let mut obj = JsonMap::new();
    for (name, value) in stats.present() {
        obj.insert(name.to_string(), number_to_json(value));
    }
    JsonValue::Object(obj)
}

// Whole numbers render as integers so `4821.0` reads as `4821`.
fn number_to_json(value: f64) -> JsonValue {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        JsonValue::from(value as i64)
    } else {
        JsonValue::from(value)
    }
}

fn ability_to_json(ability: &Ability) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert(
        "name".to_string(),
        JsonValue::String(ability.name().to_string()),
    );
    match ability {
        Ability::Gem(gem) => {
            obj.insert("kind".to_string(), JsonValue::String("gem".to_string()));
            obj.insert("enabled".to_string(), JsonValue::Bool(gem.enabled));
            obj.insert("level".to_string(), JsonValue::from(gem.level));
            obj.insert("quality".to_string(), JsonValue::from(gem.quality));
            obj.insert("support".to_string(), JsonValue::Bool(gem.support));
        }
        Ability::Granted(granted) => {
            obj.insert(
                "kind".to_string(),
                JsonValue::String("granted".to_string()),
            );
            obj.insert("enabled".to_string(), JsonValue::Bool(granted.enabled));
            obj.insert("level".to_string(), JsonValue::from(granted.level));
        }
    }
    JsonValue::Object(obj)
}

fn skill_group_to_json(group: &SkillGroup) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("label".to_string(), JsonValue::String(group.label.clone()));
    obj.insert("slot".to_string(), optional_string(group.slot.as_deref()));
    obj.insert("enabled".to_string(), JsonValue::Bool(group.enabled));
    obj.insert(
        "main".to_string(),
        optional_string(group.active_ability().map(Ability::name)),
    );
    obj.insert(
        "abilities".to_string(),
        JsonValue::Array(group.abilities.iter().map(ability_to_json).collect()),
    );
    JsonValue::Object(obj)
}

fn skill_groups_to_json(session: &Session) -> JsonValue {
    match session.skill_groups() {
        Ok(groups) => JsonValue::Array(groups.iter().map(skill_group_to_json).collect()),
        Err(err) => error_to_json(&err),
    }
}

fn item_to_json(id: Option<u32>, item: &Item, slots: &[ItemSlot]) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("id".to_string(), JsonValue::from(id));
    obj.insert(
        "slots".to_string(),
        JsonValue::Array(
            slots
                .iter()
                .map(|slot| JsonValue::String(slot.raw().to_string()))
                .collect(),
        ),
    );
    obj.insert(
        "rarity".to_string(),
        JsonValue::String(item.rarity.as_str().to_string()),
    );
    obj.insert("name".to_string(), JsonValue::String(item.name.clone()));
    obj.insert("base".to_string(), JsonValue::String(item.base.clone()));
    obj.insert(
        "quality".to_string(),
        item.quality.map_or(JsonValue::Null, JsonValue::from),
    );
    obj.insert(
        "sockets".to_string(),
        match &item.sockets {
            Some(groups) => JsonValue::Array(
                groups
                    .iter()
                    .map(|group| JsonValue::String(group.join("-")))
                    .collect(),
            ),
            None => JsonValue::Null,
        },
    );
    obj.insert("item_level".to_string(), JsonValue::from(item.item_level));
    obj.insert("level_req".to_string(), JsonValue::from(item.level_req));
    let mut influences = Vec::new();
    if item.shaper {
        influences.push(JsonValue::String("shaper".to_string()));
    }
    if item.elder {
        influences.push(JsonValue::String("elder".to_string()));
    }
    obj.insert("influences".to_string(), JsonValue::Array(influences));
    obj.insert(
        "mods".to_string(),
        JsonValue::Array(
            item.text
                .lines()
                .map(|line| JsonValue::String(line.to_string()))
                .collect(),
        ),
    );
    JsonValue::Object(obj)
}

fn equipped_slots(session: &Session, id: u32) -> Vec<ItemSlot> {
    match session.current_slots() {
        Ok(slots) => slots
            .iter()
            .filter(|&(_, &item_id)| item_id == id)
            .map(|(&slot, _)| slot)
            .collect(),
        Err(_) => Vec::new(),
    }
}

fn items_to_json(session: &Session) -> (JsonValue, JsonValue) {
    let entries: &[ItemEntry] = match session.items() {
        Ok(entries) => entries,
        Err(err) => return (error_to_json(&err), JsonValue::Array(Vec::new())),
    };

    let mut items = Vec::new();
    let mut errors = Vec::new();
    for entry in entries {
        match &entry.item {
            Ok(item) => {
                let slots = entry
                    .id
                    .map(|id| equipped_slots(session, id))
                    .unwrap_or_default();
                items.push(item_to_json(entry.id, item, &slots));
            }
            Err(err) => {
                let mut obj = JsonMap::new();
                obj.insert("id".to_string(), JsonValue::from(entry.id));
                obj.insert("error".to_string(), JsonValue::String(err.to_string()));
                errors.push(JsonValue::Object(obj));
            }
        }
    }
    (JsonValue::Array(items), JsonValue::Array(errors))
}

fn tree_to_json(tree: &PassiveTreeSpec, active: bool) -> JsonValue {
    let mut obj = JsonMap::new();
    obj.insert("title".to_string(), optional_string(tree.title.as_deref()));
    obj.insert("active".to_string(), JsonValue::Bool(active));
    obj.insert("version".to_string(), JsonValue::from(tree.header.version));
    obj.insert("class_id".to_string(), JsonValue::from(tree.header.class_id));
    obj.insert(
        "ascendancy_id".to_string(),
        JsonValue::from(tree.header.ascendancy_id),
    );
    obj.insert(
        "nodes".to_string(),
        JsonValue::Array(tree.nodes.iter().copied().map(JsonValue::from).collect()),
    );
    obj.insert(
        "keystones".to_string(),
        JsonValue::Array(
            tree.keystones()
                .into_iter()
                .map(|name| JsonValue::String(name.to_string()))
                .collect(),
        ),
    );
    let mut sockets = JsonMap::new();
    for (node, item) in &tree.sockets {
        sockets.insert(node.to_string(), JsonValue::from(*item));
    }
    obj.insert("sockets".to_string(), JsonValue::Object(sockets));
    JsonValue::Object(obj)
}

fn trees_to_json(session: &Session) -> JsonValue {
    let trees = match session.trees() {
        Ok(trees) => trees,
        Err(err) => return error_to_json(&err),
    };
    let active = session.active_tree().ok().flatten();
    JsonValue::Array(
        trees
            .iter()
            .map(|tree| tree_to_json(tree, active.is_some_and(|a| std::ptr::eq(a, tree))))
            .collect(),
    )
}

fn config_to_json(session: &Session) -> JsonValue {
    let config = match session.config() {
        Ok(config) => config,
        Err(err) => return error_to_json(&err),
    };
    match serde_json::to_value(config) {
        Ok(value) => value,
        Err(err) => {
            let mut obj = JsonMap::new();
            obj.insert("error".to_string(), JsonValue::String(err.to_string()));
            JsonValue::Object(obj)
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

pub fn render_summary(session: &Session) -> String {
    let mut out = String::new();
    let info = session.info();

    let class = match &info.ascendancy_name {
        Some(ascendancy) => format!("{} ({ascendancy})", info.class_name),
        None => info.class_name.clone(),
    };
    writeln!(&mut out, "{class}, level {}", info.level).expect("writing to String cannot fail");
    writeln!(
        &mut out,
        "Bandit: {}",
        info.bandit.as_deref().unwrap_or("None")
    )
    .expect("writing to String cannot fail");
    let main_skill = match session.active_ability() {
        Ok(Some(ability)) => ability.name().to_string(),
        Ok(None) => "none".to_string(),
        Err(err) => format!("<{err}>"),
    };
    writeln!(&mut out, "Main skill: {main_skill}").expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "::: Stats :::").expect("writing to String cannot fail");
    match session.stats() {
        Ok(stats) => {
            for (name, value) in stats.present() {
                writeln!(
                    &mut out,
                    "  {name:<width$}{}",
                    format_number(value),
                    width = SUMMARY_LABEL_WIDTH
                )
                .expect("writing to String cannot fail");
            }
        }
        Err(err) => writeln!(&mut out, "  <{err}>").expect("writing to String cannot fail"),
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "::: Skills :::").expect("writing to String cannot fail");
    match session.skill_groups() {
        Ok(groups) => {
            for (index, group) in groups.iter().enumerate() {
                let main = if index + 1 == info.main_socket_group as usize {
                    "*"
                } else {
                    " "
                };
                let label = if group.label.is_empty() {
                    group.slot.as_deref().unwrap_or("-")
                } else {
                    group.label.as_str()
                };
                let names: Vec<String> = group
                    .abilities
                    .iter()
                    .map(|ability| {
                        if ability.enabled() {
                            ability.name().to_string()
                        } else {
                            format!("({})", ability.name())
                        }
                    })
                    .collect();
                let disabled = if group.enabled { "" } else { " [disabled]" };
                writeln!(
                    &mut out,
                    " {main}{:>2}. {label}{disabled}: {}",
                    index + 1,
                    names.join(", ")
                )
                .expect("writing to String cannot fail");
            }
        }
        Err(err) => writeln!(&mut out, "  <{err}>").expect("writing to String cannot fail"),
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "::: Equipment :::").expect("writing to String cannot fail");
    match session.current_slots() {
        Ok(slots) => {
            for (slot, id) in slots {
                let line = match session.item(*id) {
                    Ok(Some(item)) if item.base != item.name => {
                        format!("{} ({} {})", item.name, item.rarity, item.base)
                    }
                    Ok(Some(item)) => format!("{} ({})", item.name, item.rarity),
                    Ok(None) => format!("<item {id} unavailable>"),
                    Err(err) => format!("<{err}>"),
                };
                writeln!(
                    &mut out,
                    "  {:<width$}{line}",
                    slot.raw(),
                    width = SUMMARY_SLOT_WIDTH
                )
                .expect("writing to String cannot fail");
            }
        }
        Err(err) => writeln!(&mut out, "  <{err}>").expect("writing to String cannot fail"),
    }
    if let Ok(entries) = session.items() {
        for entry in entries {
            if let Err(err) = &entry.item {
                let label = entry.id.map_or_else(|| "?".to_string(), |id| id.to_string());
                writeln!(&mut out, "  item {label}: <{err}>")
                    .expect("writing to String cannot fail");
            }
        }
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "::: Passive Tree :::").expect("writing to String cannot fail");
    match session.active_tree() {
        Ok(Some(tree)) => {
            writeln!(
                &mut out,
                "  {}: {} nodes",
                tree.title.as_deref().unwrap_or("Default"),
                tree.nodes.len()
            )
            .expect("writing to String cannot fail");
            let keystones = tree.keystones();
            if !keystones.is_empty() {
                writeln!(&mut out, "  Keystones: {}", keystones.join(", "))
                    .expect("writing to String cannot fail");
            }
        }
        Ok(None) => writeln!(&mut out, "  none").expect("writing to String cannot fail"),
        Err(err) => writeln!(&mut out, "  <{err}>").expect("writing to String cannot fail"),
    }
    writeln!(&mut out).expect("writing to String cannot fail");

    writeln!(&mut out, "::: Config :::").expect("writing to String cannot fail");
    match session.config() {
        Ok(config) => {
            writeln!(
                &mut out,
                "  {:<width$}{}",
                "enemy_level",
                config.enemy_level,
                width = SUMMARY_LABEL_WIDTH
            )
            .expect("writing to String cannot fail");
            if config.enemy_boss != EnemyBoss::None {
                writeln!(
                    &mut out,
                    "  {:<width$}{}",
                    "enemy_boss",
                    config.enemy_boss,
                    width = SUMMARY_LABEL_WIDTH
                )
                .expect("writing to String cannot fail");
            }
        }
        Err(err) => writeln!(&mut out, "  <{err}>").expect("writing to String cannot fail"),
    }

    if !info.notes.is_empty() {
        writeln!(&mut out).expect("writing to String cannot fail");
        writeln!(&mut out, "::: Notes :::").expect("writing to String cannot fail");
        for line in info.notes.lines() {
            writeln!(&mut out, "  {line}").expect("writing to String cannot fail");
        }
    }

    out
}
