use std::path::PathBuf;

use pob_core::core_api::{Engine, EngineOptions, Session, UnknownOptionPolicy};
use pob_render::{FieldSelection, render_json_full, render_json_selected, render_summary};
use serde_json::Value;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture_bytes() -> Vec<u8> {
    std::fs::read(workspace_root().join("tests/fixtures/build.xml"))
        .expect("fixture should be readable")
}

fn session_with(engine: Engine) -> Session {
    engine
        .open_document(fixture_bytes())
        .expect("fixture should parse")
}

fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .expect("json should be an object")
        .keys()
        .map(String::as_str)
        .collect()
}

#[test]
fn full_json_uses_canonical_top_level_order() {
    let session = session_with(Engine::new());
    let value = render_json_full(&session);

    assert_eq!(
        keys(&value),
        vec![
            "class",
            "ascendancy",
            "level",
            "bandit",
            "main_skill",
            "stats",
            "skill_groups",
            "items",
            "item_errors",
            "trees",
            "config",
        ]
    );
    assert_eq!(value["class"], "Witch");
    assert_eq!(value["ascendancy"], "Necromancer");
    assert_eq!(value["level"], 92);
    assert_eq!(value["main_skill"], "Raise Zombie");
}

#[test]
fn selected_json_uses_canonical_subset_order() {
    let session = session_with(Engine::new());
    let fields = FieldSelection {
        config: true,
        items: true,
        main_skill: true,
        ..FieldSelection::default()
    };
    assert!(fields.is_any_selected());
    assert!(!FieldSelection::default().is_any_selected());

    let value = render_json_selected(&session, &fields);
    assert_eq!(
        keys(&value),
        vec!["main_skill", "items", "item_errors", "config"]
    );
}

#[test]
fn items_and_item_errors_are_split() {
    let session = session_with(Engine::new());
    let value = render_json_full(&session);

    let items = value["items"].as_array().expect("items array");
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["name"], "Dusk Cry");
    assert_eq!(items[0]["slots"][0], "Belt");
    assert_eq!(items[0]["influences"][0], "shaper");
    assert_eq!(items[1]["sockets"][0], "R-R-R-R");
    assert_eq!(items[1]["mods"][1], "Cannot be Stunned");

    let errors = value["item_errors"].as_array().expect("error array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["id"], 3);
}

#[test]
fn stats_trees_and_config_render() {
    let session = session_with(Engine::new());
    let value = render_json_full(&session);

    assert_eq!(value["stats"]["life"], 4821);
    assert_eq!(value["stats"]["speed"], 1.85);
    assert!(value["stats"].get("mana").is_none());

    let trees = value["trees"].as_array().expect("tree array");
    assert_eq!(trees[0]["active"], false);
    assert_eq!(trees[1]["active"], true);
    assert_eq!(trees[1]["keystones"][0], "Chaos Inoculation");
    assert_eq!(trees[1]["sockets"]["26725"], 4);

    assert_eq!(value["config"]["enemy_level"], 84);
    assert_eq!(value["config"]["ignite_mode"], "Crit");
}

#[test]
fn failed_section_renders_as_error_note() {
    let session = session_with(Engine::with_options(EngineOptions {
        unknown_options: UnknownOptionPolicy::Reject,
        ..EngineOptions::default()
    }));
    let value = render_json_full(&session);

    let note = value["config"]["error"].as_str().expect("config error note");
    assert!(note.contains("someRetiredOption"));
    assert_eq!(value["class"], "Witch");

    let summary = render_summary(&session);
    assert!(summary.contains("someRetiredOption"));
}

#[test]
fn summary_contains_expected_sections() {
    let session = session_with(Engine::new());
    let rendered = render_summary(&session);

    assert!(rendered.starts_with("Witch (Necromancer), level 92\n"));
    assert!(rendered.contains("Bandit: Alira"));
    assert!(rendered.contains("Main skill: Raise Zombie"));
    assert!(rendered.contains("::: Stats :::"));
    assert!(rendered.contains(" * 2. Helmet"));
    assert!(rendered.contains("(Melee Splash)"));
    assert!(rendered.contains("Dusk Cry (Rare Leather Belt)"));
    assert!(rendered.contains("item 3: <malformed item text"));
    assert!(rendered.contains("Keystones: Chaos Inoculation, Minion Instability"));
    assert!(rendered.contains("::: Notes :::"));
}
