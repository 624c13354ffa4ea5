use std::fs;
use std::path::PathBuf;

use pob_core::core_api::{
    Ability, Engine, EngineOptions, ErrorCode, Session, UnknownOptionPolicy,
};
use pob_core::config::EnemyBoss;
use pob_core::rarity::Rarity;
use pob_core::slot::ItemSlot;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture(name: &str) -> Vec<u8> {
    let path = workspace_root().join("tests/fixtures").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("failed to read {path:?}: {e}"))
}

fn open_fixture() -> Session {
    Engine::new()
        .open_document(fixture("build.xml"))
        .expect("fixture build should open")
}

#[test]
fn open_code_matches_open_document() {
    let code = String::from_utf8(fixture("build_code.txt")).expect("code is ascii");
    let from_code = Engine::new().open_code(&code).expect("fixture code should open");
    let from_xml = open_fixture();

    assert_eq!(from_code.to_document_bytes(), from_xml.to_document_bytes());
    assert_eq!(from_code.info(), from_xml.info());
}

#[test]
fn build_info_reads_the_build_element() {
    let session = open_fixture();
    let info = session.info();

    assert_eq!(info.class_name, "Witch");
    assert_eq!(info.ascendancy_name.as_deref(), Some("Necromancer"));
    assert_eq!(info.level, 92);
    assert_eq!(info.bandit.as_deref(), Some("Alira"));
    assert_eq!(info.target_version.as_deref(), Some("3_0"));
    assert_eq!(info.main_socket_group, 2);
    assert_eq!(info.notes, "Zombies & auras. Swap the belt for a Stygian at 85.");
    assert!(!info.second_weapon_set);
}

#[test]
fn stats_skip_unknown_names() {
    let session = open_fixture();
    let stats = session.stats().expect("stats");

    assert_eq!(stats.average_hit, Some(1523.4));
    assert_eq!(stats.speed, Some(1.85));
    assert_eq!(stats.life, Some(4821.0));
    assert_eq!(stats.life_increased, Some(187.0));
    assert_eq!(stats.chaos_resistance, Some(-30.0));
    assert_eq!(stats.mana, None);
    assert_eq!(stats.present().len(), 10);
}

#[test]
fn skill_groups_and_active_ability() {
    let session = open_fixture();
    let groups = session.skill_groups().expect("skill groups");
    assert_eq!(groups.len(), 3);

    assert_eq!(groups[0].label, "Auras");
    assert_eq!(groups[0].slot.as_deref(), Some("Body Armour"));
    assert!(groups[0].abilities[1].is_support());
    assert!(!groups[2].enabled);
    assert_eq!(groups[2].active, None);
    assert!(matches!(groups[2].abilities[0], Ability::Granted(_)));

    let active = session
        .active_skill_group()
        .expect("active group")
        .expect("main socket group exists");
    assert_eq!(active.slot.as_deref(), Some("Helmet"));
    let ability = session
        .active_ability()
        .expect("active ability")
        .expect("group has a main ability");
    assert_eq!(ability.name(), "Raise Zombie");
    assert_eq!(ability.level(), 21);

    assert_eq!(
        session.ability_names().expect("names"),
        vec![
            "Hatred",
            "Generosity",
            "Raise Zombie",
            "Minion Damage",
            "Melee Splash",
            "SummonSkeletons",
        ]
    );
    let disabled: Vec<_> = session
        .abilities()
        .expect("abilities")
        .into_iter()
        .filter(|a| !a.enabled())
        .map(|a| a.name())
        .collect();
    assert_eq!(disabled, vec!["Melee Splash"]);
}

#[test]
fn items_are_reconstructed_independently() {
    let session = open_fixture();
    let items = session.items().expect("items");
    assert_eq!(items.len(), 4);

    let belt = session.item(1).expect("items").expect("belt");
    assert_eq!(belt.rarity, Rarity::Rare);
    assert_eq!(belt.name, "Dusk Cry");
    assert_eq!(belt.base, "Leather Belt");
    assert_eq!(belt.quality, Some(20));
    assert!(belt.shaper);
    assert_eq!(
        belt.text,
        "+25 to maximum Life\n+35% to Cold Resistance\nAdds 15 to 35 Cold Damage to Attacks"
    );

    let boots = session.item(2).expect("items").expect("boots");
    assert_eq!(boots.rarity, Rarity::Unique);
    assert_eq!(boots.sockets, Some(vec![vec!["R".to_string(); 4]]));
    assert_eq!(
        boots.text,
        "+200 to maximum Life\nCannot be Stunned\nCannot be Knocked Back"
    );

    let ring = &items[2];
    assert_eq!(ring.id, Some(3));
    let err = ring.item.as_ref().expect_err("ring has no implicits line");
    assert_eq!(err.code(), ErrorCode::MalformedItemText);
    assert!(session.item(3).expect("items").is_none());

    let jewel = session.item(4).expect("items").expect("jewel");
    assert_eq!(jewel.base, "Cobalt Jewel");
    assert_eq!(jewel.text, "15% increased Spell Damage");
}

#[test]
fn item_sets_and_current_slots() {
    let session = open_fixture();

    let current = session.current_slots().expect("slots");
    assert_eq!(current.len(), 3);
    assert_eq!(current.get(&ItemSlot::Ring1), Some(&3));
    assert_eq!(current.get(&ItemSlot::Weapon1), None);

    let sets = session.item_sets().expect("item sets");
    assert_eq!(sets.len(), 2);
    assert_eq!(sets[1].title.as_deref(), Some("Swap"));

    let active = session
        .active_item_set()
        .expect("active set")
        .expect("set 1 exists");
    assert_eq!(active.id, 1);
    assert_eq!(active.get(ItemSlot::Boots), Some(2));
    assert_eq!(active.get(ItemSlot::Helmet), None);
}

#[test]
fn trees_decode_their_share_links() {
    let session = open_fixture();
    let trees = session.trees().expect("trees");
    assert_eq!(trees.len(), 2);
    assert_eq!(trees[0].nodes, vec![50459, 47175, 56075]);
    assert!(trees[0].sockets.is_empty());

    let active = session.active_tree().expect("active tree").expect("spec 2");
    assert_eq!(active.title.as_deref(), Some("Endgame"));
    assert_eq!(active.header.version, 4);
    assert_eq!(active.header.class_id, 3);
    assert_eq!(active.header.ascendancy_id, 1);
    assert_eq!(active.nodes, vec![26725, 56075, 48768, 56075]);
    assert_eq!(active.sockets.get(&26725), Some(&4));
    assert_eq!(active.keystones(), vec!["Chaos Inoculation", "Minion Instability"]);
}

#[test]
fn config_applies_inputs_and_level_defaults() {
    let session = open_fixture();
    let config = session.config().expect("config");

    assert!(config.is_stationary);
    assert!(!config.is_moving);
    assert_eq!(config.ignite_mode.as_deref(), Some("Crit"));
    assert_eq!(config.enemy_boss, EnemyBoss::Shaper);
    assert_eq!(config.enemy_number_of_poison_stacks, Some(5));
    assert_eq!(config.enemy_physical_hit_damage, 2500.5);
    assert_eq!(config.enemy_level, 84);
    assert_eq!(config.detonate_dead_corpse_life, 3511);
    assert_eq!(config.resistance_penalty, -60);
}

#[test]
fn strict_config_rejects_unknown_options() {
    let engine = Engine::with_options(EngineOptions {
        unknown_options: UnknownOptionPolicy::Reject,
        ..EngineOptions::default()
    });
    assert_eq!(engine.options().unknown_options, UnknownOptionPolicy::Reject);
    let session = engine
        .open_document(fixture("build.xml"))
        .expect("fixture build should open");
    assert_eq!(session.options(), engine.options());

    let err = session.config().expect_err("unknown option should fail");
    assert_eq!(err.code(), ErrorCode::UnrecognizedOption);
    assert!(err.to_string().contains("someRetiredOption"));
    // Other sections are unaffected.
    assert_eq!(session.items().expect("items").len(), 4);
}

#[test]
fn boolean_boss_flag_is_a_standard_boss() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<PathOfBuilding>
    <Build level="90" className="Witch"/>
    <Config>
        <Input name="enemyIsBoss" boolean="true"/>
    </Config>
</PathOfBuilding>"#;
    let session = Engine::new()
        .open_document(xml.as_bytes())
        .expect("document opens");
    assert_eq!(session.config().expect("config").enemy_boss, EnemyBoss::Standard);
}

#[test]
fn item_without_id_does_not_hide_the_others() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<PathOfBuilding>
    <Build level="90" className="Witch"/>
    <Items>
        <Item id="1">
            Rarity: NORMAL
            Coral Ring
            Implicits: 1
            +(20-30) to maximum Life
        </Item>
        <Item>
            Rarity: NORMAL
            Iron Ring
            Implicits: 0
        </Item>
    </Items>
</PathOfBuilding>"#;
    let session = Engine::new()
        .open_document(xml.as_bytes())
        .expect("document opens");
    assert_eq!(session.document().root().name(), "PathOfBuilding");
    assert_eq!(session.document().encoding(), "UTF-8");

    let items = session.items().expect("items section");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, Some(1));
    assert_eq!(items[0].ok().map(|item| item.base.as_str()), Some("Coral Ring"));
    assert_eq!(items[1].id, None);
    let err = items[1].item.as_ref().expect_err("id-less item is an error");
    assert_eq!(err.code(), ErrorCode::MalformedDocument);
    assert!(session.item(1).expect("items section").is_some());
}

#[test]
fn sections_are_memoised() {
    let session = open_fixture();
    let first = session.items().expect("items").as_ptr();
    let second = session.items().expect("items").as_ptr();
    assert_eq!(first, second);
}

#[test]
fn build_code_round_trips_through_the_session() {
    let session = open_fixture();
    let code = session.to_build_code().expect("encode");
    let reopened = Engine::new().open_code(&code).expect("reencoded code should open");
    assert_eq!(reopened.to_document_bytes(), session.to_document_bytes());
}

#[test]
fn wrong_root_element_is_malformed() {
    let err = Engine::new()
        .open_document(&b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><Build level=\"1\"/>"[..])
        .expect_err("wrong root");
    assert_eq!(err.code(), ErrorCode::MalformedDocument);
}

#[test]
fn missing_build_element_is_malformed() {
    let err = Engine::new()
        .open_document(&b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><PathOfBuilding/>"[..])
        .expect_err("no build element");
    assert_eq!(err.code(), ErrorCode::MalformedDocument);
}

#[test]
fn out_of_range_main_ability_is_malformed() {
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<PathOfBuilding>
    <Build level="10" className="Scion"/>
    <Skills>
        <Skill enabled="true" mainActiveSkill="3">
            <Gem nameSpec="Cleave" gemId="Metadata/Items/Gems/SkillGemCleave" level="1" quality="0" enabled="true"/>
        </Skill>
    </Skills>
</PathOfBuilding>"#;
    let session = Engine::new()
        .open_document(xml.as_bytes())
        .expect("document opens");
    let err = session.skill_groups().expect_err("index 3 of 1");
    assert_eq!(err.code(), ErrorCode::MalformedDocument);
}

#[test]
fn invalid_code_never_opens() {
    let err = Engine::new().open_code("not base64 at all!").expect_err("bad code");
    assert_eq!(err.code(), ErrorCode::Decode);
}

#[test]
fn session_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Session>();
}
