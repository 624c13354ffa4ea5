use std::collections::BTreeMap;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::affix::VariantSelection;
use crate::config::Config;
use crate::document::{Document, Element};
use crate::item::Item;
use crate::passive_tree;
use crate::slot::ItemSlot;
use crate::stats::Stats;
use crate::transport;

use super::error::{Error, Result};
use super::types::{
    Ability, BuildInfo, EngineOptions, GemAbility, GrantedAbility, ItemEntry, ItemSet,
    PassiveTreeSpec, SkillGroup,
};

const ROOT_ELEMENT: &str = "PathOfBuilding";
const NO_ACTIVE_SKILL: &str = "nil";
const SUPPORT_GEM_MARKER: &str = "Support";

#[derive(Debug, Default, Clone, Copy)]
pub struct Engine {
    options: EngineOptions,
}

/// One decoded build. Sections are mapped on first access and cached.
#[derive(Debug)]
pub struct Session {
    options: EngineOptions,
    source: Vec<u8>,
    document: Document,
    info: BuildInfo,
    stats: OnceCell<Stats>,
    skill_groups: OnceCell<Vec<SkillGroup>>,
    items: OnceCell<Vec<ItemEntry>>,
    item_sets: OnceCell<Vec<ItemSet>>,
    current_slots: OnceCell<BTreeMap<ItemSlot, u32>>,
    trees: OnceCell<Vec<PassiveTreeSpec>>,
    config: OnceCell<Config>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Open an export code as copied from the planner.
    pub fn open_code(&self, code: &str) -> Result<Session> {
        let document = transport::decode_build_code(code)?;
        self.open_document(document)
    }

    /// Fetch an export code from a paste URL, then open it.
    pub fn open_url(&self, url: &str) -> Result<Session> {
        let code = transport::fetch_build_code(url, self.options.fetch_timeout)?;
        self.open_code(&code)
    }

    /// Open the XML document an export code carries.
    pub fn open_document<B: Into<Vec<u8>>>(&self, bytes: B) -> Result<Session> {
        let source = bytes.into();
        let document = Document::parse(&source)?;

        let root = document.root();
        if root.name() != ROOT_ELEMENT {
            return Err(Error::malformed_document(format!(
                "root element is <{}>, expected <{ROOT_ELEMENT}>",
                root.name()
            )));
        }
        let info = read_build_info(root)?;
        debug!(
            class = %info.class_name,
            level = info.level,
            encoding = document.encoding(),
            "opened build"
        );

        Ok(Session {
            options: self.options,
            source,
            document,
            info,
            stats: OnceCell::new(),
            skill_groups: OnceCell::new(),
            items: OnceCell::new(),
            item_sets: OnceCell::new(),
            current_slots: OnceCell::new(),
            trees: OnceCell::new(),
            config: OnceCell::new(),
        })
    }
}

impl Session {
    pub fn info(&self) -> &BuildInfo {
        &self.info
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn stats(&self) -> Result<&Stats> {
        self.stats
            .get_or_try_init(|| Stats::from_element(self.root().require_child("Build")?))
    }

    pub fn skill_groups(&self) -> Result<&[SkillGroup]> {
        self.skill_groups
            .get_or_try_init(|| {
                let groups = match self.root().child("Skills") {
                    Some(skills) => skills
                        .children("Skill")
                        .map(read_skill_group)
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                debug!(groups = groups.len(), "mapped skill groups");
                Ok(groups)
            })
            .map(Vec::as_slice)
    }

    /// The group selected as the build's main socket group, if it exists.
    pub fn active_skill_group(&self) -> Result<Option<&SkillGroup>> {
        let index = self.info.main_socket_group.checked_sub(1);
        let groups = self.skill_groups()?;
        Ok(index.and_then(|i| groups.get(i as usize)))
    }

    pub fn active_ability(&self) -> Result<Option<&Ability>> {
        Ok(self
            .active_skill_group()?
            .and_then(SkillGroup::active_ability))
    }

    /// Every ability of every group, in document order.
    pub fn abilities(&self) -> Result<Vec<&Ability>> {
        Ok(self
            .skill_groups()?
            .iter()
            .flat_map(|group| group.abilities.iter())
            .collect())
    }

    pub fn ability_names(&self) -> Result<Vec<&str>> {
        Ok(self.abilities()?.into_iter().map(Ability::name).collect())
    }

    pub fn items(&self) -> Result<&[ItemEntry]> {
        self.items
            .get_or_try_init(|| {
                let items = self.root().require_child("Items")?;
                let mut entries = Vec::new();
                for element in items.children("Item") {
                    let (id, item) = match element.require_parsed_attr::<u32>("id") {
                        Ok(id) => (Some(id), read_item(element)),
                        Err(e) => (None, Err(e)),
                    };
                    if let Err(e) = &item {
                        warn!(item = ?id, error = %e, "item could not be reconstructed");
                    }
                    entries.push(ItemEntry { id, item });
                }
                debug!(items = entries.len(), "mapped items");
                Ok(entries)
            })
            .map(Vec::as_slice)
    }

    /// A successfully reconstructed item by id.
    pub fn item(&self, id: u32) -> Result<Option<&Item>> {
        Ok(self
            .items()?
            .iter()
            .find(|entry| entry.id == Some(id))
            .and_then(ItemEntry::ok))
    }

    pub fn item_sets(&self) -> Result<&[ItemSet]> {
        self.item_sets
            .get_or_try_init(|| {
                self.root()
                    .require_child("Items")?
                    .children("ItemSet")
                    .map(|set| -> Result<ItemSet> {
                        Ok(ItemSet {
                            id: set.require_parsed_attr("id")?,
                            title: set.attr("title").map(str::to_string),
                            slots: read_slots(set)?,
                        })
                    })
                    .collect()
            })
            .map(Vec::as_slice)
    }

    pub fn active_item_set(&self) -> Result<Option<&ItemSet>> {
        let active: u32 = self
            .root()
            .require_child("Items")?
            .parse_attr("activeItemSet")?
            .unwrap_or(1);
        Ok(self.item_sets()?.iter().find(|set| set.id == active))
    }

    /// The slots listed directly under `<Items>`: what is equipped right now.
    pub fn current_slots(&self) -> Result<&BTreeMap<ItemSlot, u32>> {
        self.current_slots
            .get_or_try_init(|| read_slots(self.root().require_child("Items")?))
    }

    pub fn trees(&self) -> Result<&[PassiveTreeSpec]> {
        self.trees
            .get_or_try_init(|| {
                let trees = match self.root().child("Tree") {
                    Some(tree) => tree
                        .children("Spec")
                        .map(read_tree_spec)
                        .collect::<Result<Vec<_>>>()?,
                    None => Vec::new(),
                };
                debug!(trees = trees.len(), "mapped passive trees");
                Ok(trees)
            })
            .map(Vec::as_slice)
    }

    pub fn active_tree(&self) -> Result<Option<&PassiveTreeSpec>> {
        let active: u32 = match self.root().child("Tree") {
            Some(tree) => tree.parse_attr("activeSpec")?.unwrap_or(1),
            None => 1,
        };
        let trees = self.trees()?;
        Ok(active
            .checked_sub(1)
            .and_then(|index| trees.get(index as usize)))
    }

    pub fn config(&self) -> Result<&Config> {
        self.config.get_or_try_init(|| {
            Config::from_element(
                self.root().child("Config"),
                self.info.level,
                self.options.unknown_options,
            )
        })
    }

    /// The XML document exactly as it was opened.
    pub fn to_document_bytes(&self) -> &[u8] {
        &self.source
    }

    pub fn to_build_code(&self) -> Result<String> {
        transport::encode_build_code(&self.source)
    }

    fn root(&self) -> &Element {
        self.document.root()
    }
}

fn read_build_info(root: &Element) -> Result<BuildInfo> {
    let build = root.require_child("Build")?;
    // The planner writes "None" for an unset ascendancy or bandit.
    let named = |key: &str| {
        build
            .attr(key)
            .filter(|value| !value.is_empty() && *value != "None")
            .map(str::to_string)
    };

    Ok(BuildInfo {
        class_name: build.require_attr("className")?.to_string(),
        ascendancy_name: named("ascendClassName"),
        level: build.require_parsed_attr("level")?,
        bandit: named("bandit"),
        target_version: build.attr("targetVersion").map(str::to_string),
        main_socket_group: build.parse_attr("mainSocketGroup")?.unwrap_or(1),
        notes: root
            .child("Notes")
            .map(|notes| notes.text_trimmed().to_string())
            .unwrap_or_default(),
        second_weapon_set: root
            .child("Items")
            .is_some_and(|items| items.bool_attr("useSecondWeaponSet")),
    })
}

fn read_skill_group(skill: &Element) -> Result<SkillGroup> {
    let abilities = skill
        .children("Gem")
        .map(read_ability)
        .collect::<Result<Vec<_>>>()?;

    let active = match skill.attr("mainActiveSkill") {
        None | Some("") | Some(NO_ACTIVE_SKILL) => None,
        Some(_) => skill.parse_attr::<u32>("mainActiveSkill")?,
    };
    if let Some(index) = active
        && (index == 0 || index as usize > abilities.len())
    {
        return Err(Error::malformed_document(format!(
            "skill group main ability {index} is outside its {} abilities",
            abilities.len()
        )));
    }

    Ok(SkillGroup {
        enabled: skill.bool_attr("enabled"),
        label: skill.attr("label").unwrap_or_default().to_string(),
        slot: skill.attr("slot").map(str::to_string),
        active,
        abilities,
    })
}

fn read_ability(gem: &Element) -> Result<Ability> {
    let name = gem
        .attr("nameSpec")
        .filter(|name| !name.is_empty())
        .or_else(|| gem.attr("skillId"))
        .unwrap_or_default()
        .to_string();
    let enabled = gem.bool_attr("enabled");
    let level = gem.parse_attr("level")?.unwrap_or(1);

    Ok(match gem.attr("gemId").filter(|id| !id.is_empty()) {
        Some(gem_id) => Ability::Gem(GemAbility {
            name,
            enabled,
            level,
            quality: gem.parse_attr("quality")?.unwrap_or(0),
            support: gem_id.contains(SUPPORT_GEM_MARKER),
        }),
        None => Ability::Granted(GrantedAbility {
            name,
            enabled,
            level,
        }),
    })
}

fn read_item(element: &Element) -> Result<Item> {
    let selection = VariantSelection::parse(element.attr("variant"), element.attr("variantAlt"))?;
    let fractions = element
        .children("ModRange")
        .map(|range| range.require_parsed_attr::<f64>("range"))
        .collect::<Result<Vec<_>>>()?;
    Item::parse(element.text(), &selection, &fractions)
}

fn read_slots(parent: &Element) -> Result<BTreeMap<ItemSlot, u32>> {
    let mut slots = BTreeMap::new();
    for slot in parent.children("Slot") {
        let name = slot.require_attr("name")?;
        let item_id: u32 = slot.require_parsed_attr("itemId")?;
        let Some(known) = ItemSlot::from_raw(name) else {
            debug!(slot = name, "skipping unknown item slot");
            continue;
        };
        if item_id != 0 {
            slots.insert(known, item_id);
        }
    }
    Ok(slots)
}

fn read_tree_spec(spec: &Element) -> Result<PassiveTreeSpec> {
    let url = spec.require_child("URL")?.text_trimmed().to_string();
    let tree = passive_tree::decode_tree(&url)?;
    // Older exports put <Socket> directly under <Spec>, newer ones wrap them.
    let sockets = spec
        .descendants("Socket")
        .into_iter()
        .map(|socket| -> Result<(u16, u32)> {
            Ok((
                socket.require_parsed_attr::<u16>("nodeId")?,
                socket.require_parsed_attr::<u32>("itemId")?,
            ))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    Ok(PassiveTreeSpec {
        title: spec.attr("title").map(str::to_string),
        url,
        header: tree.header,
        nodes: tree.nodes,
        sockets,
    })
}
