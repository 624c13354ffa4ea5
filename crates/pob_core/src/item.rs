use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::affix::{self, IMPLICITS_MARKER, VariantSelection};
use crate::core_api::{Error, Result};
use crate::rarity::Rarity;

const RARITY_PREFIX: &str = "Rarity: ";
const UNIQUE_ID_PREFIX: &str = "Unique ID: ";
const SHAPER_MARKER: &str = "Shaper Item";
const ELDER_MARKER: &str = "Elder Item";
const CRAFTED_MARKER: &str = "Crafted: true";
const QUALITY_PREFIX: &str = "Quality: ";
const SOCKETS_PREFIX: &str = "Sockets: ";
const LEVEL_REQ_PREFIX: &str = "LevelReq: ";
const ITEM_LEVEL_PREFIXES: [&str; 2] = ["Item Level: ", "ItemLvl: "];

// Lines that can follow the name; when one sits where the base would be, the
// item has a single name line.
const HEADER_PREFIXES: [&str; 10] = [
    UNIQUE_ID_PREFIX,
    SHAPER_MARKER,
    ELDER_MARKER,
    "Crafted: ",
    QUALITY_PREFIX,
    SOCKETS_PREFIX,
    LEVEL_REQ_PREFIX,
    "Item Level: ",
    "ItemLvl: ",
    IMPLICITS_MARKER,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub rarity: Rarity,
    pub name: String,
    pub base: String,
    pub unique_id: Option<String>,
    pub shaper: bool,
    pub elder: bool,
    pub crafted: bool,
    pub quality: Option<u32>,
    pub sockets: Option<Vec<Vec<String>>>,
    pub level_req: u32,
    pub item_level: u32,
    pub implicit: Option<u32>,
    pub text: String,
}

impl Item {
    /// Parse an item text block and resolve its affix lines.
    pub fn parse(
        text: &str,
        selection: &VariantSelection,
        range_fractions: &[f64],
    ) -> Result<Self> {
        let lines: Vec<&str> = text
            .trim()
            .lines()
            .map(str::trim)
            .collect();

        let rarity_raw = lines
            .first()
            .and_then(|line| line.strip_prefix(RARITY_PREFIX))
            .ok_or_else(|| Error::malformed_item("first line is not \"Rarity: \""))?;
        let rarity = Rarity::from_raw(rarity_raw)
            .ok_or_else(|| Error::malformed_item(format!("unknown rarity {rarity_raw:?}")))?;
        let name = lines
            .get(1)
            .filter(|line| !line.is_empty())
            .ok_or_else(|| Error::malformed_item("item has no name line"))?
            .to_string();
        let base = match lines.get(2) {
            Some(line) if !HEADER_PREFIXES.iter().any(|p| line.starts_with(p)) => {
                line.to_string()
            }
            _ => name.clone(),
        };

        let header_end = lines
            .iter()
            .position(|line| line.starts_with(IMPLICITS_MARKER))
            .map_or(lines.len(), |i| i + 1);
        let header = &lines[..header_end];

        let sockets = header_value(header, SOCKETS_PREFIX).map(parse_sockets);
        let item_level = match ITEM_LEVEL_PREFIXES
            .iter()
            .find_map(|prefix| header_value(header, prefix))
        {
            Some(raw) => parse_number(raw, "item level")?,
            None => 1,
        };

        Ok(Self {
            rarity,
            name,
            base,
            unique_id: header_value(header, UNIQUE_ID_PREFIX).map(str::to_string),
            shaper: header.contains(&SHAPER_MARKER),
            elder: header.contains(&ELDER_MARKER),
            crafted: header.contains(&CRAFTED_MARKER),
            quality: header_value(header, QUALITY_PREFIX)
                .map(|raw| parse_number(raw, "quality"))
                .transpose()?,
            sockets,
            level_req: header_value(header, LEVEL_REQ_PREFIX)
                .map(|raw| parse_number(raw, "level requirement"))
                .transpose()?
                .unwrap_or(1),
            item_level,
            implicit: header_value(header, IMPLICITS_MARKER)
                .map(|raw| parse_number(raw, "implicit count"))
                .transpose()?,
            text: affix::reconstruct_with(&lines, selection, range_fractions)?,
        })
    }
}

fn header_value<'a>(header: &[&'a str], prefix: &str) -> Option<&'a str> {
    header
        .iter()
        .find_map(|line| line.strip_prefix(prefix))
        .map(str::trim)
}

fn parse_number<T: FromStr>(raw: &str, what: &str) -> Result<T> {
    // Quality is sometimes exported as "+20%".
    raw.trim_start_matches('+')
        .trim_end_matches('%')
        .parse()
        .map_err(|_| Error::malformed_item(format!("{what} {raw:?} is not a number")))
}

fn parse_sockets(raw: &str) -> Vec<Vec<String>> {
    raw.split_whitespace()
        .map(|group| group.split('-').map(str::to_string).collect())
        .collect()
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RARITY_PREFIX}{}", self.rarity.raw())?;
        writeln!(f, "{}", self.name)?;
        if self.base != self.name {
            writeln!(f, "{}", self.base)?;
        }
        if let Some(id) = &self.unique_id {
            writeln!(f, "{UNIQUE_ID_PREFIX}{id}")?;
        }
        if self.shaper {
            writeln!(f, "{SHAPER_MARKER}")?;
        }
        if self.elder {
            writeln!(f, "{ELDER_MARKER}")?;
        }
        if self.crafted {
            writeln!(f, "{CRAFTED_MARKER}")?;
        }
        if let Some(quality) = self.quality {
            writeln!(f, "{QUALITY_PREFIX}{quality}")?;
        }
        if let Some(sockets) = &self.sockets {
            let groups: Vec<String> = sockets.iter().map(|group| group.join("-")).collect();
            writeln!(f, "{SOCKETS_PREFIX}{}", groups.join(" "))?;
        }
        writeln!(f, "{LEVEL_REQ_PREFIX}{}", self.level_req)?;
        writeln!(f, "{}{}", ITEM_LEVEL_PREFIXES[0], self.item_level)?;
        if let Some(implicit) = self.implicit {
            writeln!(f, "{IMPLICITS_MARKER}{implicit}")?;
        }
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_api::ErrorCode;

    const BELT: &str = "
\t\t\tRarity: RARE
\t\t\tDusk Cry
\t\t\tLeather Belt
\t\t\tUnique ID: 4f2a9c
\t\t\tShaper Item
\t\t\tQuality: 20
\t\t\tLevelReq: 48
\t\t\tItem Level: 84
\t\t\tImplicits: 1
\t\t\t{range:0.5}+(25-40) to maximum Life
\t\t\t{range:0.5}+(30-40)% to Cold Resistance
\t\t";

    #[test]
    fn parses_header_fields() {
        let item = Item::parse(BELT, &VariantSelection::default(), &[0.0, 0.5])
            .expect("belt should parse");

        assert_eq!(item.rarity, Rarity::Rare);
        assert_eq!(item.name, "Dusk Cry");
        assert_eq!(item.base, "Leather Belt");
        assert_eq!(item.unique_id.as_deref(), Some("4f2a9c"));
        assert!(item.shaper);
        assert!(!item.elder);
        assert!(!item.crafted);
        assert_eq!(item.quality, Some(20));
        assert_eq!(item.sockets, None);
        assert_eq!(item.level_req, 48);
        assert_eq!(item.item_level, 84);
        assert_eq!(item.implicit, Some(1));
        assert_eq!(
            item.text,
            "+25 to maximum Life\n+35% to Cold Resistance"
        );
    }

    #[test]
    fn single_name_line_uses_name_as_base() {
        let text = "Rarity: NORMAL\nCoral Ring\nSockets: R-G-B B\nImplicits: 1\n+(20-30) to maximum Life";
        let item = Item::parse(text, &VariantSelection::default(), &[])
            .expect("ring should parse");

        assert_eq!(item.base, "Coral Ring");
        assert_eq!(
            item.sockets,
            Some(vec![
                vec!["R".to_string(), "G".to_string(), "B".to_string()],
                vec!["B".to_string()],
            ])
        );
        assert_eq!(item.level_req, 1);
        assert_eq!(item.item_level, 1);
        assert_eq!(item.quality, None);
        assert_eq!(item.text, "+(20-30) to maximum Life");
    }

    #[test]
    fn display_round_trips_the_header() {
        let item = Item::parse(BELT, &VariantSelection::default(), &[0.0, 0.5])
            .expect("belt should parse");
        let reparsed = Item::parse(&item.to_string(), &VariantSelection::default(), &[])
            .expect("rendered item should parse");

        assert_eq!(reparsed, item);
    }

    #[test]
    fn unknown_rarity_is_rejected() {
        let err = Item::parse("Rarity: LEGENDARY\nX\nImplicits: 0", &VariantSelection::default(), &[])
            .expect_err("rarity should be rejected");
        assert_eq!(err.code(), ErrorCode::MalformedItemText);
    }
}
