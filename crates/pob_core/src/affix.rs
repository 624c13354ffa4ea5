//! Affix line reconstruction for item text blocks.
//!
//! Affix lines carry inline `{...}` tags. `{variant:1,3}` restricts a line to
//! the listed item variants; `{range:...}` marks a line whose parenthesised
//! `(A-B)` ranges are rebuilt from the stored roll fractions. The fraction
//! counter runs across the whole block, so a range line hidden by its variant
//! tag still uses up its fractions.

use tracing::trace;

use crate::core_api::{Error, Result};

pub const IMPLICITS_MARKER: &str = "Implicits: ";
const DOUBLE_RANGE_MARKER: &str = "Adds (";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VariantSelection {
    pub variant: Option<u32>,
    pub alt_variant: Option<u32>,
}

impl VariantSelection {
    /// Empty strings count as "no variant selected".
    pub fn parse(variant: Option<&str>, alt_variant: Option<&str>) -> Result<Self> {
        Ok(Self {
            variant: parse_variant_id(variant)?,
            alt_variant: parse_variant_id(alt_variant)?,
        })
    }

    pub fn selects(&self, ids: &[u32]) -> bool {
        [self.variant, self.alt_variant]
            .into_iter()
            .flatten()
            .any(|id| ids.contains(&id))
    }
}

fn parse_variant_id(raw: Option<&str>) -> Result<Option<u32>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| Error::malformed_item(format!("variant {raw:?} is not an integer"))),
    }
}

/// Resolve the affix lines that follow the `Implicits: ` header line.
pub fn reconstruct<S: AsRef<str>>(
    lines: &[S],
    variant: &str,
    alt_variant: Option<&str>,
    range_fractions: &[f64],
) -> Result<String> {
    let selection = VariantSelection::parse(Some(variant), alt_variant)?;
    reconstruct_with(lines, &selection, range_fractions)
}

pub fn reconstruct_with<S: AsRef<str>>(
    lines: &[S],
    selection: &VariantSelection,
    range_fractions: &[f64],
) -> Result<String> {
    let marker = lines
        .iter()
        .position(|line| line.as_ref().trim_start().starts_with(IMPLICITS_MARKER))
        .ok_or_else(|| Error::malformed_item("missing \"Implicits: \" line"))?;

    let mut counter = 0usize;
    let mut out = Vec::with_capacity(lines.len() - marker - 1);

    for raw in &lines[marker + 1..] {
        let line = TaggedLine::parse(raw.as_ref())?;
        let kept = line.variants.iter().all(|ids| selection.selects(ids));
        let ranges = if line.has_range_tag {
            range_spans(&line.text)
        } else {
            Vec::new()
        };

        if !kept {
            trace!(line = raw.as_ref(), skipped_ranges = ranges.len(), "dropped by variant");
            counter += ranges.len();
            continue;
        }

        let mut text = line.text;
        let mut replacements = Vec::with_capacity(ranges.len());
        for span in ranges {
            let fraction = *range_fractions.get(counter).ok_or_else(|| {
                Error::malformed_item(format!(
                    "range #{} has no stored fraction ({} available)",
                    counter + 1,
                    range_fractions.len()
                ))
            })?;
            counter += 1;

            let (start, stop) = parse_range(&text[span.start + 1..span.end - 1])?;
            replacements.push((span, format_value(resolve_range(start, stop, fraction)?)));
        }
        for (span, value) in replacements.into_iter().rev() {
            text.replace_range(span, &value);
        }

        trace!(line = %text, "resolved affix");
        out.push(text);
    }

    Ok(out.join("\n"))
}

struct TaggedLine {
    variants: Vec<Vec<u32>>,
    has_range_tag: bool,
    text: String,
}

impl TaggedLine {
    fn parse(raw: &str) -> Result<Self> {
        let mut variants = Vec::new();
        let mut has_range_tag = false;
        let mut text = String::with_capacity(raw.len());
        let mut rest = raw;

        while let Some(open) = rest.find('{') {
            let Some(close) = rest[open..].find('}').map(|i| open + i) else {
                break;
            };
            text.push_str(&rest[..open]);
            let tag = &rest[open + 1..close];
            match tag.split_once(':') {
                Some(("variant", ids)) => variants.push(parse_variant_list(ids)?),
                Some(("range", _)) => has_range_tag = true,
                _ => {}
            }
            rest = &rest[close + 1..];
        }
        text.push_str(rest);

        Ok(Self {
            variants,
            has_range_tag,
            text: text.trim().to_string(),
        })
    }
}

fn parse_variant_list(ids: &str) -> Result<Vec<u32>> {
    ids.split(',')
        .map(|id| {
            id.trim()
                .parse()
                .map_err(|_| Error::malformed_item(format!("bad variant list {{variant:{ids}}}")))
        })
        .collect()
}

/// Byte spans (parentheses included) of the ranges a range line consumes:
/// first and last group on `Adds (` lines, the first group otherwise.
fn range_spans(text: &str) -> Vec<std::ops::Range<usize>> {
    let mut groups = Vec::new();
    let mut from = 0;
    while let Some(open) = text[from..].find('(').map(|i| from + i) {
        let Some(close) = text[open..].find(')').map(|i| open + i) else {
            break;
        };
        groups.push(open..close + 1);
        from = close + 1;
    }

    if text.contains(DOUBLE_RANGE_MARKER) && groups.len() >= 2 {
        let last = groups.len() - 1;
        vec![groups[0].clone(), groups[last].clone()]
    } else {
        groups.into_iter().take(1).collect()
    }
}

fn parse_range(inner: &str) -> Result<(f64, f64)> {
    let bad = || Error::malformed_item(format!("range ({inner}) is not two numbers"));
    let inner = inner.trim();
    // Skip a leading sign so "-10--5" splits after the first number.
    let dash = inner
        .get(1..)
        .and_then(|tail| tail.find('-'))
        .map(|i| i + 1)
        .ok_or_else(bad)?;

    let start: f64 = inner[..dash].trim().parse().map_err(|_| bad())?;
    let stop: f64 = inner[dash + 1..].trim().parse().map_err(|_| bad())?;
    if !start.is_finite() || !stop.is_finite() {
        return Err(bad());
    }
    Ok((start, stop))
}

/// `start + round_half_down((stop - start + 1) * fraction)`, kept inside the range.
pub fn resolve_range(start: f64, stop: f64, fraction: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&fraction) {
        return Err(Error::malformed_item(format!(
            "range fraction {fraction} is outside [0, 1]"
        )));
    }
    let width = stop - start + 1.0;
    let offset = round_half_down(width * fraction).min((stop - start).max(0.0));
    Ok(start + offset)
}

/// Round to the nearest integer, breaking exact ties toward the lower one.
pub fn round_half_down(x: f64) -> f64 {
    let floor = x.floor();
    if x - floor > 0.5 { floor + 1.0 } else { floor }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
