use pob_core::ErrorCode;
use pob_core::affix::{reconstruct, resolve_range, round_half_down};
use proptest::prelude::*;

fn block(affixes: &[&str]) -> Vec<String> {
    ["Rarity: RARE", "Storm Spiral", "Two-Stone Ring", "Implicits: 1"]
        .iter()
        .chain(affixes)
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn variant_membership_selects_lines() {
    let lines = block(&["{variant:1,3}+(10-20) to Strength"]);
    assert_eq!(reconstruct(&lines, "2", None, &[]).expect("reconstruct"), "");
    assert_eq!(
        reconstruct(&lines, "3", None, &[]).expect("reconstruct"),
        "+(10-20) to Strength"
    );
}

#[test]
fn double_range_lines_use_two_fractions() {
    let lines = block(&["Adds (10-20) to (30-40) Cold Damage {range:0.5}{range:0.5}"]);
    assert_eq!(
        reconstruct(&lines, "", None, &[0.5, 0.5]).expect("reconstruct"),
        "Adds 15 to 35 Cold Damage"
    );
}

#[test]
fn lines_without_tags_pass_through() {
    let lines = block(&["+12% to all Elemental Resistances", "Corrupted"]);
    assert_eq!(
        reconstruct(&lines, "", None, &[]).expect("reconstruct"),
        "+12% to all Elemental Resistances\nCorrupted"
    );
}

#[test]
fn fractions_are_consumed_across_the_block() {
    let lines = block(&[
        "{range:0.1}+(10-19) to Strength",
        "Corrupted",
        "{range:0.9}+(10-19) to Dexterity",
    ]);
    assert_eq!(
        reconstruct(&lines, "", None, &[0.0, 0.95]).expect("reconstruct"),
        "+10 to Strength\nCorrupted\n+19 to Dexterity"
    );
}

#[test]
fn negative_ranges_resolve() {
    let lines = block(&["{range:0.5}(-20--10)% reduced Mana Cost of Skills"]);
    assert_eq!(
        reconstruct(&lines, "", None, &[0.0]).expect("reconstruct"),
        "-20% reduced Mana Cost of Skills"
    );
}

#[test]
fn out_of_range_fraction_is_rejected() {
    let lines = block(&["{range:0.5}+(10-20) to Strength"]);
    let err = reconstruct(&lines, "", None, &[1.5]).expect_err("fraction above one");
    assert_eq!(err.code(), ErrorCode::MalformedItemText);
}

#[test]
fn identical_inputs_give_identical_output() {
    let lines = block(&["{range:0.3}+(10-20) to Strength", "{variant:1}Corrupted"]);
    let first = reconstruct(&lines, "1", None, &[0.3]).expect("reconstruct");
    let second = reconstruct(&lines, "1", None, &[0.3]).expect("reconstruct");
    assert_eq!(first, second);
}

proptest! {
    #[test]
    fn resolved_value_stays_in_range(
        start in -500i32..500,
        width in 0i32..500,
        fraction in 0.0f64..1.0,
    ) {
        let (start, stop) = (f64::from(start), f64::from(start + width));
        let value = resolve_range(start, stop, fraction).expect("fraction is valid");
        prop_assert!(value >= start && value <= stop);
        prop_assert_eq!(value.fract(), 0.0);
    }

    #[test]
    fn zero_fraction_yields_the_lower_bound(start in -500i32..500, width in 0i32..500) {
        let (start, stop) = (f64::from(start), f64::from(start + width));
        prop_assert_eq!(resolve_range(start, stop, 0.0).expect("valid"), start);
    }

    #[test]
    fn half_down_never_rounds_a_tie_up(n in -10_000i32..10_000) {
        let tie = f64::from(n) + 0.5;
        prop_assert_eq!(round_half_down(tie), f64::from(n));
    }
}
