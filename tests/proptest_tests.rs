//! Property-based tests using proptest.
//!
//! These check the formatting and validation invariants over arbitrary
//! keystroke sequences and edits.

use card_entry::{
    apply_edit, detect::detect, format::group_number, luhn, validate_at, CardBrand,
    CardEntryController, Edit, FieldKind, Validity, Verdict, YearMonth,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Generates a random digit string of a length within range.
fn digit_string(range: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::char::range('0', '9'), range)
        .prop_map(|chars| chars.into_iter().collect())
}

/// A number field display text, as the formatter would produce it.
fn number_display() -> impl Strategy<Value = String> {
    digit_string(0..=16).prop_map(|digits| group_number(&digits, detect(&digits)))
}

/// A number display text plus an in-bounds edit on it.
fn number_edit() -> impl Strategy<Value = (String, Edit)> {
    number_display().prop_flat_map(|text| {
        let len = text.chars().count();
        (0..=len)
            .prop_flat_map(move |start| (Just(start), start..=len))
            .prop_flat_map(move |(start, end)| {
                let text = text.clone();
                proptest::collection::vec(
                    prop_oneof![4 => prop::char::range('0', '9'), 1 => Just(' ')],
                    0..6,
                )
                .prop_map(move |chars| {
                    let replacement: String = chars.into_iter().collect();
                    (text.clone(), Edit::new(start..end, replacement))
                })
            })
    })
}

fn type_out(kind: FieldKind, input: &str, brand: CardBrand) -> Vec<Result<String, String>> {
    let mut text = String::new();
    input
        .chars()
        .map(|c| match apply_edit(kind, &text, &Edit::append(&text, c), brand) {
            Ok(next) => {
                text = next;
                Ok(text.clone())
            }
            Err(e) => Err(e.to_string()),
        })
        .collect()
}

fn oct_2026() -> YearMonth {
    YearMonth::new(2026, 10).unwrap()
}

// =============================================================================
// GROUPING PROPERTIES
// =============================================================================

proptest! {
    /// Property: Typing a Visa number yields 4-4-4-4 groups and stops at 16 digits.
    #[test]
    fn visa_typing_groups_by_four(rest in digit_string(0..=20)) {
        let input = format!("4{}", rest);
        for (i, step) in type_out(FieldKind::Number, &input, CardBrand::Unknown).iter().enumerate() {
            if i < 16 {
                let text = step.as_ref().unwrap();
                let groups: Vec<usize> = text.split(' ').map(str::len).collect();
                prop_assert!(groups.iter().all(|&g| g <= 4 && g > 0), "{}", text);
                prop_assert!(groups[..groups.len() - 1].iter().all(|&g| g == 4), "{}", text);
            } else {
                prop_assert!(step.is_err());
            }
        }
    }

    /// Property: Typing an Amex number yields 4-6-5 groups and stops at 15 digits.
    #[test]
    fn amex_typing_groups_4_6_5(second in prop_oneof![Just('4'), Just('7')], rest in digit_string(14..=16)) {
        let input = format!("3{}{}", second, rest);
        let steps = type_out(FieldKind::Number, &input, CardBrand::Unknown);
        let full = steps[14].as_ref().unwrap();
        let groups: Vec<usize> = full.split(' ').map(str::len).collect();
        prop_assert_eq!(groups, vec![4, 6, 5]);
        prop_assert!(steps[15].is_err());
    }

    /// Property: Accepted number edits never exceed the brand maximum and are
    /// always in canonical form.
    #[test]
    fn number_edits_stay_canonical((text, edit) in number_edit()) {
        if let Ok(result) = apply_edit(FieldKind::Number, &text, &edit, detect(&text)) {
            let brand = detect(&result);
            prop_assert!(result.chars().count() <= brand.number_max_len());
            prop_assert!(result.chars().all(|c| c.is_ascii_digit() || c == ' '));
            prop_assert!(!result.ends_with(' '));
            prop_assert_eq!(group_number(&result, brand), result);
        }
    }

    /// Property: Backspace on a non-empty number removes exactly one digit.
    #[test]
    fn backspace_removes_one_digit(text in number_display()) {
        prop_assume!(!text.is_empty());
        let result = apply_edit(FieldKind::Number, &text, &Edit::backspace(&text), detect(&text)).unwrap();
        let before = text.chars().filter(char::is_ascii_digit).count();
        let after = result.chars().filter(char::is_ascii_digit).count();
        prop_assert_eq!(after + 1, before);
    }

    /// Property: Deleting any single character removes exactly one digit.
    #[test]
    fn single_char_delete_removes_one_digit(text in number_display(), at in any::<prop::sample::Index>()) {
        prop_assume!(!text.is_empty());
        let pos = at.index(text.chars().count());
        let result = apply_edit(FieldKind::Number, &text, &Edit::delete(pos..pos + 1), detect(&text)).unwrap();
        let before = text.chars().filter(char::is_ascii_digit).count();
        let after = result.chars().filter(char::is_ascii_digit).count();
        prop_assert_eq!(after + 1, before);
    }

    /// Property: Expiry typing never produces anything but `D`, `DD`, `DD/D`, `DD/DD`.
    #[test]
    fn expiry_shape(input in digit_string(0..=8)) {
        for step in type_out(FieldKind::Expiry, &input, CardBrand::Unknown).into_iter().flatten() {
            prop_assert!(step.len() <= 5);
            if step.len() > 2 {
                prop_assert_eq!(&step[2..3], "/");
            } else {
                prop_assert!(step.chars().all(|c| c.is_ascii_digit()));
            }
        }
    }
}

// =============================================================================
// BRAND DETECTION PROPERTIES
// =============================================================================

proptest! {
    /// Property: Numbers starting with 4 are always Visa.
    #[test]
    fn leading_four_is_visa(rest in digit_string(0..=15)) {
        prop_assert_eq!(detect(&format!("4{}", rest)), CardBrand::Visa);
    }

    /// Property: 51-55 prefixes are MasterCard.
    #[test]
    fn mastercard_prefix(second in 1u8..=5, rest in digit_string(0..=14)) {
        prop_assert_eq!(detect(&format!("5{}{}", second, rest)), CardBrand::MasterCard);
    }

    /// Property: The 2221-2720 range is MasterCard.
    #[test]
    fn mastercard_2_series(prefix in 2221u32..=2720, rest in digit_string(0..=12)) {
        prop_assert_eq!(detect(&format!("{}{}", prefix, rest)), CardBrand::MasterCard);
    }

    /// Property: Detection ignores separators.
    #[test]
    fn detection_ignores_spaces(digits in digit_string(0..=16)) {
        let grouped = group_number(&digits, CardBrand::Visa);
        prop_assert_eq!(detect(&grouped), detect(&digits));
    }
}

// =============================================================================
// VALIDATION PROPERTIES
// =============================================================================

proptest! {
    /// Property: Appending the Luhn check digit makes a valid 16-digit Visa.
    #[test]
    fn check_digit_makes_valid_number(rest in digit_string(14..=14)) {
        let partial: Vec<u8> = format!("4{}", rest).bytes().map(|b| b - b'0').collect();
        let check = luhn::check_digit(&partial);
        let number = format!("4{}{}", rest, check);
        prop_assert!(luhn::validate_str(&number));
        prop_assert!(validate_at(FieldKind::Number, &number, CardBrand::Visa, oct_2026()).is_valid());
    }

    /// Property: Changing one digit breaks the checksum.
    #[test]
    fn single_digit_change_fails_luhn(rest in digit_string(14..=14), pos in 1usize..15, delta in 1u8..=9) {
        let partial: Vec<u8> = format!("4{}", rest).bytes().map(|b| b - b'0').collect();
        let mut digits = partial.clone();
        digits.push(luhn::check_digit(&partial));
        digits[pos] = (digits[pos] + delta) % 10;
        prop_assert!(!luhn::validate(&digits));
    }

    /// Property: Short numbers are never Invalid on length alone.
    #[test]
    fn short_numbers_are_incomplete(rest in digit_string(0..=14)) {
        let number = format!("4{}", rest);
        prop_assert_eq!(
            validate_at(FieldKind::Number, &number, CardBrand::Visa, oct_2026()),
            Verdict::Incomplete
        );
    }

    /// Property: Validation never panics on arbitrary text.
    #[test]
    fn validate_never_panics(text in ".{0,24}") {
        for kind in FieldKind::ALL {
            for brand in [CardBrand::Visa, CardBrand::Amex, CardBrand::Unknown] {
                let _ = validate_at(kind, &text, brand, oct_2026());
            }
        }
    }

    /// Property: Every month from now on is a valid expiry; every earlier one is not.
    #[test]
    fn expiry_against_today(month in 1u8..=12, yy in 0u16..=99) {
        let text = format!("{:02}/{:02}", month, yy);
        let today = oct_2026();
        let year = if yy > 76 { 1900 + yy } else { 2000 + yy };
        let expired = (year, month) < (today.year(), today.month());
        let verdict = validate_at(FieldKind::Expiry, &text, CardBrand::Unknown, today);
        prop_assert_eq!(verdict.is_invalid(), expired, "{}", text);
    }
}

// =============================================================================
// CONTROLLER PROPERTIES
// =============================================================================

proptest! {
    /// Property: The controller's number field always matches the pure formatter.
    #[test]
    fn controller_matches_formatter(input in digit_string(0..=20)) {
        let mut entry = CardEntryController::builder().reference_date(oct_2026()).build();
        let mut expected = String::new();
        for c in input.chars() {
            let edit = Edit::append(&expected, c);
            let pure = apply_edit(FieldKind::Number, &expected, &edit, detect(&expected));
            let shown = entry.on_edit(FieldKind::Number, &edit).map(str::to_string);
            prop_assert_eq!(&shown, &pure);
            if let Ok(text) = pure {
                expected = text;
            }
        }
        prop_assert_eq!(entry.display_text(FieldKind::Number), expected.as_str());
    }

    /// Property: The card is complete only when every field is valid.
    #[test]
    fn complete_iff_all_fields_valid(
        number in digit_string(0..=16),
        expiry in digit_string(0..=4),
        cvc in digit_string(0..=3),
        postal in "[0-9A-Z]{0,5}",
    ) {
        let mut entry = CardEntryController::builder().reference_date(oct_2026()).build();
        for (kind, text) in [
            (FieldKind::Number, &number),
            (FieldKind::Expiry, &expiry),
            (FieldKind::Cvc, &cvc),
            (FieldKind::PostalCode, &postal),
        ] {
            for c in text.chars() {
                let edit = Edit::append(entry.display_text(kind), c);
                let _ = entry.on_edit(kind, &edit);
            }
        }
        let all_valid = FieldKind::ALL
            .iter()
            .all(|&kind| entry.field(kind).validity() == Validity::Valid);
        prop_assert_eq!(entry.is_complete(), all_valid);
        prop_assert_eq!(entry.params().is_complete(), all_valid);
    }
}
