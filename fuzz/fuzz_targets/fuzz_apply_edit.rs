//! Fuzz target for the edit formatter.
//!
//! Arbitrary edits on arbitrary field text must never panic, and accepted
//! edits must respect the field's length limit.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use card_entry::{apply_edit, CardBrand, Edit, FieldKind};

#[derive(Debug, Arbitrary)]
struct Input {
    field: u8,
    brand: u8,
    current: String,
    start: usize,
    end: usize,
    replacement: String,
}

fuzz_target!(|input: Input| {
    let kind = FieldKind::ALL[input.field as usize % FieldKind::ALL.len()];
    let brand = [
        CardBrand::Visa,
        CardBrand::MasterCard,
        CardBrand::Amex,
        CardBrand::Discover,
        CardBrand::Unknown,
    ][input.brand as usize % 5];

    let edit = Edit::new(input.start..input.end, input.replacement);
    if let Ok(text) = apply_edit(kind, &input.current, &edit, brand) {
        let limit = match kind {
            FieldKind::Number => card_entry::detect::detect(&text).number_max_len(),
            _ => kind.max_len(brand),
        };
        assert!(text.chars().count() <= limit, "accepted text over the limit");
    }
});
