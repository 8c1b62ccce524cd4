//! Fuzz target for the controller.
//!
//! Replays arbitrary edit sequences; the card must be complete exactly when
//! every field is valid.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use card_entry::{CardEntryController, Edit, FieldKind, Validity, YearMonth};

#[derive(Debug, Arbitrary)]
enum Action {
    Type { field: u8, text: String },
    Delete { field: u8, start: u8, end: u8 },
    Complete { field: u8 },
    Clear { field: u8 },
    Reset,
}

fn field(index: u8) -> FieldKind {
    FieldKind::ALL[index as usize % FieldKind::ALL.len()]
}

fuzz_target!(|actions: Vec<Action>| {
    let Some(today) = YearMonth::new(2026, 10) else {
        return;
    };
    let mut entry = CardEntryController::builder().reference_date(today).build();

    for action in actions {
        match action {
            Action::Type { field: f, text } => {
                let kind = field(f);
                let edit = Edit::append(entry.display_text(kind), text);
                let _ = entry.on_edit(kind, &edit);
            }
            Action::Delete { field: f, start, end } => {
                let _ = entry.on_edit(field(f), &Edit::delete(start as usize..end as usize));
            }
            Action::Complete { field: f } => {
                entry.on_edit_complete(field(f));
            }
            Action::Clear { field: f } => {
                let _ = entry.clear_field(field(f));
            }
            Action::Reset => entry.reset(),
        }

        let all_valid = FieldKind::ALL
            .iter()
            .all(|&kind| entry.field(kind).validity() == Validity::Valid);
        assert_eq!(entry.is_complete(), all_valid);
    }
});
