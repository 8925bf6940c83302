use crate::vm::dispatch::CommandTable;
use crate::vm::opcode::{code_name, EventCode};
use std::collections::HashSet;

/// Codes that only mark structure and never need a handler
const MARKERS: &[EventCode] = &[
    EventCode::End,
    EventCode::Comment,
    EventCode::Label,
    EventCode::ChoicesEnd,
    EventCode::BranchEnd,
    EventCode::BattleEnd,
];

#[test]
fn test_try_from_round_trip() {
    for code in EventCode::ALL {
        assert_eq!(EventCode::try_from(*code as i32), Ok(*code));
    }
    assert!(EventCode::try_from(9999).is_err());
    assert!(EventCode::try_from(-1).is_err());
}

#[test]
fn test_codes_are_unique() {
    let mut seen = HashSet::new();
    for code in EventCode::ALL {
        assert!(seen.insert(*code as i32), "duplicate code {}", *code as i32);
    }
}

#[test]
fn test_code_name() {
    assert_eq!(code_name(101), "ShowText");
    assert_eq!(code_name(355), "Script");
    assert_eq!(code_name(356), "Unknown(356)");
    assert_eq!(EventCode::ConditionalBranch.to_string(), "ConditionalBranch");
}

#[test]
fn test_block_classification() {
    assert!(EventCode::ConditionalBranch.opens_block());
    assert!(EventCode::WhenCancel.opens_block());
    assert!(!EventCode::ShowText.opens_block());
    assert!(EventCode::TextLine.is_continuation());
    assert!(EventCode::ShopItem.is_continuation());
    assert!(!EventCode::RepeatAbove.is_continuation());
}

#[test]
fn test_every_command_has_handler() {
    let table = CommandTable::global();
    for code in EventCode::ALL {
        if code.is_continuation() || MARKERS.contains(code) {
            continue;
        }
        assert!(table.is_registered(*code as i32), "{} has no handler", code);
    }
    assert!(!table.is_registered(356));
}
