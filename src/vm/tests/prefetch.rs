//! Image prefetch scan

use super::{add_var, ins};
use crate::runtime::collaborators::ImageKind;
use crate::runtime::database::{CommonEvent, Database, Tileset};
use crate::runtime::headless::HeadlessHost;
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use crate::vm::prefetch;

fn face(name: &str) -> Instruction {
    ins(
        EventCode::ShowText,
        0,
        vec![name.into(), 0.into(), 0.into(), 2.into()],
    )
}

fn picture(name: &str) -> Instruction {
    ins(EventCode::ShowPicture, 0, vec![1.into(), name.into()])
}

fn call_common(id: i64) -> Instruction {
    ins(EventCode::CommonEvent, 0, vec![id.into()])
}

fn count(
    host: &HeadlessHost,
    kind: ImageKind,
    name: &str,
) -> usize {
    host.images
        .requested
        .iter()
        .filter(|(k, n, _)| *k == kind && n == name)
        .count()
}

#[cfg(test)]
mod scan_tests {
    use super::*;

    #[test]
    fn test_recursive_common_events_scanned_once() {
        let mut database = Database::default();
        database.add_common_event(CommonEvent::new(
            1,
            "self and sibling",
            vec![picture("Star"), call_common(1), call_common(2)],
        ));
        database.add_common_event(CommonEvent::new(
            2,
            "back to first",
            vec![call_common(1), picture("Moon")],
        ));
        let mut host = HeadlessHost::new(database);
        let list = vec![face("Actor1"), picture("Sun"), call_common(1), call_common(99)];

        prefetch::prefetch(&list, &host.database, &mut host.images, 7);

        assert_eq!(host.images.requested.len(), 4);
        assert_eq!(count(&host, ImageKind::Face, "Actor1"), 1);
        assert_eq!(count(&host, ImageKind::Picture, "Sun"), 1);
        assert_eq!(count(&host, ImageKind::Picture, "Star"), 1);
        assert_eq!(count(&host, ImageKind::Picture, "Moon"), 1);
        assert!(host.images.requested.iter().all(|(_, _, id)| *id == 7));
    }

    #[test]
    fn test_empty_names_and_other_kinds() {
        let mut host = HeadlessHost::default();
        host.database.tilesets.insert(
            3,
            Tileset {
                tileset_names: vec!["Outside_A1".to_string(), String::new()],
            },
        );
        let list = vec![
            face(""),
            ins(EventCode::ChangeTileset, 0, vec![3.into()]),
            ins(EventCode::ChangeParallax, 0, vec!["Sky".into()]),
            ins(
                EventCode::ChangeBattleBackground,
                0,
                vec!["Grass".into(), "".into()],
            ),
        ];

        prefetch::prefetch(&list, &host.database, &mut host.images, 1);

        assert_eq!(host.images.requested.len(), 3);
        assert_eq!(count(&host, ImageKind::Tileset, "Outside_A1"), 1);
        assert_eq!(count(&host, ImageKind::Parallax, "Sky"), 1);
        assert_eq!(count(&host, ImageKind::Battleback1, "Grass"), 1);
    }

    #[test]
    fn test_long_program_scanned_to_the_end() {
        let mut host = HeadlessHost::default();
        let mut list: Vec<Instruction> = (0..5_000).map(|_| add_var(0, 1, 1)).collect();
        list.push(picture("Ending"));

        prefetch::prefetch(&list, &host.database, &mut host.images, 2);

        assert_eq!(count(&host, ImageKind::Picture, "Ending"), 1);
    }
}
