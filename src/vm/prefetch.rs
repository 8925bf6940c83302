//! Image prefetch
//!
//! Before a program starts, scan it for commands that will display images and
//! ask the image service to start loading them. Every instruction is scanned,
//! however long the program. Common events reached through Common Event
//! commands are scanned too, each at most once. Purely advisory: nothing
//! waits on these requests.

use crate::runtime::collaborators::{ImageKind, ImageService};
use crate::runtime::database::Database;
use crate::vm::instructions::Instruction;
use crate::vm::opcode::EventCode;
use std::collections::HashSet;
use tracing::trace;

/// Issue prefetch requests for `program` and the common events it calls
pub fn prefetch(
    program: &[Instruction],
    database: &Database,
    images: &mut dyn ImageService,
    reservation_id: u64,
) {
    let mut visited = HashSet::new();
    scan(program, database, images, reservation_id, &mut visited);
}

fn scan(
    program: &[Instruction],
    database: &Database,
    images: &mut dyn ImageService,
    reservation_id: u64,
    visited: &mut HashSet<u32>,
) {
    for ins in program {
        let Some(code) = ins.event_code() else {
            continue;
        };
        let mut request = |kind: ImageKind, name: &str| {
            if !name.is_empty() {
                trace!("prefetch {:?} '{}'", kind, name);
                images.request(kind, name, reservation_id);
            }
        };
        match code {
            EventCode::ShowText => request(ImageKind::Face, ins.str(0)),
            EventCode::ShowPicture => request(ImageKind::Picture, ins.str(1)),
            EventCode::ChangeActorImages => {
                request(ImageKind::Character, ins.str(1));
                request(ImageKind::Face, ins.str(3));
                request(ImageKind::Battler, ins.str(5));
            }
            EventCode::ChangeVehicleImage => request(ImageKind::Character, ins.str(1)),
            EventCode::ChangeTileset => {
                if let Some(tileset) = database.tileset(ins.int(0)) {
                    for name in &tileset.tileset_names {
                        request(ImageKind::Tileset, name);
                    }
                }
            }
            EventCode::ChangeBattleBackground => {
                request(ImageKind::Battleback1, ins.str(0));
                request(ImageKind::Battleback2, ins.str(1));
            }
            EventCode::ChangeParallax => request(ImageKind::Parallax, ins.str(0)),
            EventCode::CommonEvent => {
                if let Some(event) = database.common_event(ins.int(0)) {
                    if visited.insert(event.id) {
                        scan(&event.list, database, images, reservation_id, visited);
                    }
                }
            }
            _ => {}
        }
    }
}
