//! Command handlers, grouped by what they act on

mod actor;
mod battle;
mod flow;
mod map;
mod media;
mod message;
mod screen;
mod script;
mod state;
mod system;

use crate::runtime::value::Value;
use crate::vm::dispatch::CommandTable;

/// Install every handler family into `table`
pub(crate) fn register_all(table: &mut CommandTable) {
    flow::register(table);
    message::register(table);
    state::register(table);
    system::register(table);
    map::register(table);
    screen::register(table);
    media::register(table);
    battle::register(table);
    actor::register(table);
    script::register(table);
}

/// Four-component tone or color operand
pub(crate) fn tone(value: &Value) -> [i64; 4] {
    [
        value.get(0).as_int(),
        value.get(1).as_int(),
        value.get(2).as_int(),
        value.get(3).as_int(),
    ]
}
