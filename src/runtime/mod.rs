//! Game-side data and the collaborators the interpreter talks to

pub mod collaborators;
pub mod database;
pub mod expr;
pub mod headless;
pub mod state;
pub mod value;
pub mod world;
