//! Storage-shaped entity types. Associations are expressed as id references
//! (join tables in SQLite), never as embedded object graphs.

pub mod enums;

mod appointment;
mod reaction;
mod reference;
mod user;
mod vaccine;

pub use appointment::*;
pub use reaction::*;
pub use reference::*;
pub use user::*;
pub use vaccine::*;
