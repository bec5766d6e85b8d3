//! Repository layer — entity-scoped database operations.
//!
//! Each store is keyed by UUID; cross-entity relationships are id references
//! resolved here, never in-memory object graphs.

mod appointment;
mod reaction;
mod reference;
mod user;
mod vaccine;

// Re-export all public items from sub-modules
pub use appointment::*;
pub use reaction::*;
pub use reference::*;
pub use user::*;
pub use vaccine::*;
