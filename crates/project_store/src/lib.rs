//! Project and task storage for CrewTrack.
//!
//! This crate provides the storage abstraction behind the server: users,
//! projects, tasks, the assignment ledger, and comments. The store is also
//! where the cross-entity rules live — team membership is derived from
//! assignments rather than stored, a task's status rolls up from its
//! assignments' statuses, and every multi-record mutation commits
//! all-or-nothing.

mod error;
mod memory;
mod store;

pub use error::*;
pub use memory::*;
pub use store::*;
