//! Authorization engine for CrewTrack.
//!
//! Every mutation path asks this crate before touching storage. The policy
//! lives in one place — [`authorize`] — instead of being re-derived in each
//! handler: callers gather the relationship facts (who manages the project,
//! who created the task, does the caller hold an assignment), wrap them in
//! an [`Action`], and get a yes/no answer. Evaluation is synchronous, pure,
//! and performs no I/O.

mod action;
mod engine;
mod error;

pub use action::*;
pub use engine::*;
pub use error::*;
