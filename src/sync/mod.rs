//! Generic record synchronization engine.
//!
//! One design, instantiated per collection:
//! - a fetch-once in-memory cache that never re-requests data it holds
//! - dual persistence: operations route to the remote backend or to the
//!   demo collections in device storage, decided per call by the session's
//!   account type flag
//! - cache mutations applied only after the selected gateway confirms

mod gateway;
mod local;
mod remote;
mod store;
mod traits;

pub use store::{Context, Store};
pub use traits::{merge_record, Entity, IdPolicy, Patch, TimestampId};
