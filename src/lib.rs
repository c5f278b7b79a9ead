//! crmsync: offline-capable record synchronization for a CRM backend.
//!
//! Each CRM collection gets a [`sync::Store`]: a fetch-once in-memory cache
//! whose operations route either to the remote API or to the demo
//! collections in device storage, decided per call by the session's account
//! type flag. The cache mutates only after the selected backend confirms.

pub mod auth;
pub mod config;
pub mod crm;
pub mod session;
pub mod storage;
pub mod sync;
