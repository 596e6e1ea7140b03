//! DeedRail Registry Observer
//!
//! External consumer of the registry's audit log. The core never reads its
//! own log; this crate is the other side of that contract:
//!
//! - [`verifier`] recomputes the hash chain and reports the first break
//! - [`projection`] folds audit events into a complete read model, using
//!   only the fields carried by the entries — if the projection ever
//!   diverges from the live registry, an audit event is under-specified

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod error;
pub mod projection;
pub mod verifier;

pub use error::{ObserverError, Result};
pub use projection::Projection;
pub use verifier::verify_entries;
