//! Basecamp (classic XML API) client used to file time entries.
//!
//! Requests are blocking and issued one at a time; responses are read with a
//! streaming XML parser.

mod client;
mod error;
pub mod xml;

pub use client::BasecampClient;
pub use error::{BasecampError, Result};
