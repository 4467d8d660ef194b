//! Request correlation and logging for the hint backend.
//!
//! Each hint gets a [`RequestId`] that names the homework, question,
//! student, time, function and course. The same string keys the exchange
//! log, and later ties thumbs-up/down feedback back to that exchange.

pub mod errors;
pub mod request_id;
pub mod store;

pub use errors::{MalformedIdentifier, RequestLogError, Result};
pub use request_id::{CONSENT_SUFFIX, RequestId, UNKNOWN_QUESTION};
pub use store::{AUTOGRADER_BANNER, LogStore, sanitize_output};
