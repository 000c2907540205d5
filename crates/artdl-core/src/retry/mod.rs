//! Failure classification, page-fetch retry, and the image retry ledger.
//!
//! Page fetches are retried in place with a fixed delay. Image downloads are
//! never retried in place: a failed image is recorded in the [`RetryLedger`]
//! and re-attempted exactly once after the first pass completes.

mod classify;
mod error;
mod ledger;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::FetchError;
pub use ledger::{FailedImage, RetryLedger};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
