//! Failure classification for provider calls.
//!
//! Turns whatever went wrong during a provider call into a
//! [`ProviderError`](bulwark_error::ProviderError):
//!
//! - HTTP responses are classified by status code (429 quota, 401/403 auth,
//!   5xx transient, other codes client), with the message and code pulled out
//!   of the JSON body when possible and `Retry-After` honoured for quota errors.
//! - Transport failures (timeouts, refused or reset connections, undecodable
//!   bodies) map to transient or client errors.
//! - Anything unrecognized becomes a client error with the `unknown_error`
//!   code. Classification never fails.
//!
//! ```
//! use bulwark_classify::{ResponseSnapshot, classify};
//! use bulwark_error::ProviderErrorKind;
//!
//! let response = ResponseSnapshot::new(503).with_body("upstream overloaded");
//! let err = classify(response, "openai");
//! assert_eq!(err.kind(), &ProviderErrorKind::Transient);
//! assert_eq!(err.message(), "upstream overloaded");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod classifier;
mod extract;
mod failure;
mod response;
mod retry_after;

pub use classifier::{classify, classify_at, classify_response, classify_transport};
pub use extract::{ErrorDetails, extract_details};
pub use failure::{Failure, TransportFailure, TransportFailureKind};
pub use response::{HttpResponse, ResponseSnapshot};
pub use retry_after::{parse_retry_after, retry_after_from};
