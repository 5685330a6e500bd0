// Upstream side of the proxy: credentials, the HTTP seam, and the two
// multi-call patterns (paginated collection and fetch-merge-patch).

pub mod client;
pub mod credential;
pub mod error;
pub mod merge;
pub mod paginate;
pub mod transport;

pub use client::{ApiPath, Call, MailchimpClient};
pub use credential::{subscriber_hash, Credential, CredentialError};
pub use error::UpstreamError;
