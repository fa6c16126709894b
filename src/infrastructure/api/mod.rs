pub mod client;
pub mod error;
pub mod provider;

pub use client::ProfileApiClient;
pub use error::ProfileApiError;
pub use provider::{CachedProfileProvider, ProfileProvider};
