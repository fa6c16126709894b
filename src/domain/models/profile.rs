use serde::{Deserialize, Serialize};

/// Public profile of a user, as returned by the enrichment provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub fid: u64,
    pub username: String,
    pub display_name: Option<String>,
    pub pfp_url: Option<String>,
    pub follower_count: u64,
}

/// Text and media of the cast an auction is about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMetadata {
    /// Canonical content reference
    pub hash: String,
    pub author_fid: Option<u64>,
    pub text: String,
    pub embed_urls: Vec<String>,
}
