use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::error::ProfileApiError;
use super::provider::ProfileProvider;
use crate::config::AppConfig;
use crate::domain::models::{CastMetadata, ContentRef, Profile};
use crate::utils::logging;

/// Provider limit on ids per bulk request
const BULK_CHUNK_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ApiUser {
    fid: u64,
    username: String,
    display_name: Option<String>,
    pfp_url: Option<String>,
    #[serde(default)]
    follower_count: u64,
}

#[derive(Debug, Deserialize)]
struct BulkUsersResponse {
    #[serde(default)]
    users: Vec<ApiUser>,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    user: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiCastAuthor {
    fid: u64,
}

#[derive(Debug, Deserialize)]
struct ApiEmbed {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiCast {
    hash: String,
    #[serde(default)]
    text: String,
    author: Option<ApiCastAuthor>,
    #[serde(default)]
    embeds: Vec<ApiEmbed>,
}

#[derive(Debug, Deserialize)]
struct CastsResult {
    #[serde(default)]
    casts: Vec<ApiCast>,
}

#[derive(Debug, Deserialize)]
struct CastsResponse {
    result: CastsResult,
}

impl From<ApiUser> for Profile {
    fn from(user: ApiUser) -> Self {
        Profile {
            fid: user.fid,
            username: user.username,
            display_name: user.display_name,
            pfp_url: user.pfp_url,
            follower_count: user.follower_count,
        }
    }
}

/// HTTP client for the profile enrichment provider
pub struct ProfileApiClient {
    client: Client,
    api_url: String,
    api_key: String,
}

impl ProfileApiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ProfileApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ProfileApiError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(ProfileApiClient {
            client,
            api_url: config.profile_api.url.trim_end_matches('/').to_string(),
            api_key: config.profile_api.api_key.clone(),
        })
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Response, ProfileApiError> {
        let url = format!("{}/{}", self.api_url, path);
        let response = self
            .client
            .get(&url)
            .header("accept", "application/json")
            .header("x-api-key", &self.api_key)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ProfileApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    logging::log_warning(&format!("⚠️  Profile API returned {}: {}", status, message));
    Err(ProfileApiError::ApiError {
        status: status.as_u16(),
        message,
    })
}

fn parse_bulk_users(body: &str) -> Result<Vec<Profile>, ProfileApiError> {
    let parsed: BulkUsersResponse = serde_json::from_str(body)?;
    Ok(parsed.users.into_iter().map(Profile::from).collect())
}

fn parse_user(body: &str) -> Result<Profile, ProfileApiError> {
    let parsed: UserResponse = serde_json::from_str(body)?;
    Ok(parsed.user.into())
}

fn parse_casts(body: &str) -> Result<Vec<CastMetadata>, ProfileApiError> {
    let parsed: CastsResponse = serde_json::from_str(body)?;
    Ok(parsed
        .result
        .casts
        .into_iter()
        .map(|cast| CastMetadata {
            hash: ContentRef::normalize(&cast.hash)
                .map(|r| r.to_string())
                .unwrap_or_else(|_| cast.hash.to_lowercase()),
            author_fid: cast.author.map(|a| a.fid),
            text: cast.text,
            embed_urls: cast.embeds.into_iter().filter_map(|e| e.url).collect(),
        })
        .collect())
}

#[async_trait]
impl ProfileProvider for ProfileApiClient {
    async fn profiles_by_fid(&self, fids: &[u64]) -> Result<HashMap<u64, Profile>, ProfileApiError> {
        let mut profiles = HashMap::new();
        for chunk in fids.chunks(BULK_CHUNK_SIZE) {
            let ids = chunk
                .iter()
                .map(|fid| fid.to_string())
                .collect::<Vec<_>>()
                .join(",");
            let response = ensure_success(self.get("user/bulk", &[("fids", ids)]).await?).await?;
            let body = response.text().await?;
            for profile in parse_bulk_users(&body)? {
                profiles.insert(profile.fid, profile);
            }
        }
        Ok(profiles)
    }

    async fn fid_for_username(&self, username: &str) -> Result<Option<u64>, ProfileApiError> {
        let response = self
            .get("user/by_username", &[("username", username.to_string())])
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = ensure_success(response).await?.text().await?;
        Ok(Some(parse_user(&body)?.fid))
    }

    async fn cast_metadata(
        &self,
        hashes: &[ContentRef],
    ) -> Result<HashMap<String, CastMetadata>, ProfileApiError> {
        let mut casts = HashMap::new();
        for chunk in hashes.chunks(BULK_CHUNK_SIZE) {
            let ids = chunk
                .iter()
                .map(|hash| hash.as_str())
                .collect::<Vec<_>>()
                .join(",");
            let response = ensure_success(self.get("casts", &[("casts", ids)]).await?).await?;
            let body = response.text().await?;
            for cast in parse_casts(&body)? {
                casts.insert(cast.hash.clone(), cast);
            }
        }
        Ok(casts)
    }
}
