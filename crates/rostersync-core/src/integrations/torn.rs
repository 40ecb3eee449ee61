//! Torn API roster source.
//!
//! `GET {base}/faction/{id}?selections=&key=...` returns the faction with a
//! `members` object keyed by member id. The API reports some failures with
//! HTTP 200 and an `error` object in the body; code 5 is its rate limit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use url::Url;

use crate::error::{ConfigError, CoreError, FetchError};
use crate::integrations::traits::RosterSource;
use crate::roster::{FactionId, MemberId, MemberState, MemberStatus, Roster};

const USER_AGENT: &str = "rostersync";
const API_RATE_LIMIT_CODE: i64 = 5;

#[derive(Debug, Deserialize)]
struct FactionResponse {
    #[serde(default)]
    members: Option<HashMap<String, MemberRecord>>,
    #[serde(default)]
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    #[serde(default)]
    error: String,
}

#[derive(Debug, Deserialize)]
struct MemberRecord {
    #[serde(default)]
    name: Option<String>,
    status: StatusRecord,
}

#[derive(Debug, Deserialize)]
struct StatusRecord {
    state: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    until: Option<i64>,
}

pub struct TornClient {
    http: Client,
    base: Url,
    api_key: String,
}

impl TornClient {
    /// Build a client for `base_url` (normally `https://api.torn.com`).
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, CoreError> {
        let mut base = Url::parse(base_url).map_err(|e| ConfigError::InvalidValue {
            key: "api.base_url".to_string(),
            message: e.to_string(),
        })?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CoreError::Custom(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base,
            api_key: api_key.to_string(),
        })
    }

    fn faction_url(&self, faction_id: &FactionId) -> Result<Url, FetchError> {
        self.base
            .join(&format!("faction/{}", faction_id.as_str()))
            .map_err(|e| FetchError::Malformed(format!("bad faction url: {e}")))
    }

    /// Fetch and parse the faction roster.
    pub async fn fetch(&self, faction_id: &FactionId) -> Result<Roster, FetchError> {
        let url = self.faction_url(faction_id)?;
        let resp = self
            .http
            .get(url)
            .query(&[("selections", ""), ("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(FetchError::RateLimited);
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await?;
        parse_roster(&body)
    }
}

#[async_trait]
impl RosterSource for TornClient {
    async fn fetch_roster(&self, faction_id: &FactionId) -> Result<Roster, FetchError> {
        self.fetch(faction_id).await
    }
}

/// Parse a faction response body into a roster.
pub fn parse_roster(body: &str) -> Result<Roster, FetchError> {
    let parsed: FactionResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    if let Some(err) = parsed.error {
        if err.code == API_RATE_LIMIT_CODE {
            return Err(FetchError::RateLimited);
        }
        return Err(FetchError::Api {
            code: err.code,
            message: err.error,
        });
    }

    let members = parsed
        .members
        .ok_or_else(|| FetchError::Malformed("response has no members object".to_string()))?;

    Ok(members
        .into_iter()
        .map(|(id, record)| {
            let member_id = MemberId::new(id);
            let state = MemberState::from(record.status.state.as_str());
            // the API reports "no deadline" as 0
            let until = record
                .status
                .until
                .filter(|&u| u > 0 && state.has_deadline());
            let mut status = MemberStatus::new(member_id.clone(), state)
                .with_description(record.status.description);
            if let Some(name) = record.name {
                status = status.with_name(name);
            }
            if let Some(until) = until {
                status = status.with_until(until);
            }
            (member_id, status)
        })
        .collect())
}
