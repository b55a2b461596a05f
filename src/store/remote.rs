//! REST client for the hosted record store (Supabase-style API).

use crate::config::RemoteConfig;
use crate::core::error::{Error, Result};
use crate::core::expense::{Expense, ExpenseDraft};
use crate::store::ExpenseStore;
use crate::store::util::with_retry;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const TABLE: &str = "expenses";
const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

pub struct RestStore {
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
}

impl RestStore {
    /// Builds the client with an explicit request timeout so a hung
    /// remote surfaces as a retryable failure instead of suspending the
    /// caller indefinitely.
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("aureus/0.3")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::remote("configure client", e))?;

        Ok(RestStore {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn records_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, TABLE)
    }

    fn with_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header("Authorization", format!("Bearer {key}")),
            None => request,
        }
    }
}

#[async_trait]
impl ExpenseStore for RestStore {
    #[instrument(name = "RemoteInsert", skip_all, fields(title = %draft.title))]
    async fn insert(&self, draft: &ExpenseDraft) -> Result<Expense> {
        let url = self.records_url();
        debug!("Inserting expense at {}", url);

        let response = with_retry(
            || async {
                self.with_auth(self.client.post(&url))
                    .header("Prefer", "return=representation")
                    .json(draft)
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| Error::remote("insert expense", e))?;

        // The store answers with the inserted rows, ids assigned.
        let mut records: Vec<Expense> = response
            .json()
            .await
            .map_err(|e| Error::remote("parse insert response", e))?;
        records
            .pop()
            .ok_or_else(|| Error::remote("insert expense", "empty insert response"))
    }

    #[instrument(name = "RemoteQuery", skip(self))]
    async fn query_all(&self, owner: &str) -> Result<Vec<Expense>> {
        let url = self.records_url();
        debug!("Querying expenses at {}", url);

        let response = with_retry(
            || async {
                self.with_auth(self.client.get(&url))
                    .query(&[
                        ("user_id", format!("eq.{owner}")),
                        ("order", "date.desc".to_string()),
                        ("select", "*".to_string()),
                    ])
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .map_err(|e| Error::remote("query expenses", e))?;

        response
            .json()
            .await
            .map_err(|e| Error::remote("parse query response", e))
    }

    async fn current_user(&self) -> Result<Option<String>> {
        if self.api_key.is_none() {
            return Ok(None);
        }

        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .with_auth(self.client.get(&url))
            .send()
            .await
            .map_err(|e| Error::remote("fetch identity", e))?;

        if !response.status().is_success() {
            debug!(status = %response.status(), "Identity lookup rejected");
            return Ok(None);
        }

        let user: UserResponse = response
            .json()
            .await
            .map_err(|e| Error::remote("parse identity response", e))?;
        Ok(Some(user.id))
    }
}
