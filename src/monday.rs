//! Async HTTP client for the board GraphQL API.
//!
//! Pure transport: fetches one board's columns and items and hands the raw
//! envelope to [`crate::ingestion`]. All interpretation, including the
//! error envelope, stays in the core so fetch failures surface as terminal
//! answers rather than faults. Transient transport errors are retried with
//! a short backoff before giving up.

use crate::error::Result;
use crate::schema::BoardResponse;
use log::warn;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

const MONDAY_URL: &str = "https://api.monday.com/v2";
const MAX_ATTEMPTS: u32 = 3;

/// Delay before retry `attempt` (0-based): 1s, then 2s.
fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt)
}

#[derive(Clone)]
pub struct MondayClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl MondayClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: MONDAY_URL.to_string(),
        }
    }

    /// Points the client at a different endpoint, for tests or proxies.
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Fetches one board's column metadata and first 500 items, retrying
    /// transient transport failures up to [`MAX_ATTEMPTS`] times.
    pub async fn fetch_board(&self, board_id: &str) -> Result<BoardResponse> {
        let query = format!(
            "query {{\n\
             \x20 boards(ids: {board_id}) {{\n\
             \x20   id\n\
             \x20   name\n\
             \x20   columns {{ id title type }}\n\
             \x20   items_page(limit: 500) {{\n\
             \x20     items {{ id name column_values {{ id text value }} }}\n\
             \x20   }}\n\
             \x20 }}\n\
             }}"
        );
        let body = json!({ "query": query });

        let mut attempt = 0;
        loop {
            let sent = self
                .client
                .post(&self.base_url)
                .header("Authorization", &self.api_key)
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match sent {
                Ok(response) => return Ok(response.json::<BoardResponse>().await?),
                Err(err) if attempt + 1 < MAX_ATTEMPTS => {
                    warn!(
                        "Board fetch attempt {} failed ({}); retrying",
                        attempt + 1,
                        err
                    );
                    sleep(backoff_delay(attempt)).await;
                    attempt += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}
