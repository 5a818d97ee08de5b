use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder};

use crate::api::types::{NotePayload, DATE_FORMAT};
use crate::error::{Result, ScrblError};

/// Pushes saved day documents to the sync server.
#[derive(Clone)]
pub struct SyncClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SyncClient {
    /// Returns `None` when no server is configured, which disables sync.
    pub fn new(server_url: &str, api_key: &str) -> Option<Self> {
        let server_url = server_url.trim();
        if server_url.is_empty() {
            return None;
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());
        Some(Self {
            client,
            base_url: server_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn note_url(&self, date: NaiveDate) -> String {
        format!("{}/api/notes/{}", self.base_url, date.format(DATE_FORMAT))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        if self.api_key.is_empty() {
            req
        } else {
            req.bearer_auth(&self.api_key)
        }
    }

    pub async fn push_note(&self, date: NaiveDate, content: &str) -> Result<()> {
        let payload = NotePayload::new(date, content);
        let resp = self
            .authorize(self.client.put(self.note_url(date)))
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(ScrblError::Api { status, message });
        }

        Ok(())
    }
}
