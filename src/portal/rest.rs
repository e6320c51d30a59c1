//! REST backend client.
//!
//! Talks to a PostgREST-style endpoint (`/rest/v1/<table>`) with column
//! filters written as `column=eq.value`.

use std::time::Duration;

use anyhow::{bail, Context};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::backend::PortalBackend;
use super::models::{Advertisement, NewVideoView, Video, VideoHistoryEntry, VideoPermission};

/// Request timeout for backend calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Longest body snippet quoted in error messages.
const ERROR_SNIPPET_LEN: usize = 200;

/// Portal backend over HTTP.
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Deserialize)]
struct EmbeddedVideo {
    video: Option<Video>,
}

#[derive(Deserialize)]
struct EmbeddedAdvertisement {
    advertisement: Option<Advertisement>,
}

#[derive(Serialize)]
struct NewPermission<'a> {
    video_id: &'a str,
    client_id: &'a str,
}

impl RestBackend {
    /// Creates a client for `base_url` (e.g. `https://project.example.co`).
    pub fn new(base_url: &str, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn request(&self, method: reqwest::Method, table: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, self.table_url(table))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn select<R: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<Vec<R>> {
        debug!(table, "Backend select");
        let response = self
            .request(reqwest::Method::GET, table)
            .query(query)
            .send()
            .await
            .with_context(|| format!("request to {table} failed"))?;
        let response = check_status(response, table).await?;
        response
            .json()
            .await
            .with_context(|| format!("failed to decode {table} rows"))
    }

    async fn insert<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        table: &str,
        body: &B,
    ) -> anyhow::Result<R> {
        debug!(table, "Backend insert");
        let response = self
            .request(reqwest::Method::POST, table)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await
            .with_context(|| format!("insert into {table} failed"))?;
        let response = check_status(response, table).await?;
        let mut rows: Vec<R> = response
            .json()
            .await
            .with_context(|| format!("failed to decode inserted {table} row"))?;
        if rows.is_empty() {
            bail!("insert into {table} returned no rows");
        }
        Ok(rows.swap_remove(0))
    }
}

async fn check_status(response: reqwest::Response, table: &str) -> anyhow::Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    let snippet: String = body.chars().take(ERROR_SNIPPET_LEN).collect();
    bail!("{table} returned HTTP {status}: {snippet}")
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl PortalBackend for RestBackend {
    async fn client_videos(&self, client_id: &str) -> anyhow::Result<Vec<Video>> {
        let rows: Vec<EmbeddedVideo> = self
            .select(
                "video_permissions",
                &[
                    ("select", "video:videos(*)".to_string()),
                    ("client_id", eq(client_id)),
                ],
            )
            .await?;
        Ok(rows.into_iter().filter_map(|row| row.video).collect())
    }

    async fn video_history(&self, client_id: &str) -> anyhow::Result<Vec<VideoHistoryEntry>> {
        self.select(
            "video_history",
            &[
                ("client_id", eq(client_id)),
                ("order", "watched_at.desc".to_string()),
            ],
        )
        .await
    }

    async fn video_permissions(&self, video_id: &str) -> anyhow::Result<Vec<VideoPermission>> {
        self.select("video_permissions", &[("video_id", eq(video_id))])
            .await
    }

    async fn client_advertisements(&self, client_id: &str) -> anyhow::Result<Vec<Advertisement>> {
        let rows: Vec<EmbeddedAdvertisement> = self
            .select(
                "advertisement_assignments",
                &[
                    ("select", "advertisement:advertisements(*)".to_string()),
                    ("client_id", eq(client_id)),
                ],
            )
            .await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| row.advertisement)
            .filter(|ad| ad.active)
            .collect())
    }

    async fn grant_video_permission(
        &self,
        video_id: &str,
        client_id: &str,
    ) -> anyhow::Result<VideoPermission> {
        self.insert(
            "video_permissions",
            &NewPermission {
                video_id,
                client_id,
            },
        )
        .await
    }

    async fn revoke_video_permission(&self, video_id: &str, client_id: &str) -> anyhow::Result<()> {
        let response = self
            .request(reqwest::Method::DELETE, "video_permissions")
            .query(&[("video_id", eq(video_id)), ("client_id", eq(client_id))])
            .send()
            .await
            .context("delete from video_permissions failed")?;
        check_status(response, "video_permissions").await?;
        Ok(())
    }

    async fn record_video_view(&self, view: &NewVideoView) -> anyhow::Result<VideoHistoryEntry> {
        self.insert("video_history", view).await
    }
}
