//! Reqwest-backed realtime mirror adapter.
//!
//! Writes each mirrored event as a single row insert or patch against a
//! PostgREST-style table API. One attempt per event; the dispatcher decides
//! what to do with failures. Reads every row back for reconciliation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use super::dto::{AnalysisPatchDto, PollRecordDto, PollRowDto, VoteRecordDto, VoteRowDto};
use crate::domain::ports::{
    MirrorEvent, MirrorSnapshot, MirrorSource, RealtimeMirror, RealtimeMirrorError,
};
use crate::domain::{Poll, PollId, Vote};
use crate::outbound::with_trailing_slash;

const POLL_TABLE: &str = "Poll";
const VOTE_TABLE: &str = "Vote";

/// Realtime mirror that writes rows over HTTP.
pub struct HttpRealtimeMirror {
    client: Client,
    base: Url,
    api_key: String,
}

impl HttpRealtimeMirror {
    /// Build a mirror for the store at `base` with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        base: Url,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
            api_key: api_key.into(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, RealtimeMirrorError> {
        self.base
            .join(&format!("rest/v1/{table}"))
            .map_err(|err| RealtimeMirrorError::transport(format!("invalid mirror url: {err}")))
    }

    fn select_all_url(&self, table: &str) -> Result<Url, RealtimeMirrorError> {
        let mut url = self.table_url(table)?;
        url.query_pairs_mut().append_pair("select", "*");
        Ok(url)
    }

    fn poll_row_url(&self, poll_id: PollId) -> Result<Url, RealtimeMirrorError> {
        let mut url = self.table_url(POLL_TABLE)?;
        url.query_pairs_mut()
            .append_pair("id", &format!("eq.{poll_id}"));
        Ok(url)
    }

    async fn send<T: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: &T,
    ) -> Result<(), RealtimeMirrorError> {
        let response = self
            .client
            .request(method, url)
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await
            .map_err(|err| RealtimeMirrorError::transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(map_status_error(status, &body))
    }

    async fn fetch_rows<T: DeserializeOwned>(
        &self,
        table: &str,
    ) -> Result<Vec<T>, RealtimeMirrorError> {
        let response = self
            .client
            .get(self.select_all_url(table)?)
            .header("apikey", self.api_key.as_str())
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| RealtimeMirrorError::transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RealtimeMirrorError::transport(err.to_string()))?;
        if !status.is_success() {
            return Err(map_status_error(status, &String::from_utf8_lossy(&body)));
        }
        serde_json::from_slice(&body)
            .map_err(|err| RealtimeMirrorError::decode(format!("{table} rows: {err}")))
    }
}

/// Convert read-back rows, skipping any that do not form valid domain values.
fn convert_rows<R, T>(table: &str, rows: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = String>,
{
    rows.into_iter()
        .filter_map(|row| {
            T::try_from(row)
                .inspect_err(|err| warn!(table, error = %err, "skipping unreadable mirrored row"))
                .ok()
        })
        .collect()
}

#[async_trait]
impl MirrorSource for HttpRealtimeMirror {
    async fn fetch_snapshot(&self) -> Result<MirrorSnapshot, RealtimeMirrorError> {
        let polls: Vec<PollRecordDto> = self.fetch_rows(POLL_TABLE).await?;
        let votes: Vec<VoteRecordDto> = self.fetch_rows(VOTE_TABLE).await?;
        Ok(MirrorSnapshot {
            polls: convert_rows::<_, Poll>(POLL_TABLE, polls),
            votes: convert_rows::<_, Vote>(VOTE_TABLE, votes),
        })
    }
}

#[async_trait]
impl RealtimeMirror for HttpRealtimeMirror {
    async fn apply(&self, event: &MirrorEvent) -> Result<(), RealtimeMirrorError> {
        match event {
            MirrorEvent::PollCreated(poll) => {
                let url = self.table_url(POLL_TABLE)?;
                self.send(Method::POST, url, &PollRowDto::from(poll)).await
            }
            MirrorEvent::VoteCast(vote) => {
                let url = self.table_url(VOTE_TABLE)?;
                self.send(Method::POST, url, &VoteRowDto::from(vote)).await
            }
            MirrorEvent::AnalysisRecorded { poll_id, analysis } => {
                let url = self.poll_row_url(*poll_id)?;
                self.send(Method::PATCH, url, &AnalysisPatchDto { analysis })
                    .await
            }
        }
    }
}

fn map_status_error(status: StatusCode, body: &str) -> RealtimeMirrorError {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let preview: String = body
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHAR_LIMIT)
        .collect();
    let message = if preview.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unexpected status")
            .to_owned()
    } else {
        preview
    };
    RealtimeMirrorError::rejected(status.as_u16(), message)
}
