//! Pinterest v5 REST client.
//!
//! Thin HTTP wrapper for `GET /boards` and `POST /pins`. Response parsing is
//! kept in pure functions for testability. Pin uploads share a semaphore so
//! a large batch never opens more than `max_concurrent_pins` requests.

use std::sync::Arc;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use super::types::{PinError, PinId, PinPayload, RemoteBoardSource};
use crate::board::Board;
use crate::config::PinnerConfig;

const BOARDS_PAGE_SIZE: u32 = 100;
const MAX_BOARD_PAGES: usize = 50;

// =============================================================================
// CLIENT
// =============================================================================

pub struct PinterestClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
    uploads: Arc<Semaphore>,
}

impl PinterestClient {
    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`PinError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(config: &PinnerConfig) -> Result<Self, PinError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| PinError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
            uploads: Arc::new(Semaphore::new(config.max_concurrent_pins.max(1))),
        })
    }

    async fn fetch_boards_page(&self, bookmark: Option<&str>) -> Result<BoardsPage, PinError> {
        let mut request = self
            .http
            .get(format!("{}/boards", self.base_url))
            .bearer_auth(&self.access_token)
            .query(&[("page_size", BOARDS_PAGE_SIZE.to_string())]);
        if let Some(bookmark) = bookmark {
            request = request.query(&[("bookmark", bookmark)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PinError::Network(e.to_string()))?;
        let text = read_success_body(response).await?;
        parse_boards_page(&text)
    }
}

#[async_trait::async_trait]
impl RemoteBoardSource for PinterestClient {
    async fn fetch_boards(&self) -> Result<Vec<Board>, PinError> {
        let mut boards = Vec::new();
        let mut bookmark: Option<String> = None;
        let mut exhausted = false;

        for page in 0..MAX_BOARD_PAGES {
            let BoardsPage { items, bookmark: next } = self.fetch_boards_page(bookmark.as_deref()).await?;
            debug!(page, count = items.len(), "pinterest: boards page");
            boards.extend(items);
            match next {
                Some(next) if !next.is_empty() => bookmark = Some(next),
                _ => {
                    exhausted = true;
                    break;
                }
            }
        }

        if !exhausted {
            warn!(pages = MAX_BOARD_PAGES, count = boards.len(), "pinterest: board pagination capped");
        }
        Ok(boards)
    }

    async fn create_pin(&self, payload: &PinPayload) -> Result<PinId, PinError> {
        let _permit = self
            .uploads
            .acquire()
            .await
            .map_err(|e| PinError::Network(e.to_string()))?;

        let body = CreatePinRequest {
            board_id: &payload.board_id,
            description: &payload.note,
            link: payload.link.as_deref(),
            media_source: MediaSource {
                source_type: "image_base64",
                content_type: payload.image.content_type(),
                data: STANDARD.encode(payload.image.bytes()),
            },
        };

        let response = self
            .http
            .post(format!("{}/pins", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| PinError::Network(e.to_string()))?;
        let text = read_success_body(response).await?;
        parse_created_pin(&text)
    }
}

async fn read_success_body(response: reqwest::Response) -> Result<String, PinError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| PinError::Network(e.to_string()))?;

    if !(200..300).contains(&status) {
        return Err(PinError::from_status(status, text));
    }
    Ok(text)
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct CreatePinRequest<'a> {
    board_id: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    link: Option<&'a str>,
    media_source: MediaSource<'a>,
}

#[derive(serde::Serialize)]
struct MediaSource<'a> {
    source_type: &'static str,
    content_type: &'a str,
    data: String,
}

#[derive(serde::Deserialize)]
struct ApiBoardsPage {
    #[serde(default)]
    items: Vec<ApiBoard>,
    #[serde(default)]
    bookmark: Option<String>,
}

#[derive(serde::Deserialize)]
struct ApiBoard {
    id: String,
    name: String,
}

#[derive(serde::Deserialize)]
struct ApiPin {
    id: String,
}

// =============================================================================
// PARSING
// =============================================================================

#[derive(Debug, PartialEq, Eq)]
struct BoardsPage {
    items: Vec<Board>,
    bookmark: Option<String>,
}

fn parse_boards_page(json: &str) -> Result<BoardsPage, PinError> {
    let api: ApiBoardsPage = serde_json::from_str(json).map_err(|e| PinError::ApiParse(e.to_string()))?;
    let items = api
        .items
        .into_iter()
        .map(|b| Board { id: b.id, name: b.name })
        .collect();
    Ok(BoardsPage { items, bookmark: api.bookmark })
}

fn parse_created_pin(json: &str) -> Result<PinId, PinError> {
    let api: ApiPin = serde_json::from_str(json).map_err(|e| PinError::ApiParse(e.to_string()))?;
    if api.id.is_empty() {
        return Err(PinError::ApiParse("created pin has an empty id".into()));
    }
    Ok(PinId(api.id))
}

#[cfg(test)]
#[path = "pinterest_test.rs"]
mod tests;
