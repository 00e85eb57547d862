//! HTTP client for the WordPress REST API
//!
//! Authenticates every call with HTTP Basic using an application password
//! and maps response statuses onto [`ScribeError`]:
//! 401/403 are authentication failures, 404 is not-found, other 4xx are
//! rejections, and 5xx or transport failures mean the site is unavailable.

use super::responses::{WpDeleted, WpError, WpMedia, WpPost, WpTerm};
use super::{find_term, WordPressBackend};
use crate::config::WordPressConfig;
use crate::error::{Result, ScribeError};
use crate::types::{
    DeletedPost, MediaItem, MediaMetadata, NewTerm, Post, PostFields, PostFilter, TaxonomyKind,
    TaxonomyTerm, TermQuery,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{RequestBuilder, Response, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const SERVICE: &str = "wordpress";

/// Outcome of a term creation attempt
enum TermCreation {
    Created(TaxonomyTerm),
    /// WordPress already has a term with this name; carries its id
    Exists(u64),
}

/// Authenticated WordPress REST API client
#[derive(Debug, Clone)]
pub struct WordPressClient {
    client: reqwest::Client,
    api_root: String,
    media_timeout: Duration,
}

impl WordPressClient {
    /// Create a client for the configured site
    pub fn new(config: &WordPressConfig) -> Result<Self> {
        let credentials = format!(
            "{}:{}",
            config.username,
            config.application_password.expose_secret()
        );
        let mut auth = HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(credentials)))
            .map_err(|e| ScribeError::Other(format!("invalid credentials header value: {}", e)))?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ScribeError::Other(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_root: format!(
                "{}/wp-json/wp/v2",
                config.base_url.as_str().trim_end_matches('/')
            ),
            media_timeout: config.media_timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path)
    }

    /// Send a request and map non-success statuses to errors
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(|e| ScribeError::RemoteUnavailable {
            service: SERVICE,
            message: format!("request failed: {}", e),
        })?;

        let status = response.status();
        debug!(status = %status, url = %response.url(), "WordPress response");

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(map_error_status(status, &body))
    }

    /// Send a request and decode its JSON body
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ScribeError::RemoteUnavailable {
                service: SERVICE,
                message: format!("unexpected response body: {}", e),
            })
    }

    async fn get_term(&self, kind: TaxonomyKind, id: u64) -> Result<TaxonomyTerm> {
        let url = self.url(&format!("{}/{}", kind.endpoint(), id));
        let term: WpTerm = self.send_json(self.client.get(url)).await?;
        Ok(term.into_term(kind))
    }

    async fn try_create_term(&self, kind: TaxonomyKind, term: &NewTerm) -> Result<TermCreation> {
        let request = self.client.post(self.url(kind.endpoint())).json(term);
        let response = request.send().await.map_err(|e| ScribeError::RemoteUnavailable {
            service: SERVICE,
            message: format!("request failed: {}", e),
        })?;

        let status = response.status();
        if status.is_success() {
            let created: WpTerm =
                response
                    .json()
                    .await
                    .map_err(|e| ScribeError::RemoteUnavailable {
                        service: SERVICE,
                        message: format!("unexpected response body: {}", e),
                    })?;
            return Ok(TermCreation::Created(created.into_term(kind)));
        }

        let body = response.text().await.unwrap_or_default();
        if let Ok(wp_err) = serde_json::from_str::<WpError>(&body) {
            if wp_err.code == "term_exists" {
                if let Some(id) = wp_err.data.and_then(|d| d.term_id) {
                    return Ok(TermCreation::Exists(id));
                }
            }
        }
        Err(map_error_status(status, &body))
    }
}

#[async_trait]
impl WordPressBackend for WordPressClient {
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>> {
        let mut query: Vec<(&str, String)> = vec![
            ("per_page", filter.per_page.to_string()),
            ("page", filter.page.to_string()),
            ("status", filter.status.clone()),
        ];
        if let Some(search) = &filter.search {
            query.push(("search", search.clone()));
        }

        let posts: Vec<WpPost> = self
            .send_json(self.client.get(self.url("posts")).query(&query))
            .await?;
        Ok(posts.into_iter().map(Post::from).collect())
    }

    async fn get_post(&self, id: u64) -> Result<Post> {
        let post: WpPost = self
            .send_json(self.client.get(self.url(&format!("posts/{}", id))))
            .await?;
        Ok(post.into())
    }

    async fn create_post(&self, fields: &PostFields) -> Result<Post> {
        let post: WpPost = self
            .send_json(self.client.post(self.url("posts")).json(fields))
            .await?;
        info!(id = post.id, status = post.status.as_str(), "Created post");
        Ok(post.into())
    }

    async fn update_post(&self, id: u64, fields: &PostFields) -> Result<Post> {
        let post: WpPost = self
            .send_json(
                self.client
                    .post(self.url(&format!("posts/{}", id)))
                    .json(fields),
            )
            .await?;
        info!(id = post.id, "Updated post");
        Ok(post.into())
    }

    async fn delete_post(&self, id: u64, force: bool) -> Result<DeletedPost> {
        let outcome: WpDeleted = self
            .send_json(
                self.client
                    .delete(self.url(&format!("posts/{}", id)))
                    .query(&[("force", force)]),
            )
            .await?;
        info!(id, permanently = outcome.deleted, "Deleted post");
        Ok(DeletedPost {
            id,
            deleted: outcome.deleted,
        })
    }

    async fn list_terms(
        &self,
        kind: TaxonomyKind,
        query: &TermQuery,
    ) -> Result<Vec<TaxonomyTerm>> {
        let mut params: Vec<(&str, String)> = vec![("per_page", query.per_page.to_string())];
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }

        let terms: Vec<WpTerm> = self
            .send_json(self.client.get(self.url(kind.endpoint())).query(&params))
            .await?;
        Ok(terms.into_iter().map(|t| t.into_term(kind)).collect())
    }

    async fn create_term(&self, kind: TaxonomyKind, term: &NewTerm) -> Result<TaxonomyTerm> {
        match self.try_create_term(kind, term).await? {
            TermCreation::Created(created) => {
                info!(kind = kind.as_str(), id = created.id, name = %created.name, "Created term");
                Ok(created)
            }
            TermCreation::Exists(id) => Err(ScribeError::Rejected {
                service: SERVICE,
                status: 400,
                code: Some("term_exists".to_string()),
                message: format!("a {} named '{}' already exists (id {})", kind.as_str(), term.name, id),
            }),
        }
    }

    /// Lookup, then create; a `term_exists` answer from WordPress resolves to
    /// the existing term so losing a creation race still yields its id.
    async fn resolve_or_create_term(&self, name: &str, kind: TaxonomyKind) -> Result<TaxonomyTerm> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ScribeError::validation("term name cannot be empty"));
        }

        let candidates = self.list_terms(kind, &TermQuery::search(name)).await?;
        if let Some(existing) = find_term(candidates, name) {
            debug!(kind = kind.as_str(), name, id = existing.id, "Resolved existing term");
            return Ok(existing);
        }

        match self.try_create_term(kind, &NewTerm::named(name)).await? {
            TermCreation::Created(created) => {
                info!(kind = kind.as_str(), name, id = created.id, "Created term");
                Ok(created)
            }
            TermCreation::Exists(id) => {
                debug!(kind = kind.as_str(), name, id, "Term already exists, fetching");
                self.get_term(kind, id).await
            }
        }
    }

    async fn upload_media(
        &self,
        bytes: Vec<u8>,
        filename: &str,
        metadata: &MediaMetadata,
    ) -> Result<MediaItem> {
        let filename = sanitize_filename(filename)?;
        let content_type = guess_content_type(&filename);
        let size = bytes.len();

        let request = self
            .client
            .post(self.url("media"))
            .timeout(self.media_timeout)
            .header(
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            )
            .header(CONTENT_TYPE, content_type)
            .body(bytes);

        let mut media: WpMedia = self.send_json(request).await?;
        info!(id = media.id, filename = %filename, size, "Uploaded media");

        if !metadata.is_empty() {
            media = self
                .send_json(
                    self.client
                        .post(self.url(&format!("media/{}", media.id)))
                        .json(metadata),
                )
                .await?;
        }

        Ok(media.into())
    }
}

fn map_error_status(status: StatusCode, body: &str) -> ScribeError {
    let (code, message) = match serde_json::from_str::<WpError>(body) {
        Ok(wp_err) => (Some(wp_err.code), wp_err.message),
        Err(_) => (None, format!("HTTP {}", status)),
    };
    warn!(status = %status, code = ?code, "WordPress error: {}", message);

    match status.as_u16() {
        401 | 403 => ScribeError::AuthenticationFailed {
            service: SERVICE,
            message,
        },
        404 => ScribeError::NotFound(message),
        code_num if code_num >= 500 => ScribeError::RemoteUnavailable {
            service: SERVICE,
            message,
        },
        code_num => ScribeError::Rejected {
            service: SERVICE,
            status: code_num,
            code,
            message,
        },
    }
}

/// Keep only the final path component and drop characters that would
/// break the Content-Disposition header
fn sanitize_filename(filename: &str) -> Result<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| *c != '"' && !c.is_control())
        .collect::<String>();
    let base = base.trim().to_string();
    if base.is_empty() {
        return Err(ScribeError::validation("filename cannot be empty"));
    }
    Ok(base)
}

fn guess_content_type(filename: &str) -> &'static str {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}
