//! Blocking HTTP client for the lending backend.
//!
use reqwest::Url;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use super::{BookMetadata, BookUpdate, CatalogApi, CatalogBook, LibraryUser, NewBook, Role};
use crate::error::{AppError, Result};

/// Default timeout for a single request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// Extract the `error` field of a failed response body, if there is one.
pub fn error_message_from_body(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|m| !m.trim().is_empty())
}

/// Normalize a base URL so relative API paths join below it.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    let url = Url::parse(&with_slash)
        .map_err(|e| AppError::validation(format!("invalid base url '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::validation(format!(
            "unsupported scheme '{other}' in base url"
        ))),
    }
}

/// `CatalogApi` over HTTP/JSON.
pub struct HttpCatalog {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpCatalog {
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base, token })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an API path such as `api/books/42` against the base URL.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::validation(format!("invalid endpoint '{path}': {e}")))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    fn send(&self, req: RequestBuilder, what: &str) -> Result<Response> {
        let resp = self.authorize(req).send().map_err(|e| {
            warn!("{what}: request failed: {e}");
            AppError::from(e)
        })?;
        let status = resp.status();
        if status.is_success() {
            debug!("{what}: {status}");
            return Ok(resp);
        }
        let body = resp.text().unwrap_or_default();
        let message = error_message_from_body(&body);
        warn!("{what}: backend answered {status}: {}", message.as_deref().unwrap_or("<no message>"));
        Err(AppError::Request { status: status.as_u16(), message })
    }

    fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T> {
        resp.json::<T>().map_err(|e| {
            warn!("{what}: could not decode response: {e}");
            AppError::Decode(e.to_string())
        })
    }
}

impl CatalogApi for HttpCatalog {
    fn list_books(&self) -> Result<Vec<CatalogBook>> {
        let url = self.endpoint("api/books/admin")?;
        let resp = self.send(self.client.get(url), "list books")?;
        Self::decode(resp, "list books")
    }

    fn lookup_isbn(&self, isbn: &str) -> Result<BookMetadata> {
        let url = self.endpoint("api/books/search")?;
        let resp = self.send(self.client.get(url).query(&[("isbn", isbn)]), "isbn lookup")?;
        Self::decode(resp, "isbn lookup")
    }

    fn create_book(&self, book: &NewBook) -> Result<()> {
        let url = self.endpoint("api/books")?;
        self.send(self.client.post(url).json(book), "create book")?;
        Ok(())
    }

    fn update_book(&self, id: &str, update: &BookUpdate) -> Result<()> {
        let url = self.endpoint(&format!("api/books/{id}"))?;
        self.send(self.client.put(url).json(update), "update book")?;
        Ok(())
    }

    fn delete_book(&self, id: &str) -> Result<()> {
        let url = self.endpoint(&format!("api/books/{id}"))?;
        self.send(self.client.delete(url), "delete book")?;
        Ok(())
    }

    fn list_users(&self) -> Result<Vec<LibraryUser>> {
        let url = self.endpoint("api/users")?;
        let resp = self.send(self.client.get(url), "list users")?;
        Self::decode(resp, "list users")
    }

    fn change_role(&self, user_id: &str, role: Role) -> Result<()> {
        let url = self.endpoint(&format!("api/users/{user_id}/role"))?;
        let body = serde_json::json!({ "role": role });
        self.send(self.client.put(url).json(&body), "change role")?;
        Ok(())
    }
}
