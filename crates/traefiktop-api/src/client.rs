// Async HTTP client for the Traefik admin API.
//
// Base path: {base}/api/http/
// Auth: optional HTTP basic auth, supplied per request so one client can
// serve any number of endpoints.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::models::{RouterResponse, ServiceResponse};
use crate::transport::TransportConfig;

/// Page size requested from list endpoints. Traefik's own default is 100.
const PAGE_SIZE: u32 = 100;

/// Upper bound on pages followed for a single list call.
const MAX_PAGES: u32 = 1_000;

const NEXT_PAGE_HEADER: &str = "X-Next-Page";

// ── Credentials ──────────────────────────────────────────────────────

/// HTTP basic auth credentials for a protected admin endpoint.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: SecretString,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Traefik admin API.
///
/// Stateless apart from the connection pool: the base URL and credentials
/// are passed to every call, so callers can switch endpoints without
/// rebuilding the client.
#[derive(Debug, Clone)]
pub struct TraefikClient {
    http: reqwest::Client,
}

impl TraefikClient {
    /// Build from a transport config (timeout, TLS mode).
    pub fn new(transport: &TransportConfig) -> Result<Self, Error> {
        Ok(Self {
            http: transport.build_client()?,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(http: reqwest::Client) -> Self {
        Self { http }
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// `GET /api/http/routers`, following pagination to the last page.
    pub async fn list_routers(
        &self,
        base_url: &Url,
        auth: Option<&BasicAuth>,
    ) -> Result<Vec<RouterResponse>, Error> {
        self.paginate_all(base_url, auth, "api/http/routers").await
    }

    /// `GET /api/http/services`, following pagination to the last page.
    pub async fn list_services(
        &self,
        base_url: &Url,
        auth: Option<&BasicAuth>,
    ) -> Result<Vec<ServiceResponse>, Error> {
        self.paginate_all(base_url, auth, "api/http/services").await
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative API path onto the base URL, keeping any path prefix
    /// the admin API is mounted under (e.g. `https://host/traefik`).
    fn endpoint_url(base_url: &Url, path: &str) -> Result<Url, Error> {
        let mut base = base_url.clone();
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        Ok(base.join(path)?)
    }

    // ── Pagination ───────────────────────────────────────────────────

    /// Collect every page of a list endpoint.
    ///
    /// Traefik reports the next page in `X-Next-Page` and wraps back to `1`
    /// on the last one; a missing header means the response was unpaged.
    async fn paginate_all<T: DeserializeOwned>(
        &self,
        base_url: &Url,
        auth: Option<&BasicAuth>,
        path: &str,
    ) -> Result<Vec<T>, Error> {
        let url = Self::endpoint_url(base_url, path)?;
        let mut all = Vec::new();
        let mut page = 1;

        loop {
            let (items, next) = self.get_page::<T>(url.clone(), auth, page).await?;
            all.extend(items);

            match next {
                Some(next) if next > page && page < MAX_PAGES => page = next,
                _ => break,
            }
        }

        Ok(all)
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        url: Url,
        auth: Option<&BasicAuth>,
        page: u32,
    ) -> Result<(Vec<T>, Option<u32>), Error> {
        debug!("GET {url} page={page}");

        let mut request = self
            .http
            .get(url)
            .query(&[("page", page), ("per_page", PAGE_SIZE)]);
        if let Some(auth) = auth {
            request = request.basic_auth(&auth.username, Some(auth.password.expose_secret()));
        }

        let resp = request.send().await?;
        let next = resp
            .headers()
            .get(NEXT_PAGE_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());

        let items = Self::handle_response(resp).await?;
        Ok((items, next))
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Unauthorized {
                status: status.as_u16(),
            });
        }

        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let raw = raw.trim();
            return Err(Error::Api {
                status: status.as_u16(),
                message: if raw.is_empty() {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_owned()
                } else {
                    raw.to_owned()
                },
            });
        }

        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }
}
