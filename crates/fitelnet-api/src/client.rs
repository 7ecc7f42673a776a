// HTTP request executor for the FITELnet management API.
//
// Wraps `reqwest::Client` with URL joining, per-call auth injection and a
// single response classification step. Endpoint groups (cli, token, config)
// are implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Auth;
use crate::error::Error;
use crate::transport::TransportConfig;

// ── Error response shape from the device ─────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<serde_json::Value>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for one FITELnet device.
///
/// Holds no credentials: every request method takes the [`Auth`] to use
/// for that call.
#[derive(Debug, Clone)]
pub struct FitelnetClient {
    http: reqwest::Client,
    base_url: Url,
}

impl FitelnetClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL (e.g. `http://192.168.1.1:55443/`) and
    /// transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Url::parse(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Build the device root URL: `http[s]://{host}:{port}/`.
    pub fn device_url(host: &str, port: u16, tls: bool) -> Result<Url, Error> {
        let scheme = if tls { "https" } else { "http" };
        Ok(Url::parse(&format!("{scheme}://{host}:{port}/"))?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join an endpoint onto the base URL.
    ///
    /// Absolute paths (`/api/v1/cli`) replace the base path; relative
    /// ones are appended to it.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    /// Join `path`, then append `segment` as a single percent-encoded path
    /// segment.
    pub(crate) fn url_with_segment(&self, path: &str, segment: &str) -> Result<Url, Error> {
        let mut url = self.url(path)?;
        url.path_segments_mut()
            .map_err(|()| Error::Configuration {
                message: "device URL cannot carry a path".into(),
            })?
            .push(segment);
        Ok(url)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str, auth: &Auth) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = auth.apply(self.http.get(url)).send().await?;
        Self::parse_json(Self::classify(resp).await?).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        auth: &Auth,
        body: Option<&B>,
    ) -> Result<T, Error> {
        let resp = self.send_post(path, auth, body).await?;
        Self::parse_json(resp).await
    }

    pub(crate) async fn post_text<B: Serialize + Sync>(
        &self,
        path: &str,
        auth: &Auth,
        body: Option<&B>,
    ) -> Result<String, Error> {
        let resp = self.send_post(path, auth, body).await?;
        Ok(resp.text().await?)
    }

    async fn send_post<B: Serialize + Sync>(
        &self,
        path: &str,
        auth: &Auth,
        body: Option<&B>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let mut req = auth.apply(self.http.post(url));
        if let Some(body) = body {
            req = req.json(body);
        }
        Self::classify(req.send().await?).await
    }

    /// PUT raw bytes as `multipart/form-data`, returning the body text.
    pub(crate) async fn put_bytes(
        &self,
        path: &str,
        auth: &Auth,
        body: bytes::Bytes,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!(len = body.len(), "PUT {url}");

        let req = self
            .http
            .put(url)
            .header(CONTENT_TYPE, "multipart/form-data")
            .body(body);
        let resp = Self::classify(auth.apply(req).send().await?).await?;
        Ok(resp.text().await?)
    }

    /// PATCH raw bytes as `multipart/form-data`, returning the body text.
    pub(crate) async fn patch_bytes(
        &self,
        path: &str,
        auth: &Auth,
        body: bytes::Bytes,
    ) -> Result<String, Error> {
        let url = self.url(path)?;
        debug!(len = body.len(), "PATCH {url}");

        let req = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, "multipart/form-data")
            .body(body);
        let resp = Self::classify(auth.apply(req).send().await?).await?;
        Ok(resp.text().await?)
    }

    pub(crate) async fn delete(&self, path: &str, auth: &Auth) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");
        self.delete_url(url, auth).await
    }

    /// DELETE an already built URL. Does not log the URL.
    pub(crate) async fn delete_url(&self, url: Url, auth: &Auth) -> Result<(), Error> {
        let resp = auth.apply(self.http.delete(url)).send().await?;
        Self::classify(resp).await?;
        Ok(())
    }

    // ── Response handling ────────────────────────────────────────────

    /// Pass 2xx responses through; turn everything else into [`Error::Api`].
    async fn classify(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = resp.status();
        if status.as_u16() / 100 == 2 {
            return Ok(resp);
        }

        let raw = resp.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "request rejected by device");
        Err(Error::Api {
            status: status.as_u16(),
            message: error_message(&raw, status),
        })
    }

    async fn parse_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
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

/// Best-effort message extraction: the `error` field of a JSON object body,
/// else the raw text, else the canonical status reason.
fn error_message(raw: &str, status: reqwest::StatusCode) -> String {
    if let Ok(ErrorResponse { error: Some(err) }) = serde_json::from_str::<ErrorResponse>(raw) {
        return match err {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        };
    }
    if raw.is_empty() {
        status.to_string()
    } else {
        raw.to_owned()
    }
}
