// Hand-crafted async HTTP client for the UniFi Access developer API.
//
// Base path: /api/v1/developer/
// Auth: Authorization: Bearer <token>

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::types::{CODE_SUCCESS, DoorResponse, Envelope};

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the UniFi Access developer API.
///
/// Uses bearer-token authentication and communicates via JSON REST
/// endpoints under `/api/v1/developer/`.
pub struct AccessClient {
    http: reqwest::Client,
    base_url: Url,
}

impl AccessClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from an API token and transport config.
    ///
    /// Injects `Authorization: Bearer <token>` as a sensitive default
    /// header on every request.
    pub fn from_token(
        base_url: &str,
        token: &secrecy::SecretString,
        transport: &crate::TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        auth_value.set_sensitive(true);
        headers.insert(reqwest::header::AUTHORIZATION, auth_value);

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;

        Ok(Self { http, base_url })
    }

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Build the base URL with the `/api/v1/developer/` path appended.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;

        // Strip trailing slash for uniform handling
        let path = url.path().trim_end_matches('/').to_owned();

        if path.ends_with("/developer") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/v1/developer/"));
        }

        Ok(url)
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"doors"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        // base_url always ends with `/developer/`, so joining works.
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn put<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    /// Unwrap a data-carrying envelope, treating non-SUCCESS codes as
    /// API errors even under HTTP 200.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })?;

        if envelope.code != CODE_SUCCESS {
            return Err(Error::Access {
                message: envelope.msg,
                code: Some(envelope.code),
                status: status.as_u16(),
            });
        }

        envelope.data.ok_or(Error::Deserialization {
            message: "envelope missing data field".into(),
            body,
        })
    }

    /// Unwrap an envelope whose data is irrelevant (action endpoints).
    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await?;
        let envelope: Envelope<serde_json::Value> =
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body: body.clone(),
                }
            })?;

        if envelope.code != CODE_SUCCESS {
            return Err(Error::Access {
                message: envelope.msg,
                code: Some(envelope.code),
                status: status.as_u16(),
            });
        }

        Ok(())
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::InvalidToken;
        }

        let raw = resp.text().await.unwrap_or_default();

        if let Ok(envelope) = serde_json::from_str::<Envelope<serde_json::Value>>(&raw) {
            Error::Access {
                status: status.as_u16(),
                message: if envelope.msg.is_empty() {
                    status.to_string()
                } else {
                    envelope.msg
                },
                code: Some(envelope.code),
            }
        } else {
            Error::Access {
                status: status.as_u16(),
                message: if raw.is_empty() { status.to_string() } else { raw },
                code: None,
            }
        }
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Doors ────────────────────────────────────────────────────────

    /// Fetch all doors known to the controller.
    pub async fn list_doors(&self) -> Result<Vec<DoorResponse>, Error> {
        self.get("doors").await
    }

    /// Fetch a single door by its controller-assigned id.
    pub async fn get_door(&self, door_id: &str) -> Result<DoorResponse, Error> {
        self.get(&format!("doors/{door_id}")).await
    }

    /// Remotely unlock a door, optionally with a passcode.
    ///
    /// The controller acknowledges the command; the relay state change
    /// only becomes visible on a subsequent doors fetch.
    pub async fn remote_unlock(
        &self,
        door_id: &str,
        passcode: Option<&str>,
    ) -> Result<(), Error> {
        #[derive(Serialize)]
        struct Body<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            passcode: Option<&'a str>,
        }

        self.put(
            &format!("doors/{door_id}/remote_unlock"),
            &Body { passcode },
        )
        .await
    }
}
