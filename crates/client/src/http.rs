// HTTP transport for the session client
// Decision: Sessions live in the client's cookie store; no token is ever read or
// held by this crate
// Decision: No retries and no timeout beyond the reqwest defaults

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use taskvilla_domain::{ApiEnvelope, Role};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl SessionError {
    /// Whether the server refused the credentials or session (401/403)
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, SessionError::Api { status, .. } if *status == 401 || *status == 403)
    }
}

/// Signed-in user as the browser sees it
///
/// `role` stays a string so a role this build does not know still decodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub email_verified: bool,
}

impl ClientUser {
    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

#[derive(Debug, Deserialize)]
struct SessionBody {
    user: ClientUser,
}

/// Calls the session endpoints
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<ClientUser, SessionError>;

    /// Re-establish the session from the refresh cookie
    async fn refresh(&self) -> Result<ClientUser, SessionError>;

    async fn logout(&self) -> Result<(), SessionError>;
}

/// `AuthApi` over a cookie-keeping reqwest client
pub struct HttpAuthApi {
    base_url: String,
    http: reqwest::Client,
}

impl HttpAuthApi {
    /// `base_url` includes any API prefix, e.g. "https://api.taskvilla.com/api"
    pub fn new(base_url: &str) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, SessionError> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.post(&url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SessionError> {
        let status = response.status();
        let text = response.text().await?;
        let envelope: ApiEnvelope<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(SessionError::Api {
                    status: status.as_u16(),
                    message: text,
                })
            }
            Err(e) => return Err(SessionError::Decode(e.to_string())),
        };

        if status.is_success() && envelope.success {
            return envelope
                .into_data()
                .ok_or_else(|| SessionError::Decode("missing data".to_string()));
        }

        Err(SessionError::Api {
            status: envelope
                .status
                .unwrap_or_else(|| status_or_bad_gateway(status)),
            message: envelope.message.unwrap_or_default(),
        })
    }
}

fn status_or_bad_gateway(status: StatusCode) -> u16 {
    if status.is_success() {
        StatusCode::BAD_GATEWAY.as_u16()
    } else {
        status.as_u16()
    }
}

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn login(&self, email: &str, password: &str) -> Result<ClientUser, SessionError> {
        let body: SessionBody = self
            .post("/auth/login", Some(&LoginBody { email, password }))
            .await?;
        Ok(body.user)
    }

    async fn refresh(&self) -> Result<ClientUser, SessionError> {
        let body: SessionBody = self.post::<_, ()>("/auth/refresh-token", None).await?;
        Ok(body.user)
    }

    async fn logout(&self) -> Result<(), SessionError> {
        let url = format!("{}/auth/logout", self.base_url);
        let response = self.http.post(&url).send().await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(SessionError::Api {
                status: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}
