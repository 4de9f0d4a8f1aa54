//! HTTP Client
//!
//! Every request goes through [`ApiClient::execute`]:
//! 1. attach the stored bearer token
//! 2. on a 401 for a request that carried one, refresh behind a single gate
//! 3. replay the request once with the new token
//!
//! Only one `POST /auth/refresh` is in flight at a time. Requests that fail
//! while it runs wait on the gate and reuse its result; if the refresh fails
//! the session is cleared and every waiter gets `SessionExpired`.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{Envelope, Paged, Session};
use crate::store::TokenStore;

/// Endpoints whose 401 means bad credentials, never an expired token
const NO_REFRESH_PATHS: [&str; 4] = [
    "/auth/login",
    "/auth/register",
    "/auth/refresh",
    "/auth/oauth",
];

pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    store: Arc<dyn TokenStore>,
    refresh_gate: Arc<Mutex<()>>,
    on_session_expired: Option<SessionExpiredHook>,
}

/// A replayable request description
#[derive(Debug, Clone)]
pub(crate) struct Call {
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    headers: Vec<(&'static str, String)>,
    body: Option<Value>,
}

impl Call {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub(crate) fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub(crate) fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub(crate) fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub(crate) fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    pub(crate) fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub(crate) fn query(mut self, pairs: Vec<(&'static str, String)>) -> Self {
        self.query.extend(pairs);
        self
    }

    pub(crate) fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub(crate) fn json<B: Serialize>(mut self, body: &B) -> ClientResult<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    fn refreshes_on_401(&self) -> bool {
        !NO_REFRESH_PATHS.contains(&self.path.as_str())
    }
}

impl<T> Envelope<T> {
    pub fn into_data(self) -> ClientResult<T> {
        self.data.ok_or(ClientError::MissingData)
    }
}

impl<T> Envelope<Vec<T>> {
    pub fn into_paged(self) -> ClientResult<Paged<T>> {
        let pagination = self.pagination.ok_or(ClientError::MissingData)?;
        Ok(Paged {
            items: self.data.unwrap_or_default(),
            pagination,
        })
    }
}

impl ApiClient {
    pub fn new(config: ClientConfig, store: Arc<dyn TokenStore>) -> ClientResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config: Arc::new(config),
            store,
            refresh_gate: Arc::new(Mutex::new(())),
            on_session_expired: None,
        })
    }

    /// Called once per failed refresh, after credentials are cleared
    pub fn on_session_expired(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_session_expired = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn is_signed_in(&self) -> bool {
        self.store.token().is_some()
    }

    pub(crate) async fn data<T: DeserializeOwned>(&self, call: Call) -> ClientResult<T> {
        self.execute::<T>(&call).await?.into_data()
    }

    pub(crate) async fn paged<T: DeserializeOwned>(&self, call: Call) -> ClientResult<Paged<T>> {
        self.execute::<Vec<T>>(&call).await?.into_paged()
    }

    /// For endpoints that only return a message
    pub(crate) async fn message(&self, call: Call) -> ClientResult<Option<String>> {
        Ok(self.execute::<Value>(&call).await?.message)
    }

    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        call: &Call,
    ) -> ClientResult<Envelope<T>> {
        let token = self.store.token();
        let response = self.dispatch(call, token.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED || !call.refreshes_on_401() {
            return decode(response).await;
        }
        let Some(stale) = token else {
            return decode(response).await;
        };

        let fresh = self.refresh_after(&stale).await?;
        tracing::debug!(
            method = %call.method,
            path = %call.path,
            "Replaying request with refreshed token"
        );
        let response = self.dispatch(call, Some(&fresh)).await?;
        decode(response).await
    }

    async fn dispatch(&self, call: &Call, token: Option<&str>) -> ClientResult<reqwest::Response> {
        let mut request = self
            .http
            .request(call.method.clone(), self.config.endpoint(&call.path));
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        for (name, value) in &call.headers {
            request = request.header(*name, value);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Returns a token newer than `stale`, refreshing at most once per rotation
    async fn refresh_after(&self, stale: &str) -> ClientResult<String> {
        let _gate = self.refresh_gate.lock().await;

        match self.store.token() {
            Some(current) if current != stale => return Ok(current),
            Some(_) => {}
            None => return Err(ClientError::SessionExpired),
        }

        let refreshed = match self.dispatch(&Call::post("/auth/refresh"), Some(stale)).await {
            Ok(response) => decode::<Session>(response)
                .await
                .and_then(Envelope::into_data),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(session) => {
                let token = session.token.clone();
                self.store.save(session)?;
                tracing::info!("Session token refreshed");
                Ok(token)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, signing out");
                self.expire_session();
                Err(ClientError::SessionExpired)
            }
        }
    }

    fn expire_session(&self) {
        if let Err(e) = self.store.clear() {
            tracing::warn!(error = %e, "Failed to clear stored session");
        }
        if let Some(hook) = &self.on_session_expired {
            hook();
        }
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<Envelope<T>> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let fallback = || {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    };
    let (message, errors) = match serde_json::from_slice::<Envelope<Value>>(&bytes) {
        Ok(envelope) => (envelope.message.unwrap_or_else(fallback), envelope.errors),
        Err(_) => (fallback(), Vec::new()),
    };
    Err(ClientError::Api {
        status,
        message,
        errors,
    })
}
