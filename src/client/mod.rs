//! Remote resource client for the catalog collaborator. One reqwest client,
//! one base URL, and two cross-cutting behaviors layered over every call:
//! token injection on the way out and central session-expiry handling on
//! the way back. The expiry behavior lives in an explicit [`ExpiryGuard`]
//! decorator so it shows up in the call graph and tests can drive it
//! directly instead of poking at an invisible hook.

mod auth;
mod autores;
mod libros;

pub use libros::portada_url;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::catalog::ApiEnvelope;
use crate::error::{AppError, AppResult};
use crate::identity::{Route, SessionStore};

/// Navigation sink. The shell installs the real one; tests install a
/// recorder. The client only ever asks to go to the login view.
pub trait Navigator: Send + Sync {
    fn goto(&self, route: Route);
}

/// Central handling of rejected authentication: clear the session, send the
/// user to login. Runs on every response, so "session expired" is handled
/// once here and never per call site.
pub struct ExpiryGuard {
    store: Arc<SessionStore>,
    nav: Arc<dyn Navigator>,
}

impl ExpiryGuard {
    pub fn new(store: Arc<SessionStore>, nav: Arc<dyn Navigator>) -> Self {
        Self { store, nav }
    }

    /// Returns true when the response was an authentication failure and the
    /// session has been torn down.
    pub fn intercept(&self, status: StatusCode) -> bool {
        if status != StatusCode::UNAUTHORIZED {
            return false;
        }
        tracing::warn!("el colaborador rechazó la autenticación; cerrando la sesión");
        self.store.clear();
        self.nav.goto(Route::Login);
        true
    }
}

pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
    store: Arc<SessionStore>,
    guard: ExpiryGuard,
}

impl ApiClient {
    pub fn new(base: &str, store: Arc<SessionStore>, nav: Arc<dyn Navigator>) -> AppResult<Self> {
        let mut base = Url::parse(base)
            .map_err(|e| AppError::Internal { code: "url_base".into(), message: format!("URL base inválida '{}': {}", base, e) })?;
        // Relative joins drop the last path segment unless the base ends
        // with a slash.
        if !base.path().ends_with('/') {
            let fixed = format!("{}/", base.path());
            base.set_path(&fixed);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        let guard = ExpiryGuard::new(store.clone(), nav);
        Ok(Self { base, http, store, guard })
    }

    pub(crate) fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Origin of the collaborator, for resolving bare cover filenames.
    pub(crate) fn asset_base(&self) -> String {
        let mut u = self.base.clone();
        u.set_path("");
        u.set_query(None);
        u.to_string().trim_end_matches('/').to_string()
    }

    /// Build a request against `path` (relative to the base) with the
    /// session token attached when an identity is loaded. Content-type is
    /// left entirely to the body encoder: `.json()` sets it for JSON and
    /// the multipart builder computes its own boundary, which is what keeps
    /// multipart uploads working.
    pub(crate) fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self
            .base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::Internal { code: "url".into(), message: format!("ruta inválida '{}': {}", path, e) })?;
        let mut rb = self.http.request(method, url);
        if let Some(identity) = self.store.current() {
            rb = rb.header("x-access-token", identity.token);
        }
        Ok(rb)
    }

    /// Send and run the cross-cutting response checks. On a non-2xx status
    /// the collaborator's reported message is preserved verbatim; transport
    /// failures carry a generic fallback via `From<reqwest::Error>`.
    async fn send_checked(&self, rb: RequestBuilder) -> AppResult<reqwest::Response> {
        let req_id = Uuid::new_v4();
        let resp = rb.send().await?;
        let status = resp.status();
        tracing::debug!(peticion = %req_id, estado = %status, "respuesta del colaborador");
        if self.guard.intercept(status) {
            return Err(AppError::auth(
                "sesion_expirada",
                "la sesión ha expirado; vuelve a iniciar sesión",
            ));
        }
        if status.is_success() {
            return Ok(resp);
        }
        let code = status.as_u16();
        let message = match resp.json::<ApiEnvelope<serde_json::Value>>().await {
            Ok(env) => {
                let text = env.failure_text();
                if text.is_empty() { format!("error del servidor (HTTP {})", code) } else { text }
            }
            Err(_) => format!("error del servidor (HTTP {})", code),
        };
        Err(AppError::from_status(code, message))
    }

    /// Execute a call whose payload arrives in the standard envelope.
    pub(crate) async fn execute_envelope<T: DeserializeOwned>(&self, rb: RequestBuilder) -> AppResult<ApiEnvelope<T>> {
        let resp = self.send_checked(rb).await?;
        resp.json::<ApiEnvelope<T>>()
            .await
            .map_err(|e| AppError::Api { code: "respuesta_invalida".into(), message: format!("respuesta ilegible del servidor: {}", e) })
    }

    /// Execute a call whose payload is the bare body (the signin endpoint).
    pub(crate) async fn execute_raw<T: DeserializeOwned>(&self, rb: RequestBuilder) -> AppResult<T> {
        let resp = self.send_checked(rb).await?;
        resp.json::<T>()
            .await
            .map_err(|e| AppError::Api { code: "respuesta_invalida".into(), message: format!("respuesta ilegible del servidor: {}", e) })
    }
}
