//! Credential exchange against the collaborator's auth endpoints. Field
//! validation runs before anything touches the network, so a malformed
//! form never produces a request.

use reqwest::Method;

use crate::catalog::ApiEnvelope;
use crate::error::{AppError, AppResult};
use crate::identity::UserIdentity;
use crate::tprintln;
use crate::validation::{validar_login, validar_registro, LoginForm, RegistroForm};

use super::ApiClient;

impl ApiClient {
    /// `POST /auth/signup`. Returns the collaborator's confirmation message.
    pub async fn registrar(&self, form: &RegistroForm) -> AppResult<String> {
        if let Some(err) = validar_registro(form).into_iter().next() {
            return Err(AppError::Validation { code: err.campo.to_string(), message: err.mensaje });
        }
        let body = serde_json::json!({
            "username": form.username,
            "email": form.email,
            "password": form.password,
        });
        let rb = self.request(Method::POST, "auth/signup")?.json(&body);
        let env: ApiEnvelope<serde_json::Value> = self.execute_envelope(rb).await?;
        tprintln!("auth.signup user={}", form.username);
        Ok(if env.message.is_empty() { "registro completado".to_string() } else { env.message })
    }

    /// `POST /auth/signin`. On success the delivered identity is persisted
    /// through the session store; an incomplete response (no token) is an
    /// auth failure, never a half-saved session.
    pub async fn iniciar_sesion(&self, form: &LoginForm) -> AppResult<UserIdentity> {
        if let Some(err) = validar_login(form).into_iter().next() {
            return Err(AppError::Validation { code: err.campo.to_string(), message: err.mensaje });
        }
        let body = serde_json::json!({
            "username": form.username,
            "password": form.password,
        });
        let rb = self.request(Method::POST, "auth/signin")?.json(&body);
        let identity: UserIdentity = self.execute_raw(rb).await?;
        if !identity.is_complete() {
            return Err(AppError::auth(
                "respuesta_incompleta",
                "el servidor no entregó una identidad completa",
            ));
        }
        self.store().save(&identity)?;
        tprintln!("auth.signin user={} roles={}", identity.username, identity.roles.len());
        Ok(identity)
    }

    /// Drop the persisted identity. Purely local; the collaborator keeps no
    /// server-side session for this client.
    pub fn cerrar_sesion(&self) {
        self.store().clear();
    }
}
