//! Author resource operations. Reads are public; writes travel with the
//! session token injected by the request builder.

use reqwest::Method;

use crate::catalog::{Autor, AutorForm};
use crate::error::{AppError, AppResult};

use super::ApiClient;

impl ApiClient {
    pub async fn listar_autores(&self) -> AppResult<Vec<Autor>> {
        let rb = self.request(Method::GET, "autores")?;
        Ok(self.execute_envelope::<Vec<Autor>>(rb).await?.data_or_default())
    }

    pub async fn obtener_autor(&self, id: i64) -> AppResult<Autor> {
        let rb = self.request(Method::GET, &format!("autores/{}", id))?;
        let env = self.execute_envelope::<Autor>(rb).await?;
        env.data
            .ok_or_else(|| AppError::not_found("no_encontrado", "autor no encontrado"))
    }

    pub async fn crear_autor(&self, form: &AutorForm) -> AppResult<Autor> {
        let rb = self.request(Method::POST, "autores")?.json(form);
        let env = self.execute_envelope::<Autor>(rb).await?;
        let fallo = env.failure_text();
        env.data
            .ok_or(AppError::Api { code: "sin_datos".into(), message: fallo })
    }

    pub async fn actualizar_autor(&self, id: i64, form: &AutorForm) -> AppResult<Autor> {
        let rb = self.request(Method::PUT, &format!("autores/{}", id))?.json(form);
        let env = self.execute_envelope::<Autor>(rb).await?;
        let fallo = env.failure_text();
        env.data
            .ok_or(AppError::Api { code: "sin_datos".into(), message: fallo })
    }

    /// Returns the collaborator's confirmation message.
    pub async fn eliminar_autor(&self, id: i64) -> AppResult<String> {
        let rb = self.request(Method::DELETE, &format!("autores/{}", id))?;
        let env: crate::catalog::ApiEnvelope<serde_json::Value> = self.execute_envelope(rb).await?;
        Ok(env.message)
    }
}
