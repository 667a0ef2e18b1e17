//! Book resource operations. Create and update are multipart so the cover
//! file can travel with the fields; the builder computes the boundary, and
//! nothing in this module sets a content-type by hand.

use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::catalog::{ApiEnvelope, Libro, LibroForm};
use crate::error::{AppError, AppResult};

use super::ApiClient;

impl ApiClient {
    pub async fn listar_libros(&self) -> AppResult<Vec<Libro>> {
        let rb = self.request(Method::GET, "libros")?;
        Ok(self.execute_envelope::<Vec<Libro>>(rb).await?.data_or_default())
    }

    pub async fn obtener_libro(&self, id: i64) -> AppResult<Libro> {
        let rb = self.request(Method::GET, &format!("libros/{}", id))?;
        let env = self.execute_envelope::<Libro>(rb).await?;
        env.data
            .ok_or_else(|| AppError::not_found("no_encontrado", "libro no encontrado"))
    }

    pub async fn crear_libro(&self, form: &LibroForm) -> AppResult<Libro> {
        let mp = formulario_libro(form, false).await?;
        let rb = self.request(Method::POST, "libros")?.multipart(mp);
        let env = self.execute_envelope::<Libro>(rb).await?;
        let fallo = env.failure_text();
        env.data
            .ok_or(AppError::Api { code: "sin_datos".into(), message: fallo })
    }

    pub async fn actualizar_libro(&self, id: i64, form: &LibroForm) -> AppResult<Libro> {
        let mp = formulario_libro(form, true).await?;
        let rb = self.request(Method::PUT, &format!("libros/{}", id))?.multipart(mp);
        let env = self.execute_envelope::<Libro>(rb).await?;
        let fallo = env.failure_text();
        env.data
            .ok_or(AppError::Api { code: "sin_datos".into(), message: fallo })
    }

    /// Returns the collaborator's confirmation message.
    pub async fn eliminar_libro(&self, id: i64) -> AppResult<String> {
        let rb = self.request(Method::DELETE, &format!("libros/{}", id))?;
        let env: ApiEnvelope<serde_json::Value> = self.execute_envelope(rb).await?;
        Ok(env.message)
    }

    /// Resolve a book's cover reference against this client's collaborator.
    pub fn url_portada(&self, portada: Option<&str>) -> String {
        portada_url(&self.asset_base(), portada)
    }
}

/// Build the multipart body. `removeImage` only exists on update.
async fn formulario_libro(form: &LibroForm, con_remove: bool) -> AppResult<Form> {
    let mut mp = Form::new()
        .text("titulo", form.titulo.clone())
        .text("anio", form.anio.to_string())
        .text("id_autor", form.id_autor.to_string());
    if let Some(path) = &form.portada {
        let bytes = tokio::fs::read(path).await.map_err(|e| AppError::Validation {
            code: "portada".into(),
            message: format!("no se pudo leer la portada '{}': {}", path.display(), e),
        })?;
        let nombre = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "portada".to_string());
        mp = mp.part("portada", Part::bytes(bytes).file_name(nombre));
    }
    if con_remove && form.remove_image {
        mp = mp.text("removeImage", "true");
    }
    Ok(mp)
}

/// Cover references are either absolute URLs (served as-is) or bare
/// filenames resolved against the collaborator's upload directory. Absent
/// covers map to the placeholder asset.
pub fn portada_url(asset_base: &str, portada: Option<&str>) -> String {
    match portada {
        None | Some("") => "/placeholder-book.png".to_string(),
        Some(p) if p.starts_with("http://") || p.starts_with("https://") => p.to_string(),
        Some(p) => format!("{}/uploads/{}", asset_base.trim_end_matches('/'), urlencoding::encode(p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portada_url_variants() {
        let base = "https://backend.example.com";
        assert_eq!(portada_url(base, None), "/placeholder-book.png");
        assert_eq!(portada_url(base, Some("")), "/placeholder-book.png");
        assert_eq!(
            portada_url(base, Some("https://cdn.example.com/x.png")),
            "https://cdn.example.com/x.png"
        );
        assert_eq!(
            portada_url(base, Some("tapa 1.png")),
            "https://backend.example.com/uploads/tapa%201.png"
        );
    }
}
