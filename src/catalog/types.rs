use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Denormalized author snapshot carried inside a book. The client trusts
/// the collaborator to keep it consistent with `id_autor`; referential
/// integrity is not re-checked locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutorRef {
    pub id_autor: i64,
    pub nombre: String,
    pub pais: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Autor {
    pub id_autor: i64,
    pub nombre: String,
    pub pais: String,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub libros: Option<Vec<Libro>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Libro {
    pub id_libro: i64,
    pub titulo: String,
    pub anio: i32,
    #[serde(default)]
    pub portada: Option<String>,
    pub id_autor: i64,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autor: Option<AutorRef>,
}

impl Libro {
    /// Author display name: the denormalized snapshot when present, the
    /// bare id otherwise.
    pub fn nombre_autor(&self) -> String {
        match &self.autor {
            Some(a) => a.nombre.clone(),
            None => format!("autor #{}", self.id_autor),
        }
    }
}

/// Payload for creating or updating an author (JSON body).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AutorForm {
    pub nombre: String,
    pub pais: String,
}

/// Payload for creating or updating a book. Sent as multipart so the
/// optional cover file can travel alongside the fields.
#[derive(Debug, Clone, Default)]
pub struct LibroForm {
    pub titulo: String,
    pub anio: i32,
    pub id_autor: i64,
    pub portada: Option<PathBuf>,
    pub remove_image: bool,
}

/// Envelope every collaborator response is expected to arrive in. All
/// fields are defaulted: the client reads only `data` and keeps
/// `message`/`error` verbatim for display on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: serde::de::DeserializeOwned", serialize = "T: Serialize"))]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub errores: Option<Vec<String>>,
}

impl<T> ApiEnvelope<T> {
    /// Collaborator-reported failure text: the explicit `error` wins,
    /// falling back to `message`.
    pub fn failure_text(&self) -> String {
        match &self.error {
            Some(e) if !e.is_empty() => e.clone(),
            _ => self.message.clone(),
        }
    }
}

impl<T: Default> ApiEnvelope<T> {
    /// Missing `data` on a collection endpoint degrades to empty, the same
    /// way the original views treated `res.data || []`.
    pub fn data_or_default(self) -> T {
        self.data.unwrap_or_default()
    }
}
