//! Catalog domain: the collaborator's book/author entities and the pure
//! filter/sort/paginate engine shared by every listing view.

mod types;
pub mod query;

pub use types::{ApiEnvelope, Autor, AutorForm, AutorRef, Libro, LibroForm};
