//! Credential form validation: pure, synchronous, side-effect free. Each
//! field validator returns None on pass or a human-readable message; the
//! composite helpers pass only when every field passes. Nothing here ever
//! touches storage or the network.

use once_cell::sync::Lazy;
use regex::Regex;

// Pragmatic shape check (localpart@domain.tld), not full RFC validation.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("regex de email")
});

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct RegistroForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirmacion: String,
}

/// Field-scoped validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorCampo {
    pub campo: &'static str,
    pub mensaje: String,
}

fn fallo(campo: &'static str, mensaje: &str) -> ErrorCampo {
    ErrorCampo { campo, mensaje: mensaje.to_string() }
}

pub fn validar_username(username: &str) -> Option<String> {
    if username.is_empty() {
        return Some("El nombre de usuario es requerido".to_string());
    }
    if username.chars().count() < 3 {
        return Some("El nombre de usuario debe tener al menos 3 caracteres".to_string());
    }
    if username.chars().count() > 20 {
        return Some("El nombre de usuario no puede tener más de 20 caracteres".to_string());
    }
    None
}

pub fn validar_email(email: &str) -> Option<String> {
    if email.is_empty() {
        return Some("El email es requerido".to_string());
    }
    if !EMAIL_RE.is_match(email) {
        return Some("El email no es válido".to_string());
    }
    None
}

pub fn validar_password(password: &str) -> Option<String> {
    if password.is_empty() {
        return Some("La contraseña es requerida".to_string());
    }
    if password.chars().count() < 6 {
        return Some("La contraseña debe tener al menos 6 caracteres".to_string());
    }
    if password.chars().count() > 40 {
        return Some("La contraseña no puede tener más de 40 caracteres".to_string());
    }
    None
}

pub fn validar_confirmacion(password: &str, confirmacion: &str) -> Option<String> {
    if confirmacion.is_empty() {
        return Some("Debe confirmar la contraseña".to_string());
    }
    if password != confirmacion {
        return Some("Las contraseñas no coinciden".to_string());
    }
    None
}

/// All field validators for the login form; empty result means pass.
pub fn validar_login(form: &LoginForm) -> Vec<ErrorCampo> {
    let mut errores = Vec::new();
    if let Some(m) = validar_username(&form.username) {
        errores.push(fallo("username", &m));
    }
    if let Some(m) = validar_password(&form.password) {
        errores.push(fallo("password", &m));
    }
    errores
}

/// All field validators for the registration form; empty result means pass.
pub fn validar_registro(form: &RegistroForm) -> Vec<ErrorCampo> {
    let mut errores = Vec::new();
    if let Some(m) = validar_username(&form.username) {
        errores.push(fallo("username", &m));
    }
    if let Some(m) = validar_email(&form.email) {
        errores.push(fallo("email", &m));
    }
    if let Some(m) = validar_password(&form.password) {
        errores.push(fallo("password", &m));
    }
    if let Some(m) = validar_confirmacion(&form.password, &form.confirmacion) {
        errores.push(fallo("confirmacion", &m));
    }
    errores
}
