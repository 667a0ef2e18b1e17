//! Authorization gate over navigation targets. The gate itself is pure:
//! it looks at the route's requirements and the current session and answers
//! with a decision. Recording the pending redirect and moving to the login
//! view are the caller's side effects, so a guarded view is only ever
//! rendered after an explicit Granted.

use super::principal::Role;
use super::redirect::PendingRedirect;
use super::session::SessionStore;

/// Every navigation target of the application, with its path form as used
/// by the pending-redirect slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Biblioteca,
    LibroDetalle(i64),
    Admin,
    AdminLibros,
    AdminAutores,
    Login,
    Registro,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => "/home".to_string(),
            Route::Biblioteca => "/biblioteca".to_string(),
            Route::LibroDetalle(id) => format!("/libro/{}", id),
            Route::Admin => "/admin".to_string(),
            Route::AdminLibros => "/admin/libros".to_string(),
            Route::AdminAutores => "/admin/autores".to_string(),
            Route::Login => "/login".to_string(),
            Route::Registro => "/registro".to_string(),
        }
    }

    pub fn parse(path: &str) -> Option<Route> {
        let p = path.trim().trim_end_matches('/');
        match p {
            "" | "/" | "/home" => Some(Route::Home),
            "/biblioteca" => Some(Route::Biblioteca),
            "/admin" => Some(Route::Admin),
            "/admin/libros" => Some(Route::AdminLibros),
            "/admin/autores" => Some(Route::AdminAutores),
            "/login" => Some(Route::Login),
            "/registro" => Some(Route::Registro),
            _ => p.strip_prefix("/libro/").and_then(|rest| rest.parse::<i64>().ok().map(Route::LibroDetalle)),
        }
    }

    /// None = public. Some(&[]) = authentication required, any role.
    /// Some(roles) = at least one of the listed roles required.
    pub fn required_roles(&self) -> Option<&'static [Role]> {
        match self {
            Route::Home | Route::Biblioteca | Route::Login | Route::Registro => None,
            Route::LibroDetalle(_) => Some(&[]),
            Route::Admin | Route::AdminLibros | Route::AdminAutores => Some(&[Role::Admin]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Granted,
    DeniedUnauthenticated,
    DeniedForbidden,
}

/// Decide whether the current session may enter `route`.
pub fn evaluate(route: &Route, store: &SessionStore) -> AccessDecision {
    let Some(required) = route.required_roles() else {
        return AccessDecision::Granted;
    };
    let Some(identity) = store.current() else {
        return AccessDecision::DeniedUnauthenticated;
    };
    if required.is_empty() || required.iter().any(|r| identity.roles.contains(r)) {
        AccessDecision::Granted
    } else {
        AccessDecision::DeniedForbidden
    }
}

/// Where to land after a successful login: the pending slot wins and is
/// consumed in the same step; otherwise the default landing view. A second
/// login without a new pending target therefore lands on Home.
pub fn resolve_post_login(pending: &PendingRedirect) -> Route {
    pending
        .take_once()
        .and_then(|p| Route::parse(&p))
        .unwrap_or(Route::Home)
}
