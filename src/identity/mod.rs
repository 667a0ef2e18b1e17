//! Central identity and session handling for the catalog client.
//! Keep the public surface thin and split implementation across sub-modules.

mod principal;
mod session;
mod redirect;
mod gate;

pub use principal::{Role, RolDesconocido, UserIdentity, roles_from_wire, roles_to_wire};
pub use session::SessionStore;
pub use redirect::PendingRedirect;
pub use gate::{AccessDecision, Route, evaluate, resolve_post_login};
