use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;

use crate::error::{AppError, AppResult};
use crate::tprintln;

use super::principal::{Role, UserIdentity};

const SESSION_FILE: &str = "session.json";

/// Durable store for the authenticated identity: one JSON file under the
/// state directory plus an in-memory cached copy. There is no ambient
/// global here; every component that needs the session receives a handle.
pub struct SessionStore {
    path: PathBuf,
    cached: RwLock<Option<UserIdentity>>,
}

impl SessionStore {
    /// Open the store rooted at `state_dir`, creating the directory when
    /// missing and priming the cache from whatever is on disk.
    pub fn open(state_dir: &Path) -> Self {
        if let Err(e) = fs::create_dir_all(state_dir) {
            tracing::warn!("no se pudo crear el directorio de estado '{}': {}", state_dir.display(), e);
        }
        let store = Self {
            path: state_dir.join(SESSION_FILE),
            cached: RwLock::new(None),
        };
        let loaded = store.load();
        tprintln!("session.open path={} identidad={}", store.path.display(), loaded.is_some());
        store
    }

    /// Read the persisted identity. Corrupt, missing or structurally invalid
    /// data is treated as absent, never as an error. Refreshes the cache.
    pub fn load(&self) -> Option<UserIdentity> {
        let parsed = fs::read_to_string(&self.path)
            .ok()
            .and_then(|raw| serde_json::from_str::<UserIdentity>(&raw).ok())
            .filter(UserIdentity::is_complete);
        *self.cached.write() = parsed.clone();
        parsed
    }

    /// Persist the identity atomically: serialize to a sibling temp file and
    /// rename over the target, so a crash mid-write leaves the old record.
    pub fn save(&self, identity: &UserIdentity) -> AppResult<()> {
        if !identity.is_complete() {
            return Err(AppError::internal(
                "identidad_incompleta",
                "se intentó guardar una identidad sin token",
            ));
        }
        let body = serde_json::to_string_pretty(identity)
            .map_err(|e| AppError::internal("serializar_sesion".into(), e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| AppError::internal("guardar_sesion".into(), e.to_string()))?;
        *self.cached.write() = Some(identity.clone());
        tprintln!("session.save user={} roles={}", identity.username, identity.roles.len());
        Ok(())
    }

    /// Remove any persisted identity. Idempotent: clearing an empty store is
    /// a no-op.
    pub fn clear(&self) {
        match fs::remove_file(&self.path) {
            Ok(_) => tprintln!("session.clear path={}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!("no se pudo borrar la sesión: {}", e),
        }
        *self.cached.write() = None;
    }

    /// Cached identity, if any.
    pub fn current(&self) -> Option<UserIdentity> {
        self.cached.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cached.read().is_some()
    }

    /// Role set of the loaded identity, or empty when unauthenticated.
    pub fn current_roles(&self) -> BTreeSet<Role> {
        self.cached.read().as_ref().map(|id| id.roles.clone()).unwrap_or_default()
    }

    /// Bare-name role check; absent session answers false for every name.
    pub fn has_role(&self, name: &str) -> bool {
        self.cached.read().as_ref().map(|id| id.has_role(name)).unwrap_or(false)
    }
}
