//! Persisted auth session at ~/.studypal/session.json.
//!
//! File backend only: the mobile shell owns platform keychains. The file is
//! written atomically with 0600 permissions inside a 0700 directory.

use std::path::{Path, PathBuf};

use super::{AuthApiError, AuthSession};

pub fn session_path() -> PathBuf {
    crate::config::state_dir().join("session.json")
}

/// Load the stored session. `Ok(None)` means no session is stored, which is
/// the normal signed-out state.
pub fn load_session() -> Result<Option<AuthSession>, AuthApiError> {
    load_session_at(&session_path())
}

pub fn save_session(session: &AuthSession) -> Result<(), AuthApiError> {
    save_session_at(&session_path(), session)
}

pub fn delete_session() -> Result<(), AuthApiError> {
    delete_session_at(&session_path())
}

pub(crate) fn load_session_at(path: &Path) -> Result<Option<AuthSession>, AuthApiError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

pub(crate) fn save_session_at(path: &Path, session: &AuthSession) -> Result<(), AuthApiError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(parent, std::fs::Permissions::from_mode(0o700))?;
            }
        }
    }

    let content = serde_json::to_string_pretty(session)?;
    crate::util::atomic_write_str(path, &content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}

pub(crate) fn delete_session_at(path: &Path) -> Result<(), AuthApiError> {
    if path.exists() {
        std::fs::remove_file(path)?;
    }
    Ok(())
}
