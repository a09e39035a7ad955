//! Session file operations — save, load, delete
//!
//! One JSON document per session: `<dir>/<session-id>.json`. The store
//! rewrites the whole document on persist; sessions are small (text
//! responses, not token streams) so this stays cheap.

use crate::store::ConsultationSession;
use conclave_core::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

pub fn session_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{}.json", id))
}

/// Default data directory: `~/.local/share/conclave/sessions` (platform
/// equivalent), falling back to a relative path when the platform gives
/// us nothing.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("conclave")
        .join("sessions")
}

pub fn save(dir: &Path, session: &ConsultationSession) -> Result<()> {
    fs::create_dir_all(dir)?;
    let json = serde_json::to_string_pretty(session)?;
    fs::write(session_path(dir, &session.id), json)?;
    Ok(())
}

/// Load every `*.json` session in the directory. Unreadable or corrupt
/// files are skipped with a warning, never fatal.
pub fn load_all(dir: &Path) -> Result<Vec<ConsultationSession>> {
    let mut sessions = Vec::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Ok(sessions),
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().map(|e| e != "json").unwrap_or(true) {
            continue;
        }
        match fs::read_to_string(&path).map_err(conclave_core::Error::from).and_then(|text| {
            serde_json::from_str::<ConsultationSession>(&text).map_err(Into::into)
        }) {
            Ok(session) => sessions.push(session),
            Err(e) => warn!("Skipping unreadable session {}: {}", path.display(), e),
        }
    }
    sessions.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Ok(sessions)
}

pub fn delete(dir: &Path, id: &str) -> Result<()> {
    let path = session_path(dir, id);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
