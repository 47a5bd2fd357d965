//! Uploaded photo storage
//!
//! Files keep their (sanitized) client filename, so a later upload with the
//! same name replaces the earlier file. The public path recorded with a
//! pending observation is `uploads/<name>`.

use std::path::{Path, PathBuf};

use tracing::debug;

/// Public URL prefix for stored uploads, without leading slash
pub const UPLOADS_PREFIX: &str = "uploads";

/// Name used when nothing of the client filename survives sanitizing
const FALLBACK_NAME: &str = "upload";

/// A photo written to the upload directory
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub file_path: PathBuf,
    pub public_path: String,
}

/// Reduce a client-supplied filename to a safe flat name
///
/// Path separators become spaces, whitespace runs become `_`, anything
/// outside `[A-Za-z0-9._-]` is dropped and leading/trailing `.`/`_` are
/// stripped. Directory components can never survive.
pub fn sanitize_filename(raw: &str) -> String {
    let flattened: String = raw
        .chars()
        .map(|c| if c == '/' || c == '\\' { ' ' } else { c })
        .collect();

    let joined = flattened.split_whitespace().collect::<Vec<_>>().join("_");
    let filtered: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();

    let trimmed = filtered.trim_matches(|c| c == '.' || c == '_');
    if trimmed.is_empty() {
        FALLBACK_NAME.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Write upload bytes under `dir` using the sanitized filename
pub async fn store(dir: &Path, client_filename: &str, bytes: &[u8]) -> std::io::Result<StoredUpload> {
    let name = sanitize_filename(client_filename);
    let file_path = dir.join(&name);
    tokio::fs::write(&file_path, bytes).await?;
    debug!(path = %file_path.display(), size = bytes.len(), "stored upload");

    Ok(StoredUpload {
        file_path,
        public_path: format!("{}/{}", UPLOADS_PREFIX, name),
    })
}
