//! Catalog seed file.
//!
//! A JSON array of movie records as produced by the external metadata job:
//!
//! ```json
//! [{"title": "Heat", "genre": "Crime", "releaseDate": "1995-12-15"}]
//! ```

use anyhow::Context;
use cinereview_reviews::NewMovie;
use std::path::Path;

/// Read and parse a seed file.
///
/// # Errors
///
/// Fails if the file cannot be read or is not an array of movie records.
pub async fn load(path: &Path) -> anyhow::Result<Vec<NewMovie>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading catalog seed {}", path.display()))?;
    parse(&bytes).with_context(|| format!("parsing catalog seed {}", path.display()))
}

/// Parse seed file contents.
///
/// # Errors
///
/// Fails if `bytes` is not a JSON array of movie records.
pub fn parse(bytes: &[u8]) -> anyhow::Result<Vec<NewMovie>> {
    Ok(serde_json::from_slice(bytes)?)
}
