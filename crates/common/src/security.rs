//! Path validation for serving saved itineraries back to clients.
//!
//! Download requests name a file inside the output directory; anything that
//! could escape that directory is rejected before touching the filesystem.

use crate::{ItineraError, Result};
use std::path::{Path, PathBuf};

/// Resolve a client-supplied itinerary file name inside `output_dir`.
///
/// - Rejects empty names and names containing `..` or path separators
/// - Only `.md` files are served
/// - The resolved path must exist and stay under the canonical output directory
pub fn resolve_plan_file(name: &str, output_dir: &Path) -> Result<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ItineraError::Config("Empty file name".to_string()));
    }

    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ItineraError::Config(format!(
            "File name '{}' contains path components which are not allowed",
            name
        )));
    }

    if Path::new(name).extension().and_then(|e| e.to_str()) != Some("md") {
        return Err(ItineraError::Config(format!(
            "File '{}' is not an itinerary document",
            name
        )));
    }

    let base = output_dir.canonicalize().map_err(|e| {
        ItineraError::Config(format!(
            "Failed to resolve output directory '{}': {}",
            output_dir.display(),
            e
        ))
    })?;

    let resolved = base.join(name).canonicalize().map_err(|e| {
        ItineraError::Config(format!("Failed to resolve '{}': {}", name, e))
    })?;

    // Symlinks inside the directory could still point elsewhere.
    if !resolved.starts_with(&base) {
        return Err(ItineraError::Config(format!(
            "File '{}' is outside the output directory",
            name
        )));
    }

    Ok(resolved)
}
