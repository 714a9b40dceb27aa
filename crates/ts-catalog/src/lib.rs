//! ts-catalog: simulation catalog format, validation and lookup.

pub mod builtin;
pub mod lookup;
pub mod schema;
pub mod validate;

use std::path::Path;

pub use builtin::{builtin_catalog, builtin_catalog_yaml};
pub use lookup::NO_MATCH_DESCRIPTION;
pub use schema::*;
pub use validate::{ValidationError, ValueError, check_value, validate_catalog};

pub const LATEST_VERSION: u32 = 1;

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(thiserror::Error, Debug)]
pub enum CatalogError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unsupported catalog file extension: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn load_yaml(path: &Path) -> CatalogResult<Catalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog: Catalog = serde_yaml::from_str(&content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

pub fn save_yaml(path: &Path, catalog: &Catalog) -> CatalogResult<()> {
    validate_catalog(catalog)?;
    let content = serde_yaml::to_string(catalog)?;
    std::fs::write(path, content)?;
    Ok(())
}

pub fn load_json(path: &Path) -> CatalogResult<Catalog> {
    let content = std::fs::read_to_string(path)?;
    let catalog: Catalog = serde_json::from_str(&content)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

pub fn save_json(path: &Path, catalog: &Catalog) -> CatalogResult<()> {
    validate_catalog(catalog)?;
    let content = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Load a catalog, picking the format from the file extension.
pub fn load_path(path: &Path) -> CatalogResult<Catalog> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => load_yaml(path),
        Some("json") => load_json(path),
        other => Err(CatalogError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}
