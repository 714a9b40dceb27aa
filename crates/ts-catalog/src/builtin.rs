//! Catalog compiled into the binaries.

use crate::schema::Catalog;
use crate::validate::validate_catalog;
use crate::CatalogResult;

const DEFAULT_CATALOG_YAML: &str = include_str!("../data/default.yaml");

/// Plant growth and weather simulations with their mapping tables.
pub fn builtin_catalog() -> CatalogResult<Catalog> {
    let catalog: Catalog = serde_yaml::from_str(DEFAULT_CATALOG_YAML)?;
    validate_catalog(&catalog)?;
    Ok(catalog)
}

/// Raw text of the built-in catalog, for `--dump` style output.
pub fn builtin_catalog_yaml() -> &'static str {
    DEFAULT_CATALOG_YAML
}
