use ts_catalog::{Catalog, ValidationError, builtin_catalog, validate_catalog};

fn builtin() -> Catalog {
    builtin_catalog().unwrap()
}

#[test]
fn builtin_catalog_is_valid() {
    validate_catalog(&builtin()).unwrap();
}

#[test]
fn duplicate_simulation_id_is_rejected() {
    let mut catalog = builtin();
    let copy = catalog.simulations[0].clone();
    catalog.simulations.push(copy);
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ValidationError::DuplicateId { .. })
    ));
}

#[test]
fn zero_max_trials_is_rejected() {
    let mut catalog = builtin();
    catalog.simulations[0].max_trials = 0;
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ValidationError::InvalidValue { .. })
    ));
}

#[test]
fn dataset_for_unknown_simulation_is_rejected() {
    let mut catalog = builtin();
    catalog.datasets[0].simulation_id = "missing".to_string();
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn mapping_with_undeclared_output_is_rejected() {
    let mut catalog = builtin();
    catalog.datasets[0].mappings[0]
        .outputs
        .insert("leaves".to_string(), 3.0);
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ValidationError::MissingReference { .. })
    ));
}

#[test]
fn future_version_is_rejected() {
    let mut catalog = builtin();
    catalog.version = ts_catalog::LATEST_VERSION + 1;
    assert!(matches!(
        validate_catalog(&catalog),
        Err(ValidationError::UnsupportedVersion { .. })
    ));
}
