// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for catalog loading

use photofx::catalog::BUILTIN_VERSION;
use photofx::{BackendKind, CatalogSource, FilterCatalog};
use std::io::Write;

#[test]
fn test_catalog_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "version": "7",
            "filters": [
                {{"id": "b", "name": "B", "category": "basic", "backend": "compute-pipeline", "order": 2,
                  "parameters": {{}}, "shaderConstants": {{"invertMix": 1.0}}}},
                {{"id": "a", "name": "A", "category": "basic", "backend": "none", "order": 0}}
            ]
        }}"#
    )
    .unwrap();

    let catalog = FilterCatalog::load(&CatalogSource::File(file.path().to_path_buf()));
    assert!(!catalog.is_fallback());
    assert_eq!(catalog.version(), "7");
    assert_eq!(catalog.name_list(), vec!["A", "B"]);
    assert_eq!(catalog.get_by_index(1).unwrap().id, "b");
}

#[test]
fn test_missing_file_falls_back_to_builtin() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");

    let catalog = FilterCatalog::load(&CatalogSource::File(missing.clone()));
    assert!(catalog.is_fallback());
    assert_eq!(catalog.version(), BUILTIN_VERSION);

    let list = catalog.sorted_list();
    assert_eq!(list.len(), 9);
    assert_eq!(list[0].order, 0);
    assert_eq!(list[0].backend, BackendKind::None);

    assert!(FilterCatalog::try_load(&CatalogSource::File(missing)).is_err());
}

#[test]
fn test_unparseable_source_falls_back_to_builtin() {
    let catalog = FilterCatalog::load(&CatalogSource::Json("{ not json".to_string()));
    assert!(catalog.is_fallback());
    assert_eq!(catalog.sorted_list().len(), 9);
    assert_eq!(catalog.sorted_list()[0].id, "original");
}

#[test]
fn test_stable_sort_keeps_source_sequence() {
    let json = r#"{
        "version": "t",
        "filters": [
            {"id": "late", "name": "Late", "backend": "none", "order": 5},
            {"id": "first-tie", "name": "First", "backend": "none", "order": 1},
            {"id": "second-tie", "name": "Second", "backend": "none", "order": 1},
            {"id": "third-tie", "name": "Third", "backend": "none", "order": 1}
        ]
    }"#;
    let catalog = FilterCatalog::load(&CatalogSource::Json(json.to_string()));
    let ids: Vec<&str> = catalog.sorted_list().iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["first-tie", "second-tie", "third-tie", "late"]);
}

#[test]
fn test_unknown_fields_ignored() {
    let json = r#"{
        "version": "t",
        "generator": "editor 3",
        "filters": [
            {"id": "x", "name": "X", "backend": "none", "order": 0, "thumbnail": "x.png"}
        ]
    }"#;
    let catalog = FilterCatalog::try_load(&CatalogSource::Json(json.to_string())).unwrap();
    let desc = catalog.get_by_id("x").unwrap();
    assert!(desc.parameters.is_empty());
    assert!(desc.shader_constants.is_none());
}

#[test]
fn test_embedded_catalog_backends() {
    let catalog = FilterCatalog::load(&CatalogSource::Embedded);
    assert!(!catalog.is_fallback());
    assert_eq!(catalog.get_by_index(0).unwrap().backend, BackendKind::None);
    assert_eq!(
        catalog.get_by_id("noir").unwrap().backend,
        BackendKind::LegacyPipeline
    );
    assert_eq!(
        catalog.get_by_id("invert").unwrap().backend,
        BackendKind::ComputePipeline
    );
}
