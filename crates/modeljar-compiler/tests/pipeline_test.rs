// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Integration tests for the request-to-JAR pipeline.
//!
//! All tests use the in-process mock toolchain, so no JDK is required:
//! ```bash
//! cargo test -p modeljar-compiler --test pipeline_test
//! ```

mod common;

use std::sync::Arc;

use chrono::NaiveDate;
use common::{build_time, customer_request, entry_paths, mock_compiler, numeric_model, request_for};
use modeljar_compiler::archive::{KMODULE_PATH, MANIFEST_PATH, parse_manifest};
use modeljar_compiler::{
    BatchMode, CompileError, DataModelField, FieldType, GenerationError, MockToolchain,
    ModelCompiler, read_archive,
};
use serde_json::json;

// ============================================================================
// Archive Layout
// ============================================================================

#[test]
fn test_independent_models_give_n_plus_one_entries() {
    let request = request_for(vec![
        numeric_model("com.a", "One", &["x"]),
        numeric_model("com.a", "Two", &["x", "y"]),
        numeric_model("com.b", "Three", &[]),
        numeric_model("", "Four", &["z"]),
    ]);

    let jar = mock_compiler()
        .compile_request_at(&request, build_time())
        .expect("Compilation failed");

    assert_eq!(jar.class_count, 4);
    assert_eq!(
        entry_paths(&jar.bytes),
        vec![
            MANIFEST_PATH,
            "Four.class",
            "com/a/One.class",
            "com/a/Two.class",
            "com/b/Three.class",
        ]
    );
}

#[test]
fn test_rules_payload_gives_n_plus_three_entries() {
    let jar = mock_compiler()
        .compile_request_at(&customer_request(), build_time())
        .expect("Compilation failed");

    let paths = entry_paths(&jar.bytes);
    assert_eq!(paths.len(), 3 + 3);
    assert_eq!(paths[0], MANIFEST_PATH);
    assert_eq!(
        &paths[1..4],
        &[
            "com/example/billing/Invoice.class",
            "com/example/crm/Address.class",
            "com/example/crm/Customer.class",
        ]
    );
    assert_eq!(paths[4], "com/rules/Customer Rules.drl");
    assert_eq!(paths[5], KMODULE_PATH);
}

#[test]
fn test_rules_payload_is_stored_verbatim() {
    let request = customer_request();
    let jar = mock_compiler()
        .compile_request_at(&request, build_time())
        .unwrap();

    let entries = read_archive(&jar.bytes).unwrap();
    let drl = entries
        .iter()
        .find(|e| e.path.ends_with(".drl"))
        .expect("rules entry missing");
    assert_eq!(
        drl.bytes,
        request.drools_content.as_deref().unwrap().as_bytes()
    );
}

#[test]
fn test_empty_rules_payload_is_not_bundled() {
    let mut request = customer_request();
    request.drools_content = Some(String::new());

    let jar = mock_compiler()
        .compile_request_at(&request, build_time())
        .unwrap();
    assert_eq!(entry_paths(&jar.bytes).len(), 3 + 1);
}

#[test]
fn test_archive_filename_from_request() {
    let jar = mock_compiler()
        .compile_request_at(&customer_request(), build_time())
        .unwrap();
    assert_eq!(jar.filename, "customer-rules-2.0.jar");
}

// ============================================================================
// Manifest and Round Trip
// ============================================================================

#[test]
fn test_manifest_is_first_and_parses() {
    let jar = mock_compiler()
        .compile_request_at(&customer_request(), build_time())
        .unwrap();

    let entries = read_archive(&jar.bytes).unwrap();
    let manifest = String::from_utf8(entries[0].bytes.clone()).expect("manifest is not UTF-8");
    let attributes = parse_manifest(&manifest);
    let get = |key: &str| {
        attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    };

    assert_eq!(get("Manifest-Version"), Some("1.0"));
    assert_eq!(get("Implementation-Title"), Some("Customer Rules"));
    assert_eq!(get("Implementation-Version"), Some("2.0"));
    assert_eq!(get("Implementation-Vendor"), Some("Web Rules"));
    assert_eq!(
        get("Implementation-Description"),
        Some("Compiled data models from Web Rules Editor")
    );
    assert_eq!(get("Created-By"), Some("Web Rules Java Compiler Service"));
    assert_eq!(get("Build-Time"), Some("2025-04-02T10:15:30.123456"));
}

#[test]
fn test_class_entries_round_trip() {
    let compiler = mock_compiler();
    let request = customer_request();

    let artifacts = compiler.compile_models(&request.data_models).unwrap();
    let jar = compiler.compile_request_at(&request, build_time()).unwrap();
    let entries = read_archive(&jar.bytes).unwrap();

    for (name, bytes) in artifacts.iter() {
        let path = format!("{}.class", name.replace('.', "/"));
        let entry = entries
            .iter()
            .find(|e| e.path == path)
            .unwrap_or_else(|| panic!("missing {}", path));
        assert_eq!(entry.bytes, bytes);
        assert_eq!(entry.size, bytes.len() as u64);
        assert!(entry.deflated);
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn test_same_request_same_bytes() {
    let compiler = mock_compiler();
    let first = compiler
        .compile_request_at(&customer_request(), build_time())
        .unwrap();
    let second = compiler
        .compile_request_at(&customer_request(), build_time())
        .unwrap();

    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.checksum, second.checksum);
}

#[test]
fn test_only_build_time_differs_between_builds() {
    let compiler = mock_compiler();
    let later = NaiveDate::from_ymd_opt(2026, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();

    let first = read_archive(
        &compiler
            .compile_request_at(&customer_request(), build_time())
            .unwrap()
            .bytes,
    )
    .unwrap();
    let second = read_archive(
        &compiler
            .compile_request_at(&customer_request(), later)
            .unwrap()
            .bytes,
    )
    .unwrap();

    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(&second).skip(1) {
        assert_eq!(a.path, b.path);
        assert_eq!(a.bytes, b.bytes, "{} differs", a.path);
    }

    let strip_build_time = |bytes: &[u8]| {
        parse_manifest(&String::from_utf8_lossy(bytes))
            .into_iter()
            .filter(|(k, _)| k != "Build-Time")
            .collect::<Vec<_>>()
    };
    assert_eq!(
        strip_build_time(&first[0].bytes),
        strip_build_time(&second[0].bytes)
    );
}

#[test]
fn test_concurrent_requests_are_isolated() {
    let compiler = mock_compiler();
    let expected = compiler
        .compile_request_at(&customer_request(), build_time())
        .unwrap()
        .bytes;

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    compiler
                        .compile_request_at(&customer_request(), build_time())
                        .unwrap()
                        .bytes
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

// ============================================================================
// Generated Sources
// ============================================================================

#[test]
fn test_required_and_default_fields_compile() {
    let mut id = DataModelField::new("id", FieldType::Number);
    id.required = true;
    let mut label = DataModelField::new("label", FieldType::String);
    label.default_value = Some(json!("x"));

    let mut model = numeric_model("com.example", "Item", &[]);
    model.fields = vec![id, label];

    let compiler = mock_compiler();
    let request = request_for(vec![model.clone()]);
    let units = compiler.generate_sources(&request).unwrap();
    assert!(units[0].source().contains("public Item(double id) {"));
    assert!(units[0].source().contains("this.label = \"x\";"));

    let artifacts = compiler.compile_models(&[model]).unwrap();
    assert_eq!(artifacts.names().collect::<Vec<_>>(), vec!["com.example.Item"]);
}

#[test]
fn test_default_value_rendering() {
    let units = mock_compiler()
        .generate_sources(&customer_request())
        .unwrap();
    let source = |name: &str| {
        units
            .iter()
            .find(|u| u.qualified_name() == name)
            .map(|u| u.source().to_string())
            .unwrap_or_else(|| panic!("missing unit {}", name))
    };

    let customer = source("com.example.crm.Customer");
    assert!(customer.contains("this.segment = \"retail\";"));
    assert!(customer.contains("this.vip = false;"));
    assert!(customer.contains("this.lifetimeValue = 0;"));
    assert!(customer.contains("this.since = LocalDateTime.now();"));
    assert!(customer.contains("this.tags = new ArrayList<>();"));
    assert!(!customer.contains("\"new\""));
    assert!(customer.contains("private Object notes;"));

    let address = source("com.example.crm.Address");
    assert!(address.contains(r#"this.city = "Warsaw \"Centrum\"";"#));
    assert!(address.contains(r#"this.validFrom = LocalDateTime.parse("2024-01-01T00:00:00");"#));

    let invoice = source("com.example.billing.Invoice");
    assert!(invoice.contains("private List<Double> lines;"));
    assert!(invoice.contains("public Invoice(String number, double total) {"));
}

#[test]
fn test_sources_keep_request_order() {
    let units = mock_compiler()
        .generate_sources(&customer_request())
        .unwrap();
    let names: Vec<&str> = units.iter().map(|u| u.qualified_name()).collect();
    assert_eq!(
        names,
        vec![
            "com.example.crm.Customer",
            "com.example.crm.Address",
            "com.example.billing.Invoice",
        ]
    );
}

// ============================================================================
// Failure Policy
// ============================================================================

#[test]
fn test_uncompilable_model_fails_whole_request() {
    let mut ghost = DataModelField::new("ghost", FieldType::Object);
    ghost.object_type = Some("com.missing.Ghost".to_string());
    let mut broken = numeric_model("com.a", "Second", &["x"]);
    broken.fields.push(ghost);

    let models = vec![
        numeric_model("com.a", "First", &["x"]),
        broken,
        numeric_model("com.a", "Third", &["x"]),
    ];

    for batch_mode in [BatchMode::PerModel, BatchMode::SingleBatch] {
        let compiler = mock_compiler().with_batch_mode(batch_mode);

        let err = compiler.compile_models(&models).unwrap_err();
        let CompileError::Compilation { message, .. } = &err else {
            panic!("expected compilation error, got {:?}", err);
        };
        assert!(message.contains("com.missing.Ghost"), "{}", message);
        assert!(!err.is_client_error());

        let err = compiler
            .compile_request_at(&request_for(models.clone()), build_time())
            .unwrap_err();
        assert!(matches!(err, CompileError::Compilation { .. }));
    }
}

#[test]
fn test_cross_references_depend_on_batch_mode() {
    let mut customer_ref = DataModelField::new("customer", FieldType::Object);
    customer_ref.object_type = Some("com.shop.Customer".to_string());
    let mut order = numeric_model("com.shop", "Order", &["total"]);
    order.fields.push(customer_ref);
    let models = vec![order, numeric_model("com.shop", "Customer", &["id"])];

    let per_model = mock_compiler().compile_models(&models);
    assert!(matches!(per_model, Err(CompileError::Compilation { .. })));

    let single = mock_compiler()
        .with_batch_mode(BatchMode::SingleBatch)
        .compile_models(&models)
        .unwrap();
    assert_eq!(single.len(), 2);
}

#[test]
fn test_batch_modes_agree_on_independent_models() {
    let request = customer_request();
    let per_model = mock_compiler()
        .compile_models(&request.data_models)
        .unwrap();
    let single = mock_compiler()
        .with_batch_mode(BatchMode::SingleBatch)
        .compile_models(&request.data_models)
        .unwrap();
    assert_eq!(per_model, single);
}

#[test]
fn test_empty_request_is_client_error() {
    let err = mock_compiler()
        .compile_request(&request_for(vec![]))
        .unwrap_err();
    assert!(err.is_client_error());
    assert!(err.to_string().contains("[E001]"));
}

#[test]
fn test_names_breaking_generated_source_are_client_errors() {
    let mut java_field = numeric_model("com.p", "Holder", &["x"]);
    java_field
        .fields
        .push(DataModelField::new("java", FieldType::String));

    for model in [
        numeric_model("com.p", "record", &["x"]),
        numeric_model("com.p", "var", &[]),
        java_field,
    ] {
        let err = mock_compiler()
            .compile_request_at(&request_for(vec![model]), build_time())
            .unwrap_err();
        assert!(err.is_client_error(), "{}", err);
        assert!(matches!(err, CompileError::Validation(_)));
    }
}

#[test]
fn test_duplicate_qualified_names_are_rejected() {
    let models = vec![
        numeric_model("com.a", "Same", &["x"]),
        numeric_model("com.a", "Same", &["y"]),
    ];
    let err = mock_compiler()
        .compile_request(&request_for(models))
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::Generation(GenerationError::DuplicateQualifiedName { .. })
    ));
}

#[test]
fn test_missing_toolchain_is_distinct() {
    let compiler = ModelCompiler::new(Arc::new(MockToolchain::unavailable()));
    let err = compiler
        .compile_request(&customer_request())
        .unwrap_err();
    assert!(err.is_toolchain_unavailable());
    assert!(!err.is_client_error());
}
