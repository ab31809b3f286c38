// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared helpers for pipeline integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use modeljar_compiler::{
    CompileRequest, DataModel, DataModelField, FieldType, MockToolchain, ModelCompiler,
    read_archive,
};

/// The sample request with three models and a rules payload.
pub fn customer_request() -> CompileRequest {
    serde_json::from_str(include_str!("../fixtures/customer_models.json"))
        .expect("Failed to parse fixture request")
}

/// A compiler backed by the in-process mock toolchain.
pub fn mock_compiler() -> ModelCompiler {
    ModelCompiler::new(Arc::new(MockToolchain::new()))
}

/// Fixed build time so archives are comparable.
pub fn build_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 2)
        .unwrap()
        .and_hms_micro_opt(10, 15, 30, 123456)
        .unwrap()
}

/// Entry paths of an archive in stored order.
pub fn entry_paths(bytes: &[u8]) -> Vec<String> {
    read_archive(bytes)
        .expect("Failed to read archive")
        .into_iter()
        .map(|e| e.path)
        .collect()
}

/// A model with one `number` field per name.
pub fn numeric_model(package: &str, name: &str, fields: &[&str]) -> DataModel {
    DataModel {
        name: name.to_string(),
        package_name: package.to_string(),
        fields: fields
            .iter()
            .map(|f| DataModelField::new(*f, FieldType::Number))
            .collect(),
        ..Default::default()
    }
}

/// A request holding `models` and nothing else.
pub fn request_for(models: Vec<DataModel>) -> CompileRequest {
    CompileRequest {
        data_models: models,
        ..Default::default()
    }
}
