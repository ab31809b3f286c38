// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Specification Generation Module
//!
//! Generates the JSON Schema of the compile request so the editor and the
//! request layer can validate payloads against the same definitions the
//! compiler deserializes.

pub mod request_schema;

pub use request_schema::{FIELD_TYPE_TAGS, generate_request_schema};
