// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Field type to Java type mapping.
//!
//! The lookup tables live in a [`TypeTable`] value that callers build once and
//! pass by reference, so tests can swap in alternate mappings.

use std::collections::{BTreeSet, HashMap};

use modeljar_dsl::{DataModelField, FieldType};

/// A resolved Java type for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedType {
    /// Java type as written in declarations, e.g. `List<String>`.
    pub name: String,
    /// Fully qualified classes that must be imported for this field.
    pub imports: BTreeSet<String>,
}

/// Immutable mapping from field type tags to Java types and imports.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: HashMap<String, String>,
    imports: HashMap<String, Vec<String>>,
    fallback: String,
    collection: String,
    empty_collection: String,
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::java()
    }
}

impl TypeTable {
    /// The standard Java mapping.
    pub fn java() -> Self {
        let types = [
            ("string", "String"),
            ("number", "double"),
            ("boolean", "boolean"),
            ("date", "java.time.LocalDateTime"),
            ("enum", "String"),
            ("object", "Object"),
            ("array", "java.util.List"),
        ];
        let imports = [
            ("date", vec!["java.time.LocalDateTime"]),
            ("array", vec!["java.util.List", "java.util.ArrayList"]),
        ];

        Self::builder()
            .types(types)
            .imports(imports)
            .fallback("Object")
            .collection("List", "new ArrayList<>()")
            .build()
    }

    /// Start an empty table. Unset collection settings default to the Java ones.
    pub fn builder() -> TypeTableBuilder {
        TypeTableBuilder::default()
    }

    /// Java type for a raw tag, if the tag is mapped.
    pub fn type_name(&self, tag: &str) -> Option<&str> {
        self.types.get(tag).map(String::as_str)
    }

    /// Imports required by a raw tag.
    pub fn imports_for(&self, tag: &str) -> &[String] {
        self.imports.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Type used for unknown tags and incomplete `array`/`object` fields.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// Expression that creates an empty collection for `array` fields.
    pub fn empty_collection(&self) -> &str {
        &self.empty_collection
    }

    /// Resolve the Java type and imports of a field.
    ///
    /// - `array` becomes `List<T>`, where `T` is `itemsType` mapped through this
    ///   table, `itemsType` verbatim if unmapped, or the fallback if absent.
    ///   Primitive element types are boxed.
    /// - `object` becomes `objectType` verbatim, or the fallback if absent.
    /// - Unknown tags become the fallback with no imports.
    pub fn resolve(&self, field: &DataModelField) -> ResolvedType {
        let tag = field.field_type.as_str();
        let mut imports: BTreeSet<String> = self.imports_for(tag).iter().cloned().collect();

        let name = match &field.field_type {
            FieldType::Array => {
                let item = match non_empty(field.items_type.as_deref()) {
                    Some(items_tag) => {
                        imports.extend(self.imports_for(items_tag).iter().cloned());
                        boxed(self.type_name(items_tag).unwrap_or(items_tag)).to_string()
                    }
                    None => {
                        tracing::debug!(
                            field = %field.name,
                            fallback = %self.fallback,
                            "Array field has no itemsType, using fallback element type"
                        );
                        self.fallback().to_string()
                    }
                };
                format!("{}<{}>", self.collection, item)
            }
            FieldType::Object => match non_empty(field.object_type.as_deref()) {
                Some(object_type) => object_type.to_string(),
                None => {
                    tracing::debug!(
                        field = %field.name,
                        fallback = %self.fallback,
                        "Object field has no objectType, using fallback type"
                    );
                    self.fallback().to_string()
                }
            },
            _ => self.type_name(tag).unwrap_or(self.fallback()).to_string(),
        };

        ResolvedType { name, imports }
    }
}

/// Wrapper class of a primitive type; other types are returned unchanged.
pub fn boxed(java_type: &str) -> &str {
    match java_type {
        "boolean" => "Boolean",
        "byte" => "Byte",
        "char" => "Character",
        "short" => "Short",
        "int" => "Integer",
        "long" => "Long",
        "float" => "Float",
        "double" => "Double",
        other => other,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Builder for alternate [`TypeTable`]s.
#[derive(Debug, Default)]
pub struct TypeTableBuilder {
    types: HashMap<String, String>,
    imports: HashMap<String, Vec<String>>,
    fallback: Option<String>,
    collection: Option<(String, String)>,
}

impl TypeTableBuilder {
    /// Add tag to type mappings.
    pub fn types<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.types
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Add tag to import mappings.
    pub fn imports<I, K, V>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<V>)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.imports.extend(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect())),
        );
        self
    }

    /// Set the fallback type.
    pub fn fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = Some(fallback.into());
        self
    }

    /// Set the generic collection type and its empty literal.
    pub fn collection(mut self, name: impl Into<String>, empty: impl Into<String>) -> Self {
        self.collection = Some((name.into(), empty.into()));
        self
    }

    /// Finish the table.
    pub fn build(self) -> TypeTable {
        let (collection, empty_collection) = self
            .collection
            .unwrap_or_else(|| ("List".to_string(), "new ArrayList<>()".to_string()));
        TypeTable {
            types: self.types,
            imports: self.imports,
            fallback: self.fallback.unwrap_or_else(|| "Object".to_string()),
            collection,
            empty_collection,
        }
    }
}
