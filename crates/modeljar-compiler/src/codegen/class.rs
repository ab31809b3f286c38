// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Java class emission for a single data model.
//!
//! A class is assembled from fixed fragments, always in this order:
//! package, imports, fields, constructors, accessors, `toString`, `equals`,
//! `hashCode`. `equals` and `hashCode` walk the fields in declaration order.

use std::collections::BTreeSet;

use modeljar_dsl::{DataModel, DataModelField, FieldType};
use serde_json::Value;

use super::type_mapper::{ResolvedType, TypeTable};
use super::writer::{SourceWriter, capitalize_first, java_string_literal};

/// A field paired with its resolved Java type.
struct FieldPlan<'a> {
    field: &'a DataModelField,
    java_type: ResolvedType,
}

/// Emits the Java source of one data model.
pub struct ClassEmitter<'a> {
    model: &'a DataModel,
    table: &'a TypeTable,
    fields: Vec<FieldPlan<'a>>,
}

impl<'a> ClassEmitter<'a> {
    /// Resolve every field of `model` through `table`.
    pub fn new(model: &'a DataModel, table: &'a TypeTable) -> Self {
        let fields = model
            .fields
            .iter()
            .map(|field| FieldPlan {
                field,
                java_type: table.resolve(field),
            })
            .collect();
        Self {
            model,
            table,
            fields,
        }
    }

    /// Deduplicated union of the imports required by all fields.
    pub fn imports(&self) -> BTreeSet<String> {
        self.fields
            .iter()
            .flat_map(|plan| plan.java_type.imports.iter().cloned())
            .collect()
    }

    /// Emit the complete source text.
    pub fn emit(&self) -> String {
        let mut w = SourceWriter::new();

        self.emit_package(&mut w);
        self.emit_imports(&mut w);

        if let Some(description) = self.model.description.as_deref().filter(|d| !d.is_empty()) {
            w.javadoc(description);
        }
        w.block(format!("public class {}", self.model.name), |w| {
            w.blank();
            self.emit_fields(w);
            self.emit_constructors(w);
            self.emit_accessors(w);
            self.emit_to_string(w);
            self.emit_equals(w);
            self.emit_hash_code(w);
        });

        w.finish()
    }

    fn emit_package(&self, w: &mut SourceWriter) {
        if !self.model.package_name.is_empty() {
            w.line(format!("package {};", self.model.package_name));
            w.blank();
        }
    }

    fn emit_imports(&self, w: &mut SourceWriter) {
        let imports = self.imports();
        if imports.is_empty() {
            return;
        }
        for import in &imports {
            w.line(format!("import {};", import));
        }
        w.blank();
    }

    fn emit_fields(&self, w: &mut SourceWriter) {
        for plan in &self.fields {
            if let Some(description) = plan.field.description() {
                w.javadoc(description);
            }
            w.line(format!(
                "private {} {};",
                plan.java_type.name, plan.field.name
            ));
            w.blank();
        }
    }

    fn emit_constructors(&self, w: &mut SourceWriter) {
        let class_name = &self.model.name;

        w.block(format!("public {}()", class_name), |w| {
            for plan in &self.fields {
                if let Some(init) = self.initializer(plan.field) {
                    w.line(format!("this.{} = {};", plan.field.name, init));
                }
            }
        });
        w.blank();

        if !self.model.has_required_fields() {
            return;
        }
        let required: Vec<&FieldPlan<'_>> =
            self.fields.iter().filter(|p| p.field.required).collect();

        let params = required
            .iter()
            .map(|p| format!("{} {}", p.java_type.name, p.field.name))
            .collect::<Vec<_>>()
            .join(", ");
        w.block(format!("public {}({})", class_name, params), |w| {
            for plan in &required {
                w.line(format!("this.{0} = {0};", plan.field.name));
            }
            for plan in self.fields.iter().filter(|p| !p.field.required) {
                if let Some(init) = self.initializer(plan.field) {
                    w.line(format!("this.{} = {};", plan.field.name, init));
                }
            }
        });
        w.blank();
    }

    fn emit_accessors(&self, w: &mut SourceWriter) {
        for plan in &self.fields {
            let name = &plan.field.name;
            let java_type = &plan.java_type.name;
            let suffix = capitalize_first(name);

            w.block(format!("public {} get{}()", java_type, suffix), |w| {
                w.line(format!("return {};", name));
            });
            w.blank();

            w.block(
                format!("public void set{}({} {})", suffix, java_type, name),
                |w| {
                    w.line(format!("this.{0} = {0};", name));
                },
            );
            w.blank();
        }
    }

    fn emit_to_string(&self, w: &mut SourceWriter) {
        w.line("@Override");
        w.block("public String toString()", |w| {
            if self.fields.is_empty() {
                w.line(format!("return \"{}{{}}\";", self.model.name));
                return;
            }
            w.line(format!("return \"{}{{\" +", self.model.name));
            for (i, plan) in self.fields.iter().enumerate() {
                let separator = if i == 0 { "" } else { ", " };
                w.line(format!(
                    "        \"{}{}='\" + {} + '\\'' +",
                    separator, plan.field.name, plan.field.name
                ));
            }
            w.line("        '}';");
        });
        w.blank();
    }

    fn emit_equals(&self, w: &mut SourceWriter) {
        let class_name = &self.model.name;

        w.line("@Override");
        w.block("public boolean equals(Object o)", |w| {
            w.line("if (this == o) return true;");
            w.line("if (o == null || getClass() != o.getClass()) return false;");
            if self.fields.is_empty() {
                w.line("return true;");
                return;
            }
            w.line(format!("{0} that = ({0}) o;", class_name));

            let last = self.fields.len() - 1;
            for (i, plan) in self.fields.iter().enumerate() {
                let name = &plan.field.name;
                let comparison = if plan.field.field_type.is_reference() {
                    format!("java.util.Objects.equals(this.{0}, that.{0})", name)
                } else {
                    format!("this.{0} == that.{0}", name)
                };
                let prefix = if i == 0 { "return " } else { "       " };
                let suffix = if i == last { ";" } else { " &&" };
                w.line(format!("{}{}{}", prefix, comparison, suffix));
            }
        });
        w.blank();
    }

    fn emit_hash_code(&self, w: &mut SourceWriter) {
        let names = self
            .fields
            .iter()
            .map(|p| p.field.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        w.line("@Override");
        w.block("public int hashCode()", |w| {
            w.line(format!("return java.util.Objects.hash({});", names));
        });
    }

    /// Constructor initializer for a field, if it gets one.
    ///
    /// `array` fields always start as an empty collection; everything else is
    /// initialized only when it declares a default.
    fn initializer(&self, field: &DataModelField) -> Option<String> {
        if field.field_type == FieldType::Array {
            return Some(self.table.empty_collection().to_string());
        }
        field
            .default_value()
            .map(|value| format_default_value(field, value, self.table))
    }
}

/// Render a declared default value as a Java expression for the field's type.
pub fn format_default_value(field: &DataModelField, value: &Value, table: &TypeTable) -> String {
    let text = plain_text(value);
    match field.field_type {
        FieldType::String | FieldType::Enum => java_string_literal(&text),
        FieldType::Number | FieldType::Boolean => text,
        FieldType::Date if text.is_empty() => "LocalDateTime.now()".to_string(),
        FieldType::Date => format!("LocalDateTime.parse({})", java_string_literal(&text)),
        FieldType::Array => table.empty_collection().to_string(),
        FieldType::Object | FieldType::Other(_) => "null".to_string(),
    }
}

/// String form of a JSON value: string contents verbatim, anything else as JSON text.
fn plain_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
