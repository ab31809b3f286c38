// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! JAR assembly.
//!
//! Entry order is fixed: the manifest, then classes sorted by name, then the
//! optional rules file and its module descriptor. Every entry is deflated and
//! stamped with the build time, so the same inputs and timestamp always give
//! the same bytes.

use std::io::{Cursor, Read, Write};

use chrono::{Datelike, NaiveDateTime, Timelike};
use minijinja::{Environment, context};
use thiserror::Error;
use zip::{CompressionMethod, ZipArchive, ZipWriter, write::SimpleFileOptions};

use crate::engine::CompiledArtifacts;

/// Path of the manifest entry.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";
/// Path of the rule module descriptor.
pub const KMODULE_PATH: &str = "META-INF/kmodule.xml";
/// Archive directory holding the rules file.
pub const RULES_DIR: &str = "com/rules";
/// Rules file stem used when no rule name is given.
pub const DEFAULT_RULES_NAME: &str = "Rules";
/// `Created-By` manifest value.
pub const CREATED_BY: &str = "Web Rules Java Compiler Service";

const KBASE_NAME: &str = "rulesKBase";
const KSESSION_NAME: &str = "rulesKSession";

/// Manifest lines may not be longer than this many bytes.
const MANIFEST_LINE_LIMIT: usize = 72;

const KMODULE_TEMPLATE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<kmodule xmlns="http://www.drools.org/xsd/kmodule">
    <kbase name="{{ kbase }}" packages="{{ packages }}">
        <ksession name="{{ ksession }}" />
    </kbase>
</kmodule>
"#;

/// Errors raised while writing or reading an archive.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PackagingError {
    /// Zip writer or reader failure.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing entry contents failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The module descriptor template failed to render.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The build time cannot be stored in a zip entry.
    #[error("invalid build time {0}: zip timestamps cover 1980 to 2107")]
    InvalidTimestamp(NaiveDateTime),
}

/// Manifest attributes describing the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMetadata {
    /// `Implementation-Title`
    pub title: String,
    /// `Implementation-Version`
    pub version: String,
    /// `Implementation-Vendor`
    pub vendor: String,
    /// `Implementation-Description`
    pub description: String,
}

impl Default for ArchiveMetadata {
    fn default() -> Self {
        Self {
            title: "Compiled Models".to_string(),
            version: "1.0.0".to_string(),
            vendor: "Web Rules".to_string(),
            description: "Compiled Data Models".to_string(),
        }
    }
}

/// Optional rule text bundled next to the classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulesPayload {
    /// Rules file stem, `Rules` if absent.
    pub name: Option<String>,
    /// Rule source, stored verbatim.
    pub content: Option<String>,
    /// Whether the caller asked for the rules to be bundled.
    pub include: bool,
}

impl RulesPayload {
    /// Rule text to bundle: present only when included and non-empty.
    pub fn bundled_content(&self) -> Option<&str> {
        if !self.include {
            return None;
        }
        self.content.as_deref().filter(|c| !c.is_empty())
    }

    /// Archive path of the rules file.
    pub fn entry_path(&self) -> String {
        let name = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(DEFAULT_RULES_NAME);
        format!("{}/{}.drl", RULES_DIR, name)
    }
}

/// One entry read back from an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Path inside the archive.
    pub path: String,
    /// Uncompressed size.
    pub size: u64,
    /// Whether the entry is deflated.
    pub deflated: bool,
    /// Uncompressed contents.
    pub bytes: Vec<u8>,
}

/// Archive path of a compiled class: `com.example.Person` -> `com/example/Person.class`.
pub fn class_entry_path(class_name: &str) -> String {
    format!("{}.class", class_name.replace('.', "/"))
}

/// Build the JAR bytes.
///
/// # Errors
///
/// Returns `PackagingError` if the zip writer fails, the descriptor template
/// fails to render, or `build_time` is outside the zip timestamp range.
pub fn build_archive(
    artifacts: &CompiledArtifacts,
    metadata: &ArchiveMetadata,
    rules: Option<&RulesPayload>,
    build_time: NaiveDateTime,
) -> Result<Vec<u8>, PackagingError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip_timestamp(build_time)?);

    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);

        zip.start_file(MANIFEST_PATH, options)?;
        zip.write_all(render_manifest(metadata, build_time).as_bytes())?;
        tracing::debug!("Added MANIFEST.MF");

        for (name, bytes) in artifacts.iter() {
            let path = class_entry_path(name);
            zip.start_file(path.as_str(), options)?;
            zip.write_all(bytes)?;
            tracing::debug!(path = %path, size_bytes = bytes.len(), "Added class");
        }

        if let Some(payload) = rules
            && let Some(content) = payload.bundled_content()
        {
            let path = payload.entry_path();
            zip.start_file(path.as_str(), options)?;
            zip.write_all(content.as_bytes())?;
            tracing::debug!(path = %path, "Added rules file");

            zip.start_file(KMODULE_PATH, options)?;
            zip.write_all(render_kmodule(&RULES_DIR.replace('/', "."))?.as_bytes())?;
            tracing::debug!("Added kmodule.xml");
        }

        zip.finish()?;
    }

    let bytes = buffer.into_inner();
    tracing::info!(
        class_count = artifacts.len(),
        size_bytes = bytes.len(),
        "Built JAR"
    );
    Ok(bytes)
}

fn zip_timestamp(time: NaiveDateTime) -> Result<zip::DateTime, PackagingError> {
    let year = u16::try_from(time.year()).map_err(|_| PackagingError::InvalidTimestamp(time))?;
    zip::DateTime::from_date_and_time(
        year,
        time.month() as u8,
        time.day() as u8,
        time.hour() as u8,
        time.minute() as u8,
        time.second().min(59) as u8,
    )
    .map_err(|_| PackagingError::InvalidTimestamp(time))
}

/// Format a build time the way the manifest records it.
pub fn format_build_time(time: &NaiveDateTime) -> String {
    time.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}

/// Render the manifest main section.
///
/// Lines end in CRLF and are wrapped at 72 bytes with single-space
/// continuation lines; the section ends with an empty line.
pub fn render_manifest(metadata: &ArchiveMetadata, build_time: NaiveDateTime) -> String {
    let build_time = format_build_time(&build_time);
    let attributes = [
        ("Manifest-Version", "1.0"),
        ("Implementation-Title", metadata.title.as_str()),
        ("Implementation-Version", metadata.version.as_str()),
        ("Implementation-Vendor", metadata.vendor.as_str()),
        ("Implementation-Description", metadata.description.as_str()),
        ("Created-By", CREATED_BY),
        ("Build-Time", build_time.as_str()),
    ];

    let mut out = String::new();
    for (name, value) in attributes {
        write_attribute(&mut out, name, value);
    }
    out.push_str("\r\n");
    out
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    // Values cannot span lines.
    let value: String = value
        .chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect();
    let line = format!("{}: {}", name, value);

    let mut rest = line.as_str();
    let mut limit = MANIFEST_LINE_LIMIT;
    loop {
        if rest.len() <= limit {
            out.push_str(rest);
            out.push_str("\r\n");
            return;
        }
        let mut cut = limit;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        out.push_str(&rest[..cut]);
        out.push_str("\r\n ");
        rest = &rest[cut..];
        limit = MANIFEST_LINE_LIMIT - 1;
    }
}

/// Parse a manifest main section into `(name, value)` pairs, joining
/// continuation lines.
pub fn parse_manifest(text: &str) -> Vec<(String, String)> {
    let mut logical: Vec<String> = Vec::new();
    for line in text.split("\r\n").flat_map(|l| l.split('\n')) {
        if let Some(continuation) = line.strip_prefix(' ') {
            if let Some(last) = logical.last_mut() {
                last.push_str(continuation);
            }
        } else if line.is_empty() {
            break;
        } else {
            logical.push(line.to_string());
        }
    }

    logical
        .into_iter()
        .filter_map(|line| {
            line.split_once(": ")
                .map(|(name, value)| (name.to_string(), value.to_string()))
        })
        .collect()
}

/// Render `META-INF/kmodule.xml` for the given rule packages.
pub fn render_kmodule(packages: &str) -> Result<String, PackagingError> {
    let mut env = Environment::new();
    env.set_keep_trailing_newline(true);
    env.add_template("kmodule.xml", KMODULE_TEMPLATE)?;
    let template = env.get_template("kmodule.xml")?;
    let rendered = template.render(context! {
        kbase => KBASE_NAME,
        packages => packages,
        ksession => KSESSION_NAME,
    })?;
    Ok(rendered)
}

/// List the entries of an archive in stored order.
pub fn read_archive(bytes: &[u8]) -> Result<Vec<ArchiveEntry>, PackagingError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::with_capacity(archive.len());

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut contents = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut contents)?;
        entries.push(ArchiveEntry {
            path: file.name().to_string(),
            size: file.size(),
            deflated: file.compression() == CompressionMethod::Deflated,
            bytes: contents,
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    fn build_time() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_micro_opt(9, 26, 53, 589793)
            .unwrap()
    }

    fn artifacts(names: &[&str]) -> CompiledArtifacts {
        let classes: BTreeMap<String, Vec<u8>> = names
            .iter()
            .map(|n| (n.to_string(), vec![0xCA, 0xFE, 0xBA, 0xBE]))
            .collect();
        CompiledArtifacts::from(classes)
    }

    fn paths(bytes: &[u8]) -> Vec<String> {
        read_archive(bytes)
            .unwrap()
            .into_iter()
            .map(|e| e.path)
            .collect()
    }

    #[test]
    fn test_entry_order_without_rules() {
        let bytes = build_archive(
            &artifacts(&["com.z.Zeta", "com.a.Alpha"]),
            &ArchiveMetadata::default(),
            None,
            build_time(),
        )
        .unwrap();
        assert_eq!(
            paths(&bytes),
            vec![MANIFEST_PATH, "com/a/Alpha.class", "com/z/Zeta.class"]
        );
        assert!(read_archive(&bytes).unwrap().iter().all(|e| e.deflated));
    }

    #[test]
    fn test_rules_are_bundled_after_classes() {
        let rules = RulesPayload {
            name: Some("pricing".to_string()),
            content: Some("rule \"r\" when then end".to_string()),
            include: true,
        };
        let bytes = build_archive(
            &artifacts(&["com.a.Alpha"]),
            &ArchiveMetadata::default(),
            Some(&rules),
            build_time(),
        )
        .unwrap();

        let entries = read_archive(&bytes).unwrap();
        let names: Vec<&str> = entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(
            names,
            vec![MANIFEST_PATH, "com/a/Alpha.class", "com/rules/pricing.drl", KMODULE_PATH]
        );
        assert_eq!(entries[2].bytes, b"rule \"r\" when then end");

        let kmodule = String::from_utf8(entries[3].bytes.clone()).unwrap();
        assert!(kmodule.contains(r#"<kbase name="rulesKBase" packages="com.rules">"#));
        assert!(kmodule.contains(r#"<ksession name="rulesKSession" />"#));
        assert!(kmodule.ends_with("</kmodule>\n"));
    }

    #[test]
    fn test_rules_skipped_when_not_included_or_empty() {
        let excluded = RulesPayload {
            name: None,
            content: Some("rule".to_string()),
            include: false,
        };
        let empty = RulesPayload {
            name: None,
            content: Some(String::new()),
            include: true,
        };
        for rules in [excluded, empty] {
            let bytes = build_archive(
                &artifacts(&["A"]),
                &ArchiveMetadata::default(),
                Some(&rules),
                build_time(),
            )
            .unwrap();
            assert_eq!(paths(&bytes), vec![MANIFEST_PATH, "A.class"]);
        }
    }

    #[test]
    fn test_default_rules_name() {
        let rules = RulesPayload {
            name: None,
            content: Some("x".to_string()),
            include: true,
        };
        assert_eq!(rules.entry_path(), "com/rules/Rules.drl");
    }

    #[test]
    fn test_manifest_contents() {
        let metadata = ArchiveMetadata {
            title: "my-rule".to_string(),
            version: "2.0".to_string(),
            vendor: "Web Rules".to_string(),
            description: "Compiled data models from Web Rules Editor".to_string(),
        };
        let manifest = render_manifest(&metadata, build_time());

        assert!(manifest.starts_with("Manifest-Version: 1.0\r\n"));
        assert!(manifest.ends_with("\r\n\r\n"));
        assert_eq!(
            parse_manifest(&manifest),
            vec![
                ("Manifest-Version".to_string(), "1.0".to_string()),
                ("Implementation-Title".to_string(), "my-rule".to_string()),
                ("Implementation-Version".to_string(), "2.0".to_string()),
                ("Implementation-Vendor".to_string(), "Web Rules".to_string()),
                (
                    "Implementation-Description".to_string(),
                    "Compiled data models from Web Rules Editor".to_string()
                ),
                ("Created-By".to_string(), CREATED_BY.to_string()),
                ("Build-Time".to_string(), "2025-03-14T09:26:53.589793".to_string()),
            ]
        );
    }

    #[test]
    fn test_manifest_wraps_long_lines() {
        let metadata = ArchiveMetadata {
            description: "ż".repeat(60),
            ..ArchiveMetadata::default()
        };
        let manifest = render_manifest(&metadata, build_time());

        for line in manifest.split("\r\n") {
            assert!(line.len() <= 72, "line too long: {:?}", line);
        }
        let parsed = parse_manifest(&manifest);
        let description = parsed
            .iter()
            .find(|(k, _)| k == "Implementation-Description")
            .map(|(_, v)| v.clone());
        assert_eq!(description, Some("ż".repeat(60)));
    }

    #[test]
    fn test_manifest_flattens_newlines() {
        let metadata = ArchiveMetadata {
            title: "two\nlines".to_string(),
            ..ArchiveMetadata::default()
        };
        let parsed = parse_manifest(&render_manifest(&metadata, build_time()));
        assert_eq!(parsed[1].1, "two lines");
    }

    #[test]
    fn test_same_inputs_same_bytes() {
        let build = || {
            build_archive(
                &artifacts(&["com.a.Alpha", "com.b.Beta"]),
                &ArchiveMetadata::default(),
                None,
                build_time(),
            )
            .unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_timestamp_out_of_zip_range() {
        let ancient = NaiveDate::from_ymd_opt(1970, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let err = build_archive(&artifacts(&["A"]), &ArchiveMetadata::default(), None, ancient)
            .unwrap_err();
        assert!(matches!(err, PackagingError::InvalidTimestamp(_)));
    }

    #[test]
    fn test_class_entry_path() {
        assert_eq!(class_entry_path("com.example.Person"), "com/example/Person.class");
        assert_eq!(class_entry_path("com.example.Person$Inner"), "com/example/Person$Inner.class");
    }
}
