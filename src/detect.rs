//! Violation detection: a read-only pass over type groups.

use crate::config::Config;
use crate::model::TypeGroup;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// The kind of ordering violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    ConstructorOrdering,
    ExportOrdering,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::ConstructorOrdering => write!(f, "constructor ordering"),
            ViolationKind::ExportOrdering => write!(f, "exported before unexported"),
        }
    }
}

/// A single ordering violation.
#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    /// Type whose method order diverges.
    pub type_name: String,
    /// The offending method.
    pub method_name: String,
    /// 1-based position of the offending method.
    pub line: usize,
    pub column: usize,
    /// Byte offset of the offending method, used for stable ordering.
    #[serde(skip)]
    pub start_offset: usize,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.line, self.column, self.message)
    }
}

/// Detects ordering violations across a file's type groups.
///
/// Purely functional: identical input yields an identical violation list.
pub struct Detector<'a> {
    config: &'a Config,
}

impl<'a> Detector<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Check every type group and return violations sorted ascending by the
    /// offending method's source position.
    pub fn detect(&self, groups: &BTreeMap<String, TypeGroup>) -> Vec<Violation> {
        let mut violations = Vec::new();

        for group in groups.values() {
            if group.methods.len() <= 1 {
                continue;
            }
            if self.config.check_constructor {
                check_constructor_ordering(group, &mut violations);
            }
            if self.config.check_exported {
                check_export_ordering(group, &mut violations);
            }
        }

        violations.sort_by_key(|v| v.start_offset);
        violations
    }
}

/// Constructors must appear before exported (non-constructor) methods.
/// Reported once per constructor, against the first exported method that
/// precedes it.
fn check_constructor_ordering(group: &TypeGroup, violations: &mut Vec<Violation>) {
    for constructor in group.constructors() {
        let preceding = group
            .exported_methods()
            .find(|exported| exported.start_offset < constructor.start_offset);
        if let Some(exported) = preceding {
            violations.push(Violation {
                kind: ViolationKind::ConstructorOrdering,
                type_name: group.type_name.clone(),
                method_name: constructor.name.clone(),
                line: constructor.line,
                column: constructor.column,
                start_offset: constructor.start_offset,
                message: format!(
                    "constructor {} should appear before exported method {}",
                    constructor.name, exported.name
                ),
            });
        }
    }
}

/// Exported methods must appear before unexported methods. Reported once
/// per unexported method, against the first exported method that follows it.
fn check_export_ordering(group: &TypeGroup, violations: &mut Vec<Violation>) {
    for unexported in group.unexported_methods() {
        let following = group
            .exported_methods()
            .find(|exported| exported.start_offset > unexported.start_offset);
        if let Some(exported) = following {
            violations.push(Violation {
                kind: ViolationKind::ExportOrdering,
                type_name: group.type_name.clone(),
                method_name: unexported.name.clone(),
                line: unexported.line,
                column: unexported.column,
                start_offset: unexported.start_offset,
                message: format!(
                    "unexported method {} should appear after exported method {}",
                    unexported.name, exported.name
                ),
            });
        }
    }
}
