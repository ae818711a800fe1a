//! Results of a merge run.

use std::fmt;

use serde::Serialize;

use crate::ast::File;

/// A conflict-resolution decision taken while merging one unit.
///
/// Decisions are not errors: they record how a collision was resolved so that
/// callers and tests can inspect the run without scraping logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Decision {
    /// First import of an alias; added to the output import group.
    ImportAdded {
        unit: usize,
        tag: String,
        alias: String,
        path: String,
    },
    /// The alias was already bound to another path.
    ImportRenamed {
        unit: usize,
        tag: String,
        from: String,
        to: String,
        path: String,
    },
    /// Structurally identical to the registered declaration; dropped.
    DuplicateDropped {
        unit: usize,
        tag: String,
        key: String,
    },
    /// The incoming struct only added members; they were appended to the
    /// registered declaration and the incoming copy dropped.
    FieldsMerged {
        unit: usize,
        tag: String,
        key: String,
        fields: Vec<String>,
    },
    /// Conflicting declaration kept under a new name.
    Renamed {
        unit: usize,
        tag: String,
        from: String,
        to: String,
        reason: String,
    },
    /// Conflicting method kept under a new method name. Selector call sites
    /// are not rewritten.
    MethodRenamed {
        unit: usize,
        tag: String,
        receiver: String,
        from: String,
        to: String,
        reason: String,
    },
}

impl Decision {
    pub fn unit(&self) -> usize {
        match self {
            Decision::ImportAdded { unit, .. }
            | Decision::ImportRenamed { unit, .. }
            | Decision::DuplicateDropped { unit, .. }
            | Decision::FieldsMerged { unit, .. }
            | Decision::Renamed { unit, .. }
            | Decision::MethodRenamed { unit, .. } => *unit,
        }
    }

    pub fn is_rename(&self) -> bool {
        matches!(
            self,
            Decision::Renamed { .. } | Decision::MethodRenamed { .. } | Decision::ImportRenamed { .. }
        )
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::ImportAdded { alias, path, .. } => write!(f, "import {alias} \"{path}\""),
            Decision::ImportRenamed { from, to, path, .. } => {
                write!(f, "import \"{path}\" renamed {from} -> {to}")
            }
            Decision::DuplicateDropped { key, .. } => write!(f, "dropped duplicate {key}"),
            Decision::FieldsMerged { key, fields, .. } => {
                write!(f, "merged fields [{}] into {key}", fields.join(", "))
            }
            Decision::Renamed { from, to, reason, .. } => {
                write!(f, "renamed {from} -> {to} ({reason})")
            }
            Decision::MethodRenamed {
                receiver,
                from,
                to,
                reason,
                ..
            } => write!(f, "renamed method {receiver}.{from} -> {to} ({reason})"),
        }
    }
}

/// The merged file and every decision taken to build it.
#[derive(Debug, Clone)]
pub struct MergeOutput {
    pub file: File,
    pub decisions: Vec<Decision>,
}

impl MergeOutput {
    /// Render the merged file as Go source.
    pub fn render(&self) -> String {
        crate::printer::render(&self.file)
    }

    pub fn renames(&self) -> impl Iterator<Item = &Decision> {
        self.decisions.iter().filter(|d| d.is_rename())
    }
}
