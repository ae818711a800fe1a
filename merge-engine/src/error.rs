//! Fatal error kinds of a merge run.
//!
//! Conflicts between declarations are not errors: they come back from the
//! equivalence checker as [`crate::equal::Equivalence`] values and the merger
//! resolves them. Everything here aborts the whole run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MergeError {
    #[error("no source units supplied")]
    NoUnits,

    #[error("source unit {unit} has no disambiguation tag")]
    MissingTag { unit: usize },

    #[error("duplicate member `{name}` in one field list")]
    DuplicateMember { name: String },

    #[error("cannot compare unsupported syntax ({kind})")]
    UnsupportedNode { kind: String },

    #[error("invalid import path {path}: {reason}")]
    ImportPath { path: String, reason: String },

    #[error("declaration `{key}`: {source}")]
    Declaration {
        key: String,
        #[source]
        source: Box<MergeError>,
    },

    #[error("unit {index} (tag `{tag}`): {source}")]
    Unit {
        index: usize,
        tag: String,
        #[source]
        source: Box<MergeError>,
    },
}

impl MergeError {
    pub(crate) fn in_declaration(self, key: &str) -> Self {
        MergeError::Declaration {
            key: key.to_string(),
            source: Box::new(self),
        }
    }

    pub(crate) fn in_unit(self, index: usize, tag: &str) -> Self {
        MergeError::Unit {
            index,
            tag: tag.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, with unit/declaration context peeled off.
    pub fn root_cause(&self) -> &MergeError {
        match self {
            MergeError::Declaration { source, .. } | MergeError::Unit { source, .. } => {
                source.root_cause()
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_chain_message() {
        let err = MergeError::DuplicateMember {
            name: "Name".into(),
        }
        .in_declaration("Struct")
        .in_unit(1, "B");
        assert_eq!(
            err.to_string(),
            "unit 1 (tag `B`): declaration `Struct`: duplicate member `Name` in one field list"
        );
        assert!(matches!(
            err.root_cause(),
            MergeError::DuplicateMember { name } if name == "Name"
        ));
    }
}
