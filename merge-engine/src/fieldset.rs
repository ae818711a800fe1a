//! Name-keyed view of a field list.
//!
//! A [`FieldList`] groups names that share a type (`FirstName, LastName string`).
//! A [`FieldSet`] flattens it to one entry per member name, in declaration
//! order, which is what the field-set protocol of the equivalence checker and
//! the struct widening step work with.

use std::collections::HashMap;

use crate::ast::{BasicLit, Expr, Field, FieldList, Ident};
use crate::error::MergeError;
use crate::printer::expr_to_string;

#[derive(Debug, Clone, PartialEq)]
pub struct FieldEntry {
    pub name: String,
    /// Embedded field or embedded interface element; `name` is implicit.
    pub embedded: bool,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

impl FieldEntry {
    /// Turn the entry back into a single-name (or embedded) field.
    pub fn to_field(&self) -> Field {
        let names = if self.embedded {
            Vec::new()
        } else {
            vec![Ident::new(self.name.as_str())]
        };
        Field {
            names,
            ty: self.ty.clone(),
            tag: self.tag.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FieldSet {
    entries: Vec<(String, FieldEntry)>,
    index: HashMap<String, usize>,
}

impl FieldSet {
    /// Struct fields, interface elements: embedded members are keyed by their
    /// implicit name.
    pub fn from_members(list: Option<&FieldList>) -> Result<Self, MergeError> {
        let mut set = FieldSet::default();
        for field in list.map(|l| l.list.as_slice()).unwrap_or_default() {
            if field.names.is_empty() {
                set.insert(implicit_name(&field.ty), true, field)?;
            } else {
                for name in &field.names {
                    set.insert(name.name.clone(), false, field)?;
                }
            }
        }
        Ok(set)
    }

    /// Parameters, results, receivers and type parameters: unnamed entries
    /// are keyed by position (`#0`, `#1`, ...).
    pub fn from_params(list: Option<&FieldList>) -> Result<Self, MergeError> {
        let mut set = FieldSet::default();
        for field in list.map(|l| l.list.as_slice()).unwrap_or_default() {
            if field.names.is_empty() {
                let key = format!("#{}", set.entries.len());
                set.insert(key, false, field)?;
            } else {
                for name in &field.names {
                    set.insert(name.name.clone(), false, field)?;
                }
            }
        }
        Ok(set)
    }

    fn insert(&mut self, name: String, embedded: bool, field: &Field) -> Result<(), MergeError> {
        // `_` may repeat in parameter lists and struct padding.
        if name != "_" && self.index.contains_key(&name) {
            return Err(MergeError::DuplicateMember { name });
        }
        let key = if name == "_" {
            format!("_#{}", self.entries.len())
        } else {
            name.clone()
        };
        self.index.insert(key.clone(), self.entries.len());
        let entry = FieldEntry {
            name,
            embedded,
            ty: field.ty.clone(),
            tag: field.tag.clone(),
        };
        self.entries.push((key, entry));
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FieldEntry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Entries with their lookup keys, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }
}

/// Field name Go gives an embedded type: `*pkg.T[X]` → `T`.
fn implicit_name(ty: &Expr) -> String {
    match ty {
        Expr::Ident(ident) => ident.name.clone(),
        Expr::Selector(sel) => sel.sel.name.clone(),
        Expr::Star(inner) | Expr::Paren(inner) => implicit_name(inner),
        Expr::Index(index) => implicit_name(&index.x),
        Expr::IndexList(index) => implicit_name(&index.x),
        other => expr_to_string(other),
    }
}
