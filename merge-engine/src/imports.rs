//! Import alias bookkeeping.
//!
//! Every import of a unit becomes an [`ImportBinding`] (alias → path). The
//! [`ImportTable`] accumulates the bindings accepted so far and decides, for
//! each incoming binding, whether it is new, already present, or collides
//! with an alias that names a different path and must be renamed.

use std::collections::{HashMap, HashSet};

use crate::ast::{File, Ident, ImportSpec};
use crate::error::MergeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ImportBinding {
    /// Name the unit refers to the package by; `_` and `.` for blank and dot
    /// imports.
    pub alias: String,
    /// Unquoted import path.
    pub path: String,
    pub spec: ImportSpec,
}

impl ImportBinding {
    fn is_special(&self) -> bool {
        self.alias == "_" || self.alias == "."
    }

    /// Import spec binding `alias` to this path. The name is left implicit
    /// when the path already implies it.
    fn spec_as(&self, alias: &str) -> ImportSpec {
        ImportSpec {
            name: (default_alias(&self.path) != alias).then(|| Ident::new(alias)),
            path: self.spec.path.clone(),
        }
    }
}

/// Bindings of every import of `file`, in source order.
pub fn collect_bindings(file: &File) -> Result<Vec<ImportBinding>, MergeError> {
    file.imports()
        .map(|spec| {
            let path = unquote(&spec.path.value)?;
            let alias = match &spec.name {
                Some(name) => name.name.clone(),
                None => default_alias(&path).to_string(),
            };
            Ok(ImportBinding {
                alias,
                path,
                spec: spec.clone(),
            })
        })
        .collect()
}

/// Outcome of [`ImportTable::reconcile`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    /// First binding of this alias; `spec` goes into the output import group.
    Added(ImportSpec),
    /// Same alias already maps to the same path.
    Present,
    /// The alias was taken by another path. References to `from` inside the
    /// unit must be renamed to `to`; `spec` is `None` when `to` already
    /// imports the same path.
    Renamed {
        from: String,
        to: String,
        spec: Option<ImportSpec>,
    },
}

#[derive(Debug, Default)]
pub struct ImportTable {
    by_alias: HashMap<String, String>,
    special: HashSet<(String, String)>,
}

impl ImportTable {
    pub fn path_of(&self, alias: &str) -> Option<&str> {
        self.by_alias.get(alias).map(String::as_str)
    }

    pub fn reconcile(&mut self, binding: &ImportBinding, tag: &str) -> Reconciled {
        if binding.is_special() {
            let key = (binding.alias.clone(), binding.path.clone());
            return if self.special.insert(key) {
                Reconciled::Added(binding.spec.clone())
            } else {
                Reconciled::Present
            };
        }

        match self.path_of(&binding.alias) {
            None => {
                self.by_alias
                    .insert(binding.alias.clone(), binding.path.clone());
                Reconciled::Added(binding.spec_as(&binding.alias))
            }
            Some(path) if path == binding.path => Reconciled::Present,
            Some(_) => {
                let mut alias = format!("{}{}", binding.alias, tag);
                while let Some(path) = self.path_of(&alias) {
                    if path == binding.path {
                        return Reconciled::Renamed {
                            from: binding.alias.clone(),
                            to: alias,
                            spec: None,
                        };
                    }
                    alias.push_str(tag);
                }
                self.by_alias.insert(alias.clone(), binding.path.clone());
                Reconciled::Renamed {
                    from: binding.alias.clone(),
                    spec: Some(binding.spec_as(&alias)),
                    to: alias,
                }
            }
        }
    }
}

/// Package name Go assumes for an import without an explicit name: the last
/// path segment, skipping a major-version segment (`/v2`) and dropping a
/// `.vN` suffix (`gopkg.in/yaml.v3`).
pub fn default_alias(path: &str) -> &str {
    let mut segments = path.rsplit('/');
    let mut last = segments.next().unwrap_or(path);
    if is_major_version(last) {
        last = segments.next().unwrap_or(last);
    }
    match last.rsplit_once(".v") {
        Some((base, version)) if !base.is_empty() && is_digits(version) => base,
        _ => last,
    }
}

fn is_major_version(segment: &str) -> bool {
    segment.strip_prefix('v').is_some_and(is_digits)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Unquote an import path literal with Go string-literal rules.
pub fn unquote(literal: &str) -> Result<String, MergeError> {
    let invalid = |reason: &str| MergeError::ImportPath {
        path: literal.to_string(),
        reason: reason.to_string(),
    };

    let path = if let Some(raw) = literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')) {
        raw.to_string()
    } else if let Some(inner) = literal.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        unescape(inner).ok_or_else(|| invalid("invalid escape sequence"))?
    } else {
        return Err(invalid("not a string literal"));
    };

    if path.is_empty() {
        return Err(invalid("empty path"));
    }
    if path.chars().any(|c| c.is_whitespace() || c.is_control() || c == '\\') {
        return Err(invalid("invalid character in path"));
    }
    Ok(path)
}

fn unescape(s: &str) -> Option<String> {
    let mut out: Vec<u8> = Vec::with_capacity(s.len());
    let mut buf = [0u8; 4];
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' | '\n' => return None,
            '\\' => {}
            _ => {
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }
        }
        let byte = match chars.next()? {
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'n' => b'\n',
            'r' => b'\r',
            't' => b'\t',
            'v' => 0x0b,
            '\\' => b'\\',
            '"' => b'"',
            'x' => u8::try_from(digits(&mut chars, 2, 16)?).ok()?,
            d @ '0'..='7' => {
                let rest = digits(&mut chars, 2, 8)?;
                u8::try_from(d.to_digit(8)? * 64 + rest).ok()?
            }
            u @ ('u' | 'U') => {
                let n = if u == 'u' { 4 } else { 8 };
                let c = char::from_u32(digits(&mut chars, n, 16)?)?;
                out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                continue;
            }
            _ => return None,
        };
        out.push(byte);
    }
    String::from_utf8(out).ok()
}

fn digits(chars: &mut std::str::Chars<'_>, n: usize, radix: u32) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..n {
        value = value * radix + chars.next()?.to_digit(radix)?;
    }
    Some(value)
}
