//! Removal of top-level declarations by key.

use crate::ast::*;
use crate::decls::func_key;
use crate::token::Token;

/// Remove the declaration registered under `key` from `decls` and return the
/// number of names removed.
///
/// A type spec named `key` is dropped from its group. A value spec loses the
/// name and the initializer at the same position; when the spec is
/// initialised from one tuple-valued expression (`var a, b = f()`) the name is
/// blanked to `_` instead, and the spec is dropped once every name is blank.
/// Groups left without specs disappear. Functions and methods match by their
/// qualified key (`Type.Method`).
///
/// In a const group every spec but the last fixes the `iota` of the specs
/// after it, and a spec without initializer repeats an earlier one, so such
/// specs keep their place and the name is blanked. A const group whose names
/// are all blank is dropped.
pub fn remove_declaration(decls: &mut Vec<Decl>, key: &str) -> usize {
    let mut removed = 0;
    decls.retain_mut(|decl| match decl {
        Decl::Func(func) => {
            if func_key(func).as_deref() == Some(key) {
                removed += 1;
                false
            } else {
                true
            }
        }
        Decl::Gen(group) if group.tok != Token::Import => {
            let had_specs = !group.specs.is_empty();
            let constants = group.tok == Token::Const;
            let last = group.specs.len().saturating_sub(1);
            let mut position = 0;
            let mut touched = false;
            group.specs.retain_mut(|spec| {
                let at = position;
                position += 1;
                match spec {
                    Spec::Type(ty) if ty.name.name == key => {
                        removed += 1;
                        false
                    }
                    Spec::Value(value) => {
                        let pinned = constants && (at != last || value.values.is_empty());
                        if !remove_value_name(value, key, pinned) {
                            return true;
                        }
                        removed += 1;
                        touched = true;
                        pinned || !value.names.iter().all(Ident::is_blank)
                    }
                    _ => true,
                }
            });
            let all_blank = constants
                && touched
                && group.specs.iter().all(|spec| {
                    matches!(spec, Spec::Value(value) if value.names.iter().all(Ident::is_blank))
                });
            !(had_specs && (group.specs.is_empty() || all_blank))
        }
        _ => true,
    });
    removed
}

fn remove_value_name(spec: &mut ValueSpec, key: &str, pinned: bool) -> bool {
    let Some(pos) = spec.names.iter().position(|n| n.name == key) else {
        return false;
    };
    let paired = spec.values.len() == spec.names.len();
    if !pinned && (paired || spec.values.is_empty()) {
        spec.names.remove(pos);
        if paired {
            spec.values.remove(pos);
        }
    } else {
        spec.names[pos] = Ident::new("_");
    }
    true
}

/// Strip every import declaration from `decls`.
pub fn remove_imports(decls: &mut Vec<Decl>) {
    decls.retain(|decl| !matches!(decl, Decl::Gen(group) if group.tok == Token::Import));
}
