//! Merge orchestration.
//!
//! Units are merged one at a time, in caller order. For each unit:
//!
//! 1. its imports are reconciled against the accumulated import table, and
//!    a colliding alias is renamed throughout the unit;
//! 2. its import declarations are stripped;
//! 3. every keyed declaration is resolved against the registry: new keys are
//!    kept, structural duplicates dropped, structs that only add fields
//!    widen the registered struct, anything else is renamed with the unit's
//!    tag;
//! 4. the surviving declarations are appended to the output and registered.
//!
//! Non-method declarations are resolved before methods, and method keys are
//! computed after that first pass, so a method whose receiver type was just
//! renamed is keyed under the new type name. Struct widening waits until both
//! passes are done, so copied fields refer to the unit's renamed types.

use std::collections::HashMap;

use tracing::{debug, info, info_span, warn};

use crate::ast::*;
use crate::decls::{
    collect_declarations, locate, slots_in, snapshot, type_spec_mut, DeclKind, Declared, Slot,
};
use crate::equal::{equivalent, Equivalence};
use crate::error::MergeError;
use crate::fieldset::FieldSet;
use crate::imports::{collect_bindings, ImportTable, Reconciled};
use crate::remove::{remove_declaration, remove_imports};
use crate::rename::rename_decls;
use crate::token::Token;
use crate::types::{Decision, MergeOutput};

/// Accumulates units into one merged file.
pub struct Merger {
    package: String,
    decls: Vec<Decl>,
    /// Index of the shared import declaration in `decls`, once created.
    import_decl: Option<usize>,
    imports: ImportTable,
    registry: HashMap<String, Slot>,
    decisions: Vec<Decision>,
    units: usize,
}

/// A struct of the current unit that only adds fields to a registered one.
struct Widening {
    key: String,
    canonical: Slot,
    fields: Vec<String>,
}

/// Merge `units` in order into a file of package `package`.
///
/// Fails before touching any unit when the list is empty or a tag is
/// missing.
pub fn merge_all(
    package: &str,
    units: Vec<(File, String)>,
) -> Result<MergeOutput, MergeError> {
    if units.is_empty() {
        return Err(MergeError::NoUnits);
    }
    if let Some(unit) = units.iter().position(|(_, tag)| tag.is_empty()) {
        return Err(MergeError::MissingTag { unit });
    }

    let mut merger = Merger::new(package);
    for (file, tag) in units {
        merger.merge(file, &tag)?;
    }
    Ok(merger.finish())
}

impl Merger {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            decls: Vec::new(),
            import_decl: None,
            imports: ImportTable::default(),
            registry: HashMap::new(),
            decisions: Vec::new(),
            units: 0,
        }
    }

    /// Merge the next unit. `tag` is appended to the names this unit loses
    /// in a conflict.
    pub fn merge(&mut self, unit: File, tag: &str) -> Result<(), MergeError> {
        let index = self.units;
        self.units += 1;
        if tag.is_empty() {
            return Err(MergeError::MissingTag { unit: index });
        }
        let span = info_span!("unit", index, tag);
        let _enter = span.enter();
        self.merge_unit(unit, index, tag)
            .map_err(|err| err.in_unit(index, tag))
    }

    pub fn finish(mut self) -> MergeOutput {
        // Imports must precede every other declaration.
        if let Some(i) = self.import_decl.filter(|&i| i > 0) {
            let imports = self.decls.remove(i);
            self.decls.insert(0, imports);
        }
        info!(
            package = %self.package,
            declarations = self.decls.len(),
            decisions = self.decisions.len(),
            "merge finished"
        );
        MergeOutput {
            file: File {
                package: Ident::new(self.package),
                decls: self.decls,
            },
            decisions: self.decisions,
        }
    }

    fn merge_unit(&mut self, unit: File, index: usize, tag: &str) -> Result<(), MergeError> {
        let bindings = collect_bindings(&unit)?;
        let mut decls = unit.decls;

        for binding in &bindings {
            match self.imports.reconcile(binding, tag) {
                Reconciled::Added(spec) => {
                    self.push_import(spec);
                    self.record(Decision::ImportAdded {
                        unit: index,
                        tag: tag.to_string(),
                        alias: binding.alias.clone(),
                        path: binding.path.clone(),
                    });
                }
                Reconciled::Present => {
                    debug!(alias = %binding.alias, path = %binding.path, "import already present");
                }
                Reconciled::Renamed { from, to, spec } => {
                    let count = rename_decls(&mut decls, &from, &to);
                    debug!(%from, %to, count, "renamed import alias references");
                    if let Some(spec) = spec {
                        self.push_import(spec);
                    }
                    self.record(Decision::ImportRenamed {
                        unit: index,
                        tag: tag.to_string(),
                        from,
                        to,
                        path: binding.path.clone(),
                    });
                }
            }
        }
        remove_imports(&mut decls);

        let mut widenings = Vec::new();
        let first_pass: Vec<_> = collect_declarations(&decls)
            .into_iter()
            .filter(|entry| entry.kind != DeclKind::Method)
            .collect();
        for entry in first_pass {
            self.resolve(&mut decls, &entry.key, entry.kind, index, tag, &mut widenings)
                .map_err(|err| err.in_declaration(&entry.key))?;
        }

        let methods: Vec<_> = collect_declarations(&decls)
            .into_iter()
            .filter(|entry| entry.kind == DeclKind::Method)
            .collect();
        for entry in methods {
            self.resolve(&mut decls, &entry.key, entry.kind, index, tag, &mut widenings)
                .map_err(|err| err.in_declaration(&entry.key))?;
        }

        for widening in widenings {
            let key = widening.key.clone();
            self.widen(&mut decls, widening, index, tag)
                .map_err(|err| err.in_declaration(&key))?;
        }

        let start = self.decls.len();
        self.decls.extend(decls);
        for (key, slot) in slots_in(&self.decls, start..self.decls.len()) {
            self.registry.entry(key).or_insert(slot);
        }
        Ok(())
    }

    fn resolve(
        &mut self,
        decls: &mut Vec<Decl>,
        key: &str,
        kind: DeclKind,
        index: usize,
        tag: &str,
        widenings: &mut Vec<Widening>,
    ) -> Result<(), MergeError> {
        let Some(&canonical_slot) = self.registry.get(key) else {
            debug!(key, kind = kind.as_str(), "new declaration");
            return Ok(());
        };
        let (Some(slot), Some(canonical)) =
            (locate(decls, key), snapshot(&self.decls, canonical_slot))
        else {
            return Ok(());
        };
        let Some(incoming) = snapshot(decls, slot) else {
            return Ok(());
        };

        let reason = match compare(&canonical, &incoming)? {
            Equivalence::Equal => {
                remove_declaration(decls, key);
                self.record(Decision::DuplicateDropped {
                    unit: index,
                    tag: tag.to_string(),
                    key: key.to_string(),
                });
                return Ok(());
            }
            Equivalence::AdditionalFields { only_in_b, .. }
                if !only_in_b.is_empty() && canonical.is_struct() && incoming.is_struct() =>
            {
                debug!(key, fields = ?only_in_b, "widening deferred to end of unit");
                widenings.push(Widening {
                    key: key.to_string(),
                    canonical: canonical_slot,
                    fields: only_in_b,
                });
                return Ok(());
            }
            Equivalence::AdditionalFields { only_in_b, .. } if canonical.is_interface() => {
                format!("interface adds methods: {}", only_in_b.join(", "))
            }
            Equivalence::AdditionalFields { only_in_b, .. } => {
                format!("members only in incoming: {}", only_in_b.join(", "))
            }
            Equivalence::Mismatch(reason) => reason,
        };

        if kind == DeclKind::Method {
            self.rename_method(decls, slot, index, tag, reason);
        } else {
            let to = format!("{key}{tag}");
            let count = rename_decls(decls, key, &to);
            debug!(from = key, to = %to, count, "renamed references");
            self.record(Decision::Renamed {
                unit: index,
                tag: tag.to_string(),
                from: key.to_string(),
                to,
                reason,
            });
        }
        Ok(())
    }

    /// Append the widening's fields, as the unit now spells them, to the
    /// registered struct and drop the unit's copy.
    fn widen(
        &mut self,
        decls: &mut Vec<Decl>,
        widening: Widening,
        index: usize,
        tag: &str,
    ) -> Result<(), MergeError> {
        let Widening {
            key,
            canonical,
            fields,
        } = widening;
        let unit: &[Decl] = decls;
        let Some(Declared::Type(TypeSpec {
            ty: Expr::StructType(source),
            ..
        })) = locate(unit, &key).and_then(|slot| snapshot(unit, slot))
        else {
            return Ok(());
        };
        let source = FieldSet::from_members(Some(&source.fields))?;
        let Some(TypeSpec {
            ty: Expr::StructType(target),
            ..
        }) = type_spec_mut(&mut self.decls, canonical)
        else {
            return Ok(());
        };
        for name in &fields {
            if let Some(entry) = source.get(name) {
                target.fields.list.push(entry.to_field());
            }
        }
        remove_declaration(decls, &key);
        self.record(Decision::FieldsMerged {
            unit: index,
            tag: tag.to_string(),
            key,
            fields,
        });
        Ok(())
    }

    fn rename_method(
        &mut self,
        decls: &mut [Decl],
        slot: Slot,
        index: usize,
        tag: &str,
        reason: String,
    ) {
        let Slot::Func { decl } = slot else { return };
        let Some(Decl::Func(func)) = decls.get_mut(decl) else {
            return;
        };
        let from = func.name.name.clone();
        let to = format!("{from}{tag}");
        let receiver = func.receiver_type_name().unwrap_or_default().to_string();
        func.name.name = to.clone();
        warn!(
            receiver = %receiver,
            from = %from,
            to = %to,
            "conflicting method renamed; selector call sites keep the old name"
        );
        self.record(Decision::MethodRenamed {
            unit: index,
            tag: tag.to_string(),
            receiver,
            from,
            to,
            reason,
        });
    }

    fn push_import(&mut self, spec: ImportSpec) {
        match self.import_decl {
            Some(i) => {
                if let Some(Decl::Gen(group)) = self.decls.get_mut(i) {
                    group.specs.push(Spec::Import(spec));
                }
            }
            None => {
                self.decls
                    .push(Decl::Gen(GenDecl::new(Token::Import, vec![Spec::Import(spec)])));
                self.import_decl = Some(self.decls.len() - 1);
            }
        }
    }

    fn record(&mut self, decision: Decision) {
        info!(unit = decision.unit(), "{decision}");
        self.decisions.push(decision);
    }
}

/// Values of different declaration tokens (`const` vs `var`) never match, and
/// neither do constants that take `iota` at different group positions.
fn compare(canonical: &Declared, incoming: &Declared) -> Result<Equivalence, MergeError> {
    if let (
        Declared::Value { tok: a, iota: x, .. },
        Declared::Value { tok: b, iota: y, .. },
    ) = (canonical, incoming)
    {
        if a != b {
            return Ok(Equivalence::Mismatch(format!("{a} vs {b}")));
        }
        if x != y {
            return Ok(Equivalence::Mismatch(format!("iota position {x:?} vs {y:?}")));
        }
    }
    equivalent(canonical.node(), incoming.node())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn struct_decl(name: &str, fields: Vec<Field>) -> Decl {
        Decl::Gen(GenDecl::new(
            Token::Type,
            vec![Spec::Type(TypeSpec {
                name: Ident::new(name),
                type_params: None,
                assign: false,
                ty: Expr::StructType(StructType {
                    fields: FieldList::new(fields),
                    incomplete: false,
                }),
            })],
        ))
    }

    fn unit(decls: Vec<Decl>) -> File {
        let mut file = File::new("p");
        file.decls = decls;
        file
    }

    fn import(path: &str) -> Decl {
        Decl::Gen(GenDecl::new(
            Token::Import,
            vec![Spec::Import(ImportSpec {
                name: None,
                path: BasicLit::new(LitKind::String, format!("\"{path}\"")),
            })],
        ))
    }

    #[test]
    fn test_empty_unit_list() {
        assert!(matches!(merge_all("out", vec![]), Err(MergeError::NoUnits)));
    }

    #[test]
    fn test_missing_tag_fails_before_merging() {
        let units = vec![
            (unit(vec![]), "A".to_string()),
            (unit(vec![]), String::new()),
        ];
        assert!(matches!(
            merge_all("out", units),
            Err(MergeError::MissingTag { unit: 1 })
        ));
    }

    #[test]
    fn test_duplicate_struct_dropped() {
        let s = struct_decl("S", vec![Field::new(&["A"], Expr::ident("int"))]);
        let out = merge_all(
            "out",
            vec![
                (unit(vec![s.clone()]), "A".into()),
                (unit(vec![s.clone()]), "B".into()),
            ],
        )
        .unwrap();
        assert_eq!(out.file.decls, vec![s]);
        assert_eq!(
            out.decisions,
            vec![Decision::DuplicateDropped {
                unit: 1,
                tag: "B".into(),
                key: "S".into(),
            }]
        );
    }

    #[test]
    fn test_widening_appends_to_canonical() {
        let narrow = struct_decl("S", vec![Field::new(&["A"], Expr::ident("int"))]);
        let wide = struct_decl(
            "S",
            vec![
                Field::new(&["A"], Expr::ident("int")),
                Field::new(&["B"], Expr::ident("string")),
            ],
        );
        let out = merge_all(
            "out",
            vec![(unit(vec![narrow]), "A".into()), (unit(vec![wide.clone()]), "B".into())],
        )
        .unwrap();
        assert_eq!(out.file.decls, vec![wide]);
        assert!(matches!(&out.decisions[0], Decision::FieldsMerged { fields, .. } if fields == &["B"]));
    }

    #[test]
    fn test_import_group_created_once_and_moved_first() {
        let s = struct_decl("S", vec![]);
        let mut merger = Merger::new("out");
        merger.merge(unit(vec![s]), "A").unwrap();
        merger.merge(unit(vec![import("fmt")]), "B").unwrap();
        merger.merge(unit(vec![import("io"), import("fmt")]), "C").unwrap();
        let out = merger.finish();
        assert_eq!(out.file.decls.len(), 2);
        let Decl::Gen(imports) = &out.file.decls[0] else { unreachable!() };
        assert_eq!(imports.tok, Token::Import);
        assert_eq!(imports.specs.len(), 2);
    }

    #[test]
    fn test_const_and_var_never_match() {
        let value = |tok| {
            Decl::Gen(GenDecl::new(
                tok,
                vec![Spec::Value(ValueSpec {
                    names: vec![Ident::new("X")],
                    ty: None,
                    values: vec![Expr::string_lit("\"x\"")],
                })],
            ))
        };
        let out = merge_all(
            "out",
            vec![
                (unit(vec![value(Token::Const)]), "A".into()),
                (unit(vec![value(Token::Var)]), "B".into()),
            ],
        )
        .unwrap();
        assert!(matches!(&out.decisions[0], Decision::Renamed { to, .. } if to == "XB"));
    }

    #[test]
    fn test_error_carries_unit_and_declaration() {
        let ok = struct_decl("S", vec![Field::new(&["A"], Expr::ident("int"))]);
        let broken = struct_decl("S", vec![Field::new(&["A", "A"], Expr::ident("int"))]);
        let err = merge_all(
            "out",
            vec![(unit(vec![ok]), "A".into()), (unit(vec![broken]), "B".into())],
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unit 1 (tag `B`): declaration `S`: duplicate member `A` in one field list"
        );
    }
}
