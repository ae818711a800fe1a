//! Keyed view of a unit's top-level declarations.
//!
//! Only unit-scope declarations get a key; declarations inside function
//! bodies are never looked at. Methods are keyed `Type.Method` with the
//! receiver's pointer and type-parameter forms stripped. Value declarations
//! are keyed per name, so `var Foo, File = "Bar", "0.go"` yields two entries.
//!
//! `init` functions and the blank identifier may legally repeat and are never
//! keyed.

use std::collections::HashSet;

use crate::ast::*;
use crate::equal::Node;
use crate::token::Token;
use crate::visit::VisitMut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Type,
    Const,
    Var,
    Func,
    Method,
}

impl DeclKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclKind::Type => "type",
            DeclKind::Const => "const",
            DeclKind::Var => "var",
            DeclKind::Func => "func",
            DeclKind::Method => "method",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclEntry {
    pub key: String,
    pub kind: DeclKind,
}

/// Position of a keyed declaration inside a declaration list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Func { decl: usize },
    Type { decl: usize, spec: usize },
    Value { decl: usize, spec: usize, name: usize },
}

/// Owned copy of one keyed declaration, as the equivalence checker sees it.
#[derive(Debug, Clone)]
pub enum Declared {
    Func(FuncDecl),
    Type(TypeSpec),
    /// A single name of a value spec with its own initializer; the whole
    /// initializer list when the spec is initialised from a tuple. A constant
    /// without an initializer carries the type and expressions it repeats.
    Value {
        tok: Token,
        spec: ValueSpec,
        /// Position in the const group, when the initializer uses `iota`.
        iota: Option<usize>,
    },
}

impl Declared {
    pub fn node(&self) -> Node<'_> {
        match self {
            Declared::Func(func) => Node::FuncDecl(func),
            Declared::Type(spec) => Node::TypeSpec(spec),
            Declared::Value { spec, .. } => Node::ValueSpec(spec),
        }
    }

    pub fn is_struct(&self) -> bool {
        matches!(self, Declared::Type(spec) if matches!(spec.ty, Expr::StructType(_)))
    }

    pub fn is_interface(&self) -> bool {
        matches!(self, Declared::Type(spec) if matches!(spec.ty, Expr::InterfaceType(_)))
    }
}

/// Key of a function or method; `None` for `init` functions and `_`.
pub fn func_key(func: &FuncDecl) -> Option<String> {
    if func.name.is_blank() {
        return None;
    }
    match &func.recv {
        None if func.name.name == "init" => None,
        None => Some(func.name.name.clone()),
        Some(_) => {
            let recv = func.receiver_type_name()?;
            Some(format!("{recv}.{}", func.name.name))
        }
    }
}

/// Keyed declarations of `decls` in source order. A key seen twice is only
/// reported once.
pub fn collect_declarations(decls: &[Decl]) -> Vec<DeclEntry> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    let mut push = |key: String, kind: DeclKind| {
        if seen.insert(key.clone()) {
            entries.push(DeclEntry { key, kind });
        }
    };

    for decl in decls {
        match decl {
            Decl::Func(func) => {
                if let Some(key) = func_key(func) {
                    let kind = if func.is_method() {
                        DeclKind::Method
                    } else {
                        DeclKind::Func
                    };
                    push(key, kind);
                }
            }
            Decl::Gen(group) => {
                let kind = match group.tok {
                    Token::Type => DeclKind::Type,
                    Token::Const => DeclKind::Const,
                    Token::Var => DeclKind::Var,
                    _ => continue,
                };
                for spec in &group.specs {
                    match spec {
                        Spec::Type(ty) if !ty.name.is_blank() => push(ty.name.name.clone(), kind),
                        Spec::Value(value) => {
                            for name in value.names.iter().filter(|n| !n.is_blank()) {
                                push(name.name.clone(), kind);
                            }
                        }
                        _ => {}
                    }
                }
            }
            Decl::Bad(_) => {}
        }
    }
    entries
}

/// Find the declaration keyed `key`.
pub fn locate(decls: &[Decl], key: &str) -> Option<Slot> {
    for (d, decl) in decls.iter().enumerate() {
        match decl {
            Decl::Func(func) if func_key(func).as_deref() == Some(key) => {
                return Some(Slot::Func { decl: d });
            }
            Decl::Gen(group) if group.tok != Token::Import => {
                for (s, spec) in group.specs.iter().enumerate() {
                    match spec {
                        Spec::Type(ty) if ty.name.name == key => {
                            return Some(Slot::Type { decl: d, spec: s });
                        }
                        Spec::Value(value) => {
                            if let Some(n) = value.names.iter().position(|n| n.name == key) {
                                return Some(Slot::Value {
                                    decl: d,
                                    spec: s,
                                    name: n,
                                });
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    None
}

/// Every keyed declaration of `decls[range]` with its slot, for registration.
pub fn slots_in(decls: &[Decl], range: std::ops::Range<usize>) -> Vec<(String, Slot)> {
    let mut slots = Vec::new();
    for d in range {
        let Some(decl) = decls.get(d) else { break };
        match decl {
            Decl::Func(func) => {
                if let Some(key) = func_key(func) {
                    slots.push((key, Slot::Func { decl: d }));
                }
            }
            Decl::Gen(group) if group.tok != Token::Import => {
                for (s, spec) in group.specs.iter().enumerate() {
                    match spec {
                        Spec::Type(ty) if !ty.name.is_blank() => {
                            slots.push((ty.name.name.clone(), Slot::Type { decl: d, spec: s }));
                        }
                        Spec::Value(value) => {
                            for (n, name) in value.names.iter().enumerate() {
                                if !name.is_blank() {
                                    let slot = Slot::Value {
                                        decl: d,
                                        spec: s,
                                        name: n,
                                    };
                                    slots.push((name.name.clone(), slot));
                                }
                            }
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
    slots
}

/// Owned copy of the declaration at `slot`.
pub fn snapshot(decls: &[Decl], slot: Slot) -> Option<Declared> {
    match slot {
        Slot::Func { decl } => match decls.get(decl)? {
            Decl::Func(func) => Some(Declared::Func(func.clone())),
            _ => None,
        },
        Slot::Type { decl, spec } => match gen_spec(decls, decl, spec)? {
            (_, Spec::Type(ty)) => Some(Declared::Type(ty.clone())),
            _ => None,
        },
        Slot::Value { decl, spec, name } => {
            let Decl::Gen(group) = decls.get(decl)? else {
                return None;
            };
            let Spec::Value(value) = group.specs.get(spec)? else {
                return None;
            };
            let ident = value.names.get(name)?.clone();
            let constant = group.tok == Token::Const;
            let (ty, source) = if constant && value.values.is_empty() {
                group.specs[..spec]
                    .iter()
                    .rev()
                    .find_map(|prev| match prev {
                        Spec::Value(prev) if !prev.values.is_empty() => {
                            Some((prev.ty.clone(), &prev.values))
                        }
                        _ => None,
                    })
                    .unwrap_or((None, &value.values))
            } else {
                (value.ty.clone(), &value.values)
            };
            let mut values = if source.len() == value.names.len() {
                vec![source[name].clone()]
            } else {
                source.clone()
            };
            let iota = (constant && mentions_iota(&mut values)).then_some(spec);
            Some(Declared::Value {
                tok: group.tok,
                spec: ValueSpec {
                    names: vec![ident],
                    ty,
                    values,
                },
                iota,
            })
        }
    }
}

fn mentions_iota(values: &mut [Expr]) -> bool {
    struct Iota(bool);

    impl VisitMut for Iota {
        fn visit_ident(&mut self, ident: &mut Ident) {
            self.0 |= ident.name == "iota";
        }
    }

    let mut finder = Iota(false);
    for value in values {
        finder.visit_expr(value);
    }
    finder.0
}

/// Mutable access to the type spec at `slot`.
pub fn type_spec_mut(decls: &mut [Decl], slot: Slot) -> Option<&mut TypeSpec> {
    let Slot::Type { decl, spec } = slot else {
        return None;
    };
    match decls.get_mut(decl)? {
        Decl::Gen(group) => match group.specs.get_mut(spec)? {
            Spec::Type(ty) => Some(ty),
            _ => None,
        },
        _ => None,
    }
}

fn gen_spec(decls: &[Decl], decl: usize, spec: usize) -> Option<(Token, &Spec)> {
    match decls.get(decl)? {
        Decl::Gen(group) => Some((group.tok, group.specs.get(spec)?)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value_group(tok: Token, names: &[&str], values: &[&str]) -> Decl {
        Decl::Gen(GenDecl::new(
            tok,
            vec![Spec::Value(ValueSpec {
                names: names.iter().map(|n| Ident::new(*n)).collect(),
                ty: None,
                values: values.iter().map(|v| Expr::string_lit(*v)).collect(),
            })],
        ))
    }

    fn func(recv: Option<Expr>, name: &str) -> Decl {
        Decl::Func(FuncDecl {
            recv: recv.map(|ty| FieldList::new(vec![Field::new(&["s"], ty)])),
            name: Ident::new(name),
            ty: FuncType::default(),
            body: Some(BlockStmt::default()),
        })
    }

    #[test]
    fn test_collect_in_source_order() {
        let decls = vec![
            value_group(Token::Const, &["Hello"], &["\"hi\""]),
            func(Some(Expr::star(Expr::ident("Struct"))), "GetReader"),
            value_group(Token::Var, &["Foo", "File"], &["\"Bar\"", "\"0.go\""]),
            func(None, "init"),
            func(None, "_"),
        ];
        let keys: Vec<_> = collect_declarations(&decls)
            .into_iter()
            .map(|e| (e.key, e.kind))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("Hello".to_string(), DeclKind::Const),
                ("Struct.GetReader".to_string(), DeclKind::Method),
                ("Foo".to_string(), DeclKind::Var),
                ("File".to_string(), DeclKind::Var),
            ]
        );
    }

    #[test]
    fn test_method_named_init_is_keyed() {
        let decls = vec![func(Some(Expr::ident("T")), "init")];
        assert_eq!(collect_declarations(&decls)[0].key, "T.init");
    }

    #[test]
    fn test_snapshot_carries_own_initializer() {
        let decls = vec![value_group(Token::Var, &["Foo", "File"], &["\"Bar\"", "\"0.go\""])];
        let slot = locate(&decls, "File").unwrap();
        assert_eq!(slot, Slot::Value { decl: 0, spec: 0, name: 1 });
        let Some(Declared::Value { tok, spec, iota }) = snapshot(&decls, slot) else {
            panic!("expected value");
        };
        assert_eq!(tok, Token::Var);
        assert_eq!(spec.names, vec![Ident::new("File")]);
        assert_eq!(spec.values, vec![Expr::string_lit("\"0.go\"")]);
        assert_eq!(iota, None);
    }

    #[test]
    fn test_implicit_constant_repeats_previous_initializer() {
        let shifted = Expr::Binary(BinaryExpr {
            x: Box::new(Expr::BasicLit(BasicLit::new(LitKind::Int, "1"))),
            op: Token::Shl,
            y: Box::new(Expr::ident("iota")),
        });
        let mut group = GenDecl::new(
            Token::Const,
            vec![
                Spec::Value(ValueSpec {
                    names: vec![Ident::new("Read")],
                    ty: Some(Expr::ident("Mode")),
                    values: vec![shifted.clone()],
                }),
                Spec::Value(ValueSpec {
                    names: vec![Ident::new("Write")],
                    ty: None,
                    values: vec![],
                }),
            ],
        );
        group.grouped = true;
        let decls = vec![Decl::Gen(group)];

        let Some(Declared::Value { spec, iota, .. }) = snapshot(&decls, locate(&decls, "Write").unwrap())
        else {
            panic!("expected value");
        };
        assert_eq!(spec.ty, Some(Expr::ident("Mode")));
        assert_eq!(spec.values, vec![shifted]);
        assert_eq!(iota, Some(1));
    }

    #[test]
    fn test_slots_in_range() {
        let decls = vec![
            value_group(Token::Const, &["A"], &["\"a\""]),
            func(None, "F"),
            func(Some(Expr::ident("T")), "M"),
        ];
        let slots = slots_in(&decls, 1..3);
        assert_eq!(
            slots,
            vec![
                ("F".to_string(), Slot::Func { decl: 1 }),
                ("T.M".to_string(), Slot::Func { decl: 2 }),
            ]
        );
    }

    #[test]
    fn test_locate_missing_key() {
        let decls = vec![func(None, "F")];
        assert_eq!(locate(&decls, "G"), None);
    }
}
