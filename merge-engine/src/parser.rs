//! Go source parsing.
//!
//! Source text is parsed with Tree-sitter's Go grammar into a concrete syntax
//! tree, which is then lowered into the typed [`crate::ast`] tree. Comments are
//! extras in the grammar and are dropped during lowering.
//!
//! A tree containing any `ERROR` or missing node is rejected as a whole.
//! Well-formed constructs the AST does not model (e.g. `select` statements)
//! are kept as `Bad` nodes holding their source text.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tree_sitter::Node;

use crate::ast::*;
use crate::token::Token;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to load Go grammar: {0}")]
    Language(String),

    #[error("parser produced no tree")]
    ParseFailed,

    #[error("syntax error at {line}:{column} near `{snippet}`")]
    Syntax {
        line: usize,
        column: usize,
        snippet: String,
    },

    #[error("missing package clause")]
    MissingPackage,

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Parse one Go source file.
pub fn parse_file(source: &str) -> Result<File, ParseError> {
    let language: tree_sitter::Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| ParseError::Language(e.to_string()))?;

    let tree = parser.parse(source, None).ok_or(ParseError::ParseFailed)?;
    let root = tree.root_node();
    if root.has_error() {
        return Err(syntax_error(root, source));
    }
    Lowering { src: source }.file(root)
}

/// Read and parse the Go file at `path`.
pub fn parse_path(path: impl AsRef<Path>) -> Result<File, ParseError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_file(&source)
}

fn syntax_error(root: Node<'_>, source: &str) -> ParseError {
    let node = first_error(root).unwrap_or(root);
    let pos = node.start_position();
    let snippet: String = source
        .get(node.start_byte()..)
        .unwrap_or("")
        .lines()
        .next()
        .unwrap_or("")
        .chars()
        .take(40)
        .collect();
    ParseError::Syntax {
        line: pos.row + 1,
        column: pos.column + 1,
        snippet,
    }
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|c| c.has_error())
        .find_map(first_error)
}

// ── Tree helpers ────────────────────────────────────────────────

fn named(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| !c.is_extra())
        .collect()
}

fn children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn field_all<'t>(node: Node<'t>, name: &str) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.children_by_field_name(name, &mut cursor).collect()
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    children(node)
        .iter()
        .any(|c| !c.is_named() && c.kind() == token)
}

struct Lowering<'s> {
    src: &'s str,
}

impl<'s> Lowering<'s> {
    fn text(&self, node: Node<'_>) -> &'s str {
        self.src.get(node.byte_range()).unwrap_or("")
    }

    fn ident(&self, node: Node<'_>) -> Ident {
        Ident::new(self.text(node))
    }

    fn bad(&self, node: Node<'_>) -> BadNode {
        BadNode {
            kind: node.kind().to_string(),
            text: self.text(node).to_string(),
            line: node.start_position().row + 1,
        }
    }

    // ── File and declarations ───────────────────────────────────

    fn file(&self, root: Node<'_>) -> Result<File, ParseError> {
        let mut package = None;
        let mut decls = Vec::new();
        for node in named(root) {
            match node.kind() {
                "package_clause" => {
                    package = named(node).first().map(|n| self.ident(*n));
                }
                "import_declaration" => decls.push(Decl::Gen(self.gen_decl(node, Token::Import))),
                "const_declaration" => decls.push(Decl::Gen(self.gen_decl(node, Token::Const))),
                "var_declaration" => decls.push(Decl::Gen(self.gen_decl(node, Token::Var))),
                "type_declaration" => decls.push(Decl::Gen(self.gen_decl(node, Token::Type))),
                "function_declaration" | "method_declaration" => {
                    decls.push(Decl::Func(self.func_decl(node)))
                }
                _ => decls.push(Decl::Bad(self.bad(node))),
            }
        }
        let package = package.ok_or(ParseError::MissingPackage)?;
        Ok(File { package, decls })
    }

    fn gen_decl(&self, node: Node<'_>, tok: Token) -> GenDecl {
        let mut specs = Vec::new();
        let mut grouped = false;
        for child in children(node) {
            match child.kind() {
                "(" => grouped = true,
                "import_spec_list" | "var_spec_list" | "const_spec_list" | "type_spec_list" => {
                    grouped = true;
                    specs.extend(named(child).into_iter().filter_map(|s| self.spec(s)));
                }
                _ if child.is_named() && !child.is_extra() => specs.extend(self.spec(child)),
                _ => {}
            }
        }
        GenDecl {
            tok,
            specs,
            grouped,
        }
    }

    fn spec(&self, node: Node<'_>) -> Option<Spec> {
        let spec = match node.kind() {
            "import_spec" => Spec::Import(self.import_spec(node)),
            "const_spec" | "var_spec" => Spec::Value(self.value_spec(node)),
            "type_spec" => Spec::Type(self.type_spec(node, false)),
            "type_alias" => Spec::Type(self.type_spec(node, true)),
            _ => return None,
        };
        Some(spec)
    }

    fn import_spec(&self, node: Node<'_>) -> ImportSpec {
        let name = node.child_by_field_name("name").map(|n| match n.kind() {
            "dot" => Ident::new("."),
            "blank_identifier" => Ident::new("_"),
            _ => self.ident(n),
        });
        let path = node
            .child_by_field_name("path")
            .map(|p| self.text(p))
            .unwrap_or("\"\"");
        ImportSpec {
            name,
            path: BasicLit::new(LitKind::String, path),
        }
    }

    fn value_spec(&self, node: Node<'_>) -> ValueSpec {
        ValueSpec {
            names: field_all(node, "name")
                .into_iter()
                .map(|n| self.ident(n))
                .collect(),
            ty: node.child_by_field_name("type").map(|t| self.expr(t)),
            values: node
                .child_by_field_name("value")
                .map(|v| self.expr_list(v))
                .unwrap_or_default(),
        }
    }

    fn type_spec(&self, node: Node<'_>, assign: bool) -> TypeSpec {
        TypeSpec {
            name: node
                .child_by_field_name("name")
                .map(|n| self.ident(n))
                .unwrap_or_else(|| Ident::new("_")),
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|p| self.type_params(p)),
            assign,
            ty: self.expr_field(node, "type"),
        }
    }

    fn func_decl(&self, node: Node<'_>) -> FuncDecl {
        FuncDecl {
            recv: node
                .child_by_field_name("receiver")
                .map(|r| self.params(r)),
            name: node
                .child_by_field_name("name")
                .map(|n| self.ident(n))
                .unwrap_or_else(|| Ident::new("_")),
            ty: self.signature(node),
            body: node.child_by_field_name("body").map(|b| self.block(b)),
        }
    }

    // ── Signatures and field lists ──────────────────────────────

    /// Type parameters, parameters and result of a function-like node.
    fn signature(&self, node: Node<'_>) -> FuncType {
        FuncType {
            type_params: node
                .child_by_field_name("type_parameters")
                .map(|p| self.type_params(p)),
            params: node
                .child_by_field_name("parameters")
                .map(|p| self.params(p))
                .unwrap_or_default(),
            results: node.child_by_field_name("result").map(|r| {
                if r.kind() == "parameter_list" {
                    self.params(r)
                } else {
                    FieldList::new(vec![Field {
                        names: Vec::new(),
                        ty: self.expr(r),
                        tag: None,
                    }])
                }
            }),
        }
    }

    fn params(&self, node: Node<'_>) -> FieldList {
        let list = named(node)
            .into_iter()
            .map(|param| {
                let names = field_all(param, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect();
                let ty = self.expr_field(param, "type");
                let ty = if param.kind() == "variadic_parameter_declaration" {
                    Expr::Ellipsis(Some(Box::new(ty)))
                } else {
                    ty
                };
                Field {
                    names,
                    ty,
                    tag: None,
                }
            })
            .collect();
        FieldList::new(list)
    }

    fn type_params(&self, node: Node<'_>) -> FieldList {
        let list = named(node)
            .into_iter()
            .map(|decl| Field {
                names: field_all(decl, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect(),
                ty: decl
                    .child_by_field_name("type")
                    .map(|t| self.union(t))
                    .unwrap_or_else(|| Expr::ident("any")),
                tag: None,
            })
            .collect();
        FieldList::new(list)
    }

    fn struct_fields(&self, node: Node<'_>) -> FieldList {
        let Some(list) = named(node)
            .into_iter()
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return FieldList::default();
        };
        let fields = named(list)
            .into_iter()
            .filter(|n| n.kind() == "field_declaration")
            .map(|decl| {
                let names: Vec<Ident> = field_all(decl, "name")
                    .into_iter()
                    .map(|n| self.ident(n))
                    .collect();
                let mut ty = self.expr_field(decl, "type");
                if names.is_empty() && has_token(decl, "*") {
                    ty = Expr::star(ty);
                }
                Field {
                    names,
                    ty,
                    tag: decl
                        .child_by_field_name("tag")
                        .map(|t| BasicLit::new(LitKind::String, self.text(t))),
                }
            })
            .collect();
        FieldList::new(fields)
    }

    fn interface_elems(&self, node: Node<'_>) -> FieldList {
        let fields = named(node)
            .into_iter()
            .map(|elem| match elem.kind() {
                "method_elem" | "method_spec" => Field {
                    names: elem
                        .child_by_field_name("name")
                        .map(|n| vec![self.ident(n)])
                        .unwrap_or_default(),
                    ty: Expr::FuncType(self.signature(elem)),
                    tag: None,
                },
                _ => Field {
                    names: Vec::new(),
                    ty: self.union(elem),
                    tag: None,
                },
            })
            .collect();
        FieldList::new(fields)
    }

    /// `A | ~B | C` of a type element or constraint, as nested `|` binaries.
    fn union(&self, node: Node<'_>) -> Expr {
        if !matches!(node.kind(), "type_elem" | "type_constraint" | "constraint_elem") {
            return self.expr(node);
        }
        let mut terms = named(node).into_iter().map(|t| self.expr(t));
        let Some(first) = terms.next() else {
            return Expr::Bad(self.bad(node));
        };
        terms.fold(first, |x, y| {
            Expr::Binary(BinaryExpr {
                x: Box::new(x),
                op: Token::Or,
                y: Box::new(y),
            })
        })
    }

    // ── Statements ──────────────────────────────────────────────

    fn block(&self, node: Node<'_>) -> BlockStmt {
        BlockStmt::new(self.stmt_list(named(node)))
    }

    fn stmt_list(&self, nodes: Vec<Node<'_>>) -> Vec<Stmt> {
        let mut list = Vec::new();
        for node in nodes {
            if node.kind() == "statement_list" {
                list.extend(named(node).into_iter().map(|s| self.stmt(s)));
            } else {
                list.push(self.stmt(node));
            }
        }
        list
    }

    fn opt_stmt(&self, node: Node<'_>, field: &str) -> Option<Box<Stmt>> {
        node.child_by_field_name(field)
            .map(|s| Box::new(self.stmt(s)))
    }

    fn stmt(&self, node: Node<'_>) -> Stmt {
        match node.kind() {
            "const_declaration" => Stmt::Decl(self.gen_decl(node, Token::Const)),
            "var_declaration" => Stmt::Decl(self.gen_decl(node, Token::Var)),
            "type_declaration" => Stmt::Decl(self.gen_decl(node, Token::Type)),
            "expression_statement" => match named(node).first() {
                Some(e) => Stmt::Expr(self.expr(*e)),
                None => Stmt::Bad(self.bad(node)),
            },
            "send_statement" => Stmt::Send(SendStmt {
                chan: self.expr_field(node, "channel"),
                value: self.expr_field(node, "value"),
            }),
            "inc_statement" | "dec_statement" => {
                let tok = if node.kind() == "inc_statement" {
                    Token::Inc
                } else {
                    Token::Dec
                };
                match named(node).first() {
                    Some(x) => Stmt::IncDec(IncDecStmt {
                        x: self.expr(*x),
                        tok,
                    }),
                    None => Stmt::Bad(self.bad(node)),
                }
            }
            "assignment_statement" | "short_var_declaration" => {
                let tok = if node.kind() == "short_var_declaration" {
                    Some(Token::Define)
                } else {
                    node.child_by_field_name("operator")
                        .and_then(|op| Token::lookup(self.text(op)))
                };
                let Some(tok) = tok else {
                    return Stmt::Bad(self.bad(node));
                };
                Stmt::Assign(AssignStmt {
                    lhs: self.expr_list_field(node, "left"),
                    tok,
                    rhs: self.expr_list_field(node, "right"),
                })
            }
            "return_statement" => {
                let mut results = Vec::new();
                for child in named(node) {
                    if child.kind() == "expression_list" {
                        results.extend(self.expr_list(child));
                    } else {
                        results.push(self.expr(child));
                    }
                }
                Stmt::Return(ReturnStmt { results })
            }
            "go_statement" | "defer_statement" => match named(node).first() {
                Some(call) if node.kind() == "go_statement" => Stmt::Go(self.expr(*call)),
                Some(call) => Stmt::Defer(self.expr(*call)),
                None => Stmt::Bad(self.bad(node)),
            },
            "labeled_statement" | "empty_labeled_statement" => {
                let label = node
                    .child_by_field_name("label")
                    .map(|l| self.ident(l))
                    .unwrap_or_else(|| Ident::new("_"));
                let stmt = named(node)
                    .into_iter()
                    .find(|n| n.kind() != "label_name")
                    .map(|s| self.stmt(s))
                    .unwrap_or(Stmt::Empty);
                Stmt::Labeled(LabeledStmt {
                    label,
                    stmt: Box::new(stmt),
                })
            }
            "break_statement" | "continue_statement" | "goto_statement" => {
                let tok = match node.kind() {
                    "break_statement" => Token::Break,
                    "continue_statement" => Token::Continue,
                    _ => Token::Goto,
                };
                Stmt::Branch(BranchStmt {
                    tok,
                    label: named(node).first().map(|l| self.ident(*l)),
                })
            }
            "fallthrough_statement" => Stmt::Branch(BranchStmt {
                tok: Token::Fallthrough,
                label: None,
            }),
            "block" => Stmt::Block(self.block(node)),
            "empty_statement" => Stmt::Empty,
            "if_statement" => self.if_stmt(node),
            "for_statement" => self.for_stmt(node),
            "expression_switch_statement" => Stmt::Switch(SwitchStmt {
                init: self.opt_stmt(node, "initializer"),
                tag: node.child_by_field_name("value").map(|v| self.expr(v)),
                body: self.case_clauses(node, "value"),
            }),
            "type_switch_statement" => self.type_switch(node),
            _ => Stmt::Bad(self.bad(node)),
        }
    }

    fn if_stmt(&self, node: Node<'_>) -> Stmt {
        let Some(body) = node.child_by_field_name("consequence") else {
            return Stmt::Bad(self.bad(node));
        };
        Stmt::If(IfStmt {
            init: self.opt_stmt(node, "initializer"),
            cond: self.expr_field(node, "condition"),
            body: self.block(body),
            els: self.opt_stmt(node, "alternative"),
        })
    }

    fn for_stmt(&self, node: Node<'_>) -> Stmt {
        let Some(body_node) = node.child_by_field_name("body") else {
            return Stmt::Bad(self.bad(node));
        };
        let body = self.block(body_node);
        let header = named(node)
            .into_iter()
            .find(|n| n.id() != body_node.id());

        match header {
            None => Stmt::For(ForStmt {
                init: None,
                cond: None,
                post: None,
                body,
            }),
            Some(clause) if clause.kind() == "for_clause" => Stmt::For(ForStmt {
                init: self.opt_stmt(clause, "initializer"),
                cond: clause.child_by_field_name("condition").map(|c| self.expr(c)),
                post: self.opt_stmt(clause, "update"),
                body,
            }),
            Some(clause) if clause.kind() == "range_clause" => {
                let mut left = self.expr_list_field(clause, "left").into_iter();
                let tok = if has_token(clause, ":=") {
                    Some(Token::Define)
                } else if has_token(clause, "=") {
                    Some(Token::Assign)
                } else {
                    None
                };
                Stmt::Range(RangeStmt {
                    key: left.next(),
                    value: left.next(),
                    tok,
                    x: self.expr_field(clause, "right"),
                    body,
                })
            }
            Some(cond) => Stmt::For(ForStmt {
                init: None,
                cond: Some(self.expr(cond)),
                post: None,
                body,
            }),
        }
    }

    fn type_switch(&self, node: Node<'_>) -> Stmt {
        let guard = Expr::TypeAssert(TypeAssertExpr {
            x: Box::new(self.expr_field(node, "value")),
            ty: None,
        });
        let assign = match node.child_by_field_name("alias") {
            Some(alias) => Stmt::Assign(AssignStmt {
                lhs: self.expr_list(alias),
                tok: Token::Define,
                rhs: vec![guard],
            }),
            None => Stmt::Expr(guard),
        };
        Stmt::TypeSwitch(TypeSwitchStmt {
            init: self.opt_stmt(node, "initializer"),
            assign: Box::new(assign),
            body: self.case_clauses(node, "type"),
        })
    }

    /// Case clauses of a switch; `field` names the case's match list.
    fn case_clauses(&self, node: Node<'_>, field: &str) -> Vec<CaseClause> {
        named(node)
            .into_iter()
            .filter(|n| matches!(n.kind(), "expression_case" | "type_case" | "default_case"))
            .map(|case| {
                // type_case lists its separating commas under the same field.
                let matched: Vec<_> = field_all(case, field)
                    .into_iter()
                    .filter(|n| n.is_named() && !n.is_extra())
                    .collect();
                let ids: Vec<usize> = matched.iter().map(|n| n.id()).collect();
                let list = (case.kind() != "default_case").then(|| {
                    matched
                        .iter()
                        .flat_map(|n| {
                            if n.kind() == "expression_list" {
                                self.expr_list(*n)
                            } else {
                                vec![self.expr(*n)]
                            }
                        })
                        .collect()
                });
                let body = named(case)
                    .into_iter()
                    .filter(|n| !ids.contains(&n.id()))
                    .collect();
                CaseClause {
                    list,
                    body: self.stmt_list(body),
                }
            })
            .collect()
    }

    // ── Expressions and types ───────────────────────────────────

    fn expr_field(&self, node: Node<'_>, field: &str) -> Expr {
        match node.child_by_field_name(field) {
            Some(child) => self.expr(child),
            None => Expr::Bad(self.bad(node)),
        }
    }

    fn opt_expr_field(&self, node: Node<'_>, field: &str) -> Option<Box<Expr>> {
        node.child_by_field_name(field)
            .map(|c| Box::new(self.expr(c)))
    }

    fn expr_list(&self, node: Node<'_>) -> Vec<Expr> {
        if node.kind() != "expression_list" {
            return vec![self.expr(node)];
        }
        named(node).into_iter().map(|e| self.expr(e)).collect()
    }

    fn expr_list_field(&self, node: Node<'_>, field: &str) -> Vec<Expr> {
        node.child_by_field_name(field)
            .map(|l| self.expr_list(l))
            .unwrap_or_default()
    }

    /// Generic instantiation `x[A]` / `x[A, B]`.
    fn instantiate(x: Expr, mut args: Vec<Expr>) -> Expr {
        if args.len() == 1 {
            Expr::Index(IndexExpr {
                x: Box::new(x),
                index: Box::new(args.remove(0)),
            })
        } else {
            Expr::IndexList(IndexListExpr {
                x: Box::new(x),
                indices: args,
            })
        }
    }

    fn expr(&self, node: Node<'_>) -> Expr {
        let lit = |kind| Expr::BasicLit(BasicLit::new(kind, self.text(node)));
        match node.kind() {
            "identifier" | "type_identifier" | "field_identifier" | "package_identifier" | "nil"
            | "true" | "false" | "iota" => Expr::Ident(self.ident(node)),
            "int_literal" => lit(LitKind::Int),
            "float_literal" => lit(LitKind::Float),
            "imaginary_literal" => lit(LitKind::Imag),
            "rune_literal" => lit(LitKind::Char),
            "interpreted_string_literal" | "raw_string_literal" => lit(LitKind::String),
            "parenthesized_expression" | "parenthesized_type" => match named(node).first() {
                Some(inner) => Expr::Paren(Box::new(self.expr(*inner))),
                None => Expr::Bad(self.bad(node)),
            },
            "unary_expression" => {
                let op = node.child_by_field_name("operator").map(|o| self.text(o));
                let x = self.expr_field(node, "operand");
                match op {
                    Some("*") => Expr::star(x),
                    Some(op) => match Token::lookup(op) {
                        Some(op) => Expr::Unary(UnaryExpr { op, x: Box::new(x) }),
                        None => Expr::Bad(self.bad(node)),
                    },
                    None => Expr::Bad(self.bad(node)),
                }
            }
            "binary_expression" => {
                let op = node
                    .child_by_field_name("operator")
                    .and_then(|o| Token::lookup(self.text(o)));
                match op {
                    Some(op) => Expr::Binary(BinaryExpr {
                        x: Box::new(self.expr_field(node, "left")),
                        op,
                        y: Box::new(self.expr_field(node, "right")),
                    }),
                    None => Expr::Bad(self.bad(node)),
                }
            }
            "selector_expression" => match node.child_by_field_name("field") {
                Some(field) => Expr::Selector(SelectorExpr {
                    x: Box::new(self.expr_field(node, "operand")),
                    sel: self.ident(field),
                }),
                None => Expr::Bad(self.bad(node)),
            },
            "qualified_type" => match node.child_by_field_name("name") {
                Some(name) => Expr::Selector(SelectorExpr {
                    x: Box::new(self.expr_field(node, "package")),
                    sel: self.ident(name),
                }),
                None => Expr::Bad(self.bad(node)),
            },
            "index_expression" => Expr::Index(IndexExpr {
                x: Box::new(self.expr_field(node, "operand")),
                index: Box::new(self.expr_field(node, "index")),
            }),
            "slice_expression" => Expr::Slice(SliceExpr {
                x: Box::new(self.expr_field(node, "operand")),
                low: self.opt_expr_field(node, "start"),
                high: self.opt_expr_field(node, "end"),
                max: self.opt_expr_field(node, "capacity"),
                slice3: children(node).iter().filter(|c| c.kind() == ":").count() == 2,
            }),
            "type_assertion_expression" => Expr::TypeAssert(TypeAssertExpr {
                x: Box::new(self.expr_field(node, "operand")),
                ty: self.opt_expr_field(node, "type"),
            }),
            "type_conversion_expression" => Expr::Call(CallExpr {
                fun: Box::new(self.expr_field(node, "type")),
                args: vec![self.expr_field(node, "operand")],
                ellipsis: false,
            }),
            "type_instantiation_expression" => {
                let Some(ty) = node.child_by_field_name("type") else {
                    return Expr::Bad(self.bad(node));
                };
                let args = named(node)
                    .into_iter()
                    .filter(|n| n.id() != ty.id())
                    .map(|n| self.union(n))
                    .collect();
                Self::instantiate(self.expr(ty), args)
            }
            "generic_type" => {
                let x = self.expr_field(node, "type");
                let args: Vec<Expr> = node
                    .child_by_field_name("type_arguments")
                    .map(|a| named(a).into_iter().map(|t| self.union(t)).collect())
                    .unwrap_or_default();
                Self::instantiate(x, args)
            }
            "call_expression" => self.call(node),
            "composite_literal" => {
                let elts = node
                    .child_by_field_name("body")
                    .map(|b| self.literal_elements(b))
                    .unwrap_or_default();
                Expr::CompositeLit(CompositeLit {
                    ty: self.opt_expr_field(node, "type"),
                    elts,
                    incomplete: false,
                })
            }
            "literal_value" => Expr::CompositeLit(CompositeLit {
                ty: None,
                elts: self.literal_elements(node),
                incomplete: false,
            }),
            "literal_element" => match named(node).first() {
                Some(inner) => self.expr(*inner),
                None => Expr::Bad(self.bad(node)),
            },
            "keyed_element" => match named(node).as_slice() {
                [key, value] => Expr::KeyValue(KeyValueExpr {
                    key: Box::new(self.expr(*key)),
                    value: Box::new(self.expr(*value)),
                }),
                _ => Expr::Bad(self.bad(node)),
            },
            "func_literal" => match node.child_by_field_name("body") {
                Some(body) => Expr::FuncLit(FuncLit {
                    ty: self.signature(node),
                    body: self.block(body),
                }),
                None => Expr::Bad(self.bad(node)),
            },
            "pointer_type" => match named(node).first() {
                Some(inner) => Expr::star(self.expr(*inner)),
                None => Expr::Bad(self.bad(node)),
            },
            "array_type" => Expr::ArrayType(ArrayType {
                len: self.opt_expr_field(node, "length"),
                elt: Box::new(self.expr_field(node, "element")),
            }),
            "implicit_length_array_type" => Expr::ArrayType(ArrayType {
                len: Some(Box::new(Expr::Ellipsis(None))),
                elt: Box::new(self.expr_field(node, "element")),
            }),
            "slice_type" => Expr::ArrayType(ArrayType {
                len: None,
                elt: Box::new(self.expr_field(node, "element")),
            }),
            "map_type" => Expr::MapType(MapType {
                key: Box::new(self.expr_field(node, "key")),
                value: Box::new(self.expr_field(node, "value")),
            }),
            "channel_type" => {
                let tokens: Vec<&str> = children(node)
                    .iter()
                    .filter(|c| !c.is_named())
                    .map(|c| c.kind())
                    .collect();
                let dir = match tokens.as_slice() {
                    ["<-", ..] => ChanDir::Recv,
                    ["chan", "<-", ..] => ChanDir::Send,
                    _ => ChanDir::Both,
                };
                Expr::ChanType(ChanType {
                    dir,
                    value: Box::new(self.expr_field(node, "value")),
                })
            }
            "function_type" => Expr::FuncType(self.signature(node)),
            "struct_type" => Expr::StructType(StructType {
                fields: self.struct_fields(node),
                incomplete: false,
            }),
            "interface_type" => Expr::InterfaceType(InterfaceType {
                methods: self.interface_elems(node),
                incomplete: false,
            }),
            "negated_type" => match named(node).first() {
                Some(inner) => Expr::Unary(UnaryExpr {
                    op: Token::Tilde,
                    x: Box::new(self.expr(*inner)),
                }),
                None => Expr::Bad(self.bad(node)),
            },
            "type_elem" | "type_constraint" | "constraint_elem" => self.union(node),
            _ => Expr::Bad(self.bad(node)),
        }
    }

    fn call(&self, node: Node<'_>) -> Expr {
        let mut fun = self.expr_field(node, "function");
        if let Some(type_args) = node.child_by_field_name("type_arguments") {
            let args = named(type_args).into_iter().map(|t| self.union(t)).collect();
            fun = Self::instantiate(fun, args);
        }
        let mut args = Vec::new();
        let mut ellipsis = false;
        if let Some(list) = node.child_by_field_name("arguments") {
            for arg in named(list) {
                if arg.kind() == "variadic_argument" {
                    ellipsis = true;
                    match named(arg).first() {
                        Some(inner) => args.push(self.expr(*inner)),
                        None => args.push(Expr::Bad(self.bad(arg))),
                    }
                } else {
                    args.push(self.expr(arg));
                }
            }
            // older grammars mark the spread with a bare `...` token
            ellipsis |= has_token(list, "...");
        }
        Expr::Call(CallExpr {
            fun: Box::new(fun),
            args,
            ellipsis,
        })
    }

    fn literal_elements(&self, node: Node<'_>) -> Vec<Expr> {
        named(node).into_iter().map(|e| self.expr(e)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::printer::render;

    fn parse(src: &str) -> File {
        parse_file(src).unwrap()
    }

    #[test]
    fn test_package_and_imports() {
        let file = parse("package main\n\nimport (\n\t\"fmt\"\n\tstr \"strings\"\n\t_ \"embed\"\n)\n");
        assert_eq!(file.package.name, "main");
        let imports: Vec<_> = file.imports().collect();
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].name, None);
        assert_eq!(imports[0].path.value, "\"fmt\"");
        assert_eq!(imports[1].name, Some(Ident::new("str")));
        assert_eq!(imports[2].name, Some(Ident::new("_")));
        let Decl::Gen(group) = &file.decls[0] else { unreachable!() };
        assert!(group.grouped);
    }

    #[test]
    fn test_missing_package() {
        assert!(matches!(
            parse_file("func main() {}\n"),
            Err(ParseError::MissingPackage)
        ));
    }

    #[test]
    fn test_syntax_error_has_position() {
        match parse_file("package p\n\nfunc f( {\n") {
            Err(ParseError::Syntax { line, .. }) => assert!(line >= 3),
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_struct_fields_and_tags() {
        let file = parse(
            "package p\n\ntype S struct {\n\tFirstName, LastName string\n\t*Base\n\tio.Reader `json:\"r\"`\n}\n",
        );
        let Decl::Gen(group) = &file.decls[0] else { unreachable!() };
        let Spec::Type(spec) = &group.specs[0] else { unreachable!() };
        let Expr::StructType(st) = &spec.ty else { unreachable!() };
        assert_eq!(st.fields.list.len(), 3);
        assert_eq!(st.fields.list[0].names.len(), 2);
        assert_eq!(st.fields.list[1].ty, Expr::star(Expr::ident("Base")));
        assert_eq!(
            st.fields.list[2].ty,
            Expr::selector(Expr::ident("io"), "Reader")
        );
        assert!(st.fields.list[2].tag.is_some());
    }

    #[test]
    fn test_method_receiver_and_body() {
        let file = parse(
            "package p\n\nfunc (s *Struct) Hello(name string) (int, error) {\n\treturn len(s.Name), nil\n}\n",
        );
        let Decl::Func(func) = &file.decls[0] else { unreachable!() };
        assert_eq!(func.receiver_type_name(), Some("Struct"));
        assert_eq!(func.name.name, "Hello");
        assert_eq!(func.ty.params.list[0].names[0].name, "name");
        assert_eq!(func.ty.results.as_ref().map(|r| r.list.len()), Some(2));
        let body = func.body.as_ref().unwrap();
        assert!(matches!(&body.list[0], Stmt::Return(r) if r.results.len() == 2));
    }

    #[test]
    fn test_unmodelled_statement_is_bad() {
        let file = parse("package p\n\nfunc f(c chan int) {\n\tselect {\n\tcase <-c:\n\t}\n}\n");
        let Decl::Func(func) = &file.decls[0] else { unreachable!() };
        let body = func.body.as_ref().unwrap();
        assert!(matches!(&body.list[0], Stmt::Bad(bad) if bad.kind == "select_statement"));
    }

    #[test]
    fn test_comments_are_dropped() {
        let file = parse("package p\n\n// Foo is a var.\nvar Foo = \"Bar\" // trailing\n");
        assert_eq!(file.decls.len(), 1);
    }

    #[test]
    fn test_render_round_trip() {
        let src = "package p

import \"fmt\"

type Struct struct {
\tName string
}

func (s Struct) Hello() {
\tfmt.Print(\"Hello %w\", s.Name)
}

func Loop(items []string) int {
\tcount := 0
\tfor i, item := range items {
\t\tif item == \"\" {
\t\t\tcontinue
\t\t}
\t\tcount += i
\t}
\treturn count
}
";
        assert_eq!(render(&parse(src)), src);
    }

    #[test]
    fn test_multi_type_case_round_trip() {
        let src = "package p

func Kind(v any) string {
\tswitch x := v.(type) {
\tcase int, string:
\t\treturn \"scalar\"
\tcase nil:
\t\treturn \"nil\"
\tdefault:
\t\t_ = x
\t\treturn \"other\"
\t}
}
";
        let file = parse(src);
        let Decl::Func(func) = &file.decls[0] else { unreachable!() };
        let body = func.body.as_ref().unwrap();
        let Stmt::TypeSwitch(switch) = &body.list[0] else {
            panic!("expected type switch, got {:?}", body.list[0]);
        };
        assert_eq!(
            switch.body[0].list,
            Some(vec![Expr::ident("int"), Expr::ident("string")])
        );
        assert_eq!(render(&file), src);
    }
}
