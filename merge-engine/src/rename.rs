//! Identifier renaming.
//!
//! Rewrites every reference to a top-level name inside a subtree. Member names
//! are never touched: the right-hand side of a selector (`s.Name`), the name
//! of a struct field or interface method, the name of a method declaration,
//! and keys of keyed struct literals (`T{Name: v}`) are skipped by not
//! descending into them. Assignment targets are ordinary references and are
//! renamed like any other use.
//!
//! Local bindings follow Go's block scoping. Once a receiver, parameter,
//! result, type parameter, `:=` target, range variable, type-switch alias or
//! local `var`/`const`/`type` binds the name, uses inside that scope refer to
//! the local and are left alone.

use tracing::warn;

use crate::ast::*;
use crate::token::Token;
use crate::visit::{self, VisitMut};

pub struct Renamer<'a> {
    from: &'a str,
    to: &'a str,
    count: usize,
    /// One entry per open scope; `true` once the scope binds `from`.
    scopes: Vec<bool>,
}

impl<'a> Renamer<'a> {
    pub fn new(from: &'a str, to: &'a str) -> Self {
        Self {
            from,
            to,
            count: 0,
            scopes: Vec::new(),
        }
    }

    /// Number of identifiers rewritten so far.
    pub fn count(&self) -> usize {
        self.count
    }

    fn shadowed(&self) -> bool {
        self.scopes.iter().any(|&bound| bound)
    }

    fn bind(&mut self, name: &Ident) {
        if name.name == self.from {
            if let Some(scope) = self.scopes.last_mut() {
                *scope = true;
            }
        }
    }

    fn bind_fields(&mut self, fields: &FieldList) {
        for name in fields.list.iter().flat_map(|field| &field.names) {
            self.bind(name);
        }
    }

    /// Type parameters a receiver introduces: `T` in `(l *List[T])`.
    fn bind_receiver_type_params(&mut self, recv: &FieldList) {
        for field in &recv.list {
            let ty = match &field.ty {
                Expr::Star(inner) => inner.as_ref(),
                ty => ty,
            };
            let params = match ty {
                Expr::Index(index) => std::slice::from_ref(index.index.as_ref()),
                Expr::IndexList(index) => index.indices.as_slice(),
                _ => &[],
            };
            for param in params {
                if let Expr::Ident(ident) = param {
                    self.bind(ident);
                }
            }
        }
    }

    /// Signature and body of a function, method or function literal. The
    /// body's top-level statements share the scope of the parameters.
    fn function(
        &mut self,
        recv: &mut Option<FieldList>,
        ty: &mut FuncType,
        body: Option<&mut BlockStmt>,
    ) {
        self.scopes.push(false);
        if let Some(type_params) = &mut ty.type_params {
            self.bind_fields(type_params);
            self.visit_field_list(type_params);
        }
        if let Some(recv) = recv.as_mut() {
            self.bind_receiver_type_params(recv);
            self.visit_field_list(recv);
        }
        self.visit_field_list(&mut ty.params);
        if let Some(results) = &mut ty.results {
            self.visit_field_list(results);
        }

        if let Some(recv) = recv.as_ref() {
            self.bind_fields(recv);
        }
        self.bind_fields(&ty.params);
        if let Some(results) = &ty.results {
            self.bind_fields(results);
        }
        if let Some(body) = body {
            visit::walk_block(self, body);
        }
        self.scopes.pop();
    }

    /// A `var`, `const` or `type` declaration inside a function body.
    fn local_decl(&mut self, group: &mut GenDecl) {
        for spec in &mut group.specs {
            match spec {
                Spec::Value(value) => {
                    if let Some(ty) = &mut value.ty {
                        self.visit_expr(ty);
                    }
                    for expr in &mut value.values {
                        self.visit_expr(expr);
                    }
                    for name in &value.names {
                        self.bind(name);
                    }
                }
                Spec::Type(ty) => {
                    self.bind(&ty.name);
                    if let Some(params) = &mut ty.type_params {
                        self.visit_field_list(params);
                    }
                    self.visit_expr(&mut ty.ty);
                }
                Spec::Import(_) => {}
            }
        }
    }

    fn opt_stmt(&mut self, stmt: &mut Option<Box<Stmt>>) {
        if let Some(stmt) = stmt {
            self.visit_stmt(stmt);
        }
    }
}

impl VisitMut for Renamer<'_> {
    fn visit_ident(&mut self, ident: &mut Ident) {
        if ident.name == self.from && !self.shadowed() {
            ident.name = self.to.to_string();
            self.count += 1;
        }
    }

    fn visit_selector(&mut self, sel: &mut SelectorExpr) {
        self.visit_expr(&mut sel.x);
    }

    fn visit_field(&mut self, field: &mut Field) {
        self.visit_expr(&mut field.ty);
    }

    fn visit_func_decl(&mut self, func: &mut FuncDecl) {
        if !func.is_method() {
            self.visit_ident(&mut func.name);
        }
        self.function(&mut func.recv, &mut func.ty, func.body.as_mut());
    }

    fn visit_type_spec(&mut self, spec: &mut TypeSpec) {
        self.visit_ident(&mut spec.name);
        self.scopes.push(false);
        if let Some(params) = &mut spec.type_params {
            self.bind_fields(params);
            self.visit_field_list(params);
        }
        self.visit_expr(&mut spec.ty);
        self.scopes.pop();
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        match expr {
            Expr::FuncLit(lit) => self.function(&mut None, &mut lit.ty, Some(&mut lit.body)),
            _ => visit::walk_expr(self, expr),
        }
    }

    fn visit_block(&mut self, block: &mut BlockStmt) {
        self.scopes.push(false);
        visit::walk_block(self, block);
        self.scopes.pop();
    }

    fn visit_case_clause(&mut self, clause: &mut CaseClause) {
        self.scopes.push(false);
        visit::walk_case_clause(self, clause);
        self.scopes.pop();
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Assign(assign) if assign.tok == Token::Define => {
                for rhs in &mut assign.rhs {
                    self.visit_expr(rhs);
                }
                for lhs in &assign.lhs {
                    if let Expr::Ident(ident) = lhs {
                        self.bind(ident);
                    }
                }
            }
            Stmt::Decl(group) => self.local_decl(group),
            Stmt::If(if_stmt) => {
                self.scopes.push(false);
                self.opt_stmt(&mut if_stmt.init);
                self.visit_expr(&mut if_stmt.cond);
                self.visit_block(&mut if_stmt.body);
                self.opt_stmt(&mut if_stmt.els);
                self.scopes.pop();
            }
            Stmt::Switch(switch) => {
                self.scopes.push(false);
                self.opt_stmt(&mut switch.init);
                if let Some(tag) = &mut switch.tag {
                    self.visit_expr(tag);
                }
                for clause in &mut switch.body {
                    self.visit_case_clause(clause);
                }
                self.scopes.pop();
            }
            Stmt::TypeSwitch(switch) => {
                self.scopes.push(false);
                self.opt_stmt(&mut switch.init);
                let alias = match switch.assign.as_mut() {
                    Stmt::Assign(assign) => {
                        for rhs in &mut assign.rhs {
                            self.visit_expr(rhs);
                        }
                        match assign.lhs.first() {
                            Some(Expr::Ident(ident)) => Some(ident.clone()),
                            _ => None,
                        }
                    }
                    other => {
                        self.visit_stmt(other);
                        None
                    }
                };
                for clause in &mut switch.body {
                    self.scopes.push(false);
                    for expr in clause.list.iter_mut().flatten() {
                        self.visit_expr(expr);
                    }
                    if let Some(alias) = &alias {
                        self.bind(alias);
                    }
                    for stmt in &mut clause.body {
                        self.visit_stmt(stmt);
                    }
                    self.scopes.pop();
                }
                self.scopes.pop();
            }
            Stmt::For(for_stmt) => {
                self.scopes.push(false);
                self.opt_stmt(&mut for_stmt.init);
                if let Some(cond) = &mut for_stmt.cond {
                    self.visit_expr(cond);
                }
                self.opt_stmt(&mut for_stmt.post);
                self.visit_block(&mut for_stmt.body);
                self.scopes.pop();
            }
            Stmt::Range(range) => {
                self.visit_expr(&mut range.x);
                self.scopes.push(false);
                for var in [&mut range.key, &mut range.value].into_iter().flatten() {
                    match (range.tok, var) {
                        (Some(Token::Define), Expr::Ident(ident)) => self.bind(ident),
                        (_, var) => self.visit_expr(var),
                    }
                }
                self.visit_block(&mut range.body);
                self.scopes.pop();
            }
            _ => visit::walk_stmt(self, stmt),
        }
    }

    fn visit_composite_lit(&mut self, lit: &mut CompositeLit) {
        let keys_are_values = matches!(
            lit.ty.as_deref(),
            Some(Expr::MapType(_) | Expr::ArrayType(_))
        );
        if let Some(ty) = &mut lit.ty {
            self.visit_expr(ty);
        }
        for elt in &mut lit.elts {
            match elt {
                Expr::KeyValue(kv) if !keys_are_values && matches!(*kv.key, Expr::Ident(_)) => {
                    self.visit_expr(&mut kv.value);
                }
                _ => self.visit_expr(elt),
            }
        }
    }

    fn visit_import_spec(&mut self, _import: &mut ImportSpec) {}

    fn visit_bad(&mut self, bad: &mut BadNode) {
        if bad.text.contains(self.from) && !self.shadowed() {
            warn!(
                kind = %bad.kind,
                line = bad.line,
                name = self.from,
                "unsupported syntax may still reference renamed identifier"
            );
        }
    }
}

/// Rename `from` to `to` in every declaration of `decls`; returns how many
/// identifiers changed.
pub fn rename_decls(decls: &mut [Decl], from: &str, to: &str) -> usize {
    let mut renamer = Renamer::new(from, to);
    for decl in decls {
        renamer.visit_decl(decl);
    }
    renamer.count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn call(fun: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call(CallExpr {
            fun: Box::new(fun),
            args,
            ellipsis: false,
        })
    }

    #[test]
    fn test_selector_member_is_protected() {
        // Struct.Struct → Struct1.Struct
        let mut expr = Expr::selector(Expr::ident("Struct"), "Struct");
        let mut renamer = Renamer::new("Struct", "Struct1");
        renamer.visit_expr(&mut expr);
        assert_eq!(expr, Expr::selector(Expr::ident("Struct1"), "Struct"));
        assert_eq!(renamer.count(), 1);
    }

    #[test]
    fn test_field_name_is_protected() {
        let mut field = Field::new(&["Struct"], Expr::star(Expr::ident("Struct")));
        Renamer::new("Struct", "Struct1").visit_field(&mut field);
        assert_eq!(field.names[0].name, "Struct");
        assert_eq!(field.ty, Expr::star(Expr::ident("Struct1")));
    }

    #[test]
    fn test_assignment_targets_are_renamed() {
        let mut stmt = Stmt::Assign(AssignStmt {
            lhs: vec![Expr::ident("Counter")],
            tok: Token::Assign,
            rhs: vec![Expr::Binary(BinaryExpr {
                x: Box::new(Expr::ident("Counter")),
                op: Token::Add,
                y: Box::new(Expr::BasicLit(BasicLit::new(LitKind::Int, "1"))),
            })],
        });
        let mut renamer = Renamer::new("Counter", "CounterB");
        renamer.visit_stmt(&mut stmt);
        assert_eq!(renamer.count(), 2);
    }

    #[test]
    fn test_method_name_is_protected_but_receiver_renamed() {
        let mut decls = vec![Decl::Func(FuncDecl {
            recv: Some(FieldList::new(vec![Field::new(
                &["s"],
                Expr::star(Expr::ident("Hello")),
            )])),
            name: Ident::new("Hello"),
            ty: FuncType::default(),
            body: Some(BlockStmt::default()),
        })];
        assert_eq!(rename_decls(&mut decls, "Hello", "Hello1"), 1);
        let Decl::Func(func) = &decls[0] else { unreachable!() };
        assert_eq!(func.name.name, "Hello");
        assert_eq!(func.receiver_type_name(), Some("Hello1"));
    }

    #[test]
    fn test_function_name_is_renamed() {
        let mut decls = vec![Decl::Func(FuncDecl {
            recv: None,
            name: Ident::new("Hello"),
            ty: FuncType::default(),
            body: Some(BlockStmt::new(vec![Stmt::Expr(call(
                Expr::ident("Hello"),
                vec![],
            ))])),
        })];
        assert_eq!(rename_decls(&mut decls, "Hello", "HelloB"), 2);
    }

    #[test]
    fn test_struct_literal_keys_are_protected() {
        let mut lit = Expr::CompositeLit(CompositeLit {
            ty: Some(Box::new(Expr::ident("Config"))),
            elts: vec![Expr::KeyValue(KeyValueExpr {
                key: Box::new(Expr::ident("Timeout")),
                value: Box::new(Expr::ident("Timeout")),
            })],
            incomplete: false,
        });
        let mut renamer = Renamer::new("Timeout", "TimeoutB");
        renamer.visit_expr(&mut lit);
        assert_eq!(renamer.count(), 1);
        let Expr::CompositeLit(lit) = &lit else { unreachable!() };
        let Expr::KeyValue(kv) = &lit.elts[0] else { unreachable!() };
        assert_eq!(*kv.key, Expr::ident("Timeout"));
        assert_eq!(*kv.value, Expr::ident("TimeoutB"));
    }

    #[test]
    fn test_map_literal_keys_are_renamed() {
        let mut lit = Expr::CompositeLit(CompositeLit {
            ty: Some(Box::new(Expr::MapType(MapType {
                key: Box::new(Expr::ident("string")),
                value: Box::new(Expr::ident("int")),
            }))),
            elts: vec![Expr::KeyValue(KeyValueExpr {
                key: Box::new(Expr::ident("Key")),
                value: Box::new(Expr::BasicLit(BasicLit::new(LitKind::Int, "1"))),
            })],
            incomplete: false,
        });
        let mut renamer = Renamer::new("Key", "KeyB");
        renamer.visit_expr(&mut lit);
        assert_eq!(renamer.count(), 1);
    }

    #[test]
    fn test_import_specs_are_not_touched() {
        let mut group = GenDecl::new(
            Token::Import,
            vec![Spec::Import(ImportSpec {
                name: Some(Ident::new("fmt")),
                path: BasicLit::new(LitKind::String, "\"fmt\""),
            })],
        );
        let mut renamer = Renamer::new("fmt", "fmtB");
        renamer.visit_gen_decl(&mut group);
        assert_eq!(renamer.count(), 0);
    }

    #[test]
    fn test_local_bindings_shadow_renamed_name() {
        let src = "package p

func H(items []string, v any) string {
\tfor _, Name := range items {
\t\tuse(Name)
\t}
\tuse(Name)
\tif Name := lookup(); Name != \"\" {
\t\tuse(Name)
\t}
\t{
\t\tvar Name = Name
\t\tuse(Name)
\t}
\tf := func(Name int) {
\t\tuse(Name)
\t}
\tf(0)
\tswitch Name := v.(type) {
\tcase int:
\t\tuse(Name)
\t}
\tName := Name + \"!\"
\treturn Name
}
";
        let mut file = crate::parser::parse_file(src).unwrap();
        assert_eq!(rename_decls(&mut file.decls, "Name", "NameB"), 3);
        let text = crate::printer::render(&file);
        assert_eq!(text.matches("NameB").count(), 3);
        assert!(text.contains("\tuse(NameB)\n"));
        assert!(text.contains("var Name = NameB\n"));
        assert!(text.contains("Name := NameB + \"!\"\n"));
        assert!(text.contains("\treturn Name\n"));
    }

    #[test]
    fn test_parameters_and_receiver_type_params_shadow() {
        let src = "package p

func (l *List[T]) Push(v T) T {
\treturn v
}

func F(T string) string {
\treturn T
}
";
        let mut file = crate::parser::parse_file(src).unwrap();
        assert_eq!(rename_decls(&mut file.decls, "T", "TB"), 0);
        assert_eq!(rename_decls(&mut file.decls, "List", "ListB"), 1);
        assert!(crate::printer::render(&file).contains("func (l *ListB[T]) Push(v T) T {"));
    }
}
