//! Mutable syntax tree traversal.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! visits the node's children. An implementation overrides the methods it
//! cares about and calls the `walk_*` function itself when it still wants the
//! children visited.
//!
//! Labels of labeled and branch statements are not identifiers in the
//! declaration namespace and are never handed to [`VisitMut::visit_ident`].

use crate::ast::*;

pub trait VisitMut {
    fn visit_decl(&mut self, decl: &mut Decl) {
        walk_decl(self, decl);
    }

    fn visit_gen_decl(&mut self, group: &mut GenDecl) {
        walk_gen_decl(self, group);
    }

    fn visit_func_decl(&mut self, func: &mut FuncDecl) {
        walk_func_decl(self, func);
    }

    fn visit_import_spec(&mut self, import: &mut ImportSpec) {
        walk_import_spec(self, import);
    }

    fn visit_value_spec(&mut self, spec: &mut ValueSpec) {
        walk_value_spec(self, spec);
    }

    fn visit_type_spec(&mut self, spec: &mut TypeSpec) {
        walk_type_spec(self, spec);
    }

    fn visit_field_list(&mut self, fields: &mut FieldList) {
        walk_field_list(self, fields);
    }

    fn visit_field(&mut self, field: &mut Field) {
        walk_field(self, field);
    }

    fn visit_func_type(&mut self, ty: &mut FuncType) {
        walk_func_type(self, ty);
    }

    fn visit_expr(&mut self, expr: &mut Expr) {
        walk_expr(self, expr);
    }

    fn visit_selector(&mut self, sel: &mut SelectorExpr) {
        walk_selector(self, sel);
    }

    fn visit_composite_lit(&mut self, lit: &mut CompositeLit) {
        walk_composite_lit(self, lit);
    }

    fn visit_stmt(&mut self, stmt: &mut Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_block(&mut self, block: &mut BlockStmt) {
        walk_block(self, block);
    }

    fn visit_case_clause(&mut self, clause: &mut CaseClause) {
        walk_case_clause(self, clause);
    }

    fn visit_ident(&mut self, _ident: &mut Ident) {}

    fn visit_bad(&mut self, _bad: &mut BadNode) {}
}

pub fn walk_decl<V: VisitMut + ?Sized>(v: &mut V, decl: &mut Decl) {
    match decl {
        Decl::Bad(bad) => v.visit_bad(bad),
        Decl::Gen(group) => v.visit_gen_decl(group),
        Decl::Func(func) => v.visit_func_decl(func),
    }
}

pub fn walk_gen_decl<V: VisitMut + ?Sized>(v: &mut V, group: &mut GenDecl) {
    for spec in &mut group.specs {
        match spec {
            Spec::Import(import) => v.visit_import_spec(import),
            Spec::Value(value) => v.visit_value_spec(value),
            Spec::Type(ty) => v.visit_type_spec(ty),
        }
    }
}

pub fn walk_func_decl<V: VisitMut + ?Sized>(v: &mut V, func: &mut FuncDecl) {
    if let Some(recv) = &mut func.recv {
        v.visit_field_list(recv);
    }
    v.visit_ident(&mut func.name);
    v.visit_func_type(&mut func.ty);
    if let Some(body) = &mut func.body {
        v.visit_block(body);
    }
}

pub fn walk_import_spec<V: VisitMut + ?Sized>(v: &mut V, import: &mut ImportSpec) {
    if let Some(name) = &mut import.name {
        v.visit_ident(name);
    }
}

pub fn walk_value_spec<V: VisitMut + ?Sized>(v: &mut V, spec: &mut ValueSpec) {
    for name in &mut spec.names {
        v.visit_ident(name);
    }
    if let Some(ty) = &mut spec.ty {
        v.visit_expr(ty);
    }
    for value in &mut spec.values {
        v.visit_expr(value);
    }
}

pub fn walk_type_spec<V: VisitMut + ?Sized>(v: &mut V, spec: &mut TypeSpec) {
    v.visit_ident(&mut spec.name);
    if let Some(params) = &mut spec.type_params {
        v.visit_field_list(params);
    }
    v.visit_expr(&mut spec.ty);
}

pub fn walk_field_list<V: VisitMut + ?Sized>(v: &mut V, fields: &mut FieldList) {
    for field in &mut fields.list {
        v.visit_field(field);
    }
}

pub fn walk_field<V: VisitMut + ?Sized>(v: &mut V, field: &mut Field) {
    for name in &mut field.names {
        v.visit_ident(name);
    }
    v.visit_expr(&mut field.ty);
}

pub fn walk_func_type<V: VisitMut + ?Sized>(v: &mut V, ty: &mut FuncType) {
    if let Some(type_params) = &mut ty.type_params {
        v.visit_field_list(type_params);
    }
    v.visit_field_list(&mut ty.params);
    if let Some(results) = &mut ty.results {
        v.visit_field_list(results);
    }
}

fn visit_opt_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Option<Box<Expr>>) {
    if let Some(expr) = expr {
        v.visit_expr(expr);
    }
}

pub fn walk_expr<V: VisitMut + ?Sized>(v: &mut V, expr: &mut Expr) {
    match expr {
        Expr::Bad(bad) => v.visit_bad(bad),
        Expr::Ident(ident) => v.visit_ident(ident),
        Expr::Ellipsis(elt) => visit_opt_expr(v, elt),
        Expr::BasicLit(_) => {}
        Expr::FuncLit(lit) => {
            v.visit_func_type(&mut lit.ty);
            v.visit_block(&mut lit.body);
        }
        Expr::CompositeLit(lit) => v.visit_composite_lit(lit),
        Expr::Paren(inner) | Expr::Star(inner) => v.visit_expr(inner),
        Expr::Selector(sel) => v.visit_selector(sel),
        Expr::Index(index) => {
            v.visit_expr(&mut index.x);
            v.visit_expr(&mut index.index);
        }
        Expr::IndexList(index) => {
            v.visit_expr(&mut index.x);
            for idx in &mut index.indices {
                v.visit_expr(idx);
            }
        }
        Expr::Slice(slice) => {
            v.visit_expr(&mut slice.x);
            visit_opt_expr(v, &mut slice.low);
            visit_opt_expr(v, &mut slice.high);
            visit_opt_expr(v, &mut slice.max);
        }
        Expr::TypeAssert(assert) => {
            v.visit_expr(&mut assert.x);
            visit_opt_expr(v, &mut assert.ty);
        }
        Expr::Call(call) => {
            v.visit_expr(&mut call.fun);
            for arg in &mut call.args {
                v.visit_expr(arg);
            }
        }
        Expr::Unary(unary) => v.visit_expr(&mut unary.x),
        Expr::Binary(binary) => {
            v.visit_expr(&mut binary.x);
            v.visit_expr(&mut binary.y);
        }
        Expr::KeyValue(kv) => {
            v.visit_expr(&mut kv.key);
            v.visit_expr(&mut kv.value);
        }
        Expr::ArrayType(array) => {
            visit_opt_expr(v, &mut array.len);
            v.visit_expr(&mut array.elt);
        }
        Expr::StructType(st) => v.visit_field_list(&mut st.fields),
        Expr::FuncType(ft) => v.visit_func_type(ft),
        Expr::InterfaceType(it) => v.visit_field_list(&mut it.methods),
        Expr::MapType(map) => {
            v.visit_expr(&mut map.key);
            v.visit_expr(&mut map.value);
        }
        Expr::ChanType(chan) => v.visit_expr(&mut chan.value),
    }
}

pub fn walk_selector<V: VisitMut + ?Sized>(v: &mut V, sel: &mut SelectorExpr) {
    v.visit_expr(&mut sel.x);
    v.visit_ident(&mut sel.sel);
}

pub fn walk_composite_lit<V: VisitMut + ?Sized>(v: &mut V, lit: &mut CompositeLit) {
    visit_opt_expr(v, &mut lit.ty);
    for elt in &mut lit.elts {
        v.visit_expr(elt);
    }
}

fn visit_opt_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Option<Box<Stmt>>) {
    if let Some(stmt) = stmt {
        v.visit_stmt(stmt);
    }
}

pub fn walk_stmt<V: VisitMut + ?Sized>(v: &mut V, stmt: &mut Stmt) {
    match stmt {
        Stmt::Bad(bad) => v.visit_bad(bad),
        Stmt::Decl(group) => v.visit_gen_decl(group),
        Stmt::Empty | Stmt::Branch(_) => {}
        Stmt::Labeled(labeled) => v.visit_stmt(&mut labeled.stmt),
        Stmt::Expr(expr) | Stmt::Go(expr) | Stmt::Defer(expr) => v.visit_expr(expr),
        Stmt::Send(send) => {
            v.visit_expr(&mut send.chan);
            v.visit_expr(&mut send.value);
        }
        Stmt::IncDec(incdec) => v.visit_expr(&mut incdec.x),
        Stmt::Assign(assign) => {
            for lhs in &mut assign.lhs {
                v.visit_expr(lhs);
            }
            for rhs in &mut assign.rhs {
                v.visit_expr(rhs);
            }
        }
        Stmt::Return(ret) => {
            for result in &mut ret.results {
                v.visit_expr(result);
            }
        }
        Stmt::Block(block) => v.visit_block(block),
        Stmt::If(if_stmt) => {
            visit_opt_stmt(v, &mut if_stmt.init);
            v.visit_expr(&mut if_stmt.cond);
            v.visit_block(&mut if_stmt.body);
            visit_opt_stmt(v, &mut if_stmt.els);
        }
        Stmt::Switch(switch) => {
            visit_opt_stmt(v, &mut switch.init);
            if let Some(tag) = &mut switch.tag {
                v.visit_expr(tag);
            }
            for clause in &mut switch.body {
                v.visit_case_clause(clause);
            }
        }
        Stmt::TypeSwitch(switch) => {
            visit_opt_stmt(v, &mut switch.init);
            v.visit_stmt(&mut switch.assign);
            for clause in &mut switch.body {
                v.visit_case_clause(clause);
            }
        }
        Stmt::For(for_stmt) => {
            visit_opt_stmt(v, &mut for_stmt.init);
            if let Some(cond) = &mut for_stmt.cond {
                v.visit_expr(cond);
            }
            visit_opt_stmt(v, &mut for_stmt.post);
            v.visit_block(&mut for_stmt.body);
        }
        Stmt::Range(range) => {
            if let Some(key) = &mut range.key {
                v.visit_expr(key);
            }
            if let Some(value) = &mut range.value {
                v.visit_expr(value);
            }
            v.visit_expr(&mut range.x);
            v.visit_block(&mut range.body);
        }
    }
}

pub fn walk_block<V: VisitMut + ?Sized>(v: &mut V, block: &mut BlockStmt) {
    for stmt in &mut block.list {
        v.visit_stmt(stmt);
    }
}

pub fn walk_case_clause<V: VisitMut + ?Sized>(v: &mut V, clause: &mut CaseClause) {
    if let Some(list) = &mut clause.list {
        for expr in list {
            v.visit_expr(expr);
        }
    }
    for stmt in &mut clause.body {
        v.visit_stmt(stmt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Collect(Vec<String>);

    impl VisitMut for Collect {
        fn visit_ident(&mut self, ident: &mut Ident) {
            self.0.push(ident.name.clone());
        }
    }

    #[test]
    fn test_walk_reaches_nested_idents_in_order() {
        let mut func = FuncDecl {
            recv: None,
            name: Ident::new("Hello"),
            ty: FuncType {
                type_params: None,
                params: FieldList::new(vec![Field::new(&["s"], Expr::ident("Struct"))]),
                results: None,
            },
            body: Some(BlockStmt::new(vec![Stmt::Expr(Expr::Call(CallExpr {
                fun: Box::new(Expr::selector(Expr::ident("fmt"), "Print")),
                args: vec![Expr::selector(Expr::ident("s"), "Name")],
                ellipsis: false,
            }))])),
        };
        let mut collect = Collect::default();
        collect.visit_func_decl(&mut func);
        assert_eq!(
            collect.0,
            vec!["Hello", "s", "Struct", "fmt", "Print", "s", "Name"]
        );
    }

    #[test]
    fn test_labels_are_not_visited() {
        let mut block = BlockStmt::new(vec![Stmt::Labeled(LabeledStmt {
            label: Ident::new("outer"),
            stmt: Box::new(Stmt::Branch(BranchStmt {
                tok: crate::token::Token::Break,
                label: Some(Ident::new("outer")),
            })),
        })]);
        let mut collect = Collect::default();
        collect.visit_block(&mut block);
        assert!(collect.0.is_empty());
    }
}
