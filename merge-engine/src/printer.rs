//! Go source rendering.
//!
//! Turns a [`File`] back into gofmt-style text: tab indentation, one blank
//! line between top-level declarations, multi-line struct and interface bodies.
//! Column alignment of gofmt is not reproduced; the output is valid Go that
//! `gofmt` will only realign.
//!
//! Rendering is total: `Bad` nodes are written back as their original text.

use crate::ast::*;
use crate::token::Token;

/// Render a whole file.
pub fn render(file: &File) -> String {
    let mut p = Printer::default();
    p.file(file);
    p.out
}

/// Render a single expression or type on one logical line.
pub fn expr_to_string(expr: &Expr) -> String {
    let mut p = Printer::default();
    p.expr(expr);
    p.out
}

#[derive(Default)]
struct Printer {
    out: String,
    indent: usize,
}

impl Printer {
    fn push(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn tabs(&mut self) {
        for _ in 0..self.indent {
            self.out.push('\t');
        }
    }

    fn file(&mut self, file: &File) {
        self.push("package ");
        self.push(&file.package.name);
        self.push("\n");
        for decl in &file.decls {
            self.push("\n");
            self.decl(decl);
            self.push("\n");
        }
    }

    // ── Declarations ────────────────────────────────────────────

    fn decl(&mut self, decl: &Decl) {
        match decl {
            Decl::Bad(bad) => self.push(&bad.text),
            Decl::Gen(group) => self.gen_decl(group),
            Decl::Func(func) => self.func_decl(func),
        }
    }

    fn gen_decl(&mut self, group: &GenDecl) {
        self.push(group.tok.as_str());
        if !group.grouped && group.specs.len() == 1 {
            self.push(" ");
            self.spec(&group.specs[0]);
            return;
        }
        self.push(" (");
        if group.specs.is_empty() {
            self.push(")");
            return;
        }
        self.push("\n");
        self.indent += 1;
        for spec in &group.specs {
            self.tabs();
            self.spec(spec);
            self.push("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.push(")");
    }

    fn spec(&mut self, spec: &Spec) {
        match spec {
            Spec::Import(import) => {
                if let Some(name) = &import.name {
                    self.push(&name.name);
                    self.push(" ");
                }
                self.push(&import.path.value);
            }
            Spec::Value(value) => {
                self.idents(&value.names);
                if let Some(ty) = &value.ty {
                    self.push(" ");
                    self.expr(ty);
                }
                if !value.values.is_empty() {
                    self.push(" = ");
                    self.exprs(&value.values);
                }
            }
            Spec::Type(ty) => {
                self.push(&ty.name.name);
                if let Some(params) = &ty.type_params {
                    self.push("[");
                    self.params(params);
                    self.push("]");
                }
                if ty.assign {
                    self.push(" =");
                }
                self.push(" ");
                self.expr(&ty.ty);
            }
        }
    }

    fn func_decl(&mut self, func: &FuncDecl) {
        self.push("func ");
        if let Some(recv) = &func.recv {
            self.push("(");
            self.params(recv);
            self.push(") ");
        }
        self.push(&func.name.name);
        self.signature(&func.ty);
        if let Some(body) = &func.body {
            self.push(" ");
            self.block(body);
        }
    }

    // ── Signatures and field lists ──────────────────────────────

    fn signature(&mut self, ty: &FuncType) {
        if let Some(type_params) = &ty.type_params {
            self.push("[");
            self.params(type_params);
            self.push("]");
        }
        self.push("(");
        self.params(&ty.params);
        self.push(")");
        if let Some(results) = &ty.results {
            match results.list.as_slice() {
                [] => {}
                [single] if single.names.is_empty() => {
                    self.push(" ");
                    self.expr(&single.ty);
                }
                _ => {
                    self.push(" (");
                    self.params(results);
                    self.push(")");
                }
            }
        }
    }

    /// Comma-separated parameter-style fields: `a, b int, c string`.
    fn params(&mut self, fields: &FieldList) {
        for (i, field) in fields.list.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            if !field.names.is_empty() {
                self.idents(&field.names);
                self.push(" ");
            }
            self.expr(&field.ty);
        }
    }

    fn struct_type(&mut self, st: &StructType) {
        if st.fields.is_empty() {
            self.push("struct{}");
            return;
        }
        self.push("struct {\n");
        self.indent += 1;
        for field in &st.fields.list {
            self.tabs();
            if !field.names.is_empty() {
                self.idents(&field.names);
                self.push(" ");
            }
            self.expr(&field.ty);
            if let Some(tag) = &field.tag {
                self.push(" ");
                self.push(&tag.value);
            }
            self.push("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.push("}");
    }

    fn interface_type(&mut self, it: &InterfaceType) {
        if it.methods.is_empty() {
            self.push("interface{}");
            return;
        }
        self.push("interface {\n");
        self.indent += 1;
        for field in &it.methods.list {
            self.tabs();
            match (&field.names[..], &field.ty) {
                ([name, ..], Expr::FuncType(sig)) => {
                    self.push(&name.name);
                    self.signature(sig);
                }
                _ => self.expr(&field.ty),
            }
            self.push("\n");
        }
        self.indent -= 1;
        self.tabs();
        self.push("}");
    }

    // ── Expressions ─────────────────────────────────────────────

    fn idents(&mut self, idents: &[Ident]) {
        for (i, ident) in idents.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.push(&ident.name);
        }
    }

    fn exprs(&mut self, exprs: &[Expr]) {
        for (i, expr) in exprs.iter().enumerate() {
            if i > 0 {
                self.push(", ");
            }
            self.expr(expr);
        }
    }

    fn opt_expr(&mut self, expr: &Option<Box<Expr>>) {
        if let Some(expr) = expr {
            self.expr(expr);
        }
    }

    fn expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Bad(bad) => self.push(&bad.text),
            Expr::Ident(ident) => self.push(&ident.name),
            Expr::Ellipsis(elt) => {
                self.push("...");
                self.opt_expr(elt);
            }
            Expr::BasicLit(lit) => self.push(&lit.value),
            Expr::FuncLit(lit) => {
                self.push("func");
                self.signature(&lit.ty);
                self.push(" ");
                self.block(&lit.body);
            }
            Expr::CompositeLit(lit) => self.composite_lit(lit),
            Expr::Paren(inner) => {
                self.push("(");
                self.expr(inner);
                self.push(")");
            }
            Expr::Selector(sel) => {
                self.expr(&sel.x);
                self.push(".");
                self.push(&sel.sel.name);
            }
            Expr::Index(index) => {
                self.expr(&index.x);
                self.push("[");
                self.expr(&index.index);
                self.push("]");
            }
            Expr::IndexList(index) => {
                self.expr(&index.x);
                self.push("[");
                self.exprs(&index.indices);
                self.push("]");
            }
            Expr::Slice(slice) => {
                self.expr(&slice.x);
                self.push("[");
                self.opt_expr(&slice.low);
                self.push(":");
                self.opt_expr(&slice.high);
                if slice.slice3 {
                    self.push(":");
                    self.opt_expr(&slice.max);
                }
                self.push("]");
            }
            Expr::TypeAssert(assert) => {
                self.expr(&assert.x);
                self.push(".(");
                match &assert.ty {
                    Some(ty) => self.expr(ty),
                    None => self.push("type"),
                }
                self.push(")");
            }
            Expr::Call(call) => {
                self.expr(&call.fun);
                self.push("(");
                self.exprs(&call.args);
                if call.ellipsis {
                    self.push("...");
                }
                self.push(")");
            }
            Expr::Star(inner) => {
                self.push("*");
                self.expr(inner);
            }
            Expr::Unary(unary) => {
                self.push(unary.op.as_str());
                self.expr(&unary.x);
            }
            Expr::Binary(binary) => {
                self.expr(&binary.x);
                self.push(" ");
                self.push(binary.op.as_str());
                self.push(" ");
                self.expr(&binary.y);
            }
            Expr::KeyValue(kv) => {
                self.expr(&kv.key);
                self.push(": ");
                self.expr(&kv.value);
            }
            Expr::ArrayType(array) => {
                self.push("[");
                self.opt_expr(&array.len);
                self.push("]");
                self.expr(&array.elt);
            }
            Expr::StructType(st) => self.struct_type(st),
            Expr::FuncType(ft) => {
                self.push("func");
                self.signature(ft);
            }
            Expr::InterfaceType(it) => self.interface_type(it),
            Expr::MapType(map) => {
                self.push("map[");
                self.expr(&map.key);
                self.push("]");
                self.expr(&map.value);
            }
            Expr::ChanType(chan) => {
                self.push(match chan.dir {
                    ChanDir::Both => "chan ",
                    ChanDir::Send => "chan<- ",
                    ChanDir::Recv => "<-chan ",
                });
                self.expr(&chan.value);
            }
        }
    }

    fn composite_lit(&mut self, lit: &CompositeLit) {
        if let Some(ty) = &lit.ty {
            self.expr(ty);
        }
        let multiline = lit.elts.iter().any(|elt| {
            matches!(
                elt,
                Expr::KeyValue(_) | Expr::CompositeLit(_) | Expr::FuncLit(_)
            )
        });
        if !multiline {
            self.push("{");
            self.exprs(&lit.elts);
            self.push("}");
            return;
        }
        self.push("{\n");
        self.indent += 1;
        for elt in &lit.elts {
            self.tabs();
            self.expr(elt);
            self.push(",\n");
        }
        self.indent -= 1;
        self.tabs();
        self.push("}");
    }

    // ── Statements ──────────────────────────────────────────────

    fn block(&mut self, block: &BlockStmt) {
        self.push("{\n");
        self.indent += 1;
        self.stmt_lines(&block.list);
        self.indent -= 1;
        self.tabs();
        self.push("}");
    }

    fn stmt_lines(&mut self, stmts: &[Stmt]) {
        for stmt in stmts {
            if matches!(stmt, Stmt::Empty) {
                continue;
            }
            self.tabs();
            self.stmt(stmt);
            self.push("\n");
        }
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Bad(bad) => self.push(&bad.text),
            Stmt::Decl(group) => self.gen_decl(group),
            Stmt::Empty => {}
            Stmt::Labeled(labeled) => {
                self.push(&labeled.label.name);
                self.push(":\n");
                self.tabs();
                self.stmt(&labeled.stmt);
            }
            Stmt::Expr(expr) => self.expr(expr),
            Stmt::Send(send) => {
                self.expr(&send.chan);
                self.push(" <- ");
                self.expr(&send.value);
            }
            Stmt::IncDec(incdec) => {
                self.expr(&incdec.x);
                self.push(incdec.tok.as_str());
            }
            Stmt::Assign(assign) => {
                self.exprs(&assign.lhs);
                self.push(" ");
                self.push(assign.tok.as_str());
                self.push(" ");
                self.exprs(&assign.rhs);
            }
            Stmt::Go(call) => {
                self.push("go ");
                self.expr(call);
            }
            Stmt::Defer(call) => {
                self.push("defer ");
                self.expr(call);
            }
            Stmt::Return(ret) => {
                self.push("return");
                if !ret.results.is_empty() {
                    self.push(" ");
                    self.exprs(&ret.results);
                }
            }
            Stmt::Branch(branch) => {
                self.push(branch.tok.as_str());
                if let Some(label) = &branch.label {
                    self.push(" ");
                    self.push(&label.name);
                }
            }
            Stmt::Block(block) => self.block(block),
            Stmt::If(if_stmt) => self.if_stmt(if_stmt),
            Stmt::Switch(switch) => {
                self.push("switch");
                self.header_init(&switch.init);
                if let Some(tag) = &switch.tag {
                    self.push(" ");
                    self.expr(tag);
                }
                self.push(" ");
                self.case_clauses(&switch.body);
            }
            Stmt::TypeSwitch(switch) => {
                self.push("switch");
                self.header_init(&switch.init);
                self.push(" ");
                self.stmt(&switch.assign);
                self.push(" ");
                self.case_clauses(&switch.body);
            }
            Stmt::For(for_stmt) => {
                self.push("for");
                if for_stmt.init.is_some() || for_stmt.post.is_some() {
                    self.push(" ");
                    if let Some(init) = &for_stmt.init {
                        self.stmt(init);
                    }
                    self.push("; ");
                    if let Some(cond) = &for_stmt.cond {
                        self.expr(cond);
                    }
                    self.push(";");
                    if let Some(post) = &for_stmt.post {
                        self.push(" ");
                        self.stmt(post);
                    }
                } else if let Some(cond) = &for_stmt.cond {
                    self.push(" ");
                    self.expr(cond);
                }
                self.push(" ");
                self.block(&for_stmt.body);
            }
            Stmt::Range(range) => {
                self.push("for ");
                if let Some(key) = &range.key {
                    self.expr(key);
                    if let Some(value) = &range.value {
                        self.push(", ");
                        self.expr(value);
                    }
                    self.push(" ");
                    self.push(range.tok.unwrap_or(Token::Define).as_str());
                    self.push(" ");
                }
                self.push("range ");
                self.expr(&range.x);
                self.push(" ");
                self.block(&range.body);
            }
        }
    }

    fn header_init(&mut self, init: &Option<Box<Stmt>>) {
        if let Some(init) = init {
            self.push(" ");
            self.stmt(init);
            self.push(";");
        }
    }

    fn if_stmt(&mut self, if_stmt: &IfStmt) {
        self.push("if ");
        if let Some(init) = &if_stmt.init {
            self.stmt(init);
            self.push("; ");
        }
        self.expr(&if_stmt.cond);
        self.push(" ");
        self.block(&if_stmt.body);
        if let Some(els) = &if_stmt.els {
            self.push(" else ");
            self.stmt(els);
        }
    }

    fn case_clauses(&mut self, clauses: &[CaseClause]) {
        self.push("{\n");
        for clause in clauses {
            self.tabs();
            match &clause.list {
                Some(list) => {
                    self.push("case ");
                    self.exprs(list);
                    self.push(":\n");
                }
                None => self.push("default:\n"),
            }
            self.indent += 1;
            self.stmt_lines(&clause.body);
            self.indent -= 1;
        }
        self.tabs();
        self.push("}");
    }
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

    #[test]
    fn test_render_struct_and_import() {
        let mut file = File::new("out");
        file.decls.push(Decl::Gen(GenDecl::new(
            Token::Import,
            vec![Spec::Import(ImportSpec {
                name: None,
                path: BasicLit::new(LitKind::String, "\"fmt\""),
            })],
        )));
        file.decls.push(struct_decl(
            "Struct",
            vec![
                Field::new(&["FirstName", "LastName"], Expr::ident("string")),
                Field::new(&["Next"], Expr::star(Expr::ident("Struct"))),
            ],
        ));
        assert_eq!(
            render(&file),
            "package out\n\nimport \"fmt\"\n\ntype Struct struct {\n\tFirstName, LastName string\n\tNext *Struct\n}\n"
        );
    }

    #[test]
    fn test_render_empty_struct() {
        let mut file = File::new("p");
        file.decls.push(struct_decl("Empty", vec![]));
        assert_eq!(render(&file), "package p\n\ntype Empty struct{}\n");
    }

    #[test]
    fn test_render_grouped_vars() {
        let mut group = GenDecl::new(
            Token::Var,
            vec![
                Spec::Value(ValueSpec {
                    names: vec![Ident::new("Foo")],
                    ty: None,
                    values: vec![Expr::string_lit("\"Bar\"")],
                }),
                Spec::Value(ValueSpec {
                    names: vec![Ident::new("File")],
                    ty: None,
                    values: vec![Expr::string_lit("\"0.go\"")],
                }),
            ],
        );
        group.grouped = true;
        let mut file = File::new("p");
        file.decls.push(Decl::Gen(group));
        assert_eq!(
            render(&file),
            "package p\n\nvar (\n\tFoo = \"Bar\"\n\tFile = \"0.go\"\n)\n"
        );
    }

    #[test]
    fn test_render_method_with_body() {
        let func = FuncDecl {
            recv: Some(FieldList::new(vec![Field::new(
                &["s"],
                Expr::star(Expr::ident("Struct")),
            )])),
            name: Ident::new("Name"),
            ty: FuncType {
                type_params: None,
                params: FieldList::default(),
                results: Some(FieldList::new(vec![Field::new(&[], Expr::ident("string"))])),
            },
            body: Some(BlockStmt::new(vec![Stmt::Return(ReturnStmt {
                results: vec![Expr::selector(Expr::ident("s"), "Name")],
            })])),
        };
        let mut file = File::new("p");
        file.decls.push(Decl::Func(func));
        assert_eq!(
            render(&file),
            "package p\n\nfunc (s *Struct) Name() string {\n\treturn s.Name\n}\n"
        );
    }

    #[test]
    fn test_expr_to_string_types() {
        let map = Expr::MapType(MapType {
            key: Box::new(Expr::ident("string")),
            value: Box::new(Expr::ArrayType(ArrayType {
                len: None,
                elt: Box::new(Expr::selector(Expr::ident("io"), "Reader")),
            })),
        });
        assert_eq!(expr_to_string(&map), "map[string][]io.Reader");

        let chan = Expr::ChanType(ChanType {
            dir: ChanDir::Recv,
            value: Box::new(Expr::ident("int")),
        });
        assert_eq!(expr_to_string(&chan), "<-chan int");
    }

    #[test]
    fn test_render_keyed_composite_literal() {
        let lit = Expr::CompositeLit(CompositeLit {
            ty: Some(Box::new(Expr::ident("T"))),
            elts: vec![Expr::KeyValue(KeyValueExpr {
                key: Box::new(Expr::ident("Reader")),
                value: Box::new(Expr::ident("reader")),
            })],
            incomplete: false,
        });
        assert_eq!(expr_to_string(&lit), "T{\n\tReader: reader,\n}");
    }
}
