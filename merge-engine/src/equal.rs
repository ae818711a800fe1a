//! Structural equivalence of two syntax trees.
//!
//! Comparison ignores everything the tree does not carry (positions,
//! comments, formatting) and stops at the first difference. Two outcomes are
//! not plain "equal/unequal":
//!
//! - aggregate (struct) and interface types are compared member-by-member
//!   under the field-set protocol, and a right-hand side that only *adds*
//!   members yields [`Equivalence::AdditionalFields`] instead of a mismatch;
//! - a `Bad` node anywhere on either side aborts with
//!   [`MergeError::UnsupportedNode`], because nothing can be concluded about
//!   syntax that was not modelled.
//!
//! `AdditionalFields` only surfaces from the top of the comparison (a struct
//! or interface type, or a type spec whose underlying type is one). A struct
//! nested inside anything else that gains members is an ordinary mismatch.

use crate::ast::*;
use crate::error::MergeError;
use crate::fieldset::FieldSet;

/// A subtree handed to [`equivalent`].
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Expr(&'a Expr),
    Stmt(&'a Stmt),
    Block(&'a BlockStmt),
    FuncDecl(&'a FuncDecl),
    GenDecl(&'a GenDecl),
    TypeSpec(&'a TypeSpec),
    ValueSpec(&'a ValueSpec),
    FieldList(&'a FieldList),
}

impl Node<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            Node::Expr(e) => e.kind_name(),
            Node::Stmt(s) => s.kind_name(),
            Node::Block(_) => "block",
            Node::FuncDecl(_) => "function declaration",
            Node::GenDecl(_) => "grouped declaration",
            Node::TypeSpec(_) => "type spec",
            Node::ValueSpec(_) => "value spec",
            Node::FieldList(_) => "field list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Equivalence {
    Equal,
    /// First difference found, described for logs.
    Mismatch(String),
    /// Every shared member is equal and the right-hand side only adds members.
    AdditionalFields {
        only_in_a: Vec<String>,
        only_in_b: Vec<String>,
    },
}

impl Equivalence {
    pub fn is_equal(&self) -> bool {
        matches!(self, Equivalence::Equal)
    }
}

/// Compare `a` (the canonical side) with `b` (the incoming side).
pub fn equivalent(a: Node<'_>, b: Node<'_>) -> Result<Equivalence, MergeError> {
    let outcome = match (a, b) {
        (Node::Expr(x), Node::Expr(y)) => expr(x, y),
        (Node::Stmt(x), Node::Stmt(y)) => stmt(x, y),
        (Node::Block(x), Node::Block(y)) => block(x, y),
        (Node::FuncDecl(x), Node::FuncDecl(y)) => func_decl(x, y),
        (Node::GenDecl(x), Node::GenDecl(y)) => gen_decl(x, y),
        (Node::TypeSpec(x), Node::TypeSpec(y)) => type_spec(x, y),
        (Node::ValueSpec(x), Node::ValueSpec(y)) => value_spec(x, y),
        (Node::FieldList(x), Node::FieldList(y)) => {
            field_sets(&FieldSet::from_members(Some(x))?, &FieldSet::from_members(Some(y))?)
        }
        _ => Err(kind_mismatch(a.kind_name(), b.kind_name())),
    };
    match outcome {
        Ok(()) => Ok(Equivalence::Equal),
        Err(Difference::Mismatch(description)) => Ok(Equivalence::Mismatch(description)),
        Err(Difference::AdditionalFields {
            only_in_a,
            only_in_b,
        }) => Ok(Equivalence::AdditionalFields {
            only_in_a,
            only_in_b,
        }),
        Err(Difference::Fatal(err)) => Err(err),
    }
}

enum Difference {
    Mismatch(String),
    AdditionalFields {
        only_in_a: Vec<String>,
        only_in_b: Vec<String>,
    },
    Fatal(MergeError),
}

impl From<MergeError> for Difference {
    fn from(err: MergeError) -> Self {
        Difference::Fatal(err)
    }
}

type Cmp = Result<(), Difference>;

trait Context {
    /// Describe where a nested difference happened. Extra members below the
    /// top level are not mergeable and become a plain mismatch.
    fn context(self, what: &str) -> Cmp;
}

impl Context for Cmp {
    fn context(self, what: &str) -> Cmp {
        self.map_err(|diff| match diff {
            Difference::Mismatch(m) => Difference::Mismatch(format!("{what}: {m}")),
            Difference::AdditionalFields { only_in_a, only_in_b } => {
                let mut extra = only_in_a;
                extra.extend(only_in_b);
                Difference::Mismatch(format!("{what}: members differ ({})", extra.join(", ")))
            }
            fatal @ Difference::Fatal(_) => fatal,
        })
    }
}

fn mismatch(description: impl Into<String>) -> Difference {
    Difference::Mismatch(description.into())
}

fn kind_mismatch(a: &str, b: &str) -> Difference {
    mismatch(format!("kind: {a} vs {b}"))
}

fn check(same: bool, what: impl FnOnce() -> String) -> Cmp {
    if same { Ok(()) } else { Err(mismatch(what())) }
}

fn unsupported(bad: &BadNode) -> Difference {
    Difference::Fatal(MergeError::UnsupportedNode {
        kind: format!("{} at line {}", bad.kind, bad.line),
    })
}

// ── Leaves and lists ────────────────────────────────────────────

fn ident(a: &Ident, b: &Ident) -> Cmp {
    check(a.name == b.name, || format!("identifier `{}` vs `{}`", a.name, b.name))
}

fn lit(a: &BasicLit, b: &BasicLit) -> Cmp {
    check(a.kind == b.kind && a.value == b.value, || {
        format!("literal {} vs {}", a.value, b.value)
    })
}

fn opt<T>(a: Option<T>, b: Option<T>, cmp: impl FnOnce(T, T) -> Cmp) -> Cmp {
    match (a, b) {
        (None, None) => Ok(()),
        (Some(x), Some(y)) => cmp(x, y),
        _ => Err(mismatch("present on one side only")),
    }
}

fn opt_expr(a: &Option<Box<Expr>>, b: &Option<Box<Expr>>) -> Cmp {
    opt(a.as_deref(), b.as_deref(), expr)
}

fn opt_stmt(a: &Option<Box<Stmt>>, b: &Option<Box<Stmt>>) -> Cmp {
    opt(a.as_deref(), b.as_deref(), stmt)
}

fn list<T>(a: &[T], b: &[T], what: &str, cmp: impl Fn(&T, &T) -> Cmp) -> Cmp {
    check(a.len() == b.len(), || {
        format!("{what}: {} vs {} elements", a.len(), b.len())
    })?;
    for (i, (x, y)) in a.iter().zip(b).enumerate() {
        cmp(x, y).context(&format!("{what}[{i}]"))?;
    }
    Ok(())
}

fn exprs(a: &[Expr], b: &[Expr], what: &str) -> Cmp {
    list(a, b, what, expr)
}

fn stmts(a: &[Stmt], b: &[Stmt], what: &str) -> Cmp {
    list(a, b, what, stmt)
}

// ── Field-set protocol ──────────────────────────────────────────

fn field_sets(a: &FieldSet, b: &FieldSet) -> Cmp {
    let mut only_in_a = Vec::new();
    for (key, ea) in a.iter() {
        let Some(eb) = b.get(key) else {
            only_in_a.push(key.to_string());
            continue;
        };
        let what = format!("member `{key}`");
        check(ea.embedded == eb.embedded, || format!("{what}: embedded vs named"))?;
        opt(ea.tag.as_ref(), eb.tag.as_ref(), lit).context(&format!("{what} tag"))?;
        expr(&ea.ty, &eb.ty).context(&what)?;
    }
    let only_in_b: Vec<String> = b
        .iter()
        .filter(|(key, _)| !a.contains(key))
        .map(|(key, _)| key.to_string())
        .collect();

    if !only_in_a.is_empty() {
        return Err(mismatch(format!(
            "members missing from incoming side: {}",
            only_in_a.join(", ")
        )));
    }
    if only_in_b.is_empty() {
        Ok(())
    } else {
        Err(Difference::AdditionalFields {
            only_in_a,
            only_in_b,
        })
    }
}

fn params(a: Option<&FieldList>, b: Option<&FieldList>, what: &str) -> Cmp {
    field_sets(&FieldSet::from_params(a)?, &FieldSet::from_params(b)?).context(what)
}

// ── Expressions and types ───────────────────────────────────────

fn expr(a: &Expr, b: &Expr) -> Cmp {
    use Expr as E;
    match (a, b) {
        (E::Bad(bad), _) | (_, E::Bad(bad)) => Err(unsupported(bad)),
        (E::Ident(x), E::Ident(y)) => ident(x, y),
        (E::Ellipsis(x), E::Ellipsis(y)) => opt_expr(x, y).context("ellipsis"),
        (E::BasicLit(x), E::BasicLit(y)) => lit(x, y),
        (E::FuncLit(x), E::FuncLit(y)) => {
            func_type(&x.ty, &y.ty).context("function literal")?;
            block(&x.body, &y.body).context("function literal body")
        }
        (E::CompositeLit(x), E::CompositeLit(y)) => {
            check(!x.incomplete && !y.incomplete, || {
                "composite literal: incomplete".to_string()
            })?;
            opt_expr(&x.ty, &y.ty).context("composite literal type")?;
            exprs(&x.elts, &y.elts, "composite literal")
        }
        (E::Paren(x), E::Paren(y)) => expr(x, y).context("parentheses"),
        (E::Selector(x), E::Selector(y)) => {
            ident(&x.sel, &y.sel).context("selector")?;
            expr(&x.x, &y.x).context("selector base")
        }
        (E::Index(x), E::Index(y)) => {
            expr(&x.index, &y.index).context("index")?;
            expr(&x.x, &y.x).context("indexed operand")
        }
        (E::IndexList(x), E::IndexList(y)) => {
            exprs(&x.indices, &y.indices, "type arguments")?;
            expr(&x.x, &y.x).context("indexed operand")
        }
        (E::Slice(x), E::Slice(y)) => {
            check(x.slice3 == y.slice3, || "slice: 2 vs 3 indices".to_string())?;
            expr(&x.x, &y.x).context("sliced operand")?;
            opt_expr(&x.low, &y.low).context("slice low")?;
            opt_expr(&x.high, &y.high).context("slice high")?;
            opt_expr(&x.max, &y.max).context("slice max")
        }
        (E::TypeAssert(x), E::TypeAssert(y)) => {
            expr(&x.x, &y.x).context("type assertion")?;
            opt_expr(&x.ty, &y.ty).context("asserted type")
        }
        (E::Call(x), E::Call(y)) => {
            check(x.ellipsis == y.ellipsis, || "call: spread argument".to_string())?;
            expr(&x.fun, &y.fun).context("callee")?;
            exprs(&x.args, &y.args, "arguments")
        }
        (E::Star(x), E::Star(y)) => expr(x, y).context("pointee"),
        (E::Unary(x), E::Unary(y)) => {
            check(x.op == y.op, || format!("operator {} vs {}", x.op, y.op))?;
            expr(&x.x, &y.x).context("operand")
        }
        (E::Binary(x), E::Binary(y)) => {
            check(x.op == y.op, || format!("operator {} vs {}", x.op, y.op))?;
            expr(&x.x, &y.x).context("left operand")?;
            expr(&x.y, &y.y).context("right operand")
        }
        (E::KeyValue(x), E::KeyValue(y)) => {
            expr(&x.key, &y.key).context("key")?;
            expr(&x.value, &y.value).context("value")
        }
        (E::ArrayType(x), E::ArrayType(y)) => {
            opt_expr(&x.len, &y.len).context("array length")?;
            expr(&x.elt, &y.elt).context("element type")
        }
        (E::StructType(x), E::StructType(y)) => {
            check(!x.incomplete && !y.incomplete, || "struct: incomplete".to_string())?;
            field_sets(
                &FieldSet::from_members(Some(&x.fields))?,
                &FieldSet::from_members(Some(&y.fields))?,
            )
        }
        (E::InterfaceType(x), E::InterfaceType(y)) => {
            check(!x.incomplete && !y.incomplete, || "interface: incomplete".to_string())?;
            field_sets(
                &FieldSet::from_members(Some(&x.methods))?,
                &FieldSet::from_members(Some(&y.methods))?,
            )
        }
        (E::FuncType(x), E::FuncType(y)) => func_type(x, y),
        (E::MapType(x), E::MapType(y)) => {
            expr(&x.key, &y.key).context("map key")?;
            expr(&x.value, &y.value).context("map value")
        }
        (E::ChanType(x), E::ChanType(y)) => {
            check(x.dir == y.dir, || "channel direction".to_string())?;
            expr(&x.value, &y.value).context("channel element")
        }
        _ => Err(kind_mismatch(a.kind_name(), b.kind_name())),
    }
}

fn func_type(a: &FuncType, b: &FuncType) -> Cmp {
    params(a.type_params.as_ref(), b.type_params.as_ref(), "type parameters")?;
    params(Some(&a.params), Some(&b.params), "parameters")?;
    params(a.results.as_ref(), b.results.as_ref(), "results")
}

// ── Statements ──────────────────────────────────────────────────

fn block(a: &BlockStmt, b: &BlockStmt) -> Cmp {
    stmts(&a.list, &b.list, "block")
}

fn case_clause(a: &CaseClause, b: &CaseClause) -> Cmp {
    opt(a.list.as_deref(), b.list.as_deref(), |x, y| exprs(x, y, "case"))?;
    stmts(&a.body, &b.body, "case body")
}

fn stmt(a: &Stmt, b: &Stmt) -> Cmp {
    use Stmt as S;
    match (a, b) {
        (S::Bad(bad), _) | (_, S::Bad(bad)) => Err(unsupported(bad)),
        (S::Decl(x), S::Decl(y)) => gen_decl(x, y),
        (S::Empty, S::Empty) => Ok(()),
        (S::Labeled(x), S::Labeled(y)) => {
            ident(&x.label, &y.label).context("label")?;
            stmt(&x.stmt, &y.stmt)
        }
        (S::Expr(x), S::Expr(y)) | (S::Go(x), S::Go(y)) | (S::Defer(x), S::Defer(y)) => expr(x, y),
        (S::Send(x), S::Send(y)) => {
            expr(&x.chan, &y.chan).context("channel")?;
            expr(&x.value, &y.value).context("sent value")
        }
        (S::IncDec(x), S::IncDec(y)) => {
            check(x.tok == y.tok, || format!("operator {} vs {}", x.tok, y.tok))?;
            expr(&x.x, &y.x)
        }
        (S::Assign(x), S::Assign(y)) => {
            check(x.tok == y.tok, || format!("assignment {} vs {}", x.tok, y.tok))?;
            exprs(&x.lhs, &y.lhs, "assignment targets")?;
            exprs(&x.rhs, &y.rhs, "assigned values")
        }
        (S::Return(x), S::Return(y)) => exprs(&x.results, &y.results, "return"),
        (S::Branch(x), S::Branch(y)) => {
            check(x.tok == y.tok, || format!("{} vs {}", x.tok, y.tok))?;
            opt(x.label.as_ref(), y.label.as_ref(), ident).context("branch label")
        }
        (S::Block(x), S::Block(y)) => block(x, y),
        (S::If(x), S::If(y)) => {
            opt_stmt(&x.init, &y.init).context("if init")?;
            expr(&x.cond, &y.cond).context("if condition")?;
            block(&x.body, &y.body).context("if body")?;
            opt_stmt(&x.els, &y.els).context("else branch")
        }
        (S::Switch(x), S::Switch(y)) => {
            opt_stmt(&x.init, &y.init).context("switch init")?;
            opt(x.tag.as_ref(), y.tag.as_ref(), expr).context("switch tag")?;
            list(&x.body, &y.body, "switch clauses", case_clause)
        }
        (S::TypeSwitch(x), S::TypeSwitch(y)) => {
            opt_stmt(&x.init, &y.init).context("switch init")?;
            stmt(&x.assign, &y.assign).context("type switch guard")?;
            list(&x.body, &y.body, "switch clauses", case_clause)
        }
        (S::For(x), S::For(y)) => {
            opt_stmt(&x.init, &y.init).context("for init")?;
            opt(x.cond.as_ref(), y.cond.as_ref(), expr).context("for condition")?;
            opt_stmt(&x.post, &y.post).context("for post")?;
            block(&x.body, &y.body).context("for body")
        }
        (S::Range(x), S::Range(y)) => {
            check(x.tok == y.tok, || "range token".to_string())?;
            opt(x.key.as_ref(), y.key.as_ref(), expr).context("range key")?;
            opt(x.value.as_ref(), y.value.as_ref(), expr).context("range value")?;
            expr(&x.x, &y.x).context("range operand")?;
            block(&x.body, &y.body).context("range body")
        }
        _ => Err(kind_mismatch(a.kind_name(), b.kind_name())),
    }
}

// ── Declarations ────────────────────────────────────────────────

fn gen_decl(a: &GenDecl, b: &GenDecl) -> Cmp {
    check(a.tok == b.tok, || format!("declaration {} vs {}", a.tok, b.tok))?;
    list(&a.specs, &b.specs, "specs", spec)
}

fn spec(a: &Spec, b: &Spec) -> Cmp {
    match (a, b) {
        (Spec::Import(x), Spec::Import(y)) => {
            opt(x.name.as_ref(), y.name.as_ref(), ident).context("import name")?;
            lit(&x.path, &y.path)
        }
        (Spec::Value(x), Spec::Value(y)) => value_spec(x, y),
        (Spec::Type(x), Spec::Type(y)) => type_spec(x, y).context("type spec"),
        _ => Err(kind_mismatch(a.kind_name(), b.kind_name())),
    }
}

fn value_spec(a: &ValueSpec, b: &ValueSpec) -> Cmp {
    opt(a.ty.as_ref(), b.ty.as_ref(), expr).context("declared type")?;
    list(&a.names, &b.names, "names", ident)?;
    exprs(&a.values, &b.values, "values")
}

fn type_spec(a: &TypeSpec, b: &TypeSpec) -> Cmp {
    ident(&a.name, &b.name)?;
    check(a.assign == b.assign, || "alias vs defined type".to_string())?;
    params(a.type_params.as_ref(), b.type_params.as_ref(), "type parameters")?;
    expr(&a.ty, &b.ty)
}

fn func_decl(a: &FuncDecl, b: &FuncDecl) -> Cmp {
    ident(&a.name, &b.name)?;
    params(a.recv.as_ref(), b.recv.as_ref(), "receiver")?;
    func_type(&a.ty, &b.ty).context("signature")?;
    opt(a.body.as_ref(), b.body.as_ref(), block).context("body")
}
