//! Abstract syntax tree for Go source units.
//!
//! The tree mirrors the shape of Go's own `go/ast` package closely enough that
//! every construct the merge engine reasons about has its own variant:
//! - **Expr**: expressions *and* types (a type in Go is just an expression in a
//!   type position, e.g. `io.Reader` is a selector on the import alias `io`)
//! - **Stmt**: statements inside function bodies
//! - **Decl / Spec**: top-level declarations and the specs of grouped ones
//!
//! Source positions and comments are not kept. Constructs the lowering does not
//! model end up as [`BadNode`]s that carry their original text.

use crate::token::Token;

/// One parsed Go file.
#[derive(Debug, Clone, PartialEq)]
pub struct File {
    pub package: Ident,
    pub decls: Vec<Decl>,
}

impl File {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: Ident::new(package),
            decls: Vec::new(),
        }
    }

    /// All import specs of the file, in source order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Gen(group) if group.tok == Token::Import => Some(&group.specs),
                _ => None,
            })
            .flatten()
            .filter_map(|spec| match spec {
                Spec::Import(import) => Some(import),
                _ => None,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident {
    pub name: String,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.name == "_"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

/// A literal; `value` is the exact source spelling (quotes included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicLit {
    pub kind: LitKind,
    pub value: String,
}

impl BasicLit {
    pub fn new(kind: LitKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Source text of a construct the tree does not model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadNode {
    /// Grammar kind of the unmodelled construct, e.g. `select_statement`.
    pub kind: String,
    pub text: String,
    /// 1-based line of the construct in its unit.
    pub line: usize,
}

// ── Fields ──────────────────────────────────────────────────────

/// A struct field, interface element, parameter, result or receiver.
/// Embedded fields and unnamed parameters have no names.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub names: Vec<Ident>,
    pub ty: Expr,
    pub tag: Option<BasicLit>,
}

impl Field {
    pub fn new(names: &[&str], ty: Expr) -> Self {
        Self {
            names: names.iter().map(|n| Ident::new(*n)).collect(),
            ty,
            tag: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldList {
    pub list: Vec<Field>,
}

impl FieldList {
    pub fn new(list: Vec<Field>) -> Self {
        Self { list }
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }
}

// ── Expressions and types ───────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Bad(BadNode),
    Ident(Ident),
    /// `...T` in a variadic parameter, or the `...` length of `[...]T`.
    Ellipsis(Option<Box<Expr>>),
    BasicLit(BasicLit),
    FuncLit(FuncLit),
    CompositeLit(CompositeLit),
    Paren(Box<Expr>),
    Selector(SelectorExpr),
    Index(IndexExpr),
    /// Generic instantiation with more than one type argument.
    IndexList(IndexListExpr),
    Slice(SliceExpr),
    TypeAssert(TypeAssertExpr),
    Call(CallExpr),
    /// Pointer type `*T` or dereference `*x`.
    Star(Box<Expr>),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    KeyValue(KeyValueExpr),
    ArrayType(ArrayType),
    StructType(StructType),
    FuncType(FuncType),
    InterfaceType(InterfaceType),
    MapType(MapType),
    ChanType(ChanType),
}

impl Expr {
    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(Ident::new(name))
    }

    pub fn selector(x: Expr, sel: impl Into<String>) -> Self {
        Expr::Selector(SelectorExpr {
            x: Box::new(x),
            sel: Ident::new(sel),
        })
    }

    pub fn star(x: Expr) -> Self {
        Expr::Star(Box::new(x))
    }

    pub fn string_lit(value: impl Into<String>) -> Self {
        Expr::BasicLit(BasicLit::new(LitKind::String, value))
    }

    /// Short name of the variant, used in mismatch descriptions.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expr::Bad(_) => "bad expression",
            Expr::Ident(_) => "identifier",
            Expr::Ellipsis(_) => "ellipsis",
            Expr::BasicLit(_) => "literal",
            Expr::FuncLit(_) => "function literal",
            Expr::CompositeLit(_) => "composite literal",
            Expr::Paren(_) => "parenthesized expression",
            Expr::Selector(_) => "selector",
            Expr::Index(_) => "index expression",
            Expr::IndexList(_) => "index list expression",
            Expr::Slice(_) => "slice expression",
            Expr::TypeAssert(_) => "type assertion",
            Expr::Call(_) => "call",
            Expr::Star(_) => "star expression",
            Expr::Unary(_) => "unary expression",
            Expr::Binary(_) => "binary expression",
            Expr::KeyValue(_) => "key-value pair",
            Expr::ArrayType(_) => "array type",
            Expr::StructType(_) => "struct type",
            Expr::FuncType(_) => "function type",
            Expr::InterfaceType(_) => "interface type",
            Expr::MapType(_) => "map type",
            Expr::ChanType(_) => "channel type",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncLit {
    pub ty: FuncType,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeLit {
    /// Absent for elided inner literals such as the elements of `[]T{{...}}`.
    pub ty: Option<Box<Expr>>,
    pub elts: Vec<Expr>,
    pub incomplete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorExpr {
    pub x: Box<Expr>,
    pub sel: Ident,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub x: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexListExpr {
    pub x: Box<Expr>,
    pub indices: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SliceExpr {
    pub x: Box<Expr>,
    pub low: Option<Box<Expr>>,
    pub high: Option<Box<Expr>>,
    pub max: Option<Box<Expr>>,
    pub slice3: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeAssertExpr {
    pub x: Box<Expr>,
    /// `None` for the `x.(type)` form of a type switch.
    pub ty: Option<Box<Expr>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub fun: Box<Expr>,
    pub args: Vec<Expr>,
    /// Last argument is spread with `...`.
    pub ellipsis: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Token,
    pub x: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub x: Box<Expr>,
    pub op: Token,
    pub y: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueExpr {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

/// `[len]T`; a slice type has no length.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayType {
    pub len: Option<Box<Expr>>,
    pub elt: Box<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructType {
    pub fields: FieldList,
    pub incomplete: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncType {
    pub type_params: Option<FieldList>,
    pub params: FieldList,
    pub results: Option<FieldList>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    pub methods: FieldList,
    pub incomplete: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapType {
    pub key: Box<Expr>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChanType {
    pub dir: ChanDir,
    pub value: Box<Expr>,
}

// ── Statements ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Bad(BadNode),
    Decl(GenDecl),
    Empty,
    Labeled(LabeledStmt),
    Expr(Expr),
    Send(SendStmt),
    IncDec(IncDecStmt),
    Assign(AssignStmt),
    Go(Expr),
    Defer(Expr),
    Return(ReturnStmt),
    Branch(BranchStmt),
    Block(BlockStmt),
    If(IfStmt),
    Switch(SwitchStmt),
    TypeSwitch(TypeSwitchStmt),
    For(ForStmt),
    Range(RangeStmt),
}

impl Stmt {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Stmt::Bad(_) => "bad statement",
            Stmt::Decl(_) => "declaration statement",
            Stmt::Empty => "empty statement",
            Stmt::Labeled(_) => "labeled statement",
            Stmt::Expr(_) => "expression statement",
            Stmt::Send(_) => "send statement",
            Stmt::IncDec(_) => "inc/dec statement",
            Stmt::Assign(_) => "assignment",
            Stmt::Go(_) => "go statement",
            Stmt::Defer(_) => "defer statement",
            Stmt::Return(_) => "return statement",
            Stmt::Branch(_) => "branch statement",
            Stmt::Block(_) => "block",
            Stmt::If(_) => "if statement",
            Stmt::Switch(_) => "switch statement",
            Stmt::TypeSwitch(_) => "type switch statement",
            Stmt::For(_) => "for statement",
            Stmt::Range(_) => "range statement",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockStmt {
    pub list: Vec<Stmt>,
}

impl BlockStmt {
    pub fn new(list: Vec<Stmt>) -> Self {
        Self { list }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledStmt {
    pub label: Ident,
    pub stmt: Box<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendStmt {
    pub chan: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IncDecStmt {
    pub x: Expr,
    pub tok: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub lhs: Vec<Expr>,
    pub tok: Token,
    pub rhs: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub results: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchStmt {
    pub tok: Token,
    pub label: Option<Ident>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub body: BlockStmt,
    /// Either a block or another if statement.
    pub els: Option<Box<Stmt>>,
}

/// A `case`/`default` clause; `list` is `None` for `default`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseClause {
    pub list: Option<Vec<Expr>>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub tag: Option<Expr>,
    pub body: Vec<CaseClause>,
}

/// `switch [init;] [x :=] v.(type) { ... }`; `assign` is either an
/// expression statement or a `:=` assignment of a type assertion.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSwitchStmt {
    pub init: Option<Box<Stmt>>,
    pub assign: Box<Stmt>,
    pub body: Vec<CaseClause>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStmt {
    pub init: Option<Box<Stmt>>,
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RangeStmt {
    pub key: Option<Expr>,
    pub value: Option<Expr>,
    /// `:=` or `=`; absent for `for range x`.
    pub tok: Option<Token>,
    pub x: Expr,
    pub body: BlockStmt,
}

// ── Declarations ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Bad(BadNode),
    Gen(GenDecl),
    Func(FuncDecl),
}

/// `import`, `const`, `var` or `type` declaration, possibly grouped.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub tok: Token,
    pub specs: Vec<Spec>,
    /// Written with parentheses.
    pub grouped: bool,
}

impl GenDecl {
    pub fn new(tok: Token, specs: Vec<Spec>) -> Self {
        Self {
            tok,
            specs,
            grouped: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Spec {
    Import(ImportSpec),
    Value(ValueSpec),
    Type(TypeSpec),
}

impl Spec {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Spec::Import(_) => "import spec",
            Spec::Value(_) => "value spec",
            Spec::Type(_) => "type spec",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSpec {
    pub name: Option<Ident>,
    /// Quoted path literal.
    pub path: BasicLit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValueSpec {
    pub names: Vec<Ident>,
    pub ty: Option<Expr>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpec {
    pub name: Ident,
    pub type_params: Option<FieldList>,
    /// Alias declaration `type A = B`.
    pub assign: bool,
    pub ty: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub recv: Option<FieldList>,
    pub name: Ident,
    pub ty: FuncType,
    /// Absent for functions implemented outside Go.
    pub body: Option<BlockStmt>,
}

impl FuncDecl {
    pub fn is_method(&self) -> bool {
        self.recv.is_some()
    }

    /// Name of the receiver's base type, with pointer and type-parameter
    /// forms stripped: `func (s *List[T]) Len()` → `List`.
    pub fn receiver_type_name(&self) -> Option<&str> {
        let field = self.recv.as_ref()?.list.first()?;
        base_type_name(&field.ty)
    }
}

/// Name of the named type at the root of `ty`, looking through pointers,
/// parentheses and generic instantiation.
pub fn base_type_name(ty: &Expr) -> Option<&str> {
    match ty {
        Expr::Ident(ident) => Some(&ident.name),
        Expr::Star(inner) | Expr::Paren(inner) => base_type_name(inner),
        Expr::Index(index) => base_type_name(&index.x),
        Expr::IndexList(index) => base_type_name(&index.x),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method(recv_ty: Expr) -> FuncDecl {
        FuncDecl {
            recv: Some(FieldList::new(vec![Field::new(&["s"], recv_ty)])),
            name: Ident::new("Len"),
            ty: FuncType::default(),
            body: Some(BlockStmt::default()),
        }
    }

    #[test]
    fn test_receiver_name_plain_and_pointer() {
        assert_eq!(method(Expr::ident("List")).receiver_type_name(), Some("List"));
        assert_eq!(
            method(Expr::star(Expr::ident("List"))).receiver_type_name(),
            Some("List")
        );
    }

    #[test]
    fn test_receiver_name_generic() {
        let generic = Expr::star(Expr::Index(IndexExpr {
            x: Box::new(Expr::ident("List")),
            index: Box::new(Expr::ident("T")),
        }));
        assert_eq!(method(generic).receiver_type_name(), Some("List"));
    }

    #[test]
    fn test_file_imports_in_order() {
        let mut file = File::new("main");
        file.decls.push(Decl::Gen(GenDecl::new(
            Token::Import,
            vec![
                Spec::Import(ImportSpec {
                    name: None,
                    path: BasicLit::new(LitKind::String, "\"fmt\""),
                }),
                Spec::Import(ImportSpec {
                    name: Some(Ident::new("str")),
                    path: BasicLit::new(LitKind::String, "\"strings\""),
                }),
            ],
        )));
        let paths: Vec<_> = file.imports().map(|i| i.path.value.as_str()).collect();
        assert_eq!(paths, vec!["\"fmt\"", "\"strings\""]);
    }
}
