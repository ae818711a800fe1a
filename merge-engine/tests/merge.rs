use srcmerge_engine::ast::Decl;
use srcmerge_engine::{Decision, MergeError, MergeOutput, merge_all, parse_file};

fn merge(units: &[(&str, &str)]) -> MergeOutput {
    let units = units
        .iter()
        .map(|(src, tag)| (parse_file(src).unwrap(), tag.to_string()))
        .collect();
    merge_all("out", units).unwrap()
}

const CONFLICT_0: &str = r#"package conflict

import "fmt"

type Struct struct {
	FirstName, LastName string
	Struct              *Struct
}

func Hello(s Struct) {
	s = *s.Struct
	fmt.Printf("%v - %v", s.FirstName, s.LastName)
}

var (
	Foo  = "Bar"
	File = "0.go"
)
"#;

const CONFLICT_1: &str = r#"package conflict

import "fmt"

type Struct struct {
	LastName *string
	Struct   *Struct
}

func Hello(s Struct) {
	s = *s.Struct
	fmt.Print(s.LastName)
}

var (
	Foo  = "Bar"
	File = "1.go"
)
"#;

const DUPLICATES_0: &str = r#"package duplicates

import "io"

const Hello = "World"

var Foo = "Bar"

type Struct struct{}

type ImportFieldType struct {
	Reader io.Reader
}

func (i *ImportFieldType) GetReader() io.Reader {
	return i.Reader
}
"#;

const DUPLICATES_1: &str = r#"package duplicates

import "io"

const Hello = "World"

var Foo = "Bar"

type Struct struct{}

type ImportFieldType struct {
	Reader io.Reader
}

func NewImportFieldType(reader io.Reader) ImportFieldType {
	return ImportFieldType{
		Reader: reader,
	}
}

func (i *ImportFieldType) GetReader() io.Reader {
	return i.Reader
}
"#;

#[test]
fn test_basic_units_merge_without_conflict() {
    let out = merge(&[
        (
            "package basic\n\nimport \"fmt\"\n\ntype Struct struct{ Name string }\n\nfunc (s Struct) Hello() {\n\tfmt.Print(\"Hello %w\", s.Name)\n}\n",
            "0",
        ),
        (
            "package basic\n\ntype Interface interface{ Hello() }\n",
            "1",
        ),
    ]);
    let expected = "package out

import \"fmt\"

type Struct struct {
\tName string
}

func (s Struct) Hello() {
\tfmt.Print(\"Hello %w\", s.Name)
}

type Interface interface {
\tHello()
}
";
    assert_eq!(out.render(), expected);
    assert_eq!(out.renames().count(), 0);
}

#[test]
fn test_conflict_name_renames_incoming_unit() {
    let out = merge(&[(CONFLICT_0, "0"), (CONFLICT_1, "1")]);
    let expected = "package out

import \"fmt\"

type Struct struct {
\tFirstName, LastName string
\tStruct *Struct
}

func Hello(s Struct) {
\ts = *s.Struct
\tfmt.Printf(\"%v - %v\", s.FirstName, s.LastName)
}

var (
\tFoo = \"Bar\"
\tFile = \"0.go\"
)

type Struct1 struct {
\tLastName *string
\tStruct *Struct1
}

func Hello1(s Struct1) {
\ts = *s.Struct
\tfmt.Print(s.LastName)
}

var (
\tFile1 = \"1.go\"
)
";
    assert_eq!(out.render(), expected);

    let renamed: Vec<_> = out
        .renames()
        .map(|d| match d {
            Decision::Renamed { from, to, .. } => (from.as_str(), to.as_str()),
            other => panic!("unexpected decision {other:?}"),
        })
        .collect();
    assert_eq!(
        renamed,
        vec![("Struct", "Struct1"), ("Hello", "Hello1"), ("File", "File1")]
    );
    assert!(out.decisions.contains(&Decision::DuplicateDropped {
        unit: 1,
        tag: "1".into(),
        key: "Foo".into(),
    }));
}

#[test]
fn test_duplicates_keep_one_copy() {
    let out = merge(&[(DUPLICATES_0, "0"), (DUPLICATES_1, "1")]);
    let expected = "package out

import \"io\"

const Hello = \"World\"

var Foo = \"Bar\"

type Struct struct{}

type ImportFieldType struct {
\tReader io.Reader
}

func (i *ImportFieldType) GetReader() io.Reader {
\treturn i.Reader
}

func NewImportFieldType(reader io.Reader) ImportFieldType {
\treturn ImportFieldType{
\t\tReader: reader,
\t}
}
";
    assert_eq!(out.render(), expected);

    let dropped: Vec<_> = out
        .decisions
        .iter()
        .filter_map(|d| match d {
            Decision::DuplicateDropped { key, .. } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        dropped,
        vec!["Hello", "Foo", "Struct", "ImportFieldType", "ImportFieldType.GetReader"]
    );
}

#[test]
fn test_self_merge_is_idempotent() {
    let once = merge(&[(CONFLICT_0, "A")]);
    let twice = merge(&[(CONFLICT_0, "A"), (CONFLICT_0, "B")]);
    assert_eq!(once.render(), twice.render());
    assert_eq!(twice.renames().count(), 0);
}

#[test]
fn test_self_merge_with_multi_type_case() {
    let src = "package a

func Kind(v any) string {
\tswitch v.(type) {
\tcase int, string:
\t\treturn \"scalar\"
\t}
\treturn \"other\"
}
";
    let once = merge(&[(src, "A")]);
    let twice = merge(&[(src, "A"), (src, "B")]);
    assert_eq!(once.render(), twice.render());
    assert!(twice.render().contains("\tcase int, string:\n"));
    assert_eq!(twice.renames().count(), 0);
}

#[test]
fn test_rename_leaves_no_dangling_reference() {
    let a = "package a\n\ntype Node struct{ Value int }\n";
    let b = "package b

type Node struct{ Value string }

func NewNode(v string) *Node {
\tvar n Node
\tn.Value = v
\treturn &n
}

func (n *Node) Get() string {
\treturn n.Value
}
";
    let out = merge(&[(a, "A"), (b, "B")]);
    let text = out.render();
    assert!(text.contains("type Node struct {\n\tValue int\n}"));
    assert!(text.contains("type NodeB struct {\n\tValue string\n}"));
    assert!(text.contains("func NewNode(v string) *NodeB {"));
    assert!(text.contains("\tvar n NodeB\n"));
    assert!(text.contains("func (n *NodeB) Get() string {"));
    // member access keeps its field name
    assert!(text.contains("n.Value = v"));
}

#[test]
fn test_rename_skips_parameter_of_same_name() {
    let a = "package a\n\nvar Name = \"a\"\n";
    let b = "package b

var Name = \"b\"

func F(Name string) string {
\treturn Name
}

func G() string {
\treturn Name
}
";
    let out = merge(&[(a, "A"), (b, "B")]);
    let text = out.render();
    assert!(text.contains("var NameB = \"b\"\n"));
    assert!(text.contains("func F(Name string) string {\n\treturn Name\n}"));
    assert!(text.contains("func G() string {\n\treturn NameB\n}"));
}

#[test]
fn test_struct_widening_is_one_directional() {
    let narrow = "package a\n\ntype Person struct{ Name string }\n";
    let wide = "package b\n\ntype Person struct {\n\tName string\n\tAge  int\n}\n";

    let out = merge(&[(narrow, "A"), (wide, "B")]);
    assert_eq!(
        out.render(),
        "package out\n\ntype Person struct {\n\tName string\n\tAge int\n}\n"
    );
    assert_eq!(
        out.decisions,
        vec![Decision::FieldsMerged {
            unit: 1,
            tag: "B".into(),
            key: "Person".into(),
            fields: vec!["Age".into()],
        }]
    );

    let out = merge(&[(wide, "A"), (narrow, "B")]);
    let text = out.render();
    assert!(text.contains("type Person struct {\n\tName string\n\tAge int\n}"));
    assert!(text.contains("type PersonB struct {\n\tName string\n}"));
}

#[test]
fn test_widened_field_follows_later_rename() {
    let a = "package a\n\ntype S struct{ A int }\n\ntype Inner struct{ X int }\n";
    let b = "package b\n\ntype S struct {\n\tA int\n\tI Inner\n}\n\ntype Inner struct{ X string }\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    assert_eq!(
        out.render(),
        "package out

type S struct {
\tA int
\tI InnerB
}

type Inner struct {
\tX int
}

type InnerB struct {
\tX string
}
"
    );
    assert!(matches!(
        out.decisions.as_slice(),
        [Decision::Renamed { to, .. }, Decision::FieldsMerged { key, fields, .. }]
            if to == "InnerB" && key == "S" && fields == &["I"]
    ));
}

#[test]
fn test_interface_is_never_widened() {
    let a = "package a\n\ntype Greeter interface{ Hello() }\n";
    let b = "package b\n\ntype Greeter interface {\n\tHello()\n\tBye()\n}\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    assert!(out.render().contains("type GreeterB interface {"));
}

#[test]
fn test_import_alias_collision_renames_alias_only() {
    let a = "package a\n\nimport \"crypto/rand\"\n\nfunc Key() []byte {\n\tb := make([]byte, 8)\n\trand.Read(b)\n\treturn b\n}\n";
    let b = "package b\n\nimport \"math/rand\"\n\nfunc Roll() int {\n\treturn rand.Intn(6)\n}\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    let text = out.render();
    assert!(text.starts_with(
        "package out\n\nimport (\n\t\"crypto/rand\"\n\trandB \"math/rand\"\n)\n"
    ));
    assert!(text.contains("\treturn randB.Intn(6)\n"));
    assert!(text.contains("\trand.Read(b)\n"));
    assert!(out.decisions.contains(&Decision::ImportRenamed {
        unit: 1,
        tag: "B".into(),
        from: "rand".into(),
        to: "randB".into(),
        path: "math/rand".into(),
    }));
}

#[test]
fn test_value_group_sibling_keeps_initializer() {
    let a = "package a\n\nvar Foo = \"Bar\"\n";
    let b = "package b\n\nvar (\n\tFoo  = \"Bar\"\n\tFile = \"0.go\"\n)\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    assert_eq!(
        out.render(),
        "package out\n\nvar Foo = \"Bar\"\n\nvar (\n\tFile = \"0.go\"\n)\n"
    );
}

#[test]
fn test_duplicate_iota_constant_keeps_group_positions() {
    let a = "package a\n\nconst (\n\tA = iota\n\tB\n)\n";
    let b = "package b\n\nconst (\n\tA = iota\n\tC\n)\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    assert_eq!(
        out.render(),
        "package out\n\nconst (\n\tA = iota\n\tB\n)\n\nconst (\n\t_ = iota\n\tC\n)\n"
    );
    assert_eq!(out.renames().count(), 0);
}

#[test]
fn test_implicit_constants_compare_by_repeated_initializer() {
    let a = "package a\n\nconst (\n\tA = iota\n\tFlag\n)\n";
    let shifted = "package b\n\nconst (\n\tB = 1 << iota\n\tFlag\n)\n";
    let moved = "package c\n\nconst (\n\tC = iota\n\tD\n\tFlag\n)\n";
    let same = "package d\n\nconst (\n\tE = iota\n\tFlag\n)\n";

    let out = merge(&[(a, "A"), (shifted, "B"), (moved, "C"), (same, "D")]);
    let renamed: Vec<_> = out
        .renames()
        .map(|d| match d {
            Decision::Renamed { to, .. } => to.as_str(),
            other => panic!("unexpected decision {other:?}"),
        })
        .collect();
    assert_eq!(renamed, vec!["FlagB", "FlagC"]);
    assert!(out.decisions.contains(&Decision::DuplicateDropped {
        unit: 3,
        tag: "D".into(),
        key: "Flag".into(),
    }));
}

#[test]
fn test_method_conflict_renames_method_name() {
    let a = "package a\n\ntype T struct{}\n\nfunc (t T) Name() string {\n\treturn \"a\"\n}\n";
    let b = "package b\n\ntype T struct{}\n\nfunc (t T) Name() string {\n\treturn \"b\"\n}\n";
    let out = merge(&[(a, "A"), (b, "B")]);
    assert!(out.render().contains("func (t T) NameB() string {"));
    assert!(matches!(
        out.decisions.last(),
        Some(Decision::MethodRenamed { receiver, from, to, .. })
            if receiver == "T" && from == "Name" && to == "NameB"
    ));
}

#[test]
fn test_init_functions_are_all_kept() {
    let a = "package a\n\nfunc init() {\n\tsetup()\n}\n";
    let out = merge(&[(a, "A"), (a, "B")]);
    let inits = out
        .file
        .decls
        .iter()
        .filter(|d| matches!(d, Decl::Func(f) if f.name.name == "init"))
        .count();
    assert_eq!(inits, 2);
}

#[test]
fn test_unsupported_node_aborts_merge() {
    let a = "package a\n\nfunc Wait(c chan int) {\n\tselect {\n\tcase <-c:\n\t}\n}\n";
    let b = "package b\n\nfunc Wait(c chan int) {\n\tselect {\n\tcase <-c:\n\t}\n}\n";
    let units = vec![
        (parse_file(a).unwrap(), "A".to_string()),
        (parse_file(b).unwrap(), "B".to_string()),
    ];
    let err = merge_all("out", units).unwrap_err();
    assert!(matches!(err, MergeError::Unit { index: 1, .. }));
    assert!(matches!(err.root_cause(), MergeError::UnsupportedNode { .. }));
    assert!(err.to_string().contains("Wait"));
}

#[test]
fn test_decisions_report_as_json() {
    let out = merge(&[(DUPLICATES_0, "0"), (DUPLICATES_1, "1")]);
    let report = serde_json::to_value(&out.decisions).unwrap();
    assert_eq!(report[0]["action"], "import_added");
    assert_eq!(report[0]["path"], "io");
    assert_eq!(report.as_array().map(Vec::len), Some(6));
}
