//! Top-level declaration extraction.
//!
//! Walks the parsed tree once and produces flat declaration records with
//! stable byte offsets. Each function declaration carries its own leading
//! doc-comment back-reference, computed here from adjacent comment siblings.
//! No whole-file comment-to-node association map is ever built: nearest-node
//! heuristics can attribute a comment inside one function's body to the
//! following declaration, which silently corrupts splice-based rewrites.

use crate::go::parser::ParsedSource;
use tree_sitter::Node;

/// All top-level declarations of one parsed file.
#[derive(Debug, Default)]
pub struct FileDecls {
    /// Package name, if the package clause is present.
    pub package: Option<String>,
    pub types: Vec<TypeDecl>,
    pub funcs: Vec<FuncDecl>,
}

/// A named type declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub byte_start: usize,
    pub byte_end: usize,
    /// Whether the underlying type is a struct type. Only struct types
    /// group methods.
    pub is_struct: bool,
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver shape for methods, `None` for free functions.
    pub receiver: Option<ReceiverShape>,
    /// Start of the `func` keyword.
    pub byte_start: usize,
    /// One byte past the closing brace.
    pub byte_end: usize,
    /// Start of the attached leading doc-comment block, or `byte_start`
    /// when the declaration has no doc comment.
    pub doc_start: usize,
    /// 1-based line of the `func` keyword.
    pub line: usize,
    /// 1-based column of the `func` keyword.
    pub column: usize,
}

/// The shape of a method receiver type.
///
/// Receivers are a small closed set: a plain named type, a pointer to a
/// shape, or a generic instantiation of a shape. The underlying declared
/// type name is recovered by unwrapping recursively rather than by
/// enumerating pointer/generic combinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceiverShape {
    Named(String),
    Pointer(Box<ReceiverShape>),
    Generic(Box<ReceiverShape>),
}

impl ReceiverShape {
    /// The underlying declared type name.
    pub fn type_name(&self) -> &str {
        match self {
            ReceiverShape::Named(name) => name,
            ReceiverShape::Pointer(inner) | ReceiverShape::Generic(inner) => inner.type_name(),
        }
    }
}

/// Collect all top-level declarations from a parsed file.
pub fn collect_file_decls(parsed: &ParsedSource<'_>) -> FileDecls {
    let mut decls = FileDecls::default();
    let root = parsed.root_node();

    let mut cursor = root.walk();
    for child in root.named_children(&mut cursor) {
        match child.kind() {
            "package_clause" => {
                if let Some(ident) = child.named_child(0) {
                    decls.package = Some(parsed.node_text(ident).to_string());
                }
            }
            "type_declaration" => collect_type_specs(parsed, child, &mut decls.types),
            "function_declaration" | "method_declaration" => {
                if let Some(func) = collect_func(parsed, child) {
                    decls.funcs.push(func);
                }
            }
            _ => {}
        }
    }

    decls
}

/// One `type_declaration` may carry several specs: `type ( A struct{}; B int )`.
fn collect_type_specs(parsed: &ParsedSource<'_>, node: Node<'_>, types: &mut Vec<TypeDecl>) {
    let mut cursor = node.walk();
    for spec in node.named_children(&mut cursor) {
        if spec.kind() != "type_spec" {
            continue;
        }
        let Some(name) = spec.child_by_field_name("name") else {
            continue;
        };
        let is_struct = spec
            .child_by_field_name("type")
            .is_some_and(|t| t.kind() == "struct_type");
        types.push(TypeDecl {
            name: parsed.node_text(name).to_string(),
            byte_start: spec.start_byte(),
            byte_end: spec.end_byte(),
            is_struct,
        });
    }
}

fn collect_func(parsed: &ParsedSource<'_>, node: Node<'_>) -> Option<FuncDecl> {
    let name = node.child_by_field_name("name")?;
    let receiver = node
        .child_by_field_name("receiver")
        .and_then(|r| receiver_shape(parsed, r));
    let point = node.start_position();

    Some(FuncDecl {
        name: parsed.node_text(name).to_string(),
        receiver,
        byte_start: node.start_byte(),
        byte_end: node.end_byte(),
        doc_start: leading_doc_start(parsed, node),
        line: point.row + 1,
        column: point.column + 1,
    })
}

/// Extract the receiver shape from a method's receiver parameter list.
fn receiver_shape(parsed: &ParsedSource<'_>, receiver: Node<'_>) -> Option<ReceiverShape> {
    let mut cursor = receiver.walk();
    let param = receiver
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    let ty = param.child_by_field_name("type")?;
    shape_of_type(parsed, ty)
}

fn shape_of_type(parsed: &ParsedSource<'_>, node: Node<'_>) -> Option<ReceiverShape> {
    match node.kind() {
        "type_identifier" => Some(ReceiverShape::Named(parsed.node_text(node).to_string())),
        "pointer_type" => {
            let inner = shape_of_type(parsed, node.named_child(0)?)?;
            Some(ReceiverShape::Pointer(Box::new(inner)))
        }
        "generic_type" => {
            let inner = shape_of_type(parsed, node.child_by_field_name("type")?)?;
            Some(ReceiverShape::Generic(Box::new(inner)))
        }
        // Go permits parenthesized receiver types: `func ((*T)) f()`.
        "parenthesized_type" => shape_of_type(parsed, node.named_child(0)?),
        _ => None,
    }
}

/// Start byte of the contiguous run of doc comments directly above `node`.
///
/// A comment extends the run only when it sits on its own line (not trailing
/// the previous declaration) and is separated from the text below it by
/// exactly one newline. A blank line terminates the run, matching how Go
/// associates doc comments with declarations.
fn leading_doc_start(parsed: &ParsedSource<'_>, node: Node<'_>) -> usize {
    let mut start = node.start_byte();
    let mut prev = node.prev_sibling();

    while let Some(comment) = prev {
        if comment.kind() != "comment" {
            break;
        }
        let gap = &parsed.source[comment.end_byte()..start];
        if !gap.chars().all(char::is_whitespace) || gap.matches('\n').count() != 1 {
            break;
        }
        // A comment on the same line as the previous sibling's end is a
        // trailing comment of that sibling, not documentation for `node`.
        if let Some(before) = comment.prev_sibling() {
            if before.end_position().row == comment.start_position().row {
                break;
            }
        }
        start = comment.start_byte();
        prev = comment.prev_sibling();
    }

    start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::parser::GoParser;

    fn parse_decls(source: &str) -> FileDecls {
        let mut parser = GoParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        assert!(!parsed.has_errors(), "fixture must parse cleanly");
        collect_file_decls(&parsed)
    }

    #[test]
    fn package_and_struct_type() {
        let decls = parse_decls("package foo\n\ntype Svc struct {\n\tn int\n}\n");
        assert_eq!(decls.package.as_deref(), Some("foo"));
        assert_eq!(decls.types.len(), 1);
        assert_eq!(decls.types[0].name, "Svc");
        assert!(decls.types[0].is_struct);
    }

    #[test]
    fn non_struct_type_is_flagged() {
        let decls = parse_decls("package foo\n\ntype ID int\n");
        assert_eq!(decls.types.len(), 1);
        assert!(!decls.types[0].is_struct);
    }

    #[test]
    fn grouped_type_declaration() {
        let decls = parse_decls("package foo\n\ntype (\n\tA struct{}\n\tB int\n)\n");
        let names: Vec<_> = decls.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);
        assert!(decls.types[0].is_struct);
        assert!(!decls.types[1].is_struct);
    }

    #[test]
    fn free_function_has_no_receiver() {
        let decls = parse_decls("package foo\n\nfunc run() {}\n");
        assert_eq!(decls.funcs.len(), 1);
        assert_eq!(decls.funcs[0].name, "run");
        assert!(decls.funcs[0].receiver.is_none());
    }

    #[test]
    fn value_receiver() {
        let decls = parse_decls("package foo\n\nfunc (s Svc) Run() {}\n");
        let shape = decls.funcs[0].receiver.as_ref().unwrap();
        assert_eq!(*shape, ReceiverShape::Named("Svc".to_string()));
        assert_eq!(shape.type_name(), "Svc");
    }

    #[test]
    fn pointer_receiver() {
        let decls = parse_decls("package foo\n\nfunc (s *Svc) Run() {}\n");
        let shape = decls.funcs[0].receiver.as_ref().unwrap();
        assert_eq!(shape.type_name(), "Svc");
        assert!(matches!(shape, ReceiverShape::Pointer(_)));
    }

    #[test]
    fn generic_receiver() {
        let decls = parse_decls("package foo\n\nfunc (c Container[T]) Len() int { return 0 }\n");
        let shape = decls.funcs[0].receiver.as_ref().unwrap();
        assert_eq!(shape.type_name(), "Container");
        assert!(matches!(shape, ReceiverShape::Generic(_)));
    }

    #[test]
    fn pointer_to_generic_receiver_with_two_parameters() {
        let decls = parse_decls("package foo\n\nfunc (m *Pair[K, V]) Key() K { return m.k }\n");
        let shape = decls.funcs[0].receiver.as_ref().unwrap();
        assert_eq!(shape.type_name(), "Pair");
        match shape {
            ReceiverShape::Pointer(inner) => assert!(matches!(**inner, ReceiverShape::Generic(_))),
            other => panic!("expected pointer shape, got {:?}", other),
        }
    }

    #[test]
    fn doc_comment_extends_start() {
        let source = "package foo\n\n// Run starts the process.\nfunc (s *Svc) Run() {}\n";
        let decls = parse_decls(source);
        let f = &decls.funcs[0];
        assert!(f.doc_start < f.byte_start);
        assert!(source[f.doc_start..f.byte_end].starts_with("// Run starts the process."));
    }

    #[test]
    fn multi_line_doc_group_extends_start() {
        let source = "package foo\n\n// alpha.\n// beta.\n// gamma.\nfunc (s *Svc) run() {}\n";
        let decls = parse_decls(source);
        let f = &decls.funcs[0];
        assert!(source[f.doc_start..f.byte_end].starts_with("// alpha."));
    }

    #[test]
    fn no_doc_comment_keeps_start() {
        let decls = parse_decls("package foo\n\nfunc (s *Svc) Run() {}\n");
        let f = &decls.funcs[0];
        assert_eq!(f.doc_start, f.byte_start);
    }

    #[test]
    fn blank_line_breaks_doc_association() {
        let source = "package foo\n\n// floating note\n\nfunc (s *Svc) Run() {}\n";
        let decls = parse_decls(source);
        let f = &decls.funcs[0];
        assert_eq!(f.doc_start, f.byte_start);
    }

    #[test]
    fn trailing_comment_of_previous_decl_is_not_doc() {
        let source = "package foo\n\nfunc (s *Svc) a() {} // trailing note\nfunc (s *Svc) B() {}\n";
        let decls = parse_decls(source);
        let b = decls.funcs.iter().find(|f| f.name == "B").unwrap();
        assert_eq!(b.doc_start, b.byte_start);
    }

    #[test]
    fn comment_inside_previous_body_is_not_doc() {
        let source = "package foo\n\nfunc (s *Svc) a() {\n\t_ = s\n\t// note kept inside a\n}\n\nfunc (s *Svc) B() {}\n";
        let decls = parse_decls(source);
        let b = decls.funcs.iter().find(|f| f.name == "B").unwrap();
        assert_eq!(b.doc_start, b.byte_start);
        let a = decls.funcs.iter().find(|f| f.name == "a").unwrap();
        assert!(source[a.byte_start..a.byte_end].contains("// note kept inside a"));
    }

    #[test]
    fn line_and_column_are_one_based() {
        let decls = parse_decls("package foo\n\nfunc (s *Svc) Run() {}\n");
        let f = &decls.funcs[0];
        assert_eq!(f.line, 3);
        assert_eq!(f.column, 1);
    }

    #[test]
    fn block_comment_directly_above_is_doc() {
        let source = "package foo\n\n/* Run does work. */\nfunc (s *Svc) Run() {}\n";
        let decls = parse_decls(source);
        let f = &decls.funcs[0];
        assert!(source[f.doc_start..].starts_with("/* Run does work. */"));
    }
}
