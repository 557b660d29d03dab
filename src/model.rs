//! In-memory model of a file's types and their member functions.

use crate::go::{FileDecls, FuncDecl};
use std::collections::BTreeMap;

/// One method belonging to a declared type.
///
/// Immutable once constructed. Offsets index the original byte buffer:
/// `doc_start_offset <= start_offset < end_offset <= len(source)`.
#[derive(Debug, Clone)]
pub struct MemberFunction {
    /// Method name.
    pub name: String,
    /// Receiver type name.
    pub receiver_type: String,
    /// Whether the method is exported (name starts with an uppercase letter).
    pub is_exported: bool,
    /// Whether the name matches the constructor prefixes `New`, `Must`, `Or`.
    pub is_constructor: bool,
    /// Start of the `func` keyword, excluding any doc comment.
    pub start_offset: usize,
    /// One byte past the closing brace.
    pub end_offset: usize,
    /// Start of the attached leading doc comment, or `start_offset` if none.
    pub doc_start_offset: usize,
    /// 1-based source line, for reporting.
    pub line: usize,
    /// 1-based source column, for reporting.
    pub column: usize,
}

impl MemberFunction {
    /// Build a member function from a parsed declaration. Returns `None`
    /// for free functions.
    pub fn from_decl(decl: &FuncDecl) -> Option<Self> {
        let receiver = decl.receiver.as_ref()?;
        Some(Self {
            name: decl.name.clone(),
            receiver_type: receiver.type_name().to_string(),
            is_exported: is_exported_name(&decl.name),
            is_constructor: is_constructor_name(&decl.name),
            start_offset: decl.byte_start,
            end_offset: decl.byte_end,
            doc_start_offset: decl.doc_start,
            line: decl.line,
            column: decl.column,
        })
    }
}

/// Whether a name is exported under the Go naming convention.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Whether a name matches the constructor naming convention.
///
/// Any name beginning with the literal prefixes `New`, `Must`, or `Or`
/// matches, regardless of what follows (`Newspaper` and `Order` count).
/// This quirk is observable behavior and is kept as-is.
pub fn is_constructor_name(name: &str) -> bool {
    name.starts_with("New") || name.starts_with("Must") || name.starts_with("Or")
}

/// All member functions of a single declared type.
///
/// `methods` is ordered ascending by `start_offset`; that ordering is the
/// single authoritative source order for every downstream consumer. The
/// partitions are index vectors into `methods` and form a multiset
/// partition: every method lands in exactly one, and a constructor name
/// match wins over the exported/unexported split.
#[derive(Debug)]
pub struct TypeGroup {
    pub type_name: String,
    pub methods: Vec<MemberFunction>,
    constructors: Vec<usize>,
    exported: Vec<usize>,
    unexported: Vec<usize>,
}

impl TypeGroup {
    fn new(type_name: String) -> Self {
        Self {
            type_name,
            methods: Vec::new(),
            constructors: Vec::new(),
            exported: Vec::new(),
            unexported: Vec::new(),
        }
    }

    /// Sort methods by source position and partition them. Called exactly
    /// once, after the last method is added.
    fn finish(&mut self) {
        self.methods.sort_by_key(|m| m.start_offset);
        for (i, m) in self.methods.iter().enumerate() {
            if m.is_constructor {
                self.constructors.push(i);
            } else if m.is_exported {
                self.exported.push(i);
            } else {
                self.unexported.push(i);
            }
        }
    }

    pub fn constructors(&self) -> impl Iterator<Item = &MemberFunction> {
        self.constructors.iter().map(|&i| &self.methods[i])
    }

    pub fn exported_methods(&self) -> impl Iterator<Item = &MemberFunction> {
        self.exported.iter().map(|&i| &self.methods[i])
    }

    pub fn unexported_methods(&self) -> impl Iterator<Item = &MemberFunction> {
        self.unexported.iter().map(|&i| &self.methods[i])
    }

    /// Methods in the policy-mandated order: constructors, then exported,
    /// then unexported, each keeping its relative source order.
    ///
    /// Recomputed from the partitions on every call; two calls on the same
    /// group always yield the same sequence.
    pub fn expected_order(&self) -> Vec<&MemberFunction> {
        self.constructors
            .iter()
            .chain(self.exported.iter())
            .chain(self.unexported.iter())
            .map(|&i| &self.methods[i])
            .collect()
    }

    /// Whether the current source order differs from the expected order.
    pub fn needs_reordering(&self) -> bool {
        if self.methods.len() <= 1 {
            return false;
        }

        let expected = self.expected_order();
        if expected.len() != self.methods.len() {
            return false;
        }

        self.methods
            .iter()
            .zip(expected)
            .any(|(current, expected)| current.name != expected.name)
    }
}

/// Group all receiver methods by their declared struct type.
///
/// Methods whose receiver names a type not declared as a struct in this
/// file produce no group membership. Groups come back in a deterministic
/// (name-sorted) order.
pub fn collect_type_groups(decls: &FileDecls) -> BTreeMap<String, TypeGroup> {
    let mut groups: BTreeMap<String, TypeGroup> = decls
        .types
        .iter()
        .filter(|t| t.is_struct)
        .map(|t| (t.name.clone(), TypeGroup::new(t.name.clone())))
        .collect();

    for decl in &decls.funcs {
        let Some(member) = MemberFunction::from_decl(decl) else {
            continue;
        };
        if let Some(group) = groups.get_mut(&member.receiver_type) {
            group.methods.push(member);
        }
    }

    for group in groups.values_mut() {
        group.finish();
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::go::{collect_file_decls, GoParser};

    fn groups_for(source: &str) -> BTreeMap<String, TypeGroup> {
        let mut parser = GoParser::new().unwrap();
        let parsed = parser.parse_with_source(source).unwrap();
        assert!(!parsed.has_errors(), "fixture must parse cleanly");
        collect_type_groups(&collect_file_decls(&parsed))
    }

    #[test]
    fn constructor_name_prefixes() {
        assert!(is_constructor_name("NewServer"));
        assert!(is_constructor_name("MustParse"));
        assert!(is_constructor_name("OrElse"));
        assert!(!is_constructor_name("Create"));
        assert!(!is_constructor_name("newServer"));
    }

    #[test]
    fn constructor_prefix_quirk_is_kept() {
        // Literal prefix match regardless of what follows.
        assert!(is_constructor_name("Newspaper"));
        assert!(is_constructor_name("Order"));
        assert!(is_constructor_name("Mustard"));
    }

    #[test]
    fn exported_name_convention() {
        assert!(is_exported_name("Run"));
        assert!(!is_exported_name("run"));
        assert!(!is_exported_name(""));
    }

    #[test]
    fn methods_group_by_receiver_type() {
        let groups = groups_for(
            "package foo\n\ntype A struct{}\n\ntype B struct{}\n\nfunc (a *A) Run() {}\n\nfunc (b B) stop() {}\n\nfunc free() {}\n",
        );
        assert_eq!(groups.len(), 2);
        assert_eq!(groups["A"].methods.len(), 1);
        assert_eq!(groups["B"].methods.len(), 1);
    }

    #[test]
    fn unknown_receiver_is_ignored() {
        let groups = groups_for("package foo\n\ntype A struct{}\n\nfunc (x *Missing) Run() {}\n");
        assert_eq!(groups["A"].methods.len(), 0);
    }

    #[test]
    fn interface_type_forms_no_group() {
        let groups =
            groups_for("package foo\n\ntype R interface {\n\tRead() int\n}\n\nfunc (r R) bad() {}\n");
        assert!(groups.is_empty());
    }

    #[test]
    fn methods_sorted_by_position_and_partitioned() {
        let groups = groups_for(
            "package foo\n\ntype S struct{}\n\nfunc (s *S) helper() {}\n\nfunc (s *S) Run() {}\n\nfunc (s *S) NewThing() *S { return nil }\n",
        );
        let g = &groups["S"];
        let names: Vec<_> = g.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["helper", "Run", "NewThing"]);

        assert_eq!(g.constructors().count(), 1);
        assert_eq!(g.exported_methods().count(), 1);
        assert_eq!(g.unexported_methods().count(), 1);
    }

    #[test]
    fn expected_order_is_constructors_exported_unexported() {
        let groups = groups_for(
            "package foo\n\ntype S struct{}\n\nfunc (s *S) helper() {}\n\nfunc (s *S) Run() {}\n\nfunc (s *S) NewThing() *S { return nil }\n",
        );
        let expected: Vec<_> = groups["S"]
            .expected_order()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(expected, ["NewThing", "Run", "helper"]);
    }

    #[test]
    fn expected_order_is_stable_across_calls() {
        let groups = groups_for(
            "package foo\n\ntype S struct{}\n\nfunc (s *S) b() {}\n\nfunc (s *S) A() {}\n",
        );
        let g = &groups["S"];
        let first: Vec<_> = g.expected_order().iter().map(|m| m.name.clone()).collect();
        let second: Vec<_> = g.expected_order().iter().map(|m| m.name.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn needs_reordering_detects_divergence() {
        let groups = groups_for(
            "package foo\n\ntype S struct{}\n\nfunc (s *S) helper() {}\n\nfunc (s *S) Run() {}\n",
        );
        assert!(groups["S"].needs_reordering());
    }

    #[test]
    fn ordered_group_needs_no_reordering() {
        let groups = groups_for(
            "package foo\n\ntype S struct{}\n\nfunc (s *S) Run() {}\n\nfunc (s *S) helper() {}\n",
        );
        assert!(!groups["S"].needs_reordering());
    }

    #[test]
    fn single_method_needs_no_reordering() {
        let groups = groups_for("package foo\n\ntype S struct{}\n\nfunc (s *S) helper() {}\n");
        assert!(!groups["S"].needs_reordering());
    }

    #[test]
    fn generic_receiver_attaches_to_declared_type() {
        let groups = groups_for(
            "package foo\n\ntype Box[T any] struct{}\n\nfunc (b *Box[T]) Get() T { var t T; return t }\n",
        );
        assert_eq!(groups["Box"].methods.len(), 1);
    }

    #[test]
    fn offsets_respect_invariant() {
        let source =
            "package foo\n\ntype S struct{}\n\n// Run runs.\nfunc (s *S) Run() {}\n";
        let groups = groups_for(source);
        let m = &groups["S"].methods[0];
        assert!(m.doc_start_offset <= m.start_offset);
        assert!(m.start_offset < m.end_offset);
        assert!(m.end_offset <= source.len());
        assert!(m.doc_start_offset < m.start_offset, "doc comment present");
    }
}
