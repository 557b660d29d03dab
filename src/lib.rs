//! Method Order: method-ordering linter and auto-fixer for Go source files
//!
//! Detects methods that are declared out of order (constructors first, then
//! exported methods, then unexported methods) and optionally rewrites the
//! file so they appear in the expected order.
//!
//! # Architecture
//!
//! The fix compiles down to a single primitive: [`SlotReplacement`], a
//! verified byte-span replacement applied to an immutable copy of the
//! original buffer. Intelligence lives in span acquisition (tree-sitter
//! parsing, doc-comment association), not in the application logic. The
//! rewritten file is never produced by a pretty-printer: every byte that
//! does not belong to a reordered method is carried over untouched.
//!
//! # Safety
//!
//! - All slot replacements verify expected before-text before applying
//! - Replacements are applied in descending offset order, so earlier
//!   offsets never go stale
//! - A file is either fully rewritten or returned unchanged, never partially
//! - Atomic file writes (tempfile + fsync + rename)
//! - UTF-8 validation of the spliced result
//! - Fixing is idempotent: a fixed file detects zero violations
//!
//! # Example
//!
//! ```no_run
//! use method_order::{Config, Fixer};
//! use std::path::Path;
//!
//! let mut config = Config::default();
//! config.fix = true;
//!
//! let fixer = Fixer::new(config);
//! match fixer.process_file(Path::new("server.go")) {
//!     Ok(outcome) => println!("{} violations", outcome.violation_count()),
//!     Err(e) => eprintln!("failed: {}", e),
//! }
//! ```

pub mod block;
pub mod config;
pub mod detect;
pub mod fixer;
pub mod go;
pub mod model;
pub mod reorder;
pub mod splice;

// Re-exports
pub use block::{BlockError, MethodBlock};
pub use config::Config;
pub use detect::{Detector, Violation, ViolationKind};
pub use fixer::{FileOutcome, FixError, Fixer};
pub use go::{
    collect_file_decls, FileDecls, FuncDecl, GoParser, ParseError, ParsedSource, ReceiverShape,
    TypeDecl,
};
pub use model::{collect_type_groups, MemberFunction, TypeGroup};
pub use reorder::{reorder_file, ReorderError};
pub use splice::{splice, SlotReplacement, SpanVerification, SpliceError};
