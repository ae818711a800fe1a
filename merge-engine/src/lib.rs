//! # srcmerge-engine
//!
//! Merges independently written Go source files ("units") into one file,
//! resolving every top-level name collision along the way.
//!
//! ## Approach
//!
//! Units are processed strictly in caller order against a registry of
//! accepted declarations. For each colliding declaration the engine runs a
//! structural equivalence check over the two syntax trees:
//!
//! 1. **Equal**: the incoming copy is a duplicate and is dropped.
//! 2. **Additional fields**: the incoming struct only adds members; they are
//!    appended to the registered struct and the incoming copy is dropped.
//! 3. **Mismatch**: the incoming declaration is renamed with the unit's
//!    disambiguation tag, together with every reference to it inside the unit.
//!
//! Import aliases that name different packages in different units are
//! renamed the same way, and all imports end up in one import group.
//!
//! Parsing uses Tree-sitter's Go grammar; the concrete tree is lowered into
//! the typed [`ast`] before merging and rendered back with [`printer`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use srcmerge_engine::{merge_all, parse_file};
//!
//! let a = parse_file("package a\n\ntype T struct{ Name string }\n")?;
//! let b = parse_file("package b\n\ntype T struct{ Name string; Age int }\n")?;
//!
//! let output = merge_all("out", vec![(a, "A".into()), (b, "B".into())])?;
//! for decision in &output.decisions {
//!     println!("{decision}");
//! }
//! println!("{}", output.render());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ast;
pub mod decls;
pub mod equal;
pub mod error;
pub mod fieldset;
pub mod imports;
pub mod merger;
pub mod parser;
pub mod printer;
pub mod remove;
pub mod rename;
pub mod token;
pub mod types;
pub mod visit;

// Re-export primary public API
pub use equal::{Equivalence, Node, equivalent};
pub use error::MergeError;
pub use merger::{Merger, merge_all};
pub use parser::{ParseError, parse_file, parse_path};
pub use printer::render;
pub use types::{Decision, MergeOutput};
