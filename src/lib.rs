//! Structural and documentation extraction for Fortran sources.
//!
//! ```no_run
//! use fortdoc::{extract_source, DocMarkers};
//!
//! let source = std::fs::read_to_string("math_utils.f90").unwrap();
//! let result = extract_source(&source, &DocMarkers::default());
//! for module in &result.model.modules {
//!     println!("{}: {:?}", module.name, module.doc);
//! }
//! ```

pub mod config;
pub mod docstring;
pub mod error;
pub mod extract;
pub mod model;
pub mod render;
pub mod syntax;
pub mod toc;

pub use config::DocMarkers;
pub use error::{ConfigError, Warning};
pub use extract::{extract, extract_source, Extraction, Strategy};
pub use model::DocumentationModel;
pub use syntax::{Node, NodeKind, SyntaxTree};
