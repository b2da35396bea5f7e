//! `twigpack_core` compiles parsed Twig templates into bundler modules. It
//! discovers every file a template depends on (including paths computed
//! from template data), rewrites those paths to content identifiers, and
//! emits a module that declares the dependencies explicitly before
//! instantiating the renderer.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Serialized AST (JSON token list) + sibling `.yml` data file
//!   → Dependency walker (visits logic tokens in document order)
//!     → Namespace resolver (`theme::x.twig`, `@theme/x.twig` → real prefix)
//!     → Path evaluator (folds `"cards/" ~ card.type` against the data)
//!     → Content hasher (absolute path → identifier, written back into the AST)
//!   → Module emitter (`require` per dependency, renderer instantiation, export)
//! ```
//!
//! ## Modules
//!
//! - [`ast`]: Typed tokens with lossless round-tripping of unknown fields.
//! - [`evaluate`]: Pointer and concatenation-fold evaluation over the data
//!   document.
//! - [`data`]: Locating and loading the auxiliary data document.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use twigpack_core::LoaderOptions;
//! use twigpack_core::TemplateCompiler;
//!
//! let mut compiler = TemplateCompiler::new(LoaderOptions::default());
//! compiler.register("page", "/project/templates/page.twig");
//!
//! let tokens = std::fs::read_to_string("page.ast.json").unwrap();
//! let module = compiler.compile("page", &tokens, "twig/twig.js").unwrap();
//! println!("{module}");
//! ```

pub use ast::*;
pub use compiler::*;
pub use config::*;
pub use content_id::*;
pub use discover::*;
pub use emit::*;
pub use error::*;
pub use evaluate::DataCursor;
pub use namespace::*;
pub use walker::*;

pub mod ast;
mod compiler;
mod config;
mod content_id;
pub mod data;
mod discover;
mod emit;
#[allow(unused_assignments)]
mod error;
pub mod evaluate;
mod namespace;
mod walker;

#[cfg(test)]
mod __fixtures;
