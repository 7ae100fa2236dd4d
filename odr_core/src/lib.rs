//! `odr_core` is the core library for the odr report engine. It turns an
//! OpenDocument archive into a reusable template: the XML body's author
//! annotations are rewritten into template directives, compiled once, and
//! rendered against any number of data contexts, while every other archive
//! entry passes through byte-for-byte.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Template archive (.odt)
//!   → Archive reader (enumerates entries in stored order)
//!   → Script rewriter (expands input fields + @tag script regions in the XML body)
//!   → Engine adapter (compiles the rewritten body, minijinja by default)
//!   → ReportTemplate (compiled body + opaque entries)
//!   → render(context) → output archive
//! ```
//!
//! ## Modules
//!
//! - [`archive`] — Zip container adapter: ordered entry reader, deterministic
//!   writer, and [`SaveOptions`].
//! - [`config`] — [`DocumentProfile`]: the entry name and XML vocabulary a
//!   document format uses for template annotations.
//!
//! ## Key Types
//!
//! - [`ReportTemplate`] — A loaded, immutable template; renderable repeatedly
//!   and concurrently.
//! - [`TemplateEngine`] — The compile/render seam, injected at load time.
//! - [`MiniJinjaEngine`] — The default engine with XML-escaped output and
//!   lenient undefined handling.
//! - [`OdrError`] — The error taxonomy, with miette diagnostic codes.
//!
//! ## Annotations
//!
//! Inside the document body, an input field whose description is `nodscript`
//! becomes literal template source, and a script region in the `nodscript`
//! language positions block directives around whole structures:
//!
//! ```text
//! @table:table-row
//! {% for item in items %}
//! @/table:table-row
//! {% endfor %}
//! ```
//!
//! wraps every ancestor `table:table-row` of the script region in a loop, so
//! the row repeats once per item.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use odr_core::DocumentProfile;
//! use odr_core::MiniJinjaEngine;
//! use odr_core::ReportTemplate;
//! use odr_core::SaveOptions;
//! use serde_json::json;
//!
//! # fn main() -> odr_core::OdrResult<()> {
//! let bytes = std::fs::read("invoice.odt")?;
//! let template =
//! 	ReportTemplate::from_bytes(bytes, MiniJinjaEngine::new(), DocumentProfile::default())?;
//!
//! let context = json!({ "customer": "Ada", "items": ["keyboard", "trackball"] });
//! let archive = template.render(&context, &SaveOptions::default())?;
//! std::fs::write("invoice-ada.odt", archive)?;
//! # Ok(())
//! # }
//! ```

pub use archive::*;
pub use config::*;
pub use engine::*;
pub use error::*;
pub use rewrite::*;
pub use template::*;

pub mod archive;
pub mod config;
mod engine;
mod error;
mod rewrite;
pub(crate) mod scanner;
mod template;
pub(crate) mod xml_tree;

#[cfg(test)]
mod __fixtures;
