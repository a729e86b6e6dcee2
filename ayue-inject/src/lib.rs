//! # ayue-inject
//!
//! Splices compiled bundler output into Liquid templates and pulls the
//! `{% schema %}` block out of each template into a standalone JSON document.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use ayue_inject::{Injector, Manifest, SchemaExtractor};
//!
//! fn build_one(template: &Path) -> Result<(), ayue_inject::InjectError> {
//!     let manifest = Manifest::load(Path::new("assets/.vite/manifest.json"))?;
//!     let injector = Injector::new(&manifest, Path::new("assets"), "liquid")?;
//!     let schema = SchemaExtractor::new("liquid")?;
//!     schema.extract(template, Path::new("src/theme"), Path::new("ayue_doc"))?;
//!     let out = injector.inject(template, Path::new("ayue_build"))?;
//!     println!("{}", out.display());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod injector;
pub mod manifest;
pub mod schema;

pub use error::InjectError;
pub use injector::{script_block, style_block, Injector, IMPORT_MARKER_PATTERN};
pub use manifest::{AssetKind, Manifest, ManifestEntry};
pub use schema::SchemaExtractor;
