//! ayue core library: theme configuration, resolved paths, errors.
//!
//! - [`types`]: newtypes, [`ThemeConfig`] and its resolved [`ThemePaths`]
//! - [`error`]: [`ConfigError`]
//! - [`config`]: load / save / init of `ayue.yaml`

pub mod config;
pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::{ExcludeRule, TemplateName, ThemeConfig, ThemePaths};
