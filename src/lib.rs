// DOCS

#[macro_use]
mod macros;
mod alias_map;
mod changelog;
pub mod config;
pub mod error;
pub mod fmt;
pub mod git;
mod link_style;
pub mod query;
mod sectionmap;
pub mod validate;

pub use alias_map::SectionAliasMap;
pub use changelog::{build_changelog, ChangeLog};
pub use link_style::LinkStyle;
pub use sectionmap::{ComponentMap, SectionMap, DEFAULT_ORDER};

/// The default per-repository config file
pub const DEFAULT_CONFIG_FILE: &str = ".clog.toml";
