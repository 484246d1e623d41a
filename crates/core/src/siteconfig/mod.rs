//! Per-source selector configuration.
//!
//! Selector configs feed the primary extraction tier and the first two
//! steps of the date ladder. They come from line-oriented directive files
//! (or JSON) discovered per domain by [`ConfigLoader`].

pub mod directives;
pub mod loader;
pub mod parser;

pub use directives::{Directive, SelectorConfig, parse_directive};
pub use loader::{ConfigLoader, ConfigLoaderBuilder};
pub use parser::ConfigParser;
