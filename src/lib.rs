//! # gr8s-prepare
//!
//! Turns the static `index.html` of a single page app into a template for the
//! gr8s rendering server, and reports what it changed.
//!
//! ## Modules
//!
//! - `parsers` - HTML parsing and the template scanner
//! - `verify` - diff of the template against the original
//! - `core` - the preparation pipeline, errors and file handling
//! - `minify` - optional minification of the template
//! - `env` - environment variables

pub mod core;
pub mod env;
pub mod minify;
pub mod parsers;
pub mod verify;

pub use crate::core::*;
pub use crate::parsers::*;
