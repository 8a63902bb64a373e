//! Compiler for declarative console command signatures.
//!
//! A signature is compact text describing a console command: a header line
//! naming the command followed by `{...}` blocks for its arguments and
//! options. This crate turns that text into a [`ParsedCommand`] a dispatcher
//! can bind to a concrete argument parser.
//!
//! # Main entry points
//!
//! - [`compile`]: compile a [`CommandHandler`]'s own signature.
//! - [`compile_signature`]: compile arbitrary signature text for a handler.
//! - [`plan::build_plan`]: derive the routes, argument tokens and option
//!   tokens a dispatcher registers.
//! - [`catalog::build_catalog`]: compile a set of definition files in
//!   parallel.
//!
//! # Example
//!
//! ```
//! use command_signature_compiler::compile;
//! use command_signature_core::{DefaultValue, SignatureDefinition};
//!
//! let hello = SignatureDefinition::new(
//!     "hello
//!         {name=help : The command name}
//!         {--o|out=txt : The output format}",
//! )
//! .with_description("Display HELLO");
//!
//! let cmd = compile(&hello);
//! assert_eq!(cmd.base_command, "hello");
//! assert_eq!(cmd.description.as_deref(), Some("Display HELLO"));
//!
//! let out = cmd.find_option("-o").unwrap();
//! assert_eq!(out.name, "out");
//! assert_eq!(out.default_value, Some(DefaultValue::Str("txt".into())));
//! ```
//!
//! Compilation never fails. Only the file-facing parts ([`catalog`],
//! [`config`]) return [`CatalogError`].
//!
//! [`ParsedCommand`]: command_signature_core::ParsedCommand
//! [`CommandHandler`]: command_signature_core::CommandHandler

pub mod blocks;
pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod output;
pub mod plan;
mod signature;

pub use catalog::{CommandCatalog, build_catalog};
pub use config::CatalogConfig;
pub use error::CatalogError;
pub use signature::{compile, compile_signature};
