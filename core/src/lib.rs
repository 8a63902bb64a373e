//! Core types for compiled console command signatures.
//!
//! This crate defines the data model produced by
//! `command-signature-compiler`:
//!
//! - [`ParsedCommand`]: compiled specification of one signature (base
//!   command, options, namespace sub-commands).
//! - [`CommandOption`]: one positional argument or flag option.
//! - [`DefaultValue`]: typed default value of an argument or option.
//! - [`CommandHandler`]: the command object a signature belongs to.
//! - [`SignatureDefinition`]: a plain handler loaded from a file.
//!
//! # Example
//!
//! ```
//! use command_signature_core::*;
//!
//! let def = SignatureDefinition::new("hello {name}").with_description("Say hello");
//! let mut cmd = ParsedCommand::new("hello", &def);
//! cmd.options.push(CommandOption::new("name"));
//!
//! assert_eq!(cmd.description.as_deref(), Some("Say hello"));
//! assert!(cmd.find_option("name").is_some());
//! assert_eq!(cmd.arguments().count(), 1);
//! ```

mod types;

pub use types::*;
