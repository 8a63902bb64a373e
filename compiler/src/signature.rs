//! Signature compilation.
//!
//! A signature is a header line naming the command, followed by blocks
//! describing its arguments and options:
//!
//! ```text
//! make:
//!     {model : Create a model | {--force : Overwrite existing files}}
//!     {controller : Create a controller}
//!     {--path=app : Base path}
//! ```
//!
//! A header ending in `:` denotes a namespace command whose plain blocks
//! become sub-commands (`make:model`, `make:controller`) and whose flag blocks
//! become options of the namespace itself.

use command_signature_core::{CommandHandler, CommandOption, ParsedCommand};
use tracing::debug;

use crate::descriptor::{parse_descriptors, qualified_marker_index};

/// Compiles a handler's own signature.
///
/// Shorthand for `compile_signature(handler.signature(), handler)`.
pub fn compile(handler: &dyn CommandHandler) -> ParsedCommand<'_> {
    compile_signature(handler.signature(), handler)
}

/// Compiles signature text into a [`ParsedCommand`] bound to `handler`.
///
/// Never fails: malformed blocks degrade to simpler descriptors and an empty
/// signature yields a command with no name and no options. The handler is
/// only read for its description.
///
/// # Examples
///
/// ```
/// use command_signature_compiler::compile_signature;
/// use command_signature_core::SignatureDefinition;
///
/// let handler = SignatureDefinition::default().with_description("Manage groups");
/// let cmd = compile_signature(
///     "group:\n  {add : Add a group}\n  {--force : Force}",
///     &handler,
/// );
///
/// assert!(cmd.is_namespace_command);
/// assert_eq!(cmd.base_command, "group");
/// assert_eq!(cmd.description.as_deref(), Some("Manage groups"));
/// assert!(cmd.find_sub_command("add").is_some());
/// assert!(cmd.find_option("--force").is_some());
/// ```
pub fn compile_signature<'h>(signature: &str, handler: &'h dyn CommandHandler) -> ParsedCommand<'h> {
    let mut lines = signature
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty());

    let Some(header) = lines.next() else {
        debug!("Empty signature");
        return ParsedCommand::new("", handler);
    };

    let is_hidden = header.starts_with(['#', '^']) || qualified_marker_index(header).is_some();

    // Anything from the first `{` on the header line is not part of the body.
    let head = header.find('{').map_or(header, |idx| &header[..idx]);
    let mut base_command = sanitize_command_name(head.trim());
    let is_namespace_command = base_command.ends_with(':');
    if is_namespace_command {
        base_command.pop();
    }

    let body = lines.collect::<Vec<_>>().join(" ");
    let descriptors = parse_descriptors(&body);

    debug!(
        command = %base_command,
        namespace = is_namespace_command,
        descriptors = descriptors.len(),
        "Compiled signature"
    );

    let mut command = ParsedCommand::new(&base_command, handler);
    command.is_hidden = is_hidden;
    command.is_namespace_command = is_namespace_command;

    if is_namespace_command {
        let (options, sub_commands) = partition_namespace(descriptors);
        command.options = options;
        command.sub_commands = Some(sub_commands);
    } else {
        command.options = descriptors;
    }

    command
}

/// Splits namespace descriptors into flag options and visible sub-commands.
///
/// Hidden plain descriptors belong to neither list.
fn partition_namespace(descriptors: Vec<CommandOption>) -> (Vec<CommandOption>, Vec<CommandOption>) {
    let mut options = Vec::new();
    let mut sub_commands = Vec::new();

    for descriptor in descriptors {
        if descriptor.flags.is_some() {
            options.push(descriptor);
        } else if !descriptor.is_hidden {
            sub_commands.push(descriptor);
        } else {
            debug!(name = %descriptor.name, "Dropping hidden sub-command");
        }
    }

    (options, sub_commands)
}

/// Keeps only `[A-Za-z0-9_:-]` characters.
fn sanitize_command_name(raw: &str) -> String {
    raw.chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | ':' | '-'))
        .collect()
}
