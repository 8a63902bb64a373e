//! Type definitions for compiled command signatures.
//!
//! This module defines the data model produced by the signature compiler.
//! The types are designed for serialization with [`serde`] so compiled
//! commands can be emitted as JSON or YAML and handed to a dispatcher.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default value attached to an argument or option.
///
/// Signature text only carries strings, so typed variants are produced by
/// the compiler's normalization rules (e.g. `--force=false` becomes
/// [`DefaultValue::Bool`]). Serialized untagged, so JSON output reads as a
/// plain string, number, boolean or array.
///
/// # Examples
///
/// ```
/// use command_signature_core::DefaultValue;
///
/// assert_eq!(DefaultValue::infer("42", false), DefaultValue::Num(42.0));
/// assert_eq!(DefaultValue::infer("true", false), DefaultValue::Bool(true));
/// assert_eq!(DefaultValue::infer("*", false), DefaultValue::List(Vec::new()));
/// assert_eq!(DefaultValue::infer("txt", false), DefaultValue::Str("txt".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    /// Boolean default (`true`/`false`, or an empty flag default).
    Bool(bool),
    /// Numeric default.
    Num(f64),
    /// Plain string default.
    Str(String),
    /// List default for repeatable values.
    List(Vec<String>),
}

impl DefaultValue {
    /// Infers a typed default from raw signature text.
    ///
    /// `*` yields an empty list, `true`/`false` (or an empty value on an
    /// optional descriptor) yield a boolean, numeric text yields a number and
    /// anything else stays a string.
    pub fn infer(raw: &str, required: bool) -> Self {
        match raw {
            "*" => Self::List(Vec::new()),
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            "" if !required => Self::Bool(false),
            _ => match raw.trim().parse::<f64>() {
                Ok(num) if !raw.trim().is_empty() && num.is_finite() => Self::Num(num),
                _ => Self::Str(raw.to_string()),
            },
        }
    }

    /// Converts the value into a list, splitting strings on commas.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_signature_core::DefaultValue;
    ///
    /// let list = DefaultValue::Str("a, b,,c".into()).into_list();
    /// assert_eq!(list, DefaultValue::List(vec!["a".into(), "b".into(), "c".into()]));
    /// ```
    pub fn into_list(self) -> Self {
        match self {
            Self::List(values) => Self::List(values),
            Self::Str(raw) => Self::List(
                raw.split(',')
                    .map(str::trim)
                    .filter(|part| !part.is_empty())
                    .map(ToOwned::to_owned)
                    .collect(),
            ),
            other => Self::List(vec![other.to_string()]),
        }
    }

    /// Returns `true` for an empty string default.
    ///
    /// Dispatchers treat an empty string as "no default" when registering
    /// arguments.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Str(s) if s.is_empty())
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Num(value) => write!(f, "{value}"),
            Self::Str(value) => f.write_str(value),
            Self::List(values) => f.write_str(&values.join(",")),
        }
    }
}

/// One positional argument or flag option declared in a signature block.
///
/// Flags carry their normalized aliases in [`flags`](CommandOption::flags)
/// and use the last alias (without dashes) as their
/// [`name`](CommandOption::name). Positional arguments never carry flags but
/// may carry [`nested_options`](CommandOption::nested_options) when they
/// declare a sub-command of a namespace command.
///
/// # Examples
///
/// ```
/// use command_signature_core::CommandOption;
///
/// let arg = CommandOption::new("name").with_description("The command name");
/// assert!(arg.is_positional());
/// assert_eq!(arg.description.as_deref(), Some("The command name"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandOption {
    /// Normalized identifier.
    pub name: String,
    /// Normalized alias tokens (e.g. `["-o", "--out"]`), flags only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<String>>,
    /// Declared with a leading `--`.
    pub is_flag: bool,
    /// Must be supplied by the user.
    pub required: bool,
    /// Accepts repeated values.
    pub multiple: bool,
    /// Explicit display token such as `[name]` or `<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Description with any choice suffix removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
    /// Allowed literal values, empty when unconstrained.
    #[serde(default)]
    pub choices: Vec<String>,
    pub is_hidden: bool,
    /// Attached to every sub-command of a namespace command.
    pub shared: bool,
    /// Options declared after `|` inside the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nested_options: Option<Vec<CommandOption>>,
}

impl CommandOption {
    /// Creates a bare positional descriptor with the given name.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Returns `true` for positional arguments (and namespace sub-commands).
    pub fn is_positional(&self) -> bool {
        self.flags.is_none()
    }

    /// Checks whether `token` is one of this option's aliases or its name.
    ///
    /// # Examples
    ///
    /// ```
    /// use command_signature_core::CommandOption;
    ///
    /// let mut opt = CommandOption::new("out");
    /// opt.is_flag = true;
    /// opt.flags = Some(vec!["-o".into(), "--out".into()]);
    /// assert!(opt.matches("-o"));
    /// assert!(opt.matches("out"));
    /// assert!(!opt.matches("--in"));
    /// ```
    pub fn matches(&self, token: &str) -> bool {
        self.name == token
            || self
                .flags
                .as_ref()
                .is_some_and(|flags| flags.iter().any(|flag| flag == token))
    }
}

/// A command object that owns a signature.
///
/// The compiler only reads from handlers: the signature text and the
/// description shown next to the command. Compiled commands keep a borrowed
/// back-reference to their handler so a dispatcher can invoke it later.
pub trait CommandHandler: Send + Sync {
    /// The signature text describing the command.
    fn signature(&self) -> &str;

    /// Human readable description of the command.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Plain signature definition, typically loaded from a file.
///
/// # Examples
///
/// ```
/// use command_signature_core::{CommandHandler, SignatureDefinition};
///
/// let def = SignatureDefinition::new("hello {name}").with_description("Say hello");
/// assert_eq!(def.signature(), "hello {name}");
/// assert_eq!(CommandHandler::description(&def), Some("Say hello"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureDefinition {
    /// Raw signature text.
    pub signature: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where this definition was loaded from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SignatureDefinition {
    /// Creates a definition from signature text.
    pub fn new(signature: &str) -> Self {
        Self {
            signature: signature.to_string(),
            ..Default::default()
        }
    }

    /// Adds a description.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }
}

impl CommandHandler for SignatureDefinition {
    fn signature(&self) -> &str {
        &self.signature
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

/// Compiled specification of one signature.
///
/// Produced fresh by every compile call. The `handler` field borrows the
/// command object the signature came from; it is never serialized.
///
/// Equality compares every data field plus handler identity.
#[derive(Clone, Serialize)]
pub struct ParsedCommand<'h> {
    /// Command name; the trailing `:` of namespace commands is removed.
    pub base_command: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_hidden: bool,
    /// Header ended with `:`.
    pub is_namespace_command: bool,
    /// Sub-commands of a namespace command.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_commands: Option<Vec<CommandOption>>,
    /// Flag options (namespace commands) or every descriptor (simple commands).
    pub options: Vec<CommandOption>,
    #[serde(skip)]
    pub handler: &'h dyn CommandHandler,
}

impl<'h> ParsedCommand<'h> {
    /// Creates an empty command bound to `handler`.
    pub fn new(base_command: &str, handler: &'h dyn CommandHandler) -> Self {
        Self {
            base_command: base_command.to_string(),
            description: handler.description().map(ToOwned::to_owned),
            is_hidden: false,
            is_namespace_command: false,
            sub_commands: None,
            options: Vec::new(),
            handler,
        }
    }

    /// Finds an option by name or alias.
    pub fn find_option(&self, token: &str) -> Option<&CommandOption> {
        self.options.iter().find(|opt| opt.matches(token))
    }

    /// Finds a sub-command by name.
    pub fn find_sub_command(&self, name: &str) -> Option<&CommandOption> {
        self.sub_commands
            .as_deref()
            .unwrap_or_default()
            .iter()
            .find(|sub| sub.name == name)
    }

    /// Positional arguments among [`options`](ParsedCommand::options).
    pub fn arguments(&self) -> impl Iterator<Item = &CommandOption> {
        self.options.iter().filter(|opt| opt.is_positional())
    }

    /// Returns `true` when the signature declared nothing beyond its header.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty() && self.sub_commands.as_ref().is_none_or(Vec::is_empty)
    }
}

impl fmt::Debug for ParsedCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParsedCommand")
            .field("base_command", &self.base_command)
            .field("description", &self.description)
            .field("is_hidden", &self.is_hidden)
            .field("is_namespace_command", &self.is_namespace_command)
            .field("sub_commands", &self.sub_commands)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PartialEq for ParsedCommand<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.base_command == other.base_command
            && self.description == other.description
            && self.is_hidden == other.is_hidden
            && self.is_namespace_command == other.is_namespace_command
            && self.sub_commands == other.sub_commands
            && self.options == other.options
            && std::ptr::addr_eq(self.handler, other.handler)
    }
}
