//! Backend-agnostic registration plan.
//!
//! A dispatcher binds compiled commands to a concrete argument parser. The
//! rules for doing so are fixed (bracket rendering, placeholder override,
//! shared attachment, namespace expansion), so they are applied here once and
//! the dispatcher only replays the resulting [`Route`]s onto its backend.
//!
//! # Example
//!
//! ```
//! use command_signature_compiler::{compile_signature, plan::build_plan};
//! use command_signature_core::SignatureDefinition;
//!
//! let handler = SignatureDefinition::default();
//! let cmd = compile_signature(
//!     "db:\n{migrate : Run migrations | {--step=1 : Steps}}\n{^--env=local : Environment}",
//!     &handler,
//! );
//!
//! let plan = build_plan(&[cmd]);
//! let migrate = plan.find_route("db:migrate").unwrap();
//! assert_eq!(migrate.options[0].token, "--env [env]");
//! assert_eq!(migrate.options[1].token, "--step [step]");
//! ```

use std::collections::HashSet;
use std::sync::LazyLock;

use command_signature_core::{CommandOption, DefaultValue, ParsedCommand};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

static DESCRIPTION_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\w+)\]").expect("static regex must compile"));

/// Positional argument registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArgumentRegistration {
    pub name: String,
    /// Display token, e.g. `<name>`, `[name]` or an explicit placeholder.
    pub token: String,
    pub description: String,
    pub required: bool,
    pub variadic: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

/// Flag option registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptionRegistration {
    pub name: String,
    /// Full display token, e.g. `-o, --out [out]`.
    pub token: String,
    pub flags: Vec<String>,
    /// Value token following the flags, absent for boolean flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub description: String,
    pub variadic: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

/// One command the dispatcher registers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    /// Invocation name: `base` or `base:sub`.
    pub name: String,
    pub description: String,
    pub hidden: bool,
    /// Index of the originating command in the planned slice.
    pub command_index: usize,
    /// Sub-command this route dispatches to, for namespace commands.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_command: Option<String>,
    pub arguments: Vec<ArgumentRegistration>,
    pub options: Vec<OptionRegistration>,
}

/// Routes for a set of compiled commands.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationPlan {
    pub routes: Vec<Route>,
    /// Options of hidden namespace commands, registered on the program root.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub root_options: Vec<OptionRegistration>,
}

impl RegistrationPlan {
    /// Finds a route by invocation name.
    pub fn find_route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Invocation names of every route, in registration order.
    pub fn route_names(&self) -> Vec<&str> {
        self.routes.iter().map(|route| route.name.as_str()).collect()
    }
}

/// Builds the registration plan for `commands`.
pub fn build_plan(commands: &[ParsedCommand<'_>]) -> RegistrationPlan {
    let mut plan = RegistrationPlan::default();

    for (index, command) in commands.iter().enumerate() {
        match command.sub_commands.as_deref() {
            Some(sub_commands) if command.is_namespace_command => {
                plan_namespace(&mut plan, index, command, sub_commands);
            }
            _ => plan.routes.push(plan_simple(index, command)),
        }
    }

    debug!(routes = plan.routes.len(), "Built registration plan");
    plan
}

fn plan_simple(index: usize, command: &ParsedCommand<'_>) -> Route {
    let mut route = Route {
        name: command.base_command.clone(),
        description: command.description.clone().unwrap_or_default(),
        hidden: command.is_hidden,
        command_index: index,
        sub_command: None,
        arguments: Vec::new(),
        options: Vec::new(),
    };

    for opt in unique_by_name(&command.options) {
        add_entry(&mut route, opt, None);
    }

    route
}

fn plan_namespace(
    plan: &mut RegistrationPlan,
    index: usize,
    command: &ParsedCommand<'_>,
    sub_commands: &[CommandOption],
) {
    let base_options: Vec<OptionRegistration> = unique_by_name(&command.options)
        .map(|opt| render_option(opt, None))
        .collect();

    if command.is_hidden {
        plan.root_options.extend(base_options);
    } else {
        plan.routes.push(Route {
            name: command.base_command.clone(),
            description: command.description.clone().unwrap_or_default(),
            hidden: false,
            command_index: index,
            sub_command: None,
            arguments: Vec::new(),
            options: base_options,
        });
    }

    let shared_arguments: Vec<&CommandOption> = sub_commands.iter().filter(|s| s.shared).collect();
    let shared_options: Vec<&CommandOption> =
        command.options.iter().filter(|opt| opt.shared).collect();

    let mut seen = HashSet::new();
    for sub in sub_commands {
        if sub.shared || !seen.insert(sub.name.as_str()) {
            continue;
        }

        let mut route = Route {
            name: format!("{}:{}", command.base_command, sub.name),
            description: sub.description.clone().unwrap_or_default(),
            hidden: command.is_hidden,
            command_index: index,
            sub_command: Some(sub.name.clone()),
            arguments: Vec::new(),
            options: Vec::new(),
        };

        for shared in shared_arguments.iter().chain(&shared_options) {
            add_entry(&mut route, shared, Some(sub));
        }
        if let Some(nested) = &sub.nested_options {
            for opt in unique_by_name(nested) {
                add_entry(&mut route, opt, None);
            }
        }

        plan.routes.push(route);
    }
}

fn add_entry(route: &mut Route, opt: &CommandOption, parent: Option<&CommandOption>) {
    if opt.is_flag {
        route.options.push(render_option(opt, parent));
    } else {
        route.arguments.push(render_argument(opt, parent));
    }
}

/// Renders a positional argument.
///
/// An explicit placeholder wins; otherwise required arguments render as
/// `<name>` and optional ones as `[name]`.
pub fn render_argument(opt: &CommandOption, parent: Option<&CommandOption>) -> ArgumentRegistration {
    let token = opt.placeholder.clone().unwrap_or_else(|| {
        let ellipsis = if opt.multiple { "..." } else { "" };
        if opt.required {
            format!("<{}{ellipsis}>", opt.name)
        } else {
            format!("[{}{ellipsis}]", opt.name)
        }
    });

    ArgumentRegistration {
        name: opt.name.clone(),
        token,
        description: render_description(opt, parent),
        required: opt.required,
        variadic: opt.multiple,
        choices: opt.choices.clone(),
        default_value: effective_default(opt),
    }
}

/// Renders a flag option.
///
/// The value token is the explicit placeholder, or `<value>` for required
/// options, or `[value...]` for repeatable ones; plain flags take no value.
pub fn render_option(opt: &CommandOption, parent: Option<&CommandOption>) -> OptionRegistration {
    let flags = opt.flags.clone().unwrap_or_default();
    let value_name = opt.name.replace('-', "");
    let ellipsis = if opt.multiple { "..." } else { "" };

    let value = match (&opt.placeholder, opt.required, opt.multiple) {
        (Some(placeholder), _, _) => Some(placeholder.clone()),
        (None, true, _) => Some(format!("<{value_name}{ellipsis}>")),
        (None, false, true) => Some(format!("[{value_name}...]")),
        (None, false, false) => None,
    };

    let mut token = flags.join(", ");
    if let Some(value) = &value {
        token.push(' ');
        token.push_str(value);
    }

    OptionRegistration {
        name: opt.name.clone(),
        token,
        flags,
        value,
        description: render_description(opt, parent),
        variadic: opt.multiple,
        choices: opt.choices.clone(),
        default_value: effective_default(opt),
    }
}

/// Substitutes `[name]`/`[description]` references from the parent
/// sub-command; unknown references are left as written.
fn render_description(opt: &CommandOption, parent: Option<&CommandOption>) -> String {
    let description = opt.description.as_deref().unwrap_or_default();
    let Some(parent) = parent else {
        return description.to_string();
    };

    DESCRIPTION_REF_RE
        .replace_all(description, |caps: &regex::Captures<'_>| {
            let value = match &caps[1] {
                "name" => Some(parent.name.as_str()),
                "description" => parent.description.as_deref(),
                _ => None,
            };
            value.map_or_else(|| caps[0].to_string(), ToOwned::to_owned)
        })
        .into_owned()
}

fn effective_default(opt: &CommandOption) -> Option<DefaultValue> {
    opt.default_value
        .clone()
        .filter(|value| !value.is_blank())
}

/// First occurrence of each name, in declaration order.
fn unique_by_name(options: &[CommandOption]) -> impl Iterator<Item = &CommandOption> {
    let mut seen = HashSet::new();
    options
        .iter()
        .filter(move |&opt| seen.insert(opt.name.as_str()))
}
