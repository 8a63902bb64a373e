//! Output formatting for compiled commands, plans and catalogs.

use command_signature_core::{CommandOption, ParsedCommand};
use serde::Serialize;

use crate::catalog::CommandCatalog;
use crate::plan::{RegistrationPlan, Route};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

fn serialize<T: Serialize>(value: &T, format: OutputFormat) -> Option<Result<String, String>> {
    match format {
        OutputFormat::Json => Some(
            serde_json::to_string_pretty(value)
                .map_err(|e| format!("JSON serialization failed: {e}")),
        ),
        OutputFormat::Yaml => Some(
            serde_yaml::to_string(value).map_err(|e| format!("YAML serialization failed: {e}")),
        ),
        OutputFormat::Markdown | OutputFormat::Table => None,
    }
}

/// Formats a compiled command in the requested output format.
pub fn format_command(command: &ParsedCommand<'_>, format: OutputFormat) -> Result<String, String> {
    if let Some(serialized) = serialize(command, format) {
        return serialized;
    }
    match format {
        OutputFormat::Table => Ok(command_to_table(command)),
        _ => Ok(command_to_markdown(command, "#")),
    }
}

/// Formats a registration plan in the requested output format.
pub fn format_plan(plan: &RegistrationPlan, format: OutputFormat) -> Result<String, String> {
    if let Some(serialized) = serialize(plan, format) {
        return serialized;
    }
    match format {
        OutputFormat::Table => Ok(plan_to_table(plan)),
        _ => Ok(plan_to_markdown(plan)),
    }
}

/// Formats a catalog in the requested output format.
pub fn format_catalog(catalog: &CommandCatalog<'_>, format: OutputFormat) -> Result<String, String> {
    if let Some(serialized) = serialize(catalog, format) {
        return serialized;
    }
    match format {
        OutputFormat::Table => Ok(catalog_to_table(catalog)),
        _ => Ok(catalog_to_markdown(catalog)),
    }
}

fn display_name(opt: &CommandOption) -> String {
    match &opt.flags {
        Some(flags) => flags.join(", "),
        None => opt.name.clone(),
    }
}

fn push_option_rows(out: &mut String, options: &[&CommandOption]) {
    out.push_str("| Name | Required | Default | Description |\n");
    out.push_str("|------|----------|---------|-------------|\n");
    for opt in options {
        let required = if opt.required { "yes" } else { "no" };
        let default = opt
            .default_value
            .as_ref()
            .map(|value| format!("`{value}`"))
            .unwrap_or_default();
        let mut desc = opt.description.clone().unwrap_or_default();
        if !opt.choices.is_empty() {
            desc.push_str(&format!(" ({})", opt.choices.join(", ")));
        }
        out.push_str(&format!(
            "| `{}` | {required} | {default} | {} |\n",
            display_name(opt),
            desc.trim()
        ));
    }
    out.push('\n');
}

fn command_to_markdown(command: &ParsedCommand<'_>, heading: &str) -> String {
    let mut out = String::new();

    let suffix = if command.is_namespace_command { ":" } else { "" };
    out.push_str(&format!("{heading} {}{suffix}\n\n", command.base_command));

    if let Some(ref desc) = command.description {
        out.push_str(&format!("{desc}\n\n"));
    }
    if command.is_hidden {
        out.push_str("**Hidden:** yes\n\n");
    }

    let arguments: Vec<&CommandOption> = command.arguments().collect();
    if !arguments.is_empty() {
        out.push_str(&format!("{heading}# Arguments\n\n"));
        push_option_rows(&mut out, &arguments);
    }

    let options: Vec<&CommandOption> = command.options.iter().filter(|o| !o.is_positional()).collect();
    if !options.is_empty() {
        out.push_str(&format!("{heading}# Options\n\n"));
        push_option_rows(&mut out, &options);
    }

    let subs = command.sub_commands.as_deref().unwrap_or_default();
    if !subs.is_empty() {
        out.push_str(&format!("{heading}# Subcommands\n\n"));
        out.push_str("| Subcommand | Description |\n");
        out.push_str("|------------|-------------|\n");
        for sub in subs {
            let marker = if sub.shared { " (shared)" } else { "" };
            let desc = sub.description.as_deref().unwrap_or("");
            out.push_str(&format!("| `{}`{marker} | {desc} |\n", sub.name));
        }
        out.push('\n');
    }

    out
}

fn command_to_table(command: &ParsedCommand<'_>) -> String {
    let mut out = String::new();

    let kind = if command.is_namespace_command { "namespace" } else { "command" };
    out.push_str(&format!("Command: {}  Kind: {kind}", command.base_command));
    if command.is_hidden {
        out.push_str("  Hidden");
    }
    out.push('\n');

    if let Some(ref desc) = command.description {
        out.push_str(&format!("  {desc}\n"));
    }

    let entries: Vec<(String, &str)> = command
        .options
        .iter()
        .map(|opt| (display_name(opt), opt.description.as_deref().unwrap_or("")))
        .collect();
    push_table_section(&mut out, "Options", &entries);

    if let Some(ref subs) = command.sub_commands {
        let entries: Vec<(String, &str)> = subs
            .iter()
            .map(|sub| (sub.name.clone(), sub.description.as_deref().unwrap_or("")))
            .collect();
        push_table_section(&mut out, "Subcommands", &entries);
    }

    out
}

fn push_table_section(out: &mut String, title: &str, entries: &[(String, &str)]) {
    if entries.is_empty() {
        return;
    }
    out.push_str(&format!("\n{title}:\n"));
    let max_name = entries.iter().map(|(name, _)| name.len()).max().unwrap_or(4);
    for (name, desc) in entries {
        out.push_str(&format!("  {:<width$}  {desc}\n", name, width = max_name));
    }
}

fn route_usage(route: &Route) -> String {
    let mut usage = route.name.clone();
    for arg in &route.arguments {
        usage.push(' ');
        usage.push_str(&arg.token);
    }
    if !route.options.is_empty() {
        usage.push_str(" [options]");
    }
    usage
}

fn plan_to_markdown(plan: &RegistrationPlan) -> String {
    let mut out = String::new();
    out.push_str("# Registration Plan\n\n");

    for route in &plan.routes {
        out.push_str(&format!("## {}\n\n", route.name));
        if !route.description.is_empty() {
            out.push_str(&format!("{}\n\n", route.description));
        }
        out.push_str(&format!("```text\n{}\n```\n\n", route_usage(route)));

        if !route.options.is_empty() {
            out.push_str("| Option | Description |\n");
            out.push_str("|--------|-------------|\n");
            for opt in &route.options {
                out.push_str(&format!("| `{}` | {} |\n", opt.token, opt.description));
            }
            out.push('\n');
        }
    }

    if !plan.root_options.is_empty() {
        out.push_str("## Root Options\n\n");
        for opt in &plan.root_options {
            out.push_str(&format!("- `{}` {}\n", opt.token, opt.description));
        }
        out.push('\n');
    }

    out
}

fn plan_to_table(plan: &RegistrationPlan) -> String {
    let mut out = String::new();
    let max_usage = plan
        .routes
        .iter()
        .map(|route| route_usage(route).len())
        .max()
        .unwrap_or(4);

    for route in &plan.routes {
        let hidden = if route.hidden { "  (hidden)" } else { "" };
        out.push_str(&format!(
            "{:<width$}  {}{hidden}\n",
            route_usage(route),
            route.description,
            width = max_usage
        ));
    }
    for opt in &plan.root_options {
        out.push_str(&format!("{:<width$}  {}\n", opt.token, opt.description, width = max_usage));
    }

    out
}

fn catalog_to_markdown(catalog: &CommandCatalog<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!("# {}\n\n", catalog.cli_name));
    out.push_str(&format!("- **Version:** {}\n", catalog.version));
    out.push_str(&format!("- **Generated:** {}\n", catalog.generated_at));
    out.push_str(&format!("- **Commands:** {}\n", catalog.commands.len()));
    if !catalog.skipped.is_empty() {
        out.push_str(&format!("- **Skipped:** {}\n", catalog.skipped.join(", ")));
    }
    out.push('\n');

    for command in &catalog.commands {
        out.push_str(&command_to_markdown(command, "##"));
    }

    out
}

fn catalog_to_table(catalog: &CommandCatalog<'_>) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{}  {} commands  generated {}\n\n",
        catalog.cli_name,
        catalog.commands.len(),
        catalog.generated_at
    ));

    let max_name = catalog
        .commands
        .iter()
        .map(|cmd| cmd.base_command.len() + 1)
        .max()
        .unwrap_or(4);
    for command in &catalog.commands {
        let suffix = if command.is_namespace_command { ":" } else { "" };
        let name = format!("{}{suffix}", command.base_command);
        let desc = command.description.as_deref().unwrap_or("");
        out.push_str(&format!("{:<width$}  {desc}\n", name, width = max_name));
    }

    out
}
