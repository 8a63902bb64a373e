//! Descriptor parsing for a single signature block.
//!
//! A block such as `{--o|out=txt : The output format : txt, json}` is turned
//! into one [`CommandOption`] by a fixed normalization pipeline:
//!
//! 1. hidden/shared marker stripping
//! 2. name/description split on the first `:`
//! 3. nested option lists after `|`
//! 4. `=default` assignment
//! 5. `?*`, `*` and `?` modifier suffixes
//! 6. required inference
//! 7. flag alias normalization and typed defaults
//! 8. choice extraction from the description suffix
//!
//! Later steps consume fields the earlier ones have already normalized, so
//! the order is significant. Malformed blocks never fail; they degrade to
//! simpler descriptors.

use std::sync::LazyLock;

use command_signature_core::{CommandOption, DefaultValue};
use regex::Regex;
use tracing::debug;

use crate::blocks::extract_blocks;

static CHOICES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]+?)\s*:\s*\[?([\w\s,./-]+)\]?$").expect("static regex must compile")
});

/// Parses every top-level block in `text` into descriptors.
///
/// # Examples
///
/// ```
/// use command_signature_compiler::descriptor::parse_descriptors;
///
/// let options = parse_descriptors("{name : The name} {--force : Force it}");
/// assert_eq!(options.len(), 2);
/// assert_eq!(options[0].name, "name");
/// assert_eq!(options[1].flags.as_deref(), Some(&["--force".to_string()][..]));
/// ```
pub fn parse_descriptors(text: &str) -> Vec<CommandOption> {
    extract_blocks(text).into_iter().map(parse_descriptor).collect()
}

/// Parses the inner content of one block into a descriptor.
///
/// # Examples
///
/// ```
/// use command_signature_compiler::descriptor::parse_descriptor;
/// use command_signature_core::DefaultValue;
///
/// let opt = parse_descriptor("--o|out=txt : The output format");
/// assert!(opt.is_flag);
/// assert_eq!(opt.name, "out");
/// assert_eq!(opt.flags, Some(vec!["-o".to_string(), "--out".to_string()]));
/// assert_eq!(opt.default_value, Some(DefaultValue::Str("txt".into())));
/// assert!(!opt.required);
/// ```
pub fn parse_descriptor(content: &str) -> CommandOption {
    let marked = strip_markers(content.trim());

    let (name_part, remainder) = match marked.text.split_once(':') {
        Some((name, rest)) => (name.trim(), Some(rest.trim())),
        None => {
            debug!(block = content, "Block has no description separator");
            (marked.text.trim(), None)
        }
    };

    let (description, nested_options) = match remainder {
        Some(rest) => split_nested(rest),
        None => (None, None),
    };

    let name = resolve_name(name_part);

    let (description, choices) = match description {
        Some(desc) => {
            let (desc, choices) = extract_choices(desc);
            (Some(desc), choices)
        }
        None => (None, Vec::new()),
    };

    CommandOption {
        name: name.name,
        flags: name.flags,
        is_flag: name.is_flag,
        required: name.required,
        multiple: name.multiple,
        placeholder: name.placeholder,
        description: description.filter(|desc| !desc.is_empty()),
        default_value: name.default_value,
        choices,
        is_hidden: marked.hidden,
        shared: marked.shared,
        nested_options,
    }
}

/// Text with its hidden/shared markers removed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Marked {
    pub text: String,
    pub hidden: bool,
    pub shared: bool,
}

/// Resolves `#`/`^` markers.
///
/// A leading `^` marks the entry shared. A leading `#`, or a `:` directly
/// followed by `#`/`^`, marks it hidden. Shared wins over hidden.
pub(crate) fn strip_markers(text: &str) -> Marked {
    let shared = text.starts_with('^');
    let qualified = qualified_marker_index(text);
    let hidden = !shared && (text.starts_with('#') || qualified.is_some());

    let text = if let Some(rest) = text.strip_prefix(['#', '^']) {
        rest.trim_start().to_string()
    } else if let Some(colon) = qualified {
        format!("{}{}", &text[..=colon], &text[colon + 2..])
    } else {
        text.to_string()
    };

    Marked {
        text,
        hidden,
        shared,
    }
}

/// Byte index of the first `:` that is directly followed by `#` or `^`.
pub(crate) fn qualified_marker_index(text: &str) -> Option<usize> {
    text.as_bytes()
        .windows(2)
        .position(|pair| pair[0] == b':' && matches!(pair[1], b'#' | b'^'))
}

fn split_nested(rest: &str) -> (Option<&str>, Option<Vec<CommandOption>>) {
    let Some((description, nested)) = rest.split_once('|') else {
        return (Some(rest), None);
    };

    let nested = nested.trim();
    let nested = nested.strip_prefix('{').unwrap_or(nested).trim();
    let nested_options = parse_descriptors(&format!("{{{nested}}}"));
    debug!(
        count = nested_options.len(),
        "Parsed nested options"
    );

    (Some(description.trim()), Some(nested_options))
}

/// Everything derived from the name part of a block.
#[derive(Debug, Default)]
struct ResolvedName {
    name: String,
    flags: Option<Vec<String>>,
    is_flag: bool,
    required: bool,
    multiple: bool,
    placeholder: Option<String>,
    default_value: Option<DefaultValue>,
}

fn resolve_name(name_part: &str) -> ResolvedName {
    let mut resolved = ResolvedName {
        required: is_clean_identifier(name_part),
        ..Default::default()
    };

    let mut name = name_part;
    let mut raw_default = None;

    if let Some((raw_name, raw_value)) = name_part.split_once('=') {
        name = raw_name.trim();
        let raw_value = raw_value.trim();
        let alias = last_alias(name);
        resolved.placeholder = Some(if raw_value.is_empty() {
            format!("<{alias}>")
        } else {
            format!("[{alias}]")
        });
        resolved.required = false;
        raw_default = Some(raw_value);
    }

    if let Some(stripped) = name.strip_suffix("?*") {
        resolved.required = false;
        resolved.multiple = true;
        name = stripped;
    } else if let Some(stripped) = name.strip_suffix('*') {
        resolved.multiple = true;
        name = stripped;
    } else if let Some(stripped) = name.strip_suffix('?') {
        resolved.required = false;
        resolved.placeholder = Some(format!("[{}]", last_alias(stripped)));
        name = stripped;
    }
    let name = name.trim();

    resolved.is_flag = name.starts_with("--");
    if resolved.is_flag {
        let flags: Vec<String> = name
            .split('|')
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
            .map(normalize_alias)
            .collect();
        resolved.name = flags
            .last()
            .map(|flag| flag.trim_start_matches('-').to_string())
            .unwrap_or_default();
        resolved.flags = Some(flags);
        resolved.required = false;
    } else {
        resolved.name = name.to_string();
    }

    resolved.default_value = raw_default.map(|raw| {
        if resolved.multiple {
            // Lists skip scalar inference; `*` and an empty default both mean no values.
            let raw = if raw == "*" { "" } else { raw };
            DefaultValue::Str(raw.to_string()).into_list()
        } else if resolved.is_flag {
            DefaultValue::infer(raw, resolved.required)
        } else {
            DefaultValue::Str(raw.to_string())
        }
    });

    resolved
}

/// A name made only of `[A-Za-z0-9_|-]` carries no modifier or default.
fn is_clean_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '_' | '|' | '-'))
}

/// Last `|` alias of a raw name, without dashes or modifier suffixes.
fn last_alias(name: &str) -> &str {
    name.rsplit('|')
        .next()
        .unwrap_or(name)
        .trim()
        .trim_start_matches('-')
        .trim_end_matches(['?', '*'])
}

/// Normalizes one flag alias into `-x` or `--long` form.
fn normalize_alias(alias: &str) -> String {
    if let Some(long) = alias.strip_prefix("--") {
        if long.chars().count() == 1 {
            return format!("-{long}");
        }
        return alias.to_string();
    }

    if let Some(short) = alias.strip_prefix('-') {
        if short.chars().count() > 1 {
            return format!("--{short}");
        }
        return alias.to_string();
    }

    if alias.chars().count() > 1 {
        format!("--{alias}")
    } else {
        format!("-{alias}")
    }
}

/// Splits a `text : a, b` or `text : [a, b]` description into text and choices.
fn extract_choices(description: &str) -> (String, Vec<String>) {
    let Some(caps) = CHOICES_RE.captures(description) else {
        return (description.trim().to_string(), Vec::new());
    };

    let text = caps[1].trim().to_string();
    let choices = caps[2]
        .split(',')
        .map(str::trim)
        .filter(|choice| !choice.is_empty())
        .map(ToOwned::to_owned)
        .collect();

    (text, choices)
}
