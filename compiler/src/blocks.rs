//! Balanced `{...}` block extraction.
//!
//! Signature bodies are sequences of brace-delimited blocks. A block may
//! contain one further level of braces (used to declare nested options),
//! which is returned verbatim as part of the block's inner text. Anything
//! that does not form a well-shaped block is skipped without error.

const OPEN: u8 = b'{';
const CLOSE: u8 = b'}';

/// Returns the inner content of every top-level `{...}` block in `text`, in
/// order of appearance.
///
/// # Examples
///
/// ```
/// use command_signature_compiler::blocks::extract_blocks;
///
/// let blocks = extract_blocks("{name : The name} {--force} {sub : Sub | {--a}}");
/// assert_eq!(blocks, vec!["name : The name", "--force", "sub : Sub | {--a}"]);
///
/// // Unbalanced trailing input is ignored.
/// assert_eq!(extract_blocks("{ok} {broken"), vec!["ok"]);
/// ```
pub fn extract_blocks(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut blocks = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        if bytes[pos] == OPEN {
            if let Some(end) = match_block(bytes, pos) {
                // Braces are ASCII, so both offsets sit on char boundaries.
                blocks.push(&text[pos + 1..end]);
                pos = end + 1;
                continue;
            }
        }
        pos += 1;
    }

    blocks
}

/// Tries to match a block whose `{` sits at `start`, returning the index of
/// its closing `}`.
fn match_block(bytes: &[u8], start: usize) -> Option<usize> {
    // The block body must open with at least one non-brace character.
    match bytes.get(start + 1) {
        None | Some(&OPEN) | Some(&CLOSE) => return None,
        Some(_) => {}
    }

    let mut depth = 1u8;
    for (offset, &byte) in bytes[start + 1..].iter().enumerate() {
        match byte {
            OPEN if depth == 1 => depth = 2,
            OPEN => return None,
            CLOSE if depth == 2 => depth = 1,
            CLOSE => return Some(start + 1 + offset),
            _ => {}
        }
    }

    None
}
