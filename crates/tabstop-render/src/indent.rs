//! Indentation of the cursor line in indentation-sensitive source

use tabstop_parsers::Node;
use tracing::debug;

use crate::error::{RenderError, RenderResult};

/// Unit used when the source has no indented line at all
pub const DEFAULT_INDENT: &str = "    ";

/// Indentation unit and block depth at the cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indentation {
    pub unit: String,
    pub depth: usize,
}

/// Leading whitespace of the line containing `pos`
fn line_indent(src: &str, pos: usize) -> &str {
    let start = src[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &src[start..];
    let end = line.find(|c: char| c != ' ' && c != '\t').unwrap_or(line.len());
    &line[..end]
}

/// Byte offset of the node that anchors the cursor line: its first
/// non-blank byte, or the last non-blank byte before the cursor when the
/// line holds nothing yet
fn anchor(src: &str, cursor: usize) -> Option<usize> {
    let start = src[..cursor].rfind('\n').map_or(0, |i| i + 1);
    let line_end = src[cursor..].find('\n').map_or(src.len(), |i| cursor + i);
    if let Some(i) = src[start..line_end].find(|c: char| !c.is_whitespace()) {
        return Some(start + i);
    }
    src[..start].rfind(|c: char| !c.is_whitespace())
}

fn enclosing_block(root: Node<'_>, pos: usize) -> Option<Node<'_>> {
    let mut node = root.descendant_for_byte_range(pos, pos)?;
    loop {
        if node.kind() == "block" && node.named_child_count() > 0 {
            return Some(node);
        }
        node = node.parent()?;
    }
}

/// Unit of a block: the indentation of its first statement beyond the
/// indentation of the statement that opens it
fn block_unit<'s>(src: &'s str, block: Node<'_>) -> Option<&'s str> {
    let first = block.named_child(0)?;
    let inner = line_indent(src, first.start_byte());
    let outer = block.parent().map_or("", |owner| line_indent(src, owner.start_byte()));
    inner.strip_prefix(outer).filter(|unit| !unit.is_empty())
}

/// Leading whitespace of the first indented line in the file
fn scan_unit(src: &str) -> Option<&str> {
    src.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| &line[..line.len() - line.trim_start_matches([' ', '\t']).len()])
        .find(|indent| !indent.is_empty())
}

/// Recover the indentation unit and block depth of the line holding
/// `cursor`
///
/// The depth is the cursor line's leading whitespace divided by the unit;
/// a remainder means the user mixes indentation widths. Outside any block
/// the depth is 0 and the unit comes from the first indented line in the
/// file.
pub fn inspect(src: &str, root: Node<'_>, cursor: usize) -> RenderResult<Indentation> {
    let cursor = cursor.min(src.len());
    if !src.is_char_boundary(cursor) {
        return Err(RenderError::InconsistentIndentation {
            line_indent: String::new(),
            unit: String::new(),
        });
    }

    let block = anchor(src, cursor).and_then(|pos| enclosing_block(root, pos));
    let Some(unit) = block.and_then(|b| block_unit(src, b)) else {
        let unit = scan_unit(src).unwrap_or(DEFAULT_INDENT);
        debug!(unit = ?unit, "No indented block at cursor");
        return Ok(Indentation {
            unit: unit.to_string(),
            depth: 0,
        });
    };

    // whitespace typed so far on the cursor line
    let indent = line_indent(src, cursor);
    let column = indent.len().min(cursor - src[..cursor].rfind('\n').map_or(0, |i| i + 1));
    let indent = &indent[..column];
    if indent.len() % unit.len() != 0 || indent.contains(|c: char| !unit.contains(c)) {
        return Err(RenderError::InconsistentIndentation {
            line_indent: indent.to_string(),
            unit: unit.to_string(),
        });
    }

    Ok(Indentation {
        unit: unit.to_string(),
        depth: indent.len() / unit.len(),
    })
}
