//! Formatting a merged snippet in place
//!
//! The snippet is spliced into the buffer, the result is parsed and
//! pretty-printed, and the offset mappings of the printer carry the replace
//! range and every placeholder from the spliced source over to the printed
//! output. Whenever a position cannot be carried over the raw snippet is
//! returned: formatting may improve a completion but never lose it.

use tabstop_parsers::ParserRegistry;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::dialect::Dialect;
use crate::error::{RenderError, RenderResult};
use crate::types::{MatchOption, OffsetMapping, ReplaceRange, Snippet, SnippetBuilder};

/// Why formatting was abandoned in favour of the raw snippet
#[derive(Debug, Error)]
enum Fallback {
    #[error("replace range splits a character")]
    SplitCharacter,

    #[error("snippet placeholders are malformed")]
    MalformedPlaceholders,

    #[error("no mapping for offset {0}")]
    Unmapped(usize),

    #[error("translated range {begin}..{end} is not a slice of the output")]
    BadSlice { begin: usize, end: usize },

    #[error("placeholder {index} lands out of order or out of bounds")]
    Misplaced { index: usize },

    #[error("formatting produced an empty snippet")]
    Emptied,

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Translate the pre-format offset `pos` to the printed output
///
/// With [`MatchOption::MatchStart`] a mapping starting at `pos` wins over one
/// ending there; [`MatchOption::MatchEnd`] prefers the reverse. Failing both,
/// `pos` may fall inside a token printed unchanged.
pub fn translate(mappings: &[OffsetMapping], pos: usize, option: MatchOption) -> Option<usize> {
    let by_start = || {
        mappings
            .iter()
            .find(|m| m.start_before == pos)
            .map(|m| m.start_after)
    };
    let by_end = || mappings.iter().find(|m| m.end_before == pos).map(|m| m.end_after);
    let inside = || {
        mappings
            .iter()
            .find(|m| {
                m.start_before < pos
                    && pos < m.end_before
                    && m.end_before - m.start_before == m.end_after.saturating_sub(m.start_after)
            })
            .map(|m| m.start_after + (pos - m.start_before))
    };

    match option {
        MatchOption::MatchStart => by_start().or_else(by_end).or_else(inside),
        MatchOption::MatchEnd => by_end().or_else(by_start).or_else(inside),
    }
}

/// Format `snippet` as it would read after replacing `replace` in `buffer`
///
/// `option` decides how the start of the replace range sticks to its
/// neighbours; the end always uses [`MatchOption::MatchEnd`]. The only error
/// is an invalid replace range. Every other failure, printer defects
/// included, yields `snippet` unchanged.
pub fn format<D: Dialect>(
    dialect: &D,
    style: &D::Style,
    registry: &ParserRegistry,
    buffer: &str,
    replace: ReplaceRange,
    snippet: &Snippet,
    option: MatchOption,
) -> RenderResult<Snippet> {
    let ReplaceRange { begin, end } = replace;
    if begin > end || end > buffer.len() {
        warn!(begin, end, len = buffer.len(), "Invalid replace range");
        return Err(RenderError::InvalidReplaceRange {
            begin,
            end,
            len: buffer.len(),
        });
    }

    match format_snippet(dialect, style, registry, buffer, replace, snippet, option) {
        Ok(formatted) => Ok(formatted),
        Err(Fallback::Render(err)) if err.is_defect() => {
            error!(language = %D::LANGUAGE, error = %err, "Printer defect, using raw snippet");
            Ok(snippet.clone())
        }
        Err(reason) => {
            debug!(language = %D::LANGUAGE, %reason, "Formatting abandoned, using raw snippet");
            Ok(snippet.clone())
        }
    }
}

fn format_snippet<D: Dialect>(
    dialect: &D,
    style: &D::Style,
    registry: &ParserRegistry,
    buffer: &str,
    replace: ReplaceRange,
    snippet: &Snippet,
    option: MatchOption,
) -> Result<Snippet, Fallback> {
    let ReplaceRange { begin, end } = replace;
    if !buffer.is_char_boundary(begin) || !buffer.is_char_boundary(end) {
        return Err(Fallback::SplitCharacter);
    }
    if !snippet.is_well_formed() {
        return Err(Fallback::MalformedPlaceholders);
    }

    let mut src = String::with_capacity(buffer.len() - replace.len() + snippet.text.len());
    src.push_str(&buffer[..begin]);
    src.push_str(&snippet.text);
    src.push_str(&buffer[end..]);

    let tree = registry
        .parse(D::LANGUAGE, &src)
        .map_err(RenderError::from)?;
    let mut out = String::new();
    let region = begin..begin + snippet.text.len();
    let mappings = dialect.prettify(&mut out, style, &src, region.clone(), tree.root_node())?;

    let new_begin = translate(&mappings, region.start, option).ok_or(Fallback::Unmapped(region.start))?;
    let new_end = translate(&mappings, region.end, MatchOption::MatchEnd).ok_or(Fallback::Unmapped(region.end))?;
    let text = out.get(new_begin..new_end).ok_or(Fallback::BadSlice {
        begin: new_begin,
        end: new_end,
    })?;

    // Re-punch the holes at their translated spans.
    let mut builder = SnippetBuilder::new();
    let mut last = 0;
    for (index, (span, hole)) in snippet.placeholders.iter().zip(snippet.hole_texts()).enumerate() {
        let (start, finish) = if span.is_empty() {
            let at = translate(&mappings, begin + span.start, MatchOption::MatchEnd)
                .ok_or(Fallback::Unmapped(begin + span.start))?;
            (at, at)
        } else {
            let start = translate(&mappings, begin + span.start, MatchOption::MatchStart)
                .ok_or(Fallback::Unmapped(begin + span.start))?;
            let finish = translate(&mappings, begin + span.end, MatchOption::MatchEnd)
                .ok_or(Fallback::Unmapped(begin + span.end))?;
            (start, finish)
        };

        if start < new_begin || finish > new_end || start > finish || start - new_begin < last {
            return Err(Fallback::Misplaced { index });
        }
        let (start, finish) = (start - new_begin, finish - new_begin);
        let before = text.get(last..start).ok_or(Fallback::Misplaced { index })?;
        if !text.is_char_boundary(finish) {
            return Err(Fallback::Misplaced { index });
        }
        builder.push_str(before);
        builder.push_hole(hole);
        last = finish;
    }
    let rest = text.get(last..).ok_or(Fallback::BadSlice {
        begin: new_begin + last,
        end: new_end,
    })?;
    builder.push_str(rest);

    let formatted = builder.build();
    if formatted.text.is_empty() && !snippet.text.is_empty() {
        return Err(Fallback::Emptied);
    }
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{GoStyle, PythonStyle};
    use crate::dialect::{Go, Python};

    fn mapping(sb: usize, sa: usize, eb: usize, ea: usize) -> OffsetMapping {
        OffsetMapping::new(sb, sa, eb, ea)
    }

    #[test]
    fn test_translate_prefers_requested_side() {
        // "a,b" printed as "a, b"
        let mappings = vec![mapping(0, 0, 1, 1), mapping(1, 1, 2, 2), mapping(2, 3, 3, 4)];
        assert_eq!(translate(&mappings, 2, MatchOption::MatchStart), Some(3));
        assert_eq!(translate(&mappings, 2, MatchOption::MatchEnd), Some(2));
        assert_eq!(translate(&mappings, 0, MatchOption::MatchEnd), Some(0));
        assert_eq!(translate(&mappings, 3, MatchOption::MatchStart), Some(4));
    }

    #[test]
    fn test_translate_inside_unchanged_token() {
        let mappings = vec![mapping(4, 10, 10, 16)];
        assert_eq!(translate(&mappings, 7, MatchOption::MatchStart), Some(13));

        // a token whose printed length changed cannot be entered
        let mappings = vec![mapping(4, 10, 10, 12)];
        assert_eq!(translate(&mappings, 7, MatchOption::MatchEnd), None);
        assert_eq!(translate(&[], 0, MatchOption::MatchEnd), None);
    }

    #[test]
    fn test_invalid_replace_range() {
        let registry = ParserRegistry::new();
        let snippet = Snippet::plain("x");
        let err = format(
            &Go,
            &GoStyle::default(),
            &registry,
            "abc",
            ReplaceRange::new(2, 1),
            &snippet,
            MatchOption::MatchEnd,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidReplaceRange { begin: 2, end: 1, len: 3 }));

        let err = format(
            &Go,
            &GoStyle::default(),
            &registry,
            "abc",
            ReplaceRange::new(0, 4),
            &snippet,
            MatchOption::MatchEnd,
        )
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidReplaceRange { .. }));
    }

    #[test]
    fn test_keeps_separator_after_comma() {
        let buffer = "package main\n\nfunc main() {\n\tfoo := bar(butterfly, bee,)\n}\n";
        let cursor = buffer.find(",)").unwrap() + 1;
        let registry = ParserRegistry::new();
        let got = format(
            &Go,
            &GoStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(cursor),
            &Snippet::plain(" ladybug, locust"),
            MatchOption::MatchEnd,
        )
        .unwrap();
        assert_eq!(got.text, " ladybug, locust");
    }

    #[test]
    fn test_reformats_and_repunches_holes() {
        let buffer = "package main\n\nfunc main() {\n\tx := \n}\n";
        let cursor = buffer.find(":= ").unwrap() + 3;
        let snippet = Snippet {
            text: "bar(a,b)".to_string(),
            placeholders: vec![6..7],
        };
        let registry = ParserRegistry::new();
        let got = format(
            &Go,
            &GoStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(cursor),
            &snippet,
            MatchOption::MatchStart,
        )
        .unwrap();
        assert_eq!(got.text, "bar(a, b)");
        assert_eq!(got.placeholders, vec![7..8]);
        assert_eq!(got.hole_texts(), vec!["b"]);
    }

    #[test]
    fn test_empty_hole_sticks_to_opener() {
        let buffer = "package main\n\nfunc main() {\n\tx := \n}\n";
        let cursor = buffer.find(":= ").unwrap() + 3;
        let snippet = Snippet {
            text: "bar()".to_string(),
            placeholders: vec![4..4],
        };
        let registry = ParserRegistry::new();
        let got = format(
            &Go,
            &GoStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(cursor),
            &snippet,
            MatchOption::MatchStart,
        )
        .unwrap();
        assert_eq!(got, snippet);
    }

    #[test]
    fn test_no_leading_space_after_typed_space() {
        let buffer = "some_random_func(apple, banana, )\n";
        let cursor = buffer.find(", )").unwrap() + 2;
        let registry = ParserRegistry::new();
        let got = format(
            &Python::default(),
            &PythonStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(cursor),
            &Snippet::plain("orange, pear"),
            MatchOption::MatchStart,
        )
        .unwrap();
        assert_eq!(got.text, "orange, pear");
    }

    #[test]
    fn test_malformed_placeholders_fall_back() {
        let buffer = "package main\n\nfunc main() {\n\tx := \n}\n";
        let cursor = buffer.find(":= ").unwrap() + 3;
        let snippet = Snippet {
            text: "f(a,b)".to_string(),
            placeholders: vec![4..5, 2..3],
        };
        let registry = ParserRegistry::new();
        let got = format(
            &Go,
            &GoStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(cursor),
            &snippet,
            MatchOption::MatchStart,
        )
        .unwrap();
        assert_eq!(got, snippet);
    }

    #[test]
    fn test_split_character_falls_back() {
        let buffer = "x = 'é'\n";
        let inside = buffer.find('é').unwrap() + 1;
        let registry = ParserRegistry::new();
        let snippet = Snippet::plain("y");
        let got = format(
            &Python::default(),
            &PythonStyle::default(),
            &registry,
            buffer,
            ReplaceRange::at(inside),
            &snippet,
            MatchOption::MatchEnd,
        )
        .unwrap();
        assert_eq!(got, snippet);
    }
}
