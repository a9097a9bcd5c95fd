//! Text utilities: position conversion, lexical regions and word search.
//!
//! ## Coordinate Conventions
//!
//! - Lines and columns are **1-indexed** (matching editor conventions)
//! - Byte offsets are **0-indexed**
//! - Columns count Unicode scalar values, not bytes
//!
//! ## Lexical Regions
//!
//! Text scans distinguish code from comments and literals the way a
//! JVM-language lexer does: `//` line comments, `/* */` block comments,
//! `"..."` strings, `"""..."""` text blocks and `'x'` char literals.
//! Everything else is code.

use crate::model::Span;

// ============================================================================
// Position Conversion
// ============================================================================

/// Convert a byte offset to 1-indexed line and column (in characters).
///
/// An offset in the middle of a multi-byte character is rounded down to the
/// character start. An offset past the end maps to the end of content.
pub fn byte_offset_to_position(content: &str, offset: usize) -> (u32, u32) {
    let mut offset = offset.min(content.len());
    while !content.is_char_boundary(offset) {
        offset -= 1;
    }

    let before = &content[..offset];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let col = content[line_start..offset].chars().count() as u32 + 1;

    (line, col)
}

/// Convert a 1-indexed line and column (in characters) to a byte offset.
///
/// Returns `None` if the line does not exist or the column lies past the end
/// of the line.
pub fn position_to_byte_offset(content: &str, line: u32, col: u32) -> Option<usize> {
    if line == 0 || col == 0 {
        return None;
    }
    let line_start = if line == 1 {
        0
    } else {
        content
            .match_indices('\n')
            .nth(line as usize - 2)
            .map(|(i, _)| i + 1)?
    };
    let line_text = content[line_start..].split('\n').next().unwrap_or("");
    let col = col as usize - 1;
    if col == line_text.chars().count() {
        return Some(line_start + line_text.len());
    }
    line_text
        .char_indices()
        .nth(col)
        .map(|(i, _)| line_start + i)
}

// ============================================================================
// Lexical Regions
// ============================================================================

/// Lexical class of a byte range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    /// Ordinary code.
    Code,
    /// Line or block comment, delimiters included.
    Comment,
    /// String, text block or char literal, quotes included.
    Literal,
}

/// Non-code ranges of a source text, sorted by start offset.
///
/// Unterminated comments and literals run to the end of the text.
pub fn non_code_ranges(text: &str) -> Vec<(Span, Region)> {
    let bytes = text.as_bytes();
    let mut ranges = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = find_from(bytes, i + 2, b"\n").unwrap_or(bytes.len());
                ranges.push((Span::new(start as u64, i as u64), Region::Comment));
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = find_from(bytes, i + 2, b"*/")
                    .map(|end| end + 2)
                    .unwrap_or(bytes.len());
                ranges.push((Span::new(start as u64, i as u64), Region::Comment));
            }
            b'"' if bytes[i..].starts_with(b"\"\"\"") => {
                i = find_from(bytes, i + 3, b"\"\"\"")
                    .map(|end| end + 3)
                    .unwrap_or(bytes.len());
                ranges.push((Span::new(start as u64, i as u64), Region::Literal));
            }
            quote @ (b'"' | b'\'') => {
                i = skip_quoted(bytes, i + 1, quote);
                ranges.push((Span::new(start as u64, i as u64), Region::Literal));
            }
            _ => i += 1,
        }
    }

    ranges
}

/// Region containing `offset`, given the output of [`non_code_ranges`].
pub fn region_at(ranges: &[(Span, Region)], offset: u64) -> Region {
    let idx = ranges.partition_point(|(span, _)| span.end <= offset);
    match ranges.get(idx) {
        Some((span, region)) if span.start <= offset => *region,
        _ => Region::Code,
    }
}

fn find_from(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|pos| pos + from)
}

/// Skip past a quoted literal whose opening quote precedes `i`.
///
/// Line breaks end a single-line literal so a stray quote cannot swallow the
/// rest of the file.
fn skip_quoted(bytes: &[u8], mut i: usize, quote: u8) -> usize {
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'\n' => return i,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

// ============================================================================
// Word Search
// ============================================================================

/// Whether a byte can be part of a JVM identifier.
///
/// Bytes of multi-byte UTF-8 sequences count as identifier bytes so that
/// non-ASCII identifiers are never split.
pub fn is_identifier_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

/// Byte offsets of every whole-word, case-sensitive occurrence of `word`.
pub fn find_word_occurrences(text: &str, word: &str) -> Vec<usize> {
    let mut found = Vec::new();
    if word.is_empty() {
        return found;
    }

    let bytes = text.as_bytes();
    for (start, _) in text.match_indices(word) {
        let end = start + word.len();
        let before_ok = start == 0 || !is_identifier_byte(bytes[start - 1]);
        let after_ok = end == bytes.len() || !is_identifier_byte(bytes[end]);
        if before_ok && after_ok {
            found.push(start);
        }
    }
    found
}

/// First whole-word occurrence of `word` in code at or after `from`.
pub fn find_code_word(text: &str, word: &str, from: usize) -> Option<usize> {
    let ranges = non_code_ranges(text);
    find_word_occurrences(text, word)
        .into_iter()
        .find(|&off| off >= from && region_at(&ranges, off as u64) == Region::Code)
}

// ============================================================================
// Declarations
// ============================================================================

/// End offset of a method declaration whose name ends at `name_end`.
///
/// The declaration ends after the first top-level `;` (no body) or after the
/// `}` that closes its body. Braces and semicolons in comments, literals and
/// the parameter list are ignored. Returns `None` if the declaration is not
/// closed before the enclosing block ends.
pub fn declaration_end(text: &str, name_end: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let ranges = non_code_ranges(text);
    let mut parens = 0usize;
    let mut braces = 0usize;

    for (i, &b) in bytes.iter().enumerate().skip(name_end) {
        if region_at(&ranges, i as u64) != Region::Code {
            continue;
        }
        match b {
            b'(' => parens += 1,
            b')' => parens = parens.saturating_sub(1),
            b';' if parens == 0 && braces == 0 => return Some(i + 1),
            b'{' if parens == 0 => braces += 1,
            b'}' if parens == 0 => {
                if braces == 0 {
                    return None;
                }
                braces -= 1;
                if braces == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod position_tests {
        use super::*;

        #[test]
        fn first_line_offsets() {
            assert_eq!(byte_offset_to_position("hello", 0), (1, 1));
            assert_eq!(byte_offset_to_position("hello", 3), (1, 4));
        }

        #[test]
        fn offsets_after_newlines() {
            let text = "a\nbc\ndef";
            assert_eq!(byte_offset_to_position(text, 2), (2, 1));
            assert_eq!(byte_offset_to_position(text, 6), (3, 2));
        }

        #[test]
        fn columns_count_characters() {
            // "é" is two bytes
            let text = "é op";
            assert_eq!(byte_offset_to_position(text, 3), (1, 3));
        }

        #[test]
        fn offset_past_end_clamps() {
            assert_eq!(byte_offset_to_position("ab", 99), (1, 3));
        }

        #[test]
        fn position_to_offset_inverts_conversion() {
            let text = "a\nbé op\ndef";
            for offset in [0, 2, 3, 6, 10] {
                let (line, col) = byte_offset_to_position(text, offset);
                assert_eq!(position_to_byte_offset(text, line, col), Some(offset));
            }
        }

        #[test]
        fn position_outside_text_is_none() {
            let text = "ab\ncd";
            assert_eq!(position_to_byte_offset(text, 3, 1), None);
            assert_eq!(position_to_byte_offset(text, 1, 9), None);
            assert_eq!(position_to_byte_offset(text, 0, 1), None);
            assert_eq!(position_to_byte_offset(text, 1, 3), Some(2));
        }
    }

    mod region_tests {
        use super::*;

        #[test]
        fn line_and_block_comments() {
            let text = "a // op\nb /* op */ c";
            let ranges = non_code_ranges(text);
            assert_eq!(ranges.len(), 2);
            assert_eq!(region_at(&ranges, text.find("op").unwrap() as u64), Region::Comment);
            assert_eq!(region_at(&ranges, text.rfind("op").unwrap() as u64), Region::Comment);
            assert_eq!(region_at(&ranges, text.find('c').unwrap() as u64), Region::Code);
        }

        #[test]
        fn string_and_char_literals() {
            let text = r#"x("op", '\'', op)"#;
            let ranges = non_code_ranges(text);
            assert_eq!(region_at(&ranges, 3), Region::Literal);
            assert_eq!(region_at(&ranges, text.rfind("op").unwrap() as u64), Region::Code);
        }

        #[test]
        fn escaped_quote_does_not_end_string() {
            let text = r#""a\"op" op"#;
            let ranges = non_code_ranges(text);
            assert_eq!(ranges.len(), 1);
            assert_eq!(region_at(&ranges, text.rfind("op").unwrap() as u64), Region::Code);
        }

        #[test]
        fn text_block_spans_lines() {
            let text = "\"\"\"\nop\n\"\"\" op";
            let ranges = non_code_ranges(text);
            assert_eq!(region_at(&ranges, 4), Region::Literal);
            assert_eq!(region_at(&ranges, text.rfind("op").unwrap() as u64), Region::Code);
        }

        #[test]
        fn unterminated_block_comment_runs_to_end() {
            let text = "a /* op";
            let ranges = non_code_ranges(text);
            assert_eq!(ranges[0].0, Span::new(2, 7));
        }
    }

    mod word_tests {
        use super::*;

        #[test]
        fn whole_words_only() {
            let text = "op opx xop op_ $op op";
            assert_eq!(find_word_occurrences(text, "op"), vec![0, 19]);
        }

        #[test]
        fn case_sensitive() {
            assert!(find_word_occurrences("Op OP", "op").is_empty());
        }

        #[test]
        fn empty_word_matches_nothing() {
            assert!(find_word_occurrences("anything", "").is_empty());
        }

        #[test]
        fn code_word_skips_comments() {
            let text = "// Impl\nclass Impl {}";
            assert_eq!(find_code_word(text, "Impl", 0), Some(14));
            assert_eq!(find_code_word(text, "Impl", 15), None);
        }
    }
    mod declaration_tests {
        use super::*;

        fn end_after(text: &str, name: &str) -> Option<usize> {
            let start = text.find(name).unwrap();
            declaration_end(text, start + name.len())
        }

        #[test]
        fn abstract_method_ends_at_semicolon() {
            let text = "interface Api {\n  void op(int a);\n  void next();\n}";
            assert_eq!(end_after(text, "op"), Some(text.find(';').unwrap() + 1));
        }

        #[test]
        fn body_ends_at_closing_brace() {
            let text = "class Impl {\n  void op(int a) { run(a); if (a > 0) { stop(); } }\n}";
            let end = end_after(text, "op").unwrap();
            assert_eq!(&text[end - 3..end], "} }");
            assert_eq!(&text[end..], "\n}");
        }

        #[test]
        fn braces_in_literals_and_comments_are_ignored() {
            let text = "class A { void op() { String s = \"}\"; /* } */ } int x; }";
            let end = end_after(text, "op").unwrap();
            assert_eq!(&text[end..], " int x; }");
        }

        #[test]
        fn braces_in_parameter_annotations_are_ignored() {
            let text = "class A { void op(@Tags({\"a\"}) int a) {} }";
            let end = end_after(text, "op").unwrap();
            assert_eq!(&text[end..], " }");
        }

        #[test]
        fn unclosed_declaration_is_none() {
            assert_eq!(end_after("class A { void op() }", "op"), None);
            assert_eq!(end_after("void op() { run();", "op"), None);
        }
    }
}
