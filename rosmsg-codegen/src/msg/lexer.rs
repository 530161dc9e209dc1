//! Line classification for `.msg` sources
//!
//! The lexer turns raw text into a stream of [`SourceLine`]s, one per
//! declaration. Blank lines and comment-only lines never produce an item;
//! the leading comment block is recovered separately with [`leading_comment`].

use super::errors::{ParseError, ParseResult};
use super::validation::{
    ANNOTATION_DELIMITER, ARRAY_UPPER_BOUND_TOKEN, COMMENT_DELIMITER, CONSTANT_SEPARATOR,
    ENUM_ANNOTATION,
};

/// What a declaration line declares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `<type> <name> [<default>]`
    Field {
        /// Raw type token
        type_token: &'a str,
        /// Field name
        name: &'a str,
        /// Raw default value, if any
        default: Option<&'a str>,
    },
    /// `<type> <NAME> = <value>`
    Constant {
        /// Raw type token
        type_token: &'a str,
        /// Constant name
        name: &'a str,
        /// Raw value
        value: &'a str,
    },
    /// `@enum <Name>`
    EnumHeader {
        /// Enum name
        name: &'a str,
    },
}

/// A classified declaration line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLine<'a> {
    /// 1-based line number
    pub number: usize,
    /// The trimmed source text, comment included
    pub raw: &'a str,
    /// Classification
    pub kind: LineKind<'a>,
    /// Trailing comment, without the marker
    pub comment: Option<&'a str>,
    /// A blank line separates this line from the previous declaration
    pub follows_blank: bool,
}

/// Iterator over the declarations of a `.msg` source
///
/// Created by [`classify_lines`].
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    inner: std::iter::Enumerate<std::str::Lines<'a>>,
    pending_blank: bool,
}

/// Classify the lines of `source`
///
/// Each call returns a fresh iterator over the same text.
#[must_use]
pub fn classify_lines(source: &str) -> Lines<'_> {
    Lines {
        inner: source.lines().enumerate(),
        pending_blank: false,
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = ParseResult<SourceLine<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        for (index, line) in self.inner.by_ref() {
            let raw = line.trim();
            if raw.is_empty() {
                self.pending_blank = true;
                continue;
            }

            let (content, comment) = split_comment(raw);
            if content.is_empty() {
                continue;
            }

            let number = index + 1;
            let follows_blank = std::mem::take(&mut self.pending_blank);
            let line = classify(content).map(|kind| SourceLine {
                number,
                raw,
                kind,
                comment,
                follows_blank,
            });
            return Some(line.map_err(|e| e.at_line(number, raw)));
        }
        None
    }
}

impl std::iter::FusedIterator for Lines<'_> {}

/// Split a trimmed line at the first comment marker
fn split_comment(line: &str) -> (&str, Option<&str>) {
    match line.split_once(COMMENT_DELIMITER) {
        Some((content, comment)) => {
            let comment = comment.trim();
            (content.trim_end(), (!comment.is_empty()).then_some(comment))
        }
        None => (line, None),
    }
}

fn classify(content: &str) -> ParseResult<LineKind<'_>> {
    if content.starts_with(ANNOTATION_DELIMITER) {
        return classify_annotation(content);
    }

    match find_constant_separator(content) {
        Some(index) => classify_constant(&content[..index], &content[index + 1..]),
        None => classify_field(content),
    }
}

fn classify_annotation(content: &str) -> ParseResult<LineKind<'_>> {
    let mut tokens = content.split_whitespace();
    match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(ENUM_ANNOTATION), Some(name), None) => Ok(LineKind::EnumHeader { name }),
        (Some(ENUM_ANNOTATION), None, _) => Err(ParseError::InvalidEnum {
            reason: "'@enum' requires a name".to_string(),
        }),
        (Some(ENUM_ANNOTATION), Some(_), Some(extra)) => Err(ParseError::InvalidEnum {
            reason: format!("unexpected '{extra}' after enum name"),
        }),
        (annotation, _, _) => Err(ParseError::InvalidField {
            reason: format!("unknown annotation '{}'", annotation.unwrap_or(content)),
        }),
    }
}

/// Position of the `=` separating a constant's name from its value
///
/// An `=` that belongs to a `<=` bound is skipped, and the search stops at the
/// first quote so that `=` inside a string default is left alone.
fn find_constant_separator(content: &str) -> Option<usize> {
    let bound_start = ARRAY_UPPER_BOUND_TOKEN.as_bytes()[0];
    let bytes = content.as_bytes();
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'"' | b'\'' => return None,
            b if b == CONSTANT_SEPARATOR as u8
                && (index == 0 || bytes[index - 1] != bound_start) =>
            {
                return Some(index);
            }
            _ => {}
        }
    }
    None
}

fn classify_constant<'a>(declaration: &'a str, value: &'a str) -> ParseResult<LineKind<'a>> {
    let mut tokens = declaration.split_whitespace();
    let (Some(type_token), Some(name), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(ParseError::InvalidConstant {
            reason: "expected '<type> <NAME>=<value>'".to_string(),
        });
    };

    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::InvalidConstant {
            reason: format!("constant '{name}' has no value"),
        });
    }

    Ok(LineKind::Constant {
        type_token,
        name,
        value,
    })
}

fn classify_field(content: &str) -> ParseResult<LineKind<'_>> {
    let Some((type_token, rest)) = content.split_once(char::is_whitespace) else {
        return Err(ParseError::InvalidField {
            reason: format!("missing field name after type '{content}'"),
        });
    };

    let rest = rest.trim_start();
    let (name, default) = match rest.split_once(char::is_whitespace) {
        Some((name, default)) => (name, Some(default.trim())),
        None => (rest, None),
    };

    Ok(LineKind::Field {
        type_token,
        name,
        default,
    })
}

/// Leading comment block of a `.msg` source
///
/// Collects comment and blank lines before the first declaration. Blank lines
/// inside the block become paragraph breaks; empty lines at either end are
/// dropped. Returns `None` when there is no leading text.
#[must_use]
pub fn leading_comment(source: &str) -> Option<String> {
    let mut lines: Vec<&str> = Vec::new();
    for line in source.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.push("");
        } else if trimmed.starts_with(COMMENT_DELIMITER) {
            lines.push(trimmed.trim_start_matches(COMMENT_DELIMITER).trim());
        } else {
            break;
        }
    }

    let mut text = String::new();
    let mut paragraph_break = false;
    for line in lines {
        if line.is_empty() {
            paragraph_break = !text.is_empty();
            continue;
        }
        if paragraph_break {
            text.push_str("\n\n");
        } else if !text.is_empty() {
            text.push('\n');
        }
        paragraph_break = false;
        text.push_str(line);
    }

    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<LineKind<'_>> {
        classify_lines(source).map(|line| line.unwrap().kind).collect()
    }

    #[test]
    fn test_classify_field_and_constant() {
        let source = "int32 x\nuint8 MODE_IDLE=0\nfloat64 ratio 0.5\nstring NAME = \"a b\"\n";
        assert_eq!(
            kinds(source),
            vec![
                LineKind::Field {
                    type_token: "int32",
                    name: "x",
                    default: None,
                },
                LineKind::Constant {
                    type_token: "uint8",
                    name: "MODE_IDLE",
                    value: "0",
                },
                LineKind::Field {
                    type_token: "float64",
                    name: "ratio",
                    default: Some("0.5"),
                },
                LineKind::Constant {
                    type_token: "string",
                    name: "NAME",
                    value: "\"a b\"",
                },
            ]
        );
    }

    #[test]
    fn test_bounds_are_not_constant_separators() {
        assert_eq!(
            kinds("string<=10 label\nint32[<=5] values\nstring<=4 CODE=\"ab\""),
            vec![
                LineKind::Field {
                    type_token: "string<=10",
                    name: "label",
                    default: None,
                },
                LineKind::Field {
                    type_token: "int32[<=5]",
                    name: "values",
                    default: None,
                },
                LineKind::Constant {
                    type_token: "string<=4",
                    name: "CODE",
                    value: "\"ab\"",
                },
            ]
        );
    }

    #[test]
    fn test_equals_inside_string_default() {
        assert_eq!(
            kinds("string expr \"a=b\""),
            vec![LineKind::Field {
                type_token: "string",
                name: "expr",
                default: Some("\"a=b\""),
            }]
        );
    }

    #[test]
    fn test_comments_and_line_numbers() {
        let source = "# header\n\nint32 a # first\n# dropped\nint32 b ## second # extra\n";
        let lines: Vec<_> = classify_lines(source).map(Result::unwrap).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[0].comment, Some("first"));
        assert_eq!(lines[0].raw, "int32 a # first");
        assert_eq!(lines[1].number, 5);
        assert_eq!(lines[1].comment, Some("# second # extra"));
    }

    #[test]
    fn test_follows_blank() {
        let source = "uint8 A_X=0\n# note\nuint8 A_Y=1\n\nuint8 B_X=2\n";
        let flags: Vec<bool> = classify_lines(source)
            .map(|line| line.unwrap().follows_blank)
            .collect();
        assert_eq!(flags, vec![false, false, true]);
    }

    #[test]
    fn test_enum_header() {
        let lines: Vec<_> = classify_lines("@enum Color # palette\nuint8 RED=0")
            .map(Result::unwrap)
            .collect();
        assert_eq!(lines[0].kind, LineKind::EnumHeader { name: "Color" });
        assert_eq!(lines[0].comment, Some("palette"));
    }

    #[test]
    fn test_malformed_lines() {
        for (source, line) in [
            ("int32", 1),
            ("int32 a\n\nuint8 =3", 3),
            ("uint8 A=", 1),
            ("uint8 A B=1", 1),
            ("@enum", 1),
            ("@enum A B", 1),
            ("int32 a\n@optional", 2),
        ] {
            let err = classify_lines(source)
                .find_map(Result::err)
                .unwrap_or_else(|| panic!("no error for {source:?}"));
            assert_eq!(err.line(), Some(line), "{source:?}");
        }
    }

    #[test]
    fn test_iterator_is_restartable() {
        let source = "int32 a\nint32 b\n";
        assert_eq!(classify_lines(source).count(), 2);
        assert_eq!(classify_lines(source).count(), 2);
    }

    #[test]
    fn test_leading_comment() {
        let source =
            "\n# Robot state.\n#\n# Second paragraph\n# continues here.\n\nint32 a\n# not part\n";
        assert_eq!(
            leading_comment(source).as_deref(),
            Some("Robot state.\n\nSecond paragraph\ncontinues here.")
        );
        assert_eq!(leading_comment("int32 a # trailing"), None);
        assert_eq!(leading_comment(""), None);
    }
}
