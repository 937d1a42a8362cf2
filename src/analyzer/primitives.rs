//! # Text Primitives
//!
//! Atomic parsers over a character stream. Each primitive either consumes a
//! prefix of the input or fails without consuming anything.

use serde::{Deserialize, Serialize};

use super::core::{ParseError, ParseResult, Parser, Stream};

/// Succeeds if the input at the current position starts with `text`.
#[derive(Debug, Clone)]
pub struct Literal {
    text: String,
}

impl Literal {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl Parser<char, String> for Literal {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<String> {
        if input.starts_with(pos, &self.text) {
            return Ok((pos + self.text.chars().count(), self.text.clone()));
        }
        let expected = format!("{:?}", self.text);
        if input.at_end(pos) {
            input.fail(ParseError::UnexpectedEOF {
                expected,
                position: pos,
                context: None,
            })
        } else {
            input.fail(ParseError::Unexpected {
                expected,
                found: format!("{:?}", input.snippet(pos, self.text.chars().count())),
                position: pos,
                context: None,
            })
        }
    }
}

/// Single character that is (or, when negated, is not) a member of a set.
#[derive(Debug, Clone)]
pub struct CharClass {
    set: String,
    negated: bool,
}

impl CharClass {
    pub fn new(set: &str) -> Self {
        Self {
            set: set.to_string(),
            negated: false,
        }
    }

    pub fn negated(set: &str) -> Self {
        Self {
            set: set.to_string(),
            negated: true,
        }
    }

    pub fn matches(&self, c: char) -> bool {
        self.set.contains(c) != self.negated
    }

    fn description(&self) -> String {
        if self.negated {
            format!("character not in {:?}", self.set)
        } else {
            format!("character in {:?}", self.set)
        }
    }
}

impl Parser<char, char> for CharClass {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<char> {
        match input.get(pos) {
            Some(c) if self.matches(*c) => Ok((pos + 1, *c)),
            Some(c) => input.fail(ParseError::Unexpected {
                expected: self.description(),
                found: format!("{:?}", c),
                position: pos,
                context: None,
            }),
            None => input.fail(ParseError::UnexpectedEOF {
                expected: self.description(),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Maximal munch: the longest non-empty run of characters from a class.
#[derive(Debug, Clone)]
pub struct CharRun {
    class: CharClass,
}

impl CharRun {
    pub fn new(class: CharClass) -> Self {
        Self { class }
    }
}

impl Parser<char, String> for CharRun {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<String> {
        let run: String = input.items()[pos.min(input.len())..]
            .iter()
            .take_while(|c| self.class.matches(**c))
            .collect();
        if run.is_empty() {
            // delegate so the failure carries the class description
            let error = self
                .class
                .parse(input, pos)
                .err()
                .unwrap_or_else(|| ParseError::failure("character run", pos));
            return Err(error);
        }
        Ok((pos + run.chars().count(), run))
    }
}

/// A string between matching `"` or `'` delimiters, with escapes resolved.
///
/// Recognized escapes are `\n`, `\t`, `\r`, `\0`, `\\`, `\"` and `\'`. Any
/// other escaped character is kept verbatim along with its backslash.
#[derive(Debug, Clone, Default)]
pub struct QuotedString;

impl QuotedString {
    pub const DELIMITERS: &'static str = "\"'";

    fn unescape(c: char) -> Option<char> {
        match c {
            'n' => Some('\n'),
            't' => Some('\t'),
            'r' => Some('\r'),
            '0' => Some('\0'),
            '\\' => Some('\\'),
            '"' => Some('"'),
            '\'' => Some('\''),
            _ => None,
        }
    }
}

impl Parser<char, String> for QuotedString {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<String> {
        let (mut current, delimiter) = CharClass::new(Self::DELIMITERS)
            .parse(input, pos)
            .map_err(|e| e.with_context("quoted string"))?;
        let mut value = String::new();
        loop {
            match input.get(current) {
                Some(c) if *c == delimiter => return Ok((current + 1, value)),
                Some('\\') => match input.get(current + 1) {
                    Some(escaped) => {
                        match Self::unescape(*escaped) {
                            Some(resolved) => value.push(resolved),
                            None => {
                                value.push('\\');
                                value.push(*escaped);
                            }
                        }
                        current += 2;
                    }
                    None => break,
                },
                Some(c) => {
                    value.push(*c);
                    current += 1;
                }
                None => break,
            }
        }
        input.fail(ParseError::UnexpectedEOF {
            expected: format!("closing quote {:?}", delimiter),
            position: pos,
            context: Some("quoted string".to_string()),
        })
    }
}

/// Whether an end-of-line may also be satisfied by the end of the input.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EolPolicy {
    /// Only `\r\n`, `\n` or `\r` match.
    #[default]
    NewlineOnly,
    /// A newline sequence, or the true end of input (consuming nothing).
    AllowEndOfInput,
}

/// One newline sequence.
#[derive(Debug, Clone, Default)]
pub struct Eol {
    policy: EolPolicy,
}

impl Eol {
    pub fn new(policy: EolPolicy) -> Self {
        Self { policy }
    }
}

impl Parser<char, ()> for Eol {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<()> {
        match (input.get(pos), input.get(pos + 1)) {
            (Some('\r'), Some('\n')) => Ok((pos + 2, ())),
            (Some('\n'), _) | (Some('\r'), _) => Ok((pos + 1, ())),
            (None, _) if self.policy == EolPolicy::AllowEndOfInput => Ok((pos, ())),
            (None, _) => input.fail(ParseError::UnexpectedEOF {
                expected: "end of line".to_string(),
                position: pos,
                context: None,
            }),
            (Some(c), _) => input.fail(ParseError::Unexpected {
                expected: "end of line".to_string(),
                found: format!("{:?}", c),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Succeeds only at the true end of input.
#[derive(Debug, Clone, Default)]
pub struct Eof;

impl Parser<char, ()> for Eof {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<()> {
        match input.get(pos) {
            None => Ok((pos, ())),
            Some(_) => input.fail(ParseError::Unexpected {
                expected: "end of input".to_string(),
                found: format!("{:?}", input.snippet(pos, 16)),
                position: pos,
                context: None,
            }),
        }
    }
}

/// `marker` and the rest of the line, excluding the newline.
///
/// Yields the comment text after the marker.
#[derive(Debug, Clone)]
pub struct OneLineComment {
    marker: Literal,
}

impl OneLineComment {
    pub fn new(marker: &str) -> Self {
        Self {
            marker: Literal::new(marker),
        }
    }
}

impl Parser<char, String> for OneLineComment {
    fn parse(&self, input: &Stream<'_, char>, pos: usize) -> ParseResult<String> {
        let (start, _) = self.marker.parse(input, pos)?;
        let text: String = input.items()[start..]
            .iter()
            .take_while(|c| **c != '\n' && **c != '\r')
            .collect();
        Ok((start + text.chars().count(), text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run<O>(parser: &impl Parser<char, O>, text: &str) -> ParseResult<O> {
        let chars: Vec<char> = text.chars().collect();
        let stream = Stream::new(&chars);
        parser.parse(&stream, 0)
    }

    #[test]
    fn test_literal() {
        let parser = Literal::new("log");
        assert_eq!(run(&parser, "log on"), Ok((3, "log".to_string())));
        assert!(matches!(
            run(&parser, "lo"),
            Err(ParseError::Unexpected { position: 0, .. })
        ));
        assert!(matches!(
            run(&parser, ""),
            Err(ParseError::UnexpectedEOF { position: 0, .. })
        ));
    }

    #[test]
    fn test_literal_counts_characters() {
        let parser = Literal::new("größe");
        assert_eq!(run(&parser, "größe!"), Ok((5, "größe".to_string())));
    }

    #[test]
    fn test_char_class() {
        let brace = CharClass::new("{}");
        assert_eq!(run(&brace, "}x"), Ok((1, '}')));
        assert!(run(&brace, "x").is_err());
        let not_space = CharClass::negated(" ");
        assert_eq!(run(&not_space, "a"), Ok((1, 'a')));
        assert!(run(&not_space, " ").is_err());
    }

    #[test]
    fn test_char_run_is_maximal() {
        let digits = CharRun::new(CharClass::new("0123456789"));
        assert_eq!(run(&digits, "2048 kB"), Ok((4, "2048".to_string())));
        let error = run(&digits, "kB").unwrap_err();
        assert_eq!(error.get_position(), 0);
        assert_eq!(error.expected(), "character in \"0123456789\"");
    }

    #[test]
    fn test_quoted_string() {
        assert_eq!(
            run(&QuotedString, r#""et0" rest"#),
            Ok((5, "et0".to_string()))
        );
        assert_eq!(
            run(&QuotedString, r#"'it\'s\n' x"#),
            Ok((9, "it's\n".to_string()))
        );
        assert_eq!(
            run(&QuotedString, r#""C:\dir""#),
            Ok((8, "C:\\dir".to_string()))
        );
        assert_eq!(run(&QuotedString, r#""""#), Ok((2, String::new())));
    }

    #[test]
    fn test_quoted_string_unterminated() {
        let error = run(&QuotedString, r#""open"#).unwrap_err();
        assert_eq!(error.get_position(), 0);
        assert_eq!(error.expected(), "closing quote '\"'");
        assert!(run(&QuotedString, "plain").is_err());
    }

    #[test]
    fn test_eol() {
        let eol = Eol::default();
        assert_eq!(run(&eol, "\r\nx"), Ok((2, ())));
        assert_eq!(run(&eol, "\nx"), Ok((1, ())));
        assert_eq!(run(&eol, "\rx"), Ok((1, ())));
        assert!(run(&eol, "x").is_err());
        assert!(run(&eol, "").is_err());
        assert_eq!(
            run(&Eol::new(EolPolicy::AllowEndOfInput), ""),
            Ok((0, ()))
        );
    }

    #[test]
    fn test_eof() {
        assert_eq!(run(&Eof, ""), Ok((0, ())));
        assert!(run(&Eof, " ").is_err());
    }

    #[test]
    fn test_one_line_comment() {
        let comment = OneLineComment::new("#");
        assert_eq!(
            run(&comment, "# note\nlog"),
            Ok((6, " note".to_string()))
        );
        assert_eq!(run(&comment, "#"), Ok((1, String::new())));
        assert!(run(&comment, "log # note").is_err());
    }
}
