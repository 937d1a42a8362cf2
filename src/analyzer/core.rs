//! # Core Parser Definitions
//!
//! This module defines the fundamental parser interface, the input stream the
//! parsers run over, and the error types that form the foundation of the
//! combinator engine.

use std::cell::{Cell, RefCell};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

/// Number of characters shown after the failure point in a [`GrammarError`].
pub const DEFAULT_SNIPPET_WIDTH: usize = 24;

/// Parser trait defines the core parsing interface.
///
/// All parsers in the system implement this trait, which takes the input
/// stream and a position, and returns either a success result with a new
/// position and output value, or a parse error.
///
/// A failed parse never advances the caller's position: the position lives in
/// the caller, so backtracking is simply retrying with the saved value.
///
/// # Type Parameters
///
/// * `I` - The input item type (`char` for text grammars)
/// * `O` - The output value type
pub trait Parser<I, O> {
    /// Attempts to parse the input starting at the given position.
    ///
    /// # Returns
    ///
    /// * `Ok((new_pos, output))` - If parsing succeeds
    /// * `Err(error)` - If parsing fails; the error carries the position reached
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O>;
}

/// Result type for parsing operations.
///
/// On success, returns a tuple of the new position and the parsed value.
/// On failure, returns a ParseError.
pub type ParseResult<O> = Result<(usize, O), ParseError>;

/// Type-erased parser, shareable across threads once built.
pub type BoxedParser<I, O> = Box<dyn Parser<I, O> + Send + Sync>;

impl<I, O, P> Parser<I, O> for &P
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        (**self).parse(input, pos)
    }
}

impl<I, O, P> Parser<I, O> for Box<P>
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        (**self).parse(input, pos)
    }
}

impl<I, O, P> Parser<I, O> for Arc<P>
where
    P: Parser<I, O> + ?Sized,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        (**self).parse(input, pos)
    }
}

/// Error type for parsing operations.
///
/// Every variant carries the position at which the failure was detected and
/// an optional context chain added by `with_context`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Unexpected end of input
    #[error("Unexpected EOF: expected {expected} at position {position}, context: {context:?}")]
    UnexpectedEOF {
        expected: String,
        position: usize,
        context: Option<String>,
    },
    /// Unexpected item
    #[error(
        "Unexpected: expected {expected}, found {found} at position {position}, \
         context: {context:?}"
    )]
    Unexpected {
        expected: String,
        found: String,
        position: usize,
        context: Option<String>,
    },
    /// No alternative matched
    #[error(
        "No alternative: expected one of {} at position {position}, context: {context:?}",
        .expected.join(", ")
    )]
    NoAlternative {
        expected: Vec<String>,
        position: usize,
        context: Option<String>,
    },
    /// Explicit failure
    #[error("Failure: {message} at position {position}, context: {context:?}")]
    Failure {
        message: String,
        position: usize,
        context: Option<String>,
    },
}

impl ParseError {
    pub fn failure(message: impl Into<String>, position: usize) -> Self {
        ParseError::Failure {
            message: message.into(),
            position,
            context: None,
        }
    }

    pub fn with_context(self, ctx: &str) -> Self {
        let chain = |context: Option<String>| {
            Some(match context {
                Some(c) => format!("{} -> {}", c, ctx),
                None => ctx.to_string(),
            })
        };
        match self {
            ParseError::UnexpectedEOF {
                expected,
                position,
                context,
            } => ParseError::UnexpectedEOF {
                expected,
                position,
                context: chain(context),
            },
            ParseError::Unexpected {
                expected,
                found,
                position,
                context,
            } => ParseError::Unexpected {
                expected,
                found,
                position,
                context: chain(context),
            },
            ParseError::NoAlternative {
                expected,
                position,
                context,
            } => ParseError::NoAlternative {
                expected,
                position,
                context: chain(context),
            },
            ParseError::Failure {
                message,
                position,
                context,
            } => ParseError::Failure {
                message,
                position,
                context: chain(context),
            },
        }
    }

    pub fn get_position(&self) -> usize {
        match self {
            ParseError::UnexpectedEOF { position, .. } => *position,
            ParseError::Unexpected { position, .. } => *position,
            ParseError::NoAlternative { position, .. } => *position,
            ParseError::Failure { position, .. } => *position,
        }
    }

    pub fn get_context(&self) -> Option<&str> {
        match self {
            ParseError::UnexpectedEOF { context, .. }
            | ParseError::Unexpected { context, .. }
            | ParseError::NoAlternative { context, .. }
            | ParseError::Failure { context, .. } => context.as_deref(),
        }
    }

    /// The individual descriptions of what would have been accepted.
    pub fn expectations(&self) -> Vec<String> {
        match self {
            ParseError::UnexpectedEOF { expected, .. } => vec![expected.clone()],
            ParseError::Unexpected { expected, .. } => vec![expected.clone()],
            ParseError::NoAlternative { expected, .. } => expected.clone(),
            ParseError::Failure { message, .. } => vec![message.clone()],
        }
    }

    /// Human readable summary of [`ParseError::expectations`].
    pub fn expected(&self) -> String {
        let mut expectations = self.expectations();
        match expectations.len() {
            0 => "nothing".to_string(),
            1 => expectations.remove(0),
            _ => format!("one of {}", expectations.join(", ")),
        }
    }

    /// Combines two failures using the furthest-failure policy.
    ///
    /// The failure that got further into the input wins. Failures at the same
    /// position are merged into a single `NoAlternative` listing both sets of
    /// expectations.
    pub fn furthest(self, other: ParseError) -> ParseError {
        match self.get_position().cmp(&other.get_position()) {
            Ordering::Greater => self,
            Ordering::Less => other,
            Ordering::Equal if self == other => self,
            Ordering::Equal => {
                let position = self.get_position();
                let context = self
                    .get_context()
                    .or_else(|| other.get_context())
                    .map(str::to_string);
                let mut expected = self.expectations();
                for item in other.expectations() {
                    if !expected.contains(&item) {
                        expected.push(item);
                    }
                }
                if expected.len() == 1 {
                    // same expectation reported twice, keep the richer variant
                    return self;
                }
                ParseError::NoAlternative {
                    expected,
                    position,
                    context,
                }
            }
        }
    }
}

/// Input stream shared by all parsers during one parse run.
///
/// The items are immutable; the stream only remembers the furthest failure
/// any parser reported, so the top level can surface the most informative
/// diagnostic after backtracking has discarded it.
pub struct Stream<'a, I> {
    items: &'a [I],
    furthest: RefCell<Option<ParseError>>,
    quiet: Cell<u32>,
}

impl<'a, I> Stream<'a, I> {
    pub fn new(items: &'a [I]) -> Self {
        Self {
            items,
            furthest: RefCell::new(None),
            quiet: Cell::new(0),
        }
    }

    pub fn items(&self) -> &'a [I] {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<&'a I> {
        self.items.get(pos)
    }

    pub fn at_end(&self, pos: usize) -> bool {
        pos >= self.items.len()
    }

    /// Records `error` as a candidate diagnostic and returns it as a failure.
    pub fn fail<O>(&self, error: ParseError) -> ParseResult<O> {
        self.record(&error);
        Err(error)
    }

    pub fn record(&self, error: &ParseError) {
        if self.quiet.get() > 0 {
            return;
        }
        let mut slot = self.furthest.borrow_mut();
        let merged = match slot.take() {
            Some(previous) => previous.furthest(error.clone()),
            None => error.clone(),
        };
        *slot = Some(merged);
    }

    /// Runs `f` without recording failures, used by lookahead parsers whose
    /// inner failures are the expected outcome.
    pub fn quietly<T>(&self, f: impl FnOnce() -> T) -> T {
        self.quiet.set(self.quiet.get() + 1);
        let result = f();
        self.quiet.set(self.quiet.get() - 1);
        result
    }

    pub fn furthest_failure(&self) -> Option<ParseError> {
        self.furthest.borrow().clone()
    }
}

impl Stream<'_, char> {
    pub fn starts_with(&self, pos: usize, text: &str) -> bool {
        let mut offset = pos;
        for c in text.chars() {
            if self.items.get(offset) != Some(&c) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Up to `width` characters from `pos`, stopping at the end of the line.
    pub fn snippet(&self, pos: usize, width: usize) -> String {
        self.items
            .iter()
            .skip(pos)
            .take(width)
            .take_while(|c| **c != '\n' && **c != '\r')
            .collect()
    }

    pub fn location(&self, pos: usize) -> Location {
        let offset = pos.min(self.items.len());
        let mut line = 1;
        let mut column = 1;
        for (i, c) in self.items[..offset].iter().enumerate() {
            // `\r\n` counts once, at its `\n`; a lone `\r` is a break too
            let line_break = match c {
                '\n' => true,
                '\r' => self.items.get(i + 1) != Some(&'\n'),
                _ => false,
            };
            if line_break {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        Location {
            offset,
            line,
            column,
        }
    }
}

/// Cursor position resolved to line and column for diagnostics.
///
/// `offset` counts characters; `line` and `column` are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Location {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A text did not match a grammar.
///
/// This is the caller-facing form of a [`ParseError`]: the furthest failure
/// of the run, resolved to a [`Location`] with a snippet of the input found
/// there.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{location}: expected {expected}, found {found:?}")]
pub struct GrammarError {
    pub location: Location,
    pub expected: String,
    pub found: String,
    pub error: ParseError,
}

/// Errors raised while assembling a grammar, before any input is parsed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DefinitionError {
    #[error("forward parser `{0}` is already defined")]
    AlreadyDefined(String),
}

/// Runs `parser` over the whole of `text`.
///
/// The parser is responsible for anchoring itself with `eof()` when trailing
/// input must be rejected.
pub fn parse_text<O, P>(parser: &P, text: &str) -> Result<O, GrammarError>
where
    P: Parser<char, O> + ?Sized,
{
    parse_text_with(parser, text, DEFAULT_SNIPPET_WIDTH)
}

pub fn parse_text_with<O, P>(
    parser: &P,
    text: &str,
    snippet_width: usize,
) -> Result<O, GrammarError>
where
    P: Parser<char, O> + ?Sized,
{
    let chars: Vec<char> = text.chars().collect();
    let stream = Stream::new(&chars);
    match parser.parse(&stream, 0) {
        Ok((_, value)) => Ok(value),
        Err(error) => {
            // prefer the returned error unless something got further
            let error = match stream.furthest_failure() {
                Some(furthest) if furthest.get_position() > error.get_position() => furthest,
                _ => error,
            };
            let position = error.get_position();
            tracing::debug!(
                target: "parser::run",
                position,
                error = %error,
                "grammar did not match input"
            );
            Err(GrammarError {
                location: stream.location(position),
                expected: error.expected(),
                found: stream.snippet(position, snippet_width),
                error,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_furthest_prefers_position() {
        let near = ParseError::failure("near", 1);
        let far = ParseError::failure("far", 5);
        assert_eq!(near.clone().furthest(far.clone()), far);
        assert_eq!(far.clone().furthest(near), far);
    }

    #[test]
    fn test_furthest_merges_same_position() {
        let a = ParseError::failure("`a`", 3);
        let b = ParseError::failure("`b`", 3);
        let merged = a.furthest(b);
        assert_eq!(
            merged,
            ParseError::NoAlternative {
                expected: vec!["`a`".to_string(), "`b`".to_string()],
                position: 3,
                context: None,
            }
        );
        assert_eq!(merged.expected(), "one of `a`, `b`");
    }

    #[test]
    fn test_with_context_chains() {
        let error = ParseError::failure("x", 0)
            .with_context("inner")
            .with_context("outer");
        assert_eq!(error.get_context(), Some("inner -> outer"));
    }

    #[test]
    fn test_location() {
        let chars: Vec<char> = "ab\ncd\r\nef".chars().collect();
        let stream = Stream::new(&chars);
        assert_eq!(
            stream.location(0),
            Location {
                offset: 0,
                line: 1,
                column: 1
            }
        );
        assert_eq!(
            stream.location(4),
            Location {
                offset: 4,
                line: 2,
                column: 2
            }
        );
        assert_eq!(stream.location(8).line, 3);
        assert_eq!(stream.location(100).offset, chars.len());
    }

    #[test]
    fn test_location_counts_carriage_returns() {
        let chars: Vec<char> = "a\rb\r\nc\rd".chars().collect();
        let stream = Stream::new(&chars);
        assert_eq!(stream.location(2).line, 2);
        // between the `\r` and `\n` of one line break
        assert_eq!(stream.location(4).line, 2);
        assert_eq!(
            stream.location(6),
            Location {
                offset: 6,
                line: 3,
                column: 2
            }
        );
        assert_eq!(stream.location(8).line, 4);
    }

    #[test]
    fn test_quiet_suppresses_recording() {
        let chars: Vec<char> = "abc".chars().collect();
        let stream = Stream::new(&chars);
        stream.quietly(|| stream.record(&ParseError::failure("hidden", 2)));
        assert_eq!(stream.furthest_failure(), None);
        stream.record(&ParseError::failure("shown", 1));
        assert_eq!(stream.furthest_failure(), Some(ParseError::failure("shown", 1)));
    }

    #[test]
    fn test_snippet_stops_at_newline() {
        let chars: Vec<char> = "hello world\nnext".chars().collect();
        let stream = Stream::new(&chars);
        assert_eq!(stream.snippet(6, 24), "world");
        assert_eq!(stream.snippet(0, 4), "hell");
    }
}
