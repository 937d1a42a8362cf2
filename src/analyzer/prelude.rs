//! Constructor functions and the [`ParserExt`] method set.
//!
//! Grammars are written with these instead of naming the combinator structs
//! directly.

use std::sync::Arc;

use super::combinators::*;
use super::core::{BoxedParser, Parser};
use super::primitives::*;

pub use super::core::{parse_text, parse_text_with, ParseError, ParseResult, Stream};
pub use super::primitives::EolPolicy;

pub const DIGITS: &str = "0123456789";
pub const ASCII_LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// Horizontal whitespace; line breaks are handled by [`eol`].
pub const INLINE_WHITESPACE: &str = " \t\u{0b}\u{0c}";

pub fn equal<I: Clone + PartialEq>(value: I) -> Equal<I> {
    Equal::new(value)
}

pub fn satisfy<I, O, F>(description: &str, f: F) -> Satisfy<I, O, F>
where
    F: Fn(&I) -> Option<O>,
{
    Satisfy::new(description, f)
}

pub fn success<I, O: Clone>(value: O) -> Success<I, O> {
    Success::new(value)
}

pub fn fail<I, O>(message: &str) -> Fail<I, O> {
    Fail::new(message)
}

pub fn choice<I, O>(parsers: Vec<BoxedParser<I, O>>) -> Choice<I, O> {
    Choice::new(parsers)
}

pub fn preceded<P1, P2, I, O1, O2>(parser1: P1, parser2: P2) -> Preceded<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Preceded::new(parser1, parser2)
}

pub fn terminated<P1, P2, I, O1, O2>(parser1: P1, parser2: P2) -> Terminated<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Terminated::new(parser1, parser2)
}

pub fn tuple2<P1, P2, I, O1, O2>(parser1: P1, parser2: P2) -> Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    Tuple2::new(parser1, parser2)
}

pub fn tuple3<P1, P2, P3, I, O1, O2, O3>(
    parser1: P1,
    parser2: P2,
    parser3: P3,
) -> Tuple3<P1, P2, P3, I, O1, O2, O3>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
{
    Tuple3::new(parser1, parser2, parser3)
}

pub fn delimited<L, P, R, I, OL, O, OR>(
    left: L,
    parser: P,
    right: R,
) -> Delimited<L, P, R, I, OL, O, OR>
where
    L: Parser<I, OL>,
    P: Parser<I, O>,
    R: Parser<I, OR>,
{
    Delimited::new(left, parser, right)
}

pub fn map<P, F, I, A, B>(parser: P, f: F) -> Map<P, F, I, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    Map::new(parser, f)
}

pub fn many<P, I, O>(parser: P) -> Many<P, I, O>
where
    P: Parser<I, O>,
{
    Many::new(parser)
}

pub fn many1<P, I, O>(parser: P) -> Many1<P, I, O>
where
    P: Parser<I, O>,
{
    Many1::new(parser)
}

pub fn sep_by<P, S, I, O, OS>(item_parser: P, separator_parser: S) -> SeparatedList<P, S, I, O, OS>
where
    P: Parser<I, O>,
    S: Parser<I, OS>,
{
    SeparatedList::new(item_parser, separator_parser)
}

pub fn optional<P, I, O>(parser: P) -> Optional<P, I, O>
where
    P: Parser<I, O>,
{
    Optional::new(parser)
}

pub fn opt<P, I, O>(parser: P, default: O) -> OptionalOr<P, I, O>
where
    P: Parser<I, O>,
    O: Clone,
{
    OptionalOr::new(parser, default)
}

pub fn not<P, I, O>(parser: P, description: &str) -> Not<P, I, O>
where
    P: Parser<I, O>,
{
    Not::new(parser, description)
}

pub fn with_context<P, I, O, C>(parser: P, c: C) -> WithContext<P, C>
where
    P: Parser<I, O>,
    C: ToString,
{
    WithContext::new(parser, c)
}

pub fn lazy<I, O, F, P>(f: F) -> Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    Lazy::new(f)
}

pub fn forward<I, O>(name: &str) -> Forward<I, O> {
    Forward::new(name)
}

pub fn literal(text: &str) -> Literal {
    Literal::new(text)
}

pub fn char_in(set: &str) -> CharClass {
    CharClass::new(set)
}

pub fn char_not_in(set: &str) -> CharClass {
    CharClass::negated(set)
}

pub fn string_of(set: &str) -> CharRun {
    CharRun::new(CharClass::new(set))
}

pub fn string_not_of(set: &str) -> CharRun {
    CharRun::new(CharClass::negated(set))
}

pub fn quoted_string() -> QuotedString {
    QuotedString
}

pub fn eol() -> Eol {
    Eol::default()
}

pub fn eol_with(policy: EolPolicy) -> Eol {
    Eol::new(policy)
}

pub fn eof() -> Eof {
    Eof
}

pub fn one_line_comment(marker: &str) -> OneLineComment {
    OneLineComment::new(marker)
}

pub fn ws_char() -> CharClass {
    char_in(INLINE_WHITESPACE)
}

/// Decimal digits as a `u64`; values that overflow are rejected.
pub fn unsigned_int() -> impl Parser<char, u64> + Clone + Send + Sync {
    string_of(DIGITS).try_map(|digits: String| {
        digits
            .parse::<u64>()
            .map_err(|e| format!("unsigned integer ({})", e))
    })
}

/// Shared insignificant-text parser: whitespace, line breaks and comments.
///
/// Built once and referenced by every token rule of a grammar.
pub type Whitespace = Arc<BoxedParser<char, ()>>;

pub fn whitespace(comment_marker: &str, eol_policy: EolPolicy) -> Whitespace {
    let piece = ws_char()
        .as_unit()
        .or(eol_with(eol_policy))
        .or(one_line_comment(comment_marker).as_unit());
    Arc::new(piece.many().as_unit().boxed())
}

/// Wraps `parser` with the shared whitespace parser on both sides.
pub fn token<P, O>(ws: &Whitespace, parser: P) -> impl Parser<char, O> + Send + Sync
where
    P: Parser<char, O> + Send + Sync,
    O: Send + Sync,
{
    delimited(Arc::clone(ws), parser, Arc::clone(ws))
}

/// A keyword literal that must not run into a following `word` character.
pub fn keyword(word: &str, word_chars: &str) -> impl Parser<char, String> + Send + Sync + Clone {
    literal(word).then_ignore(not(char_in(word_chars), "word character"))
}

/// Named-method forms of the combinators.
pub trait ParserExt<I, O>: Parser<I, O> + Sized {
    /// Pair of both results (`A + B`).
    fn then<P2, O2>(self, next: P2) -> Tuple2<Self, P2, I, O, O2>
    where
        P2: Parser<I, O2>,
    {
        Tuple2::new(self, next)
    }

    /// Keeps this result, discards `next`'s (`A << B`).
    fn then_ignore<P2, O2>(self, next: P2) -> Terminated<Self, P2, I, O, O2>
    where
        P2: Parser<I, O2>,
    {
        Terminated::new(self, next)
    }

    /// Discards this result, keeps `next`'s (`A >> B`).
    fn ignore_then<P2, O2>(self, next: P2) -> Preceded<Self, P2, I, O, O2>
    where
        P2: Parser<I, O2>,
    {
        Preceded::new(self, next)
    }

    /// Ordered alternation (`A | B`).
    fn or<P2>(self, other: P2) -> Or<Self, P2, I, O>
    where
        P2: Parser<I, O>,
    {
        Or::new(self, other)
    }

    fn map<F, B>(self, f: F) -> Map<Self, F, I, O, B>
    where
        F: Fn(O) -> B,
    {
        Map::new(self, f)
    }

    fn try_map<F, B>(self, f: F) -> MapRes<Self, F, I, O, B>
    where
        F: Fn(O) -> Result<B, String>,
    {
        MapRes::new(self, f)
    }

    fn as_unit(self) -> AsUnit<Self, I, O> {
        AsUnit::new(self)
    }

    fn many(self) -> Many<Self, I, O> {
        Many::new(self)
    }

    fn many1(self) -> Many1<Self, I, O> {
        Many1::new(self)
    }

    fn sep_by<S, OS>(self, separator: S) -> SeparatedList<Self, S, I, O, OS>
    where
        S: Parser<I, OS>,
    {
        SeparatedList::new(self, separator)
    }

    fn optional(self) -> Optional<Self, I, O> {
        Optional::new(self)
    }

    fn opt_or(self, default: O) -> OptionalOr<Self, I, O>
    where
        O: Clone,
    {
        OptionalOr::new(self, default)
    }

    fn with_context<C: ToString>(self, context: C) -> WithContext<Self, C> {
        WithContext::new(self, context)
    }

    fn boxed(self) -> BoxedParser<I, O>
    where
        Self: Send + Sync + 'static,
    {
        Box::new(self)
    }
}

impl<I, O, P> ParserExt<I, O> for P where P: Parser<I, O> {}
