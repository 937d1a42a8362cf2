//! # Parser Combinators
//!
//! This module implements the generic combinators that compose parsers into
//! larger ones. None of them mutate their sub-parsers; each constructor builds
//! a new parser value that owns its children.
//!
//! ## Combinator Types
//!
//! * **Basic Combinators**: `Equal`, `Satisfy`, `Success`, `Fail`
//! * **Sequential Combinators**: `Tuple2`, `Tuple3`, `Preceded`, `Terminated`, `Delimited`
//! * **Alternative Combinators**: `Or`, `Choice`
//! * **Repetition Combinators**: `Many`, `Many1`, `SeparatedList`
//! * **Optional Combinators**: `Optional`, `OptionalOr`, `Not`
//! * **Transformation Combinators**: `Map`, `MapRes`, `AsUnit`
//! * **Indirection**: `Lazy`, `Forward`, `ForwardRef`
//! * **Error Handling Combinators**: `WithContext`
//!
//! Alternation follows the furthest-failure policy: when every branch fails,
//! the failure that got furthest into the input is reported.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, Weak};

use once_cell::sync::OnceCell;

use super::core::{BoxedParser, DefinitionError, ParseError, ParseResult, Parser, Stream};

/// Equal: Matches a specific item in the input
///
/// This parser succeeds if the current input item equals the specified value.
/// It consumes one item from the input on success.
#[derive(Clone)]
pub struct Equal<I> {
    value: I,
}

impl<I> Equal<I> {
    pub fn new(value: I) -> Self {
        Self { value }
    }
}

impl<I: Clone + PartialEq + fmt::Debug> Parser<I, I> for Equal<I> {
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<I> {
        match input.get(pos) {
            Some(found) if *found == self.value => Ok((pos + 1, found.clone())),
            Some(found) => input.fail(ParseError::Unexpected {
                expected: format!("{:?}", self.value),
                found: format!("{:?}", found),
                position: pos,
                context: None,
            }),
            None => input.fail(ParseError::UnexpectedEOF {
                expected: format!("{:?}", self.value),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Satisfy: Consumes one item if the predicate accepts it
///
/// The predicate returns `Some(output)` to accept the item. `description`
/// names what was expected when it is rejected.
#[derive(Clone)]
pub struct Satisfy<I, O, F> {
    description: String,
    f: F,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O, F> Satisfy<I, O, F>
where
    F: Fn(&I) -> Option<O>,
{
    pub fn new(description: impl Into<String>, f: F) -> Self {
        Self {
            description: description.into(),
            f,
            _phantom: PhantomData,
        }
    }
}

impl<I, O, F> Parser<I, O> for Satisfy<I, O, F>
where
    I: fmt::Debug,
    F: Fn(&I) -> Option<O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        match input.get(pos) {
            Some(item) => match (self.f)(item) {
                Some(result) => Ok((pos + 1, result)),
                None => input.fail(ParseError::Unexpected {
                    expected: self.description.clone(),
                    found: format!("{:?}", item),
                    position: pos,
                    context: None,
                }),
            },
            None => input.fail(ParseError::UnexpectedEOF {
                expected: self.description.clone(),
                position: pos,
                context: None,
            }),
        }
    }
}

/// Success: Always succeeds with a clone of `value`, consuming nothing
#[derive(Clone)]
pub struct Success<I, O> {
    value: O,
    _phantom: PhantomData<I>,
}

impl<I, O> Success<I, O> {
    pub fn new(value: O) -> Self {
        Self {
            value,
            _phantom: PhantomData,
        }
    }
}

impl<I, O: Clone> Parser<I, O> for Success<I, O> {
    fn parse(&self, _input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        Ok((pos, self.value.clone()))
    }
}

/// Fail: Always fails with the given message
#[derive(Clone)]
pub struct Fail<I, O> {
    message: String,
    _phantom: PhantomData<(I, O)>,
}

impl<I, O> Fail<I, O> {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl<I, O> Parser<I, O> for Fail<I, O> {
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        input.fail(ParseError::failure(self.message.clone(), pos))
    }
}

/// Or: Ordered choice between two parsers of the same output type
///
/// `second` is tried from the saved position only when `first` fails.
#[derive(Clone)]
pub struct Or<P1, P2, I, O> {
    first: P1,
    second: P2,
    _phantom: PhantomData<(I, O)>,
}

impl<P1, P2, I, O> Or<P1, P2, I, O> {
    pub fn new(first: P1, second: P2) -> Self {
        Self {
            first,
            second,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O> Parser<I, O> for Or<P1, P2, I, O>
where
    P1: Parser<I, O>,
    P2: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        match self.first.parse(input, pos) {
            Ok(result) => Ok(result),
            Err(first_error) => match self.second.parse(input, pos) {
                Ok(result) => Ok(result),
                Err(second_error) => Err(first_error.furthest(second_error)),
            },
        }
    }
}

/// Choice: Tries multiple parsers and succeeds with the first successful one
///
/// This parser tries each of its child parsers in order from the same saved
/// position and returns the result of the first one that succeeds. If all
/// parsers fail, the furthest failure among them is returned.
pub struct Choice<I, O> {
    parsers: Vec<BoxedParser<I, O>>,
}

impl<I, O> Choice<I, O> {
    pub fn new(parsers: Vec<BoxedParser<I, O>>) -> Self {
        Self { parsers }
    }
}

impl<I, O> Parser<I, O> for Choice<I, O> {
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        let mut failure: Option<ParseError> = None;
        for parser in &self.parsers {
            match parser.parse(input, pos) {
                Ok(result) => return Ok(result),
                Err(e) => {
                    failure = Some(match failure {
                        Some(previous) => previous.furthest(e),
                        None => e,
                    });
                }
            }
        }
        Err(failure.unwrap_or(ParseError::NoAlternative {
            expected: Vec::new(),
            position: pos,
            context: None,
        }))
    }
}

/// Preceded: Runs both parsers in sequence and keeps the second result
#[derive(Clone)]
pub struct Preceded<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Preceded<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, O2> for Preceded<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O2> {
        let (pos, _) = self.parser1.parse(input, pos)?;
        self.parser2.parse(input, pos)
    }
}

/// Terminated: Runs both parsers in sequence and keeps the first result
#[derive(Clone)]
pub struct Terminated<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Terminated<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, O1> for Terminated<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O1> {
        let (pos, result) = self.parser1.parse(input, pos)?;
        let (pos, _) = self.parser2.parse(input, pos)?;
        Ok((pos, result))
    }
}

/// Tuple2: Runs both parsers in sequence and keeps both results as a pair
#[derive(Clone)]
pub struct Tuple2<P1, P2, I, O1, O2> {
    parser1: P1,
    parser2: P2,
    _phantom: PhantomData<(I, O1, O2)>,
}

impl<P1, P2, I, O1, O2> Tuple2<P1, P2, I, O1, O2> {
    pub fn new(parser1: P1, parser2: P2) -> Self {
        Self {
            parser1,
            parser2,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, I, O1, O2> Parser<I, (O1, O2)> for Tuple2<P1, P2, I, O1, O2>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<(O1, O2)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        Ok((pos, (result1, result2)))
    }
}

#[derive(Clone)]
pub struct Tuple3<P1, P2, P3, I, O1, O2, O3> {
    parser1: P1,
    parser2: P2,
    parser3: P3,
    _phantom: PhantomData<(I, O1, O2, O3)>,
}

impl<P1, P2, P3, I, O1, O2, O3> Tuple3<P1, P2, P3, I, O1, O2, O3> {
    pub fn new(parser1: P1, parser2: P2, parser3: P3) -> Self {
        Self {
            parser1,
            parser2,
            parser3,
            _phantom: PhantomData,
        }
    }
}

impl<P1, P2, P3, I, O1, O2, O3> Parser<I, (O1, O2, O3)> for Tuple3<P1, P2, P3, I, O1, O2, O3>
where
    P1: Parser<I, O1>,
    P2: Parser<I, O2>,
    P3: Parser<I, O3>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<(O1, O2, O3)> {
        let (pos, result1) = self.parser1.parse(input, pos)?;
        let (pos, result2) = self.parser2.parse(input, pos)?;
        let (pos, result3) = self.parser3.parse(input, pos)?;
        Ok((pos, (result1, result2, result3)))
    }
}

/// Delimited: Parses content between left and right delimiters
///
/// Only the content parser's result is returned.
#[derive(Clone)]
pub struct Delimited<L, P, R, I, OL, O, OR> {
    left: L,
    parser: P,
    right: R,
    _phantom: PhantomData<(I, OL, O, OR)>,
}

impl<L, P, R, I, OL, O, OR> Delimited<L, P, R, I, OL, O, OR> {
    pub fn new(left: L, parser: P, right: R) -> Self {
        Self {
            left,
            parser,
            right,
            _phantom: PhantomData,
        }
    }
}

impl<L, P, R, I, OL, O, OR> Parser<I, O> for Delimited<L, P, R, I, OL, O, OR>
where
    L: Parser<I, OL>,
    P: Parser<I, O>,
    R: Parser<I, OR>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        let (pos, _) = self.left.parse(input, pos)?;
        let (pos, value) = self.parser.parse(input, pos)?;
        let (pos, _) = self.right.parse(input, pos)?;
        Ok((pos, value))
    }
}

/// Map: Transforms the output of a parser using a function
///
/// Failures pass through unchanged.
#[derive(Clone)]
pub struct Map<P, F, I, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(I, A, B)>,
}

impl<P, F, I, A, B> Map<P, F, I, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<P, F, I, A, B> Parser<I, B> for Map<P, F, I, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> B,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<B> {
        self.parser
            .parse(input, pos)
            .map(|(pos, value)| (pos, (self.f)(value)))
    }
}

/// MapRes: Transforms the output with a fallible function
///
/// A rejected value becomes a failure at the position the inner parser
/// started from, so alternatives can still be tried.
#[derive(Clone)]
pub struct MapRes<P, F, I, A, B> {
    parser: P,
    f: F,
    _phantom: PhantomData<(I, A, B)>,
}

impl<P, F, I, A, B> MapRes<P, F, I, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> Result<B, String>,
{
    pub fn new(parser: P, f: F) -> Self {
        Self {
            parser,
            f,
            _phantom: PhantomData,
        }
    }
}

impl<P, F, I, A, B> Parser<I, B> for MapRes<P, F, I, A, B>
where
    P: Parser<I, A>,
    F: Fn(A) -> Result<B, String>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<B> {
        let (new_pos, value) = self.parser.parse(input, pos)?;
        match (self.f)(value) {
            Ok(mapped) => Ok((new_pos, mapped)),
            Err(message) => input.fail(ParseError::failure(message, pos)),
        }
    }
}

#[derive(Clone)]
pub struct AsUnit<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> AsUnit<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, ()> for AsUnit<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<()> {
        self.parser.parse(input, pos).map(|(pos, _)| (pos, ()))
    }
}

/// Many: Applies a parser zero or more times
///
/// This parser repeatedly applies the inner parser until it fails,
/// collecting all successful results into a vector. It always succeeds,
/// leaving the position right after the last successful match. An iteration
/// that succeeds without consuming input ends the repetition.
#[derive(Clone)]
pub struct Many<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, Vec<O>> for Many<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<Vec<O>> {
        let mut results = Vec::new();
        let current_pos = collect_repeated(&self.parser, input, pos, &mut results);
        Ok((current_pos, results))
    }
}

/// Many1: Applies a parser one or more times
///
/// Similar to Many, but requires the inner parser to succeed at least once.
#[derive(Clone)]
pub struct Many1<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Many1<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, Vec<O>> for Many1<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<Vec<O>> {
        let (new_pos, first) = self.parser.parse(input, pos)?;
        let mut results = vec![first];
        if new_pos == pos {
            return Ok((new_pos, results));
        }
        let current_pos = collect_repeated(&self.parser, input, new_pos, &mut results);
        Ok((current_pos, results))
    }
}

fn collect_repeated<P, I, O>(
    parser: &P,
    input: &Stream<'_, I>,
    pos: usize,
    results: &mut Vec<O>,
) -> usize
where
    P: Parser<I, O>,
{
    let mut current_pos = pos;
    loop {
        match parser.parse(input, current_pos) {
            Ok((new_pos, value)) => {
                results.push(value);
                if new_pos == current_pos {
                    break;
                }
                current_pos = new_pos;
            }
            Err(e) => {
                tracing::trace!(
                    target: "parser::many",
                    error = %e,
                    position = current_pos,
                    items_collected = results.len(),
                    "repetition stopped"
                );
                break;
            }
        }
    }
    current_pos
}

/// SeparatedList: Parses one or more items separated by a delimiter
///
/// One item is required. After it, the separator and another item are
/// parsed repeatedly; when the separator matches but no item follows, the
/// position is restored to before that separator and the list ends there.
/// Separator values are discarded.
pub struct SeparatedList<P, S, I, O, OS> {
    item_parser: P,
    separator_parser: S,
    _phantom: PhantomData<(I, O, OS)>,
}

impl<P, S, I, O, OS> SeparatedList<P, S, I, O, OS> {
    pub fn new(item_parser: P, separator_parser: S) -> Self {
        Self {
            item_parser,
            separator_parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, S, I, O, OS> Parser<I, Vec<O>> for SeparatedList<P, S, I, O, OS>
where
    P: Parser<I, O>,
    S: Parser<I, OS>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<Vec<O>> {
        let (mut current_pos, first) = self.item_parser.parse(input, pos)?;
        let mut results = vec![first];

        while let Ok((sep_pos, _)) = self.separator_parser.parse(input, current_pos) {
            match self.item_parser.parse(input, sep_pos) {
                Ok((new_pos, value)) if new_pos > current_pos => {
                    results.push(value);
                    current_pos = new_pos;
                }
                _ => break,
            }
        }

        Ok((current_pos, results))
    }
}

/// Optional: Returns `Some` on success and `None` without consuming on failure
#[derive(Clone)]
pub struct Optional<P, I, O> {
    parser: P,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Optional<P, I, O> {
    pub fn new(parser: P) -> Self {
        Self {
            parser,
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, Option<O>> for Optional<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<Option<O>> {
        match self.parser.parse(input, pos) {
            Ok((new_pos, value)) => Ok((new_pos, Some(value))),
            Err(e) => {
                tracing::trace!(
                    target: "parser::optional",
                    error = %e,
                    position = pos,
                    "optional parser fell back"
                );
                Ok((pos, None))
            }
        }
    }
}

/// OptionalOr: Like `Optional`, but yields a clone of `default` on failure
#[derive(Clone)]
pub struct OptionalOr<P, I, O> {
    parser: P,
    default: O,
    _phantom: PhantomData<I>,
}

impl<P, I, O> OptionalOr<P, I, O> {
    pub fn new(parser: P, default: O) -> Self {
        Self {
            parser,
            default,
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, O> for OptionalOr<P, I, O>
where
    P: Parser<I, O>,
    O: Clone,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        match self.parser.parse(input, pos) {
            Ok(result) => Ok(result),
            Err(_) => Ok((pos, self.default.clone())),
        }
    }
}

/// Not: Negative lookahead
///
/// Succeeds without consuming input when the inner parser fails, and fails
/// with `unexpected <description>` when it matches.
#[derive(Clone)]
pub struct Not<P, I, O> {
    parser: P,
    description: String,
    _phantom: PhantomData<(I, O)>,
}

impl<P, I, O> Not<P, I, O> {
    pub fn new(parser: P, description: impl Into<String>) -> Self {
        Self {
            parser,
            description: description.into(),
            _phantom: PhantomData,
        }
    }
}

impl<P, I, O> Parser<I, ()> for Not<P, I, O>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<()> {
        match input.quietly(|| self.parser.parse(input, pos)) {
            Ok(_) => input.fail(ParseError::failure(
                format!("unexpected {}", self.description),
                pos,
            )),
            Err(_) => Ok((pos, ())),
        }
    }
}

#[derive(Clone)]
pub struct WithContext<P, C> {
    parser: P,
    context: C,
}

impl<P, C> WithContext<P, C> {
    pub fn new(parser: P, context: C) -> Self {
        Self { parser, context }
    }
}

impl<I, O, P, C: ToString> Parser<I, O> for WithContext<P, C>
where
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        self.parser
            .parse(input, pos)
            .map_err(|e| e.with_context(&self.context.to_string()))
    }
}

/// Lazy: Builds the inner parser on every use
#[derive(Clone)]
pub struct Lazy<F> {
    f: F,
}

impl<F> Lazy<F> {
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<I, O, F, P> Parser<I, O> for Lazy<F>
where
    F: Fn() -> P,
    P: Parser<I, O>,
{
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        (self.f)().parse(input, pos)
    }
}

/// Forward: A parser declared before its definition exists
///
/// The `Forward` owns its cell and is the value to keep as the grammar root.
/// Rules that refer back to it embed a [`ForwardRef`] from
/// [`handle`](Forward::handle), which holds the cell weakly, so a
/// self-referential grammar is freed with its owner.
pub struct Forward<I, O> {
    name: Arc<str>,
    cell: Arc<OnceCell<BoxedParser<I, O>>>,
}

impl<I, O> Clone for Forward<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            cell: Arc::clone(&self.cell),
        }
    }
}

impl<I, O> Forward<I, O> {
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_defined(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Weak reference for use inside the forward's own definition.
    pub fn handle(&self) -> ForwardRef<I, O> {
        ForwardRef {
            name: Arc::clone(&self.name),
            cell: Arc::downgrade(&self.cell),
        }
    }

    /// Fills the cell. A forward parser can be defined exactly once.
    pub fn define<P>(&self, parser: P) -> Result<(), DefinitionError>
    where
        P: Parser<I, O> + Send + Sync + 'static,
    {
        self.cell
            .set(Box::new(parser))
            .map_err(|_| DefinitionError::AlreadyDefined(self.name.to_string()))
    }
}

impl<I, O> Parser<I, O> for Forward<I, O> {
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        parse_through(&self.cell, &self.name, input, pos)
    }
}

fn parse_through<I, O>(
    cell: &OnceCell<BoxedParser<I, O>>,
    name: &str,
    input: &Stream<'_, I>,
    pos: usize,
) -> ParseResult<O> {
    match cell.get() {
        Some(parser) => parser.parse(input, pos),
        None => input.fail(ParseError::failure(
            format!("definition of `{}`", name),
            pos,
        )),
    }
}

/// ForwardRef: A non-owning reference to a [`Forward`] cell
///
/// Fails like an undefined forward once the owning `Forward` is dropped.
pub struct ForwardRef<I, O> {
    name: Arc<str>,
    cell: Weak<OnceCell<BoxedParser<I, O>>>,
}

impl<I, O> Clone for ForwardRef<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            cell: Weak::clone(&self.cell),
        }
    }
}

impl<I, O> ForwardRef<I, O> {
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }
}

impl<I, O> Parser<I, O> for ForwardRef<I, O> {
    fn parse(&self, input: &Stream<'_, I>, pos: usize) -> ParseResult<O> {
        match self.cell.upgrade() {
            Some(cell) => parse_through(&cell, &self.name, input, pos),
            None => input.fail(ParseError::failure(
                format!("definition of `{}` (dropped)", self.name),
                pos,
            )),
        }
    }
}
