//! # Parser Combinators
//!
//! A small combinator engine over a character (or any item) stream.
//!
//! * [`core`]: the [`Parser`] trait, the [`Stream`] cursor and the errors
//! * [`primitives`]: literals, character classes, quoted strings, line ends
//! * [`combinators`]: sequencing, alternation, repetition and mapping
//! * [`prelude`]: constructor functions and [`ParserExt`](prelude::ParserExt)
//! * [`parsers`]: grammars built on top of the engine
//!
//! Parsers hold no state between runs. A grammar is built once, shared
//! freely between threads and run with [`parse_text`].

pub mod combinators;
pub mod core;
pub mod parsers;
pub mod prelude;
pub mod primitives;

pub use core::{
    parse_text, parse_text_with, BoxedParser, DefinitionError, GrammarError, Location, ParseError,
    ParseResult, Parser, Stream,
};
