//! # sysdoc: Structured Documents from System Text
//!
//! sysdoc turns the loosely structured text printed by system commands and
//! written in daemon configuration files into uniform document trees that
//! analysis code can consume without knowing the original format.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Raw Text → Grammar → Native Value → Document → ResultSet
//! ```
//!
//! ### Stage 1: Grammar
//!
//! The [`analyzer`] module provides a parser-combinator engine. Grammars are
//! assembled once from primitives ([`analyzer::primitives`]) and combinators
//! ([`analyzer::combinators`]) and then run over any number of inputs. A
//! failed run reports the furthest position any alternative reached, with
//! what was expected there.
//!
//! The `pmlogger(1)` configuration grammar in
//! [`analyzer::parsers::pmlogger`] is the reference grammar and exercises
//! every combinator.
//!
//! ### Stage 2: Document
//!
//! [`document::Document`] builds an immutable mapping/sequence/scalar tree
//! from a parsed value. The root may carry a [`provenance::Provenance`], a
//! weak link back to the record it was derived from.
//!
//! ### Stage 3: ResultSet
//!
//! [`result_set::ResultSet`] collects one document per discovered instance
//! (per disk, per interface, per log specification) and implements the
//! "first non-empty producer wins" fallback rule.
//!
//! ## Configuration
//!
//! [`config::ParserConfig`] controls comment markers, end-of-line handling
//! and diagnostic snippet width.

pub mod analyzer;
pub mod config;
pub mod document;
pub mod error;
pub mod provenance;
pub mod result_set;

// Re-exports
pub use analyzer::{GrammarError, Location, ParseError, Parser};
pub use config::ParserConfig;
pub use document::{Document, DocumentError, Node, NodeKind, Scalar, ScalarKind};
pub use error::*;
pub use provenance::Provenance;
pub use result_set::ResultSet;
