//! # pmlogger configuration grammar
//!
//! Parses the logging specifications of a `pmlogger(1)` configuration file:
//!
//! ```text
//! [log] mandatory on every 10 minutes {
//!     disk.all.write
//!     network.interface.in.packets [ "et0" ]
//! }
//! ```
//!
//! Words are separated by spaces, tabs or newlines and `#` starts a comment
//! running to the end of the line. Every token is wrapped on both sides by
//! one shared whitespace parser, so comments may appear between any two
//! tokens. The `[access]` section and `pmcpp` directives (`%include`,
//! `%ifdef`) are not part of this grammar and make the parse fail.

use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Serialize;

use crate::analyzer::core::{parse_text_with, BoxedParser, GrammarError, Parser};
use crate::analyzer::prelude::*;
use crate::config::{ConfigError, ParserConfig};
use crate::error::InternalResult;

/// Characters allowed in metric and instance names.
pub const NAME_CHARS: &str =
    "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789-._";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LogState {
    MandatoryOn,
    MandatoryOff,
    MandatoryMaybe,
    AdvisoryOn,
    AdvisoryOff,
}

impl LogState {
    pub fn is_on(&self) -> bool {
        matches!(self, LogState::MandatoryOn | LogState::AdvisoryOn)
    }

    pub fn is_mandatory(&self) -> bool {
        matches!(
            self,
            LogState::MandatoryOn | LogState::MandatoryOff | LogState::MandatoryMaybe
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
}

impl TimeUnit {
    const KEYWORDS: &'static [(&'static str, TimeUnit)] = &[
        ("milliseconds", TimeUnit::Millisecond),
        ("millisecond", TimeUnit::Millisecond),
        ("msecs", TimeUnit::Millisecond),
        ("msec", TimeUnit::Millisecond),
        ("seconds", TimeUnit::Second),
        ("second", TimeUnit::Second),
        ("secs", TimeUnit::Second),
        ("sec", TimeUnit::Second),
        ("minutes", TimeUnit::Minute),
        ("minute", TimeUnit::Minute),
        ("mins", TimeUnit::Minute),
        ("min", TimeUnit::Minute),
        ("hours", TimeUnit::Hour),
        ("hour", TimeUnit::Hour),
    ];

    pub fn duration(&self, count: u64) -> Duration {
        match self {
            TimeUnit::Millisecond => Duration::from_millis(count),
            TimeUnit::Second => Duration::from_secs(count),
            TimeUnit::Minute => Duration::from_secs(count.saturating_mul(60)),
            TimeUnit::Hour => Duration::from_secs(count.saturating_mul(3600)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    Once,
    Default,
    Every { count: u64, unit: Option<TimeUnit> },
}

impl Interval {
    /// The logging period, when the interval names one explicitly.
    pub fn period(&self) -> Option<Duration> {
        match self {
            Interval::Every {
                count,
                unit: Some(unit),
            } => Some(unit.duration(*count)),
            _ => None,
        }
    }
}

/// An element of a `[ ... ]` instance list.
///
/// Numbers are internal instance identifiers; names and strings are external
/// instance names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InstanceName {
    Internal(u64),
    External(String),
}

/// Metric name to its instance list; an empty list means all instances.
pub type MetricSpecs = IndexMap<String, Vec<InstanceName>>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogSpec {
    /// Whether the optional leading `log` keyword was written.
    pub log_keyword: bool,
    pub state: LogState,
    /// Present exactly for the `on` states.
    pub interval: Option<Interval>,
    pub metrics: MetricSpecs,
}

lazy_static! {
    static ref GRAMMAR: BoxedParser<char, Vec<LogSpec>> = build(&ParserConfig::default());
}

/// Parses a whole configuration with the default settings.
#[tracing::instrument(level = "debug", skip(text))]
pub fn parse(text: &str) -> Result<Vec<LogSpec>, GrammarError> {
    let specs = parse_text(&*GRAMMAR, text)?;
    tracing::debug!(count = specs.len(), "parsed pmlogger specifications");
    Ok(specs)
}

/// Parses a whole configuration with a grammar built from `config`.
///
/// Fails with a config error before parsing if `config` is invalid.
#[tracing::instrument(level = "debug", skip(text, config))]
pub fn parse_with(text: &str, config: &ParserConfig) -> InternalResult<Vec<LogSpec>> {
    let grammar = grammar(config)?;
    Ok(parse_text_with(&grammar, text, config.snippet_width)?)
}

/// Builds the grammar: any number of specifications, then end of input.
pub fn grammar(config: &ParserConfig) -> Result<BoxedParser<char, Vec<LogSpec>>, ConfigError> {
    config.validate()?;
    Ok(build(config))
}

fn build(config: &ParserConfig) -> BoxedParser<char, Vec<LogSpec>> {
    let ws = whitespace(&config.comment_marker, config.eol);
    Arc::clone(&ws)
        .ignore_then(log_spec(&ws).many())
        .then_ignore(eof().with_context("log specification"))
        .boxed()
}

fn log_spec(ws: &Whitespace) -> impl Parser<char, LogSpec> + Send + Sync {
    let log = kw(ws, "log")
        .optional()
        .map(|log: Option<String>| log.is_some());
    let on = on_state(ws)
        .then(interval(ws).with_context("logging interval"))
        .map(|(state, interval): (LogState, Interval)| (state, Some(interval)));
    let other = other_state(ws).map(|state: LogState| (state, None));

    log.then(on.or(other))
        .then(metric_specs(ws))
        .map(
            |((log_keyword, (state, interval)), metrics): (
                (bool, (LogState, Option<Interval>)),
                MetricSpecs,
            )| LogSpec {
                log_keyword,
                state,
                interval,
                metrics,
            },
        )
}

fn kw(ws: &Whitespace, word: &str) -> impl Parser<char, String> + Send + Sync {
    token(ws, keyword(word, NAME_CHARS))
}

fn state(
    ws: &Whitespace,
    first: &str,
    second: &str,
    value: LogState,
) -> BoxedParser<char, LogState> {
    kw(ws, first)
        .then(kw(ws, second))
        .map(move |_: (String, String)| value)
        .boxed()
}

fn on_state(ws: &Whitespace) -> impl Parser<char, LogState> + Send + Sync {
    choice(vec![
        state(ws, "mandatory", "on", LogState::MandatoryOn),
        state(ws, "advisory", "on", LogState::AdvisoryOn),
    ])
}

fn other_state(ws: &Whitespace) -> impl Parser<char, LogState> + Send + Sync {
    choice(vec![
        state(ws, "mandatory", "maybe", LogState::MandatoryMaybe),
        state(ws, "mandatory", "off", LogState::MandatoryOff),
        state(ws, "advisory", "off", LogState::AdvisoryOff),
    ])
}

fn time_unit() -> impl Parser<char, TimeUnit> + Send + Sync {
    choice(
        TimeUnit::KEYWORDS
            .iter()
            .map(|(word, unit)| {
                keyword(word, NAME_CHARS)
                    .map(move |_: String| *unit)
                    .boxed()
            })
            .collect(),
    )
}

/// Digits that do not run into a name, so `10x` is not a count.
fn count() -> impl Parser<char, u64> + Send + Sync {
    unsigned_int().then_ignore(not(char_in(NAME_CHARS), "name character"))
}

fn interval(ws: &Whitespace) -> impl Parser<char, Interval> + Send + Sync {
    let once = kw(ws, "once").map(|_: String| Interval::Once);
    let default = kw(ws, "default").map(|_: String| Interval::Default);
    let every = kw(ws, "every")
        .optional()
        .ignore_then(token(ws, count()).then(token(ws, time_unit()).optional()))
        .map(|(count, unit): (u64, Option<TimeUnit>)| Interval::Every { count, unit });
    once.or(default).or(every)
}

fn name(ws: &Whitespace) -> impl Parser<char, String> + Send + Sync {
    token(ws, string_of(NAME_CHARS))
}

fn punct(ws: &Whitespace, c: &str) -> impl Parser<char, char> + Send + Sync {
    token(ws, char_in(c))
}

/// Comma or plain whitespace between list elements.
fn separator(ws: &Whitespace) -> impl Parser<char, ()> + Send + Sync {
    punct(ws, ",").as_unit().or(Arc::clone(ws))
}

fn instance_name(ws: &Whitespace) -> impl Parser<char, InstanceName> + Send + Sync {
    token(
        ws,
        quoted_string()
            .map(InstanceName::External)
            .or(count().map(InstanceName::Internal))
            .or(string_of(NAME_CHARS).map(InstanceName::External)),
    )
}

fn instance_names(ws: &Whitespace) -> impl Parser<char, Vec<InstanceName>> + Send + Sync {
    delimited(
        punct(ws, "["),
        instance_name(ws).sep_by(separator(ws)),
        punct(ws, "]").with_context("instance list"),
    )
}

fn metric_spec(ws: &Whitespace) -> impl Parser<char, (String, Vec<InstanceName>)> + Send + Sync {
    name(ws).then(instance_names(ws).opt_or(Vec::new()))
}

fn metric_specs(ws: &Whitespace) -> impl Parser<char, MetricSpecs> + Send + Sync {
    let single = metric_spec(ws).map(|spec: (String, Vec<InstanceName>)| vec![spec]);
    let block = delimited(
        punct(ws, "{"),
        metric_spec(ws).sep_by(separator(ws)),
        punct(ws, "}").with_context("metric block"),
    );
    single
        .or(block)
        .map(|specs: Vec<(String, Vec<InstanceName>)>| {
            specs.into_iter().collect::<MetricSpecs>()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LOG_SPEC: &str = r#"
log mandatory on every 5 hinv.ncpu # single metric spec without brackets
log mandatory on once { hinv.ncpu hinv.ndisk }
log mandatory on every 10 minutes {
    disk.all.write
    disk.all.read
    network.interface.in.packets [ "et0" ]
    network.interface.out.packets [ "et0" ]
    nfs.server.reqs [ "lookup" "getattr" "read" "write" ]
}
log mandatory on default {
    disk.all.write
    disk.all.read
    network.interface.in.packets [ "et0" ]
    network.interface.out.packets [ "et0" ]
    nfs.server.reqs [ "lookup" "getattr" "read" "write" ]
}

# this is a comment
log advisory on every 30 minutes { # this is another comment
    environ.temp
    pmcd.pdu_in.total
    pmcd.pdu_out.total
}
"#;

    fn external(names: &[&str]) -> Vec<InstanceName> {
        names
            .iter()
            .map(|n| InstanceName::External(n.to_string()))
            .collect()
    }

    #[test]
    fn test_single_metric_without_braces() {
        let specs = parse("log mandatory on every 5 hinv.ncpu").unwrap();
        assert_eq!(
            specs,
            vec![LogSpec {
                log_keyword: true,
                state: LogState::MandatoryOn,
                interval: Some(Interval::Every {
                    count: 5,
                    unit: None
                }),
                metrics: IndexMap::from([("hinv.ncpu".to_string(), vec![])]),
            }]
        );
    }

    #[test]
    fn test_block_of_metrics() {
        let specs = parse("log mandatory on once { hinv.ncpu hinv.ndisk }").unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].interval, Some(Interval::Once));
        assert_eq!(
            specs[0].metrics,
            IndexMap::from([
                ("hinv.ncpu".to_string(), vec![]),
                ("hinv.ndisk".to_string(), vec![]),
            ])
        );
    }

    #[test]
    fn test_instance_list() {
        let specs =
            parse(r#"log mandatory on 2 sec { network.interface.in.packets [ "et0" ] }"#).unwrap();
        assert_eq!(
            specs[0].metrics["network.interface.in.packets"],
            external(&["et0"])
        );
    }

    #[test]
    fn test_reference_configuration() {
        let specs = parse(LOG_SPEC).unwrap();
        assert_eq!(specs.len(), 5);

        assert_eq!(
            specs[2].interval,
            Some(Interval::Every {
                count: 10,
                unit: Some(TimeUnit::Minute)
            })
        );
        assert_eq!(
            specs[2].metrics["nfs.server.reqs"],
            external(&["lookup", "getattr", "read", "write"])
        );
        assert_eq!(specs[3].interval, Some(Interval::Default));
        assert_eq!(specs[4].state, LogState::AdvisoryOn);
        assert_eq!(
            specs[4].metrics.keys().collect::<Vec<_>>(),
            vec!["environ.temp", "pmcd.pdu_in.total", "pmcd.pdu_out.total"]
        );
        assert_eq!(
            specs[4].interval.and_then(|i| i.period()),
            Some(Duration::from_secs(30 * 60))
        );
    }

    #[test]
    fn test_off_states_take_no_interval() {
        let text = "mandatory off hinv.ncpu\nadvisory off { a, b }\nmandatory maybe c";
        let specs = parse(text).unwrap();
        assert_eq!(
            specs.iter().map(|s| s.state).collect::<Vec<_>>(),
            vec![
                LogState::MandatoryOff,
                LogState::AdvisoryOff,
                LogState::MandatoryMaybe
            ]
        );
        assert!(specs.iter().all(|s| s.interval.is_none() && !s.log_keyword));
        assert_eq!(specs[1].metrics.len(), 2);
    }

    #[test]
    fn test_instance_identifiers() {
        let specs = parse("log advisory on once m [ 1, 23 \"q\" cpu0 ]").unwrap();
        assert_eq!(
            specs[0].metrics["m"],
            vec![
                InstanceName::Internal(1),
                InstanceName::Internal(23),
                InstanceName::External("q".to_string()),
                InstanceName::External("cpu0".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_between_tokens() {
        let text = "log # a\n mandatory # b\n on # c\n once # d\n { # e\n x # f\n } # g";
        let specs = parse(text).unwrap();
        assert_eq!(specs[0].metrics.len(), 1);
    }

    #[test]
    fn test_empty_and_comment_only_input() {
        assert_eq!(parse("").unwrap(), vec![]);
        assert_eq!(parse("  # nothing to log\n\n").unwrap(), vec![]);
    }

    #[test]
    fn test_trailing_garbage_fails() {
        let error = parse("log mandatory on once hinv.ncpu }").unwrap_err();
        assert_eq!(error.location.line, 1);
        assert_eq!(error.location.column, 33);
        assert_eq!(error.found, "}");
    }

    #[test]
    fn test_access_section_is_rejected() {
        let text = format!("{}\n[access]\nallow localhost : mandatory, advisory;\n", LOG_SPEC);
        assert!(parse(&text).is_err());
    }

    #[test]
    fn test_missing_interval_reports_position() {
        let error = parse("log mandatory on { a }").unwrap_err();
        assert_eq!(error.location.column, 18);
        assert!(error.expected.contains("\"once\""), "{}", error.expected);
    }

    #[test]
    fn test_unclosed_block_reports_furthest_failure() {
        let error = parse("log mandatory on once { a b\n").unwrap_err();
        // the block got to the end of the input before failing
        assert_eq!(error.location.line, 2);
        assert!(
            error.expected.contains(r#"character in "}""#),
            "{}",
            error.expected
        );
    }

    #[test]
    fn test_parse_with_config() {
        let config = ParserConfig {
            comment_marker: "//".to_string(),
            ..ParserConfig::default()
        };
        let specs = parse_with("log mandatory on once x // note", &config).unwrap();
        assert_eq!(specs.len(), 1);
        assert!(parse_with("log mandatory on once x # note", &config).is_err());
    }

    #[test]
    fn test_invalid_config_is_rejected_before_parsing() {
        let config = ParserConfig {
            comment_marker: String::new(),
            ..ParserConfig::default()
        };
        assert!(matches!(
            grammar(&config),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            parse_with("this is not a pmlogger config }}}", &config),
            Err(crate::Error::Config(ConfigError::Invalid(_)))
        ));
    }

    #[test]
    fn test_error_location_with_carriage_returns() {
        let error = parse("log mandatory on once a\rlog mandatory on once b\r}").unwrap_err();
        assert_eq!(error.location.line, 3);
        assert_eq!(error.location.column, 1);
    }
}
