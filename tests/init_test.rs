use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[ctor::ctor]
fn init_tests() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

#[test]
fn it_parses_with_logging_enabled() {
    let specs =
        sysdoc::analyzer::parsers::pmlogger::parse("log mandatory on once hinv.ncpu").unwrap();
    assert_eq!(specs.len(), 1);
}
