//! `statuswait`: wait for a commit status context to finish, then report it.
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use envconfig::Envconfig;
use tracing_subscriber::EnvFilter;

use statuswait_core::app::StatusPoller;
use statuswait_core::domain::config::{DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use statuswait_core::domain::{PollConfig, RetryPolicy};
use statuswait_core::impls::{ActionsSink, GithubStatusSource};
use statuswait_core::ports::{EventSink, SystemClock};

mod config;
use config::Env;

/// Upper bound for `--retries`.
const MAX_RETRIES: u32 = 10;

#[derive(Parser, Debug)]
#[command(
    name = "statuswait",
    version,
    about = "Wait for a GitHub commit status context to reach a terminal state"
)]
struct Args {
    /// Context of the commit status to watch
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    context: String,

    /// Seconds to wait between polls
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_INTERVAL.as_secs(), value_parser = clap::value_parser!(u64).range(1..))]
    wait_interval: u64,

    /// Number of polls before timing out
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..))]
    count: u32,

    /// Commit SHA (or ref) whose statuses are queried
    #[arg(long = "ref", value_name = "REF", value_parser = NonEmptyStringValueParser::new())]
    reference: String,

    /// Per-request HTTP timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    request_timeout: u64,

    /// Retries for transient API errors, per query
    #[arg(
        long,
        value_name = "N",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_RETRIES))
    )]
    retries: u32,

    /// Emit debug diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    init_logging(args.verbose);

    let env = Env::init_from_env().context("invalid workflow environment")?;

    let exit_code = run(args, env).await?;
    Ok(ExitCode::from(exit_code))
}

/// Wire the poller to GitHub and the workflow files, run it, publish the
/// outcome once and return the process exit status.
async fn run(args: Args, env: Env) -> Result<u8> {
    let config = PollConfig::new(
        args.context.clone(),
        args.reference.clone(),
        Duration::from_secs(args.wait_interval),
        args.count,
    )
    .context("invalid poll parameters")?;

    let source = GithubStatusSource::new(
        &env.api_url,
        &env.repository,
        env.token.clone(),
        Duration::from_secs(args.request_timeout),
    )
    .context("failed to set up GitHub status source")?;

    let sink = Arc::new(ActionsSink::new(
        env.summary_path.clone(),
        env.output_path.clone(),
    ));

    let poller = StatusPoller::new(config, Arc::new(source), Arc::new(SystemClock), sink.clone())
        .with_retry_policy(RetryPolicy::default_cli().with_max_retries(args.retries));

    tracing::debug!(
        repository = %env.repository,
        worst_case_wait_secs = poller.config().worst_case_wait().as_secs(),
        "starting status poll"
    );

    let resolution = poller.run().await;
    sink.publish(resolution.outcome)
        .context("failed to write workflow output")?;

    Ok(resolution.exit_code())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug with `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use httpmock::prelude::*;
    use rstest::rstest;
    use serde_json::json;
    use std::fs;
    use std::path::Path;

    fn env_for(server: &MockServer, dir: &Path) -> Env {
        Env {
            repository: "octo/app".to_string(),
            api_url: server.base_url(),
            token: None,
            summary_path: Some(dir.join("summary.md")),
            output_path: Some(dir.join("output")),
        }
    }

    fn args_for(context: &str) -> Args {
        Args::try_parse_from([
            "statuswait",
            "--context",
            context,
            "--ref",
            "abc123",
            "--wait-interval",
            "1",
            "--retries",
            "0",
        ])
        .unwrap()
    }

    #[test]
    fn defaults_apply() {
        let args = Args::try_parse_from(["statuswait", "--context", "build", "--ref", "abc123"]).unwrap();
        assert_eq!(args.context, "build");
        assert_eq!(args.reference, "abc123");
        assert_eq!(args.wait_interval, DEFAULT_INTERVAL.as_secs());
        assert_eq!(args.wait_interval, 300);
        assert_eq!(args.count, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(args.request_timeout, 30);
        assert_eq!(args.retries, 3);
        assert!(!args.verbose);
    }

    #[test]
    fn accepts_explicit_values() {
        let args = Args::try_parse_from([
            "statuswait",
            "--context",
            "ci/build",
            "--wait-interval",
            "15",
            "--count",
            "4",
            "--ref",
            "deadbeef",
            "--retries",
            "0",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.wait_interval, 15);
        assert_eq!(args.count, 4);
        assert_eq!(args.retries, 0);
        assert!(args.verbose);
    }

    #[rstest]
    #[case::non_integer_interval(&["--wait-interval", "soon"])]
    #[case::negative_interval(&["--wait-interval", "-5"])]
    #[case::zero_interval(&["--wait-interval", "0"])]
    #[case::non_integer_count(&["--count", "many"])]
    #[case::zero_count(&["--count", "0"])]
    #[case::negative_retries(&["--retries", "-1"])]
    #[case::too_many_retries(&["--retries", "11"])]
    fn rejects_malformed_numbers(#[case] extra: &[&str]) {
        let mut argv = vec!["statuswait", "--context", "build", "--ref", "abc123"];
        argv.extend_from_slice(extra);
        let err = Args::try_parse_from(argv).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ValueValidation | ErrorKind::InvalidValue | ErrorKind::UnknownArgument
        ));
        assert_eq!(err.exit_code(), 2);
    }

    #[rstest]
    #[case::missing_context(&["statuswait", "--ref", "abc123"])]
    #[case::missing_ref(&["statuswait", "--context", "build"])]
    #[case::empty_context(&["statuswait", "--context", "", "--ref", "abc123"])]
    fn rejects_missing_required_flags(#[case] argv: &[&str]) {
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn retries_accept_the_upper_bound() {
        let args = Args::try_parse_from([
            "statuswait", "--context", "build", "--ref", "abc123", "--retries", "10",
        ])
        .unwrap();
        assert_eq!(args.retries, MAX_RETRIES);
    }

    #[rstest]
    #[case::success("build", json!([{ "state": "success", "context": "build" }]), "success", 0)]
    #[case::failure("build", json!([{ "state": "error", "context": "build" }]), "failure", 1)]
    #[case::not_started("build", json!([]), "not_found", 1)]
    #[case::mismatch("build", json!([{ "state": "success", "context": "test" }]), "not_found", 1)]
    #[tokio::test]
    async fn run_publishes_result_once_and_returns_exit_code(
        #[case] context: &str,
        #[case] body: serde_json::Value,
        #[case] result: &str,
        #[case] exit_code: u8,
    ) {
        let server = MockServer::start_async().await;
        let statuses = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/app/statuses/abc123");
                then.status(200).json_body(body.clone());
            })
            .await;
        let dir = tempfile::tempdir().unwrap();

        let code = run(args_for(context), env_for(&server, dir.path())).await.unwrap();

        assert_eq!(code, exit_code);
        statuses.assert_hits_async(1).await;
        let output = fs::read_to_string(dir.path().join("output")).unwrap();
        assert_eq!(output, format!("result={result}\n"));
        let summary = fs::read_to_string(dir.path().join("summary.md")).unwrap();
        assert!(summary.starts_with("api call to "));
    }

    #[tokio::test]
    async fn rejected_credentials_fail_the_run() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/app/statuses/abc123");
                then.status(401).json_body(json!({ "message": "Bad credentials" }));
            })
            .await;
        let dir = tempfile::tempdir().unwrap();

        let code = run(args_for("build"), env_for(&server, dir.path())).await.unwrap();

        assert_eq!(code, 1);
        let output = fs::read_to_string(dir.path().join("output")).unwrap();
        assert_eq!(output, "result=failure\n");
    }

    #[tokio::test]
    async fn malformed_repository_is_a_setup_error() {
        let server = MockServer::start_async().await;
        let dir = tempfile::tempdir().unwrap();
        let env = Env {
            repository: "no-slash".to_string(),
            ..env_for(&server, dir.path())
        };

        assert!(run(args_for("build"), env).await.is_err());
        assert!(!dir.path().join("output").exists());
    }
}
