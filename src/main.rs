mod error;

use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand, ValueEnum};
use easymirror_config::Config;
use easymirror_pipeline::{Context, MirroringService, inbox_status};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Mirrors Dataset Version Exports into a sharded store and builds
/// metadata-only deposits for first versions.
#[derive(Debug, Parser)]
#[command(name = "easymirror", version, about)]
struct Cli {
    /// Configuration file; defaults to `config.yml` in the platform's
    /// configuration directory.
    #[arg(short, long, env = "EASYMIRROR_CONFIG", global = true)]
    config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = LogFormat::Plain, global = true)]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand, PartialEq, Eq)]
enum Command {
    /// Watch the inboxes until interrupted.
    Run,
    /// Report, per inbox, whether anything is waiting in it.
    Health,
    /// Load and validate the configuration, then exit.
    CheckConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Plain,
    Json,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_format);
    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = ?e, "{e}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Plain => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    match cli.command {
        Command::Run => run(&config).await,
        Command::Health => health(&config).await,
        Command::CheckConfig => check_config(&config),
    }
}

async fn run(config: &Config) -> Result<()> {
    let service = MirroringService::from_config(config).or_raise(|| ErrorKind::Startup)?;
    let stopper = service.stopper();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutting down; letting running tasks finish");
        stopper.cancel();
    });
    service.run().await.or_raise(|| ErrorKind::Service)
}

async fn health(config: &Config) -> Result<()> {
    let mut unreadable = 0;
    for inbox in &config.mirroring.inboxes {
        match inbox_status(&inbox.path).await {
            Ok(status) => {
                let state = if status.is_empty() { "empty" } else { "non-empty" };
                println!("{}\t{state}\t{}", status.path.display(), status.entries);
            },
            Err(e) => {
                tracing::error!(inbox = %inbox.path.display(), error = ?e, "Inbox unreadable");
                unreadable += 1;
            },
        }
    }
    if unreadable > 0 {
        exn::bail!(ErrorKind::Health);
    }
    Ok(())
}

/// Also builds the processing context, so a broken template is caught too.
fn check_config(config: &Config) -> Result<()> {
    Context::from_config(config).or_raise(|| ErrorKind::Config)?;
    for inbox in &config.mirroring.inboxes {
        println!("{}\tcutoff {}", inbox.path.display(), inbox.cutoff);
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Could not listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };
    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::warn!(error = %e, "Could not listen for SIGTERM");
                std::future::pending::<()>().await;
            },
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["easymirror", "run"], Command::Run)]
    #[case(&["easymirror", "health"], Command::Health)]
    #[case(&["easymirror", "check-config"], Command::CheckConfig)]
    fn parses_commands(#[case] args: &[&str], #[case] expected: Command) {
        assert_eq!(Cli::try_parse_from(args).unwrap().command, expected);
    }

    #[test]
    fn global_options_go_anywhere() {
        let cli = Cli::try_parse_from(["easymirror", "run", "--config", "/etc/easymirror.yml", "--log-format", "json"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/etc/easymirror.yml")));
        assert_eq!(cli.log_format, LogFormat::Json);
    }

    #[test]
    fn a_command_is_required() {
        assert!(Cli::try_parse_from(["easymirror"]).is_err());
    }
}
