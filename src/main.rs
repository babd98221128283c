use clap::Parser;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

use hirepass::cli::{execute_command, output, Cli, CliError};
use hirepass::config::Settings;
use hirepass::exitcode;
use hirepass::infrastructure::di::ServiceContainer;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let code = match run(&cli) {
        Ok(()) => exitcode::OK,
        Err(CliError::Refused(refusal)) => {
            output::warning(&refusal);
            exitcode::REFUSED
        }
        Err(e) => {
            output::error(&e);
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let mut settings = Settings::load()?;
    if let Some(dir) = &cli.data_dir {
        settings.data_dir = dir.clone();
    }
    tracing::debug!("data_dir: {}", settings.data_dir.display());

    let container = ServiceContainer::new(settings);
    execute_command(cli, &container)
}

fn setup_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    // RUST_LOG wins over -v
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();

    if level >= LevelFilter::DEBUG {
        tracing::debug!("Debug mode: {level}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn given_restore_with_negative_password_when_parsed_then_accepted() {
        let cli = Cli::try_parse_from(["hirepass", "restore", "3", "-42", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(hirepass::cli::Commands::Restore {
                index: 3,
                password: -42,
                yes: true
            })
        ));
    }

    #[test]
    fn given_non_numeric_password_when_parsed_then_rejected() {
        assert!(Cli::try_parse_from(["hirepass", "set", "1", "abc"]).is_err());
    }
}
