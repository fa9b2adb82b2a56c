use clap::Parser;
use cli::Cli;
use ferrous_dig_domain::{DomainError, ResponseCode};
use output::Printer;
use std::process::ExitCode;
use tracing::debug;

mod bootstrap;
mod cli;
mod di;
mod output;

/// Exit status for bad input: flags, names, types, destinations, config.
const EXIT_USAGE: u8 = 1;
/// Exit status once a transport was involved and failed.
const EXIT_TRANSPORT: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&e);
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = bootstrap::load_config(cli.config.as_deref(), cli.overrides())?;
    bootstrap::init_logging(&config);

    let request = cli.lookup_request().map_err(anyhow::Error::msg)?;
    let use_cases = di::UseCases::new(&config);

    let outcome = use_cases.lookup.execute(&request).await?;
    let exchange = &outcome.exchange;

    if let Some(nameserver) = &outcome.system_nameserver {
        output::print_notes(&format!("will use system default nameserver: {}", nameserver));
    }
    if exchange.truncation_retried {
        output::print_notes(&format!(
            "truncated answer from {}, retried over {}",
            outcome.destination, exchange.answered_by
        ));
    }
    if exchange.response.rcode != ResponseCode::NoError {
        output::print_notes(&format!("server answered {}", exchange.response.rcode));
    }

    debug!(
        server = %exchange.answered_by,
        elapsed_ms = exchange.elapsed.as_millis() as u64,
        answers = exchange.response.answers.len(),
        "Lookup complete"
    );

    let printer = Printer::new(cli.output_mode(), cli.seconds);
    print!("{}", printer.render(&exchange.response)?);

    if cli.time {
        println!("Ran in {}ms", exchange.elapsed.as_millis());
    }

    Ok(())
}

fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<DomainError>() {
        Some(e) if e.is_transport_error() => EXIT_TRANSPORT,
        _ => EXIT_USAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_classes() {
        let transport = anyhow::Error::new(DomainError::Timeout {
            server: "udp://127.0.0.1:53".to_string(),
        });
        assert_eq!(exit_code(&transport), EXIT_TRANSPORT);

        let usage = anyhow::Error::new(DomainError::InvalidQueryType("BOGUS".to_string()));
        assert_eq!(exit_code(&usage), EXIT_USAGE);

        assert_eq!(exit_code(&anyhow::anyhow!("no query name given")), EXIT_USAGE);
    }
}
