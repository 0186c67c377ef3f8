use clap::Parser;
use shop_journey::cli::commands::{cmd_personas, cmd_run};
use shop_journey::cli::config::{Cli, Commands, apply_overrides, load_config, log_directive};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_directive(cli.verbose)));
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }

    let config = apply_overrides(load_config(cli.config.as_deref()), &cli);

    match cli.command {
        Commands::Run {
            scenario,
            format,
            output,
            parallel,
        } => {
            let mut config = config;
            if let Some(n) = parallel {
                config.parallel = n;
            }
            let format = format.unwrap_or(config.report.format);
            let output = output.or_else(|| config.report.output.clone());

            let all_passed = cmd_run(&scenario, &config, format, output.as_deref()).await?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Personas => print!("{}", cmd_personas()),
    }

    Ok(())
}
