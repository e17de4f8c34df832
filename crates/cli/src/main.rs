use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vigil_cli::config::CliConfig;
use vigil_cli::{run, Args};

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vigil=info,vigil_cli=info,vigil_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    match execute(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            tracing::error!(error = %err, "Validation run failed");
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}

fn execute(args: &Args) -> anyhow::Result<bool> {
    let config = CliConfig::from_env()?;
    let report = run(args, &config)?;
    print!("{}", report.render(args.output_format(&config))?);
    Ok(report.is_valid())
}
