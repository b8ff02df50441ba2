//! Daily Brief - prints an AI-written daily equity-market brief.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use std::path::PathBuf;

use brief_common::config::{Config, GeneratorBackend};
use brief_common::logging::init_logging;
use daily_brief::presenter::{present, PROMPT_TITLE, REPORT_TITLE};
use daily_brief::BriefService;

#[derive(Parser, Debug)]
#[command(name = "daily-brief")]
#[command(version)]
#[command(about = "Generate a daily equity-market brief from index, flow and news data.", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ~/.daily-brief/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session date, YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Print the composed prompt instead of calling the generation service
    #[arg(long)]
    prompt_only: bool,

    /// Generation backend override (openai, huggingface)
    #[arg(long)]
    backend: Option<GeneratorBackend>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        let code = e
            .downcast_ref::<brief_common::Error>()
            .map_or(1, |err| err.exit_code());
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load_with_env(cli.config.as_deref())?;
    if let Some(backend) = cli.backend {
        config.generator.backend = backend;
    }

    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    config
        .validate(!cli.prompt_only)
        .map_err(brief_common::Error::from)?;

    let date = cli.date.unwrap_or_else(|| Local::now().date_naive());
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        date = %date,
        backend = %config.generator.backend,
        prompt_only = cli.prompt_only,
        "Daily brief starting"
    );

    let service = BriefService::new(config);

    let (title, body) = if cli.prompt_only {
        (PROMPT_TITLE, service.compose(date).await)
    } else {
        (REPORT_TITLE, service.run(date).await?.narrative)
    };

    present(&mut std::io::stdout().lock(), title, date, &body)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "daily-brief",
            "--date",
            "2026-10-16",
            "--prompt-only",
            "--backend",
            "hf",
        ])
        .unwrap();
        assert_eq!(cli.date, NaiveDate::from_ymd_opt(2026, 10, 16));
        assert!(cli.prompt_only);
        assert_eq!(cli.backend, Some(GeneratorBackend::HuggingFace));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_cli_rejects_bad_input() {
        assert!(Cli::try_parse_from(["daily-brief", "--date", "16/10/2026"]).is_err());
        assert!(Cli::try_parse_from(["daily-brief", "--backend", "bard"]).is_err());
    }
}
