//! Cardcut CLI - Cut evidence cards out of briefs and research files.

use anyhow::Context;
use cardcut_cli::batch::{self, BatchRunner};
use cardcut_cli::cli::{ExtractArgs, InspectArgs};
use cardcut_cli::{Cli, Command, Config, Formatter, HttpSink};
use cardcut_domain::traits::TreeBuilder;
use cardcut_extractor::{BoundaryOracle, CardExtractor};
use cardcut_ingest::FileTreeBuilder;
use cardcut_llm::AnthropicProvider;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let format = cli.format.map(Into::into).unwrap_or(config.report.format);
    let color_enabled = !cli.no_color && config.report.color;
    let formatter = Formatter::new(format, color_enabled);

    match cli.command {
        Command::Extract(args) => execute_extract(args, &config, &formatter),
        Command::Inspect(args) => execute_inspect(args),
    }
}

/// Log to stderr; `RUST_LOG` wins over the verbosity flag
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .or_else(|_| EnvFilter::try_new(default_level))
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

fn execute_extract(
    args: ExtractArgs,
    config: &Config,
    formatter: &Formatter,
) -> anyhow::Result<()> {
    let items = batch::collect_inputs(&args.input, &args.output)?;
    info!("Found {} document(s) under {}", items.len(), args.input.display());

    let reports = if args.dry_run {
        batch::dry_run(&items)
    } else {
        let extractor = CardExtractor::new(config.extractor.clone())?;

        let oracle_settings = &config.oracle;
        let provider = AnthropicProvider::new(oracle_settings.api_key()?, &oracle_settings.model)?
            .with_endpoint(&oracle_settings.endpoint)
            .with_max_tokens(oracle_settings.max_tokens)
            .with_api_version(&oracle_settings.anthropic_version)
            .with_timeout(config.extractor.oracle_timeout())?;

        let mut runner = BatchRunner::new(extractor, BoundaryOracle::new(provider))?;
        if args.submit || config.output.submit {
            let api_base = args
                .api_base
                .as_deref()
                .or(config.output.api_base.as_deref())
                .context("Submission requested but no API base URL is configured")?;
            runner = runner.with_submission(HttpSink::new(api_base)?);
        }
        runner.run(&items)
    };

    println!("{}", formatter.format_reports(&reports)?);
    eprintln!("{}", formatter.summary(&reports));
    Ok(())
}

fn execute_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let document = FileTreeBuilder::new()
        .build_tree(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    if args.text {
        println!("{}", document.plain_text());
    } else {
        println!("{}", document.to_markup_tree().to_markup());
    }
    Ok(())
}
