use clap::Parser;
use form_autofill::cli::commands::{cmd_autofill, cmd_fill, cmd_highlight, cmd_scan};
use form_autofill::cli::config::{load_config, resolve_enrich_settings, Cli, Commands};
use form_autofill::trace::logger::TraceLogger;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let tracer = match config.trace.path.as_deref() {
        Some(path) => TraceLogger::new(path),
        None => TraceLogger::disabled(),
    };

    match &cli.command {
        Commands::Scan { html, url, format } => {
            cmd_scan(html, url.as_deref(), format, &config.autofill_options(), &tracer)?;
        }
        Commands::Fill {
            html,
            form_id,
            fingerprint,
            values,
            output,
        } => {
            let success = cmd_fill(
                html,
                form_id,
                fingerprint.as_deref(),
                values,
                output.as_deref(),
                &tracer,
            )?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Autofill {
            html,
            url,
            profile,
            form_id,
            analyzer,
            output,
        } => {
            let settings = resolve_enrich_settings(&cli, &config, analyzer.as_deref());
            cmd_autofill(
                html.as_deref(),
                url.as_deref(),
                profile,
                form_id.as_deref(),
                output.as_deref(),
                &settings,
                &config,
                &tracer,
            )?;
        }
        Commands::Highlight { url, form_id } => {
            cmd_highlight(url, form_id, &config, &tracer)?;
        }
    }

    Ok(())
}
