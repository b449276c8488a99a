//! PopDocs CLI - explore a documentation tree as an expandable diagram.

use clap::Parser;
use popdocs::cli::{Cli, Commands, ConfigCommands};
use popdocs::commands::{self, Output};
use popdocs::config::{
    ConfigOverrides, ConfigPaths, OutputFormat, ResolvedConfig, SpacingOverrides, resolve_config,
};
use popdocs::logging;
use std::env;
use std::path::PathBuf;
use std::process;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let paths = ConfigPaths::discover(&cwd);

    // Until the config is known only the flag decides how errors look
    let mut human = cli.human_readable;
    let result = resolve_config(&paths, &overrides_for(&cli)).and_then(|config| {
        human = *config.output_format() == OutputFormat::Human;
        run_command(cli, &config, &paths, human)
    });

    // Handle result
    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        if human {
            eprintln!("Error: {}", e);
        } else {
            eprintln!("{}", serde_json::json!({ "error": e.to_string() }));
        }
        process::exit(1);
    }
}

/// Translate CLI flags into config overrides.
fn overrides_for(cli: &Cli) -> ConfigOverrides {
    let mut overrides = ConfigOverrides::new();
    if cli.human_readable {
        overrides = overrides.with_output_format(OutputFormat::Human);
    }
    if !cli.doc_ext.is_empty() {
        overrides = overrides.with_document_extensions(cli.doc_ext.clone());
    }
    if let Commands::Layout {
        orientation,
        node_spacing,
        rank_spacing,
        ..
    } = cli.command
    {
        if let Some(orientation) = orientation {
            overrides = overrides.with_orientation(orientation);
        }
        overrides = overrides.with_spacing(SpacingOverrides {
            node_spacing,
            rank_spacing,
            ..Default::default()
        });
    }
    overrides
}

fn run_command(
    cli: Cli,
    config: &ResolvedConfig,
    paths: &ConfigPaths,
    human: bool,
) -> Result<(), popdocs::Error> {
    let source = cli.source;
    match cli.command {
        Commands::Index { output: out } => {
            let result = commands::index(&source, config, out.as_deref())?;
            output(&result, human);
        }
        Commands::Visible { nav } => {
            let result = commands::visible(&source, config, &nav.expand, nav.back)?;
            output(&result, human);
        }
        Commands::Layout { nav, .. } => {
            let result = commands::layout(&source, config, &nav.expand, nav.back)?;
            output(&result, human);
        }
        Commands::Open { id, nav } => {
            let result = commands::open(&source, config, &id, &nav.expand, nav.back)?;
            output(&result, human);
        }
        Commands::Config { command } => match command {
            ConfigCommands::Show => {
                let result = commands::config_show(config);
                output(&result, human);
            }
            ConfigCommands::Path => {
                let result = commands::config_path(paths);
                output(&result, human);
            }
        },
    }
    Ok(())
}

fn output<T: Output>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}
