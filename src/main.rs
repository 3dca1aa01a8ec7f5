mod cli;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use vidmend::processor::{Processor, RunOptions};
use vidmend::report::{self, Summary};
use vidmend::{config, scan};
use vidmend_av::ToolRegistry;
use vidmend_core::error::EXIT_STARTUP_FAILURE;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidmend=debug,vidmend_av=debug,vidmend_core=debug".to_string()
        } else {
            "vidmend=info,vidmend_av=info,vidmend_core=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

/// Startup failures (missing tools, missing input) get their own status.
fn exit_code(e: &anyhow::Error) -> u8 {
    e.chain()
        .find_map(|cause| cause.downcast_ref::<vidmend_core::Error>())
        .map(|err| err.exit_code())
        .unwrap_or(1)
        .clamp(1, 255) as u8
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = config::load_config_or_default(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid settings")?;

    let tools = ToolRegistry::discover(&config.tools);

    if cli.check_tools {
        return Ok(check_tools(&tools));
    }

    tools.require_all()?;

    let input = cli.input.as_deref().context("No input path given")?;
    let targets = scan::collect_targets(input, &config.scan)?;

    let options = RunOptions::from_config(&config, cli.dry_run);
    if options.dry_run {
        tracing::info!("dry run: nothing will be modified");
    }
    let processor = Processor::new(tools, options);

    let rt = tokio::runtime::Runtime::new()?;
    let reports = rt.block_on(processor.run(targets, |report| {
        print!("{}", report.audit_text());
    }));

    if let Some(path) = &cli.csv {
        report::write_report(path, &reports)?;
        println!("\nReport saved to: {}", path.display());
    }

    println!("\nSummary: {}", Summary::from_reports(&reports));
    Ok(ExitCode::SUCCESS)
}

fn check_tools(tools: &ToolRegistry) -> ExitCode {
    println!("Checking external tools...\n");

    let mut all_ok = true;
    for tool in tools.check_all() {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
        ExitCode::SUCCESS
    } else {
        println!("Some tools are missing. Install ffmpeg (which ships ffprobe) and retry.");
        ExitCode::from(EXIT_STARTUP_FAILURE as u8)
    }
}
