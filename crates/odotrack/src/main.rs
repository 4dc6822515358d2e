//! `odotrack` - CLI for the odometer log
//!
//! This binary adds readings from odometer photos and shows the recorded log
//! as a table or a chart.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use clap::Parser;

use odotrack::cli::{AddCommand, Cli, ClearCommand, Command, ConfigCommand, ShowCommand};
use odotrack::{init_logging, render, App, Config, IngestOutcome};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;

    // Config commands never touch the database
    let command = match cli.command {
        Command::Config(config_cmd) => return handle_config(&config, config_cmd),
        command => command,
    };

    let app = App::open(&config)
        .with_context(|| format!("failed to open {}", config.database_path().display()))?;

    match command {
        Command::Add(add_cmd) => handle_add(&app, &add_cmd, cli.quiet).await,
        Command::Show(show_cmd) => handle_show(&app, &config, &show_cmd).await,
        Command::Clear(clear_cmd) => handle_clear(&app, &clear_cmd).await,
        Command::Status(status_cmd) => handle_status(&app, &config, status_cmd.json).await,
        // handled above
        Command::Config(_) => Ok(()),
    }
}

async fn handle_add(app: &App, cmd: &AddCommand, quiet: bool) -> Result<()> {
    let mut failures = 0usize;

    for image in &cmd.images {
        match app.add_reading(image).await {
            IngestOutcome::Recorded(reading) => {
                if !quiet {
                    println!("{}: recorded {}", image.display(), reading.value);
                }
            }
            IngestOutcome::Failed(message) => {
                failures += 1;
                eprintln!("{}: {message}", image.display());
            }
            IngestOutcome::Ignored => {
                eprintln!("{}: skipped, another image is being processed", image.display());
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} image(s) could not be read", cmd.images.len());
    }
    Ok(())
}

async fn handle_show(app: &App, config: &Config, cmd: &ShowCommand) -> Result<()> {
    if let Some(view_mode) = cmd.view_mode() {
        app.set_view(view_mode).await;
    }
    if let Some(zero_mode) = cmd.zero_mode() {
        app.set_zero_mode(zero_mode).await;
    }

    let snapshot = app.snapshot().await;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    render::render(&mut out, &snapshot, &config.display)?;
    out.flush()?;
    Ok(())
}

async fn handle_clear(app: &App, cmd: &ClearCommand) -> Result<()> {
    if !cmd.yes && !confirm("Delete all readings? This cannot be undone. [y/N] ")? {
        println!("Nothing deleted.");
        return Ok(());
    }

    let removed = app.clear_all().await.context("failed to clear readings")?;
    println!("Deleted {removed} reading(s).");
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

async fn handle_status(app: &App, config: &Config, json: bool) -> Result<()> {
    let snapshot = app.snapshot().await;
    let stats = &snapshot.stats;

    if json {
        let status = serde_json::json!({
            "database_path": config.database_path(),
            "slot_key": config.storage.slot_key,
            "credential_configured": app.has_credential(),
            "view_mode": snapshot.view_mode,
            "zero_mode": snapshot.zero_mode,
            "stats": stats,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let date_format = &config.display.date_format;
    let format_date = |date: Option<chrono::DateTime<chrono::Utc>>| {
        date.map_or_else(
            || "-".to_string(),
            |d| d.with_timezone(&chrono::Local).format(date_format).to_string(),
        )
    };

    println!("odotrack status");
    println!("---------------");
    println!("Database:      {}", config.database_path().display());
    println!(
        "API key:       {}",
        if app.has_credential() { "configured" } else { "not set" }
    );
    println!("Readings:      {}", stats.total_readings);
    println!("First reading: {}", format_date(stats.first_reading));
    println!("Last reading:  {}", format_date(stats.last_reading));
    if let (Some(first), Some(last)) = (stats.first_value, stats.last_value) {
        println!("Values:        {first} -> {last}");
        println!("Distance:      {}", stats.distance);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = config.redacted();
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:  {}", config.database_path().display());
                println!("  Slot key:       {}", config.storage.slot_key);
                println!();
                println!("[Recognition]");
                println!(
                    "  API key:        {}",
                    config.recognition.api_key.as_deref().unwrap_or("(not set)")
                );
                println!("  Endpoint:       {}", config.recognition.endpoint);
                println!("  Model:          {}", config.recognition.model);
                println!();
                println!("[Display]");
                println!("  Default view:   {}", config.display.default_view);
                println!("  Zero readings:  {}", config.display.zero_readings);
                println!("  Date format:    {}", config.display.date_format);
                println!("  Label format:   {}", config.display.label_format);
                println!("  Chart width:    {}", config.display.chart_width);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
