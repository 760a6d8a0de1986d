//! CLI entry point for console-panel.

mod cli;

use clap::Parser;
use console_panel::config::{self, Config};
use console_panel::driver::{self, DriverExit};
use console_panel::error::ConsoleError;
use console_panel::logging;
use console_panel::panel::markup::escape;
use console_panel::panel::TerminalSurface;
use console_panel::session::{Console, PanelVariant};
use crossterm::event::EventStream;
use tracing::{error, info, warn};

const GREETING: &[&str] = &[
    "<b>console-panel</b> demo",
    "Type numbers separated by spaces to add them up; <u>quit</u> leaves.",
];

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();

    let loaded = match config::load_config(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    let mut config = loaded.config;
    args.apply_to(&mut config);
    if let Err(e) = config::validate(&config) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }

    init_logging(&config);
    info!(source = %loaded.source, variant = %config.console.variant, "configuration loaded");

    if let Err(e) = run(config).await {
        error!(error = %e, "console session failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(config: &Config) {
    let Some(path) = config::log_file_path(config) else {
        return;
    };
    match logging::init_file_logging(&path, &config.log.level) {
        Ok(_) => {}
        // The panel is about to take over the terminal; say it now or never.
        Err(e) => eprintln!("warning: logging disabled: {e}"),
    }
}

async fn run(config: Config) -> Result<(), ConsoleError> {
    let console = Console::with_options(config.console.variant, config.console_options());
    console.mount(TerminalSurface::new())?;

    let host = tokio::spawn(run_host(console.clone()));
    let mut events = EventStream::new();
    let exit = driver::run_until_ended(&console, &mut events).await;

    match host.await {
        Ok(Ok(())) | Ok(Err(ConsoleError::Ended)) => {}
        Ok(Err(e)) => warn!(error = %e, "host program stopped early"),
        Err(e) => warn!(error = %e, "host task failed"),
    }

    let exit = exit?;
    info!(?exit, "driver finished");
    if exit != DriverExit::EventsClosed {
        // Keep the final panel on screen until the user dismisses it.
        driver::wait_for_key(&mut events).await?;
    }
    console.unmount()
}

/// Small interactive program exercising output, input and inputs.
async fn run_host(console: Console) -> Result<(), ConsoleError> {
    console.output(GREETING)?;
    console.output(["What's your name?"])?;
    let name = console.input().await?.unwrap_or_default();
    let name = match name.trim() {
        "" => "stranger".to_string(),
        trimmed => trimmed.to_string(),
    };
    console.output([format!("Hello, <b>{}</b>!", escape(&name))])?;

    loop {
        console.output(["Numbers:"])?;
        let Some(tokens) = console.inputs().await? else {
            continue;
        };
        match tokens.as_slice() {
            [only] if only.is_empty() => console.output(["(nothing entered)"])?,
            [only] if only.eq_ignore_ascii_case("quit") => break,
            _ => console.output([sum_line(&tokens)])?,
        }
    }

    console.output([format!("Bye, {}.", escape(&name))])?;
    if console.variant() == PanelVariant::Inline {
        // The side panel never ends on its own.
        console.end(None)?;
    }
    Ok(())
}

fn sum_line(tokens: &[String]) -> String {
    let mut total = 0f64;
    let mut rejected = Vec::new();
    for token in tokens {
        match token.parse::<f64>() {
            Ok(value) => total += value,
            Err(_) => rejected.push(escape(token)),
        }
    }
    if rejected.is_empty() {
        format!("Sum: {total}")
    } else {
        format!("Sum: {total} <i>(skipped: {})</i>", rejected.join(", "))
    }
}
