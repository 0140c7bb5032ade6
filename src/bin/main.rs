use anyhow::{Context, Result};
use std::os::unix::process::CommandExt;
use std::process::{Command, ExitCode};

use tagwm::bar::CoreFontRenderer;
use tagwm::display::X11Display;
use tagwm::process::ProcFs;
use tagwm::window_manager::WindowManager;

/// Set on the re-executed process so autostart only runs once per session.
const RESTARTED_ENV: &str = "TAGWM_RESTARTED";

fn main() -> Result<ExitCode> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None => {}
        Some("-v") if args.len() == 2 => {
            eprintln!("tagwm-{}", env!("CARGO_PKG_VERSION"));
            return Ok(ExitCode::FAILURE);
        }
        Some(_) => {
            eprintln!("usage: tagwm [-v]");
            return Ok(ExitCode::FAILURE);
        }
    }

    init_logger();

    let config = tagwm::config::load(None).context("Failed to load configuration")?;
    let display = X11Display::connect().context("Failed to take over the display")?;
    let renderer = CoreFontRenderer::new(
        display.connection(),
        display.screen_number(),
        &config.font,
        config.bar_height,
        config.schemes,
    )
    .context("Failed to set up the bar renderer")?;

    let mut wm = WindowManager::new(display, Box::new(renderer), Box::new(ProcFs), config)
        .context("Failed to start the window manager")?;
    if std::env::var_os(RESTARTED_ENV).is_none() {
        wm.autostart();
    }
    let should_restart = wm.run()?;

    drop(wm);

    if should_restart {
        let err = Command::new(&args[0]).env(RESTARTED_ENV, "1").exec();
        tracing::error!("failed to restart: {}", err);
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

fn init_logger() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tagwm=info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
