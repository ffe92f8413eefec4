use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::constants::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, SETTINGS_PATH};
use crate::manage::AlertsArgs;
use crate::preview::ChartArgs;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Live quote chart with draggable price alerts"
)]
pub struct Cli {
    /// Settings file (JSON)
    #[arg(long, global = true, default_value = SETTINGS_PATH)]
    pub settings: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or_default()
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Poll quotes on the refresh timer, evaluate alerts and render frames
    Run(RunArgs),
    /// Fetch once and render an ASCII price chart with alert levels
    Chart(ChartArgs),
    /// Inspect or edit stored alert levels
    Alerts(AlertsArgs),
}

impl Default for Command {
    fn default() -> Self {
        Command::Run(RunArgs::default())
    }
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    /// Use the simulated random-walk feed instead of the quote API
    #[arg(long)]
    pub demo: bool,

    /// Canvas width in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_WIDTH)]
    pub width: f64,

    /// Canvas height in pixels
    #[arg(long, default_value_t = DEFAULT_CANVAS_HEIGHT)]
    pub height: f64,

    /// Do not ring the terminal bell on alert crossings
    #[arg(long)]
    pub no_bell: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            demo: false,
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            no_bell: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_run() {
        let cli = Cli::parse_from(["quote-overlay"]);
        assert!(matches!(cli.command(), Command::Run(ref args) if !args.demo));
        assert_eq!(cli.settings, PathBuf::from(SETTINGS_PATH));
    }

    #[test]
    fn parses_alert_edits() {
        let cli = Cli::parse_from([
            "quote-overlay",
            "--settings",
            "/tmp/s.json",
            "alerts",
            "--instrument",
            "AAPL",
            "add",
            "190.5",
        ]);
        match cli.command() {
            Command::Alerts(args) => {
                assert_eq!(args.instrument.as_deref(), Some("AAPL"));
                assert!(matches!(args.action, crate::manage::AlertsAction::Add { price } if price == 190.5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn chart_accepts_timeframe_names() {
        let cli = Cli::parse_from(["quote-overlay", "chart", "--demo", "--timeframe", "1h"]);
        match cli.command() {
            Command::Chart(args) => {
                assert!(args.demo);
                assert_eq!(args.timeframe, Some(crate::model::Timeframe::OneHour));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
