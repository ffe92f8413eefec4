use std::path::Path;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde_json::json;

use crate::chart::format_price;
use crate::logging;
use crate::settings::{JsonFileStore, SettingsSink};

#[derive(Debug, Args, Clone)]
pub struct AlertsArgs {
    /// Instrument whose levels to edit (defaults to the one in settings)
    #[arg(short, long, global = true)]
    pub instrument: Option<String>,

    #[command(subcommand)]
    pub action: AlertsAction,
}

#[derive(Debug, Subcommand, Clone)]
pub enum AlertsAction {
    /// Print alert levels
    List {
        /// List every instrument, not just the selected one
        #[arg(long)]
        all: bool,
    },
    /// Add an alert level at the given price
    Add { price: f64 },
    /// Remove the alert level at the given position
    Remove { index: usize },
}

pub fn run(args: AlertsArgs, settings_path: &Path) -> Result<()> {
    let mut store = JsonFileStore::new(settings_path);
    let mut settings = store.load()?;
    let instrument = args
        .instrument
        .unwrap_or_else(|| settings.instrument.clone());

    match args.action {
        AlertsAction::List { all } => {
            let instruments: Vec<String> = if all {
                settings.alerts.instruments().map(str::to_string).collect()
            } else {
                vec![instrument]
            };
            for name in instruments {
                println!("{name}");
                for (index, level) in settings.alerts.levels_for(&name).iter().enumerate() {
                    println!("  [{index}] {}", format_price(*level));
                }
            }
        }
        AlertsAction::Add { price } => {
            if !price.is_finite() || price <= 0.0 {
                bail!("alert price must be a positive number, got {price}");
            }
            settings.alerts.add(&instrument, price);
            store.save(&settings);
            logging::info(
                "alerts.add",
                "Alert level added",
                json!({ "instrument": instrument, "level": price }),
            );
        }
        AlertsAction::Remove { index } => match settings.alerts.remove(&instrument, index) {
            Some(level) => {
                store.save(&settings);
                logging::info(
                    "alerts.remove",
                    "Alert level removed",
                    json!({ "instrument": instrument, "index": index, "level": level }),
                );
            }
            None => logging::warn(
                "alerts.remove",
                "No alert level at that position",
                json!({ "instrument": instrument, "index": index }),
            ),
        },
    }

    Ok(())
}
