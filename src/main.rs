use anyhow::Result;
use clap::Parser;
use quote_overlay::app::{self, AppConfig};
use quote_overlay::cli::{Cli, Command};
use quote_overlay::geometry::Size;
use quote_overlay::{manage, preview};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command() {
        Command::Run(args) => {
            let config = AppConfig {
                settings_path: cli.settings.clone(),
                canvas: Size::new(args.width, args.height),
                demo: args.demo,
                bell: !args.no_bell,
                max_refreshes: None,
            };
            app::run(config).await.map(|_| ())
        }
        Command::Chart(args) => preview::run(args, &cli.settings).await,
        Command::Alerts(args) => manage::run(args, &cli.settings),
    }
}
