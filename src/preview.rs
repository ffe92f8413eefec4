use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use textplots::{Chart, Plot, Shape};

use crate::chart::{format_price, ChangeLabel};
use crate::feed::{FetchRequest, QuoteFeed, RandomWalkFeed, TwelveDataFeed};
use crate::model::{Series, Timeframe};
use crate::series::normalize;
use crate::session::SessionToken;
use crate::settings::JsonFileStore;

#[derive(Debug, Args, Clone)]
pub struct ChartArgs {
    /// Use the simulated random-walk feed instead of the quote API
    #[arg(long)]
    pub demo: bool,

    /// Instrument to plot (defaults to the one in settings)
    #[arg(short, long)]
    pub instrument: Option<String>,

    /// Sampling interval: 1min, 5min, 15min, 30min, 1h, 4h or 1day
    #[arg(short, long)]
    pub timeframe: Option<Timeframe>,

    /// Chart width in characters
    #[arg(long, default_value_t = 120)]
    pub width: u32,

    /// Chart height in characters
    #[arg(long, default_value_t = 30)]
    pub height: u32,
}

pub async fn run(args: ChartArgs, settings_path: &Path) -> Result<()> {
    let settings = JsonFileStore::new(settings_path).load()?;
    let instrument = args
        .instrument
        .clone()
        .unwrap_or_else(|| settings.instrument.clone());
    let timeframe = args.timeframe.unwrap_or(settings.timeframe);

    if !args.demo && !settings.has_api_key() {
        bail!(
            "no API key configured; add \"apiKey\" to {:?} or pass --demo",
            settings_path
        );
    }

    let request = FetchRequest {
        token: SessionToken::new(instrument.clone(), timeframe, 0),
        instrument: instrument.clone(),
        timeframe,
        timezone: settings.timezone.clone(),
        api_key: settings.api_key.clone(),
    };
    let raw = if args.demo {
        RandomWalkFeed::new().fetch(&request).await
    } else {
        TwelveDataFeed::new()?.fetch(&request).await
    }
    .with_context(|| format!("failed to fetch {instrument} {timeframe}"))?;

    let series = normalize(&raw).context("quote api returned unusable data")?;
    if series.len() < 2 {
        bail!("not enough data points to render a chart");
    }

    render_chart(
        &instrument,
        timeframe,
        &series,
        settings.alerts.levels_for(&instrument),
        args.width,
        args.height,
    );
    Ok(())
}

fn render_chart(
    instrument: &str,
    timeframe: Timeframe,
    series: &Series,
    levels: &[f64],
    width: u32,
    height: u32,
) {
    let change = ChangeLabel::for_series(series);
    println!(
        "{instrument} ({timeframe}, {} samples) {} {}",
        series.len(),
        format_price(series.last_price()),
        change.text
    );
    let (low, high) = series.bounds();
    println!("Price range: {:.4} → {:.4}", low, high);

    let samples: Vec<(f32, f32)> = series
        .prices()
        .enumerate()
        .map(|(i, price)| (i as f32, price as f32))
        .collect();
    let max_x = (series.len() - 1) as f32;

    // dotted horizontal lines, one point per sample column
    let alert_points: Vec<(f32, f32)> = levels
        .iter()
        .flat_map(|level| (0..series.len()).map(move |i| (i as f32, *level as f32)))
        .collect();

    let plot_width = width.max(40);
    let plot_height = height.max(10);
    let line = Shape::Lines(&samples);
    let alerts = Shape::Points(&alert_points);

    let mut chart = Chart::new(plot_width, plot_height, 0.0, max_x);
    if alert_points.is_empty() {
        chart.lineplot(&line).display();
    } else {
        chart.lineplot(&line).lineplot(&alerts).display();
        for level in levels {
            println!("alert {}", format_price(*level));
        }
    }
    println!();
}
