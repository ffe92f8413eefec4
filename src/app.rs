use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::{mpsc, watch};

use crate::canvas::DisplayList;
use crate::constants::{DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, SETTINGS_PATH};
use crate::engine::{Engine, EngineConfig, FetchOutcome};
use crate::feed::{FetchError, QuoteFeed, RandomWalkFeed, TwelveDataFeed};
use crate::geometry::Size;
use crate::logging;
use crate::notify::{ConsoleNotifier, Notifier};
use crate::scheduler::RefreshScheduler;
use crate::series::RawQuote;
use crate::session::SessionToken;
use crate::settings::{JsonFileStore, SettingsSink};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub settings_path: PathBuf,
    pub canvas: Size,
    pub demo: bool,
    pub bell: bool,
    /// Stop after this many fetch results for the active session.
    pub max_refreshes: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            settings_path: PathBuf::from(SETTINGS_PATH),
            canvas: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            demo: false,
            bell: true,
            max_refreshes: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub applied: usize,
    pub fell_back: usize,
    pub discarded: usize,
    pub crossings: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShutdownSignal {
    None,
    Graceful,
    Immediate,
}

type FetchResult = (SessionToken, Result<Vec<RawQuote>, FetchError>);

pub async fn run(config: AppConfig) -> Result<RunSummary> {
    let store = JsonFileStore::new(&config.settings_path);
    if config.demo {
        run_with_feed(config, store, RandomWalkFeed::new()).await
    } else {
        let feed = TwelveDataFeed::new().context("failed to build quote api client")?;
        run_with_feed(config, store, feed).await
    }
}

pub async fn run_with_feed<F>(
    config: AppConfig,
    store: JsonFileStore,
    feed: F,
) -> Result<RunSummary>
where
    F: QuoteFeed + Send + Sync + 'static,
{
    let settings = store.load()?;
    let feed = Arc::new(feed);
    let engine_config = EngineConfig {
        canvas: config.canvas,
        require_api_key: !config.demo,
        ..EngineConfig::default()
    };
    let mut engine = Engine::new(
        settings,
        engine_config,
        store.clone(),
        ConsoleNotifier::new(config.bell),
    );
    logging::info(
        "app.start",
        "Quote overlay started",
        json!({
            "settings": store.path().display().to_string(),
            "token": engine.token().to_string(),
            "refresh_secs": engine.refresh_period().as_secs(),
            "demo": config.demo,
        }),
    );

    let (tick_tx, mut tick_rx) = mpsc::channel(1);
    let scheduler = RefreshScheduler::spawn(engine.refresh_period(), tick_tx);
    let (result_tx, mut result_rx) = mpsc::channel::<FetchResult>(8);
    let (shutdown_tx, mut shutdown_rx) = watch::channel(ShutdownSignal::None);
    let (reload_tx, mut reload_rx) = mpsc::channel::<()>(4);
    let signals_task = tokio::spawn(handle_signals(shutdown_tx.clone(), reload_tx));

    let mut summary = RunSummary::default();
    spawn_fetch(&mut engine, &feed, &result_tx);

    loop {
        tokio::select! {
            Some(_) = tick_rx.recv() => {
                spawn_fetch(&mut engine, &feed, &result_tx);
            }
            Some((token, result)) = result_rx.recv() => {
                match engine.apply_fetch(&token, result) {
                    FetchOutcome::Discarded => {
                        summary.discarded += 1;
                        continue;
                    }
                    FetchOutcome::Applied { crossings, .. } => {
                        summary.applied += 1;
                        summary.crossings += crossings.len();
                    }
                    FetchOutcome::FellBack { .. } => summary.fell_back += 1,
                }
                render_frame(&engine, config.canvas);

                if let Some(max) = config.max_refreshes {
                    if summary.applied + summary.fell_back >= max {
                        logging::info(
                            "app.limit",
                            "Refresh budget reached",
                            json!({ "max_refreshes": max }),
                        );
                        break;
                    }
                }
            }
            Some(()) = reload_rx.recv() => {
                match store.load() {
                    Ok(settings) => {
                        let change = engine.replace_settings(settings);
                        if let Some(period) = change.refresh_interval {
                            scheduler.set_period(period);
                        }
                        if change.reselected {
                            spawn_fetch(&mut engine, &feed, &result_tx);
                        }
                    }
                    Err(err) => logging::error(
                        "settings.reload_failed",
                        "Keeping current settings",
                        json!({ "error": format!("{err:#}") }),
                    ),
                }
            }
            _ = shutdown_rx.changed() => {
                match *shutdown_rx.borrow() {
                    ShutdownSignal::None => continue,
                    ShutdownSignal::Graceful => {
                        logging::info_simple("app.shutdown", "Stopping after graceful shutdown request");
                    }
                    ShutdownSignal::Immediate => {
                        logging::warn_simple("app.shutdown", "Stopping immediately");
                    }
                }
                break;
            }
        }
    }

    signals_task.abort();
    let _ = signals_task.await;
    scheduler.stop().await;

    logging::info(
        "app.stop",
        "Quote overlay stopped",
        json!({
            "applied": summary.applied,
            "fell_back": summary.fell_back,
            "discarded": summary.discarded,
            "crossings": summary.crossings,
        }),
    );
    Ok(summary)
}

/// Fire-and-forget fetch for the active session. The result comes back tagged
/// with the session token so a late answer for an old selection is dropped.
fn spawn_fetch<S, N, F>(
    engine: &mut Engine<S, N>,
    feed: &Arc<F>,
    results: &mpsc::Sender<FetchResult>,
) where
    S: SettingsSink,
    N: Notifier,
    F: QuoteFeed + Send + Sync + 'static,
{
    let Some(request) = engine.begin_fetch() else {
        return;
    };
    let feed = Arc::clone(feed);
    let results = results.clone();
    tokio::spawn(async move {
        let result = feed.fetch(&request).await;
        let _ = results.send((request.token, result)).await;
    });
}

fn render_frame<S: SettingsSink, N: Notifier>(engine: &Engine<S, N>, canvas: Size) {
    let mut frame = DisplayList::new(canvas);
    let drawn = engine.render(&mut frame);
    let chart = engine.session().chart();
    logging::info(
        "render.frame",
        "Frame rendered",
        json!({
            "token": engine.token().to_string(),
            "status": engine.status(),
            "message": engine.status().message(),
            "chart": drawn,
            "commands": frame.commands().len(),
            "last_price": chart.and_then(|c| c.last_price()),
            "change": chart.map(|c| c.change().text.clone()),
            "alerts": engine.levels(),
            "accent": engine.settings().accent().to_hex(),
        }),
    );
}

async fn handle_signals(
    shutdown_tx: watch::Sender<ShutdownSignal>,
    reload_tx: mpsc::Sender<()>,
) -> Result<()> {
    let mut sigterm =
        signal(SignalKind::terminate()).context("failed to register SIGTERM handler")?;
    let mut sigint =
        signal(SignalKind::interrupt()).context("failed to register SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("failed to register SIGHUP handler")?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                logging::info(
                    "signal.received",
                    "SIGTERM received, initiating graceful shutdown",
                    json!({ "signal": "SIGTERM" })
                );
                let _ = shutdown_tx.send(ShutdownSignal::Graceful);
                break;
            }
            _ = sigint.recv() => {
                logging::warn(
                    "signal.received",
                    "SIGINT received, forcing immediate shutdown",
                    json!({ "signal": "SIGINT" })
                );
                let _ = shutdown_tx.send(ShutdownSignal::Immediate);
                break;
            }
            _ = sighup.recv() => {
                logging::info(
                    "signal.received",
                    "SIGHUP received, reloading settings",
                    json!({ "signal": "SIGHUP" })
                );
                if reload_tx.send(()).await.is_err() {
                    break;
                }
            }
        }
    }

    Ok(())
}
