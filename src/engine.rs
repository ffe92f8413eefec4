use std::time::Duration;

use serde_json::json;

use crate::canvas::{Canvas, ColorError};
use crate::chart::ChartStyle;
use crate::constants::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, HIT_TOLERANCE_FRACTION, MIN_REFRESH_SECS,
    PRUNE_PADDING_FRACTION,
};
use crate::crossing::Crossing;
use crate::feed::{FetchError, FetchRequest};
use crate::geometry::Size;
use crate::interaction::{InputEvent, Response};
use crate::logging;
use crate::model::Timeframe;
use crate::notify::Notifier;
use crate::series::RawQuote;
use crate::session::{ChartSession, ChartStatus, SessionToken};
use crate::settings::{Settings, SettingsSink};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub canvas: Size,
    /// Fraction of the series span added above and below it, for both the
    /// visible axis and alert pruning.
    pub padding_fraction: f64,
    /// Alert hit tolerance as a fraction of the visible price span.
    pub tolerance_fraction: f64,
    pub require_api_key: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas: Size::new(DEFAULT_CANVAS_WIDTH, DEFAULT_CANVAS_HEIGHT),
            padding_fraction: PRUNE_PADDING_FRACTION,
            tolerance_fraction: HIT_TOLERANCE_FRACTION,
            require_api_key: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied {
        crossings: Vec<Crossing>,
        pruned: bool,
    },
    FellBack {
        error: String,
        has_fallback: bool,
    },
    /// The result belonged to a session that is no longer active.
    Discarded,
}

/// What changed when settings were replaced wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SettingsChange {
    pub reselected: bool,
    pub refresh_interval: Option<Duration>,
}

/// Owns the settings, the active chart session and the collaborators.
pub struct Engine<S: SettingsSink, N: Notifier> {
    settings: Settings,
    session: ChartSession,
    config: EngineConfig,
    generation: u64,
    sink: S,
    notifier: N,
}

impl<S: SettingsSink, N: Notifier> Engine<S, N> {
    pub fn new(settings: Settings, config: EngineConfig, sink: S, notifier: N) -> Self {
        let settings = settings.normalized();
        let token = SessionToken::new(settings.instrument.clone(), settings.timeframe, 1);
        Self {
            session: ChartSession::new(token, config.tolerance_fraction),
            settings,
            config,
            generation: 1,
            sink,
            notifier,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &ChartSession {
        &self.session
    }

    pub fn token(&self) -> &SessionToken {
        self.session.token()
    }

    pub fn status(&self) -> &ChartStatus {
        self.session.status()
    }

    pub fn levels(&self) -> &[f64] {
        self.settings.alerts.levels_for(&self.settings.instrument)
    }

    pub fn refresh_period(&self) -> Duration {
        Duration::from_secs(self.settings.refresh_interval)
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Switch instrument and/or timeframe. The old session is torn down, so its
    /// cached series, crossing history and any in-flight fetch no longer apply.
    pub fn select(&mut self, instrument: &str, timeframe: Timeframe) -> bool {
        if instrument == self.settings.instrument && timeframe == self.settings.timeframe {
            return false;
        }
        self.settings.instrument = instrument.to_string();
        self.settings.timeframe = timeframe;
        self.start_session();
        self.persist();
        true
    }

    fn start_session(&mut self) {
        self.generation += 1;
        let token = SessionToken::new(
            self.settings.instrument.clone(),
            self.settings.timeframe,
            self.generation,
        );
        logging::info(
            "session.start",
            "Chart session started",
            json!({ "token": token.to_string(), "alerts": self.levels().len() }),
        );
        let previous = std::mem::replace(
            &mut self.session,
            ChartSession::new(token, self.config.tolerance_fraction),
        );
        previous.teardown();
    }

    /// Build the request for the next refresh, or `None` when no API key is set.
    pub fn begin_fetch(&mut self) -> Option<FetchRequest> {
        if self.config.require_api_key && !self.settings.has_api_key() {
            if self.session.status() != &ChartStatus::NoApiKey {
                logging::warn_simple("session.no_api_key", "No API key configured; skipping fetch");
            }
            self.session.set_status(ChartStatus::NoApiKey);
            return None;
        }
        Some(FetchRequest {
            token: self.session.token().clone(),
            instrument: self.settings.instrument.clone(),
            timeframe: self.settings.timeframe,
            timezone: self.settings.timezone.clone(),
            api_key: self.settings.api_key.clone(),
        })
    }

    pub fn apply_fetch(
        &mut self,
        token: &SessionToken,
        result: Result<Vec<RawQuote>, FetchError>,
    ) -> FetchOutcome {
        if token != self.session.token() {
            logging::info(
                "session.stale_fetch",
                "Discarding fetch result for inactive session",
                json!({ "fetched": token.to_string(), "active": self.session.token().to_string() }),
            );
            return FetchOutcome::Discarded;
        }

        let style = self.chart_style();
        let error = match result {
            Ok(raw) => {
                match self
                    .session
                    .apply_quotes(&raw, &mut self.settings.alerts, style)
                {
                    Ok(refresh) => {
                        for crossing in &refresh.crossings {
                            self.announce(crossing);
                        }
                        if refresh.pruned {
                            self.persist();
                        }
                        return FetchOutcome::Applied {
                            crossings: refresh.crossings,
                            pruned: refresh.pruned,
                        };
                    }
                    Err(err) => err.to_string(),
                }
            }
            Err(err) => err.to_string(),
        };

        let has_fallback = self.session.fall_back(error.clone());
        logging::warn(
            "session.fetch_failed",
            "Fetch failed; keeping previous series",
            json!({ "token": token.to_string(), "error": error, "has_fallback": has_fallback }),
        );
        FetchOutcome::FellBack {
            error,
            has_fallback,
        }
    }

    fn announce(&mut self, crossing: &Crossing) {
        logging::info(
            "alerts.crossed",
            "Price crossed alert level",
            json!({
                "instrument": self.settings.instrument,
                "direction": crossing.direction,
                "level": crossing.level,
            }),
        );
        self.notifier
            .notify(&self.settings.instrument, crossing.direction, crossing.level);
        self.notifier.play_tone();
    }

    /// Route a pointer or modifier event to the active session and persist
    /// when it finishes an edit. The host picks its repaint from
    /// `Response::redraw`: `Overlay` means only what is drawn over the chart
    /// moved, `Full` means the chart layer changed too. [`Engine::render`]
    /// always paints both layers, so a host without separate layers can
    /// treat any value other than `None` as a full repaint.
    pub fn handle_input(&mut self, event: InputEvent) -> Response {
        let response = self
            .session
            .handle_input(event, &mut self.settings.alerts);
        if response.persist {
            self.persist();
        }
        response
    }

    pub fn render(&self, canvas: &mut dyn Canvas) -> bool {
        self.session.render(canvas, &self.settings.alerts)
    }

    pub fn resize(&mut self, canvas: Size) {
        self.config.canvas = canvas;
        let style = self.chart_style();
        self.session.restyle(style);
    }

    pub fn set_accent_color(&mut self, hex: &str) -> Result<(), ColorError> {
        crate::canvas::Color::from_hex(hex)?;
        self.settings.accent_color = hex.to_string();
        let style = self.chart_style();
        self.session.restyle(style);
        self.persist();
        Ok(())
    }

    /// Store a new refresh interval and return the period the timer must be restarted with.
    pub fn set_refresh_interval(&mut self, seconds: u64) -> Duration {
        self.settings.refresh_interval = seconds.max(MIN_REFRESH_SECS);
        self.persist();
        self.refresh_period()
    }

    /// Adopt externally edited settings, e.g. after the settings file was reloaded.
    pub fn replace_settings(&mut self, settings: Settings) -> SettingsChange {
        let settings = settings.normalized();
        let reselected = settings.instrument != self.settings.instrument
            || settings.timeframe != self.settings.timeframe;
        let refresh_interval = (settings.refresh_interval != self.settings.refresh_interval)
            .then(|| Duration::from_secs(settings.refresh_interval));
        let restyle = settings.accent_color != self.settings.accent_color;

        self.settings = settings;
        if reselected {
            self.start_session();
        } else if restyle {
            let style = self.chart_style();
            self.session.restyle(style);
        }
        SettingsChange {
            reselected,
            refresh_interval,
        }
    }

    fn chart_style(&self) -> ChartStyle {
        ChartStyle {
            accent: self.settings.accent(),
            canvas: self.config.canvas,
            padding_fraction: self.config.padding_fraction,
        }
    }

    fn persist(&mut self) {
        self.sink.save(&self.settings);
    }
}
