//! Chart state scoped to one (instrument, timeframe) selection.

use std::fmt;

use serde::Serialize;

use crate::alerts::AlertStore;
use crate::canvas::Canvas;
use crate::chart::{ChartHandle, ChartStyle};
use crate::crossing::{Crossing, CrossingDetector};
use crate::interaction::{InputEvent, InteractionController, PointerState, Response};
use crate::model::{Series, Timeframe};
use crate::overlay::{self, OverlaySnapshot};
use crate::series::{RawQuote, SeriesBuffer, SeriesError};

/// Identifies the session a fetch was issued for; results for any other token are stale.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SessionToken {
    pub instrument: String,
    pub timeframe: Timeframe,
    pub generation: u64,
}

impl SessionToken {
    pub fn new(instrument: impl Into<String>, timeframe: Timeframe, generation: u64) -> Self {
        Self {
            instrument: instrument.into(),
            timeframe,
            generation,
        }
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}#{}", self.instrument, self.timeframe, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ChartStatus {
    Loading,
    NoApiKey,
    Live,
    Stale(String),
    Error(String),
}

impl ChartStatus {
    pub fn message(&self) -> String {
        match self {
            ChartStatus::Loading => "Loading…".to_string(),
            ChartStatus::NoApiKey => "Add an API key in settings to start".to_string(),
            ChartStatus::Live => String::new(),
            ChartStatus::Stale(reason) => format!("Showing last data ({reason})"),
            ChartStatus::Error(reason) => reason.clone(),
        }
    }

    pub fn shows_chart(&self) -> bool {
        matches!(self, ChartStatus::Live | ChartStatus::Stale(_))
    }
}

/// Result of feeding one fetch result into a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Refresh {
    pub crossings: Vec<Crossing>,
    pub pruned: bool,
}

pub struct ChartSession {
    token: SessionToken,
    buffer: SeriesBuffer,
    detector: CrossingDetector,
    chart: Option<ChartHandle>,
    controller: InteractionController,
    status: ChartStatus,
}

impl ChartSession {
    pub fn new(token: SessionToken, tolerance_fraction: f64) -> Self {
        Self {
            token,
            buffer: SeriesBuffer::new(),
            detector: CrossingDetector::new(),
            chart: None,
            controller: InteractionController::new(tolerance_fraction),
            status: ChartStatus::Loading,
        }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }

    pub fn status(&self) -> &ChartStatus {
        &self.status
    }

    pub fn set_status(&mut self, status: ChartStatus) {
        self.status = status;
    }

    pub fn chart(&self) -> Option<&ChartHandle> {
        self.chart.as_ref()
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn series(&self) -> Option<&Series> {
        self.buffer.latest()
    }

    /// Ingest a successful fetch: detect crossings against the current levels,
    /// redraw the chart in place, then prune levels the new range no longer shows.
    pub fn apply_quotes(
        &mut self,
        raw: &[RawQuote],
        alerts: &mut AlertStore,
        style: ChartStyle,
    ) -> Result<Refresh, SeriesError> {
        let series = self.buffer.ingest(raw)?;

        let crossings = self
            .detector
            .observe(series.last_price(), alerts.levels_for(&self.token.instrument));

        match self.chart.as_mut() {
            Some(chart) => chart.update(&series, style),
            None => self.chart = Some(ChartHandle::initialize(&series, style)),
        }

        let (low, high) = series.bounds();
        // a flat series has no span to pad; pruning would drop every level
        let pruned = high > low
            && alerts.prune_outside_range(
                &self.token.instrument,
                low,
                high,
                style.padding_fraction,
            );

        if pruned {
            // indices held by the controller may now name a different level
            self.controller.levels_changed();
        }

        self.status = ChartStatus::Live;
        Ok(Refresh { crossings, pruned })
    }

    /// Keep showing the cached series after a failed fetch. Returns whether a
    /// fallback exists.
    pub fn fall_back(&mut self, reason: String) -> bool {
        let has_fallback = self.buffer.latest_or_fallback(None).is_some();
        self.status = if has_fallback {
            ChartStatus::Stale(reason)
        } else {
            ChartStatus::Error(reason)
        };
        has_fallback
    }

    pub fn restyle(&mut self, style: ChartStyle) {
        if let Some(chart) = self.chart.as_mut() {
            chart.restyle(style);
        }
    }

    pub fn handle_input(&mut self, event: InputEvent, alerts: &mut AlertStore) -> Response {
        let scale = self.chart.as_ref().map(|chart| *chart.scale());
        self.controller
            .handle(event, scale.as_ref(), alerts, &self.token.instrument)
    }

    /// Draw the chart, then the overlay, then the hover tooltip when the
    /// pointer rests inside the plot and no drag is in progress.
    pub fn render(&self, canvas: &mut dyn Canvas, alerts: &AlertStore) -> bool {
        let Some(chart) = self.chart.as_ref().filter(|_| self.status.shows_chart()) else {
            canvas.clear();
            return false;
        };
        chart.draw(canvas);
        overlay::paint(
            canvas,
            chart.scale(),
            &OverlaySnapshot {
                levels: alerts.levels_for(&self.token.instrument),
                crosshair: self.controller.crosshair(),
            },
        );
        let dragging = matches!(self.controller.state(), PointerState::Dragging(_));
        if let Some(pointer) = self.controller.position() {
            if !dragging && chart.layout().plot.contains(pointer) {
                chart.draw_tooltip(canvas, pointer.x);
            }
        }
        true
    }

    pub fn teardown(self) {
        if let Some(chart) = self.chart {
            chart.teardown();
        }
    }
}
