//! Persistent chart model for one instrument/timeframe selection.
//!
//! A [`ChartHandle`] is built once per selection and then mutated in place on
//! every refresh, so pointer-driven redraws never pay for reconstruction. There
//! is no animation state: every draw reflects the current data immediately.

use serde::Serialize;

use crate::canvas::{Canvas, Color, ColorStop, LinearGradient, Stroke, TextAlign, TextStyle};
use crate::constants::{MAX_TIME_TICKS, PRICE_TICKS};
use crate::geometry::{ChartLayout, Point, PriceDomain, PriceScale, Rect, Size};
use crate::model::Series;

const LINE_WIDTH: f64 = 1.5;
const AXIS_TEXT: Color = Color::rgb(0x9c, 0xa3, 0xaf);
const POSITIVE: Color = Color::rgb(0x22, 0xc5, 0x5e);
const NEGATIVE: Color = Color::rgb(0xef, 0x44, 0x44);
const HEADER_TEXT: Color = Color::rgb(0xf3, 0xf4, 0xf6);
const TOOLTIP_GUIDE: Color = Color::rgb(0x9c, 0xa3, 0xaf);
const MARKER_RADIUS: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub accent: Color,
    pub canvas: Size,
    pub padding_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeLabel {
    pub text: String,
    pub positive: bool,
}

impl ChangeLabel {
    pub fn for_series(series: &Series) -> Self {
        let change = series.percent_change();
        // avoid rendering "-0.00%"
        let change = if change == 0.0 { 0.0 } else { change };
        Self {
            text: format!("{change:+.2}%"),
            positive: change >= 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub index: usize,
    pub label: String,
    pub price: String,
    pub anchor: Point,
}

#[derive(Debug)]
pub struct ChartHandle {
    style: ChartStyle,
    layout: ChartLayout,
    labels: Vec<String>,
    prices: Vec<f64>,
    bounds: (f64, f64),
    scale: PriceScale,
    gradient: LinearGradient,
    change: ChangeLabel,
    revision: u64,
}

impl ChartHandle {
    pub fn initialize(series: &Series, style: ChartStyle) -> Self {
        let layout = ChartLayout::for_canvas(style.canvas);
        let bounds = series.bounds();
        let domain = PriceDomain::padded(bounds.0, bounds.1, style.padding_fraction);
        Self {
            style,
            layout,
            labels: series.points().iter().map(|p| p.label.clone()).collect(),
            prices: series.prices().collect(),
            bounds,
            scale: PriceScale::new(domain, layout.plot),
            gradient: area_gradient(style.accent, &layout.plot),
            change: ChangeLabel::for_series(series),
            revision: 0,
        }
    }

    /// Replace data and style in place. The gradient is rebuilt because its
    /// stops depend on both the canvas height and the accent color.
    pub fn update(&mut self, series: &Series, style: ChartStyle) {
        self.labels.clear();
        self.labels
            .extend(series.points().iter().map(|p| p.label.clone()));
        self.prices.clear();
        self.prices.extend(series.prices());

        self.style = style;
        self.layout = ChartLayout::for_canvas(style.canvas);
        self.bounds = series.bounds();
        let domain = PriceDomain::padded(self.bounds.0, self.bounds.1, style.padding_fraction);
        self.scale = PriceScale::new(domain, self.layout.plot);
        self.gradient = area_gradient(style.accent, &self.layout.plot);
        self.change = ChangeLabel::for_series(series);
        self.revision += 1;
    }

    /// Restyle without new data, e.g. after a resize or accent change.
    pub fn restyle(&mut self, style: ChartStyle) {
        self.style = style;
        self.layout = ChartLayout::for_canvas(style.canvas);
        let domain = PriceDomain::padded(self.bounds.0, self.bounds.1, style.padding_fraction);
        self.scale = PriceScale::new(domain, self.layout.plot);
        self.gradient = area_gradient(style.accent, &self.layout.plot);
        self.revision += 1;
    }

    pub fn teardown(self) {}

    pub fn scale(&self) -> &PriceScale {
        &self.scale
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn gradient(&self) -> &LinearGradient {
        &self.gradient
    }

    /// Lowest and highest price of the current data.
    pub fn bounds(&self) -> (f64, f64) {
        self.bounds
    }

    pub fn last_price(&self) -> Option<f64> {
        self.prices.last().copied()
    }

    pub fn change(&self) -> &ChangeLabel {
        &self.change
    }

    /// Number of in-place updates since initialization.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn tooltip_at(&self, x: f64) -> Option<Tooltip> {
        let index = self.scale.x_to_index(x, self.prices.len())?;
        let price = *self.prices.get(index)?;
        Some(Tooltip {
            index,
            label: self.labels.get(index).cloned().unwrap_or_default(),
            price: format_price(price),
            anchor: self.point_at(index),
        })
    }

    /// Hover readout for the sample nearest `x`: a solid guide, a marker on
    /// the line and the sample's label and price.
    pub fn draw_tooltip(&self, canvas: &mut dyn Canvas, x: f64) -> Option<Tooltip> {
        let tooltip = self.tooltip_at(x)?;
        let plot = self.layout.plot;
        let anchor = tooltip.anchor;

        canvas.stroke_line(
            Point::new(anchor.x, plot.top),
            Point::new(anchor.x, plot.bottom),
            &Stroke::solid(TOOLTIP_GUIDE.with_alpha(0.4), 1.0),
        );
        let marker = Stroke::solid(self.style.accent, 2.0);
        canvas.stroke_line(
            Point::new(anchor.x - MARKER_RADIUS, anchor.y),
            Point::new(anchor.x + MARKER_RADIUS, anchor.y),
            &marker,
        );
        canvas.stroke_line(
            Point::new(anchor.x, anchor.y - MARKER_RADIUS),
            Point::new(anchor.x, anchor.y + MARKER_RADIUS),
            &marker,
        );

        // keep the readout inside the plot on the right-hand half
        let align = if anchor.x > plot.left + plot.width() / 2.0 {
            TextAlign::Right
        } else {
            TextAlign::Left
        };
        let offset = if align == TextAlign::Right { -6.0 } else { 6.0 };
        canvas.text(
            Point::new(anchor.x + offset, plot.top + 12.0),
            &format!("{}  {}", tooltip.label, tooltip.price),
            &TextStyle {
                color: HEADER_TEXT,
                size: 10.0,
                align,
            },
        );
        Some(tooltip)
    }

    pub fn draw(&self, canvas: &mut dyn Canvas) {
        canvas.clear();

        let points: Vec<Point> = (0..self.prices.len()).map(|i| self.point_at(i)).collect();
        canvas.fill_area(&points, self.layout.plot.bottom, &self.gradient);
        canvas.stroke_polyline(&points, &Stroke::solid(self.style.accent, LINE_WIDTH));

        self.draw_header(canvas);
        self.draw_price_axis(canvas);
        self.draw_time_axis(canvas);
    }

    fn point_at(&self, index: usize) -> Point {
        Point::new(
            self.scale.index_to_x(index, self.prices.len()),
            self.scale.price_to_y(self.prices[index]),
        )
    }

    fn draw_header(&self, canvas: &mut dyn Canvas) {
        let baseline = self.layout.plot.top - 6.0;
        if let Some(last) = self.last_price() {
            canvas.text(
                Point::new(4.0, baseline),
                &format_price(last),
                &TextStyle {
                    color: HEADER_TEXT,
                    size: 13.0,
                    align: TextAlign::Left,
                },
            );
        }
        canvas.text(
            Point::new(self.layout.canvas.width - 4.0, baseline),
            &self.change.text,
            &TextStyle {
                color: if self.change.positive { POSITIVE } else { NEGATIVE },
                size: 11.0,
                align: TextAlign::Right,
            },
        );
    }

    fn draw_price_axis(&self, canvas: &mut dyn Canvas) {
        let style = axis_text_style(TextAlign::Left);
        let domain = self.scale.domain;
        for step in 0..PRICE_TICKS {
            let price = domain.min + domain.span() * step as f64 / (PRICE_TICKS - 1) as f64;
            let y = self.scale.price_to_y(price);
            canvas.text(
                Point::new(self.layout.price_axis.left + 4.0, y),
                &format_price(price),
                &style,
            );
        }
    }

    fn draw_time_axis(&self, canvas: &mut dyn Canvas) {
        let style = axis_text_style(TextAlign::Center);
        let y = self.layout.time_axis.bottom - 4.0;
        for index in time_tick_indices(self.labels.len(), MAX_TIME_TICKS) {
            let x = self.scale.index_to_x(index, self.labels.len());
            canvas.text(Point::new(x, y), &self.labels[index], &style);
        }
    }
}

fn axis_text_style(align: TextAlign) -> TextStyle {
    TextStyle {
        color: AXIS_TEXT,
        size: 10.0,
        align,
    }
}

/// Accent fill fading from 15% through 5% to fully transparent, top to bottom of the plot.
pub fn area_gradient(accent: Color, plot: &Rect) -> LinearGradient {
    LinearGradient {
        start_y: plot.top,
        end_y: plot.bottom,
        stops: vec![
            ColorStop {
                offset: 0.0,
                color: accent.with_alpha(0.15),
            },
            ColorStop {
                offset: 0.5,
                color: accent.with_alpha(0.05),
            },
            ColorStop {
                offset: 1.0,
                color: accent.with_alpha(0.0),
            },
        ],
    }
}

/// Evenly spaced label indices, at most `max_ticks`, always including both ends.
pub fn time_tick_indices(count: usize, max_ticks: usize) -> Vec<usize> {
    if count <= max_ticks {
        return (0..count).collect();
    }
    if max_ticks < 2 {
        return (0..max_ticks).collect();
    }
    let mut indices: Vec<usize> = (0..max_ticks)
        .map(|tick| ((count - 1) as f64 * tick as f64 / (max_ticks - 1) as f64).round() as usize)
        .collect();
    indices.dedup();
    indices
}

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}
