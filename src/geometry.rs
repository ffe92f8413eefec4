//! Canvas-space geometry and the price axis mapping.
//!
//! Canvas coordinates are pixels from the top-left corner of the drawing
//! surface, with y growing downward. Prices grow upward, so the price scale
//! inverts the vertical axis.

use serde::Serialize;

use crate::constants::{HEADER_HEIGHT, PRICE_AXIS_WIDTH, TIME_AXIS_HEIGHT};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn contains(&self, point: Point) -> bool {
        (self.left..=self.right).contains(&point.x) && (self.top..=self.bottom).contains(&point.y)
    }

    pub fn clamp_y(&self, y: f64) -> f64 {
        y.clamp(self.top, self.bottom)
    }
}

/// Regions of the canvas: header strip, plotting rectangle, right price axis, bottom time axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub canvas: Size,
    pub plot: Rect,
    pub price_axis: Rect,
    pub time_axis: Rect,
}

impl ChartLayout {
    pub fn for_canvas(canvas: Size) -> Self {
        let plot_right = (canvas.width - PRICE_AXIS_WIDTH).max(1.0);
        let plot_bottom = (canvas.height - TIME_AXIS_HEIGHT).max(HEADER_HEIGHT + 1.0);
        let plot = Rect {
            left: 0.0,
            top: HEADER_HEIGHT,
            right: plot_right,
            bottom: plot_bottom,
        };
        Self {
            canvas,
            plot,
            price_axis: Rect {
                left: plot_right,
                top: HEADER_HEIGHT,
                right: canvas.width,
                bottom: plot_bottom,
            },
            time_axis: Rect {
                left: 0.0,
                top: plot_bottom,
                right: plot_right,
                bottom: canvas.height,
            },
        }
    }
}

/// Visible price range of the axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceDomain {
    pub min: f64,
    pub max: f64,
}

impl PriceDomain {
    /// Series bounds widened by `padding_fraction` of their span on each side.
    /// A flat series gets a small absolute pad so the axis never collapses.
    pub fn padded(low: f64, high: f64, padding_fraction: f64) -> Self {
        let span = high - low;
        let pad = if span > f64::EPSILON {
            span * padding_fraction
        } else {
            (high.abs() * 0.001).max(0.01)
        };
        Self {
            min: low - pad,
            max: high + pad,
        }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn contains(&self, price: f64) -> bool {
        (self.min..=self.max).contains(&price)
    }
}

/// Pixel <-> price mapping for the plotting rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceScale {
    pub domain: PriceDomain,
    pub plot: Rect,
}

impl PriceScale {
    pub fn new(domain: PriceDomain, plot: Rect) -> Self {
        Self { domain, plot }
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        let ratio = (price - self.domain.min) / self.domain.span();
        self.plot.bottom - ratio * self.plot.height()
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        let ratio = (self.plot.bottom - y) / self.plot.height();
        self.domain.min + ratio * self.domain.span()
    }

    /// Horizontal position of sample `index` out of `count`, spread across the plot.
    pub fn index_to_x(&self, index: usize, count: usize) -> f64 {
        if count <= 1 {
            return self.plot.left + self.plot.width() / 2.0;
        }
        self.plot.left + self.plot.width() * index as f64 / (count - 1) as f64
    }

    pub fn x_to_index(&self, x: f64, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        if count == 1 {
            return Some(0);
        }
        let ratio = ((x - self.plot.left) / self.plot.width()).clamp(0.0, 1.0);
        Some((ratio * (count - 1) as f64).round() as usize)
    }

    /// Price-space hit tolerance as a fraction of the visible span.
    pub fn tolerance(&self, fraction: f64) -> f64 {
        self.domain.span() * fraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale() -> PriceScale {
        let plot = Rect {
            left: 0.0,
            top: 0.0,
            right: 200.0,
            bottom: 100.0,
        };
        PriceScale::new(
            PriceDomain {
                min: 100.0,
                max: 200.0,
            },
            plot,
        )
    }

    #[test]
    fn price_and_pixel_mapping_invert_each_other() {
        let scale = scale();
        assert_eq!(scale.price_to_y(200.0), 0.0);
        assert_eq!(scale.price_to_y(100.0), 100.0);
        assert_eq!(scale.y_to_price(25.0), 175.0);
        let y = scale.price_to_y(137.5);
        assert!((scale.y_to_price(y) - 137.5).abs() < 1e-9);
    }

    #[test]
    fn index_mapping_spans_plot_width() {
        let scale = scale();
        assert_eq!(scale.index_to_x(0, 5), 0.0);
        assert_eq!(scale.index_to_x(4, 5), 200.0);
        assert_eq!(scale.x_to_index(149.0, 5), Some(3));
        assert_eq!(scale.x_to_index(-40.0, 5), Some(0));
        assert_eq!(scale.x_to_index(10.0, 0), None);
    }

    #[test]
    fn padded_domain_handles_flat_series() {
        let domain = PriceDomain::padded(100.0, 110.0, 0.1);
        assert!((domain.min - 99.0).abs() < 1e-9);
        assert!((domain.max - 111.0).abs() < 1e-9);

        let flat = PriceDomain::padded(50.0, 50.0, 0.1);
        assert!(flat.span() > 0.0);
        assert!(flat.contains(50.0));
    }

    #[test]
    fn layout_reserves_axis_gutters() {
        let layout = ChartLayout::for_canvas(Size::new(320.0, 160.0));
        assert_eq!(layout.plot.right, 320.0 - PRICE_AXIS_WIDTH);
        assert_eq!(layout.plot.bottom, 160.0 - TIME_AXIS_HEIGHT);
        assert_eq!(layout.plot.top, HEADER_HEIGHT);
        assert!(layout.plot.contains(Point::new(10.0, 80.0)));
        assert!(!layout.plot.contains(Point::new(300.0, 80.0)));
    }
}
