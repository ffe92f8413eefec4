use crate::canvas::{Canvas, Color, Stroke};
use crate::geometry::{Point, PriceScale};

const ALERT_LINE: Color = Color {
    r: 0xf5,
    g: 0x9e,
    b: 0x0b,
    alpha: 0.6,
};
const CROSSHAIR_LINE: Color = Color {
    r: 0xff,
    g: 0xff,
    b: 0xff,
    alpha: 0.25,
};
const ALERT_DASH: [f64; 2] = [6.0, 4.0];
const CROSSHAIR_DASH: [f64; 2] = [3.0, 3.0];

/// Crosshair mode as seen by the painter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Crosshair {
    #[default]
    Hidden,
    /// Modifier held; `None` until the pointer has been seen over the canvas.
    Active(Option<Point>),
}

/// Read-only state the painter needs for one redraw.
#[derive(Debug, Clone, Copy)]
pub struct OverlaySnapshot<'a> {
    pub levels: &'a [f64],
    pub crosshair: Crosshair,
}

/// Draw alert lines, then the crosshair, on top of an already drawn chart.
pub fn paint(canvas: &mut dyn Canvas, scale: &PriceScale, snapshot: &OverlaySnapshot<'_>) {
    let plot = scale.plot;

    let alert_stroke = Stroke::dashed(ALERT_LINE, 1.0, &ALERT_DASH);
    for &level in snapshot.levels {
        if !scale.domain.contains(level) {
            continue;
        }
        let y = scale.price_to_y(level);
        canvas.stroke_line(
            Point::new(plot.left, y),
            Point::new(plot.right, y),
            &alert_stroke,
        );
    }

    if let Crosshair::Active(Some(pointer)) = snapshot.crosshair {
        if plot.contains(pointer) {
            let stroke = Stroke::dashed(CROSSHAIR_LINE, 1.0, &CROSSHAIR_DASH);
            canvas.stroke_line(
                Point::new(pointer.x, plot.top),
                Point::new(pointer.x, plot.bottom),
                &stroke,
            );
            canvas.stroke_line(
                Point::new(plot.left, pointer.y),
                Point::new(plot.right, pointer.y),
                &stroke,
            );
        }
    }
}
