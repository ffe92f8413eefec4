use serde::Serialize;
use thiserror::Error;

use crate::geometry::{Point, Size};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("expected #RRGGBB, got {0:?}")]
    Format(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f64,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, alpha: 1.0 }
    }

    pub fn from_hex(hex: &str) -> Result<Self, ColorError> {
        let digits = hex
            .strip_prefix('#')
            .filter(|digits| digits.len() == 6 && digits.is_ascii())
            .ok_or_else(|| ColorError::Format(hex.to_string()))?;
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::Format(hex.to_string()))
        };
        Ok(Self::rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    pub fn with_alpha(self, alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stroke {
    pub color: Color,
    pub width: f64,
    /// Dash and gap lengths in pixels; empty for a solid line.
    pub dash: Vec<f64>,
}

impl Stroke {
    pub fn solid(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            dash: Vec::new(),
        }
    }

    pub fn dashed(color: Color, width: f64, dash: &[f64]) -> Self {
        Self {
            color,
            width,
            dash: dash.to_vec(),
        }
    }

    pub fn is_dashed(&self) -> bool {
        !self.dash.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Color,
}

/// Vertical gradient between two canvas rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearGradient {
    pub start_y: f64,
    pub end_y: f64,
    pub stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    pub color: Color,
    pub size: f64,
    pub align: TextAlign,
}

/// 2D drawing surface the chart and overlay paint onto.
pub trait Canvas {
    fn size(&self) -> Size;
    fn clear(&mut self);
    /// Fill the region between `points` and the horizontal `baseline` row.
    fn fill_area(&mut self, points: &[Point], baseline: f64, fill: &LinearGradient);
    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke);
    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke);
    fn text(&mut self, at: Point, text: &str, style: &TextStyle);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear,
    FillArea {
        points: Vec<Point>,
        baseline: f64,
        fill: LinearGradient,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    Text {
        at: Point,
        text: String,
        style: TextStyle,
    },
}

/// Canvas that records draw commands instead of rasterizing them.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayList {
    size: Size,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn dashed_lines(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Line { from, to, stroke } if stroke.is_dashed() => Some((*from, *to)),
            _ => None,
        })
    }
}

impl Canvas for DisplayList {
    fn size(&self) -> Size {
        self.size
    }

    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_area(&mut self, points: &[Point], baseline: f64, fill: &LinearGradient) {
        self.commands.push(DrawCommand::FillArea {
            points: points.to_vec(),
            baseline,
            fill: fill.clone(),
        });
    }

    fn stroke_polyline(&mut self, points: &[Point], stroke: &Stroke) {
        self.commands.push(DrawCommand::Polyline {
            points: points.to_vec(),
            stroke: stroke.clone(),
        });
    }

    fn stroke_line(&mut self, from: Point, to: Point, stroke: &Stroke) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            stroke: stroke.clone(),
        });
    }

    fn text(&mut self, at: Point, text: &str, style: &TextStyle) {
        self.commands.push(DrawCommand::Text {
            at,
            text: text.to_string(),
            style: style.clone(),
        });
    }
}
