pub const SETTINGS_PATH: &str = "overlay-settings.json";

pub const DEFAULT_INSTRUMENT: &str = "EUR/USD";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_ACCENT_COLOR: &str = "#4f9cf9";
pub const DEFAULT_OPACITY: f64 = 0.9;
pub const DEFAULT_REFRESH_SECS: u64 = 60;
pub const MIN_REFRESH_SECS: u64 = 10;
pub const MIN_OPACITY: f64 = 0.1;
pub const MAX_OPACITY: f64 = 1.0;

pub const DEFAULT_CANVAS_WIDTH: f64 = 320.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 160.0;
pub const PRICE_AXIS_WIDTH: f64 = 56.0;
pub const TIME_AXIS_HEIGHT: f64 = 18.0;
pub const HEADER_HEIGHT: f64 = 22.0;

pub const PRUNE_PADDING_FRACTION: f64 = 0.10;
pub const HIT_TOLERANCE_FRACTION: f64 = 0.02;
pub const MAX_TIME_TICKS: usize = 5;
pub const PRICE_TICKS: usize = 5;

pub const TWELVE_DATA_BASE_URL: &str = "https://api.twelvedata.com";
pub const FEED_OUTPUT_SIZE: usize = 60;
