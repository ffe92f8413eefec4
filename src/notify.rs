use std::io::{self, Write};

use serde_json::json;

use crate::chart::format_price;
use crate::crossing::Direction;
use crate::logging;

/// Notification collaborator: invoked with both calls once per detected crossing.
pub trait Notifier {
    fn notify(&mut self, instrument: &str, direction: Direction, level: f64);
    fn play_tone(&mut self);
}

/// Logs alerts as structured events and rings the terminal bell.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    bell: bool,
}

impl ConsoleNotifier {
    pub fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, instrument: &str, direction: Direction, level: f64) {
        logging::info(
            "alerts.notify",
            &format!("{instrument} {direction} {}", format_price(level)),
            json!({ "instrument": instrument, "direction": direction, "level": level }),
        );
    }

    fn play_tone(&mut self) {
        if !self.bell {
            return;
        }
        let mut stderr = io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}
