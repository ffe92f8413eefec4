//! Pointer and keyboard state machine for alert-line manipulation.
//!
//! One controller lives for the whole chart session and receives every input
//! event in canvas-local coordinates. Dragging repositions the alert on each
//! move without persisting; the single persist happens on release.

use crate::alerts::AlertStore;
use crate::geometry::{Point, PriceScale};
use crate::overlay::Crosshair;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerMove(Point),
    PointerDown(Point),
    PointerUp(Point),
    PointerLeave,
    ModifierDown,
    ModifierUp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerState {
    #[default]
    Idle,
    Hovering(usize),
    Dragging(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    ResizeVertical,
    Crosshair,
}

/// Which layers an event invalidated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Redraw {
    #[default]
    None,
    Overlay,
    Full,
}

/// What the host should do after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Response {
    pub cursor: Cursor,
    pub redraw: Redraw,
    pub persist: bool,
}

#[derive(Debug)]
pub struct InteractionController {
    pointer: PointerState,
    modifier_held: bool,
    position: Option<Point>,
    cursor: Cursor,
    tolerance_fraction: f64,
}

impl InteractionController {
    pub fn new(tolerance_fraction: f64) -> Self {
        Self {
            pointer: PointerState::Idle,
            modifier_held: false,
            position: None,
            cursor: Cursor::Default,
            tolerance_fraction,
        }
    }

    pub fn state(&self) -> PointerState {
        self.pointer
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn crosshair(&self) -> Crosshair {
        if self.modifier_held {
            Crosshair::Active(self.position)
        } else {
            Crosshair::Hidden
        }
    }

    /// Apply one input event. `scale` is `None` while no chart is drawn, in
    /// which case only keyboard and leave events have an effect.
    pub fn handle(
        &mut self,
        event: InputEvent,
        scale: Option<&PriceScale>,
        alerts: &mut AlertStore,
        instrument: &str,
    ) -> Response {
        match event {
            InputEvent::ModifierDown => self.set_modifier(true),
            InputEvent::ModifierUp => self.set_modifier(false),
            InputEvent::PointerLeave => self.leave(),
            InputEvent::PointerMove(point) => match scale {
                Some(scale) => self.pointer_move(point, scale, alerts, instrument),
                None => {
                    self.position = Some(point);
                    self.respond(Redraw::None, false)
                }
            },
            InputEvent::PointerDown(point) => match scale {
                Some(scale) => self.pointer_down(point, scale, alerts.levels_for(instrument)),
                None => self.respond(Redraw::None, false),
            },
            InputEvent::PointerUp(point) => match scale {
                Some(scale) => self.pointer_up(point, scale, alerts, instrument),
                None => self.respond(Redraw::None, false),
            },
        }
    }

    /// Forget any hovered or dragged index after levels were removed behind
    /// the controller's back. An active drag ends without a persist.
    pub fn levels_changed(&mut self) {
        if self.pointer == PointerState::Idle {
            return;
        }
        self.pointer = PointerState::Idle;
        self.cursor = self.resting_cursor();
    }

    fn set_modifier(&mut self, held: bool) -> Response {
        if self.modifier_held == held {
            return self.respond(Redraw::None, false);
        }
        self.modifier_held = held;
        self.cursor = self.resting_cursor();
        self.respond(Redraw::Overlay, false)
    }

    fn pointer_move(
        &mut self,
        point: Point,
        scale: &PriceScale,
        alerts: &mut AlertStore,
        instrument: &str,
    ) -> Response {
        self.position = Some(point);

        if let PointerState::Dragging(index) = self.pointer {
            let y = scale.plot.clamp_y(point.y);
            alerts.reposition(instrument, index, scale.y_to_price(y));
            return self.respond(Redraw::Full, false);
        }

        let price = scale.y_to_price(point.y);
        let hit = hit_test(
            alerts.levels_for(instrument),
            price,
            scale.tolerance(self.tolerance_fraction),
        );
        self.pointer = match hit {
            Some(index) if scale.plot.contains(point) => PointerState::Hovering(index),
            _ => PointerState::Idle,
        };
        self.cursor = self.resting_cursor();
        // crosshair or hover tooltip follows the pointer
        self.respond(Redraw::Overlay, false)
    }

    fn pointer_down(&mut self, point: Point, scale: &PriceScale, levels: &[f64]) -> Response {
        self.position = Some(point);
        if self.modifier_held || !scale.plot.contains(point) {
            return self.respond(Redraw::None, false);
        }

        let price = scale.y_to_price(point.y);
        match hit_test(levels, price, scale.tolerance(self.tolerance_fraction)) {
            Some(index) => {
                self.pointer = PointerState::Dragging(index);
                self.cursor = Cursor::ResizeVertical;
                self.respond(Redraw::None, false)
            }
            None => self.respond(Redraw::None, false),
        }
    }

    fn pointer_up(
        &mut self,
        point: Point,
        scale: &PriceScale,
        alerts: &mut AlertStore,
        instrument: &str,
    ) -> Response {
        self.position = Some(point);

        if let PointerState::Dragging(index) = self.pointer {
            self.pointer = PointerState::Hovering(index);
            self.cursor = Cursor::ResizeVertical;
            return self.respond(Redraw::Full, true);
        }

        if !self.modifier_held || !scale.plot.contains(point) {
            return self.respond(Redraw::None, false);
        }

        let price = scale.y_to_price(point.y);
        let tolerance = scale.tolerance(self.tolerance_fraction);
        match hit_test(alerts.levels_for(instrument), price, tolerance) {
            Some(index) => {
                alerts.remove(instrument, index);
            }
            None => alerts.add(instrument, price),
        }
        self.pointer = PointerState::Idle;
        self.cursor = Cursor::Crosshair;
        self.respond(Redraw::Full, true)
    }

    fn leave(&mut self) -> Response {
        self.position = None;
        self.pointer = PointerState::Idle;
        self.cursor = Cursor::Default;
        self.respond(Redraw::Full, false)
    }

    fn resting_cursor(&self) -> Cursor {
        match self.pointer {
            PointerState::Hovering(_) | PointerState::Dragging(_) => Cursor::ResizeVertical,
            PointerState::Idle if self.modifier_held => Cursor::Crosshair,
            PointerState::Idle => Cursor::Default,
        }
    }

    fn respond(&self, redraw: Redraw, persist: bool) -> Response {
        Response {
            cursor: self.cursor,
            redraw,
            persist,
        }
    }
}

/// Index of the level closest to `price` within `tolerance`, if any.
pub fn hit_test(levels: &[f64], price: f64, tolerance: f64) -> Option<usize> {
    levels
        .iter()
        .enumerate()
        .map(|(index, level)| (index, (level - price).abs()))
        .filter(|(_, distance)| *distance <= tolerance)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::HIT_TOLERANCE_FRACTION;
    use crate::geometry::{PriceDomain, Rect};

    const INSTRUMENT: &str = "AAA";

    // domain 100..200 over a 100px tall plot: one pixel per price unit
    fn scale() -> PriceScale {
        PriceScale::new(
            PriceDomain {
                min: 100.0,
                max: 200.0,
            },
            Rect {
                left: 0.0,
                top: 0.0,
                right: 200.0,
                bottom: 100.0,
            },
        )
    }

    fn at_price(price: f64) -> Point {
        Point::new(50.0, scale().price_to_y(price))
    }

    fn controller() -> InteractionController {
        InteractionController::new(HIT_TOLERANCE_FRACTION)
    }

    fn store(levels: &[f64]) -> AlertStore {
        let mut store = AlertStore::new();
        for level in levels {
            store.add(INSTRUMENT, *level);
        }
        store
    }

    #[test]
    fn hit_test_prefers_closest_level_within_tolerance() {
        assert_eq!(hit_test(&[100.0, 101.5, 103.0], 101.0, 2.0), Some(1));
        assert_eq!(hit_test(&[100.0], 103.0, 2.0), None);
        assert_eq!(hit_test(&[], 103.0, 2.0), None);
    }

    #[test]
    fn hover_sets_resize_cursor() {
        let mut ctl = controller();
        let mut alerts = store(&[150.0]);
        let scale = scale();

        let response = ctl.handle(
            InputEvent::PointerMove(at_price(151.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_eq!(ctl.state(), PointerState::Hovering(0));
        assert_eq!(response.cursor, Cursor::ResizeVertical);
        assert_eq!(response.redraw, Redraw::Overlay);

        ctl.handle(
            InputEvent::PointerMove(at_price(170.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_eq!(ctl.state(), PointerState::Idle);
        assert_eq!(ctl.cursor(), Cursor::Default);
    }

    #[test]
    fn modifier_tracks_crosshair_with_overlay_redraws() {
        let mut ctl = controller();
        let mut alerts = store(&[]);
        let scale = scale();

        let response = ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        assert_eq!(response.redraw, Redraw::Overlay);
        assert_eq!(ctl.crosshair(), Crosshair::Active(None));

        let point = at_price(140.0);
        let response = ctl.handle(
            InputEvent::PointerMove(point),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_eq!(response.cursor, Cursor::Crosshair);
        assert_eq!(response.redraw, Redraw::Overlay);
        assert_eq!(ctl.crosshair(), Crosshair::Active(Some(point)));

        let repeat = ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        assert_eq!(repeat.redraw, Redraw::None);

        ctl.handle(InputEvent::ModifierUp, Some(&scale), &mut alerts, INSTRUMENT);
        assert_eq!(ctl.crosshair(), Crosshair::Hidden);
        assert_eq!(ctl.cursor(), Cursor::Default);
    }

    #[test]
    fn drag_repositions_without_persisting_until_release() {
        let mut ctl = controller();
        let mut alerts = store(&[120.0]);
        let scale = scale();

        let down = ctl.handle(
            InputEvent::PointerDown(at_price(120.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_eq!(ctl.state(), PointerState::Dragging(0));
        assert!(!down.persist);

        let moved = ctl.handle(
            InputEvent::PointerMove(at_price(130.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!((alerts.levels_for(INSTRUMENT)[0] - 130.0).abs() < 1e-9);
        assert!(!moved.persist);
        assert_eq!(moved.redraw, Redraw::Full);

        let up = ctl.handle(
            InputEvent::PointerUp(at_price(130.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!(up.persist);
        assert_eq!(ctl.state(), PointerState::Hovering(0));
    }

    #[test]
    fn drag_clamps_to_plot_rectangle() {
        let mut ctl = controller();
        let mut alerts = store(&[150.0]);
        let scale = scale();

        ctl.handle(
            InputEvent::PointerDown(at_price(150.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        ctl.handle(
            InputEvent::PointerMove(Point::new(50.0, -80.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_eq!(alerts.levels_for(INSTRUMENT), &[200.0]);
    }

    #[test]
    fn modifier_press_suppresses_drag_and_click_deletes() {
        let mut ctl = controller();
        let mut alerts = store(&[150.0]);
        let scale = scale();

        ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        ctl.handle(
            InputEvent::PointerDown(at_price(150.5)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert_ne!(ctl.state(), PointerState::Dragging(0));

        let up = ctl.handle(
            InputEvent::PointerUp(at_price(150.5)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!(up.persist);
        assert!(alerts.levels_for(INSTRUMENT).is_empty());
    }

    #[test]
    fn modifier_click_on_empty_space_adds_alert() {
        let mut ctl = controller();
        let mut alerts = store(&[]);
        let scale = scale();

        ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        let up = ctl.handle(
            InputEvent::PointerUp(at_price(175.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!(up.persist);
        assert_eq!(up.redraw, Redraw::Full);
        assert!((alerts.levels_for(INSTRUMENT)[0] - 175.0).abs() < 1e-9);
    }

    #[test]
    fn plain_click_and_clicks_outside_plot_do_nothing() {
        let mut ctl = controller();
        let mut alerts = store(&[]);
        let scale = scale();

        let plain = ctl.handle(
            InputEvent::PointerUp(at_price(175.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!(!plain.persist);

        ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        let outside = ctl.handle(
            InputEvent::PointerUp(Point::new(230.0, 50.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!(!outside.persist);
        assert!(alerts.levels_for(INSTRUMENT).is_empty());
    }

    #[test]
    fn releasing_modifier_mid_drag_keeps_dragging() {
        let mut ctl = controller();
        let mut alerts = store(&[150.0]);
        let scale = scale();

        ctl.handle(
            InputEvent::PointerDown(at_price(150.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        ctl.handle(InputEvent::ModifierUp, Some(&scale), &mut alerts, INSTRUMENT);
        assert_eq!(ctl.state(), PointerState::Dragging(0));

        ctl.handle(
            InputEvent::PointerMove(at_price(160.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        assert!((alerts.levels_for(INSTRUMENT)[0] - 160.0).abs() < 1e-9);
    }

    #[test]
    fn leaving_canvas_cancels_drag_without_persisting() {
        let mut ctl = controller();
        let mut alerts = store(&[150.0]);
        let scale = scale();

        ctl.handle(InputEvent::ModifierDown, Some(&scale), &mut alerts, INSTRUMENT);
        ctl.handle(InputEvent::ModifierUp, Some(&scale), &mut alerts, INSTRUMENT);
        ctl.handle(
            InputEvent::PointerDown(at_price(150.0)),
            Some(&scale),
            &mut alerts,
            INSTRUMENT,
        );
        let left = ctl.handle(InputEvent::PointerLeave, Some(&scale), &mut alerts, INSTRUMENT);

        assert!(!left.persist);
        assert_eq!(left.cursor, Cursor::Default);
        assert_eq!(left.redraw, Redraw::Full);
        assert_eq!(ctl.state(), PointerState::Idle);
        assert_eq!(ctl.position(), None);
    }

    #[test]
    fn pointer_events_without_chart_are_ignored() {
        let mut ctl = controller();
        let mut alerts = store(&[]);

        ctl.handle(InputEvent::ModifierDown, None, &mut alerts, INSTRUMENT);
        let up = ctl.handle(
            InputEvent::PointerUp(Point::new(10.0, 10.0)),
            None,
            &mut alerts,
            INSTRUMENT,
        );
        assert!(!up.persist);
        assert!(alerts.levels_for(INSTRUMENT).is_empty());
    }
}
