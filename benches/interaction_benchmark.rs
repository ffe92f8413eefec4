use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quote_overlay::alerts::AlertStore;
use quote_overlay::canvas::{Color, DisplayList};
use quote_overlay::chart::{ChartHandle, ChartStyle};
use quote_overlay::constants::HIT_TOLERANCE_FRACTION;
use quote_overlay::geometry::{Point, Size};
use quote_overlay::interaction::{InputEvent, InteractionController};
use quote_overlay::logging;
use quote_overlay::overlay::{self, Crosshair, OverlaySnapshot};
use quote_overlay::series::{normalize, RawQuote};

fn sample_quotes(count: usize) -> Vec<RawQuote> {
    (0..count)
        .rev()
        .map(|i| RawQuote {
            datetime: format!("2024-05-01 {:02}:{:02}:00", 8 + i / 60, i % 60),
            close: format!("{:.4}", 100.0 + (i as f64 * 0.37).sin() * 5.0),
        })
        .collect()
}

fn bench_drag_redraw(c: &mut Criterion) {
    logging::set_silent(true);
    let series = normalize(&sample_quotes(240)).expect("series");
    let style = ChartStyle {
        accent: Color::rgb(0x4f, 0x9c, 0xf9),
        canvas: Size::new(320.0, 160.0),
        padding_fraction: 0.1,
    };
    let chart = ChartHandle::initialize(&series, style);
    let scale = *chart.scale();

    let mut alerts = AlertStore::new();
    for level in [96.0, 98.5, 101.0, 103.5] {
        alerts.add("BENCH", level);
    }
    let mut controller = InteractionController::new(HIT_TOLERANCE_FRACTION);
    let grab = Point::new(120.0, scale.price_to_y(101.0));
    controller.handle(InputEvent::PointerDown(grab), Some(&scale), &mut alerts, "BENCH");

    let mut step = 0usize;
    c.bench_function("drag_move_and_redraw", |b| {
        b.iter(|| {
            step = (step + 1) % 100;
            let y = scale.plot.top + scale.plot.height() * step as f64 / 100.0;
            controller.handle(
                InputEvent::PointerMove(Point::new(120.0, y)),
                Some(&scale),
                &mut alerts,
                "BENCH",
            );
            let mut frame = DisplayList::new(style.canvas);
            chart.draw(&mut frame);
            overlay::paint(
                &mut frame,
                &scale,
                &OverlaySnapshot {
                    levels: alerts.levels_for("BENCH"),
                    crosshair: Crosshair::Hidden,
                },
            );
            black_box(frame.commands().len());
        });
    });
}

fn bench_refresh_update(c: &mut Criterion) {
    logging::set_silent(true);
    let raw = sample_quotes(240);
    let style = ChartStyle {
        accent: Color::rgb(0x22, 0xc5, 0x5e),
        canvas: Size::new(640.0, 320.0),
        padding_fraction: 0.1,
    };
    let mut chart = ChartHandle::initialize(&normalize(&raw).expect("series"), style);

    c.bench_function("ingest_and_update_in_place", |b| {
        b.iter(|| {
            let series = normalize(black_box(&raw)).expect("series");
            chart.update(&series, style);
            black_box(chart.revision());
        });
    });
}

criterion_group!(benches, bench_drag_redraw, bench_refresh_update);
criterion_main!(benches);
