use quote_overlay::app::{self, AppConfig};
use quote_overlay::logging;
use quote_overlay::settings::{JsonFileStore, Settings};

#[tokio::test(start_paused = true)]
async fn demo_run_applies_refreshes_until_budget() {
    logging::set_silent(true);
    let path = std::env::temp_dir().join(format!("quote-overlay-app-{}.json", std::process::id()));
    let store = JsonFileStore::new(&path);
    let mut settings = Settings {
        instrument: "SIM".to_string(),
        refresh_interval: 10,
        ..Settings::default()
    };
    settings.alerts.add("OTHER", 1.0);
    store.write(&settings).expect("seed settings");

    let summary = app::run(AppConfig {
        settings_path: path.clone(),
        demo: true,
        bell: false,
        max_refreshes: Some(3),
        ..AppConfig::default()
    })
    .await
    .expect("demo run");

    assert_eq!(summary.applied, 3);
    assert_eq!(summary.fell_back, 0);
    assert_eq!(summary.discarded, 0);

    let reloaded = store.load().expect("settings still readable");
    assert_eq!(reloaded.alerts.levels_for("OTHER"), &[1.0]);
    let _ = std::fs::remove_file(&path);
}
