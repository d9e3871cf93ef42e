use std::fs;
use winbridge_services::SettingsRegistry;

#[tokio::test]
async fn test_settings_registry_empty() {
    let registry = SettingsRegistry::empty();
    let config = registry.get();
    assert_eq!(config.general.debug, Some(false));
    assert_eq!(config.mouse.natural_scrolling, Some(false));
    assert_eq!(config.mouse.double_click_interval_ms, None);
}

#[tokio::test]
async fn test_settings_load_from_paths() {
    let test_dir = std::env::temp_dir().join("winbridge_settings_test");
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).unwrap();
    }
    fs::create_dir_all(&test_dir).unwrap();

    let system = test_dir.join("system.toml");
    fs::write(
        &system,
        "[mouse]\ndouble_click_interval_ms = 500\nwheel_scroll_lines = 5\n\n[display]\nfallback_refresh_rate = 75.0\n",
    )
    .unwrap();
    let user = test_dir.join("user.toml");
    fs::write(&user, "[mouse]\ndouble_click_interval_ms = 300\nnatural_scrolling = true\n").unwrap();

    let mut registry = SettingsRegistry::empty();
    let results = registry.load_from_paths_async(vec![system, user]).await;
    assert!(results.iter().all(|result| result.is_ok()));

    let config = registry.get();
    assert_eq!(config.mouse.double_click_interval_ms, Some(300));
    assert_eq!(config.mouse.wheel_scroll_lines, Some(5));
    assert_eq!(config.mouse.natural_scrolling, Some(true));
    assert_eq!(config.display.fallback_refresh_rate, Some(75.0));

    fs::remove_dir_all(&test_dir).unwrap();
}

#[tokio::test]
async fn test_settings_bad_files_reported_and_skipped() {
    let test_dir = std::env::temp_dir().join("winbridge_settings_bad_test");
    if test_dir.exists() {
        fs::remove_dir_all(&test_dir).unwrap();
    }
    fs::create_dir_all(&test_dir).unwrap();

    let broken = test_dir.join("broken.toml");
    fs::write(&broken, "[mouse\n").unwrap();
    let missing = test_dir.join("missing.toml");
    let good = test_dir.join("good.toml");
    fs::write(&good, "[application]\nquit_on_last_window_closed = false\n").unwrap();

    let mut registry = SettingsRegistry::empty();
    let results = registry.load_from_paths_async(vec![broken, missing, good]).await;

    assert!(results[0].is_err());
    assert!(results[1].is_err());
    assert!(results[2].is_ok());
    assert_eq!(registry.get().application.quit_on_last_window_closed, Some(false));

    fs::remove_dir_all(&test_dir).unwrap();
}
