//! Layered configuration loading through the process environment.
//!
//! Kept to a single test so no other test in this binary races on env vars.

use rsi_alerts::config::CONFIG_PATH_ENV;
use rsi_alerts::RsiAlertConfig;
use std::env;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_file_env_and_credential_layers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("rsi_alerts.toml");
    fs::write(
        &path,
        r#"
symbols = ["DOGEUSDT", "PEPEUSDT"]
rsi_period = 14
rsi_threshold = 30.0
poll_interval_secs = 60

[telegram]
chat_id = "from-file"
"#,
    )
    .unwrap();

    env::set_var(CONFIG_PATH_ENV, &path);
    env::set_var("RSI_ALERTS__RSI_THRESHOLD", "20.5");
    env::set_var("RSI_ALERTS__EXCHANGE__CATEGORIES", "spot,linear");
    env::set_var("TELEGRAM_TOKEN", "42:secret");
    env::set_var("TELEGRAM_CHAT_ID", "-100123");
    env::remove_var("BYBIT_API_KEY");
    env::remove_var("BYBIT_API_SECRET");

    let config = RsiAlertConfig::load().unwrap();

    // File layer
    assert_eq!(config.symbols, vec!["DOGEUSDT", "PEPEUSDT"]);
    assert_eq!(config.rsi_period, 14);
    assert_eq!(config.poll_interval_secs, 60);
    // Prefixed environment beats the file
    assert_eq!(config.rsi_threshold, 20.5);
    assert_eq!(config.exchange.categories, vec!["spot", "linear"]);
    // Plain credential variables beat everything
    assert_eq!(config.telegram.bot_token, "42:secret");
    assert_eq!(config.telegram.chat_id, "-100123");
    assert!(config.exchange.api_key.is_none());
    // Untouched keys keep their defaults
    assert_eq!(config.interval, "240");
    assert_eq!(config.candle_limit, 100);
    assert!(config.validate().is_ok());

    // Without the token the loaded config is rejected
    env::remove_var("TELEGRAM_TOKEN");
    let config = RsiAlertConfig::load().unwrap();
    assert!(config.telegram.bot_token.is_empty());
    assert!(config.validate().is_err());

    for var in [
        CONFIG_PATH_ENV,
        "RSI_ALERTS__RSI_THRESHOLD",
        "RSI_ALERTS__EXCHANGE__CATEGORIES",
        "TELEGRAM_CHAT_ID",
    ] {
        env::remove_var(var);
    }
}
