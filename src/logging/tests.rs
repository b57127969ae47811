// making-mirrors: Bare Mirror Synchronizer
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};

#[test]
fn test_log_level_filters() {
    let filters: Vec<_> = (0..=6)
        .filter_map(LogLevel::from_u8)
        .map(|level| format!("{} => {}", level.as_u8(), level.to_filter_string()))
        .collect();

    insta::assert_snapshot!(filters.join("\n"), @r"
    0 => off
    1 => error
    2 => warn
    3 => info
    4 => debug
    5 => info,making_mirrors=trace
    6 => trace
    ");
}

#[test]
fn test_log_level_rejects_out_of_range() {
    assert!(LogLevel::from_u8(7).is_none());
    let err = LogLevel::new(9).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'log_level' in section '[global]': log level must be 0-6, got 9");
}

#[test]
fn test_log_level_deserializes_from_integer() {
    let level: LogLevel = serde_json::from_str("4").unwrap();
    assert_eq!(level, LogLevel::DEBUG);
    assert!(serde_json::from_str::<LogLevel>("12").is_err());
}

#[test]
fn test_log_config_defaults() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::INFO);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
    assert!(config.show_timestamps());
    assert!(!config.show_target());
}

#[test]
fn test_log_config_builder_setters() {
    let config = LogConfig::builder()
        .with_console_level(LogLevel::WARN)
        .with_log_file("sync.log".to_string())
        .with_show_timestamps(false)
        .build();

    assert_eq!(config.console_level(), LogLevel::WARN);
    assert_eq!(config.log_file(), Some("sync.log"));
    assert!(!config.show_timestamps());
}
