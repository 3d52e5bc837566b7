use std::fs;
use std::path::PathBuf;

use fortune_core::config::{FortuneConfig, SearchSet, DEFAULT_FORTUNE_PATH, DEFAULT_OFFENSIVE_PATH};
use fortune_core::tree::ProbabilityPath;
use fortune_core::FortuneError;
use tempfile::tempdir;

#[test]
fn defaults_match_the_classic_layout() {
    let config = FortuneConfig::default();
    assert_eq!(config.fortune_paths, vec![PathBuf::from(DEFAULT_FORTUNE_PATH)]);
    assert_eq!(config.offensive_paths, vec![PathBuf::from(DEFAULT_OFFENSIVE_PATH)]);
    assert_eq!(config.longest_short, 160);
}

#[test]
fn partial_config_file_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fortune.json");
    fs::write(&path, r#"{"fortune_paths": ["/srv/fortunes"], "longest_short": 80}"#).unwrap();

    let config = FortuneConfig::load(&path).unwrap();

    assert_eq!(config.fortune_paths, vec![PathBuf::from("/srv/fortunes")]);
    assert_eq!(config.longest_short, 80);
    assert_eq!(config.offensive_paths, FortuneConfig::default().offensive_paths);
    assert_eq!(config.min_wait_seconds, 6);
}

#[test]
fn malformed_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("fortune.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(FortuneConfig::load(&path), Err(FortuneError::Config(_))));
    assert!(matches!(
        FortuneConfig::load(&dir.path().join("absent.json")),
        Err(FortuneError::Config(_))
    ));
}

#[test]
fn search_sets_select_paths() {
    let config = FortuneConfig {
        fortune_paths: vec!["normal".into()],
        offensive_paths: vec!["off".into()],
        ..FortuneConfig::default()
    };

    assert_eq!(config.search_paths(SearchSet::Normal), vec![ProbabilityPath::new("normal")]);
    assert_eq!(config.search_paths(SearchSet::Offensive), vec![ProbabilityPath::new("off")]);
    assert_eq!(
        config.search_paths(SearchSet::All),
        vec![ProbabilityPath::new("normal"), ProbabilityPath::new("off")]
    );
}

#[test]
fn localized_directory_is_used_when_present() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("fortunes");
    fs::create_dir_all(base.join("de")).unwrap();
    let off = dir.path().join("off");
    fs::create_dir_all(&off).unwrap();

    let config = FortuneConfig {
        fortune_paths: vec![base.clone()],
        offensive_paths: vec![off.clone()],
        ..FortuneConfig::default()
    };

    let german = config.clone().localized(Some("de_DE.UTF-8"));
    assert_eq!(german.fortune_paths, vec![base.join("de")]);
    assert_eq!(german.offensive_paths, vec![off]);

    assert_eq!(config.clone().localized(Some("C")), config);
    assert_eq!(config.clone().localized(None), config);
}

#[test]
fn wait_scales_with_length_above_a_floor() {
    let config = FortuneConfig::default();
    assert_eq!(config.wait_seconds(10), 6);
    assert_eq!(config.wait_seconds(400), 20);
}
