//! File-based import pipeline: load, merge, recombine, save

use chrono::{Duration, NaiveDate, NaiveDateTime};
use epg_reconcile::config::{Config, ImportConfig};
use epg_reconcile::ingestor::{load_import_file, BroadcastStore, ImportSettings};
use epg_reconcile::models::Precedence;
use epg_reconcile::reconcile::{combine_split_programmes, merge_all, MidnightOptions};
use std::path::Path;

const BROADCAST: &str = r#"{
  "stations": [
    {
      "original_network_id": 47,
      "transport_stream_id": 3,
      "service_id": 1200,
      "name": "TV3",
      "programmes": [
        { "start": "2024-03-01T22:00:00", "duration": "1h", "event_name": "News" },
        { "start": "2024-03-01T23:30:00", "duration": "30m", "event_name": "Late Show" }
      ]
    }
  ]
}"#;

const GUIDE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<tv>
  <channel id="47.3.1200"><display-name>Three</display-name></channel>
  <channel id="radio"><display-name>Radio NZ</display-name></channel>
  <programme start="20240301220000" stop="20240301230000" channel="47.3.1200">
    <title>News</title>
    <desc>Tonight's headlines.</desc>
  </programme>
  <programme start="20240302000000" stop="20240302010000" channel="47.3.1200">
    <title>Late Show</title>
  </programme>
  <programme start="20240301220000" stop="20240302000000" channel="radio">
    <title>Nights</title>
  </programme>
</tv>"#;

fn at(day: u32, h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, day)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn import_merge_and_save() {
    let dir = tempfile::tempdir().unwrap();
    let broadcast_path = write(dir.path(), "broadcast.json", BROADCAST);
    let guide_path = write(dir.path(), "guide.xml", GUIDE);
    let output_path = dir.path().join("merged.json");

    let mut config = Config::default();
    config.merge.precedence = Precedence::File;
    config.imports.push(ImportConfig::new(&guide_path));
    config.validate().unwrap();

    let mut store = BroadcastStore::load(&broadcast_path).await.unwrap();
    let import_config = &config.imports[0];
    let import = load_import_file(&import_config.path, &import_config.settings().unwrap())
        .await
        .unwrap();

    let options = import_config.merge_options(&config.merge.options());
    let summary = merge_all(&mut store.stations, import.stations, &options);
    assert_eq!(summary.channels_merged, 1);
    assert_eq!(summary.channels_added, 1);

    let midnight = MidnightOptions::resolve(&[], Some(true));
    let combined = combine_split_programmes(&mut store.stations[0], &midnight);
    assert_eq!(combined, 1);

    store.save(&output_path).await.unwrap();
    let saved = BroadcastStore::load(&output_path).await.unwrap();

    let tv3 = &saved.stations[0];
    assert_eq!(tv3.programmes.len(), 2);
    assert_eq!(
        tv3.programmes[0].short_description.as_deref(),
        Some("Tonight's headlines.")
    );
    assert_eq!(tv3.programmes[1].start, at(1, 23, 30));
    assert_eq!(tv3.programmes[1].duration, Duration::minutes(90));
    assert_eq!(saved.stations[1].name, "Radio NZ");
}

#[tokio::test]
async fn missing_import_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_import_file(&dir.path().join("absent.xml"), &ImportSettings::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn no_lookup_flag_carried_onto_new_channels() {
    let dir = tempfile::tempdir().unwrap();
    let guide_path = write(dir.path(), "guide.xml", GUIDE);

    let settings = ImportSettings {
        no_lookup: true,
        ..ImportSettings::default()
    };
    let import = load_import_file(&guide_path, &settings).await.unwrap();

    assert!(import
        .stations
        .iter()
        .flat_map(|s| s.programmes.iter())
        .all(|p| p.no_lookup));
}
