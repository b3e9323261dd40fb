// tests/archive.rs
//
// Day archive: copy the dated reports into the bank, then reset the output tree.

use chrono::{NaiveDate, TimeZone, Utc};
use signal_sentinel::archive::{archive_and_clear, bank_day_dir};
use signal_sentinel::emit::{report_path, Slot};
use signal_sentinel::Domain;
use std::fs;
use std::path::Path;

fn slot() -> Slot {
    Slot::at(Utc.with_ymd_and_hms(2025, 3, 8, 1, 30, 0).unwrap(), 8)
}

fn put(path: &Path, body: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[tokio::test]
async fn todays_reports_move_to_bank_and_output_is_reset() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let bank = tmp.path().join("central_bank");
    let s = slot();

    let papers = report_path(&data, Domain::Papers, &s);
    let tech = report_path(&data, Domain::Repos, &s);
    put(&papers, r#"{"items":["paper"]}"#);
    put(&tech, r#"{"items":["repo"]}"#);
    put(&tech.with_file_name("notes.txt"), "scratch");
    put(&data.join("tech/2025-03-07/sentinel-PM-21h.json"), "{}");
    put(&data.join(".gitkeep"), "");
    put(&data.join(".github/keep"), "");

    let summary = archive_and_clear(&data, &bank, s.date).await.unwrap();

    let tech_bank = bank_day_dir(&bank, Domain::Repos, s.date);
    assert_eq!(tech_bank, bank.join("github/tech/2025-03-08"));
    assert_eq!(
        fs::read_to_string(tech_bank.join("sentinel-AM-9h.json")).unwrap(),
        r#"{"items":["repo"]}"#
    );
    assert_eq!(
        fs::read_to_string(bank.join("openalex/papers/2025-03-08/sentinel-AM-9h.json")).unwrap(),
        r#"{"items":["paper"]}"#
    );
    assert_eq!(summary.copied.len(), 2);
    assert!(!tech_bank.join("notes.txt").exists());
    assert!(!bank.join("github/tech/2025-03-07").exists());

    // domain dirs gone, .git* placeholders kept
    assert_eq!(summary.cleared, 2);
    assert!(!data.join("papers").exists());
    assert!(!data.join("tech").exists());
    assert!(data.join(".gitkeep").exists());
    assert!(data.join(".github/keep").exists());
}

#[tokio::test]
async fn missing_output_root_is_a_no_op() {
    let tmp = tempfile::tempdir().unwrap();
    let date = NaiveDate::from_ymd_opt(2025, 3, 8).unwrap();
    let summary = archive_and_clear(&tmp.path().join("data"), &tmp.path().join("bank"), date)
        .await
        .unwrap();
    assert!(summary.copied.is_empty());
    assert_eq!(summary.cleared, 0);
    assert!(!tmp.path().join("bank").exists());
}

#[tokio::test]
async fn rerun_overwrites_banked_copy() {
    let tmp = tempfile::tempdir().unwrap();
    let data = tmp.path().join("data");
    let bank = tmp.path().join("bank");
    let s = slot();
    let report = report_path(&data, Domain::Papers, &s);

    put(&report, "first");
    archive_and_clear(&data, &bank, s.date).await.unwrap();
    put(&report, "second");
    archive_and_clear(&data, &bank, s.date).await.unwrap();

    let banked = bank_day_dir(&bank, Domain::Papers, s.date).join("sentinel-AM-9h.json");
    assert_eq!(fs::read_to_string(banked).unwrap(), "second");
}
