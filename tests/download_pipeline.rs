mod audio_server;

use std::fs;
use std::io::{Cursor, Read as _};
use std::path::Path;

use audio_server::{A_MP3, AudioServer, B_WAV};
use audiosnipe::assemble::ItemStatus;
use audiosnipe::formats::{OutcomeKind, RunReport};
use audiosnipe::naming::{THEMED_PREFIX, THEMED_WORDS};
use predicates::prelude::*;

fn zip_entries(path: &Path) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
    let bytes = fs::read(path)?;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        entries.push((file.name().to_owned(), data));
    }
    entries.sort();
    Ok(entries)
}

#[test]
fn download_bundles_fetched_audio_into_zip() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;
    let out_dir = temp.path().join("out");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    let assert = cmd
        .args(["download", "--url", server.url("/page").as_str(), "--out"])
        .arg(&out_dir)
        .assert()
        .success();

    let expected_path = out_dir.join("audio_files.zip");
    let stdout = String::from_utf8(assert.get_output().stdout.clone())?;
    assert_eq!(stdout.trim(), expected_path.display().to_string());

    let entries = zip_entries(&expected_path)?;
    assert_eq!(
        entries,
        vec![
            ("a.mp3".to_owned(), A_MP3.to_vec()),
            ("b.wav".to_owned(), B_WAV.to_vec()),
        ]
    );

    Ok(())
}

#[test]
fn refined_download_reports_json_with_themed_name() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    let assert = cmd
        .args([
            "download",
            "--url",
            server.url("/page").as_str(),
            "--variant",
            "refined",
            "--json",
            "--out",
        ])
        .arg(temp.path())
        .assert()
        .success();

    let report: RunReport = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(report.outcome, OutcomeKind::Saved);
    assert_eq!(report.notice, None);

    let candidate_names = report
        .candidates
        .iter()
        .map(|c| c.file_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(candidate_names, vec!["a.mp3", "b.wav", "missing.ogg"]);
    assert_eq!(report.entries, vec!["a.mp3", "b.wav"]);

    let failed = report
        .items
        .iter()
        .filter(|item| matches!(item.status, ItemStatus::Failed { .. }))
        .map(|item| item.file_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(failed, vec!["missing.ogg"]);

    let archive_name = report.archive_name.as_deref().expect("archive name");
    let word = archive_name
        .strip_prefix(THEMED_PREFIX)
        .and_then(|rest| rest.strip_suffix(".zip"))
        .expect("themed archive name");
    assert!(THEMED_WORDS.contains(&word));

    let archive_path = report.archive_path.as_deref().expect("archive path");
    assert!(Path::new(archive_path).exists());
    assert_eq!(zip_entries(Path::new(archive_path))?.len(), 2);

    Ok(())
}

#[test]
fn classic_download_skips_wiki_file_names_without_fetching() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    let assert = cmd
        .args(["download", "--url", server.url("/page").as_str(), "--json", "--out"])
        .arg(temp.path())
        .assert()
        .success();

    let report: RunReport = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(report.candidates.len(), 4);
    let wiki = report
        .items
        .iter()
        .find(|item| item.file_name == "File:Theme.ogg")
        .expect("wiki item");
    assert!(matches!(wiki.status, ItemStatus::Skipped { .. }));
    assert_eq!(report.entries, vec!["a.mp3", "b.wav"]);

    Ok(())
}

#[test]
fn page_without_audio_exits_with_scan_notice() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    cmd.args(["download", "--url", server.url("/empty").as_str(), "--out"])
        .arg(temp.path())
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("No audio files found on this page."));

    assert_eq!(fs::read_dir(temp.path())?.count(), 0);
    Ok(())
}

#[test]
fn all_failed_fetches_exit_without_archive() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    cmd.args(["download", "--url", server.url("/broken").as_str(), "--out"])
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "No valid audio files were found to download.",
        ));

    assert!(!temp.path().join("audio_files.zip").exists());
    Ok(())
}

#[test]
fn existing_archive_is_kept_without_force() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;
    let existing = temp.path().join("audio_files.zip");
    fs::write(&existing, b"keep me")?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    cmd.args(["download", "--url", server.url("/page").as_str(), "--out"])
        .arg(temp.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("The archive could not be saved."));
    assert_eq!(fs::read(&existing)?, b"keep me");

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    cmd.args(["download", "--url", server.url("/page").as_str(), "--force", "--out"])
        .arg(temp.path())
        .assert()
        .success();
    assert_eq!(zip_entries(&existing)?.len(), 2);

    Ok(())
}

#[test]
fn unreachable_page_is_an_error() -> anyhow::Result<()> {
    let server = AudioServer::spawn();
    let temp = tempfile::TempDir::new()?;

    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("audiosnipe");
    cmd.args(["download", "--url", server.url("/nope").as_str(), "--out"])
        .arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("HTTP 404"));

    Ok(())
}
