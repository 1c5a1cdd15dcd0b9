use assert_cmd::cargo::cargo_bin_cmd;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_site(root: &Path) {
    let backend = root.join("backend");
    fs::create_dir_all(&backend).expect("create backend dir");
    fs::write(
        backend.join("info.json"),
        r#"{"campName": "EnglishTopia", "nextSession": "1 июля", "email": "hello@englishtopia.ru"}"#,
    )
    .expect("write info");
    fs::write(
        backend.join("cards.json"),
        r#"{"whyUs": [{"icon": "bi-star", "title": "Язык", "description": "24/7"}],
            "activities": [{"icon": "bi-compass", "title": "Квесты", "description": "Приключения"},
                           {"icon": "bi-palette", "title": "Творчество", "description": "Мастер-классы"}]}"#,
    )
    .expect("write cards");
    fs::write(
        backend.join("reviews.json"),
        r#"{"reviews": [{"text": "Супер", "author": "Анна"}]}"#,
    )
    .expect("write reviews");
    fs::write(
        backend.join("schedule.json"),
        r#"{"faq": [{"question": "Сколько длится смена?", "answer": "14 дней"}]}"#,
    )
    .expect("write schedule");

    let photos = root.join("assets").join("photos");
    fs::create_dir_all(&photos).expect("create photos dir");
    fs::write(photos.join("activity-adventures.jpg"), b"jpeg").expect("write photo");
}

fn render_stdout(site: &Path) -> String {
    let out = cargo_bin_cmd!("englishtopia")
        .arg("render")
        .arg("--site")
        .arg(site)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8(out).expect("utf-8 html")
}

#[test]
fn render_writes_populated_page() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());

    let html = render_stdout(tmp.path());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("EnglishTopia"));
    assert!(html.contains("Следующая смена: 1 июля"));
    assert!(html.contains("Квесты"));
    assert!(html.contains("chat-question"));
    assert!(!html.contains("alert-warning"));
    // first photo exists, second is missing and falls back
    assert!(html.contains("src=\"assets/photos/activity-adventures.jpg\""));
    assert!(!html.contains("src=\"assets/photos/activity-art.jpg\""));
    assert!(html.contains("Творческие мастер-классы"));
}

#[test]
fn render_to_file() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());
    let out = tmp.path().join("index.html");

    cargo_bin_cmd!("englishtopia")
        .arg("render")
        .arg("--site")
        .arg(tmp.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let html = fs::read_to_string(&out).expect("read rendered page");
    assert!(html.contains("review-card"));
}

#[test]
fn render_with_missing_document_shows_banner() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());
    fs::remove_file(tmp.path().join("backend").join("reviews.json")).expect("remove reviews");

    let html = render_stdout(tmp.path());
    assert_eq!(html.matches("alert-warning").count(), 1);
    assert!(!html.contains("review-card"));
    assert!(!html.contains("chat-question"));
}

#[test]
fn check_reports_counts() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());

    let out = cargo_bin_cmd!("englishtopia")
        .arg("check")
        .arg("--site")
        .arg(tmp.path())
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(out).expect("utf-8 output");
    assert!(text.contains("camp: EnglishTopia"));
    assert!(text.contains("activities: 2"));
    assert!(text.contains("faq: 1"));
}

#[test]
fn check_fails_on_broken_document() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());
    fs::write(tmp.path().join("backend").join("schedule.json"), "{broken").expect("corrupt schedule");

    cargo_bin_cmd!("englishtopia")
        .arg("check")
        .arg("--site")
        .arg(tmp.path())
        .assert()
        .failure();
}

#[test]
fn config_overrides_backend_path() {
    let tmp = TempDir::new().expect("create temp dir");
    write_site(tmp.path());
    fs::rename(tmp.path().join("backend"), tmp.path().join("data")).expect("move backend");
    let config = tmp.path().join("site.json");
    fs::write(&config, r#"{"backendPath": "data/"}"#).expect("write config");

    cargo_bin_cmd!("englishtopia")
        .arg("check")
        .arg("--site")
        .arg(tmp.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .success();
}
