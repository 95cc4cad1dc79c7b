use std::path::Path;
use std::process::{Command, Output};

const BASE_URL: &str = "https://example.com/app/index.html";

fn tagforge(workdir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tagforge"))
        .args(args)
        .current_dir(workdir)
        .env("TAGFORGE_DATABASE_URL", format!("sqlite://{}", workdir.join("store.db").display()))
        .env("TAGFORGE_BASE_URL", BASE_URL)
        .env("TAGFORGE_BRAND_DIR", workdir.join("branding"))
        .env_remove("TAGFORGE_TENANT")
        .env_remove("TAGFORGE_APP_ORIGIN")
        .env_remove("TAGFORGE_MAX_PAYLOAD")
        .env_remove("TAGFORGE_CACHE_VERSION")
        .output()
        .expect("Failed to run tagforge")
}

fn stdout_of(output: &Output, step: &str) -> String {
    if !output.status.success() {
        eprintln!("{} stderr: {}", step, String::from_utf8_lossy(&output.stderr));
        panic!("{} failed", step);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_encode_decode_lifecycle() {
    let dir = tempfile::tempdir().unwrap();

    // 1. Encode with short keys and names mixed
    println!("🧪 Running Encode...");
    let output = tagforge(dir.path(), &["encode", "-f", "HK=HC123", "-f", "Leistung=100", "-f", "U=230"]);
    let stdout = stdout_of(&output, "Encode");
    assert!(stdout.contains("https://example.com/app/index.html#HK=HC123&P=100&U=230"), "{}", stdout);

    // 2. Decode it back and save the export
    println!("🧪 Running Decode...");
    let output = tagforge(
        dir.path(),
        &["decode", "https://example.com/app/index.html#HK=HC123&P=100&U=230&X=1", "--output", "scan.json"],
    );
    let stdout = stdout_of(&output, "Decode");
    assert!(stdout.contains("HK-Nr: HC123"));
    assert!(stdout.contains("Spannung: 230 V"));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("scan.json")).unwrap()).unwrap();
    assert_eq!(saved, serde_json::json!({"HK-Nr": "HC123", "Leistung": "100", "Spannung": "230"}));

    // 3. Import the export: same URL again
    println!("🧪 Running Import...");
    let output = tagforge(dir.path(), &["import", "scan.json"]);
    let stdout = stdout_of(&output, "Import");
    assert!(stdout.contains("#HK=HC123&P=100&U=230"));
}

#[test]
fn test_write_to_tag_file() {
    let dir = tempfile::tempdir().unwrap();

    let output = tagforge(dir.path(), &["write", "-f", "HK=HC9", "-f", "U=0", "--tag", "tag.json"]);
    let stdout = stdout_of(&output, "Write");
    assert!(stdout.contains("Write attempt 1/3"));
    assert!(stdout.contains("Tag written"));

    let tag: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("tag.json")).unwrap()).unwrap();
    assert_eq!(tag["records"][0]["recordType"], "url");
    assert_eq!(tag["records"][0]["data"], "https://example.com/app/index.html#HK=HC9&U=0");
}

#[test]
fn test_invalid_form_is_not_written() {
    let dir = tempfile::tempdir().unwrap();

    let output = tagforge(dir.path(), &["validate", "-f", "U=1500"]);
    let stdout = stdout_of(&output, "Validate");
    assert!(stdout.contains("[FORM-001] HK-Nr is a required field."));
    assert!(stdout.contains("[FORM-002] Spannung must be at most 1000."));

    let output = tagforge(dir.path(), &["write", "-f", "U=1500", "--tag", "tag.json"]);
    assert!(!output.status.success());
    assert!(!dir.path().join("tag.json").exists());
}

#[test]
fn test_offline_requests_are_queued_once() {
    let dir = tempfile::tempdir().unwrap();

    for _ in 0..2 {
        let output = tagforge(dir.path(), &["cache-doc", "https://example.com/docs/a.pdf", "--offline", "--tenant", "acme"]);
        let stdout = stdout_of(&output, "CacheDoc");
        assert!(stdout.contains("queued"));
    }

    let output = tagforge(dir.path(), &["drain", "--list"]);
    let stdout = stdout_of(&output, "Drain");
    assert!(stdout.contains("1 queued download(s)"), "{}", stdout);
    assert!(stdout.contains("tenant acme"));
}

#[test]
fn test_rebuild_with_reset() {
    let dir = tempfile::tempdir().unwrap();

    let output = tagforge(dir.path(), &["rebuild", "--reset"]);
    let stdout = stdout_of(&output, "Rebuild");
    assert!(stdout.contains("Schema applied successfully"));
}
