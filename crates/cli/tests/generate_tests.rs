// Integration tests for `haengbal generate`.
// Run with: cargo test -p haengbal-cli --test generate_tests
//
// The Gemini endpoint is mocked; --endpoint points the binary at a
// local httpmock server.

use std::fs;
use std::path::Path;
use std::process::Command;

use httpmock::prelude::*;
use rust_xlsxwriter::Workbook;

fn haengbal() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_haengbal"));
    cmd.current_dir(env!("CARGO_MANIFEST_DIR"));
    cmd.env_remove("HAENGBAL_GEMINI_KEY");
    cmd.env_remove("GEMINI_API_KEY");
    cmd
}

/// Write an elementary-school input workbook with a header row and one
/// data row per characteristics string.
fn write_input(path: &Path, characteristics: &[&str]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "번호").unwrap();
    worksheet.write_string(0, 1, "학생특성").unwrap();
    for (i, text) in characteristics.iter().enumerate() {
        let row = (i + 1) as u32;
        worksheet.write_string(row, 0, &(i + 1).to_string()).unwrap();
        worksheet.write_string(row, 1, *text).unwrap();
    }
    workbook.save(path).unwrap();
}

fn mock_completion<'a>(server: &'a MockServer, text: &str) -> httpmock::Mock<'a> {
    server.mock(|when, then| {
        when.method(POST).path_includes("generateContent");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": text}]}}]
            }));
    })
}

#[test]
fn generate_writes_results_workbook() {
    let server = MockServer::start();
    let mock = mock_completion(&server, "성실하게 생활하며 맡은 일에 책임을 다함");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(
        &input,
        &["성실하고 책임감이 강하다", "호기심이 많고 관찰력이 뛰어나다"],
    );

    let output = haengbal()
        .args(["generate", "-c", "ele", "--api-key", "test-key", "--quiet"])
        .args(["--endpoint", &server.base_url()])
        .arg("-o")
        .arg(dir.path())
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    mock.assert_hits(2);

    let results = dir.path().join("행발생성결과.xlsx");
    let bytes = fs::read(&results).expect("results file missing");
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn api_failure_exits_13_and_writes_nothing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path_includes("generateContent");
        then.status(500)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({"error": {"message": "internal error"}}));
    });

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(&input, &["성실하고 책임감이 강하다"]);

    let output = haengbal()
        .args(["generate", "-c", "ele", "--api-key", "test-key", "--quiet"])
        .args(["--endpoint", &server.base_url()])
        .arg("-o")
        .arg(dir.path())
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    assert_eq!(
        output.status.code(),
        Some(13),
        "expected exit 13, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    assert!(!dir.path().join("행발생성결과.xlsx").exists());
}

#[test]
fn missing_api_key_exits_11() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(&input, &["성실하고 책임감이 강하다"]);

    let output = haengbal()
        .args(["generate", "-c", "ele", "--quiet"])
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    // 11 is the no-key code; 12 would mean a keychain holds a real
    // credential on this machine.
    assert_eq!(
        output.status.code(),
        Some(11),
        "expected exit 11, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("missing Gemini API key"), "stderr: {}", stderr);
}

#[test]
fn api_key_flag_wins_over_environment() {
    let server = MockServer::start();
    // matches only the flag's key; a run sending the env key would 404
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path_includes("generateContent")
            .header("x-goog-api-key", "flag-key");
        then.status(200)
            .header("content-type", "application/json")
            .json_body(serde_json::json!({
                "candidates": [{"content": {"parts": [{"text": "결과 문장"}]}}]
            }));
    });

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(&input, &["성실하고 책임감이 강하다"]);

    let output = haengbal()
        .env("HAENGBAL_GEMINI_KEY", "env-key")
        .args(["generate", "-c", "ele", "--api-key", "flag-key", "--quiet"])
        .args(["--endpoint", &server.base_url()])
        .arg("-o")
        .arg(dir.path())
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );
    mock.assert();
}

#[test]
fn out_of_range_temperature_exits_2() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(&input, &["성실하고 책임감이 강하다"]);

    let output = haengbal()
        .args([
            "generate",
            "-c",
            "ele",
            "--api-key",
            "test-key",
            "--temperature",
            "3.5",
            "--quiet",
        ])
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    assert_eq!(
        output.status.code(),
        Some(2),
        "expected exit 2, got {:?}\nstderr: {}",
        output.status.code(),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn usage_log_gets_one_line_per_record() {
    let server = MockServer::start();
    mock_completion(&server, "배려심이 깊고 교우 관계가 원만함");

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.xlsx");
    write_input(
        &input,
        &["성실하고 책임감이 강하다", "호기심이 많고 관찰력이 뛰어나다"],
    );
    let log_path = dir.path().join("usage.jsonl");

    let output = haengbal()
        .args(["generate", "-c", "ele", "--api-key", "test-key", "--quiet"])
        .args(["--endpoint", &server.base_url()])
        .arg("--usage-log")
        .arg(&log_path)
        .arg("-o")
        .arg(dir.path())
        .arg(&input)
        .output()
        .expect("failed to run haengbal");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr),
    );

    let log = fs::read_to_string(&log_path).expect("usage log missing");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2);
    for (i, line) in lines.iter().enumerate() {
        let entry: serde_json::Value = serde_json::from_str(line).expect("line is not JSON");
        assert_eq!(entry["row"], i);
        assert!(entry["prompt"].as_str().unwrap().contains("학생"));
        assert_eq!(entry["result"], "배려심이 깊고 교우 관계가 원만함.");
    }
}
