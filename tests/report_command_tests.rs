use flate2::write::GzEncoder;
use flate2::Compression;
use logsift::commands::report::{generate, run, ReportOptions};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_file(dir: &Path, name: &str, lines: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    path
}

fn path_str(path: &Path) -> String {
    path.to_str().unwrap().to_string()
}

fn sample_sources() -> (TempDir, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let log = write_file(
        temp_dir.path(),
        "auth.log",
        &[
            "Dec 22 22:18:07 localhost sshd[17238]: Invalid user ro from 133.242.167.91",
            "Dec 22 22:18:09 localhost sshd[17238]: Invalid user pi from 133.242.167.91",
            "Dec 22 22:20:01 localhost sshd[17240]: Did not receive identification string from 50.143.75.105",
            "Dec 22 22:25:44 localhost sshd[17250]: Invalid user admin from 213.20.227.137",
        ],
    );
    let black = write_file(temp_dir.path(), "black.txt", &["213.20.227.137"]);
    (temp_dir, log, black)
}

#[tokio::test]
async fn test_report_removes_black_listed_addresses() {
    let (_dir, log, black) = sample_sources();
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        black: vec![path_str(&black)],
        verbose: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    let report = &result.report;

    assert_eq!(report.addresses, vec!["50.143.75.105", "133.242.167.91"]);
    assert!(report.reconciliation.removed.contains("213.20.227.137"));
    assert!(report.text.starts_with("## LogSift REPORT ##"));
    assert!(report.text.contains("The following IP addresses are being removed from the output"));
    assert!(report.text.contains("## MAIN BODY of OUTPUT ##"));

    let body = report.text.split("## MAIN BODY of OUTPUT ##").nth(1).unwrap();
    assert!(!body.contains("213.20.227.137"));
}

#[tokio::test]
async fn test_report_frequency_order_with_counts() {
    let (_dir, log, _black) = sample_sources();
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        frequency: true,
        level: 1,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    assert_eq!(
        result.report.addresses,
        vec!["133.242.167.91", "50.143.75.105", "213.20.227.137"]
    );

    let first = result
        .report
        .text
        .lines()
        .find(|line| line.contains("133.242.167.91"))
        .unwrap();
    assert_eq!(first.split_whitespace().collect::<Vec<_>>(), vec!["133.242.167.91", "2"]);
}

#[tokio::test]
async fn test_report_quiet_omits_source_sections() {
    let (dir, log, _black) = sample_sources();
    let empty = write_file(dir.path(), "empty.log", &[]);
    let options = ReportOptions {
        inputs: vec![path_str(&log), path_str(&empty), "/nonexistent/auth.log".to_string()],
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    assert!(!result.report.text.contains("successfully opened"));
    assert!(!result.report.text.contains("FILE ACCESS ERRORS"));
    assert!(!result.report.text.contains("FILES WITHOUT IP ADDRESS"));
    assert_eq!(result.report.addresses.len(), 3);
}

#[tokio::test]
async fn test_report_lists_unreadable_and_empty_sources() {
    let (dir, log, _black) = sample_sources();
    let empty = write_file(dir.path(), "empty.log", &[]);
    let options = ReportOptions {
        inputs: vec![path_str(&log), path_str(&empty), "/nonexistent/auth.log".to_string()],
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    let text = &result.report.text;
    assert!(text.contains("The following files were successfully opened for input:"));
    assert!(text.contains("FILE ACCESS ERRORS:"));
    assert!(text.contains("/nonexistent/auth.log"));
    assert!(text.contains("FILES WITHOUT IP ADDRESS"));
    assert!(text.contains(&format!("'{}' (of type 'log')", path_str(&empty))));
}

#[tokio::test]
async fn test_report_only_missing_files_still_succeeds() {
    let temp_dir = TempDir::new().unwrap();
    let output = temp_dir.path().join("report.txt");
    let options = ReportOptions {
        inputs: vec!["/nonexistent/file.log".to_string()],
        output: Some(path_str(&output)),
        ..ReportOptions::default()
    };

    let result = run(&options).await;
    assert!(result.is_ok());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("FILE ACCESS ERRORS:"));
}

#[tokio::test]
async fn test_report_reads_gzip_input() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("auth.log.1.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
    writeln!(
        encoder,
        "Dec 22 22:18:07 localhost sshd[17238]: Invalid user ro from 133.242.167.91"
    )
    .unwrap();
    encoder.finish().unwrap();

    let options = ReportOptions {
        inputs: vec![path_str(&path)],
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    assert_eq!(result.report.addresses, vec!["133.242.167.91"]);
}

#[tokio::test]
async fn test_report_logdir_discovery() {
    let (dir, _log, black) = sample_sources();
    let options = ReportOptions {
        logdirs: vec![path_str(dir.path())],
        black: vec![path_str(&black)],
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    assert_eq!(result.report.addresses, vec!["50.143.75.105", "133.242.167.91"]);
}

#[tokio::test]
async fn test_report_export_csv() {
    let (dir, log, black) = sample_sources();
    let export = dir.path().join("blocklist.csv");
    let output = dir.path().join("report.txt");
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        black: vec![path_str(&black)],
        output: Some(path_str(&output)),
        export: Some(path_str(&export)),
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    run(&options).await.unwrap();

    let csv = fs::read_to_string(&export).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("address,occurrences"));
    assert!(lines.next().unwrap().starts_with("50.143.75.105,1"));
    assert!(lines.next().unwrap().starts_with("133.242.167.91,2"));
    assert!(lines.next().is_none());
}

#[tokio::test]
async fn test_report_export_json() {
    let (dir, log, _black) = sample_sources();
    let export = dir.path().join("blocklist.out");
    let output = dir.path().join("report.txt");
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        output: Some(path_str(&output)),
        export: Some(path_str(&export)),
        format: Some("json".to_string()),
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    run(&options).await.unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&export).unwrap()).unwrap();
    let rows = value.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["address"], "50.143.75.105");
    assert_eq!(rows[1]["occurrences"], 2);
}

#[tokio::test]
async fn test_report_export_invalid_format() {
    let (dir, log, _black) = sample_sources();
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        output: Some(path_str(&dir.path().join("report.txt"))),
        export: Some(path_str(&dir.path().join("blocklist.txt"))),
        format: Some("xml".to_string()),
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = run(&options).await;
    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Invalid format"));
}

#[tokio::test]
async fn test_report_demographics_unavailable_marker() {
    let (_dir, log, _black) = sample_sources();
    let options = ReportOptions {
        inputs: vec![path_str(&log)],
        demographics: true,
        geo_url: Some("http://127.0.0.1:9/json/".to_string()),
        geo_timeout_ms: 200,
        quiet: true,
        year: Some(2013),
        ..ReportOptions::default()
    };

    let result = generate(&options).await.unwrap();
    let table = result.demographics.unwrap();
    assert_eq!(table.unavailable_count(), 3);
    assert_eq!(
        result.report.text.matches("demographics unavailable").count(),
        3
    );
}
