use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;

fn proteo_compare() -> Command {
    Command::cargo_bin("proteo-compare").unwrap()
}

fn data_line(id: &str, name: &str, values: [&str; 6]) -> String {
    let mut cols = vec![String::new(); 57];
    cols[1] = id.to_string();
    cols[5] = name.to_string();
    cols[6] = format!("G{id}");
    for (i, v) in values.iter().enumerate() {
        cols[51 + i] = v.to_string();
    }
    cols.join("\t")
}

fn write_input(dir: &Path, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join("proteinGroups.txt");
    let mut text = vec!["h"; 57].join("\t");
    text.push('\n');
    for l in lines {
        text.push_str(l);
        text.push('\n');
    }
    fs::write(&path, text).unwrap();
    path
}

// =============================================================================
// GENERAL
// =============================================================================

#[test]
fn test_no_args_shows_usage() {
    proteo_compare()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn test_help_flag() {
    proteo_compare()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("proteinGroups"));
}

// =============================================================================
// PIPELINE
// =============================================================================

#[test]
fn test_two_row_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            data_line("A", "Protein A", ["10", "10", "10", "100", "100", "100"]),
            data_line("B", "Protein B", ["5", "5", "25", "5", "5", "5"]),
        ],
    );
    let out = dir.path().join("out");

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .args(["--sheet-format", "csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "1 proteins kept (1 clinically relevant), 1 excluded",
        ));

    let all = fs::read_to_string(out.join("all_proteins.csv")).unwrap();
    assert_eq!(all.lines().count(), 2);
    assert!(all.lines().nth(1).unwrap().starts_with("0,A,GA,Protein A,"));

    let relevant = fs::read_to_string(out.join("clinically_relevant.csv")).unwrap();
    assert_eq!(relevant.lines().count(), 2);

    for stem in ["intensity_variation", "abundance_intensity", "abundance_variation"] {
        assert!(out.join(format!("{stem}.svg")).exists(), "{stem}");
    }
    assert!(!out.join("excluded_high_variation.csv").exists());
}

#[test]
fn test_png_format_and_prefix() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[data_line("A", "Protein A", ["10", "10", "10", "100", "100", "100"])],
    );

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path())
        .args(["--format", "png", "--prefix", "run1_", "--width", "400", "--height", "300"])
        .assert()
        .success();

    let png = fs::read(dir.path().join("run1_intensity_variation.png")).unwrap();
    assert_eq!(&png[..4], b"\x89PNG");
    let xlsx = fs::read(dir.path().join("run1_all_proteins.xlsx")).unwrap();
    assert_eq!(&xlsx[..4], b"PK\x03\x04");
    assert!(dir.path().join("run1_clinically_relevant.xlsx").exists());
}

#[test]
fn test_threshold_override_keeps_noisy_row() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[data_line("B", "Protein B", ["5", "5", "25", "5", "5", "5"])],
    );

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path())
        .args(["--max-variation", "2.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 proteins kept"));
}

#[test]
fn test_thresholds_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[data_line("A", "Protein A", ["10", "10", "10", "100", "100", "100"])],
    );
    let thresholds = dir.path().join("thresholds.json");
    fs::write(&thresholds, r#"{ "min_fold_change": 20.0 }"#).unwrap();

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path())
        .arg("--thresholds")
        .arg(&thresholds)
        .assert()
        .success()
        .stdout(predicate::str::contains("(0 clinically relevant)"));
}

// =============================================================================
// ERRORS
// =============================================================================

#[test]
fn test_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    proteo_compare()
        .arg("-i")
        .arg(dir.path().join("nope.txt"))
        .arg("-o")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_blank_line_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            data_line("A", "Protein A", ["10", "10", "10", "100", "100", "100"]),
            String::new(),
            data_line("B", "Protein B", ["5", "5", "5", "5", "5", "5"]),
        ],
    );

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"))
        .stderr(predicate::str::contains("found 0"));
}

#[test]
fn test_oversized_chart_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    proteo_compare()
        .arg("-i")
        .arg(dir.path().join("proteinGroups.txt"))
        .args(["--width", "100000", "--height", "100000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--width"));
}

#[test]
fn test_bad_number_reports_line() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_input(
        dir.path(),
        &[
            data_line("A", "Protein A", ["10", "10", "10", "100", "100", "100"]),
            data_line("B", "Protein B", ["5", "x", "5", "5", "5", "5"]),
        ],
    );
    let out = dir.path().join("out");

    proteo_compare()
        .arg("-i")
        .arg(&input)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 3"))
        .stderr(predicate::str::contains("dried_2"));

    assert!(!out.exists());
}
