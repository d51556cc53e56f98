use std::{
    env, fs,
    path::{Path, PathBuf},
    process::{Command, Output},
};

fn run_bin(args: &[&str]) -> Output {
    let bin = PathBuf::from(env!("CARGO_BIN_EXE_tempstat"));

    Command::new(bin)
        .args(args)
        .env_remove("OPENWEATHER_API_KEY")
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to execute command")
}

fn assert_success(args: &[&str], output: &Output) {
    let stdout_str = String::from_utf8_lossy(&output.stdout);
    let stderr_str = String::from_utf8_lossy(&output.stderr);

    assert!(
        output.status.success(),
        "failed to run binary with {args:?}\nstdout:\n{stdout_str}\nstderr:\n{stderr_str}\n"
    );
}

/// Daily Berlin readings across winter and spring with one 40 degree spike,
/// plus a short Cairo series.
fn write_data(test_dir: &Path) -> PathBuf {
    let mut contents = String::from("city,timestamp,temperature,season\n");
    for day in 1..=28 {
        let temperature = 10.0 + [-1.0, 0.0, 1.0][day % 3];
        contents += &format!("Berlin,2024-02-{day:02},{temperature},winter\n");
    }
    for day in 1..=20 {
        let temperature = if day == 15 {
            40.0
        } else {
            10.0 + [-1.0, 0.0, 1.0][day % 3]
        };
        contents += &format!("Berlin,2024-03-{day:02},{temperature},spring\n");
    }
    contents += "Cairo,2024-07-01,35.0,summer\n";
    contents += "Cairo,2024-07-02,36.0,summer\n";

    let data_path = test_dir.join("temperature_data.csv");
    fs::write(&data_path, contents).expect("failed to write data file");
    data_path
}

#[test]
fn basic_workflow() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("basic_workflow");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_path = write_data(&test_dir);
    let data_str = data_path
        .to_str()
        .expect("failed to convert data path to string");
    let report_path = test_dir.join("report.json");
    let report_str = report_path
        .to_str()
        .expect("failed to convert report path to string");

    let args = ["--data", data_str, "cities"];
    let output = run_bin(&args);
    assert_success(&args, &output);
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Berlin\nCairo\n");

    let args = ["--data", data_str, "analyze", "--city", "Berlin", "--output", report_str];
    assert_success(&args, &run_bin(&args));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).expect("failed to read report"))
            .expect("failed to parse report");
    assert_eq!(report["min_date"], "2024-02-01");
    assert_eq!(report["max_date"], "2024-03-20");
    assert_eq!(report["distinct_date_count"], 48);
    let outliers: Vec<_> = report["enriched"]
        .as_array()
        .expect("enriched rows")
        .iter()
        .filter(|row| row["is_outlier"] == true)
        .collect();
    assert_eq!(outliers.len(), 1);
    assert_eq!(outliers[0]["temperature"], 40.0);

    let args = [
        "--data", data_str, "check", "--city", "Berlin", "--temperature", "-20", "--date",
        "2024-02-10",
    ];
    let output = run_bin(&args);
    assert_success(&args, &output);
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr_str.contains("is anomalous for Berlin in winter"),
        "{stderr_str}"
    );

    let args = [
        "--data", data_str, "check", "--city", "Berlin", "--temperature", "10.5", "--date",
        "2024-02-10",
    ];
    let output = run_bin(&args);
    assert_success(&args, &output);
    let stderr_str = String::from_utf8_lossy(&output.stderr);
    assert!(stderr_str.contains("is normal for Berlin in winter"), "{stderr_str}");
    assert!(!stderr_str.contains("is anomalous"), "{stderr_str}");

    fs::remove_dir_all(&test_dir).ok();
}

#[test]
fn failures_exit_nonzero() {
    let test_dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("failures_exit_nonzero");

    fs::remove_dir_all(&test_dir).ok();
    fs::create_dir(&test_dir).expect("failed to create test directory");

    let data_path = write_data(&test_dir);
    let data_str = data_path
        .to_str()
        .expect("failed to convert data path to string");

    // Unknown city.
    let output = run_bin(&["--data", data_str, "analyze", "--city", "Atlantis"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Atlantis"));

    // No autumn history for Berlin.
    let output = run_bin(&[
        "--data", data_str, "check", "--city", "Berlin", "--temperature", "12", "--date",
        "2024-10-01",
    ]);
    assert!(!output.status.success());

    // No API key anywhere.
    let output = run_bin(&["--data", data_str, "live", "--city", "Berlin"]);
    assert!(!output.status.success());

    fs::remove_dir_all(&test_dir).ok();
}
