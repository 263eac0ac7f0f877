use std::process::{Command, Output};

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bridge_sim"))
        .args(args)
        .env("RUST_LOG", "warn,bridge_sim=info")
        .output()
        .expect("Failed to execute simulation")
}

/// Test that a default sweep runs to completion
#[test]
fn test_headless_sweep_runs() {
    let output = run_cli(&[]);

    assert!(
        output.status.success(),
        "Sweep failed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("SWEEP COMPLETE"),
        "Sweep did not complete properly. stderr: {}",
        stderr
    );
}

/// Test that the default sweep prints fifty finite points and a summary
#[test]
fn test_sweep_series_printed() {
    let output = run_cli(&[]);
    assert!(output.status.success(), "Sweep failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("=== Bridge Configuration ==="));
    assert!(stdout.contains("Crossing velocity (km/h): 40"));
    assert!(stdout.contains("Series length: 50"), "stdout: {}", stdout);

    let header = stdout
        .lines()
        .position(|line| line == "N tw")
        .expect("Could not find series header");
    let points: Vec<(f64, f64)> = stdout
        .lines()
        .skip(header + 1)
        .take_while(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split_whitespace();
            let x = parts.next().and_then(|s| s.parse().ok()).expect("x value");
            let y = parts.next().and_then(|s| s.parse().ok()).expect("y value");
            (x, y)
        })
        .collect();

    assert_eq!(points.len(), 50);
    assert_eq!(points[0].0, 1.0);
    assert_eq!(points[49].0, 50.0);
    assert!(points.iter().all(|(_, y)| y.is_finite()));
}

/// Test that other plot variables can be selected
#[test]
fn test_time_axis_and_component_selection() {
    let output = run_cli(&["--x-var", "t", "--y-var", "psi_ar", "--n-max", "10"]);
    assert!(output.status.success(), "Sweep failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "t psi_ar"));
    assert!(stdout.contains("Series length: 10"));
}

/// Test that the state trace lists every run
#[test]
fn test_trace_table_printed() {
    let output = run_cli(&["--n-max", "5", "--trace"]);
    assert!(output.status.success(), "Sweep failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let header = stdout
        .lines()
        .find(|line| line.contains("na_total"))
        .expect("Could not find trace header");
    assert!(header.contains("psi_ag"));
}

/// Test that a zero crossing velocity is rejected with an error
#[test]
fn test_invalid_velocity_rejected() {
    let output = run_cli(&["--velocity", "0"]);
    assert!(!output.status.success(), "Zero velocity should be rejected");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid configuration"),
        "Missing configuration error. stderr: {}",
        stderr
    );
}

/// Test that a side with no arrivals stops at the cycle cap
#[test]
fn test_stalled_sweep_reports_divergence() {
    let output = run_cli(&["--qi", "0", "--max-cycles", "20", "--n-max", "3"]);
    assert!(!output.status.success(), "Stalled sweep should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("did not settle within 20 cycles"),
        "Missing divergence error. stderr: {}",
        stderr
    );
}

/// Test that the configured N is independent of the sweep range
#[test]
fn test_configured_n_printed() {
    let output = run_cli(&["--n", "9", "--n-min", "2", "--n-max", "4"]);
    assert!(output.status.success(), "Sweep failed to run");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().any(|line| line == "  N: 9"), "stdout: {}", stdout);
    assert!(stdout.contains("Plot type: Model 2"));
    assert!(stdout.contains("Series length: 3"));
}
