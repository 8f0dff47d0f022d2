#![cfg(feature = "cli_api")]

use assert_cmd::Command;
use predicates::str::contains as str_contains;
use tempfile::NamedTempFile;

#[allow(deprecated)]
fn run_cli(script: &str) -> assert_cmd::assert::Assert {
    let mut cmd = Command::cargo_bin("cli").expect("cli binary");
    cmd.write_stdin(script.to_string()).assert()
}

#[test]
fn cli_registers_and_lists_equipment() {
    run_cli("equipment add EXC-001 excavator construction North Yard\nequipment list\nquit\n")
        .success()
        .stdout(str_contains("Equipment registered."))
        .stdout(str_contains("EXC-001"))
        .stdout(str_contains("North Yard"));
}

#[test]
fn cli_rejects_reversed_request_dates() {
    run_cli(
        "request add 1 excavator 1 construction 2025-11-10 2025-11-01 j.ops routine Site A\nquit\n",
    )
    .success()
    .stdout(str_contains("Invalid date range"));
}

#[test]
fn cli_walks_request_through_assignment() {
    let script = "\
equipment add EXC-001 excavator construction North Yard\n\
today 2025-11-03\n\
request add 1 excavator 1 construction 2025-11-01 2025-11-10 j.ops urgent Site A\n\
transition 1 approve\n\
assign 1 EXC-001\n\
request list\n\
quit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("Request created."))
        .stdout(str_contains("Request 1 is now approved."))
        .stdout(str_contains("Assigned 'EXC-001' to request 1"))
        .stdout(str_contains("pending_inspection"));
}

#[test]
fn cli_reports_booking_conflicts() {
    let script = "\
equipment add EXC-001 excavator construction North Yard\n\
request add 1 excavator 1 construction 2025-11-01 2025-11-10 j.ops routine Site A\n\
request add 2 excavator 1 construction 2025-11-05 2025-11-08 j.ops routine Site B\n\
transition 1 approve\n\
transition 2 approve\n\
assign 1 EXC-001\n\
assign 2 EXC-001\n\
quit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("already booked within"));
}

#[test]
fn cli_save_and_load_json_round_trip() {
    let tmp = NamedTempFile::new().expect("create temp file");
    let path = tmp.path().to_string_lossy().replace('\\', "\\\\");
    let script = format!(
        "equipment add EXC-001 excavator construction North Yard\n\
request add 1 excavator 1 construction 2025-11-01 2025-11-10 j.ops routine Site A\n\
save json {}\n\
request add 2 excavator 1 construction 2025-12-01 2025-12-05 j.ops routine Site B\n\
load json {}\n\
quit\n",
        path, path
    );
    let assert = run_cli(&script).success();
    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(
        output.contains("Fleet state loaded from"),
        "expected output to mention load completion"
    );
    let after_reload = output
        .split("Fleet state loaded from")
        .last()
        .unwrap_or_default();
    assert!(
        after_reload.contains("Site A"),
        "persisted request should survive the reload:\n{}",
        after_reload
    );
    assert!(
        !after_reload.contains("Site B"),
        "unsaved request should not appear after reload:\n{}",
        after_reload
    );
}

#[test]
fn cli_timeline_shows_busy_buckets() {
    let script = "\
equipment add EXC-001 excavator construction North Yard\n\
request add 1 excavator 1 construction 2025-11-03 2025-11-12 j.ops routine Site A\n\
transition 1 approve\n\
assign 1 EXC-001\n\
timeline week 2025-11-03 2025-11-17 EXC-001\n\
quit\n";
    run_cli(script)
        .success()
        .stdout(str_contains("EXC-001:"))
        .stdout(str_contains("busy"));
}
