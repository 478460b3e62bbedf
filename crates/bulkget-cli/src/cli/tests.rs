//! CLI parse tests.

use super::Cli;
use clap::Parser;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn cli_parse_defaults() {
    let cli = parse(&["bulkget"]);
    assert!(cli.file.is_none());
    assert!(cli.threads.is_none());
    assert!(cli.output.is_none());
    assert!(cli.config.is_none());
    assert!(!cli.no_config);
}

#[test]
fn cli_parse_long_flags() {
    let cli = parse(&[
        "bulkget",
        "--file",
        "urls.txt",
        "--threads",
        "8",
        "--output",
        "/tmp/out",
    ]);
    assert_eq!(cli.file, Some(PathBuf::from("urls.txt")));
    assert_eq!(cli.threads, Some(8));
    assert_eq!(cli.output, Some(PathBuf::from("/tmp/out")));
}

#[test]
fn cli_parse_short_flags_and_alias() {
    let cli = parse(&["bulkget", "-f", "a.txt", "-t", "3", "-o", "dl"]);
    assert_eq!(cli.file, Some(PathBuf::from("a.txt")));
    assert_eq!(cli.threads, Some(3));
    assert_eq!(cli.output, Some(PathBuf::from("dl")));

    let cli = parse(&["bulkget", "--workers", "5"]);
    assert_eq!(cli.threads, Some(5));
}

#[test]
fn cli_rejects_non_numeric_threads() {
    assert!(Cli::try_parse_from(["bulkget", "--threads", "many"]).is_err());
    assert!(Cli::try_parse_from(["bulkget", "--threads", "-2"]).is_err());
}

#[test]
fn cli_config_conflicts_with_no_config() {
    assert!(Cli::try_parse_from(["bulkget", "--config", "c.toml", "--no-config"]).is_err());
}

#[test]
fn overrides_carry_only_given_flags() {
    let o = parse(&["bulkget", "-t", "4"]).overrides();
    assert_eq!(o.workers, Some(4));
    assert!(o.input_file.is_none());
    assert!(o.output_dir.is_none());
}

#[test]
fn run_with_missing_input_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.txt");
    let out = dir.path().join("out");
    let cli = parse(&[
        "bulkget",
        "--no-config",
        "-f",
        missing.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ]);
    let err = cli.run().unwrap_err();
    assert!(format!("{:#}", err).contains("failed to open input list"));
    assert!(!out.exists());
}

#[test]
fn run_with_zero_workers_fails_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.txt");
    std::fs::write(&list, "").unwrap();
    let cli = parse(&["bulkget", "--no-config", "-f", list.to_str().unwrap(), "-t", "0"]);
    let err = cli.run().unwrap_err();
    assert!(format!("{:#}", err).contains("worker count must be at least 1"));
}

#[test]
fn run_with_empty_list_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let list = dir.path().join("list.txt");
    std::fs::write(&list, "\n\n").unwrap();
    let out = dir.path().join("out");
    let cli = parse(&[
        "bulkget",
        "--no-config",
        "-f",
        list.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-t",
        "2",
    ]);
    cli.run().unwrap();
    assert!(out.is_dir());
    assert_eq!(std::fs::read_dir(&out).unwrap().count(), 0);
}
