//! CLI parse, prompt, and progress rendering tests.

use super::progress::render;
use super::{prompt_for_url, Cli};
use artdl_core::config::ArtdlConfig;
use artdl_core::pipeline::{Attempt, ProgressEvent};
use clap::Parser;
use std::io::Cursor;
use std::path::PathBuf;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn url_is_optional() {
    assert_eq!(parse(&["artdl"]).url, None);
    let cli = parse(&["artdl", "https://g.example/user/7"]);
    assert_eq!(cli.url.as_deref(), Some("https://g.example/user/7"));
}

#[test]
fn overrides_replace_config_values() {
    let cli = parse(&[
        "artdl",
        "https://g.example/user/7",
        "-o",
        "/tmp/out",
        "--pages",
        "2",
        "--downloads",
        "4",
    ]);
    let mut cfg = ArtdlConfig::default();
    cli.apply_overrides(&mut cfg);
    assert_eq!(cfg.output_root, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.page_concurrency, 2);
    assert_eq!(cfg.download_concurrency, 4);
}

#[test]
fn no_overrides_keeps_config() {
    let cli = parse(&["artdl"]);
    let mut cfg = ArtdlConfig::default();
    cli.apply_overrides(&mut cfg);
    assert_eq!(cfg.page_concurrency, 3);
    assert_eq!(cfg.download_concurrency, 10);
    assert_eq!(cfg.output_root, PathBuf::from("imgs"));
}

#[test]
fn zero_caps_rejected() {
    assert!(Cli::try_parse_from(["artdl", "--pages", "0"]).is_err());
    assert!(Cli::try_parse_from(["artdl", "--downloads", "0"]).is_err());
}

#[test]
fn prompt_reads_trimmed_url() {
    let mut input = Cursor::new("  https://g.example/user/7 \n");
    let mut output = Vec::new();
    let url = prompt_for_url(&mut input, &mut output).unwrap();
    assert_eq!(url, "https://g.example/user/7");
    assert_eq!(output, b"URL? ");
}

#[test]
fn prompt_rejects_empty_input() {
    let mut output = Vec::new();
    assert!(prompt_for_url(&mut Cursor::new("\n"), &mut output).is_err());
    assert!(prompt_for_url(&mut Cursor::new(""), &mut output).is_err());
}

#[test]
fn renders_image_lines() {
    let line = render(&ProgressEvent::ImageFinished {
        done: 3,
        total: 12,
        attempt: Attempt::First,
        label: "OK",
        name: "Update_1.jpg".to_string(),
    });
    assert_eq!(line, "[3/12] OK Update_1.jpg");
    let line = render(&ProgressEvent::ImageFinished {
        done: 12,
        total: 12,
        attempt: Attempt::Retry,
        label: "FAIL",
        name: "Update_2.jpg".to_string(),
    });
    assert_eq!(line, "[12/12] FAIL Update_2.jpg (retry)");
}
