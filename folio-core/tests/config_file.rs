//! `folio.yaml` parsing cases for `folio-core`.

use folio_core::{ConfigError, ConfigFile, Format, FormatSpec};
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::TempDir;

fn load(yaml: &str) -> Result<ConfigFile, ConfigError> {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("folio.yaml");
    std::fs::write(&path, yaml).unwrap();
    ConfigFile::load(&path)
}

#[rstest]
#[case::json("json", Format::Json)]
#[case::yaml_alias("yml", Format::Yaml)]
#[case::markdown_alias("md", Format::Markdown)]
#[case::upper_case("TOML", Format::Toml)]
fn fixed_format_names(#[case] name: &str, #[case] expected: Format) {
    let file = load(&format!("directory: out\nformat: {name}\n")).unwrap();
    let config = file.into_config(Vec::new()).unwrap();
    match config.format {
        Some(FormatSpec::Fixed(format)) => assert_eq!(format, expected),
        other => panic!("expected fixed format, got {other:?}"),
    }
}

#[rstest]
#[case::unknown_format("directory: out\nformat: xml\n")]
#[case::bad_glob("directory: out\nformat:\n  \"pages/[\": json\n")]
#[case::zero_concurrency("directory: out\nconcurrency: 0\n")]
#[case::conflicting_filters("directory: out\ncontent_types: [post]\nignore_content_types: [post]\n")]
#[case::no_directory("format: json\n")]
fn invalid_files_are_rejected(#[case] yaml: &str) {
    let file = load(yaml).unwrap();
    assert!(file.into_config(Vec::new()).is_err());
}

#[test]
fn defaults_apply_when_keys_are_absent() {
    let file = load("directory: out\n").unwrap();
    assert_eq!(file.watch.port, folio_core::config::DEFAULT_WATCH_PORT);
    assert_eq!(file.watch.host, folio_core::config::DEFAULT_WATCH_HOST);

    let config = file.into_config(Vec::new()).unwrap();
    assert!(config.format.is_none());
    assert_eq!(config.concurrency, folio_core::config::DEFAULT_CONCURRENCY);
    assert!(!config.dry_run);
}

#[test]
fn watch_section_overrides_defaults() {
    let file = load("directory: out\nwatch:\n  host: 0.0.0.0\n  port: 9000\n").unwrap();
    assert_eq!(file.watch.host, "0.0.0.0");
    assert_eq!(file.watch.port, 9000);
}
