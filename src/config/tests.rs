//! Configuration tests

use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_load() {
    let config = SrcfixConfig::from_toml_overrides("").expect("defaults must parse");

    assert_eq!(config.encoding, "windows-1252");
    assert_eq!(config.include_env, "GSL_INCLUDE");
    assert_eq!(config.repair.tools.len(), 5);
    assert_eq!(config.format.program, "clang-format");
    assert_eq!(
        config.format.replacements,
        vec![
            ("#include ".to_string(), "#include".to_string()),
            ("{ //".to_string(), "{//".to_string()),
        ]
    );
}

#[test]
fn test_default_tool_table() {
    let config = SrcfixConfig::from_toml_overrides("").unwrap();
    let tools = &config.repair.tools;

    assert_eq!(tools[0].program, "cppcheck");
    assert_eq!(tools[0].ignore.as_deref(), Some("missingIncludeSystem"));
    assert!(!tools[0].partial);
    assert_eq!(tools[1].program, "cpplint");

    let partial: Vec<_> = tools.iter().filter(|t| t.partial).map(|t| t.label()).collect();
    assert_eq!(partial, vec!["Cpd", "Lizard", "Flaw finder"]);

    assert_eq!(tools[2].output, OutputKind::CrossFileDuplicates);
    assert_eq!(tools[3].output, OutputKind::ComplexityDuplicates);

    let refactor = config.repair.refactor.as_ref().expect("refactor tool");
    assert_eq!(refactor.program, "clang-tidy");
    assert!(refactor.args.iter().any(|a| a == "{include}"));
    assert!(refactor.args.iter().any(|a| a == "{file}"));
}

#[test]
fn test_overrides_replace_values() {
    let config = SrcfixConfig::from_toml_overrides(
        r#"
encoding = "utf-8"

[parallel]
max_threads = 3

[format]
name = "cat"
program = "cat"
"#,
    )
    .unwrap();

    assert_eq!(config.encoding().unwrap(), encoding_rs::UTF_8);
    assert_eq!(config.parallel.max_threads, 3);
    assert_eq!(config.format.program, "cat");
    // Nested tables merge, so untouched keys keep their defaults
    assert_eq!(config.parallel.thread_percentage, 100);
}

#[test]
fn test_unknown_encoding_is_rejected() {
    let err = SrcfixConfig::from_toml_overrides(r#"encoding = "no-such-charset""#).unwrap_err();
    assert!(format!("{err:#}").contains("no-such-charset"));
}

#[test]
fn test_encoding_must_round_trip() {
    for label in ["utf-16le", "utf-16be", "iso-2022-kr"] {
        let overrides = format!("encoding = \"{label}\"");
        let err = SrcfixConfig::from_toml_overrides(&overrides).unwrap_err();
        assert!(
            format!("{err:#}").contains("cannot be written back"),
            "{label} should be rejected"
        );
    }

    for label in ["windows-1252", "latin1", "koi8-r", "utf-8"] {
        let overrides = format!("encoding = \"{label}\"");
        assert!(SrcfixConfig::from_toml_overrides(&overrides).is_ok(), "{label}");
    }
}

#[test]
fn test_invalid_thread_percentage() {
    let result = SrcfixConfig::from_toml_overrides("[parallel]\nthread_percentage = 0");
    assert!(result.is_err());
}

#[test]
fn test_custom_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("custom.json");
    fs::write(&path, r#"{"parallel": {"max_threads": 7}}"#).unwrap();

    let config = SrcfixConfig::load_with_custom_config(Some(&path)).unwrap();
    assert_eq!(config.parallel.max_threads, 7);
}

#[test]
fn test_missing_custom_config_fails() {
    let result = SrcfixConfig::load_with_custom_config(Some(Path::new("non_existent.toml")));
    assert!(result.is_err());
}
