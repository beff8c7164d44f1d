use super::*;
use crate::config::{OutputKind, ToolConfig};
use std::fs;
use tempfile::TempDir;

fn shell_tool(name: &str, script: &str) -> ToolConfig {
    ToolConfig {
        name: name.to_string(),
        program: "sh".to_string(),
        args: vec!["-c".to_string(), script.to_string()],
        ignore: None,
        output: OutputKind::Plain,
        label: None,
        partial: false,
        enabled: true,
    }
}

fn test_config(tools: Vec<ToolConfig>, refactor: Option<ToolConfig>) -> SrcfixConfig {
    let mut config = SrcfixConfig::from_toml_overrides(
        r##"
encoding = "utf-8"

[format]
name = "Cat format"
program = "cat"
args = []
replacements = [["#include ", "#include"], ["{ //", "{//"]]
"##,
    )
    .unwrap();
    config.repair.tools = tools;
    config.repair.refactor = refactor;
    config
}

fn source_file(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("a.h");
    fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_sequential_repair_runs_refactor_last() {
    let config = test_config(
        vec![
            shell_tool("Cpp check", "echo check; exit 1"),
            shell_tool("Cpp lint", "echo lint"),
        ],
        Some(shell_tool("Clang tidy", "echo tidy")),
    );
    let options = Options::new(true, false, 1, false, Some("/gsl")).unwrap();
    let sink = MemorySink::new();

    let state = FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process("a.h")
        .unwrap();

    assert_eq!(state, FileState::Done);
    assert_eq!(
        sink.blocks(),
        vec![
            "check\n   Return code is 1.\n",
            "lint\n   Return code is 0.\n",
            "tidy\n   Return code is 0.\n",
        ]
    );
}

#[test]
fn test_essential_only_skips_partial_tools() {
    let mut lizard = shell_tool("Lizard", "echo lizard");
    lizard.partial = true;
    let mut disabled = shell_tool("Disabled", "echo disabled");
    disabled.enabled = false;
    let config = test_config(
        vec![shell_tool("Cpp check", "echo check"), lizard, disabled],
        Some(shell_tool("Clang tidy", "echo tidy")),
    );

    let options = Options::new(true, false, 1, false, Some("/gsl"))
        .unwrap()
        .with_partial_tools(false);
    let sink = MemorySink::new();
    let processor = FileProcessor::new(&config, &options, &sink).unwrap();

    let names: Vec<_> = processor.repair_tools().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Cpp check", "Clang tidy"]);

    let all = Options::new(true, false, 1, false, Some("/gsl")).unwrap();
    let processor = FileProcessor::new(&config, &all, &sink).unwrap();
    assert_eq!(processor.repair_tools().len(), 3);
}

#[test]
fn test_parallel_repair_joins_every_tool() {
    let config = test_config(
        vec![
            shell_tool("Cpp check", "sleep 0.2; echo check"),
            shell_tool("Cpp lint", "echo lint"),
        ],
        Some(shell_tool("Clang tidy", "echo tidy")),
    );
    // Two files in the run make the tools run in threads
    let options = Options::new(true, false, 2, true, Some("/gsl")).unwrap();
    let sink = MemorySink::new();

    FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process("a.h")
        .unwrap();

    let contents = sink.contents();
    assert!(contents.contains("  Starting 3 repair threads..\n"));
    assert!(contents.contains("check\n"));
    assert!(contents.contains("lint\n"));
    assert!(contents.contains("tidy\n"));
    for (index, name) in ["Cpp check", "Cpp lint", "Clang tidy"].iter().enumerate() {
        assert!(contents.contains(&format!("  Done joining thread '{name}' {index} out of 3.\n")));
    }
    assert!(sink.blocks().last().unwrap().starts_with(" Done 'a.h' in "));
}

#[test]
fn test_failed_tool_does_not_stop_formatter() {
    let dir = TempDir::new().unwrap();
    let file = source_file(&dir, "#include <a.h>\n");
    let mut missing = shell_tool("Missing", "");
    missing.program = "srcfix-no-such-program".to_string();
    let config = test_config(vec![missing, shell_tool("Cpp lint", "echo lint")], None);

    let options = Options::new(true, true, 1, false, Some("/gsl")).unwrap();
    let sink = MemorySink::new();

    let err = FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process(&file)
        .unwrap_err();

    assert!(err.to_string().contains("Missing"));
    let contents = sink.contents();
    assert!(contents.contains(&format!("', file '{file}'\n")));
    assert!(contents.contains("srcfix-no-such-program"));
    assert!(contents.contains("lint\n"));
    assert_eq!(fs::read_to_string(&file).unwrap(), "#include<a.h>\n");
}

#[test]
fn test_reformat_rewrites_file() {
    let dir = TempDir::new().unwrap();
    let file = source_file(&dir, "#include <vector>\nint f() { // body\n}\n");
    let config = test_config(Vec::new(), None);
    let options = Options::new(false, true, 1, false, None).unwrap();
    let sink = MemorySink::new();

    let state = FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process(&file)
        .unwrap();

    assert_eq!(state, FileState::Done);
    assert_eq!(
        fs::read_to_string(&file).unwrap(),
        "#include<vector>\nint f() {// body\n}\n"
    );
    assert!(sink.blocks().is_empty());
}

#[test]
fn test_formatter_error_fails_file() {
    let dir = TempDir::new().unwrap();
    let file = source_file(&dir, "int x;\n");
    let mut config = test_config(Vec::new(), None);
    config.format.program = "sh".to_string();
    config.format.args = vec!["-c".to_string(), "echo broken >&2".to_string()];
    let options = Options::new(false, true, 1, false, None).unwrap();
    let sink = MemorySink::new();

    let result = FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process(&file);

    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&file).unwrap(), "int x;\n");
}

#[test]
fn test_file_made_relative_to_base_dir() {
    let config = test_config(vec![shell_tool("Echo", "echo \"$0\"")], None);
    let options = Options::new(true, false, 1, true, Some("/gsl"))
        .unwrap()
        .with_base_dir("/work/project");
    let sink = MemorySink::new();

    FileProcessor::new(&config, &options, &sink)
        .unwrap()
        .process("/work/project/src/a.h")
        .unwrap();

    let blocks = sink.blocks();
    assert_eq!(blocks[0], "  Start 'src/a.h' in '/work/project'.\n");
    assert!(blocks[1].contains("  Start Echo 'src/a.h'..\n"));
    assert!(blocks[1].contains("src/a.h\n   Return code is 0.\n"));
}
