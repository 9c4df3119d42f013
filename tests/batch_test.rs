/*!
Directory and file level analysis
*/

use complexity_analyzer::core::read_source_file;
use complexity_analyzer::{
    analyze_directory, analyze_file, collect_source_files, AnalyzerConfig, FileOutcome,
    GrammarChoice,
};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

fn write(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

#[test]
fn test_collects_only_source_files() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    write(&dir, "b.java", "int x;");
    write(&dir, "a.c", "int x;");
    write(&dir, "notes.txt", "for (;;) {}");
    write(&dir, "nested/util.h", "int y;");

    let names: Vec<String> = collect_source_files(dir.path())
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(names, vec!["a.c", "b.java", "nested/util.h"]);
}

#[test]
fn test_batch_reports_each_file() {
    let dir = TempDir::new().unwrap();
    write(
        &dir,
        "loops.c",
        "for (i = 0; i < n; i++) { for (j = 0; j < n; j++) { } }",
    );
    write(
        &dir,
        "Fib.java",
        "int fib(int n) { if (n <= 1) return n; return fib(n - 1) + fib(n - 2); }",
    );
    write(&dir, "broken.c", "for (i");

    let batch = analyze_directory(dir.path(), &AnalyzerConfig::default());
    assert_eq!(batch.files.len(), 3);
    assert_eq!(batch.analyzed(), 2);
    assert_eq!(batch.failed(), 1);

    let summary: Vec<(String, String)> = batch
        .files
        .iter()
        .map(|file| {
            let name = file.path.file_name().unwrap().to_string_lossy().to_string();
            let result = match &file.outcome {
                FileOutcome::Report(report) => {
                    format!("{} {}", report.time_notation(), report.space_notation())
                }
                FileOutcome::Error { code, .. } => code.clone(),
            };
            (name, result)
        })
        .collect();

    assert_eq!(
        summary,
        vec![
            ("Fib.java".to_string(), "O(2^n) O(n)".to_string()),
            ("broken.c".to_string(), "unexpected-end-of-input".to_string()),
            ("loops.c".to_string(), "O(n^2) O(1)".to_string()),
        ]
    );
}

#[test]
fn test_forced_grammar_overrides_extension() {
    let dir = TempDir::new().unwrap();
    write(&dir, "main.c", "Foo f = new Foo();");

    let mut config = AnalyzerConfig::default();
    let report = analyze_file(&dir.path().join("main.c"), &config);
    match report.outcome {
        FileOutcome::Report(report) => assert_eq!(report.space_notation(), "O(1)"),
        other => panic!("unexpected outcome: {:?}", other),
    }

    config.analysis.grammar = GrammarChoice::Java;
    let report = analyze_file(&dir.path().join("main.c"), &config);
    match report.outcome {
        FileOutcome::Report(report) => assert_eq!(report.space_notation(), "O(n)"),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let report = analyze_file(&dir.path().join("absent.c"), &AnalyzerConfig::default());
    assert!(matches!(
        report.outcome,
        FileOutcome::Error { ref code, .. } if code == "io-error"
    ));
}

#[test]
fn test_bom_prefixed_source() -> std::io::Result<()> {
    let mut file = NamedTempFile::new()?;
    file.write_all(b"\xEF\xBB\xBFint main() { for (i = 0; i < n; i++) { } }")?;

    let content = read_source_file(file.path())?;
    assert!(content.starts_with("int main"));

    let report = complexity_analyzer::analyze_detected(&content).unwrap();
    assert_eq!(report.time_notation(), "O(n)");
    Ok(())
}

#[test]
fn test_batch_json_shape() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.c", "int a[n];");

    let batch = analyze_directory(dir.path(), &AnalyzerConfig::default());
    let value = serde_json::to_value(&batch).unwrap();
    let entry = &value["files"][0];
    assert_eq!(entry["report"]["space"], "O(n)");
    assert_eq!(entry["report"]["grammar"], "c");
}
