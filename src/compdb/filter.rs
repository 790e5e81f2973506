use regex::Regex;
use std::path::Path;
use tracing::debug;

use crate::compdb::CompilationDatabaseError;
use crate::compdb::record::{InvocationRecord, records_from_value};
use crate::io::{FileSystemTrait, RealFileSystem};
use crate::jsonc::load_jsonc;

/// Outcome of filtering a compilation database, both halves in input order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterResult {
    /// Entries written to the output database
    pub kept: Vec<InvocationRecord>,
    /// Entries whose command matched the pattern
    pub removed: Vec<InvocationRecord>,
}

/// Split records by whether their command matches `pattern` anywhere
pub fn partition_records(records: Vec<InvocationRecord>, pattern: &Regex) -> FilterResult {
    let (removed, kept) = records
        .into_iter()
        .partition(|record| pattern.is_match(&record.command));

    FilterResult { kept, removed }
}

/// Filter a compilation database on the real filesystem
pub fn filter(
    input: &Path,
    output: &Path,
    pattern: &str,
) -> Result<FilterResult, CompilationDatabaseError> {
    filter_with_fs(&RealFileSystem, input, output, pattern)
}

/// Remove every entry whose command matches `pattern` and write the rest
///
/// No extension filtering or path resolution happens here; every entry is
/// considered. The output file is overwritten. Nothing is written if the
/// pattern or any entry is invalid.
pub fn filter_with_fs<F: FileSystemTrait>(
    fs: &F,
    input: &Path,
    output: &Path,
    pattern: &str,
) -> Result<FilterResult, CompilationDatabaseError> {
    let regex = Regex::new(pattern).map_err(|e| CompilationDatabaseError::InvalidPattern {
        pattern: pattern.to_string(),
        error: e.to_string(),
    })?;

    let value = load_jsonc(fs, input)?;
    let records = records_from_value(value, input)?;
    let total = records.len();

    let result = partition_records(records, &regex);

    let mut serialized = serde_json::to_string_pretty(&result.kept).map_err(|e| {
        CompilationDatabaseError::ParseError {
            path: output.to_string_lossy().to_string(),
            error: e.to_string(),
        }
    })?;
    serialized.push('\n');
    fs.write(output, serialized.as_bytes())?;

    debug!(
        "Kept {} of {} entries from {}, wrote {}",
        result.kept.len(),
        total,
        input.display(),
        output.display()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file_system::TestFileSystem;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    #[cfg(feature = "test-logging")]
    #[ctor::ctor]
    fn init_test_logging() {
        crate::test_utils::logging::init();
    }

    const INPUT: &str = "/build/compile_commands.json";
    const OUTPUT: &str = "/build/filtered.json";

    fn database() -> Value {
        json!([
            {"directory": "/build", "file": "a.c", "command": "gcc -DDEBUG -c a.c"},
            {"directory": "/build", "file": "b.h", "command": "gcc -c b.h", "output": "b.o"},
            {"directory": "/build", "file": "c.cpp", "command": "g++ -O2 -c c.cpp"}
        ])
    }

    fn test_fs() -> TestFileSystem {
        let fs = TestFileSystem::new();
        fs.set_file_content(INPUT, &database().to_string());
        fs
    }

    fn written(fs: &TestFileSystem) -> Value {
        serde_json::from_str(&fs.file_content(OUTPUT).unwrap()).unwrap()
    }

    #[test]
    fn test_matching_entries_are_removed() {
        let fs = test_fs();
        let result = filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "-DDEBUG").unwrap();

        assert_eq!(result.removed.len(), 1);
        assert_eq!(result.removed[0].file, "a.c");
        assert_eq!(
            result.kept.iter().map(|r| r.file.as_str()).collect::<Vec<_>>(),
            vec!["b.h", "c.cpp"]
        );

        let entries = database();
        assert_eq!(written(&fs), json!([entries[1], entries[2]]));
    }

    #[test]
    fn test_pattern_matching_nothing_keeps_everything() {
        let fs = test_fs();
        let result =
            filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "-fsanitize").unwrap();

        assert!(result.removed.is_empty());
        assert_eq!(written(&fs), database());
    }

    #[test]
    fn test_pattern_matching_everything_removes_everything() {
        let fs = test_fs();
        let result = filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "^g").unwrap();

        assert!(result.kept.is_empty());
        assert_eq!(
            result.removed.iter().map(|r| r.file.as_str()).collect::<Vec<_>>(),
            vec!["a.c", "b.h", "c.cpp"]
        );
        assert_eq!(written(&fs), json!([]));
    }

    #[test]
    fn test_output_is_overwritten_and_newline_terminated() {
        let fs = test_fs();
        fs.set_file_content(OUTPUT, "stale content");

        filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "c\\.cpp").unwrap();

        let content = fs.file_content(OUTPUT).unwrap();
        assert!(content.ends_with("]\n"));
        assert!(!content.contains("stale"));
        assert!(!content.contains("c.cpp"));
    }

    #[test]
    fn test_malformed_entry_writes_nothing() {
        let fs = TestFileSystem::new();
        fs.set_file_content(
            INPUT,
            r#"[{"file": "a.c", "command": "gcc a.c"}, {"command": "gcc"}]"#,
        );

        let result = filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "x");

        assert!(matches!(
            result,
            Err(CompilationDatabaseError::MalformedEntry { index: 1, .. })
        ));
        assert!(fs.file_content(OUTPUT).is_none());
    }

    #[test]
    fn test_missing_input_is_not_found() {
        let fs = TestFileSystem::new();
        let result = filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "x");
        assert!(matches!(
            result,
            Err(CompilationDatabaseError::NotFound { .. })
        ));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let fs = test_fs();
        let result = filter_with_fs(&fs, Path::new(INPUT), Path::new(OUTPUT), "(unclosed");
        assert!(matches!(
            result,
            Err(CompilationDatabaseError::InvalidPattern { .. })
        ));
        assert!(fs.file_content(OUTPUT).is_none());
    }

    #[test]
    fn test_filter_on_real_filesystem_with_comments() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("compile_commands.json");
        let output = temp_dir.path().join("out.json");
        fs::write(
            &input,
            r#"[
                // third-party code is analysed separately
                {"file": "vendor/x.c", "command": "cc -Ivendor/include vendor/x.c"},
                /* first-party */
                {"file": "src/y.c", "command": "cc -Iinclude src/y.c"}
            ]"#,
        )
        .unwrap();

        let result = filter(&input, &output, "vendor/").unwrap();

        assert_eq!(result.removed.len(), 1);
        let written: Value = serde_json::from_str(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(
            written,
            json!([{"file": "src/y.c", "command": "cc -Iinclude src/y.c"}])
        );
    }
}
