use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

/// Source languages the indexer cares about, identified by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    C,
    Cpp,
}

impl SourceLanguage {
    /// Classify a source file by its extension (`.c` or `.cpp`, case-sensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("c") => Some(SourceLanguage::C),
            Some("cpp") => Some(SourceLanguage::Cpp),
            _ => None,
        }
    }
}

/// Per-translation-unit view of a compile command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileRecord {
    /// Resolved include directory -> header files found below it
    pub include_dirs: BTreeMap<PathBuf, Vec<PathBuf>>,
    /// `-D` macro tokens (`NAME` or `NAME=VALUE`) in command order
    pub definitions: Vec<String>,
}

/// Normalized summary of a compilation database
///
/// Produced by [`crate::compdb::parse`]; read-only once returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedIndex {
    c_compiler: Option<PathBuf>,
    cpp_compiler: Option<PathBuf>,
    source_files: BTreeMap<PathBuf, SourceFileRecord>,
    all_include_dirs: Vec<PathBuf>,
    all_include_files: Vec<PathBuf>,
    all_definitions: Vec<String>,
}

impl NormalizedIndex {
    /// Compiler used by the first `.c` file processed
    pub fn c_compiler(&self) -> Option<&Path> {
        self.c_compiler.as_deref()
    }

    /// Compiler used by the first `.cpp` file processed
    pub fn cpp_compiler(&self) -> Option<&Path> {
        self.cpp_compiler.as_deref()
    }

    /// Compiler for the language of `source`, judged by its extension
    pub fn compiler_for(&self, source: &Path) -> Option<&Path> {
        match SourceLanguage::from_path(source)? {
            SourceLanguage::C => self.c_compiler(),
            SourceLanguage::Cpp => self.cpp_compiler(),
        }
    }

    pub fn source_files(&self) -> &BTreeMap<PathBuf, SourceFileRecord> {
        &self.source_files
    }

    pub fn source_file(&self, path: &Path) -> Option<&SourceFileRecord> {
        self.source_files.get(path)
    }

    pub fn source_file_count(&self) -> usize {
        self.source_files.len()
    }

    /// Every include directory, deduplicated, in first-seen order
    pub fn all_include_dirs(&self) -> &[PathBuf] {
        &self.all_include_dirs
    }

    /// Headers of every include directory, deduplicated, in first-seen order
    pub fn all_include_files(&self) -> &[PathBuf] {
        &self.all_include_files
    }

    /// Every definition, deduplicated, in first-seen order
    pub fn all_definitions(&self) -> &[String] {
        &self.all_definitions
    }
}

/// Incremental construction of a [`NormalizedIndex`]
///
/// Enforces the first-occurrence-wins policies: a compiler is recorded once
/// per language and a source file is inserted once.
#[derive(Debug, Default)]
pub(crate) struct IndexBuilder {
    index: NormalizedIndex,
    seen_include_dirs: HashSet<PathBuf>,
    seen_include_files: HashSet<PathBuf>,
    seen_definitions: HashSet<String>,
}

impl IndexBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains_source(&self, path: &Path) -> bool {
        self.index.source_files.contains_key(path)
    }

    pub(crate) fn source_count(&self) -> usize {
        self.index.source_files.len()
    }

    pub(crate) fn insert_source(&mut self, path: PathBuf, record: SourceFileRecord) {
        self.index.source_files.entry(path).or_insert(record);
    }

    /// Record the compiler for `language` unless one is already known
    pub(crate) fn set_compiler_if_unset(&mut self, language: SourceLanguage, compiler: PathBuf) {
        let slot = match language {
            SourceLanguage::C => &mut self.index.c_compiler,
            SourceLanguage::Cpp => &mut self.index.cpp_compiler,
        };
        slot.get_or_insert(compiler);
    }

    /// Add an include directory and its headers to the global aggregates
    pub(crate) fn add_include_dir(&mut self, dir: &Path, headers: &[PathBuf]) {
        if !self.seen_include_dirs.insert(dir.to_path_buf()) {
            return;
        }
        self.index.all_include_dirs.push(dir.to_path_buf());

        for header in headers {
            if self.seen_include_files.insert(header.clone()) {
                self.index.all_include_files.push(header.clone());
            }
        }
    }

    pub(crate) fn add_definition(&mut self, definition: &str) {
        if self.seen_definitions.insert(definition.to_string()) {
            self.index.all_definitions.push(definition.to_string());
        }
    }

    pub(crate) fn build(self) -> NormalizedIndex {
        self.index
    }
}
