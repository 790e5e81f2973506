use std::collections::HashMap;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, trace};

use crate::compdb::index::{IndexBuilder, NormalizedIndex, SourceFileRecord, SourceLanguage};
use crate::compdb::record::{InvocationRecord, records_from_value};
use crate::compdb::{CommandLexer, CompilationDatabaseError};
use crate::io::{FileSystemTrait, RealFileSystem};
use crate::jsonc::load_jsonc;

/// Flag introducing an include directory (`-Idir` or `-I dir`)
pub const INCLUDE_FLAG: &str = "-I";
/// Flag introducing a preprocessor definition (`-DNAME[=VALUE]` or `-D NAME`)
pub const DEFINITION_FLAG: &str = "-D";

/// Options controlling what [`parse`] extracts and how paths are resolved
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Collect `-D` definitions
    pub include_definitions: bool,
    /// Collect `-I` directories and expand them into header lists
    pub include_includes: bool,
    /// How commands are split into arguments
    pub lexer: CommandLexer,
    /// Directory relative paths are resolved against (defaults to the
    /// current working directory)
    pub base_dir: Option<PathBuf>,
    /// `PATH`-style list used to locate bare compiler names (defaults to the
    /// `PATH` environment variable)
    pub search_path: Option<OsString>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            include_definitions: true,
            include_includes: true,
            lexer: CommandLexer::default(),
            base_dir: None,
            search_path: None,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_definitions(mut self, enabled: bool) -> Self {
        self.include_definitions = enabled;
        self
    }

    pub fn with_includes(mut self, enabled: bool) -> Self {
        self.include_includes = enabled;
        self
    }

    pub fn with_lexer(mut self, lexer: CommandLexer) -> Self {
        self.lexer = lexer;
        self
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    pub fn with_search_path(mut self, search_path: impl Into<OsString>) -> Self {
        self.search_path = Some(search_path.into());
        self
    }
}

/// Memoized header enumeration per include directory
///
/// Scoped to a single parse; many translation units repeat the same `-I`
/// flags and each directory is walked only once.
#[derive(Debug, Default)]
pub struct IncludeDirCache {
    entries: HashMap<PathBuf, Vec<PathBuf>>,
    hits: usize,
}

impl IncludeDirCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Headers below `dir`, enumerating the directory on first request
    pub fn headers<F: FileSystemTrait>(
        &mut self,
        fs: &F,
        dir: &Path,
    ) -> Result<&[PathBuf], CompilationDatabaseError> {
        if self.entries.contains_key(dir) {
            self.hits += 1;
        } else {
            let headers = fs
                .find_headers(dir)
                .map_err(|e| CompilationDatabaseError::unresolved(dir, e.to_string()))?;
            trace!("Found {} headers under {}", headers.len(), dir.display());
            self.entries.insert(dir.to_path_buf(), headers);
        }
        Ok(self.entries[dir].as_slice())
    }

    /// Number of distinct directories enumerated so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of lookups answered without touching the filesystem
    pub fn hits(&self) -> usize {
        self.hits
    }
}

/// Parse a compilation database on the real filesystem
pub fn parse(
    path: &Path,
    options: &ParseOptions,
) -> Result<NormalizedIndex, CompilationDatabaseError> {
    parse_with_fs(&RealFileSystem, path, options)
}

/// Parse a compilation database into a [`NormalizedIndex`]
///
/// Every entry is validated before any is processed, so a malformed entry
/// anywhere in the file fails the whole parse. Only `.c` and `.cpp`
/// translation units are indexed, each once (first occurrence wins).
pub fn parse_with_fs<F: FileSystemTrait>(
    fs: &F,
    path: &Path,
    options: &ParseOptions,
) -> Result<NormalizedIndex, CompilationDatabaseError> {
    let value = load_jsonc(fs, path)?;
    let records = records_from_value(value, path)?;

    // A relative base directory is taken relative to the working directory
    let base_dir = match &options.base_dir {
        Some(dir) if dir.is_absolute() => normalize_path(dir),
        Some(dir) => normalize_path(&std::env::current_dir()?.join(dir)),
        None => std::env::current_dir()?,
    };

    let mut parser = DatabaseParser {
        fs,
        options,
        base_dir,
        cache: IncludeDirCache::new(),
        builder: IndexBuilder::new(),
    };

    for (index, record) in records.iter().enumerate() {
        parser.process_record(index, record)?;
    }

    debug!(
        "Indexed {} of {} entries from {} ({} include directories enumerated, {} cache hits)",
        parser.builder.source_count(),
        records.len(),
        path.display(),
        parser.cache.len(),
        parser.cache.hits()
    );

    Ok(parser.builder.build())
}

struct DatabaseParser<'a, F: FileSystemTrait> {
    fs: &'a F,
    options: &'a ParseOptions,
    base_dir: PathBuf,
    cache: IncludeDirCache,
    builder: IndexBuilder,
}

impl<F: FileSystemTrait> DatabaseParser<'_, F> {
    fn process_record(
        &mut self,
        index: usize,
        record: &InvocationRecord,
    ) -> Result<(), CompilationDatabaseError> {
        let source = normalize_path(&self.base_dir.join(&record.file));

        if self.builder.contains_source(&source) {
            trace!("Skipping duplicate entry for {}", source.display());
            return Ok(());
        }

        let Some(language) = SourceLanguage::from_path(&source) else {
            trace!("Skipping non C/C++ entry {}", source.display());
            return Ok(());
        };

        let tokens = self.options.lexer.tokenize(&record.command).map_err(|e| {
            CompilationDatabaseError::MalformedEntry {
                index,
                reason: format!("cannot split command: {e}"),
            }
        })?;

        let mut file_record = SourceFileRecord::default();
        let mut args = tokens.iter();

        if let Some(compiler) = args.next() {
            let compiler = self.resolve_compiler(compiler)?;
            self.builder.set_compiler_if_unset(language, compiler);
        }

        while let Some(arg) = args.next() {
            if self.options.include_includes
                && let Some(value) = flag_value(index, arg, INCLUDE_FLAG, &mut args)?
            {
                let dir = self.resolve_include_dir(value)?;
                let headers = self.cache.headers(self.fs, &dir)?;
                self.builder.add_include_dir(&dir, headers);
                file_record.include_dirs.insert(dir, headers.to_vec());
            } else if self.options.include_definitions
                && let Some(value) = flag_value(index, arg, DEFINITION_FLAG, &mut args)?
            {
                self.builder.add_definition(value);
                file_record.definitions.push(value.to_string());
            }
        }

        self.builder.insert_source(source, file_record);
        Ok(())
    }

    fn resolve_include_dir(&self, value: &str) -> Result<PathBuf, CompilationDatabaseError> {
        let dir = normalize_path(&self.base_dir.join(value));

        if !self.fs.exists(&dir) {
            return Err(CompilationDatabaseError::unresolved(
                &dir,
                "include directory does not exist",
            ));
        }
        if !self.fs.is_dir(&dir) {
            return Err(CompilationDatabaseError::unresolved(
                &dir,
                "include path is not a directory",
            ));
        }

        Ok(dir)
    }

    /// Resolve the compiler named by the first command token
    ///
    /// Names containing a path separator are taken relative to the base
    /// directory; bare names are looked up on the search path.
    fn resolve_compiler(&self, name: &str) -> Result<PathBuf, CompilationDatabaseError> {
        let candidate = Path::new(name);

        if candidate.components().count() > 1 || candidate.is_absolute() {
            let resolved = normalize_path(&self.base_dir.join(candidate));
            return if self.fs.is_file(&resolved) {
                Ok(resolved)
            } else {
                Err(CompilationDatabaseError::unresolved(
                    &resolved,
                    "compiler does not exist",
                ))
            };
        }

        let search_path = self
            .options
            .search_path
            .clone()
            .or_else(|| std::env::var_os("PATH"))
            .unwrap_or_default();

        for dir in std::env::split_paths(&search_path) {
            for file_name in executable_names(name) {
                let resolved = normalize_path(&self.base_dir.join(&dir).join(&file_name));
                if self.fs.is_file(&resolved) {
                    return Ok(resolved);
                }
            }
        }

        Err(CompilationDatabaseError::unresolved(
            candidate,
            "compiler not found on the search path",
        ))
    }
}

/// Value of `flag` in either attached (`-Ivalue`) or separated (`-I value`)
/// form, consuming the next argument for the latter
///
/// A separated flag with nothing after it is a malformed entry.
fn flag_value<'t>(
    index: usize,
    arg: &'t str,
    flag: &str,
    rest: &mut std::slice::Iter<'t, String>,
) -> Result<Option<&'t str>, CompilationDatabaseError> {
    let Some(value) = arg.strip_prefix(flag) else {
        return Ok(None);
    };
    if !value.is_empty() {
        return Ok(Some(value));
    }
    match rest.next() {
        Some(next) => Ok(Some(next.as_str())),
        None => Err(CompilationDatabaseError::MalformedEntry {
            index,
            reason: format!("'{flag}' is missing its value"),
        }),
    }
}

#[cfg(windows)]
fn executable_names(name: &str) -> Vec<String> {
    if Path::new(name).extension().is_some() {
        vec![name.to_string()]
    } else {
        vec![format!("{name}.exe"), name.to_string()]
    }
}

#[cfg(not(windows))]
fn executable_names(name: &str) -> Vec<String> {
    vec![name.to_string()]
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. Symlinks are not resolved.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => normalized.push(component),
            },
            other => normalized.push(other),
        }
    }

    normalized
}
