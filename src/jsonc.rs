//! JSON-with-comments loading
//!
//! Compilation databases and tool configuration files are sometimes
//! hand-edited and carry `//` and `/* */` comments. Those are stripped by a
//! small character scanner that tracks whether it is inside a string literal,
//! so comment-like sequences in strings (URLs, `"/*"` globs) survive intact.

use serde_json::Value;
use std::path::Path;
use tracing::trace;

use crate::compdb::CompilationDatabaseError;
use crate::io::FileSystemTrait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    String { escaped: bool },
    LineComment,
    BlockComment,
}

/// Remove `//` line comments and `/* */` block comments outside string literals
///
/// Line comments stop before the terminating newline, which is kept. Newlines
/// inside block comments are kept too so JSON error positions still point at
/// the original line. An unterminated block comment swallows the rest of the
/// input.
pub fn strip_comments(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut state = ScanState::Code;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        state = match state {
            ScanState::Code => match (c, chars.peek()) {
                ('/', Some('/')) => {
                    chars.next();
                    ScanState::LineComment
                }
                ('/', Some('*')) => {
                    chars.next();
                    ScanState::BlockComment
                }
                ('"', _) => {
                    output.push(c);
                    ScanState::String { escaped: false }
                }
                _ => {
                    output.push(c);
                    ScanState::Code
                }
            },
            ScanState::String { escaped } => {
                output.push(c);
                match c {
                    _ if escaped => ScanState::String { escaped: false },
                    '\\' => ScanState::String { escaped: true },
                    '"' => ScanState::Code,
                    _ => ScanState::String { escaped: false },
                }
            }
            ScanState::LineComment => {
                if c == '\n' {
                    output.push(c);
                    ScanState::Code
                } else {
                    ScanState::LineComment
                }
            }
            ScanState::BlockComment => match (c, chars.peek()) {
                ('*', Some('/')) => {
                    chars.next();
                    ScanState::Code
                }
                ('\n', _) => {
                    output.push(c);
                    ScanState::BlockComment
                }
                _ => ScanState::BlockComment,
            },
        };
    }

    output
}

/// Strip comments from `text` and parse the remainder as JSON
///
/// A leading byte order mark is skipped. `origin` only labels the error.
pub fn parse_jsonc(text: &str, origin: &Path) -> Result<Value, CompilationDatabaseError> {
    let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);

    serde_json::from_str(&strip_comments(text)).map_err(|e| {
        CompilationDatabaseError::ParseError {
            path: origin.to_string_lossy().to_string(),
            error: e.to_string(),
        }
    })
}

/// Load a JSON-with-comments document from disk
pub fn load_jsonc<F: FileSystemTrait>(
    fs: &F,
    path: &Path,
) -> Result<Value, CompilationDatabaseError> {
    if !fs.exists(path) {
        return Err(CompilationDatabaseError::not_found(path));
    }

    let text = fs.read_to_string(path)?;
    trace!(
        "Loaded {} bytes of JSONC from {}",
        text.len(),
        path.display()
    );

    parse_jsonc(&text, path)
}
