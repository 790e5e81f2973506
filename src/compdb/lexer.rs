use serde::{Deserialize, Serialize};

/// Strategy for splitting a compile command into arguments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandLexer {
    /// POSIX shell word splitting: quotes and backslash escapes are honoured,
    /// so `-DMSG="a b"` stays one argument (`-DMSG=a b`)
    #[default]
    Shell,
    /// Split on runs of whitespace with no quote handling
    Whitespace,
}

impl CommandLexer {
    /// Split `command` into arguments
    ///
    /// Only the shell lexer can fail, on an unterminated quote or a trailing
    /// backslash.
    pub fn tokenize(self, command: &str) -> Result<Vec<String>, shell_words::ParseError> {
        match self {
            CommandLexer::Shell => shell_words::split(command),
            CommandLexer::Whitespace => Ok(command.split_whitespace().map(String::from).collect()),
        }
    }
}
