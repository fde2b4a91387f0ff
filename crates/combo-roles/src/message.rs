//! Document diagnostics.
//!
//! Role handlers never fail by panicking or returning `Err`: problems are
//! reported as [`SystemMessage`]s tied to a source line, which the host shows
//! to the author next to the offending markup.

use std::fmt;

/// Severity of a [`SystemMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "lowercase")
)]
pub enum Level {
    /// Informational.
    Info,
    /// Something looks wrong but output was produced.
    Warning,
    /// Output could not be produced.
    Error,
    /// Processing of the document cannot continue.
    Severe,
}

impl Level {
    fn code(self) -> u8 {
        match self {
            Self::Info => 1,
            Self::Warning => 2,
            Self::Error => 3,
            Self::Severe => 4,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Severe => "SEVERE",
        }
    }
}

/// A diagnostic attached to a source line.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SystemMessage {
    /// Severity.
    pub level: Level,
    /// Human-readable text.
    pub text: String,
    /// Source file, if known.
    pub source: Option<String>,
    /// Line number (1-indexed).
    pub line: usize,
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self.source.as_deref().unwrap_or("<string>");
        write!(
            f,
            "{source}:{}: ({}/{}) {}",
            self.line,
            self.level.label(),
            self.level.code(),
            self.text
        )
    }
}

/// Builds [`SystemMessage`]s for one document.
///
/// Every message is also emitted as a `tracing` event so problems show up in
/// build logs even when the host drops the message.
#[derive(Debug, Clone, Default)]
pub struct Reporter {
    source: Option<String>,
}

impl Reporter {
    /// Create a reporter for the given source file.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
        }
    }

    /// Source file this reporter reports for.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Create an info message.
    #[must_use]
    pub fn info(&self, text: impl Into<String>, line: usize) -> SystemMessage {
        self.message(Level::Info, text.into(), line)
    }

    /// Create a warning message.
    #[must_use]
    pub fn warning(&self, text: impl Into<String>, line: usize) -> SystemMessage {
        self.message(Level::Warning, text.into(), line)
    }

    /// Create an error message.
    #[must_use]
    pub fn error(&self, text: impl Into<String>, line: usize) -> SystemMessage {
        self.message(Level::Error, text.into(), line)
    }

    fn message(&self, level: Level, text: String, line: usize) -> SystemMessage {
        let source = self.source.as_deref().unwrap_or("<string>");
        match level {
            Level::Info => tracing::debug!(source, line, "{text}"),
            Level::Warning => tracing::warn!(source, line, "{text}"),
            Level::Error | Level::Severe => tracing::error!(source, line, "{text}"),
        }

        SystemMessage {
            level,
            text,
            source: self.source.clone(),
            line,
        }
    }
}
