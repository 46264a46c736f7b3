// LogLens - GPL-3.0-or-later
// This file is part of LogLens.
//
// LogLens is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// LogLens is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with LogLens.  If not, see <https://www.gnu.org/licenses/>.

//! Error taxonomy for the parsing and filtering core.
//!
//! Three error families exist: file-level problems raised by collaborators
//! outside this crate, parse failures raised by the log line parser, and
//! validation failures raised for bad user-entered filter text. Each
//! carries a user-facing message separate from any internal diagnostic
//! detail.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How serious an error is from the user's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

/// File-level failure (size, encoding, unreadable source).
///
/// Not raised by this crate itself; defined here so the embedding
/// application reports all failures through one taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct FileError {
    /// User-facing message.
    pub message: String,
    /// Internal diagnostic detail, never shown verbatim to the user.
    pub detail: Option<String>,
    pub severity: Severity,
}

/// Malformed or non-matching log input. Fatal to the parse attempt: no
/// partial record set is produced alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ParsingError {
    /// User-facing message.
    pub message: String,
    /// Internal diagnostic detail, never shown verbatim to the user.
    pub detail: Option<String>,
    pub severity: Severity,
}

impl ParsingError {
    /// A fatal parse failure with the given user-facing message.
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            severity: Severity::Error,
        }
    }

    /// Attach internal diagnostic detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Bad user-entered filter or time text. Local and non-fatal: the caller
/// keeps its prior valid state and surfaces the message as a warning.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationError {
    /// User-facing message.
    pub message: String,
    /// Internal diagnostic detail, never shown verbatim to the user.
    pub detail: Option<String>,
    pub severity: Severity,
}

impl ValidationError {
    /// A non-fatal validation failure with the given user-facing message.
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
            severity: Severity::Warning,
        }
    }

    /// Attach internal diagnostic detail.
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Umbrella error for callers that funnel all three families together.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Parsing(#[from] ParsingError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl Error {
    pub fn severity(&self) -> Severity {
        match self {
            Self::File(e) => e.severity,
            Self::Parsing(e) => e.severity,
            Self::Validation(e) => e.severity,
        }
    }

    /// The user-facing message, without internal detail.
    pub fn message(&self) -> &str {
        match self {
            Self::File(e) => &e.message,
            Self::Parsing(e) => &e.message,
            Self::Validation(e) => &e.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parsing_error_is_fatal_by_default() {
        let err = ParsingError::fatal("file is empty");
        assert_eq!(err.severity, Severity::Error);
        assert_eq!(err.to_string(), "file is empty");
        assert!(err.detail.is_none());
    }

    #[test]
    fn detail_stays_out_of_display() {
        let err =
            ValidationError::warning("invalid time range").with_detail("minute out of range: 60");
        assert_eq!(err.to_string(), "invalid time range");
        assert_eq!(err.detail.as_deref(), Some("minute out of range: 60"));
    }

    #[test]
    fn umbrella_reports_inner_severity() {
        let err: Error = ValidationError::warning("bad input").into();
        assert_eq!(err.severity(), Severity::Warning);
        assert_eq!(err.message(), "bad input");
    }
}
