// This file is part of rosh, a simple POSIX shell.
// Copyright (C) 2024 The rosh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Definition of errors that happen in the parser.

use super::lex::LexError;
use crate::source::Location;
use std::fmt;

/// Types of syntax errors.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum SyntaxError {
    /// A token of an unexpected class where another was required.
    #[error("expected {expected}, got {got}")]
    UnexpectedToken {
        /// Description of the acceptable token classes.
        expected: &'static str,
        /// Description of the token actually found.
        got: String,
    },
    /// The IO number of a redirection does not fit a file descriptor.
    #[error("invalid IO number {0:?}")]
    InvalidIoNumber(String),
    /// `>&` with a filename target was used with a source FD other than 1.
    #[error("ambiguous redirect")]
    AmbiguousRedirect,
    /// `<&` requires a file descriptor number as its target.
    #[error("file descriptor number expected after <&")]
    FdNumberExpected,
    /// A backquote substitution lacks its closing backquote.
    #[error("unclosed backquote substitution")]
    UnclosedBackquote,
    /// A command substitution started with `$(` lacks its closing `)`.
    #[error("unclosed command substitution")]
    UnclosedCommandSubstitution,
}

/// Types of errors that may happen in parsing.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorCause {
    /// The lexer entered its terminal error state.
    #[error(transparent)]
    Lex(LexError),
    /// The token stream violates the grammar.
    #[error(transparent)]
    Syntax(SyntaxError),
}

impl From<LexError> for ErrorCause {
    fn from(error: LexError) -> ErrorCause {
        ErrorCause::Lex(error)
    }
}

impl From<SyntaxError> for ErrorCause {
    fn from(error: SyntaxError) -> ErrorCause {
        ErrorCause::Syntax(error)
    }
}

/// Explanation of a failure in parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    pub cause: ErrorCause,
    pub location: Location,
}

impl Error {
    /// Whether the error is terminal: a lexer error leaves the token
    /// stream stuck, so the caller cannot recover by skipping tokens.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self.cause, ErrorCause::Lex(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.cause)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Entire result of parsing.
pub type Result<T> = std::result::Result<T, Error>;
