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

//! Host services the parser calls during token evaluation.
//!
//! Tokenizing is pure, but evaluating a token is not: an unquoted word is
//! matched against the file system as a glob pattern, and a backquote or
//! `$(...)` substitution runs a whole subshell. The parser reaches the
//! host through the [`Expansion`] trait so that it does not depend on any
//! particular process-spawning or file-system facility. The executor crate
//! provides the real implementation; [`NullExpansion`] keeps parsing pure
//! for tests and [`FromStr`](std::str::FromStr) conversions.

/// Host side of token evaluation.
pub trait Expansion {
    /// Expands `pattern` as a file-system glob.
    ///
    /// Returns the matched path names joined with single spaces, or `None`
    /// when nothing matches (or the pattern is invalid), in which case the
    /// word is kept as written.
    fn glob(&mut self, pattern: &str) -> Option<String>;

    /// Runs `source` as a shell command and returns its captured standard
    /// output, unprocessed.
    ///
    /// Failures to even start the command are reported by the
    /// implementation itself; the parser only ever sees an output string,
    /// which may be empty.
    fn command_substitution(&mut self, source: &str) -> String;
}

/// An [`Expansion`] that performs no expansion at all.
///
/// Glob patterns never match and command substitution produces nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullExpansion;

impl Expansion for NullExpansion {
    fn glob(&mut self, _pattern: &str) -> Option<String> {
        None
    }

    fn command_substitution(&mut self, _source: &str) -> String {
        String::new()
    }
}
