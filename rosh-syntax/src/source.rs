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

//! Source code positions.
//!
//! The shell reads commands from a stream, so a position is simply a line
//! and column pair. The lexer stamps every token with the position of its
//! first character, and parse errors carry the position of the offending
//! token.

use std::fmt;

/// Position in the source code.
///
/// Lines and columns are counted from 1. Columns count characters, not
/// bytes.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// Line number of the position.
    pub line: u64,
    /// Column number of the position in the line.
    pub column: u64,
}

impl Location {
    /// Creates a location for the very beginning of a source stream.
    #[must_use]
    pub const fn start() -> Location {
        Location { line: 1, column: 1 }
    }

    /// Creates a dummy location, for use in tests.
    #[must_use]
    pub const fn dummy() -> Location {
        Location::start()
    }
}

impl Default for Location {
    fn default() -> Location {
        Location::start()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}
