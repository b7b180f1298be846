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

//! Conversion from strings to syntax trees.
//!
//! The conversion parses with [`NullExpansion`](crate::expansion::NullExpansion),
//! so no globbing or command substitution takes place; it is meant for
//! tests and for re-reading a rendered tree.

use super::core::Parser;
use super::error::{Error, SyntaxError};
use crate::source::Location;
use crate::syntax::CompleteCommand;
use std::str::FromStr;

impl FromStr for CompleteCommand {
    type Err = Error;

    /// Parses exactly one complete command from the string.
    fn from_str(s: &str) -> Result<CompleteCommand, Error> {
        let mut parser = Parser::from_memory(s);
        match parser.next_complete_command()? {
            Some(command) => Ok(command),
            None => Err(Error {
                cause: SyntaxError::UnexpectedToken {
                    expected: "command",
                    got: "end of input".to_string(),
                }
                .into(),
                location: Location::start(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_command_from_str() {
        let command: CompleteCommand = "echo hello | cat".parse().unwrap();
        assert_eq!(command.to_string(), "echo hello | cat");
    }

    #[test]
    fn complete_command_from_empty_str() {
        let result: Result<CompleteCommand, Error> = "".parse();
        assert!(result.is_err());
    }
}
