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

//! Syntax parser for the shell language.
//!
//! The parser directly implements the grammar productions: complete
//! command, list, and-or list, pipeline, command, and redirection. It is
//! streaming: beyond the previous, current, and one peeked token it holds
//! no token buffer, so the driver can execute each complete command as
//! soon as it has been parsed.

mod command;
mod core;
mod error;
mod from_str;
pub mod lex;
mod list;
mod redir;
mod word;

pub use self::core::Parser;
pub use self::error::{Error, ErrorCause, Result, SyntaxError};
