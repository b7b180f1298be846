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

//! Lexical analyzer.
//!
//! The lexer turns a byte stream into [`Token`]s, one per call, so a
//! driver can parse one command at a time without the whole program in
//! memory. Tokenization is whitespace-sensitive, so blank runs and
//! newlines are tokens of their own and the parser filters them.

mod core;
mod state;
mod token;

pub use self::core::Lexer;
pub use self::token::{LexError, RedirOp, Token, TokenId};
