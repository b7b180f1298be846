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

//! Tokenizer, syntax tree and parser for the rosh shell language.
//!
//! This crate is the front half of the shell: it turns a byte stream into
//! [tokens](parser::lex), tokens into [syntax trees](syntax), and defines
//! the [`Expansion`](expansion::Expansion) seam through which the parser
//! asks the host for globbing and command substitution. Executing the
//! trees is the business of the `rosh-exec` crate.
//!
//! The crate is built for streaming use: an interactive driver calls
//! [`Parser::next_complete_command`](parser::Parser::next_complete_command)
//! in a loop, and each complete command can be executed before the next
//! line of input even exists.

pub mod expansion;
pub mod parser;
pub mod source;
pub mod syntax;
