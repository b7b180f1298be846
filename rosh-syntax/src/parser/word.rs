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

//! Token evaluation and word aggregation.
//!
//! Between the lexer and the grammar productions sits a small evaluation
//! pipeline. Depending on its identifier, the current token is rewritten:
//!
//! - identifier: the value is matched against the file system as a glob
//!   pattern and replaced by the space-joined matches, if any;
//! - double-quoted string: the `\"` escape becomes `"`;
//! - backquote and `$(`: the enclosed tokens are collected and run in a
//!   subshell, and the captured output replaces the token.
//!
//! The evaluated token is then joined with immediately adjacent word
//! tokens, which is how `a"b"'c'a` ends up as the single word `abca`.

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use super::lex::{Token, TokenId};
use crate::source::Location;

/// Whether a token with this identifier can join the current word.
///
/// Substitution tokens are in the set: their captured output joins the
/// word as an identifier would.
fn joins_word(id: TokenId) -> bool {
    id.is_word() || matches!(id, TokenId::Backquote | TokenId::CommandSubst)
}

impl Parser<'_> {
    /// Evaluates the current token, possibly consuming further tokens (for
    /// a command substitution, everything up to its terminator).
    pub(super) fn eval_token(&mut self) -> Result<Token> {
        match self.cur.id {
            TokenId::Identifier => {
                let mut token = self.cur.clone();
                if let Some(expanded) = self.expansion.glob(&token.value) {
                    token.value = expanded;
                }
                Ok(token)
            }
            TokenId::DoubleQuote => {
                let mut token = self.cur.clone();
                token.value = token.value.replace("\\\"", "\"");
                Ok(token)
            }
            TokenId::Backquote => self.backquote_substitution(),
            TokenId::CommandSubst => self.command_substitution(),
            _ => Ok(self.cur.clone()),
        }
    }

    /// Joins the evaluated token with any immediately following word
    /// tokens.
    pub(super) fn aggregate(&mut self, mut token: Token) -> Result<Token> {
        if !joins_word(token.id) {
            return Ok(token);
        }
        while joins_word(self.peek_raw().id) {
            self.next_raw();
            let next = self.eval_token()?;
            token.value.push_str(&next.value);
        }
        Ok(token)
    }

    /// Evaluates a `` `...` `` substitution. The current token is the
    /// opening backquote; on return the whole substitution, terminator
    /// included, has been consumed.
    ///
    /// A backslash-escaped backquote in the collected text marks a nested
    /// substitution boundary: it becomes a real backquote in the source
    /// handed to the subshell.
    fn backquote_substitution(&mut self) -> Result<Token> {
        let location = self.cur.location;
        let mut source = String::new();
        loop {
            self.next_raw();
            match self.cur.id {
                TokenId::Backquote => break,
                TokenId::EndOfInput | TokenId::Error => {
                    return Err(Error {
                        cause: SyntaxError::UnclosedBackquote.into(),
                        location,
                    });
                }
                _ => source.push_str(&self.cur.source_form()),
            }
        }
        let source = source.replace("\\`", "`");
        Ok(self.substitute(&source, location))
    }

    /// Evaluates a `$(...)` substitution. The terminator is the matching
    /// `)`, tracked with a depth counter that rises on nested `(` and
    /// `$(`.
    fn command_substitution(&mut self) -> Result<Token> {
        let location = self.cur.location;
        let mut depth = 1_u32;
        let mut source = String::new();
        loop {
            self.next_raw();
            match self.cur.id {
                TokenId::OpenParen | TokenId::CommandSubst => depth += 1,
                TokenId::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                TokenId::EndOfInput | TokenId::Error => {
                    return Err(Error {
                        cause: SyntaxError::UnclosedCommandSubstitution.into(),
                        location,
                    });
                }
                _ => {}
            }
            source.push_str(&self.cur.source_form());
        }
        Ok(self.substitute(&source, location))
    }

    /// Runs the collected source in a subshell and shapes the output into
    /// an identifier token: trailing newlines are trimmed and interior
    /// newlines become single spaces.
    fn substitute(&mut self, source: &str, location: Location) -> Token {
        let output = self.expansion.command_substitution(source);
        let value = output.trim_end_matches('\n').replace('\n', " ");
        Token::new(TokenId::Identifier, value, location)
    }
}
