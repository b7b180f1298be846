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

//! Core of the parser: the token window and the streaming entry point.
//!
//! The parser holds the previous and current token and at most one peeked
//! token, so it can work in streaming mode: tokens are pulled from the
//! lexer as productions need them, and a driver can execute each complete
//! command before the next one is even read.

use super::error::{Error, ErrorCause, Result, SyntaxError};
use super::lex::{Lexer, Token, TokenId};
use crate::expansion::{Expansion, NullExpansion};
use crate::source::Location;
use crate::syntax::CompleteCommand;

/// Syntax parser over a [`Lexer`].
///
/// [`next_complete_command`](Self::next_complete_command) drives the whole
/// grammar. Before any production examines the current token, the token
/// has been through evaluation (globbing, command substitution,
/// double-quote unescaping) and word aggregation.
pub struct Parser<'a> {
    pub(super) lexer: Lexer<'a>,
    pub(super) expansion: Box<dyn Expansion + 'a>,
    pub(super) prev: Token,
    pub(super) cur: Token,
    pub(super) peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    /// Creates a new parser reading tokens from the given lexer.
    ///
    /// `expansion` is consulted for globbing and command substitution
    /// during token evaluation.
    #[must_use]
    pub fn new(lexer: Lexer<'a>, expansion: Box<dyn Expansion + 'a>) -> Parser<'a> {
        let placeholder = Token::new(TokenId::Newline, "\n", Location::start());
        Parser {
            lexer,
            expansion,
            prev: placeholder.clone(),
            cur: placeholder,
            peeked: None,
        }
    }

    /// Creates a parser over a fixed source code, with no expansion.
    #[must_use]
    pub fn from_memory(code: &'a str) -> Parser<'a> {
        Parser::new(Lexer::from_memory(code), Box::new(NullExpansion))
    }

    /// Parses the next complete command.
    ///
    /// Returns `Ok(None)` on a clean end of input. A grammar violation or
    /// a terminal lexer error aborts the current complete command with an
    /// error; after a (non-terminal) syntax error the caller may resume
    /// with [`skip_to_newline`](Self::skip_to_newline).
    pub fn next_complete_command(&mut self) -> Result<Option<CompleteCommand>> {
        self.advance()?;
        self.skip_blanks_and_newlines()?;
        if self.cur.id == TokenId::EndOfInput {
            return Ok(None);
        }
        self.complete_command().map(Some)
    }

    /// Discards raw tokens up to the next newline (or the end of input).
    ///
    /// This is the recovery step after a syntax error: the rest of the
    /// offending line is dropped without evaluating it, so no globbing or
    /// command substitution runs on the skipped text.
    pub fn skip_to_newline(&mut self) {
        loop {
            match self.cur.id {
                TokenId::Newline | TokenId::EndOfInput | TokenId::Error => return,
                _ => self.next_raw(),
            }
        }
    }

    /// The token most recently replaced as the current token.
    #[must_use]
    pub fn prev_token(&self) -> &Token {
        &self.prev
    }

    /// Slides the token window by one raw token, without evaluation.
    pub(super) fn next_raw(&mut self) {
        let next = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.next_token(),
        };
        self.prev = std::mem::replace(&mut self.cur, next);
    }

    /// Reads one raw token ahead without consuming it.
    pub(super) fn peek_raw(&mut self) -> &Token {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token());
        }
        self.peeked.as_ref().unwrap()
    }

    /// Slides the token window and passes the new current token through
    /// evaluation and word aggregation.
    pub(super) fn advance(&mut self) -> Result<()> {
        self.next_raw();
        self.fail_on_lex_error()?;
        let token = self.eval_token()?;
        let token = self.aggregate(token)?;
        self.cur = token;
        Ok(())
    }

    /// Converts a terminal lexer error token into a parse error.
    pub(super) fn fail_on_lex_error(&self) -> Result<()> {
        if self.cur.id == TokenId::Error {
            let error = self
                .cur
                .lex_error()
                .expect("error token must carry its error")
                .clone();
            return Err(Error {
                cause: ErrorCause::Lex(error),
                location: self.cur.location,
            });
        }
        Ok(())
    }

    /// Skips over blank tokens.
    pub(super) fn skip_blanks(&mut self) -> Result<()> {
        while self.cur.id == TokenId::Blank {
            self.advance()?;
        }
        Ok(())
    }

    /// Skips over blank and newline tokens.
    pub(super) fn skip_blanks_and_newlines(&mut self) -> Result<()> {
        while self.cur.id == TokenId::Blank || self.cur.id == TokenId::Newline {
            self.advance()?;
        }
        Ok(())
    }

    /// Checks that the current token is a word (identifier, quoted string
    /// or number) and returns a copy of it.
    pub(super) fn expect_word(&mut self, expected: &'static str) -> Result<Token> {
        if self.cur.id.is_word() {
            Ok(self.cur.clone())
        } else {
            Err(self.unexpected(expected))
        }
    }

    /// Builds the error for an unexpected current token.
    ///
    /// If the current token is actually the lexer's terminal error token,
    /// the underlying lexical error is reported instead.
    pub(super) fn unexpected(&self, expected: &'static str) -> Error {
        if let Some(lex_error) = self.cur.lex_error() {
            return Error {
                cause: ErrorCause::Lex(lex_error.clone()),
                location: self.cur.location,
            };
        }
        Error {
            cause: SyntaxError::UnexpectedToken {
                expected,
                got: self.cur.to_string(),
            }
            .into(),
            location: self.cur.location,
        }
    }
}

impl std::fmt::Debug for Parser<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("prev", &self.prev)
            .field("cur", &self.cur)
            .field("peeked", &self.peeked)
            .finish_non_exhaustive()
    }
}
