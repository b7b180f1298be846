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

//! Syntax parser for redirections.

use super::core::Parser;
use super::error::{Error, Result, SyntaxError};
use super::lex::{RedirOp, TokenId};
use crate::syntax::{Fd, Redir, RedirBody};

impl Parser<'_> {
    /// Parses one redirection.
    ///
    /// The current token must be the redirection operator token for `op`;
    /// its value is the IO number, already defaulted by the lexer when the
    /// source did not name one. On success the whole redirection,
    /// here-document body included, has been consumed.
    pub(super) fn redirection(&mut self, op: RedirOp) -> Result<Redir> {
        let op_location = self.cur.location;
        let fd = match self.cur.value.parse() {
            Ok(fd) if fd >= 0 => Fd(fd),
            _ => {
                return Err(Error {
                    cause: SyntaxError::InvalidIoNumber(self.cur.value.clone()).into(),
                    location: op_location,
                });
            }
        };
        self.advance()?;
        self.skip_blanks()?;

        match op {
            RedirOp::FdIn | RedirOp::FdOut => {
                let target = self.expect_word("redirection target")?;
                let body = if target.id == TokenId::Number {
                    match target.value.parse() {
                        Ok(n) if n >= 0 => RedirBody::Fd(Fd(n)),
                        _ => {
                            return Err(Error {
                                cause: SyntaxError::InvalidIoNumber(target.value).into(),
                                location: target.location,
                            });
                        }
                    }
                } else if op == RedirOp::FdIn {
                    // `<&` duplicates an input FD; a filename makes no sense.
                    return Err(Error {
                        cause: SyntaxError::FdNumberExpected.into(),
                        location: target.location,
                    });
                } else {
                    // `>&file` redirects both stdout and stderr to the
                    // file, which only works from FD 1.
                    if fd != Fd::STDOUT {
                        return Err(Error {
                            cause: SyntaxError::AmbiguousRedirect.into(),
                            location: op_location,
                        });
                    }
                    RedirBody::File(target.value)
                };
                self.advance()?;
                Ok(Redir { fd, op, body })
            }

            RedirOp::FileIn
            | RedirOp::FileOut
            | RedirOp::FileAppend
            | RedirOp::FileInOut
            | RedirOp::FileClobber => {
                let target = self.expect_word("file name")?;
                self.advance()?;
                Ok(Redir {
                    fd,
                    op,
                    body: RedirBody::File(target.value),
                })
            }

            RedirOp::HereDoc | RedirOp::HereDocDash => self.here_doc(fd, op),
        }
    }

    /// Parses the delimiter and body of a here-document.
    ///
    /// The body is collected from raw token values, so nothing in it is
    /// globbed or substituted, until a token whose value equals the
    /// delimiter. The body keeps its final newline.
    fn here_doc(&mut self, fd: Fd, op: RedirOp) -> Result<Redir> {
        let delimiter = self.expect_word("here-document delimiter")?.value;
        self.advance()?;
        self.skip_blanks()?;
        match self.cur.id {
            TokenId::Newline | TokenId::EndOfInput => {}
            _ => return Err(self.unexpected("newline after here-document delimiter")),
        }
        self.next_raw();

        // TODO <<- should strip leading tabs from each body line.
        let mut content = String::new();
        loop {
            match self.cur.id {
                TokenId::EndOfInput | TokenId::Error => break,
                _ if self.cur.value == delimiter => break,
                _ => {
                    content.push_str(&self.cur.source_form());
                    self.next_raw();
                }
            }
        }
        if self.cur.id != TokenId::EndOfInput
            && self.cur.id != TokenId::Error
            && self.cur.value == delimiter
        {
            self.advance()?;
        }

        Ok(Redir {
            fd,
            op,
            body: RedirBody::HereDoc { delimiter, content },
        })
    }
}
