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

//! Syntax parser for lists, and-or lists and pipelines.

use super::core::Parser;
use super::error::Result;
use super::lex::TokenId;
use crate::syntax::{
    AndOr, AndOrList, CompleteCommand, CompoundList, Item, List, Pipeline, Separator,
};

impl Parser<'_> {
    /// Parses one complete command.
    ///
    /// A trailing `;` or `&` right before the end of the line is promoted
    /// onto the [`CompleteCommand`] instead of being stored in the list.
    /// After the list the parser requires a newline or the end of input,
    /// which is left unconsumed.
    pub(super) fn complete_command(&mut self) -> Result<CompleteCommand> {
        let (list, separator) = self.list()?;
        self.skip_blanks()?;
        match self.cur.id {
            TokenId::Newline | TokenId::EndOfInput => {}
            _ => return Err(self.unexpected("newline or end of input")),
        }
        Ok(CompleteCommand { list, separator })
    }

    /// Parses a sequence of and-or lists separated by `;` or `&`.
    ///
    /// Returns the list and the trailing separator, if the last and-or
    /// list was followed by a separator with nothing after it.
    fn list(&mut self) -> Result<(List, Option<Separator>)> {
        let mut items = Vec::new();
        loop {
            self.skip_blanks()?;
            let and_or = self.and_or_list()?;
            self.skip_blanks()?;
            let sep = match self.cur.id {
                TokenId::Semicolon => Separator::Sequence,
                TokenId::And => Separator::Async,
                _ => {
                    items.push(Item { and_or, sep: None });
                    return Ok((List(items), None));
                }
            };
            self.advance()?;
            self.skip_blanks()?;
            if matches!(self.cur.id, TokenId::Newline | TokenId::EndOfInput) {
                items.push(Item { and_or, sep: None });
                return Ok((List(items), Some(sep)));
            }
            items.push(Item {
                and_or,
                sep: Some(sep),
            });
        }
    }

    /// Parses pipelines connected with `&&` and `||`.
    fn and_or_list(&mut self) -> Result<AndOrList> {
        let first = self.pipeline()?;
        let mut rest = Vec::new();
        loop {
            self.skip_blanks()?;
            let op = match self.cur.id {
                TokenId::AndAnd => AndOr::AndThen,
                TokenId::BarBar => AndOr::OrElse,
                _ => return Ok(AndOrList { first, rest }),
            };
            self.advance()?;
            rest.push((op, self.pipeline()?));
        }
    }

    /// Parses a pipeline: an optional `!` followed by commands connected
    /// with `|`.
    fn pipeline(&mut self) -> Result<Pipeline> {
        self.skip_blanks()?;
        let negation = if self.cur.id == TokenId::Bang {
            self.advance()?;
            if self.cur.id != TokenId::Blank {
                return Err(self.unexpected("whitespace after `!`"));
            }
            self.skip_blanks()?;
            true
        } else {
            false
        };

        let mut commands = vec![self.command()?];
        loop {
            self.skip_blanks()?;
            if self.cur.id != TokenId::Bar {
                break;
            }
            self.advance()?;
            commands.push(self.command()?);
        }
        Ok(Pipeline { negation, commands })
    }

    /// Parses the list inside a subshell.
    ///
    /// Unlike the top-level list, newlines separate items here; they are
    /// normalized to `;` so the single-line rendering of the tree parses
    /// back to the same shape. A trailing `;` or `&` before the closing
    /// parenthesis becomes the compound list's separator.
    pub(super) fn compound_list(&mut self) -> Result<CompoundList> {
        let mut items = Vec::new();
        let mut separator = None;
        loop {
            self.skip_blanks_and_newlines()?;
            let and_or = self.and_or_list()?;
            self.skip_blanks()?;
            let sep = match self.cur.id {
                TokenId::Semicolon => Some(Separator::Sequence),
                TokenId::And => Some(Separator::Async),
                TokenId::Newline => None,
                _ => {
                    items.push(Item { and_or, sep: None });
                    break;
                }
            };
            self.advance()?;
            self.skip_blanks_and_newlines()?;
            if matches!(self.cur.id, TokenId::CloseParen | TokenId::EndOfInput) {
                items.push(Item { and_or, sep: None });
                separator = sep;
                break;
            }
            items.push(Item {
                and_or,
                sep: Some(sep.unwrap_or(Separator::Sequence)),
            });
        }
        Ok(CompoundList {
            list: List(items),
            separator,
        })
    }
}
