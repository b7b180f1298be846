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

//! Shell command language syntax
//!
//! This module contains types that represent abstract syntax trees (ASTs)
//! of the shell language, following the POSIX shell grammar for the
//! sublanguage the shell implements.
//!
//! The type for one top-level unit is [`CompleteCommand`]: a [`List`] of
//! [`Item`]s with an optional trailing separator. An `Item` holds an
//! [`AndOrList`], a sequence of conditionally executed [`Pipeline`]s, and a
//! `Pipeline` is a sequence of [`Command`]s separated by `|`. A `Command`
//! is either a [`SimpleCommand`] or a subshell grouped in parentheses
//! ([`FullCompoundCommand`]).
//!
//! Words are plain `String`s: quoting, word aggregation, globbing and
//! command substitution have already been resolved by the time a node is
//! constructed, so the tree carries the final word values.
//!
//! All types implement [`Display`](std::fmt::Display), which renders
//! single-line source code that parses back to an equivalent tree (with
//! here-document contents omitted). This rendering is also how a subshell
//! body is handed to a re-executed shell. Nodes are immutable once built
//! and each tree is owned by the `CompleteCommand` it belongs to.

use crate::parser::lex::RedirOp;
#[cfg(unix)]
use std::os::unix::io::RawFd;

#[cfg(not(unix))]
type RawFd = i32;

/// File descriptor
///
/// This is the `newtype` pattern applied to [`RawFd`], which is merely a
/// type alias.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

/// Part of a redirection that defines the nature of the resulting file
/// descriptor
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    /// The target is a file to be opened.
    File(String),
    /// The target is an already open file descriptor to be duplicated
    /// (`<&n` and `>&n`).
    Fd(Fd),
    /// Here-document.
    HereDoc {
        /// Token that marked the end of the content.
        delimiter: String,
        /// Content of the here-document.
        ///
        /// The content ends with a newline unless it is empty.
        content: String,
    },
}

/// Redirection
///
/// The parser always resolves `fd`: when the source does not name an IO
/// number, the operator's default (`0` for input, `1` for output) is used.
/// `body` is [`RedirBody::HereDoc`] exactly when `op` is a here-document
/// operator, and [`RedirBody::Fd`] only for the `<&`/`>&` operators.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// File descriptor that is modified by this redirection
    pub fd: Fd,
    /// Redirection operator
    pub op: RedirOp,
    /// Nature of the resulting file descriptor
    pub body: RedirBody,
}

/// Assignment word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    /// Name of the variable to assign to
    pub name: String,
    /// Value assigned to the variable
    pub value: String,
}

/// Element of a command prefix: an assignment word or a redirection.
///
/// Source order among prefix elements is preserved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PrefixItem {
    Assign(Assign),
    Redir(Redir),
}

/// Element of a command suffix: an argument word or a redirection.
///
/// Source order among suffix elements is preserved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SuffixItem {
    Word(String),
    Redir(Redir),
}

/// Command that involves assignments, redirections, and words
///
/// The parser never constructs a simple command without a (non-empty)
/// command name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleCommand {
    /// Assignments and redirections before the command name
    pub prefix: Vec<PrefixItem>,
    /// The command name
    pub name: String,
    /// Arguments and redirections after the command name
    pub suffix: Vec<SuffixItem>,
}

impl SimpleCommand {
    /// Returns the argument words, in source order.
    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.suffix.iter().filter_map(|item| match item {
            SuffixItem::Word(word) => Some(word.as_str()),
            SuffixItem::Redir(_) => None,
        })
    }

    /// Returns the assignment words, in source order.
    pub fn assigns(&self) -> impl Iterator<Item = &Assign> {
        self.prefix.iter().filter_map(|item| match item {
            PrefixItem::Assign(assign) => Some(assign),
            PrefixItem::Redir(_) => None,
        })
    }

    /// Returns all redirections: prefix ones first, then suffix ones, each
    /// group in source order.
    pub fn redirs(&self) -> impl Iterator<Item = &Redir> {
        let prefix = self.prefix.iter().filter_map(|item| match item {
            PrefixItem::Redir(redir) => Some(redir),
            PrefixItem::Assign(_) => None,
        });
        let suffix = self.suffix.iter().filter_map(|item| match item {
            SuffixItem::Redir(redir) => Some(redir),
            SuffixItem::Word(_) => None,
        });
        prefix.chain(suffix)
    }
}

/// Command that contains other commands
///
/// Only the subshell grouping is implemented.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// Command for executing commands in a subshell
    Subshell(CompoundList),
}

/// Compound command with redirections
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    /// The main part
    pub command: CompoundCommand,
    /// Redirections
    pub redirs: Vec<Redir>,
}

/// Element of a pipe sequence
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Simple command
    Simple(SimpleCommand),
    /// Compound command
    Compound(FullCompoundCommand),
}

impl Command {
    /// Returns the redirections of the command.
    pub fn redirs(&self) -> Box<dyn Iterator<Item = &Redir> + '_> {
        match self {
            Command::Simple(command) => Box::new(command.redirs()),
            Command::Compound(command) => Box::new(command.redirs.iter()),
        }
    }
}

/// Commands separated by `|`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// Whether the pipeline begins with a `!`
    pub negation: bool,
    /// Elements of the pipeline, in source order
    ///
    /// A valid pipeline has at least one command.
    pub commands: Vec<Command>,
}

/// Condition that decides if a [`Pipeline`] in an [and-or
/// list](AndOrList) should be executed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

/// Pipelines separated by `&&` and `||`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

/// Separator operator between or after list items
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Separator {
    /// `;`
    Sequence,
    /// `&`
    Async,
}

/// Element of a [`List`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// Main part of this item
    pub and_or: AndOrList,
    /// Separator operator following this item, if any
    ///
    /// Every item except the last carries a separator. A trailing
    /// separator at the end of a complete command is not stored here; it
    /// is promoted onto the containing [`CompleteCommand`].
    pub sep: Option<Separator>,
}

/// Sequence of [and-or lists](AndOrList) separated by `;` or `&`
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

/// List inside a subshell
///
/// A compound list admits newlines as separators; the parser normalizes
/// them to [`Separator::Sequence`] so the single-line display form
/// round-trips.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompoundList {
    pub list: List,
    /// Trailing separator, if any
    pub separator: Option<Separator>,
}

/// Complete command with optional trailing separator
///
/// This is one top-level unit of the shell language, delimited from its
/// neighbours by a newline or the end of input.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompleteCommand {
    /// The list of commands
    pub list: List,
    /// Trailing `;` or `&`, if any
    pub separator: Option<Separator>,
}

/// Implementations of [`std::fmt::Display`] for the syntax types
mod impl_display;
