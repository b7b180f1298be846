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

//! Applying redirections to a child descriptor.
//!
//! Redirections are applied in source order, so a later redirection of
//! the same file descriptor shadows an earlier one. Opened files are
//! handed to the child descriptor, which owns them until the child
//! starts.

use crate::io::write_all;
use crate::spawn::ChildProcess;
use rosh_syntax::parser::lex::RedirOp;
use rosh_syntax::syntax::{Fd, Redir, RedirBody};
use std::fs::OpenOptions;
use std::io;
use std::os::fd::OwnedFd;
use std::os::unix::fs::OpenOptionsExt as _;

/// Errors in applying a redirection.
#[derive(Debug, thiserror::Error)]
pub enum RedirError {
    /// The target file could not be opened.
    #[error("open {path:?}: {error}")]
    Open {
        path: String,
        #[source]
        error: io::Error,
    },
    /// A duplication target does not name an open file descriptor.
    #[error("bad file descriptor {}", .0.0)]
    BadFd(Fd),
    /// `>&file` used with a source FD other than 1.
    #[error("ambiguous redirect")]
    AmbiguousRedirect,
    /// The here-document pipe could not be created.
    #[error("here-document pipe: {0}")]
    Pipe(#[source] io::Error),
    /// A file descriptor could not be duplicated.
    #[error("cannot duplicate file descriptor: {0}")]
    Dup(#[source] io::Error),
}

/// Applies the redirections to the child, in the order given.
pub fn apply_redirs<'a>(
    child: &mut dyn ChildProcess,
    redirs: impl Iterator<Item = &'a Redir>,
) -> Result<(), RedirError> {
    for redir in redirs {
        apply(child, redir)?;
    }
    Ok(())
}

fn apply(child: &mut dyn ChildProcess, redir: &Redir) -> Result<(), RedirError> {
    match &redir.body {
        RedirBody::File(path) => {
            if redir.op == RedirOp::FdOut && redir.fd != Fd::STDOUT {
                return Err(RedirError::AmbiguousRedirect);
            }
            let handle = open_file(path, redir.op)?;
            if redir.op == RedirOp::FdOut {
                // `>&file` redirects both stdout and stderr to the file.
                let for_stderr = handle.try_clone().map_err(RedirError::Dup)?;
                child.set_fd(Fd::STDOUT, handle);
                child.set_fd(Fd::STDERR, for_stderr);
            } else {
                child.set_fd(redir.fd, handle);
            }
        }

        RedirBody::Fd(target) => {
            let handle = child
                .get_fd(*target)
                .ok_or(RedirError::BadFd(*target))?
                .try_clone()
                .map_err(RedirError::Dup)?;
            child.set_fd(redir.fd, handle);
        }

        RedirBody::HereDoc { content, .. } => {
            let handle = here_doc_pipe(content)?;
            child.set_fd(redir.fd, handle);
        }
    }
    Ok(())
}

/// Opens the redirection target file with the flags implied by the
/// operator, mode `0644`.
fn open_file(path: &str, op: RedirOp) -> Result<OwnedFd, RedirError> {
    let mut options = OpenOptions::new();
    match op {
        RedirOp::FileIn => {
            options.read(true);
        }
        RedirOp::FileOut | RedirOp::FdOut | RedirOp::FileClobber => {
            options.write(true).create(true).truncate(true);
        }
        RedirOp::FileAppend => {
            options.append(true).create(true);
        }
        RedirOp::FileInOut => {
            options.read(true).write(true).create(true);
        }
        RedirOp::FdIn | RedirOp::HereDoc | RedirOp::HereDocDash => {
            unreachable!("operator {op} does not open a file")
        }
    }
    options
        .mode(0o644)
        .open(path)
        .map(OwnedFd::from)
        .map_err(|error| RedirError::Open {
            path: path.to_string(),
            error,
        })
}

/// Builds the read end of a pipe whose write end is fed the here-document
/// body by a short-lived background thread.
///
/// The writer closes its end when done. If the reading child goes away
/// first, the resulting broken-pipe error is swallowed.
fn here_doc_pipe(content: &str) -> Result<OwnedFd, RedirError> {
    let (read_end, write_end) = nix::unistd::pipe()
        .map_err(io::Error::from)
        .map_err(RedirError::Pipe)?;
    let body = content.as_bytes().to_vec();
    std::thread::spawn(move || {
        let _ = write_all(&write_end, &body);
    });
    Ok(read_end)
}
