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

//! File descriptor plumbing shared by the executor.
//!
//! Children are wired from owned file descriptors. The standard three
//! live in named slots; descriptors 3 and up go to a sparse, growable
//! [`ExtraFds`] table, which is what a `pre_exec` hook installs in the
//! child with `dup2`.

use rosh_syntax::syntax::Fd;
use std::fmt;
use std::os::fd::{AsFd, OwnedFd};

/// Sparse table of file descriptors numbered 3 and up.
///
/// Index `n` of the backing vector holds descriptor `n + 3`. The table
/// grows on demand and a later [`set`](Self::set) at the same descriptor
/// replaces (and thereby closes) the earlier entry.
#[derive(Debug, Default)]
pub struct ExtraFds(Vec<Option<OwnedFd>>);

impl ExtraFds {
    fn index(fd: Fd) -> Option<usize> {
        usize::try_from(fd.0).ok()?.checked_sub(3)
    }

    /// Returns the handle installed at `fd`, if any.
    #[must_use]
    pub fn get(&self, fd: Fd) -> Option<&OwnedFd> {
        self.0.get(Self::index(fd)?)?.as_ref()
    }

    /// Installs `handle` at `fd`, replacing any earlier entry.
    ///
    /// # Panics
    ///
    /// If `fd` is less than 3.
    pub fn set(&mut self, fd: Fd, handle: OwnedFd) {
        let index = Self::index(fd).expect("extra file descriptors start at 3");
        if self.0.len() <= index {
            self.0.resize_with(index + 1, || None);
        }
        self.0[index] = Some(handle);
    }

    /// Enumerates the installed descriptors as `(fd, handle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Fd, &OwnedFd)> {
        self.0.iter().enumerate().filter_map(|(index, slot)| {
            let fd = Fd(index as i32 + 3);
            slot.as_ref().map(|handle| (fd, handle))
        })
    }

    /// Drops every installed descriptor, closing them.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

/// The stdio slots and extra descriptors of one child being prepared.
#[derive(Debug, Default)]
pub struct ChildIo {
    pub stdin: Option<OwnedFd>,
    pub stdout: Option<OwnedFd>,
    pub stderr: Option<OwnedFd>,
    pub extra: ExtraFds,
}

impl ChildIo {
    /// Returns the handle currently installed at `fd`.
    #[must_use]
    pub fn get(&self, fd: Fd) -> Option<&OwnedFd> {
        match fd {
            Fd::STDIN => self.stdin.as_ref(),
            Fd::STDOUT => self.stdout.as_ref(),
            Fd::STDERR => self.stderr.as_ref(),
            other => self.extra.get(other),
        }
    }

    /// Installs `handle` at `fd`, replacing any earlier installation.
    pub fn set(&mut self, fd: Fd, handle: OwnedFd) {
        match fd {
            Fd::STDIN => self.stdin = Some(handle),
            Fd::STDOUT => self.stdout = Some(handle),
            Fd::STDERR => self.stderr = Some(handle),
            other => self.extra.set(other, handle),
        }
    }
}

/// Writes the whole buffer to a raw descriptor.
pub fn write_all(fd: impl AsFd, mut buf: &[u8]) -> nix::Result<()> {
    while !buf.is_empty() {
        match nix::unistd::write(fd.as_fd(), buf) {
            Ok(n) => buf = &buf[n..],
            Err(nix::errno::Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// The outer standard streams one evaluation runs against.
///
/// The handles are duplicated into each child that needs them; the
/// environment itself stays usable for the next evaluation.
#[derive(Debug)]
pub struct IoEnv {
    pub stdin: OwnedFd,
    pub stdout: OwnedFd,
    pub stderr: OwnedFd,
}

impl IoEnv {
    /// Builds an environment from the calling process's standard streams.
    pub fn from_process() -> std::io::Result<IoEnv> {
        Ok(IoEnv {
            stdin: std::io::stdin().as_fd().try_clone_to_owned()?,
            stdout: std::io::stdout().as_fd().try_clone_to_owned()?,
            stderr: std::io::stderr().as_fd().try_clone_to_owned()?,
        })
    }

    /// Writes a one-line diagnostic to the environment's standard error.
    ///
    /// Failures to write the diagnostic itself are ignored.
    pub fn report(&self, message: impl fmt::Display) {
        let line = format!("rosh: {message}\n");
        let _ = write_all(&self.stderr, line.as_bytes());
    }
}
