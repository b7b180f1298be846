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

//! Host implementation of the parser's expansion seam.
//!
//! Globbing matches patterns against the file system relative to the
//! current working directory. Command substitution re-executes the shell
//! binary itself with `-sub -c <source>` and captures its standard
//! output; this is the same self-re-execution mechanism used for
//! subshells.

use crate::io::write_all;
use rosh_syntax::expansion::Expansion;
use std::io;
use std::os::fd::OwnedFd;
use std::process::{Command, Stdio};

/// [`Expansion`] backed by the real file system and process spawning.
#[derive(Debug, Default)]
pub struct HostExpansion {
    /// Standard error for substitution children and for reporting spawn
    /// failures. When absent, the process's own standard error is
    /// inherited.
    stderr: Option<OwnedFd>,
}

impl HostExpansion {
    /// Creates a host expansion inheriting the process's standard error.
    #[must_use]
    pub fn new() -> HostExpansion {
        HostExpansion::default()
    }

    /// Creates a host expansion whose substitution children write their
    /// diagnostics to the given descriptor.
    #[must_use]
    pub fn with_stderr(stderr: OwnedFd) -> HostExpansion {
        HostExpansion {
            stderr: Some(stderr),
        }
    }

    fn run_subshell(&self, source: &str) -> io::Result<String> {
        let exe = std::env::current_exe()?;
        let mut command = Command::new(exe);
        command
            .args(["-sub", "-c", source])
            .stdin(Stdio::null())
            .stdout(Stdio::piped());
        match &self.stderr {
            Some(fd) => {
                command.stderr(Stdio::from(fd.try_clone()?));
            }
            None => {
                command.stderr(Stdio::inherit());
            }
        }
        let output = command.output()?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn report(&self, message: impl std::fmt::Display) {
        let line = format!("rosh: {message}\n");
        match &self.stderr {
            Some(fd) => {
                let _ = write_all(fd, line.as_bytes());
            }
            None => eprint!("{line}"),
        }
    }
}

impl Expansion for HostExpansion {
    fn glob(&mut self, pattern: &str) -> Option<String> {
        let entries = glob::glob(pattern).ok()?;
        let matches: Vec<String> = entries
            .filter_map(Result::ok)
            .map(|path| path.to_string_lossy().into_owned())
            .collect();
        if matches.is_empty() {
            None
        } else {
            Some(matches.join(" "))
        }
    }

    fn command_substitution(&mut self, source: &str) -> String {
        match self.run_subshell(source) {
            Ok(output) => output,
            Err(error) => {
                // A substitution that cannot even start expands to
                // nothing, like one whose command failed.
                self.report(format_args!("command substitution: {error}"));
                String::new()
            }
        }
    }
}
