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

//! Built-in utilities.
//!
//! A builtin implements the same [`ChildProcess`] interface as a spawned
//! command, so it takes part in pipelines and is subject to redirections
//! like any other pipeline member. Its "process" is just a function run
//! at start time; output goes to whatever file descriptor has been wired
//! as its standard output.
//!
//! `cd` and `exit` act on the shell process itself, which is the whole
//! point of having them built in.

use crate::io::{write_all, ChildIo};
use crate::run::ExitStatus;
use crate::spawn::ChildProcess;
use rosh_syntax::syntax::{Fd, SimpleCommand};
use std::io;
use std::os::fd::OwnedFd;

/// Returns a builtin descriptor for the command, or `None` if the command
/// name is not a builtin.
pub fn builtin(command: &SimpleCommand) -> Option<Box<dyn ChildProcess>> {
    let kind = match command.name.as_str() {
        "echo" => Kind::Echo,
        "env" => Kind::Env,
        "pwd" => Kind::Pwd,
        "cd" => Kind::Cd,
        "exit" => Kind::Exit,
        _ => return None,
    };
    Some(Box::new(BuiltinChild {
        kind,
        name: command.name.clone(),
        args: command.words().map(str::to_string).collect(),
        assigns: command
            .assigns()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect(),
        io: ChildIo::default(),
        status: ExitStatus::SUCCESS,
    }))
}

#[derive(Clone, Copy, Debug)]
enum Kind {
    Echo,
    Env,
    Pwd,
    Cd,
    Exit,
}

/// In-process pipeline member implementing one builtin.
#[derive(Debug)]
struct BuiltinChild {
    kind: Kind,
    name: String,
    args: Vec<String>,
    assigns: Vec<(String, String)>,
    io: ChildIo,
    status: ExitStatus,
}

impl BuiltinChild {
    /// Writes `text` to the wired standard output.
    fn output(&self, text: &str) -> io::Result<()> {
        let Some(stdout) = &self.io.stdout else {
            return Ok(());
        };
        write_all(stdout, text.as_bytes()).map_err(io::Error::from)
    }

    /// Writes a diagnostic to the wired standard error.
    fn complain(&mut self, message: impl std::fmt::Display) {
        self.status = ExitStatus::FAILURE;
        if let Some(stderr) = &self.io.stderr {
            let line = format!("rosh: {}: {message}\n", self.name);
            let _ = write_all(stderr, line.as_bytes());
        }
    }

    fn echo(&self) -> io::Result<()> {
        let mut line = self.args.join(" ");
        line.push('\n');
        self.output(&line)
    }

    fn env(&self) -> io::Result<()> {
        let mut out = String::new();
        for (name, value) in std::env::vars() {
            out.push_str(&name);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        for (name, value) in &self.assigns {
            out.push_str(name);
            out.push('=');
            out.push_str(value);
            out.push('\n');
        }
        self.output(&out)
    }

    fn pwd(&self) -> io::Result<()> {
        let dir = std::env::current_dir()?;
        let mut line = dir.to_string_lossy().into_owned();
        line.push('\n');
        self.output(&line)
    }

    fn cd(&mut self) {
        let Some(dir) = self.args.first().cloned() else {
            self.complain("missing argument");
            return;
        };
        if let Err(e) = std::env::set_current_dir(&dir) {
            self.complain(format_args!("{dir}: {e}"));
        }
    }

    fn exit(&mut self) {
        let code = match self.args.first().cloned() {
            None => 0,
            Some(arg) => match arg.parse() {
                Ok(code) => code,
                Err(_) => {
                    self.complain(format_args!("invalid exit code {arg:?}"));
                    return;
                }
            },
        };
        std::process::exit(code);
    }
}

impl ChildProcess for BuiltinChild {
    fn name(&self) -> &str {
        &self.name
    }

    fn get_fd(&self, fd: Fd) -> Option<&OwnedFd> {
        self.io.get(fd)
    }

    fn set_fd(&mut self, fd: Fd, handle: OwnedFd) {
        self.io.set(fd, handle);
    }

    fn stdout_pipe(&mut self) -> io::Result<OwnedFd> {
        let (read_end, write_end) = nix::unistd::pipe().map_err(io::Error::from)?;
        self.io.stdout = Some(write_end);
        Ok(read_end)
    }

    fn start(&mut self) -> io::Result<()> {
        let result = match self.kind {
            Kind::Echo => self.echo(),
            Kind::Env => self.env(),
            Kind::Pwd => self.pwd(),
            Kind::Cd => {
                self.cd();
                Ok(())
            }
            Kind::Exit => {
                self.exit();
                Ok(())
            }
        };
        if let Err(e) = result {
            // A reader that went away is not worth a diagnostic.
            if e.kind() != io::ErrorKind::BrokenPipe {
                self.complain(e);
            } else {
                self.status = ExitStatus::FAILURE;
            }
        }
        Ok(())
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        // Dropping the wired descriptors closes them, so a pipe reader
        // sees end-of-file.
        self.io = ChildIo::default();
        Ok(self.status)
    }
}
