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

//! The process-spawning seam of the executor.
//!
//! The executor does not talk to the operating system directly; it
//! prepares [`ChildProcess`] descriptors obtained from a [`Spawner`],
//! wires their file descriptors, then starts and waits on them. The
//! [`RealSpawner`] implementation spawns actual processes with
//! [`std::process::Command`], installing extra file descriptors after the
//! fork with `dup2`. Builtins provide another implementation so they can
//! take part in pipelines (see [`builtin`](crate::builtin)).

use crate::io::ChildIo;
use crate::run::ExitStatus;
use rosh_syntax::syntax::Fd;
use std::io;
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use std::os::unix::process::CommandExt as _;
use std::process::{Child, Command, Stdio};

/// A child process being prepared, started and awaited.
///
/// File descriptors installed with [`set_fd`](Self::set_fd) are owned by
/// the descriptor until [`start`](Self::start) hands them to the child;
/// after a successful start the parent-side copies are closed.
pub trait ChildProcess {
    /// Name of the command, for diagnostics.
    fn name(&self) -> &str;

    /// Returns the handle currently installed at `fd`, stdio or extra.
    fn get_fd(&self, fd: Fd) -> Option<&OwnedFd>;

    /// Installs `handle` at `fd`. A later installation at the same `fd`
    /// replaces the earlier one.
    fn set_fd(&mut self, fd: Fd, handle: OwnedFd);

    /// Creates a pipe, installs its write end as this child's standard
    /// output, and returns the read end.
    fn stdout_pipe(&mut self) -> io::Result<OwnedFd>;

    /// Starts the child. The descriptor keeps the handle needed by
    /// [`wait`](Self::wait).
    fn start(&mut self) -> io::Result<()>;

    /// Waits for the child to finish and returns its exit status.
    fn wait(&mut self) -> io::Result<ExitStatus>;
}

/// Facility producing child-process descriptors.
pub trait Spawner {
    /// Builds a descriptor for an external command.
    ///
    /// `envs` extends the inherited environment of the child; it does not
    /// touch the shell's own environment.
    fn command(
        &mut self,
        name: &str,
        args: Vec<String>,
        envs: Vec<(String, String)>,
    ) -> Box<dyn ChildProcess>;

    /// Builds a descriptor that re-executes the shell itself on a
    /// subshell body.
    fn subshell(&mut self, script: &str) -> io::Result<Box<dyn ChildProcess>>;
}

/// [`Spawner`] producing real operating-system processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct RealSpawner;

impl Spawner for RealSpawner {
    fn command(
        &mut self,
        name: &str,
        args: Vec<String>,
        envs: Vec<(String, String)>,
    ) -> Box<dyn ChildProcess> {
        Box::new(RealChild::new(name.to_string(), args, envs))
    }

    fn subshell(&mut self, script: &str) -> io::Result<Box<dyn ChildProcess>> {
        let exe = std::env::current_exe()?;
        let name = exe.to_string_lossy().into_owned();
        let args = vec![
            "-sub".to_string(),
            "-c".to_string(),
            script.to_string(),
        ];
        Ok(Box::new(RealChild::new(name, args, Vec::new())))
    }
}

/// Child-process descriptor backed by [`std::process::Command`].
#[derive(Debug)]
pub struct RealChild {
    name: String,
    args: Vec<String>,
    envs: Vec<(String, String)>,
    io: ChildIo,
    child: Option<Child>,
}

impl RealChild {
    fn new(name: String, args: Vec<String>, envs: Vec<(String, String)>) -> RealChild {
        RealChild {
            name,
            args,
            envs,
            io: ChildIo::default(),
            child: None,
        }
    }
}

impl ChildProcess for RealChild {
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
        let mut command = Command::new(&self.name);
        command.args(&self.args);
        for (name, value) in &self.envs {
            command.env(name, value);
        }
        command.stdin(stdio_from(self.io.stdin.take()));
        command.stdout(stdio_from(self.io.stdout.take()));
        command.stderr(stdio_from(self.io.stderr.take()));

        let extra: Vec<(RawFd, RawFd)> = self
            .io
            .extra
            .iter()
            .map(|(fd, handle)| (handle.as_raw_fd(), fd.0))
            .collect();
        if !extra.is_empty() {
            unsafe {
                command.pre_exec(move || {
                    for &(source, target) in &extra {
                        install_fd(source, target)?;
                    }
                    Ok(())
                });
            }
        }

        let child = command.spawn()?;
        // The child owns the descriptors now; close the parent copies so
        // pipe readers can see end-of-file.
        self.io.extra.clear();
        self.child = Some(child);
        Ok(())
    }

    fn wait(&mut self) -> io::Result<ExitStatus> {
        let child = self
            .child
            .as_mut()
            .ok_or_else(|| io::Error::other("child was never started"))?;
        let status = child.wait()?;
        Ok(ExitStatus(status.code().unwrap_or(-1)))
    }
}

fn stdio_from(handle: Option<OwnedFd>) -> Stdio {
    match handle {
        Some(fd) => Stdio::from(fd),
        None => Stdio::null(),
    }
}

/// Makes `source` available as `target` in the child, between fork and
/// exec.
///
/// `dup2` clears close-on-exec on the duplicate; when source and target
/// coincide the flag has to be cleared by hand instead.
fn install_fd(source: RawFd, target: RawFd) -> io::Result<()> {
    use nix::fcntl::{fcntl, FcntlArg, FdFlag};
    if source == target {
        let bits = fcntl(source, FcntlArg::F_GETFD).map_err(io::Error::from)?;
        let mut flags = FdFlag::from_bits_retain(bits);
        flags.remove(FdFlag::FD_CLOEXEC);
        fcntl(source, FcntlArg::F_SETFD(flags)).map_err(io::Error::from)?;
    } else {
        nix::unistd::dup2(source, target).map_err(io::Error::from)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::write_all;
    use std::fs::File;
    use std::io::Read as _;

    #[test]
    fn real_child_runs_and_reports_exit_status() {
        let mut spawner = RealSpawner;
        let mut child = spawner.command("true", vec![], vec![]);
        child.start().unwrap();
        assert_eq!(child.wait().unwrap(), ExitStatus(0));

        let mut child = spawner.command("false", vec![], vec![]);
        child.start().unwrap();
        assert_ne!(child.wait().unwrap(), ExitStatus(0));
    }

    #[test]
    fn real_child_start_fails_for_missing_binary() {
        let mut spawner = RealSpawner;
        let mut child = spawner.command("rosh-no-such-binary", vec![], vec![]);
        assert!(child.start().is_err());
    }

    #[test]
    fn real_child_env_extension_reaches_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let out = File::create(&path).unwrap();

        let mut spawner = RealSpawner;
        let mut child = spawner.command(
            "sh",
            vec!["-c".to_string(), "echo $ROSH_TEST_VAR".to_string()],
            vec![("ROSH_TEST_VAR".to_string(), "hello".to_string())],
        );
        child.set_fd(Fd::STDOUT, OwnedFd::from(out));
        child.start().unwrap();
        assert_eq!(child.wait().unwrap(), ExitStatus(0));

        let mut output = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn real_child_stdout_pipe_connects_to_reader() {
        let mut spawner = RealSpawner;
        let mut child = spawner.command("echo", vec!["hi".to_string()], vec![]);
        let read_end = child.stdout_pipe().unwrap();
        child.start().unwrap();
        assert_eq!(child.wait().unwrap(), ExitStatus(0));

        let mut output = String::new();
        File::from(read_end).read_to_string(&mut output).unwrap();
        assert_eq!(output, "hi\n");
    }

    #[test]
    fn real_child_extra_fd_is_visible_in_child() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out");
        let out = File::create(&path).unwrap();

        let (read_end, write_end) = nix::unistd::pipe().unwrap();
        write_all(&write_end, b"via fd 9\n").unwrap();
        drop(write_end);

        let mut spawner = RealSpawner;
        let mut child = spawner.command(
            "sh",
            vec!["-c".to_string(), "cat <&9".to_string()],
            vec![],
        );
        child.set_fd(Fd(9), read_end);
        child.set_fd(Fd::STDOUT, OwnedFd::from(out));
        child.start().unwrap();
        assert_eq!(child.wait().unwrap(), ExitStatus(0));

        let mut output = String::new();
        File::open(&path)
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        assert_eq!(output, "via fd 9\n");
    }
}
