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

//! Evaluation of parsed commands.
//!
//! The [`Executor`] walks one [`CompleteCommand`] tree at a time. Each
//! pipeline is materialized into child descriptors, wired together with
//! pipes and the command's redirections, started left to right, and
//! awaited left to right. Exit codes thread through the and-or logic:
//! a pipeline is successful when its exit code is zero and no internal
//! error occurred, inverted by a leading `!`.

use crate::builtin::builtin;
use crate::io::IoEnv;
use crate::redir::{apply_redirs, RedirError};
use crate::spawn::{ChildProcess, Spawner};
use rosh_syntax::syntax::{
    AndOr, AndOrList, Command, CompleteCommand, CompoundCommand, Fd, List, Pipeline, Separator,
};
use std::fmt;
use std::io;
use std::os::fd::OwnedFd;

/// Exit status of an evaluated command.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExitStatus(pub i32);

impl ExitStatus {
    /// Status of a successful command.
    pub const SUCCESS: ExitStatus = ExitStatus(0);
    /// Conventional status for a failed shell-level operation.
    pub const FAILURE: ExitStatus = ExitStatus(1);

    /// Whether the status denotes success.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Tunable behavior of the executor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Options {
    /// When set, a non-zero exit from any pipeline member fails the whole
    /// pipeline. Off by default: only the last member's status counts.
    pub pipefail: bool,
}

/// Errors in evaluating a command.
///
/// These are shell-level failures: they are reported on the environment's
/// standard error and turn into a non-zero exit status, but they do not
/// terminate the shell.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// `&` is recognized by the grammar but not implemented.
    #[error("asynchronous execution is not implemented")]
    AsyncUnsupported,
    /// A redirection could not be applied.
    #[error("setup {name:?}: {error}")]
    Setup {
        name: String,
        #[source]
        error: RedirError,
    },
    /// A pipe between pipeline members could not be created.
    #[error("pipe {name:?}: {error}")]
    Pipe {
        name: String,
        #[source]
        error: io::Error,
    },
    /// One of the outer standard streams could not be duplicated.
    #[error("cannot duplicate stdio: {0}")]
    Dup(#[source] io::Error),
    /// A child failed to start.
    #[error("start {name:?}: {error}")]
    Start {
        name: String,
        #[source]
        error: io::Error,
    },
    /// A child could not be awaited.
    #[error("wait {name:?}: {error}")]
    Wait {
        name: String,
        #[source]
        error: io::Error,
    },
    /// `pipefail` is set and a pipeline member exited non-zero.
    #[error("{name:?}: exit status {status}")]
    PipeFail { name: String, status: ExitStatus },
    /// The shell could not locate itself to spawn a subshell.
    #[error("cannot create subshell: {0}")]
    Subshell(#[source] io::Error),
}

/// Walks command trees and turns them into processes.
pub struct Executor {
    spawner: Box<dyn Spawner>,
    options: Options,
}

impl Executor {
    /// Creates an executor with default options.
    #[must_use]
    pub fn new(spawner: Box<dyn Spawner>) -> Executor {
        Executor::with_options(spawner, Options::default())
    }

    /// Creates an executor with the given options.
    #[must_use]
    pub fn with_options(spawner: Box<dyn Spawner>, options: Options) -> Executor {
        Executor { spawner, options }
    }

    /// Evaluates one complete command synchronously.
    ///
    /// The exit status is that of the last pipeline actually run.
    /// Shell-level errors are written to `io`'s standard error and yield
    /// a failure status; they never terminate the host.
    pub fn evaluate(&mut self, command: &CompleteCommand, io: &IoEnv) -> ExitStatus {
        match self.complete_command(command, io) {
            Ok(status) => status,
            Err(error) => {
                io.report(&error);
                ExitStatus::FAILURE
            }
        }
    }

    fn complete_command(
        &mut self,
        command: &CompleteCommand,
        io: &IoEnv,
    ) -> Result<ExitStatus, EvalError> {
        if command.separator == Some(Separator::Async) {
            return Err(EvalError::AsyncUnsupported);
        }
        self.list(&command.list, io)
    }

    fn list(&mut self, list: &List, io: &IoEnv) -> Result<ExitStatus, EvalError> {
        let mut status = ExitStatus::SUCCESS;
        for item in &list.0 {
            if item.sep == Some(Separator::Async) {
                return Err(EvalError::AsyncUnsupported);
            }
            status = self.and_or_list(&item.and_or, io);
        }
        Ok(status)
    }

    /// Evaluates an and-or list, short-circuiting on `&&`/`||`.
    ///
    /// Pipeline-level failures have already been reported by the time
    /// this returns; they count as unsuccessful commands, not as errors.
    fn and_or_list(&mut self, and_or: &AndOrList, io: &IoEnv) -> ExitStatus {
        let (mut status, mut success) = self.pipeline_outcome(&and_or.first, io);
        for (op, pipeline) in &and_or.rest {
            match op {
                AndOr::AndThen if !success => continue,
                AndOr::OrElse if success => continue,
                _ => {}
            }
            (status, success) = self.pipeline_outcome(pipeline, io);
        }
        status
    }

    /// Runs a pipeline and computes its `(status, success)` pair, where
    /// `success = (status == 0 && no error) XOR negation`.
    fn pipeline_outcome(&mut self, pipeline: &Pipeline, io: &IoEnv) -> (ExitStatus, bool) {
        match self.run_pipeline(pipeline, io) {
            Ok(status) => (status, status.is_success() ^ pipeline.negation),
            Err(error) => {
                io.report(&error);
                (ExitStatus(-1), pipeline.negation)
            }
        }
    }

    /// Materializes and runs one pipeline.
    fn run_pipeline(&mut self, pipeline: &Pipeline, io: &IoEnv) -> Result<ExitStatus, EvalError> {
        let mut children = Vec::with_capacity(pipeline.commands.len());
        for command in &pipeline.commands {
            children.push(self.child_for(command)?);
        }

        // The last child talks to the outer streams; the others feed the
        // next child through a pipe and share the outer stderr. Redirects
        // are applied after the defaults, so they win, except that the
        // connecting pipe is installed after the downstream child's own
        // redirects.
        let last = children.len() - 1;
        if children[last].get_fd(Fd::STDIN).is_none() {
            children[last].set_fd(Fd::STDIN, clone_fd(&io.stdin)?);
        }
        children[last].set_fd(Fd::STDOUT, clone_fd(&io.stdout)?);
        children[last].set_fd(Fd::STDERR, clone_fd(&io.stderr)?);
        apply_redirs(
            children[last].as_mut(),
            pipeline.commands[last].redirs(),
        )
        .map_err(|error| EvalError::Setup {
            name: children[last].name().to_string(),
            error,
        })?;

        for i in (1..=last).rev() {
            let pipe = children[i - 1]
                .stdout_pipe()
                .map_err(|error| EvalError::Pipe {
                    name: children[i - 1].name().to_string(),
                    error,
                })?;
            children[i].set_fd(Fd::STDIN, pipe);
            children[i - 1].set_fd(Fd::STDERR, clone_fd(&io.stderr)?);
            apply_redirs(
                children[i - 1].as_mut(),
                pipeline.commands[i - 1].redirs(),
            )
            .map_err(|error| EvalError::Setup {
                name: children[i - 1].name().to_string(),
                error,
            })?;
        }

        for child in &mut children {
            child.start().map_err(|error| EvalError::Start {
                name: child.name().to_string(),
                error,
            })?;
        }

        let mut last_status = ExitStatus(-1);
        for child in &mut children {
            let status = child.wait().map_err(|error| EvalError::Wait {
                name: child.name().to_string(),
                error,
            })?;
            last_status = status;
            if self.options.pipefail && !status.is_success() {
                return Err(EvalError::PipeFail {
                    name: child.name().to_string(),
                    status,
                });
            }
        }
        Ok(last_status)
    }

    /// Builds the child descriptor for one pipeline member.
    fn child_for(&mut self, command: &Command) -> Result<Box<dyn ChildProcess>, EvalError> {
        match command {
            Command::Simple(simple) => {
                if let Some(child) = builtin(simple) {
                    return Ok(child);
                }
                let args = simple.words().map(str::to_string).collect();
                let envs = simple
                    .assigns()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect();
                Ok(self.spawner.command(&simple.name, args, envs))
            }
            Command::Compound(compound) => {
                let CompoundCommand::Subshell(list) = &compound.command;
                self.spawner
                    .subshell(&list.to_string())
                    .map_err(EvalError::Subshell)
            }
        }
    }
}

fn clone_fd(fd: &OwnedFd) -> Result<OwnedFd, EvalError> {
    fd.try_clone().map_err(EvalError::Dup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spawn::RealSpawner;
    use rosh_syntax::parser::Parser;
    use std::fs::File;
    use std::io::Read as _;
    use std::os::fd::OwnedFd;
    use std::path::Path;

    fn io_env(dir: &Path) -> (IoEnv, std::path::PathBuf, std::path::PathBuf) {
        let stdout_path = dir.join("stdout");
        let stderr_path = dir.join("stderr");
        let env = IoEnv {
            stdin: OwnedFd::from(File::open("/dev/null").unwrap()),
            stdout: OwnedFd::from(File::create(&stdout_path).unwrap()),
            stderr: OwnedFd::from(File::create(&stderr_path).unwrap()),
        };
        (env, stdout_path, stderr_path)
    }

    /// Parses and evaluates a script, returning the last exit status and
    /// the captured stdout.
    fn run_script(source: &str) -> (ExitStatus, String) {
        run_script_with(source, Options::default())
    }

    fn run_script_with(source: &str, options: Options) -> (ExitStatus, String) {
        let dir = tempfile::tempdir().unwrap();
        let (env, stdout_path, _) = io_env(dir.path());
        let mut executor = Executor::with_options(Box::new(RealSpawner), options);
        let mut parser = Parser::from_memory(source);
        let mut status = ExitStatus::SUCCESS;
        while let Some(command) = parser.next_complete_command().unwrap() {
            status = executor.evaluate(&command, &env);
        }
        drop(env);
        let mut output = String::new();
        File::open(&stdout_path)
            .unwrap()
            .read_to_string(&mut output)
            .unwrap();
        (status, output)
    }

    #[test]
    fn evaluate_simple_builtin() {
        let (status, output) = run_script("echo hello");
        assert_eq!(status, ExitStatus::SUCCESS);
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn evaluate_external_command_exit_status() {
        let (status, _) = run_script("true");
        assert_eq!(status, ExitStatus(0));
        let (status, _) = run_script("false");
        assert_ne!(status, ExitStatus(0));
    }

    #[test]
    fn evaluate_semicolon_list_keeps_last_status() {
        let (status, output) = run_script("false; echo after");
        assert_eq!(status, ExitStatus::SUCCESS);
        assert_eq!(output, "after\n");
    }

    #[test]
    fn evaluate_pipeline_through_cat() {
        let (status, output) = run_script("echo hello | cat");
        assert_eq!(status, ExitStatus::SUCCESS);
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn evaluate_three_stage_pipeline() {
        let (status, output) = run_script("echo hello | cat | cat");
        assert_eq!(status, ExitStatus::SUCCESS);
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn evaluate_pipeline_status_is_last_member() {
        let (status, _) = run_script("false | true");
        assert_eq!(status, ExitStatus(0));
        let (status, _) = run_script("true | false");
        assert_ne!(status, ExitStatus(0));
    }

    #[test]
    fn evaluate_and_or_short_circuit() {
        let (_, output) = run_script("true && echo yes || echo no");
        assert_eq!(output, "yes\n");
        let (_, output) = run_script("false && echo yes || echo no");
        assert_eq!(output, "no\n");
        let (_, output) =
            run_script("true && echo why && echo ok1 || echo ko2 && echo ok2");
        assert_eq!(output, "why\nok1\nok2\n");
        let (_, output) =
            run_script("false && echo why || echo ko2 && echo ok2");
        assert_eq!(output, "ko2\nok2\n");
    }

    #[test]
    fn evaluate_negation_flips_success_only() {
        // `!` inverts the and-or decision but not the reported status.
        let (_, output) = run_script("! false && echo yes");
        assert_eq!(output, "yes\n");
        let (_, output) = run_script("! true && echo yes || echo no");
        assert_eq!(output, "no\n");
    }

    #[test]
    fn evaluate_output_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("foo");
        let script = format!(
            "echo hello > {target}; cat {target}",
            target = target.display()
        );
        let (status, output) = run_script(&script);
        assert_eq!(status, ExitStatus::SUCCESS);
        assert_eq!(output, "hello\n");
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "hello\n");
    }

    #[test]
    fn evaluate_append_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("foo");
        let script = format!(
            "echo hello >> {t}; echo world >> {t}; cat {t}",
            t = target.display()
        );
        let (_, output) = run_script(&script);
        assert_eq!(output, "hello\nworld\n");
    }

    #[test]
    fn evaluate_input_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("foo");
        std::fs::write(&source, "foocontent\n").unwrap();
        let (_, output) = run_script(&format!("cat < {}", source.display()));
        assert_eq!(output, "foocontent\n");
    }

    #[test]
    fn evaluate_prefix_redirect_with_pipe() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("foo");
        std::fs::write(&source, "foocontent\n").unwrap();
        let (_, output) = run_script(&format!("< {} cat | cat", source.display()));
        assert_eq!(output, "foocontent\n");
    }

    #[test]
    fn evaluate_extra_fd_then_dup() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("bar");
        let script = format!(
            "echo hello 8>{t} >&8; cat {t}",
            t = target.display()
        );
        let (_, output) = run_script(&script);
        assert_eq!(output, "hello\n");
    }

    #[test]
    fn evaluate_stderr_dup_into_pipe() {
        let (_, output) = run_script("sh -c 'echo err >&2' 2>&1 | cat");
        assert_eq!(output, "err\n");
    }

    #[test]
    fn evaluate_here_document() {
        let (_, output) = run_script("cat <<EOF\nhello\nworld\nEOF\n");
        assert_eq!(output, "hello\nworld\n");
    }

    #[test]
    fn evaluate_redirect_order_last_wins() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");
        let script = format!(
            "echo x > {f} > {s}",
            f = first.display(),
            s = second.display()
        );
        run_script(&script);
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "x\n");
    }

    #[test]
    fn evaluate_spawn_failure_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let (env, stdout_path, stderr_path) = io_env(dir.path());
        let mut executor = Executor::new(Box::new(RealSpawner));
        let mut parser = Parser::from_memory("rosh-no-such-binary; echo next");
        let mut status = ExitStatus::SUCCESS;
        while let Some(command) = parser.next_complete_command().unwrap() {
            status = executor.evaluate(&command, &env);
        }
        drop(env);
        assert_eq!(status, ExitStatus::SUCCESS);
        let mut stdout = String::new();
        File::open(&stdout_path)
            .unwrap()
            .read_to_string(&mut stdout)
            .unwrap();
        assert_eq!(stdout, "next\n");
        let stderr = std::fs::read_to_string(&stderr_path).unwrap();
        assert!(stderr.contains("start"), "stderr: {stderr:?}");
    }

    #[test]
    fn evaluate_async_list_is_unsupported() {
        let dir = tempfile::tempdir().unwrap();
        let (env, _, stderr_path) = io_env(dir.path());
        let mut executor = Executor::new(Box::new(RealSpawner));
        let mut parser = Parser::from_memory("echo hi &");
        let command = parser.next_complete_command().unwrap().unwrap();
        let status = executor.evaluate(&command, &env);
        drop(env);
        assert_eq!(status, ExitStatus::FAILURE);
        let stderr = std::fs::read_to_string(&stderr_path).unwrap();
        assert!(
            stderr.contains("not implemented"),
            "stderr: {stderr:?}"
        );
    }

    #[test]
    fn evaluate_pipefail_option() {
        let (status, _) = run_script_with(
            "sh -c 'exit 3' | cat",
            Options { pipefail: true },
        );
        assert_ne!(status, ExitStatus::SUCCESS);

        let (status, _) = run_script_with(
            "sh -c 'exit 3' | cat",
            Options::default(),
        );
        assert_eq!(status, ExitStatus::SUCCESS);
    }

    #[test]
    fn evaluate_subshell_runs_via_reexecution() {
        // `current_exe` is the test binary here, which does not interpret
        // `-sub -c`; this only checks that the subshell machinery builds
        // and starts a child without error. Full subshell behavior is
        // covered by the CLI integration tests.
        let mut spawner = RealSpawner;
        let child = spawner.subshell("echo hi");
        assert!(child.is_ok());
    }
}
