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

//! Driver of the rosh shell.
//!
//! [`run`] is the parse-and-execute loop: it pulls one complete command
//! at a time from the parser and evaluates it, so commands run as soon
//! as they are read. [`run_subshell`] recognizes the `-sub -c <script>`
//! argv shape by which the shell re-executes itself for subshells and
//! command substitutions.

use rosh_exec::{Executor, ExitStatus, HostExpansion, IoEnv, RealSpawner};
use rosh_syntax::parser::lex::Lexer;
use rosh_syntax::parser::Parser;
use std::io::Read;

/// Parses and executes everything available on `source`.
///
/// The result is the exit status of the last complete command actually
/// run. A syntax error is reported on `io`'s standard error and the rest
/// of the offending line is skipped; a lexer error ends the run, since
/// the token stream cannot continue past it.
pub fn run<'a>(source: Box<dyn Read + 'a>, io: &IoEnv) -> ExitStatus {
    let expansion: Box<dyn rosh_syntax::expansion::Expansion> = match io.stderr.try_clone() {
        Ok(stderr) => Box::new(HostExpansion::with_stderr(stderr)),
        Err(_) => Box::new(HostExpansion::new()),
    };
    let mut parser = Parser::new(Lexer::new(source), expansion);
    let mut executor = Executor::new(Box::new(RealSpawner));

    let mut status = ExitStatus::SUCCESS;
    loop {
        match parser.next_complete_command() {
            Ok(Some(command)) => status = executor.evaluate(&command, io),
            Ok(None) => return status,
            Err(error) => {
                io.report(&error);
                status = ExitStatus::FAILURE;
                if error.is_terminal() {
                    return status;
                }
                parser.skip_to_newline();
            }
        }
    }
}

/// Runs a subshell invocation if `args` has the shape
/// `[program, "-sub", "-c", script]`.
///
/// Returns the script's exit status, or `None` when the arguments do not
/// match, in which case the caller should proceed with its normal
/// startup.
pub fn run_subshell(args: &[String], io: &IoEnv) -> Option<ExitStatus> {
    match args {
        [_, sub, c, script] if sub == "-sub" && c == "-c" => {
            Some(run(Box::new(script.as_bytes()), io))
        }
        _ => None,
    }
}
