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

//! Pipeline executor for the rosh shell.
//!
//! This crate turns the syntax trees of `rosh-syntax` into running
//! processes: it wires pipelines with pipes, applies file-descriptor
//! redirections (including duplications and here-documents), threads
//! exit codes through the and-or logic, and hosts the handful of
//! builtins. It also provides the real implementation of the parser's
//! expansion seam.

pub mod builtin;
pub mod expand;
pub mod io;
pub mod redir;
pub mod run;
pub mod spawn;

pub use expand::HostExpansion;
pub use io::IoEnv;
pub use redir::RedirError;
pub use run::{EvalError, Executor, ExitStatus, Options};
pub use spawn::{ChildProcess, RealSpawner, Spawner};
