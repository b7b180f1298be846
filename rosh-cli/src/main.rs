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

use rosh_cli::{run, run_subshell};
use rosh_exec::IoEnv;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let io = match IoEnv::from_process() {
        Ok(io) => io,
        Err(error) => {
            eprintln!("rosh: {error}");
            std::process::exit(1);
        }
    };
    let status = match run_subshell(&args, &io) {
        Some(status) => status,
        None => run(Box::new(std::io::stdin()), &io),
    };
    std::process::exit(status.0);
}
