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

//! Syntax parser for simple and compound commands.

use super::core::Parser;
use super::error::Result;
use super::lex::TokenId;
use crate::syntax::{
    Assign, Command, CompoundCommand, FullCompoundCommand, PrefixItem, SimpleCommand, SuffixItem,
};

impl Parser<'_> {
    /// Parses a command: a subshell if the current token is `(`, a simple
    /// command otherwise.
    pub(super) fn command(&mut self) -> Result<Command> {
        self.skip_blanks()?;
        if self.cur.id == TokenId::OpenParen {
            self.compound_command().map(Command::Compound)
        } else {
            self.simple_command().map(Command::Simple)
        }
    }

    /// Parses a subshell grouping with its trailing redirections.
    fn compound_command(&mut self) -> Result<FullCompoundCommand> {
        self.advance()?; // the opening parenthesis
        let list = self.compound_list()?;
        if self.cur.id != TokenId::CloseParen {
            return Err(self.unexpected("`)`"));
        }
        self.advance()?;
        self.skip_blanks()?;

        let mut redirs = Vec::new();
        while let TokenId::Redirect(op) = self.cur.id {
            redirs.push(self.redirection(op)?);
            self.skip_blanks()?;
        }

        Ok(FullCompoundCommand {
            command: CompoundCommand::Subshell(list),
            redirs,
        })
    }

    /// Parses a simple command: prefix, name, suffix.
    ///
    /// The prefix and suffix may be empty, but the name is required.
    fn simple_command(&mut self) -> Result<SimpleCommand> {
        self.skip_blanks()?;
        let prefix = self.cmd_prefix()?;
        let name = self.expect_word("command name")?.value;
        self.advance()?;
        let suffix = self.cmd_suffix()?;
        Ok(SimpleCommand {
            prefix,
            name,
            suffix,
        })
    }

    /// Parses the possibly empty sequence of assignment words and
    /// redirections preceding the command name.
    ///
    /// An assignment word is detected by lookahead: the current token is a
    /// word and the next raw token is `=`.
    fn cmd_prefix(&mut self) -> Result<Vec<PrefixItem>> {
        let mut prefix = Vec::new();
        loop {
            self.skip_blanks()?;
            if let TokenId::Redirect(op) = self.cur.id {
                prefix.push(PrefixItem::Redir(self.redirection(op)?));
                continue;
            }
            if self.cur.id.is_word() && self.peek_raw().id == TokenId::Equals {
                let name = self.cur.value.clone();
                self.advance()?; // the name
                self.advance()?; // the equals sign
                let value = self.expect_word("assignment value")?.value;
                self.advance()?;
                prefix.push(PrefixItem::Assign(Assign { name, value }));
                continue;
            }
            return Ok(prefix);
        }
    }

    /// Parses the possibly empty sequence of argument words and
    /// redirections following the command name.
    fn cmd_suffix(&mut self) -> Result<Vec<SuffixItem>> {
        let mut suffix = Vec::new();
        loop {
            if self.cur.id == TokenId::Newline {
                return Ok(suffix);
            }
            self.skip_blanks()?;
            if self.cur.id.is_word() {
                suffix.push(SuffixItem::Word(self.cur.value.clone()));
                self.advance()?;
                continue;
            }
            if let TokenId::Redirect(op) = self.cur.id {
                suffix.push(SuffixItem::Redir(self.redirection(op)?));
                continue;
            }
            return Ok(suffix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::{ErrorCause, SyntaxError};
    use crate::syntax::{CompleteCommand, Fd, RedirBody};
    use assert_matches::assert_matches;

    fn parse(code: &str) -> CompleteCommand {
        let mut parser = Parser::from_memory(code);
        parser.next_complete_command().unwrap().unwrap()
    }

    fn first_command(command: &CompleteCommand) -> &Command {
        &command.list.0[0].and_or.first.commands[0]
    }

    #[test]
    fn parser_simple_command_name_and_words() {
        let command = parse("cp file1.txt file2.txt");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "cp");
            let words: Vec<_> = simple.words().collect();
            assert_eq!(words, ["file1.txt", "file2.txt"]);
        });
    }

    #[test]
    fn parser_simple_command_name_only() {
        let command = parse("ls");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "ls");
            assert_eq!(simple.suffix, []);
            assert_eq!(simple.prefix, []);
        });
    }

    #[test]
    fn parser_missing_command_name() {
        let mut parser = Parser::from_memory("&& foo");
        let error = parser.next_complete_command().unwrap_err();
        assert_matches!(
            error.cause,
            ErrorCause::Syntax(SyntaxError::UnexpectedToken { expected, .. })
                if expected == "command name"
        );
    }

    #[test]
    fn parser_assignment_prefix() {
        let command = parse("fooa=bar mygetenv fooa");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "mygetenv");
            assert_eq!(
                simple.prefix,
                [PrefixItem::Assign(Assign {
                    name: "fooa".to_string(),
                    value: "bar".to_string(),
                })]
            );
            let words: Vec<_> = simple.words().collect();
            assert_eq!(words, ["fooa"]);
        });
    }

    #[test]
    fn parser_mixed_prefix_keeps_order() {
        let command = parse("fooa=bar >bar foo=foo mygetenv foo");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "mygetenv");
            assert_matches!(&simple.prefix[0], PrefixItem::Assign(a) if a.name == "fooa");
            assert_matches!(
                &simple.prefix[1],
                PrefixItem::Redir(redir)
                    if redir.fd == Fd::STDOUT && redir.body == RedirBody::File("bar".to_string())
            );
            assert_matches!(&simple.prefix[2], PrefixItem::Assign(a) if a.name == "foo");
        });
    }

    #[test]
    fn parser_quoted_assignment_value() {
        let command = parse("name=\"John Doe\" env");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(
                simple.prefix,
                [PrefixItem::Assign(Assign {
                    name: "name".to_string(),
                    value: "John Doe".to_string(),
                })]
            );
        });
    }

    #[test]
    fn parser_suffix_mixes_words_and_redirections() {
        let command = parse("a=b echo a b c > f 8>&1 < bar");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "echo");
            assert_eq!(simple.suffix.len(), 6);
            let words: Vec<_> = simple.words().collect();
            assert_eq!(words, ["a", "b", "c"]);
            let redirs: Vec<_> = simple.redirs().collect();
            assert_eq!(redirs.len(), 3);
        });
    }

    #[test]
    fn parser_prefix_redirection_only_command() {
        let command = parse("<foo cat");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            assert_eq!(simple.name, "cat");
            assert_matches!(
                &simple.prefix[..],
                [PrefixItem::Redir(redir)] if redir.fd == Fd::STDIN
            );
        });
    }

    #[test]
    fn parser_subshell() {
        let command = parse("(echo hello)");
        assert_matches!(first_command(&command), Command::Compound(compound) => {
            assert_eq!(compound.redirs, []);
            let CompoundCommand::Subshell(list) = &compound.command;
            assert_eq!(list.list.0.len(), 1);
        });
    }

    #[test]
    fn parser_subshell_with_redirections() {
        let command = parse("(echo hello >&8) 8> ret");
        assert_matches!(first_command(&command), Command::Compound(compound) => {
            assert_matches!(
                &compound.redirs[..],
                [redir] if redir.fd == Fd(8) && redir.body == RedirBody::File("ret".to_string())
            );
        });
    }

    #[test]
    fn parser_subshell_multiple_items() {
        let command = parse("(echo a; echo b)");
        assert_matches!(first_command(&command), Command::Compound(compound) => {
            let CompoundCommand::Subshell(list) = &compound.command;
            assert_eq!(list.list.0.len(), 2);
            assert_eq!(list.to_string(), "echo a; echo b");
        });
    }

    #[test]
    fn parser_subshell_unclosed() {
        let mut parser = Parser::from_memory("(echo a");
        let error = parser.next_complete_command().unwrap_err();
        assert_matches!(
            error.cause,
            ErrorCause::Syntax(SyntaxError::UnexpectedToken { expected, .. })
                if expected == "`)`"
        );
    }

    #[test]
    fn parser_number_can_be_word() {
        let command = parse("myecho 2 3.5");
        assert_matches!(first_command(&command), Command::Simple(simple) => {
            let words: Vec<_> = simple.words().collect();
            assert_eq!(words, ["2", "3.5"]);
        });
    }
}
