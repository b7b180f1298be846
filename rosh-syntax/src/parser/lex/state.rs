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

//! State functions of the lexer.
//!
//! Each function here is one state of the machine driven by
//! [`Lexer::next_token`](super::core::Lexer::next_token). The initial state
//! is [`lex_text`], which dispatches on the first character of the token.

use super::core::{Lexer, State};
use super::token::{LexError, RedirOp, TokenId};

/// Characters that may appear in a variable name.
fn is_variable_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Characters that may appear in an unquoted word.
fn is_identifier_char(c: char) -> bool {
    is_variable_char(c) || ".-+*%/?".contains(c)
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// Initial state: dispatches on the first character of the next token.
pub(super) fn lex_text(l: &mut Lexer<'_>) -> Option<State> {
    let c = match l.peek() {
        Some(c) => c,
        None => return l.end_or_error(),
    };
    match c {
        ' ' | '\t' => {
            l.accept_run(|c| c == ' ' || c == '\t');
            l.emit(TokenId::Blank)
        }
        '\n' => {
            l.next();
            l.emit(TokenId::Newline)
        }
        '\\' => Some(State(lex_identifier)),
        '\'' => Some(State(lex_single_quote)),
        '"' => Some(State(lex_double_quote)),
        '$' => Some(State(lex_dollar)),
        '<' | '>' => Some(State(lex_redirect)),
        '`' => {
            l.next();
            l.emit(TokenId::Backquote)
        }
        ';' => {
            l.next();
            if l.peek() == Some(';') {
                l.next();
                l.emit(TokenId::SemicolonSemicolon)
            } else {
                l.emit(TokenId::Semicolon)
            }
        }
        '|' => {
            l.next();
            if l.peek() == Some('|') {
                l.next();
                l.emit(TokenId::BarBar)
            } else {
                l.emit(TokenId::Bar)
            }
        }
        '&' => {
            l.next();
            if l.peek() == Some('&') {
                l.next();
                l.emit(TokenId::AndAnd)
            } else {
                l.emit(TokenId::And)
            }
        }
        '0'..='9' => Some(State(lex_number)),
        ':' => {
            l.next();
            Some(State(lex_identifier))
        }
        '(' => single(l, TokenId::OpenParen),
        ')' => single(l, TokenId::CloseParen),
        '{' => single(l, TokenId::OpenBrace),
        '}' => single(l, TokenId::CloseBrace),
        '[' => single(l, TokenId::OpenBracket),
        ']' => single(l, TokenId::CloseBracket),
        '=' => single(l, TokenId::Equals),
        '!' => single(l, TokenId::Bang),
        ',' => single(l, TokenId::Comma),
        c if is_identifier_char(c) => Some(State(lex_identifier)),
        c => l.error(LexError::UnexpectedChar(c)),
    }
}

/// Consumes one character and emits a single-character token.
fn single(l: &mut Lexer<'_>, id: TokenId) -> Option<State> {
    l.next();
    l.emit(id)
}

/// State for a token starting with a digit: either a number or the IO
/// number of a redirection.
fn lex_number(l: &mut Lexer<'_>) -> Option<State> {
    l.accept_run(is_digit);
    match l.peek() {
        Some('<') | Some('>') => return Some(State(lex_redirect)),
        _ => {}
    }
    if l.peek() == Some('.') {
        l.next();
        l.accept_run(is_digit);
    }
    l.emit(TokenId::Number)
}

/// State for the nine redirection operators.
///
/// Any digits consumed so far are the IO number; when there are none the
/// number defaults to `1` for output operators and `0` for input
/// operators.
fn lex_redirect(l: &mut Lexer<'_>) -> Option<State> {
    let io_number = l.token_text().to_string();
    let op = match l.next() {
        Some('>') => match l.peek() {
            Some('>') => {
                l.next();
                RedirOp::FileAppend
            }
            Some('&') => {
                l.next();
                RedirOp::FdOut
            }
            Some('|') => {
                l.next();
                RedirOp::FileClobber
            }
            _ => RedirOp::FileOut,
        },
        Some('<') => match l.peek() {
            Some('<') => {
                l.next();
                if l.peek() == Some('-') {
                    l.next();
                    RedirOp::HereDocDash
                } else {
                    RedirOp::HereDoc
                }
            }
            Some('&') => {
                l.next();
                RedirOp::FdIn
            }
            Some('>') => {
                l.next();
                RedirOp::FileInOut
            }
            _ => RedirOp::FileIn,
        },
        _ => return l.end_or_error(),
    };
    let value = if io_number.is_empty() {
        op.default_fd().to_string()
    } else {
        io_number
    };
    l.emit_with(TokenId::Redirect(op), value)
}

/// State after a `$`.
fn lex_dollar(l: &mut Lexer<'_>) -> Option<State> {
    l.next();
    match l.peek() {
        Some('$') => {
            l.next();
            l.emit(TokenId::Variable)
        }
        Some('(') => {
            l.next();
            l.emit(TokenId::CommandSubst)
        }
        Some('{') => {
            l.next();
            l.emit(TokenId::OpenBrace)
        }
        _ => {
            if l.accept_run(is_variable_char) {
                l.emit(TokenId::Variable)
            } else {
                // A lone `$` becomes an identifier.
                Some(State(lex_identifier))
            }
        }
    }
}

fn lex_single_quote(l: &mut Lexer<'_>) -> Option<State> {
    lex_quote(l, '\'')
}

fn lex_double_quote(l: &mut Lexer<'_>) -> Option<State> {
    lex_quote(l, '"')
}

/// State for quoted strings.
///
/// Single-quoted content is taken verbatim. Double-quoted content keeps a
/// `\X` pair raw; the parser later rewrites `\"` to `"`. The content may
/// span multiple lines. The token value excludes the quotes.
fn lex_quote(l: &mut Lexer<'_>, quote: char) -> Option<State> {
    l.next();
    let content_start = l.index();
    loop {
        match l.next() {
            None => {
                return l.error(if quote == '\'' {
                    LexError::UnclosedSingleQuote
                } else {
                    LexError::UnclosedDoubleQuote
                });
            }
            Some(c) if c == quote => break,
            Some('\\') if quote == '"' => {
                l.next();
            }
            Some(_) => {}
        }
    }
    let value = l.slice(content_start, l.index() - 1).to_string();
    let id = if quote == '\'' {
        TokenId::SingleQuote
    } else {
        TokenId::DoubleQuote
    };
    l.emit_with(id, value)
}

/// State for unquoted words.
///
/// A backslash consumes the following character; both stay in the token
/// value verbatim, so word-level escapes survive lexing without splitting
/// the word.
fn lex_identifier(l: &mut Lexer<'_>) -> Option<State> {
    l.accept_run(is_identifier_char);
    if l.peek() == Some('\\') {
        l.next();
        l.next();
        return Some(State(lex_identifier));
    }
    l.emit(TokenId::Identifier)
}

#[allow(clippy::bool_assert_comparison)]
#[cfg(test)]
mod tests {
    use super::super::token::Token;
    use super::*;

    /// Collects all tokens up to and including the end of input.
    fn lex_all(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::from_memory(input);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let done = matches!(token.id, TokenId::EndOfInput | TokenId::Error);
            tokens.push(token);
            if done {
                break;
            }
        }
        tokens
    }

    /// Asserts the token identifiers and values of an input, ignoring
    /// blanks and the final end-of-input token.
    fn assert_words(input: &str, expected: &[(TokenId, &str)]) {
        let tokens: Vec<_> = lex_all(input)
            .into_iter()
            .filter(|t| t.id != TokenId::Blank && t.id != TokenId::EndOfInput)
            .collect();
        let actual: Vec<_> = tokens
            .iter()
            .map(|t| (t.id, t.value.as_str()))
            .collect();
        assert_eq!(actual, expected, "input: {input:?}");
    }

    #[test]
    fn lexer_single_command() {
        assert_words("ls", &[(TokenId::Identifier, "ls")]);
    }

    #[test]
    fn lexer_command_with_arguments() {
        assert_words(
            "cp file1.txt file2.txt",
            &[
                (TokenId::Identifier, "cp"),
                (TokenId::Identifier, "file1.txt"),
                (TokenId::Identifier, "file2.txt"),
            ],
        );
    }

    #[test]
    fn lexer_blank_runs_collapse_into_one_token() {
        let tokens = lex_all("ls    -l\tfile");
        let blanks: Vec<_> = tokens
            .iter()
            .filter(|t| t.id == TokenId::Blank)
            .collect();
        assert_eq!(blanks.len(), 2);
        assert_eq!(blanks[0].value, "    ");
        assert_eq!(blanks[1].value, "\t");
    }

    #[test]
    fn lexer_pipe_and_logical_operators() {
        assert_words(
            "a | b || c && d",
            &[
                (TokenId::Identifier, "a"),
                (TokenId::Bar, "|"),
                (TokenId::Identifier, "b"),
                (TokenId::BarBar, "||"),
                (TokenId::Identifier, "c"),
                (TokenId::AndAnd, "&&"),
                (TokenId::Identifier, "d"),
            ],
        );
    }

    #[test]
    fn lexer_separators() {
        assert_words(
            "a; b;; c &",
            &[
                (TokenId::Identifier, "a"),
                (TokenId::Semicolon, ";"),
                (TokenId::Identifier, "b"),
                (TokenId::SemicolonSemicolon, ";;"),
                (TokenId::Identifier, "c"),
                (TokenId::And, "&"),
            ],
        );
    }

    #[test]
    fn lexer_redirect_default_io_numbers() {
        assert_words(
            "echo hello > out",
            &[
                (TokenId::Identifier, "echo"),
                (TokenId::Identifier, "hello"),
                (TokenId::Redirect(RedirOp::FileOut), "1"),
                (TokenId::Identifier, "out"),
            ],
        );
        assert_words(
            "cat < in",
            &[
                (TokenId::Identifier, "cat"),
                (TokenId::Redirect(RedirOp::FileIn), "0"),
                (TokenId::Identifier, "in"),
            ],
        );
    }

    #[test]
    fn lexer_redirect_explicit_io_numbers() {
        assert_words(
            "cmd 2> errors 8<input",
            &[
                (TokenId::Identifier, "cmd"),
                (TokenId::Redirect(RedirOp::FileOut), "2"),
                (TokenId::Identifier, "errors"),
                (TokenId::Redirect(RedirOp::FileIn), "8"),
                (TokenId::Identifier, "input"),
            ],
        );
    }

    #[test]
    fn lexer_all_redirect_operators() {
        assert_words(
            "<f >f <<f >>f <&1 >&1 <>f <<-f >|f",
            &[
                (TokenId::Redirect(RedirOp::FileIn), "0"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::FileOut), "1"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::HereDoc), "0"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::FileAppend), "1"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::FdIn), "0"),
                (TokenId::Number, "1"),
                (TokenId::Redirect(RedirOp::FdOut), "1"),
                (TokenId::Number, "1"),
                (TokenId::Redirect(RedirOp::FileInOut), "0"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::HereDocDash), "0"),
                (TokenId::Identifier, "f"),
                (TokenId::Redirect(RedirOp::FileClobber), "1"),
                (TokenId::Identifier, "f"),
            ],
        );
    }

    #[test]
    fn lexer_number_versus_io_number() {
        // A digit run directly followed by a redirect operator is an IO
        // number; otherwise it is a number token.
        assert_words(
            "2>&1",
            &[
                (TokenId::Redirect(RedirOp::FdOut), "2"),
                (TokenId::Number, "1"),
            ],
        );
        assert_words("2.5", &[(TokenId::Number, "2.5")]);
        assert_words("25", &[(TokenId::Number, "25")]);
    }

    #[test]
    fn lexer_quoted_strings() {
        assert_words(
            r#"echo "double quoted" 'single quoted'"#,
            &[
                (TokenId::Identifier, "echo"),
                (TokenId::DoubleQuote, "double quoted"),
                (TokenId::SingleQuote, "single quoted"),
            ],
        );
    }

    #[test]
    fn lexer_double_quote_keeps_escape_raw() {
        assert_words(
            r#""a \" b""#,
            &[(TokenId::DoubleQuote, r#"a \" b"#)],
        );
    }

    #[test]
    fn lexer_single_quote_does_not_escape() {
        assert_words(r"'a \ b'", &[(TokenId::SingleQuote, r"a \ b")]);
    }

    #[test]
    fn lexer_double_quote_spans_newlines() {
        assert_words("\"a\nb\"", &[(TokenId::DoubleQuote, "a\nb")]);
    }

    #[test]
    fn lexer_unclosed_quotes() {
        let tokens = lex_all("echo 'oops");
        let last = tokens.last().unwrap();
        assert_eq!(last.id, TokenId::Error);
        assert_eq!(last.lex_error(), Some(&LexError::UnclosedSingleQuote));

        let tokens = lex_all("echo \"oops");
        let last = tokens.last().unwrap();
        assert_eq!(last.lex_error(), Some(&LexError::UnclosedDoubleQuote));
    }

    #[test]
    fn lexer_dollar_forms() {
        assert_words("$HOME", &[(TokenId::Variable, "$HOME")]);
        assert_words("$$", &[(TokenId::Variable, "$$")]);
        assert_words("$a$b", &[
            (TokenId::Variable, "$a"),
            (TokenId::Variable, "$b"),
        ]);
        assert_words("$a$", &[
            (TokenId::Variable, "$a"),
            (TokenId::Identifier, "$"),
        ]);
        assert_words("$", &[(TokenId::Identifier, "$")]);
        assert_words("$(", &[(TokenId::CommandSubst, "$(")]);
        assert_words("${x}", &[
            (TokenId::OpenBrace, "${"),
            (TokenId::Identifier, "x"),
            (TokenId::CloseBrace, "}"),
        ]);
    }

    #[test]
    fn lexer_backquote() {
        assert_words(
            "`ls`",
            &[
                (TokenId::Backquote, "`"),
                (TokenId::Identifier, "ls"),
                (TokenId::Backquote, "`"),
            ],
        );
    }

    #[test]
    fn lexer_identifier_keeps_backslash_escapes() {
        // The escaped character does not delimit the word, but the
        // backslash stays in the value.
        assert_words(r"a\ b", &[(TokenId::Identifier, r"a\ b")]);
        assert_words(r#"hello\"world"#, &[(TokenId::Identifier, r#"hello\"world"#)]);
        assert_words(r"\a\b\\\a", &[(TokenId::Identifier, r"\a\b\\\a")]);
    }

    #[test]
    fn lexer_escaped_backquote_stays_in_word() {
        assert_words(r"\`echo", &[(TokenId::Identifier, r"\`echo")]);
    }

    #[test]
    fn lexer_colon_starts_identifier() {
        assert_words(":-default", &[(TokenId::Identifier, ":-default")]);
    }

    #[test]
    fn lexer_parens_equals_bang() {
        assert_words(
            "(a)=!",
            &[
                (TokenId::OpenParen, "("),
                (TokenId::Identifier, "a"),
                (TokenId::CloseParen, ")"),
                (TokenId::Equals, "="),
                (TokenId::Bang, "!"),
            ],
        );
    }

    #[test]
    fn lexer_unexpected_character() {
        let tokens = lex_all("@");
        let last = tokens.last().unwrap();
        assert_eq!(last.id, TokenId::Error);
        assert_eq!(last.lex_error(), Some(&LexError::UnexpectedChar('@')));
    }

    #[test]
    fn lexer_newlines_are_tokens() {
        assert_words(
            "a\nb",
            &[
                (TokenId::Identifier, "a"),
                (TokenId::Newline, "\n"),
                (TokenId::Identifier, "b"),
            ],
        );
    }

    #[test]
    fn lexer_braces_brackets_and_comma() {
        assert_words(
            "file{1,2}.txt [ -f x ]",
            &[
                (TokenId::Identifier, "file"),
                (TokenId::OpenBrace, "{"),
                (TokenId::Number, "1"),
                (TokenId::Comma, ","),
                (TokenId::Number, "2"),
                (TokenId::CloseBrace, "}"),
                (TokenId::Identifier, ".txt"),
                (TokenId::OpenBracket, "["),
                (TokenId::Identifier, "-f"),
                (TokenId::Identifier, "x"),
                (TokenId::CloseBracket, "]"),
            ],
        );
    }

    #[test]
    fn lexer_assignment_tokens() {
        assert_words(
            "name=value",
            &[
                (TokenId::Identifier, "name"),
                (TokenId::Equals, "="),
                (TokenId::Identifier, "value"),
            ],
        );
    }
}
