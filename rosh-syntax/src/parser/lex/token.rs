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

//! Token definitions shared between the lexer and the parser.

use crate::source::Location;
use std::fmt;
use std::fmt::Write as _;

/// Redirection operators.
///
/// This enum defines the nine redirection operator types recognized in the
/// shell language, including the two here-document operators.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `>` (open a file for output; truncate if existing)
    FileOut,
    /// `<<` (here-document)
    HereDoc,
    /// `>>` (open a file for output; append if existing)
    FileAppend,
    /// `<&` (copy a file descriptor for input)
    FdIn,
    /// `>&` (copy a file descriptor for output)
    FdOut,
    /// `<>` (open a file for input and output)
    FileInOut,
    /// `<<-` (here-document; leading tabs are subject to removal)
    HereDocDash,
    /// `>|` (open a file for output; always truncate if existing)
    FileClobber,
}

impl RedirOp {
    /// Returns the file descriptor the operator affects when the source
    /// does not name one: `0` for input operators and `1` for output
    /// operators.
    #[must_use]
    pub const fn default_fd(self) -> i32 {
        use RedirOp::*;
        match self {
            FileIn | HereDoc | FdIn | FileInOut | HereDocDash => 0,
            FileOut | FileAppend | FdOut | FileClobber => 1,
        }
    }

    /// Whether this operator introduces a here-document.
    #[must_use]
    pub const fn is_here_doc(self) -> bool {
        matches!(self, RedirOp::HereDoc | RedirOp::HereDocDash)
    }
}

impl fmt::Display for RedirOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RedirOp::*;
        match self {
            FileIn => f.write_char('<'),
            FileOut => f.write_char('>'),
            HereDoc => f.write_str("<<"),
            FileAppend => f.write_str(">>"),
            FdIn => f.write_str("<&"),
            FdOut => f.write_str(">&"),
            FileInOut => f.write_str("<>"),
            HereDocDash => f.write_str("<<-"),
            FileClobber => f.write_str(">|"),
        }
    }
}

/// Errors that put the lexer into its terminal state.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum LexError {
    /// A single quotation lacks a closing `'`.
    #[error("unclosed single quote")]
    UnclosedSingleQuote,
    /// A double quotation lacks a closing `"`.
    #[error("unclosed double quote")]
    UnclosedDoubleQuote,
    /// A character that cannot begin any token.
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    /// The input byte stream is not valid UTF-8.
    #[error("invalid UTF-8 sequence in input")]
    InvalidUtf8,
    /// The underlying reader failed.
    #[error("cannot read commands: {0}")]
    Io(std::io::ErrorKind),
}

/// Token identifier, or classification of tokens.
///
/// Whitespace and newlines are tokens of their own; the parser filters
/// them. They cannot be discarded during lexing because the grammar is
/// whitespace-sensitive (an IO number must be adjacent to its redirection
/// operator).
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TokenId {
    /// Imaginary token identifier for the end of input.
    EndOfInput,
    /// Terminal lexical error; the error value is carried by the token
    /// itself (see [`Token::lex_error`]).
    Error,
    /// Unquoted word, possibly containing backslash escapes.
    Identifier,
    /// String surrounded with a pair of single quotations.
    SingleQuote,
    /// String surrounded with a pair of double quotations.
    DoubleQuote,
    /// Digit run, optionally with a fractional part.
    Number,
    /// Variable reference (`$name` or `$$`).
    Variable,
    /// `` ` ``
    Backquote,
    /// `$(`
    CommandSubst,
    /// Redirection operator; the token value is the IO number.
    Redirect(RedirOp),
    /// `=`
    Equals,
    /// `!`
    Bang,
    /// `&&`
    AndAnd,
    /// `||`
    BarBar,
    /// Run of spaces and tabs.
    Blank,
    /// Newline.
    Newline,
    /// `|`
    Bar,
    /// `,`
    Comma,
    /// `;`
    Semicolon,
    /// `;;`
    SemicolonSemicolon,
    /// `&`
    And,
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `{`
    OpenBrace,
    /// `}`
    CloseBrace,
    /// `[`
    OpenBracket,
    /// `]`
    CloseBracket,
}

impl TokenId {
    /// Whether tokens of this identifier can join a word by aggregation.
    ///
    /// Command substitution results join as [`Identifier`](Self::Identifier)
    /// tokens, so `Backquote` and `CommandSubst` themselves are not in the
    /// set.
    #[must_use]
    pub const fn is_word(self) -> bool {
        use TokenId::*;
        matches!(self, Identifier | SingleQuote | DoubleQuote | Number)
    }

}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TokenId::*;
        match self {
            EndOfInput => f.write_str("end of input"),
            Error => f.write_str("lexical error"),
            Identifier => f.write_str("identifier"),
            SingleQuote => f.write_str("single-quoted string"),
            DoubleQuote => f.write_str("double-quoted string"),
            Number => f.write_str("number"),
            Variable => f.write_str("variable"),
            Backquote => f.write_str("`"),
            CommandSubst => f.write_str("$("),
            Redirect(op) => write!(f, "{op}"),
            Equals => f.write_str("="),
            Bang => f.write_str("!"),
            AndAnd => f.write_str("&&"),
            BarBar => f.write_str("||"),
            Blank => f.write_str("blank"),
            Newline => f.write_str("newline"),
            Bar => f.write_str("|"),
            Comma => f.write_str(","),
            Semicolon => f.write_str(";"),
            SemicolonSemicolon => f.write_str(";;"),
            And => f.write_str("&"),
            OpenParen => f.write_str("("),
            CloseParen => f.write_str(")"),
            OpenBrace => f.write_str("{"),
            CloseBrace => f.write_str("}"),
            OpenBracket => f.write_str("["),
            CloseBracket => f.write_str("]"),
        }
    }
}

/// Result of lexical analysis produced by the lexer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Token {
    /// Token identifier.
    pub id: TokenId,
    /// Content of the token.
    ///
    /// Quoted strings carry their content without the enclosing quotes,
    /// identifiers keep their backslash escapes verbatim, and redirection
    /// operator tokens carry the IO number (defaulted when the source did
    /// not name one).
    pub value: String,
    /// Position of the first character of the token.
    pub location: Location,
    /// Full error value when `id` is [`TokenId::Error`].
    pub error: Option<LexError>,
}

impl Token {
    /// Creates a token without an error payload.
    #[must_use]
    pub fn new(id: TokenId, value: impl Into<String>, location: Location) -> Token {
        Token {
            id,
            value: value.into(),
            location,
            error: None,
        }
    }

    /// Returns the lexical error carried by a terminal error token.
    #[must_use]
    pub fn lex_error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    /// Reconstructs the source form of the token.
    ///
    /// Quoted strings get their quotes back and redirection operators are
    /// rendered with their IO number, so that a sequence of source forms
    /// can be fed through the parser again (which is how command
    /// substitution hands its content to a subshell).
    #[must_use]
    pub fn source_form(&self) -> String {
        match self.id {
            TokenId::SingleQuote => format!("'{}'", self.value),
            TokenId::DoubleQuote => format!("\"{}\"", self.value),
            TokenId::Redirect(op) => format!("{}{op}", self.value),
            TokenId::EndOfInput | TokenId::Error => String::new(),
            _ => self.value.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            TokenId::EndOfInput => f.write_str("end of input"),
            TokenId::Error => f.write_str("lexical error"),
            _ => write!(f, "{:?}", self.source_form()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redir_op_default_fds() {
        assert_eq!(RedirOp::FileIn.default_fd(), 0);
        assert_eq!(RedirOp::HereDoc.default_fd(), 0);
        assert_eq!(RedirOp::HereDocDash.default_fd(), 0);
        assert_eq!(RedirOp::FdIn.default_fd(), 0);
        assert_eq!(RedirOp::FileInOut.default_fd(), 0);
        assert_eq!(RedirOp::FileOut.default_fd(), 1);
        assert_eq!(RedirOp::FileAppend.default_fd(), 1);
        assert_eq!(RedirOp::FdOut.default_fd(), 1);
        assert_eq!(RedirOp::FileClobber.default_fd(), 1);
    }

    #[test]
    fn redir_op_display() {
        assert_eq!(RedirOp::HereDocDash.to_string(), "<<-");
        assert_eq!(RedirOp::FileClobber.to_string(), ">|");
        assert_eq!(RedirOp::FileInOut.to_string(), "<>");
    }

    #[test]
    fn token_source_form_restores_quotes() {
        let token = Token::new(TokenId::SingleQuote, "a b", Location::dummy());
        assert_eq!(token.source_form(), "'a b'");
        let token = Token::new(TokenId::DoubleQuote, "a b", Location::dummy());
        assert_eq!(token.source_form(), "\"a b\"");
    }

    #[test]
    fn token_source_form_renders_io_number() {
        let token = Token::new(
            TokenId::Redirect(RedirOp::FdOut),
            "2",
            Location::dummy(),
        );
        assert_eq!(token.source_form(), "2>&");
    }
}
