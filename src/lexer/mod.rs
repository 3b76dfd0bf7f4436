//! Source text → token stream (§4.1 "Lexical analysis").
//!
//! Structured the way the teacher's `lex.rs`/`tokenization.rs` split lexical
//! analysis into independent lexeme utilities tried in sequence at each
//! position; this crate has one fixed grammar so those utilities collapse
//! into the ordered list of sub-lexers in [`Lexer::next_token`] rather than
//! staying a pluggable `Vec<Rc<dyn ILexeme>>`.

mod keywords;

use crate::error::ErrorKind;
use crate::hash::FileHash;
use crate::log::Log;
use crate::source::{Position, SourceCode};
use crate::token::{Token, TokenKind};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

static IDENTIFIER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").unwrap());
static FLOAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?").unwrap());
static INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]+").unwrap());
static CHAR_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^'(\\.|[^'\\])'").unwrap());
static STR_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^"(\\.|[^"\\])*""#).unwrap());

/// Whether `c` may continue an identifier once started (§GLOSSARY
/// "alphanumeric"). Leading underscores are allowed; digits are not a valid
/// first character (handled by `IDENTIFIER`'s own anchor).
pub fn is_alpha_num(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

#[derive(Debug, Clone)]
pub struct LexError {
    pub position: Position,
    pub message: String,
}

impl LexError {
    fn new(position: Position, message: impl Into<String>) -> Self {
        Self {
            position,
            message: message.into(),
        }
    }

    pub fn into_parse_error(self) -> crate::error::ParseError {
        crate::error::ParseError::new(ErrorKind::ErrLex, 0, format!("{} at {}", self.message, self.position))
    }
}

pub struct Lexer<'src> {
    source: &'src SourceCode<'src>,
    file: FileHash,
    debug: Log<&'static str>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src SourceCode<'src>, file: FileHash) -> Self {
        Self {
            source,
            file,
            debug: Log::None,
        }
    }

    pub fn with_debug(mut self, level: Log<&'static str>) -> Self {
        self.debug = level;
        self
    }

    /// Tokenize the whole buffer line by line: each line contributes an
    /// `Indent` token (its leading-whitespace depth) followed by the line's
    /// tokens and a trailing `Eol`, except blank and comment-only lines,
    /// which contribute nothing. A final `Eof` always terminates the stream.
    pub fn tokenize(&self) -> Result<Vec<Token<'src>>, LexError> {
        let mut tokens = Vec::new();
        for line in 0..self.source.line_count() {
            self.tokenize_line(line, &mut tokens)?;
        }
        let eof_pos = self.source.position_at(self.source.text.len());
        tokens.push(Token::new(TokenKind::Eof, "", self.file, eof_pos));
        Ok(tokens)
    }

    fn tokenize_line(&self, line: usize, tokens: &mut Vec<Token<'src>>) -> Result<(), LexError> {
        let text = self.source.line_slice(line);
        let bytes = text.as_bytes();

        let mut column = 0usize;
        while column < bytes.len() && bytes[column] == b' ' {
            column += 1;
        }
        if column < bytes.len() && bytes[column] == b'\t' {
            return Err(LexError::new(
                Position::new(line + 1, column + 1),
                "tabs are not permitted for indentation",
            ));
        }

        let rest = &text[column..];
        if rest.is_empty() || rest.starts_with("//") {
            return Ok(());
        }

        tokens.push(Token::new(
            TokenKind::Indent,
            &text[..column],
            self.file,
            Position::new(line + 1, 1),
        ));

        let mut cursor = column;
        while cursor < bytes.len() {
            if bytes[cursor] == b' ' {
                cursor += 1;
                continue;
            }
            if text[cursor..].starts_with("//") {
                break;
            }
            let pos = Position::new(line + 1, cursor + 1);
            let (kind, len) = self.next_token(&text[cursor..], pos)?;
            let lexeme = &text[cursor..cursor + len];
            self.debug.trace("lex", pos, Some(&kind));
            tokens.push(Token::new(kind, lexeme, self.file, pos));
            cursor += len;
        }

        tokens.push(Token::new(
            TokenKind::Eol,
            "",
            self.file,
            Position::new(line + 1, bytes.len() + 1),
        ));
        Ok(())
    }

    /// Try each sub-lexer in turn at `slice`'s start and return the winning
    /// token kind plus how many bytes it consumed.
    fn next_token(&self, slice: &str, pos: Position) -> Result<(TokenKind, usize), LexError> {
        let bytes = slice.as_bytes();

        if bytes[0] == b'$' && slice.len() > 1 && bytes[1] == b'"' {
            // `$"..."` interpolated string: the lexer only needs to hand the
            // parser `Dollar` followed by the string body as `StrValue`; the
            // parser is what stitches interpolation segments together.
            return Ok((TokenKind::Dollar, 1));
        }

        if let Some(m) = STR_LITERAL.find(bytes) {
            return Ok((TokenKind::StrValue, m.end()));
        }
        if let Some(m) = CHAR_LITERAL.find(bytes) {
            return Ok((TokenKind::CharValue, m.end()));
        }
        if let Some(m) = FLOAT.find(bytes) {
            return Ok((TokenKind::FloatValue, m.end()));
        }
        if let Some(m) = INT.find(bytes) {
            return Ok((TokenKind::IntValue, m.end()));
        }
        if let Some(m) = IDENTIFIER.find(bytes) {
            let word = &slice[..m.end()];
            if let Some((kind, len)) = keywords::KEYWORD_TREE.find(word.as_bytes()) {
                if len == word.len() {
                    return Ok((kind, len));
                }
            }
            return Ok((TokenKind::Identifier, m.end()));
        }
        if let Some((kind, len)) = keywords::PUNCTUATION_TREE.find(bytes) {
            if len > 0 {
                return Ok((kind, len));
            }
        }

        Err(LexError::new(
            pos,
            format!("unrecognized character '{}'", slice.chars().next().unwrap()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(text: &str) -> Vec<TokenKind> {
        let source = SourceCode::new(text);
        let lexer = Lexer::new(&source, FileHash::NONE);
        lexer.tokenize().unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn emits_indent_tokens_then_eol_then_eof() {
        let kinds = tokenize("def foo() -> i32\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Indent,
                TokenKind::Def,
                TokenKind::Identifier,
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Arrow,
                TokenKind::I32,
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn blank_and_comment_lines_contribute_nothing() {
        let kinds = tokenize("\n// comment\n  \n");
        assert_eq!(kinds, vec![TokenKind::Eof]);
    }

    #[test]
    fn keyword_is_not_matched_inside_a_longer_identifier() {
        let kinds = tokenize("inline\n");
        assert_eq!(kinds, vec![TokenKind::Indent, TokenKind::Identifier, TokenKind::Eol, TokenKind::Eof]);
    }

    #[test]
    fn range_operator_is_distinct_from_dot() {
        let kinds = tokenize("0..10\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Indent,
                TokenKind::IntValue,
                TokenKind::Range,
                TokenKind::IntValue,
                TokenKind::Eol,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tab_indentation_is_rejected() {
        let source = SourceCode::new("\tdef foo()\n");
        let lexer = Lexer::new(&source, FileHash::NONE);
        assert!(lexer.tokenize().is_err());
    }

    #[test]
    fn dollar_string_splits_into_dollar_and_str_value() {
        let kinds = tokenize("$\"hi\"\n");
        assert_eq!(kinds[1], TokenKind::Dollar);
        assert_eq!(kinds[2], TokenKind::StrValue);
    }
}
