//! Statement parsing for function/test bodies (§4.3).
//!
//! Statements are parsed line by line the way the lexer hands them over:
//! each line begins with one `Indent` token whose lexeme encodes the line's
//! indentation depth (`get_leading_indents`); a block is "every following
//! line with strictly greater depth than its header line".

use crate::ast::stmt::Stmt;
use crate::ast::Span;
use crate::error::{ErrorKind, ProductionError};
use crate::matcher::get_leading_indents;
use crate::namespace::Namespace;
use crate::parser::expr_parser::ExprParser;
use crate::token::{Token, TokenKind};

pub struct StmtParser<'a, 'src> {
    pub tokens: &'a [Token<'src>],
    pub namespace: &'a mut Namespace,
}

impl<'a, 'src> StmtParser<'a, 'src> {
    pub fn new(tokens: &'a [Token<'src>], namespace: &'a mut Namespace) -> Self {
        Self { tokens, namespace }
    }

    /// Parse every statement whose line has indentation depth exactly
    /// `depth` (a literal leading-whitespace character count, not a nesting
    /// level — `depth` is always a depth this parser itself observed on the
    /// block's first line, never computed by adding a fixed increment),
    /// starting at `start`, stopping as soon as a line with a shallower
    /// depth (end of block) or end of stream is reached.
    pub fn parse_block(&mut self, start: usize, depth: usize) -> Result<(Vec<Stmt>, usize), ProductionError> {
        let mut stmts = Vec::new();
        let mut cursor = start;
        loop {
            let Some((line_depth, body_start)) = get_leading_indents(self.tokens, cursor) else { break };
            if line_depth < depth {
                break;
            }
            if line_depth > depth {
                return Err(ProductionError::validation(
                    ErrorKind::ErrParsing,
                    "unexpected indentation increase without a block-opening statement",
                ));
            }
            let (stmt, next) = self.parse_stmt(body_start, depth)?;
            stmts.push(stmt);
            cursor = self.skip_to_next_line(next);
        }
        Ok((stmts, cursor))
    }

    fn skip_to_next_line(&self, mut index: usize) -> usize {
        while let Some(token) = self.tokens.get(index) {
            if token.kind == TokenKind::Eol {
                return index + 1;
            }
            index += 1;
        }
        index
    }

    fn parse_stmt(&mut self, start: usize, depth: usize) -> Result<(Stmt, usize), ProductionError> {
        let span = self.span(start);
        match self.tokens.get(start).map(|t| t.kind) {
            Some(TokenKind::Return) => {
                if self.tokens.get(start + 1).map(|t| t.kind) == Some(TokenKind::Eol) {
                    return Ok((Stmt::Return(None, span), start + 1));
                }
                let (expr, end) = ExprParser::new(self.tokens, self.namespace).parse(start + 1)?;
                Ok((Stmt::Return(Some(expr), span), end))
            }
            Some(TokenKind::Break) => Ok((Stmt::Break(span), start + 1)),
            Some(TokenKind::Continue) => Ok((Stmt::Continue(span), start + 1)),
            Some(TokenKind::Throw) => {
                let (expr, end) = ExprParser::new(self.tokens, self.namespace).parse(start + 1)?;
                Ok((Stmt::Throw(expr, span), end))
            }
            Some(TokenKind::Mut) | Some(TokenKind::Const) => self.parse_let(start, span),
            Some(TokenKind::If) => self.parse_if(start, depth, span),
            Some(TokenKind::While) => self.parse_while(start, depth, span),
            Some(TokenKind::For) | Some(TokenKind::Parallel) => self.parse_for(start, depth, span),
            Some(TokenKind::Spawn) => {
                let (body, end) = self.parse_nested_block(start + 1, depth)?;
                Ok((Stmt::Spawn { body, span }, end))
            }
            Some(TokenKind::Sync) => {
                let (body, end) = self.parse_nested_block(start + 1, depth)?;
                Ok((Stmt::Sync { body, span }, end))
            }
            _ => self.parse_expr_or_assign(start, span),
        }
    }

    fn parse_let(&mut self, start: usize, span: Span) -> Result<(Stmt, usize), ProductionError> {
        let is_mut = self.tokens.get(start).map(|t| t.kind) == Some(TokenKind::Mut);
        let name_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a name after `mut`/`const`"))?;
        let name = name_token.lexeme.to_string();
        if self.tokens.get(start + 2).map(|t| t.kind) != Some(TokenKind::ColonEqual)
            && self.tokens.get(start + 2).map(|t| t.kind) != Some(TokenKind::Equal)
        {
            return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `:=` or `=` in a let binding"));
        }
        let (value, end) = ExprParser::new(self.tokens, self.namespace).parse(start + 3)?;
        Ok((Stmt::Let { name, is_mut, value, span }, end))
    }

    fn parse_expr_or_assign(&mut self, start: usize, span: Span) -> Result<(Stmt, usize), ProductionError> {
        let (expr, end) = ExprParser::new(self.tokens, self.namespace).parse(start)?;
        if self.tokens.get(end).map(|t| t.kind) == Some(TokenKind::Equal) {
            let (value, value_end) = ExprParser::new(self.tokens, self.namespace).parse(end + 1)?;
            return Ok((Stmt::Assign { target: expr, value, span }, value_end));
        }
        Ok((Stmt::ExprStmt(expr, span), end))
    }

    fn parse_if(&mut self, start: usize, depth: usize, span: Span) -> Result<(Stmt, usize), ProductionError> {
        let (condition, cond_end) = ExprParser::new(self.tokens, self.namespace).parse(start + 1)?;
        let (then_body, body_end) = self.parse_nested_block(cond_end, depth)?;

        let Some((line_depth, else_start)) = get_leading_indents(self.tokens, body_end) else {
            return Ok((Stmt::If { condition, then_body, else_body: None, span }, body_end));
        };
        if line_depth != depth || self.tokens.get(else_start).map(|t| t.kind) != Some(TokenKind::Else) {
            return Ok((Stmt::If { condition, then_body, else_body: None, span }, body_end));
        }
        let (else_body, end) = self.parse_nested_block(else_start + 1, depth)?;
        Ok((Stmt::If { condition, then_body, else_body: Some(else_body), span }, end))
    }

    fn parse_while(&mut self, start: usize, depth: usize, span: Span) -> Result<(Stmt, usize), ProductionError> {
        let (condition, cond_end) = ExprParser::new(self.tokens, self.namespace).parse(start + 1)?;
        let (body, end) = self.parse_nested_block(cond_end, depth)?;
        Ok((Stmt::While { condition, body, span }, end))
    }

    fn parse_for(&mut self, start: usize, depth: usize, span: Span) -> Result<(Stmt, usize), ProductionError> {
        let is_parallel = self.tokens.get(start).map(|t| t.kind) == Some(TokenKind::Parallel);
        let for_start = if is_parallel { start + 1 } else { start };
        let binding_token = self
            .tokens
            .get(for_start + 1)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a loop binding name"))?;
        let binding = binding_token.lexeme.to_string();
        if self.tokens.get(for_start + 2).map(|t| t.kind) != Some(TokenKind::In) {
            return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `in` in a for loop"));
        }
        let (iterable, iter_end) = ExprParser::new(self.tokens, self.namespace).parse(for_start + 3)?;
        let (body, end) = self.parse_nested_block(iter_end, depth)?;
        Ok((Stmt::For { binding, iterable, body, is_parallel, span }, end))
    }

    /// Parse the block opened by a header line (`if ...`, `while ...`, ...):
    /// skip to the next line, then parse statements at whatever depth that
    /// line actually has (never `depth + 1` — see the module doc comment).
    fn parse_nested_block(&mut self, header_end: usize, depth: usize) -> Result<(Vec<Stmt>, usize), ProductionError> {
        let next_line = self.skip_to_next_line(header_end);
        self.parse_block(next_line, self.block_depth(next_line, depth))
    }

    /// The literal indentation depth of a block that follows a header at
    /// `header_depth`, discovered by peeking rather than assumed to be a
    /// fixed `header_depth + 1`. When `next_line` isn't part of a block at
    /// all (an empty body), the returned value is never used: `parse_block`
    /// stops immediately in that case regardless of the depth passed in.
    fn block_depth(&self, start: usize, header_depth: usize) -> usize {
        match get_leading_indents(self.tokens, start) {
            Some((line_depth, _)) if line_depth > header_depth => line_depth,
            _ => header_depth + 1,
        }
    }

    fn span(&self, index: usize) -> Span {
        self.tokens
            .get(index)
            .map(|t| Span::new(t.file, t.line, t.column))
            .unwrap_or(Span::new(crate::hash::FileHash::NONE, 0, 0))
    }
}
