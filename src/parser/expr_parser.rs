//! Expression parsing: precedence climbing over binary operators, with
//! postfix chains for member/optional-member access, calls, indexing,
//! casts and variant extraction (§4.3).

use crate::ast::expr::{BinaryOp, Expr, InterpolationPart, UnaryOp};
use crate::ast::Span;
use crate::error::{ErrorKind, ProductionError};
use crate::namespace::Namespace;
use crate::parser::type_parser::TypeParser;
use crate::token::{Token, TokenKind};

pub struct ExprParser<'a, 'src> {
    pub tokens: &'a [Token<'src>],
    pub namespace: &'a mut Namespace,
}

fn binding_power(kind: TokenKind) -> Option<(u8, BinaryOp)> {
    use TokenKind::*;
    Some(match kind {
        Or => (1, BinaryOp::Or),
        And => (2, BinaryOp::And),
        EqualEqual => (3, BinaryOp::Eq),
        NotEqual => (3, BinaryOp::NotEq),
        Less => (4, BinaryOp::Lt),
        LessEqual => (4, BinaryOp::LtEq),
        Greater => (4, BinaryOp::Gt),
        GreaterEqual => (4, BinaryOp::GtEq),
        Range => (5, BinaryOp::Range),
        OptDefault => (5, BinaryOp::OptDefault),
        BitOr => (6, BinaryOp::BitOr),
        BitXor => (6, BinaryOp::BitXor),
        BitAnd => (6, BinaryOp::BitAnd),
        ShiftLeft => (7, BinaryOp::ShiftLeft),
        ShiftRight => (7, BinaryOp::ShiftRight),
        Plus => (8, BinaryOp::Add),
        Minus => (8, BinaryOp::Sub),
        Mult => (9, BinaryOp::Mul),
        Div => (9, BinaryOp::Div),
        Mod => (9, BinaryOp::Mod),
        Pow => (10, BinaryOp::Pow),
        _ => return None,
    })
}

impl<'a, 'src> ExprParser<'a, 'src> {
    pub fn new(tokens: &'a [Token<'src>], namespace: &'a mut Namespace) -> Self {
        Self { tokens, namespace }
    }

    pub fn parse(&mut self, start: usize) -> Result<(Expr, usize), ProductionError> {
        self.parse_binary(start, 0)
    }

    fn parse_binary(&mut self, start: usize, min_power: u8) -> Result<(Expr, usize), ProductionError> {
        let (mut lhs, mut cursor) = self.parse_unary(start)?;

        while let Some(kind) = self.tokens.get(cursor).map(|t| t.kind) {
            let Some((power, op)) = binding_power(kind) else { break };
            if power < min_power {
                break;
            }
            let span = self.span(cursor);
            let (rhs, next) = self.parse_binary(cursor + 1, power + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs), span);
            cursor = next;
        }
        Ok((lhs, cursor))
    }

    fn parse_unary(&mut self, start: usize) -> Result<(Expr, usize), ProductionError> {
        let span = self.span(start);
        let op = match self.tokens.get(start).map(|t| t.kind) {
            Some(TokenKind::Minus) => Some(UnaryOp::Neg),
            Some(TokenKind::Not) => Some(UnaryOp::Not),
            Some(TokenKind::BitNeg) => Some(UnaryOp::BitNeg),
            Some(TokenKind::Reference) => Some(UnaryOp::Reference),
            _ => None,
        };
        if let Some(op) = op {
            let (inner, end) = self.parse_unary(start + 1)?;
            return Ok((Expr::Unary(op, Box::new(inner), span), end));
        }
        self.parse_postfix(start)
    }

    fn parse_postfix(&mut self, start: usize) -> Result<(Expr, usize), ProductionError> {
        let (mut expr, mut cursor) = self.parse_primary(start)?;

        loop {
            match self.tokens.get(cursor).map(|t| t.kind) {
                Some(TokenKind::Dot) => {
                    let span = self.span(cursor);
                    let name_token = self.expect_identifier(cursor + 1)?;
                    expr = Expr::Member(Box::new(expr), name_token.lexeme.to_string(), span);
                    cursor += 2;
                }
                Some(TokenKind::Question) if self.tokens.get(cursor + 1).map(|t| t.kind) == Some(TokenKind::Dot) => {
                    let span = self.span(cursor);
                    let name_token = self.expect_identifier(cursor + 2)?;
                    expr = Expr::OptionalMember(Box::new(expr), name_token.lexeme.to_string(), span);
                    cursor += 3;
                }
                Some(TokenKind::Exclamation) => {
                    let span = self.span(cursor);
                    expr = Expr::Unary(UnaryOp::ForceUnwrap, Box::new(expr), span);
                    cursor += 1;
                }
                Some(TokenKind::LeftParen) => {
                    let span = self.span(cursor);
                    let (args, end) = self.parse_args(cursor + 1)?;
                    expr = Expr::Call(Box::new(expr), args, span);
                    cursor = end;
                }
                Some(TokenKind::LeftBracket) => {
                    let span = self.span(cursor);
                    let (index_expr, end) = self.parse(cursor + 1)?;
                    if self.tokens.get(end).map(|t| t.kind) != Some(TokenKind::RightBracket) {
                        return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `]` to close index expression"));
                    }
                    expr = Expr::Index(Box::new(expr), Box::new(index_expr), span);
                    cursor = end + 1;
                }
                Some(TokenKind::As) => {
                    let span = self.span(cursor);
                    if self.tokens.get(cursor + 1).map(|t| t.kind) == Some(TokenKind::Dot) {
                        let name_token = self.expect_identifier(cursor + 2)?;
                        let case_name = name_token.lexeme.to_string();
                        let (bindings, end) = self.parse_variant_bindings(cursor + 3)?;
                        expr = Expr::VariantExtract(Box::new(expr), case_name, bindings, span);
                        cursor = end;
                    } else {
                        let mut type_parser = TypeParser::new(self.tokens, self.namespace);
                        let (ty, end) = type_parser.parse(cursor + 1)?;
                        expr = Expr::Cast(Box::new(expr), ty, span);
                        cursor = end;
                    }
                }
                _ => break,
            }
        }
        Ok((expr, cursor))
    }

    fn parse_variant_bindings(&mut self, start: usize) -> Result<(Vec<String>, usize), ProductionError> {
        if self.tokens.get(start).map(|t| t.kind) != Some(TokenKind::LeftParen) {
            return Ok((Vec::new(), start));
        }
        let mut names = Vec::new();
        let mut cursor = start + 1;
        if self.tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::RightParen) {
            loop {
                names.push(self.expect_identifier(cursor)?.lexeme.to_string());
                cursor += 1;
                match self.tokens.get(cursor).map(|t| t.kind) {
                    Some(TokenKind::Comma) => cursor += 1,
                    Some(TokenKind::RightParen) => break,
                    _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `,` or `)` in variant binding list")),
                }
            }
        }
        Ok((names, cursor + 1))
    }

    fn parse_args(&mut self, start: usize) -> Result<(Vec<Expr>, usize), ProductionError> {
        let mut args = Vec::new();
        let mut cursor = start;
        if self.tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::RightParen) {
            loop {
                let (arg, next) = self.parse(cursor)?;
                args.push(arg);
                cursor = next;
                match self.tokens.get(cursor).map(|t| t.kind) {
                    Some(TokenKind::Comma) => cursor += 1,
                    Some(TokenKind::RightParen) => break,
                    _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `,` or `)` in argument list")),
                }
            }
        }
        Ok((args, cursor + 1))
    }

    fn parse_primary(&mut self, start: usize) -> Result<(Expr, usize), ProductionError> {
        let span = self.span(start);
        let token = self
            .tokens
            .get(start)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected an expression, found end of input"))?;

        match token.kind {
            TokenKind::IntValue => Ok((
                Expr::IntLiteral(token.lexeme.parse().unwrap_or(0), span),
                start + 1,
            )),
            TokenKind::FloatValue => Ok((
                Expr::FloatLiteral(token.lexeme.parse().unwrap_or(0.0), span),
                start + 1,
            )),
            TokenKind::StrValue => Ok((Expr::StrLiteral(unquote(token.lexeme), span), start + 1)),
            TokenKind::CharValue => Ok((
                Expr::CharLiteral(unquote(token.lexeme).chars().next().unwrap_or('\0'), span),
                start + 1,
            )),
            TokenKind::True => Ok((Expr::BoolLiteral(true, span), start + 1)),
            TokenKind::False => Ok((Expr::BoolLiteral(false, span), start + 1)),
            TokenKind::None_ => Ok((Expr::NoneLiteral(span), start + 1)),
            TokenKind::Identifier => Ok((Expr::Identifier(token.lexeme.to_string(), span), start + 1)),
            TokenKind::Dollar => self.parse_interpolated_string(start, span),
            TokenKind::LeftParen => {
                let (inner, end) = self.parse(start + 1)?;
                if self.tokens.get(end).map(|t| t.kind) != Some(TokenKind::RightParen) {
                    return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `)` to close group expression"));
                }
                Ok((Expr::GroupLiteral(vec![inner], span), end + 1))
            }
            TokenKind::LeftBracket => self.parse_array_literal(start, span),
            _ => Err(ProductionError::validation(
                ErrorKind::ErrParsing,
                format!("expected an expression, found {:?}", token.kind),
            )),
        }
    }

    fn parse_array_literal(&mut self, start: usize, span: Span) -> Result<(Expr, usize), ProductionError> {
        let mut items = Vec::new();
        let mut cursor = start + 1;
        if self.tokens.get(cursor).map(|t| t.kind) != Some(TokenKind::RightBracket) {
            loop {
                let (item, next) = self.parse(cursor)?;
                items.push(item);
                cursor = next;
                match self.tokens.get(cursor).map(|t| t.kind) {
                    Some(TokenKind::Comma) => cursor += 1,
                    Some(TokenKind::RightBracket) => break,
                    _ => return Err(ProductionError::validation(ErrorKind::ErrParsing, "expected `,` or `]` in array literal")),
                }
            }
        }
        Ok((Expr::ArrayLiteral(items, span), cursor + 1))
    }

    /// `$"literal {expr} literal"`: the lexer already split the leading `$`
    /// from the quoted body, so this only needs to find `{...}` segments
    /// inside the raw string token and recursively parse each as an
    /// expression.
    fn parse_interpolated_string(&mut self, start: usize, span: Span) -> Result<(Expr, usize), ProductionError> {
        let str_token = self
            .tokens
            .get(start + 1)
            .filter(|t| t.kind == TokenKind::StrValue)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected a string literal after `$`"))?;
        let body = unquote(str_token.lexeme);

        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = body.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c == '{' {
                let mut depth = 1;
                let mut inner = String::new();
                for (_, c2) in chars.by_ref() {
                    if c2 == '{' {
                        depth += 1;
                    } else if c2 == '}' {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    inner.push(c2);
                }
                if !literal.is_empty() {
                    parts.push(InterpolationPart::Literal(std::mem::take(&mut literal)));
                }
                // Embedded expressions are lexed in their own sub-stream so
                // the outer parser never has to splice token indices across
                // the string boundary.
                let embedded = lex_and_parse_embedded(&inner, self.namespace, str_token.file)?;
                parts.push(InterpolationPart::Embedded(embedded));
            } else {
                literal.push(c);
            }
        }
        if !literal.is_empty() {
            parts.push(InterpolationPart::Literal(literal));
        }
        Ok((Expr::InterpolatedStr(parts, span), start + 2))
    }

    fn expect_identifier(&self, index: usize) -> Result<&Token<'src>, ProductionError> {
        self.tokens
            .get(index)
            .filter(|t| t.kind == TokenKind::Identifier)
            .ok_or_else(|| ProductionError::validation(ErrorKind::ErrParsing, "expected an identifier"))
    }

    fn span(&self, index: usize) -> Span {
        self.tokens
            .get(index)
            .map(|t| Span::new(t.file, t.line, t.column))
            .unwrap_or(Span::new(crate::hash::FileHash::NONE, 0, 0))
    }
}

fn unquote(lexeme: &str) -> String {
    lexeme.trim_matches(|c| c == '"' || c == '\'').to_string()
}

fn lex_and_parse_embedded(
    text: &str,
    namespace: &mut Namespace,
    file: crate::hash::FileHash,
) -> Result<Expr, ProductionError> {
    let source = crate::source::SourceCode::new(text);
    let lexer = crate::lexer::Lexer::new(&source, file);
    let tokens = lexer
        .tokenize()
        .map_err(|e| ProductionError::validation(ErrorKind::ErrLex, e.message))?;
    let start = if tokens.first().map(|t| t.kind) == Some(TokenKind::Indent) { 1 } else { 0 };
    let mut parser = ExprParser::new(&tokens, namespace);
    Ok(parser.parse(start)?.0)
}
