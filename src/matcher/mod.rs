//! Token-pattern matcher DSL (§4.2).
//!
//! The teacher composes grammar out of `Rc<dyn IProduction>` trait objects
//! (`production/mod.rs`); per this crate's own Design Notes recommendation,
//! the composition here is a tagged union instead — `Matcher` is a closed
//! enum rather than an open trait, which is the right shape once the
//! pattern vocabulary itself is fixed (§1) rather than user-extensible.
//! Every combinator still has the same meaning as the teacher's
//! `matcher/*.hpp` counterparts: each returns the end index of a match
//! starting at a given position, or `None`.

use crate::token::{Token, TokenKind};
use std::rc::Rc;

/// A declarative grammar fragment over a token slice. `Matcher::eval`
/// returns the end index (exclusive) of the match starting at `start`, or
/// `None` if the fragment does not apply there.
#[derive(Clone)]
pub enum Matcher {
    /// Match exactly one token of a given kind.
    Token(TokenKind),
    /// Match exactly one token of any kind (fails only at end of stream).
    Any,
    /// Match the first alternative that succeeds.
    OneOf(Vec<Matcher>),
    /// Match every sub-matcher in order, threading the end index through.
    Sequence(Vec<Matcher>),
    /// Match a sub-matcher between `min` and `max` times (inclusive),
    /// greedily consuming as many repetitions as `max` allows.
    Repeat(Box<Matcher>, usize, usize),
    /// Match a sub-matcher zero or one times; always succeeds.
    Optional(Box<Matcher>),
    /// Succeed, advancing by one token, only if the sub-matcher would fail
    /// at this position.
    Not(Box<Matcher>),
    /// Succeed (consuming nothing) only if `pattern` does NOT match at this
    /// position — a zero-width negative lookahead.
    NotFollowedBy(Box<Matcher>),
    /// Succeed with whatever `pattern` matches at this position, but only if
    /// the immediately preceding token is not of kind `preceding`.
    NotPrecededBy(TokenKind, Box<Matcher>),
    /// Consume tokens one at a time until `terminator` matches, consuming
    /// through (including) the terminator's own match.
    Until(Box<Matcher>),
    /// Consume a balanced-bracket region: `open` and `close` must balance;
    /// returns the index just past the matching `close`.
    Balanced(TokenKind, TokenKind),
    /// Like `Balanced`, but also requires `until` to match starting right
    /// after the close bracket.
    BalancedUntil(TokenKind, TokenKind, Box<Matcher>),
    /// Like `BalancedUntil`, but additionally requires everything between
    /// the brackets to satisfy `inner` before accepting the region.
    BalancedValidUntil(TokenKind, TokenKind, Box<Matcher>, Box<Matcher>),
    /// Escape hatch for matchers expressible only as code (used sparingly,
    /// e.g. the definition-signature dispatch in §4.3).
    Predicate(Rc<dyn Fn(&[Token], usize) -> Option<usize>>),
}

impl Matcher {
    pub fn token(kind: TokenKind) -> Self {
        Matcher::Token(kind)
    }
    pub fn any() -> Self {
        Matcher::Any
    }
    pub fn one_of(alternatives: Vec<Matcher>) -> Self {
        Matcher::OneOf(alternatives)
    }
    pub fn sequence(parts: Vec<Matcher>) -> Self {
        Matcher::Sequence(parts)
    }
    /// Zero or more repetitions (the common case — shared/immutable prefix
    /// keywords, repeated entity links, and the like all tolerate none).
    pub fn repeat(inner: Matcher) -> Self {
        Matcher::Repeat(Box::new(inner), 0, usize::MAX)
    }
    /// One or more repetitions.
    pub fn one_or_more(inner: Matcher) -> Self {
        Matcher::Repeat(Box::new(inner), 1, usize::MAX)
    }
    /// Between `min` and `max` repetitions, inclusive.
    pub fn repeat_range(inner: Matcher, min: usize, max: usize) -> Self {
        Matcher::Repeat(Box::new(inner), min, max)
    }
    pub fn optional(inner: Matcher) -> Self {
        Matcher::Optional(Box::new(inner))
    }
    pub fn not(inner: Matcher) -> Self {
        Matcher::Not(Box::new(inner))
    }
    /// A zero-width negative lookahead: succeeds at `start` without
    /// consuming anything, only if `pattern` does not match there.
    pub fn not_followed_by(pattern: Matcher) -> Self {
        Matcher::NotFollowedBy(Box::new(pattern))
    }
    pub fn not_preceded_by(preceding: TokenKind, pattern: Matcher) -> Self {
        Matcher::NotPrecededBy(preceding, Box::new(pattern))
    }
    pub fn until(terminator: Matcher) -> Self {
        Matcher::Until(Box::new(terminator))
    }
    pub fn balanced(open: TokenKind, close: TokenKind) -> Self {
        Matcher::Balanced(open, close)
    }
    pub fn balanced_until(open: TokenKind, close: TokenKind, until: Matcher) -> Self {
        Matcher::BalancedUntil(open, close, Box::new(until))
    }
    pub fn balanced_valid_until(
        open: TokenKind,
        close: TokenKind,
        inner: Matcher,
        until: Matcher,
    ) -> Self {
        Matcher::BalancedValidUntil(open, close, Box::new(inner), Box::new(until))
    }

    /// Evaluate this matcher against `tokens` starting at `start`, returning
    /// the exclusive end index on success.
    pub fn eval(&self, tokens: &[Token], start: usize) -> Option<usize> {
        match self {
            Matcher::Token(kind) => {
                let t = tokens.get(start)?;
                (t.kind == *kind).then_some(start + 1)
            }
            Matcher::Any => (start < tokens.len()).then_some(start + 1),
            Matcher::OneOf(alternatives) => alternatives.iter().find_map(|m| m.eval(tokens, start)),
            Matcher::Sequence(parts) => {
                let mut cursor = start;
                for part in parts {
                    cursor = part.eval(tokens, cursor)?;
                }
                Some(cursor)
            }
            Matcher::Repeat(inner, min, max) => {
                let mut cursor = start;
                let mut count = 0usize;
                while count < *max && cursor < tokens.len() {
                    match inner.eval(tokens, cursor) {
                        Some(next) => {
                            cursor = next;
                            count += 1;
                        }
                        None => break,
                    }
                }
                (count >= *min).then_some(cursor)
            }
            Matcher::Optional(inner) => Some(inner.eval(tokens, start).unwrap_or(start)),
            Matcher::Not(inner) => inner.eval(tokens, start).is_none().then_some(start + 1),
            Matcher::NotFollowedBy(pattern) => pattern.eval(tokens, start).is_none().then_some(start),
            Matcher::NotPrecededBy(preceding, pattern) => {
                if start > 0 && tokens.get(start - 1).map(|t| t.kind) == Some(*preceding) {
                    return None;
                }
                pattern.eval(tokens, start)
            }
            Matcher::Until(terminator) => {
                let mut cursor = start;
                while cursor < tokens.len() {
                    if let Some(end) = terminator.eval(tokens, cursor) {
                        return Some(end);
                    }
                    cursor += 1;
                }
                None
            }
            Matcher::Balanced(open, close) => balanced_range(tokens, start, *open, *close).map(|(_, end)| end),
            Matcher::BalancedUntil(open, close, until) => {
                let (_, end) = balanced_range(tokens, start, *open, *close)?;
                until.eval(tokens, end)
            }
            Matcher::BalancedValidUntil(open, close, inner, until) => {
                let (inner_start, end) = balanced_range(tokens, start, *open, *close)?;
                inner.eval(tokens, inner_start)?;
                until.eval(tokens, end)
            }
            Matcher::Predicate(f) => f(tokens, start),
        }
    }
}

/// Scan forward from `start` (expected to sit on `open`) for the matching
/// `close`, honoring nesting. Returns `(inner_start, end)` where `inner_start`
/// is the index right after `open` and `end` is right after the matching
/// `close`.
fn balanced_range(
    tokens: &[Token],
    start: usize,
    open: TokenKind,
    close: TokenKind,
) -> Option<(usize, usize)> {
    if tokens.get(start)?.kind != open {
        return None;
    }
    let mut depth = 1i32;
    let mut cursor = start + 1;
    let inner_start = cursor;
    while cursor < tokens.len() {
        let kind = tokens[cursor].kind;
        if kind == open {
            depth += 1;
        } else if kind == close {
            depth -= 1;
            if depth == 0 {
                return Some((inner_start, cursor + 1));
            }
        }
        cursor += 1;
    }
    None
}

/// Find the single balanced range spanned by an `inc` pattern (e.g. an open
/// bracket) and its matching `dec` pattern (e.g. a close bracket), returning
/// `(first_inc_start, last_dec_end)` — the open token's own index through
/// the index just past the token that brings the nesting back to zero.
/// Ported from `original_source/src/matcher.cpp`'s `balanced_range_extraction`:
/// walk every `inc`/`dec` occurrence in source order, tracking nesting depth
/// as a nondecreasing/decreasing counter rather than re-scanning token by
/// token, so unrelated `inc`/`dec` pairs elsewhere in the slice don't throw
/// off the count.
pub fn balanced_range_extraction(tokens: &[Token], inc: &Matcher, dec: &Matcher) -> Option<(usize, usize)> {
    let inc_ranges = get_match_ranges(inc, tokens);
    let dec_ranges = get_match_ranges(dec, tokens);
    if inc_ranges.is_empty() || dec_ranges.is_empty() {
        return None;
    }

    if inc_ranges.len() == 1 && dec_ranges.len() == 1 && inc_ranges[0].0 < dec_ranges[0].0 {
        return Some((inc_ranges[0].0, dec_ranges[0].1));
    }

    let first_idx = inc_ranges[0].0;
    let mut inc_i = 1usize;
    let mut dec_i = 0usize;
    let mut balance: i64 = 1;
    let mut last_idx = 0usize;

    loop {
        let take_inc = inc_i < inc_ranges.len() && (dec_i >= dec_ranges.len() || inc_ranges[inc_i].0 < dec_ranges[dec_i].0);
        if take_inc {
            balance += 1;
            inc_i += 1;
        } else if dec_i < dec_ranges.len() {
            balance -= 1;
            last_idx = dec_ranges[dec_i].1;
            dec_i += 1;
            if balance == 0 {
                break;
            }
        }
        if inc_i >= inc_ranges.len() && dec_i >= dec_ranges.len() {
            break;
        }
    }

    (balance == 0).then_some((first_idx, last_idx))
}

/// Every top-level balanced `(first_inc_start, last_dec_end)` range found by
/// repeatedly applying [`balanced_range_extraction`] and then continuing the
/// search past each region found — used by list-like grammar rules (function
/// arguments, array literals) that need every bracketed group in a sequence,
/// not just the first.
pub fn balanced_range_extraction_vec(tokens: &[Token], inc: &Matcher, dec: &Matcher) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut removed = 0usize;
    let mut remaining = tokens;
    while !remaining.is_empty() {
        let Some((start, end)) = balanced_range_extraction(remaining, inc, dec) else { break };
        ranges.push((start + removed, end + removed));
        remaining = &remaining[end..];
        removed += end;
    }
    ranges
}

/// Whether `tokens[start..]` matches `matcher` exactly up to some `end`,
/// returning that end index.
pub fn tokens_match(matcher: &Matcher, tokens: &[Token], start: usize) -> Option<usize> {
    matcher.eval(tokens, start)
}

/// Whether `matcher` matches anywhere in `tokens`.
pub fn tokens_contain(matcher: &Matcher, tokens: &[Token]) -> bool {
    (0..tokens.len()).any(|i| matcher.eval(tokens, i).is_some())
}

/// All non-overlapping match ranges of `matcher` found by scanning left to
/// right and skipping past each match found.
pub fn get_match_ranges(matcher: &Matcher, tokens: &[Token]) -> Vec<(usize, usize)> {
    let mut ranges = Vec::new();
    let mut cursor = 0;
    while cursor < tokens.len() {
        if let Some(end) = matcher.eval(tokens, cursor) {
            if end > cursor {
                ranges.push((cursor, end));
                cursor = end;
                continue;
            }
        }
        cursor += 1;
    }
    ranges
}

/// Count the number of consecutive `Indent` tokens' worth of leading depth
/// starting at `start` (a line in this grammar contributes exactly one
/// `Indent` token whose lexeme already encodes its depth as a decimal
/// string — see `lexer::Lexer::tokenize_line`), returning that depth and the
/// index right after the `Indent` token.
pub fn get_leading_indents(tokens: &[Token], start: usize) -> Option<(usize, usize)> {
    let token = tokens.get(start)?;
    if token.kind != TokenKind::Indent {
        return None;
    }
    let depth = token.lexeme.len();
    Some((depth, start + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::FileHash;
    use crate::source::Position;

    fn tok(kind: TokenKind) -> Token<'static> {
        Token::new(kind, "", FileHash::NONE, Position::new(1, 1))
    }

    #[test]
    fn sequence_requires_every_part_in_order() {
        let tokens = vec![tok(TokenKind::Def), tok(TokenKind::Identifier), tok(TokenKind::LeftParen)];
        let m = Matcher::sequence(vec![
            Matcher::token(TokenKind::Def),
            Matcher::token(TokenKind::Identifier),
            Matcher::token(TokenKind::LeftParen),
        ]);
        assert_eq!(m.eval(&tokens, 0), Some(3));
    }

    #[test]
    fn balanced_matches_nested_pairs() {
        let tokens = vec![
            tok(TokenKind::LeftParen),
            tok(TokenKind::LeftParen),
            tok(TokenKind::RightParen),
            tok(TokenKind::RightParen),
        ];
        let m = Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen);
        assert_eq!(m.eval(&tokens, 0), Some(4));
    }

    #[test]
    fn balanced_rejects_unbalanced_input() {
        let tokens = vec![tok(TokenKind::LeftParen), tok(TokenKind::LeftParen), tok(TokenKind::RightParen)];
        let m = Matcher::balanced(TokenKind::LeftParen, TokenKind::RightParen);
        assert_eq!(m.eval(&tokens, 0), None);
    }

    #[test]
    fn not_followed_by_is_a_zero_width_negative_lookahead() {
        let tokens = vec![tok(TokenKind::LeftParen)];
        let m = Matcher::not_followed_by(Matcher::token(TokenKind::LeftParen));
        assert_eq!(m.eval(&tokens, 0), None);
        assert_eq!(m.eval(&tokens, 1), Some(1));
    }

    #[test]
    fn not_preceded_by_rejects_only_when_the_preceding_token_matches() {
        let tokens = vec![tok(TokenKind::Dot), tok(TokenKind::Identifier)];
        let m = Matcher::not_preceded_by(TokenKind::Dot, Matcher::token(TokenKind::Identifier));
        assert_eq!(m.eval(&tokens, 1), None);
        assert_eq!(m.eval(&tokens, 0), None, "start 0 looks at a `Dot` token, not a preceding one");

        let unprefixed = vec![tok(TokenKind::Identifier)];
        assert_eq!(m.eval(&unprefixed, 0), Some(1));
    }

    #[test]
    fn not_advances_by_one_token_on_success() {
        let tokens = vec![tok(TokenKind::Identifier)];
        let m = Matcher::not(Matcher::token(TokenKind::Comma));
        assert_eq!(m.eval(&tokens, 0), Some(1));
    }

    #[test]
    fn until_consumes_through_the_terminator() {
        let tokens = vec![tok(TokenKind::Identifier), tok(TokenKind::Comma), tok(TokenKind::Identifier)];
        let m = Matcher::until(Matcher::token(TokenKind::Comma));
        assert_eq!(m.eval(&tokens, 0), Some(2));
    }

    #[test]
    fn repeat_requires_at_least_min_matches() {
        let tokens = vec![tok(TokenKind::Comma)];
        let one_or_more = Matcher::one_or_more(Matcher::token(TokenKind::Comma));
        assert_eq!(one_or_more.eval(&tokens, 0), Some(1));

        let empty: Vec<Token> = Vec::new();
        assert_eq!(one_or_more.eval(&empty, 0), None);
    }

    #[test]
    fn repeat_stops_at_max_matches() {
        let tokens = vec![tok(TokenKind::Comma), tok(TokenKind::Comma), tok(TokenKind::Comma)];
        let m = Matcher::repeat_range(Matcher::token(TokenKind::Comma), 0, 2);
        assert_eq!(m.eval(&tokens, 0), Some(2));
    }

    #[test]
    fn balanced_range_extraction_finds_the_simple_region() {
        let tokens = vec![
            tok(TokenKind::Identifier),
            tok(TokenKind::ColonEqual),
            tok(TokenKind::Identifier),
            tok(TokenKind::LeftParen),
            tok(TokenKind::RightParen),
        ];
        let inc = Matcher::token(TokenKind::LeftParen);
        let dec = Matcher::token(TokenKind::RightParen);
        assert_eq!(balanced_range_extraction(&tokens, &inc, &dec), Some((3, 5)));
    }

    #[test]
    fn balanced_range_extraction_vec_finds_the_nested_region() {
        // IDENT := IDENT ( IDENT ( ) )
        let tokens = vec![
            tok(TokenKind::Identifier),
            tok(TokenKind::ColonEqual),
            tok(TokenKind::Identifier),
            tok(TokenKind::LeftParen),
            tok(TokenKind::Identifier),
            tok(TokenKind::LeftParen),
            tok(TokenKind::RightParen),
            tok(TokenKind::RightParen),
        ];
        let inc = Matcher::token(TokenKind::LeftParen);
        let dec = Matcher::token(TokenKind::RightParen);
        assert_eq!(balanced_range_extraction_vec(&tokens, &inc, &dec), vec![(3, 8)]);
    }
}
