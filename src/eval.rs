//! Infix arithmetic evaluator for attribute expressions.
//!
//! Attribute values may contain computed numbers, e.g. `width="100/3"` or
//! `x="(6/2)*4%"`. [`evaluate`] parses and evaluates such an expression and
//! renders the result back as a decimal string, so the attribute resolver can
//! treat it like any literal value.
//!
//! Supported grammar: decimal or integer literals, parenthesized groups, and
//! the binary operators `+ - * / ^`. Precedence is `^` above `*`/`/` above
//! `+`/`-`; operators of the same tier associate left-to-right. An optional
//! trailing `%` marker is stripped before evaluation and reattached to the
//! textual result. Unary minus is not part of the grammar; a dangling
//! operator is a fatal error.

use logos::Logos;

/// Errors from expression evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    #[error("unrecognized symbol in expression {0:?}")]
    Symbol(String),
    #[error("malformed expression {0:?}")]
    Malformed(String),
}

/// Whether a raw attribute string should be routed through the evaluator:
/// it contains an arithmetic operator or starts with an opening bracket.
pub fn is_expression(s: &str) -> bool {
    s.contains(['+', '-', '*', '/', '^']) || s.starts_with('(')
}

#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(skip r"[ \t]+")]
enum Token {
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("^")]
    Caret,
    #[token("(")]
    Open,
    #[token(")")]
    Close,
    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Operator tiers from lowest to highest precedence. The splitter walks this
/// list in order, so the loosest-binding operator becomes the outermost node.
const TIERS: [&[Token]; 3] = [
    &[Token::Plus, Token::Minus],
    &[Token::Star, Token::Slash],
    &[Token::Caret],
];

/// Evaluate an infix arithmetic expression to a rounded decimal string.
///
/// A trailing `%` survives evaluation: `"81/3%"` evaluates to `"27%"`.
pub fn evaluate(expr: &str) -> Result<String, EvalError> {
    let trimmed = expr.trim();
    let (body, percent) = match trimmed.strip_suffix('%') {
        Some(rest) => (rest, true),
        None => (trimmed, false),
    };

    let mut tokens = Vec::new();
    for result in Token::lexer(body) {
        match result {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(EvalError::Symbol(expr.to_owned())),
        }
    }

    let value = eval_tokens(&tokens, expr)?;

    // Round half away from zero, render as an integer.
    let mut rendered = format!("{}", value.round() as i64);
    if percent {
        rendered.push('%');
    }
    Ok(rendered)
}

/// Evaluate a token slice recursively: strip redundant outer brackets, split
/// at the rightmost lowest-tier operator at bracket depth zero (which groups
/// identically to bracketizing leftmost-first), and recurse into both
/// operand slices.
fn eval_tokens(tokens: &[Token], expr: &str) -> Result<f64, EvalError> {
    let tokens = strip_outer_brackets(tokens);

    match tokens {
        [] => return Err(EvalError::Malformed(expr.to_owned())),
        [Token::Number(n)] => return Ok(*n),
        _ => {}
    }

    for tier in TIERS {
        if let Some(split) = rightmost_at_depth_zero(tokens, tier) {
            let left = eval_tokens(&tokens[..split], expr)?;
            let right = eval_tokens(&tokens[split + 1..], expr)?;
            return Ok(apply(tokens[split], left, right));
        }
    }

    Err(EvalError::Malformed(expr.to_owned()))
}

/// While the whole slice is one bracketed group, peel the brackets off.
fn strip_outer_brackets(mut tokens: &[Token]) -> &[Token] {
    while tokens.len() > 2
        && tokens[0] == Token::Open
        && matching_bracket(tokens) == Some(tokens.len() - 1)
    {
        tokens = &tokens[1..tokens.len() - 1];
    }
    tokens
}

/// Index of the bracket matching an opening bracket at index 0.
fn matching_bracket(tokens: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Open => depth += 1,
            Token::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Scan right-to-left for an operator of the given tier that is not enclosed
/// by any bracket. Splitting at the rightmost occurrence keeps same-tier
/// operators left-associative.
fn rightmost_at_depth_zero(tokens: &[Token], tier: &[Token]) -> Option<usize> {
    let mut depth = 0i32;
    for (i, token) in tokens.iter().enumerate().rev() {
        match token {
            Token::Close => depth += 1,
            Token::Open => depth -= 1,
            _ if depth == 0 && tier.contains(token) => return Some(i),
            _ => {}
        }
    }
    None
}

fn apply(op: Token, left: f64, right: f64) -> f64 {
    match op {
        Token::Plus => left + right,
        Token::Minus => left - right,
        Token::Star => left * right,
        Token::Slash => left / right,
        Token::Caret => left.powf(right),
        // The splitter only ever hands operator tokens to `apply`.
        Token::Open | Token::Close | Token::Number(_) => unreachable!(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Precedence and grouping ──────────────────────────────────────

    #[test]
    fn simple_product() {
        assert_eq!(evaluate("3*3").unwrap(), "9");
    }

    #[test]
    fn bracketed_groups() {
        assert_eq!(evaluate("(6/2)*((9+11)-(3*3)+5)").unwrap(), "48");
    }

    #[test]
    fn power_binds_tightest() {
        assert_eq!(evaluate("2*3^2").unwrap(), "18");
        assert_eq!(evaluate("2^3*3").unwrap(), "24");
    }

    #[test]
    fn same_tier_is_left_associative() {
        assert_eq!(evaluate("10-4-3").unwrap(), "3");
        assert_eq!(evaluate("100/5/2").unwrap(), "10");
    }

    #[test]
    fn mixed_decimal_rounding() {
        // 3.1 * (4/3) * 125 = 516.66..., rounded to nearest.
        assert_eq!(evaluate("3.1*(4/3)*5^3").unwrap(), "517");
    }

    #[test]
    fn addition_after_product() {
        assert_eq!(evaluate("1+2*3").unwrap(), "7");
    }

    // ── Percent marker ───────────────────────────────────────────────

    #[test]
    fn percent_suffix_is_reattached() {
        assert_eq!(evaluate("81/3%").unwrap(), "27%");
    }

    #[test]
    fn percent_on_plain_value() {
        assert_eq!(evaluate("50%").unwrap(), "50%");
    }

    // ── Redundant brackets ───────────────────────────────────────────

    #[test]
    fn outer_brackets_stripped() {
        assert_eq!(evaluate("((((7))))").unwrap(), "7");
        assert_eq!(evaluate("(1+2)").unwrap(), "3");
    }

    // ── Errors ───────────────────────────────────────────────────────

    #[test]
    fn dangling_operator_fails() {
        assert!(evaluate("3*").is_err());
        assert!(evaluate("-3").is_err());
    }

    #[test]
    fn garbage_symbol_fails() {
        assert!(evaluate("3*x").is_err());
    }

    #[test]
    fn empty_expression_fails() {
        assert!(evaluate("").is_err());
    }

    // ── is_expression ────────────────────────────────────────────────

    #[test]
    fn expression_detection() {
        assert!(is_expression("3*2"));
        assert!(is_expression("(4)"));
        assert!(!is_expression("42"));
        assert!(!is_expression("50%"));
    }
}
