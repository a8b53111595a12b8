//! C# literal text → values.
//!
//! Attribute arguments and call arguments are kept as raw expression text in
//! the IR; these helpers read the simple literal forms out of them.

/// Read a string literal: regular (`"a\"b"`), verbatim (`@"a""b"`), raw
/// (`"""a"""`) or `nameof(X)`. Interpolated strings are returned with their
/// holes intact. Anything else is `None`.
pub fn string_literal(text: &str) -> Option<String> {
    let text = text.trim();

    if let Some(inner) = text
        .strip_prefix("nameof(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let inner = inner.trim();
        let last = inner.rsplit('.').next().unwrap_or(inner);
        return Some(last.to_string());
    }

    let text = text.trim_start_matches('$');

    if let Some(rest) = text.strip_prefix('@') {
        let rest = rest.trim_start_matches('$');
        let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
        return Some(inner.replace("\"\"", "\""));
    }

    if text.len() >= 6 && text.starts_with("\"\"\"") && text.ends_with("\"\"\"") {
        return Some(text[3..text.len() - 3].trim().to_string());
    }

    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    Some(unescape(inner))
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Read a numeric literal, tolerating type suffixes (`10m`, `5L`, `1.5f`),
/// digit separators and hex.
pub fn number_literal(text: &str) -> Option<f64> {
    let text = text.trim().replace('_', "");
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest.trim()),
        None => (false, text.as_str()),
    };

    let value = if let Some(hex) = body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        let hex = hex.trim_end_matches(['u', 'U', 'l', 'L']);
        i64::from_str_radix(hex, 16).ok()? as f64
    } else {
        let digits = body.trim_end_matches(['m', 'M', 'd', 'D', 'f', 'F', 'u', 'U', 'l', 'L']);
        digits.parse::<f64>().ok()?
    };

    Some(if negative { -value } else { value })
}

/// Read an integer literal, also accepting simple shifts (`1 << 3`).
pub fn integer_literal(text: &str) -> Option<i64> {
    if let Some((lhs, rhs)) = text.split_once("<<") {
        let lhs = integer_literal(lhs)?;
        let rhs = integer_literal(rhs)?;
        return lhs.checked_shl(u32::try_from(rhs).ok()?);
    }
    let value = number_literal(text)?;
    if value.fract() == 0.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Evaluate a constant integer expression of the kind found in enum member
/// initializers. Names (`Read`, `Perm.Read`) go through `lookup`. Supports
/// parentheses, casts like `(int)`, unary `-` and `~`, and the binary
/// operators with C# precedence. `None` when any part does not resolve.
pub fn integer_expression(text: &str, lookup: impl Fn(&str) -> Option<i64>) -> Option<i64> {
    let tokens = tokenize(text)?;
    let mut parser = ConstParser {
        tokens: &tokens,
        pos: 0,
        lookup: &lookup,
    };
    let value = parser.binary(1)?;
    (parser.pos == tokens.len()).then_some(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Number(i64),
    Name(&'a str),
    Op(&'a str),
    Open,
    Close,
}

fn tokenize(text: &str) -> Option<Vec<Token<'_>>> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let start = i;
        if b.is_ascii_whitespace() {
            i += 1;
            continue;
        }
        if b.is_ascii_digit() {
            while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            tokens.push(Token::Number(integer_token(&text[start..i])?));
        } else if b.is_ascii_alphabetic() || b == b'_' || b == b'@' {
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || matches!(bytes[i], b'_' | b'.' | b'@'))
            {
                i += 1;
            }
            tokens.push(Token::Name(&text[start..i]));
        } else if text[i..].starts_with("<<") || text[i..].starts_with(">>") {
            i += 2;
            tokens.push(Token::Op(&text[start..i]));
        } else if b"|^&+-*~".contains(&b) {
            i += 1;
            tokens.push(Token::Op(&text[start..i]));
        } else if b == b'(' {
            i += 1;
            tokens.push(Token::Open);
        } else if b == b')' {
            i += 1;
            tokens.push(Token::Close);
        } else {
            return None;
        }
    }
    Some(tokens)
}

fn integer_token(text: &str) -> Option<i64> {
    match text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        Some(bits) => i64::from_str_radix(&bits.replace('_', ""), 2).ok(),
        None => integer_literal(text),
    }
}

fn precedence(op: &str) -> Option<u8> {
    Some(match op {
        "|" => 1,
        "^" => 2,
        "&" => 3,
        "<<" | ">>" => 4,
        "+" | "-" => 5,
        "*" => 6,
        _ => return None,
    })
}

struct ConstParser<'t, 'a, F> {
    tokens: &'t [Token<'a>],
    pos: usize,
    lookup: &'t F,
}

impl<'a, F: Fn(&str) -> Option<i64>> ConstParser<'_, 'a, F> {
    fn peek(&self, offset: usize) -> Option<Token<'a>> {
        self.tokens.get(self.pos + offset).copied()
    }

    fn binary(&mut self, min: u8) -> Option<i64> {
        let mut lhs = self.unary()?;
        while let Some(Token::Op(op)) = self.peek(0) {
            let Some(prec) = precedence(op).filter(|p| *p >= min) else {
                break;
            };
            self.pos += 1;
            let rhs = self.binary(prec + 1)?;
            lhs = match op {
                "|" => lhs | rhs,
                "^" => lhs ^ rhs,
                "&" => lhs & rhs,
                "<<" => lhs.checked_shl(u32::try_from(rhs).ok()?)?,
                ">>" => lhs.checked_shr(u32::try_from(rhs).ok()?)?,
                "+" => lhs.checked_add(rhs)?,
                "-" => lhs.checked_sub(rhs)?,
                _ => lhs.checked_mul(rhs)?,
            };
        }
        Some(lhs)
    }

    fn unary(&mut self) -> Option<i64> {
        let token = self.peek(0)?;
        self.pos += 1;
        match token {
            Token::Number(n) => Some(n),
            Token::Name(name) => (self.lookup)(name),
            Token::Op("-") => self.unary()?.checked_neg(),
            Token::Op("~") => Some(!self.unary()?),
            Token::Op("+") => self.unary(),
            Token::Open => {
                // `(int)Value`
                let cast = matches!(
                    (self.peek(0), self.peek(1), self.peek(2)),
                    (
                        Some(Token::Name(_)),
                        Some(Token::Close),
                        Some(Token::Number(_) | Token::Name(_) | Token::Open | Token::Op("~"))
                    )
                );
                if cast {
                    self.pos += 2;
                    return self.unary();
                }
                let value = self.binary(1)?;
                match self.peek(0) {
                    Some(Token::Close) => {
                        self.pos += 1;
                        Some(value)
                    }
                    _ => None,
                }
            }
            _ => None,
        }
    }
}

/// Read `true` / `false`.
pub fn bool_literal(text: &str) -> Option<bool> {
    match text.trim() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// Read a string list: a single string, or an array/collection expression of
/// strings (`new[] { "a", "b" }`, `["a", "b"]`). Comma-separated single strings
/// are split as well.
pub fn string_list(text: &str) -> Vec<String> {
    let text = text.trim();
    if let Some(single) = string_literal(text) {
        return single
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
    }
    let Some(open) = text.find('{').or_else(|| text.find('[')) else {
        return Vec::new();
    };
    let close = text.rfind(['}', ']']).unwrap_or(text.len());
    if close <= open {
        return Vec::new();
    }
    crate::typestr::split_generic_args(&text[open + 1..close])
        .into_iter()
        .filter_map(string_literal)
        .collect()
}
