//! Python string-literal machinery for the quote pass: splitting a literal
//! into prefix/quote/body, decoding escape sequences into code points, and
//! re-rendering a value as a quote-preferring `repr`.
//!
//! Values are carried as `u32` code points rather than `char` because Python
//! string literals can contain lone surrogates (`"\ud83d"`), which must
//! round-trip as escape sequences rather than producing invalid text.

/// A literal split into its syntactic parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringParts<'a> {
    /// Prefix letters before the opening quote (`f`, `r`, `b`, `rb`, ...).
    pub prefix: &'a str,
    /// The quote characters: `'`, `"`, `'''` or `"""`.
    pub quote: &'a str,
    /// The raw (still escaped) text between the quotes.
    pub body: &'a str,
}

/// Split the source text of a string literal. Returns `None` for text that
/// does not look like a complete literal.
pub fn split_literal(literal: &str) -> Option<StringParts<'_>> {
    let quote_at = literal.find(['\'', '"'])?;
    let (prefix, rest) = literal.split_at(quote_at);
    if prefix.chars().any(|c| !c.is_ascii_alphabetic()) {
        return None;
    }

    let quote_char = rest.as_bytes()[0];
    let quote_len = if rest.len() >= 6 && rest.as_bytes()[1] == quote_char && rest.as_bytes()[2] == quote_char {
        3
    } else {
        1
    };
    let quote = &rest[..quote_len];
    let after = &rest[quote_len..];
    let body = after.strip_suffix(quote)?;
    Some(StringParts {
        prefix,
        quote,
        body,
    })
}

/// Decode a non-raw literal body into code points.
///
/// Returns `None` for escapes this pass does not model (`\N{...}` named
/// characters, truncated escapes): the caller leaves such literals alone.
pub fn decode(body: &str) -> Option<Vec<u32>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c as u32);
            continue;
        }

        let escape = chars.next()?;
        match escape {
            '\n' => {} // line continuation
            '\\' => out.push(0x5C),
            '\'' => out.push(0x27),
            '"' => out.push(0x22),
            'a' => out.push(0x07),
            'b' => out.push(0x08),
            'f' => out.push(0x0C),
            'n' => out.push(0x0A),
            'r' => out.push(0x0D),
            't' => out.push(0x09),
            'v' => out.push(0x0B),
            '0'..='7' => {
                let mut value = escape.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match chars.clone().next().and_then(|d| d.to_digit(8)) {
                        Some(digit) => {
                            chars.next();
                            value = value * 8 + digit;
                        }
                        None => break,
                    }
                }
                out.push(value);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => {
                let value = hex_escape(&mut chars, 8)?;
                if value > 0x10FFFF {
                    return None;
                }
                out.push(value);
            }
            // \N{SNOWMAN} needs the unicode name table; leave such literals alone.
            'N' => return None,
            // Python keeps unrecognized escapes literally.
            other => {
                out.push(0x5C);
                out.push(other as u32);
            }
        }
    }

    Some(out)
}

fn hex_escape(chars: &mut std::str::Chars<'_>, digits: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..digits {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    Some(value)
}

fn is_surrogate(cp: u32) -> bool {
    (0xD800..=0xDFFF).contains(&cp)
}

fn render(code_points: &[u32], preferred: char, fallback: char) -> String {
    let has_preferred = code_points.iter().any(|&cp| cp == preferred as u32);
    let has_fallback = code_points.iter().any(|&cp| cp == fallback as u32);
    let quote = if has_preferred && !has_fallback {
        fallback
    } else {
        preferred
    };

    let mut out = String::with_capacity(code_points.len() + 2);
    out.push(quote);
    for &cp in code_points {
        if cp == quote as u32 {
            out.push('\\');
            out.push(quote);
        } else if cp == 0x5C {
            out.push_str("\\\\");
        } else if cp == 0x0A {
            out.push_str("\\n");
        } else if cp == 0x0D {
            out.push_str("\\r");
        } else if cp == 0x09 {
            out.push_str("\\t");
        } else if is_surrogate(cp) {
            out.push_str(&format!("\\u{cp:04x}"));
        } else {
            match char::from_u32(cp) {
                Some(c) if !c.is_control() => out.push(c),
                _ => {
                    if cp < 0x100 {
                        out.push_str(&format!("\\x{cp:02x}"));
                    } else if cp < 0x10000 {
                        out.push_str(&format!("\\u{cp:04x}"));
                    } else {
                        out.push_str(&format!("\\U{cp:08x}"));
                    }
                }
            }
        }
    }
    out.push(quote);
    out
}

/// CPython-style `repr`: single quotes unless the value contains `'` but no `"`.
pub fn repr_single(code_points: &[u32]) -> String {
    render(code_points, '\'', '"')
}

/// Mirror of [`repr_single`] preferring double quotes: `"` unless the value
/// contains `"` but no `'`.
pub fn repr_double(code_points: &[u32]) -> String {
    render(code_points, '"', '\'')
}
