use crate::error::SyntaxError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifiers and keywords -- distinguished in the parser
    Word(String),
    /// Dotted attribute path; the root is the first segment
    Path(Vec<String>),
    /// Quoted string literal (content without quotes; no escapes)
    Str(String),
    /// Integer literal
    Int(i64),
    /// Decimal literal -- kept as string to preserve exact representation
    Float(String),
    // Comparison operators
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    // Punctuation
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    // End of input
    Eof,
}

impl Token {
    /// Source-ish rendering for "unexpected token" messages.
    pub fn describe(&self) -> String {
        match self {
            Token::Word(w) => format!("'{}'", w),
            Token::Path(p) => format!("'{}'", p.join(".")),
            Token::Str(s) => format!("\"{}\"", s),
            Token::Int(n) => format!("'{}'", n),
            Token::Float(s) => format!("'{}'", s),
            Token::Eq => "'=='".to_owned(),
            Token::Neq => "'!='".to_owned(),
            Token::Lt => "'<'".to_owned(),
            Token::Lte => "'<='".to_owned(),
            Token::Gt => "'>'".to_owned(),
            Token::Gte => "'>='".to_owned(),
            Token::LParen => "'('".to_owned(),
            Token::RParen => "')'".to_owned(),
            Token::LBracket => "'['".to_owned(),
            Token::RBracket => "']'".to_owned(),
            Token::Comma => "','".to_owned(),
            Token::Eof => "end of expression".to_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    /// Character offset of the token start within the expression string.
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Tokenize a permission expression.
///
/// Whitespace is insignificant outside string literals. Every failure
/// carries the exact character offset of the offending input; invalid
/// characters are never silently skipped.
pub fn lex(src: &str) -> Result<Vec<Spanned>, SyntaxError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;

    while pos < chars.len() {
        let c = chars[pos];

        // Whitespace
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;

        // String literal, no escape processing, runs to the closing quote
        if c == '"' {
            pos += 1;
            let mut s = String::new();
            loop {
                if pos >= chars.len() {
                    return Err(SyntaxError::at("Unterminated string literal", start));
                }
                let sc = chars[pos];
                if sc == '"' {
                    pos += 1;
                    break;
                }
                s.push(sc);
                pos += 1;
            }
            tokens.push(Spanned {
                token: Token::Str(s),
                offset: start,
            });
            continue;
        }

        // Number (optional leading '-', optional decimal part)
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            if pos < chars.len()
                && chars[pos] == '.'
                && pos + 1 < chars.len()
                && chars[pos + 1].is_ascii_digit()
            {
                pos += 1; // consume '.'
                while pos < chars.len() && chars[pos].is_ascii_digit() {
                    pos += 1;
                }
                let s: String = chars[start..pos].iter().collect();
                tokens.push(Spanned {
                    token: Token::Float(s),
                    offset: start,
                });
            } else {
                let s: String = chars[start..pos].iter().collect();
                let n: i64 = s.parse().map_err(|_| {
                    SyntaxError::at(format!("Invalid integer literal '{}'", s), start)
                })?;
                tokens.push(Spanned {
                    token: Token::Int(n),
                    offset: start,
                });
            }
            continue;
        }

        // Operators and punctuation
        match c {
            '=' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Eq,
                        offset: start,
                    });
                    pos += 2;
                    continue;
                }
                return Err(SyntaxError::at("Invalid character '='", start));
            }
            '!' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Neq,
                        offset: start,
                    });
                    pos += 2;
                    continue;
                }
                return Err(SyntaxError::at("Invalid character '!'", start));
            }
            '<' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Lte,
                        offset: start,
                    });
                    pos += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Lt,
                        offset: start,
                    });
                    pos += 1;
                }
                continue;
            }
            '>' => {
                if pos + 1 < chars.len() && chars[pos + 1] == '=' {
                    tokens.push(Spanned {
                        token: Token::Gte,
                        offset: start,
                    });
                    pos += 2;
                } else {
                    tokens.push(Spanned {
                        token: Token::Gt,
                        offset: start,
                    });
                    pos += 1;
                }
                continue;
            }
            '(' => {
                tokens.push(Spanned {
                    token: Token::LParen,
                    offset: start,
                });
                pos += 1;
                continue;
            }
            ')' => {
                tokens.push(Spanned {
                    token: Token::RParen,
                    offset: start,
                });
                pos += 1;
                continue;
            }
            '[' => {
                tokens.push(Spanned {
                    token: Token::LBracket,
                    offset: start,
                });
                pos += 1;
                continue;
            }
            ']' => {
                tokens.push(Spanned {
                    token: Token::RBracket,
                    offset: start,
                });
                pos += 1;
                continue;
            }
            ',' => {
                tokens.push(Spanned {
                    token: Token::Comma,
                    offset: start,
                });
                pos += 1;
                continue;
            }
            _ => {}
        }

        // Identifier or dotted path. Dotted access is part of tokenization:
        // `obj.author.id` is one Path token, not three words.
        if is_ident_start(c) {
            let mut segments = Vec::new();
            loop {
                let seg_start = pos;
                while pos < chars.len() && is_ident_continue(chars[pos]) {
                    pos += 1;
                }
                segments.push(chars[seg_start..pos].iter().collect::<String>());
                if pos < chars.len() && chars[pos] == '.' {
                    if pos + 1 < chars.len() && is_ident_start(chars[pos + 1]) {
                        pos += 1; // consume '.'
                        continue;
                    }
                    return Err(SyntaxError::at("Expected attribute name after '.'", pos));
                }
                break;
            }
            let token = if segments.len() == 1 {
                Token::Word(segments.pop().unwrap())
            } else {
                Token::Path(segments)
            };
            tokens.push(Spanned {
                token,
                offset: start,
            });
            continue;
        }

        return Err(SyntaxError::at(
            format!("Invalid character '{}'", c),
            start,
        ));
    }

    tokens.push(Spanned {
        token: Token::Eof,
        offset: chars.len(),
    });
    Ok(tokens)
}
