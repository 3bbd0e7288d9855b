#[derive(Debug, PartialEq, Clone, Copy)]
pub enum TokenKind {
    Name,
    Number,
    Char,
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_uppercase()
}

fn is_name_continue(c: char) -> bool {
    c.is_ascii_uppercase()
        || c.is_ascii_digit()
        || c == '_'
        || c == '$'
        || c == '#'
        || c == '!'
        || c == '%'
}

/// Minimal scanner for the `#ASM` argument-list grammar. Whitespace
/// separates tokens and is never emitted. There are no error states;
/// malformed input surfaces as an unexpected token at the caller.
pub struct Scanner {
    tokens: Vec<(String, TokenKind)>,
    pos: usize,
}

impl Scanner {
    pub fn new(s: &str) -> Scanner {
        let mut tokens: Vec<(String, TokenKind)> = vec![];
        let mut chars = s.chars().peekable();
        while let Some(pk) = chars.peek().cloned() {
            if pk.is_whitespace() {
                chars.next();
            } else if is_name_start(pk) {
                let mut tok = String::new();
                while let Some(pk) = chars.peek() {
                    if is_name_continue(*pk) {
                        tok.push(*pk);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((tok, TokenKind::Name));
            } else if pk.is_ascii_digit() {
                let mut tok = String::new();
                while let Some(pk) = chars.peek() {
                    if pk.is_ascii_digit() {
                        tok.push(*pk);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((tok, TokenKind::Number));
            } else {
                chars.next();
                tokens.push((pk.to_string(), TokenKind::Char));
            }
        }
        Scanner { tokens, pos: 0 }
    }

    pub fn kind(&self) -> Option<TokenKind> {
        self.tokens.get(self.pos).map(|t| t.1)
    }

    pub fn val(&self) -> Option<&str> {
        self.tokens.get(self.pos).map(|t| t.0.as_str())
    }

    pub fn is_kind(&self, kind: TokenKind) -> bool {
        self.kind() == Some(kind)
    }

    pub fn is_val(&self, val: &str) -> bool {
        self.val() == Some(val)
    }

    /// Consumes and returns the current token's text.
    pub fn take_val(&mut self) -> Option<String> {
        let val = self.tokens.get(self.pos).map(|t| t.0.clone());
        if val.is_some() {
            self.next();
        }
        val
    }

    /// Consumes the current token only if its text matches.
    pub fn accept_val(&mut self, val: &str) -> bool {
        if self.is_val(val) {
            self.next();
            return true;
        }
        false
    }

    pub fn next(&mut self) -> bool {
        if self.pos >= self.tokens.len() {
            return false;
        }
        self.pos += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.pos = 0;
    }
}
