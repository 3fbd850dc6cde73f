//! Tokenizer over the session's input frame.
//!
//! Tokens are classified by longest match over operator punctuation, keyword
//! lookup for identifier shaped words and quote delimited scanning for string
//! literals. Lexical errors are reported as `TokenId::Err` tokens whose text is
//! the message; turning them into positioned errors is the parser's job.

use std::collections::HashMap;

use crate::parser::input::JsInput;
use crate::parser::state::State;
use crate::parser::token::{CondOp, ExprOp, Token, TokenId};

lazy_static! {
    static ref KEYWORDS: HashMap<&'static str, TokenId> = {
        let mut m = HashMap::new();
        m.insert("if", TokenId::If);
        m.insert("else", TokenId::Else);
        m.insert("var", TokenId::Var);
        m.insert("for", TokenId::For);
        m.insert("return", TokenId::Return);
        m
    };
}

fn is_id_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn is_id_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
}

fn op(id: TokenId) -> Token {
    let text = id.to_string();
    Token::new(id, text)
}

fn error(message: impl Into<String>) -> Token {
    Token::new(TokenId::Err, message)
}

impl JsInput {
    /// Return the next token, honouring a pushed back one first.
    ///
    /// `state` is the grammatical position of the caller. It decides whether
    /// a newline is a token or plain white space.
    pub fn get_token(&mut self, state: State) -> Token {
        if let Some(token) = self.putback.take() {
            return token;
        }
        self.lex(state)
    }

    /// Push one token back. Only a single token of lookahead is kept.
    pub fn putback_token(&mut self, token: Token) {
        self.putback = Some(token);
    }

    fn lex(&mut self, state: State) -> Token {
        self.tokbuf.flush();
        loop {
            let c = match self.getc() {
                Some(c) => c,
                None => return Token::eof(),
            };
            return match c {
                b' ' | b'\t' | b'\r' | 0x0b | 0x0c => continue,
                b'\n' => {
                    if state.newline_is_token() {
                        Token::new(TokenId::Newline, "\n")
                    } else {
                        continue;
                    }
                }
                b'/' => match self.peekc() {
                    Some(b'/') => {
                        self.skip_line_comment();
                        continue;
                    }
                    Some(b'*') => {
                        self.getc();
                        if self.skip_block_comment() {
                            continue;
                        }
                        error("Unterminated comment")
                    }
                    _ => op(TokenId::Expr(ExprOp::Div)),
                },
                b'(' => op(TokenId::LParen),
                b')' => op(TokenId::RParen),
                b'{' => op(TokenId::LBrace),
                b'}' => op(TokenId::RBrace),
                b';' => op(TokenId::Semi),
                b',' => op(TokenId::Comma),
                b'*' => op(TokenId::Expr(ExprOp::Mul)),
                b'%' => op(TokenId::Expr(ExprOp::Mod)),
                b'+' => {
                    if self.next_is(b'+') {
                        op(TokenId::IncDec(ExprOp::Inc))
                    } else {
                        op(TokenId::Expr(ExprOp::Plus))
                    }
                }
                b'-' => {
                    if self.next_is(b'-') {
                        op(TokenId::IncDec(ExprOp::Dec))
                    } else {
                        op(TokenId::Expr(ExprOp::Minus))
                    }
                }
                b'<' => {
                    if self.next_is(b'=') {
                        op(TokenId::Expr(ExprOp::LessEq))
                    } else if self.next_is(b'<') {
                        op(TokenId::Expr(ExprOp::LShift))
                    } else {
                        op(TokenId::Expr(ExprOp::Less))
                    }
                }
                b'>' => {
                    if self.next_is(b'=') {
                        op(TokenId::Expr(ExprOp::GreaterEq))
                    } else if self.next_is(b'>') {
                        op(TokenId::Expr(ExprOp::RShift))
                    } else {
                        op(TokenId::Expr(ExprOp::Greater))
                    }
                }
                b'=' => {
                    if self.next_is(b'=') {
                        op(TokenId::Expr(ExprOp::Eq))
                    } else {
                        op(TokenId::Assignment)
                    }
                }
                b'!' => {
                    if self.next_is(b'=') {
                        op(TokenId::Expr(ExprOp::NotEq))
                    } else {
                        op(TokenId::Logical(CondOp::Not))
                    }
                }
                b'&' => {
                    if self.next_is(b'&') {
                        op(TokenId::Logical(CondOp::And))
                    } else {
                        error("Syntax error near '&'")
                    }
                }
                b'|' => {
                    if self.next_is(b'|') {
                        op(TokenId::Logical(CondOp::Or))
                    } else {
                        error("Syntax error near '|'")
                    }
                }
                b'"' | b'\'' => self.lex_string(c),
                b'0'..=b'9' => self.lex_number(c),
                b'.' if matches!(self.peekc(), Some(d) if d.is_ascii_digit()) => self.lex_number(c),
                c if is_id_start(c) => self.lex_identifier(c),
                c => error(format!("Illegal character '{}'", char::from(c).escape_default())),
            };
        }
    }

    fn next_is(&mut self, expected: u8) -> bool {
        if self.peekc() == Some(expected) {
            self.getc();
            true
        } else {
            false
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peekc() {
            if c == b'\n' {
                break;
            }
            self.getc();
        }
    }

    fn skip_block_comment(&mut self) -> bool {
        while let Some(c) = self.getc() {
            if c == b'*' && self.next_is(b'/') {
                return true;
            }
        }
        false
    }

    fn read_hex(&mut self, digits: usize) -> Option<u32> {
        let mut value = 0u32;
        for _ in 0..digits {
            let d = char::from(self.peekc()?).to_digit(16)?;
            self.getc();
            value = value * 16 + d;
        }
        Some(value)
    }

    fn lex_string(&mut self, quote: u8) -> Token {
        loop {
            let c = match self.getc() {
                Some(b'\n') | None => return error("Unterminated string literal"),
                Some(c) => c,
            };
            if c == quote {
                break;
            }
            if c != b'\\' {
                self.tokbuf.put_byte(c);
                continue;
            }
            let escaped = match self.getc() {
                Some(e) => e,
                None => return error("Unterminated string literal"),
            };
            match escaped {
                b'n' => self.tokbuf.put_byte(b'\n'),
                b't' => self.tokbuf.put_byte(b'\t'),
                b'r' => self.tokbuf.put_byte(b'\r'),
                b'b' => self.tokbuf.put_byte(0x08),
                b'f' => self.tokbuf.put_byte(0x0c),
                b'v' => self.tokbuf.put_byte(0x0b),
                b'0' => self.tokbuf.put_byte(0),
                b'x' | b'u' => {
                    let width = if escaped == b'x' { 2 } else { 4 };
                    let ch = match self.read_hex(width).and_then(char::from_u32) {
                        Some(ch) => ch,
                        None => return error("Invalid escape sequence in string literal"),
                    };
                    let mut utf8 = [0u8; 4];
                    self.tokbuf.put_bytes(ch.encode_utf8(&mut utf8).as_bytes());
                }
                other => self.tokbuf.put_byte(other),
            }
        }
        Token::new(TokenId::Literal, self.tokbuf.take_string())
    }

    fn take_digits(&mut self, radix: u32) -> usize {
        let mut count = 0;
        while let Some(d) = self.peekc() {
            if !char::from(d).is_digit(radix) {
                break;
            }
            self.getc();
            self.tokbuf.put_byte(d);
            count += 1;
        }
        count
    }

    fn lex_number(&mut self, first: u8) -> Token {
        self.tokbuf.put_byte(first);
        if first == b'0' && matches!(self.peekc(), Some(b'x') | Some(b'X')) {
            self.getc();
            self.tokbuf.put_byte(b'x');
            if self.take_digits(16) == 0 {
                return error("Invalid hex literal");
            }
        } else {
            if first != b'.' {
                self.take_digits(10);
                if self.next_is(b'.') {
                    self.tokbuf.put_byte(b'.');
                }
            }
            self.take_digits(10);
            if let Some(e @ (b'e' | b'E')) = self.peekc() {
                self.getc();
                self.tokbuf.put_byte(e);
                if let Some(sign @ (b'+' | b'-')) = self.peekc() {
                    self.getc();
                    self.tokbuf.put_byte(sign);
                }
                if self.take_digits(10) == 0 {
                    return error("Invalid exponent in numeric literal");
                }
            }
        }
        if matches!(self.peekc(), Some(c) if is_id_char(c) || c == b'.') {
            return error("Invalid numeric literal");
        }
        Token::new(TokenId::Literal, self.tokbuf.take_string())
    }

    fn lex_identifier(&mut self, first: u8) -> Token {
        self.tokbuf.put_byte(first);
        while let Some(c) = self.peekc() {
            if !is_id_char(c) {
                break;
            }
            self.getc();
            self.tokbuf.put_byte(c);
        }
        let word = self.tokbuf.take_string();
        if let Some(id) = KEYWORDS.get(word.as_str()) {
            return Token::new(*id, word);
        }
        // A name followed by an opening parenthesis is a function call.
        while let Some(b' ' | b'\t' | b'\r') = self.peekc() {
            self.getc();
        }
        if self.peekc() == Some(b'(') {
            Token::new(TokenId::Function, word)
        } else {
            Token::new(TokenId::Id, word)
        }
    }
}
