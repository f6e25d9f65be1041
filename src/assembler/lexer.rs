//! This lexer tokenizes Hack assembly.
//!
//! The lexer is a lazy iterator over the source text. Bad characters do not
//! stop it: each one is reported as an `Err` item and skipped, and lexing
//! carries on with the next character.
use std::fmt;

use regex::Regex;

use super::error::Error;

const SYMBOL_PATTERN: &str = r"^[A-Za-z_.$:][A-Za-z0-9_.$:]*";
const NUMBER_PATTERN: &str = r"^[0-9]+";

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenKind {
    At,
    LParen,
    RParen,
    Equal,
    Semi,
    Plus,
    Minus,
    And,
    Or,
    Not,
    Number,
    Symbol,

    // Register combinations.
    A,
    D,
    M,
    AD,
    AM,
    MD,
    AMD,
    ADM,
    DM,

    // Jump mnemonics.
    JGT,
    JEQ,
    JGE,
    JLT,
    JNE,
    JLE,
    JMP,
}

impl TokenKind {
    /// Returns the reserved token kind spelled by `word`, if there is one.
    pub fn reserved(word: &str) -> Option<TokenKind> {
        use TokenKind::*;
        match word {
            "A" => Some(A),
            "D" => Some(D),
            "M" => Some(M),
            "AD" => Some(AD),
            "AM" => Some(AM),
            "MD" => Some(MD),
            "AMD" => Some(AMD),
            "ADM" => Some(ADM),
            "DM" => Some(DM),
            "JGT" => Some(JGT),
            "JEQ" => Some(JEQ),
            "JGE" => Some(JGE),
            "JLT" => Some(JLT),
            "JNE" => Some(JNE),
            "JLE" => Some(JLE),
            "JMP" => Some(JMP),
            _ => None,
        }
    }

    /// True for the nine register-combination mnemonics usable as a dest.
    pub fn is_register_set(self) -> bool {
        use TokenKind::*;
        matches!(self, A | D | M | AD | AM | MD | AMD | ADM | DM)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: &str, line: usize) -> Self {
        Token { kind, text: text.to_owned(), line }
    }

    /// The integer value of a `Number` token.
    /// Returns None for other kinds, or if the literal overflows a u32.
    pub fn number(&self) -> Option<u32> {
        match self.kind {
            TokenKind::Number => self.text.parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:<7} {:<12} line {}", format!("{:?}", self.kind), self.text, self.line)
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    line: usize,
    symbol: Regex,
    number: Regex,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            source,
            pos: 0,
            line: 1,
            symbol: Regex::new(SYMBOL_PATTERN).expect("symbol pattern is a valid regex"),
            number: Regex::new(NUMBER_PATTERN).expect("number pattern is a valid regex"),
        }
    }

    #[inline]
    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    /// Emits a token of `len` bytes starting at the cursor and advances past it.
    fn emit(&mut self, kind: TokenKind, len: usize) -> Token {
        let text = &self.source[self.pos..self.pos + len];
        self.pos += len;
        Token::new(kind, text, self.line)
    }

    fn skip_comment(&mut self) {
        match self.rest().find('\n') {
            Some(end) => self.pos += end,
            None => self.pos = self.source.len(),
        }
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let c = self.rest().chars().next()?;

            let kind = match c {
                ' ' | '\t' | '\r' => {
                    self.pos += 1;
                    continue;
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    continue;
                }
                '/' if self.rest().starts_with("//") => {
                    self.skip_comment();
                    continue;
                }
                '@' => TokenKind::At,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                '=' => TokenKind::Equal,
                ';' => TokenKind::Semi,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '&' => TokenKind::And,
                '|' => TokenKind::Or,
                '!' => TokenKind::Not,
                _ => {
                    if let Some(m) = self.number.find(self.rest()) {
                        return Some(Ok(self.emit(TokenKind::Number, m.end())));
                    }
                    if let Some(m) = self.symbol.find(self.rest()) {
                        let kind = TokenKind::reserved(m.as_str()).unwrap_or(TokenKind::Symbol);
                        return Some(Ok(self.emit(kind, m.end())));
                    }

                    // Drop exactly the offending character and keep going.
                    self.pos += c.len_utf8();
                    trace!("skipping illegal character {:?} on line {}", c, self.line);
                    return Some(Err(Error::IllegalCharacter { ch: c, line: self.line }));
                }
            };

            return Some(Ok(self.emit(kind, 1)));
        }
    }
}

/// Collects every token of `source`, returning them alongside any lexical errors.
pub fn tokenize(source: &str) -> (Vec<Token>, Vec<Error>) {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Lexer::new(source) {
        match item {
            Ok(tok) => tokens.push(tok),
            Err(e) => errors.push(e),
        }
    }

    (tokens, errors)
}
