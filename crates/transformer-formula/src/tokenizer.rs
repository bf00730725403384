//! Formula tokenizer
//!
//! Lexes an Excel-style formula string into a flat sequence of typed tokens.
//! Whitespace between tokens is insignificant and a single leading `=` is
//! optional, so `"=1+2"` and `"1 + 2"` produce the same tokens.

use crate::error::{FormulaError, FormulaResult};
use lazy_regex::regex_is_match;
use std::fmt;

/// Token type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Literal value
    Operand,
    /// Reference-like literal (`A1`, `A1:B2`, `Sheet1!A1`, `1:3`)
    Range,
    /// Function call opening, `NAME(`
    Function,
    /// Unary operator written before its operand (`-`, `+`)
    OperatorPrefix,
    /// Binary operator
    OperatorInfix,
    /// Unary operator written after its operand (`%`)
    OperatorPostfix,
    OpenParen,
    CloseParen,
    /// Argument separator `,`
    Separator,
}

/// Token subtype, carried by operand and range tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenSubtype {
    Number,
    Logical,
    Text,
}

impl TokenSubtype {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenSubtype::Number => "number",
            TokenSubtype::Logical => "logical",
            TokenSubtype::Text => "text",
        }
    }
}

impl fmt::Display for TokenSubtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub token_type: TokenType,
    pub subtype: Option<TokenSubtype>,
    pub value: String,
}

impl Token {
    /// Create a token without a subtype
    pub fn new<S: Into<String>>(token_type: TokenType, value: S) -> Self {
        Self {
            token_type,
            subtype: None,
            value: value.into(),
        }
    }

    /// Create an operand token
    pub fn operand<S: Into<String>>(subtype: TokenSubtype, value: S) -> Self {
        Self {
            token_type: TokenType::Operand,
            subtype: Some(subtype),
            value: value.into(),
        }
    }

    /// Create a range token
    pub fn range<S: Into<String>>(subtype: TokenSubtype, value: S) -> Self {
        Self {
            token_type: TokenType::Range,
            subtype: Some(subtype),
            value: value.into(),
        }
    }

    /// Whether this is a binary (infix) operator
    pub fn is_infix(&self) -> bool {
        self.token_type == TokenType::OperatorInfix
    }

    /// Whether this is an operator of any fixity
    pub fn is_operator(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::OperatorPrefix | TokenType::OperatorInfix | TokenType::OperatorPostfix
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Tokenize a formula string
///
/// # Example
/// ```rust
/// use transformer_formula::{tokenize, TokenType};
///
/// let tokens = tokenize("=MAX(1, -2)").unwrap();
/// assert_eq!(tokens[0].token_type, TokenType::Function);
/// assert_eq!(tokens[3].token_type, TokenType::OperatorPrefix);
/// ```
pub fn tokenize(formula: &str) -> FormulaResult<Vec<Token>> {
    // Positions in errors are byte offsets into `formula` as given
    let body = formula.trim_start();
    let body = body.strip_prefix('=').unwrap_or(body);

    let mut tokenizer = Tokenizer::new(formula, formula.len() - body.len());
    tokenizer.run()?;
    Ok(tokenizer.tokens)
}

struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(input: &'a str, start: usize) -> Self {
        Self {
            input,
            pos: start,
            tokens: Vec::new(),
        }
    }

    fn run(&mut self) -> FormulaResult<()> {
        loop {
            self.skip_whitespace();
            let c = match self.peek_char() {
                Some(c) => c,
                None => return Ok(()),
            };

            match c {
                '"' => self.scan_text()?,
                '0'..='9' | '.' => self.scan_number()?,
                '(' => self.single(TokenType::OpenParen, "("),
                ')' => self.single(TokenType::CloseParen, ")"),
                ',' => self.single(TokenType::Separator, ","),
                '%' => self.single(TokenType::OperatorPostfix, "%"),
                '+' | '-' => {
                    let token_type = if self.expects_prefix() {
                        TokenType::OperatorPrefix
                    } else {
                        TokenType::OperatorInfix
                    };
                    self.advance();
                    self.tokens.push(Token::new(token_type, c));
                }
                '*' | '/' | '^' | '&' | '=' => self.single(TokenType::OperatorInfix, c),
                '<' => {
                    self.advance();
                    let op = match self.peek_char() {
                        Some('=') => "<=",
                        Some('>') => "<>",
                        _ => "<",
                    };
                    if op.len() == 2 {
                        self.advance();
                    }
                    self.tokens.push(Token::new(TokenType::OperatorInfix, op));
                }
                '>' => {
                    self.advance();
                    let op = if self.peek_char() == Some('=') {
                        self.advance();
                        ">="
                    } else {
                        ">"
                    };
                    self.tokens.push(Token::new(TokenType::OperatorInfix, op));
                }
                c if c.is_ascii_alphabetic() || c == '_' || c == '$' || c == '\'' => {
                    self.scan_identifier()?
                }
                other => {
                    return Err(FormulaError::syntax(format!(
                        "unrecognized character '{}' at position {}",
                        other, self.pos
                    )))
                }
            }
        }
    }

    /// `+`/`-` are prefix operators unless they follow something that ends an operand
    fn expects_prefix(&self) -> bool {
        match self.tokens.last() {
            None => true,
            Some(token) => matches!(
                token.token_type,
                TokenType::OpenParen
                    | TokenType::Separator
                    | TokenType::Function
                    | TokenType::OperatorPrefix
                    | TokenType::OperatorInfix
            ),
        }
    }

    fn single<S: Into<String>>(&mut self, token_type: TokenType, value: S) {
        self.advance();
        self.tokens.push(Token::new(token_type, value));
    }

    fn scan_text(&mut self) -> FormulaResult<()> {
        let start = self.pos;
        self.advance(); // opening quote

        let mut s = String::new();
        loop {
            match self.peek_char() {
                Some('"') => {
                    self.advance();
                    // "" is an escaped quote
                    if self.peek_char() == Some('"') {
                        s.push('"');
                        self.advance();
                    } else {
                        break;
                    }
                }
                Some(c) => {
                    s.push(c);
                    self.advance();
                }
                None => {
                    return Err(FormulaError::syntax(format!(
                        "unterminated string literal starting at position {}",
                        start
                    )))
                }
            }
        }

        self.tokens.push(Token::operand(TokenSubtype::Text, s));
        Ok(())
    }

    fn scan_number(&mut self) -> FormulaResult<()> {
        let start = self.pos;

        self.advance_while(|c| c.is_ascii_digit() || c == '.');
        if matches!(self.peek_char(), Some('e' | 'E')) {
            self.advance();
            if matches!(self.peek_char(), Some('+' | '-')) {
                self.advance();
            }
            self.advance_while(|c| c.is_ascii_digit());
        }

        let literal = &self.input[start..self.pos];

        // Row range such as 1:3
        if self.peek_char() == Some(':') && literal.bytes().all(|b| b.is_ascii_digit()) {
            self.advance();
            self.advance_while(|c| c.is_ascii_digit() || c == '$');
            let range = &self.input[start..self.pos];
            if range.ends_with(':') {
                return Err(FormulaError::syntax(format!("malformed range '{}'", range)));
            }
            self.tokens.push(Token::range(TokenSubtype::Number, range));
            return Ok(());
        }

        if !regex_is_match!(r"^(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$", literal) {
            return Err(FormulaError::syntax(format!(
                "malformed number '{}' at position {}",
                literal, start
            )));
        }

        self.tokens.push(Token::operand(TokenSubtype::Number, literal));
        Ok(())
    }

    fn scan_identifier(&mut self) -> FormulaResult<()> {
        let start = self.pos;

        // Quoted sheet name: 'My Sheet'!A1
        if self.peek_char() == Some('\'') {
            self.advance();
            loop {
                match self.peek_char() {
                    Some('\'') => {
                        self.advance();
                        if self.peek_char() == Some('\'') {
                            self.advance();
                        } else {
                            break;
                        }
                    }
                    Some(_) => self.advance(),
                    None => {
                        return Err(FormulaError::syntax(format!(
                            "unterminated sheet name starting at position {}",
                            start
                        )))
                    }
                }
            }
            if self.peek_char() != Some('!') {
                return Err(FormulaError::syntax(format!(
                    "expected '!' after sheet name at position {}",
                    self.pos
                )));
            }
        }

        self.advance_while(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':' | '!')
        });
        let text = &self.input[start..self.pos];

        if self.peek_char() == Some('(') {
            self.advance();
            self.tokens.push(Token::new(TokenType::Function, text));
            return Ok(());
        }

        let upper = text.to_ascii_uppercase();
        if upper == "TRUE" || upper == "FALSE" {
            self.tokens.push(Token::operand(TokenSubtype::Logical, upper));
        } else {
            self.tokens.push(Token::range(TokenSubtype::Text, text));
        }
        Ok(())
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_while<F: Fn(char) -> bool>(&mut self, pred: F) {
        while self.peek_char().map_or(false, &pred) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        self.advance_while(char::is_whitespace);
    }
}
