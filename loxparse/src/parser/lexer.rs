use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use log::trace;

use crate::error::ParseError;
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Number,
    String,
    Bool,
    Nil,
    Identifier,
    // Keywords
    Class, Fun, Return, If, Else, For, While, Super, This, Print, Var, And, Or,
    // Operators
    Assign,       // =
    Equal,        // ==
    NotEqual,     // !=
    Greater,      // >
    Less,         // <
    GreaterEqual, // >=
    LessEqual,    // <=
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Bang,         // !
    // Punctuation
    LParen,       // (
    RParen,       // )
    LBrace,       // {
    RBrace,       // }
    Comma,        // ,
    Semicolon,    // ;
    Dot,          // .
    Eof,
}

impl TokenKind {
    /// Reserved words. Looked up after an identifier-shaped word has been
    /// scanned in full, so `classroom` never splits into `class` + `room`.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "class" => Self::Class,
            "fun" => Self::Fun,
            "return" => Self::Return,
            "if" => Self::If,
            "else" => Self::Else,
            "for" => Self::For,
            "while" => Self::While,
            "super" => Self::Super,
            "this" => Self::This,
            "print" => Self::Print,
            "var" => Self::Var,
            "and" => Self::And,
            "or" => Self::Or,
            "true" | "false" => Self::Bool,
            "nil" => Self::Nil,
            _ => return None,
        };
        Some(kind)
    }

    /// How the kind reads in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Bool => "boolean",
            Self::Nil => "'nil'",
            Self::Identifier => "identifier",
            Self::Class => "'class'",
            Self::Fun => "'fun'",
            Self::Return => "'return'",
            Self::If => "'if'",
            Self::Else => "'else'",
            Self::For => "'for'",
            Self::While => "'while'",
            Self::Super => "'super'",
            Self::This => "'this'",
            Self::Print => "'print'",
            Self::Var => "'var'",
            Self::And => "'and'",
            Self::Or => "'or'",
            Self::Assign => "'='",
            Self::Equal => "'=='",
            Self::NotEqual => "'!='",
            Self::Greater => "'>'",
            Self::Less => "'<'",
            Self::GreaterEqual => "'>='",
            Self::LessEqual => "'<='",
            Self::Plus => "'+'",
            Self::Minus => "'-'",
            Self::Star => "'*'",
            Self::Slash => "'/'",
            Self::Bang => "'!'",
            Self::LParen => "'('",
            Self::RParen => "')'",
            Self::LBrace => "'{'",
            Self::RBrace => "'}'",
            Self::Comma => "','",
            Self::Semicolon => "';'",
            Self::Dot => "'.'",
            Self::Eof => "end of input",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Exact source slice, quotes included for strings. Empty for `Eof`.
    pub lexeme: String,
    pub span: Span,
}

impl Token {
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => f.write_str(self.kind.describe()),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}

/// Collects the whole token stream, `Eof` included.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).collect()
}

/// Lazy tokenizer. Yields tokens up to and including `Eof`, or stops after the
/// first lexical error.
pub struct Lexer<'src> {
    source: &'src str,
    chars: Peekable<CharIndices<'src>>,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.skip_whitespace_and_comments();

        let start = self.mark();
        let Some(ch) = self.advance() else {
            return Ok(self.token(TokenKind::Eof, start));
        };

        let kind = match ch {
            '0'..='9' => return Ok(self.number(ch, start)),
            'a'..='z' | 'A'..='Z' | '_' => return Ok(self.identifier_or_keyword(start)),
            '"' => return self.string(start),
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '.' => TokenKind::Dot,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '=' => self.either('=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.either('=', TokenKind::NotEqual, TokenKind::Bang),
            '>' => self.either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '<' => self.either('=', TokenKind::LessEqual, TokenKind::Less),
            _ => {
                return Err(ParseError::LexError {
                    span: self.span_from(start),
                    message: format!(
                        "unexpected character '{}' in {}",
                        ch,
                        snippet(&self.source[start.start..])
                    ),
                });
            }
        };

        Ok(self.token(kind, start))
    }

    /// `0` or a digit run without a leading zero, with an optional fraction.
    /// A leading `0` ends the integer part, so `012` lexes as `0` then `12`.
    fn number(&mut self, first: char, start: Span) -> Token {
        if first != '0' {
            self.eat_while(|c| c.is_ascii_digit());
        }

        let mut lookahead = self.chars.clone();
        if let (Some((_, '.')), Some((_, digit))) = (lookahead.next(), lookahead.next())
            && digit.is_ascii_digit()
        {
            self.advance();
            self.eat_while(|c| c.is_ascii_digit());
        }

        self.token(TokenKind::Number, start)
    }

    fn identifier_or_keyword(&mut self, start: Span) -> Token {
        self.eat_while(|c| c.is_alphanumeric() || c == '_');
        let source = self.source;
        let word = &source[start.start..self.offset()];
        let kind = TokenKind::keyword(word).unwrap_or(TokenKind::Identifier);
        self.token(kind, start)
    }

    /// No escape sequences; the literal may span lines.
    fn string(&mut self, start: Span) -> Result<Token, ParseError> {
        self.eat_while(|c| c != '"');
        if self.advance().is_none() {
            return Err(ParseError::LexError {
                span: self.span_from(start),
                message: format!(
                    "unterminated string literal {}",
                    snippet(&self.source[start.start..])
                ),
            });
        }
        Ok(self.token(TokenKind::String, start))
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('/') if self.peek_second() == Some('/') => {
                    self.eat_while(|c| c != '\n');
                }
                _ => break,
            }
        }
    }

    fn either(&mut self, next: char, matched: TokenKind, otherwise: TokenKind) -> TokenKind {
        if self.peek() == Some(next) {
            self.advance();
            matched
        } else {
            otherwise
        }
    }

    fn eat_while(&mut self, predicate: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            self.advance();
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_second(&self) -> Option<char> {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.next().map(|(_, c)| c)
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn offset(&mut self) -> usize {
        self.chars
            .peek()
            .map(|&(i, _)| i)
            .unwrap_or(self.source.len())
    }

    /// Empty span at the current position.
    fn mark(&mut self) -> Span {
        let offset = self.offset();
        Span {
            line: self.line,
            column: self.column,
            start: offset,
            end: offset,
        }
    }

    fn span_from(&mut self, start: Span) -> Span {
        start.to(&self.mark())
    }

    fn token(&mut self, kind: TokenKind, start: Span) -> Token {
        let span = self.span_from(start);
        let token = Token {
            kind,
            lexeme: self.source[span.start..span.end].to_string(),
            span,
        };
        trace!("token {:?} {} at {}", token.kind, token, token.span);
        token
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.next_token();
        if !matches!(&result, Ok(token) if !token.is(TokenKind::Eof)) {
            self.finished = true;
        }
        Some(result)
    }
}

/// Unconsumed text quoted for a diagnostic, cut at the end of the line.
fn snippet(rest: &str) -> String {
    const MAX_CHARS: usize = 20;
    let line = rest.lines().next().unwrap_or_default();
    let mut text: String = line.chars().take(MAX_CHARS).collect();
    if line.chars().count() > MAX_CHARS {
        text.push_str("...");
    }
    format!("`{}`", text)
}
