//! Jack tokenizer.
//!
//! Scans on a character basis, skipping whitespace, `//` line comments and
//! non-nesting `/* ... */` block comments. Provides the single-token
//! lookahead ([`Tokenizer::peek`]) the parser needs to tell a variable, an
//! array access and a subroutine call apart.

use crate::error::JackError;
use crate::token::{is_symbol, Token, KEYWORDS};

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    lookahead: Option<Token>,
}

impl Tokenizer {
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            lookahead: None,
        }
    }

    /// 1-based line of the scan position, for error reporting.
    #[inline]
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Consumes and returns the next token, `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, JackError> {
        if let Some(token) = self.lookahead.take() {
            return Ok(Some(token));
        }
        self.scan()
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> Result<Option<&Token>, JackError> {
        if self.lookahead.is_none() {
            self.lookahead = self.scan()?;
        }
        Ok(self.lookahead.as_ref())
    }

    fn scan(&mut self) -> Result<Option<Token>, JackError> {
        self.skip_trivia()?;

        let Some(&c) = self.chars.get(self.pos) else {
            return Ok(None);
        };

        if c == '"' {
            return self.scan_string().map(Some);
        }
        if c.is_ascii_digit() {
            return self.scan_integer().map(Some);
        }
        if is_symbol(c) {
            self.pos += 1;
            return Ok(Some(Token::Symbol(c)));
        }
        if c.is_alphabetic() || c == '_' {
            return Ok(Some(self.scan_word()));
        }

        Err(JackError::UnexpectedCharacter {
            character: c,
            line: self.line,
        })
    }

    /// Skips whitespace and both comment forms until a token (or the end of
    /// input) is next.
    fn skip_trivia(&mut self) -> Result<(), JackError> {
        loop {
            match self.chars.get(self.pos) {
                Some('\n') => {
                    self.line += 1;
                    self.pos += 1;
                }
                Some(c) if c.is_whitespace() => self.pos += 1,
                Some('/') if self.chars.get(self.pos + 1) == Some(&'/') => {
                    while let Some(&c) = self.chars.get(self.pos) {
                        self.pos += 1;
                        if c == '\n' {
                            self.line += 1;
                            break;
                        }
                    }
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    let start_line = self.line;
                    self.pos += 2;
                    loop {
                        match self.chars.get(self.pos) {
                            Some('*') if self.chars.get(self.pos + 1) == Some(&'/') => {
                                self.pos += 2;
                                break;
                            }
                            Some('\n') => {
                                self.line += 1;
                                self.pos += 1;
                            }
                            Some(_) => self.pos += 1,
                            None => {
                                return Err(JackError::UnterminatedComment { line: start_line })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    /// Characters between matched `"` delimiters; no escapes exist.
    fn scan_string(&mut self) -> Result<Token, JackError> {
        let start_line = self.line;
        self.pos += 1;
        let mut value = String::new();

        loop {
            match self.chars.get(self.pos) {
                Some('"') => {
                    self.pos += 1;
                    return Ok(Token::StringConst(value));
                }
                Some('\n') | None => {
                    return Err(JackError::UnterminatedString { line: start_line })
                }
                Some(&c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// Maximal digit run, valued 0..=32767.
    fn scan_integer(&mut self) -> Result<Token, JackError> {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(char::is_ascii_digit)
        {
            self.pos += 1;
        }

        let literal: String = self.chars[start..self.pos].iter().collect();
        match literal.parse::<u16>() {
            Ok(value) if value <= 32767 => Ok(Token::IntConst(value)),
            _ => Err(JackError::IntOutOfRange {
                literal,
                line: self.line,
            }),
        }
    }

    /// Maximal identifier run, classified as a keyword only when the whole
    /// run is in the keyword table.
    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        while self
            .chars
            .get(self.pos)
            .is_some_and(|&c| c.is_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }

        let word: String = self.chars[start..self.pos].iter().collect();
        match KEYWORDS.get(word.as_str()) {
            Some(&keyword) => Token::Keyword(keyword),
            None => Token::Identifier(word),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Keyword;

    fn all_tokens(source: &str) -> Vec<Token> {
        let mut tokenizer = Tokenizer::new(source);
        let mut tokens = Vec::new();
        while let Some(token) = tokenizer.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    #[test]
    fn test_basic_stream() {
        let tokens = all_tokens("let x = 5;");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::Let),
                Token::Identifier("x".to_string()),
                Token::Symbol('='),
                Token::IntConst(5),
                Token::Symbol(';'),
            ]
        );
    }

    #[test]
    fn test_keyword_prefixed_identifiers() {
        // maximal munch: these all share a prefix with a keyword
        let tokens = all_tokens("iffy classic donut while_ returns");
        assert_eq!(
            tokens,
            vec![
                Token::Identifier("iffy".to_string()),
                Token::Identifier("classic".to_string()),
                Token::Identifier("donut".to_string()),
                Token::Identifier("while_".to_string()),
                Token::Identifier("returns".to_string()),
            ]
        );
    }

    #[test]
    fn test_keyword_at_boundary() {
        let tokens = all_tokens("if(while)do;");
        assert_eq!(
            tokens,
            vec![
                Token::Keyword(Keyword::If),
                Token::Symbol('('),
                Token::Keyword(Keyword::While),
                Token::Symbol(')'),
                Token::Keyword(Keyword::Do),
                Token::Symbol(';'),
            ]
        );
    }

    #[test]
    fn test_string_constant() {
        let tokens = all_tokens("\"HOW MANY NUMBERS? \"");
        assert_eq!(
            tokens,
            vec![Token::StringConst("HOW MANY NUMBERS? ".to_string())]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        let source = "// line one\nlet /* inline */ x = /** api\n spanning */ 1;";
        let tokens = all_tokens(source);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[0], Token::Keyword(Keyword::Let));
        assert_eq!(tokens[3], Token::IntConst(1));
    }

    #[test]
    fn test_block_comment_is_not_nesting() {
        // terminator is the first */, the rest is ordinary input
        let tokens = all_tokens("/* outer /* inner */ x");
        assert_eq!(tokens, vec![Token::Identifier("x".to_string())]);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut tokenizer = Tokenizer::new("foo . bar");
        assert_eq!(
            tokenizer.peek().unwrap(),
            Some(&Token::Identifier("foo".to_string()))
        );
        assert_eq!(
            tokenizer.peek().unwrap(),
            Some(&Token::Identifier("foo".to_string()))
        );
        assert_eq!(
            tokenizer.next_token().unwrap(),
            Some(Token::Identifier("foo".to_string()))
        );
        assert_eq!(tokenizer.next_token().unwrap(), Some(Token::Symbol('.')));
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(all_tokens("32767"), vec![Token::IntConst(32767)]);
        assert!(matches!(
            Tokenizer::new("32768").next_token(),
            Err(JackError::IntOutOfRange { .. })
        ));
        assert!(matches!(
            Tokenizer::new("999999999999").next_token(),
            Err(JackError::IntOutOfRange { .. })
        ));
    }

    #[test]
    fn test_unterminated_string_reports_line() {
        let mut tokenizer = Tokenizer::new("\n\nlet s = \"oops\n");
        tokenizer.next_token().unwrap(); // let
        tokenizer.next_token().unwrap(); // s
        tokenizer.next_token().unwrap(); // =
        assert!(matches!(
            tokenizer.next_token(),
            Err(JackError::UnterminatedString { line: 3 })
        ));
    }

    #[test]
    fn test_unterminated_comment_reports_line() {
        assert!(matches!(
            Tokenizer::new("x\n/* never closed").all_error(),
            JackError::UnterminatedComment { line: 2 }
        ));
    }

    #[test]
    fn test_unexpected_character() {
        assert!(matches!(
            Tokenizer::new("let $ = 1;").all_error(),
            JackError::UnexpectedCharacter { character: '$', .. }
        ));
    }

    #[test]
    fn test_line_tracking_across_token_kinds() {
        let mut tokenizer = Tokenizer::new("a\nb\n\nc");
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.line(), 1);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.line(), 2);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.line(), 4);
    }

    impl Tokenizer {
        /// Drains the stream and returns the first error; panics when the
        /// input tokenizes cleanly.
        fn all_error(&mut self) -> JackError {
            loop {
                match self.next_token() {
                    Ok(Some(_)) => {}
                    Ok(None) => panic!("expected a tokenizer error"),
                    Err(e) => return e,
                }
            }
        }
    }
}
