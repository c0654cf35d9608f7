// LaTeX tokenizer
//
// Splits math-mode LaTeX into control sequences, grouping and script
// markers, and single characters. Runs of whitespace collapse to one token
// and `%` comments are skipped to the end of the line.

use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Control word or control symbol, without the backslash
    Command(String),
    BeginGroup,
    EndGroup,
    Superscript,
    Subscript,
    /// Column separator `&`
    Alignment,
    /// Row separator `\\`
    RowSeparator,
    Whitespace,
    Char(char),
}

pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
        }
    }

    fn read_command(&mut self) -> Token {
        match self.chars.peek().copied() {
            Some(c) if c.is_ascii_alphabetic() => {
                let mut name = String::new();
                while let Some(c) = self.chars.next_if(char::is_ascii_alphabetic) {
                    name.push(c);
                }
                Token::Command(name)
            },
            Some('\\') => {
                self.chars.next();
                Token::RowSeparator
            },
            Some(c) => {
                self.chars.next();
                if c.is_whitespace() {
                    Token::Command(" ".to_string())
                } else {
                    Token::Command(c.to_string())
                }
            },
            // Lone trailing backslash
            None => Token::Char('\\'),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn skip_comment(&mut self) {
        for c in self.chars.by_ref() {
            if c == '\n' {
                break;
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let c = self.chars.next()?;
            let token = match c {
                '\\' => self.read_command(),
                '{' => Token::BeginGroup,
                '}' => Token::EndGroup,
                '^' => Token::Superscript,
                '_' => Token::Subscript,
                '&' => Token::Alignment,
                '%' => {
                    self.skip_comment();
                    continue;
                },
                c if c.is_whitespace() => {
                    self.skip_whitespace();
                    Token::Whitespace
                },
                c => Token::Char(c),
            };
            return Some(token);
        }
    }
}
