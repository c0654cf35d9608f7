// Environment parsing: matrix family, `cases` and `array`

use super::lexer::Token;
use super::parser::{LatexParser, Terminator};
use crate::formula::ast::{FormulaBuilder, MathNode, MatrixFence};
use crate::formula::error::ParseError;

impl LatexParser<'_> {
    /// Parse the body of `\begin{env}` up to and including its `\end`.
    pub(super) fn parse_environment(&mut self, env: &str) -> Result<MathNode, ParseError> {
        let fence = match MatrixFence::from_environment(env) {
            Some(fence) => fence,
            None if env == "array" => {
                // Column specification carries no structure we keep
                self.read_raw_argument()?;
                MatrixFence::None
            },
            None => {
                self.skip_environment(env)?;
                return Ok(MathNode::Unsupported(format!("\\begin{{{}}}", env)));
            },
        };

        let mut rows = Vec::new();
        let mut row = Vec::new();
        loop {
            let cell = self.parse_sequence(Terminator::Cell)?;
            row.push(FormulaBuilder::row(cell));
            match self.tokens.next() {
                Some(Token::Alignment) => {},
                Some(Token::RowSeparator) => {
                    rows.push(std::mem::take(&mut row));
                    self.skip_row_spacing();
                },
                Some(Token::Command(name)) if name == "end" => {
                    let found = self.read_raw_argument()?;
                    let found = found.trim();
                    if found != env {
                        return Err(ParseError::EnvironmentMismatch {
                            expected: env.to_string(),
                            found: found.to_string(),
                        });
                    }
                    rows.push(row);
                    break;
                },
                _ => {
                    return Err(ParseError::UnexpectedEof(format!(
                        "unterminated environment {}",
                        env
                    )));
                },
            }
        }

        // A trailing `\\` leaves one empty cell behind
        if rows.len() > 1
            && rows
                .last()
                .is_some_and(|last| last.len() == 1 && last[0].is_empty_group())
        {
            rows.pop();
        }

        FormulaBuilder::matrix(rows, fence)
    }

    /// Optional `[2pt]` after a row separator.
    fn skip_row_spacing(&mut self) {
        self.skip_whitespace();
        if self.tokens.next_if_eq(&Token::Char('[')).is_some() {
            while let Some(token) = self.tokens.next() {
                if token == Token::Char(']') {
                    break;
                }
            }
        }
    }

    /// Discard everything up to the `\end` matching `\begin{env}`.
    fn skip_environment(&mut self, env: &str) -> Result<(), ParseError> {
        let mut depth = 1usize;
        loop {
            match self.tokens.next() {
                None => {
                    return Err(ParseError::UnexpectedEof(format!(
                        "unterminated environment {}",
                        env
                    )));
                },
                Some(Token::Command(name)) if name == "begin" || name == "end" => {
                    let inner = self.read_raw_argument()?;
                    if inner.trim() == env {
                        if name == "begin" {
                            depth += 1;
                        } else {
                            depth -= 1;
                            if depth == 0 {
                                return Ok(());
                            }
                        }
                    }
                },
                Some(_) => {},
            }
        }
    }
}
