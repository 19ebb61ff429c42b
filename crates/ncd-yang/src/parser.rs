//
// Copyright (c) The ncd Contributors
//
// SPDX-License-Identifier: MIT
//

//! A hand-written recursive-descent parser for the YANG statement grammar
//! (RFC 7950 §6.3): `keyword [argument] (';' | '{' stmt* '}')`. It knows
//! nothing about which keywords take arguments or what they mean; that is
//! [`crate::resolve`]'s job. This stage only builds the raw tree.

use std::fmt;

use generational_arena::Arena;

use crate::stmt::{Keyword, Statement, StmtId, StmtTree};

#[derive(Debug)]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.message)
    }
}

impl std::error::Error for SyntaxError {}

pub fn parse(source: &str) -> Result<StmtTree, SyntaxError> {
    let mut lexer = Lexer::new(source);
    let mut arena = Arena::new();
    let root = parse_statement(&mut lexer, &mut arena, None)?;
    lexer.skip_trivia();
    if !lexer.at_end() {
        return Err(SyntaxError {
            line: lexer.line,
            message: "unexpected content after top-level statement".to_owned(),
        });
    }
    Ok(StmtTree {
        arena,
        root: Some(root),
    })
}

fn parse_statement(
    lexer: &mut Lexer<'_>,
    arena: &mut Arena<Statement>,
    parent: Option<StmtId>,
) -> Result<StmtId, SyntaxError> {
    lexer.skip_trivia();
    let line = lexer.line;
    let keyword_raw = lexer.read_keyword()?;
    let keyword = Keyword::from_raw(&keyword_raw);

    lexer.skip_inline_trivia();
    let argument = if lexer.peek() == Some(';') || lexer.peek() == Some('{') {
        None
    } else {
        Some(lexer.read_argument()?)
    };

    let id = arena.insert(Statement {
        keyword,
        argument,
        children: Vec::new(),
        parent,
        line,
    });

    lexer.skip_trivia();
    match lexer.peek() {
        Some(';') => {
            lexer.bump();
        }
        Some('{') => {
            lexer.bump();
            loop {
                lexer.skip_trivia();
                if lexer.peek() == Some('}') {
                    lexer.bump();
                    break;
                }
                if lexer.at_end() {
                    return Err(SyntaxError {
                        line: lexer.line,
                        message: "unexpected end of input inside block".to_owned(),
                    });
                }
                let child = parse_statement(lexer, arena, Some(id))?;
                arena[id].children.push(child);
            }
        }
        _ => {
            return Err(SyntaxError {
                line: lexer.line,
                message: "expected ';' or '{' after statement".to_owned(),
            });
        }
    }

    Ok(id)
}

struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    _source: &'a str,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            _source: source,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied();
        if c == Some('\n') {
            self.line += 1;
        }
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_inline_trivia(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.bump();
        }
    }

    /// Skips whitespace and both comment forms (`//` and `/* */`).
    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'/') => {
                    while !self.at_end() && self.peek() != Some('\n') {
                        self.bump();
                    }
                }
                Some('/') if self.chars.get(self.pos + 1) == Some(&'*') => {
                    self.bump();
                    self.bump();
                    while !self.at_end()
                        && !(self.peek() == Some('*') && self.chars.get(self.pos + 1) == Some(&'/'))
                    {
                        self.bump();
                    }
                    self.bump();
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn read_keyword(&mut self) -> Result<String, SyntaxError> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_alphanumeric() || matches!(c, '-' | '_' | ':')) {
            self.bump();
        }
        if self.pos == start {
            return Err(SyntaxError {
                line: self.line,
                message: format!("expected keyword, found '{:?}'", self.peek()),
            });
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    /// Reads an argument: a quoted string (with `+`-concatenation across
    /// whitespace/newlines per RFC 7950 §6.1.3), or an unquoted run of
    /// non-separator characters.
    fn read_argument(&mut self) -> Result<String, SyntaxError> {
        if matches!(self.peek(), Some('"') | Some('\'')) {
            let mut result = self.read_quoted_string()?;
            loop {
                let save = self.pos;
                self.skip_trivia();
                if self.peek() == Some('+') {
                    self.bump();
                    self.skip_trivia();
                    if matches!(self.peek(), Some('"') | Some('\'')) {
                        result.push_str(&self.read_quoted_string()?);
                        continue;
                    }
                }
                self.pos = save;
                break;
            }
            Ok(result)
        } else {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != ';' && c != '{' && c != '}')
            {
                self.bump();
            }
            if self.pos == start {
                return Err(SyntaxError {
                    line: self.line,
                    message: "expected statement argument".to_owned(),
                });
            }
            Ok(self.chars[start..self.pos].iter().collect())
        }
    }

    fn read_quoted_string(&mut self) -> Result<String, SyntaxError> {
        let quote = self.bump().expect("caller checked quote present");
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(SyntaxError {
                        line: self.line,
                        message: "unterminated string literal".to_owned(),
                    });
                }
                Some(c) if c == quote => break,
                Some('\\') if quote == '"' => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => {
                        return Err(SyntaxError {
                            line: self.line,
                            message: "unterminated escape sequence".to_owned(),
                        });
                    }
                },
                Some(c) => out.push(c),
            }
        }
        Ok(strip_leading_whitespace(&out))
    }
}

/// Applies the double-quoted-string leading-whitespace stripping rule of
/// RFC 7950 §6.1.3 to lines after the first.
fn strip_leading_whitespace(s: &str) -> String {
    if !s.contains('\n') {
        return s.to_owned();
    }
    let mut lines = s.split('\n');
    let first = lines.next().unwrap_or("");
    let mut out = String::from(first);
    for line in lines {
        out.push('\n');
        out.push_str(line.trim_start_matches([' ', '\t']));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_module() {
        let tree = parse(
            r#"
            module ex {
              namespace "urn:ex";
              prefix ex;
              leaf name { type string; }
            }
            "#,
        )
        .unwrap();
        let root = tree.root.unwrap();
        assert_eq!(tree.get(root).keyword, Keyword::Module);
        assert_eq!(tree.get(root).argument.as_deref(), Some("ex"));
        assert_eq!(tree.get(root).children.len(), 3);
    }

    #[test]
    fn concatenates_plus_joined_strings() {
        let tree = parse(
            r#"module ex { namespace "urn:" + "ex"; prefix ex; }"#,
        )
        .unwrap();
        let root = tree.root.unwrap();
        let ns = tree.child_argument(root, &Keyword::Namespace).unwrap();
        assert_eq!(ns, "urn:ex");
    }

    #[test]
    fn rejects_unterminated_block() {
        let err = parse("module ex { namespace \"urn:ex\";").unwrap_err();
        assert!(err.message.contains("end of input"));
    }
}
