/* Recursive descent parser for automaton descriptions. Every line holds one transition
 *
 *     left -> right : symbol
 *
 * where `[name]` marks the initial state, `(name)` marks a final state and an omitted symbol or
 * `ε` denotes an epsilon transition. */

use crate::automaton::Automaton;
use crate::builder::AutomatonBuilder;
use crate::fa::{State, Symbol, Transition};
use log::debug;
use std::fs;
use std::path::Path;

const EPSILON: &str = "ε";

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedToken {
        found: String,
        expected: String,
        line: usize,
    },
    IllegalCharacter(char, usize),
    ConditionTooLong(String, usize),
    DuplicateInitialState(String, String),
    MissingInitialState,
    MissingFinalState,
    FileReadError(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::UnexpectedToken {
                found,
                expected,
                line,
            } => write!(
                f,
                "Error: Unexpected token `{}` on line {}, expected `{}`",
                found, line, expected
            ),
            ParseError::IllegalCharacter(ch, line) => {
                write!(f, "Error: Illegal character {:?} on line {}", ch, line)
            }
            ParseError::ConditionTooLong(condition, line) => write!(
                f,
                "Error: Transition condition {} on line {} is longer than one character",
                condition, line
            ),
            ParseError::DuplicateInitialState(first, second) => write!(
                f,
                "Error: Duplicate initial state, both {} and {} are marked as initial",
                first, second
            ),
            ParseError::MissingInitialState => write!(f, "Error: Missing initial state"),
            ParseError::MissingFinalState => write!(f, "Error: Missing final state"),
            ParseError::FileReadError(err_line) => write!(f, "{}", err_line),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LBrack,
    RBrack,
    LParen,
    RParen,
    Arrow,
    Colon,
    Literal(String),
    Newline,
    Eof,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::LBrack => "[".to_string(),
            Token::RBrack => "]".to_string(),
            Token::LParen => "(".to_string(),
            Token::RParen => ")".to_string(),
            Token::Arrow => "->".to_string(),
            Token::Colon => ":".to_string(),
            Token::Literal(literal) => literal.clone(),
            Token::Newline => "newline".to_string(),
            Token::Eof => "end of file".to_string(),
        }
    }
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
}

fn is_literal_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

impl Lexer {
    fn new(source: &str) -> Self {
        Lexer {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn eat_whitespace(&mut self) {
        while let Some(' ' | '\t' | '\r') = self.peek() {
            self.position += 1;
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        self.eat_whitespace();

        let ch = match self.peek() {
            None => return Ok(Token::Eof),
            Some(ch) => ch,
        };
        self.position += 1;

        let token = match ch {
            ':' => Token::Colon,
            '[' => Token::LBrack,
            ']' => Token::RBrack,
            '(' => Token::LParen,
            ')' => Token::RParen,
            '\n' => {
                self.line += 1;
                Token::Newline
            }
            '-' => {
                if self.peek() == Some('>') {
                    self.position += 1;
                    Token::Arrow
                } else {
                    return Err(ParseError::IllegalCharacter(ch, self.line));
                }
            }
            'ε' => Token::Literal(EPSILON.to_string()),
            ch if is_literal_char(ch) => {
                let mut literal = ch.to_string();
                while let Some(next) = self.peek().filter(|c| is_literal_char(*c)) {
                    literal.push(next);
                    self.position += 1;
                }
                Token::Literal(literal)
            }
            _ => return Err(ParseError::IllegalCharacter(ch, self.line)),
        };

        Ok(token)
    }
}

struct Parser {
    lexer: Lexer,
    current: Token,
    builder: AutomatonBuilder,
    has_final_state: bool,
}

impl Parser {
    fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            builder: AutomatonBuilder::new(),
            has_final_state: false,
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current = self.lexer.next_token()?;
        Ok(())
    }

    // Line of the current token; a newline token has already bumped the counter
    fn line(&self) -> usize {
        match self.current {
            Token::Newline => self.lexer.line - 1,
            _ => self.lexer.line,
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::UnexpectedToken {
            found: self.current.describe(),
            expected: expected.to_string(),
            line: self.line(),
        }
    }

    fn expect(&mut self, expected: Token) -> Result<(), ParseError> {
        if self.current != expected {
            return Err(self.unexpected(&expected.describe()));
        }
        self.advance()
    }

    fn expect_literal(&mut self) -> Result<String, ParseError> {
        match &self.current {
            Token::Literal(literal) => {
                let literal = literal.clone();
                self.advance()?;
                Ok(literal)
            }
            _ => Err(self.unexpected("state name")),
        }
    }

    fn skip_newlines(&mut self) -> Result<(), ParseError> {
        while self.current == Token::Newline {
            self.advance()?;
        }
        Ok(())
    }

    fn expect_line_end(&mut self) -> Result<(), ParseError> {
        match self.current {
            Token::Newline => self.skip_newlines(),
            Token::Eof => Ok(()),
            _ => Err(self.unexpected("newline")),
        }
    }

    fn parse(mut self) -> Result<Automaton, ParseError> {
        self.skip_newlines()?;

        while self.current != Token::Eof {
            self.parse_transition()?;
        }

        if self.builder.get_initial_state().is_none() {
            return Err(ParseError::MissingInitialState);
        }

        if !self.has_final_state {
            return Err(ParseError::MissingFinalState);
        }

        self.builder
            .result()
            .map_err(|_| ParseError::MissingInitialState)
    }

    fn parse_transition(&mut self) -> Result<(), ParseError> {
        let left = self.parse_state()?;
        self.expect(Token::Arrow)?;
        let right = self.parse_state()?;
        self.expect(Token::Colon)?;

        let line = self.line();
        let condition = match &self.current {
            Token::Literal(literal) => {
                let literal = literal.clone();
                self.advance()?;
                literal
            }
            _ => EPSILON.to_string(),
        };
        self.expect_line_end()?;

        let transition = if condition == EPSILON {
            Transition::new_epsilon(left, right)
        } else {
            let mut chars = condition.chars();
            match (chars.next(), chars.next()) {
                (Some(ch), None) => Transition::new_symbol(left, right, Symbol::new(ch)),
                _ => return Err(ParseError::ConditionTooLong(condition, line)),
            }
        };

        self.builder.add_transition(transition);
        Ok(())
    }

    fn parse_state(&mut self) -> Result<State, ParseError> {
        match self.current {
            Token::LBrack => {
                self.advance()?;
                let state = State::new(self.expect_literal()?);
                self.expect(Token::RBrack)?;

                if let Some(initial) = self.builder.get_initial_state() {
                    if initial != &state {
                        return Err(ParseError::DuplicateInitialState(
                            initial.to_string(),
                            state.to_string(),
                        ));
                    }
                }

                self.builder.set_initial_state(state.clone());
                Ok(state)
            }
            Token::LParen => {
                self.advance()?;
                let state = State::new(self.expect_literal()?);
                self.expect(Token::RParen)?;

                self.builder.make_final_state(state.clone());
                self.has_final_state = true;
                Ok(state)
            }
            _ => {
                let state = State::new(self.expect_literal()?);
                self.builder.add_state(state.clone());
                Ok(state)
            }
        }
    }
}

/// Parse the textual description of an automaton
pub fn parse_automaton(source: &str) -> Result<Automaton, ParseError> {
    let automaton = Parser::new(source)?.parse()?;
    debug!(
        "Parsed automaton with {} states and {} transitions",
        automaton.get_states().len(),
        automaton.get_transitions().len()
    );
    Ok(automaton)
}

/// Read and parse the description of an automaton from a file
pub fn read_automaton_file(file_path: impl AsRef<Path>) -> Result<Automaton, ParseError> {
    let file_path = file_path.as_ref();
    let source = match fs::read_to_string(file_path) {
        Ok(source) => source,
        Err(error) => {
            let err_line = format!(
                "Error: Failed to read the automaton file {}: {}",
                file_path.display(),
                error
            );
            return Err(ParseError::FileReadError(err_line));
        }
    };

    parse_automaton(&source)
}
