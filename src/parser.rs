//! Parser for the path definition mini-language (the `d` attribute).
//!
//! Parsing is best effort. A malformed command is skipped and reported as a
//! [`Diagnostic`], everything else still ends up in the returned [`Path`].

use std::str::FromStr;

use log::{debug, trace, warn};
use svgtypes::Number;

use crate::error::{CommandFault, Diagnostic};
use crate::path::{Path, Point, Segment};

const COMMANDS: &[u8] = b"MmLlHhVvCcSsQqTtZzAa";

/// Result of parsing a path definition.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedPath {
    pub path: Path,
    pub diagnostics: Vec<Diagnostic>,
}

fn is_command(b: u8) -> bool {
    COMMANDS.contains(&b)
}

fn is_separator(b: u8) -> bool {
    b == b',' || b.is_ascii_whitespace()
}

/// Byte cursor over the source text.
struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn pos(&self) -> usize {
        self.pos
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<u8> {
        self.text.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.text.as_bytes().get(self.pos + offset).copied()
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.text.len());
    }

    fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    fn rest(&self) -> &'a str {
        self.text.get(self.pos..).unwrap_or("")
    }

    fn skip_while<F: Fn(u8) -> bool>(&mut self, pred: F) -> usize {
        let start = self.pos;
        while self.peek().map_or(false, &pred) {
            self.pos += 1;
        }
        self.pos - start
    }

    fn skip_separators(&mut self) {
        self.skip_while(is_separator);
    }

    fn skip_digits(&mut self) -> usize {
        self.skip_while(|b| b.is_ascii_digit())
    }

    /// Scan one number. On failure the cursor is left where it was.
    fn number(&mut self) -> Option<f64> {
        let start = self.pos;
        if let Some(b'+') | Some(b'-') = self.peek() {
            self.advance(1);
        }
        let mut digits = self.skip_digits();
        if self.peek() == Some(b'.') {
            self.advance(1);
            digits += self.skip_digits();
        }
        if digits == 0 {
            self.rewind(start);
            return None;
        }

        // Only consume an exponent if digits follow, so `1e` leaves the `e`
        if let Some(b'e') | Some(b'E') = self.peek() {
            let exponent_digits_at = match self.peek_at(1) {
                Some(b'+') | Some(b'-') => 2,
                _ => 1,
            };
            if self.peek_at(exponent_digits_at).map_or(false, |b| b.is_ascii_digit()) {
                self.advance(exponent_digits_at);
                self.skip_digits();
            }
        }

        // Values out of range still have valid syntax and become infinite
        let lexeme = &self.text[start..self.pos];
        match Number::from_str(lexeme)
            .map(|Number(value)| value)
            .or_else(|_| f64::from_str(lexeme))
        {
            Ok(value) => Some(value),
            Err(_) => {
                self.rewind(start);
                None
            }
        }
    }

    /// Scan a run of separator delimited numbers.
    fn numbers(&mut self) -> Vec<f64> {
        let mut operands = Vec::new();
        loop {
            let before = self.pos;
            self.skip_separators();
            match self.number() {
                Some(value) => operands.push(value),
                None => {
                    self.rewind(before);
                    break;
                }
            }
        }
        operands
    }
}

fn arity(command: u8) -> usize {
    match command.to_ascii_uppercase() {
        b'M' | b'L' | b'T' => 2,
        b'H' | b'V' => 1,
        b'C' => 6,
        b'S' | b'Q' => 4,
        _ => 0,
    }
}

/// Transient state of one parse call.
struct ParserState<'a> {
    cursor: Cursor<'a>,
    path: Path,
    diagnostics: Vec<Diagnostic>,
    command: Option<u8>,
    prev_command: Option<u8>,
    /// Second control point of the previous cubic curve, if the previous
    /// command emitted one.
    last_cubic_ctrl: Option<Point>,
    /// Control point of the previous quadratic curve, same rules.
    last_quad_ctrl: Option<Point>,
}

impl<'a> ParserState<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            cursor: Cursor::new(text),
            path: Path::new(),
            diagnostics: Vec::new(),
            command: None,
            prev_command: None,
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        warn!("{}", diagnostic);
        self.diagnostics.push(diagnostic);
    }

    /// Read the next command and its operands. Returns `false` when no
    /// further command can be read.
    fn next_command(&mut self) -> bool {
        self.cursor.skip_separators();
        let offset = self.cursor.pos();
        let letter = match self.cursor.peek() {
            Some(b) if b.is_ascii_alphabetic() => b,
            _ => return false,
        };

        if !is_command(letter) {
            self.cursor.advance(1);
            let skipped = self.cursor.numbers();
            trace!("next_command: Skipping {} operands of unknown command", skipped.len());
            self.report(Diagnostic::Command {
                offset,
                command: char::from(letter),
                fault: CommandFault::Unknown,
            });
            self.finish_command(None);
            return true;
        }

        // A run of several command letters is a series of commands without
        // operands. Only the first one is consumed here.
        let run = self.cursor.skip_while(is_command);
        self.cursor.rewind(offset + 1);
        let operands = if run > 1 {
            Vec::new()
        } else {
            self.cursor.numbers()
        };

        self.command = Some(letter);
        self.execute(letter, offset, &operands);
        true
    }

    fn finish_command(&mut self, emitted: Option<u8>) {
        if emitted.map_or(true, |c| !b"CcSs".contains(&c)) {
            self.last_cubic_ctrl = None;
        }
        if emitted.map_or(true, |c| !b"QqTt".contains(&c)) {
            self.last_quad_ctrl = None;
        }
        self.prev_command = self.command.take();
    }

    fn execute(&mut self, command: u8, offset: usize, operands: &[f64]) {
        trace!(
            "execute: '{}' with {} operands (previous: {:?})",
            char::from(command),
            operands.len(),
            self.prev_command.map(char::from)
        );

        if command == b'A' || command == b'a' {
            self.report(Diagnostic::Unsupported {
                offset,
                command: char::from(command),
            });
            self.finish_command(None);
            return;
        }

        let arity = arity(command);
        let malformed = if arity == 0 {
            !operands.is_empty()
        } else {
            operands.len() % arity != 0
        };
        if malformed {
            self.report(Diagnostic::Command {
                offset,
                command: char::from(command),
                fault: CommandFault::OperandCount {
                    count: operands.len(),
                    arity,
                },
            });
            self.finish_command(None);
            return;
        }
        if arity > 0 && operands.is_empty() {
            debug!("execute: '{}' without operands", char::from(command));
            self.finish_command(None);
            return;
        }

        let relative = command.is_ascii_lowercase();
        if arity == 0 {
            self.path.push(Segment::ClosePath);
        } else {
            for (index, group) in operands.chunks(arity).enumerate() {
                self.execute_group(command, relative, index, group);
            }
        }
        self.finish_command(Some(command));
    }

    /// Emit the segment for one operand group of `command`.
    #[allow(clippy::similar_names)]
    fn execute_group(&mut self, command: u8, relative: bool, index: usize, group: &[f64]) {
        let current = self.path.current_point();
        let resolve = |x: f64, y: f64| {
            if relative {
                current + Point::new(x, y)
            } else {
                Point::new(x, y)
            }
        };

        let segment = match command.to_ascii_uppercase() {
            b'M' => {
                let p = resolve(group[0], group[1]);
                if index == 0 {
                    Segment::MoveTo(p)
                } else {
                    Segment::LineTo(p)
                }
            }
            b'L' => Segment::LineTo(resolve(group[0], group[1])),
            b'H' => {
                let x = if relative { current.x + group[0] } else { group[0] };
                Segment::LineTo(Point::new(x, current.y))
            }
            b'V' => {
                let y = if relative { current.y + group[0] } else { group[0] };
                Segment::LineTo(Point::new(current.x, y))
            }
            b'C' => {
                let ctrl1 = resolve(group[0], group[1]);
                let ctrl2 = resolve(group[2], group[3]);
                self.last_cubic_ctrl = Some(ctrl2);
                Segment::CubicCurveTo(ctrl1, ctrl2, resolve(group[4], group[5]))
            }
            b'S' => {
                let ctrl1 = self
                    .last_cubic_ctrl
                    .map_or(current, |prev| current.reflect(prev));
                let ctrl2 = resolve(group[0], group[1]);
                self.last_cubic_ctrl = Some(ctrl2);
                Segment::CubicCurveTo(ctrl1, ctrl2, resolve(group[2], group[3]))
            }
            b'Q' => {
                let ctrl = resolve(group[0], group[1]);
                self.last_quad_ctrl = Some(ctrl);
                Segment::QuadCurveTo(ctrl, resolve(group[2], group[3]))
            }
            b'T' => {
                let ctrl = self
                    .last_quad_ctrl
                    .map_or(current, |prev| current.reflect(prev));
                self.last_quad_ctrl = Some(ctrl);
                Segment::QuadCurveTo(ctrl, resolve(group[0], group[1]))
            }
            _ => return,
        };
        self.path.push(segment);
    }

    fn finish(mut self) -> ParsedPath {
        self.cursor.skip_while(|b| b.is_ascii_whitespace());
        if !self.cursor.at_end() {
            let offset = self.cursor.pos();
            let text = self.cursor.rest().to_string();
            self.report(Diagnostic::TrailingData { offset, text });
        }
        ParsedPath {
            path: self.path,
            diagnostics: self.diagnostics,
        }
    }
}

/// Parse a path definition into a [`Path`].
pub fn parse(text: &str) -> ParsedPath {
    trace!("parse");
    let mut state = ParserState::new(text);
    while state.next_command() {}
    let parsed = state.finish();
    debug!(
        "parse: {} segments, {} diagnostics",
        parsed.path.len(),
        parsed.diagnostics.len()
    );
    parsed
}
