//! The shared diagnostic sink and the closed table of diagnostic codes.
//!
//! Codes 0..=60 mean "this symbol was expected here" and are indexed by
//! [`SymbolKind`]; everything else is a named lexical or semantic condition.
//! Diagnostics are never propagated as `Result`s. The only failures that
//! travel through `Result` are the fatal ones in [`FatalError`].

use std::io::{self, Write};
use std::path::PathBuf;

use super::lexer::{SymbolKind, Token};

pub mod codes {
  pub const ILLEGAL_UNDERSCORE: u16 = 61;
  pub const PRAGMA_NAME_EXPECTED: u16 = 69;
  pub const ILLEGAL_CHARACTER: u16 = 74;
  pub const END_NAME_MISMATCH: u16 = 75;
  pub const NUMERIC_FORMAT: u16 = 77;
  pub const END_OF_PROGRAM_EXPECTED: u16 = 78;
  pub const STATEMENT_EXPECTED: u16 = 79;
  pub const NOT_DECLARED: u16 = 81;
  pub const DUPLICATE_DECLARATION: u16 = 82;
  pub const NOT_ASSIGNABLE: u16 = 85;
  pub const EXIT_OUTSIDE_LOOP: u16 = 89;
  pub const ASSIGN_TYPE_MISMATCH: u16 = 93;
  pub const PARAM_MODE_EXPECTED: u16 = 94;
  pub const TYPE_NAME_EXPECTED: u16 = 96;
  pub const OPERAND_TYPE_MISMATCH: u16 = 114;
  pub const STRING_OPERANDS_EXPECTED: u16 = 115;
  pub const ARITHMETIC_EXPECTED: u16 = 116;
  pub const BOOLEAN_EXPECTED: u16 = 120;
}

/// Code used when `kind` was expected but something else was found.
pub fn expected(kind: SymbolKind) -> u16 {
  match kind {
    SymbolKind::Identifier => 0,
    SymbolKind::StrLit => 1,
    SymbolKind::RealLit => 2,
    SymbolKind::IntLit => 3,
    SymbolKind::EndOfProgram => 4,
    SymbolKind::Semicolon => 5,
    SymbolKind::Colon => 6,
    SymbolKind::Comma => 7,
    SymbolKind::Equals => 8,
    SymbolKind::NotEquals => 9,
    SymbolKind::LessThan => 10,
    SymbolKind::GreaterThan => 11,
    SymbolKind::LessOrEqual => 12,
    SymbolKind::GreaterOrEqual => 13,
    SymbolKind::Plus => 14,
    SymbolKind::Minus => 15,
    SymbolKind::Slash => 16,
    SymbolKind::Asterisk => 17,
    SymbolKind::Power => 18,
    SymbolKind::Ampersand => 19,
    SymbolKind::LeftParen => 20,
    SymbolKind::RightParen => 21,
    SymbolKind::Range => 22,
    SymbolKind::Becomes => 23,
    SymbolKind::And => 24,
    SymbolKind::Begin => 25,
    SymbolKind::Boolean => 26,
    SymbolKind::Constant => 27,
    SymbolKind::Else => 28,
    SymbolKind::Elsif => 29,
    SymbolKind::End => 30,
    SymbolKind::Eof => 31,
    SymbolKind::Exit => 32,
    SymbolKind::False => 33,
    SymbolKind::For => 34,
    SymbolKind::Function => 35,
    SymbolKind::If => 36,
    SymbolKind::In => 37,
    SymbolKind::Integer => 38,
    SymbolKind::Is => 39,
    SymbolKind::Loop => 40,
    SymbolKind::Not => 41,
    SymbolKind::Null => 42,
    SymbolKind::Odd => 43,
    SymbolKind::Or => 44,
    SymbolKind::Pragma => 45,
    SymbolKind::Procedure => 46,
    SymbolKind::Program => 47,
    SymbolKind::Read => 48,
    SymbolKind::Real => 49,
    SymbolKind::Ref => 50,
    SymbolKind::Return => 51,
    SymbolKind::Reverse => 52,
    SymbolKind::StringKw => 53,
    SymbolKind::Then => 54,
    SymbolKind::True => 55,
    SymbolKind::Value => 56,
    SymbolKind::When => 57,
    SymbolKind::While => 58,
    SymbolKind::Write => 59,
    SymbolKind::Writeln => 60,
    // never expected by any production; keep the sink total anyway
    SymbolKind::Nul => codes::ILLEGAL_CHARACTER,
  }
}

const EXPECTED_NAMES: [&str; 61] = [
  "Identifier",
  "String literal",
  "Real literal",
  "Integer literal",
  "End of program",
  "';'",
  "':'",
  "','",
  "'='",
  "'<>'",
  "'<'",
  "'>'",
  "'<='",
  "'>='",
  "'+'",
  "'-'",
  "'/'",
  "'*'",
  "'**'",
  "'&'",
  "'('",
  "')'",
  "'..'",
  "':='",
  "'and'",
  "'begin'",
  "'boolean'",
  "'constant'",
  "'else'",
  "'elsif'",
  "'end'",
  "'eof'",
  "'exit'",
  "'false'",
  "'for'",
  "'function'",
  "'if'",
  "'in'",
  "'integer'",
  "'is'",
  "'loop'",
  "'not'",
  "'null'",
  "'odd'",
  "'or'",
  "'pragma'",
  "'procedure'",
  "'program'",
  "'read'",
  "'real'",
  "'ref'",
  "'return'",
  "'reverse'",
  "'string'",
  "'then'",
  "'true'",
  "'value'",
  "'when'",
  "'while'",
  "'write'",
  "'writeln'",
];

pub fn message(code: u16) -> String {
  if let Some(name) = EXPECTED_NAMES.get(code as usize) {
    return format!("{name} expected.");
  }
  let text = match code {
    codes::ILLEGAL_UNDERSCORE => "Illegal underscore in identifier.",
    codes::PRAGMA_NAME_EXPECTED => "Pragma name expected.",
    codes::ILLEGAL_CHARACTER => "Illegal character.",
    codes::END_NAME_MISMATCH => "Identifier must match the name of the enclosing unit.",
    codes::NUMERIC_FORMAT => "Malformed numeric literal.",
    codes::END_OF_PROGRAM_EXPECTED => "End of program expected.",
    codes::STATEMENT_EXPECTED => "Statement expected.",
    codes::NOT_DECLARED => "Identifier not previously declared.",
    codes::DUPLICATE_DECLARATION => "Identifier declared twice in the same scope.",
    codes::NOT_ASSIGNABLE => "Identifier is not assignable.",
    codes::EXIT_OUTSIDE_LOOP => "Exit statement is only valid inside a loop.",
    codes::ASSIGN_TYPE_MISMATCH => "Assignment operands are not type compatible.",
    codes::PARAM_MODE_EXPECTED => "Parameter mode ('value' or 'ref') expected.",
    codes::TYPE_NAME_EXPECTED => "Type name expected.",
    codes::OPERAND_TYPE_MISMATCH => "Operand types must match.",
    codes::STRING_OPERANDS_EXPECTED => "String operands expected.",
    codes::ARITHMETIC_EXPECTED => "Arithmetic operands expected.",
    codes::BOOLEAN_EXPECTED => "Boolean expression expected.",
    _ => "Unknown diagnostic.",
  };
  text.to_string()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Diagnostic {
  pub line: u32,
  pub column: u32,
  pub code: u16,
}

/// Collects every diagnostic raised during one compilation, in source order.
/// The driver checks `error_count` to decide whether the emitter may
/// finalize.
#[derive(Default)]
pub struct ErrorSink {
  diagnostics: Vec<Diagnostic>,
}

impl ErrorSink {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn flag(&mut self, line: u32, column: u32, code: u16) {
    eprintln!("error[{code}] line {line}, column {column}: {}", message(code));
    self.diagnostics.push(Diagnostic { line, column, code });
  }

  pub fn flag_token(&mut self, token: &Token, code: u16) {
    self.flag(token.line, token.column, code);
  }

  pub fn error_count(&self) -> usize {
    self.diagnostics.len()
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  /// Interleaves the numbered source lines with the diagnostics raised on
  /// them. A caret marks the offending column.
  pub fn write_listing(&self, source: &str, out: &mut dyn Write) -> io::Result<()> {
    let mut line_count = 0u32;
    for (idx, line) in source.lines().enumerate() {
      let line_no = idx as u32 + 1;
      line_count = line_no;
      writeln!(out, "{line_no:>4}  {line}")?;
      for d in self.diagnostics.iter().filter(|d| d.line == line_no) {
        writeln!(out, "      {}^", " ".repeat(d.column as usize))?;
        writeln!(out, "      error[{}]: {}", d.code, message(d.code))?;
      }
    }
    for d in self.diagnostics.iter().filter(|d| d.line > line_count) {
      writeln!(out, "      error[{}] at end of source: {}", d.code, message(d.code))?;
    }
    writeln!(out)?;
    writeln!(out, "{} error(s) reported.", self.error_count())?;
    Ok(())
  }
}

/// The conditions that abort compilation outright. Everything else flows
/// through [`ErrorSink`] and is merely counted.
#[derive(Debug, thiserror::Error)]
pub enum FatalError {
  #[error("unable to open source file '{path}': {source}")]
  SourceFile { path: PathBuf, source: io::Error },
  #[error("unable to create output file '{path}': {source}")]
  OutputFile { path: PathBuf, source: io::Error },
  #[error("label '{0}' is referenced but never placed")]
  UnplacedLabel(String),
  #[error("failed writing output: {0}")]
  Write(#[from] io::Error),
}
