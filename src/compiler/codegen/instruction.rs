//! The target-machine instruction model. Instructions are kept symbolic
//! (labels unresolved) until finalization renders them as fixed-width
//! textual records.

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OpCode {
  /// Unconditional jump; `JMP 0 0` halts.
  Jmp,
  /// Jump if the top of stack is false.
  Jif,
  /// Load a variable's value by (level difference, offset).
  Ldv,
  /// Load a variable's address.
  Lda,
  /// Store the top of stack.
  Sto,
  /// Store through an address on the stack.
  Sti,
  /// Load an integer constant.
  Lci,
  /// Load a real constant.
  Lcr,
  /// Load a string constant.
  Lcs,
  /// Arithmetic, comparison, logical, I/O and conversion operations.
  Opr,
  /// Mark the stack before a call.
  Mst,
  /// Call a subprogram or builtin.
  Cal,
  /// Reserve stack slots for a frame's locals.
  Inc,
  /// Read an integer into a variable.
  Rdi,
  /// Read a real into a variable.
  Rdr,
}

impl fmt::Display for OpCode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let text = match self {
      OpCode::Jmp => "JMP",
      OpCode::Jif => "JIF",
      OpCode::Ldv => "LDV",
      OpCode::Lda => "LDA",
      OpCode::Sto => "STO",
      OpCode::Sti => "STI",
      OpCode::Lci => "LCI",
      OpCode::Lcr => "LCR",
      OpCode::Lcs => "LCS",
      OpCode::Opr => "OPR",
      OpCode::Mst => "MST",
      OpCode::Cal => "CAL",
      OpCode::Inc => "INC",
      OpCode::Rdi => "RDI",
      OpCode::Rdr => "RDR",
    };
    write!(f, "{text}")
  }
}

/// Operation selectors for `OPR`; the numbering is part of the target
/// machine's interface and must not change.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Opr {
  ProcedureReturn = 0,
  FunctionReturn = 1,
  Negate = 2,
  Add = 3,
  Subtract = 4,
  Multiply = 5,
  Divide = 6,
  Power = 7,
  Concat = 8,
  Odd = 9,
  Equal = 10,
  NotEqual = 11,
  Less = 12,
  GreaterOrEqual = 13,
  Greater = 14,
  LessOrEqual = 15,
  Not = 16,
  PushTrue = 17,
  PushFalse = 18,
  WriteValue = 20,
  WriteLine = 21,
  Swap = 22,
  IntToReal = 25,
  RealToInt = 26,
  IntToString = 27,
  RealToString = 28,
  And = 29,
  Or = 30,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
  Int(i64),
  Real(f64),
  Str(String),
  /// Resolved to an instruction index at finalization.
  Label(String),
}

impl fmt::Display for Operand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operand::Int(value) => write!(f, "{value}"),
      Operand::Real(value) => write!(f, "{value}"),
      Operand::Str(value) => write!(f, "'{value}'"),
      Operand::Label(name) => write!(f, "{name}"),
    }
  }
}

#[derive(Clone, Debug)]
pub struct Instruction {
  pub op: OpCode,
  /// Static level difference for loads/stores/calls, otherwise 0.
  pub level: i64,
  pub operand: Operand,
  pub comment: String,
}
