//! Semantic analysis: declarations, duplicate checks, the builtin
//! conversion functions, and the type rules for assignments and operators.
//!
//! Checks never abort anything. They flag through the sink and return a
//! poisoned `Unknown` type; checks that receive `Unknown` stay silent so a
//! single mistake is reported once.

use std::io;

use super::errors::{codes, ErrorSink};
use super::lexer::{SymbolKind, Token};
use super::symbol_table::SymbolTable;
use super::types::{Kind, Type};

pub const BUILTINS: [(&str, Type); 4] = [
  ("INT2REAL", Type::Real),
  ("REAL2INT", Type::Integer),
  ("INT2STRING", Type::String),
  ("REAL2STRING", Type::String),
];

fn builtin_result(name: &str) -> Option<Type> {
  BUILTINS.iter().find(|(n, _)| *n == name).map(|(_, ty)| *ty)
}

pub struct Semantics {
  table: SymbolTable,
}

impl Default for Semantics {
  fn default() -> Self {
    Self::new()
  }
}

impl Semantics {
  pub fn new() -> Self {
    Self {
      table: SymbolTable::new(),
    }
  }

  /// Enters the four conversion functions in the outermost scope. Called
  /// once before parsing begins.
  pub fn install_builtins(&mut self) {
    for (name, result) in BUILTINS {
      let id = self.table.enter(name);
      let record = self.table.record_mut(id);
      record.ty = Type::Function;
      record.kind = Kind::Function;
      record.return_ty = Some(result);
    }
  }

  pub fn open_scope(&mut self) {
    self.table.open_scope();
  }

  /// Prints the full symbol table, then pops the innermost scope.
  pub fn close_scope_and_dump(&mut self) {
    let stdout = io::stdout();
    let _ = self.table.dump(&mut stdout.lock());
    self.table.close_scope();
  }

  fn declare(&mut self, name: &str, ty: Type, kind: Kind, where_: &Token, sink: &mut ErrorSink) {
    if self.table.lookup_local(name).is_some() {
      sink.flag_token(where_, codes::DUPLICATE_DECLARATION);
      return;
    }
    let id = self.table.enter(name);
    let record = self.table.record_mut(id);
    record.ty = ty;
    record.kind = kind;
    record.line = where_.line;
    record.column = where_.column;
  }

  pub fn declare_var(&mut self, name: &str, ty: Type, where_: &Token, sink: &mut ErrorSink) {
    self.declare(name, ty, Kind::Variable, where_, sink);
  }

  pub fn declare_const(&mut self, name: &str, ty: Type, where_: &Token, sink: &mut ErrorSink) {
    self.declare(name, ty, Kind::Constant, where_, sink);
  }

  /// Parameters are plain variables in the subprogram scope; the passing
  /// mode does not change the record.
  pub fn declare_param(&mut self, name: &str, ty: Type, where_: &Token, sink: &mut ErrorSink) {
    self.declare(name, ty, Kind::Variable, where_, sink);
  }

  pub fn declare_loop_index(&mut self, name: &str, where_: &Token, sink: &mut ErrorSink) {
    self.declare(name, Type::Integer, Kind::LoopIndex, where_, sink);
  }

  pub fn declare_program(&mut self, name: &str, where_: &Token, sink: &mut ErrorSink) {
    self.declare(name, Type::Program, Kind::Program, where_, sink);
  }

  pub fn declare_subprogram(
    &mut self,
    name: &str,
    is_function: bool,
    where_: &Token,
    sink: &mut ErrorSink,
  ) {
    let kind = if is_function { Kind::Function } else { Kind::Procedure };
    self.declare(name, Type::Function, kind, where_, sink);
  }

  /// Records a function's return type once it has been parsed.
  pub fn set_function_return(&mut self, name: &str, return_ty: Type) {
    if let Some(id) = self.table.lookup(name) {
      let record = self.table.record_mut(id);
      if record.kind == Kind::Function {
        record.return_ty = Some(return_ty);
      }
    }
  }

  /// The type an identifier has when used in an expression. Builtins have
  /// fixed result types regardless of the table; user functions yield their
  /// return type.
  pub fn lookup_type(&mut self, name: &str, where_: &Token, sink: &mut ErrorSink) -> Type {
    if let Some(result) = builtin_result(name) {
      return result;
    }
    match self.table.lookup(name) {
      None => {
        sink.flag_token(where_, codes::NOT_DECLARED);
        Type::Unknown
      }
      Some(id) => {
        let record = self.table.record(id);
        if record.kind == Kind::Function {
          record.return_ty.unwrap_or(Type::Unknown)
        } else {
          record.ty
        }
      }
    }
  }

  pub fn check_assignment(&mut self, lhs: &str, rhs: Type, where_: &Token, sink: &mut ErrorSink) {
    let Some(id) = self.table.lookup(lhs) else {
      sink.flag_token(where_, codes::NOT_DECLARED);
      return;
    };
    let record = self.table.record(id);
    if !record.kind.assignable() {
      sink.flag_token(where_, codes::NOT_ASSIGNABLE);
      return;
    }
    Self::check_compatible(record.ty, rhs, where_, sink);
  }

  /// A constant's initializer is the one place a constant is written, so
  /// only the type rules apply.
  pub fn check_const_init(&mut self, name: &str, rhs: Type, where_: &Token, sink: &mut ErrorSink) {
    if let Some(id) = self.table.lookup(name) {
      Self::check_compatible(self.table.record(id).ty, rhs, where_, sink);
    }
  }

  fn check_compatible(lhs: Type, rhs: Type, where_: &Token, sink: &mut ErrorSink) {
    if lhs == rhs {
      return;
    }
    // implicit widening
    if lhs == Type::Real && rhs == Type::Integer {
      return;
    }
    // stay silent after an earlier error
    if lhs == Type::Unknown || rhs == Type::Unknown {
      return;
    }
    sink.flag_token(where_, codes::ASSIGN_TYPE_MISMATCH);
  }

  pub fn check_binary(
    &mut self,
    lhs: Type,
    op: SymbolKind,
    rhs: Type,
    where_: &Token,
    sink: &mut ErrorSink,
  ) -> Type {
    if lhs == Type::Unknown || rhs == Type::Unknown {
      return natural_result(op);
    }
    match op {
      SymbolKind::Plus
      | SymbolKind::Minus
      | SymbolKind::Asterisk
      | SymbolKind::Slash
      | SymbolKind::Power => {
        if !(lhs.is_numeric() && rhs.is_numeric()) {
          sink.flag_token(where_, codes::ARITHMETIC_EXPECTED);
          return Type::Unknown;
        }
        if lhs == Type::Real || rhs == Type::Real {
          Type::Real
        } else {
          Type::Integer
        }
      }
      SymbolKind::And | SymbolKind::Or => {
        if lhs.is_boolean() && rhs.is_boolean() {
          Type::Boolean
        } else {
          sink.flag_token(where_, codes::BOOLEAN_EXPECTED);
          Type::Unknown
        }
      }
      SymbolKind::Ampersand => {
        // string & string, or either side promotable to string
        if lhs.promotes_to_string() && rhs.promotes_to_string() {
          Type::String
        } else {
          sink.flag_token(where_, codes::STRING_OPERANDS_EXPECTED);
          Type::Unknown
        }
      }
      SymbolKind::Equals | SymbolKind::NotEquals => {
        let comparable = (lhs.is_numeric() && rhs.is_numeric())
          || (lhs.is_string() && rhs.is_string())
          || (lhs.is_boolean() && rhs.is_boolean());
        if comparable {
          Type::Boolean
        } else {
          sink.flag_token(where_, codes::OPERAND_TYPE_MISMATCH);
          Type::Unknown
        }
      }
      SymbolKind::LessThan
      | SymbolKind::LessOrEqual
      | SymbolKind::GreaterThan
      | SymbolKind::GreaterOrEqual => {
        if lhs.is_numeric() && rhs.is_numeric() {
          Type::Boolean
        } else {
          sink.flag_token(where_, codes::OPERAND_TYPE_MISMATCH);
          Type::Unknown
        }
      }
      _ => Type::Unknown,
    }
  }

  pub fn check_unary(
    &mut self,
    op: SymbolKind,
    operand: Type,
    where_: &Token,
    sink: &mut ErrorSink,
  ) -> Type {
    if operand == Type::Unknown {
      return match op {
        SymbolKind::Not | SymbolKind::Odd => Type::Boolean,
        _ => Type::Unknown,
      };
    }
    match op {
      SymbolKind::Not => {
        if operand.is_boolean() {
          Type::Boolean
        } else {
          sink.flag_token(where_, codes::BOOLEAN_EXPECTED);
          Type::Unknown
        }
      }
      SymbolKind::Odd => {
        if operand == Type::Integer {
          Type::Boolean
        } else {
          sink.flag_token(where_, codes::ARITHMETIC_EXPECTED);
          Type::Unknown
        }
      }
      SymbolKind::Plus | SymbolKind::Minus => {
        if operand.is_numeric() {
          operand
        } else {
          sink.flag_token(where_, codes::ARITHMETIC_EXPECTED);
          Type::Unknown
        }
      }
      _ => Type::Unknown,
    }
  }

  pub fn require_boolean(&mut self, ty: Type, where_: &Token, sink: &mut ErrorSink) {
    if !ty.is_boolean() && ty != Type::Unknown {
      sink.flag_token(where_, codes::BOOLEAN_EXPECTED);
    }
  }
}

/// Result type assumed when an operand is already poisoned, chosen so the
/// surrounding expression keeps checking sensibly.
fn natural_result(op: SymbolKind) -> Type {
  match op {
    SymbolKind::And | SymbolKind::Or => Type::Boolean,
    SymbolKind::Ampersand => Type::String,
    SymbolKind::Equals
    | SymbolKind::NotEquals
    | SymbolKind::LessThan
    | SymbolKind::LessOrEqual
    | SymbolKind::GreaterThan
    | SymbolKind::GreaterOrEqual => Type::Boolean,
    _ => Type::Unknown,
  }
}
