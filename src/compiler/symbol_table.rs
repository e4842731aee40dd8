//! The scope stack. Each scope owns its records in declaration order;
//! lookups hand out index-based handles so the analyzer can update a record
//! without holding a borrow across other table calls.

use std::io::{self, Write};

use super::types::{Kind, Type};

#[derive(Clone, Debug)]
pub struct Record {
  pub name: String,
  pub line: u32,
  pub column: u32,
  pub ty: Type,
  pub kind: Kind,
  pub return_ty: Option<Type>,
}

impl Record {
  fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      line: 0,
      column: 0,
      ty: Type::Unknown,
      kind: Kind::Unknown,
      return_ty: None,
    }
  }
}

/// Handle to a record; stable for the lifetime of the scope that owns it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RecordId {
  scope: usize,
  index: usize,
}

pub struct SymbolTable {
  scopes: Vec<Vec<Record>>,
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::new()
  }
}

impl SymbolTable {
  pub fn new() -> Self {
    Self {
      scopes: vec![Vec::new()],
    }
  }

  pub fn open_scope(&mut self) {
    self.scopes.push(Vec::new());
  }

  /// Pops the innermost scope; the outermost scope is never popped.
  pub fn close_scope(&mut self) {
    if self.scopes.len() > 1 {
      self.scopes.pop();
    }
  }

  /// Static nesting depth of the innermost scope; the outermost is level 0.
  pub fn level(&self) -> usize {
    self.scopes.len() - 1
  }

  /// Inserts `name` in the innermost scope, or returns the existing record
  /// if the name is already there. Whether that is an error is the
  /// analyzer's call, not the table's.
  pub fn enter(&mut self, name: &str) -> RecordId {
    let scope = self.scopes.len() - 1;
    if let Some(index) = self.find_in(scope, name) {
      return RecordId { scope, index };
    }
    self.scopes[scope].push(Record::new(name));
    RecordId {
      scope,
      index: self.scopes[scope].len() - 1,
    }
  }

  pub fn lookup_local(&self, name: &str) -> Option<RecordId> {
    let scope = self.scopes.len() - 1;
    self.find_in(scope, name).map(|index| RecordId { scope, index })
  }

  /// Searches from innermost to outermost, first match wins.
  pub fn lookup(&self, name: &str) -> Option<RecordId> {
    for scope in (0..self.scopes.len()).rev() {
      if let Some(index) = self.find_in(scope, name) {
        return Some(RecordId { scope, index });
      }
    }
    None
  }

  pub fn record(&self, id: RecordId) -> &Record {
    &self.scopes[id.scope][id.index]
  }

  pub fn record_mut(&mut self, id: RecordId) -> &mut Record {
    &mut self.scopes[id.scope][id.index]
  }

  fn find_in(&self, scope: usize, name: &str) -> Option<usize> {
    self.scopes[scope].iter().position(|r| r.name == name)
  }

  /// Prints every scope from outermost to innermost.
  pub fn dump(&self, out: &mut dyn Write) -> io::Result<()> {
    for (level, scope) in self.scopes.iter().enumerate() {
      writeln!(out, "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~")?;
      writeln!(out, "scope level {level}")?;
      writeln!(out, "---------------------")?;
      for record in scope {
        write!(
          out,
          "Token Name: {}  Line No: {}  Position: {}  Type: {}  Kind: {}  Level: {}  Offset: 0  Trace?: 0  #params: 0",
          record.name,
          record.line,
          record.column,
          record.ty.label(),
          record.kind.label(),
          level,
        )?;
        if let Some(return_ty) = record.return_ty {
          write!(out, "  Return ty: {}", return_ty.label())?;
        }
        writeln!(out)?;
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  #[test]
  fn enter_returns_existing_record_on_duplicate() {
    let mut table = SymbolTable::new();
    let first = table.enter("X");
    table.record_mut(first).ty = Type::Integer;
    let second = table.enter("X");
    assert_eq!(first, second);
    assert_eq!(table.record(second).ty, Type::Integer);
  }

  #[test]
  fn lookup_searches_inner_to_outer() {
    let mut table = SymbolTable::new();
    let outer = table.enter("X");
    table.record_mut(outer).ty = Type::Integer;
    table.open_scope();
    let inner = table.enter("X");
    table.record_mut(inner).ty = Type::Real;
    assert_eq!(table.record(table.lookup("X").unwrap()).ty, Type::Real);
    table.close_scope();
    assert_eq!(table.record(table.lookup("X").unwrap()).ty, Type::Integer);
  }

  #[test]
  fn lookup_local_ignores_outer_scopes() {
    let mut table = SymbolTable::new();
    table.enter("X");
    table.open_scope();
    assert!(table.lookup_local("X").is_none());
    assert!(table.lookup("X").is_some());
  }

  #[test]
  fn outermost_scope_is_never_popped() {
    let mut table = SymbolTable::new();
    table.enter("X");
    table.close_scope();
    table.close_scope();
    assert_eq!(table.level(), 0);
    assert!(table.lookup("X").is_some());
  }

  #[test]
  fn dump_lists_scopes_outer_first() {
    let mut table = SymbolTable::new();
    let id = table.enter("GLOBAL");
    table.record_mut(id).ty = Type::Integer;
    table.record_mut(id).kind = Kind::Variable;
    table.open_scope();
    let id = table.enter("LOCAL");
    table.record_mut(id).ty = Type::Real;
    table.record_mut(id).kind = Kind::Constant;
    let mut out = Vec::new();
    table.dump(&mut out).unwrap();
    let text = String::from_utf8(out).unwrap();
    let global = text.find("Token Name: GLOBAL").unwrap();
    let local = text.find("Token Name: LOCAL").unwrap();
    assert!(global < local);
    assert!(text.contains("scope level 0"));
    assert!(text.contains("scope level 1"));
    assert!(text.contains("Type: REAL  Kind: CONSTANT  Level: 1"));
  }
}
