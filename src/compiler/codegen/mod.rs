//! Code generation for the PAL stack machine.
//!
//! The emitter appends instructions as the parser walks the grammar,
//! leaving branch targets as symbolic labels. `finalize` resolves every
//! label to its 1-based instruction index and writes the fixed-width
//! textual records; a referenced label that was never placed is an internal
//! error, not a user diagnostic.

mod instruction;

pub use instruction::{Instruction, OpCode, Operand, Opr};

use std::collections::HashMap;
use std::io::Write;

use super::errors::FatalError;
use super::lexer::SymbolKind;
use super::types::Type;

/// Fixed entry addresses of the builtin conversion block emitted by
/// [`CodeGen::gen_program_start`]. User code begins right after it.
pub const INT2REAL_ADDR: i64 = 2;
pub const REAL2INT_ADDR: i64 = 5;
pub const INT2STRING_ADDR: i64 = 8;
pub const REAL2STRING_ADDR: i64 = 11;
pub const USER_CODE_ADDR: i64 = 14;

fn builtin_address(name: &str) -> Option<i64> {
  match name {
    "INT2REAL" => Some(INT2REAL_ADDR),
    "REAL2INT" => Some(REAL2INT_ADDR),
    "INT2STRING" => Some(INT2STRING_ADDR),
    "REAL2STRING" => Some(REAL2STRING_ADDR),
    _ => None,
  }
}

/// Where a name lives: its declaration level and frame offset.
#[derive(Clone, Copy, Debug)]
struct Binding {
  level: usize,
  offset: i64,
}

/// One entry of the binding stack. Frames start a new lexical level;
/// plain scopes (for-loops, nested blocks) share the enclosing level.
struct BindScope {
  level: usize,
  is_frame: bool,
  names: HashMap<String, i64>,
}

struct ForFrame {
  index: Binding,
  limit: Binding,
  reverse: bool,
}

pub struct CodeGen {
  instructions: Vec<Instruction>,
  labels: HashMap<String, usize>,
  label_counter: u32,
  scopes: Vec<BindScope>,
  /// Next free offset per lexical level.
  level_counts: Vec<i64>,
  /// Entry labels of user procedures and functions, by uppercased name.
  subprograms: HashMap<String, String>,
  for_frames: Vec<ForFrame>,
  /// Declaration-initializer code, buffered per open frame. Execution jumps
  /// straight over the declaration section, so initializers run at body
  /// start, right after the frame's `INC`.
  init_buffers: Vec<Vec<Instruction>>,
  capturing: bool,
}

impl Default for CodeGen {
  fn default() -> Self {
    Self::new()
  }
}

impl CodeGen {
  pub fn new() -> Self {
    Self {
      instructions: Vec::new(),
      labels: HashMap::new(),
      label_counter: 0,
      scopes: vec![BindScope {
        level: 0,
        is_frame: true,
        names: HashMap::new(),
      }],
      level_counts: vec![0],
      subprograms: HashMap::new(),
      for_frames: Vec::new(),
      init_buffers: Vec::new(),
      capturing: false,
    }
  }

  fn emit(&mut self, op: OpCode, level: i64, operand: Operand, comment: &str) {
    let instruction = Instruction {
      op,
      level,
      operand,
      comment: comment.to_string(),
    };
    if self.capturing {
      if let Some(buffer) = self.init_buffers.last_mut() {
        buffer.push(instruction);
        return;
      }
    }
    self.instructions.push(instruction);
  }

  /// Routes subsequent emission into the current frame's initializer
  /// buffer; used around declaration initializers.
  pub fn begin_init(&mut self) {
    self.capturing = true;
  }

  pub fn end_init(&mut self) {
    self.capturing = false;
  }

  fn emit_opr(&mut self, operation: Opr, comment: &str) {
    self.emit(OpCode::Opr, 0, Operand::Int(operation as i64), comment);
  }

  // ---- labels ----

  pub fn new_label(&mut self) -> String {
    let label = format!("L{}", self.label_counter);
    self.label_counter += 1;
    label
  }

  /// Binds `label` to the index of the next instruction to be appended.
  /// Placing a label twice is a structural bug in the parser.
  pub fn place_label(&mut self, label: &str) {
    debug_assert!(!self.capturing, "label placed inside an initializer");
    let target = self.instructions.len() + 1;
    let previous = self.labels.insert(label.to_string(), target);
    debug_assert!(previous.is_none(), "label {label} placed twice");
  }

  // ---- scopes and variable binding ----

  fn current_level(&self) -> usize {
    self.scopes.last().map(|s| s.level).unwrap_or(0)
  }

  /// Starts a new lexical level (program, procedure or function body).
  pub fn open_frame(&mut self) {
    let level = self.current_level() + 1;
    if self.level_counts.len() <= level {
      self.level_counts.push(0);
    } else {
      self.level_counts[level] = 0;
    }
    self.scopes.push(BindScope {
      level,
      is_frame: true,
      names: HashMap::new(),
    });
    self.init_buffers.push(Vec::new());
  }

  /// Starts a binding scope at the current level (for-loop, nested block).
  pub fn open_scope(&mut self) {
    self.scopes.push(BindScope {
      level: self.current_level(),
      is_frame: false,
      names: HashMap::new(),
    });
  }

  pub fn close_scope(&mut self) {
    if self.scopes.len() > 1 {
      if let Some(scope) = self.scopes.pop() {
        if scope.is_frame {
          self.init_buffers.pop();
        }
      }
    }
  }

  /// Allocates the next frame offset at the current level for `name`.
  pub fn declare_local(&mut self, name: &str) {
    let level = self.current_level();
    let offset = self.alloc_slot(level);
    if let Some(scope) = self.scopes.last_mut() {
      scope.names.insert(name.to_string(), offset);
    }
  }

  fn alloc_slot(&mut self, level: usize) -> i64 {
    let offset = self.level_counts[level];
    self.level_counts[level] += 1;
    offset
  }

  fn resolve(&self, name: &str) -> Option<Binding> {
    for scope in self.scopes.iter().rev() {
      if let Some(&offset) = scope.names.get(name) {
        return Some(Binding {
          level: scope.level,
          offset,
        });
      }
    }
    None
  }

  fn level_difference(&self, binding: &Binding) -> i64 {
    self.current_level() as i64 - binding.level as i64
  }

  // ---- program and subprogram structure ----

  /// Emits the prologue: a jump over the builtin conversion block, the four
  /// builtins themselves, and the jump to the (not yet known) program body.
  /// Returns the body label.
  pub fn gen_program_start(&mut self) -> String {
    self.emit(
      OpCode::Jmp,
      0,
      Operand::Int(USER_CODE_ADDR),
      "Jump over the predefined functions.",
    );
    let conversions = [
      (Opr::IntToReal, "Convert an integer to a real."),
      (Opr::RealToInt, "Convert a real to an integer."),
      (Opr::IntToString, "Convert an integer to a string."),
      (Opr::RealToString, "Convert a real to a string."),
    ];
    for (operation, comment) in conversions {
      self.emit(OpCode::Ldv, 0, Operand::Int(0), "Load argument.");
      self.emit_opr(operation, comment);
      self.emit_opr(Opr::FunctionReturn, "Function value return.");
    }
    let body = self.new_label();
    self.emit(
      OpCode::Jmp,
      0,
      Operand::Label(body.clone()),
      "Jump to start of statements or block.",
    );
    body
  }

  /// Registers a subprogram and returns its entry label. The label is
  /// placed at the body, past any nested subprogram code.
  pub fn gen_subprogram_start(&mut self, name: &str) -> String {
    let entry = self.new_label();
    self.subprograms.insert(name.to_string(), entry.clone());
    entry
  }

  /// Places the unit's body/entry label and reserves its frame: one `INC`
  /// sized to the locals declared at the current level. The buffered
  /// declaration initializers run right after the frame is reserved.
  pub fn gen_body_start(&mut self, label: &str) {
    self.place_label(label);
    let count = self.level_counts[self.current_level()];
    self.emit(
      OpCode::Inc,
      0,
      Operand::Int(count),
      "Reserve space for declared variables and constants.",
    );
    let buffered = self.init_buffers.last_mut().map(std::mem::take).unwrap_or_default();
    self.instructions.extend(buffered);
  }

  pub fn gen_program_end(&mut self) {
    self.emit(OpCode::Jmp, 0, Operand::Int(0), "Halt program.");
  }

  pub fn gen_procedure_return(&mut self) {
    self.emit_opr(Opr::ProcedureReturn, "Procedure return.");
  }

  pub fn gen_function_return(&mut self) {
    self.emit_opr(Opr::FunctionReturn, "Function value return.");
  }

  // ---- calls ----

  pub fn gen_call_start(&mut self) {
    self.emit(OpCode::Mst, 1, Operand::Int(0), "Mark stack.");
  }

  /// Emits the `CAL`; builtins target their fixed addresses, user
  /// subprograms their entry label. An unknown name (already flagged by the
  /// analyzer) gets a harmless placeholder target.
  pub fn gen_call(&mut self, name: &str) {
    if let Some(address) = builtin_address(name) {
      let comment = format!("Function call: {}.", name.to_lowercase());
      self.emit(OpCode::Cal, 1, Operand::Int(address), &comment);
    } else if let Some(entry) = self.subprograms.get(name).cloned() {
      let comment = format!("Call subprogram: {}.", name.to_lowercase());
      self.emit(OpCode::Cal, 1, Operand::Label(entry), &comment);
    } else {
      let comment = format!("Call subprogram: {}.", name.to_lowercase());
      self.emit(OpCode::Cal, 1, Operand::Int(0), &comment);
    }
  }

  // ---- loads and stores ----

  pub fn gen_load(&mut self, name: &str) {
    match self.resolve(name) {
      Some(binding) => {
        let diff = self.level_difference(&binding);
        self.emit(
          OpCode::Ldv,
          diff,
          Operand::Int(binding.offset),
          "Load variable or constant.",
        );
      }
      None => {
        let comment = format!("Load variable: {}.", name.to_lowercase());
        self.emit(OpCode::Ldv, 0, Operand::Int(0), &comment);
      }
    }
  }

  pub fn gen_store(&mut self, name: &str) {
    match self.resolve(name) {
      Some(binding) => {
        let diff = self.level_difference(&binding);
        self.emit(OpCode::Sto, diff, Operand::Int(binding.offset), "Store result.");
      }
      None => {
        let comment = format!("Store to: {}.", name.to_lowercase());
        self.emit(OpCode::Sto, 0, Operand::Int(0), &comment);
      }
    }
  }

  pub fn gen_load_address(&mut self, name: &str) {
    match self.resolve(name) {
      Some(binding) => {
        let diff = self.level_difference(&binding);
        self.emit(
          OpCode::Lda,
          diff,
          Operand::Int(binding.offset),
          "Load address of variable.",
        );
      }
      None => {
        let comment = format!("Load address: {}.", name.to_lowercase());
        self.emit(OpCode::Lda, 0, Operand::Int(0), &comment);
      }
    }
  }

  fn gen_load_binding(&mut self, binding: Binding, comment: &str) {
    let diff = self.level_difference(&binding);
    self.emit(OpCode::Ldv, diff, Operand::Int(binding.offset), comment);
  }

  fn gen_store_binding(&mut self, binding: Binding, comment: &str) {
    let diff = self.level_difference(&binding);
    self.emit(OpCode::Sto, diff, Operand::Int(binding.offset), comment);
  }

  // ---- literals ----

  pub fn gen_load_int(&mut self, value: i32) {
    self.emit(OpCode::Lci, 0, Operand::Int(value as i64), "Load integer constant.");
  }

  pub fn gen_load_real(&mut self, value: f64) {
    self.emit(OpCode::Lcr, 0, Operand::Real(value), "Load real constant.");
  }

  pub fn gen_load_string(&mut self, value: &str) {
    self.emit(OpCode::Lcs, 0, Operand::Str(value.to_string()), "Load string value.");
  }

  pub fn gen_load_bool(&mut self, value: bool) {
    if value {
      self.emit_opr(Opr::PushTrue, "Load true.");
    } else {
      self.emit_opr(Opr::PushFalse, "Load false.");
    }
  }

  // ---- operators ----

  pub fn gen_binary_operator(&mut self, op: SymbolKind) {
    let (operation, comment) = match op {
      SymbolKind::Plus => (Opr::Add, "Add arithmetic expressions together."),
      SymbolKind::Minus => (Opr::Subtract, "Subtract arithmetic expressions."),
      SymbolKind::Asterisk => (Opr::Multiply, "Multiply arithmetic expressions."),
      SymbolKind::Slash => (Opr::Divide, "Divide arithmetic expressions."),
      SymbolKind::Power => (Opr::Power, "Exponentiation."),
      SymbolKind::Ampersand => (Opr::Concat, "String concatenation."),
      SymbolKind::And => (Opr::And, "Logical and."),
      SymbolKind::Or => (Opr::Or, "Logical or."),
      SymbolKind::Equals => (Opr::Equal, "Test for equality."),
      SymbolKind::NotEquals => (Opr::NotEqual, "Test for inequality."),
      SymbolKind::LessThan => (Opr::Less, "Test less than."),
      SymbolKind::GreaterOrEqual => (Opr::GreaterOrEqual, "Test greater than or equal."),
      SymbolKind::GreaterThan => (Opr::Greater, "Test greater than."),
      SymbolKind::LessOrEqual => (Opr::LessOrEqual, "Test less than or equal."),
      _ => return,
    };
    self.emit_opr(operation, comment);
  }

  pub fn gen_negate(&mut self) {
    self.emit_opr(Opr::Negate, "Negate.");
  }

  pub fn gen_not(&mut self) {
    self.emit_opr(Opr::Not, "Logical complement (not).");
  }

  pub fn gen_odd(&mut self) {
    self.emit_opr(Opr::Odd, "Test if odd.");
  }

  // ---- control flow ----

  pub fn gen_jump(&mut self, label: &str) {
    self.emit(OpCode::Jmp, 0, Operand::Label(label.to_string()), "Jump.");
  }

  pub fn gen_jump_false(&mut self, label: &str) {
    self.emit(OpCode::Jif, 0, Operand::Label(label.to_string()), "Jump if false.");
  }

  /// The machine has no jump-if-true; complement and jump if false.
  pub fn gen_jump_true(&mut self, label: &str) {
    self.emit_opr(Opr::Not, "Logical complement (not).");
    self.emit(OpCode::Jif, 0, Operand::Label(label.to_string()), "Jump if true.");
  }

  // ---- for loops ----

  /// Called with the two bound expressions on the stack (low below high).
  /// Allocates a hidden limit slot beside the index and initializes both;
  /// reversed loops start at the high bound and count down to the low one.
  pub fn gen_for_init(&mut self, index_name: &str, reverse: bool) {
    let level = self.current_level();
    let limit = Binding {
      level,
      offset: self.alloc_slot(level),
    };
    let index = self.resolve(index_name).unwrap_or(Binding { level, offset: 0 });
    if reverse {
      self.gen_store_binding(index, "Initialize loop index.");
      self.gen_store_binding(limit, "Save loop bound.");
    } else {
      self.gen_store_binding(limit, "Save loop bound.");
      self.gen_store_binding(index, "Initialize loop index.");
    }
    self.for_frames.push(ForFrame { index, limit, reverse });
  }

  pub fn gen_for_test(&mut self, end_label: &str) {
    let Some(frame) = self.for_frames.last() else {
      return;
    };
    let (index, limit, reverse) = (frame.index, frame.limit, frame.reverse);
    self.gen_load_binding(index, "Load loop index.");
    self.gen_load_binding(limit, "Load loop bound.");
    if reverse {
      self.emit_opr(Opr::GreaterOrEqual, "Test greater than or equal.");
    } else {
      self.emit_opr(Opr::LessOrEqual, "Test less than or equal.");
    }
    self.gen_jump_false(end_label);
  }

  pub fn gen_for_step(&mut self) {
    let Some(frame) = self.for_frames.last() else {
      return;
    };
    let (index, reverse) = (frame.index, frame.reverse);
    self.gen_load_binding(index, "Load loop index.");
    self.emit(OpCode::Lci, 0, Operand::Int(1), "Load integer constant.");
    if reverse {
      self.emit_opr(Opr::Subtract, "Subtract (decrement).");
    } else {
      self.emit_opr(Opr::Add, "Add (increment).");
    }
    self.gen_store_binding(index, "Store result.");
  }

  pub fn gen_for_end(&mut self) {
    self.for_frames.pop();
  }

  // ---- I/O ----

  pub fn gen_read(&mut self, name: &str, ty: Type) {
    let binding = self.resolve(name).unwrap_or(Binding {
      level: self.current_level(),
      offset: 0,
    });
    let diff = self.level_difference(&binding);
    if ty == Type::Real {
      self.emit(OpCode::Rdr, diff, Operand::Int(binding.offset), "Read real value.");
    } else {
      self.emit(OpCode::Rdi, diff, Operand::Int(binding.offset), "Read integer value.");
    }
  }

  pub fn gen_write(&mut self) {
    self.emit_opr(Opr::WriteValue, "Write value.");
  }

  pub fn gen_writeln(&mut self) {
    self.emit_opr(Opr::WriteLine, "Terminate output to the current line.");
  }

  // ---- finalization ----

  pub fn instructions(&self) -> &[Instruction] {
    &self.instructions
  }

  pub fn label_target(&self, label: &str) -> Option<usize> {
    self.labels.get(label).copied()
  }

  /// Resolves every label operand and writes one fixed-width record per
  /// instruction: opcode, level, operand, `(index)`, comment.
  pub fn finalize(&self, out: &mut dyn Write) -> Result<(), FatalError> {
    for (idx, instruction) in self.instructions.iter().enumerate() {
      let operand = match &instruction.operand {
        Operand::Label(name) => match self.labels.get(name) {
          Some(target) => target.to_string(),
          None => return Err(FatalError::UnplacedLabel(name.clone())),
        },
        other => other.to_string(),
      };
      writeln!(
        out,
        "{:<5}{:<6}{:<13}({}) {}",
        instruction.op.to_string(),
        instruction.level,
        operand,
        idx + 1,
        instruction.comment,
      )?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod test {
  use super::*;

  fn finalize_to_string(gen: &CodeGen) -> String {
    let mut out = Vec::new();
    gen.finalize(&mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn prologue_reaches_user_code_at_fourteen() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    let body = gen.gen_program_start();
    assert_eq!(gen.instructions().len(), 14);
    gen.gen_body_start(&body);
    gen.gen_program_end();
    // the body label lands on the INC, instruction 15
    assert_eq!(gen.label_target(&body), Some(15));
    let text = finalize_to_string(&gen);
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("JMP  0     14"));
    assert!(first.contains("(1)"));
    assert!(text.lines().nth(14).unwrap().starts_with("INC  0     0"));
    assert!(text.lines().nth(15).unwrap().starts_with("JMP  0     0"));
  }

  #[test]
  fn labels_bind_to_the_next_instruction() {
    let mut gen = CodeGen::new();
    let label = gen.new_label();
    gen.gen_load_int(1);
    gen.place_label(&label);
    gen.gen_load_int(2);
    assert_eq!(gen.label_target(&label), Some(2));
  }

  #[test]
  fn unplaced_label_is_fatal() {
    let mut gen = CodeGen::new();
    let label = gen.new_label();
    gen.gen_jump(&label);
    let mut out = Vec::new();
    let err = gen.finalize(&mut out).unwrap_err();
    assert!(matches!(err, FatalError::UnplacedLabel(name) if name == label));
  }

  #[test]
  fn loads_compute_level_differences() {
    let mut gen = CodeGen::new();
    gen.open_frame(); // level 1
    gen.declare_local("X");
    gen.open_frame(); // level 2
    gen.declare_local("Y");
    gen.gen_load("X");
    gen.gen_load("Y");
    let instructions = gen.instructions();
    assert_eq!(instructions[0].level, 1);
    assert_eq!(instructions[0].operand, Operand::Int(0));
    assert_eq!(instructions[1].level, 0);
    assert_eq!(instructions[1].operand, Operand::Int(0));
  }

  #[test]
  fn offsets_allocate_sequentially_per_level() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    gen.declare_local("A");
    gen.declare_local("B");
    gen.gen_store("B");
    assert_eq!(gen.instructions()[0].operand, Operand::Int(1));
    // a sibling frame restarts its numbering
    gen.close_scope();
    gen.open_frame();
    gen.declare_local("C");
    gen.gen_store("C");
    assert_eq!(gen.instructions()[1].operand, Operand::Int(0));
  }

  #[test]
  fn address_loads_follow_the_same_binding_rules() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    gen.declare_local("X");
    gen.open_frame();
    gen.gen_load_address("X");
    let last = gen.instructions().last().unwrap();
    assert_eq!(last.op, OpCode::Lda);
    assert_eq!(last.level, 1);
    assert_eq!(last.operand, Operand::Int(0));
  }

  #[test]
  fn builtin_calls_use_fixed_addresses() {
    let mut gen = CodeGen::new();
    gen.gen_call_start();
    gen.gen_call("INT2REAL");
    gen.gen_call("REAL2STRING");
    let instructions = gen.instructions();
    assert_eq!(instructions[0].op, OpCode::Mst);
    assert_eq!(instructions[1].operand, Operand::Int(INT2REAL_ADDR));
    assert_eq!(instructions[2].operand, Operand::Int(REAL2STRING_ADDR));
  }

  #[test]
  fn user_calls_target_entry_labels() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    let entry = gen.gen_subprogram_start("GREET");
    gen.open_frame();
    gen.gen_body_start(&entry);
    gen.gen_procedure_return();
    gen.close_scope();
    gen.gen_call_start();
    gen.gen_call("GREET");
    let call = gen.instructions().last().unwrap();
    assert_eq!(call.op, OpCode::Cal);
    assert_eq!(call.operand, Operand::Label(entry.clone()));
    assert_eq!(gen.label_target(&entry), Some(1));
  }

  #[test]
  fn for_loop_reserves_a_hidden_limit_slot() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    gen.open_scope();
    gen.declare_local("I"); // offset 0
    gen.gen_load_int(1);
    gen.gen_load_int(10);
    gen.gen_for_init("I", false);
    let end = gen.new_label();
    gen.gen_for_test(&end);
    gen.gen_for_step();
    gen.gen_for_end();
    let instructions = gen.instructions();
    // init: limit (offset 1) stored first, then the index (offset 0)
    assert_eq!(instructions[2].op, OpCode::Sto);
    assert_eq!(instructions[2].operand, Operand::Int(1));
    assert_eq!(instructions[3].operand, Operand::Int(0));
    // test: index <= limit
    assert_eq!(instructions[4].operand, Operand::Int(0));
    assert_eq!(instructions[5].operand, Operand::Int(1));
    assert_eq!(instructions[6].operand, Operand::Int(Opr::LessOrEqual as i64));
    assert_eq!(instructions[7].op, OpCode::Jif);
    // step adds one
    assert_eq!(instructions[10].operand, Operand::Int(Opr::Add as i64));
  }

  #[test]
  fn reversed_for_counts_down() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    gen.open_scope();
    gen.declare_local("I");
    gen.gen_load_int(10);
    gen.gen_load_int(1);
    gen.gen_for_init("I", true);
    let end = gen.new_label();
    gen.gen_for_test(&end);
    gen.gen_for_step();
    let instructions = gen.instructions();
    // init stores the index first (top of stack is the starting bound)
    assert_eq!(instructions[2].operand, Operand::Int(0));
    assert_eq!(instructions[3].operand, Operand::Int(1));
    assert_eq!(instructions[6].operand, Operand::Int(Opr::GreaterOrEqual as i64));
    assert_eq!(instructions[10].operand, Operand::Int(Opr::Subtract as i64));
  }

  #[test]
  fn initializers_run_after_the_frame_is_reserved() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    let body = gen.gen_program_start();
    gen.declare_local("X");
    gen.begin_init();
    gen.gen_load_int(7);
    gen.gen_store("X");
    gen.end_init();
    // nothing emitted into the stream yet
    assert_eq!(gen.instructions().len(), 14);
    gen.gen_body_start(&body);
    let instructions = gen.instructions();
    assert_eq!(instructions[14].op, OpCode::Inc);
    assert_eq!(instructions[14].operand, Operand::Int(1));
    assert_eq!(instructions[15].op, OpCode::Lci);
    assert_eq!(instructions[16].op, OpCode::Sto);
  }

  #[test]
  fn read_picks_the_opcode_by_type() {
    let mut gen = CodeGen::new();
    gen.open_frame();
    gen.declare_local("I");
    gen.declare_local("R");
    gen.gen_read("I", Type::Integer);
    gen.gen_read("R", Type::Real);
    assert_eq!(gen.instructions()[0].op, OpCode::Rdi);
    assert_eq!(gen.instructions()[1].op, OpCode::Rdr);
  }

  #[test]
  fn records_are_fixed_width() {
    let mut gen = CodeGen::new();
    gen.gen_load_string("hi");
    let text = finalize_to_string(&gen);
    assert_eq!(text.lines().next().unwrap(), "LCS  0     'hi'         (1) Load string value.");
  }
}
