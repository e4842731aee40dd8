//! End-to-end tests: compile whole programs from source and check the
//! diagnostics and the emitted instruction stream.

use ayla::compiler::codegen::{CodeGen, OpCode, Operand};
use ayla::compiler::compile_source;
use ayla::compiler::errors::{codes, ErrorSink};

fn compile(source: &str) -> (ErrorSink, CodeGen) {
  compile_source(source)
}

fn codes_of(sink: &ErrorSink) -> Vec<u16> {
  sink.diagnostics().iter().map(|d| d.code).collect()
}

fn finalize_to_string(gen: &CodeGen) -> String {
  let mut out = Vec::new();
  gen.finalize(&mut out).unwrap();
  String::from_utf8(out).unwrap()
}

#[test]
fn minimal_program_compiles_clean() {
  let (sink, gen) = compile("program p is begin end p;");
  assert_eq!(sink.error_count(), 0);
  let text = finalize_to_string(&gen);
  let lines: Vec<&str> = text.lines().collect();
  assert_eq!(lines.len(), 16);
  // prologue: jump over the builtin block straight to user code
  assert!(lines[0].starts_with("JMP  0     14"));
  // the four conversion builtins at 2-4, 5-7, 8-10, 11-13
  for builtin in 0..4 {
    assert!(lines[1 + builtin * 3].starts_with("LDV  0     0"));
    assert!(lines[3 + builtin * 3].starts_with("OPR  0     1"));
  }
  assert!(lines[2].starts_with("OPR  0     25"));
  assert!(lines[5].starts_with("OPR  0     26"));
  assert!(lines[8].starts_with("OPR  0     27"));
  assert!(lines[11].starts_with("OPR  0     28"));
  // jump-to-body, one INC for the empty frame, halt
  assert!(lines[13].starts_with("JMP  0     15"));
  assert!(lines[14].starts_with("INC  0     0"));
  assert!(lines[15].starts_with("JMP  0     0"));
}

#[test]
fn case_insensitive_source_compiles() {
  let (sink, _) = compile("PROGRAM Demo IS X : Integer; BEGIN x := 3; END demo;");
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn duplicate_declaration_is_flagged_at_the_second_name() {
  let (sink, _) = compile("program p is x : integer; x : real; begin end p;");
  assert_eq!(codes_of(&sink), vec![codes::DUPLICATE_DECLARATION]);
  let d = sink.diagnostics()[0];
  assert_eq!(d.line, 1);
  assert_eq!(d.column, 26);
}

#[test]
fn assignment_type_mismatch() {
  let (sink, _) = compile("program p is x : integer; begin x := \"hello\"; end p;");
  assert_eq!(codes_of(&sink), vec![codes::ASSIGN_TYPE_MISMATCH]);
}

#[test]
fn integer_widens_to_real() {
  let (sink, _) = compile("program p is r : real; begin r := 3; end p;");
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn constants_reject_assignment() {
  let (sink, _) = compile("program p is constant k : integer := 5; begin k := 6; end p;");
  assert_eq!(codes_of(&sink), vec![codes::NOT_ASSIGNABLE]);
}

#[test]
fn loop_indices_reject_assignment() {
  let (sink, _) = compile(
    "program p is begin for i in 1..3 loop i := 0; end loop; end p;",
  );
  assert_eq!(codes_of(&sink), vec![codes::NOT_ASSIGNABLE]);
}

#[test]
fn exit_outside_a_loop_is_flagged() {
  let (sink, _) = compile("program p is begin exit; end p;");
  assert_eq!(codes_of(&sink), vec![codes::EXIT_OUTSIDE_LOOP]);
}

#[test]
fn exit_when_inside_a_loop_is_fine() {
  let (sink, gen) = compile("program p is x : integer; begin loop x := 1; exit when x = 1; end loop; end p;");
  assert_eq!(sink.error_count(), 0);
  // exit when compiles to complement + conditional jump
  let stream = finalize_to_string(&gen);
  assert!(stream.contains("OPR  0     16"));
  assert!(stream.contains("JIF"));
}

#[test]
fn missing_semicolon_produces_exactly_one_diagnostic() {
  let (sink, _) = compile("program p is x : integer begin x := 1; end p;");
  assert_eq!(codes_of(&sink).len(), 1);
  assert_eq!(sink.diagnostics()[0].code, 5); // semicolon expected
}

#[test]
fn end_identifier_mismatch_on_the_program() {
  let (sink, _) = compile("program p is begin end q;");
  assert_eq!(codes_of(&sink), vec![codes::END_NAME_MISMATCH]);
}

#[test]
fn end_identifier_mismatch_on_a_procedure() {
  let (sink, _) = compile("program p is procedure q is begin end r; begin end p;");
  assert_eq!(codes_of(&sink), vec![codes::END_NAME_MISMATCH]);
}

#[test]
fn end_identifier_is_optional() {
  let (sink, _) = compile("program p is begin end;");
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn garbage_after_the_program_is_flagged() {
  let (sink, _) = compile("program p is begin end p; extra");
  assert_eq!(codes_of(&sink), vec![codes::END_OF_PROGRAM_EXPECTED]);
}

#[test]
fn conditions_must_be_boolean() {
  let (sink, _) = compile("program p is begin if 1 then null; end if; end p;");
  assert_eq!(codes_of(&sink), vec![codes::BOOLEAN_EXPECTED]);
  let (sink, _) = compile("program p is begin while 1 loop null; end loop; end p;");
  assert_eq!(codes_of(&sink), vec![codes::BOOLEAN_EXPECTED]);
}

#[test]
fn pragmas_are_consumed_between_declarations() {
  let (sink, _) = compile("program p is pragma list(on); x : integer; begin x := 1; end p;");
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn one_inc_per_frame_sized_to_the_locals() {
  let source = "\
program p is
  a, b : integer;
  constant k : integer := 7;
begin
  a := k;
end p;
";
  let (sink, gen) = compile(source);
  assert_eq!(sink.error_count(), 0);
  let incs: Vec<_> = gen
    .instructions()
    .iter()
    .filter(|i| i.op == OpCode::Inc)
    .collect();
  assert_eq!(incs.len(), 1);
  assert_eq!(incs[0].operand, Operand::Int(3));
}

#[test]
fn initializers_execute_after_the_frame_inc() {
  let (sink, gen) = compile("program p is x : integer := 7; begin end p;");
  assert_eq!(sink.error_count(), 0);
  let text = finalize_to_string(&gen);
  let lines: Vec<&str> = text.lines().collect();
  assert!(lines[14].starts_with("INC  0     1"));
  assert!(lines[15].starts_with("LCI  0     7"));
  assert!(lines[16].starts_with("STO  0     0"));
}

#[test]
fn builtin_calls_hit_their_fixed_addresses() {
  let (sink, gen) = compile("program p is r : real; begin r := int2real(3); end p;");
  assert_eq!(sink.error_count(), 0);
  let instructions = gen.instructions();
  let mst = instructions.iter().position(|i| i.op == OpCode::Mst).unwrap();
  assert_eq!(instructions[mst + 1].op, OpCode::Lci);
  assert_eq!(instructions[mst + 2].op, OpCode::Cal);
  assert_eq!(instructions[mst + 2].operand, Operand::Int(2));
}

#[test]
fn user_procedure_calls_target_the_entry_label() {
  let source = "\
program p is
  procedure greet is
  begin
    writeln(\"hi\");
  end greet;
begin
  greet;
end p;
";
  let (sink, gen) = compile(source);
  assert_eq!(sink.error_count(), 0);
  let call = gen
    .instructions()
    .iter()
    .find(|i| i.op == OpCode::Cal)
    .unwrap();
  let Operand::Label(entry) = &call.operand else {
    panic!("user call should target a label");
  };
  let target = gen.label_target(entry).unwrap();
  // the entry label lands on the procedure body's INC
  assert_eq!(gen.instructions()[target - 1].op, OpCode::Inc);
  // and the stream still finalizes with every label placed
  finalize_to_string(&gen);
}

#[test]
fn every_label_operand_resolves() {
  let source = "\
program p is
  x : integer;
begin
  for i in reverse 1..10 loop
    if odd x then
      x := x - 1;
    elsif x > 5 then
      x := x / 2;
    else
      null;
    end if;
  end loop;
  while x < 100 loop
    x := x + 1;
    exit when x = 50;
  end loop;
end p;
";
  let (sink, gen) = compile(source);
  assert_eq!(sink.error_count(), 0);
  let total = gen.instructions().len();
  for instruction in gen.instructions() {
    if let Operand::Label(name) = &instruction.operand {
      let target = gen.label_target(name).expect("dangling label");
      assert!(target >= 1 && target <= total + 1);
    }
  }
}

#[test]
fn nested_subprograms_and_blocks_compile() {
  let source = "\
program p is
  total : integer := 0;

  function twice(n : value integer) return integer is
  begin
    return n * 2;
  end twice;

  procedure run(limit : value integer; out : ref integer) is
    local : integer;
  begin
    local := twice(limit);
    begin
      out := local;
    end;
  end run;
begin
  run(4, total);
  write(total);
  writeln;
end p;
";
  let (sink, gen) = compile(source);
  assert_eq!(sink.error_count(), 0);
  finalize_to_string(&gen);
}

#[test]
fn unary_minus_applies_to_the_whole_power() {
  let (sink, gen) = compile("program p is x : integer; begin x := -2 ** 3; end p;");
  assert_eq!(sink.error_count(), 0);
  let stream = finalize_to_string(&gen);
  let power = stream.find("OPR  0     7").unwrap();
  let negate = stream.find("OPR  0     2").unwrap();
  assert!(power < negate);
}

#[test]
fn string_concatenation_promotes_operands() {
  let (sink, _) = compile(
    "program p is s : string; begin s := \"n=\" & 3 & true; end p;",
  );
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn undeclared_identifier_reports_once_per_use() {
  let (sink, _) = compile("program p is begin x := 1; end p;");
  assert_eq!(codes_of(&sink), vec![codes::NOT_DECLARED]);
}

#[test]
fn read_and_write_compile_with_and_without_parens() {
  let source = "\
program p is
  i : integer;
  r : real;
begin
  read(i, r);
  read i;
  write(i + 1, r);
  writeln \"done\";
end p;
";
  let (sink, gen) = compile(source);
  assert_eq!(sink.error_count(), 0);
  let stream = finalize_to_string(&gen);
  assert!(stream.contains("RDI"));
  assert!(stream.contains("RDR"));
  assert!(stream.contains("OPR  0     20"));
  assert!(stream.contains("OPR  0     21"));
}

#[test]
fn constants_may_use_is_and_infer_their_type() {
  let (sink, _) = compile("program p is constant greeting is \"hello\"; begin write(greeting); end p;");
  assert_eq!(sink.error_count(), 0);
  let (sink, _) = compile("program p is constant k := 5; x : integer; begin x := k; end p;");
  assert_eq!(sink.error_count(), 0);
}

#[test]
fn errors_keep_the_emitter_from_finalizing() {
  let (sink, _) = compile("program p is begin x := 1; end p;");
  assert!(sink.error_count() > 0);
  // the driver skips finalization entirely when the count is nonzero;
  // this mirrors that decision point
}

#[test]
fn driver_writes_code_and_listing_files() {
  let dir = std::env::temp_dir();
  let source_path = dir.join("ayla_driver_clean.ayl");
  std::fs::write(&source_path, "program p is begin end p;").unwrap();
  let outcome = ayla::Compiler::new(&source_path)
    .listing(true)
    .compile()
    .unwrap();
  assert_eq!(outcome.error_count, 0);
  let code_path = outcome.code_file.clone().unwrap();
  assert_eq!(code_path.extension().unwrap(), "pal");
  let code = std::fs::read_to_string(&code_path).unwrap();
  assert_eq!(code.lines().count(), 16);
  let listing_path = outcome.listing_file.clone().unwrap();
  assert_eq!(listing_path.extension().unwrap(), "lis");
  let listing = std::fs::read_to_string(&listing_path).unwrap();
  assert!(listing.contains("0 error(s) reported."));
  let _ = std::fs::remove_file(&source_path);
  let _ = std::fs::remove_file(&code_path);
  let _ = std::fs::remove_file(&listing_path);
}

#[test]
fn driver_skips_the_code_file_on_errors() {
  let dir = std::env::temp_dir();
  let source_path = dir.join("ayla_driver_errors.ayl");
  std::fs::write(&source_path, "program p is begin exit; end p;").unwrap();
  let _ = std::fs::remove_file(source_path.with_extension("pal"));
  let outcome = ayla::Compiler::new(&source_path).compile().unwrap();
  assert_eq!(outcome.error_count, 1);
  assert!(outcome.code_file.is_none());
  assert!(!source_path.with_extension("pal").exists());
  let _ = std::fs::remove_file(&source_path);
}

#[test]
fn missing_source_file_is_a_typed_fatal_error() {
  use ayla::compiler::errors::FatalError;
  let result = ayla::Compiler::new("/nonexistent/ayla_missing.ayl").compile();
  assert!(matches!(result, Err(FatalError::SourceFile { .. })));
}

#[test]
fn for_loop_emits_init_test_step() {
  let (sink, gen) = compile("program p is begin for i in 1..3 loop null; end loop; end p;");
  assert_eq!(sink.error_count(), 0);
  let stream = finalize_to_string(&gen);
  // bound expressions, then stores into limit and index
  assert!(stream.contains("LCI  0     1"));
  assert!(stream.contains("LCI  0     3"));
  assert!(stream.contains("Save loop bound."));
  assert!(stream.contains("Initialize loop index."));
  assert!(stream.contains("OPR  0     15")); // index <= limit
  assert!(stream.contains("Add (increment)."));
}
