//! The compiler front door: wires the scanner, analyzer, emitter and error
//! sink into the parser, runs the single pass, and finalizes the emitter
//! only when the source came through clean.

pub mod codegen;
pub mod errors;
pub mod lexer;
pub mod parser;
pub mod semantics;
pub mod symbol_table;
pub mod types;

use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use self::codegen::CodeGen;
use self::errors::{ErrorSink, FatalError};
use self::lexer::Lexer;
use self::parser::Parser;
use self::semantics::Semantics;

/// What one compilation produced.
pub struct Compilation {
  pub error_count: usize,
  /// The instruction file, present only when no errors were found.
  pub code_file: Option<PathBuf>,
  pub listing_file: Option<PathBuf>,
}

pub struct Compiler {
  source_path: PathBuf,
  code_path: PathBuf,
  listing_path: Option<PathBuf>,
}

impl Compiler {
  pub fn new(source_path: impl Into<PathBuf>) -> Self {
    let source_path = source_path.into();
    let code_path = source_path.with_extension("pal");
    Self {
      source_path,
      code_path,
      listing_path: None,
    }
  }

  /// Enables the listing file, named after the source with a `.lis`
  /// extension.
  pub fn listing(mut self, enabled: bool) -> Self {
    self.listing_path = enabled.then(|| self.source_path.with_extension("lis"));
    self
  }

  /// Overrides the output instruction file name.
  pub fn output(mut self, path: Option<PathBuf>) -> Self {
    if let Some(path) = path {
      self.code_path = path;
    }
    self
  }

  pub fn compile(self) -> Result<Compilation, FatalError> {
    let lexer = Lexer::from_path(&self.source_path)?;
    let mut semantics = Semantics::new();
    semantics.install_builtins();
    let mut parser = Parser::new(lexer, ErrorSink::new(), semantics, CodeGen::new());
    parser.parse_program();
    let (sink, gen) = parser.into_parts();

    if let Some(listing_path) = &self.listing_path {
      let source_text = fs::read_to_string(&self.source_path).unwrap_or_default();
      let file = create_file(listing_path)?;
      let mut out = BufWriter::new(file);
      sink.write_listing(&source_text, &mut out)?;
    }

    let code_file = if sink.error_count() == 0 {
      let file = create_file(&self.code_path)?;
      let mut out = BufWriter::new(file);
      gen.finalize(&mut out)?;
      Some(self.code_path.clone())
    } else {
      None
    };

    Ok(Compilation {
      error_count: sink.error_count(),
      code_file,
      listing_file: self.listing_path,
    })
  }
}

fn create_file(path: &Path) -> Result<File, FatalError> {
  File::create(path).map_err(|source| FatalError::OutputFile {
    path: path.to_path_buf(),
    source,
  })
}

/// Runs the whole front end over an in-memory source and hands back the
/// sink and the emitter. No files are touched; integration tests and tools
/// inspect diagnostics and instructions directly.
pub fn compile_source(source: &str) -> (ErrorSink, CodeGen) {
  let lexer = Lexer::from_source(source);
  let mut semantics = Semantics::new();
  semantics.install_builtins();
  let mut parser = Parser::new(lexer, ErrorSink::new(), semantics, CodeGen::new());
  parser.parse_program();
  parser.into_parts()
}
