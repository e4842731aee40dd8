use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;

use ayla::Compiler;

/// Compiler for the ayla language, targeting the PAL stack machine.
#[derive(Parser, Debug)]
#[command(name = "ayla", version)]
struct Args {
  /// Source file to compile
  source: PathBuf,

  /// Write a listing file (source interleaved with diagnostics)
  #[arg(short = 'l', long)]
  listing: bool,

  /// Name of the output instruction file (default: source with .pal)
  #[arg(short = 'o', long = "output")]
  output: Option<PathBuf>,
}

fn main() -> Result<()> {
  let args = Args::parse();
  let start = Instant::now();

  let outcome = Compiler::new(&args.source)
    .listing(args.listing)
    .output(args.output)
    .compile()?;

  match &outcome.code_file {
    Some(path) => println!("Code generation successful: {}", path.display()),
    None => println!("Code generation skipped due to errors."),
  }
  println!();
  println!("==================================================");
  println!(
    "Compilation completed in {} milliseconds with {} error(s) found.",
    start.elapsed().as_millis(),
    outcome.error_count
  );
  println!("==================================================");
  Ok(())
}
