use std::fmt::Display;
use std::fs;
use std::path::PathBuf;
use std::process;
use std::time::Instant;

use clap::Parser;
use snafu::ResultExt;

use nubbc::CompileResult;
use nubbc::error::IoSnafu;

#[derive(Parser)]
#[command(name = "nubbc", about = "Compile a Nubb++ script to C++", version)]
struct Cli {
  /// Nubb++ source file
  source: PathBuf,

  /// Where to write the generated C++
  #[arg(short, long, default_value = "out.cpp")]
  output: PathBuf,

  /// Only print diagnostics
  #[arg(short, long)]
  quiet: bool,
}

struct Status {
  quiet: bool,
}

impl Status {
  fn info(&self, message: impl Display) {
    if !self.quiet {
      eprintln!("[INFO] {message}");
    }
  }
}

fn run(cli: &Cli) -> CompileResult<()> {
  let status = Status { quiet: cli.quiet };
  let started = Instant::now();

  status.info(format_args!("nubbc {}", env!("CARGO_PKG_VERSION")));
  let source = fs::read_to_string(&cli.source).context(IoSnafu { path: &cli.source })?;

  status.info(format_args!("Compiling {}", cli.source.display()));
  let emitter = nubbc::compile(&source)?;

  status.info(format_args!("Writing {}", cli.output.display()));
  emitter.finalize(&cli.output)?;

  status.info(format_args!(
    "Compiling complete. [{}ms]",
    started.elapsed().as_millis()
  ));
  Ok(())
}

fn main() {
  let cli = match Cli::try_parse() {
    Ok(cli) => cli,
    Err(err) if err.use_stderr() => {
      err.print().ok();
      process::exit(1);
    }
    Err(err) => err.exit(),
  };

  if let Err(err) = run(&cli) {
    eprintln!("[FATAL] {err}");
    process::exit(1);
  }
}
