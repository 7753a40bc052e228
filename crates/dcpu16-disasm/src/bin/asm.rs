use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use dcpu16::object;

#[derive(Parser, Debug)]
#[command(author, version, about = "DCPU-16 assembler")]
struct Opts {
    /// Input assembly file
    #[arg(short, long)]
    input: PathBuf,
    /// Output binary file (big-endian words)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Print the formatted listing with encoded words
    #[arg(long)]
    pretty: bool,
    /// Print the symbol table as JSON
    #[arg(long)]
    symbols: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let text = fs::read_to_string(&opts.input)?;
    let program = dcpu16::parse_program(&text)?;
    let words = program.encode()?;

    if opts.pretty {
        println!("{}", program.pretty());
    }
    if opts.symbols {
        println!("{}", serde_json::to_string_pretty(program.symbols())?);
    }
    if let Some(out) = &opts.output {
        fs::write(out, object::to_bytes(&words))?;
    }
    Ok(())
}
