use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use dcpu16::disasm::{decode_at, fmt_words};
use dcpu16::encoder::encode_instruction;
use dcpu16::{disassemble, Instruction};
use dcpu16_disasm::{load_image, Image};

#[derive(Parser, Debug)]
#[command(author, version, about = "DCPU-16 disassembler CLI", long_about=None)]
struct Cli {
    /// Load address of the first word (hex or dec)
    #[arg(long, default_value = "0")]
    base: String,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Disassemble the whole image as a re-assemblable listing
    List {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
    /// Disassemble a word range [start, end)
    Range {
        /// Start address (hex or dec)
        start: String,
        /// End address (hex or dec, exclusive)
        end: String,
        /// Show instruction words
        #[arg(long)]
        show_bytes: bool,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, serde::Serialize)]
struct Row {
    addr: u16,
    words: Vec<u16>,
    text: String,
    instruction: Instruction,
}

fn parse_u16(s: &str) -> Result<u16> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u16::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u16>()?)
    }
}

fn rows(img: &Image) -> Vec<Row> {
    let program = disassemble(&img.words);
    program
        .items()
        .iter()
        .map(|p| Row {
            addr: img.base.wrapping_add(p.offset),
            words: encode_instruction(&p.instruction, program.symbols()).unwrap_or_default(),
            text: p.instruction.to_string(),
            instruction: p.instruction.clone(),
        })
        .collect()
}

fn range(img: &Image, start: u16, end: u16, show_bytes: bool) -> String {
    let words = img.slice(start, end);
    let mut out = String::new();
    let mut pos = 0;
    while pos < words.len() {
        let (text, used) = match decode_at(words[pos], &words[pos + 1..]) {
            Some((ins, n)) => (ins.to_string(), 1 + n),
            None => (fmt_words(&words[pos..=pos]), 1),
        };
        let addr = start.wrapping_add(pos as u16);
        if show_bytes {
            let hex: Vec<String> = words[pos..pos + used].iter().map(|w| format!("{w:04x}")).collect();
            out.push_str(&format!("{addr:#06x}: {:<15} {text}\n", hex.join(" ")));
        } else {
            out.push_str(&format!("{addr:#06x}: {text}\n"));
        }
        pos += used;
    }
    out
}

fn emit(text: &str, out: Option<&str>) -> Result<()> {
    match out {
        Some(path) => std::fs::write(path, text)?,
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let img = load_image(Path::new(&cli.input), parse_u16(&cli.base)?, cli.skip, cli.len)?;

    match cli.cmd {
        Command::List { format, out } => {
            let text = match format {
                OutputFormat::Text => disassemble(&img.words).pretty() + "\n",
                OutputFormat::Json => serde_json::to_string_pretty(&rows(&img))? + "\n",
            };
            emit(&text, out.as_deref())?;
        }
        Command::Range { start, end, show_bytes, out } => {
            let (start, end) = (parse_u16(&start)?, parse_u16(&end)?);
            anyhow::ensure!(start <= end, "range start is past its end");
            emit(&range(&img, start, end, show_bytes), out.as_deref())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_u16_hex_and_dec() {
        assert_eq!(parse_u16("0x10").unwrap(), 0x10);
        assert_eq!(parse_u16("16").unwrap(), 16);
        assert!(parse_u16("zz").is_err());
        assert!(parse_u16("0x10000").is_err());
    }

    #[test]
    fn range_disasm_decodes_simple() {
        let img = Image { base: 0x100, words: vec![0x7c01, 0x0030, 0x9801, 0x7fc1] };
        let text = range(&img, 0x100, 0x104, true);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("0x0100: 7c01 0030"));
        assert!(lines[0].ends_with("SET A, 48"));
        assert!(lines[1].starts_with("0x0102"));
        assert!(lines[2].ends_with("DAT 0x7fc1"));
    }

    #[test]
    fn json_rows_carry_addresses() {
        let img = Image { base: 0x10, words: vec![0x9801, 0x7c20, 0x1234] };
        let rows = rows(&img);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].addr, 0x11);
        assert_eq!(rows[1].words, vec![0x7c20, 0x1234]);
        assert_eq!(rows[1].text, "JSR 0x1234");
    }
}
