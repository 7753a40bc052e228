use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use dcpu16::{object, CpuConfig, Dcpu, Engine, Step};

#[derive(Parser, Debug)]
#[command(author, version, about = "Run a DCPU-16 image on the dcpu16 emulator")]
struct Opts {
    /// Engine configuration (JSON)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,
    /// Stop after this many instructions
    #[arg(long, default_value_t = 10_000_000u64)]
    steps: u64,
    /// Stop once this many cycles have elapsed
    #[arg(long)]
    cycles: Option<u64>,
    /// Keep going past BRK
    #[arg(long)]
    ignore_break: bool,
    /// Print registers when done
    #[arg(long)]
    dump: bool,
    #[arg(value_name = "BINFILE")]
    input: String,
}

/// Steps until a limit runs out. Returns the address of the `BRK` that
/// stopped the run, if any.
fn run(dcpu: &mut Dcpu, steps: u64, budget: u64, ignore_break: bool) -> Option<u16> {
    for _ in 0..steps {
        if dcpu.cpu().cycle >= budget {
            break;
        }
        let pc = dcpu.cpu().pc;
        if dcpu.step() == Step::Break && !ignore_break {
            return Some(pc);
        }
    }
    None
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg: CpuConfig = match &opts.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => CpuConfig::default(),
    };

    let bytes = std::fs::read(&opts.input)?;
    let mut dcpu = Dcpu::new(cfg);
    dcpu.load(&object::from_bytes(&bytes));

    let budget = opts.cycles.unwrap_or(u64::MAX);
    if let Some(pc) = run(&mut dcpu, opts.steps, budget, opts.ignore_break) {
        eprintln!("BRK at {pc:#06x}");
    }

    if opts.dump {
        let cpu = dcpu.cpu();
        for (name, v) in dcpu16::instructions::REGISTERS.iter().zip(cpu.reg) {
            println!("{name:<2} = {v:#06x}");
        }
        println!("SP = {:#06x}", cpu.sp);
        println!("PC = {:#06x}", cpu.pc);
        println!("EX = {:#06x}", cpu.ex);
        println!("IA = {:#06x}", cpu.ia);
        println!("cycles = {}", cpu.cycle);
    }
    Ok(())
}
