//! ICL 1900 Emulator - CLI Entry Point
//!
//! Commands:
//! - `icl1900-emu run <image>` - Load a core image and run it
//! - `icl1900-emu resume <snapshot>` - Resume a saved machine snapshot
//! - `icl1900-emu models` - List the supported processor models

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use icl1900::cpu::decode::disassemble;
use icl1900::cpu::model::MAX_MEMORY;
use icl1900::{
    load_image_file, load_snapshot, save_snapshot, Channel, Cpu, CpuError, CpuState, Model,
    NullChannel,
};

#[derive(Parser)]
#[command(name = "icl1900-emu")]
#[command(author = "Yigit")]
#[command(version = "0.1.0")]
#[command(about = "A bit-faithful emulator of the ICL 1900 series (1964) 24-bit mainframes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a core image and run it until the processor stops
    Run {
        /// Path to the text core image
        image: PathBuf,
        /// Processor model to emulate
        #[arg(short, long, default_value = "1904A")]
        model: Model,
        /// Store size in words (default: the model's standard fit)
        #[arg(long)]
        memory: Option<usize>,
        /// Maximum number of instructions to obey (default: 100000)
        #[arg(long, default_value = "100000")]
        max_cycles: u64,
        /// Show an instruction trace
        #[arg(short, long)]
        trace: bool,
        /// Save a machine snapshot here when the run ends
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },
    /// Resume a saved machine snapshot
    Resume {
        /// Path to the JSON snapshot
        snapshot: PathBuf,
        /// Maximum number of instructions to obey (default: 100000)
        #[arg(long, default_value = "100000")]
        max_cycles: u64,
        /// Show an instruction trace
        #[arg(short, long)]
        trace: bool,
    },
    /// List the supported processor models
    Models,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Run {
            image,
            model,
            memory,
            max_cycles,
            trace,
            snapshot,
        }) => {
            run_image(&image, model, memory, max_cycles, trace, snapshot);
        }
        Some(Commands::Resume {
            snapshot,
            max_cycles,
            trace,
        }) => {
            resume_snapshot(&snapshot, max_cycles, trace);
        }
        Some(Commands::Models) => {
            list_models();
        }
        None => {
            println!("ICL 1900 Emulator v0.1.0");
            println!("A 24-bit British mainframe emulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn run_image(
    image: &PathBuf,
    model: Model,
    memory: Option<usize>,
    max_cycles: u64,
    trace: bool,
    snapshot: Option<PathBuf>,
) {
    println!("🔧 Running: {} (model {})", image.display(), model);

    let mut cfg = model.config();
    if let Some(words) = memory {
        if words == 0 || words > MAX_MEMORY {
            eprintln!("❌ Store size must be between 1 and {} words", MAX_MEMORY);
            std::process::exit(1);
        }
        cfg.memory = words;
    }

    let mut cpu = Cpu::new(cfg);
    match load_image_file(&mut cpu, image) {
        Ok(n) => println!("📂 Loaded {} words", n),
        Err(e) => {
            eprintln!("❌ Failed to load image: {}", e);
            std::process::exit(1);
        }
    }

    run_cpu(&mut cpu, max_cycles, trace);

    if let Some(path) = snapshot {
        match save_snapshot(&cpu, &path) {
            Ok(()) => println!("✓ Snapshot saved to {}", path.display()),
            Err(e) => {
                eprintln!("❌ Failed to save snapshot: {}", e);
                std::process::exit(1);
            }
        }
    }
}

fn resume_snapshot(snapshot: &PathBuf, max_cycles: u64, trace: bool) {
    println!("🔧 Resuming: {}", snapshot.display());

    let mut cpu = match load_snapshot(snapshot) {
        Ok(cpu) => cpu,
        Err(e) => {
            eprintln!("❌ Failed to load snapshot: {}", e);
            std::process::exit(1);
        }
    };

    run_cpu(&mut cpu, max_cycles, trace);
}

fn run_cpu(cpu: &mut Cpu, max_cycles: u64, trace: bool) {
    let mut chan = NullChannel;
    chan.setup();

    println!();
    println!("━━━ Execution ━━━");

    if trace {
        cpu.history.resize(1);
        let limit = cpu.cycles.saturating_add(max_cycles);
        while cpu.cycles < limit {
            match cpu.step(&mut chan) {
                Ok(()) => {
                    if let Some(h) = cpu.history.iter().last() {
                        let mut flags = String::new();
                        if h.carry {
                            flags.push_str(" C");
                        }
                        if h.overflow {
                            flags.push_str(" V");
                        }
                        println!(
                            "{:07o}: {:<16} A={:08o} R={:08o}{}",
                            h.rc,
                            disassemble(h.op),
                            h.ra,
                            h.rr,
                            flags
                        );
                    }
                }
                Err(e) => {
                    report_stop(cpu, e);
                    break;
                }
            }
        }
    } else if let Err(e) = cpu.run(&mut chan, max_cycles) {
        report_stop(cpu, e);
    }

    println!();
    println!("━━━ Result ━━━");
    println!("Cycles: {}", cpu.cycles);
    println!("State: {:?}", cpu.state);
    println!(
        "RC: {:07o}  mode: {:02o}  {}{}{}",
        cpu.regs.rc,
        cpu.regs.mode,
        if cpu.regs.exec { "EXEC" } else { "USER" },
        if cpu.regs.carry { " C" } else { "" },
        if cpu.regs.overflow { " V" } else { "" }
    );
    for n in 0..8 {
        println!("X{}: {:08o}", n, cpu.regs.xr[n]);
    }

    if cpu.state == CpuState::Running && cpu.cycles >= max_cycles {
        println!();
        println!(
            "⚠️  Reached max cycles limit ({}). Use --max-cycles to increase.",
            max_cycles
        );
    }
}

fn report_stop(cpu: &Cpu, e: CpuError) {
    match cpu.state {
        // An unassigned order in executive mode is how programs stop.
        CpuState::Stopped(_) => println!("✓ Processor stopped: {}", e),
        CpuState::Running => {
            eprintln!("❌ CPU error: {}", e);
            std::process::exit(1);
        }
    }
}

fn list_models() {
    println!("━━━ Supported Models ━━━");
    println!();
    println!("{:<8} {:<6} {:>6} {:>6}", "Model", "Level", "Float", "Mult");
    for m in Model::ALL {
        let cfg = m.config();
        println!(
            "{:<8} {:<6} {:>6} {:>6}",
            m.name(),
            format!("{:?}", cfg.level),
            if cfg.float { "yes" } else { "no" },
            if cfg.mult { "yes" } else { "no" }
        );
    }
}
