use anyhow::{Context, Result};
use johnny::{RunConfig, StopReason};
use johnny_core::{decode_ram, MicrocodeMode, MicrocodeProgram};

const DEFAULT_PROGRAM: &str = include_str!("../../../assets/programs/demo.ram");

fn load_microcode(arg: &str) -> Result<MicrocodeProgram> {
    if let Ok(mode) = arg.parse::<MicrocodeMode>() {
        log::info!("Using built-in '{}' microcode", mode);
        return Ok(mode.program().clone());
    }
    log::info!("Loading microcode from '{}'", arg);
    let text = std::fs::read_to_string(arg)
        .with_context(|| format!("Failed to read microcode file '{arg}'"))?;
    Ok(MicrocodeProgram::parse(text.trim_end(), None))
}

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let microcode = args.next().unwrap_or_else(|| "normal".to_string());
    let program_path = args.next().unwrap_or_default();

    let microcode = load_microcode(&microcode)?;

    let image = if program_path.is_empty() {
        log::info!("No program path provided, running the bundled demo");
        DEFAULT_PROGRAM.to_string()
    } else {
        log::info!("Running program: '{}'", program_path);
        std::fs::read_to_string(&program_path)
            .with_context(|| format!("Failed to read program file '{program_path}'"))?
    };
    let ram = johnny::parse_ram_image(&image).context("Invalid RAM image")?;

    let config = RunConfig::builder().microcode(microcode).build();
    let summary = johnny::run(&config, ram);

    let state = &summary.state;
    match summary.stop {
        StopReason::Halted => println!("halted after {} instructions", summary.instructions),
        StopReason::InstructionLimit => println!(
            "stopped after {} instructions without halting",
            summary.instructions
        ),
    }
    println!(
        "ACC={:03} PC={:03} IR={} ({})",
        state.acc,
        state.pc,
        state.ir,
        decode_ram(state.ir, &config.microcode)
    );
    Ok(())
}
