use anyhow::{Context, Result};
use clap::Parser;
use rtl2vhdl::generate;

/// Compile a built-in example computer to synthesizable VHDL.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// which built-in computer to compile (nop, load_seven, mov_a_pc,
    /// add_ab, two_instruction_decode)
    #[arg(long)]
    example: String,
    /// output directory (default: current directory)
    #[arg(short = 'o', long)]
    output: Option<String>,
    /// also vendor the static datapath component library
    #[arg(long)]
    with_components: bool,
    /// override the example's default RAM address width
    #[arg(long)]
    address_width: Option<u32>,
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_target(false)
        .without_time()
        .init();

    let mut computer = rtl2vhdl::example(&args.example)
        .with_context(|| format!("unknown example `{}`", args.example))?;
    if let Some(width) = args.address_width {
        computer = computer.address_width(width);
    }

    let out_dir = args
        .output
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    let files = generate(&computer, &out_dir, args.with_components)
        .with_context(|| format!("could not generate `{}`", args.example))?;

    tracing::info!(control = %files.control_vhdl.display(), main = %files.main_vhdl.display(), "done");
    Ok(())
}
