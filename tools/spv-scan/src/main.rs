use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use spv_bda::BindingIdentity;
use spv_vertex_trace::VertexTraceOutcome;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "spv-scan", version, about = "Static analyzers for SPIR-V shader modules")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Report where every buffer device address the module dereferences
    /// originates (binding, byte offset, member path).
    Bda(ModuleArgs),
    /// Report which vertex input locations feed the Position built-in.
    VertexInput(ModuleArgs),
}

#[derive(Debug, Parser)]
struct ModuleArgs {
    /// Path to a SPIR-V binary module (.spv).
    module: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Bda(args) => run_bda(&args.module),
        Commands::VertexInput(args) => run_vertex_input(&args.module),
    }
}

/// Reads a module file into host-order words. Only little-endian modules are
/// accepted; a byte-swapped stream fails the magic check rather than being
/// silently misparsed.
fn load_words(path: &Path) -> Result<Vec<u32>> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    if bytes.len() % 4 != 0 {
        bail!(
            "{}: {} bytes is not a whole number of 32-bit words",
            path.display(),
            bytes.len()
        );
    }
    let words: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect();
    match words.first() {
        Some(&spv_words::MAGIC) => Ok(words),
        Some(&other) => bail!(
            "{}: bad magic word {other:#010x} (big-endian modules are not supported)",
            path.display()
        ),
        None => bail!("{}: empty file", path.display()),
    }
}

fn run_bda(module: &Path) -> Result<()> {
    let words = load_words(module)?;
    let map = spv_bda::analyze(&words)
        .with_context(|| format!("analyzing {}", module.display()))?;

    if map.is_empty() {
        println!("no buffer device addresses found");
        return Ok(());
    }
    // Map iteration is key-ordered, so the report is stable across runs.
    for (key, path) in &map {
        let path = path.join(" -> ");
        match key.identity {
            BindingIdentity::DescriptorBinding { set, binding } => println!(
                "buffer-reference: {path} (set: {set}, binding: {binding}, \
                 buffer-offset: {}, array-stride: {})",
                key.byte_offset, key.array_stride
            ),
            BindingIdentity::PushConstantBlock => println!(
                "buffer-reference: {path} (push-constant-block, \
                 buffer-offset: {}, array-stride: {})",
                key.byte_offset, key.array_stride
            ),
        }
    }
    Ok(())
}

fn run_vertex_input(module: &Path) -> Result<()> {
    let words = load_words(module)?;
    let outcome = spv_vertex_trace::trace_position_inputs(&words)
        .with_context(|| format!("analyzing {}", module.display()))?;

    match outcome {
        VertexTraceOutcome::NotAVertexStage => {
            println!("not a vertex shader, so no Position built-in to trace");
        }
        VertexTraceOutcome::InputLocations(locations) if locations.is_empty() => {
            println!("no input locations feed Position");
        }
        VertexTraceOutcome::InputLocations(locations) => {
            for location in locations {
                println!("Position is fed by input location {location}");
            }
        }
    }
    Ok(())
}
