//! AXI-to-DRAM Bridge Simulator CLI.
//!
//! The main executable for the simulator. It handles command-line argument
//! parsing, system initialization and a short traffic run against the
//! configured memory.
//!
//! # Usage
//!
//! The simulator can drive the bridge in two modes:
//! 1. **Blocking Mode** (default): Writes a test pattern and reads it back,
//!    waiting for each response.
//! 2. **Posted Mode** (`--posted`): Posts a batch of writes and reads, then
//!    advances time until every handle reports completion.

use clap::Parser;
use std::process;

use axi_dram_bridge::bridge::request::AxiRequest;
use axi_dram_bridge::common::ConfigError;
use axi_dram_bridge::config::Config;
use axi_dram_bridge::model::AxiDramModel;
use axi_dram_bridge::sim::loader;
use axi_dram_bridge::soc::{MemoryTarget, System};

/// Command-line arguments for the bridge simulator.
#[derive(Parser, Debug)]
#[command(author, version, about = "AXI4 to DRAM Bridge Simulator")]
struct Args {
    #[arg(short, long, default_value = "configs/default.toml")]
    config: String,

    /// Memspec JSON overriding the configured memory.
    #[arg(short, long)]
    memspec: Option<String>,

    /// Embedded memory standard (LPDDR5, DDR4) when no memspec file is given.
    #[arg(long)]
    standard: Option<String>,

    /// Start address of the generated traffic.
    #[arg(short, long, default_value = "0x1000", value_parser = parse_address)]
    address: u64,

    /// Bytes per request.
    #[arg(short, long, default_value_t = 64)]
    length: usize,

    /// Number of requests per direction.
    #[arg(short = 'n', long, default_value_t = 4)]
    requests: usize,

    #[arg(long)]
    posted: bool,
}

fn parse_address(text: &str) -> Result<u64, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", text, e))
}

fn pattern(index: usize, len: usize) -> Vec<u8> {
    (0..len)
        .map(|i| (index as u8).wrapping_mul(0x10).wrapping_add(0xA0).wrapping_add(i as u8))
        .collect()
}

fn build(args: &Args) -> Result<(Config, AxiDramModel), ConfigError> {
    let mut config = loader::load_config(std::path::Path::new(&args.config))?;
    if let Some(path) = &args.memspec {
        config.memory.memspec_path = Some(path.clone());
    }
    if let Some(standard) = &args.standard {
        config.memory.standard = standard.clone();
        if args.memspec.is_none() {
            config.memory.memspec_path = None;
        }
    }

    let spec = loader::resolve_memspec(&config)?;
    spec.log_summary();
    let system = System::new(&config, Some(spec))?;
    let model = AxiDramModel::with_system(&config, system);
    Ok((config, model))
}

fn print_config(config: &Config, model: &AxiDramModel) {
    println!("Global Configuration");
    println!("--------------------");
    println!("Bridge:");
    println!("  AXI Data Width:     {} bytes", config.bridge.axi_data_width);
    println!("  Downstream Beat:    {} bytes", config.bridge.beat_bytes());
    println!("  Base Latency:       {}", config.bridge.base_latency());
    println!("  Beat Latency:       {}", config.bridge.beat_latency());
    println!("  Max Outstanding:    {}", config.bridge.max_outstanding_val());
    println!("  Queue Depth:        {}", config.bridge.request_queue_depth_val());
    println!("Memory:");
    println!("  Controller:         {:?}", config.memory.controller);
    println!("  Target:             {}", model.system().target.name());
    println!(
        "  Capacity:           {} MB",
        model.system().target.capacity() / 1024 / 1024
    );
    println!("  Page Policy:        {:?}", config.memory.page_policy);
    println!("  Refresh:            {}", config.memory.refresh);
    println!("Simulation:");
    println!("  Clock Period:       {}", config.simulation.clock_period());
    println!("  Step:               {}", model.step_time());
    println!("--------------------");
}

fn run_blocking(model: &mut AxiDramModel, args: &Args) -> bool {
    let mut ok = true;
    for i in 0..args.requests {
        let address = args.address + (i * args.length) as u64;
        let data = pattern(i, args.length);
        match model.write(&AxiRequest::with_data(address, data, i as u32)) {
            Ok(rsp) => println!(
                "[W] {:#010x} len={} resp={} latency={}",
                address,
                args.length,
                rsp.axi_resp.name(),
                rsp.latency
            ),
            Err(e) => {
                eprintln!("[!] write at {:#x} rejected: {}", address, e);
                ok = false;
            }
        }
    }

    for i in 0..args.requests {
        let address = args.address + (i * args.length) as u64;
        let mut request = AxiRequest::new(address, args.length, i as u32);
        match model.read(&mut request) {
            Ok(rsp) => {
                let matches = request.data == pattern(i, args.length);
                ok &= matches && rsp.success;
                println!(
                    "[R] {:#010x} len={} resp={} latency={} data={}",
                    address,
                    args.length,
                    rsp.axi_resp.name(),
                    rsp.latency,
                    if matches { "match" } else { "MISMATCH" }
                );
            }
            Err(e) => {
                eprintln!("[!] read at {:#x} rejected: {}", address, e);
                ok = false;
            }
        }
    }
    ok
}

fn run_posted(model: &mut AxiDramModel, args: &Args) -> bool {
    let mut writes = Vec::new();
    for i in 0..args.requests {
        let address = args.address + (i * args.length) as u64;
        let request = AxiRequest::with_data(address, pattern(i, args.length), i as u32);
        match model.post_write(&request) {
            Ok(handle) => writes.push(handle),
            Err(e) => eprintln!("[!] write at {:#x} rejected: {}", address, e),
        }
    }
    let mut reads = Vec::new();
    for i in 0..args.requests {
        let address = args.address + (i * args.length) as u64;
        match model.post_read(&AxiRequest::new(address, args.length, i as u32)) {
            Ok(handle) => reads.push((i, handle)),
            Err(e) => eprintln!("[!] read at {:#x} rejected: {}", address, e),
        }
    }

    let mut cycles = 0u64;
    while !writes.iter().chain(reads.iter().map(|(_, h)| h)).all(|h| h.is_done()) {
        model.advance_cycle();
        cycles += 1;
        if model.system().next_event_time().is_none() && !model.system().bridge.has_pending_dispatch() {
            break;
        }
    }
    println!("[*] posted traffic drained after {} steps", cycles);

    let mut ok = writes.len() == args.requests && reads.len() == args.requests;
    for handle in &writes {
        match model.collect_response(handle) {
            Ok((rsp, request, latency)) => {
                ok &= rsp.success;
                println!(
                    "[W] {:#010x} resp={} latency={}",
                    request.address,
                    rsp.axi_resp.name(),
                    latency
                );
            }
            Err(e) => {
                eprintln!("[!] {}", e);
                ok = false;
            }
        }
    }
    for (i, handle) in &reads {
        match model.collect_response(handle) {
            Ok((rsp, request, latency)) => {
                let matches = request.data == pattern(*i, args.length);
                ok &= matches && rsp.success;
                println!(
                    "[R] {:#010x} resp={} latency={} data={}",
                    request.address,
                    rsp.axi_resp.name(),
                    latency,
                    if matches { "match" } else { "MISMATCH" }
                );
            }
            Err(e) => {
                eprintln!("[!] {}", e);
                ok = false;
            }
        }
    }
    ok
}

/// Main entry point for the bridge simulator.
///
/// # Behavior
///
/// 1. **Configuration**: Parses command-line arguments, loads the TOML
///    configuration and resolves the memory specification.
/// 2. **Initialization**: Constructs the `System` (bridge, memory target) and
///    the request front-end.
/// 3. **Traffic**: Writes a pattern and reads it back, blocking or posted.
/// 4. **Teardown**: Prints statistics and exits non-zero if any transfer
///    failed or read back the wrong data.
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let (config, mut model) = match build(&args) {
        Ok(built) => built,
        Err(e) => {
            eprintln!("[!] FATAL: {}", e);
            process::exit(1);
        }
    };

    print_config(&config, &model);

    let ok = if args.posted {
        run_posted(&mut model, &args)
    } else {
        run_blocking(&mut model, &args)
    };

    let system = model.system();
    system
        .bridge
        .stats()
        .print(system.now(), system.target.dram_stats());

    if !ok {
        eprintln!("\n[!] traffic check failed");
        process::exit(1);
    }
}
