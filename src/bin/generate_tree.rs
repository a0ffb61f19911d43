//! Batch tree generation utility
//!
//! Grows one tree (or a grid of trees) and prints its statistics, or writes
//! the full node dump as JSON.
//!
//! Usage:
//!     generate_tree [OPTIONS]
//!
//! Options:
//!     --preset <NAME>         Parameter preset: blossom or grove (default: blossom)
//!     --params <PATH>         Load parameters from a JSON file (overrides --preset)
//!     --seed <SEED>           Seed for the random source (default: 12345)
//!     --grid <ROWSxCOLS>      Grow a centered grid instead of a single tree
//!     -o, --output <PATH>     Write the generated group as JSON
//!     -h, --help              Show this help message

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use arbor::core::logging;
use arbor::math::SimpleRng;
use arbor::procgen::{generate_placed, ForestLayout, Placement, TreeGroup, TreeParams};

fn print_help() {
    eprintln!("generate_tree - Batch tree generation utility");
    eprintln!();
    eprintln!("Usage: generate_tree [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("    --preset <NAME>         Parameter preset: blossom or grove (default: blossom)");
    eprintln!("    --params <PATH>         Load parameters from a JSON file (overrides --preset)");
    eprintln!("    --seed <SEED>           Seed for the random source (default: 12345)");
    eprintln!("    --grid <ROWSxCOLS>      Grow a centered grid instead of a single tree");
    eprintln!("    -o, --output <PATH>     Write the generated group as JSON");
    eprintln!("    -h, --help              Show this help message");
    eprintln!();
    eprintln!("Example:");
    eprintln!("    generate_tree --preset grove --grid 3x2 --seed 7");
    eprintln!("    generate_tree --params my_tree.json -o tree.json");
}

#[derive(Debug)]
struct Args {
    preset: String,
    params: Option<PathBuf>,
    seed: u64,
    grid: Option<ForestLayout>,
    output: Option<PathBuf>,
}

fn parse_grid(s: &str) -> Result<ForestLayout, String> {
    let (rows, cols) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("Invalid grid '{}': expected ROWSxCOLS", s))?;
    let layout = ForestLayout {
        rows: rows.parse().map_err(|_| format!("Invalid grid rows: {}", rows))?,
        columns: cols.parse().map_err(|_| format!("Invalid grid columns: {}", cols))?,
        ..Default::default()
    };
    layout.validate().map_err(|e| e.to_string())?;
    Ok(layout)
}

fn parse_args() -> Result<Args, String> {
    let args: Vec<String> = env::args().skip(1).collect();

    let mut preset = "blossom".to_string();
    let mut params: Option<PathBuf> = None;
    let mut seed: u64 = 12345;
    let mut grid: Option<ForestLayout> = None;
    let mut output: Option<PathBuf> = None;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --preset".to_string());
                }
                preset = args[i].clone();
            }
            "--params" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --params".to_string());
                }
                params = Some(PathBuf::from(&args[i]));
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --seed".to_string());
                }
                seed = args[i].parse().map_err(|_| format!("Invalid seed: {}", args[i]))?;
            }
            "--grid" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --grid".to_string());
                }
                grid = Some(parse_grid(&args[i])?);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing value for --output".to_string());
                }
                output = Some(PathBuf::from(&args[i]));
            }
            other => {
                return Err(format!("Unknown option: {}", other));
            }
        }
        i += 1;
    }

    Ok(Args {
        preset,
        params,
        seed,
        grid,
        output,
    })
}

fn load_params(args: &Args) -> Result<TreeParams, String> {
    match &args.params {
        Some(path) => TreeParams::load_json(path).map_err(|e| format!("{}: {}", path.display(), e)),
        None => TreeParams::preset(&args.preset)
            .ok_or_else(|| format!("Unknown preset: {}. Valid presets: blossom, grove", args.preset)),
    }
}

fn print_summary(group: &TreeGroup) {
    let stats = group.stats();
    println!("  Trees:            {}", stats.trees);
    println!("  Nodes:            {}", stats.nodes);
    println!("  Branches:         {}", stats.branches);
    println!("  Anchors:          {} ({} terminal)", stats.anchors, stats.terminal_anchors);
    println!("  Leaves:           {}", stats.leaves);
    println!("  Deepest level:    {}", stats.max_level);
    if let Some(bounds) = stats.bounds {
        let size = bounds.size();
        println!("  Bounds:           {:.2} x {:.2} x {:.2}", size.x, size.y, size.z);
    }
}

fn main() {
    logging::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!();
            print_help();
            std::process::exit(1);
        }
    };

    let params = match load_params(&args) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let placement = match args.grid {
        Some(layout) => Placement::Grid(layout),
        None => Placement::default(),
    };

    println!("Tree Generation Utility");
    println!("=======================");
    println!("Seed: {}", args.seed);
    println!("Roots: {}", placement.root_positions().len());
    println!();

    let start = Instant::now();
    let group = generate_placed(&placement, &params, SimpleRng::new(args.seed));
    let elapsed = start.elapsed();

    print_summary(&group);
    println!("  Generated in {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    if let Some(path) = &args.output {
        let written = serde_json::to_string_pretty(&group)
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("\nWrote {}", path.display()),
            Err(e) => {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
    }
}
