//! Build Order
//!
//! Prints the construction levels, unresolved bricks and parts list of a
//! saved design.
//!
//! ```text
//! build_order design.json catalog.json
//! RUST_LOG=debug build_order design.json catalog.json --json
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use nanobrick_engine::instructions::{BuildOrder, PartsEntry, parts_list, resolve_build_order};
use nanobrick_engine::{BrickCatalog, Design};

#[derive(Parser, Debug)]
#[command(name = "build_order")]
#[command(about = "Sequence a brick design into build levels")]
struct Args {
    /// Saved design (JSON with size, bricks, colors)
    design: PathBuf,

    /// Brick type catalog (JSON array of brick types)
    catalog: PathBuf,

    /// Print the result as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn print_text(design: &Design, order: &BuildOrder, parts: &[PartsEntry]) {
    println!("===========================================");
    println!("   Build order: {} bricks", design.bricks.len());
    println!("===========================================");

    for (step, level) in order.levels.iter().enumerate() {
        let view = if level.view.top_view { "top" } else { "side" };
        let side = if level.view.left { "left" } else { "right" };
        let face = if level.view.front { "front" } else { "back" };
        println!(
            "Step {:>3}  y={:<3} {} brick(s)  view: {view}/{side}/{face}",
            step + 1,
            level.y,
            level.bricks.len()
        );
        for brick in &level.bricks {
            println!(
                "    #{:<5} type {:<4} color {:<4} at ({}, {}, {}) rot {}",
                brick.id, brick.type_id, brick.color_id, brick.x, brick.y, brick.z, brick.rotation_y
            );
        }
    }

    if !order.unresolved.is_empty() {
        println!();
        println!("Unresolved ({}):", order.unresolved.len());
        for brick in &order.unresolved {
            println!("    #{} at ({}, {}, {})", brick.id, brick.x, brick.y, brick.z);
        }
    }

    println!();
    println!("Parts:");
    for entry in parts {
        let color = design
            .color(entry.color_id)
            .map_or("?", |color| color.name.as_str());
        println!("    {:>4} x type {:<4} {color}", entry.count, entry.type_id);
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();

    let design = Design::load(&args.design)
        .with_context(|| format!("reading design {}", args.design.display()))?;
    let catalog = BrickCatalog::load(&args.catalog)
        .with_context(|| format!("reading catalog {}", args.catalog.display()))?;

    let order = resolve_build_order(&design, &catalog);
    let parts = parts_list(&design, &catalog);

    if args.json {
        let report = serde_json::json!({
            "levels": order.levels,
            "unresolved": order.unresolved,
            "parts": parts,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&design, &order, &parts);
    }
    Ok(())
}
