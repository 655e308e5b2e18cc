//! CLI tool for running one scene build outside the service
//!
//! Usage:
//!   cargo run --release --bin build_scene -- <features.geojson> --bbox <minx,miny,maxx,maxy> [options]
//!
//! Options:
//!   --format <xml3d|html|binary>  Output format (default: xml3d)
//!   --config <file.json>          Build configuration
//!   --output <file>               Write output here instead of stdout
//!   --pretty                      Indent the text scene
//!   --summary                     Print the scene structure instead of the output
//!
//! Inspecting a scene written earlier:
//!   cargo run --release --bin build_scene -- --read <scene.xml>
//!
//! Log verbosity follows RUST_LOG (e.g. RUST_LOG=debug).

use anyhow::{bail, Context};
use scene_mesh::feature::features_from_geojson_str;
use scene_mesh::{
    parse_scene_file, print_scene_tree, BoundingBox, OutputFormat, SceneBuilder, SceneConfig, VecCursor,
};
use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <features.geojson> --bbox <minx,miny,maxx,maxy> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --format <xml3d|html|binary>  Output format (default: xml3d)");
        eprintln!("  --config <file.json>          Build configuration");
        eprintln!("  --output <file>               Write output here instead of stdout");
        eprintln!("  --pretty                      Indent the text scene");
        eprintln!("  --summary                     Print the scene structure instead of the output");
        eprintln!();
        eprintln!("       {} --read <scene.xml>", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} buildings.geojson --bbox 0,0,1000,1000 --pretty", args[0]);
        eprintln!("  {} dem.geojson --bbox 0,0,100,100 --format binary --output dem.bin", args[0]);
        return Ok(());
    }

    if args[1] == "--read" {
        let Some(scene_path) = args.get(2) else {
            bail!("--read needs a scene file");
        };
        return summarize_scene_file(scene_path);
    }

    let input_path = &args[1];

    // Parse options
    let mut bbox: Option<BoundingBox> = None;
    let mut format = OutputFormat::SceneText;
    let mut config_path: Option<String> = None;
    let mut output_path: Option<String> = None;
    let mut pretty = false;
    let mut summary_only = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--bbox" => {
                i += 1;
                if i < args.len() {
                    bbox = Some(args[i].parse()?);
                }
            }
            "--format" => {
                i += 1;
                if i < args.len() {
                    format = args[i].parse()?;
                }
            }
            "--config" => {
                i += 1;
                if i < args.len() {
                    config_path = Some(args[i].clone());
                }
            }
            "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "--pretty" => pretty = true,
            "--summary" => summary_only = true,
            other => bail!("unknown option '{}'", other),
        }
        i += 1;
    }

    let Some(bbox) = bbox else {
        bail!("--bbox is required");
    };

    let mut config = match &config_path {
        Some(path) => SceneConfig::from_file(path)
            .with_context(|| format!("Failed to load config {}", path))?,
        None => SceneConfig::default(),
    };
    config.pretty |= pretty;

    eprintln!("Loading: {}", input_path);
    let start = Instant::now();
    let json = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path))?;
    let features = features_from_geojson_str(&json)
        .with_context(|| format!("Failed to parse {}", input_path))?;
    eprintln!("{} features parsed in {:.2}ms", features.len(), start.elapsed().as_secs_f64() * 1000.0);

    let start = Instant::now();
    let mut builder = SceneBuilder::new(bbox, config);
    builder.add_layer(&mut VecCursor::new(features))?;
    eprintln!("Layer built in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    if summary_only {
        let grid = builder.point_grid();
        let (root, stats) = builder.into_scene();
        print_scene_tree(&root, 0);
        println!();
        println!("=== Summary ===");
        println!("  Features: {}", stats.features);
        println!("  Meshes: {}", stats.meshes);
        println!("  Vertices: {}", stats.vertices);
        println!("  Points placed: {}", stats.points_placed);
        println!("  Points skipped: {}", stats.points_skipped);
        println!("  Point grid: {}x{}", grid.width(), grid.height());
        return Ok(());
    }

    let start = Instant::now();
    let stats = match &output_path {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("Failed to create {}", path))?;
            let mut writer = BufWriter::new(file);
            builder.finalize_and_write(format, &mut writer)?
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            let stats = builder.finalize_and_write(format, &mut writer)?;
            if format != OutputFormat::BinaryGrid {
                writer.write_all(b"\n")?;
            }
            stats
        }
    };
    eprintln!(
        "Written as {} in {:.2}ms ({} meshes, {} vertices)",
        format.mime_type(),
        start.elapsed().as_secs_f64() * 1000.0,
        stats.meshes,
        stats.vertices
    );

    Ok(())
}

/// Print the structure of a text scene document and count its meshes
fn summarize_scene_file(path: &str) -> anyhow::Result<()> {
    let start = Instant::now();
    let root = parse_scene_file(path).with_context(|| format!("Failed to read scene {}", path))?;
    eprintln!("Scene parsed in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    print_scene_tree(&root, 0);

    let meshes = root.find_all("mesh");
    let vertices: usize = meshes
        .iter()
        .flat_map(|mesh| mesh.children.iter())
        .filter(|child| child.attribute("name") == Some("position"))
        .filter_map(|child| child.text.as_deref())
        .map(|text| text.split_whitespace().count() / 3)
        .sum();
    println!();
    println!("=== Summary ===");
    println!("  Mesh nodes: {}", meshes.len());
    println!("  Vertices: {}", vertices);
    Ok(())
}
