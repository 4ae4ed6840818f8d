//! Scene GLB CLI
//!
//! Export scene descriptions to GLB and validate glTF files.

use clap::{Parser, Subcommand};
use scene_glb::{export_glb, load_scene, parse_glb, validate_slice, ExportConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "scene-glb")]
#[command(author, version, about = "Export 3D scenes to binary glTF", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a JSON scene description to GLB
    Export {
        /// Input JSON file containing the scene
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (".glb" is added if there is no extension)
        #[arg(short, long, default_value = scene_glb::DEFAULT_FILE_NAME)]
        output: PathBuf,

        /// Value written to asset.generator
        #[arg(long)]
        generator: Option<String>,

        /// Fail if the exported document has validation issues
        #[arg(long)]
        strict: bool,
    },

    /// Validate a .glb or .gltf file
    Validate {
        /// File to validate
        file: PathBuf,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Export {
            input,
            output,
            generator,
            strict,
        } => {
            let mut config = ExportConfig::default().with_strict(strict);
            if let Some(generator) = generator {
                config = config.with_generator(generator);
            }
            export_scene(&input, &output, &config)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Validate { file } => validate_file(&file),
    }
}

fn export_scene(
    input_path: &Path,
    output_path: &Path,
    config: &ExportConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Loading scene from {:?}...", input_path);
    let mut scene = load_scene(input_path)?;
    let exportable = scene.traverse().filter(|n| n.is_exportable()).count();
    println!(
        "  Found {} nodes, {} with exportable geometry",
        scene.node_count(),
        exportable
    );

    let glb_path = if output_path.extension().is_some() {
        output_path.to_path_buf()
    } else {
        output_path.with_extension("glb")
    };
    let glb_data = export_glb(&mut scene, config)?;
    fs::write(&glb_path, &glb_data)?;
    println!("Exported GLB ({} bytes) to {:?}", glb_data.len(), glb_path);

    Ok(())
}

fn validate_file(path: &Path) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let data = fs::read(path)?;
    let issues = if data.starts_with(b"glTF") {
        let container = parse_glb(&data)?;
        validate_slice(container.json)
    } else {
        validate_slice(&data)
    };

    if issues.is_empty() {
        println!("{:?}: no issues found", path);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{:?}: {} issue(s)", path, issues.len());
    for issue in &issues {
        println!("  - {}", issue);
    }
    Ok(ExitCode::FAILURE)
}
