//! # Hangar CLI
//!
//! Command-line interface for the Hangar repair pipeline.
//!
//! Scenes are JSON snapshots of [`hangar_scene::MemoryScene`], so the whole
//! pipeline can run headless against exported fixtures.
//!
//! ## Commands
//! - `inspect` - Summarize a scene file
//! - `classify` - Run classification and print the resulting lists
//! - `repair` - Run the full pipeline: classify, finalize, assign materials

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use hangar_repair::{
    analyze_materials, assign_materials, classify, finalize, resolve_key, specify_body,
    ClassifyOptions, DiscardMode, RepairSession, SpecifyOutcome, Vehicle,
};
use hangar_scene::{MemoryScene, SceneRepository};

/// Vehicle model repair pipeline
#[derive(Parser)]
#[command(name = "hangar")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Scene snapshot to operate on (JSON)
    #[arg(short, long)]
    pub scene: PathBuf,

    /// Write the modified scene here instead of printing a summary only
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the scene's collections, objects, and materials
    Inspect,

    /// Classify work-collection objects into keep and discard groups
    Classify {
        /// Vehicle kind, selects the work collection
        #[arg(short = 'k', long, default_value = "ground")]
        vehicle: VehicleArg,

        /// Reroute pylon and drop-tank groups to the discard list (air only)
        #[arg(long)]
        keep_body_only: bool,

        /// Group objects sharing this object's texture as the body
        #[arg(short, long)]
        body: Option<String>,
    },

    /// Run classification, finalize the lists, and synthesize materials
    Repair {
        /// Vehicle kind, selects the work collection
        #[arg(short = 'k', long, default_value = "ground")]
        vehicle: VehicleArg,

        /// What to do with discard groups
        #[arg(short, long, default_value = "archive")]
        discard_mode: DiscardArg,

        /// Reroute pylon and drop-tank groups to the discard list (air only)
        #[arg(long)]
        keep_body_only: bool,

        /// Group objects sharing this object's texture as the body
        #[arg(short, long)]
        body: Option<String>,
    },
}

/// Vehicle kind as a CLI value
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum VehicleArg {
    Ground,
    Air,
}

impl From<VehicleArg> for Vehicle {
    fn from(arg: VehicleArg) -> Self {
        match arg {
            VehicleArg::Ground => Vehicle::Ground,
            VehicleArg::Air => Vehicle::Air,
        }
    }
}

/// Discard handling as a CLI value
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DiscardArg {
    Archive,
    Delete,
}

impl From<DiscardArg> for DiscardMode {
    fn from(arg: DiscardArg) -> Self {
        match arg {
            DiscardArg::Archive => DiscardMode::Archive,
            DiscardArg::Delete => DiscardMode::Delete,
        }
    }
}

/// Execute the CLI command
pub fn execute(cli: Cli) -> Result<()> {
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut scene = load_scene(&cli.scene)?;

    match cli.command {
        Commands::Inspect => {
            inspect(&scene);
        }

        Commands::Classify {
            vehicle,
            keep_body_only,
            body,
        } => {
            let mut session = RepairSession::new(vehicle.into());
            run_classify(&mut scene, &mut session, keep_body_only, body.as_deref())?;
            print_lists(&session);
        }

        Commands::Repair {
            vehicle,
            discard_mode,
            keep_body_only,
            body,
        } => {
            let mut session = RepairSession::new(vehicle.into());
            run_classify(&mut scene, &mut session, keep_body_only, body.as_deref())?;
            print_lists(&session);

            if let Some(report) = finalize(&mut scene, &mut session, discard_mode.into())? {
                log::info!(
                    "Finalized: {} groups renamed, {} objects discarded",
                    report.renamed,
                    report.discarded_objects
                );
            }

            let plan = analyze_materials(&mut scene, session.vehicle())?;
            if plan.is_empty() {
                log::info!("No groups, skipping material assignment");
            } else {
                let report = assign_materials(&mut scene, session.vehicle(), &plan)?;
                log::info!(
                    "Materials: {} objects assigned, {} stale materials removed",
                    report.objects_assigned,
                    report.materials_removed
                );
            }
        }
    }

    if let Some(output) = cli.output {
        save_scene(&scene, &output)?;
        log::info!("Scene written to {}", output.display());
    }

    Ok(())
}

fn run_classify(
    scene: &mut MemoryScene,
    session: &mut RepairSession,
    keep_body_only: bool,
    body: Option<&str>,
) -> Result<()> {
    // The body group is carved out of the ungrouped roots before the
    // classifier runs, so body-key objects never land in an inferred group.
    if let Some(body) = body {
        if session.vehicle() == Vehicle::Air {
            match specify_body(scene, session, body)? {
                SpecifyOutcome::Grouped(count) => {
                    log::info!("Body group collected {count} objects");
                }
                SpecifyOutcome::GroupExists(group) => {
                    log::warn!("Body group '{group}' already exists");
                }
                SpecifyOutcome::NoMatches => {
                    log::warn!("No objects share the body texture of '{body}'");
                }
            }
        } else {
            log::warn!("--body applies to air vehicles only, ignoring");
        }
    }

    let options = ClassifyOptions { keep_body_only };
    let report = classify(scene, session, options)?;
    log::info!(
        "Classified {} objects into {} keep / {} discard groups",
        report.grouped_objects,
        report.keep_groups,
        report.discard_groups
    );
    Ok(())
}

fn inspect(scene: &MemoryScene) {
    for vehicle in [Vehicle::Ground, Vehicle::Air] {
        let work = vehicle.work_collection();
        if !scene.has_collection(work) {
            continue;
        }
        let roots = scene.collection_objects(work);
        println!(
            "{work}: {} root objects, {} groups",
            roots.len(),
            scene.child_collections(work).len()
        );
        for object in &roots {
            match resolve_key(scene, object) {
                Some(key) => println!("  {object}: {key}"),
                None => println!("  {object}: <no texture>"),
            }
        }
        for group in scene.child_collections(work) {
            println!("  {group}: {} objects", scene.collection_objects(&group).len());
        }
    }
    println!("{} materials total", scene.material_names().len());
}

fn print_lists(session: &RepairSession) {
    println!("Keep:");
    for name in session.keep.entries() {
        println!("  {name}");
    }
    println!("Discard:");
    for name in session.discard.entries() {
        println!("  {name}");
    }
}

fn load_scene(path: &PathBuf) -> Result<MemoryScene> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene file {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("failed to parse scene file {}", path.display()))
}

fn save_scene(scene: &MemoryScene, path: &PathBuf) -> Result<()> {
    let data = serde_json::to_string_pretty(scene).context("failed to serialize scene")?;
    fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
