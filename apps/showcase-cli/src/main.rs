use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::{Vec2, Vec3};
use showcase_assets::{load_model, GlbBuilder};
use showcase_common::DrawSurface;
use showcase_input::{InputEvent, InputKind};
use showcase_particles::FieldConfig;
use showcase_render::{DebugTextRenderer, Frame, Renderer};
use showcase_stage::{hero_container, Stage, StageConfig};
use showcase_viewport::{LoadStatus, ViewportConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "showcase-cli", about = "Headless tool for the showcase canvas")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the stage headless and print the last frame
    Simulate {
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        #[arg(long, default_value = "1200")]
        width: u32,
        #[arg(long, default_value = "800")]
        height: u32,
        /// Particle count
        #[arg(short, long, default_value = "100")]
        particles: usize,
        /// RNG seed for a reproducible field
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Hold the pointer at `x,y` for the whole run
        #[arg(long, value_parser = parse_point)]
        pointer: Option<Vec2>,
        /// GLB to load into the viewport before the first frame
        #[arg(long)]
        model: Option<PathBuf>,
        /// Print a JSON summary instead of the text frame
        #[arg(long)]
        json: bool,
    },
    /// Print a model's raw bounds and the transform that frames it
    InspectModel { path: PathBuf },
    /// Write a small two-box GLB to try the desktop host with
    DemoModel { path: PathBuf },
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {s:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y: {e}"))?;
    Ok(Vec2::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("showcase-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("assets: {}", showcase_assets::crate_info());
            println!("viewport: {}", showcase_viewport::crate_info());
            println!("render: {}", showcase_render::crate_info());
            println!("stage: {}", showcase_stage::crate_info());
            println!("particles: default count={}", FieldConfig::default().count);
        }
        Commands::Simulate {
            ticks,
            width,
            height,
            particles,
            seed,
            pointer,
            model,
            json,
        } => {
            anyhow::ensure!(ticks > 0, "--ticks must be at least 1");
            let config = StageConfig {
                field: FieldConfig {
                    count: particles,
                    ..FieldConfig::default()
                },
                seed: Some(seed),
                ..StageConfig::default()
            };
            let frame = simulate(DrawSurface::new(width, height), config, ticks, pointer, model)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary(&frame, seed))?);
            } else {
                print!("{}", DebugTextRenderer::listing(5).render(&frame));
            }
        }
        Commands::InspectModel { path } => {
            let model = load_model(&path).with_context(|| format!("loading {}", path.display()))?;
            let b = model.bounds;
            let framing = model.framing(ViewportConfig::default().frame_size);
            println!("Model: {}", model.name);
            println!(
                "  vertices={} triangles={}",
                model.mesh.vertex_count(),
                model.mesh.triangle_count()
            );
            println!("  min=({:.3}, {:.3}, {:.3})", b.min.x, b.min.y, b.min.z);
            println!("  max=({:.3}, {:.3}, {:.3})", b.max.x, b.max.y, b.max.z);
            let size = b.size();
            println!("  size=({:.3}, {:.3}, {:.3})", size.x, size.y, size.z);
            println!("Framing:");
            println!("  scale={:.4}", framing.scale.x);
            println!(
                "  offset=({:.3}, {:.3}, {:.3})",
                framing.position.x, framing.position.y, framing.position.z
            );
        }
        Commands::DemoModel { path } => {
            let bytes = GlbBuilder::new()
                .with_box(Vec3::new(0.0, 0.5, 0.0), Vec3::new(1.0, 0.5, 0.6))
                .with_box(Vec3::new(0.0, 1.4, 0.0), Vec3::new(0.4, 0.4, 0.4))
                .build();
            std::fs::write(&path, &bytes).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {} ({} bytes)", path.display(), bytes.len());
        }
    }

    Ok(())
}

fn simulate(
    window: DrawSurface,
    config: StageConfig,
    ticks: u64,
    pointer: Option<Vec2>,
    model: Option<PathBuf>,
) -> anyhow::Result<Frame> {
    let mut stage = Stage::mount(Some(window), Some(hero_container(window)), config)
        .context("stage did not mount")?;

    if let Some(path) = model {
        stage.load_model(path);
        if let Some(vp) = stage.viewport_mut() {
            if let LoadStatus::Failed { reason } = vp.finish_loading(Duration::from_secs(30)) {
                tracing::warn!(%reason, "continuing without a model");
            }
        }
    }
    if let Some(p) = pointer {
        stage.handle_input(InputEvent::now(InputKind::PointerMove(p)));
    }

    let mut last = None;
    for _ in 0..ticks {
        last = stage.frame();
    }
    tracing::info!(
        frames = stage.frames_run(),
        avg_ms = stage.timer().average().as_secs_f64() * 1000.0,
        "simulation finished"
    );
    last.context("stage produced no frame")
}

fn summary(frame: &Frame, seed: u64) -> serde_json::Value {
    let count = frame.particles.len();
    let mean_radius = if count == 0 {
        0.0
    } else {
        frame.particles.iter().map(|c| c.radius).sum::<f32>() / count as f32
    };
    let scene = frame.scene.as_ref().map(|(rect, scene)| {
        let buffer = scene.target.physical();
        serde_json::json!({
            "rect": [rect.x, rect.y, rect.width, rect.height],
            "buffer": [buffer.width, buffer.height],
            "eye": scene.camera_position.to_array(),
            "model_vertices": scene.model.as_ref().map(|m| m.mesh.vertex_count()),
        })
    });
    serde_json::json!({
        "frame": frame.index,
        "seed": seed,
        "surface": [frame.surface.width, frame.surface.height],
        "particles": count,
        "expanded": frame.expanded,
        "mean_radius": mean_radius,
        "scene": scene,
    })
}
