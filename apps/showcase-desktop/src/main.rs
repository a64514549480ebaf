mod translate;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use showcase_common::DrawSurface;
use showcase_input::{InputEvent, InputKind};
use showcase_particles::FieldConfig;
use showcase_render::Frame;
use showcase_render_wgpu::WgpuRenderer;
use showcase_stage::{hero_container, Stage, StageConfig};
use showcase_viewport::{LoadStatus, RotationPolicy, ViewportConfig};
use tracing_subscriber::EnvFilter;
use translate::PointerTranslator;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "showcase-desktop", about = "Particle background with a rotating product model")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Binary glTF model shown in the viewport
    #[arg(long, default_value = "assets/Waste1.glb")]
    asset: PathBuf,

    /// Particle count
    #[arg(long)]
    particles: Option<usize>,

    /// Fixed seed for the particle field
    #[arg(long)]
    seed: Option<u64>,

    /// Stop auto-rotation while the user is interacting
    #[arg(long)]
    suspend_rotation: bool,
}

impl Cli {
    fn stage_config(&self) -> StageConfig {
        let defaults = FieldConfig::default();
        StageConfig {
            field: FieldConfig {
                count: self.particles.unwrap_or(defaults.count),
                ..defaults
            },
            viewport: ViewportConfig {
                rotation_policy: if self.suspend_rotation {
                    RotationPolicy::SuspendWhileInteracting
                } else {
                    RotationPolicy::Parity
                },
                ..ViewportConfig::default()
            },
            seed: self.seed,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Window-independent application state.
struct AppState {
    config: StageConfig,
    asset: PathBuf,
    stage: Option<Stage>,
    pointer: PointerTranslator,
    show_overlay: bool,
    /// Particle counts of the last rendered frame, for the overlay.
    last_counts: (usize, usize),
}

impl AppState {
    fn new(cli: &Cli) -> Self {
        Self {
            config: cli.stage_config(),
            asset: cli.asset.clone(),
            stage: None,
            pointer: PointerTranslator::new(),
            show_overlay: false,
            last_counts: (0, 0),
        }
    }

    fn mount(&mut self, window: DrawSurface, scale_factor: f64) {
        let config = StageConfig {
            device_pixel_ratio: scale_factor as f32,
            ..self.config.clone()
        };
        self.stage = Stage::mount(Some(window), Some(hero_container(window)), config);
        if let Some(stage) = &mut self.stage {
            stage.load_model(self.asset.clone());
        }
    }

    fn send(&mut self, kind: InputKind) {
        if let Some(stage) = &mut self.stage {
            stage.handle_input(InputEvent::now(kind));
        }
    }

    fn resize(&mut self, window: DrawSurface) {
        if let Some(stage) = &mut self.stage {
            stage.resize(window, hero_container(window));
        }
    }

    fn frame(&mut self) -> Option<Frame> {
        let frame = self.stage.as_mut()?.frame()?;
        self.last_counts = (frame.particles.len(), frame.expanded);
        Some(frame)
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed && key == KeyCode::F1 {
            self.show_overlay = !self.show_overlay;
        }
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if !self.show_overlay {
            return;
        }
        let Some(stage) = &self.stage else {
            return;
        };

        egui::Window::new("Diagnostics")
            .default_width(260.0)
            .resizable(false)
            .show(ctx, |ui| {
                let timer = stage.timer();
                ui.label(format!("Frames: {}", stage.frames_run()));
                ui.label(format!(
                    "FPS: {:.1}  avg {:.2} ms  max {:.2} ms",
                    timer.fps(),
                    timer.average().as_secs_f64() * 1000.0,
                    timer.max().as_secs_f64() * 1000.0
                ));
                let (count, expanded) = self.last_counts;
                ui.label(format!("Particles: {count} ({expanded} expanded)"));
                ui.separator();

                ui.label(format!("Arbiter: {:?}", stage.arbiter().state()));
                ui.label(format!("Policy: {:?}", stage.arbiter().policy()));
                if let Some(vp) = stage.viewport() {
                    ui.label(format!("Auto-rotate: {}", vp.rotation().enabled()));
                    let status = match vp.status() {
                        LoadStatus::NotRequested => "not requested".to_string(),
                        LoadStatus::Loading { path } => format!("loading {}", path.display()),
                        LoadStatus::Loaded { name } => format!("loaded {name}"),
                        LoadStatus::Failed { reason } => format!("failed: {reason}"),
                    };
                    ui.label(format!("Model: {status}"));
                    let target = vp.target();
                    let buffer = target.physical();
                    ui.label(format!(
                        "Buffer: {}x{} @ {:.2}x",
                        buffer.width,
                        buffer.height,
                        target.pixel_ratio()
                    ));
                    let eye = vp.camera().position;
                    ui.label(format!("Camera: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
                } else {
                    ui.label("Viewport: not mounted");
                }

                ui.separator();
                ui.small("F1: Toggle overlay | LMB: Rotate | Wheel: Zoom");
            });
    }
}

/// Everything that exists only once a window is up.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, egui_ctx: &EguiContext) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("Showcase")
            .with_inner_size(PhysicalSize::new(1280u32, 720));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("find adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("showcase_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = WgpuRenderer::new(&device, surface_format);

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Window size in logical pixels, the unit the stage works in.
    fn logical_size(&self) -> DrawSurface {
        logical_surface(self.window.inner_size(), self.window.scale_factor())
    }

    fn configure(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
    }
}

fn logical_surface(size: PhysicalSize<u32>, scale_factor: f64) -> DrawSurface {
    let logical: LogicalSize<f64> = size.to_logical(scale_factor);
    DrawSurface::new(logical.width.round() as u32, logical.height.round() as u32)
}

fn logical_point(position: PhysicalPosition<f64>, scale_factor: f64) -> Vec2 {
    let p = position.to_logical::<f64>(scale_factor);
    Vec2::new(p.x as f32, p.y as f32)
}

struct ShowcaseApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
}

impl ShowcaseApp {
    fn new(cli: &Cli) -> Self {
        Self {
            state: AppState::new(cli),
            gpu: None,
            egui_ctx: EguiContext::default(),
        }
    }

    fn redraw(&mut self) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        let Some(frame) = self.state.frame() else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &frame);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx);
        });
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for ShowcaseApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        let gpu = match Gpu::new(event_loop, &self.egui_ctx) {
            Ok(gpu) => gpu,
            Err(e) => {
                tracing::error!("failed to initialize graphics: {e:#}");
                event_loop.exit();
                return;
            }
        };
        self.state
            .mount(gpu.logical_size(), gpu.window.scale_factor());
        self.gpu = Some(gpu);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        if gpu.egui_winit.on_window_event(&gpu.window, &event).consumed {
            return;
        }
        let scale_factor = gpu.window.scale_factor();

        match event {
            WindowEvent::CloseRequested => {
                if let Some(stage) = &mut self.state.stage {
                    stage.teardown();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                gpu.configure(new_size);
                self.state.resize(logical_surface(new_size, scale_factor));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(stage) = &mut self.state.stage {
                    stage.set_device_pixel_ratio(scale_factor as f32);
                }
                let size = gpu.logical_size();
                self.state.resize(size);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state
                    .handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let at = logical_point(position, scale_factor);
                for kind in self.state.pointer.cursor_moved(at) {
                    self.state.send(kind);
                }
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: btn_state,
                ..
            } => {
                if let Some(kind) = self
                    .state
                    .pointer
                    .primary_button(btn_state == ElementState::Pressed)
                {
                    self.state.send(kind);
                }
            }
            WindowEvent::Touch(touch) => {
                let at = logical_point(touch.location, scale_factor);
                for kind in self.state.pointer.touch(touch.id, touch.phase, at) {
                    self.state.send(kind);
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(kind) = self.state.pointer.wheel(delta) {
                    self.state.send(kind);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!(asset = %cli.asset.display(), "showcase-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = ShowcaseApp::new(&cli);
    event_loop.run_app(&mut app)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_shape_stage_config() {
        let cli = Cli::parse_from([
            "showcase-desktop",
            "--particles",
            "12",
            "--seed",
            "9",
            "--suspend-rotation",
        ]);
        let config = cli.stage_config();
        assert_eq!(config.field.count, 12);
        assert_eq!(config.seed, Some(9));
        assert_eq!(
            config.viewport.rotation_policy,
            RotationPolicy::SuspendWhileInteracting
        );
        assert_eq!(cli.asset, PathBuf::from("assets/Waste1.glb"));
    }

    #[test]
    fn defaults_keep_parity_rotation() {
        let cli = Cli::parse_from(["showcase-desktop"]);
        let config = cli.stage_config();
        assert_eq!(config.field.count, FieldConfig::default().count);
        assert_eq!(config.viewport.rotation_policy, RotationPolicy::Parity);
    }

    #[test]
    fn logical_conversion_divides_by_scale() {
        assert_eq!(
            logical_surface(PhysicalSize::new(2400, 1600), 2.0),
            DrawSurface::new(1200, 800)
        );
        assert_eq!(
            logical_point(PhysicalPosition::new(100.0, 50.0), 2.0),
            Vec2::new(50.0, 25.0)
        );
    }

    #[test]
    fn f1_toggles_overlay() {
        let cli = Cli::parse_from(["showcase-desktop"]);
        let mut state = AppState::new(&cli);
        state.handle_key(KeyCode::F1, true);
        assert!(state.show_overlay);
        state.handle_key(KeyCode::F1, false);
        assert!(state.show_overlay);
        state.handle_key(KeyCode::F1, true);
        assert!(!state.show_overlay);
    }

    #[test]
    fn headless_state_runs_frames() {
        let cli = Cli::parse_from(["showcase-desktop", "--particles", "5", "--seed", "1"]);
        let mut state = AppState::new(&cli);
        state.asset = PathBuf::from("does/not/exist.glb");
        state.mount(DrawSurface::new(800, 600), 2.0);
        state.send(InputKind::PointerMove(Vec2::new(10.0, 10.0)));
        let frame = state.frame().unwrap();
        assert_eq!(frame.particles.len(), 5);
        assert_eq!(state.last_counts.0, 5);
    }
}
