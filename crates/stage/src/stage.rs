use std::path::PathBuf;
use std::time::Instant;

use glam::Vec2;
use showcase_common::DrawSurface;
use showcase_input::{EventClass, InputEvent, InputKind, InputSubscriptions, Layer};
use showcase_particles::{DrawCommand, FieldConfig, ParticleField, PointerTracker};
use showcase_render::{Frame, Rect};
use showcase_runloop::{CallbackId, FrameTimer, RenderLoop};
use showcase_viewport::{InteractionArbiter, SceneFrame, Viewport3D, ViewportConfig};

#[derive(Debug, Clone)]
pub struct StageConfig {
    pub field: FieldConfig,
    pub viewport: ViewportConfig,
    /// Fixed seed for the particle field; OS entropy when `None`.
    pub seed: Option<u64>,
    pub device_pixel_ratio: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            field: FieldConfig::default(),
            viewport: ViewportConfig::default(),
            seed: None,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Everything the frame callbacks read and write.
pub struct StageState {
    pub field: ParticleField,
    /// Particle surface: the whole window.
    pub surface: DrawSurface,
    pub pointer: PointerTracker,
    pub viewport: Option<Viewport3D>,
    pub arbiter: InteractionArbiter,
    particles: Vec<DrawCommand>,
    scene: Option<SceneFrame>,
    /// The field was spawned on a zero-area window and sits at the origin.
    spawned_degenerate: bool,
}

/// One mounted canvas: particle background, model viewport, arbiter,
/// frame loop and input listeners. Dropping it tears everything down.
pub struct Stage {
    state: StageState,
    run_loop: RenderLoop<StageState>,
    callbacks: Vec<CallbackId>,
    subscriptions: InputSubscriptions,
    container: Rect,
    cursor: Option<Vec2>,
    mounted: bool,
}

impl Stage {
    /// Mount onto a window surface and an optional model container.
    ///
    /// Without a window nothing is mounted. Without a container the
    /// particle layer still runs and the viewport is skipped.
    pub fn mount(window: Option<DrawSurface>, container: Option<Rect>, config: StageConfig) -> Option<Self> {
        let Some(window) = window else {
            tracing::warn!("no drawing surface; stage not mounted");
            return None;
        };

        let field = match config.seed {
            Some(seed) => ParticleField::seeded(window, config.field.clone(), seed),
            None => ParticleField::new(window, config.field.clone()),
        };
        let viewport = Viewport3D::mount(
            container.map(|r| r.surface()),
            config.device_pixel_ratio,
            config.viewport.clone(),
        );
        let arbiter = InteractionArbiter::new(config.viewport.rotation_policy, config.viewport.cooldown);

        let mut run_loop = RenderLoop::new();
        let callbacks = vec![
            run_loop.start(|s: &mut StageState, _| {
                let pointer = s.pointer.latest();
                s.particles = s.field.tick(s.surface, pointer);
            }),
            run_loop.start(|s: &mut StageState, info| {
                if let Some(vp) = s.viewport.as_mut() {
                    s.arbiter.tick(info.at, vp.rotation_mut());
                }
            }),
            run_loop.start(|s: &mut StageState, _| {
                s.scene = s.viewport.as_mut().and_then(Viewport3D::tick);
            }),
        ];

        let mut subscriptions = InputSubscriptions::new();
        subscriptions.subscribe(Layer::Particles, EventClass::Hover);
        if viewport.is_some() {
            subscriptions.subscribe(Layer::Viewport, EventClass::Interaction);
            subscriptions.subscribe(Layer::Viewport, EventClass::Wheel);
        }

        tracing::info!(
            width = window.width,
            height = window.height,
            particles = field.len(),
            viewport = viewport.is_some(),
            "stage mounted"
        );

        Some(Self {
            state: StageState {
                field,
                surface: window,
                pointer: PointerTracker::new(),
                viewport,
                arbiter,
                particles: Vec::new(),
                scene: None,
                spawned_degenerate: window.is_degenerate(),
            },
            run_loop,
            callbacks,
            subscriptions,
            container: container.unwrap_or_default(),
            cursor: None,
            mounted: true,
        })
    }

    pub fn state(&self) -> &StageState {
        &self.state
    }

    pub fn field(&self) -> &ParticleField {
        &self.state.field
    }

    pub fn viewport(&self) -> Option<&Viewport3D> {
        self.state.viewport.as_ref()
    }

    pub fn arbiter(&self) -> &InteractionArbiter {
        &self.state.arbiter
    }

    pub fn container(&self) -> Rect {
        self.container
    }

    pub fn timer(&self) -> &FrameTimer {
        self.run_loop.timer()
    }

    pub fn frames_run(&self) -> u64 {
        self.run_loop.frames_run()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn live_callbacks(&self) -> usize {
        self.run_loop.live_callbacks()
    }

    pub fn live_subscriptions(&self) -> usize {
        self.subscriptions.len()
    }

    /// Ask the viewport to load its model in the background.
    pub fn load_model(&mut self, path: impl Into<PathBuf>) {
        match self.state.viewport.as_mut() {
            Some(vp) => vp.load_model(path),
            None => tracing::warn!("no viewport mounted; model not loaded"),
        }
    }

    /// Mutable viewport access for hosts that attach or wait on models.
    pub fn viewport_mut(&mut self) -> Option<&mut Viewport3D> {
        self.state.viewport.as_mut()
    }

    /// Route one host input event to the listening layers.
    pub fn handle_input(&mut self, event: InputEvent) {
        if !self.mounted {
            return;
        }
        if let InputKind::PointerMove(p) = event.kind {
            self.cursor = Some(p);
        }
        for layer in self.subscriptions.route(&event) {
            match layer {
                Layer::Particles => {
                    if let InputKind::PointerMove(p) = event.kind {
                        self.state.pointer.post(p.x, p.y);
                    }
                }
                Layer::Viewport => self.viewport_input(&event),
            }
        }
    }

    fn viewport_input(&mut self, event: &InputEvent) {
        let Some(vp) = self.state.viewport.as_mut() else {
            return;
        };
        let over_container = self.cursor.is_some_and(|c| self.container.contains(c));
        if event.kind.starts_interaction() && !over_container {
            return;
        }

        self.state.arbiter.observe(event, vp.rotation_mut());
        match event.kind {
            InputKind::Drag(delta) if self.state.arbiter.is_interacting() => vp.drag(delta),
            InputKind::Wheel(notches) => vp.wheel(notches),
            _ => {}
        }
    }

    /// Apply a host resize. The particle boundary moves at once without
    /// touching existing particles; a zero-sized window or container is
    /// skipped.
    pub fn resize(&mut self, window: DrawSurface, container: Rect) {
        if !self.mounted {
            return;
        }
        if window.is_degenerate() {
            tracing::debug!(width = window.width, height = window.height, "skipping degenerate window resize");
        } else {
            if self.state.spawned_degenerate {
                self.state.field.reinitialize(window);
                self.state.spawned_degenerate = false;
            }
            self.state.surface = window;
        }

        let size = container.surface();
        if size.is_degenerate() {
            tracing::debug!(width = size.width, height = size.height, "skipping degenerate container resize");
            return;
        }
        self.container = container;
        if let Some(vp) = self.state.viewport.as_mut() {
            vp.resize(size.width, size.height);
        }
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        if let Some(vp) = self.state.viewport.as_mut() {
            vp.set_device_pixel_ratio(ratio);
        }
    }

    /// Run one frame and describe it for a renderer. `None` once torn down.
    pub fn frame(&mut self) -> Option<Frame> {
        self.frame_at(Instant::now())
    }

    /// Run one frame stamped with `now`.
    pub fn frame_at(&mut self, now: Instant) -> Option<Frame> {
        let info = self.run_loop.frame_at(&mut self.state, now)?;
        let expanded = self
            .state
            .field
            .particles()
            .iter()
            .filter(|p| p.is_expanded())
            .count();
        Some(Frame {
            index: info.index,
            surface: self.state.surface,
            particles: std::mem::take(&mut self.state.particles),
            expanded,
            scene: self.state.scene.take().map(|s| (self.container, s)),
        })
    }

    /// Stop the frame loop, release every input listener and dispose the
    /// viewport, together. Idempotent.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        for id in self.callbacks.drain(..) {
            self.run_loop.stop(id);
        }
        self.run_loop.stop_all();
        self.subscriptions.clear();
        if let Some(vp) = self.state.viewport.as_mut() {
            vp.teardown();
        }
        self.state.pointer.clear();
        self.state.particles.clear();
        self.state.scene = None;
        tracing::info!(frames = self.run_loop.frames_run(), "stage torn down");
    }
}

impl Drop for Stage {
    fn drop(&mut self) {
        self.teardown();
    }
}
