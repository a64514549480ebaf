use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use glam::{Mat4, Quat, Vec2, Vec3};
use showcase_assets::{Aabb, AssetError, MeshData, Model};
use showcase_common::{Color, DrawSurface, Transform};

use crate::arbiter::{AutoRotate, RotationPolicy};
use crate::camera::PerspectiveCamera;
use crate::lights::LightRig;
use crate::orbit::{OrbitControls, OrbitSettings};
use crate::target::RenderTarget;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewportConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: Vec3,
    pub target: Vec3,
    pub max_pixel_ratio: f32,
    /// Side of the cube every model is scaled to fill.
    pub frame_size: f32,
    /// Auto-rotate yaw per frame, in radians.
    pub yaw_step: f32,
    pub cooldown: Duration,
    pub rotation_policy: RotationPolicy,
    pub orbit: OrbitSettings,
    pub clear_color: Color,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 25.0,
            near: 0.1,
            far: 100.0,
            camera_position: Vec3::new(-10.0, 4.0, 12.0),
            target: Vec3::ZERO,
            max_pixel_ratio: 2.0,
            frame_size: 5.0,
            yaw_step: 0.002,
            cooldown: Duration::from_millis(30),
            rotation_policy: RotationPolicy::default(),
            orbit: OrbitSettings::default(),
            clear_color: Color::TRANSPARENT,
        }
    }
}

/// Where the viewport's single model is in its life.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    NotRequested,
    Loading { path: PathBuf },
    Loaded { name: String },
    /// Non-fatal: the viewport keeps showing the lit, empty scene.
    Failed { reason: String },
}

/// The attached model: shared geometry plus its framing and spin.
#[derive(Debug, Clone)]
pub struct AttachedModel {
    pub name: String,
    pub mesh: Arc<MeshData>,
    /// Bounds in the model's own frame at load time.
    pub bounds: Aabb,
    /// Centers and scales the model into the canonical frame.
    pub framing: Transform,
    pub yaw: f32,
}

impl AttachedModel {
    fn from_model(model: Model, frame_size: f32) -> Self {
        let framing = model.framing(frame_size);
        Self {
            name: model.name,
            mesh: Arc::new(model.mesh),
            bounds: model.bounds,
            framing,
            yaw: 0.0,
        }
    }

    /// World matrix: frame first, then spin about the vertical axis
    /// through the origin.
    pub fn world_matrix(&self) -> Mat4 {
        Mat4::from_quat(Quat::from_rotation_y(self.yaw)) * self.framing.matrix()
    }
}

/// A model as a renderer sees it for one frame.
#[derive(Debug, Clone)]
pub struct ModelInstance {
    pub world: Mat4,
    pub mesh: Arc<MeshData>,
}

/// Everything a backend needs to draw the 3D layer for one frame.
#[derive(Debug, Clone)]
pub struct SceneFrame {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub model: Option<ModelInstance>,
    pub lights: LightRig,
    pub clear_color: Color,
    pub target: RenderTarget,
}

type LoadResult = Result<Model, AssetError>;

/// Camera, lights, render target and at most one model.
///
/// Model loading happens on a background thread; its result arrives
/// through a one-shot channel that [`Viewport3D::tick`] drains, so the
/// model is centered, scaled and attached in a single step on the frame
/// thread.
pub struct Viewport3D {
    config: ViewportConfig,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    lights: LightRig,
    target: RenderTarget,
    rotation: AutoRotate,
    model: Option<AttachedModel>,
    pending: Option<Receiver<LoadResult>>,
    status: LoadStatus,
    mounted: bool,
}

impl Viewport3D {
    /// Mount onto a container. With no container there is nothing to draw
    /// into; that is logged and no viewport is created.
    pub fn mount(
        container: Option<DrawSurface>,
        device_pixel_ratio: f32,
        config: ViewportConfig,
    ) -> Option<Self> {
        let Some(container) = container else {
            tracing::warn!("viewport has no container; not mounting");
            return None;
        };

        let mut camera = PerspectiveCamera::new(
            config.camera_position,
            config.target,
            config.fov_degrees,
            config.near,
            config.far,
        );
        camera.set_viewport_size(container.width, container.height);
        let target = RenderTarget::new(container, device_pixel_ratio, config.max_pixel_ratio);

        tracing::info!(
            width = container.width,
            height = container.height,
            pixel_ratio = target.pixel_ratio(),
            "viewport mounted"
        );

        Some(Self {
            controls: OrbitControls::new(config.orbit),
            camera,
            lights: LightRig::default(),
            target,
            rotation: AutoRotate::default(),
            model: None,
            pending: None,
            status: LoadStatus::NotRequested,
            mounted: true,
            config,
        })
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn lights(&self) -> &LightRig {
        &self.lights
    }

    pub fn target(&self) -> &RenderTarget {
        &self.target
    }

    pub fn model(&self) -> Option<&AttachedModel> {
        self.model.as_ref()
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn rotation(&self) -> &AutoRotate {
        &self.rotation
    }

    /// The auto-rotate state, for the interaction arbiter.
    pub fn rotation_mut(&mut self) -> &mut AutoRotate {
        &mut self.rotation
    }

    /// Start loading the viewport's one model in the background.
    ///
    /// Ignored once a model is attached or a load is in flight.
    pub fn load_model(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        if !self.mounted {
            tracing::warn!(path = %path.display(), "load requested on unmounted viewport");
            return;
        }
        if self.model.is_some() || self.pending.is_some() {
            tracing::warn!(path = %path.display(), "viewport already has a model; ignoring load");
            return;
        }

        let (tx, rx) = mpsc::channel();
        let job_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // The receiver is gone if the viewport was torn down.
                let _ = tx.send(showcase_assets::load_model(&job_path));
            });

        match spawned {
            Ok(_) => {
                tracing::info!(path = %path.display(), "model load started");
                self.pending = Some(rx);
                self.status = LoadStatus::Loading { path };
            }
            Err(e) => {
                tracing::error!(error = %e, "could not start model loader");
                self.status = LoadStatus::Failed {
                    reason: e.to_string(),
                };
            }
        }
    }

    /// Attach an already-decoded model, as a completed load would.
    pub fn attach(&mut self, model: Model) {
        self.complete(Ok(model));
    }

    /// Block until a pending load resolves or `timeout` passes.
    pub fn finish_loading(&mut self, timeout: Duration) -> &LoadStatus {
        if let Some(rx) = self.pending.take() {
            match rx.recv_timeout(timeout) {
                Ok(result) => self.complete(result),
                Err(RecvTimeoutError::Timeout) => self.pending = Some(rx),
                Err(RecvTimeoutError::Disconnected) => self.loader_vanished(),
            }
        }
        &self.status
    }

    fn poll_load(&mut self) {
        let Some(rx) = self.pending.take() else {
            return;
        };
        match rx.try_recv() {
            Ok(result) => self.complete(result),
            Err(TryRecvError::Empty) => self.pending = Some(rx),
            Err(TryRecvError::Disconnected) => self.loader_vanished(),
        }
    }

    fn loader_vanished(&mut self) {
        tracing::error!("model loader exited without a result");
        self.status = LoadStatus::Failed {
            reason: "loader exited without a result".into(),
        };
    }

    fn complete(&mut self, result: LoadResult) {
        if !self.mounted {
            tracing::debug!("discarding model load for torn-down viewport");
            return;
        }
        match result {
            Ok(model) => {
                if self.model.is_some() {
                    tracing::warn!(name = %model.name, "second model completion ignored");
                    return;
                }
                let attached = AttachedModel::from_model(model, self.config.frame_size);
                tracing::info!(
                    name = %attached.name,
                    scale = attached.framing.scale.x,
                    center = ?attached.bounds.center(),
                    "model attached"
                );
                self.status = LoadStatus::Loaded {
                    name: attached.name.clone(),
                };
                self.model = Some(attached);
            }
            Err(e) => {
                tracing::error!(error = %e, "model failed to load; showing lights only");
                self.status = LoadStatus::Failed {
                    reason: e.to_string(),
                };
            }
        }
    }

    /// Adapt to a new container size. Zero or unchanged sizes are skipped;
    /// returns whether anything changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let size = DrawSurface::new(width, height);
        if size.is_degenerate() {
            tracing::debug!(width, height, "skipping degenerate viewport resize");
            return false;
        }
        if !self.target.resize(size) {
            return false;
        }
        self.camera.set_viewport_size(width, height);
        tracing::debug!(width, height, "viewport resized");
        true
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f32) {
        self.target.set_device_pixel_ratio(ratio);
    }

    /// Rotate the camera for a pointer drag.
    pub fn drag(&mut self, pixels: Vec2) {
        self.controls
            .rotate_by_pixels(pixels, self.target.logical().height);
    }

    /// Dolly the camera for wheel travel.
    pub fn wheel(&mut self, notches: f32) {
        self.controls.dolly(notches);
    }

    /// Pan the camera; a no-op unless panning is enabled.
    pub fn pan(&mut self, pixels: Vec2) -> bool {
        let height = self.target.logical().height;
        self.controls.pan(&mut self.camera, pixels, height)
    }

    /// Advance one frame: apply any finished load, spin the model, settle
    /// the orbit controls and describe the scene. `None` once torn down.
    pub fn tick(&mut self) -> Option<SceneFrame> {
        if !self.mounted {
            return None;
        }
        self.poll_load();

        if self.rotation.enabled() {
            if let Some(model) = self.model.as_mut() {
                model.yaw = (model.yaw + self.config.yaw_step).rem_euclid(std::f32::consts::TAU);
            }
        }
        self.controls.update(&mut self.camera);

        Some(self.scene_frame())
    }

    /// Describe the scene as it stands, without advancing it.
    pub fn scene_frame(&self) -> SceneFrame {
        let view = self.camera.view_matrix();
        let projection = self.camera.projection_matrix();
        SceneFrame {
            view,
            projection,
            view_projection: projection * view,
            camera_position: self.camera.position,
            model: self.model.as_ref().map(|m| ModelInstance {
                world: m.world_matrix(),
                mesh: Arc::clone(&m.mesh),
            }),
            lights: self.lights,
            clear_color: self.config.clear_color,
            target: self.target,
        }
    }

    /// Unmount: dispose the model and drop any in-flight load. Idempotent.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.pending = None;
        if let Some(model) = self.model.take() {
            tracing::debug!(name = %model.name, "model disposed");
        }
        tracing::info!("viewport torn down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use showcase_assets::GlbBuilder;
    use std::io::Write;

    fn mounted() -> Viewport3D {
        Viewport3D::mount(Some(DrawSurface::new(400, 300)), 1.0, ViewportConfig::default()).unwrap()
    }

    fn box_model(center: Vec3, half: Vec3) -> Model {
        let bytes = GlbBuilder::new().with_box(center, half).build();
        Model::from_glb_bytes("box", &bytes).unwrap()
    }

    #[test]
    fn mount_without_container_yields_nothing() {
        assert!(Viewport3D::mount(None, 1.0, ViewportConfig::default()).is_none());
    }

    #[test]
    fn mount_sets_camera_and_target() {
        let vp = Viewport3D::mount(Some(DrawSurface::new(400, 200)), 3.0, ViewportConfig::default())
            .unwrap();
        assert_eq!(vp.camera().aspect, 2.0);
        assert_eq!(vp.target().pixel_ratio(), 2.0);
        assert_eq!(vp.target().physical(), DrawSurface::new(800, 400));
        assert_eq!(vp.status(), &LoadStatus::NotRequested);
        assert!(vp.rotation().enabled());
    }

    #[test]
    fn same_size_resize_is_idempotent() {
        let mut vp = mounted();
        assert!(vp.resize(640, 480));
        let cam = *vp.camera();
        let target = *vp.target();
        assert!(!vp.resize(640, 480));
        assert_eq!(*vp.camera(), cam);
        assert_eq!(*vp.target(), target);
    }

    #[test]
    fn zero_resize_keeps_prior_state() {
        let mut vp = mounted();
        let cam = *vp.camera();
        assert!(!vp.resize(0, 300));
        assert!(!vp.resize(400, 0));
        assert_eq!(*vp.camera(), cam);
        assert_eq!(vp.target().logical(), DrawSurface::new(400, 300));
        let frame = vp.tick().unwrap();
        assert!(!frame.view_projection.is_nan());
    }

    #[test]
    fn failed_load_leaves_lit_empty_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut vp = mounted();
        vp.load_model(dir.path().join("missing.glb"));
        assert!(matches!(vp.status(), LoadStatus::Loading { .. }));
        let status = vp.finish_loading(Duration::from_secs(10)).clone();
        assert!(matches!(status, LoadStatus::Failed { .. }));

        let frame = vp.tick().unwrap();
        assert!(frame.model.is_none());
        assert_eq!(frame.lights, LightRig::default());
        assert!(vp.resize(800, 600));
        assert_eq!(vp.camera().aspect, 800.0 / 600.0);
    }

    #[test]
    fn malformed_asset_fails_without_killing_host() {
        let json = br#"{
            "nodes":[{"mesh":0}],
            "meshes":[{"primitives":[{"attributes":{"POSITION":0}}]}],
            "accessors":[{"componentType":5126,"count":1000000000000,"type":"VEC3"}]
        }"#;
        let mut tmp = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        tmp.write_all(&showcase_assets::encode_glb(json, None)).unwrap();

        let mut vp = mounted();
        vp.load_model(tmp.path());
        let status = vp.finish_loading(Duration::from_secs(10)).clone();
        assert!(matches!(status, LoadStatus::Failed { .. }));
        assert!(vp.tick().unwrap().model.is_none());
    }

    #[test]
    fn loaded_model_is_centered_and_framed() {
        let mut tmp = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        let bytes = GlbBuilder::new()
            .with_box(Vec3::new(40.0, -3.0, 12.0), Vec3::new(8.0, 2.0, 1.0))
            .build();
        tmp.write_all(&bytes).unwrap();

        let mut vp = mounted();
        vp.load_model(tmp.path());
        assert!(matches!(vp.finish_loading(Duration::from_secs(10)), LoadStatus::Loaded { .. }));

        let model = vp.model().unwrap();
        let framed = model.bounds.transformed(&model.framing);
        assert!(framed.center().length() < 1e-3);
        assert!((framed.max_extent() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn auto_rotate_spins_attached_model_only() {
        let mut vp = mounted();
        vp.tick();
        assert!(vp.model().is_none());

        vp.attach(box_model(Vec3::ZERO, Vec3::ONE));
        vp.tick();
        vp.tick();
        let yaw = vp.model().unwrap().yaw;
        assert!((yaw - 0.004).abs() < 1e-6);
    }

    #[test]
    fn second_model_is_never_attached() {
        let mut vp = mounted();
        vp.attach(box_model(Vec3::ZERO, Vec3::ONE));
        vp.attach(box_model(Vec3::splat(9.0), Vec3::ONE));
        assert_eq!(vp.model().unwrap().bounds.center(), Vec3::ZERO);

        vp.load_model("ignored.glb");
        assert!(matches!(vp.status(), LoadStatus::Loaded { .. }));
    }

    #[test]
    fn teardown_discards_late_completion() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(&GlbBuilder::new().with_box(Vec3::ZERO, Vec3::ONE).build())
            .unwrap();

        let mut vp = mounted();
        vp.load_model(tmp.path());
        vp.teardown();
        vp.teardown();
        assert!(!vp.is_mounted());
        assert!(vp.tick().is_none());
        vp.finish_loading(Duration::from_millis(50));
        assert!(vp.model().is_none());
        vp.attach(box_model(Vec3::ZERO, Vec3::ONE));
        assert!(vp.model().is_none());
    }

    #[test]
    fn scene_frame_carries_model_world_matrix() {
        let mut vp = mounted();
        vp.attach(box_model(Vec3::new(10.0, 0.0, 0.0), Vec3::splat(0.5)));
        let frame = vp.tick().unwrap();
        let instance = frame.model.unwrap();
        let c = instance.world.transform_point3(Vec3::new(10.0, 0.0, 0.0));
        assert!(c.length() < 1e-3);
        assert_eq!(frame.clear_color, Color::TRANSPARENT);
        assert_eq!(instance.mesh.triangle_count(), 12);
    }
}
