use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::camera::PerspectiveCamera;

const POLAR_EPSILON: f32 = 1e-6;

/// Orbit-control limits and feel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub enable_zoom: bool,
    pub enable_pan: bool,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle bounds in radians, measured from +Y.
    pub min_polar: f32,
    pub max_polar: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            enable_zoom: true,
            enable_pan: false,
            min_distance: 6.0,
            max_distance: 18.0,
            min_polar: PI / 6.0,
            max_polar: PI / 2.2,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
        }
    }
}

/// Radius, polar angle from +Y, azimuth around +Y starting at +Z.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Spherical {
    radius: f32,
    phi: f32,
    theta: f32,
}

impl Spherical {
    fn from_offset(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self { radius, phi: 0.0, theta: 0.0 };
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vec3 {
        let sin_phi = self.phi.sin();
        Vec3::new(
            self.radius * sin_phi * self.theta.sin(),
            self.radius * self.phi.cos(),
            self.radius * sin_phi * self.theta.cos(),
        )
    }
}

/// Orbit camera controls: drag to rotate around the target, wheel to dolly.
///
/// Input only accumulates a pending delta; [`OrbitControls::update`]
/// applies it to the camera once per frame, clamping polar angle and
/// distance, and decays it when damping is enabled.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    settings: OrbitSettings,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    pub fn settings(&self) -> &OrbitSettings {
        &self.settings
    }

    /// Queue a rotation for a pointer drag of `pixels` inside a container
    /// `container_height` pixels tall.
    pub fn rotate_by_pixels(&mut self, pixels: Vec2, container_height: u32) {
        if container_height == 0 {
            return;
        }
        let per_pixel = TAU / container_height as f32 * self.settings.rotate_speed;
        self.delta_theta -= pixels.x * per_pixel;
        self.delta_phi -= pixels.y * per_pixel;
    }

    /// Queue a dolly for `notches` of wheel travel; positive moves closer.
    pub fn dolly(&mut self, notches: f32) {
        if !self.settings.enable_zoom || notches == 0.0 {
            return;
        }
        let step = 0.95_f32.powf(self.settings.zoom_speed);
        if notches > 0.0 {
            self.scale *= step;
        } else {
            self.scale /= step;
        }
    }

    /// Slide camera and target sideways by a drag of `pixels`; ignored
    /// while panning is disabled. Returns whether the pan was applied.
    pub fn pan(&mut self, camera: &mut PerspectiveCamera, pixels: Vec2, container_height: u32) -> bool {
        if !self.settings.enable_pan {
            tracing::trace!("pan ignored: disabled");
            return false;
        }
        if container_height == 0 {
            return false;
        }
        let per_pixel = 2.0 * camera.distance() * (camera.fov * 0.5).tan() / container_height as f32;
        let right = camera.forward().cross(Vec3::Y).normalize_or_zero();
        let up = right.cross(camera.forward()).normalize_or_zero();
        let offset = (-right * pixels.x + up * pixels.y) * per_pixel;
        camera.position += offset;
        camera.target += offset;
        true
    }

    /// True while a rotation is still settling.
    pub fn is_settling(&self) -> bool {
        self.delta_theta.abs() > POLAR_EPSILON || self.delta_phi.abs() > POLAR_EPSILON
    }

    /// Apply the pending delta to `camera`.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let s = &self.settings;
        let mut sph = Spherical::from_offset(camera.position - camera.target);

        if s.enable_damping {
            sph.theta += self.delta_theta * s.damping_factor;
            sph.phi += self.delta_phi * s.damping_factor;
        } else {
            sph.theta += self.delta_theta;
            sph.phi += self.delta_phi;
        }
        sph.phi = sph
            .phi
            .clamp(s.min_polar, s.max_polar)
            .clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        sph.radius = (sph.radius * self.scale).clamp(s.min_distance, s.max_distance);

        camera.position = camera.target + sph.to_offset();

        if s.enable_damping {
            self.delta_theta *= 1.0 - s.damping_factor;
            self.delta_phi *= 1.0 - s.damping_factor;
        } else {
            self.delta_theta = 0.0;
            self.delta_phi = 0.0;
        }
        self.scale = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polar(cam: &PerspectiveCamera) -> f32 {
        Spherical::from_offset(cam.position - cam.target).phi
    }

    #[test]
    fn spherical_roundtrip() {
        let v = Vec3::new(-10.0, 4.0, 12.0);
        let back = Spherical::from_offset(v).to_offset();
        assert!((v - back).length() < 1e-4);
    }

    #[test]
    fn idle_update_keeps_default_camera() {
        let mut cam = PerspectiveCamera::default();
        let start = cam.position;
        let mut controls = OrbitControls::new(OrbitSettings::default());
        controls.update(&mut cam);
        assert!((cam.position - start).length() < 1e-3);
    }

    #[test]
    fn distance_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(OrbitSettings::default());
        for _ in 0..200 {
            controls.dolly(1.0);
            controls.update(&mut cam);
        }
        assert!((cam.distance() - 6.0).abs() < 1e-3);
        for _ in 0..200 {
            controls.dolly(-1.0);
            controls.update(&mut cam);
        }
        assert!((cam.distance() - 18.0).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(OrbitSettings::default());
        controls.rotate_by_pixels(Vec2::new(0.0, -10_000.0), 500);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(polar(&cam) <= PI / 2.2 + 1e-4);

        controls.rotate_by_pixels(Vec2::new(0.0, 10_000.0), 500);
        for _ in 0..500 {
            controls.update(&mut cam);
        }
        assert!(polar(&cam) >= PI / 6.0 - 1e-4);
    }

    #[test]
    fn damping_decays_delta() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(OrbitSettings::default());
        controls.rotate_by_pixels(Vec2::new(50.0, 0.0), 400);
        assert!(controls.is_settling());
        let before = cam.position;
        controls.update(&mut cam);
        let first = (cam.position - before).length();
        let mid = cam.position;
        controls.update(&mut cam);
        let second = (cam.position - mid).length();
        assert!(first > 0.0);
        assert!(second < first);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let settings = OrbitSettings {
            enable_damping: false,
            ..OrbitSettings::default()
        };
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(settings);
        let before = Spherical::from_offset(cam.position).theta;
        // Half the container height is half a turn.
        controls.rotate_by_pixels(Vec2::new(-200.0, 0.0), 400);
        controls.update(&mut cam);
        let after = Spherical::from_offset(cam.position).theta;
        let turned = (after - before).rem_euclid(TAU);
        assert!((turned - PI).abs() < 1e-3);
        assert!(!controls.is_settling());
    }

    #[test]
    fn zoom_and_pan_respect_settings() {
        let settings = OrbitSettings {
            enable_zoom: false,
            ..OrbitSettings::default()
        };
        let mut cam = PerspectiveCamera::default();
        let d = cam.distance();
        let mut controls = OrbitControls::new(settings);
        controls.dolly(5.0);
        assert!(!controls.pan(&mut cam, Vec2::new(10.0, 10.0), 400));
        controls.update(&mut cam);
        assert!((cam.distance() - d).abs() < 1e-3);
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn enabled_pan_moves_target_with_camera() {
        let settings = OrbitSettings {
            enable_pan: true,
            ..OrbitSettings::default()
        };
        let mut cam = PerspectiveCamera::default();
        let offset = cam.position - cam.target;
        let mut controls = OrbitControls::new(settings);
        assert!(controls.pan(&mut cam, Vec2::new(40.0, 0.0), 400));
        assert_ne!(cam.target, Vec3::ZERO);
        assert!((cam.position - cam.target - offset).length() < 1e-4);
    }
}
