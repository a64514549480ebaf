use glam::Vec3;
use showcase_common::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Directional light shining from `position` toward the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    /// Kept for parity with the product page's key light; the shading
    /// has no shadow pass.
    pub casts_shadow: bool,
}

impl DirectionalLight {
    fn white(intensity: f32, position: Vec3) -> Self {
        Self {
            color: Color::WHITE,
            intensity,
            position,
            casts_shadow: false,
        }
    }

    /// Unit vector from the lit surface toward the light.
    pub fn to_light(&self) -> Vec3 {
        self.position.normalize_or_zero()
    }
}

/// One ambient term plus key, back-fill and under-fill directionals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub ambient: AmbientLight,
    pub key: DirectionalLight,
    pub back_fill: DirectionalLight,
    pub under_fill: DirectionalLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.4,
            },
            key: DirectionalLight {
                casts_shadow: true,
                ..DirectionalLight::white(1.2, Vec3::new(5.0, 5.0, 5.0))
            },
            back_fill: DirectionalLight::white(0.8, Vec3::new(-5.0, 3.0, -5.0)),
            under_fill: DirectionalLight::white(0.6, Vec3::new(0.0, -5.0, 5.0)),
        }
    }
}

impl LightRig {
    pub fn directionals(&self) -> [&DirectionalLight; 3] {
        [&self.key, &self.back_fill, &self.under_fill]
    }

    /// Lambert shading of a surface with normal `n`, per color channel.
    /// The GPU shader evaluates the same sum.
    pub fn irradiance(&self, n: Vec3) -> Vec3 {
        let rgb = |c: Color| Vec3::new(c.r, c.g, c.b);
        let mut total = rgb(self.ambient.color) * self.ambient.intensity;
        for light in self.directionals() {
            let lambert = n.dot(light.to_light()).max(0.0);
            total += rgb(light.color) * light.intensity * lambert;
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rig_has_distinct_directions() {
        let rig = LightRig::default();
        let [a, b, c] = rig.directionals().map(|l| l.to_light());
        assert!(a.dot(b) < 0.99 && b.dot(c) < 0.99 && a.dot(c) < 0.99);
        assert!(rig.key.casts_shadow);
        assert!(!rig.back_fill.casts_shadow);
    }

    #[test]
    fn faces_away_from_every_light_get_ambient_only() {
        let rig = LightRig::default();
        let n = Vec3::new(1.0, -0.8, -1.2).normalize();
        for light in rig.directionals() {
            assert!(n.dot(light.to_light()) < 0.0);
        }
        assert!((rig.irradiance(n) - Vec3::splat(0.4)).length() < 1e-6);
    }

    #[test]
    fn key_light_adds_to_ambient() {
        let rig = LightRig::default();
        let toward_key = rig.key.to_light();
        assert!(rig.irradiance(toward_key).x > 0.4 + 1.2 - 1e-4);
    }
}
