use glam::Vec3;
use serde::{Deserialize, Serialize};
use showcase_common::Transform;

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing every point, or `None` if there are none.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Self::new(first, first), |b, p| {
            Self::new(b.min.min(p), b.max.max(p))
        }))
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.size().max_element()
    }

    /// Bounds of the eight corners after `transform`.
    pub fn transformed(&self, transform: &Transform) -> Self {
        let corners = (0..8).map(|i| {
            Vec3::new(
                if i & 1 == 0 { self.min.x } else { self.max.x },
                if i & 2 == 0 { self.min.y } else { self.max.y },
                if i & 4 == 0 { self.min.z } else { self.max.z },
            )
        });
        // Eight corners always yield a box.
        Self::from_points(corners.map(|c| transform.transform_point(c))).unwrap_or(*self)
    }
}

/// Transform that centers `bounds` on the origin and scales it uniformly so
/// its largest side equals `frame_size`: `v ↦ s·(v − center)`.
///
/// A flat or point-sized box keeps unit scale rather than dividing by zero.
pub fn frame_transform(bounds: &Aabb, frame_size: f32) -> Transform {
    let extent = bounds.max_extent();
    let scale = if extent > f32::EPSILON && extent.is_finite() {
        frame_size / extent
    } else {
        1.0
    };
    Transform {
        position: -bounds.center() * scale,
        scale: Vec3::splat(scale),
        ..Transform::default()
    }
}
