use std::fmt::Write;

use crate::frame::Frame;

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// A renderer reads a finished [`Frame`] and produces output. It never
/// reaches back into the field or the viewport.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&self, frame: &Frame) -> Self::Output;
}

/// Debug text renderer.
///
/// Produces a human-readable summary of a frame, optionally listing the
/// first few particles. Used by the CLI and by tests of the render
/// interface.
#[derive(Debug, Default)]
pub struct DebugTextRenderer {
    /// Particles listed individually; the rest are summarized.
    pub list_particles: usize,
}

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listing(list_particles: usize) -> Self {
        Self { list_particles }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, frame: &Frame) -> String {
        let mut out = String::new();
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{}) ===",
            frame.index, frame.surface.width, frame.surface.height
        );
        let _ = writeln!(
            out,
            "Particles: {} ({} expanded)",
            frame.particles.len(),
            frame.expanded
        );
        for cmd in frame.particles.iter().take(self.list_particles) {
            let _ = writeln!(
                out,
                "  circle at=({:.2}, {:.2}) r={:.2} rgb=({:.2}, {:.2}, {:.2})",
                cmd.center.x, cmd.center.y, cmd.radius, cmd.color.r, cmd.color.g, cmd.color.b
            );
        }

        match &frame.scene {
            None => out.push_str("Scene: none\n"),
            Some((rect, scene)) => {
                let eye = scene.camera_position;
                let px = scene.target.physical();
                let _ = writeln!(
                    out,
                    "Scene: rect=({:.0}, {:.0}, {:.0}x{:.0}) buffer={}x{} eye=({:.2}, {:.2}, {:.2})",
                    rect.x, rect.y, rect.width, rect.height, px.width, px.height, eye.x, eye.y, eye.z
                );
                match &scene.model {
                    Some(model) => {
                        let _ = writeln!(
                            out,
                            "  model: {} vertices, {} triangles",
                            model.mesh.vertex_count(),
                            model.mesh.triangle_count()
                        );
                    }
                    None => out.push_str("  model: none (lights only)\n"),
                }
            }
        }
        tracing::trace!(frame = frame.index, bytes = out.len(), "text frame rendered");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Rect;
    use glam::Vec2;
    use showcase_common::{Color, DrawSurface};
    use showcase_particles::DrawCommand;
    use showcase_viewport::{Viewport3D, ViewportConfig};

    fn frame(particles: Vec<DrawCommand>) -> Frame {
        Frame {
            index: 3,
            surface: DrawSurface::new(100, 80),
            expanded: 0,
            particles,
            scene: None,
        }
    }

    #[test]
    fn debug_renderer_empty_frame() {
        let output = DebugTextRenderer::new().render(&frame(Vec::new()));
        assert!(output.contains("Frame 3 (100x80)"));
        assert!(output.contains("Particles: 0"));
        assert!(output.contains("Scene: none"));
    }

    #[test]
    fn debug_renderer_lists_requested_particles() {
        let cmd = DrawCommand {
            center: Vec2::new(1.0, 2.0),
            radius: 0.5,
            color: Color::WHITE,
        };
        let output = DebugTextRenderer::listing(2).render(&frame(vec![cmd; 5]));
        assert!(output.contains("Particles: 5"));
        assert_eq!(output.matches("circle at=").count(), 2);
    }

    #[test]
    fn debug_renderer_reports_modelless_scene() {
        let mut vp = Viewport3D::mount(Some(DrawSurface::new(200, 100)), 1.0, ViewportConfig::default())
            .unwrap();
        let scene = vp.tick().unwrap();
        let mut f = frame(Vec::new());
        f.scene = Some((Rect::new(10.0, 10.0, 200.0, 100.0), scene));
        let output = DebugTextRenderer::new().render(&f);
        assert!(output.contains("buffer=200x100"));
        assert!(output.contains("lights only"));
    }
}
