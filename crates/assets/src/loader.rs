use std::io::Read;
use std::path::Path;

use showcase_common::Transform;

use crate::bounds::{frame_transform, Aabb};
use crate::document::Document;
use crate::error::AssetError;
use crate::glb::GlbContainer;
use crate::mesh::MeshData;

const READ_CHUNK: usize = 64 * 1024;

/// A decoded model: flattened geometry plus its bounds at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    pub name: String,
    pub mesh: MeshData,
    pub bounds: Aabb,
}

impl Model {
    /// Decode a GLB byte stream.
    pub fn from_glb_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self, AssetError> {
        let glb = GlbContainer::parse(bytes)?;
        let doc = Document::parse(&glb.json)?;
        let mesh = MeshData::from_document(&doc, glb.bin.as_deref())?;
        let bounds = mesh.bounds().ok_or(AssetError::EmptyModel)?;
        Ok(Self {
            name: name.into(),
            mesh,
            bounds,
        })
    }

    /// Transform that fits this model into a `frame_size` cube at the origin.
    pub fn framing(&self, frame_size: f32) -> Transform {
        frame_transform(&self.bounds, frame_size)
    }
}

/// Read everything from `reader`, reporting progress as a percentage of
/// `total` bytes (when known) after each chunk.
pub fn read_with_progress<R: Read>(
    mut reader: R,
    total: Option<u64>,
    mut on_progress: impl FnMut(u64, Option<f64>),
) -> Result<Vec<u8>, AssetError> {
    let mut data = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = reader.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&chunk[..n]);
        let loaded = data.len() as u64;
        let percent = total
            .filter(|t| *t > 0)
            .map(|t| loaded as f64 / t as f64 * 100.0);
        on_progress(loaded, percent);
    }
    Ok(data)
}

/// Load and decode a GLB model from disk.
pub fn load_model(path: impl AsRef<Path>) -> Result<Model, AssetError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let total = file.metadata().ok().map(|m| m.len());
    let bytes = read_with_progress(file, total, |loaded, percent| match percent {
        Some(p) => tracing::debug!(path = %path.display(), loaded, "{p:.0}% loaded"),
        None => tracing::debug!(path = %path.display(), loaded, "bytes loaded"),
    })?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "model".to_string());
    let model = Model::from_glb_bytes(name, &bytes)?;
    tracing::info!(
        path = %path.display(),
        vertices = model.mesh.vertex_count(),
        triangles = model.mesh.triangle_count(),
        "model decoded"
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GlbBuilder;
    use glam::Vec3;
    use std::io::Write;

    #[test]
    fn loads_model_from_disk() {
        let mut tmp = tempfile::Builder::new().suffix(".glb").tempfile().unwrap();
        let bytes = GlbBuilder::new()
            .with_box(Vec3::new(0.0, 50.0, 0.0), Vec3::new(20.0, 10.0, 5.0))
            .build();
        tmp.write_all(&bytes).unwrap();

        let model = load_model(tmp.path()).unwrap();
        assert_eq!(model.bounds.center(), Vec3::new(0.0, 50.0, 0.0));
        assert_eq!(model.bounds.size(), Vec3::new(40.0, 20.0, 10.0));
    }

    #[test]
    fn loading_twice_frames_identically() {
        let bytes = GlbBuilder::new()
            .with_box(Vec3::new(300.0, -20.0, 7.0), Vec3::new(0.2, 0.1, 0.3))
            .build();
        let a = Model::from_glb_bytes("a", &bytes).unwrap();
        let b = Model::from_glb_bytes("b", &bytes).unwrap();
        assert_eq!(a.framing(5.0), b.framing(5.0));

        let framed = a.bounds.transformed(&a.framing(5.0));
        assert!(framed.center().length() < 1e-3);
        assert!((framed.max_extent() - 5.0).abs() < 1e-3);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_model(dir.path().join("absent.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Io(_)));
    }

    #[test]
    fn garbage_file_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"definitely not a model").unwrap();
        assert!(matches!(load_model(tmp.path()), Err(AssetError::BadMagic(_))));
    }

    #[test]
    fn progress_reaches_one_hundred_percent() {
        let data = vec![7u8; READ_CHUNK * 2 + 10];
        let mut last = None;
        let mut calls = 0;
        let read = read_with_progress(&data[..], Some(data.len() as u64), |_, p| {
            calls += 1;
            last = p;
        })
        .unwrap();
        assert_eq!(read.len(), data.len());
        assert!(calls >= 3);
        assert_eq!(last, Some(100.0));
    }
}
