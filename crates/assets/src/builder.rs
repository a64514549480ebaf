use glam::Vec3;
use serde_json::json;

use crate::document::{COMPONENT_F32, COMPONENT_U16};
use crate::glb::encode_glb;

/// Writes GLB files made of axis-aligned boxes.
///
/// All boxes share one unit-cube mesh; each box is a node that translates
/// and scales it. Used for fixtures and the CLI's demo asset.
#[derive(Debug, Clone, Default)]
pub struct GlbBuilder {
    boxes: Vec<(Vec3, Vec3)>,
}

/// Unit cube (half-extent 1) with per-face normals.
fn unit_cube() -> (Vec<[f32; 3]>, Vec<[f32; 3]>, Vec<u16>) {
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
        ([0.0, 0.0, -1.0], [[1.0, -1.0, -1.0], [-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0]]),
        ([1.0, 0.0, 0.0], [[1.0, -1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0]]),
        ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
        ([0.0, 1.0, 0.0], [[-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0], [-1.0, 1.0, -1.0]]),
        ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
    ];

    let mut positions = Vec::with_capacity(24);
    let mut normals = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, corners) in faces {
        let base = positions.len() as u16;
        positions.extend(corners);
        normals.extend([normal; 4]);
        indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (positions, normals, indices)
}

impl GlbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a box centered at `center` with the given half extents.
    pub fn with_box(mut self, center: Vec3, half_extents: Vec3) -> Self {
        self.boxes.push((center, half_extents));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let (positions, normals, indices) = unit_cube();

        let mut bin: Vec<u8> = Vec::new();
        for v in positions.iter().chain(normals.iter()) {
            for c in v {
                bin.extend_from_slice(&c.to_le_bytes());
            }
        }
        for i in &indices {
            bin.extend_from_slice(&i.to_le_bytes());
        }
        let vec3_len = positions.len() * 12;
        let index_len = indices.len() * 2;

        let nodes: Vec<_> = self
            .boxes
            .iter()
            .map(|(center, half)| {
                json!({
                    "mesh": 0,
                    "translation": center.to_array(),
                    "scale": half.to_array(),
                })
            })
            .collect();

        let roots: Vec<usize> = (0..self.boxes.len()).collect();
        let doc = json!({
            "asset": { "version": "2.0", "generator": "showcase-assets" },
            "scene": 0,
            "scenes": [{ "nodes": roots }],
            "nodes": nodes,
            "meshes": [{
                "primitives": [{
                    "attributes": { "POSITION": 0, "NORMAL": 1 },
                    "indices": 2,
                }]
            }],
            "accessors": [
                { "bufferView": 0, "componentType": COMPONENT_F32, "count": positions.len(), "type": "VEC3" },
                { "bufferView": 1, "componentType": COMPONENT_F32, "count": normals.len(), "type": "VEC3" },
                { "bufferView": 2, "componentType": COMPONENT_U16, "count": indices.len(), "type": "SCALAR" },
            ],
            "bufferViews": [
                { "buffer": 0, "byteOffset": 0, "byteLength": vec3_len },
                { "buffer": 0, "byteOffset": vec3_len, "byteLength": vec3_len },
                { "buffer": 0, "byteOffset": vec3_len * 2, "byteLength": index_len },
            ],
            "buffers": [{ "byteLength": bin.len() }],
        });

        encode_glb(doc.to_string().as_bytes(), Some(&bin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::glb::GlbContainer;

    #[test]
    fn unit_cube_faces_point_outward() {
        let (positions, normals, indices) = unit_cube();
        for tri in indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from_array(positions[i as usize]));
            let face = (b - a).cross(c - a).normalize();
            let n = Vec3::from_array(normals[tri[0] as usize]);
            assert!((face - n).length() < 1e-6);
        }
    }

    #[test]
    fn built_document_references_one_node_per_box() {
        let bytes = GlbBuilder::new()
            .with_box(Vec3::ZERO, Vec3::ONE)
            .with_box(Vec3::X, Vec3::ONE)
            .build();
        let glb = GlbContainer::parse(&bytes).unwrap();
        let doc = Document::parse(&glb.json).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.root_nodes(), vec![0, 1]);
        assert_eq!(glb.bin.unwrap().len(), 24 * 12 * 2 + 36 * 2);
    }
}
