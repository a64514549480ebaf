use glam::{Mat3, Mat4, Quat, Vec3};

use crate::bounds::Aabb;
use crate::document::{
    Accessor, Document, Node, COMPONENT_F32, COMPONENT_U16, COMPONENT_U32, COMPONENT_U8,
    MODE_TRIANGLES,
};
use crate::error::AssetError;

/// Triangle geometry of a whole scene, baked into the model's own frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bounds of every vertex, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    /// Flatten the displayed scene of `doc`, reading buffer data from `bin`.
    pub(crate) fn from_document(doc: &Document, bin: Option<&[u8]>) -> Result<Self, AssetError> {
        let mut mesh = MeshData::default();
        // (node, parent matrix, depth); depth beyond the node count means a cycle.
        let mut stack: Vec<(usize, Mat4, usize)> = doc
            .root_nodes()
            .into_iter()
            .map(|n| (n, Mat4::IDENTITY, 0))
            .collect();

        while let Some((index, parent, depth)) = stack.pop() {
            if depth > doc.nodes.len() {
                return Err(AssetError::NodeCycle(index));
            }
            let node = doc.node(index)?;
            let world = parent * local_matrix(node);
            if let Some(mesh_index) = node.mesh {
                mesh.append_mesh(doc, bin, mesh_index, world)?;
            }
            for &child in &node.children {
                stack.push((child, world, depth + 1));
            }
        }

        if mesh.is_empty() {
            return Err(AssetError::EmptyModel);
        }
        Ok(mesh)
    }

    fn append_mesh(
        &mut self,
        doc: &Document,
        bin: Option<&[u8]>,
        mesh_index: usize,
        world: Mat4,
    ) -> Result<(), AssetError> {
        let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

        for prim in &doc.mesh(mesh_index)?.primitives {
            if prim.mode.unwrap_or(MODE_TRIANGLES) != MODE_TRIANGLES {
                tracing::debug!(mesh_index, mode = ?prim.mode, "skipping non-triangle primitive");
                continue;
            }
            let Some(&pos_index) = prim.attributes.get("POSITION") else {
                tracing::debug!(mesh_index, "skipping primitive without POSITION");
                continue;
            };

            let positions = read_vec3(doc, bin, pos_index)?;
            let vertex_count = positions.len();
            let indices = match prim.indices {
                Some(i) => read_indices(doc, bin, i, vertex_count)?,
                None if vertex_count % 3 != 0 => {
                    return Err(AssetError::InvalidAccessor {
                        index: pos_index,
                        reason: format!(
                            "{vertex_count} unindexed vertices do not form whole triangles"
                        ),
                    });
                }
                None => (0..vertex_count as u32).collect(),
            };
            let normals = match prim.attributes.get("NORMAL") {
                Some(&n) => {
                    let normals = read_vec3(doc, bin, n)?;
                    if normals.len() != vertex_count {
                        return Err(AssetError::InvalidAccessor {
                            index: n,
                            reason: "NORMAL count differs from POSITION count".into(),
                        });
                    }
                    normals
                }
                None => smooth_normals(&positions, &indices),
            };

            let base = self.positions.len() as u32;
            self.positions
                .extend(positions.iter().map(|p| world.transform_point3(*p)));
            self.normals.extend(
                normals
                    .iter()
                    .map(|n| (normal_matrix * *n).normalize_or_zero()),
            );
            self.indices.extend(indices.iter().map(|i| base + i));
        }
        Ok(())
    }
}

fn local_matrix(node: &Node) -> Mat4 {
    if let Some(m) = node.matrix {
        return Mat4::from_cols_array(&m);
    }
    let t = node.translation.map(Vec3::from_array).unwrap_or(Vec3::ZERO);
    let r = node
        .rotation
        .map(|q| Quat::from_array(q).normalize())
        .unwrap_or(Quat::IDENTITY);
    let s = node.scale.map(Vec3::from_array).unwrap_or(Vec3::ONE);
    Mat4::from_scale_rotation_translation(s, r, t)
}

/// Raw bytes and element stride backing `accessor`.
fn accessor_bytes<'a>(
    doc: &Document,
    bin: Option<&'a [u8]>,
    index: usize,
    accessor: &Accessor,
    elem_size: usize,
) -> Result<Option<(&'a [u8], usize)>, AssetError> {
    let Some(view_index) = accessor.buffer_view else {
        return Ok(None);
    };
    let view = doc.buffer_view(view_index)?;
    let buffer = doc
        .buffers
        .get(view.buffer)
        .ok_or(AssetError::Missing { kind: "buffer", index: view.buffer })?;
    if buffer.uri.is_some() {
        return Err(AssetError::UnsupportedBuffer(view.buffer));
    }
    let bin = bin.ok_or(AssetError::UnsupportedBuffer(view.buffer))?;

    let stride = view.byte_stride.unwrap_or(elem_size);
    if stride < elem_size {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: format!("stride {stride} smaller than element size {elem_size}"),
        });
    }
    let out_of_range = || AssetError::InvalidAccessor {
        index,
        reason: "data runs past the end of its buffer view".into(),
    };
    let needed = match accessor.count.checked_sub(1) {
        None => 0,
        Some(last) => last
            .checked_mul(stride)
            .and_then(|n| n.checked_add(elem_size))
            .ok_or_else(out_of_range)?,
    };
    let view_end = view
        .byte_offset
        .checked_add(view.byte_length)
        .ok_or_else(out_of_range)?;
    let start = view
        .byte_offset
        .checked_add(accessor.byte_offset)
        .ok_or_else(out_of_range)?;
    let end = start.checked_add(needed).ok_or_else(out_of_range)?;
    if end > view_end || view_end > bin.len() {
        return Err(out_of_range());
    }
    Ok(Some((&bin[start..end], stride)))
}

/// Element count of an accessor without a buffer view, bounded by the
/// size of the binary chunk.
fn zeroed_count(
    bin: Option<&[u8]>,
    index: usize,
    accessor: &Accessor,
    elem_size: usize,
) -> Result<usize, AssetError> {
    let available = bin.map_or(0, <[u8]>::len);
    match accessor.count.checked_mul(elem_size) {
        Some(bytes) if bytes <= available => Ok(accessor.count),
        _ => Err(AssetError::InvalidAccessor {
            index,
            reason: format!(
                "{} elements without a buffer view exceed the {available}-byte binary chunk",
                accessor.count
            ),
        }),
    }
}

fn f32_at(bytes: &[u8], at: usize) -> f32 {
    f32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_vec3(doc: &Document, bin: Option<&[u8]>, index: usize) -> Result<Vec<Vec3>, AssetError> {
    let accessor = doc.accessor(index)?;
    if accessor.component_type != COMPONENT_F32 || accessor.kind != "VEC3" {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: format!(
                "expected FLOAT VEC3, got component {} {}",
                accessor.component_type, accessor.kind
            ),
        });
    }
    let Some((bytes, stride)) = accessor_bytes(doc, bin, index, accessor, 12)? else {
        return Ok(vec![Vec3::ZERO; zeroed_count(bin, index, accessor, 12)?]);
    };
    Ok((0..accessor.count)
        .map(|i| {
            let at = i * stride;
            Vec3::new(f32_at(bytes, at), f32_at(bytes, at + 4), f32_at(bytes, at + 8))
        })
        .collect())
}

fn read_indices(
    doc: &Document,
    bin: Option<&[u8]>,
    index: usize,
    vertex_count: usize,
) -> Result<Vec<u32>, AssetError> {
    let accessor = doc.accessor(index)?;
    if accessor.kind != "SCALAR" {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: format!("indices must be SCALAR, got {}", accessor.kind),
        });
    }
    let elem_size = match accessor.component_type {
        COMPONENT_U8 => 1,
        COMPONENT_U16 => 2,
        COMPONENT_U32 => 4,
        other => {
            return Err(AssetError::InvalidAccessor {
                index,
                reason: format!("unsupported index component type {other}"),
            });
        }
    };
    let Some((bytes, stride)) = accessor_bytes(doc, bin, index, accessor, elem_size)? else {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: "indices need a buffer view".into(),
        });
    };

    let indices: Vec<u32> = (0..accessor.count)
        .map(|i| {
            let at = i * stride;
            match elem_size {
                1 => bytes[at] as u32,
                2 => u16::from_le_bytes([bytes[at], bytes[at + 1]]) as u32,
                _ => u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]),
            }
        })
        .collect();

    if indices.len() % 3 != 0 {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: format!("{} indices do not form whole triangles", indices.len()),
        });
    }
    if let Some(bad) = indices.iter().find(|i| **i as usize >= vertex_count) {
        return Err(AssetError::InvalidAccessor {
            index,
            reason: format!("index {bad} out of range for {vertex_count} vertices"),
        });
    }
    Ok(indices)
}

/// Area-weighted vertex normals for primitives that ship none.
fn smooth_normals(positions: &[Vec3], indices: &[u32]) -> Vec<Vec3> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let face = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals.iter().map(|n| n.normalize_or_zero()).collect()
}
