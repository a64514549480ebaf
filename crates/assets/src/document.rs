use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::AssetError;

/// The subset of the glTF 2.0 document read by the importer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Document {
    pub scene: Option<usize>,
    pub scenes: Vec<Scene>,
    pub nodes: Vec<Node>,
    pub meshes: Vec<Mesh>,
    pub accessors: Vec<Accessor>,
    pub buffer_views: Vec<BufferView>,
    pub buffers: Vec<Buffer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Scene {
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Node {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrix: Option<[f32; 16]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<[f32; 3]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 4]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Mesh {
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Primitive {
    pub attributes: BTreeMap<String, usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Accessor {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub buffer_view: Option<usize>,
    pub byte_offset: usize,
    pub component_type: u32,
    pub count: usize,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct BufferView {
    pub buffer: usize,
    pub byte_offset: usize,
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub byte_stride: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct Buffer {
    pub byte_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

pub(crate) const COMPONENT_U8: u32 = 5121;
pub(crate) const COMPONENT_U16: u32 = 5123;
pub(crate) const COMPONENT_U32: u32 = 5125;
pub(crate) const COMPONENT_F32: u32 = 5126;
pub(crate) const MODE_TRIANGLES: u32 = 4;

impl Document {
    pub fn parse(json: &[u8]) -> Result<Self, AssetError> {
        Ok(serde_json::from_slice(json)?)
    }

    /// Root nodes of the scene to display: the declared default scene,
    /// else the first scene, else every node that is nobody's child.
    pub fn root_nodes(&self) -> Vec<usize> {
        if let Some(scene) = self.scene.and_then(|i| self.scenes.get(i)) {
            return scene.nodes.clone();
        }
        if let Some(scene) = self.scenes.first() {
            return scene.nodes.clone();
        }
        let mut is_child = vec![false; self.nodes.len()];
        for node in &self.nodes {
            for &c in &node.children {
                if let Some(flag) = is_child.get_mut(c) {
                    *flag = true;
                }
            }
        }
        (0..self.nodes.len()).filter(|i| !is_child[*i]).collect()
    }

    pub fn node(&self, index: usize) -> Result<&Node, AssetError> {
        self.nodes
            .get(index)
            .ok_or(AssetError::Missing { kind: "node", index })
    }

    pub fn mesh(&self, index: usize) -> Result<&Mesh, AssetError> {
        self.meshes
            .get(index)
            .ok_or(AssetError::Missing { kind: "mesh", index })
    }

    pub fn accessor(&self, index: usize) -> Result<&Accessor, AssetError> {
        self.accessors
            .get(index)
            .ok_or(AssetError::Missing { kind: "accessor", index })
    }

    pub fn buffer_view(&self, index: usize) -> Result<&BufferView, AssetError> {
        self.buffer_views
            .get(index)
            .ok_or(AssetError::Missing { kind: "bufferView", index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_document_with_defaults() {
        let doc = Document::parse(br#"{"asset":{"version":"2.0"},"nodes":[{"mesh":0}]}"#).unwrap();
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].mesh, Some(0));
        assert!(doc.scenes.is_empty());
    }

    #[test]
    fn root_nodes_prefer_default_scene() {
        let doc = Document::parse(
            br#"{"scene":1,"scenes":[{"nodes":[0]},{"nodes":[2]}],"nodes":[{},{},{}]}"#,
        )
        .unwrap();
        assert_eq!(doc.root_nodes(), vec![2]);
    }

    #[test]
    fn root_nodes_without_scenes_skip_children() {
        let doc = Document::parse(br#"{"nodes":[{"children":[1]},{},{}]}"#).unwrap();
        assert_eq!(doc.root_nodes(), vec![0, 2]);
    }

    #[test]
    fn missing_references_are_errors() {
        let doc = Document::default();
        assert!(matches!(
            doc.accessor(3),
            Err(AssetError::Missing { kind: "accessor", index: 3 })
        ));
    }
}
