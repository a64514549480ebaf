use crate::error::AssetError;

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const GLB_VERSION: u32 = 2;
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"
const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

/// The two payloads of a GLB file.
#[derive(Debug, Clone, PartialEq)]
pub struct GlbContainer {
    pub json: Vec<u8>,
    pub bin: Option<Vec<u8>>,
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, AssetError> {
    bytes
        .get(at..at + 4)
        .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .ok_or_else(|| AssetError::Truncated(format!("need 4 bytes at offset {at}")))
}

impl GlbContainer {
    /// Split a GLB byte stream into its JSON and optional BIN chunks.
    pub fn parse(bytes: &[u8]) -> Result<Self, AssetError> {
        let magic = read_u32(bytes, 0)?;
        if magic != GLB_MAGIC {
            return Err(AssetError::BadMagic(magic));
        }
        let version = read_u32(bytes, 4)?;
        if version != GLB_VERSION {
            return Err(AssetError::UnsupportedVersion(version));
        }
        let total = read_u32(bytes, 8)? as usize;
        if total > bytes.len() {
            return Err(AssetError::Truncated(format!(
                "header declares {total} bytes, got {}",
                bytes.len()
            )));
        }
        let bytes = &bytes[..total];

        let mut json = None;
        let mut bin = None;
        let mut offset = HEADER_LEN;
        while offset < bytes.len() {
            let len = read_u32(bytes, offset)? as usize;
            let kind = read_u32(bytes, offset + 4)?;
            let start = offset + CHUNK_HEADER_LEN;
            let end = start
                .checked_add(len)
                .filter(|end| *end <= bytes.len())
                .ok_or_else(|| {
                    AssetError::Truncated(format!("chunk at {offset} overruns container"))
                })?;
            match kind {
                CHUNK_JSON if json.is_none() => json = Some(bytes[start..end].to_vec()),
                CHUNK_BIN if bin.is_none() => bin = Some(bytes[start..end].to_vec()),
                _ => tracing::debug!(kind, len, "skipping GLB chunk"),
            }
            offset = end;
        }

        let json = json.ok_or_else(|| AssetError::Truncated("no JSON chunk".into()))?;
        Ok(Self { json, bin })
    }
}

/// Frame `json` and optional `bin` as a GLB byte stream, padding chunks to
/// four-byte alignment (spaces for JSON, zeros for BIN).
pub fn encode_glb(json: &[u8], bin: Option<&[u8]>) -> Vec<u8> {
    fn padded(data: &[u8], pad: u8) -> Vec<u8> {
        let mut out = data.to_vec();
        while out.len() % 4 != 0 {
            out.push(pad);
        }
        out
    }

    let json = padded(json, b' ');
    let bin = bin.map(|b| padded(b, 0));
    let total = HEADER_LEN
        + CHUNK_HEADER_LEN
        + json.len()
        + bin.as_ref().map_or(0, |b| CHUNK_HEADER_LEN + b.len());

    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    out.extend_from_slice(&GLB_VERSION.to_le_bytes());
    out.extend_from_slice(&(total as u32).to_le_bytes());
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    out.extend_from_slice(&json);
    if let Some(bin) = bin {
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(&CHUNK_BIN.to_le_bytes());
        out.extend_from_slice(&bin);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encoded_container() {
        let bytes = encode_glb(br#"{"asset":{"version":"2.0"}}"#, Some(&[1, 2, 3]));
        assert_eq!(bytes.len() % 4, 0);
        let glb = GlbContainer::parse(&bytes).unwrap();
        assert!(glb.json.starts_with(br#"{"asset""#));
        assert_eq!(&glb.bin.unwrap()[..3], &[1, 2, 3]);
    }

    #[test]
    fn json_only_container_has_no_bin() {
        let bytes = encode_glb(b"{}", None);
        let glb = GlbContainer::parse(&bytes).unwrap();
        assert!(glb.bin.is_none());
    }

    #[test]
    fn rejects_wrong_magic() {
        let mut bytes = encode_glb(b"{}", None);
        bytes[0] = b'x';
        assert!(matches!(GlbContainer::parse(&bytes), Err(AssetError::BadMagic(_))));
    }

    #[test]
    fn rejects_wrong_version() {
        let mut bytes = encode_glb(b"{}", None);
        bytes[4] = 1;
        assert!(matches!(
            GlbContainer::parse(&bytes),
            Err(AssetError::UnsupportedVersion(1))
        ));
    }

    #[test]
    fn rejects_truncated_stream() {
        let bytes = encode_glb(br#"{"asset":{}}"#, Some(&[0; 16]));
        let cut = &bytes[..bytes.len() - 4];
        assert!(matches!(GlbContainer::parse(cut), Err(AssetError::Truncated(_))));
        assert!(matches!(GlbContainer::parse(&bytes[..6]), Err(AssetError::Truncated(_))));
    }
}
