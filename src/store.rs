use std::{collections::HashMap, path::PathBuf, sync::RwLock};

use anyhow::Context;
use image::RgbaImage;

use crate::error::{StatcardError, StatcardResult};

/// Read side of the key/blob asset repository.
///
/// The store is provisioned by an upstream collaborator and is read-mostly:
/// implementations must be safe for unlimited concurrent reads. A missing
/// name is reported as [`StatcardError::NotFound`] so call sites can apply
/// their optional-asset policy.
pub trait AssetStore: Send + Sync {
    fn exists(&self, name: &str) -> bool;

    fn open_read(&self, name: &str) -> StatcardResult<Vec<u8>>;
}

/// Validate a logical asset name: lowercase path-free identifiers only.
pub fn validate_name(name: &str) -> StatcardResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(StatcardError::asset("asset name must be a plain identifier"));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
    {
        return Err(StatcardError::asset(format!(
            "asset name '{name}' contains path or non-ascii characters"
        )));
    }
    Ok(())
}

/// Directory-backed store: each logical name is one file under the root.
pub struct FsAssetStore {
    root: PathBuf,
}

impl FsAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, name: &str) -> StatcardResult<PathBuf> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

impl AssetStore for FsAssetStore {
    fn exists(&self, name: &str) -> bool {
        self.path_for(name)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    fn open_read(&self, name: &str) -> StatcardResult<Vec<u8>> {
        let path = self.path_for(name)?;
        if !path.is_file() {
            return Err(StatcardError::not_found(name));
        }
        std::fs::read(&path)
            .with_context(|| format!("read asset file '{}'", path.display()))
            .map_err(StatcardError::Other)
    }
}

/// In-memory store used by tests and by callers that provision blobs
/// directly.
#[derive(Default)]
pub struct MemoryAssetStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        self.blobs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(name.into(), bytes);
    }

    pub fn remove(&self, name: &str) {
        self.blobs
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(name);
    }
}

impl AssetStore for MemoryAssetStore {
    fn exists(&self, name: &str) -> bool {
        self.blobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(name)
    }

    fn open_read(&self, name: &str) -> StatcardResult<Vec<u8>> {
        self.blobs
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| StatcardError::not_found(name))
    }
}

/// Decode stored bytes into a straight-alpha RGBA8 bitmap.
pub fn decode_rgba(name: &str, bytes: &[u8]) -> StatcardResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes)
        .with_context(|| format!("decode asset '{name}'"))
        .map_err(StatcardError::Other)?;
    Ok(dyn_img.to_rgba8())
}

/// Logical names of the assets the draw programs consume. The provisioning
/// collaborator writes blobs under these names.
pub mod names {
    pub const CARD_OVERLAY: &str = "card_overlay";
    pub const CHALLENGE_BACKGROUND: &str = "challenge_bg";

    pub fn portrait(id: u64) -> String {
        format!("portrait_{id}")
    }

    pub fn avatar(id: u64) -> String {
        format!("avatar_{id}")
    }

    pub fn side_avatar(id: u64) -> String {
        format!("side_avatar_{id}")
    }

    pub fn weapon(id: u64) -> String {
        format!("weapon_{id}")
    }

    pub fn skill(id: u64) -> String {
        format!("skill_{id}")
    }

    pub fn constellation(id: u64) -> String {
        format!("const_{id}")
    }

    pub fn relic(id: u64) -> String {
        format!("relic_{id}")
    }

    pub fn relic_template(position: u32) -> String {
        format!("relic_template_{position}")
    }

    pub fn stat_icon(stat_id: u32) -> String {
        format!("stat_{stat_id}")
    }
}
