use std::path::{Path, PathBuf};

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{CubefieldError, CubefieldResult};

/// Resolves an opaque image reference to decoded pixels.
///
/// Implementations are called from several threads at once while an atlas is built.
pub trait ImageSource: Sync {
    fn load(&self, reference: &str) -> CubefieldResult<RgbaImage>;
}

/// Decode encoded image bytes into straight-alpha RGBA8.
pub fn decode_image(bytes: &[u8]) -> CubefieldResult<RgbaImage> {
    let img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(img.to_rgba8())
}

/// Loads references as paths relative to a root directory.
#[derive(Clone, Debug)]
pub struct FsImageSource {
    root: PathBuf,
}

impl FsImageSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> CubefieldResult<PathBuf> {
        let rel = Path::new(reference);
        if rel.is_absolute() {
            return Ok(rel.to_path_buf());
        }
        if rel
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(CubefieldError::validation(format!(
                "image reference '{reference}' must not escape the asset root"
            )));
        }
        Ok(self.root.join(rel))
    }
}

impl ImageSource for FsImageSource {
    fn load(&self, reference: &str) -> CubefieldResult<RgbaImage> {
        let path = self.resolve(reference)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read image '{}'", path.display()))?;
        decode_image(&bytes)
    }
}
