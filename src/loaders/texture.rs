use std::path::Path;

use crate::error::AssetError;

/// Decoded RGBA8 texture; shaders read coverage from the green channel
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaMap {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl AlphaMap {
    pub fn from_image(image: image::DynamicImage) -> Self {
        let rgba = image.into_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
        }
    }

    /// Coverage at a texel, as the star shader samples it
    pub fn coverage(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4 + 1) as usize;
        self.rgba.get(idx).copied()
    }
}

/// Load a texture from disk; a missing or undecodable file is an error
pub fn load_alpha_map(path: &Path) -> Result<AlphaMap, AssetError> {
    if !path.is_file() {
        return Err(AssetError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let image = image::open(path).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let map = AlphaMap::from_image(image);
    log::info!("Loaded texture {} ({}x{})", path.display(), map.width, map.height);
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ring-road-{}-{}", std::process::id(), name))
    }

    #[test]
    fn missing_texture_is_not_found() {
        let err = load_alpha_map(Path::new("no/such/texture.png")).unwrap_err();
        assert!(matches!(err, AssetError::NotFound { .. }));
    }

    #[test]
    fn garbage_is_decode_error() {
        let path = temp_path("garbage.png");
        std::fs::write(&path, b"definitely not a png").unwrap();
        let err = load_alpha_map(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert!(matches!(err, AssetError::Decode { .. }));
    }

    #[test]
    fn png_round_trips_through_loader() {
        let path = temp_path("star.png");
        let image = image::RgbaImage::from_fn(4, 2, |x, _| image::Rgba([0, (x * 60) as u8, 0, 255]));
        image.save(&path).unwrap();

        let map = load_alpha_map(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!((map.width, map.height), (4, 2));
        assert_eq!(map.coverage(3, 1), Some(180));
        assert_eq!(map.coverage(4, 0), None);
    }
}
