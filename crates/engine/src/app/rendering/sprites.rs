use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

use crate::sprite_keys::SpriteKey;

use super::canvas::LoadedSprite;

/// Resolves sprite keys to decoded images under `<asset_root>/sprites`.
/// Failed loads are cached as misses and warned about once per key.
#[derive(Debug)]
pub(crate) struct SpriteCache {
    asset_root: PathBuf,
    sprites: HashMap<SpriteKey, Option<LoadedSprite>>,
    warned_missing: HashSet<SpriteKey>,
}

impl SpriteCache {
    pub(crate) fn new(asset_root: PathBuf) -> Self {
        Self {
            asset_root,
            sprites: HashMap::new(),
            warned_missing: HashSet::new(),
        }
    }

    pub(crate) fn resolve(&mut self, key: &SpriteKey) -> Option<&LoadedSprite> {
        if !self.sprites.contains_key(key) {
            let path = sprite_path(&self.asset_root, key);
            let loaded = match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    self.warn_once(key, &path, &reason);
                    None
                }
            };
            self.sprites.insert(key.clone(), loaded);
        }
        self.sprites.get(key).and_then(Option::as_ref)
    }

    fn warn_once(&mut self, key: &SpriteKey, path: &Path, reason: &str) {
        if !self.warned_missing.insert(key.clone()) {
            return;
        }
        warn!(
            sprite_key = key.as_str(),
            path = %path.display(),
            reason,
            "renderer_sprite_load_failed_using_placeholder"
        );
    }

    #[cfg(test)]
    fn warned_count(&self) -> usize {
        self.warned_missing.len()
    }
}

fn sprite_path(asset_root: &Path, key: &SpriteKey) -> PathBuf {
    asset_root
        .join("sprites")
        .join(format!("{}.png", key.as_str()))
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn loads_png_by_key_path() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("sprites").join("item");
        fs::create_dir_all(&dir).expect("sprite dir");
        RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]))
            .save(dir.join("coin.png"))
            .expect("write png");

        let mut cache = SpriteCache::new(temp.path().to_path_buf());
        let key = SpriteKey::new("item/coin").expect("key");
        let sprite = cache.resolve(&key).expect("sprite");

        assert_eq!((sprite.width, sprite.height), (3, 2));
        assert_eq!(&sprite.rgba[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn missing_sprite_is_cached_and_warned_once() {
        let temp = TempDir::new().expect("temp dir");
        let mut cache = SpriteCache::new(temp.path().to_path_buf());
        let key = SpriteKey::new("ghost/move/south/0").expect("key");

        assert!(cache.resolve(&key).is_none());
        assert!(cache.resolve(&key).is_none());
        assert_eq!(cache.warned_count(), 1);
    }

    #[test]
    fn corrupt_file_falls_back_to_placeholder() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("sprites");
        fs::create_dir_all(&dir).expect("sprite dir");
        fs::write(dir.join("broken.png"), b"not a png").expect("write");

        let mut cache = SpriteCache::new(temp.path().to_path_buf());
        let key = SpriteKey::new("broken").expect("key");
        assert!(cache.resolve(&key).is_none());
    }
}
