use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpriteKeyError {
    #[error("sprite key must not be empty")]
    Empty,
    #[error("sprite key must not start or end with '/'")]
    DanglingSeparator,
    #[error("sprite key must not contain empty segments")]
    EmptySegment,
    #[error("sprite key contains invalid character '{character}'")]
    InvalidCharacter { character: char },
}

/// Asset key such as `player/walk/north/sword/1`, resolved by the asset
/// collaborator to `assets/sprites/<key>.png`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpriteKey(String);

impl SpriteKey {
    pub fn new(key: impl Into<String>) -> Result<Self, SpriteKeyError> {
        let key = key.into();
        validate_sprite_key(&key)?;
        Ok(Self(key))
    }

    /// Builds a key from internally composed tokens that are known to be valid.
    pub(crate) fn from_trusted(key: String) -> Self {
        debug_assert!(validate_sprite_key(&key).is_ok(), "invalid sprite key {key}");
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub(crate) fn validate_sprite_key(key: &str) -> Result<(), SpriteKeyError> {
    if key.is_empty() {
        return Err(SpriteKeyError::Empty);
    }
    if key.starts_with('/') || key.ends_with('/') {
        return Err(SpriteKeyError::DanglingSeparator);
    }
    if key.contains("//") {
        return Err(SpriteKeyError::EmptySegment);
    }
    for ch in key.chars() {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() || matches!(ch, '_' | '/' | '-') {
            continue;
        }
        return Err(SpriteKeyError::InvalidCharacter { character: ch });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_keys() {
        for key in ["player", "player/attack/west/0", "tiles/wall-mossy_2"] {
            assert!(SpriteKey::new(key).is_ok(), "key={key}");
        }
    }

    #[test]
    fn rejects_invalid_keys() {
        for key in ["", "/a", "a/", "a//b", "../a", r"a\b", "Player", "a.png"] {
            assert!(SpriteKey::new(key).is_err(), "key={key}");
        }
    }
}
