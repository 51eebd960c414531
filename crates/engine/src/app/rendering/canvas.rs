/// Decoded RGBA8 sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadedSprite {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) rgba: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SpriteStyle {
    pub(crate) mirrored: bool,
    /// Colour mixed halfway into every opaque texel.
    pub(crate) tint: Option<[u8; 4]>,
    pub(crate) alpha: u8,
}

impl Default for SpriteStyle {
    fn default() -> Self {
        Self {
            mirrored: false,
            tint: None,
            alpha: u8::MAX,
        }
    }
}

/// Clipped drawing over a pixels frame buffer.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
        }
    }

    pub(crate) fn clear(&mut self, color: [u8; 4]) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    fn byte_offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        (offset + 4 <= self.frame.len()).then_some(offset)
    }

    /// Writes one pixel, alpha-blending when `color` is translucent.
    pub(crate) fn write_pixel(&mut self, x: i32, y: i32, color: [u8; 4]) {
        let Some(offset) = self.byte_offset(x, y) else {
            return;
        };
        let pixel = &mut self.frame[offset..offset + 4];
        let alpha = u16::from(color[3]);
        if alpha == 255 {
            pixel.copy_from_slice(&color);
            return;
        }
        for channel in 0..3 {
            let src = u16::from(color[channel]);
            let dst = u16::from(pixel[channel]);
            pixel[channel] = ((src * alpha + dst * (255 - alpha)) / 255) as u8;
        }
        pixel[3] = 255;
    }

    pub(crate) fn fill_rect(&mut self, left: i32, top: i32, width: i32, height: i32, color: [u8; 4]) {
        let x_end = (left + width).min(self.width as i32);
        let y_end = (top + height).min(self.height as i32);
        for y in top.max(0)..y_end {
            for x in left.max(0)..x_end {
                self.write_pixel(x, y, color);
            }
        }
    }

    pub(crate) fn outline_rect(
        &mut self,
        left: i32,
        top: i32,
        width: i32,
        height: i32,
        color: [u8; 4],
    ) {
        if width <= 0 || height <= 0 {
            return;
        }
        let right = left + width - 1;
        let bottom = top + height - 1;
        for x in left..=right {
            self.write_pixel(x, top, color);
            self.write_pixel(x, bottom, color);
        }
        for y in top..=bottom {
            self.write_pixel(left, y, color);
            self.write_pixel(right, y, color);
        }
    }

    pub(crate) fn draw_sprite(&mut self, left: i32, top: i32, sprite: &LoadedSprite, style: SpriteStyle) {
        let expected_len = sprite.width as usize * sprite.height as usize * 4;
        if sprite.width == 0 || sprite.height == 0 || sprite.rgba.len() < expected_len {
            return;
        }
        let sprite_width = sprite.width as usize;
        for sy in 0..sprite.height as usize {
            for sx in 0..sprite_width {
                let src_x = if style.mirrored { sprite_width - 1 - sx } else { sx };
                let src = (sy * sprite_width + src_x) * 4;
                let texel = &sprite.rgba[src..src + 4];
                if texel[3] == 0 {
                    continue;
                }
                let mut color = [texel[0], texel[1], texel[2], texel[3]];
                if let Some(tint) = style.tint {
                    for channel in 0..3 {
                        color[channel] = ((u16::from(color[channel]) + u16::from(tint[channel])) / 2) as u8;
                    }
                }
                color[3] = ((u16::from(color[3]) * u16::from(style.alpha)) / 255) as u8;
                self.write_pixel(left + sx as i32, top + sy as i32, color);
            }
        }
    }
}
