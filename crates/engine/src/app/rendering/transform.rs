use crate::world::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Screen offset that centres a level of `level_bounds` inside the viewport.
/// Levels larger than the viewport are pinned to the top-left corner.
pub fn level_origin_px(level_bounds: Rect, viewport: Viewport) -> (i32, i32) {
    let x = (viewport.width as i32 - level_bounds.width).max(0) / 2;
    let y = (viewport.height as i32 - level_bounds.height).max(0) / 2;
    (x, y)
}

pub fn world_to_screen_px(x: i32, y: i32, origin: (i32, i32)) -> (i32, i32) {
    (origin.0 + x, origin.1 + y)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_matching_viewport_maps_one_to_one() {
        let viewport = Viewport {
            width: 1024,
            height: 1024,
        };
        let origin = level_origin_px(Rect::new(0, 0, 1024, 1024), viewport);
        assert_eq!(origin, (0, 0));
        assert_eq!(world_to_screen_px(480, 900, origin), (480, 900));
    }

    #[test]
    fn small_level_is_centred() {
        let viewport = Viewport {
            width: 800,
            height: 600,
        };
        let origin = level_origin_px(Rect::new(0, 0, 512, 512), viewport);
        assert_eq!(origin, (144, 44));
        assert_eq!(world_to_screen_px(10, -4, origin), (154, 40));
    }

    #[test]
    fn oversized_level_is_pinned() {
        let viewport = Viewport {
            width: 640,
            height: 480,
        };
        assert_eq!(level_origin_px(Rect::new(0, 0, 1024, 1024), viewport), (0, 0));
    }
}
