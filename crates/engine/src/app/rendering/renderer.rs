use std::path::PathBuf;
use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::sprite_keys::SpriteKey;
use crate::world::{
    container_sprite_key, creature_sprite_key, effect_sprite_key, item_sprite_key,
    peaceful_sprite_key, select_player_visual, Body, Rect, Tile, Tint, World, TILE_SIZE,
};

use super::canvas::{Canvas, SpriteStyle};
use super::sprites::SpriteCache;
use super::transform::{level_origin_px, world_to_screen_px, Viewport};

const CLEAR_COLOR: [u8; 4] = [12, 12, 16, 255];
const FLOOR_COLOR: [u8; 4] = [86, 74, 58, 255];
const WALL_COLOR: [u8; 4] = [52, 50, 60, 255];
const WATER_COLOR: [u8; 4] = [40, 72, 140, 255];
const PLAYER_COLOR: [u8; 4] = [220, 220, 240, 255];
const HOSTILE_COLOR: [u8; 4] = [200, 60, 60, 255];
const PEACEFUL_COLOR: [u8; 4] = [70, 170, 90, 255];
const CHEST_COLOR: [u8; 4] = [170, 120, 40, 255];
const ITEM_COLOR: [u8; 4] = [240, 210, 60, 255];
const MISSILE_COLOR: [u8; 4] = [160, 120, 255, 255];
const EFFECT_COLOR: [u8; 4] = [255, 255, 255, 160];
const PROMPT_COLOR: [u8; 4] = [20, 20, 28, 220];
const PROMPT_BORDER_COLOR: [u8; 4] = [230, 230, 230, 255];
const HEALTH_COLOR: [u8; 4] = [210, 40, 50, 255];
const HEALTH_EMPTY_COLOR: [u8; 4] = [70, 30, 34, 255];
const DAMAGED_TINT: [u8; 4] = [255, 40, 40, 255];
const EFFECT_RISE_PX: f32 = 24.0;
const PROMPT_WIDTH_PX: i32 = 160;
const PROMPT_HEIGHT_PX: i32 = 28;
const HEALTH_PIP_PX: i32 = 12;

/// Draws the active level and every entity collection from read-only world
/// state. Sprites come from `<asset_root>/sprites/<key>.png`; a missing sprite
/// is drawn as a flat placeholder rectangle.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    viewport: Viewport,
    sprites: SpriteCache,
}

impl Renderer {
    pub fn new(window: Arc<Window>, asset_root: PathBuf) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(Arc::clone(&window), size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            viewport: Viewport {
                width: size.width,
                height: size.height,
            },
            sprites: SpriteCache::new(asset_root),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(Arc::clone(&self.window), width, height)?;
        self.viewport = Viewport { width, height };
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(width, height, window);
        Pixels::new(width, height, surface)
    }

    pub fn render_world(&mut self, world: &World) -> Result<(), Error> {
        let viewport = self.viewport;
        let mut canvas = Canvas::new(self.pixels.frame_mut(), viewport.width, viewport.height);
        canvas.clear(CLEAR_COLOR);

        if let Some(level) = world.current_level_map() {
            let origin = level_origin_px(level.tilemap().pixel_bounds(), viewport);
            let mut scene = SceneDraw {
                canvas: &mut canvas,
                sprites: &mut self.sprites,
                origin,
            };
            scene.draw_tiles(level.tilemap());
            scene.draw_entities(world);
        }
        draw_health(&mut canvas, world);

        self.pixels.render()
    }
}

struct SceneDraw<'c, 'f> {
    canvas: &'c mut Canvas<'f>,
    sprites: &'c mut SpriteCache,
    origin: (i32, i32),
}

impl SceneDraw<'_, '_> {
    fn draw_tiles(&mut self, tilemap: &crate::world::Tilemap) {
        for row in 0..tilemap.height() {
            for column in 0..tilemap.width() {
                let Some(tile) = tilemap.tile_at(column, row) else {
                    continue;
                };
                let (token, color) = match tile {
                    Tile::Floor => ("tile/floor", FLOOR_COLOR),
                    Tile::Wall => ("tile/wall", WALL_COLOR),
                    Tile::Water => ("tile/water", WATER_COLOR),
                };
                let area = Rect::new(
                    column as i32 * TILE_SIZE,
                    row as i32 * TILE_SIZE,
                    TILE_SIZE,
                    TILE_SIZE,
                );
                let key = SpriteKey::from_trusted(token.to_string());
                self.draw_keyed(&key, area, color, SpriteStyle::default());
            }
        }
    }

    fn draw_entities(&mut self, world: &World) {
        for container in world.containers() {
            self.draw_keyed(
                &container_sprite_key(container),
                container.hit_box(),
                CHEST_COLOR,
                SpriteStyle::default(),
            );
        }
        for item in world.items() {
            self.draw_keyed(
                &item_sprite_key(item.kind),
                item.hit_box(),
                ITEM_COLOR,
                SpriteStyle::default(),
            );
        }
        for entity in world.peaceful() {
            self.draw_keyed(
                &peaceful_sprite_key(entity),
                entity.hit_box(),
                PEACEFUL_COLOR,
                SpriteStyle::default(),
            );
        }
        for hostile in world.hostiles() {
            self.draw_keyed(
                &creature_sprite_key(hostile),
                hostile.hit_box(),
                HOSTILE_COLOR,
                SpriteStyle::default(),
            );
        }
        for missile in world.missiles() {
            let key = SpriteKey::from_trusted(format!("missile/{}", missile.facing().as_token()));
            self.draw_keyed(&key, missile.hit_box(), MISSILE_COLOR, SpriteStyle::default());
        }

        let player = world.player();
        if player.base().is_alive() {
            let visual = select_player_visual(player);
            let (tint, alpha) = match visual.tint {
                Tint::None => (None, u8::MAX),
                Tint::Damaged => (Some(DAMAGED_TINT), u8::MAX),
                Tint::Evading { alpha } => (None, alpha),
            };
            let style = SpriteStyle {
                mirrored: visual.mirrored,
                tint,
                alpha,
            };
            self.draw_keyed(&visual.sprite, player.flickered_hit_box(), PLAYER_COLOR, style);
        }

        for effect in world.effects() {
            let rise = (effect.progress() * EFFECT_RISE_PX).round() as i32;
            let area = Rect::new(effect.x, effect.y - rise, 24, 24);
            self.draw_keyed(&effect_sprite_key(effect), area, EFFECT_COLOR, SpriteStyle::default());
        }
        for prompt in world.prompts() {
            let (left, top) = world_to_screen_px(prompt.x, prompt.y - PROMPT_HEIGHT_PX, self.origin);
            self.canvas
                .fill_rect(left, top, PROMPT_WIDTH_PX, PROMPT_HEIGHT_PX, PROMPT_COLOR);
            self.canvas
                .outline_rect(left, top, PROMPT_WIDTH_PX, PROMPT_HEIGHT_PX, PROMPT_BORDER_COLOR);
        }
    }

    /// Blits the sprite for `key` at the top-left of `area`, or fills `area`
    /// with `fallback` when the sprite cannot be loaded.
    fn draw_keyed(&mut self, key: &SpriteKey, area: Rect, fallback: [u8; 4], style: SpriteStyle) {
        let (left, top) = world_to_screen_px(area.x, area.y, self.origin);
        match self.sprites.resolve(key) {
            Some(sprite) => self.canvas.draw_sprite(left, top, sprite, style),
            None => {
                let mut color = fallback;
                color[3] = ((u16::from(color[3]) * u16::from(style.alpha)) / 255) as u8;
                if let Some(tint) = style.tint {
                    color[0] = tint[0];
                }
                self.canvas.fill_rect(left, top, area.width, area.height, color);
            }
        }
    }
}

fn draw_health(canvas: &mut Canvas<'_>, world: &World) {
    let base = world.player().base();
    for pip in 0..base.max_health() as i32 {
        let color = if (pip as u32) < base.health() {
            HEALTH_COLOR
        } else {
            HEALTH_EMPTY_COLOR
        };
        canvas.fill_rect(
            8 + pip * (HEALTH_PIP_PX + 4),
            8,
            HEALTH_PIP_PX,
            HEALTH_PIP_PX,
            color,
        );
    }
}
