use std::f64::consts::PI;

use crate::sprite_keys::SpriteKey;

use super::collectible::ItemKind;
use super::container::Container;
use super::effects::{EffectKind, ScreenEffect};
use super::entity::Body;
use super::geometry::Facing;
use super::hostile::HostileEntity;
use super::peaceful::{PeacefulEntity, PeacefulKind};
use super::player::Player;

const ATTACK_PHASE_LATE: u8 = 20;
const ATTACK_PHASE_MID: u8 = 10;
const WALK_VARIANT_SPLIT: u8 = 15;
const CREATURE_VARIANT_SPLIT: u8 = 20;
const EVASION_FADE_PERIOD: f64 = 70.0;

/// Colour treatment applied on top of the selected sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    None,
    Damaged,
    Evading { alpha: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerVisual {
    pub sprite: SpriteKey,
    /// East-facing frames reuse the west assets flipped horizontally.
    pub mirrored: bool,
    pub tint: Tint,
}

/// Picks the player's sprite variant from attack, walk, facing, sword and
/// damage/evasion state. The caller resolves the key to drawable data.
pub fn select_player_visual(player: &Player) -> PlayerVisual {
    let (asset_facing, mirrored) = asset_facing(player.facing());
    let direction = asset_facing.as_token();

    let key = if player.is_attacking() {
        let phase = attack_phase(player.attack_frame());
        format!("player/attack/{direction}/{phase}")
    } else {
        let motion = if player.is_walking() { "walk" } else { "idle" };
        let gear = if player.has_sword() { "sword" } else { "bare" };
        let variant = u8::from(player.base().animation_frame() >= WALK_VARIANT_SPLIT);
        format!("player/{motion}/{direction}/{gear}/{variant}")
    };

    PlayerVisual {
        sprite: SpriteKey::from_trusted(key),
        mirrored,
        tint: player_tint(player),
    }
}

fn asset_facing(facing: Facing) -> (Facing, bool) {
    match facing {
        Facing::East => (Facing::West, true),
        other => (other, false),
    }
}

fn attack_phase(attack_frame: u8) -> u8 {
    if attack_frame > ATTACK_PHASE_LATE {
        2
    } else if attack_frame > ATTACK_PHASE_MID {
        1
    } else {
        0
    }
}

fn player_tint(player: &Player) -> Tint {
    if player.base().is_damaged() {
        return Tint::Damaged;
    }
    if player.is_evading() {
        let phase = f64::from(player.evasion_frame()) / EVASION_FADE_PERIOD * PI;
        let alpha = (255.0 * (1.0 - phase.sin())).clamp(0.0, 255.0).round() as u8;
        return Tint::Evading { alpha };
    }
    Tint::None
}

pub fn creature_sprite_key(hostile: &HostileEntity) -> SpriteKey {
    let variant = u8::from(hostile.base().animation_frame() >= CREATURE_VARIANT_SPLIT);
    let pose = if hostile.is_attacking() { "attack" } else { "move" };
    SpriteKey::from_trusted(format!(
        "{}/{pose}/{}/{variant}",
        hostile.kind().as_token(),
        hostile.facing().as_token()
    ))
}

pub fn peaceful_sprite_key(entity: &PeacefulEntity) -> SpriteKey {
    let key = match entity.kind() {
        PeacefulKind::TreeOfHealth if entity.passive_effect_frame() > 90 => {
            "tree_of_health/glow".to_string()
        }
        kind => kind.as_token().to_string(),
    };
    SpriteKey::from_trusted(key)
}

pub fn container_sprite_key(container: &Container) -> SpriteKey {
    let state = if container.is_opened() { "open" } else { "closed" };
    SpriteKey::from_trusted(format!("chest/{}/{state}", container.kind().as_token()))
}

pub fn item_sprite_key(kind: ItemKind) -> SpriteKey {
    SpriteKey::from_trusted(format!("item/{}", kind.as_token()))
}

pub fn effect_sprite_key(effect: &ScreenEffect) -> SpriteKey {
    match effect.kind() {
        EffectKind::ChestOpen(item) => item_sprite_key(item),
        EffectKind::Heal => SpriteKey::from_trusted("effect/heal".to_string()),
    }
}
