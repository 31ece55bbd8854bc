//! Sprite list generation from controller state

use glam::Vec2;
use serde::Serialize;

use super::assets::AssetKey;
use crate::sim::{PursuerKind, RoundController};

/// Draw order, back to front
pub mod depth {
    pub const BACKGROUND: i32 = 0;
    pub const TREE: i32 = 1;
    pub const BASKET: i32 = 2;
    pub const WORM: i32 = 8;
    pub const SNAKE: i32 = 9;
    pub const SQUIRREL: i32 = 10;
    pub const FRUIT: i32 = 15;
}

/// "Draw asset K at (x, y, θ)"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sprite {
    pub key: AssetKey,
    pub pos: Vec2,
    pub rotation: f32,
    pub visible: bool,
    pub depth: i32,
    pub alpha: f32,
    pub flip_x: bool,
}

impl Sprite {
    fn new(key: AssetKey, pos: Vec2, depth: i32) -> Self {
        Self {
            key,
            pos,
            rotation: 0.0,
            visible: true,
            depth,
            alpha: 1.0,
            flip_x: false,
        }
    }

    fn rotated(mut self, rotation: f32) -> Self {
        self.rotation = rotation;
        self
    }
}

/// Everything on screen this frame, sorted by depth (stable within a layer)
pub fn draw_list(ctrl: &RoundController) -> Vec<Sprite> {
    let mut sprites = vec![
        Sprite::new(AssetKey::Background, ctrl.area.center(), depth::BACKGROUND),
        Sprite::new(AssetKey::Tree, ctrl.tree.pos, depth::TREE),
        Sprite::new(AssetKey::Basket, ctrl.basket.pos, depth::BASKET),
    ];

    for pursuer in &ctrl.pursuers {
        match pursuer.kind {
            PursuerKind::Worm => {
                sprites.push(Sprite::new(AssetKey::Worm, pursuer.pos, depth::WORM).rotated(pursuer.rotation));
            }
            PursuerKind::Snake => {
                // Tail first so the head ends up on top
                let count = pursuer.segments().len();
                for (i, seg) in pursuer.segments().iter().enumerate().rev() {
                    let mut sprite = Sprite::new(AssetKey::SnakeSegment, seg.pos, depth::SNAKE).rotated(seg.rotation);
                    sprite.alpha = 1.0 - 0.4 * (i as f32 / count.max(1) as f32);
                    sprites.push(sprite);
                }
                sprites.push(Sprite::new(AssetKey::Snake, pursuer.pos, depth::SNAKE).rotated(pursuer.rotation));
            }
        }
    }

    if let Some(mover) = ctrl.mover.as_ref().filter(|m| m.active) {
        let key = if mover.carrying {
            AssetKey::SquirrelWithApple
        } else {
            AssetKey::Squirrel
        };
        let mut sprite = Sprite::new(key, mover.pos, depth::SQUIRREL).rotated(mover.rotation);
        sprite.flip_x = mover.flip_x;
        sprites.push(sprite);
    }

    if let Some(fruit) = ctrl.fruit.as_ref().filter(|f| f.is_active) {
        let mut sprite = Sprite::new(AssetKey::Apple, fruit.pos, depth::FRUIT).rotated(fruit.rotation);
        sprite.visible = fruit.visible;
        sprites.push(sprite);
    }

    sprites.sort_by_key(|s| s.depth);
    sprites
}
