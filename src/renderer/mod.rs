//! Rendering collaborator
//!
//! The core only says "draw asset K at (x, y, θ)". `draw_list` builds those
//! sprites from controller state, `render_frame` pairs each with its texture
//! and hands both to whatever actually puts pixels on screen.

pub mod assets;
pub mod sprites;

pub use assets::{AssetCache, AssetError, AssetKey, Texture};
pub use sprites::{Sprite, draw_list};

use crate::sim::RoundController;

/// Backend that draws textured sprites (canvas, GPU, test recorder)
pub trait SpriteSink {
    fn draw(&mut self, sprite: &Sprite, texture: &Texture);
}

/// Draw one frame. Missing textures fall back to placeholders. Returns the
/// number of sprites drawn.
pub fn render_frame(ctrl: &RoundController, cache: &mut AssetCache, sink: &mut dyn SpriteSink) -> usize {
    let mut drawn = 0;
    for sprite in draw_list(ctrl).iter().filter(|s| s.visible) {
        let texture = cache.get_or_placeholder(sprite.key);
        sink.draw(sprite, texture);
        drawn += 1;
    }
    drawn
}
