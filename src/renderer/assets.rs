//! Procedural SVG textures
//!
//! Textures are generated once per session by `AssetCache::init` and dropped
//! again by `teardown`. Anything asked for that was never generated gets a
//! grey placeholder instead of an error.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

/// Named visual asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetKey {
    Background,
    Tree,
    Basket,
    Apple,
    Snake,
    SnakeSegment,
    Worm,
    Squirrel,
    SquirrelWithApple,
}

impl AssetKey {
    pub const ALL: [AssetKey; 9] = [
        AssetKey::Background,
        AssetKey::Tree,
        AssetKey::Basket,
        AssetKey::Apple,
        AssetKey::Snake,
        AssetKey::SnakeSegment,
        AssetKey::Worm,
        AssetKey::Squirrel,
        AssetKey::SquirrelWithApple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AssetKey::Background => "background",
            AssetKey::Tree => "tree",
            AssetKey::Basket => "basket",
            AssetKey::Apple => "apple",
            AssetKey::Snake => "snake",
            AssetKey::SnakeSegment => "snake_segment",
            AssetKey::Worm => "worm",
            AssetKey::Squirrel => "squirrel",
            AssetKey::SquirrelWithApple => "squirrel_with_apple",
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset cache used before init")]
    NotInitialized,
    #[error("no texture generated for '{0}'")]
    Missing(&'static str),
}

/// SVG source plus its pixel size
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Texture {
    pub key: AssetKey,
    pub width: u32,
    pub height: u32,
    pub svg: String,
    /// Generated stand-in for a missing asset
    pub placeholder: bool,
}

/// Session-scoped texture store
#[derive(Debug, Default)]
pub struct AssetCache {
    textures: HashMap<AssetKey, Texture>,
    initialized: bool,
}

impl AssetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate every texture that doesn't exist yet, replacing any
    /// placeholder handed out earlier. Safe to call repeatedly.
    pub fn init(&mut self, width: f32, height: f32) {
        for key in AssetKey::ALL {
            if self.textures.get(&key).is_some_and(|t| !t.placeholder) {
                continue;
            }
            self.textures.insert(key, generate(key, width, height));
        }
        self.initialized = true;
        log::info!("asset cache ready: {} textures", self.textures.len());
    }

    /// Drop everything at session end
    pub fn teardown(&mut self) {
        self.textures.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn contains(&self, key: AssetKey) -> bool {
        self.textures.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    pub fn get(&self, key: AssetKey) -> Result<&Texture, AssetError> {
        if !self.initialized {
            return Err(AssetError::NotInitialized);
        }
        self.textures.get(&key).ok_or(AssetError::Missing(key.as_str()))
    }

    /// Like `get`, but a miss is filled with a placeholder
    pub fn get_or_placeholder(&mut self, key: AssetKey) -> &Texture {
        if !self.textures.contains_key(&key) {
            if let Err(e) = self.get(key) {
                log::warn!("{e}, using placeholder");
            }
        }
        self.textures.entry(key).or_insert_with(|| placeholder(key))
    }
}

fn texture(key: AssetKey, width: u32, height: u32, svg: String) -> Texture {
    Texture {
        key,
        width,
        height,
        svg,
        placeholder: false,
    }
}

/// Grey box with a border, sized like a typical sprite
pub fn placeholder(key: AssetKey) -> Texture {
    let svg = r##"<svg width="32" height="32" viewBox="0 0 32 32" xmlns="http://www.w3.org/2000/svg">
<rect width="32" height="32" fill="#CCCCCC"/>
<rect x="2" y="2" width="28" height="28" fill="none" stroke="#000000" stroke-width="2"/>
</svg>"##;
    Texture {
        placeholder: true,
        ..texture(key, 32, 32, svg.to_string())
    }
}

fn generate(key: AssetKey, width: f32, height: f32) -> Texture {
    match key {
        AssetKey::Background => background(width, height),
        AssetKey::Tree => texture(key, 128, 160, TREE_SVG.to_string()),
        AssetKey::Basket => texture(key, 80, 60, BASKET_SVG.to_string()),
        AssetKey::Apple => texture(key, 64, 64, APPLE_SVG.to_string()),
        AssetKey::Snake => texture(key, 64, 32, SNAKE_SVG.to_string()),
        AssetKey::SnakeSegment => texture(key, 24, 24, SEGMENT_SVG.to_string()),
        AssetKey::Worm => texture(key, 40, 16, WORM_SVG.to_string()),
        AssetKey::Squirrel => texture(key, 48, 48, squirrel(false)),
        AssetKey::SquirrelWithApple => texture(key, 48, 48, squirrel(true)),
    }
}

const APPLE_SVG: &str = r#"<svg width="64" height="64" viewBox="0 0 64 64" xmlns="http://www.w3.org/2000/svg">
<path d="M32 10 L32 18" stroke="brown" stroke-width="3"/>
<path d="M32 10 Q38 8 40 14" stroke="brown" stroke-width="2" fill="none"/>
<path d="M24 20 Q20 14 28 14 Q36 14 40 20 Q54 28 42 48 Q32 60 22 48 Q10 28 24 20" fill="red"/>
<ellipse cx="28" cy="28" rx="5" ry="8" fill="rgba(255,255,255,0.3)" transform="rotate(-25 28 28)"/>
<path d="M32 14 Q38 4 42 12" stroke="none" fill="green"/>
</svg>"#;

const TREE_SVG: &str = r##"<svg width="128" height="160" viewBox="0 0 128 160" xmlns="http://www.w3.org/2000/svg">
<rect x="54" y="80" width="20" height="80" fill="#8B4513"/>
<circle cx="64" cy="80" r="40" fill="#228B22"/>
<circle cx="40" cy="60" r="25" fill="#228B22"/>
<circle cx="90" cy="65" r="30" fill="#228B22"/>
<circle cx="64" cy="40" r="25" fill="#228B22"/>
<circle cx="45" cy="70" r="6" fill="red"/>
<circle cx="80" cy="50" r="6" fill="red"/>
<circle cx="90" cy="85" r="6" fill="red"/>
<circle cx="40" cy="40" r="6" fill="red"/>
<circle cx="64" cy="90" r="6" fill="red"/>
</svg>"##;

const BASKET_SVG: &str = r##"<svg width="80" height="60" viewBox="0 0 80 60" xmlns="http://www.w3.org/2000/svg">
<path d="M10 20 Q40 10 70 20" stroke="#8B4513" stroke-width="3" fill="none"/>
<path d="M10 20 L15 50 Q40 60 65 50 L70 20" fill="#D2B48C"/>
<path d="M10 25 L70 25 M10 32 L70 32 M10 39 L70 39 M15 46 L65 46" stroke="#8B4513" stroke-width="1.5"/>
<path d="M20 20 L22 50 M30 16 L32 52 M40 15 L40 55 M50 16 L48 52 M60 20 L58 50" stroke="#8B4513" stroke-width="1.5"/>
</svg>"##;

const SNAKE_SVG: &str = r##"<svg width="64" height="32" viewBox="0 0 64 32" xmlns="http://www.w3.org/2000/svg">
<circle cx="30" cy="16" r="10" fill="#00AA00"/>
<circle cx="14" cy="16" r="10" fill="#00AA00"/>
<circle cx="48" cy="16" r="12" fill="#008800"/>
<circle cx="52" cy="12" r="3" fill="white"/>
<circle cx="52" cy="20" r="3" fill="white"/>
<circle cx="52" cy="12" r="1.5" fill="black"/>
<circle cx="52" cy="20" r="1.5" fill="black"/>
<path d="M60 16 L64 12 M60 16 L64 20" stroke="#FF0066" stroke-width="2"/>
<rect x="56" y="15" width="4" height="2" fill="#FF0066"/>
</svg>"##;

const SEGMENT_SVG: &str = r##"<svg width="24" height="24" viewBox="0 0 24 24" xmlns="http://www.w3.org/2000/svg">
<circle cx="12" cy="12" r="10" fill="#00AA00"/>
<circle cx="12" cy="12" r="5" fill="#008800"/>
</svg>"##;

const WORM_SVG: &str = r##"<svg width="40" height="16" viewBox="0 0 40 16" xmlns="http://www.w3.org/2000/svg">
<path d="M4 8 Q12 2 20 8 T36 8" stroke="#E8A0A0" stroke-width="7" stroke-linecap="round" fill="none"/>
<circle cx="34" cy="6" r="1.2" fill="black"/>
</svg>"##;

fn squirrel(with_apple: bool) -> String {
    let apple = if with_apple {
        r#"<circle cx="36" cy="30" r="7" fill="red"/><path d="M36 23 L37 19" stroke="brown" stroke-width="2"/>"#
    } else {
        ""
    };
    format!(
        r##"<svg width="48" height="48" viewBox="0 0 48 48" xmlns="http://www.w3.org/2000/svg">
<path d="M12 38 Q0 24 10 10 Q18 4 16 18 Q14 28 20 34" fill="#A0522D"/>
<ellipse cx="26" cy="32" rx="11" ry="9" fill="#CD853F"/>
<circle cx="34" cy="20" r="7" fill="#CD853F"/>
<path d="M31 14 L32 9 L35 13" fill="#A0522D"/>
<circle cx="37" cy="19" r="1.5" fill="black"/>
{apple}
</svg>"##
    )
}

fn background(width: f32, height: f32) -> Texture {
    let (w, h) = (width, height);
    let svg = format!(
        r##"<svg width="{w}" height="{h}" viewBox="0 0 {w} {h}" xmlns="http://www.w3.org/2000/svg">
<defs>
<linearGradient id="sky" x1="0%" y1="0%" x2="0%" y2="70%"><stop offset="0%" stop-color="#87CEEB"/><stop offset="100%" stop-color="#ADD8E6"/></linearGradient>
<linearGradient id="grass" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="#66BB66"/><stop offset="100%" stop-color="#458B00"/></linearGradient>
</defs>
<rect width="{w}" height="{sky}" fill="url(#sky)"/>
<rect y="{sky}" width="{w}" height="{grass}" fill="url(#grass)"/>
<circle cx="{sun_x}" cy="{sun_y}" r="{sun_r}" fill="#FFD700"/>
<circle cx="{sun_x}" cy="{sun_y}" r="{halo_r}" fill="rgba(255, 215, 0, 0.3)"/>
<g opacity="0.8" fill="white">
<circle cx="{c1x}" cy="{c1y}" r="{c1r}"/>
<circle cx="{c2x}" cy="{c2y}" r="{c2r}"/>
</g>
</svg>"##,
        sky = h * 0.7,
        grass = h * 0.3,
        sun_x = w * 0.8,
        sun_y = h * 0.2,
        sun_r = w * 0.05,
        halo_r = w * 0.08,
        c1x = w * 0.2,
        c1y = h * 0.25,
        c1r = w * 0.04,
        c2x = w * 0.6,
        c2y = h * 0.15,
        c2r = w * 0.05,
    );
    texture(AssetKey::Background, width.round() as u32, height.round() as u32, svg)
}
