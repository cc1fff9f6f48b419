use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Class of a composited image. Declaration order is the draw priority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerType {
    /// Backgrounds, drawn first.
    Background,
    /// Sprites; subject to the active sprite range.
    Sprite,
    /// Character art; subject to the human reorder list.
    Human,
    /// Text, drawn last.
    Text,
}

impl LayerType {
    /// Every type in draw order.
    pub const ALL: [LayerType; 4] = [
        LayerType::Background,
        LayerType::Sprite,
        LayerType::Human,
        LayerType::Text,
    ];

    /// The single-bit set for this type.
    pub fn flag(self) -> LayerTypes {
        match self {
            LayerType::Background => LayerTypes::BACKGROUND,
            LayerType::Sprite => LayerTypes::SPRITE,
            LayerType::Human => LayerTypes::HUMAN,
            LayerType::Text => LayerTypes::TEXT,
        }
    }
}

bitflags! {
    /// Set of [`LayerType`]s.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LayerTypes: u16 {
        /// Background images.
        const BACKGROUND = 1 << 0;
        /// Sprites.
        const SPRITE = 1 << 1;
        /// Human (character) images.
        const HUMAN = 1 << 2;
        /// Text windows.
        const TEXT = 1 << 3;
    }
}

impl Default for LayerTypes {
    fn default() -> Self {
        Self::all()
    }
}

impl From<LayerType> for LayerTypes {
    fn from(kind: LayerType) -> Self {
        kind.flag()
    }
}

impl FromIterator<LayerType> for LayerTypes {
    fn from_iter<I: IntoIterator<Item = LayerType>>(iter: I) -> Self {
        iter.into_iter()
            .fold(LayerTypes::empty(), |acc, t| acc | t.flag())
    }
}

/// Draw position of a composited image: its type and a 16-bit ordinal within that type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer {
    /// Type class.
    pub kind: LayerType,
    /// Position within the type class; lower draws first.
    pub ordinal: u16,
}

impl Layer {
    /// Layer of `kind` at `ordinal`.
    pub const fn new(kind: LayerType, ordinal: u16) -> Self {
        Self { kind, ordinal }
    }

    /// Background layer at `ordinal`.
    pub const fn background(ordinal: u16) -> Self {
        Self::new(LayerType::Background, ordinal)
    }

    /// Sprite layer at `ordinal`.
    pub const fn sprite(ordinal: u16) -> Self {
        Self::new(LayerType::Sprite, ordinal)
    }

    /// Human (character) layer at `ordinal`.
    pub const fn human(ordinal: u16) -> Self {
        Self::new(LayerType::Human, ordinal)
    }

    /// Text layer at `ordinal`.
    pub const fn text(ordinal: u16) -> Self {
        Self::new(LayerType::Text, ordinal)
    }
}
