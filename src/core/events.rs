//! Events the gallery exposes to the host application.

use serde::{Deserialize, Serialize};

use super::card::CardModel;

/// Which renderer is active.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    Sphere,
    Album,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::Sphere => "sphere",
            ViewMode::Album => "album",
        }
    }
}

/// Outbound gallery events, drained by the host once per frame.
#[derive(Clone, Debug)]
pub enum GalleryEvent {
    /// A card was clicked, in either view mode.
    CardSelected(CardModel),
    /// The active renderer changed.
    ViewModeChanged(ViewMode),
    /// A fresh display set replaced the previous one.
    DisplaySetReplaced {
        generation: u64,
        real_cards: usize,
        filler_cards: usize,
    },
}
