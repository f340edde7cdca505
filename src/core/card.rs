//! Diary card data model.
//!
//! `DiaryEntry` is the wire record the host application hands us (one JSON
//! object per diary). `CardModel` is the normalized, immutable value the
//! sampler and layout engines work with. Real entries carry positive ids,
//! synthesized filler strictly negative ones, so the two spaces never collide.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Card border/panel colors, assigned by display position.
pub const PALETTE: [[u8; 3]; 8] = [
    [244, 180, 164], // coral
    [249, 214, 134], // honey
    [178, 216, 169], // sage
    [150, 199, 231], // sky
    [205, 180, 227], // lilac
    [247, 166, 197], // rose
    [166, 221, 214], // mint
    [239, 199, 156], // apricot
];

// Display strings for synthesized filler cards.
pub const FILLER_TITLE: &str = "New memories await";
pub const FILLER_DATE: &str = "someday";
pub const FILLER_LOCATION: &str = "anywhere";
pub const FILLER_WEATHER: &str = "sunny";
pub const FILLER_BODY: &str = "Add a diary and this spot fills up with your pet's day.";

/// Where a card's artwork comes from.
///
/// Typed so a filler index can never be mistaken for a file ref.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageSource {
    /// Path (or URL handed down by the host) of a real photo.
    File(String),
    /// Procedurally synthesized paw print for the given filler index.
    Synthesized(usize),
}

/// One displayable card: a normalized diary entry or a synthesized filler.
#[derive(Clone, Debug, PartialEq)]
pub struct CardModel {
    /// Positive for real diary entries, strictly negative for filler.
    pub id: i64,
    pub image: ImageSource,
    pub title: String,
    pub date_label: String,
    pub location_label: String,
    pub weather_label: String,
    pub content_text: String,
    /// Display-set position mod `PALETTE.len()`; set by the sampler so
    /// re-sampling re-colors by position, not identity.
    pub palette_index: usize,
    pub is_placeholder: bool,
    /// All photo refs of a real entry, for the detail overlay only.
    pub photos: Vec<String>,
}

impl CardModel {
    /// Normalize a host diary entry into a card.
    ///
    /// The first available photo ref becomes the card image; entries
    /// without any photo fall back to synthesized artwork (but stay real).
    pub fn from_entry(entry: &DiaryEntry) -> Self {
        let photos = entry.photo_refs();
        let image = match photos.first() {
            Some(url) => ImageSource::File(url.clone()),
            None => ImageSource::Synthesized(0),
        };
        Self {
            id: entry.id,
            image,
            title: entry.title.clone(),
            date_label: entry.date.clone(),
            location_label: entry.location_name.clone().unwrap_or_default(),
            weather_label: entry.weather.clone().unwrap_or_default(),
            content_text: entry.content.clone(),
            palette_index: 0,
            is_placeholder: false,
            photos,
        }
    }

    /// Build a filler card for a display-set slot.
    ///
    /// `index` is the slot position (drives palette and artwork), `id` the
    /// fresh negative id handed out by the sampler.
    pub fn filler(index: usize, id: i64) -> Self {
        debug_assert!(id < 0, "filler ids must be negative, got {id}");
        Self {
            id,
            image: ImageSource::Synthesized(index),
            title: FILLER_TITLE.to_string(),
            date_label: FILLER_DATE.to_string(),
            location_label: FILLER_LOCATION.to_string(),
            weather_label: FILLER_WEATHER.to_string(),
            content_text: FILLER_BODY.to_string(),
            palette_index: index % PALETTE.len(),
            is_placeholder: true,
            photos: Vec::new(),
        }
    }

    /// Panel color for this card.
    pub fn palette_color(&self) -> [u8; 3] {
        PALETTE[self.palette_index % PALETTE.len()]
    }

    /// Compact one-line label shown under the card image.
    pub fn label_text(&self) -> String {
        if self.date_label.is_empty() {
            self.title.clone()
        } else {
            format!("{}  {}", self.date_label, self.title)
        }
    }
}

/// A single photo ref inside a diary entry's `images` list.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DiaryImage {
    pub image_url: String,
}

/// Wire record for one diary entry, as fetched by the host application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    pub id: i64,
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub location_name: Option<String>,
    pub content: String,
    #[serde(default)]
    pub weather: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub images: Option<Vec<DiaryImage>>,
}

impl DiaryEntry {
    /// All photo refs in order: `imageUrls` wins when present, otherwise
    /// the `images` list. The two fields carry the same data in different
    /// host API versions.
    pub fn photo_refs(&self) -> Vec<String> {
        if let Some(urls) = &self.image_urls
            && !urls.is_empty()
        {
            return urls.clone();
        }
        self.images
            .as_ref()
            .map(|imgs| imgs.iter().map(|i| i.image_url.clone()).collect())
            .unwrap_or_default()
    }
}

/// Read a diary list JSON file (the host stand-in for the REST fetch).
///
/// Callers treat any failure as an empty source collection, so the gallery
/// degrades to all-filler instead of erroring out.
pub fn read_diary_list(path: &Path) -> anyhow::Result<Vec<DiaryEntry>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read diary list: {}", path.display()))?;
    let entries: Vec<DiaryEntry> = serde_json::from_str(&data)
        .with_context(|| format!("Failed to parse diary list: {}", path.display()))?;
    Ok(entries)
}
