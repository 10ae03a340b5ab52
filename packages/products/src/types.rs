use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Note written on the timeline when a product is marked ready for sale
pub const READY_FOR_SALE_NOTE: &str = "Product is now available for consumers";

/// Supply-chain checkpoints a product moves through, in order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Stage {
    Farmer = 1,
    Middleman = 2,
    Retailer = 3,
    ReadyForSale = 4,
}

impl Stage {
    /// All stages in lifecycle order
    pub const ALL: [Stage; 4] = [
        Stage::Farmer,
        Stage::Middleman,
        Stage::Retailer,
        Stage::ReadyForSale,
    ];

    /// Wire number for this stage (1-4)
    pub fn as_number(self) -> u8 {
        self as u8
    }

    pub fn from_number(number: i64) -> Option<Stage> {
        match number {
            1 => Some(Stage::Farmer),
            2 => Some(Stage::Middleman),
            3 => Some(Stage::Retailer),
            4 => Some(Stage::ReadyForSale),
            _ => None,
        }
    }

    /// Display label for this stage
    pub fn label(self) -> &'static str {
        match self {
            Stage::Farmer => "Farmer",
            Stage::Middleman => "Middleman",
            Stage::Retailer => "Retailer",
            Stage::ReadyForSale => "Ready for Sale",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl From<Stage> for u8 {
    fn from(stage: Stage) -> u8 {
        stage.as_number()
    }
}

impl TryFrom<u8> for Stage {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Stage::from_number(value as i64).ok_or_else(|| format!("invalid stage number: {}", value))
    }
}

/// One handling event on a product's timeline.
///
/// Entries are immutable once appended; the timeline only ever grows.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageEntry {
    pub stage: Stage,
    #[serde(rename = "stageName")]
    pub stage_name: String,
    pub price: f64,
    /// Effective date of the event, as entered at the handoff. May differ
    /// from the record's created/updated timestamps.
    pub date: String,
    pub location: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
    #[serde(rename = "handlerName")]
    pub handler_name: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,
}

impl StageEntry {
    /// Initial harvest entry written when a product is created
    pub fn farmer(
        price: f64,
        harvest_date: String,
        location: String,
        notes: Option<String>,
        photo: Option<String>,
    ) -> Self {
        StageEntry {
            stage: Stage::Farmer,
            stage_name: Stage::Farmer.label().to_string(),
            price,
            date: harvest_date,
            location,
            notes,
            photo,
            handler_name: Some(Stage::Farmer.label().to_string()),
            quality: None,
            expiry_date: None,
        }
    }

    /// Middleman handoff entry
    pub fn middleman(
        price: f64,
        date: String,
        location: String,
        notes: Option<String>,
        photo: Option<String>,
        handler_name: Option<String>,
    ) -> Self {
        StageEntry {
            stage: Stage::Middleman,
            stage_name: Stage::Middleman.label().to_string(),
            price,
            date,
            location,
            notes,
            photo,
            handler_name: handler_name.or_else(|| Some(Stage::Middleman.label().to_string())),
            quality: None,
            expiry_date: None,
        }
    }

    /// Retailer stocking entry
    #[allow(clippy::too_many_arguments)]
    pub fn retailer(
        price: f64,
        date: String,
        location: String,
        notes: Option<String>,
        photo: Option<String>,
        quality: Option<String>,
        expiry_date: Option<String>,
        handler_name: Option<String>,
    ) -> Self {
        StageEntry {
            stage: Stage::Retailer,
            stage_name: Stage::Retailer.label().to_string(),
            price,
            date,
            location,
            notes,
            photo,
            handler_name: handler_name.or_else(|| Some(Stage::Retailer.label().to_string())),
            quality,
            expiry_date,
        }
    }

    /// Terminal ready-for-sale marker. No new economic event happened, so
    /// price and location carry forward from the previous entry.
    pub fn ready_for_sale(previous: &StageEntry, date: String) -> Self {
        StageEntry {
            stage: Stage::ReadyForSale,
            stage_name: Stage::ReadyForSale.label().to_string(),
            price: previous.price,
            date,
            location: previous.location.clone(),
            notes: Some(READY_FOR_SALE_NOTE.to_string()),
            photo: None,
            handler_name: Some(Stage::Retailer.label().to_string()),
            quality: None,
            expiry_date: None,
        }
    }
}

/// A tracked produce record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: String,
    pub crop: String,
    pub quantity: f64,
    pub current_stage: Stage,
    pub timeline: Vec<StageEntry>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Most recent timeline entry. Present on every stored record, since
    /// creation always writes the harvest entry.
    pub fn last_entry(&self) -> Option<&StageEntry> {
        self.timeline.last()
    }
}

/// Input for creating a new product at the farmer stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarvestInput {
    pub crop: String,
    pub quantity: f64,
    pub price: f64,
    pub location: String,
    #[serde(rename = "harvestDate")]
    pub harvest_date: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
}

/// Input for advancing a product to its next stage
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageUpdateInput {
    pub price: f64,
    pub date: String,
    pub location: String,
    pub notes: Option<String>,
    pub photo: Option<String>,
    #[serde(rename = "handlerName")]
    pub handler_name: Option<String>,
    pub quality: Option<String>,
    #[serde(rename = "expiryDate")]
    pub expiry_date: Option<String>,
}

/// Full replacement state written back after a stage append.
///
/// Stage, timeline, and photos always travel together in one store write;
/// a timeline append is never split from its photo append.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductPatch {
    pub current_stage: Stage,
    pub timeline: Vec<StageEntry>,
    pub photos: Vec<String>,
}
