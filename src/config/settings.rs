//! User settings for spendlog
//!
//! A single record holding the last-used entry values and the fixed
//! parameters the services compute with. Missing fields fall back to their
//! defaults when an older record is read.

use serde::{Deserialize, Serialize};

use crate::models::Category;

/// Current schema version for stored and exported data
pub const SCHEMA_VERSION: u32 = 1;

/// How far back frequent amounts look, in days
pub const FREQUENT_AMOUNT_WINDOW_DAYS: u32 = 90;

/// How many frequent amounts are suggested
pub const FREQUENT_AMOUNT_LIMIT: usize = 5;

/// First day of the week (1 = Monday)
pub const WEEK_START: u8 = 1;

/// Settings record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Category of the most recently created expense
    #[serde(default)]
    pub last_used_category: Category,

    /// Subcategory of the most recently created expense
    #[serde(default = "default_subcategory")]
    pub last_used_subcategory: String,

    /// Memo of the most recently created expense
    #[serde(default)]
    pub last_used_memo: String,

    #[serde(default = "default_window_days")]
    pub frequent_amount_window_days: u32,

    #[serde(default = "default_limit")]
    pub frequent_amount_limit: usize,

    #[serde(default = "default_week_start")]
    pub week_start: u8,

    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_subcategory() -> String {
    Category::default().default_subcategory().to_string()
}

fn default_window_days() -> u32 {
    FREQUENT_AMOUNT_WINDOW_DAYS
}

fn default_limit() -> usize {
    FREQUENT_AMOUNT_LIMIT
}

fn default_week_start() -> u8 {
    WEEK_START
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            last_used_category: Category::default(),
            last_used_subcategory: default_subcategory(),
            last_used_memo: String::new(),
            frequent_amount_window_days: default_window_days(),
            frequent_amount_limit: default_limit(),
            week_start: default_week_start(),
            schema_version: default_schema_version(),
        }
    }
}

/// The three values remembered from the last created expense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUsed {
    pub category: Category,
    pub subcategory: String,
    pub memo: String,
}

impl Settings {
    /// Project the last-used values
    pub fn last_used(&self) -> LastUsed {
        LastUsed {
            category: self.last_used_category,
            subcategory: self.last_used_subcategory.clone(),
            memo: self.last_used_memo.clone(),
        }
    }

    /// Overwrite only the last-used values
    pub fn apply_last_used(&mut self, values: LastUsed) {
        self.last_used_category = values.category;
        self.last_used_subcategory = values.subcategory;
        self.last_used_memo = values.memo;
    }
}
