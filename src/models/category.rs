//! Expense categories and their subcategory table
//!
//! The set of categories is closed. Each category owns a fixed list of
//! subcategory codes; expenses and templates refer to both by value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Top-level expense classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Trains, buses, taxis
    #[default]
    Transport,
    /// Meals, cafes, gifts, entertainment
    Social,
}

/// A subcategory code with its display label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subcategory {
    pub code: &'static str,
    pub label: &'static str,
}

const TRANSPORT_SUBCATEGORIES: &[Subcategory] = &[
    Subcategory { code: "train", label: "Train" },
    Subcategory { code: "bus", label: "Bus" },
    Subcategory { code: "taxi", label: "Taxi" },
    Subcategory { code: "other_transport", label: "Other transport" },
];

const SOCIAL_SUBCATEGORIES: &[Subcategory] = &[
    Subcategory { code: "meal", label: "Meal" },
    Subcategory { code: "cafe", label: "Cafe" },
    Subcategory { code: "gift", label: "Gift" },
    Subcategory { code: "entertainment", label: "Entertainment" },
    Subcategory { code: "other_social", label: "Other social" },
];

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 2] = [Category::Transport, Category::Social];

    /// Stable lowercase code, as stored and exported
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Social => "social",
        }
    }

    /// Subcategories allowed under this category
    pub fn subcategories(&self) -> &'static [Subcategory] {
        match self {
            Self::Transport => TRANSPORT_SUBCATEGORIES,
            Self::Social => SOCIAL_SUBCATEGORIES,
        }
    }

    /// The first subcategory, used when nothing else is known
    pub fn default_subcategory(&self) -> &'static str {
        self.subcategories()[0].code
    }

    /// Whether `code` is one of this category's subcategories
    pub fn allows(&self, code: &str) -> bool {
        self.subcategories().iter().any(|s| s.code == code)
    }

    /// Find which category a subcategory code belongs to
    pub fn owning(code: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.allows(code))
    }
}

/// Display label for a subcategory code, falling back to the code itself
pub fn subcategory_label(code: &str) -> &str {
    Category::ALL
        .iter()
        .flat_map(|c| c.subcategories().iter())
        .find(|s| s.code == code)
        .map(|s| s.label)
        .unwrap_or(code)
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport => write!(f, "Transport"),
            Self::Social => write!(f, "Social"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "transport" => Ok(Self::Transport),
            "social" => Ok(Self::Social),
            other => Err(format!(
                "unknown category '{}' (expected transport or social)",
                other
            )),
        }
    }
}
