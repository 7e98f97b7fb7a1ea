//! Category Model

use crate::error::{AppError, ErrorCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dataset category
///
/// Serialized by display label (`"Groceries and Food"`); parsed from the
/// label or the slug (`"groceries"`), case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Category {
    // Marketplace categories
    Supermart,
    GroceriesAndFood,
    Pharmacy,
    Apparels,
    // Upload form categories
    Environmental,
    Business,
    Healthcare,
    Finance,
    Technology,
    Education,
    Research,
    Other,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Self::Supermart,
        Self::GroceriesAndFood,
        Self::Pharmacy,
        Self::Apparels,
        Self::Environmental,
        Self::Business,
        Self::Healthcare,
        Self::Finance,
        Self::Technology,
        Self::Education,
        Self::Research,
        Self::Other,
    ];

    /// Categories browsable on the marketplace dashboard
    pub const MARKETPLACE: [Category; 4] = [
        Self::Supermart,
        Self::GroceriesAndFood,
        Self::Pharmacy,
        Self::Apparels,
    ];

    /// Categories offered on the upload form
    pub const UPLOAD_FORM: [Category; 8] = [
        Self::Environmental,
        Self::Business,
        Self::Healthcare,
        Self::Finance,
        Self::Technology,
        Self::Education,
        Self::Research,
        Self::Other,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Supermart => "Supermart",
            Self::GroceriesAndFood => "Groceries and Food",
            Self::Pharmacy => "Pharmacy",
            Self::Apparels => "Apparels",
            Self::Environmental => "Environmental",
            Self::Business => "Business",
            Self::Healthcare => "Healthcare",
            Self::Finance => "Finance",
            Self::Technology => "Technology",
            Self::Education => "Education",
            Self::Research => "Research",
            Self::Other => "Other",
        }
    }

    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Supermart => "supermart",
            Self::GroceriesAndFood => "groceries",
            Self::Pharmacy => "pharmacy",
            Self::Apparels => "apparels",
            Self::Environmental => "environmental",
            Self::Business => "business",
            Self::Healthcare => "healthcare",
            Self::Finance => "finance",
            Self::Technology => "technology",
            Self::Education => "education",
            Self::Research => "research",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(needle) || c.slug().eq_ignore_ascii_case(needle))
            .ok_or_else(|| {
                AppError::with_message(ErrorCode::InvalidCategory, format!("Unknown category: {s}"))
                    .with_detail("category", s)
            })
    }
}

impl TryFrom<String> for Category {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_and_slug() {
        assert_eq!("Groceries and Food".parse::<Category>().unwrap(), Category::GroceriesAndFood);
        assert_eq!("groceries".parse::<Category>().unwrap(), Category::GroceriesAndFood);
        assert_eq!("PHARMACY".parse::<Category>().unwrap(), Category::Pharmacy);
        assert_eq!(" Research ".parse::<Category>().unwrap(), Category::Research);
    }

    #[test]
    fn test_parse_unknown() {
        let err = "Toys".parse::<Category>().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidCategory);
    }

    #[test]
    fn test_serde_uses_label() {
        let json = serde_json::to_string(&Category::GroceriesAndFood).unwrap();
        assert_eq!(json, "\"Groceries and Food\"");
        let back: Category = serde_json::from_str("\"apparels\"").unwrap();
        assert_eq!(back, Category::Apparels);
        assert!(serde_json::from_str::<Category>("\"Toys\"").is_err());
    }

    #[test]
    fn test_partitions_cover_all() {
        assert_eq!(
            Category::MARKETPLACE.len() + Category::UPLOAD_FORM.len(),
            Category::ALL.len()
        );
    }
}
