//! Seed catalogue
//!
//! Category descriptors and listings shown before (or alongside) anything
//! published through the store. Passed explicitly to whoever needs it.

use crate::error::{AppError, ErrorCode};
use crate::models::{Category, DatasetListing, Price};
use crate::size::parse_size_bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A marketplace category with its featured companies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub companies: Vec<String>,
}

impl CategoryDescriptor {
    pub fn category(&self) -> Result<Category, AppError> {
        self.id.parse()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSeed {
    pub categories: Vec<CategoryDescriptor>,
    pub listings: Vec<DatasetListing>,
}

impl CatalogSeed {
    /// Parse a seed from JSON, e.g. the file named by `SEED_CATALOG_PATH`.
    pub fn from_json(raw: &str) -> Result<Self, AppError> {
        serde_json::from_str(raw).map_err(|e| {
            AppError::with_message(ErrorCode::InvalidFormat, format!("Invalid seed catalogue: {e}"))
        })
    }

    pub fn listings_in(&self, category: Category) -> impl Iterator<Item = &DatasetListing> {
        self.listings.iter().filter(move |l| l.category == category)
    }

    /// The launch catalogue: 9 listings over the 4 marketplace categories.
    pub fn launch() -> Self {
        let categories = LAUNCH_CATEGORIES
            .iter()
            .map(|(category, description, companies)| CategoryDescriptor {
                id: category.slug().to_string(),
                name: category.label().to_string(),
                description: description.to_string(),
                companies: companies.iter().map(|c| c.to_string()).collect(),
            })
            .collect();

        let listings = LAUNCH_LISTINGS
            .iter()
            .map(|seed| DatasetListing {
                id: seed.id.to_string(),
                name: seed.company.to_string(),
                company: seed.company.to_string(),
                description: seed.description.to_string(),
                category: seed.category,
                content_id: seed.content_id.to_string(),
                size_bytes: parse_size_bytes(seed.size).unwrap_or_default(),
                size: seed.size.to_string(),
                publisher: seed.publisher.to_string(),
                price: Price::oyd(seed.oyd_cost),
                downloads: seed.downloads,
                created_at: DateTime::parse_from_rfc3339(seed.created_at)
                    .map(|t| t.with_timezone(&Utc))
                    .unwrap_or_default(),
            })
            .collect();

        Self { categories, listings }
    }
}

const LAUNCH_CATEGORIES: [(Category, &str, &[&str]); 4] = [
    (
        Category::Supermart,
        "Consumer behavior data from major supermarket chains",
        &["Flipkart", "Amazon"],
    ),
    (
        Category::GroceriesAndFood,
        "Food delivery and grocery shopping patterns",
        &["Zepto", "Blinkit", "Swiggy", "Zomato"],
    ),
    (
        Category::Pharmacy,
        "Healthcare and medicine purchase behavior",
        &["1mg"],
    ),
    (
        Category::Apparels,
        "Fashion and clothing shopping trends",
        &["Myntra", "Ajio"],
    ),
];

struct SeedListing {
    id: &'static str,
    company: &'static str,
    description: &'static str,
    category: Category,
    size: &'static str,
    created_at: &'static str,
    content_id: &'static str,
    publisher: &'static str,
    downloads: u64,
    oyd_cost: u64,
}

const LAUNCH_LISTINGS: [SeedListing; 9] = [
    SeedListing {
        id: "flipkart-1",
        company: "Flipkart",
        description: "Consumer purchase patterns, product preferences, and seasonal shopping trends from Flipkart marketplace.",
        category: Category::Supermart,
        size: "2.5 GB",
        created_at: "2024-01-20T10:30:00Z",
        content_id: "QmFlipkart1BnNjpGhJ2fR4vL9mX5sT7uE1wP6qA3nB8dC9fG2h",
        publisher: "0xFlip...kart",
        downloads: 156,
        oyd_cost: 2560,
    },
    SeedListing {
        id: "amazon-1",
        company: "Amazon",
        description: "Comprehensive shopping behavior data including cart abandonment, product reviews, and purchase history.",
        category: Category::Supermart,
        size: "4.2 GB",
        created_at: "2024-01-18T14:45:00Z",
        content_id: "QmAmazon1BnNjpGhJ3fR5vL0mX6sT8uE2wP7qA4nB9dC0fG3h",
        publisher: "0xAmaz...ozon",
        downloads: 203,
        oyd_cost: 4300,
    },
    SeedListing {
        id: "zepto-1",
        company: "Zepto",
        description: "Quick commerce data with delivery preferences, time-based ordering patterns, and product demand.",
        category: Category::GroceriesAndFood,
        size: "1.8 GB",
        created_at: "2024-01-22T09:15:00Z",
        content_id: "QmZepto1BnNjpGhJ4fR6vL1mX7sT9uE3wP8qA5nB0dC1fG4h",
        publisher: "0xZept...opto",
        downloads: 89,
        oyd_cost: 1840,
    },
    SeedListing {
        id: "blinkit-1",
        company: "Blinkit",
        description: "Instant grocery delivery patterns, peak hour analysis, and customer retention data.",
        category: Category::GroceriesAndFood,
        size: "1.5 GB",
        created_at: "2024-01-21T16:20:00Z",
        content_id: "QmBlinkit1BnNjpGhJ5fR7vL2mX8sT0uE4wP9qA6nB1dC2fG5h",
        publisher: "0xBlin...nkit",
        downloads: 67,
        oyd_cost: 1536,
    },
    SeedListing {
        id: "swiggy-1",
        company: "Swiggy",
        description: "Food delivery preferences, restaurant ratings impact, and order timing patterns.",
        category: Category::GroceriesAndFood,
        size: "3.1 GB",
        created_at: "2024-01-19T12:30:00Z",
        content_id: "QmSwiggy1BnNjpGhJ6fR8vL3mX9sT1uE5wP0qA7nB2dC3fG6h",
        publisher: "0xSwig...iggy",
        downloads: 134,
        oyd_cost: 3174,
    },
    SeedListing {
        id: "zomato-1",
        company: "Zomato",
        description: "Restaurant discovery patterns, user reviews analysis, and dining preferences data.",
        category: Category::GroceriesAndFood,
        size: "2.7 GB",
        created_at: "2024-01-17T11:45:00Z",
        content_id: "QmZomato1BnNjpGhJ7fR9vL4mX0sT2uE6wP1qA8nB3dC4fG7h",
        publisher: "0xZoma...mato",
        downloads: 98,
        oyd_cost: 2765,
    },
    SeedListing {
        id: "1mg-1",
        company: "1mg",
        description: "Healthcare product purchase behavior, prescription patterns, and wellness product preferences.",
        category: Category::Pharmacy,
        size: "900 MB",
        created_at: "2024-01-23T08:00:00Z",
        content_id: "Qm1mg1BnNjpGhJ8fR0vL5mX1sT3uE7wP2qA9nB4dC5fG8h",
        publisher: "0x1mg1...mg11",
        downloads: 45,
        oyd_cost: 900,
    },
    SeedListing {
        id: "myntra-1",
        company: "Myntra",
        description: "Fashion trends, seasonal clothing preferences, brand loyalty, and size-based purchase patterns.",
        category: Category::Apparels,
        size: "2.1 GB",
        created_at: "2024-01-16T15:30:00Z",
        content_id: "QmMyntra1BnNjpGhJ9fR1vL6mX2sT4uE8wP3qA0nB5dC6fG9h",
        publisher: "0xMynt...ntra",
        downloads: 112,
        oyd_cost: 2150,
    },
    SeedListing {
        id: "ajio-1",
        company: "Ajio",
        description: "Youth fashion preferences, discount sensitivity analysis, and social media influenced purchases.",
        category: Category::Apparels,
        size: "1.6 GB",
        created_at: "2024-01-15T13:15:00Z",
        content_id: "QmAjio1BnNjpGhJ0fR2vL7mX3sT5uE9wP4qA1nB6dC7fG0h",
        publisher: "0xAjio...jio1",
        downloads: 78,
        oyd_cost: 1638,
    },
];
