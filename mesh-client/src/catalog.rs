//! Catalogue view-model
//!
//! Pure derivations over the seed catalogue and published listings:
//! category summaries, per-company grouping and aggregate statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;
use shared::models::{Category, DatasetListing};
use shared::seed::CatalogSeed;
use shared::size::{format_total_mb, parse_size_mb};

pub use shared::size::format_size;

/// One browsable category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub category: Category,
    pub name: String,
    pub description: String,
    pub company_count: usize,
    pub dataset_count: usize,
}

/// Aggregates over a set of listings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub dataset_count: usize,
    pub total_downloads: u64,
    /// e.g. "2.4 GB"
    pub total_size: String,
}

impl GroupStats {
    pub fn of<'a>(listings: impl IntoIterator<Item = &'a DatasetListing>) -> Self {
        let (dataset_count, total_downloads, total_mb) = listings.into_iter().fold(
            (0, 0u64, 0.0),
            |(count, downloads, mb), listing| {
                (
                    count + 1,
                    downloads.saturating_add(listing.downloads),
                    mb + parse_size_mb(&listing.size).unwrap_or_default(),
                )
            },
        );
        Self {
            dataset_count,
            total_downloads,
            total_size: format_total_mb(total_mb),
        }
    }
}

/// Listings of one company within a category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyGroup {
    pub company: String,
    pub listings: Vec<DatasetListing>,
    pub stats: GroupStats,
}

#[derive(Debug, Clone)]
pub struct CatalogView {
    seed: CatalogSeed,
    published: Vec<DatasetListing>,
}

impl CatalogView {
    pub fn new(seed: CatalogSeed) -> Self {
        Self {
            seed,
            published: Vec::new(),
        }
    }

    /// Replace the published listings shown after the seed ones
    pub fn set_published(&mut self, listings: Vec<DatasetListing>) {
        self.published = listings;
    }

    pub fn listings(&self) -> impl Iterator<Item = &DatasetListing> {
        self.seed.listings.iter().chain(&self.published)
    }

    pub fn listings_in(&self, category: Category) -> impl Iterator<Item = &DatasetListing> {
        self.listings().filter(move |l| l.category == category)
    }

    pub fn find(&self, id: &str) -> Option<&DatasetListing> {
        self.listings().find(|l| l.id == id)
    }

    /// Seed categories, in seed order, with counts over all listings
    pub fn categories(&self) -> Vec<CategorySummary> {
        self.seed
            .categories
            .iter()
            .filter_map(|descriptor| {
                let category = descriptor
                    .category()
                    .inspect_err(|e| tracing::warn!(id = %descriptor.id, error = %e, "Skipping seed category"))
                    .ok()?;
                Some(CategorySummary {
                    category,
                    name: descriptor.name.clone(),
                    description: descriptor.description.clone(),
                    company_count: self.group(category).len(),
                    dataset_count: self.listings_in(category).count(),
                })
            })
            .collect()
    }

    /// Companies of `category` in first-appearance order
    pub fn group(&self, category: Category) -> Vec<CompanyGroup> {
        let mut groups: Vec<(String, Vec<DatasetListing>)> = Vec::new();
        for listing in self.listings_in(category) {
            match groups.iter_mut().find(|(company, _)| *company == listing.company) {
                Some((_, listings)) => listings.push(listing.clone()),
                None => groups.push((listing.company.clone(), vec![listing.clone()])),
            }
        }
        groups
            .into_iter()
            .map(|(company, listings)| CompanyGroup {
                stats: GroupStats::of(&listings),
                company,
                listings,
            })
            .collect()
    }

    pub fn stats(&self, category: Category) -> GroupStats {
        GroupStats::of(self.listings_in(category))
    }
}

/// "Jan 20, 2024, 10:30 AM"
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format("%b %-d, %Y, %I:%M %p").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use shared::models::{NewListing, PricePolicy};

    fn listing(company: &str, size: &str, downloads: u64) -> DatasetListing {
        DatasetListing {
            size: size.to_string(),
            downloads,
            ..NewListing {
                name: format!("{company} data"),
                company: company.to_string(),
                description: String::new(),
                category: Category::Supermart,
                content_id: format!("Qm{company}"),
                size_bytes: 1,
                publisher: "0xpub".into(),
            }
            .into_listing(format!("{company}-x"), PricePolicy::default(), Utc::now())
        }
    }

    #[test]
    fn test_stats_aggregate_sizes() {
        let listings = [listing("a", "900 MB", 10), listing("b", "1.5 GB", 5)];
        let stats = GroupStats::of(&listings);
        assert_eq!(stats.dataset_count, 2);
        assert_eq!(stats.total_downloads, 15);
        assert_eq!(stats.total_size, "2.4 GB");

        let empty: [DatasetListing; 0] = [];
        assert_eq!(GroupStats::of(&empty).total_size, "0 MB");
    }

    #[test]
    fn test_launch_categories() {
        let view = CatalogView::new(CatalogSeed::launch());
        let summaries = view.categories();
        let counts: Vec<_> = summaries
            .iter()
            .map(|s| (s.category, s.company_count, s.dataset_count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (Category::Supermart, 2, 2),
                (Category::GroceriesAndFood, 4, 4),
                (Category::Pharmacy, 1, 1),
                (Category::Apparels, 2, 2),
            ]
        );
    }

    #[test]
    fn test_group_keeps_first_appearance_order() {
        let mut view = CatalogView::new(CatalogSeed::default());
        view.set_published(vec![
            listing("zeta", "100 MB", 1),
            listing("alpha", "200 MB", 2),
            listing("zeta", "300 MB", 3),
        ]);

        let groups = view.group(Category::Supermart);
        let companies: Vec<_> = groups.iter().map(|g| g.company.as_str()).collect();
        assert_eq!(companies, vec!["zeta", "alpha"]);
        assert_eq!(groups[0].stats.dataset_count, 2);
        assert_eq!(groups[0].stats.total_downloads, 4);
        assert_eq!(groups[0].stats.total_size, "400 MB");
        assert!(view.group(Category::Pharmacy).is_empty());
    }

    #[test]
    fn test_published_listings_join_seed() {
        let mut view = CatalogView::new(CatalogSeed::launch());
        view.set_published(vec![listing("newco", "1 GB", 0)]);
        assert_eq!(view.listings_in(Category::Supermart).count(), 3);
        assert!(view.find("newco-x").is_some());
        assert!(view.find("missing").is_none());
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 20, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Jan 20, 2024, 10:30 AM");
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 8, 5, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Mar 5, 2024, 08:05 AM");
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 0, 15, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Mar 5, 2024, 12:15 AM");
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 17, 45, 0).unwrap();
        assert_eq!(format_timestamp(&at), "Mar 5, 2024, 05:45 PM");
    }

    #[test]
    fn test_format_size_reexport() {
        assert_eq!(format_size(900 * 1024 * 1024), "900 MB");
    }
}
