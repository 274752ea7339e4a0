//! Synthetic transaction dataset generator
//!
//! Seeded, reproducible stand-in for a real bank export: a fixed
//! category→merchant vocabulary, amounts in 5.00–300.00, expenses negative,
//! dates within the trailing twelve months.

use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use uuid::Uuid;

use crate::models::{Category, Transaction};
use crate::Result;

pub const DEFAULT_ROWS: usize = 1_000;
pub const DEFAULT_SEED: u64 = 42;

/// Merchant vocabulary per category.
const MERCHANTS: &[(Category, &[&str])] = &[
    (
        Category::Food,
        &["McDonald's", "Subway", "Starbucks", "Pizza Express", "Just Eat"],
    ),
    (
        Category::Groceries,
        &["Tesco", "Sainsbury's", "Lidl", "Aldi", "Waitrose"],
    ),
    (
        Category::Transport,
        &["Uber", "Trainline", "Shell", "BP Petrol", "Transport for London"],
    ),
    (
        Category::Shopping,
        &["Amazon", "Zara", "H&M", "IKEA", "Apple Store"],
    ),
    (
        Category::Entertainment,
        &["Netflix", "Spotify", "Cineworld", "PlayStation Store"],
    ),
    (
        Category::Utilities,
        &["British Gas", "Thames Water", "EE Mobile", "Octopus Energy"],
    ),
    (
        Category::Health,
        &["Boots Pharmacy", "NHS Prescription", "PureGym", "Vision Express"],
    ),
    (
        Category::Travel,
        &["Ryanair", "Booking.com", "Airbnb", "EasyJet"],
    ),
    (
        Category::Income,
        &["Salary ACME Ltd", "Freelance Payment", "Tax Refund"],
    ),
    (Category::Other, &["PayPal", "TransferWise", "Bank Fee"]),
];

const CITIES: &[&str] = &[
    "London",
    "Manchester",
    "Leeds",
    "Bristol",
    "Glasgow",
    "Liverpool",
    "Sheffield",
    "Edinburgh",
    "Cardiff",
    "Birmingham",
    "Newcastle",
    "Nottingham",
];

const COUNTRIES: &[&str] = &[
    "United Kingdom",
    "Ireland",
    "France",
    "Germany",
    "Spain",
    "Italy",
    "Netherlands",
    "Portugal",
];

const CURRENCIES: &[&str] = &["EUR", "GBP", "USD"];

pub struct DatasetGenerator {
    rng: StdRng,
    today: NaiveDate,
}

impl DatasetGenerator {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today: Utc::now().date_naive(),
        }
    }

    pub fn generate(&mut self, n: usize) -> Vec<Transaction> {
        (0..n).map(|_| self.generate_one()).collect()
    }

    fn generate_one(&mut self) -> Transaction {
        let (category, merchants) = MERCHANTS[self.rng.gen_range(0..MERCHANTS.len())];
        let merchant = *merchants
            .choose(&mut self.rng)
            .unwrap_or(&"Unknown Merchant");

        let mut amount = round2(self.rng.gen_range(5.0..300.0));
        if category != Category::Income {
            amount = -amount;
        }

        let date = self.today - Duration::days(self.rng.gen_range(0..365));
        let city = *CITIES.choose(&mut self.rng).unwrap_or(&"London");
        let country = *COUNTRIES.choose(&mut self.rng).unwrap_or(&"United Kingdom");
        let currency = *CURRENCIES.choose(&mut self.rng).unwrap_or(&"EUR");

        Transaction {
            id: Uuid::new_v4().to_string(),
            date,
            description: format!("{} {}", merchant, city),
            amount,
            currency: currency.to_string(),
            merchant: merchant.to_string(),
            category,
            city: city.to_string(),
            country: country.to_string(),
        }
    }
}

impl Default for DatasetGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Write rows to a CSV file; the header row comes from the struct fields.
pub fn write_csv(path: &Path, rows: &[Transaction]) -> Result<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(rows.len())
}

/// Generate `n` seeded rows and write them to `path`.
pub fn generate_to_csv(path: &Path, n: usize, seed: u64) -> Result<usize> {
    let rows = DatasetGenerator::with_seed(seed).generate(n);
    write_csv(path, &rows)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
