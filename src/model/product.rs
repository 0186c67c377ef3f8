use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog item as displayed by the storefront. Never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name, unique within the catalog
    pub name: String,
    pub price: Decimal,
    pub description: String,
    /// Image `src` attribute
    pub image_ref: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub name: String,
    pub price: Decimal,
    /// Always 1 in this storefront; re-adding a product is a no-op
    pub quantity: u32,
}

/// Cart contents together with the badge shown in the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartState {
    pub entries: BTreeMap<String, CartEntry>,
    /// `None` when the badge is hidden
    pub badge_count: Option<u32>,
}

impl CartState {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Badge agrees with the entry count: hidden when empty, equal otherwise.
    pub fn badge_consistent(&self) -> bool {
        match self.badge_count {
            None => self.entries.is_empty(),
            Some(n) => n as usize == self.entries.len() && n > 0,
        }
    }
}

/// Missing fields deserialize as empty strings, which the storefront rejects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckoutInfo {
    pub first_name: String,
    pub last_name: String,
    pub postal_code: String,
}

impl CheckoutInfo {
    pub fn new(first: &str, last: &str, postal: &str) -> Self {
        Self {
            first_name: first.to_string(),
            last_name: last.to_string(),
            postal_code: postal.to_string(),
        }
    }

    /// The error the storefront reports for this input, first missing field wins.
    pub fn expected_error(&self) -> Option<&'static str> {
        if self.first_name.is_empty() {
            Some("Error: First Name is required")
        } else if self.last_name.is_empty() {
            Some("Error: Last Name is required")
        } else if self.postal_code.is_empty() {
            Some("Error: Postal Code is required")
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderSummary {
    /// `total == subtotal + tax` to the cent.
    pub fn is_consistent(&self) -> bool {
        (self.subtotal + self.tax).round_dp(2) == self.total.round_dp(2)
    }
}

/// The four orderings offered by the catalog's sort dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortCriterion {
    NameAscending,
    NameDescending,
    PriceAscending,
    PriceDescending,
}

impl SortCriterion {
    pub const ALL: [SortCriterion; 4] = [
        SortCriterion::NameAscending,
        SortCriterion::NameDescending,
        SortCriterion::PriceAscending,
        SortCriterion::PriceDescending,
    ];

    /// `value` attribute of the dropdown option.
    pub fn option_value(&self) -> &'static str {
        match self {
            SortCriterion::NameAscending => "az",
            SortCriterion::NameDescending => "za",
            SortCriterion::PriceAscending => "lohi",
            SortCriterion::PriceDescending => "hilo",
        }
    }

    /// Visible label, shown in the active-option span once the list re-renders.
    pub fn label(&self) -> &'static str {
        match self {
            SortCriterion::NameAscending => "Name (A to Z)",
            SortCriterion::NameDescending => "Name (Z to A)",
            SortCriterion::PriceAscending => "Price (low to high)",
            SortCriterion::PriceDescending => "Price (high to low)",
        }
    }

    /// Accepts option values (`lohi`) as well as labels (`Price (low to high)`).
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.option_value() == s || c.label().eq_ignore_ascii_case(s))
    }

    /// Whether `names`/`prices` (in display order) respect this ordering.
    pub fn is_satisfied_by(&self, names: &[String], prices: &[Decimal]) -> bool {
        match self {
            SortCriterion::NameAscending => names.windows(2).all(|w| w[0] < w[1]),
            SortCriterion::NameDescending => names.windows(2).all(|w| w[0] > w[1]),
            SortCriterion::PriceAscending => prices.windows(2).all(|w| w[0] <= w[1]),
            SortCriterion::PriceDescending => prices.windows(2).all(|w| w[0] >= w[1]),
        }
    }
}
