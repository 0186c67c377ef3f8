use std::collections::BTreeMap;

use rust_decimal::Decimal;

use crate::flow::library::CheckoutReport;
use crate::flow::tolerance::{Classification, Verdict};
use crate::model::money::sum_prices;
use crate::model::persona::Persona;
use crate::scenario::scenario_model::DefectRecord;

/// Execution state of a running scenario.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    /// Current step index (0-based)
    pub current_step: usize,

    pub defects: Vec<DefectRecord>,

    /// Catalog unit price of every product this scenario put in the cart
    pub cart_prices: BTreeMap<String, Decimal>,

    pub last_checkout: Option<CheckoutReport>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_verdict(&mut self, persona: Persona, verdict: Verdict) {
        self.defects.push(DefectRecord {
            step_index: self.current_step,
            persona,
            classification: verdict.classification,
            detail: verdict.detail,
        });
    }

    pub fn remember_price(&mut self, name: &str, price: Decimal) {
        self.cart_prices.insert(name.to_string(), price);
    }

    pub fn forget_price(&mut self, name: &str) {
        self.cart_prices.remove(name);
    }

    /// Subtotal recomputed from the remembered catalog prices.
    pub fn expected_subtotal(&self) -> Decimal {
        sum_prices(self.cart_prices.values())
    }

    pub fn known_defect_count(&self) -> usize {
        self.defects
            .iter()
            .filter(|d| d.classification == Classification::KnownDefect)
            .count()
    }
}
