use crate::error::Result;
use crate::model::money::parse_price;
use crate::model::product::OrderSummary;
use crate::pages::actions;
use crate::pages::locators::{CheckoutCompleteLocators, CheckoutReviewLocators, InventoryLocators};
use crate::sync::wait::{Budget, Waiter};

/// Second checkout step: items, payment/shipping info and the price summary.
pub struct CheckoutReviewPage {
    ui: Waiter,
}

impl CheckoutReviewPage {
    pub fn new(ui: Waiter) -> Self {
        Self { ui }
    }

    pub async fn verify_loaded(&self) -> Result<()> {
        self.ui
            .visible(&CheckoutReviewLocators::finish(), Budget::Long)
            .await?;
        self.ui
            .visible(&CheckoutReviewLocators::summary(), Budget::Short)
            .await?;
        Ok(())
    }

    pub async fn item_names(&self) -> Result<Vec<String>> {
        actions::texts(&self.ui, &CheckoutReviewLocators::item_names()).await
    }

    /// Parse `Item total: $x`, `Tax: $y` and `Total: $z`.
    pub async fn order_summary(&self) -> Result<OrderSummary> {
        let subtotal =
            actions::text(&self.ui, &CheckoutReviewLocators::subtotal(), Budget::Short).await?;
        let tax = actions::text(&self.ui, &CheckoutReviewLocators::tax(), Budget::Short).await?;
        let total = actions::text(&self.ui, &CheckoutReviewLocators::total(), Budget::Short).await?;
        Ok(OrderSummary {
            subtotal: parse_price(&subtotal)?,
            tax: parse_price(&tax)?,
            total: parse_price(&total)?,
        })
    }

    pub async fn payment_info(&self) -> Result<String> {
        actions::text(&self.ui, &CheckoutReviewLocators::payment(), Budget::Short).await
    }

    pub async fn shipping_info(&self) -> Result<String> {
        actions::text(&self.ui, &CheckoutReviewLocators::shipping(), Budget::Short).await
    }

    pub async fn finish(&self) -> Result<()> {
        actions::click(&self.ui, &CheckoutReviewLocators::finish(), Budget::Short).await?;
        self.ui
            .visible(&CheckoutCompleteLocators::header(), Budget::Long)
            .await?;
        Ok(())
    }

    pub async fn cancel(&self) -> Result<()> {
        actions::click(&self.ui, &CheckoutReviewLocators::cancel(), Budget::Short).await?;
        self.ui.visible(&InventoryLocators::list(), Budget::Long).await?;
        Ok(())
    }
}
