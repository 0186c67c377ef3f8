use crate::error::{AssertionError, Result};
use crate::model::money::parse_price;
use crate::model::product::CartEntry;
use crate::pages::actions;
use crate::pages::locators::{CartLocators, CheckoutInfoLocators, InventoryLocators};
use crate::sync::wait::{Budget, Waiter};

pub struct CartPage {
    ui: Waiter,
}

impl CartPage {
    pub fn new(ui: Waiter) -> Self {
        Self { ui }
    }

    pub async fn verify_loaded(&self) -> Result<()> {
        self.ui.visible(&CartLocators::list(), Budget::Long).await?;
        Ok(())
    }

    /// Entries in display order. Quantity defaults to 1 when the row shows none.
    pub async fn items(&self) -> Result<Vec<CartEntry>> {
        self.verify_loaded().await?;
        let names = actions::texts(&self.ui, &CartLocators::names()).await?;
        let mut entries = Vec::with_capacity(names.len());
        for name in names {
            let price_text =
                actions::text(&self.ui, &CartLocators::row_price(&name), Budget::Short).await?;
            let quantity = self.item_quantity(&name).await?;
            entries.push(CartEntry {
                price: parse_price(&price_text)?,
                name,
                quantity,
            });
        }
        Ok(entries)
    }

    pub async fn item_count(&self) -> Result<usize> {
        self.ui.count_now(&CartLocators::rows()).await
    }

    pub async fn contains(&self, name: &str) -> Result<bool> {
        Ok(self.ui.count_now(&CartLocators::row(name)).await? > 0)
    }

    pub async fn verify_item(&self, name: &str) -> Result<()> {
        self.ui.visible(&CartLocators::row(name), Budget::Short).await?;
        Ok(())
    }

    pub async fn item_quantity(&self, name: &str) -> Result<u32> {
        let selector = CartLocators::row_quantity(name);
        if self.ui.count_now(&selector).await? == 0 {
            return Ok(1);
        }
        let text = actions::text(&self.ui, &selector, Budget::Short).await?;
        text.parse().map_err(|_| {
            AssertionError::new(format!("quantity of {}", name), "a number", format!("{:?}", text))
                .into()
        })
    }

    pub async fn remove(&self, name: &str) -> Result<()> {
        actions::click(&self.ui, &CartLocators::row_remove_button(name), Budget::Short).await?;
        self.ui
            .count(&CartLocators::row(name), "== 0", |n| n == 0, Budget::Short)
            .await?;
        Ok(())
    }

    pub async fn verify_empty(&self) -> Result<()> {
        let count = self.item_count().await?;
        if count != 0 {
            return Err(AssertionError::new("cart is empty", 0, count).into());
        }
        Ok(())
    }

    pub async fn proceed_to_checkout(&self) -> Result<()> {
        actions::click(&self.ui, &CartLocators::checkout(), Budget::Short).await?;
        self.ui
            .visible(&CheckoutInfoLocators::first_name(), Budget::Long)
            .await?;
        Ok(())
    }

    pub async fn continue_shopping(&self) -> Result<()> {
        actions::click(&self.ui, &CartLocators::continue_shopping(), Budget::Short).await?;
        self.ui.visible(&InventoryLocators::list(), Budget::Long).await?;
        Ok(())
    }
}
