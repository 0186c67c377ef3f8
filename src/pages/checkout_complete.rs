use crate::error::Result;
use crate::pages::actions;
use crate::pages::locators::{CheckoutCompleteLocators, InventoryLocators};
use crate::sync::wait::{Budget, Waiter};

pub struct CheckoutCompletePage {
    ui: Waiter,
}

impl CheckoutCompletePage {
    pub fn new(ui: Waiter) -> Self {
        Self { ui }
    }

    pub async fn verify_complete(&self) -> Result<()> {
        self.ui
            .visible(&CheckoutCompleteLocators::header(), Budget::Long)
            .await?;
        self.ui
            .visible(&CheckoutCompleteLocators::text(), Budget::Short)
            .await?;
        Ok(())
    }

    pub async fn header(&self) -> Result<String> {
        actions::text(&self.ui, &CheckoutCompleteLocators::header(), Budget::Short).await
    }

    pub async fn message(&self) -> Result<String> {
        actions::text(&self.ui, &CheckoutCompleteLocators::text(), Budget::Short).await
    }

    pub async fn back_to_products(&self) -> Result<()> {
        actions::click(&self.ui, &CheckoutCompleteLocators::back_home(), Budget::Short).await?;
        self.ui.visible(&InventoryLocators::list(), Budget::Long).await?;
        Ok(())
    }
}
