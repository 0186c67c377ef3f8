use crate::error::Result;
use crate::model::product::CheckoutInfo;
use crate::pages::actions;
use crate::pages::locators::{CartLocators, CheckoutInfoLocators, CheckoutReviewLocators};
use crate::pages::login::verify_message;
use crate::sync::wait::{Budget, Waiter};

/// First checkout step: shipping details.
pub struct CheckoutInfoPage {
    ui: Waiter,
}

impl CheckoutInfoPage {
    pub fn new(ui: Waiter) -> Self {
        Self { ui }
    }

    pub async fn verify_loaded(&self) -> Result<()> {
        for selector in [
            CheckoutInfoLocators::first_name(),
            CheckoutInfoLocators::last_name(),
            CheckoutInfoLocators::postal_code(),
        ] {
            self.ui.visible(&selector, Budget::Long).await?;
        }
        Ok(())
    }

    pub async fn fill(&self, info: &CheckoutInfo) -> Result<()> {
        actions::fill(&self.ui, &CheckoutInfoLocators::first_name(), &info.first_name).await?;
        actions::fill(&self.ui, &CheckoutInfoLocators::last_name(), &info.last_name).await?;
        actions::fill(&self.ui, &CheckoutInfoLocators::postal_code(), &info.postal_code).await?;
        Ok(())
    }

    /// Click continue and wait for the review screen.
    pub async fn continue_to_review(&self) -> Result<()> {
        actions::click(&self.ui, &CheckoutInfoLocators::continue_button(), Budget::Short).await?;
        self.ui
            .visible(&CheckoutReviewLocators::summary(), Budget::Long)
            .await?;
        Ok(())
    }

    /// Click continue and return the validation error that appears.
    pub async fn continue_expecting_error(&self) -> Result<String> {
        actions::click(&self.ui, &CheckoutInfoLocators::continue_button(), Budget::Short).await?;
        actions::text(&self.ui, &CheckoutInfoLocators::error(), Budget::Short).await
    }

    pub async fn verify_error_message(&self, expected: &str) -> Result<()> {
        verify_message(&self.ui, &CheckoutInfoLocators::error(), "checkout error message", expected)
            .await
    }

    pub async fn cancel(&self) -> Result<()> {
        actions::click(&self.ui, &CheckoutInfoLocators::cancel(), Budget::Short).await?;
        self.ui.visible(&CartLocators::list(), Budget::Long).await?;
        Ok(())
    }
}
