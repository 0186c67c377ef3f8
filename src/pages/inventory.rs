use rust_decimal::Decimal;

use crate::browser::driver::Rect;
use crate::error::{AssertionError, JourneyError, Result};
use crate::model::money::parse_price;
use crate::model::product::{Product, SortCriterion};
use crate::pages::actions;
use crate::pages::locators::{CartLocators, InventoryLocators, LoginLocators};
use crate::sync::wait::{Budget, Waiter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The row already showed its remove button; nothing was clicked.
    AlreadyInCart,
}

/// The product catalog plus the header (cart badge, cart link, side menu).
pub struct InventoryPage {
    ui: Waiter,
    base_url: String,
}

impl InventoryPage {
    pub fn new(ui: Waiter, base_url: &str) -> Self {
        Self {
            ui,
            base_url: base_url.to_string(),
        }
    }

    pub async fn verify_loaded(&self) -> Result<()> {
        self.ui.visible(&InventoryLocators::list(), Budget::Long).await?;
        Ok(())
    }

    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.ui.attached(&InventoryLocators::names(), Budget::Short).await?;
        actions::texts(&self.ui, &InventoryLocators::names()).await
    }

    pub async fn product_prices(&self) -> Result<Vec<Decimal>> {
        self.ui.attached(&InventoryLocators::prices(), Budget::Short).await?;
        actions::texts(&self.ui, &InventoryLocators::prices())
            .await?
            .iter()
            .map(|t| parse_price(t))
            .collect()
    }

    pub async fn product_price(&self, name: &str) -> Result<Decimal> {
        let text =
            actions::text(&self.ui, &InventoryLocators::row_price(name), Budget::Short).await?;
        parse_price(&text)
    }

    pub async fn product_image_src(&self, name: &str) -> Result<Option<String>> {
        let handle = self
            .ui
            .attached(&InventoryLocators::row_image(name), Budget::Short)
            .await?
            .into_iter()
            .next();
        match handle {
            Some(h) => Ok(self.ui.page().read_attribute(&h, "src").await?),
            None => Ok(None),
        }
    }

    pub async fn all_image_srcs(&self) -> Result<Vec<String>> {
        self.ui.attached(&InventoryLocators::images(), Budget::Short).await?;
        actions::attributes(&self.ui, &InventoryLocators::images(), "src").await
    }

    pub async fn product_details(&self, name: &str) -> Result<Product> {
        let display_name =
            actions::text(&self.ui, &InventoryLocators::row_name(name), Budget::Short).await?;
        let price = self.product_price(name).await?;
        let description =
            actions::text(&self.ui, &InventoryLocators::row_description(name), Budget::Short)
                .await?;
        let image_ref = self.product_image_src(name).await?.unwrap_or_default();
        Ok(Product {
            name: display_name,
            price,
            description,
            image_ref,
        })
    }

    /// Every product on the catalog, in display order.
    pub async fn products(&self) -> Result<Vec<Product>> {
        let mut out = Vec::new();
        for name in self.product_names().await? {
            out.push(self.product_details(&name).await?);
        }
        Ok(out)
    }

    pub async fn is_in_cart(&self, name: &str) -> Result<bool> {
        Ok(self.ui.count_now(&InventoryLocators::row_remove_button(name)).await? > 0)
    }

    /// Add `name` unless its row already shows "Remove". Never double-adds.
    pub async fn add_product(&self, name: &str) -> Result<AddOutcome> {
        self.ui.visible(&InventoryLocators::row(name), Budget::Short).await?;

        if self.is_in_cart(name).await? {
            tracing::debug!(product = name, "already in cart");
            return Ok(AddOutcome::AlreadyInCart);
        }

        actions::click(&self.ui, &InventoryLocators::row_add_button(name), Budget::Short).await?;
        self.ui
            .visible(&InventoryLocators::row_remove_button(name), Budget::Short)
            .await?;
        tracing::debug!(product = name, "added to cart");
        Ok(AddOutcome::Added)
    }

    pub async fn remove_product(&self, name: &str) -> Result<()> {
        actions::click(&self.ui, &InventoryLocators::row_remove_button(name), Budget::Short)
            .await?;
        self.ui
            .visible(&InventoryLocators::row_add_button(name), Budget::Short)
            .await?;
        Ok(())
    }

    /// Choose a sort order and block until the list has re-rendered in it.
    pub async fn sort_by(&self, criterion: SortCriterion) -> Result<()> {
        self.verify_loaded().await?;
        let rendered = self.ui.count_now(&InventoryLocators::names()).await?;

        let dropdown = self
            .ui
            .visible(&InventoryLocators::sort_dropdown(), Budget::Short)
            .await?;
        self.ui.page().fill(&dropdown, criterion.option_value()).await?;

        self.ui
            .text_equals(&InventoryLocators::active_sort(), criterion.label(), Budget::Short)
            .await?;
        self.ui
            .count(
                &InventoryLocators::names(),
                &format!("== {}", rendered),
                |n| n == rendered,
                Budget::Short,
            )
            .await?;
        tracing::debug!(criterion = criterion.label(), "catalog sorted");
        Ok(())
    }

    /// Sort, reporting whether the storefront misbehaved (sort never applied or an
    /// error banner appeared) instead of failing.
    pub async fn sort_and_detect_error(&self, criterion: SortCriterion) -> Result<bool> {
        match self.sort_by(criterion).await {
            Ok(()) => self.ui.is_visible_now(&InventoryLocators::error()).await,
            Err(JourneyError::Timeout(e)) => {
                tracing::debug!(error = %e, "sort did not settle");
                Ok(true)
            }
            Err(JourneyError::Driver(e)) => {
                tracing::debug!(error = %e, "sort rejected by page");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }

    /// Badge number, or `None` when the badge is hidden.
    pub async fn cart_badge_count(&self) -> Result<Option<u32>> {
        let badge = InventoryLocators::cart_badge();
        if !self.ui.is_visible_now(&badge).await? {
            return Ok(None);
        }
        let text = actions::text(&self.ui, &badge, Budget::Short).await?;
        text.parse::<u32>().map(Some).map_err(|_| {
            AssertionError::new("read cart badge", "a number", format!("{:?}", text)).into()
        })
    }

    /// Wait for the badge to settle on `expected`; zero means the badge disappears.
    pub async fn verify_badge_count(&self, expected: u32) -> Result<()> {
        let badge = InventoryLocators::cart_badge();
        if expected == 0 {
            self.ui.hidden(&badge, Budget::Short).await
        } else {
            self.ui
                .text_equals(&badge, &expected.to_string(), Budget::Short)
                .await
                .map(|_| ())
        }
    }

    pub async fn cart_icon_box(&self) -> Result<Option<Rect>> {
        let link = self
            .ui
            .visible(&InventoryLocators::cart_link(), Budget::Short)
            .await?;
        Ok(self.ui.page().bounding_box(&link).await?)
    }

    pub async fn open_cart(&self) -> Result<()> {
        actions::click(&self.ui, &InventoryLocators::cart_link(), Budget::Short).await?;
        self.ui.visible(&CartLocators::list(), Budget::Long).await?;
        Ok(())
    }

    /// Reset app state through the side menu, then reload the catalog so row buttons re-render.
    pub async fn reset_app_state(&self) -> Result<()> {
        self.ui
            .page()
            .navigate(&format!("{}inventory.html", self.base_url))
            .await?;
        self.verify_loaded().await?;

        actions::click(&self.ui, &InventoryLocators::menu_open(), Budget::Short).await?;
        actions::click(&self.ui, &InventoryLocators::menu_reset(), Budget::Short).await?;
        actions::click(&self.ui, &InventoryLocators::menu_close(), Budget::Short).await?;
        self.ui
            .hidden(&InventoryLocators::cart_badge(), Budget::Short)
            .await?;

        self.ui
            .page()
            .navigate(&format!("{}inventory.html", self.base_url))
            .await?;
        self.verify_loaded().await
    }

    pub async fn logout(&self) -> Result<()> {
        actions::click(&self.ui, &InventoryLocators::menu_open(), Budget::Short).await?;
        actions::click(&self.ui, &InventoryLocators::menu_logout(), Budget::Short).await?;
        self.ui.visible(&LoginLocators::login_button(), Budget::Long).await?;
        Ok(())
    }
}
