use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::browser::driver::Rect;
use crate::browser::session::Session;
use crate::error::{AssertionError, JourneyError, Result};
use crate::fixtures::data::{self, Credentials};
use crate::flow::tolerance::{ExpectedDeviation, Observation, ToleranceTable, Verdict};
use crate::model::money::{format_price, sum_prices};
use crate::model::persona::Persona;
use crate::model::product::{CartEntry, CartState, CheckoutInfo, OrderSummary, SortCriterion};
use crate::pages::{
    AddOutcome, CartPage, CheckoutCompletePage, CheckoutInfoPage, CheckoutReviewPage,
    InventoryPage, LoginOutcome, LoginPage,
};
use crate::sync::wait::{TimeoutPolicy, Waiter};

/// Result of [`ShopFlows::login_as`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReport {
    pub persona: Persona,
    pub outcome: LoginOutcome,
    pub verdict: Verdict,
}

/// What a completed checkout looked like.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckoutReport {
    pub items: Vec<String>,
    pub expected_subtotal: Decimal,
    pub summary: OrderSummary,
    pub confirmation: String,
}

/// Values compared between the visual persona and the standard one.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualBaseline {
    pub image_src: Option<String>,
    pub cart_icon: Option<Rect>,
}

impl VisualBaseline {
    pub fn compare(&self, standard: &VisualBaseline) -> Observation {
        let position_differs = match (&self.cart_icon, &standard.cart_icon) {
            (Some(a), Some(b)) => Some(a.y != b.y || a.x != b.x),
            _ => None,
        };
        Observation::VisualComparison {
            image_differs: self.image_src != standard.image_src,
            position_differs,
        }
    }
}

/// Multi-screen business flows over one session.
///
/// Holds every page module against the same [`Waiter`], plus the persona logged in
/// last and the tolerance table used to judge it.
pub struct ShopFlows {
    ui: Waiter,
    tolerance: Arc<ToleranceTable>,
    persona: Option<Persona>,
    last_login: Option<Duration>,
    pub login: LoginPage,
    pub inventory: InventoryPage,
    pub cart: CartPage,
    pub checkout_info: CheckoutInfoPage,
    pub review: CheckoutReviewPage,
    pub complete: CheckoutCompletePage,
}

impl ShopFlows {
    pub fn new(
        session: Session,
        base_url: &str,
        policy: TimeoutPolicy,
        tolerance: Arc<ToleranceTable>,
    ) -> Self {
        let ui = Waiter::new(session, policy);
        Self {
            login: LoginPage::new(ui.clone(), base_url),
            inventory: InventoryPage::new(ui.clone(), base_url),
            cart: CartPage::new(ui.clone()),
            checkout_info: CheckoutInfoPage::new(ui.clone()),
            review: CheckoutReviewPage::new(ui.clone()),
            complete: CheckoutCompletePage::new(ui.clone()),
            ui,
            tolerance,
            persona: None,
            last_login: None,
        }
    }

    pub fn waiter(&self) -> &Waiter {
        &self.ui
    }

    pub fn persona(&self) -> Option<Persona> {
        self.persona
    }

    pub fn tolerance(&self) -> &ToleranceTable {
        &self.tolerance
    }

    /// Log in with the persona's canonical credentials and judge the outcome against
    /// its tolerance entry. A deviation the table does not cover is an error.
    pub async fn login_as(&mut self, persona: Persona) -> Result<LoginReport> {
        tracing::info!(%persona, "login");
        let creds = Credentials::for_persona(persona);
        let outcome = self.login_with(&creds.username, &creds.password).await?;

        let observation = match &outcome {
            LoginOutcome::Landed { elapsed } => {
                self.last_login = Some(*elapsed);
                Observation::LoginDuration(*elapsed)
            }
            LoginOutcome::Rejected { message } => Observation::LoginRejected {
                message: message.clone(),
            },
        };
        let verdict = self.tolerance.enforce(persona, "login", &observation)?;

        Ok(LoginReport {
            persona,
            outcome,
            verdict,
        })
    }

    /// Raw login: no persona judgement, a rejection is a normal outcome.
    pub async fn login_with(&mut self, username: &str, password: &str) -> Result<LoginOutcome> {
        self.login.navigate_to_login().await?;
        let outcome = self.login.login(username, password).await?;
        self.persona = Persona::from_username(username).filter(|_| {
            matches!(outcome, LoginOutcome::Landed { .. })
        });
        Ok(outcome)
    }

    /// Add each product unless it is already in the cart.
    pub async fn add_products(&self, names: &[String]) -> Result<Vec<AddOutcome>> {
        self.inventory.verify_loaded().await?;
        let mut outcomes = Vec::with_capacity(names.len());
        for name in names {
            outcomes.push(self.inventory.add_product(name).await?);
        }
        tracing::info!(count = names.len(), "products added");
        Ok(outcomes)
    }

    /// Sum of the catalog's displayed unit prices for `names`.
    pub async fn expected_subtotal(&self, names: &[String]) -> Result<Decimal> {
        let mut prices = Vec::with_capacity(names.len());
        for name in names {
            prices.push(self.inventory.product_price(name).await?);
        }
        Ok(sum_prices(&prices))
    }

    /// Catalog prices of every product that will be in the cart once `products` are
    /// added: the requested ones plus any row already showing "Remove".
    pub async fn expected_cart_subtotal(&self, products: &[String]) -> Result<Decimal> {
        let mut prices = Vec::new();
        for name in self.inventory.product_names().await? {
            if products.contains(&name) || self.inventory.is_in_cart(&name).await? {
                prices.push(self.inventory.product_price(&name).await?);
            }
        }
        Ok(sum_prices(&prices))
    }

    /// Add-if-absent → cart → info → review → finish, with the subtotal recomputed
    /// from catalog prices of the whole cart and compared to the displayed one to the cent.
    pub async fn checkout(
        &self,
        products: &[String],
        info: &CheckoutInfo,
    ) -> Result<CheckoutReport> {
        tracing::info!(products = ?products, "checkout");
        self.inventory.verify_loaded().await?;
        let expected_subtotal = self.expected_cart_subtotal(products).await?;

        self.add_products(products).await?;
        self.inventory.open_cart().await?;
        for name in products {
            self.cart.verify_item(name).await?;
        }

        self.cart.proceed_to_checkout().await?;
        self.checkout_info.fill(info).await?;
        self.checkout_info.continue_to_review().await?;
        self.review.verify_loaded().await?;

        let items = self.review.item_names().await?;
        let summary = self.review.order_summary().await?;
        verify_summary(expected_subtotal, &summary)?;

        self.review.finish().await?;
        self.complete.verify_complete().await?;
        let confirmation = self.complete.header().await?;
        tracing::info!(
            subtotal = %format_price(summary.subtotal),
            total = %format_price(summary.total),
            "order complete"
        );

        Ok(CheckoutReport {
            items,
            expected_subtotal,
            summary,
            confirmation,
        })
    }

    pub async fn reset_state(&self) -> Result<()> {
        tracing::info!("reset app state");
        self.inventory.reset_app_state().await
    }

    pub async fn logout(&mut self) -> Result<()> {
        tracing::info!(persona = ?self.persona, "logout");
        self.inventory.logout().await?;
        self.persona = None;
        Ok(())
    }

    pub async fn verify_cart_badge(&self, expected: u32) -> Result<()> {
        self.inventory.verify_badge_count(expected).await
    }

    /// Open the cart and read its entries together with the header badge, once the
    /// badge has settled on the number of entries.
    pub async fn cart_state(&self) -> Result<CartState> {
        self.inventory.open_cart().await?;
        let items: Vec<CartEntry> = self.cart.items().await?;
        let settled = u32::try_from(items.len()).unwrap_or(u32::MAX);
        self.inventory.verify_badge_count(settled).await?;
        let badge_count = self.inventory.cart_badge_count().await?;
        Ok(CartState {
            entries: items.into_iter().map(|e| (e.name.clone(), e)).collect(),
            badge_count,
        })
    }

    /// Image reference of the first catalog product and the cart icon's position.
    pub async fn capture_visual_baseline(&self) -> Result<VisualBaseline> {
        self.inventory.verify_loaded().await?;
        let image_src = self.inventory.product_image_src(data::BACKPACK).await?;
        let cart_icon = self.inventory.cart_icon_box().await?;
        Ok(VisualBaseline {
            image_src,
            cart_icon,
        })
    }

    /// Probe the logged-in persona for its tabled deviation and judge the result.
    ///
    /// For the visual persona this logs out and back in as the standard persona to
    /// capture the comparison baseline; the session ends logged in as standard.
    pub async fn check_persona_defect(&mut self) -> Result<Verdict> {
        let persona = self.persona.ok_or_else(|| {
            JourneyError::assertion("check persona defect", "a logged-in persona", "none")
        })?;
        let deviation = self.tolerance.lookup(persona).clone();
        tracing::info!(%persona, ?deviation, "checking persona defect");

        let (operation, observation) = match deviation {
            ExpectedDeviation::None | ExpectedDeviation::IdenticalImages => (
                "catalog images",
                Observation::CatalogImages(self.inventory.all_image_srcs().await?),
            ),
            ExpectedDeviation::SlowLogin { .. } => {
                let elapsed = self.last_login.ok_or_else(|| {
                    JourneyError::assertion("check persona defect", "a measured login", "none")
                })?;
                ("login", Observation::LoginDuration(elapsed))
            }
            ExpectedDeviation::BrokenRemoveOrSort => {
                ("remove and sort", self.observe_remove_and_sort().await?)
            }
            ExpectedDeviation::VisualDifference => {
                ("visual baseline", self.observe_visual().await?)
            }
            ExpectedDeviation::LoginRefused { .. } => {
                return Err(JourneyError::assertion(
                    "check persona defect",
                    "a persona that can log in",
                    persona,
                ));
            }
        };

        self.tolerance.enforce(persona, operation, &observation)
    }

    async fn observe_remove_and_sort(&self) -> Result<Observation> {
        let product = data::BACKPACK;
        self.inventory.add_product(product).await?;

        let remove_failed = match self.inventory.remove_product(product).await {
            Ok(()) => false,
            Err(JourneyError::Timeout(e)) => {
                tracing::debug!(error = %e, "remove did not settle");
                true
            }
            Err(JourneyError::Driver(e)) => {
                tracing::debug!(error = %e, "remove rejected by page");
                true
            }
            Err(e) => return Err(e),
        };
        // Name ascending is the initial order, so it would settle even when broken.
        let sort_failed = self
            .inventory
            .sort_and_detect_error(SortCriterion::NameDescending)
            .await?;

        Ok(Observation::RemoveAndSort {
            remove_failed,
            sort_failed,
        })
    }

    async fn observe_visual(&mut self) -> Result<Observation> {
        let visual = self.capture_visual_baseline().await?;
        self.logout().await?;

        let creds = Credentials::for_persona(Persona::Standard);
        match self.login_with(&creds.username, &creds.password).await? {
            LoginOutcome::Landed { .. } => {}
            LoginOutcome::Rejected { message } => {
                return Err(
                    AssertionError::new("standard baseline login", "catalog", message).into(),
                );
            }
        }
        let standard = self.capture_visual_baseline().await?;
        Ok(visual.compare(&standard))
    }
}

/// Displayed subtotal must equal the recomputed one, and total must equal subtotal + tax.
pub fn verify_summary(expected_subtotal: Decimal, summary: &OrderSummary) -> Result<()> {
    if summary.subtotal.round_dp(2) != expected_subtotal.round_dp(2) {
        return Err(AssertionError::new(
            "subtotal cross-check",
            format_price(expected_subtotal),
            format_price(summary.subtotal),
        )
        .into());
    }
    if !summary.is_consistent() {
        return Err(AssertionError::new(
            "total == subtotal + tax",
            format_price(summary.subtotal + summary.tax),
            format_price(summary.total),
        )
        .into());
    }
    Ok(())
}
