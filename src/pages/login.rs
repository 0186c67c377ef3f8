use std::time::Duration;

use tokio::time::Instant;

use crate::browser::driver::Selector;
use crate::error::{AssertionError, DriverError, Result};
use crate::pages::actions;
use crate::pages::locators::{InventoryLocators, LoginLocators};
use crate::sync::wait::{Budget, Waiter};

pub const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
pub const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";
pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
pub const BAD_CREDENTIALS: &str =
    "Epic sadface: Username and password do not match any user in this service";

/// Where a login attempt settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The catalog rendered; `elapsed` runs from the login click to the list being visible.
    Landed { elapsed: Duration },
    Rejected { message: String },
}

pub struct LoginPage {
    ui: Waiter,
    base_url: String,
}

impl LoginPage {
    pub fn new(ui: Waiter, base_url: &str) -> Self {
        Self {
            ui,
            base_url: base_url.to_string(),
        }
    }

    pub async fn navigate_to_login(&self) -> Result<()> {
        self.ui.page().navigate(&self.base_url).await?;
        self.ui.visible(&LoginLocators::username(), Budget::Long).await?;
        Ok(())
    }

    /// Submit credentials and wait until the app either lands on the catalog or shows an error.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginOutcome> {
        actions::fill(&self.ui, &LoginLocators::username(), username).await?;
        actions::fill(&self.ui, &LoginLocators::password(), password).await?;

        let start = Instant::now();
        actions::click(&self.ui, &LoginLocators::login_button(), Budget::Short).await?;

        let list = InventoryLocators::list();
        let error = LoginLocators::error();
        let landed = self
            .ui
            .until(
                "catalog or login error visible",
                &list,
                Budget::Long,
                || async {
                    if self.ui.any_visible(&list).await? {
                        Ok::<_, DriverError>(Some(true))
                    } else if self.ui.any_visible(&error).await? {
                        Ok(Some(false))
                    } else {
                        Ok(None)
                    }
                },
            )
            .await?;

        if landed {
            let elapsed = start.elapsed();
            tracing::info!(username, ?elapsed, "login landed on catalog");
            Ok(LoginOutcome::Landed { elapsed })
        } else {
            let message = actions::text(&self.ui, &error, Budget::Short).await?;
            tracing::info!(username, %message, "login rejected");
            Ok(LoginOutcome::Rejected { message })
        }
    }

    pub async fn error_message(&self) -> Result<Option<String>> {
        let selector = LoginLocators::error();
        if !self.ui.is_visible_now(&selector).await? {
            return Ok(None);
        }
        actions::text(&self.ui, &selector, Budget::Short).await.map(Some)
    }

    pub async fn verify_error_message(&self, expected: &str) -> Result<()> {
        verify_message(&self.ui, &LoginLocators::error(), "login error message", expected).await
    }
}

/// Wait for an error banner and compare its text exactly.
pub(crate) async fn verify_message(
    ui: &Waiter,
    selector: &Selector,
    operation: &str,
    expected: &str,
) -> Result<()> {
    let actual = actions::text(ui, selector, Budget::Short).await?;
    if actual != expected {
        return Err(AssertionError::new(
            operation,
            format!("{:?}", expected),
            format!("{:?}", actual),
        )
        .into());
    }
    Ok(())
}
