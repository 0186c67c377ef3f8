use std::sync::Arc;

use futures::StreamExt;
use tokio::time::Instant;

use crate::browser::driver::PageFactory;
use crate::browser::session::with_session;
use crate::error::{AssertionError, Result};
use crate::fixtures::data::{default_checkout_info, select_random_products};
use crate::flow::library::{ShopFlows, verify_summary};
use crate::flow::tolerance::ToleranceTable;
use crate::model::persona::Persona;
use crate::pages::locators::{CartLocators, CheckoutInfoLocators};
use crate::scenario::context::ScenarioContext;
use crate::scenario::scenario_model::{Scenario, ScenarioResult, ScenarioStep, StepFailure};
use crate::sync::wait::TimeoutPolicy;

/// Executes scenarios step-by-step, each inside its own scoped session.
pub struct ScenarioRunner {
    factory: Arc<dyn PageFactory>,
    base_url: String,
    policy: TimeoutPolicy,
    tolerance: Arc<ToleranceTable>,
    parallel: usize,
}

impl ScenarioRunner {
    pub fn new(factory: Arc<dyn PageFactory>, base_url: &str, policy: TimeoutPolicy) -> Self {
        Self {
            factory,
            base_url: base_url.to_string(),
            policy,
            tolerance: Arc::new(ToleranceTable::storefront()),
            parallel: 1,
        }
    }

    pub fn with_tolerance(mut self, tolerance: ToleranceTable) -> Self {
        self.tolerance = Arc::new(tolerance);
        self
    }

    /// Number of scenarios run at once. Each still gets its own session.
    pub fn with_parallelism(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Run every scenario; results come back in input order.
    pub async fn run_all(&self, scenarios: &[Scenario]) -> Vec<ScenarioResult> {
        futures::stream::iter(scenarios.iter().map(|s| self.run(s)))
            .buffered(self.parallel)
            .collect()
            .await
    }

    /// Run one scenario. Never fails: errors end up in [`ScenarioResult::failure`].
    pub async fn run(&self, scenario: &Scenario) -> ScenarioResult {
        let start = Instant::now();
        tracing::info!(scenario = %scenario.name, "scenario started");

        let outcome = with_session(self.factory.clone(), |session| async move {
            let mut flows = ShopFlows::new(
                session,
                &self.base_url,
                self.policy,
                self.tolerance.clone(),
            );
            let mut ctx = ScenarioContext::new();
            let mut steps_run = 0;
            let mut failure = None;

            for (i, step) in scenario.steps.iter().enumerate() {
                ctx.current_step = i;
                steps_run = i + 1;
                tracing::debug!(
                    scenario = %scenario.name,
                    step = i,
                    action = step.action(),
                    "step"
                );

                if let Err(e) = Self::execute_step(scenario, step, &mut flows, &mut ctx).await {
                    tracing::warn!(scenario = %scenario.name, step = i, error = %e, "step failed");
                    failure = Some(StepFailure::from_error(Some(i), step.action(), &e));
                    break;
                }
            }
            Ok((ctx, steps_run, failure))
        })
        .await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let result = match outcome {
            Ok((ctx, steps_run, failure)) => ScenarioResult {
                scenario_name: scenario.name.clone(),
                persona: scenario.persona,
                passed: failure.is_none(),
                steps_run,
                duration_ms,
                defects: ctx.defects,
                failure,
            },
            Err(e) => ScenarioResult {
                scenario_name: scenario.name.clone(),
                persona: scenario.persona,
                passed: false,
                steps_run: 0,
                duration_ms,
                defects: Vec::new(),
                failure: Some(StepFailure::from_error(None, "session", &e)),
            },
        };

        tracing::info!(
            scenario = %scenario.name,
            passed = result.passed,
            duration_ms,
            "scenario finished"
        );
        result
    }

    async fn execute_step(
        scenario: &Scenario,
        step: &ScenarioStep,
        flows: &mut ShopFlows,
        ctx: &mut ScenarioContext,
    ) -> Result<()> {
        match step {
            ScenarioStep::Login { persona } => {
                let persona = persona.or(scenario.persona).unwrap_or(Persona::Standard);
                let report = flows.login_as(persona).await?;
                ctx.record_verdict(persona, report.verdict);
                Ok(())
            }

            ScenarioStep::LoginWith { username, password } => {
                flows.login_with(username, password).await?;
                Ok(())
            }

            ScenarioStep::AddProducts { products, random } => {
                flows.inventory.verify_loaded().await?;
                let mut names = products.clone();
                if let Some(count) = random {
                    let rest: Vec<String> = flows
                        .inventory
                        .product_names()
                        .await?
                        .into_iter()
                        .filter(|n| !names.contains(n))
                        .collect();
                    names.extend(select_random_products(&rest, *count));
                }

                for name in &names {
                    let price = flows.inventory.product_price(name).await?;
                    ctx.remember_price(name, price);
                }
                flows.add_products(&names).await?;
                Ok(())
            }

            ScenarioStep::RemoveProduct { product } => {
                if flows.waiter().is_visible_now(&CartLocators::list()).await? {
                    flows.cart.remove(product).await?;
                } else {
                    flows.inventory.remove_product(product).await?;
                }
                ctx.forget_price(product);
                Ok(())
            }

            ScenarioStep::SortBy { criterion } => flows.inventory.sort_by(*criterion).await,

            ScenarioStep::OpenCart => flows.inventory.open_cart().await,

            ScenarioStep::Checkout { products, info } => {
                let info = info.clone().unwrap_or_else(default_checkout_info);
                let report = flows.checkout(products, &info).await?;
                ctx.cart_prices.clear();
                ctx.last_checkout = Some(report);
                Ok(())
            }

            ScenarioStep::FillCheckoutInfo { info } => {
                let ui = flows.waiter();
                if !ui.is_visible_now(&CheckoutInfoLocators::first_name()).await? {
                    if !ui.is_visible_now(&CartLocators::list()).await? {
                        flows.inventory.open_cart().await?;
                    }
                    flows.cart.proceed_to_checkout().await?;
                }

                flows.checkout_info.fill(info).await?;
                match info.expected_error() {
                    Some(expected) => {
                        let shown = flows.checkout_info.continue_expecting_error().await?;
                        tracing::debug!(expected, shown = %shown, "checkout form rejected");
                        if shown != expected {
                            return Err(AssertionError::new(
                                "checkout validation",
                                format!("{:?}", expected),
                                format!("{:?}", shown),
                            )
                            .into());
                        }
                        Ok(())
                    }
                    None => flows.checkout_info.continue_to_review().await,
                }
            }

            ScenarioStep::FinishOrder => {
                flows.review.verify_loaded().await?;
                let summary = flows.review.order_summary().await?;
                verify_summary(ctx.expected_subtotal(), &summary)?;
                flows.review.finish().await?;
                flows.complete.verify_complete().await?;
                ctx.cart_prices.clear();
                Ok(())
            }

            ScenarioStep::ResetState => {
                flows.reset_state().await?;
                ctx.cart_prices.clear();
                Ok(())
            }

            ScenarioStep::Logout => flows.logout().await,

            ScenarioStep::ExpectBadge { count } => flows.verify_cart_badge(*count).await,

            ScenarioStep::ExpectLoginError { message } => {
                flows.login.verify_error_message(message).await
            }

            ScenarioStep::ExpectCheckoutError { message } => {
                flows.checkout_info.verify_error_message(message).await
            }

            ScenarioStep::ExpectSorted { criterion } => {
                let names = flows.inventory.product_names().await?;
                let prices = flows.inventory.product_prices().await?;
                if !criterion.is_satisfied_by(&names, &prices) {
                    return Err(AssertionError::new(
                        format!("catalog sorted by {}", criterion.label()),
                        criterion.label(),
                        format!("{:?}", names),
                    )
                    .into());
                }
                Ok(())
            }

            ScenarioStep::ExpectCartContains { products } => {
                let state = flows.cart_state().await?;
                for product in products {
                    if !state.entries.contains_key(product) {
                        let present: Vec<&String> = state.entries.keys().collect();
                        return Err(AssertionError::new(
                            "cart contains",
                            product,
                            format!("{:?}", present),
                        )
                        .into());
                    }
                }
                if !state.badge_consistent() {
                    return Err(AssertionError::new(
                        "cart badge matches entries",
                        state.len(),
                        format!("{:?}", state.badge_count),
                    )
                    .into());
                }
                Ok(())
            }

            ScenarioStep::ExpectOrderComplete { header } => {
                flows.complete.verify_complete().await?;
                if let Some(expected) = header {
                    let actual = flows.complete.header().await?;
                    if &actual != expected {
                        return Err(
                            AssertionError::new("order confirmation", expected, actual).into(),
                        );
                    }
                }
                flows.verify_cart_badge(0).await
            }

            ScenarioStep::ExpectPersonaDefect => {
                let persona = flows.persona();
                let verdict = flows.check_persona_defect().await?;
                if let Some(persona) = persona {
                    ctx.record_verdict(persona, verdict);
                }
                Ok(())
            }
        }
    }
}
