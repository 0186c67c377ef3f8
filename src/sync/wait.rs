use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::browser::driver::{AutomationDriver, ElementHandle, Selector};
use crate::browser::session::Session;
use crate::error::{DriverError, Result, TimeoutError};

pub const DEFAULT_SHORT_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_LONG_TIMEOUT_MS: u64 = 12_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;

/// How long a wait may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Budget {
    /// State that should already hold, or is about to (badge disappearing, button flipping)
    Short,
    /// State gated behind network or persona latency (login landing)
    Long,
    Custom(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutPolicy {
    #[serde(default = "default_short")]
    pub short_ms: u64,
    #[serde(default = "default_long")]
    pub long_ms: u64,
    #[serde(default = "default_poll")]
    pub poll_ms: u64,
}

fn default_short() -> u64 {
    DEFAULT_SHORT_TIMEOUT_MS
}

fn default_long() -> u64 {
    DEFAULT_LONG_TIMEOUT_MS
}

fn default_poll() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            short_ms: DEFAULT_SHORT_TIMEOUT_MS,
            long_ms: DEFAULT_LONG_TIMEOUT_MS,
            poll_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl TimeoutPolicy {
    pub fn budget(&self, budget: Budget) -> Duration {
        match budget {
            Budget::Short => Duration::from_millis(self.short_ms),
            Budget::Long => Duration::from_millis(self.long_ms),
            Budget::Custom(d) => d,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_ms.max(1))
    }
}

/// Condition-based waits against one session's page.
///
/// Every probe re-resolves its selector, so waits survive re-renders. A handle that
/// detaches mid-probe counts as "not yet"; any other driver error propagates at once.
#[derive(Clone, Debug)]
pub struct Waiter {
    session: Session,
    policy: TimeoutPolicy,
}

impl Waiter {
    pub fn new(session: Session, policy: TimeoutPolicy) -> Self {
        Self { session, policy }
    }

    pub fn page(&self) -> &dyn AutomationDriver {
        self.session.page()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn policy(&self) -> &TimeoutPolicy {
        &self.policy
    }

    /// Poll `probe` until it yields a value or the budget runs out.
    pub async fn until<T, F, Fut>(
        &self,
        condition: &str,
        selector: &Selector,
        budget: Budget,
        mut probe: F,
    ) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<Option<T>, DriverError>>,
    {
        let timeout = self.policy.budget(budget);
        let poll = self.policy.poll_interval();
        let start = Instant::now();

        loop {
            match probe().await {
                Ok(Some(value)) => {
                    let elapsed = start.elapsed();
                    if elapsed > timeout / 2 {
                        tracing::debug!(%selector, condition, ?elapsed, ?timeout, "slow settle");
                    }
                    return Ok(value);
                }
                Ok(None) | Err(DriverError::StaleHandle(_)) => {}
                Err(e) => return Err(e.into()),
            }

            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Err(TimeoutError {
                    condition: condition.to_string(),
                    selector: selector.to_string(),
                    elapsed,
                    timeout,
                }
                .into());
            }
            tokio::time::sleep(poll.min(timeout - elapsed)).await;
        }
    }

    /// First matching element that is visible.
    pub async fn visible(&self, selector: &Selector, budget: Budget) -> Result<ElementHandle> {
        self.until("visible", selector, budget, || self.first_visible(selector))
            .await
    }

    /// No matching element is visible (absent counts as hidden).
    pub async fn hidden(&self, selector: &Selector, budget: Budget) -> Result<()> {
        self.until("hidden", selector, budget, || async {
            Ok::<_, DriverError>(match self.first_visible(selector).await? {
                Some(_) => None,
                None => Some(()),
            })
        })
        .await
    }

    /// At least one matching element exists, visible or not.
    pub async fn attached(
        &self,
        selector: &Selector,
        budget: Budget,
    ) -> Result<Vec<ElementHandle>> {
        self.count(selector, "attached", |n| n > 0, budget).await
    }

    /// The number of matching elements satisfies `predicate`.
    pub async fn count<P>(
        &self,
        selector: &Selector,
        description: &str,
        predicate: P,
        budget: Budget,
    ) -> Result<Vec<ElementHandle>>
    where
        P: Fn(usize) -> bool,
    {
        let condition = format!("count {}", description);
        self.until(&condition, selector, budget, || async {
            let handles = self.page().resolve(selector).await?;
            Ok::<_, DriverError>(predicate(handles.len()).then_some(handles))
        })
        .await
    }

    /// The first matching element's trimmed text equals `expected`.
    pub async fn text_equals(
        &self,
        selector: &Selector,
        expected: &str,
        budget: Budget,
    ) -> Result<ElementHandle> {
        let condition = format!("text == {:?}", expected);
        self.until(&condition, selector, budget, || async {
            let Some(handle) = self.page().resolve(selector).await?.into_iter().next() else {
                return Ok(None);
            };
            let text = self.page().read_text(&handle).await?;
            let settled = text.as_deref().map(str::trim) == Some(expected);
            Ok::<_, DriverError>(settled.then_some(handle))
        })
        .await
    }

    /// Non-waiting probe: is any matching element visible right now?
    pub async fn is_visible_now(&self, selector: &Selector) -> Result<bool> {
        Ok(self.any_visible(selector).await?)
    }

    /// Raw form of [`Waiter::is_visible_now`] for use inside [`Waiter::until`] probes.
    pub async fn any_visible(&self, selector: &Selector) -> std::result::Result<bool, DriverError> {
        match self.first_visible(selector).await {
            Ok(found) => Ok(found.is_some()),
            Err(DriverError::StaleHandle(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Non-waiting probe: how many elements match right now?
    pub async fn count_now(&self, selector: &Selector) -> Result<usize> {
        Ok(self.page().resolve(selector).await?.len())
    }

    async fn first_visible(
        &self,
        selector: &Selector,
    ) -> std::result::Result<Option<ElementHandle>, DriverError> {
        for handle in self.page().resolve(selector).await? {
            if self.page().is_visible(&handle).await? {
                return Ok(Some(handle));
            }
        }
        Ok(None)
    }
}
