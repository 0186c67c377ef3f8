use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::FutureExt;

use crate::browser::driver::{AutomationDriver, PageFactory};
use crate::error::Result;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One live browser page, owned by a single scenario.
///
/// Clones share the same page and are meant to stay inside the owning scenario.
#[derive(Clone)]
pub struct Session {
    id: u64,
    page: Arc<dyn AutomationDriver>,
    released: Arc<AtomicBool>,
}

impl Session {
    fn new(page: Arc<dyn AutomationDriver>) -> Self {
        Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            page,
            released: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn page(&self) -> &dyn AutomationDriver {
        self.page.as_ref()
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }

    /// Flip to released; true only for the first caller.
    fn mark_released(&self) -> bool {
        !self.released.swap(true, Ordering::AcqRel)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}

/// Owns the page for one scenario: acquire before the first interaction, release after the last.
pub struct SessionContext {
    factory: Arc<dyn PageFactory>,
    active: Option<Session>,
}

impl SessionContext {
    pub fn new(factory: Arc<dyn PageFactory>) -> Self {
        Self {
            factory,
            active: None,
        }
    }

    /// Open the page, or return the one already open.
    pub async fn acquire(&mut self) -> Result<Session> {
        if let Some(session) = &self.active {
            return Ok(session.clone());
        }

        let page = self.factory.open_page().await?;
        let session = Session::new(page);
        tracing::info!(session = session.id, "session acquired");
        self.active = Some(session.clone());
        Ok(session)
    }

    /// Close the page. Calling again, or without an acquired session, does nothing.
    pub async fn release(&mut self) -> Result<()> {
        let Some(session) = self.active.take() else {
            return Ok(());
        };
        if !session.mark_released() {
            return Ok(());
        }

        tracing::info!(session = session.id, "session released");
        session.page.close().await?;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for SessionContext {
    // Reached when the owning future is cancelled before `release` ran.
    fn drop(&mut self) {
        let Some(session) = self.active.take() else {
            return;
        };
        if !session.mark_released() {
            return;
        }

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(session = session.id, "releasing abandoned session");
                handle.spawn(async move {
                    if let Err(e) = session.page.close().await {
                        tracing::warn!(session = session.id, error = %e, "close failed");
                    }
                });
            }
            Err(_) => {
                tracing::warn!(session = session.id, "no runtime to release session on");
            }
        }
    }
}

/// Run `body` with a fresh session that is released on every exit path:
/// success, error, panic, or cancellation of the returned future.
///
/// A body error takes precedence over a release error; a panic is re-raised after release.
pub async fn with_session<T, F, Fut>(factory: Arc<dyn PageFactory>, body: F) -> Result<T>
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut ctx = SessionContext::new(factory);
    let session = ctx.acquire().await?;

    let outcome = AssertUnwindSafe(body(session)).catch_unwind().await;
    let released = ctx.release().await;

    match outcome {
        Ok(Ok(value)) => {
            released?;
            Ok(value)
        }
        Ok(Err(e)) => {
            if let Err(release_err) = released {
                tracing::warn!(error = %release_err, "release failed after scenario error");
            }
            Err(e)
        }
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
