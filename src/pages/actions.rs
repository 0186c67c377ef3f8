use crate::browser::driver::Selector;
use crate::error::{AssertionError, Result};
use crate::sync::wait::{Budget, Waiter};

/// Wait for `selector` to be visible, then click it.
pub async fn click(ui: &Waiter, selector: &Selector, budget: Budget) -> Result<()> {
    let handle = ui.visible(selector, budget).await?;
    ui.page().click(&handle).await?;
    Ok(())
}

/// Wait for `selector` to be visible, then replace its value.
pub async fn fill(ui: &Waiter, selector: &Selector, text: &str) -> Result<()> {
    let handle = ui.visible(selector, Budget::Short).await?;
    ui.page().fill(&handle, text).await?;
    Ok(())
}

/// Trimmed text of the first visible match.
pub async fn text(ui: &Waiter, selector: &Selector, budget: Budget) -> Result<String> {
    let handle = ui.visible(selector, budget).await?;
    let text = ui.page().read_text(&handle).await?.ok_or_else(|| {
        AssertionError::new(format!("read text of '{}'", selector), "text content", "none")
    })?;
    Ok(text.trim().to_string())
}

/// Trimmed text of every current match, in document order. Nodes without text are skipped.
pub async fn texts(ui: &Waiter, selector: &Selector) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for handle in ui.page().resolve(selector).await? {
        if let Some(text) = ui.page().read_text(&handle).await? {
            out.push(text.trim().to_string());
        }
    }
    Ok(out)
}

/// Attribute of every current match, in document order; missing attributes become "".
pub async fn attributes(ui: &Waiter, selector: &Selector, name: &str) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for handle in ui.page().resolve(selector).await? {
        out.push(ui.page().read_attribute(&handle, name).await?.unwrap_or_default());
    }
    Ok(out)
}
