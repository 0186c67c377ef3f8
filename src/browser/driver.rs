use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DriverError;

/// Opaque reference to a DOM node, valid until the node is re-rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementHandle(pub String);

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Restricts a lookup to the rows matching `css` whose text contains `has_text`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    pub css: String,
    #[serde(rename = "hasText")]
    pub has_text: String,
}

/// What to ask the driver for. Resolution into nodes is the driver's job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selector {
    pub css: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub within: Option<Scope>,
}

impl Selector {
    pub fn css(css: impl Into<String>) -> Self {
        Self {
            css: css.into(),
            within: None,
        }
    }

    /// `[data-test="<id>"]`
    pub fn test_id(id: &str) -> Self {
        Self::css(format!("[data-test=\"{}\"]", id))
    }

    /// This selector, looked up only inside the `row` whose text contains `key`.
    pub fn within(self, row: &str, key: &str) -> Self {
        Self {
            css: self.css,
            within: Some(Scope {
                css: row.to_string(),
                has_text: key.to_string(),
            }),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.within {
            Some(scope) => write!(
                f,
                "{}:has-text({:?}) >> {}",
                scope.css, scope.has_text, self.css
            ),
            None => f.write_str(&self.css),
        }
    }
}

/// Primitive browser operations on one page. Everything above this trait is
/// built from these calls only.
///
/// `fill` on a `<select>` element chooses the option whose `value` equals the text.
#[async_trait]
pub trait AutomationDriver: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    async fn resolve(&self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError>;

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError>;

    async fn read_text(&self, element: &ElementHandle) -> Result<Option<String>, DriverError>;

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool, DriverError>;

    async fn bounding_box(&self, element: &ElementHandle) -> Result<Option<Rect>, DriverError>;

    /// Tear the page down. Further calls fail with [`DriverError::Closed`].
    async fn close(&self) -> Result<(), DriverError>;
}

/// Opens fresh pages; one per scenario.
#[async_trait]
pub trait PageFactory: Send + Sync {
    async fn open_page(&self) -> Result<std::sync::Arc<dyn AutomationDriver>, DriverError>;
}
