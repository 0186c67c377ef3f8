use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{JourneyError, Result};
use crate::flow::tolerance::Classification;
use crate::model::persona::Persona;
use crate::model::product::{CheckoutInfo, SortCriterion};

/// One storefront journey, deserialized from YAML.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub name: String,

    /// Persona used by `login` steps that name none
    #[serde(default)]
    pub persona: Option<Persona>,

    #[serde(default)]
    pub description: Option<String>,

    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            JourneyError::Config(format!("{}: {}", path.display(), e))
        })
    }
}

/// Load one scenario file, or every `.yaml`/`.yml` file in a directory (sorted by name).
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>> {
    if path.is_file() {
        return Ok(vec![Scenario::from_file(path)?]);
    }
    if !path.is_dir() {
        return Err(JourneyError::Config(format!(
            "scenario path not found: {}",
            path.display()
        )));
    }

    let mut files: Vec<_> = std::fs::read_dir(path)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == "yaml" || ext == "yml")
        })
        .collect();
    files.sort();

    files.iter().map(|p| Scenario::from_file(p)).collect()
}

/// A single step in a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Log in as a persona and judge the login against its tolerance entry
    Login {
        #[serde(default)]
        persona: Option<Persona>,
    },

    /// Log in with raw credentials; rejection is not a failure
    LoginWith { username: String, password: String },

    /// Add products if absent. `random` picks that many extra catalog products.
    AddProducts {
        #[serde(default)]
        products: Vec<String>,
        #[serde(default)]
        random: Option<usize>,
    },

    RemoveProduct { product: String },

    SortBy { criterion: SortCriterion },

    OpenCart,

    /// The full checkout flow, including the subtotal cross-check
    Checkout {
        products: Vec<String>,
        #[serde(default)]
        info: Option<CheckoutInfo>,
    },

    /// Go to checkout (from the cart if needed), fill the form and continue
    FillCheckoutInfo {
        #[serde(default)]
        info: CheckoutInfo,
    },

    /// Cross-check the review summary, then finish
    FinishOrder,

    ResetState,

    Logout,

    ExpectBadge { count: u32 },

    ExpectLoginError { message: String },

    ExpectCheckoutError { message: String },

    ExpectSorted { criterion: SortCriterion },

    ExpectCartContains { products: Vec<String> },

    ExpectOrderComplete {
        #[serde(default)]
        header: Option<String>,
    },

    /// Probe the logged-in persona for its tabled deviation
    ExpectPersonaDefect,
}

impl ScenarioStep {
    pub fn action(&self) -> &'static str {
        match self {
            ScenarioStep::Login { .. } => "login",
            ScenarioStep::LoginWith { .. } => "login_with",
            ScenarioStep::AddProducts { .. } => "add_products",
            ScenarioStep::RemoveProduct { .. } => "remove_product",
            ScenarioStep::SortBy { .. } => "sort_by",
            ScenarioStep::OpenCart => "open_cart",
            ScenarioStep::Checkout { .. } => "checkout",
            ScenarioStep::FillCheckoutInfo { .. } => "fill_checkout_info",
            ScenarioStep::FinishOrder => "finish_order",
            ScenarioStep::ResetState => "reset_state",
            ScenarioStep::Logout => "logout",
            ScenarioStep::ExpectBadge { .. } => "expect_badge",
            ScenarioStep::ExpectLoginError { .. } => "expect_login_error",
            ScenarioStep::ExpectCheckoutError { .. } => "expect_checkout_error",
            ScenarioStep::ExpectSorted { .. } => "expect_sorted",
            ScenarioStep::ExpectCartContains { .. } => "expect_cart_contains",
            ScenarioStep::ExpectOrderComplete { .. } => "expect_order_complete",
            ScenarioStep::ExpectPersonaDefect => "expect_persona_defect",
        }
    }
}

/// A persona judgement made during a scenario.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefectRecord {
    pub step_index: usize,
    pub persona: Persona,
    pub classification: Classification,
    pub detail: String,
}

/// Why a scenario stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepFailure {
    /// `None` when the failure happened outside any step (session setup or teardown)
    pub step_index: Option<usize>,
    pub action: String,
    /// timeout, assertion, unexpected_defect, driver, ...
    pub kind: String,
    pub operation: Option<String>,
    pub expected: Option<String>,
    pub actual: Option<String>,
    pub message: String,
}

impl StepFailure {
    pub fn from_error(step_index: Option<usize>, action: &str, error: &JourneyError) -> Self {
        let (kind, operation, expected, actual) = match error {
            JourneyError::Timeout(e) => (
                "timeout",
                Some(format!("{} on '{}'", e.condition, e.selector)),
                None,
                None,
            ),
            JourneyError::Assertion(e) => (
                "assertion",
                Some(e.operation.clone()),
                Some(e.expected.clone()),
                Some(e.actual.clone()),
            ),
            JourneyError::UnexpectedDefect(e) => (
                "unexpected_defect",
                Some(e.operation.clone()),
                None,
                Some(e.detail.clone()),
            ),
            JourneyError::Driver(_) => ("driver", None, None, None),
            JourneyError::Config(_) => ("config", None, None, None),
            JourneyError::Io(_) => ("io", None, None, None),
            JourneyError::Yaml(_) => ("yaml", None, None, None),
        };
        Self {
            step_index,
            action: action.to_string(),
            kind: kind.to_string(),
            operation,
            expected,
            actual,
            message: error.to_string(),
        }
    }
}

/// Result of running one scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub persona: Option<Persona>,
    pub passed: bool,
    pub steps_run: usize,
    pub duration_ms: u64,
    pub defects: Vec<DefectRecord>,
    pub failure: Option<StepFailure>,
}
