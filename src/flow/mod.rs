pub mod library;
pub mod tolerance;

pub use library::{CheckoutReport, LoginReport, ShopFlows, VisualBaseline};
pub use tolerance::{Classification, ExpectedDeviation, Observation, ToleranceTable, Verdict};
