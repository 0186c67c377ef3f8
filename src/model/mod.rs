pub mod money;
pub mod persona;
pub mod product;

pub use persona::Persona;
pub use product::{CartEntry, CartState, CheckoutInfo, OrderSummary, Product, SortCriterion};
