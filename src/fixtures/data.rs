use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::model::persona::Persona;
use crate::model::product::CheckoutInfo;

pub const STANDARD_PASSWORD: &str = "secret_sauce";

pub const BACKPACK: &str = "Sauce Labs Backpack";
pub const BIKE_LIGHT: &str = "Sauce Labs Bike Light";
pub const BOLT_TSHIRT: &str = "Sauce Labs Bolt T-Shirt";
pub const FLEECE_JACKET: &str = "Sauce Labs Fleece Jacket";
pub const ONESIE: &str = "Sauce Labs Onesie";
pub const RED_TSHIRT: &str = "Test.allTheThings() T-Shirt (Red)";

/// The six products every non-defective catalog shows.
pub const CATALOG: [&str; 6] = [
    BACKPACK,
    BIKE_LIGHT,
    BOLT_TSHIRT,
    FLEECE_JACKET,
    ONESIE,
    RED_TSHIRT,
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    pub fn for_persona(persona: Persona) -> Self {
        Self::new(persona.username(), STANDARD_PASSWORD)
    }
}

/// Canonical shipping details used across checkout scenarios.
pub fn checkout_info() -> CheckoutInfo {
    CheckoutInfo::new("John", "Doe", "12345")
}

/// Default details when a checkout flow is given none.
pub fn default_checkout_info() -> CheckoutInfo {
    CheckoutInfo::new("Test", "User", "12345")
}

pub fn generated_checkout_info() -> CheckoutInfo {
    CheckoutInfo::new("Generated", "User", "54321")
}

/// `count` distinct products picked at random (fewer if `products` is shorter).
pub fn select_random_products(products: &[String], count: usize) -> Vec<String> {
    let mut rng = rand::rng();
    products
        .choose_multiple(&mut rng, count)
        .cloned()
        .collect()
}
