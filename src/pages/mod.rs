pub mod actions;
pub mod cart;
pub mod checkout_complete;
pub mod checkout_info;
pub mod checkout_review;
pub mod inventory;
pub mod locators;
pub mod login;

pub use cart::CartPage;
pub use checkout_complete::CheckoutCompletePage;
pub use checkout_info::CheckoutInfoPage;
pub use checkout_review::CheckoutReviewPage;
pub use inventory::{AddOutcome, InventoryPage};
pub use locators::Screen;
pub use login::{LoginOutcome, LoginPage};
