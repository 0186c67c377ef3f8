//! Stable selectors for each storefront screen.
//!
//! `data-test` attributes are used wherever the storefront exposes them; catalog
//! text is persona-dependent and never used as a primary selector. Row-scoped lookups
//! take a business key (the product name) and filter rows by it.

use serde::{Deserialize, Serialize};

use crate::browser::driver::Selector;

/// A logical screen with a named element table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    CheckoutReview,
    CheckoutComplete,
}

impl Screen {
    fn table(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Screen::Login => LoginLocators::TABLE,
            Screen::Inventory => InventoryLocators::TABLE,
            Screen::Cart => CartLocators::TABLE,
            Screen::CheckoutInfo => CheckoutInfoLocators::TABLE,
            Screen::CheckoutReview => CheckoutReviewLocators::TABLE,
            Screen::CheckoutComplete => CheckoutCompleteLocators::TABLE,
        }
    }

    /// Selector for a semantic element name such as `"cart badge"`.
    pub fn locate(&self, name: &str) -> Option<Selector> {
        self.table()
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, css)| Selector::css(*css))
    }

    pub fn element_names(&self) -> impl Iterator<Item = &'static str> {
        self.table().iter().map(|(n, _)| *n)
    }
}

pub struct LoginLocators;

impl LoginLocators {
    const USERNAME: &'static str = r#"[data-test="username"]"#;
    const PASSWORD: &'static str = r#"[data-test="password"]"#;
    const LOGIN_BUTTON: &'static str = r#"[data-test="login-button"]"#;
    const ERROR: &'static str = r#"[data-test="error"]"#;

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("username field", Self::USERNAME),
        ("password field", Self::PASSWORD),
        ("login button", Self::LOGIN_BUTTON),
        ("error message", Self::ERROR),
    ];

    pub fn username() -> Selector {
        Selector::css(Self::USERNAME)
    }
    pub fn password() -> Selector {
        Selector::css(Self::PASSWORD)
    }
    pub fn login_button() -> Selector {
        Selector::css(Self::LOGIN_BUTTON)
    }
    pub fn error() -> Selector {
        Selector::css(Self::ERROR)
    }
}

pub struct InventoryLocators;

impl InventoryLocators {
    const LIST: &'static str = ".inventory_list";
    const ITEM: &'static str = ".inventory_item";
    const ITEM_NAME: &'static str = ".inventory_item_name";
    const ITEM_PRICE: &'static str = ".inventory_item_price";
    const ITEM_DESC: &'static str = ".inventory_item_desc";
    const ITEM_IMAGE: &'static str = "img.inventory_item_img";
    const ADD_BUTTON: &'static str = r#"button[data-test^="add-to-cart-"]"#;
    const REMOVE_BUTTON: &'static str = r#"button[data-test^="remove-"]"#;
    const SORT: &'static str = r#"[data-test="product-sort-container"]"#;
    const ACTIVE_SORT: &'static str = r#"[data-test="active-option"]"#;
    const CART_BADGE: &'static str = ".shopping_cart_badge";
    const CART_LINK: &'static str = ".shopping_cart_link";
    const ERROR: &'static str = r#"[data-test="error"]"#;
    const MENU_OPEN: &'static str = "#react-burger-menu-btn";
    const MENU_CLOSE: &'static str = "#react-burger-cross-btn";
    const MENU_RESET: &'static str = "#reset_sidebar_link";
    const MENU_LOGOUT: &'static str = "#logout_sidebar_link";

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("product list", Self::LIST),
        ("product rows", Self::ITEM),
        ("product names", Self::ITEM_NAME),
        ("product prices", Self::ITEM_PRICE),
        ("product images", Self::ITEM_IMAGE),
        ("sort dropdown", Self::SORT),
        ("active sort", Self::ACTIVE_SORT),
        ("cart badge", Self::CART_BADGE),
        ("cart link", Self::CART_LINK),
        ("error message", Self::ERROR),
        ("menu button", Self::MENU_OPEN),
    ];

    pub fn list() -> Selector {
        Selector::css(Self::LIST)
    }
    pub fn names() -> Selector {
        Selector::css(Self::ITEM_NAME)
    }
    pub fn prices() -> Selector {
        Selector::css(Self::ITEM_PRICE)
    }
    pub fn images() -> Selector {
        Selector::css(Self::ITEM_IMAGE)
    }
    pub fn sort_dropdown() -> Selector {
        Selector::css(Self::SORT)
    }
    pub fn active_sort() -> Selector {
        Selector::css(Self::ACTIVE_SORT)
    }
    pub fn cart_badge() -> Selector {
        Selector::css(Self::CART_BADGE)
    }
    pub fn cart_link() -> Selector {
        Selector::css(Self::CART_LINK)
    }
    pub fn error() -> Selector {
        Selector::css(Self::ERROR)
    }
    pub fn menu_open() -> Selector {
        Selector::css(Self::MENU_OPEN)
    }
    pub fn menu_close() -> Selector {
        Selector::css(Self::MENU_CLOSE)
    }
    pub fn menu_reset() -> Selector {
        Selector::css(Self::MENU_RESET)
    }
    pub fn menu_logout() -> Selector {
        Selector::css(Self::MENU_LOGOUT)
    }
    pub fn any_remove_button() -> Selector {
        Selector::css(Self::REMOVE_BUTTON)
    }

    pub fn row(product: &str) -> Selector {
        Selector::css(Self::ITEM).within(Self::ITEM, product)
    }
    pub fn row_name(product: &str) -> Selector {
        Selector::css(Self::ITEM_NAME).within(Self::ITEM, product)
    }
    pub fn row_price(product: &str) -> Selector {
        Selector::css(Self::ITEM_PRICE).within(Self::ITEM, product)
    }
    pub fn row_description(product: &str) -> Selector {
        Selector::css(Self::ITEM_DESC).within(Self::ITEM, product)
    }
    pub fn row_image(product: &str) -> Selector {
        Selector::css(Self::ITEM_IMAGE).within(Self::ITEM, product)
    }
    pub fn row_add_button(product: &str) -> Selector {
        Selector::css(Self::ADD_BUTTON).within(Self::ITEM, product)
    }
    pub fn row_remove_button(product: &str) -> Selector {
        Selector::css(Self::REMOVE_BUTTON).within(Self::ITEM, product)
    }
}

pub struct CartLocators;

impl CartLocators {
    const LIST: &'static str = ".cart_list";
    const ITEM: &'static str = ".cart_item";
    const ITEM_NAME: &'static str = ".inventory_item_name";
    const ITEM_PRICE: &'static str = ".inventory_item_price";
    const QUANTITY: &'static str = ".cart_quantity";
    const REMOVE_BUTTON: &'static str = r#"button[data-test^="remove-"]"#;
    const CHECKOUT: &'static str = r#"[data-test="checkout"]"#;
    const CONTINUE_SHOPPING: &'static str = r#"[data-test="continue-shopping"]"#;

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("cart list", Self::LIST),
        ("cart rows", Self::ITEM),
        ("checkout button", Self::CHECKOUT),
        ("continue shopping button", Self::CONTINUE_SHOPPING),
    ];

    pub fn list() -> Selector {
        Selector::css(Self::LIST)
    }
    pub fn rows() -> Selector {
        Selector::css(Self::ITEM)
    }
    pub fn names() -> Selector {
        Selector::css(format!("{} {}", Self::ITEM, Self::ITEM_NAME))
    }
    pub fn prices() -> Selector {
        Selector::css(format!("{} {}", Self::ITEM, Self::ITEM_PRICE))
    }
    pub fn checkout() -> Selector {
        Selector::css(Self::CHECKOUT)
    }
    pub fn continue_shopping() -> Selector {
        Selector::css(Self::CONTINUE_SHOPPING)
    }

    pub fn row(product: &str) -> Selector {
        Selector::css(Self::ITEM).within(Self::ITEM, product)
    }
    pub fn row_price(product: &str) -> Selector {
        Selector::css(Self::ITEM_PRICE).within(Self::ITEM, product)
    }
    pub fn row_quantity(product: &str) -> Selector {
        Selector::css(Self::QUANTITY).within(Self::ITEM, product)
    }
    pub fn row_remove_button(product: &str) -> Selector {
        Selector::css(Self::REMOVE_BUTTON).within(Self::ITEM, product)
    }
}

pub struct CheckoutInfoLocators;

impl CheckoutInfoLocators {
    const FIRST_NAME: &'static str = r#"[data-test="firstName"]"#;
    const LAST_NAME: &'static str = r#"[data-test="lastName"]"#;
    const POSTAL_CODE: &'static str = r#"[data-test="postalCode"]"#;
    const CONTINUE: &'static str = r#"[data-test="continue"]"#;
    const CANCEL: &'static str = r#"[data-test="cancel"]"#;
    const ERROR: &'static str = r#"[data-test="error"]"#;

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("first name field", Self::FIRST_NAME),
        ("last name field", Self::LAST_NAME),
        ("postal code field", Self::POSTAL_CODE),
        ("continue button", Self::CONTINUE),
        ("cancel button", Self::CANCEL),
        ("error message", Self::ERROR),
    ];

    pub fn first_name() -> Selector {
        Selector::css(Self::FIRST_NAME)
    }
    pub fn last_name() -> Selector {
        Selector::css(Self::LAST_NAME)
    }
    pub fn postal_code() -> Selector {
        Selector::css(Self::POSTAL_CODE)
    }
    pub fn continue_button() -> Selector {
        Selector::css(Self::CONTINUE)
    }
    pub fn cancel() -> Selector {
        Selector::css(Self::CANCEL)
    }
    pub fn error() -> Selector {
        Selector::css(Self::ERROR)
    }
}

pub struct CheckoutReviewLocators;

impl CheckoutReviewLocators {
    const SUMMARY: &'static str = ".summary_info";
    const ITEM: &'static str = ".cart_item";
    const ITEM_NAME: &'static str = ".inventory_item_name";
    const SUBTOTAL: &'static str = r#"[data-test="subtotal-label"]"#;
    const TAX: &'static str = r#"[data-test="tax-label"]"#;
    const TOTAL: &'static str = r#"[data-test="total-label"]"#;
    const PAYMENT: &'static str = r#"[data-test="payment-info-value"]"#;
    const SHIPPING: &'static str = r#"[data-test="shipping-info-value"]"#;
    const FINISH: &'static str = r#"[data-test="finish"]"#;
    const CANCEL: &'static str = r#"[data-test="cancel"]"#;

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("summary", Self::SUMMARY),
        ("subtotal", Self::SUBTOTAL),
        ("tax", Self::TAX),
        ("total", Self::TOTAL),
        ("payment info", Self::PAYMENT),
        ("shipping info", Self::SHIPPING),
        ("finish button", Self::FINISH),
        ("cancel button", Self::CANCEL),
    ];

    pub fn summary() -> Selector {
        Selector::css(Self::SUMMARY)
    }
    pub fn item_names() -> Selector {
        Selector::css(format!("{} {}", Self::ITEM, Self::ITEM_NAME))
    }
    pub fn subtotal() -> Selector {
        Selector::css(Self::SUBTOTAL)
    }
    pub fn tax() -> Selector {
        Selector::css(Self::TAX)
    }
    pub fn total() -> Selector {
        Selector::css(Self::TOTAL)
    }
    pub fn payment() -> Selector {
        Selector::css(Self::PAYMENT)
    }
    pub fn shipping() -> Selector {
        Selector::css(Self::SHIPPING)
    }
    pub fn finish() -> Selector {
        Selector::css(Self::FINISH)
    }
    pub fn cancel() -> Selector {
        Selector::css(Self::CANCEL)
    }
}

pub struct CheckoutCompleteLocators;

impl CheckoutCompleteLocators {
    const HEADER: &'static str = r#"[data-test="complete-header"]"#;
    const TEXT: &'static str = r#"[data-test="complete-text"]"#;
    const BACK_HOME: &'static str = r#"[data-test="back-to-products"]"#;

    const TABLE: &'static [(&'static str, &'static str)] = &[
        ("complete header", Self::HEADER),
        ("complete text", Self::TEXT),
        ("back home button", Self::BACK_HOME),
    ];

    pub fn header() -> Selector {
        Selector::css(Self::HEADER)
    }
    pub fn text() -> Selector {
        Selector::css(Self::TEXT)
    }
    pub fn back_home() -> Selector {
        Selector::css(Self::BACK_HOME)
    }
}
