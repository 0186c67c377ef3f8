#![allow(dead_code)]

//! Scripted in-memory storefront implementing the automation driver.
//!
//! Elements are addressed by string ids (`"price:Sauce Labs Backpack"`); a handle whose
//! id is no longer on screen reads as stale. Persona behaviours follow the live site:
//! slow login, one shared image, broken remove/sort, shifted visuals.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::time::Instant;

use shop_journey::browser::driver::{AutomationDriver, ElementHandle, PageFactory, Rect, Selector};
use shop_journey::error::DriverError;
use shop_journey::fixtures::data::STANDARD_PASSWORD;
use shop_journey::model::money::format_price;
use shop_journey::model::persona::Persona;
use shop_journey::model::product::SortCriterion;
use shop_journey::pages::login::{BAD_CREDENTIALS, LOCKED_OUT, PASSWORD_REQUIRED, USERNAME_REQUIRED};

pub const BASE_URL: &str = "https://shop.test/";

const ADD_BUTTON: &str = r#"button[data-test^="add-to-cart-"]"#;
const REMOVE_BUTTON: &str = r#"button[data-test^="remove-"]"#;
const SORT_ERROR: &str = "Sorting is broken! This error has been reported to Backtrace.";
const COMPLETE_TEXT: &str =
    "Your order has been dispatched, and will arrive just as fast as the pony can get there!";

pub fn catalog() -> Vec<(&'static str, Decimal)> {
    vec![
        ("Sauce Labs Backpack", Decimal::new(2999, 2)),
        ("Sauce Labs Bike Light", Decimal::new(999, 2)),
        ("Sauce Labs Bolt T-Shirt", Decimal::new(1599, 2)),
        ("Sauce Labs Fleece Jacket", Decimal::new(4999, 2)),
        ("Sauce Labs Onesie", Decimal::new(799, 2)),
        ("Test.allTheThings() T-Shirt (Red)", Decimal::new(1599, 2)),
    ]
}

#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// How long a performance-glitch login takes to land
    pub glitch_delay: Duration,
    /// Whether the visual persona actually differs from standard
    pub visual_drift: bool,
    /// Added to the displayed item total, to simulate a pricing bug
    pub subtotal_skew: Decimal,
    /// Added to the displayed total
    pub total_skew: Decimal,
    /// How long the header badge keeps its old count after the cart changes
    pub badge_lag: Duration,
    /// Validate postal code first instead of first name
    pub reversed_validation: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            glitch_delay: Duration::from_millis(3_000),
            visual_drift: true,
            subtotal_skew: Decimal::ZERO,
            total_skew: Decimal::ZERO,
            badge_lag: Duration::ZERO,
            reversed_validation: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Login,
    Inventory,
    Cart,
    CheckoutInfo,
    Review,
    Complete,
}

struct State {
    screen: Screen,
    user: Option<Persona>,
    username: String,
    password: String,
    login_error: Option<String>,
    landing_at: Option<Instant>,
    cart: Vec<String>,
    badge_shown: usize,
    badge_due: Option<Instant>,
    sort: SortCriterion,
    banner: Option<String>,
    menu_open: bool,
    first_name: String,
    last_name: String,
    postal_code: String,
    checkout_error: Option<String>,
    closed: bool,
}

pub struct FakeStore {
    options: StoreOptions,
    state: Mutex<State>,
    closes: Arc<AtomicUsize>,
}

impl FakeStore {
    pub fn new(options: StoreOptions, closes: Arc<AtomicUsize>) -> Self {
        Self {
            options,
            state: Mutex::new(State {
                screen: Screen::Login,
                user: None,
                username: String::new(),
                password: String::new(),
                login_error: None,
                landing_at: None,
                cart: Vec::new(),
                badge_shown: 0,
                badge_due: None,
                sort: SortCriterion::NameAscending,
                banner: None,
                menu_open: false,
                first_name: String::new(),
                last_name: String::new(),
                postal_code: String::new(),
                checkout_error: None,
                closed: false,
            }),
            closes,
        }
    }

    pub fn cart(&self) -> Vec<String> {
        self.state.lock().unwrap().cart.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut State) -> Result<T, DriverError>,
    ) -> Result<T, DriverError> {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return Err(DriverError::Closed);
        }
        if let Some(at) = state.landing_at {
            if Instant::now() >= at {
                state.landing_at = None;
                state.screen = Screen::Inventory;
            }
        }
        if state.badge_due.is_some_and(|at| Instant::now() >= at) {
            state.badge_due = None;
            state.badge_shown = state.cart.len();
        }

        let out = f(&mut state);

        if state.badge_shown != state.cart.len() && state.badge_due.is_none() {
            if self.options.badge_lag.is_zero() {
                state.badge_shown = state.cart.len();
            } else {
                state.badge_due = Some(Instant::now() + self.options.badge_lag);
            }
        }
        out
    }

    fn price(name: &str) -> Decimal {
        catalog()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, p)| p)
            .unwrap_or(Decimal::ZERO)
    }

    fn sorted_names(state: &State) -> Vec<String> {
        let mut items = catalog();
        match state.sort {
            SortCriterion::NameAscending => items.sort_by(|a, b| a.0.cmp(b.0)),
            SortCriterion::NameDescending => items.sort_by(|a, b| b.0.cmp(a.0)),
            SortCriterion::PriceAscending => items.sort_by(|a, b| a.1.cmp(&b.1)),
            SortCriterion::PriceDescending => items.sort_by(|a, b| b.1.cmp(&a.1)),
        }
        items.into_iter().map(|(n, _)| n.to_string()).collect()
    }

    fn subtotal(state: &State) -> Decimal {
        state.cart.iter().map(|n| Self::price(n)).sum()
    }

    fn header(state: &State, out: &mut Vec<String>) {
        out.push("hdr:cartlink".into());
        out.push("hdr:menu".into());
        if state.badge_shown > 0 {
            out.push("hdr:badge".into());
        }
        if state.menu_open {
            out.extend(["menu:close", "menu:reset", "menu:logout"].map(String::from));
        }
    }

    /// Every element on screen, in document order.
    fn nodes(state: &State) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        match state.screen {
            Screen::Login => {
                out.extend(["login:username", "login:password", "login:button"].map(String::from));
                if state.login_error.is_some() {
                    out.push("login:error".into());
                }
            }
            Screen::Inventory => {
                Self::header(state, &mut out);
                out.push("inv:sort".into());
                out.push("inv:active".into());
                if state.banner.is_some() {
                    out.push("inv:error".into());
                }
                out.push("inv:list".into());
                for name in Self::sorted_names(state) {
                    for kind in ["row", "img", "name", "desc", "price"] {
                        out.push(format!("{}:{}", kind, name));
                    }
                    if state.cart.contains(&name) {
                        out.push(format!("remove:{}", name));
                    } else {
                        out.push(format!("add:{}", name));
                    }
                }
            }
            Screen::Cart => {
                Self::header(state, &mut out);
                out.push("cart:list".into());
                for name in &state.cart {
                    for kind in ["cartrow", "cartqty", "cartname", "cartprice", "cartremove"] {
                        out.push(format!("{}:{}", kind, name));
                    }
                }
                out.push("cart:continue".into());
                out.push("cart:checkout".into());
            }
            Screen::CheckoutInfo => {
                Self::header(state, &mut out);
                out.extend(["info:first", "info:last", "info:postal"].map(String::from));
                if state.checkout_error.is_some() {
                    out.push("info:error".into());
                }
                out.extend(["info:cancel", "info:continue"].map(String::from));
            }
            Screen::Review => {
                Self::header(state, &mut out);
                for name in &state.cart {
                    out.push(format!("reviewname:{}", name));
                }
                out.extend(
                    [
                        "review:summary",
                        "review:payment",
                        "review:shipping",
                        "review:subtotal",
                        "review:tax",
                        "review:total",
                        "review:cancel",
                        "review:finish",
                    ]
                    .map(String::from),
                );
            }
            Screen::Complete => {
                Self::header(state, &mut out);
                out.extend(["done:header", "done:text", "done:back"].map(String::from));
            }
        }
        out
    }

    /// Patterns for an unscoped selector; a trailing `:` matches by prefix.
    fn patterns(css: &str) -> Vec<&'static str> {
        match css {
            r#"[data-test="username"]"# => vec!["login:username"],
            r#"[data-test="password"]"# => vec!["login:password"],
            r#"[data-test="login-button"]"# => vec!["login:button"],
            r#"[data-test="error"]"# => vec!["login:error", "inv:error", "info:error"],
            ".inventory_list" => vec!["inv:list"],
            ".inventory_item" => vec!["row:"],
            ".inventory_item_name" => vec!["name:"],
            ".inventory_item_price" => vec!["price:"],
            "img.inventory_item_img" => vec!["img:"],
            r#"[data-test="product-sort-container"]"# => vec!["inv:sort"],
            r#"[data-test="active-option"]"# => vec!["inv:active"],
            ".shopping_cart_badge" => vec!["hdr:badge"],
            ".shopping_cart_link" => vec!["hdr:cartlink"],
            "#react-burger-menu-btn" => vec!["hdr:menu"],
            "#react-burger-cross-btn" => vec!["menu:close"],
            "#reset_sidebar_link" => vec!["menu:reset"],
            "#logout_sidebar_link" => vec!["menu:logout"],
            REMOVE_BUTTON => vec!["remove:", "cartremove:"],
            ".cart_list" => vec!["cart:list"],
            ".cart_item" => vec!["cartrow:"],
            ".cart_item .inventory_item_name" => vec!["cartname:", "reviewname:"],
            ".cart_item .inventory_item_price" => vec!["cartprice:"],
            r#"[data-test="checkout"]"# => vec!["cart:checkout"],
            r#"[data-test="continue-shopping"]"# => vec!["cart:continue"],
            r#"[data-test="firstName"]"# => vec!["info:first"],
            r#"[data-test="lastName"]"# => vec!["info:last"],
            r#"[data-test="postalCode"]"# => vec!["info:postal"],
            r#"[data-test="continue"]"# => vec!["info:continue"],
            r#"[data-test="cancel"]"# => vec!["info:cancel", "review:cancel"],
            ".summary_info" => vec!["review:summary"],
            r#"[data-test="subtotal-label"]"# => vec!["review:subtotal"],
            r#"[data-test="tax-label"]"# => vec!["review:tax"],
            r#"[data-test="total-label"]"# => vec!["review:total"],
            r#"[data-test="payment-info-value"]"# => vec!["review:payment"],
            r#"[data-test="shipping-info-value"]"# => vec!["review:shipping"],
            r#"[data-test="finish"]"# => vec!["review:finish"],
            r#"[data-test="complete-header"]"# => vec!["done:header"],
            r#"[data-test="complete-text"]"# => vec!["done:text"],
            r#"[data-test="back-to-products"]"# => vec!["done:back"],
            _ => vec![],
        }
    }

    fn scoped_kind(row_css: &str, css: &str) -> Option<&'static str> {
        match (row_css, css) {
            (".inventory_item", ".inventory_item") => Some("row"),
            (".inventory_item", ".inventory_item_name") => Some("name"),
            (".inventory_item", ".inventory_item_price") => Some("price"),
            (".inventory_item", ".inventory_item_desc") => Some("desc"),
            (".inventory_item", "img.inventory_item_img") => Some("img"),
            (".inventory_item", ADD_BUTTON) => Some("add"),
            (".inventory_item", REMOVE_BUTTON) => Some("remove"),
            (".cart_item", ".cart_item") => Some("cartrow"),
            (".cart_item", ".inventory_item_price") => Some("cartprice"),
            (".cart_item", ".cart_quantity") => Some("cartqty"),
            (".cart_item", REMOVE_BUTTON) => Some("cartremove"),
            _ => None,
        }
    }

    fn matches(state: &State, selector: &Selector) -> Vec<ElementHandle> {
        let nodes = Self::nodes(state);
        let wanted: Vec<String> = match &selector.within {
            Some(scope) => {
                let Some(kind) = Self::scoped_kind(&scope.css, &selector.css) else {
                    return Vec::new();
                };
                catalog()
                    .into_iter()
                    .filter(|(n, _)| n.contains(scope.has_text.as_str()))
                    .map(|(n, _)| format!("{}:{}", kind, n))
                    .collect()
            }
            None => {
                let patterns = Self::patterns(&selector.css);
                return nodes
                    .into_iter()
                    .filter(|node| {
                        patterns.iter().any(|p| {
                            if p.ends_with(':') {
                                node.starts_with(p)
                            } else {
                                node == p
                            }
                        })
                    })
                    .map(ElementHandle)
                    .collect();
            }
        };
        nodes
            .into_iter()
            .filter(|node| wanted.contains(node))
            .map(ElementHandle)
            .collect()
    }

    fn present(state: &State, handle: &ElementHandle) -> Result<(), DriverError> {
        if Self::nodes(state).contains(&handle.0) {
            Ok(())
        } else {
            Err(DriverError::StaleHandle(handle.0.clone()))
        }
    }

    fn image_src(&self, state: &State, name: &str) -> String {
        let slug: String = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect();
        match state.user {
            Some(Persona::Problem) => "/static/media/sl-404.168b1cce.jpg".into(),
            Some(Persona::Visual) if self.options.visual_drift && name == "Sauce Labs Backpack" => {
                "/static/media/sl-404.168b1cce.jpg".into()
            }
            _ => format!("/static/media/{}.jpg", slug),
        }
    }

    fn text(&self, state: &State, node: &str) -> Option<String> {
        let (kind, arg) = node.split_once(':').unwrap_or((node, ""));
        let subtotal = Self::subtotal(state);
        let tax = (subtotal * Decimal::new(8, 2)).round_dp(2);
        let text = match (kind, arg) {
            ("name" | "cartname" | "reviewname", n) => n.to_string(),
            ("row" | "cartrow", n) => format!("{} {}", n, format_price(Self::price(n))),
            ("price" | "cartprice", n) => format_price(Self::price(n)),
            ("desc", n) => format!("A fine {}.", n),
            ("add", _) => "Add to cart".into(),
            ("remove" | "cartremove", _) => "Remove".into(),
            ("cartqty", _) => "1".into(),
            ("hdr", "badge") => state.badge_shown.to_string(),
            ("login", "error") => state.login_error.clone()?,
            ("inv", "error") => state.banner.clone()?,
            ("info", "error") => state.checkout_error.clone()?,
            ("inv", "active") => state.sort.label().to_string(),
            ("review", "subtotal") => {
                format!("Item total: {}", format_price(subtotal + self.options.subtotal_skew))
            }
            ("review", "tax") => format!("Tax: {}", format_price(tax)),
            ("review", "total") => format!(
                "Total: {}",
                format_price(subtotal + self.options.subtotal_skew + tax + self.options.total_skew)
            ),
            ("review", "payment") => "SauceCard #31337".into(),
            ("review", "shipping") => "Free Pony Express Delivery!".into(),
            ("done", "header") => "Thank you for your order!".into(),
            ("done", "text") => COMPLETE_TEXT.into(),
            _ => String::new(),
        };
        Some(text)
    }

    fn login(&self, state: &mut State) {
        let error = if state.username.is_empty() {
            Some(USERNAME_REQUIRED)
        } else if state.password.is_empty() {
            Some(PASSWORD_REQUIRED)
        } else {
            match Persona::from_username(&state.username) {
                Some(_) if state.password != STANDARD_PASSWORD => Some(BAD_CREDENTIALS),
                None => Some(BAD_CREDENTIALS),
                Some(Persona::LockedOut) => Some(LOCKED_OUT),
                Some(persona) => {
                    state.user = Some(persona);
                    if persona == Persona::PerformanceGlitch {
                        state.landing_at = Some(Instant::now() + self.options.glitch_delay);
                    } else {
                        state.screen = Screen::Inventory;
                    }
                    None
                }
            }
        };
        state.login_error = error.map(String::from);
    }

    fn continue_checkout(&self, state: &mut State) {
        let mut checks = [
            (state.first_name.is_empty(), "Error: First Name is required"),
            (state.last_name.is_empty(), "Error: Last Name is required"),
            (state.postal_code.is_empty(), "Error: Postal Code is required"),
        ];
        if self.options.reversed_validation {
            checks.reverse();
        }
        let error = checks
            .into_iter()
            .find(|(missing, _)| *missing)
            .map(|(_, message)| message);
        match error {
            Some(e) => state.checkout_error = Some(e.to_string()),
            None => {
                state.checkout_error = None;
                state.screen = Screen::Review;
            }
        }
    }
}

#[async_trait]
impl AutomationDriver for FakeStore {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.with_state(|state| {
            state.menu_open = false;
            state.banner = None;
            if url.ends_with("inventory.html") && state.user.is_some() {
                state.screen = Screen::Inventory;
            } else {
                state.screen = Screen::Login;
                state.user = None;
                state.landing_at = None;
                state.username.clear();
                state.password.clear();
                state.login_error = None;
            }
            Ok(())
        })
    }

    async fn resolve(&self, selector: &Selector) -> Result<Vec<ElementHandle>, DriverError> {
        self.with_state(|state| Ok(Self::matches(state, selector)))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            let (kind, arg) = element.0.split_once(':').unwrap_or((element.0.as_str(), ""));
            let is_error_user = state.user == Some(Persona::Error);
            match (kind, arg) {
                ("login", "button") => self.login(state),
                ("add", name) => {
                    if !state.cart.iter().any(|n| n == name) {
                        state.cart.push(name.to_string());
                    }
                }
                ("remove" | "cartremove", name) => {
                    if !is_error_user {
                        state.cart.retain(|n| n != name);
                    }
                }
                ("hdr", "cartlink") => state.screen = Screen::Cart,
                ("hdr", "menu") => state.menu_open = true,
                ("menu", "close") => state.menu_open = false,
                ("menu", "reset") => state.cart.clear(),
                ("menu", "logout") => {
                    state.menu_open = false;
                    state.user = None;
                    state.username.clear();
                    state.password.clear();
                    state.screen = Screen::Login;
                }
                ("cart", "checkout") => {
                    state.first_name.clear();
                    state.last_name.clear();
                    state.postal_code.clear();
                    state.checkout_error = None;
                    state.screen = Screen::CheckoutInfo;
                }
                ("cart", "continue") => state.screen = Screen::Inventory,
                ("info", "continue") => self.continue_checkout(state),
                ("info", "cancel") => state.screen = Screen::Cart,
                ("review", "cancel") => state.screen = Screen::Inventory,
                ("review", "finish") => {
                    state.cart.clear();
                    state.screen = Screen::Complete;
                }
                ("done", "back") => state.screen = Screen::Inventory,
                _ => {}
            }
            Ok(())
        })
    }

    async fn fill(&self, element: &ElementHandle, text: &str) -> Result<(), DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            match element.0.as_str() {
                "login:username" => state.username = text.to_string(),
                "login:password" => state.password = text.to_string(),
                "info:first" => state.first_name = text.to_string(),
                "info:last" => state.last_name = text.to_string(),
                "info:postal" => state.postal_code = text.to_string(),
                "inv:sort" => {
                    if state.user == Some(Persona::Error) {
                        state.banner = Some(SORT_ERROR.to_string());
                    } else if let Some(criterion) = SortCriterion::parse(text) {
                        state.sort = criterion;
                    }
                }
                other => {
                    return Err(DriverError::Protocol {
                        command: "fill".into(),
                        error: format!("{} is not fillable", other),
                    });
                }
            }
            Ok(())
        })
    }

    async fn read_text(&self, element: &ElementHandle) -> Result<Option<String>, DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            Ok(self.text(state, &element.0))
        })
    }

    async fn read_attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            match (element.0.split_once(':'), name) {
                (Some(("img", product)), "src") => Ok(Some(self.image_src(state, product))),
                _ => Ok(None),
            }
        })
    }

    async fn is_visible(&self, element: &ElementHandle) -> Result<bool, DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            Ok(true)
        })
    }

    async fn bounding_box(&self, element: &ElementHandle) -> Result<Option<Rect>, DriverError> {
        self.with_state(|state| {
            Self::present(state, element)?;
            if element.0 != "hdr:cartlink" {
                return Ok(None);
            }
            let shifted = state.user == Some(Persona::Visual) && self.options.visual_drift;
            Ok(Some(Rect {
                x: if shifted { 1_180.0 } else { 1_200.0 },
                y: if shifted { 22.0 } else { 10.0 },
                width: 40.0,
                height: 40.0,
            }))
        })
    }

    async fn close(&self) -> Result<(), DriverError> {
        let mut state = self.state.lock().unwrap();
        if !state.closed {
            state.closed = true;
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Opens one [`FakeStore`] per page and counts opens and closes.
pub struct FakeStoreFactory {
    pub options: StoreOptions,
    pub opened: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
    pub pages: Mutex<Vec<Arc<FakeStore>>>,
    pub fail_open: bool,
}

impl FakeStoreFactory {
    pub fn new() -> Arc<Self> {
        Self::with_options(StoreOptions::default())
    }

    pub fn with_options(options: StoreOptions) -> Arc<Self> {
        Arc::new(Self {
            options,
            opened: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            pages: Mutex::new(Vec::new()),
            fail_open: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            options: StoreOptions::default(),
            opened: AtomicUsize::new(0),
            closes: Arc::new(AtomicUsize::new(0)),
            pages: Mutex::new(Vec::new()),
            fail_open: true,
        })
    }

    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn last_page(&self) -> Option<Arc<FakeStore>> {
        self.pages.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PageFactory for FakeStoreFactory {
    async fn open_page(&self) -> Result<Arc<dyn AutomationDriver>, DriverError> {
        if self.fail_open {
            return Err(DriverError::Io("no browser available".into()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let page = Arc::new(FakeStore::new(self.options.clone(), self.closes.clone()));
        self.pages.lock().unwrap().push(page.clone());
        Ok(page)
    }
}
