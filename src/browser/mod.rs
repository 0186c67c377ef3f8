pub mod driver;
pub mod server;
pub mod session;

pub use driver::{AutomationDriver, ElementHandle, PageFactory, Rect, Selector};
pub use session::{Session, SessionContext, with_session};
