pub mod wait;

pub use wait::{Budget, TimeoutPolicy, Waiter};
