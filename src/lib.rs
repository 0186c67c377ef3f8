//! Persona-aware end-to-end journeys against a demo storefront.
//!
//! Layers, top to bottom: [`scenario`] runs YAML journeys through [`flow`], which
//! composes the screen modules in [`pages`]; those act through the condition waits in
//! [`sync`] on a page owned by a [`browser::Session`].

pub mod browser;
pub mod cli;
pub mod error;
pub mod fixtures;
pub mod flow;
pub mod model;
pub mod pages;
pub mod report;
pub mod scenario;
pub mod sync;

pub use error::{JourneyError, Result};
