//! EnglishTopia camp site pipeline.
//! Batch-loads the site documents, renders them into the page skeleton and wires the
//! page interactions (FAQ accordion, scroll-spy, anchor scrolling, image fallbacks,
//! chat widget, phone links) over a headless document tree and virtual clock.

pub mod config;
pub mod data;
pub mod dom;
pub mod fetch;
pub mod interact;
pub mod markup;
pub mod page;
pub mod placeholder;
pub mod render;
pub mod timers;

pub use config::SiteConfig;
pub use data::SiteData;
pub use fetch::{DirSource, DocumentSource, HttpSource, LoadError, MemorySource, load_all};
pub use page::{Effect, Page};
