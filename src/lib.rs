//! Folio - feed and sitemap publisher for sectioned content.
//!
//! The `folio` binary drives everything from `folio.toml`. The same pipeline
//! is available programmatically, where a feed can also take a predicate and
//! an entry renderer that config cannot express:
//!
//! ```ignore
//! use folio::{build::run_generators, generator::{FeedGenerator, Generator}, predicate::Predicate};
//!
//! let rust = FeedGenerator::from_config(feed_config)?
//!     .with_predicate(Predicate::tagged("rust") & !Predicate::in_section("drafts"));
//! let generators: Vec<Box<dyn Generator>> = vec![Box::new(rust)];
//! run_generators(&ctx, &generators)?;
//! ```

pub mod build;
pub mod cli;
pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod generator;
pub mod logger;
pub mod predicate;
pub mod utils;
