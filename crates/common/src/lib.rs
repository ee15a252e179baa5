//! Common utilities and shared types for sharegraph.
//!
//! This crate provides foundational components used across all sharegraph crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: The error taxonomy via [`AppError`] and [`AppResult`]
//! - **Pagination**: Clamped page windows via [`PageRequest`] and [`Page`]
//! - **Metrics**: Request and domain counters via [`Metrics`]
//!
//! # Example
//!
//! ```no_run
//! use sharegraph_common::{AppResult, Config, PageRequest};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let window = PageRequest::new(0, 500).clamp();
//!     println!("{} rows from offset {}", window.limit(), window.offset());
//!     println!("listening on {}:{}", config.server.host, config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod pagination;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use metrics::{Metrics, MetricsSnapshot, Timer};
pub use pagination::{Page, PageRequest};
