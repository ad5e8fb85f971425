//! Service facade wiring fetcher, builder, coalescer and cache together.
//!
//! # Example
//!
//! ```ignore
//! use thumbsheet::config::ConfigFile;
//! use thumbsheet::service::SheetService;
//!
//! let service = SheetService::from_config(&ConfigFile::load()?)?;
//! let request = service.sheet_request("cat", None, None, None)?;
//! let artifact = service.regenerate(request).await?;
//! ```

mod config;
mod error;
mod facade;

pub use config::ServiceConfig;
pub use error::{RequestError, ServiceError};
pub use facade::{SheetService, UpstreamSheetService};
