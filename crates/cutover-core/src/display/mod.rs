//! Display formatting for models and operation results.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! this module adds newtype wrappers for collections and for the outcome of
//! operations, so the same data can be rendered differently in a listing, a
//! detail view or a confirmation. All output is markdown, rendered by the
//! CLI's terminal renderer.
//!
//! - [`collections`]: `Plans`, `Executions`, `Steps`
//! - [`results`]: `CreateResult`, `UpdateResult`, `StepReport`
//! - [`status`]: `OperationStatus` confirmations
//! - [`datetime`]: local time formatting
//! - [`models`]: Display implementations for domain models
//!
//! ```rust
//! use cutover_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Deleted execution 4");
//! assert_eq!(status.to_string(), "Success: Deleted execution 4\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod results;
pub mod status;

pub use collections::{Executions, Plans, Steps};
pub use datetime::LocalDateTime;
pub use results::{CreateResult, StepReport, UpdateResult};
pub use status::OperationStatus;
