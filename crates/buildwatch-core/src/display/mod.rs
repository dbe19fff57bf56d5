//! Display formatting for terminal front-ends.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and contextual views get wrapper types such as
//! [`SnapshotTable`]. All output is markdown so a renderer can style it.
//!
//! - [`snapshot`]: plan listing for a whole snapshot
//! - [`datetime`]: timestamp formatting in the local timezone
//! - [`models`]: Display implementations for domain models

pub mod datetime;
pub mod models;
pub mod snapshot;

pub use datetime::LocalDateTime;
pub use snapshot::SnapshotTable;
