//! The host side of the update flow.
//!
//! - [`InstalledUnits`] enumerates what is installed and maps component
//!   names onto unit identifiers
//! - [`UpdateTransient`] is the published set of update descriptors that an
//!   installer consumes

pub mod transient;
pub mod units;

pub use transient::{UpdateDescriptor, UpdateTransient};
pub use units::{DirectoryUnits, InstalledUnits};
