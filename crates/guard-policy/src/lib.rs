//! Asset Guard Policies
//!
//! Path-pattern policies that decide which rules apply to a build asset.
//!
//! # Core Concepts
//!
//! - [`Policy`]: size, dimension and naming rules bound to a regex
//! - [`PolicyTable`]: ordered list of policies, matched in definition order
//! - [`PolicySpec`]: serde model used by configuration files
//! - [`NamingConvention`]: which file names count as well-formed
//!
//! # Example
//!
//! ```rust,ignore
//! use guard_policy::PolicyTable;
//!
//! let table = PolicyTable::defaults();
//! for policy in table.matching("assets/images/Hero.png") {
//!     println!("{}", policy.pattern());
//! }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod naming;
mod policy;
mod table;

pub use error::PolicyError;
pub use naming::NamingConvention;
pub use policy::{DimensionBounds, Policy, PolicySpec};
pub use table::PolicyTable;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
