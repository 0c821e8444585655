//! IPv4 CIDR ranges for access-control lists.
//!
//! [`CidrRange`] parses and formats a single block, [`AccessList`] keeps the
//! ordered, duplicate-free entries of an editor and [`CidrSet`] coalesces
//! blocks into the smallest cover.

pub mod error;
pub mod ipv4;
pub mod list;
pub mod set;

pub use error::{AccessListError, CidrError};
pub use ipv4::CidrRange;
pub use list::AccessList;
pub use set::CidrSet;
