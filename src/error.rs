use crate::ipv4::CidrRange;
use thiserror::Error;

/// Why a piece of text is not a CIDR range.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CidrError {
    #[error("invalid CIDR format: {0:?}")]
    Format(String),
    #[error("octet {0} is not within 0-255")]
    Octet(String),
    #[error("prefix length {0} is not within 0-32")]
    Prefix(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessListError {
    #[error(transparent)]
    Invalid(#[from] CidrError),
    #[error("{0} is already in the list")]
    Duplicate(CidrRange),
}
