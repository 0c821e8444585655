use crate::error::CidrError;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use std::borrow::Cow;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;
use std::hash::{Hash, Hasher};
use std::net::Ipv4Addr;
use std::str::FromStr;

pub const MAX_PREFIX: u8 = 32;

/// An IPv4 address with a prefix length, as typed by the user.
///
/// The address is kept as given, so `10.1.2.3/8` prints back unchanged.
/// Equality and hashing look only at the inclusive range the block
/// denotes, which makes `10.1.2.3/8` equal to `10.0.0.0/8`.
#[derive(Clone, Copy, Debug)]
pub struct CidrRange {
    octets: [u8; 4],
    prefix: u8,
}

fn mask_of(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (MAX_PREFIX - p),
    }
}

impl CidrRange {
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, CidrError> {
        if prefix > MAX_PREFIX {
            return Err(CidrError::Prefix(prefix.to_string()));
        }
        Ok(CidrRange {
            octets: addr.octets(),
            prefix,
        })
    }

    /// Canonical block with host bits cleared. `prefix` must not exceed 32.
    pub(crate) fn block(net: u32, prefix: u8) -> Self {
        debug_assert!(prefix <= MAX_PREFIX);
        CidrRange {
            octets: (net & mask_of(prefix)).to_be_bytes(),
            prefix,
        }
    }

    /// Parses `A.B.C.D` or `A.B.C.D/N`, returning `None` for anything else.
    ///
    /// A bare address is a single host, i.e. `/32`. Use `str::parse` instead
    /// to learn why a string was rejected.
    pub fn parse(text: &str) -> Option<Self> {
        match text.parse() {
            Ok(cidr) => Some(cidr),
            Err(e) => {
                debug!("Rejected {:?}: {}", text, e);
                None
            }
        }
    }

    pub fn octets(&self) -> [u8; 4] {
        self.octets
    }

    pub fn address(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.octets)
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix
    }

    pub fn mask(&self) -> u32 {
        mask_of(self.prefix)
    }

    /// First and last address of the block, inclusive.
    pub fn to_range(&self) -> (u32, u32) {
        let mask = self.mask();
        let net = u32::from(self.address()) & mask;
        (net, net | !mask)
    }

    pub fn first_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.to_range().0)
    }

    pub fn last_ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.to_range().1)
    }

    pub fn from_address(&self) -> String {
        self.first_ip().to_string()
    }

    pub fn to_address(&self) -> String {
        self.last_ip().to_string()
    }

    /// Number of addresses in the block.
    pub fn size(&self) -> u64 {
        1u64 << (MAX_PREFIX - self.prefix)
    }

    pub fn network(&self) -> CidrRange {
        CidrRange::block(u32::from(self.address()), self.prefix)
    }

    pub fn equals(&self, other: Option<&CidrRange>) -> bool {
        other.map_or(false, |o| self == o)
    }

    pub fn contains_ip(&self, ip: &Ipv4Addr) -> bool {
        let (from, to) = self.to_range();
        let ip = u32::from(*ip);
        from <= ip && ip <= to
    }

    pub fn contains_cidr(&self, cidr: &CidrRange) -> bool {
        let (from, to) = self.to_range();
        let (f, t) = cidr.to_range();
        from <= f && t <= to
    }

    pub fn overlaps(&self, cidr: &CidrRange) -> bool {
        let (from, to) = self.to_range();
        let (f, t) = cidr.to_range();
        from <= t && f <= to
    }
}

impl PartialEq for CidrRange {
    fn eq(&self, other: &Self) -> bool {
        self.to_range() == other.to_range()
    }
}

impl Eq for CidrRange {}

impl Hash for CidrRange {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_range().hash(state);
    }
}

impl FromStr for CidrRange {
    type Err = CidrError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lazy_static! {
            static ref RE: Regex = Regex::new(
                r"^([0-9]+)\.([0-9]+)\.([0-9]+)\.([0-9]+)/([0-9]+)$"
            )
            .expect("Not possible");
        }
        let text = if s.contains('/') {
            Cow::Borrowed(s)
        } else {
            Cow::Owned(format!("{}/{}", s, MAX_PREFIX))
        };
        let caps = RE
            .captures(&text)
            .ok_or_else(|| CidrError::Format(s.to_owned()))?;
        let group = |ind: usize| caps.get(ind).map_or("", |m| m.as_str());

        let mut octets = [0u8; 4];
        for (i, octet) in octets.iter_mut().enumerate() {
            let raw = group(i + 1);
            *octet = raw.parse().map_err(|_| CidrError::Octet(raw.to_owned()))?;
        }
        let raw = group(5);
        let prefix = raw
            .parse::<u8>()
            .ok()
            .filter(|p| *p <= MAX_PREFIX)
            .ok_or_else(|| CidrError::Prefix(raw.to_owned()))?;
        Ok(CidrRange { octets, prefix })
    }
}

impl Display for CidrRange {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        write!(f, "{}/{}", self.address(), self.prefix)
    }
}
