use crate::ipv4::{CidrRange, MAX_PREFIX};
use log::trace;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;
use std::iter::FromIterator;
use std::net::Ipv4Addr;

/// The smallest set of canonical blocks covering everything inserted.
///
/// Blocks are keyed by network address and never overlap. Inserting a
/// block absorbs the blocks it covers, and two sibling blocks of equal
/// size are merged into their parent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CidrSet {
    inner: BTreeMap<u32, CidrRange>,
}

impl Display for CidrSet {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        for v in self.inner.values() {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl CidrSet {
    pub fn new() -> Self {
        CidrSet {
            inner: BTreeMap::new(),
        }
    }

    /// Covers the inclusive range `from..=to`. Empty when `from > to`.
    pub fn from_range(from: Ipv4Addr, to: Ipv4Addr) -> Self {
        let mut set = CidrSet::new();
        let mut start = u64::from(u32::from(from));
        let end = u64::from(u32::from(to));
        while start <= end {
            let mut size = if start == 0 {
                u32::from(MAX_PREFIX)
            } else {
                start.trailing_zeros()
            };
            while start + (1u64 << size) - 1 > end {
                size -= 1;
            }
            set.insert(CidrRange::block(start as u32, MAX_PREFIX - size as u8));
            start += 1u64 << size;
        }
        set
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Blocks in ascending address order.
    pub fn iter(&self) -> impl Iterator<Item = &CidrRange> {
        self.inner.values()
    }

    pub fn contains_ip(&self, ip: &Ipv4Addr) -> bool {
        self.inner
            .range(..=u32::from(*ip))
            .next_back()
            .map_or(false, |(_, v)| v.contains_ip(ip))
    }

    pub fn insert(&mut self, cidr: CidrRange) {
        let mut cidr = cidr.network();
        loop {
            //Search
            if self.inner.values().any(|v| v.contains_cidr(&cidr)) {
                return;
            }
            //Remove
            self.inner.retain(|_, v| !cidr.contains_cidr(v));
            //Merge
            let prefix = cidr.prefix_len();
            if prefix > 0 {
                let net = cidr.to_range().0;
                let pair = net ^ (1u32 << (MAX_PREFIX - prefix));
                if let Some(v) = self.inner.get(&pair) {
                    if v.prefix_len() == prefix {
                        trace!("Merging {} with {}", cidr, v);
                        self.inner.remove(&pair);
                        cidr = CidrRange::block(net, prefix - 1);
                        continue;
                    }
                }
            }
            self.inner.insert(cidr.to_range().0, cidr);
            break;
        }
    }
}

impl FromIterator<CidrRange> for CidrSet {
    fn from_iter<I: IntoIterator<Item = CidrRange>>(iter: I) -> Self {
        let mut set = CidrSet::new();
        set.extend(iter);
        set
    }
}

impl Extend<CidrRange> for CidrSet {
    fn extend<I: IntoIterator<Item = CidrRange>>(&mut self, iter: I) {
        for cidr in iter {
            self.insert(cidr);
        }
    }
}

impl IntoIterator for CidrSet {
    type Item = CidrRange;
    type IntoIter = std::collections::btree_map::IntoValues<u32, CidrRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_values()
    }
}
