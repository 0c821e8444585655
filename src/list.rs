use crate::error::AccessListError;
use crate::ipv4::CidrRange;
use crate::set::CidrSet;
use log::debug;
use std::fmt::Display;
use std::fmt::Error;
use std::fmt::Formatter;
use std::iter::FromIterator;
use std::net::Ipv4Addr;

/// Ranges accepted by an access-control editor, in the order they were added.
///
/// No two entries denote the same range.
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    entries: Vec<CidrRange>,
}

impl AccessList {
    pub fn new() -> Self {
        AccessList {
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CidrRange> {
        self.entries.iter()
    }

    /// Parses `text` and appends it, returning the stored range.
    pub fn add(&mut self, text: &str) -> Result<CidrRange, AccessListError> {
        let cidr: CidrRange = text.parse()?;
        self.insert(cidr)?;
        Ok(cidr)
    }

    pub fn insert(&mut self, cidr: CidrRange) -> Result<(), AccessListError> {
        if let Some(existing) = self.entries.iter().find(|e| cidr.equals(Some(*e))) {
            return Err(AccessListError::Duplicate(*existing));
        }
        debug!(
            "Adding {} ({} - {})",
            cidr,
            cidr.from_address(),
            cidr.to_address()
        );
        self.entries.push(cidr);
        Ok(())
    }

    pub fn remove(&mut self, cidr: &CidrRange) -> bool {
        match self.entries.iter().position(|e| e == cidr) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    pub fn allows(&self, ip: &Ipv4Addr) -> bool {
        self.entries.iter().any(|e| e.contains_ip(ip))
    }

    pub fn matching<'a>(
        &'a self,
        ip: &'a Ipv4Addr,
    ) -> impl Iterator<Item = &'a CidrRange> + 'a {
        self.entries.iter().filter(move |e| e.contains_ip(ip))
    }

    pub fn summarize(&self) -> CidrSet {
        self.entries.iter().copied().collect()
    }
}

impl Display for AccessList {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        for v in self.entries.iter() {
            writeln!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl FromIterator<CidrRange> for AccessList {
    fn from_iter<I: IntoIterator<Item = CidrRange>>(iter: I) -> Self {
        let mut list = AccessList::new();
        list.extend(iter);
        list
    }
}

impl Extend<CidrRange> for AccessList {
    fn extend<I: IntoIterator<Item = CidrRange>>(&mut self, iter: I) {
        for cidr in iter {
            if let Err(e) = self.insert(cidr) {
                debug!("Skipped {}: {}", cidr, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CidrError;

    #[test]
    fn some_tests() {
        let mut list = AccessList::new();
        assert!(list.is_empty());
        assert_eq!(
            "192.168.1.0/24",
            list.add("192.168.1.0/24").unwrap().to_string()
        );
        assert_eq!("10.0.0.5/32", list.add("10.0.0.5").unwrap().to_string());
        assert_eq!(2, list.len());
        assert_eq!("192.168.1.0/24\n10.0.0.5/32\n", list.to_string());
    }

    #[test]
    fn rejects_invalid_and_duplicates() {
        let mut list = AccessList::new();
        list.add("192.168.1.0/24").unwrap();

        assert_eq!(
            Err(AccessListError::Invalid(CidrError::Octet("256".to_owned()))),
            list.add("256.0.0.1/24")
        );
        match list.add("192.168.1.99/24") {
            Err(AccessListError::Duplicate(existing)) => {
                assert_eq!("192.168.1.0/24", existing.to_string())
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(1, list.len());

        // overlapping but not equal ranges are separate entries
        list.add("192.168.0.0/16").unwrap();
        assert_eq!(2, list.len());

        let list: AccessList = ["10.0.0.0/8", "10.9.9.9/8", "10.0.0.0/9"]
            .iter()
            .filter_map(|s| CidrRange::parse(s))
            .collect();
        assert_eq!("10.0.0.0/8\n10.0.0.0/9\n", list.to_string());
    }

    #[test]
    fn extend_skips_duplicates() {
        let mut list = AccessList::new();
        list.add("10.0.0.0/8").unwrap();
        list.extend(
            ["10.1.2.3/8", "192.168.0.0/16", "192.168.9.9/16"]
                .iter()
                .filter_map(|s| CidrRange::parse(s)),
        );
        assert_eq!("10.0.0.0/8\n192.168.0.0/16\n", list.to_string());
    }

    #[test]
    fn lookup_and_remove() {
        let mut list = AccessList::new();
        list.add("10.0.0.0/8").unwrap();
        list.add("10.1.0.0/16").unwrap();
        list.add("172.16.0.1").unwrap();

        let ip = Ipv4Addr::new(10, 1, 2, 3);
        assert!(list.allows(&ip));
        assert_eq!(2, list.matching(&ip).count());
        assert!(!list.allows(&Ipv4Addr::new(172, 16, 0, 2)));

        assert!(list.remove(&CidrRange::parse("10.255.0.0/8").unwrap()));
        assert!(!list.remove(&CidrRange::parse("10.0.0.0/8").unwrap()));
        assert_eq!(1, list.matching(&ip).count());
        assert_eq!(2, list.len());
    }

    #[test]
    fn summary() {
        let mut list = AccessList::new();
        for s in &["10.0.0.0/25", "10.0.0.128/25", "10.0.0.5", "192.168.0.0/16"] {
            list.add(s).unwrap();
        }
        assert_eq!(4, list.len());
        assert_eq!(
            "10.0.0.0/24\n192.168.0.0/16\n",
            list.summarize().to_string()
        );
    }
}
