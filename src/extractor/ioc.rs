// file: src/extractor/ioc.rs
// description: indicators of compromise extraction (ip, domain, md5, sha1, sha256)
// reference: threat intelligence ioc standards

use crate::extractor::patterns::{DOMAIN, IP_ADDRESS, MD5_HASH, SHA1_HASH, SHA256_HASH};
use crate::models::{Ioc, IocType};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// Scan order; a value matched by several scans keeps the first kind.
const SCANS: [IocType; 5] = [
    IocType::Ip,
    IocType::Domain,
    IocType::Md5,
    IocType::Sha1,
    IocType::Sha256,
];

/// Stateless regex scanner. Matches are purely syntactic: no octet range
/// checks, no TLD list, and hex runs are classified by width alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct IocExtractor;

impl IocExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Union of all scans, de-duplicated.
    pub fn extract_iocs(&self, text: &str) -> BTreeSet<String> {
        SCANS
            .iter()
            .flat_map(|kind| pattern_for(*kind).find_iter(text))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Same matches as [`extract_iocs`](Self::extract_iocs), tagged with the
    /// kind of the first scan that produced them, in scan order.
    pub fn extract_typed(&self, text: &str) -> Vec<Ioc> {
        let mut seen = HashSet::new();
        let mut iocs = Vec::new();

        for kind in SCANS {
            for capture in pattern_for(kind).find_iter(text) {
                let value = capture.as_str();
                if seen.insert(value.to_string()) {
                    iocs.push(Ioc::new(kind, value));
                }
            }
        }

        iocs
    }
}

pub fn extract_iocs(text: &str) -> BTreeSet<String> {
    IocExtractor::new().extract_iocs(text)
}

fn pattern_for(kind: IocType) -> &'static Regex {
    match kind {
        IocType::Ip => &IP_ADDRESS,
        IocType::Domain => &DOMAIN,
        IocType::Md5 => &MD5_HASH,
        IocType::Sha1 => &SHA1_HASH,
        IocType::Sha256 => &SHA256_HASH,
    }
}
