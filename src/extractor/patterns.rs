// file: src/extractor/patterns.rs
// description: compiled regex patterns for indicator extraction
// reference: https://docs.rs/regex

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Dotted quad without octet range validation; 999.999.999.999 matches.
    pub static ref IP_ADDRESS: Regex = Regex::new(
        r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b"
    ).expect("IP_ADDRESS regex is valid");

    // Lowercase-only, unanchored against surrounding tokens.
    pub static ref DOMAIN: Regex = Regex::new(
        r"\b(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z0-9][a-z0-9-]{0,61}[a-z0-9]\b"
    ).expect("DOMAIN regex is valid");

    // File hashes
    pub static ref MD5_HASH: Regex = Regex::new(
        r"(?i)\b[a-f0-9]{32}\b"
    ).expect("MD5_HASH regex is valid");

    pub static ref SHA1_HASH: Regex = Regex::new(
        r"(?i)\b[a-f0-9]{40}\b"
    ).expect("SHA1_HASH regex is valid");

    pub static ref SHA256_HASH: Regex = Regex::new(
        r"(?i)\b[a-f0-9]{64}\b"
    ).expect("SHA256_HASH regex is valid");
}

pub fn is_private_ip(ip: &str) -> bool {
    let octets: Vec<u16> = ip.split('.').filter_map(|p| p.parse().ok()).collect();
    match octets.as_slice() {
        [10, _, _, _] | [127, _, _, _] => true,
        [172, second, _, _] => (16..=31).contains(second),
        [192, 168, _, _] | [169, 254, _, _] => true,
        _ => false,
    }
}
