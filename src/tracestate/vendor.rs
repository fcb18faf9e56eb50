//! Vendor-specific tracestate tag.
//!
//! The upstream sampling decision travels in an eight-field tag stored
//! under a tenant-scoped tracestate key:
//!
//! `<tenant_hash>-<cluster_id>@dt=fw4;0;0;0;0;<ignored>;<exponent>;<path_info>`
//!
//! Fields 1 to 4 are reserved and written as zero; foreign producers
//! may fill them, so parsing ignores their content. Real-world tags
//! carry extension fields after `path_info`, hence the "at least
//! eight fields" rule.

use md5::{Digest, Md5};
use std::fmt;

/// Parsed `fw4` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorTag {
    /// Upstream decided to drop this trace.
    pub ignored: bool,
    /// Sampling exponent the upstream decision was made with.
    pub exponent: u32,
    /// Low bits of the root span's trace-id hash.
    pub path_info: u32,
}

impl VendorTag {
    pub fn new(ignored: bool, exponent: u32, path_info: u32) -> Self {
        Self {
            ignored,
            exponent,
            path_info,
        }
    }

    /// Parse a tag value. Returns `None` for anything malformed;
    /// callers treat that as "no upstream decision".
    pub fn parse(value: &str) -> Option<Self> {
        let fields: Vec<&str> = value.split(';').collect();
        if fields.len() < 8 || fields[0] != "fw4" {
            return None;
        }
        let ignored = fields[5] == "1";
        let exponent = fields[6].parse::<u32>().ok()?;
        let path_info = u32::from_str_radix(fields[7], 16).ok()?;
        Some(Self {
            ignored,
            exponent,
            path_info,
        })
    }
}

impl fmt::Display for VendorTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fw4;0;0;0;0;{};{};{:x}",
            u8::from(self.ignored),
            self.exponent,
            self.path_info
        )
    }
}

/// Fold a tenant identifier into the 32-bit hash used in the
/// tracestate key: the four big-endian words of the MD5 digest,
/// XOR-combined.
pub fn tenant_id_hash(tenant: &str) -> u32 {
    let digest = Md5::digest(tenant.as_bytes());
    digest
        .chunks_exact(4)
        .fold(0u32, |acc, word| {
            acc ^ u32::from_be_bytes([word[0], word[1], word[2], word[3]])
        })
}

/// Tracestate key owned by this tenant and cluster, e.g.
/// `5b3f9fed-980df25c@dt`.
pub fn vendor_tracestate_key(tenant: &str, cluster_id: u32) -> String {
    format!("{:x}-{:x}@dt", tenant_id_hash(tenant), cluster_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tag = VendorTag::parse("fw4;0;0;0;0;1;2;1a2b").unwrap();
        assert!(tag.ignored);
        assert_eq!(tag.exponent, 2);
        assert_eq!(tag.path_info, 0x1a2b);
        assert_eq!(tag.to_string(), "fw4;0;0;0;0;1;2;1a2b");
    }

    #[test]
    fn test_round_trip_all_exponents() {
        for exponent in 0..=15 {
            for ignored in [false, true] {
                let tag = VendorTag::new(ignored, exponent, 0x95);
                let parsed = VendorTag::parse(&tag.to_string()).unwrap();
                assert_eq!(parsed, tag);
            }
        }
    }

    #[test]
    fn test_parse_real_world_tag() {
        // extension fields after path_info are tolerated
        let tag = VendorTag::parse(
            "fw4;4;4af38366;0;0;1;2;123;8eae;2h01;3h4af38366;4h00;5h01;\
             6h67a9a23155e1741b5b35368e08e6ece5;7h9d83def9a4939b7b",
        )
        .unwrap();
        assert!(tag.ignored);
        assert_eq!(tag.exponent, 2);
        assert_eq!(tag.path_info, 0x123);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(VendorTag::parse("").is_none());
        assert!(VendorTag::parse("fw4;0;0;0;0;0;0").is_none()); // too short
        assert!(VendorTag::parse("fx4;0;0;0;0;0;0;95").is_none()); // wrong prefix
        assert!(VendorTag::parse("fw4;0;0;0;0;0;abc;95").is_none()); // exponent not decimal
        assert!(VendorTag::parse("fw4;0;0;0;0;0;0;xyz").is_none()); // path info not hex
    }

    #[test]
    fn test_zero_path_info() {
        let tag = VendorTag::new(false, 1, 0);
        assert_eq!(tag.to_string(), "fw4;0;0;0;0;0;1;0");
    }

    #[test]
    fn test_tenant_id_hash() {
        assert_eq!(tenant_id_hash("abc12345"), 0x5b3f9fed);
        assert_eq!(tenant_id_hash("9712ad40"), 0x100f8eb3);
        assert_eq!(tenant_id_hash("jmw13303"), 0x4d10bede);
    }

    #[test]
    fn test_vendor_tracestate_key() {
        assert_eq!(
            vendor_tracestate_key("abc12345", 0x980df25c),
            "5b3f9fed-980df25c@dt"
        );
        // no leading zeros in the cluster id
        assert_eq!(vendor_tracestate_key("abc12345", 0x1a), "5b3f9fed-1a@dt");
    }
}
