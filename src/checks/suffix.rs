//! Public suffix resolution
//!
//! Splits a DNS name into its effective TLD and registrable root using
//! the Public Suffix List compiled into the `psl` crate.

use crate::utils::{Result, SpiryError};
use psl::{List, Psl, Type};

/// TLDs whose registries are known to return partial WHOIS data.
/// Resolution still proceeds; a warning is logged.
pub const INCOMPLETE_TLDS: &[&str] = &[
    "ac", "ad", "al", "an", "ao", "aq", "ar", "aw", "ba",
    "bf", "bh", "bm", "bs", "bt", "bv", "bw", "bz", "cd",
    "cg", "ck", "cm", "cr", "cu", "cv", "cw", "cy", "dj",
    "do", "eg", "er", "et", "fj", "fk", "fm", "ga", "gb",
    "ge", "gf", "gh", "gm", "gn", "gp", "gq", "gr", "gt",
    "gu", "gw", "hm", "jm", "jo", "kh", "km", "kn", "kp",
    "kw", "ky", "lb", "lc", "lk", "lr", "ls", "mc", "mh",
    "mil", "mk", "mm", "mq", "mr", "mt", "mv", "mw", "mz",
    "ne", "ni", "np", "nr", "pa", "pg", "ph", "pk", "pn",
    "ps", "py", "rw", "sd", "sj", "sl", "sr", "sv", "sz",
    "td", "tg", "tj", "to", "tp", "tt", "va", "vi", "vn",
    "vu", "ye", "za", "zm", "zw",
    // IDN ccTLDs
    "xn--0zwm56d", "xn--11b5bs3a9aj6g", "xn--45brj9c",
    "xn--80akhbyknj4f", "xn--90a3ac", "xn--9t4b11yi5a",
    "xn--deba0ad", "xn--fpcrj9c3d", "xn--fzc2c9e2c",
    "xn--g6w251d", "xn--gecrj9c", "xn--h2brj9c",
    "xn--hgbk6aj7f53bba", "xn--hlcj6aya9esc7a", "xn--jxalpdlp",
    "xn--kgbechtv", "xn--l1acc", "xn--mgbayh7gpa",
    "xn--mgbbh1a71e", "xn--mgbc0a9azcg", "xn--pgbs0dh",
    "xn--s9brj9c", "xn--wgbh1c", "xn--xkc2al3hye2a",
    "xn--xkc2dl3a5ee0h", "xn--zckzah",
];

/// Whether the top-level label of `suffix` belongs to a registry with
/// incomplete WHOIS data
pub fn is_incomplete_tld(suffix: &str) -> bool {
    let tld = suffix.rsplit('.').next().unwrap_or(suffix);
    INCOMPLETE_TLDS.contains(&tld)
}

#[derive(Debug)]
struct SuffixMatch {
    suffix: String,
    icann: bool,
}

/// Resolves effective TLDs and registrable roots.
///
/// Names are expected in lowercase ASCII (punycode) form.
pub struct SuffixResolver {
    list: List,
}

impl SuffixResolver {
    pub fn new() -> Self {
        Self { list: List }
    }

    /// Longest matching public suffix of `name`.
    ///
    /// Fails with `UnmanagedDomain` unless the suffix is ICANN-managed.
    pub fn effective_tld(&self, name: &str) -> Result<String> {
        let found = self
            .find_suffix(name)
            .ok_or_else(|| SpiryError::UnmanagedDomain {
                domain: name.to_string(),
                suffix: name.to_string(),
            })?;

        if !found.icann {
            tracing::debug!("suffix {:?} of {} is not ICANN-managed", found.suffix, name);
            return Err(SpiryError::UnmanagedDomain {
                domain: name.to_string(),
                suffix: found.suffix,
            });
        }

        if is_incomplete_tld(&found.suffix) {
            tracing::warn!(
                "TLD {:?} returns incomplete WHOIS data; you may not be able to look up an expiration date",
                found.suffix
            );
        }

        Ok(found.suffix)
    }

    /// Registrable domain: the public suffix plus one label to its left
    pub fn root(&self, name: &str) -> Result<String> {
        let root = self
            .list
            .domain(name.as_bytes())
            .map(|d| bytes_to_string(d.as_bytes()))
            .or_else(|| {
                let unicode = to_unicode(name)?;
                let domain = self.list.domain(unicode.as_bytes())?;
                to_ascii(&bytes_to_string(domain.as_bytes()))
            });

        match root {
            Some(root) => {
                tracing::debug!("root domain of {} is {}", name, root);
                Ok(root)
            }
            None => {
                tracing::debug!("unable to find root domain from FQDN {}", name);
                Err(SpiryError::RootLookup {
                    domain: name.to_string(),
                })
            }
        }
    }

    fn find_suffix(&self, name: &str) -> Option<SuffixMatch> {
        let ascii = self.list.suffix(name.as_bytes());
        if let Some(suffix) = ascii.as_ref().filter(|s| s.is_known()) {
            return Some(SuffixMatch {
                suffix: bytes_to_string(suffix.as_bytes()),
                icann: matches!(suffix.typ(), Some(Type::Icann)),
            });
        }

        // the list may only carry the Unicode spelling of an IDN suffix
        if let Some(unicode) = to_unicode(name) {
            if let Some(suffix) = self.list.suffix(unicode.as_bytes()).filter(|s| s.is_known()) {
                return Some(SuffixMatch {
                    suffix: to_ascii(&bytes_to_string(suffix.as_bytes()))?,
                    icann: matches!(suffix.typ(), Some(Type::Icann)),
                });
            }
        }

        ascii.map(|suffix| SuffixMatch {
            suffix: bytes_to_string(suffix.as_bytes()),
            icann: false,
        })
    }
}

impl Default for SuffixResolver {
    fn default() -> Self {
        Self::new()
    }
}

fn bytes_to_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn to_unicode(name: &str) -> Option<String> {
    if !name.split('.').any(|label| label.starts_with("xn--")) {
        return None;
    }
    let (unicode, result) = idna::domain_to_unicode(name);
    result.ok().map(|_| unicode)
}

fn to_ascii(name: &str) -> Option<String> {
    idna::domain_to_ascii(name).ok()
}
