//! Resource naming: random suffixes, service-account prefixes and the
//! bucket names derived from them.

use crate::error::{ProvisionError, Result};
use rand::Rng;
use std::fmt;
use std::num::NonZeroUsize;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

pub const DEFAULT_PREFIX_TAG: &str = "pf";
pub const DEFAULT_SUFFIX_LENGTH: NonZeroUsize = match NonZeroUsize::new(8) {
    Some(n) => n,
    None => unreachable!(),
};

/// Returns `length` lowercase ASCII letters drawn uniformly at random.
pub fn generate_suffix(length: NonZeroUsize) -> String {
    let mut rng = rand::thread_rng();
    (0..length.get())
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Prefix shared by the permission, the service account and the bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePrefix(String);

impl ResourcePrefix {
    /// `{tag}-{random suffix}`, e.g. `pf-qwhzkcad`.
    pub fn generate(tag: &str, suffix_length: NonZeroUsize) -> Result<Self> {
        Self::parse(&format!("{}-{}", tag, generate_suffix(suffix_length)))
    }

    /// Accepts an operator-supplied prefix.
    pub fn parse(value: &str) -> Result<Self> {
        let starts_with_letter = value
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_lowercase());
        let valid_chars = value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

        if !starts_with_letter || !valid_chars {
            return Err(ProvisionError::Config(format!(
                "invalid prefix '{}': use lowercase letters, digits and hyphens, starting with a letter",
                value
            )));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bucket pattern granted to the permission: every bucket whose name
    /// starts with this prefix.
    pub fn scope_pattern(&self) -> String {
        format!("{}*", self.0)
    }
}

impl fmt::Display for ResourcePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// S3 bucket name. Always begins with the prefix it was derived from, so
/// it falls inside the permission's scope pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketName(String);

impl BucketName {
    /// `{prefix}-{region}`, e.g. `pf-qwhzkcad-us-west-1`.
    pub fn derive(prefix: &ResourcePrefix, region: &str) -> Result<Self> {
        Self::parse(&format!("{}-{}", prefix, region))
    }

    pub fn parse(value: &str) -> Result<Self> {
        validate_bucket_name(value)?;
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_within(&self, prefix: &ResourcePrefix) -> bool {
        self.0.starts_with(prefix.as_str())
    }
}

impl fmt::Display for BucketName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_bucket_name(name: &str) -> Result<()> {
    let invalid = |reason: &str| {
        Err(ProvisionError::Config(format!(
            "invalid bucket name '{}': {}",
            name, reason
        )))
    };

    if !(3..=63).contains(&name.len()) {
        return invalid("must be between 3 and 63 characters");
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return invalid("only lowercase letters, digits, hyphens and dots are allowed");
    }
    let alnum = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
    if !name.starts_with(alnum) || !name.ends_with(alnum) {
        return invalid("must begin and end with a letter or digit");
    }
    Ok(())
}
