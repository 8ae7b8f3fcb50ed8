//! Cache tokens embedded in filenames.
//!
//! A cached output may carry the fingerprint of the inputs that produced it
//! as `_0x<32 chars>` in its name, e.g. `scan_0x1f..9a_T1.nii.gz`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use cortex_common::{JoinOptions, PathParts};
use regex::Regex;

use crate::shape::IntoPathList;

/// Number of characters in a cache token.
pub const TOKEN_LEN: usize = 32;

/// A 32-character token found in a filename (without the `_0x` marker).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CacheToken(String);

impl CacheToken {
    /// Returns the token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"_0x([a-z0-9]{32})").expect("token pattern is valid"))
}

/// Searches one file name for a cache token.
///
/// Only the final path component is inspected; directory components never
/// match. Dots inside the base name do not hide a token.
pub fn find_token(name: impl AsRef<Path>) -> Option<CacheToken> {
    let file_name = name.as_ref().file_name()?.to_string_lossy();
    token_pattern()
        .captures(&file_name)
        .and_then(|caps| caps.get(1))
        .map(|m| CacheToken(m.as_str().to_string()))
}

/// Returns the cache token carried by a name or group of names.
///
/// For a group only the first name is inspected: grouped outputs are named
/// together, so the first element stands for the group. An empty group, or
/// one with no defined order, carries no token.
pub fn embedded_token<L: IntoPathList>(names: L) -> Option<CacheToken> {
    names
        .to_sequence()
        .and_then(|names| names.into_iter().next())
        .and_then(find_token)
}

/// Returns `true` if [`embedded_token`] finds a token.
pub fn has_embedded_token<L: IntoPathList>(names: L) -> bool {
    embedded_token(names).is_some()
}

/// Builds the cached name of `path` by inserting `_0x<digest>` before its extension.
pub fn embed_token(path: impl AsRef<Path>, digest: impl fmt::Display) -> PathBuf {
    PathParts::split(path).join(&JoinOptions::new().suffix(format!("_0x{digest}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN: &str = "abc123def456abc123def456abc123de";

    #[test]
    fn finds_token_before_extension() {
        let name = format!("scan_0x{TOKEN}_T1.nii.gz");
        let token = embedded_token(name.as_str()).unwrap();
        assert_eq!(token.as_str(), TOKEN);
        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert!(has_embedded_token(name.as_str()));
    }

    #[test]
    fn plain_name_has_no_token() {
        assert!(embedded_token("scan_T1.nii.gz").is_none());
        assert!(!has_embedded_token("scan_T1.nii.gz"));
    }

    #[test]
    fn short_or_uppercase_runs_do_not_match() {
        assert!(embedded_token("scan_0xabc123.nii").is_none());
        let upper = format!("scan_0x{}.nii", TOKEN.to_uppercase());
        assert!(embedded_token(upper.as_str()).is_none());
    }

    #[test]
    fn directory_components_are_ignored() {
        let path = format!("/cache/run_0x{TOKEN}/scan.nii");
        assert!(embedded_token(path.as_str()).is_none());
    }

    #[test]
    fn dotted_stem_still_carries_token() {
        let name = format!("sub-01.run2_0x{TOKEN}.nii.gz");
        assert_eq!(embedded_token(name.as_str()).unwrap().as_str(), TOKEN);

        let nested = format!("/data/sub-01/ses.a/sub-01.run2_0x{TOKEN}.nii.gz");
        assert!(has_embedded_token(nested.as_str()));
    }

    #[test]
    fn only_first_name_of_group_is_inspected() {
        let tokened = format!("a_0x{TOKEN}.nii");
        let group = vec!["plain.nii".to_string(), tokened.clone()];
        assert!(embedded_token(&group).is_none());

        let group = vec![tokened, "plain.nii".to_string()];
        assert_eq!(embedded_token(&group).unwrap().as_str(), TOKEN);
    }

    #[test]
    fn empty_group_has_no_token() {
        let group: Vec<String> = Vec::new();
        assert!(embedded_token(group).is_none());
    }

    #[test]
    fn embed_then_detect() {
        let renamed = embed_token("/work/brain.nii.gz", TOKEN);
        assert_eq!(
            renamed,
            PathBuf::from(format!("/work/brain_0x{TOKEN}.nii.gz"))
        );
        assert_eq!(embedded_token(&renamed).unwrap().as_str(), TOKEN);
    }
}
