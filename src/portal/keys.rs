//! Cache key definitions.
//!
//! Every cache key and invalidation pattern in the crate is built here, so a
//! typo cannot create an entry that no invalidation ever reaches.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

// == Namespace ==
/// One cached resource domain; each has its own store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Namespace {
    /// Videos a client is allowed to watch
    ClientVideos,
    /// A client's viewing history
    VideoHistory,
    /// Clients granted access to a video
    VideoPermissions,
    /// Advertisements assigned to a client
    ClientAds,
}

impl Namespace {
    pub const ALL: [Namespace; 4] = [
        Namespace::ClientVideos,
        Namespace::VideoHistory,
        Namespace::VideoPermissions,
        Namespace::ClientAds,
    ];

    /// Key prefix and URL segment.
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::ClientVideos => "client_videos",
            Namespace::VideoHistory => "video_history",
            Namespace::VideoPermissions => "video_permissions",
            Namespace::ClientAds => "client_ads",
        }
    }

    /// Prefix for per-namespace environment overrides.
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Namespace::ClientVideos => "CLIENT_VIDEOS",
            Namespace::VideoHistory => "VIDEO_HISTORY",
            Namespace::VideoPermissions => "VIDEO_PERMISSIONS",
            Namespace::ClientAds => "CLIENT_ADS",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str() == s)
            .ok_or_else(|| CacheError::UnknownNamespace(s.to_string()))
    }
}

// == Resource Key ==
/// Identifies one cached resource.
///
/// Renders as `<namespace>_<id>`, e.g. `client_videos_42`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    ClientVideos { client_id: String },
    VideoHistory { client_id: String },
    VideoPermissions { video_id: String },
    ClientAds { client_id: String },
}

impl ResourceKey {
    pub fn client_videos(client_id: impl Into<String>) -> Self {
        ResourceKey::ClientVideos {
            client_id: client_id.into(),
        }
    }

    pub fn video_history(client_id: impl Into<String>) -> Self {
        ResourceKey::VideoHistory {
            client_id: client_id.into(),
        }
    }

    pub fn video_permissions(video_id: impl Into<String>) -> Self {
        ResourceKey::VideoPermissions {
            video_id: video_id.into(),
        }
    }

    pub fn client_ads(client_id: impl Into<String>) -> Self {
        ResourceKey::ClientAds {
            client_id: client_id.into(),
        }
    }

    /// Builds the key for `namespace` from a single identifier.
    pub fn for_namespace(namespace: Namespace, id: impl Into<String>) -> Self {
        match namespace {
            Namespace::ClientVideos => Self::client_videos(id),
            Namespace::VideoHistory => Self::video_history(id),
            Namespace::VideoPermissions => Self::video_permissions(id),
            Namespace::ClientAds => Self::client_ads(id),
        }
    }

    pub fn namespace(&self) -> Namespace {
        match self {
            ResourceKey::ClientVideos { .. } => Namespace::ClientVideos,
            ResourceKey::VideoHistory { .. } => Namespace::VideoHistory,
            ResourceKey::VideoPermissions { .. } => Namespace::VideoPermissions,
            ResourceKey::ClientAds { .. } => Namespace::ClientAds,
        }
    }

    /// The resource identifier embedded in the key.
    pub fn id(&self) -> &str {
        match self {
            ResourceKey::ClientVideos { client_id }
            | ResourceKey::VideoHistory { client_id }
            | ResourceKey::ClientAds { client_id } => client_id,
            ResourceKey::VideoPermissions { video_id } => video_id,
        }
    }

    /// String form used as the store key.
    pub fn as_key(&self) -> String {
        format!("{}_{}", self.namespace(), self.id())
    }

    /// Rejects keys with an empty or whitespace-only identifier.
    pub fn validate(&self) -> Result<()> {
        if self.id().trim().is_empty() {
            return Err(CacheError::InvalidRequest(format!(
                "{} identifier cannot be empty",
                self.namespace()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.namespace(), self.id())
    }
}

// == Key Pattern ==
/// Invalidation scope inside one namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyPattern {
    /// Every key in the namespace
    All(Namespace),
    /// Exactly one resource
    Resource(ResourceKey),
}

impl KeyPattern {
    pub fn namespace(&self) -> Namespace {
        match self {
            KeyPattern::All(namespace) => *namespace,
            KeyPattern::Resource(key) => key.namespace(),
        }
    }

    /// Regular expression matching the keys in scope.
    ///
    /// Identifiers are escaped and anchored, so `client_videos_1` never
    /// matches `client_videos_10`.
    pub fn as_regex(&self) -> String {
        match self {
            KeyPattern::All(namespace) => format!("^{}_", namespace),
            KeyPattern::Resource(key) => format!("^{}$", regex::escape(&key.as_key())),
        }
    }

    pub fn compile(&self) -> Result<Regex> {
        let pattern = self.as_regex();
        Regex::new(&pattern).map_err(|source| CacheError::InvalidPattern { pattern, source })
    }
}

impl fmt::Display for KeyPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_regex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_key_format() {
        assert_eq!(ResourceKey::client_videos("42").as_key(), "client_videos_42");
        assert_eq!(ResourceKey::video_history("42").as_key(), "video_history_42");
        assert_eq!(ResourceKey::video_permissions("v1").as_key(), "video_permissions_v1");
        assert_eq!(ResourceKey::client_ads("7").to_string(), "client_ads_7");
    }

    #[test]
    fn namespace_round_trips_through_str() {
        for ns in Namespace::ALL {
            assert_eq!(ns.as_str().parse::<Namespace>().unwrap(), ns);
        }
        assert!(matches!(
            "videos".parse::<Namespace>(),
            Err(CacheError::UnknownNamespace(_))
        ));
    }

    #[test]
    fn for_namespace_matches_constructors() {
        assert_eq!(
            ResourceKey::for_namespace(Namespace::VideoPermissions, "v9"),
            ResourceKey::video_permissions("v9")
        );
    }

    #[test]
    fn empty_identifier_rejected() {
        assert!(ResourceKey::client_videos("  ").validate().is_err());
        assert!(ResourceKey::client_videos("abc").validate().is_ok());
    }

    #[test]
    fn resource_pattern_is_exact() {
        let regex = KeyPattern::Resource(ResourceKey::client_videos("1"))
            .compile()
            .unwrap();
        assert!(regex.is_match("client_videos_1"));
        assert!(!regex.is_match("client_videos_10"));
        assert!(!regex.is_match("video_history_1"));
    }

    #[test]
    fn resource_pattern_escapes_identifier() {
        let regex = KeyPattern::Resource(ResourceKey::client_ads("a.b"))
            .compile()
            .unwrap();
        assert!(regex.is_match("client_ads_a.b"));
        assert!(!regex.is_match("client_ads_axb"));
    }

    #[test]
    fn namespace_pattern_matches_prefix_only() {
        let regex = KeyPattern::All(Namespace::VideoHistory).compile().unwrap();
        assert!(regex.is_match("video_history_1"));
        assert!(!regex.is_match("video_permissions_1"));
    }
}
