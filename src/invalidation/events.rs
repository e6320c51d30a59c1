//! Mutation events.
//!
//! Every write in the portal that can stale cached reads is described by one
//! of these events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A data change reported by the portal or by a backend webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MutationEvent {
    /// A client was given access to a video.
    VideoPermissionGranted { video_id: String, client_id: String },
    /// A client lost access to a video.
    VideoPermissionRevoked { video_id: String, client_id: String },
    /// Video metadata changed (title, thumbnail, file).
    VideoUpdated { video_id: String },
    /// A video and its dependent rows were removed.
    VideoDeleted { video_id: String },
    /// A client watched (part of) a video.
    VideoViewed { client_id: String, video_id: String },
    /// Advertisement content or activation changed.
    AdvertisementUpdated { ad_id: String },
    /// An advertisement was removed.
    AdvertisementDeleted { ad_id: String },
    /// An advertisement was assigned to a client.
    AdvertisementAssigned { ad_id: String, client_id: String },
    /// An advertisement assignment was removed.
    AdvertisementUnassigned { ad_id: String, client_id: String },
    /// A client account was removed.
    ClientDeleted { client_id: String },
}

impl MutationEvent {
    /// Short snake_case name for logs and reports.
    pub fn kind(&self) -> &'static str {
        match self {
            MutationEvent::VideoPermissionGranted { .. } => "video_permission_granted",
            MutationEvent::VideoPermissionRevoked { .. } => "video_permission_revoked",
            MutationEvent::VideoUpdated { .. } => "video_updated",
            MutationEvent::VideoDeleted { .. } => "video_deleted",
            MutationEvent::VideoViewed { .. } => "video_viewed",
            MutationEvent::AdvertisementUpdated { .. } => "advertisement_updated",
            MutationEvent::AdvertisementDeleted { .. } => "advertisement_deleted",
            MutationEvent::AdvertisementAssigned { .. } => "advertisement_assigned",
            MutationEvent::AdvertisementUnassigned { .. } => "advertisement_unassigned",
            MutationEvent::ClientDeleted { .. } => "client_deleted",
        }
    }
}

impl fmt::Display for MutationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind())
    }
}
