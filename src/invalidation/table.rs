//! Invalidation table.
//!
//! The single place that knows which cached reads a mutation stales. Adding
//! a mutation means adding a row here, not touching call sites.

use crate::portal::{KeyPattern, Namespace, ResourceKey};

use super::events::MutationEvent;

/// Patterns to invalidate for `event`.
pub fn invalidation_targets(event: &MutationEvent) -> Vec<KeyPattern> {
    use KeyPattern::{All, Resource};

    match event {
        MutationEvent::VideoPermissionGranted {
            video_id,
            client_id,
        }
        | MutationEvent::VideoPermissionRevoked {
            video_id,
            client_id,
        } => vec![
            Resource(ResourceKey::client_videos(client_id)),
            Resource(ResourceKey::video_permissions(video_id)),
        ],
        // Any client's list may embed the video
        MutationEvent::VideoUpdated { video_id } => vec![
            All(Namespace::ClientVideos),
            Resource(ResourceKey::video_permissions(video_id)),
        ],
        MutationEvent::VideoDeleted { video_id } => vec![
            All(Namespace::ClientVideos),
            All(Namespace::VideoHistory),
            Resource(ResourceKey::video_permissions(video_id)),
        ],
        MutationEvent::VideoViewed { client_id, .. } => {
            vec![Resource(ResourceKey::video_history(client_id))]
        }
        MutationEvent::AdvertisementUpdated { .. } | MutationEvent::AdvertisementDeleted { .. } => {
            vec![All(Namespace::ClientAds)]
        }
        MutationEvent::AdvertisementAssigned { client_id, .. }
        | MutationEvent::AdvertisementUnassigned { client_id, .. } => {
            vec![Resource(ResourceKey::client_ads(client_id))]
        }
        // Permission lists are keyed by video, so the client may appear in any
        MutationEvent::ClientDeleted { client_id } => vec![
            Resource(ResourceKey::client_videos(client_id)),
            Resource(ResourceKey::video_history(client_id)),
            Resource(ResourceKey::client_ads(client_id)),
            All(Namespace::VideoPermissions),
        ],
    }
}
