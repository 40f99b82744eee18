// File: star.rs
// Starred-video state, mirrored from an external history store.

use crate::providers::tucao::models::VideoResult;
use std::collections::HashSet;

/// The external list of starred videos. Persistence is its own business.
pub trait HistoryStore: Send + Sync {
    /// Ids of every starred video.
    fn list(&self) -> HashSet<String>;
    fn add(&self, video: &VideoResult);
    fn remove(&self, video: &VideoResult);
}

pub fn is_starred(store: &dyn HistoryStore, video: &VideoResult) -> bool {
    store.list().contains(&video.id)
}

/// Flips the starred state of `video` in the store and returns the new state.
pub fn toggle_star(store: &dyn HistoryStore, video: &VideoResult, starred: bool) -> bool {
    if starred {
        store.remove(video);
        log::debug!("Unstarred {}", video.id);
        false
    } else {
        store.add(video);
        log::debug!("Starred {}", video.id);
        true
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    pub struct MemoryHistory {
        ids: Mutex<HashSet<String>>,
    }

    impl MemoryHistory {
        pub fn with(ids: &[&str]) -> Self {
            Self {
                ids: Mutex::new(ids.iter().map(|id| id.to_string()).collect()),
            }
        }
    }

    impl HistoryStore for MemoryHistory {
        fn list(&self) -> HashSet<String> {
            self.ids.lock().unwrap().clone()
        }

        fn add(&self, video: &VideoResult) {
            self.ids.lock().unwrap().insert(video.id.clone());
        }

        fn remove(&self, video: &VideoResult) {
            self.ids.lock().unwrap().remove(&video.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::MemoryHistory;
    use super::*;
    use crate::download::selection::fixtures::three_part_video;

    #[test]
    fn test_is_starred_matches_id() {
        let video = three_part_video();
        assert!(is_starred(&MemoryHistory::with(&["4071234"]), &video));
        assert!(!is_starred(&MemoryHistory::with(&["1"]), &video));
    }

    #[test]
    fn test_toggle_round_trip() {
        let store = MemoryHistory::default();
        let video = three_part_video();

        let starred = toggle_star(&store, &video, false);
        assert!(starred);
        assert!(is_starred(&store, &video));

        let starred = toggle_star(&store, &video, starred);
        assert!(!starred);
        assert!(!is_starred(&store, &video));
    }
}
