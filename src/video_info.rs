// File: video_info.rs
// State behind the video info screen: bound result, star flag, created
// label, uploader profile, and the entry points into the part picker.

use crate::core::Result;
use crate::download::dispatcher::{DownloadDispatcher, DownloadEngine, Submission};
use crate::download::selection::{PartSelectionController, SelectionError};
use crate::providers::tucao::models::{UploaderProfile, VideoResult};
use crate::providers::tucao::requests::ApiClient;
use crate::star::{self, HistoryStore};
use async_trait::async_trait;
use chrono::{Local, TimeZone};
use std::fmt::Display;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};

/// Where uploader profiles come from.
#[async_trait]
pub trait ProfileSource: Send + Sync {
    async fn uploader_profile(&self, user_id: &str) -> Result<UploaderProfile>;
}

#[async_trait]
impl ProfileSource for ApiClient {
    async fn uploader_profile(&self, user_id: &str) -> Result<UploaderProfile> {
        self.fetch_uploader_profile(user_id).await
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ProfileState {
    #[default]
    Idle,
    Loading,
    Loaded(UploaderProfile),
    /// Fetch or extraction failed; show the placeholder avatar.
    Unavailable(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoInfoState {
    pub video: Option<VideoResult>,
    pub starred: bool,
    pub created_label: String,
    pub profile: ProfileState,
    /// Bumped on every bind; profile results carry the value they were
    /// started under.
    pub binding: u64,
}

/// Payload for navigating to the uploader page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderLink {
    pub user_id: String,
    pub user_name: String,
    pub avatar_url: String,
    pub signature: String,
    pub header_background: String,
}

/// `发布于yyyy-MM-dd HH:mm:ss` in the given time zone; empty when the
/// timestamp is out of range.
pub fn created_label<Tz>(epoch_secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    tz.timestamp_opt(epoch_secs, 0)
        .single()
        .map(|at| format!("发布于{}", at.format("%Y-%m-%d %H:%M:%S")))
        .unwrap_or_default()
}

pub struct VideoInfo {
    source: Arc<dyn ProfileSource>,
    history: Arc<dyn HistoryStore>,
    state: Arc<watch::Sender<VideoInfoState>>,
    in_flight: Mutex<Option<AbortHandle>>,
}

impl VideoInfo {
    pub fn new(source: Arc<dyn ProfileSource>, history: Arc<dyn HistoryStore>) -> Self {
        let (state, _) = watch::channel(VideoInfoState::default());
        Self {
            source,
            history,
            state: Arc::new(state),
            in_flight: Mutex::new(None),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<VideoInfoState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> VideoInfoState {
        self.state.borrow().clone()
    }

    /// Shows `video` and starts fetching its uploader profile.
    ///
    /// Any profile fetch still running for an earlier bind is aborted, and a
    /// result that still slips through is dropped. Must be called inside a
    /// tokio runtime.
    pub fn bind(&self, video: VideoResult) -> JoinHandle<()> {
        let starred = star::is_starred(self.history.as_ref(), &video);
        let label = created_label(video.created_at, &Local);
        let user_id = video.user_id.clone();

        let mut binding = 0;
        self.state.send_modify(|state| {
            state.binding += 1;
            binding = state.binding;
            state.video = Some(video);
            state.starred = starred;
            state.created_label = label;
            state.profile = ProfileState::Loading;
        });

        let source = self.source.clone();
        let state = self.state.clone();
        let handle = tokio::spawn(async move {
            let result = source.uploader_profile(&user_id).await;
            apply_profile(&state, binding, result);
        });

        if let Ok(mut in_flight) = self.in_flight.lock() {
            if let Some(previous) = in_flight.replace(handle.abort_handle()) {
                previous.abort();
            }
        }
        handle
    }

    /// Flips the star of the bound video. `None` when nothing is bound.
    pub fn toggle_star(&self) -> Option<bool> {
        let current = self.state();
        let video = current.video.as_ref()?;
        let starred = star::toggle_star(self.history.as_ref(), video, current.starred);
        self.state.send_modify(|state| state.starred = starred);
        Some(starred)
    }

    /// Available once the uploader's header background is known.
    pub fn uploader_link(&self) -> Option<UploaderLink> {
        let current = self.state();
        let video = current.video?;
        match current.profile {
            ProfileState::Loaded(profile) if !profile.header_background.is_empty() => {
                Some(UploaderLink {
                    user_id: video.user_id,
                    user_name: video.user_name,
                    avatar_url: profile.avatar_url,
                    signature: profile.signature,
                    header_background: profile.header_background,
                })
            }
            _ => None,
        }
    }

    /// New picker over the bound video's parts. Works whether or not the
    /// profile fetch succeeded.
    pub fn open_download_picker(&self) -> Option<PartSelectionController> {
        self.state
            .borrow()
            .video
            .as_ref()
            .map(PartSelectionController::open)
    }

    /// Confirms `picker` and dispatches the result for the bound video.
    pub fn start_download<E: DownloadEngine>(
        &self,
        picker: PartSelectionController,
        dispatcher: &DownloadDispatcher<E>,
    ) -> std::result::Result<Submission<E::Handle>, SelectionError> {
        let confirmed = picker.confirm()?;
        let video = self
            .state()
            .video
            .filter(|v| v.id == confirmed.video_id)
            .ok_or_else(|| SelectionError::StaleSelection(confirmed.video_id.clone()))?;
        dispatcher.submit(&video, &confirmed.parts)
    }
}

// Writes a finished profile fetch unless a newer bind has happened since.
fn apply_profile(
    state: &watch::Sender<VideoInfoState>,
    binding: u64,
    result: Result<UploaderProfile>,
) -> bool {
    state.send_if_modified(|current| {
        if current.binding != binding {
            log::warn!(
                "Discarding stale uploader profile (binding {} superseded by {})",
                binding,
                current.binding
            );
            return false;
        }
        current.profile = match result {
            Ok(profile) => ProfileState::Loaded(profile),
            Err(e) => {
                log::warn!("Uploader profile unavailable: {}", e);
                ProfileState::Unavailable(e.to_string())
            }
        };
        true
    })
}
