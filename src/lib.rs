//! Client for the tucao video site.
//!
//! - [`ApiClient`]: one method per endpoint, session cookie attached where
//!   the site needs it, raw bodies out.
//! - [`extract_profile`]: avatar, header background and signature from a
//!   logged-in uploader page.
//! - [`PartSelectionController`] and [`DownloadDispatcher`]: choosing which
//!   parts of a video to download and handing them to the download engine.
//! - [`VideoInfo`]: ties the above together for one displayed video.

pub mod core;
pub mod download;
pub mod providers;
pub mod star;
pub mod video_info;

pub use crate::core::{ClientConfig, CoreError, Result, SessionCookie};
pub use download::{
    DownloadDispatcher, DownloadEngine, DownloadRequest, PartSelectionController, PickAllLabel,
    SelectionError,
};
pub use providers::tucao::{
    extract_profile, ApiClient, DanmakuPost, DownloadStream, LoginForm, RawDocument,
    UploaderProfile, VideoPart, VideoResult,
};
pub use star::HistoryStore;
pub use video_info::{ProfileSource, ProfileState, VideoInfo, VideoInfoState};

/// Routes `log` output through `env_logger`. Safe to call more than once.
pub fn init_logger() {
    let _ = env_logger::try_init();
}
