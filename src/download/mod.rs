// File: download/mod.rs
// Picking parts of a video and handing them to the download engine.

pub mod dispatcher;
pub mod selection;

pub use dispatcher::{DownloadDispatcher, DownloadEngine, DownloadRequest, Submission};
pub use selection::{
    ConfirmedSelection, PartSelectionController, PickAllLabel, SelectionError, SelectionSnapshot,
};
