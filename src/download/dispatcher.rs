// File: download/dispatcher.rs
// Turns a confirmed selection into a DownloadRequest and hands it to the
// download engine.

use super::selection::SelectionError;
use crate::providers::tucao::models::{VideoPart, VideoResult};
use std::collections::HashSet;

/// What the download engine receives: the video trimmed to the chosen parts.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub video: VideoResult,
    pub parts: Vec<VideoPart>,
}

/// Entry point of the external download engine. It owns file I/O,
/// progress, resume and retries.
pub trait DownloadEngine: Send + Sync {
    type Handle;

    fn enqueue(&self, request: DownloadRequest) -> Self::Handle;

    /// Whether the engine already has this part queued or running.
    fn is_tracked(&self, _part: &VideoPart) -> bool {
        false
    }
}

/// Result of one hand-off.
#[derive(Debug)]
pub struct Submission<H> {
    pub request: DownloadRequest,
    pub handle: H,
}

#[derive(Debug)]
pub struct DownloadDispatcher<E> {
    engine: E,
}

impl<E: DownloadEngine> DownloadDispatcher<E> {
    pub fn new(engine: E) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Builds the request without submitting it.
    ///
    /// Parts come from `video` in their original order, restricted to the
    /// selected ids. Duplicate ids, parts already on disk and parts the
    /// engine is already working on are left out.
    pub fn build_request(
        &self,
        video: &VideoResult,
        selected: &[VideoPart],
    ) -> Result<DownloadRequest, SelectionError> {
        let wanted: HashSet<&str> = selected.iter().map(|p| p.part_id.as_str()).collect();
        let mut seen = HashSet::new();

        let parts: Vec<VideoPart> = video
            .parts
            .iter()
            .filter(|p| wanted.contains(p.part_id.as_str()))
            .filter(|p| p.is_selectable())
            .filter(|p| seen.insert(p.part_id.as_str()))
            .filter(|p| {
                let tracked = self.engine.is_tracked(p);
                if tracked {
                    log::debug!("Part {} is already in the download queue", p.part_id);
                }
                !tracked
            })
            .map(|p| VideoPart {
                checked: false,
                ..p.clone()
            })
            .collect();

        if parts.is_empty() {
            return Err(SelectionError::EmptySelection);
        }

        let mut trimmed = video.clone();
        trimmed.parts = parts.clone();
        Ok(DownloadRequest {
            video: trimmed,
            parts,
        })
    }

    /// Builds the request and hands it to the engine once.
    pub fn submit(
        &self,
        video: &VideoResult,
        selected: &[VideoPart],
    ) -> Result<Submission<E::Handle>, SelectionError> {
        let request = self.build_request(video, selected)?;
        log::info!(
            "Dispatching {} parts of {} ({})",
            request.parts.len(),
            request.video.id,
            request.video.title
        );
        let handle = self.engine.enqueue(request.clone());
        Ok(Submission { request, handle })
    }
}
