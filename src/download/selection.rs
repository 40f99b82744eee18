// File: download/selection.rs
// Part picker: per-item toggles and "select all" over a working copy of a
// video's parts.

use crate::providers::tucao::models::{VideoPart, VideoResult};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("Part {0} does not belong to this video")]
    UnknownPart(String),
    #[error("No part left to download")]
    EmptySelection,
    #[error("Selection belongs to video {0}, which is no longer shown")]
    StaleSelection(String),
}

/// What the "select all" button currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickAllLabel {
    SelectAll,
    DeselectAll,
}

impl PickAllLabel {
    pub fn text(&self) -> &'static str {
        match self {
            PickAllLabel::SelectAll => "select all",
            PickAllLabel::DeselectAll => "deselect all",
        }
    }
}

impl fmt::Display for PickAllLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// State pushed to listeners after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub confirm_enabled: bool,
    pub pick_all_label: PickAllLabel,
    pub checked: Vec<String>,
}

pub type SelectionListener = Box<dyn FnMut(&SelectionSnapshot) + Send>;

/// Parts the user confirmed, in their original order.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedSelection {
    pub video_id: String,
    pub parts: Vec<VideoPart>,
}

/// One open download picker.
///
/// Owns a copy of the video's parts with every `checked` flag cleared; the
/// source `VideoResult` is never touched. Dropping the controller (or
/// calling `cancel`) discards the selection without side effects, and
/// `confirm` consumes it.
pub struct PartSelectionController {
    video_id: String,
    parts: Vec<VideoPart>,
    listeners: Vec<SelectionListener>,
}

impl PartSelectionController {
    pub fn open(video: &VideoResult) -> Self {
        let parts = video
            .parts
            .iter()
            .map(|part| VideoPart {
                checked: false,
                ..part.clone()
            })
            .collect::<Vec<_>>();
        log::debug!(
            "Opened part picker for {} ({} parts, {} selectable)",
            video.id,
            parts.len(),
            parts.iter().filter(|p| p.is_selectable()).count()
        );
        Self {
            video_id: video.id.clone(),
            parts,
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: SelectionListener) {
        self.listeners.push(listener);
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    /// The working copy, for rendering.
    pub fn parts(&self) -> &[VideoPart] {
        &self.parts
    }

    /// Enabled iff a not-yet-downloaded part is checked.
    pub fn confirm_enabled(&self) -> bool {
        self.parts.iter().any(|p| p.checked && p.is_selectable())
    }

    pub fn pick_all_label(&self) -> PickAllLabel {
        if self.all_selectable_checked() && self.selectable().next().is_some() {
            PickAllLabel::DeselectAll
        } else {
            PickAllLabel::SelectAll
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            confirm_enabled: self.confirm_enabled(),
            pick_all_label: self.pick_all_label(),
            checked: self
                .parts
                .iter()
                .filter(|p| p.checked)
                .map(|p| p.part_id.clone())
                .collect(),
        }
    }

    /// Flips one part. Returns its new state; parts already on disk never
    /// become checked and leave everything unchanged.
    pub fn toggle(&mut self, part_id: &str) -> Result<bool, SelectionError> {
        let part = self
            .parts
            .iter_mut()
            .find(|p| p.part_id == part_id)
            .ok_or_else(|| SelectionError::UnknownPart(part_id.to_string()))?;

        if !part.is_selectable() {
            log::debug!("Ignoring toggle of downloaded part {}", part_id);
            return Ok(false);
        }

        part.checked = !part.checked;
        let checked = part.checked;
        self.notify();
        Ok(checked)
    }

    /// Same as `toggle`, addressed by list position.
    pub fn toggle_at(&mut self, position: usize) -> Result<bool, SelectionError> {
        let part_id = self
            .parts
            .get(position)
            .map(|p| p.part_id.clone())
            .ok_or_else(|| SelectionError::UnknownPart(format!("#{}", position)))?;
        self.toggle(&part_id)
    }

    /// Deselects everything when every selectable part is checked, otherwise
    /// checks every selectable part. Returns the label to show afterwards.
    pub fn toggle_all(&mut self) -> PickAllLabel {
        if self.all_selectable_checked() {
            for part in &mut self.parts {
                part.checked = false;
            }
        } else {
            for part in self.parts.iter_mut().filter(|p| p.is_selectable()) {
                part.checked = true;
            }
        }
        self.notify();
        self.pick_all_label()
    }

    /// Checked, not-yet-downloaded parts in list order.
    pub fn confirm(self) -> Result<ConfirmedSelection, SelectionError> {
        let parts: Vec<VideoPart> = self
            .parts
            .into_iter()
            .filter(|p| p.checked && p.is_selectable())
            .collect();
        if parts.is_empty() {
            return Err(SelectionError::EmptySelection);
        }
        log::debug!("Confirmed {} parts of {}", parts.len(), self.video_id);
        Ok(ConfirmedSelection {
            video_id: self.video_id,
            parts,
        })
    }

    pub fn cancel(self) {
        log::debug!("Part picker for {} closed without download", self.video_id);
    }

    fn selectable(&self) -> impl Iterator<Item = &VideoPart> {
        self.parts.iter().filter(|p| p.is_selectable())
    }

    fn all_selectable_checked(&self) -> bool {
        self.selectable().all(|p| p.checked)
    }

    fn notify(&mut self) {
        if self.listeners.is_empty() {
            return;
        }
        let snapshot = self.snapshot();
        for listener in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

impl fmt::Debug for PartSelectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartSelectionController")
            .field("video_id", &self.video_id)
            .field("parts", &self.parts)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
