// File: providers/tucao/models.rs
// Records exchanged with the site and between the components.

use crate::core::{json, Result};
use serde::{Deserialize, Deserializer, Serialize};

// --- Raw responses ---

/// Undecoded body of an HTML or JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument(String);

impl RawDocument {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for RawDocument {
    fn from(body: String) -> Self {
        Self(body)
    }
}

// --- Video detail ---

/// One downloadable segment of a video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoPart {
    #[serde(rename = "vid")]
    pub part_id: String,
    #[serde(default)]
    pub title: String,
    /// Source type as reported by the site (`sina`, `tudou`, `video`, ...).
    #[serde(rename = "type", default)]
    pub source_type: String,
    #[serde(rename = "file", default)]
    pub remote_url: String,
    /// Position in the video's part list, starting at 1.
    #[serde(skip)]
    pub display_index: usize,
    /// Already fully downloaded.
    #[serde(skip)]
    pub local_presence: bool,
    /// Picker state; only ever set on a picker's working copy.
    #[serde(skip)]
    pub checked: bool,
}

impl VideoPart {
    pub fn new(part_id: impl Into<String>, display_index: usize, remote_url: impl Into<String>) -> Self {
        Self {
            part_id: part_id.into(),
            title: String::new(),
            source_type: String::new(),
            remote_url: remote_url.into(),
            display_index,
            local_presence: false,
            checked: false,
        }
    }

    /// A part can be picked only while it is not on disk yet.
    pub fn is_selectable(&self) -> bool {
        !self.local_presence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoResult {
    #[serde(rename = "hid")]
    pub id: String,
    pub title: String,
    #[serde(rename = "userid")]
    pub user_id: String,
    #[serde(rename = "user")]
    pub user_name: String,
    /// Epoch seconds.
    #[serde(rename = "create", deserialize_with = "de_epoch_seconds")]
    pub created_at: i64,
    #[serde(rename = "video", default)]
    pub parts: Vec<VideoPart>,
}

impl VideoResult {
    /// Decodes the detail JSON and numbers the parts in list order.
    pub fn parse_json(body: &str) -> Result<Self> {
        let mut result: VideoResult = json::parse_json_from_text(body, "video detail")?;
        for (index, part) in result.parts.iter_mut().enumerate() {
            part.display_index = index + 1;
        }
        Ok(result)
    }

    /// Marks parts already present locally. Unknown ids are ignored.
    pub fn mark_downloaded<'a>(&mut self, part_ids: impl IntoIterator<Item = &'a str>) {
        for id in part_ids {
            if let Some(part) = self.parts.iter_mut().find(|p| p.part_id == id) {
                part.local_presence = true;
            }
        }
    }
}

// The site sends `create` either as a number or as a numeric string.
fn de_epoch_seconds<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(i64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

// --- Uploader page ---

/// Fields scraped from a logged-in uploader page. Each may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploaderProfile {
    pub avatar_url: String,
    pub header_background: String,
    pub signature: String,
}

// --- POST payloads ---

#[derive(Debug, Clone, PartialEq)]
pub struct DanmakuPost {
    pub player_id: String,
    pub cid: String,
    /// Position in the video, seconds.
    pub stime: f32,
    pub message: String,
    pub user: String,
    pub size: u32,
    pub mode: u32,
    /// Packed `0xRRGGBB`.
    pub color: u32,
}

impl DanmakuPost {
    pub fn new(
        player_id: impl Into<String>,
        cid: impl Into<String>,
        stime: f32,
        message: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            cid: cid.into(),
            stime,
            message: message.into(),
            user: "test".to_string(),
            size: 25,
            mode: 1,
            color: 0xFF_FF_FF,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = color;
        self
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("cid", self.cid.clone()),
            ("stime", self.stime.to_string()),
            ("message", self.message.clone()),
            ("user", self.user.clone()),
            ("size", self.size.to_string()),
            ("mode", self.mode.to_string()),
            ("color", self.color.to_string()),
        ]
    }
}

/// Login credentials. `Debug` leaves out the password and code.
#[derive(Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub code: String,
    /// How long the server should remember the login, seconds.
    pub cookie_time: u32,
}

/// The server only accepts the submit button's own label.
pub const LOGIN_SUBMIT_LABEL: &str = "登录";
pub const DEFAULT_COOKIE_TIME: u32 = 31_536_000;

impl LoginForm {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        code: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            code: code.into(),
            cookie_time: DEFAULT_COOKIE_TIME,
        }
    }

    pub(crate) fn form(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.clone()),
            ("password", self.password.clone()),
            ("code", self.code.clone()),
            ("cookietime", self.cookie_time.to_string()),
            ("dosubmit", LOGIN_SUBMIT_LABEL.to_string()),
        ]
    }
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("cookie_time", &self.cookie_time)
            .finish_non_exhaustive()
    }
}
