// File: providers/tucao/mod.rs
// The tucao site provider.

pub mod extractor;
pub mod models;
pub mod requests;

pub use extractor::extract_profile;
pub use models::{DanmakuPost, LoginForm, RawDocument, UploaderProfile, VideoPart, VideoResult};
pub use requests::{ApiClient, DownloadStream};
