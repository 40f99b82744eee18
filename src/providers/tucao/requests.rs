// File: providers/tucao/requests.rs
// ApiClient: one method per site endpoint, raw bodies out.

use super::extractor::{self, HEADER_NODE};
use super::models::{DanmakuPost, LoginForm, RawDocument, UploaderProfile, VideoResult};
use crate::core::config::ClientConfig;
use crate::core::error::{CoreError, Result};
use crate::core::http;
use futures_util::{Stream, StreamExt};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderValue, COOKIE};
use reqwest::{Client, Method, Request, Response, StatusCode};
use std::sync::Arc;
use url::Url;

// --- Endpoint paths (relative to the configured base URL) ---

const INDEX_PATH: &str = "";
const VIEW_PATH: &str = "api_v2/view.php";
const DANMAKU_PATH: &str = "index.php?m=mukio&c=index&a=init";
const SEND_DANMAKU_PATH: &str = "index.php?m=mukio&c=index&a=post";
const COMMENT_PATH: &str = "index.php?m=comment&c=index&a=ajax";
const SEND_COMMENT_PATH: &str = "index.php?m=comment&c=index&a=post";
const CHECK_CODE_PATH: &str = "api.php?op=checkcode&code_len=4&font_size=14&width=100&height=40";
const LOGIN_PATH: &str = "index.php?m=member&c=index&a=login";
const LOGOUT_PATH: &str = "index.php?m=member&c=index&a=logout";
const PERSONAL_PATH: &str = "index.php?m=member&c=index";
const SPACE_PATH: &str = "index.php?m=member&c=space";

fn list_path(tid: u32) -> String {
    format!("list/{}/", tid)
}

fn schedule_path(year: i32, month: u32) -> String {
    format!("bgm/{}/{:02}/", year, month)
}

fn uploader_path(user_id: &str) -> String {
    format!("play/u{}/", user_id)
}

// --- Endpoint description ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Needs the session cookie.
    Member,
    /// Login, logout and the captcha image.
    Public,
}

/// Everything needed to build one request.
#[derive(Debug)]
pub(crate) struct Endpoint {
    name: &'static str,
    method: Method,
    path: String,
    query: Vec<(&'static str, String)>,
    form: Option<Vec<(&'static str, String)>>,
    access: Access,
}

impl Endpoint {
    fn get(name: &'static str, path: impl Into<String>, access: Access) -> Self {
        Self {
            name,
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            form: None,
            access,
        }
    }

    fn post(name: &'static str, path: impl Into<String>, access: Access) -> Self {
        Self {
            method: Method::POST,
            form: Some(Vec::new()),
            ..Self::get(name, path, access)
        }
    }

    fn query(mut self, key: &'static str, value: impl ToString) -> Self {
        self.query.push((key, value.to_string()));
        self
    }

    fn form(mut self, fields: Vec<(&'static str, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    fn index() -> Self {
        Self::get("index", INDEX_PATH, Access::Member)
    }

    fn video_list(tid: u32) -> Self {
        Self::get("video list", list_path(tid), Access::Member)
    }

    fn schedule(year: i32, month: u32) -> Self {
        Self::get("schedule", schedule_path(year, month), Access::Member)
    }

    fn video(hid: &str) -> Self {
        Self::get("video detail", VIEW_PATH, Access::Member)
            .query("hid", hid)
            .query("type", "json")
    }

    fn danmaku(player_id: &str, cache_buster: i64) -> Self {
        Self::get("danmaku", DANMAKU_PATH, Access::Member)
            .query("playerID", player_id)
            .query("r", cache_buster)
    }

    fn send_danmaku(post: &DanmakuPost) -> Self {
        Self::post("send danmaku", SEND_DANMAKU_PATH, Access::Member)
            .query("playerID", &post.player_id)
            .form(post.form())
    }

    fn comments(comment_id: &str, page: u32) -> Self {
        Self::get("comments", COMMENT_PATH, Access::Member)
            .query("commentid", comment_id)
            .query("page", page)
    }

    fn send_comment(comment_id: &str, content: &str) -> Self {
        Self::post("send comment", SEND_COMMENT_PATH, Access::Member)
            .query("commentid", comment_id)
            .form(vec![("content", content.to_string())])
    }

    fn download(url: &str) -> Self {
        Self::get("download", url, Access::Member)
    }

    fn check_code() -> Self {
        Self::get("check code", CHECK_CODE_PATH, Access::Public)
    }

    fn login_form() -> Self {
        Self::get("login form", LOGIN_PATH, Access::Public)
    }

    fn login(form: &LoginForm) -> Self {
        Self::post("login", LOGIN_PATH, Access::Public).form(form.form())
    }

    fn logout() -> Self {
        Self::get("logout", LOGOUT_PATH, Access::Public)
    }

    fn personal() -> Self {
        Self::get("personal", PERSONAL_PATH, Access::Member)
    }

    fn uploader_page(user_id: &str) -> Self {
        Self::get("uploader page", uploader_path(user_id), Access::Member)
    }

    fn space(uid: &str, page: u32) -> Self {
        Self::get("space", SPACE_PATH, Access::Member)
            .query("uid", uid)
            .query("page", page)
    }
}

// --- Streaming download handle ---

/// Body of a download that has not been read yet.
#[derive(Debug)]
pub struct DownloadStream {
    response: Response,
}

impl DownloadStream {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    pub fn url(&self) -> &Url {
        self.response.url()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.response.content_length()
    }

    /// Next chunk of the body, `None` at the end.
    pub async fn chunk(&mut self) -> Result<Option<Vec<u8>>> {
        Ok(self.response.chunk().await?.map(|bytes| bytes.to_vec()))
    }

    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<u8>>> {
        self.response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(CoreError::from))
    }
}

// --- ApiClient ---

/// Typed wrapper over the site's endpoints.
///
/// Every call is a single request/response pair. Nothing is retried here;
/// failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct ApiClient {
    config: ClientConfig,
    client: Client,
    jar: Arc<Jar>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = http::create_http_client(&config, jar.clone())?;
        Ok(Self {
            config,
            client,
            jar,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolves an endpoint into a ready-to-send request.
    ///
    /// Member endpoints carry the configured session cookie plus whatever
    /// the site has set on this client so far. Without a session cookie they
    /// fail with `AuthRequired` and nothing goes on the wire.
    pub(crate) fn prepare(&self, endpoint: Endpoint) -> Result<Request> {
        let mut url = self.config.base_url.join(&endpoint.path)?;
        if !endpoint.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &endpoint.query {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self.client.request(endpoint.method, url.clone());

        if endpoint.access == Access::Member {
            let cookie = self.config.session_cookie.as_ref().ok_or(CoreError::AuthRequired {
                endpoint: endpoint.name,
            })?;
            let mut header = cookie.header_value();
            if let Some(stored) = self.jar.cookies(&url) {
                if let Ok(stored) = stored.to_str() {
                    header = format!("{}; {}", header, stored);
                }
            }
            let value = HeaderValue::from_str(&header)
                .map_err(|e| CoreError::InvalidHeader(format!("Invalid session cookie: {}", e)))?;
            builder = builder.header(COOKIE, value);
        }

        if let Some(fields) = &endpoint.form {
            builder = builder.form(fields);
        }

        Ok(builder.build()?)
    }

    async fn send_text(&self, endpoint: Endpoint) -> Result<RawDocument> {
        let request = self.prepare(endpoint)?;
        let body = http::fetch_text(&self.client, request).await?;
        Ok(RawDocument::from(body))
    }

    // --- Listing pages ---

    pub async fn fetch_index(&self) -> Result<RawDocument> {
        self.send_text(Endpoint::index()).await
    }

    /// Paginated list of one category.
    pub async fn fetch_video_list(&self, tid: u32) -> Result<RawDocument> {
        self.send_text(Endpoint::video_list(tid)).await
    }

    /// Broadcast schedule for one calendar month.
    pub async fn fetch_schedule(&self, year: i32, month: u32) -> Result<RawDocument> {
        self.send_text(Endpoint::schedule(year, month)).await
    }

    pub async fn fetch_video_document(&self, hid: &str) -> Result<RawDocument> {
        self.send_text(Endpoint::video(hid)).await
    }

    /// Video detail decoded into a `VideoResult`.
    pub async fn fetch_video(&self, hid: &str) -> Result<VideoResult> {
        let document = self.fetch_video_document(hid).await?;
        VideoResult::parse_json(document.as_str())
    }

    // --- Danmaku and comments ---

    pub async fn fetch_danmaku(&self, player_id: &str) -> Result<RawDocument> {
        let cache_buster = chrono::Utc::now().timestamp_millis();
        self.send_text(Endpoint::danmaku(player_id, cache_buster)).await
    }

    pub async fn send_danmaku(&self, post: &DanmakuPost) -> Result<RawDocument> {
        log::debug!("Sending danmaku to {} at {}s", post.player_id, post.stime);
        self.send_text(Endpoint::send_danmaku(post)).await
    }

    pub async fn fetch_comments(&self, comment_id: &str, page: u32) -> Result<RawDocument> {
        self.send_text(Endpoint::comments(comment_id, page)).await
    }

    pub async fn send_comment(&self, comment_id: &str, content: &str) -> Result<RawDocument> {
        self.send_text(Endpoint::send_comment(comment_id, content)).await
    }

    // --- Downloads ---

    /// Starts a GET on an arbitrary URL and hands back the unread body.
    pub async fn download_stream(&self, url: &str) -> Result<DownloadStream> {
        let request = self.prepare(Endpoint::download(url))?;
        let response = http::execute(&self.client, request).await?;
        Ok(DownloadStream { response })
    }

    // --- Session ---

    /// Captcha image for the login form.
    pub async fn fetch_check_code(&self) -> Result<Vec<u8>> {
        let request = self.prepare(Endpoint::check_code())?;
        http::fetch_bytes(&self.client, request).await
    }

    pub async fn fetch_login_form(&self) -> Result<RawDocument> {
        self.send_text(Endpoint::login_form()).await
    }

    pub async fn login(&self, form: &LoginForm) -> Result<RawDocument> {
        let document = self.send_text(Endpoint::login(form)).await?;
        log::info!("Login submitted for {}", form.username);
        Ok(document)
    }

    pub async fn logout(&self) -> Result<RawDocument> {
        let document = self.send_text(Endpoint::logout()).await?;
        log::info!("Logged out");
        Ok(document)
    }

    // --- Member pages ---

    pub async fn fetch_personal(&self) -> Result<RawDocument> {
        self.send_text(Endpoint::personal()).await
    }

    pub async fn fetch_uploader_page(&self, user_id: &str) -> Result<RawDocument> {
        self.send_text(Endpoint::uploader_page(user_id)).await
    }

    pub async fn fetch_space(&self, uid: &str, page: u32) -> Result<RawDocument> {
        self.send_text(Endpoint::space(uid, page)).await
    }

    /// Uploader page run through the extractor.
    ///
    /// The anonymous rendering of the page has no header block, so a missing
    /// header is reported as `AuthRequired`.
    pub async fn fetch_uploader_profile(&self, user_id: &str) -> Result<UploaderProfile> {
        let document = self.fetch_uploader_page(user_id).await?;
        extractor::extract_profile(&document).map_err(|e| match e {
            CoreError::MalformedDocument { node } if node == HEADER_NODE => {
                log::warn!("Uploader page for {} rendered without login", user_id);
                CoreError::AuthRequired {
                    endpoint: "uploader page",
                }
            }
            other => {
                log::warn!("Uploader page for {} could not be parsed: {}", user_id, other);
                other
            }
        })
    }
}
