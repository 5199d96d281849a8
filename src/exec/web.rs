//! HTTP-backed handlers: weather lookup and browser searches.
//!
//! [`WebClient`] is the seam for plain GET-and-read requests; search handlers
//! only build URLs and hand them to the browser via [`Desktop::open_url`].
//! YouTube playback scrapes the first video id out of the results page, which
//! is brittle by nature and degrades to a failure result when the markup
//! shifts.

use std::sync::OnceLock;
use std::time::Duration;

use miette::Diagnostic;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::desktop::Desktop;
use super::ActionResult;

/// Errors from the web subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum WebError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(atlas::web::request_failed),
        help("Check network connectivity.")
    )]
    RequestFailed { url: String, message: String },

    #[error("could not read response from {url}: {message}")]
    #[diagnostic(code(atlas::web::read_failed))]
    ReadFailed { url: String, message: String },
}

pub type WebResult<T> = std::result::Result<T, WebError>;

/// The seam for outbound HTTP reads.
pub trait WebClient: Send + Sync {
    /// GET a URL and return the response body as text.
    fn get_text(&self, url: &str) -> WebResult<String>;
}

/// Production client with a short per-request timeout.
#[derive(Debug, Clone)]
pub struct UreqWebClient {
    agent: ureq::Agent,
}

impl UreqWebClient {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout(Duration::from_secs(5))
                .build(),
        }
    }
}

impl Default for UreqWebClient {
    fn default() -> Self {
        Self::new()
    }
}

impl WebClient for UreqWebClient {
    fn get_text(&self, url: &str) -> WebResult<String> {
        let resp = self
            .agent
            .get(url)
            .call()
            .map_err(|e| WebError::RequestFailed {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        resp.into_string().map_err(|e| WebError::ReadFailed {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

fn query_encode(query: &str) -> String {
    query.trim().replace(' ', "+")
}

/// Current weather for the machine's approximate location.
///
/// Geolocates by IP, then asks wttr.in for its one-line format. Either hop
/// failing produces a failure result rather than an error; weather is never
/// load-bearing.
pub fn get_weather(web: &dyn WebClient) -> ActionResult {
    let geo = match web.get_text("https://ipinfo.io/json") {
        Ok(body) => body,
        Err(e) => return ActionResult::failure(format!("❌ Could not determine location: {e}")),
    };

    let json: serde_json::Value = match serde_json::from_str(&geo) {
        Ok(v) => v,
        Err(e) => return ActionResult::failure(format!("❌ Could not parse location data: {e}")),
    };
    let city = json["city"].as_str().unwrap_or("");
    let region = json["region"].as_str().unwrap_or("");
    let location = match (city.is_empty(), region.is_empty()) {
        (false, false) => format!("{city},{region}"),
        (false, true) => city.to_string(),
        _ => return ActionResult::failure("⚠️ Location lookup returned no city."),
    };
    debug!(%location, "resolved weather location");

    let url = format!("https://wttr.in/{}?format=3", location.replace(' ', "%20"));
    match web.get_text(&url) {
        Ok(report) => ActionResult::ok(format!("🌦️ {}", report.trim())),
        Err(e) => ActionResult::failure(format!("❌ Weather lookup failed: {e}")),
    }
}

/// Open a Google search for the query in the default browser.
pub fn google_search(desktop: &dyn Desktop, query: &str) -> ActionResult {
    let url = format!("https://www.google.com/search?q={}", query_encode(query));
    match desktop.open_url(&url) {
        Ok(()) => ActionResult::ok(format!("🌐 Searching Google for: {}", query.trim())),
        Err(e) => ActionResult::failure(format!("❌ Could not open browser: {e}")),
    }
}

/// Open YouTube search results for the query.
pub fn youtube_search(desktop: &dyn Desktop, query: &str) -> ActionResult {
    let url = format!(
        "https://www.youtube.com/results?search_query={}",
        query_encode(query)
    );
    match desktop.open_url(&url) {
        Ok(()) => ActionResult::ok(format!("📺 Searching YouTube for: {}", query.trim())),
        Err(e) => ActionResult::failure(format!("❌ Could not open browser: {e}")),
    }
}

fn video_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#""videoId":"([^"]{11})""#).unwrap())
}

/// Play the top YouTube result for the query.
///
/// Scrapes the first `videoId` from the search results page and opens the
/// corresponding watch URL directly.
pub fn youtube_play(web: &dyn WebClient, desktop: &dyn Desktop, query: &str) -> ActionResult {
    let search_url = format!(
        "https://www.youtube.com/results?search_query={}",
        query_encode(query)
    );
    let page = match web.get_text(&search_url) {
        Ok(body) => body,
        Err(e) => return ActionResult::failure(format!("❌ YouTube search failed: {e}")),
    };

    let Some(caps) = video_id_pattern().captures(&page) else {
        return ActionResult::failure("❌ Could not find a video to play.");
    };
    let watch_url = format!("https://www.youtube.com/watch?v={}", &caps[1]);

    match desktop.open_url(&watch_url) {
        Ok(()) => ActionResult::ok(format!("▶️ Playing: {watch_url}")),
        Err(e) => ActionResult::failure(format!("❌ Could not open browser: {e}")),
    }
}
