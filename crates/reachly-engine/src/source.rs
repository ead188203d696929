//! Profile sources: fetched web pages (LinkedIn included) and pasted text.

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT_LANGUAGE, COOKIE};
use reqwest::{Client, Url};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};

use reachly_core::{FetchError, ProfileSource, ProspectSource};
use reachly_llm::truncate_to_budget;
use reachly_settings::ScrapingSettings;

const HTML_WRAP_WIDTH: usize = 100;
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Script bodies containing any of these (case-insensitive) carry LinkedIn profile data.
const PROFILE_SCRIPT_MARKERS: [&str; 5] = ["profile", "experience", "education", "firstname", "lastname"];

// Whole lines of page chrome; matched case-insensitively after trimming.
static NOISE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:sign in.*|join linkedin.*|linkedin member|see more|show less|followers?\s*\d+|connections?\s*\d+|message|connect)$",
    )
    .unwrap()
});

static HSPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static BLANK_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Fetches a profile page over HTTP and reduces it to plain text.
///
/// LinkedIn pages additionally keep embedded profile JSON payloads and send the
/// configured `li_at` session cookie.
pub struct WebProfileSource {
    http: Client,
    kind: ProspectSource,
    linkedin_cookie: Option<String>,
    max_chars: usize,
}

impl WebProfileSource {
    pub fn new(settings: &ScrapingSettings, kind: ProspectSource) -> reqwest::Result<Self> {
        let http = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            kind,
            linkedin_cookie: settings.linkedin_cookie.clone(),
            max_chars: settings.max_profile_chars,
        })
    }

    /// Source configured for the host of `url`.
    pub fn for_url(settings: &ScrapingSettings, url: &str) -> Result<Self, FetchError> {
        let kind = if is_linkedin_url(&parse_locator(url)?) {
            ProspectSource::Linkedin
        } else {
            ProspectSource::Web
        };
        Self::new(settings, kind).map_err(|e| FetchError::Network {
            url: url.to_string(),
            detail: e.to_string(),
        })
    }

    fn is_linkedin(&self) -> bool {
        self.kind == ProspectSource::Linkedin
    }
}

#[async_trait]
impl ProfileSource for WebProfileSource {
    fn kind(&self) -> ProspectSource {
        self.kind
    }

    #[instrument(skip(self), fields(kind = %self.kind))]
    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let url = parse_locator(locator)?;
        info!("fetching profile page");

        let mut request = self.http.get(url).header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);
        if self.is_linkedin() {
            match &self.linkedin_cookie {
                Some(cookie) => request = request.header(COOKIE, format!("li_at={cookie}")),
                None => warn!("no LinkedIn session cookie configured, page may be a login wall"),
            }
        }

        let network = |e: reqwest::Error| FetchError::Network {
            url: locator.to_string(),
            detail: e.to_string(),
        };
        let resp = request.send().await.map_err(network)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: locator.to_string(),
                status: status.as_u16(),
            });
        }
        let html = resp.text().await.map_err(network)?;

        let text = html_to_profile_text(&html, self.is_linkedin());
        if text.is_empty() {
            return Err(FetchError::Empty(locator.to_string()));
        }
        debug!(chars = text.chars().count(), "profile text extracted");
        Ok(truncate_to_budget(&text, self.max_chars))
    }
}

/// Pasted profile text. The locator is the text itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct RawTextSource;

#[async_trait]
impl ProfileSource for RawTextSource {
    fn kind(&self) -> ProspectSource {
        ProspectSource::RawText
    }

    async fn fetch(&self, locator: &str) -> Result<String, FetchError> {
        let text = normalize_text(locator);
        if text.is_empty() {
            return Err(FetchError::Empty("pasted text".into()));
        }
        Ok(text)
    }
}

fn parse_locator(locator: &str) -> Result<Url, FetchError> {
    let url = Url::parse(locator.trim())
        .map_err(|e| FetchError::InvalidLocator(format!("{locator}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidLocator(format!(
            "{locator}: unsupported scheme {other}"
        ))),
    }
}

pub fn is_linkedin_url(url: &Url) -> bool {
    url.host_str()
        .is_some_and(|host| host == "linkedin.com" || host.ends_with(".linkedin.com"))
}

/// Page title, visible text without UI noise and, when asked, profile script payloads.
pub fn html_to_profile_text(html: &str, with_profile_scripts: bool) -> String {
    let mut parts = Vec::new();

    // Parsed document is not Send; keep it inside this synchronous scope.
    let document = Html::parse_document(html);
    if let Some(title) = select_first_text(&document, "title") {
        parts.push(title);
    }

    let visible = html2text::from_read(html.as_bytes(), HTML_WRAP_WIDTH).unwrap_or_default();
    let visible = strip_noise(&visible);
    if !visible.is_empty() {
        parts.push(visible);
    }

    if with_profile_scripts {
        if let Ok(selector) = Selector::parse("script") {
            for script in document.select(&selector) {
                let body = script.text().collect::<String>();
                let lower = body.to_lowercase();
                if PROFILE_SCRIPT_MARKERS.iter().any(|m| lower.contains(m)) {
                    parts.push(body.trim().to_string());
                }
            }
        }
    }

    let combined = parts.join("\n\n");
    collapse_blank_runs(&combined).trim().to_string()
}

fn select_first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    let text = document
        .select(&selector)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

/// Drop lines that are entirely page chrome ("See more", "Followers 500", ...).
pub fn strip_noise(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .filter(|line| !NOISE_LINE_RE.is_match(line.trim()))
        .collect();
    collapse_blank_runs(&kept.join("\n")).trim().to_string()
}

/// CRLF to LF, runs of spaces/tabs to one space, at most one blank line in a row.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace("\r\n", "\n");
    let text = HSPACE_RE.replace_all(&text, " ");
    collapse_blank_runs(&text).trim().to_string()
}

fn collapse_blank_runs(text: &str) -> String {
    BLANK_RUN_RE.replace_all(text, "\n\n").into_owned()
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use reachly_llm::TRUNCATION_MARKER;

    use super::*;

    const PROFILE_HTML: &str = r#"<html>
<head><title>Jalaja Utekar | LinkedIn</title></head>
<body>
<p>Software Testing Intern @ Eqanim Tech Pvt Ltd</p>
<p>See more</p>
<p>Followers 512</p>
<p>Passionate about test automation.</p>
<script>var tracking = 1;</script>
<script type="application/ld+json">{"firstName":"Jalaja","experience":[]}</script>
</body>
</html>"#;

    fn settings(cookie: Option<&str>) -> ScrapingSettings {
        ScrapingSettings {
            linkedin_cookie: cookie.map(Into::into),
            ..Default::default()
        }
    }

    #[test]
    fn html_keeps_title_and_drops_noise() {
        let text = html_to_profile_text(PROFILE_HTML, false);
        assert!(text.starts_with("Jalaja Utekar | LinkedIn"));
        assert!(text.contains("Software Testing Intern @ Eqanim Tech Pvt Ltd"));
        assert!(text.contains("Passionate about test automation."));
        assert!(!text.contains("See more"));
        assert!(!text.contains("Followers 512"));
        assert!(!text.contains("firstName"));
    }

    #[test]
    fn linkedin_keeps_profile_scripts_only() {
        let text = html_to_profile_text(PROFILE_HTML, true);
        assert!(text.contains(r#"{"firstName":"Jalaja","experience":[]}"#));
        assert!(!text.contains("tracking"));
    }

    #[test]
    fn noise_only_matches_whole_lines() {
        let text = strip_noise("Message\nMessaged the team about releases\nConnect\nConnections 500+\nSign in to view");
        assert_eq!(text, "Messaged the team about releases\nConnections 500+");
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize_text("  Jo\r\nBackend \t engineer\n\n\n\nLoves   Rust  "),
            "Jo\nBackend engineer\n\nLoves Rust"
        );
    }

    #[test]
    fn linkedin_host_detection() {
        let yes = Url::parse("https://www.linkedin.com/in/jalaja").unwrap();
        let no = Url::parse("https://notlinkedin.com/in/jalaja").unwrap();
        assert!(is_linkedin_url(&yes));
        assert!(!is_linkedin_url(&no));
    }

    #[test]
    fn for_url_picks_kind() {
        let s = settings(None);
        assert_eq!(
            WebProfileSource::for_url(&s, "https://www.linkedin.com/in/x").unwrap().kind(),
            ProspectSource::Linkedin
        );
        assert_eq!(
            WebProfileSource::for_url(&s, "https://jo.dev/about").unwrap().kind(),
            ProspectSource::Web
        );
        assert!(matches!(
            WebProfileSource::for_url(&s, "ftp://jo.dev"),
            Err(FetchError::InvalidLocator(_))
        ));
        assert!(matches!(
            WebProfileSource::for_url(&s, "not a url"),
            Err(FetchError::InvalidLocator(_))
        ));
    }

    #[tokio::test]
    async fn fetch_sends_cookie_for_linkedin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/in/jalaja"))
            .and(header("cookie", "li_at=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
            .expect(1)
            .mount(&server)
            .await;

        let source = WebProfileSource::new(&settings(Some("secret")), ProspectSource::Linkedin).unwrap();
        let text = source.fetch(&format!("{}/in/jalaja", server.uri())).await.unwrap();
        assert!(text.starts_with("Jalaja Utekar | LinkedIn"));
        assert!(text.contains("firstName"));

        let received = server.received_requests().await.unwrap();
        let lang = received[0].headers.get("accept-language").unwrap();
        assert_eq!(lang.to_str().unwrap(), ACCEPT_LANGUAGE_VALUE);
    }

    #[tokio::test]
    async fn fetch_web_page_without_cookie() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/about"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PROFILE_HTML))
            .mount(&server)
            .await;

        let source = WebProfileSource::new(&settings(Some("secret")), ProspectSource::Web).unwrap();
        let text = source.fetch(&format!("{}/about", server.uri())).await.unwrap();
        assert!(!text.contains("firstName"));

        let received = server.received_requests().await.unwrap();
        assert!(received[0].headers.get("cookie").is_none());
    }

    #[tokio::test]
    async fn fetch_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = WebProfileSource::new(&settings(None), ProspectSource::Web).unwrap();
        let err = source.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn fetch_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html><body></body></html>"))
            .mount(&server)
            .await;

        let source = WebProfileSource::new(&settings(None), ProspectSource::Web).unwrap();
        let err = source.fetch(&server.uri()).await.unwrap_err();
        assert!(matches!(err, FetchError::Empty(_)));
    }

    #[tokio::test]
    async fn fetch_truncates_to_budget() {
        let server = MockServer::start().await;
        let body = format!("<html><body><p>{}</p></body></html>", "word ".repeat(400));
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let s = ScrapingSettings {
            max_profile_chars: 200,
            ..Default::default()
        };
        let source = WebProfileSource::new(&s, ProspectSource::Web).unwrap();
        let text = source.fetch(&server.uri()).await.unwrap();
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert!(text.chars().count() <= 200 + TRUNCATION_MARKER.len());
    }

    #[tokio::test]
    async fn connection_refused_is_network_error() {
        let source = WebProfileSource::new(&settings(None), ProspectSource::Web).unwrap();
        let err = source.fetch("http://127.0.0.1:1/profile").await.unwrap_err();
        assert!(matches!(err, FetchError::Network { .. }));
    }

    #[tokio::test]
    async fn raw_text_is_normalized() {
        let text = RawTextSource.fetch("Jo  | LinkedIn\r\n\n\n\nEngineer @ Acme").await.unwrap();
        assert_eq!(text, "Jo | LinkedIn\n\nEngineer @ Acme");
        assert_eq!(RawTextSource.kind(), ProspectSource::RawText);
    }

    #[tokio::test]
    async fn raw_text_blank_is_empty_error() {
        assert!(matches!(RawTextSource.fetch(" \n\t ").await, Err(FetchError::Empty(_))));
    }
}
