//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_harvest::config::{Config, UserAgentConfig};
use site_harvest::{Fetcher, LocaleConfig, PageOutcome, SiteError, UrlError};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration writing under `output`
fn create_test_config(output: &Path) -> Config {
    let mut config = Config::default();
    config.crawler.max_depth = 3;
    config.crawler.politeness_delay_ms = 0; // No spacing needed against a mock server
    config.crawler.workers = 2;
    config.crawler.page_timeout_secs = 5;
    config.crawler.probe_timeout_secs = 5;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
    };
    config.output.base_dir = output.display().to_string();
    config
}

fn html_page(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_raw(
            format!("<html><head><title>t</title></head><body>{}</body></html>", body),
            "text/html; charset=utf-8",
        )
}

/// Directory pages from this server are written to
fn site_dir(output: &Path, server: &MockServer) -> PathBuf {
    let addr = server.address();
    output.join("crawl").join(format!("{}:{}", addr.ip(), addr.port()))
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/page1">Page 1</a>
               <a href="page2#intro">Page 2</a>
               <a href="https://other.example.org/elsewhere">Elsewhere</a>
               <a href="/static/style.css">Style</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page1"))
        .respond_with(html_page(r#"<a href="/">Home</a><a href="/page2">Page 2</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(html_page(r#"<p>Leaf</p>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 3);
    assert_eq!(summary.count(PageOutcome::Saved), 3);
    assert_eq!(summary.count(PageOutcome::OffDomain), 1);
    assert_eq!(summary.count(PageOutcome::NonHtmlResource), 1);
    assert!(summary.count(PageOutcome::AlreadyVisited) >= 2);
    assert!(!summary.cancelled);

    let site = site_dir(temp.path(), &mock_server);
    assert!(site.join("index.html").is_file());
    assert!(site.join("page1.html").is_file());
    let leaf = std::fs::read_to_string(site.join("page2.html")).unwrap();
    assert!(leaf.contains("Leaf"));
}

#[tokio::test]
async fn test_robots_disallow_is_respected() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /private/\n\nUser-agent: OtherBot\nDisallow: /\n"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/private/secret">Secret</a><a href="/public">Public</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/public"))
        .respond_with(html_page("public"))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(html_page("secret"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 2);
    assert_eq!(summary.count(PageOutcome::RobotsDenied), 1);
    assert!(!site_dir(temp.path(), &mock_server)
        .join("private/secret.html")
        .exists());
}

#[tokio::test]
async fn test_depth_limit_enforced() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/level1">Level 1</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/level1"))
        .respond_with(html_page(r#"<a href="/level2">Level 2</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Depth 2 exceeds max_depth = 1
    Mock::given(method("GET"))
        .and(path("/level2"))
        .respond_with(html_page("too deep"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path())).with_max_depth(1);
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 2);
    assert_eq!(summary.count(PageOutcome::DepthExceeded), 1);
}

#[tokio::test]
async fn test_non_html_content_type_skipped() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/download">Manual</a>"#))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF-1.4 fake".to_vec())
                .insert_header("content-type", "application/pdf"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 1);
    assert_eq!(summary.count(PageOutcome::ContentMismatch), 1);
    assert!(!site_dir(temp.path(), &mock_server)
        .join("download.html")
        .exists());
}

#[tokio::test]
async fn test_cyclic_links_fetched_once() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    for (page, next) in [("/a", "/b"), ("/b", "/c"), ("/c", "/a")] {
        Mock::given(method("GET"))
            .and(path(page))
            .respond_with(html_page(&format!(
                r#"<a href="{}">next</a><a href="{}">self</a><a href="/a">start</a>"#,
                next, page
            )))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(temp.path());
    config.crawler.workers = 4;
    config.crawler.max_depth = 10;

    let fetcher = Fetcher::new(config);
    let summary = fetcher
        .fetch(&format!("{}/a", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.pages_saved, 3);
    assert_eq!(summary.count(PageOutcome::Saved), 3);
}

#[tokio::test]
async fn test_http_errors_do_not_abort_crawl() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            r#"<a href="/missing">Missing</a><a href="/broken">Broken</a><a href="/ok">Ok</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(html_page("fine"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 2);
    assert_eq!(summary.count(PageOutcome::DeadLink), 1);
    assert_eq!(summary.count(PageOutcome::HttpError), 1);
    assert_eq!(summary.error_count(), 2);
}

#[tokio::test]
async fn test_legacy_charset_saved_as_utf8() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let (body, _, _) = encoding_rs::SHIFT_JIS.encode("<html><body><p>日本語のページ</p></body></html>");
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body.into_owned(), "text/html; charset=Shift_JIS"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();
    assert_eq!(summary.pages_saved, 1);

    let saved = std::fs::read_to_string(site_dir(temp.path(), &mock_server).join("index.html")).unwrap();
    assert!(saved.contains("日本語のページ"));
}

#[tokio::test]
async fn test_previous_crawl_output_is_replaced() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    let stale = temp.path().join("crawl/stale.example.com/old.html");
    std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
    std::fs::write(&stale, "old").unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("fresh"))
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert!(!stale.exists());
    assert!(site_dir(temp.path(), &mock_server).join("index.html").is_file());
}

#[tokio::test]
async fn test_politeness_delay_spaces_requests() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(r#"<a href="/one">1</a><a href="/two">2</a>"#))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(html_page("one"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(html_page("two"))
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(temp.path());
    config.crawler.politeness_delay_ms = 200;
    config.crawler.workers = 4;

    let fetcher = Fetcher::new(config);
    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();

    assert_eq!(summary.pages_saved, 3);
    // Three page GETs to one origin need at least two full delays
    assert!(
        summary.elapsed >= Duration::from_millis(400),
        "elapsed {:?}",
        summary.elapsed
    );
}

#[tokio::test]
async fn test_cancelled_before_start() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("never"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let fetcher = Fetcher::new(create_test_config(temp.path()));
    fetcher.cancellation_token().cancel();

    let summary = fetcher.fetch(&mock_server.uri()).await.unwrap();
    assert!(summary.cancelled);
    assert_eq!(summary.pages_saved, 0);
}

#[tokio::test]
async fn test_invalid_start_urls() {
    let temp = TempDir::new().unwrap();
    let fetcher = Fetcher::new(create_test_config(temp.path()));

    let result = fetcher.fetch("ftp://example.com/docs").await;
    assert!(matches!(
        result,
        Err(SiteError::UrlError(UrlError::InvalidScheme(ref scheme))) if scheme == "ftp"
    ));

    let result = fetcher.fetch("https://").await;
    assert!(matches!(
        result,
        Err(SiteError::UrlError(UrlError::MissingDomain)) | Err(SiteError::UrlError(UrlError::Parse(_)))
    ));
}

// ===== Locale-aware crawling =====

#[tokio::test]
async fn test_locale_path_mode_prefers_priority_locale() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/en/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/en/docs/intro"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/en/docs/"))
        .respond_with(html_page(
            r#"<a href="/ja/docs/intro">Intro (ja)</a>
               <a href="/en/docs/intro">Intro (en)</a>
               <a href="/ja/docs/">Home (ja)</a>"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/en/docs/intro"))
        .respond_with(html_page("intro"))
        .expect(1)
        .mount(&mock_server)
        .await;

    // The Japanese versions are never downloaded
    Mock::given(method("GET"))
        .and(path("/ja/docs/"))
        .respond_with(html_page("ja"))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ja/docs/intro"))
        .respond_with(html_page("ja intro"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let locale = LocaleConfig::path_based(vec!["en".to_string(), "ja".to_string()]);
    let fetcher = Fetcher::new(create_test_config(temp.path())).with_locale(Some(locale));
    let summary = fetcher
        .fetch(&format!("{}/ja/docs/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.pages_saved, 2);
    assert_eq!(summary.count(PageOutcome::AlreadyVisited), 2);

    let site = site_dir(temp.path(), &mock_server);
    assert!(site.join("en/docs.html").is_file());
    assert!(site.join("en/docs/intro.html").is_file());
    assert!(!site.join("ja").exists());
}

#[tokio::test]
async fn test_locale_probe_server_error_aborts_canonical() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/en/docs/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    // No fallthrough to the next locale or the literal URL
    Mock::given(method("HEAD"))
        .and(path("/ja/docs/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ja/docs/"))
        .respond_with(html_page("ja"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let locale = LocaleConfig::path_based(vec!["en".to_string(), "ja".to_string()]);
    let fetcher = Fetcher::new(create_test_config(temp.path())).with_locale(Some(locale));
    let summary = fetcher
        .fetch(&format!("{}/ja/docs/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.pages_saved, 0);
    assert_eq!(summary.count(PageOutcome::LocaleAborted), 1);
}

#[tokio::test]
async fn test_locale_falls_back_to_literal_url() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/en/guide/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/guide/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/guide/"))
        .respond_with(html_page(r#"<a href="/guide/missing">Missing</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let locale = LocaleConfig::path_based(vec!["en".to_string()]);
    let fetcher = Fetcher::new(create_test_config(temp.path())).with_locale(Some(locale));
    let summary = fetcher
        .fetch(&format!("{}/guide/", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.pages_saved, 1);
    // /guide/missing: no locale version and the literal URL 404s too
    assert_eq!(summary.count(PageOutcome::LocaleNotFound), 1);
    assert!(site_dir(temp.path(), &mock_server).join("guide.html").is_file());
}

#[tokio::test]
async fn test_locale_query_mode() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().unwrap();

    Mock::given(method("HEAD"))
        .and(path("/docs"))
        .and(query_param("hl", "en"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("hl", "en"))
        .respond_with(html_page(r#"<a href="/docs?hl=ja">日本語</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("hl", "ja"))
        .respond_with(html_page("ja"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let locale = LocaleConfig::query_based(vec!["en".to_string()], "hl");
    let fetcher = Fetcher::new(create_test_config(temp.path())).with_locale(Some(locale));
    let summary = fetcher
        .fetch(&format!("{}/docs?hl=ja", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(summary.pages_saved, 1);
    assert_eq!(summary.count(PageOutcome::AlreadyVisited), 1);
    assert!(site_dir(temp.path(), &mock_server)
        .join("docs_q_hl_en.html")
        .is_file());
}
