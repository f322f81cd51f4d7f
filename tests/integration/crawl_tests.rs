//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use std::time::{Duration, Instant};
use tempfile::TempDir;
use webscan_crawler::config::{Config, UserAgentConfig};
use webscan_crawler::crawler::{crawl, Coordinator};
use webscan_crawler::output::write_json_results;
use webscan_crawler::state::PageState;
use webscan_crawler::storage::ResultStore;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const AGENT: &str = "TestBot/1.0.0 (+https://example.com/contact)";

/// Creates a test configuration starting at `start_url` with no politeness delay
fn create_test_config(start_url: String) -> Config {
    let mut config = Config::default();
    config.crawler.start_url = start_url;
    config.crawler.delay = 0.0;
    config.crawler.fetch_timeout = 5;
    config.crawler.robots_timeout = 2;
    config.user_agent = UserAgentConfig {
        crawler_name: "TestBot".to_string(),
        crawler_version: "1.0.0".to_string(),
        contact_url: "https://example.com/contact".to_string(),
        custom: None,
    };
    config
}

fn html(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.into(), "text/html")
}

async fn mount_page(server: &MockServer, page: &str, body: impl Into<String>) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(response)
        .mount(server)
        .await;
}

fn keys(results: &ResultStore) -> Vec<String> {
    results.urls().map(str::to_string).collect()
}

#[tokio::test]
async fn test_same_origin_crawl_excludes_external_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /\n")).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("user-agent", AGENT))
        .respond_with(html(
            r#"<html><body>
                <a href="/a">A</a>
                <a href="https://other.test/">Elsewhere</a>
                <a href="mailto:admin@x.test">Mail</a>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html("too deep"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(format!("{}/", base));
    config.crawler.max_depth = 1;
    config.crawler.max_pages = 10;

    let results = crawl(config).await.expect("crawl should start");

    assert_eq!(keys(&results), vec![format!("{}/", base), format!("{}/a", base)]);

    let home = results.get(&format!("{}/", base)).unwrap();
    assert_eq!(home.status, 200);
    assert_eq!(home.depth, 0);
    assert_eq!(home.out_links, vec![format!("{}/a", base)]);
    assert!(home.headers.contains_key("content-type"));

    let a = results.get(&format!("{}/a", base)).unwrap();
    assert_eq!(a.depth, 1);
    // Links are still reported past the depth limit, just not followed
    assert_eq!(a.out_links, vec![format!("{}/b", base)]);
}

#[tokio::test]
async fn test_max_pages_one_records_only_start() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("a"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(base.clone());
    config.crawler.max_pages = 1;

    let results = crawl(config).await.unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.contains(&format!("{}/", base)));
}

#[tokio::test]
async fn test_page_limit_is_never_exceeded() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..10).map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i)).collect();
    mount_page(&server, "/", links).await;
    for i in 0..10 {
        mount_page(&server, &format!("/p{}", i), r#"<a href="/">home</a>"#).await;
    }

    let mut config = create_test_config(base);
    config.crawler.max_pages = 3;

    let results = crawl(config).await.unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_robots_disallowed_page_is_skipped_without_fetch() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /admin\n"),
    )
    .await;
    mount_page(&server, "/", r#"<a href="/admin">Admin</a><a href="/public">Public</a>"#).await;
    mount_page(&server, "/public", "public").await;
    Mock::given(method("GET"))
        .and(path("/admin"))
        .respond_with(html("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let admin = results.get(&format!("{}/admin", base)).expect("admin is recorded");
    assert_eq!(admin.status, 0);
    assert_eq!(admin.skipped_reason.as_deref(), Some("blocked_by_robots"));
    assert_eq!(admin.state(), PageState::SkippedRobots);
    assert!(admin.error.is_none());

    let public = results.get(&format!("{}/public", base)).unwrap();
    assert_eq!(public.status, 200);
}

#[tokio::test]
async fn test_robots_forbidden_disallows_everything() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, ResponseTemplate::new(403)).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("home"))
        .expect(0)
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    assert_eq!(results.len(), 1);
    let home = results.get(&format!("{}/", base)).unwrap();
    assert_eq!(home.skipped_reason.as_deref(), Some("blocked_by_robots"));
}

#[tokio::test]
async fn test_robots_server_error_fails_open() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, ResponseTemplate::new(500)).await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("home"))
        .expect(1)
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let home = results.get(&format!("{}/", base)).unwrap();
    assert_eq!(home.status, 200);
    assert!(home.skipped_reason.is_none());
}

#[tokio::test]
async fn test_connection_error_is_recorded_and_crawl_continues() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="http://127.0.0.1:1/">Dead</a><a href="/a">A</a>"#,
    )
    .await;
    mount_page(&server, "/a", "alive").await;

    let mut config = create_test_config(base.clone());
    config.crawler.allow_external = true;

    let results = crawl(config).await.unwrap();

    let dead = results.get("http://127.0.0.1:1/").expect("dead link is recorded");
    assert_eq!(dead.status, 0);
    assert!(!dead.error.as_deref().unwrap_or_default().is_empty());
    assert!(dead.out_links.is_empty());
    assert!(dead.forms.is_empty());
    assert_eq!(dead.state(), PageState::FetchError);

    assert_eq!(results.get(&format!("{}/a", base)).unwrap().status, 200);
}

#[tokio::test]
async fn test_http_error_status_is_annotated() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/missing">Missing</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(
            ResponseTemplate::new(404).set_body_raw(r#"<a href="/hidden">x</a>"#, "text/html"),
        )
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let missing = results.get(&format!("{}/missing", base)).unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.error.as_deref(), Some("HTTP 404"));
    assert!(missing.out_links.is_empty());
    assert!(!results.contains(&format!("{}/hidden", base)));
}

#[tokio::test]
async fn test_forms_are_extracted_and_resolved() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/login",
        r#"<html><body>
            <form method="POST">
                <input type="text" name="user">
                <input type="password" name="pass">
                <textarea name="note"></textarea>
            </form>
            <form action="/search#results">
                <input name="q">
                <select name="scope"></select>
            </form>
        </body></html>"#,
    )
    .await;

    let results = crawl(create_test_config(format!("{}/login", base))).await.unwrap();
    let login = results.get(&format!("{}/login", base)).unwrap();

    assert_eq!(login.forms.len(), 2);

    let first = &login.forms[0];
    assert_eq!(first.action, "");
    assert_eq!(first.method, "post");
    assert_eq!(first.resolved_action, format!("{}/login", base));
    let types: Vec<&str> = first.inputs.iter().map(|i| i.input_type.as_str()).collect();
    assert_eq!(types, vec!["text", "password", "textarea"]);

    let second = &login.forms[1];
    assert_eq!(second.method, "get");
    assert_eq!(second.resolved_action, format!("{}/search", base));
    assert_eq!(second.inputs[0].name.as_deref(), Some("q"));
    assert_eq!(second.inputs[0].input_type, "input");
    assert_eq!(second.inputs[1].input_type, "select");
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/b">B</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/c">C</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html("c"))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = create_test_config(base.clone());
    config.crawler.max_depth = 2;

    let results = crawl(config).await.unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results.get(&format!("{}/b", base)).unwrap().depth, 2);
    assert!(results.iter().all(|record| record.depth <= 2));
}

#[tokio::test]
async fn test_breadth_first_order() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", r#"<a href="/a1">A1</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/b1">B1</a>"#).await;
    mount_page(&server, "/a1", "leaf").await;
    mount_page(&server, "/b1", "leaf").await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let expected: Vec<String> = ["/", "/a", "/b", "/a1", "/b1"]
        .iter()
        .map(|p| format!("{}{}", base, p))
        .collect();
    assert_eq!(keys(&results), expected);
}

#[tokio::test]
async fn test_concurrent_workers_fetch_each_page_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    let links: String = (0..8).map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i)).collect();
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(links))
        .expect(1)
        .mount(&server)
        .await;
    for i in 0..8 {
        // Every page links back home and to its neighbours
        let body = format!(
            r#"<a href="/">home</a><a href="/p{}">next</a><a href="/p{}">prev</a>"#,
            (i + 1) % 8,
            (i + 7) % 8
        );
        Mock::given(method("GET"))
            .and(path(format!("/p{}", i)))
            .respond_with(html(body).set_delay(Duration::from_millis(50)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let mut config = create_test_config(base);
    config.crawler.concurrency = 4;
    config.crawler.max_pages = 50;

    let results = crawl(config).await.unwrap();
    assert_eq!(results.len(), 9);
}

#[tokio::test]
async fn test_same_origin_requests_are_spaced_by_delay() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", "a").await;
    mount_page(&server, "/b", "b").await;

    let mut config = create_test_config(base);
    config.crawler.delay = 0.2;
    config.crawler.concurrency = 3;

    let started = Instant::now();
    let results = crawl(config).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(400));
}

#[tokio::test]
async fn test_robots_crawl_delay_is_honored_when_enabled() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        ResponseTemplate::new(200).set_body_string("User-agent: *\nCrawl-delay: 0.5\n"),
    )
    .await;
    mount_page(&server, "/", r#"<a href="/a">A</a><a href="/b">B</a>"#).await;
    mount_page(&server, "/a", "a").await;
    mount_page(&server, "/b", "b").await;

    let mut config = create_test_config(base);
    config.crawler.honor_crawl_delay = true;
    config.crawler.concurrency = 3;

    let started = Instant::now();
    let results = crawl(config).await.unwrap();

    assert_eq!(results.len(), 3);
    assert!(started.elapsed() >= Duration::from_millis(1000));
}

#[tokio::test]
async fn test_slow_robots_txt_times_out_and_allows_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(
        &server,
        ResponseTemplate::new(200)
            .set_body_string("User-agent: *\nDisallow: /\n")
            .set_delay(Duration::from_secs(20)),
    )
    .await;
    mount_page(&server, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "a").await;

    let mut config = create_test_config(base.clone());
    config.crawler.robots_timeout = 1;

    let started = Instant::now();
    let results = crawl(config).await.unwrap();

    assert_eq!(keys(&results), vec![format!("{}/", base), format!("{}/a", base)]);
    assert!(results.iter().all(|record| record.status == 200));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn test_cancellation_returns_partial_results() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/slow">Slow</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(html("eventually").set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let mut config = create_test_config(base.clone());
    config.crawler.fetch_timeout = 60;

    let coordinator = Coordinator::new(config).unwrap();
    let token = coordinator.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    let results = tokio::time::timeout(Duration::from_secs(10), coordinator.run())
        .await
        .expect("cancelled crawl should return promptly");

    assert_eq!(keys(&results), vec![format!("{}/", base)]);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/home", base).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/home", r#"<a href="/a">A</a>"#).await;
    mount_page(&server, "/a", "a").await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let start = results.get(&format!("{}/", base)).unwrap();
    assert_eq!(start.status, 200);
    assert_eq!(start.out_links, vec![format!("{}/a", base)]);
    assert!(results.contains(&format!("{}/a", base)));
}

#[tokio::test]
async fn test_non_html_response_is_not_parsed() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/doc.pdf">Doc</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"<a href="/hidden">x</a>"#, "application/pdf"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hidden"))
        .respond_with(html("hidden"))
        .expect(0)
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let doc = results.get(&format!("{}/doc.pdf", base)).unwrap();
    assert_eq!(doc.status, 200);
    assert!(doc.out_links.is_empty());
    assert!(doc.error.is_none());
}

#[tokio::test]
async fn test_fragments_do_not_create_duplicates() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r##"<a href="#top">Top</a><a href="/page#one">1</a><a href="/page#two">2</a>"##,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(html("page"))
        .expect(1)
        .mount(&server)
        .await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    assert_eq!(results.len(), 2);
    let home = results.get(&format!("{}/", base)).unwrap();
    assert_eq!(
        home.out_links,
        vec![
            format!("{}/", base),
            format!("{}/page", base),
            format!("{}/page", base),
        ]
    );
}

#[tokio::test]
async fn test_results_written_as_json() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<form action="/go"><input name="q"></form>"#).await;

    let results = crawl(create_test_config(base.clone())).await.unwrap();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("outputs").join("scan_results_test.json");
    write_json_results(&results, &out).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    let home = &value[format!("{}/", base)];
    assert_eq!(home["status"], 200);
    assert_eq!(home["forms"][0]["resolved_action"], format!("{}/go", base));
    assert_eq!(home["forms"][0]["inputs"][0]["type"], "input");
    assert!(home["skipped_reason"].is_null());
}

#[tokio::test]
async fn test_invalid_start_url_is_rejected() {
    let config = create_test_config("not a url".to_string());
    assert!(crawl(config).await.is_err());
}
