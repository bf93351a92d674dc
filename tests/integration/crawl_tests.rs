//! Integration tests for the inventory pipeline
//!
//! These tests use wiremock to stand in for the listing site and run the
//! enumerate → probe → crawl cycle end-to-end.

use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use url::Url;
use vbpl_inventory::config::Config;
use vbpl_inventory::crawler::{
    crawl, crawl_pages, probe, try_probe, Fetcher, Orchestrator, ProbeError,
};
use vbpl_inventory::{InventoryError, PageMetadata};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const LANDING_PATH: &str = "/TW/Pages/home.aspx";
const LISTING_PATH: &str = "/TW/Pages/vanban.aspx";
const ACTIVE: &str = "Còn hiệu lực";
const REPEALED: &str = "Hết hiệu lực toàn bộ";

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path) -> Config {
    let mut config = Config::default();
    config.site.base_url = base_url.to_string();
    config.site.landing_url = format!("{}{}", base_url, LANDING_PATH);
    config.site.listing_url = format!("{}{}", base_url, LISTING_PATH);
    config.crawler.max_workers = 4;
    config.crawler.request_timeout = 5;
    config.crawler.page_timeout = 5;
    config.output.inventory_path = dir.join("law_links.json").display().to_string();
    config.output.failure_log_path = dir.join("failed_links.log").display().to_string();
    config
}

fn document_url(base_url: &str, item_id: u64) -> String {
    format!("{}/TW/Pages/vbpq-toanvan.aspx?ItemID={}", base_url, item_id)
}

fn landing_html(categories: &[(i64, &str)]) -> String {
    let items: String = categories
        .iter()
        .map(|(id, name)| {
            format!(
                r#"<li><a href="/TW/Pages/vanban.aspx?idLoaiVanBan={}&dvid=13">{}</a></li>"#,
                id, name
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="menu"><ul id="loaiVB">{}</ul></div></body></html>"#,
        items
    )
}

fn listing_html(total: Option<u64>, rows: &[(u64, &str)]) -> String {
    let header = total
        .map(|t| {
            format!(
                r##"<div class="box-tab"><div class="header"><ul>
                   <li><a class="selected" href="#"><span>Tìm thấy {} văn bản</span></a></li>
                   </ul></div></div>"##,
                t
            )
        })
        .unwrap_or_default();
    let items: String = rows
        .iter()
        .map(|(id, status)| {
            format!(
                r#"<li><p class="title"><a href="/TW/Pages/vbpq-toanvan.aspx?ItemID={}">Văn bản {}</a></p>
                   <div class="right"><p class="red">{}</p></div></li>"#,
                id, id, status
            )
        })
        .collect();
    format!(
        r#"<html><body>{}<ul class="listLaw">{}</ul></body></html>"#,
        header, items
    )
}

/// Rows with ids `first..first + count`, all active
fn active_rows(first: u64, count: u64) -> Vec<(u64, &'static str)> {
    (first..first + count).map(|id| (id, ACTIVE)).collect()
}

async fn mount_landing(server: &MockServer, categories: &[(i64, &str)]) {
    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_html(categories)))
        .mount(server)
        .await;
}

async fn mount_page(
    server: &MockServer,
    category_id: i64,
    page: u32,
    response: ResponseTemplate,
    expected_calls: Option<u64>,
) {
    let mock = Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .and(query_param("idLoaiVanBan", category_id.to_string()))
        .and(query_param("dvid", "13"))
        .and(query_param("Page", page.to_string()))
        .respond_with(response);
    let mock = match expected_calls {
        Some(n) => mock.expect(n),
        None => mock,
    };
    mock.mount(server).await;
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_string(body)
}

/// In-memory sink for formatted log lines
#[derive(Clone, Default)]
struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    fn lines_at(&self, level: &str) -> Vec<String> {
        let bytes = self.0.lock().unwrap();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(&format!(" {} ", level)))
            .map(str::to_string)
            .collect()
    }

    /// Installs a WARN-and-up subscriber on the current thread
    fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || sink.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl Write for CapturedLog {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_full_inventory_run() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật"), (18, "Pháp lệnh"), (19, "Nghị định")]).await;

    // Luật: 20 documents over 2 pages; page 2 repeats id 1 and has a repealed row
    mount_page(
        &server,
        17,
        1,
        html(listing_html(Some(20), &active_rows(1, 15))),
        Some(2),
    )
    .await;
    let mut page_two = active_rows(16, 3);
    page_two.push((1, ACTIVE));
    page_two.push((99, REPEALED));
    mount_page(&server, 17, 2, html(listing_html(Some(20), &page_two)), Some(1)).await;

    // Pháp lệnh: no documents; only the probe may hit page 1
    mount_page(&server, 18, 1, html(listing_html(Some(0), &[])), Some(1)).await;

    // Nghị định: no count label, so exactly one page is crawled
    mount_page(
        &server,
        19,
        1,
        html(listing_html(None, &active_rows(200, 15))),
        Some(2),
    )
    .await;
    mount_page(&server, 19, 2, html(listing_html(None, &[])), Some(0)).await;

    let config = create_test_config(&base_url, dir.path());
    let inventory_path = config.output.inventory_path.clone();

    let report = crawl(config, Some("abc123".to_string()))
        .await
        .expect("Run failed");

    let names: Vec<&str> = report
        .results
        .iter()
        .map(|r| r.category_name.as_str())
        .collect();
    assert_eq!(names, vec!["Luật", "Pháp lệnh", "Nghị định"]);

    let luat = &report.results[0].links;
    assert_eq!(luat.len(), 18, "15 + 3 new links, repeat collapsed");
    assert!(luat.contains(&document_url(&base_url, 1)));
    assert!(luat.contains(&document_url(&base_url, 18)));
    assert!(!luat.contains(&document_url(&base_url, 99)));

    assert!(report.results[1].links.is_empty());
    assert_eq!(report.results[2].links.len(), 15);

    let stats = &report.statistics;
    assert_eq!(stats.categories_processed, 3);
    assert_eq!(stats.categories_empty, 1);
    assert_eq!(stats.probes_degraded, 1);
    assert_eq!(stats.pages_attempted, 3);
    assert_eq!(stats.pages_failed, 0);
    assert_eq!(stats.items_excluded, 1);
    assert_eq!(stats.links_collected, 33);
    assert_eq!(stats.config_hash.as_deref(), Some("abc123"));
    assert!(stats.finished_at >= stats.started_at);

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&inventory_path).unwrap()).unwrap();
    let entries = written.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[1]["loaivanban"], "Pháp lệnh");
    assert_eq!(entries[1]["links"].as_array().unwrap().len(), 0);
    assert_eq!(entries[0]["links"].as_array().unwrap().len(), 18);
}

#[tokio::test]
async fn test_failed_page_is_isolated() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật"), (20, "Thông tư")]).await;

    // 10 pages of 15; page 5 always fails
    for page in 1..=10u32 {
        let response = if page == 5 {
            ResponseTemplate::new(500)
        } else {
            let first = u64::from(page) * 100;
            html(listing_html(Some(150), &active_rows(first, 15)))
        };
        mount_page(&server, 17, page, response, None).await;
    }
    mount_page(
        &server,
        20,
        1,
        html(listing_html(Some(2), &active_rows(5000, 2))),
        None,
    )
    .await;

    let config = create_test_config(&base_url, dir.path());
    let orchestrator = Orchestrator::new(config).unwrap();
    let report = orchestrator.run().await.expect("Run must not abort");

    assert_eq!(report.results.len(), 2);

    let luat = &report.results[0].links;
    assert_eq!(luat.len(), 9 * 15);
    assert!(luat.contains(&document_url(&base_url, 400)));
    assert!(luat.contains(&document_url(&base_url, 600)));
    assert!(!luat.contains(&document_url(&base_url, 500)));

    // The category after the failure is still crawled
    assert_eq!(report.results[1].links.len(), 2);

    assert_eq!(report.statistics.pages_attempted, 11);
    assert_eq!(report.statistics.pages_failed, 1);
}

#[tokio::test]
async fn test_category_with_every_request_failing_still_reported() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật"), (18, "Pháp lệnh")]).await;
    mount_page(&server, 17, 1, ResponseTemplate::new(503), Some(2)).await;
    mount_page(
        &server,
        18,
        1,
        html(listing_html(Some(1), &active_rows(1, 1))),
        None,
    )
    .await;

    let config = create_test_config(&base_url, dir.path());
    let report = Orchestrator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.results.len(), 2);
    assert_eq!(report.results[0].category_name, "Luật");
    assert!(report.results[0].links.is_empty());
    assert_eq!(report.results[1].links.len(), 1);
    assert_eq!(report.statistics.probes_degraded, 1);
    assert_eq!(report.statistics.pages_failed, 1);
}

#[tokio::test]
async fn test_enumeration_failure_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(LISTING_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let inventory_path = config.output.inventory_path.clone();

    let result = crawl(config, None).await;

    assert!(matches!(result, Err(InventoryError::Enumeration(_))));
    assert!(!Path::new(&inventory_path).exists());
}

#[tokio::test]
async fn test_missing_category_list_aborts_run() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<html><body>Bảo trì</body></html>"),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path());
    let result = Orchestrator::new(config).unwrap().run().await;

    assert!(matches!(result, Err(InventoryError::Enumeration(_))));
}

#[tokio::test]
async fn test_page_count_from_first_page() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &server,
        17,
        1,
        html(listing_html(Some(237), &active_rows(1, 15))),
        None,
    )
    .await;

    let config = create_test_config(&server.uri(), dir.path());
    let fetcher = Fetcher::from_config(&config).unwrap();
    let base_url = Url::parse(&config.site.base_url).unwrap();

    let metadata = try_probe(&fetcher, &config, &base_url, 17).await.unwrap();
    assert_eq!(
        metadata,
        PageMetadata {
            last_page: 16,
            items_per_page: 15
        }
    );
}

#[tokio::test]
async fn test_page_count_includes_excluded_rows() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let mut rows = active_rows(1, 10);
    rows.extend((11..16).map(|id| (id, REPEALED)));
    mount_page(&server, 17, 1, html(listing_html(Some(30), &rows)), None).await;

    let config = create_test_config(&server.uri(), dir.path());
    let fetcher = Fetcher::from_config(&config).unwrap();
    let base_url = Url::parse(&config.site.base_url).unwrap();

    let metadata = try_probe(&fetcher, &config, &base_url, 17).await.unwrap();
    assert_eq!(metadata.items_per_page, 15);
    assert_eq!(metadata.last_page, 2);
}

#[tokio::test]
async fn test_page_count_fallbacks() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Zero rows
    mount_page(&server, 1, 1, html(listing_html(Some(0), &[])), None).await;
    // Rows but no label
    mount_page(&server, 2, 1, html(listing_html(None, &active_rows(1, 3))), None).await;
    // Fetch failure
    mount_page(&server, 3, 1, ResponseTemplate::new(502), None).await;

    let config = create_test_config(&server.uri(), dir.path());
    let fetcher = Fetcher::from_config(&config).unwrap();
    let base_url = Url::parse(&config.site.base_url).unwrap();

    let empty = probe(&fetcher, &config, &base_url, 1).await;
    assert_eq!(
        empty.metadata,
        PageMetadata {
            last_page: 0,
            items_per_page: 15
        }
    );
    assert!(!empty.degraded, "an empty category is an exact count");

    assert!(matches!(
        try_probe(&fetcher, &config, &base_url, 2).await,
        Err(ProbeError::MissingCountLabel)
    ));
    let unlabeled = probe(&fetcher, &config, &base_url, 2).await;
    assert_eq!(unlabeled.metadata, PageMetadata::fallback(15));
    assert!(unlabeled.degraded);

    assert!(matches!(
        try_probe(&fetcher, &config, &base_url, 3).await,
        Err(ProbeError::Fetch(_))
    ));
    let unreachable = probe(&fetcher, &config, &base_url, 3).await;
    assert_eq!(
        unreachable.metadata,
        PageMetadata {
            last_page: 1,
            items_per_page: 15
        }
    );
    assert!(unreachable.degraded);
}

#[tokio::test]
async fn test_fallback_warned_once_and_counted() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật")]).await;
    mount_page(
        &server,
        17,
        1,
        html(listing_html(None, &active_rows(1, 4))),
        Some(2),
    )
    .await;

    let log = CapturedLog::default();
    let _guard = log.install();

    let config = create_test_config(&server.uri(), dir.path());
    let report = Orchestrator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.statistics.probes_degraded, 1);
    assert_eq!(report.results[0].links.len(), 4);

    let warnings = log.lines_at("WARN");
    assert_eq!(warnings.len(), 1, "{:?}", warnings);
    assert!(warnings[0].contains("crawling a single page"));
}

#[tokio::test]
async fn test_enumeration_failure_logged_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path(LANDING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let log = CapturedLog::default();
    let _guard = log.install();

    let config = create_test_config(&server.uri(), dir.path());
    let result = crawl(config, None).await;

    assert!(matches!(result, Err(InventoryError::Enumeration(_))));
    let errors = log.lines_at("ERROR");
    assert_eq!(errors.len(), 1, "{:?}", errors);
}

#[tokio::test]
async fn test_inventory_write_failure_logged_once() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật")]).await;
    mount_page(
        &server,
        17,
        1,
        html(listing_html(Some(1), &active_rows(1, 1))),
        None,
    )
    .await;

    let log = CapturedLog::default();
    let _guard = log.install();

    // A directory cannot be written as a file
    let mut config = create_test_config(&server.uri(), dir.path());
    config.output.inventory_path = dir.path().display().to_string();
    let result = crawl(config, None).await;

    assert!(matches!(result, Err(InventoryError::Output(_))));
    let errors = log.lines_at("ERROR");
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert!(errors[0].contains("Could not write inventory"));
}

#[tokio::test]
async fn test_page_crawl_respects_worker_limit() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // 16 slow pages of 15 distinct rows each
    for page in 1..=16u32 {
        let first = u64::from(page) * 100;
        let response = html(listing_html(Some(240), &active_rows(first, 15)))
            .set_delay(Duration::from_millis(300));
        mount_page(&server, 17, page, response, Some(1)).await;
    }

    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_workers = 4;
    let fetcher = Fetcher::from_config(&config).unwrap();
    let base_url = Url::parse(&config.site.base_url).unwrap();

    let started = Instant::now();
    let crawl = crawl_pages(&fetcher, &config, &base_url, 17, 16).await;
    let elapsed = started.elapsed();

    assert_eq!(crawl.pages_attempted, 16);
    assert_eq!(crawl.pages_failed, 0);
    assert_eq!(crawl.links.len(), 240);

    // 4 waves of 300 ms at width 4; serial would take 4.8 s
    assert!(
        elapsed >= Duration::from_millis(1150),
        "more than 4 pages were in flight: {:?}",
        elapsed
    );
    assert!(
        elapsed < Duration::from_millis(4000),
        "pages were not fetched concurrently: {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_detail_tasks_written_when_configured() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = TempDir::new().unwrap();

    mount_landing(&server, &[(17, "Luật")]).await;
    mount_page(
        &server,
        17,
        1,
        html(listing_html(Some(2), &active_rows(41, 2))),
        None,
    )
    .await;

    let mut config = create_test_config(&base_url, dir.path());
    let tasks_path = dir.path().join("tasks").join("detail_tasks.json");
    config.output.tasks_path = Some(tasks_path.display().to_string());

    crawl(config, None).await.unwrap();

    let tasks: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&tasks_path).unwrap()).unwrap();
    let tasks = tasks.as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0]["loaivanban"], "Luật");
    assert_eq!(tasks[0]["item_id"], "41");
    assert_eq!(tasks[0]["url"], document_url(&base_url, 41));
}
