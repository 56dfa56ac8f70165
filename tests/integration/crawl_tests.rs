//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the registry and check the
//! CSV file produced by a full crawl.

use registry_crawler::config::{
    Config, CrawlerConfig, Escaping, OutputConfig, ProvinceFilter, RegionFilter, SiteConfig,
    UserAgentConfig,
};
use registry_crawler::crawler::Coordinator;
use registry_crawler::entity::HEADER;
use registry_crawler::output::CsvSink;
use registry_crawler::RegistryError;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, csv_path: &Path, provinces: &[(&str, u32)]) -> Config {
    Config {
        crawler: CrawlerConfig {
            list_timeout_ms: Some(2000),
            detail_timeout_ms: 1000,
            detail_concurrency: 1,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        site: SiteConfig {
            list_url: format!("{}/list.html", base_url),
            detail_url: format!("{}/detail.html", base_url),
        },
        output: OutputConfig {
            csv_path: csv_path.display().to_string(),
            escaping: Escaping::Quoted,
        },
        regions: vec![RegionFilter {
            name: "Emilia-Romagna".to_string(),
            code: 8,
            provinces: provinces
                .iter()
                .map(|(abbreviation, code)| ProvinceFilter {
                    abbreviation: abbreviation.to_string(),
                    name: abbreviation.to_uppercase(),
                    code: *code,
                })
                .collect(),
        }],
    }
}

fn list_html(ids: &[&str], terminus: Option<u32>) -> String {
    let rows: String = ids
        .iter()
        .map(|id| {
            format!(
                r#"<a class="societa" href="registro_dettaglio.html?id_societa={id}">
                    <div class="info-base"><h4 data-com="equalizer">Society {id}</h4><p>ASD {id}</p></div>
                    <div data-equalizer-id="dati_registro_reg">
                        <div class="luogo">
                            <span class="regione">Emilia-Romagna</span>
                            <span class="comune">Comune {id}</span>
                            <span class="provincia">BO</span>
                        </div>
                        <div class="affiliazione-container"><span class="affiliazione">FIDAL</span></div>
                    </div>
                </a>"#
            )
        })
        .collect();

    let pagination = terminus
        .map(|offset| {
            format!(
                r#"<ul class="pagination"><li class="pagination-end"><a href="?reg=8&amp;pro=237&amp;start={offset}">Fine</a></li></ul>"#
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><body><div class="lista">{}</div>{}</body></html>"#,
        rows, pagination
    )
}

fn detail_html(id: &str) -> String {
    format!(
        r#"<html><body>
        <div class="numeri-anagrafici">
            <div class="legale">Legale Rappresentante Rossi, Mario {id}</div>
            <div class="dato">Codice Fiscale CF{id}</div>
            <div class="dato">Data Iscrizione 01/02/2015</div>
        </div>
        <div class="totalizatori">
            <div><span>12</span> agonisti</div>
            <div><span>40</span> praticanti</div>
            <div><span>3</span> eventi sportivi</div>
            <div><span>1</span> eventi didattici</div>
        </div>
        </body></html>"#
    )
}

async fn mount_list(server: &MockServer, province: u32, offset: u32, body: String) {
    Mock::given(method("GET"))
        .and(path("/list.html"))
        .and(query_param("pro", province.to_string()))
        .and(query_param("start", offset.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str) {
    Mock::given(method("GET"))
        .and(path("/detail.html"))
        .and(query_param("id_societa", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html(id)))
        .expect(1)
        .mount(server)
        .await;
}

/// Reads the output file, header included
fn read_rows(csv_path: &Path) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(csv_path)
        .expect("Failed to open CSV");
    reader
        .records()
        .map(|record| {
            record
                .expect("Failed to read CSV row")
                .iter()
                .map(str::to_string)
                .collect()
        })
        .collect()
}

async fn run(config: Config) -> registry_crawler::Result<registry_crawler::output::CrawlStatistics> {
    let sink = CsvSink::new(&config.output.csv_path, config.output.escaping);
    let mut coordinator = Coordinator::new(config, sink).expect("Failed to create coordinator");
    coordinator.run().await
}

#[tokio::test]
async fn test_single_page_two_entities() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A", "B"], Some(0))).await;
    mount_detail(&mock_server, "A").await;
    mount_detail(&mock_server, "B").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.entities_persisted, 2);
    assert_eq!(stats.details_fetched, 2);

    let raw = std::fs::read_to_string(&csv_path).unwrap();
    assert!(raw.starts_with(&format!("{}\r\n", HEADER.join(","))));
    assert!(raw.ends_with("\r\n"));

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0], HEADER.to_vec());
    assert_eq!(
        rows[1],
        vec![
            "A",
            "Society A",
            "ASD A",
            "Emilia-Romagna",
            "Comune A",
            "BO",
            "FIDAL",
            "Rossi Mario A",
            "CFA",
            "01/02/2015",
            "12",
            "40",
            "3",
            "1",
        ]
    );
    assert_eq!(rows[2][0], "B");
    assert!(rows[2].iter().all(|value| !value.is_empty()));
}

#[tokio::test]
async fn test_missing_terminus_processes_first_page_only() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A"], None)).await;
    mount_detail(&mock_server, "A").await;

    // No subsequent page may be requested
    Mock::given(method("GET"))
        .and(path("/list.html"))
        .and(query_param("start", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_html(&["Z"], None)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.page_counts_unknown, 1);
    assert_eq!(stats.list_pages_fetched, 1);

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "A");
}

#[tokio::test]
async fn test_duplicate_entity_on_later_page_written_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A", "B"], Some(20))).await;
    mount_list(&mock_server, 237, 20, list_html(&["A", "C"], Some(20))).await;
    mount_detail(&mock_server, "A").await;
    mount_detail(&mock_server, "B").await;
    mount_detail(&mock_server, "C").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.duplicates_skipped, 1);

    let rows = read_rows(&csv_path);
    let ids: Vec<&str> = rows[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "C"]);
}

#[tokio::test]
async fn test_detail_timeout_keeps_summary_row() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["C"], Some(0))).await;
    Mock::given(method("GET"))
        .and(path("/detail.html"))
        .and(query_param("id_societa", "C"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_html("C"))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    config.crawler.detail_timeout_ms = 200;
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.details_failed, 1);
    assert_eq!(stats.entities_persisted, 1);

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[1][..7], &["C", "Society C", "ASD C", "Emilia-Romagna", "Comune C", "BO", "FIDAL"]);
    assert!(rows[1][7..].iter().all(|value| value.is_empty()));
}

#[tokio::test]
async fn test_detail_http_error_keeps_summary_row() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["D", "E"], Some(0))).await;
    Mock::given(method("GET"))
        .and(path("/detail.html"))
        .and(query_param("id_societa", "D"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_detail(&mock_server, "E").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    run(config).await.expect("Crawl failed");

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[1][0], "D");
    assert!(rows[1][7..].iter().all(|value| value.is_empty()));
    assert_eq!(rows[2][0], "E");
    assert_eq!(rows[2][8], "CFE");
}

#[tokio::test]
async fn test_pages_visited_in_increasing_offset_order() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["P0"], Some(60))).await;
    mount_list(&mock_server, 237, 20, list_html(&["P1"], Some(60))).await;
    mount_list(&mock_server, 237, 40, list_html(&["P2"], Some(60))).await;
    mount_list(&mock_server, 237, 60, list_html(&["P3"], Some(60))).await;
    for id in ["P0", "P1", "P2", "P3"] {
        mount_detail(&mock_server, id).await;
    }

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let stats = run(config).await.expect("Crawl failed");
    assert_eq!(stats.list_pages_fetched, 4);

    let requests = mock_server
        .received_requests()
        .await
        .expect("Request recording disabled");
    let offsets: Vec<String> = requests
        .iter()
        .filter(|request| request.url.path() == "/list.html")
        .filter_map(|request| {
            request
                .url
                .query_pairs()
                .find(|(key, _)| key == "start")
                .map(|(_, value)| value.into_owned())
        })
        .collect();
    assert_eq!(offsets, vec!["0", "20", "40", "60"]);

    let rows = read_rows(&csv_path);
    let ids: Vec<&str> = rows[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, vec!["P0", "P1", "P2", "P3"]);
}

#[tokio::test]
async fn test_failed_list_page_is_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A"], Some(40))).await;
    Mock::given(method("GET"))
        .and(path("/list.html"))
        .and(query_param("start", "20"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_list(&mock_server, 237, 40, list_html(&["C"], Some(40))).await;
    mount_detail(&mock_server, "A").await;
    mount_detail(&mock_server, "C").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.list_pages_failed, 1);
    assert_eq!(stats.list_pages_fetched, 2);

    let rows = read_rows(&csv_path);
    let ids: Vec<&str> = rows[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, vec!["A", "C"]);
}

#[tokio::test]
async fn test_unparseable_first_page_degrades_to_empty() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(
        &mock_server,
        237,
        0,
        "<html><body><h1>Manutenzione</h1></body></html>".to_string(),
    )
    .await;
    mount_list(&mock_server, 38, 0, list_html(&["F"], Some(0))).await;
    mount_detail(&mock_server, "F").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237), ("fe", 38)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.filters_processed, 2);
    assert_eq!(stats.list_pages_failed, 1);

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "F");
}

#[tokio::test]
async fn test_entity_seen_under_two_filters_fetched_once() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A", "B"], Some(0))).await;
    mount_list(&mock_server, 38, 0, list_html(&["B", "G"], Some(0))).await;
    mount_detail(&mock_server, "A").await;
    mount_detail(&mock_server, "B").await;
    mount_detail(&mock_server, "G").await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237), ("fe", 38)]);
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.filters_processed, 2);
    assert_eq!(stats.entities_persisted, 3);

    // Row count equals the number of distinct identifiers
    let rows = read_rows(&csv_path);
    let ids: Vec<&str> = rows[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(ids, vec!["A", "B", "G"]);
    for row in &rows[1..] {
        assert_eq!(row[1], format!("Society {}", row[0]));
        assert_eq!(row[8], format!("CF{}", row[0]));
    }
}

#[tokio::test]
async fn test_detail_pool_keeps_document_order() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    let ids = ["A", "B", "C", "D", "E", "A"];
    mount_list(&mock_server, 237, 0, list_html(&ids, Some(0))).await;

    let delays = [("A", 300), ("B", 0), ("C", 150), ("D", 0), ("E", 50)];
    for (id, delay_ms) in delays {
        Mock::given(method("GET"))
            .and(path("/detail.html"))
            .and(query_param("id_societa", id))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(detail_html(id))
                    .set_delay(Duration::from_millis(delay_ms)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let mut config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    config.crawler.detail_concurrency = 4;
    let stats = run(config).await.expect("Crawl failed");

    assert_eq!(stats.duplicates_skipped, 1);
    assert_eq!(stats.details_fetched, 5);

    let rows = read_rows(&csv_path);
    let written: Vec<&str> = rows[1..].iter().map(|row| row[0].as_str()).collect();
    assert_eq!(written, vec!["A", "B", "C", "D", "E"]);
    assert!(rows[1..].iter().all(|row| row[8] == format!("CF{}", row[0])));
}

#[tokio::test]
async fn test_unescaped_output_joins_raw_values() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    mount_list(&mock_server, 237, 0, list_html(&["A"], Some(0))).await;
    mount_detail(&mock_server, "A").await;

    let mut config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    config.output.escaping = Escaping::Unescaped;
    run(config).await.expect("Crawl failed");

    let raw = std::fs::read_to_string(&csv_path).unwrap();
    assert!(raw.contains(",Rossi Mario A,CFA,"));
    assert!(!raw.contains('"'));
    for line in raw.lines() {
        assert_eq!(line.split(',').count(), HEADER.len(), "{}", line);
    }
}

#[tokio::test]
async fn test_output_file_cannot_be_created() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("missing-dir").join("societies.csv");

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    let result = run(config).await;

    assert!(matches!(result, Err(RegistryError::Output(_))));
    // Nothing was requested once the output failed
    let requests = mock_server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_rerun_truncates_previous_output() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let csv_path = dir.path().join("societies.csv");

    Mock::given(method("GET"))
        .and(path("/list.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(list_html(&["A"], Some(0))))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/detail.html"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_html("A")))
        .expect(2)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), &csv_path, &[("bo", 237)]);
    run(config.clone()).await.expect("First crawl failed");
    run(config).await.expect("Second crawl failed");

    let rows = read_rows(&csv_path);
    assert_eq!(rows.len(), 2);
}
