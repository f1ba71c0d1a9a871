use crate::common::{service_account_key, sheet_config};
use async_trait::async_trait;
use serde_json::json;
use shelf_scrape::scrape::ProductRecord;
use shelf_scrape::sink::{deliver, GoogleSheetsSink, RecordSink, SinkError, SinkResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "ya29.test-token";

/// Mounts the token, spreadsheet lookup and worksheet list endpoints
async fn mount_connect(mock_server: &MockServer, worksheets: &[&str]) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("assertion="))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": TOKEN,
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "sheet-1", "name": "Shwapno Grocery Data" }]
        })))
        .expect(1)
        .mount(mock_server)
        .await;

    let sheets: Vec<_> = worksheets
        .iter()
        .map(|title| json!({ "properties": { "title": title } }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "sheets": sheets })))
        .mount(mock_server)
        .await;
}

async fn mount_header_row(mock_server: &MockServer, values: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/v4/spreadsheets/sheet-1/values/.*1:1$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(values))
        .expect(1)
        .mount(mock_server)
        .await;
}

fn append_ok(rows: u64) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "spreadsheetId": "sheet-1",
        "updates": { "updatedRange": "Products!A2:C2", "updatedRows": rows }
    }))
}

fn sink(mock_server: &MockServer) -> GoogleSheetsSink {
    let uri = mock_server.uri();
    GoogleSheetsSink::new(&sheet_config(&uri), &service_account_key(&uri)).unwrap()
}

#[tokio::test]
async fn test_empty_sheet_gets_header_then_rows() {
    let mock_server = MockServer::start().await;
    mount_connect(&mock_server, &["Summary", "Products"]).await;
    mount_header_row(&mock_server, json!({ "range": "Products!A1:Z1", "majorDimension": "ROWS" }))
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .and(body_json(json!({
            "majorDimension": "ROWS",
            "values": [["Product Name", "Price", "Amount/Unit"]]
        })))
        .respond_with(append_ok(1))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .and(body_json(json!({
            "majorDimension": "ROWS",
            "values": [["Fortified Rice 5kg", "৫০০৳", "N/A"]]
        })))
        .respond_with(append_ok(1))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = vec![ProductRecord::new("Fortified Rice 5kg", "৫০০৳", "N/A")];
    let written = sink(&mock_server).write_records(&records).await.unwrap();
    assert_eq!(written, 1);

    let appends: Vec<serde_json::Value> = mock_server
        .received_requests()
        .await
        .expect("request recording is on")
        .into_iter()
        .filter(|request| request.url.path().ends_with(":append"))
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect();
    assert_eq!(appends.len(), 2);
    assert_eq!(appends[0]["values"][0][0], "Product Name");
    assert_eq!(appends[1]["values"][0][0], "Fortified Rice 5kg");
}

#[tokio::test]
async fn test_existing_header_not_repeated() {
    let mock_server = MockServer::start().await;
    mount_connect(&mock_server, &["Products"]).await;
    mount_header_row(
        &mock_server,
        json!({ "values": [["Product Name", "Price", "Amount/Unit"]] }),
    )
    .await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .and(body_json(json!({
            "majorDimension": "ROWS",
            "values": [
                ["Farm Eggs", "৳ 150", "12 pcs"],
                ["Farm Eggs", "৳ 150", "12 pcs"]
            ]
        })))
        .respond_with(append_ok(2))
        .expect(1)
        .mount(&mock_server)
        .await;

    // Duplicates are kept: records carry no identity
    let records = vec![
        ProductRecord::new("Farm Eggs", "৳ 150", "12 pcs"),
        ProductRecord::new("Farm Eggs", "৳ 150", "12 pcs"),
    ];
    let written = sink(&mock_server).write_records(&records).await.unwrap();
    assert_eq!(written, 2);
}

#[tokio::test]
async fn test_token_rejection_is_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid JWT Signature."
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(append_ok(1))
        .expect(0)
        .mount(&mock_server)
        .await;

    let records = vec![ProductRecord::new("Eggs", "৳ 150", "12 pcs")];
    let err = sink(&mock_server).write_records(&records).await.unwrap_err();

    match err {
        SinkError::Auth(message) => assert!(message.contains("invalid_grant")),
        other => panic!("expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_token_endpoint_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access_token": TOKEN }))
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let mut config = sheet_config(&uri);
    config.request_timeout_secs = 1;
    let sink = GoogleSheetsSink::new(&config, &service_account_key(&uri)).unwrap();

    let records = vec![ProductRecord::new("Eggs", "৳ 150", "12 pcs")];
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        sink.write_records(&records),
    )
    .await
    .expect("sink should give up before the outer deadline");

    match result {
        Err(SinkError::Auth(message)) => assert!(message.contains("token request failed")),
        other => panic!("expected Auth error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_stalled_append_is_http_error() {
    let mock_server = MockServer::start().await;
    mount_connect(&mock_server, &["Products"]).await;
    mount_header_row(&mock_server, json!({ "values": [["Product Name"]] })).await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(append_ok(1).set_delay(Duration::from_secs(10)))
        .mount(&mock_server)
        .await;

    let uri = mock_server.uri();
    let mut config = sheet_config(&uri);
    config.request_timeout_secs = 1;
    let sink = GoogleSheetsSink::new(&config, &service_account_key(&uri)).unwrap();

    let records = vec![ProductRecord::new("Eggs", "৳ 150", "12 pcs")];
    let result = tokio::time::timeout(
        Duration::from_secs(5),
        sink.write_records(&records),
    )
    .await
    .expect("sink should give up before the outer deadline");

    match result {
        Err(SinkError::Http(e)) => assert!(e.is_timeout()),
        other => panic!("expected Http timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unknown_spreadsheet() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "access_token": TOKEN })),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "files": [] })))
        .mount(&mock_server)
        .await;

    let err = sink(&mock_server).connect().await.unwrap_err();
    assert!(matches!(err, SinkError::SpreadsheetNotFound(ref name) if name == "Shwapno Grocery Data"));
}

#[tokio::test]
async fn test_missing_worksheet() {
    let mock_server = MockServer::start().await;
    mount_connect(&mock_server, &["Sheet1"]).await;

    let err = sink(&mock_server).connect().await.unwrap_err();
    assert!(matches!(err, SinkError::WorksheetNotFound(ref title) if title == "Products"));
}

#[tokio::test]
async fn test_append_failure_is_api_error() {
    let mock_server = MockServer::start().await;
    mount_connect(&mock_server, &["Products"]).await;
    mount_header_row(&mock_server, json!({ "values": [["Product Name"]] })).await;

    Mock::given(method("POST"))
        .and(path_regex(r":append$"))
        .respond_with(ResponseTemplate::new(403).set_body_string("PERMISSION_DENIED"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let records = vec![ProductRecord::new("Eggs", "৳ 150", "12 pcs")];
    let err = sink(&mock_server).write_records(&records).await.unwrap_err();

    match err {
        SinkError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 403);
            assert!(message.contains("PERMISSION_DENIED"));
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

/// Counts calls instead of writing anywhere
struct CountingSink {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl RecordSink for CountingSink {
    async fn write_records(&self, records: &[ProductRecord]) -> SinkResult<usize> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(records.len())
    }
}

/// A sink opener that counts how often it is asked for a sink
fn counting_opener(
    opened: &Arc<AtomicUsize>,
    writes: &Arc<AtomicUsize>,
) -> impl FnOnce() -> SinkResult<Box<dyn RecordSink>> {
    let (opened, writes) = (opened.clone(), writes.clone());
    move || {
        opened.fetch_add(1, Ordering::SeqCst);
        let sink: Box<dyn RecordSink> = Box::new(CountingSink { calls: writes });
        Ok(sink)
    }
}

#[tokio::test]
async fn test_deliver_skips_empty_batch() {
    let (opened, writes) = (Arc::default(), Arc::default());

    let written = deliver(&[], counting_opener(&opened, &writes)).await.unwrap();

    assert_eq!(written, 0);
    assert_eq!(opened.load(Ordering::SeqCst), 0);
    assert_eq!(writes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_deliver_empty_batch_needs_no_credential() {
    let written = deliver(&[], || {
        Err(SinkError::MissingCredential(
            "GSPREAD_SERVICE_ACCOUNT_KEY".to_string(),
        ))
    })
    .await
    .unwrap();

    assert_eq!(written, 0);
}

#[tokio::test]
async fn test_deliver_hands_over_once() {
    let (opened, writes) = (Arc::default(), Arc::default());
    let records = vec![
        ProductRecord::new("Farm Eggs", "৳ 150", "12 pcs"),
        ProductRecord::new("Duck Eggs", "N/A", "6 pcs"),
    ];

    let written = deliver(&records, counting_opener(&opened, &writes))
        .await
        .unwrap();

    assert_eq!(written, 2);
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    assert_eq!(writes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_deliver_reports_open_failure() {
    let records = vec![ProductRecord::new("Farm Eggs", "৳ 150", "12 pcs")];

    let err = deliver(&records, || {
        Err(SinkError::MissingCredential(
            "GSPREAD_SERVICE_ACCOUNT_KEY".to_string(),
        ))
    })
    .await
    .unwrap_err();

    assert!(matches!(err, SinkError::MissingCredential(_)));
}
