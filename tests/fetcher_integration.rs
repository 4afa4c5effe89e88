//! Integration tests for the HTTP fetcher against a mock remote.

use extractor_core::{ExtractionRequest, FetchError, HttpFetcher, PageFetcher, parse_after_date};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ==================== Test Helpers ====================

fn request(base: &str) -> ExtractionRequest {
    ExtractionRequest::new(base, "posts", None).expect("valid request")
}

fn post_body(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "date": "2024-03-01T10:30:00",
        "title": { "rendered": format!("Post {id}") },
        "content": { "rendered": format!("<p>Body {id}</p>") }
    })
}

// ==================== Happy Path Tests ====================

#[tokio::test]
async fn test_fetches_page_and_total_pages_header() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "1"))
        .and(query_param("per_page", "100"))
        .and(query_param("status", "publish"))
        .and(query_param("orderby", "date"))
        .and(query_param("order", "desc"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-WP-TotalPages", "3")
                .set_body_json(json!([post_body(1), post_body(2)])),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let page = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect("page fetch succeeds");

    assert_eq!(page.posts.len(), 2);
    assert_eq!(page.posts[0].id, 1);
    assert_eq!(page.posts[0].title.rendered, "Post 1");
    assert_eq!(page.total_pages, Some(3));
}

#[tokio::test]
async fn test_missing_total_pages_header_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_body(1)])))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let page = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect("page fetch succeeds");

    assert_eq!(page.total_pages, None);
}

#[tokio::test]
async fn test_after_filter_sent_as_query_param() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("after", "2024-01-31T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let after = parse_after_date("2024-01-31").expect("valid date");
    let request =
        ExtractionRequest::new(&server.uri(), "posts", Some(after)).expect("valid request");

    let fetcher = HttpFetcher::new();
    let page = fetcher
        .fetch_page(&request, 1, 100)
        .await
        .expect("matched mock means the param was sent");
    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn test_custom_post_type_routes_to_its_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([post_body(1)])))
        .mount(&server)
        .await;

    let request =
        ExtractionRequest::new(&server.uri(), "pages", None).expect("valid request");

    let fetcher = HttpFetcher::new();
    let page = fetcher.fetch_page(&request, 1, 100).await.expect("fetch");
    assert_eq!(page.posts.len(), 1);
}

// ==================== End of Pagination Tests ====================

#[tokio::test]
async fn test_page_out_of_range_reads_as_empty_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "rest_post_invalid_page_number",
            "message": "The page number requested is larger than the number of pages available.",
            "data": { "status": 400 }
        })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let page = fetcher
        .fetch_page(&request(&server.uri()), 2, 100)
        .await
        .expect("out-of-range page is not an error");

    assert!(page.posts.is_empty());
}

#[tokio::test]
async fn test_page_out_of_range_on_first_page_is_an_error() {
    let server = MockServer::start().await;

    // The same rejection on page 1 means the collection itself is broken
    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "rest_post_invalid_page_number"
        })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect_err("page 1 rejection must surface");

    assert!(matches!(error, FetchError::RemoteStatus { status: 400, .. }));
}

#[tokio::test]
async fn test_other_400_rejection_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wp-json/wp/v2/posts"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": "rest_invalid_param"
        })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 2, 100)
        .await
        .expect_err("unrelated rejection must surface");

    assert!(matches!(error, FetchError::RemoteStatus { status: 400, .. }));
    assert!(!error.is_transient());
}

// ==================== Error Classification Tests ====================

#[tokio::test]
async fn test_not_found_is_remote_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect_err("404 must surface");

    assert!(matches!(error, FetchError::RemoteStatus { status: 404, .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_server_error_is_remote_status_and_not_transient() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect_err("503 must surface");

    assert!(matches!(error, FetchError::RemoteStatus { status: 503, .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_invalid_json_is_malformed_payload() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect_err("non-JSON body must surface");

    assert!(matches!(error, FetchError::MalformedPayload { .. }));
    assert!(!error.is_transient());
}

#[tokio::test]
async fn test_wrong_shape_json_is_malformed_payload() {
    let server = MockServer::start().await;

    // An object where a record array is expected
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "posts": [] })))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request(&server.uri()), 1, 100)
        .await
        .expect_err("wrong shape must surface");

    assert!(matches!(error, FetchError::MalformedPayload { .. }));
}

#[tokio::test]
async fn test_connection_refused_is_transient_network_error() {
    // Port 1 is never listening
    let fetcher = HttpFetcher::new();
    let error = fetcher
        .fetch_page(&request("http://127.0.0.1:1"), 1, 100)
        .await
        .expect_err("connection must fail");

    assert!(matches!(error, FetchError::Network { .. }));
    assert!(error.is_transient());
}
