//! Integration tests for similarity lookups against a mock search backend.
//!
//! A `wiremock` server stands in for the search core, so these tests cover
//! the full resolve → request → normalize path over real HTTP.

use serde_json::json;
use smlt_client::{
    BackendEndpoint, ConnectionTable, Credentials, FallbackReason, HttpConfig, SimilarityRequest,
    SimilarityResult, SimilarityService, StaticResolver,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CORE_PATH: &str = "/solr/core_en";

fn service_for(endpoint: BackendEndpoint) -> SimilarityService<StaticResolver> {
    SimilarityService::new(StaticResolver::new(endpoint), &HttpConfig::default())
        .expect("service should build")
}

fn core_uri(server: &MockServer) -> String {
    format!("{}{CORE_PATH}/", server.uri())
}

#[tokio::test]
async fn happy_path_returns_payload_in_backend_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{CORE_PATH}/smlt")))
        .and(query_param("smlt", "true"))
        .and(query_param("smlt.id", "page-42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "responseHeader": {"status": 0},
            "semanticMoreLikeThis": {
                "sourceId": "page-42",
                "mode": "hybrid",
                "numFound": 2,
                "docs": [{"id": "a"}, {"id": "b"}]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(BackendEndpoint::new(core_uri(&server)));
    let outcome = service
        .find_similar_outcome(&SimilarityRequest::new("page-42", 1))
        .await;

    assert!(!outcome.is_fallback());
    let result = outcome.into_result();
    assert_eq!(result.source_id, "page-42");
    assert_eq!(result.mode, "hybrid");
    assert_eq!(result.num_found, 2);
    let ids: Vec<_> = result.docs.iter().filter_map(|d| d.id.as_deref()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test]
async fn request_carries_exact_query_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("{CORE_PATH}/smlt")))
        .and(query_param("smlt", "true"))
        .and(query_param("smlt.id", "page-42"))
        .and(query_param("smlt.count", "3"))
        .and(query_param("smlt.mode", "vector_only"))
        .and(query_param("smlt.vectorWeight", "1"))
        .and(query_param("smlt.mltWeight", "0"))
        .and(query_param("q", "*:*"))
        .and(query_param("rows", "0"))
        .and(query_param("wt", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "page-42", "mode": "vector_only", "numFound": 0, "docs": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(BackendEndpoint::new(core_uri(&server)));
    let request = SimilarityRequest::new("page-42", 1)
        .with_count(3)
        .with_mode("vector_only")
        .with_weights(1.0, 0.0);
    let outcome = service.find_similar_outcome(&request).await;

    assert!(!outcome.is_fallback(), "mock should have matched: {outcome:?}");

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].url.query_pairs().count(), 9);
}

#[tokio::test]
async fn defaults_are_sent_when_only_id_and_site_given() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("smlt.count", "5"))
        .and(query_param("smlt.mode", "hybrid"))
        .and(query_param("smlt.vectorWeight", "0.7"))
        .and(query_param("smlt.mltWeight", "0.3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "doc", "mode": "hybrid", "numFound": 0, "docs": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let service = service_for(BackendEndpoint::new(server.uri()));
    let outcome = service
        .find_similar_outcome(&SimilarityRequest::new("doc", 1))
        .await;
    assert!(!outcome.is_fallback());
}

#[tokio::test]
async fn basic_auth_header_sent_with_complete_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(header("Authorization", "Basic dXNlcjpwYXNz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "doc", "mode": "hybrid", "numFound": 0, "docs": []}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let endpoint =
        BackendEndpoint::new(core_uri(&server)).with_credentials(Credentials::new("user", "pass"));
    let outcome = service_for(endpoint)
        .find_similar_outcome(&SimilarityRequest::new("doc", 1))
        .await;
    assert!(!outcome.is_fallback());
}

#[tokio::test]
async fn no_auth_header_without_password() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "doc", "mode": "hybrid", "numFound": 0, "docs": []}
        })))
        .mount(&server)
        .await;

    let incomplete = BackendEndpoint::new(core_uri(&server))
        .with_credentials(Credentials::username_only("user"));
    service_for(incomplete)
        .find_similar(&SimilarityRequest::new("doc", 1))
        .await;
    service_for(BackendEndpoint::new(core_uri(&server)))
        .find_similar(&SimilarityRequest::new("doc", 1))
        .await;

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 2);
    for request in &received {
        assert!(request.headers.get("authorization").is_none());
    }
}

#[tokio::test]
async fn service_unavailable_degrades_to_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .expect(1)
        .mount(&server)
        .await;

    let request = SimilarityRequest::new("page-42", 1).with_mode("mlt_only");
    let outcome = service_for(BackendEndpoint::new(core_uri(&server)))
        .find_similar_outcome(&request)
        .await;

    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::Status(503)));
    assert_eq!(outcome.into_result(), SimilarityResult::empty("page-42", "mlt_only"));
}

#[tokio::test]
async fn missing_envelope_degrades_to_empty_result() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"foo": "bar"})))
        .mount(&server)
        .await;

    let outcome = service_for(BackendEndpoint::new(core_uri(&server)))
        .find_similar_outcome(&SimilarityRequest::new("page-42", 1))
        .await;

    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::Malformed));
    assert_eq!(outcome.into_result(), SimilarityResult::empty("page-42", "hybrid"));
}

#[tokio::test]
async fn connection_refused_degrades_to_empty_result() {
    // Bind only to learn a free port; nothing listens once the listener drops.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        format!("http://{addr}/solr/core_en")
    };

    let http = HttpConfig {
        timeout_seconds: 2,
        connect_timeout_seconds: 1,
        ..Default::default()
    };
    let service = SimilarityService::new(StaticResolver::new(BackendEndpoint::new(uri)), &http)
        .expect("service should build");
    let outcome = service
        .find_similar_outcome(&SimilarityRequest::new("page-42", 1))
        .await;

    assert_eq!(outcome.fallback_reason(), Some(FallbackReason::Transport));
    assert_eq!(outcome.into_result(), SimilarityResult::empty("page-42", "hybrid"));
}

#[tokio::test]
async fn connection_table_routes_by_language() {
    let english = MockServer::start().await;
    let german = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "doc", "mode": "hybrid", "numFound": 1, "docs": [{"id": "de-1"}]}
        })))
        .expect(1)
        .mount(&german)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&english)
        .await;

    let table = ConnectionTable::new()
        .with_connection(1, 0, BackendEndpoint::new(english.uri()))
        .with_connection(1, 1, BackendEndpoint::new(german.uri()));
    let service = SimilarityService::new(table, &HttpConfig::default()).expect("service");

    let result = service
        .find_similar(&SimilarityRequest::new("doc", 1).with_language(1))
        .await;
    assert_eq!(result.docs[0].id.as_deref(), Some("de-1"));
}

#[tokio::test]
async fn one_off_lookup_helper() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "semanticMoreLikeThis": {"sourceId": "doc", "mode": "hybrid", "numFound": 1, "docs": [{"id": "z"}]}
        })))
        .mount(&server)
        .await;

    let resolver = StaticResolver::new(BackendEndpoint::new(server.uri()));
    let result = smlt_client::find_similar(&resolver, &SimilarityRequest::new("doc", 1)).await;
    assert_eq!(result.num_found, 1);
}
