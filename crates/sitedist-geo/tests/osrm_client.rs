//! Integration tests for `OsrmClient` using wiremock HTTP mocks.

use sitedist_core::Coordinates;
use sitedist_geo::{GeoError, OsrmClient, RouteDistanceService, RouteProvider, RouteSource};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FROM: Coordinates = Coordinates::new(-33.5, 151.25);
const TO: Coordinates = Coordinates::new(-34.0, 150.5);

fn test_client(base_url: &str) -> OsrmClient {
    OsrmClient::with_base_url(base_url, "sitedist-test/0.1", 5)
        .expect("client construction should not fail")
}

async fn mount_route(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/route/v1/driving/"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn driving_route_converts_units() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/route/v1/driving/151.25,-33.5;150.5,-34"))
        .and(query_param("overview", "false"))
        .and(query_param("steps", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": "Ok",
            "routes": [{ "distance": 92500.0, "duration": 4230.0 }]
        })))
        .mount(&server)
        .await;

    let route = test_client(&server.uri())
        .driving_route(FROM, TO)
        .await
        .expect("should parse route");

    assert!((route.distance_km - 92.5).abs() < 1e-9);
    assert!((route.duration_min - 70.5).abs() < 1e-9);
}

#[tokio::test]
async fn no_route_code_is_error() {
    let server = MockServer::start().await;
    mount_route(
        &server,
        ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "code": "NoRoute",
            "message": "Impossible route between points"
        })),
    )
    .await;

    let err = test_client(&server.uri())
        .driving_route(FROM, TO)
        .await
        .expect_err("NoRoute should be an error");
    match err {
        GeoError::NoRoute(detail) => assert!(detail.starts_with("NoRoute"), "got {detail}"),
        other => panic!("expected NoRoute, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_routes_is_error() {
    let server = MockServer::start().await;
    mount_route(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "code": "Ok", "routes": [] })),
    )
    .await;

    let err = test_client(&server.uri()).driving_route(FROM, TO).await.unwrap_err();
    assert!(matches!(err, GeoError::NoRoute(_)), "got {err:?}");
}

#[tokio::test]
async fn server_error_without_body_is_unexpected_status() {
    let server = MockServer::start().await;
    mount_route(&server, ResponseTemplate::new(503)).await;

    let err = test_client(&server.uri()).driving_route(FROM, TO).await.unwrap_err();
    assert!(
        matches!(err, GeoError::UnexpectedStatus { status: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn malformed_success_body_is_deserialize_error() {
    let server = MockServer::start().await;
    mount_route(&server, ResponseTemplate::new(200).set_body_string("{\"code\":")).await;

    let err = test_client(&server.uri()).driving_route(FROM, TO).await.unwrap_err();
    assert!(matches!(err, GeoError::Deserialize { .. }), "got {err:?}");
}

#[tokio::test]
async fn service_falls_back_when_osrm_has_no_route() {
    let server = MockServer::start().await;
    mount_route(
        &server,
        ResponseTemplate::new(200).set_body_json(serde_json::json!({ "code": "NoSegment", "routes": [] })),
    )
    .await;

    let service = RouteDistanceService::new(test_client(&server.uri()));
    let estimate = service.route(FROM, TO).await;

    assert_eq!(estimate.source, RouteSource::GreatCircle);
    let expected_km = sitedist_geo::great_circle_km(FROM, TO);
    assert!((estimate.distance_km - expected_km).abs() < 1e-9);
    assert!((estimate.duration_min - expected_km / 50.0 * 60.0).abs() < 1e-9);
}
