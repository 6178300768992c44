//! Integration tests for the WeatherAPI client and reverse geocoder against a
//! mock HTTP server.

use std::{sync::Arc, time::Duration};

use currentweather_core::{
    AlwaysOnline, Coordinates, DisplayFields, Geocoder, LocationSource, NominatimGeocoder,
    Presenter, TransportFailure, WeatherApiClient, WeatherError, WeatherProvider, WeatherReport,
    WeatherRequest, WeatherScreen, WeatherView,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

const API_KEY: &str = "TESTKEY";

fn sample_current_response() -> serde_json::Value {
    serde_json::json!({
        "location": {
            "name": "Patna",
            "region": "Bihar",
            "country": "India",
            "lat": 25.6,
            "lon": 85.12,
            "localtime_epoch": 1738314000
        },
        "current": {
            "last_updated_epoch": 1738313100,
            "temp_c": 18.4,
            "is_day": 1,
            "condition": { "text": "Patchy rain possible", "code": 1063 },
            "wind_kph": 13.7,
            "wind_degree": 230,
            "wind_dir": "SW",
            "pressure_mb": 1012.0,
            "humidity": 82,
            "cloud": 75,
            "feelslike_c": 18.4,
            "vis_km": 10.0
        }
    })
}

fn create_test_client(mock_server: &MockServer, timeout_secs: Option<u64>) -> WeatherApiClient {
    WeatherApiClient::builder(API_KEY)
        .base_url(&format!("{}/v1", mock_server.uri()))
        .timeout_secs(timeout_secs)
        .build()
        .expect("Failed to create client")
}

async fn setup_current_mock(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

fn request(city: &str) -> WeatherRequest {
    WeatherRequest::new(city).expect("non-blank city")
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_get_weather_success() {
    let mock_server = MockServer::start().await;
    setup_current_mock(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(sample_current_response()),
    )
    .await;

    let client = create_test_client(&mock_server, None);
    let result = client.get_weather(&request("Patna")).await;

    let report = result.expect("Expected success");
    assert_eq!(report.condition.as_deref(), Some("Patchy rain possible"));
    assert_eq!(report.temperature_c, Some(18.4));
    assert_eq!(report.humidity_pct, Some(82));
    assert_eq!(report.visibility_km, Some(10.0));
    assert_eq!(report.pressure_mb, Some(1012.0));
    assert_eq!(report.wind_degree, Some(230));
    assert_eq!(report.wind_kph, Some(13.7));
    assert_eq!(report.wind_dir.as_deref(), Some("SW"));
}

#[tokio::test]
async fn test_request_contains_correct_query_params() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "New Delhi"))
        .and(query_param("key", API_KEY))
        .and(query_param("aqi", "no"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, None);
    let result = client.get_weather(&request("  New Delhi ")).await;

    assert!(result.is_ok(), "Expected success, got: {result:?}");
}

#[tokio::test]
async fn test_missing_humidity_is_none() {
    let mock_server = MockServer::start().await;

    let mut body = sample_current_response();
    if let Some(current) = body["current"].as_object_mut() {
        current.remove("humidity");
    }
    setup_current_mock(&mock_server, ResponseTemplate::new(200).set_body_json(body)).await;

    let client = create_test_client(&mock_server, None);
    let report = client.get_weather(&request("Patna")).await.expect("Expected success");

    assert_eq!(report.humidity_pct, None);
    assert_eq!(report.temperature_c, Some(18.4));
}

// ============================================================================
// Error classification
// ============================================================================

async fn error_for_status(status: u16) -> WeatherError {
    let mock_server = MockServer::start().await;
    setup_current_mock(
        &mock_server,
        ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "error": { "code": 1006, "message": "No matching location found." }
        })),
    )
    .await;

    let client = create_test_client(&mock_server, None);
    client.get_weather(&request("Atlantis")).await.expect_err("Expected an error")
}

#[tokio::test]
async fn test_not_found_message() {
    assert_eq!(error_for_status(404).await.to_string(), "City not found");
}

#[tokio::test]
async fn test_unauthorized_message() {
    assert_eq!(error_for_status(401).await.to_string(), "Invalid API key");
}

#[tokio::test]
async fn test_rate_limit_message() {
    assert_eq!(error_for_status(429).await.to_string(), "Too many requests");
}

#[tokio::test]
async fn test_other_status_message() {
    let err = error_for_status(500).await;
    assert_eq!(err, WeatherError::Http { status: 500 });
    assert_eq!(err.to_string(), "Error: 500");

    assert_eq!(error_for_status(400).await.to_string(), "Error: 400");
}

#[tokio::test]
async fn test_empty_body_is_no_weather_data() {
    let mock_server = MockServer::start().await;
    setup_current_mock(&mock_server, ResponseTemplate::new(200)).await;

    let client = create_test_client(&mock_server, None);
    let err = client.get_weather(&request("Patna")).await.expect_err("Expected an error");

    assert_eq!(err, WeatherError::EmptyBody);
    assert_eq!(err.to_string(), "No weather data available");
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;
    setup_current_mock(&mock_server, ResponseTemplate::new(200).set_body_string("not valid json"))
        .await;

    let client = create_test_client(&mock_server, None);
    let err = client.get_weather(&request("Patna")).await.expect_err("Expected an error");

    assert!(
        matches!(err, WeatherError::Transport(TransportFailure::Other(_))),
        "Expected Transport(Other), got: {err:?}"
    );
    assert!(err.to_string().starts_with("Error: "));
}

#[tokio::test]
async fn test_timeout_message() {
    let mock_server = MockServer::start().await;
    setup_current_mock(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(sample_current_response())
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let client = create_test_client(&mock_server, Some(1));
    let err = client.get_weather(&request("Patna")).await.expect_err("Expected an error");

    assert_eq!(err, WeatherError::Transport(TransportFailure::Timeout));
    assert_eq!(err.to_string(), "Request timeout");
}

#[tokio::test]
async fn test_connection_refused_message() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().expect("addr").port();
    drop(listener);

    let client = WeatherApiClient::builder(API_KEY)
        .base_url(&format!("http://127.0.0.1:{port}/v1"))
        .build()
        .expect("Failed to create client");
    let err = client.get_weather(&request("Patna")).await.expect_err("Expected an error");

    assert_eq!(err, WeatherError::Transport(TransportFailure::Unreachable));
    assert_eq!(err.to_string(), "No internet connection");
}

#[tokio::test]
async fn test_transport_error_hides_api_key() {
    use tokio::io::AsyncReadExt;

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("addr").port();

    // Accept the request, then hang up without answering.
    let server = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        let mut buf = [0u8; 1024];
        let _ = socket.read(&mut buf).await;
    });

    let client = WeatherApiClient::builder("SUPERSECRETKEY")
        .base_url(&format!("http://127.0.0.1:{port}/v1"))
        .build()
        .expect("Failed to create client");
    let err = client.get_weather(&request("Patna")).await.expect_err("Expected an error");
    server.await.expect("server task");

    let message = err.to_string();
    assert!(
        matches!(err, WeatherError::Transport(TransportFailure::Other(_))),
        "Expected Transport(Other), got: {err:?}"
    );
    assert!(message.starts_with("Error: "), "unexpected message: {message}");
    assert!(!message.contains("SUPERSECRETKEY"), "API key leaked: {message}");
    assert!(!format!("{err:?}").contains("SUPERSECRETKEY"));
}

// ============================================================================
// Reverse geocoding
// ============================================================================

#[tokio::test]
async fn test_reverse_geocode_picks_city() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("format", "jsonv2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "display_name": "Patna, Bihar, India",
            "address": { "city": "Patna", "state": "Bihar", "country": "India" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let geocoder = NominatimGeocoder::new(&mock_server.uri()).expect("geocoder");
    let locality = geocoder
        .reverse_geocode(Coordinates::new(25.6, 85.12))
        .await
        .expect("Expected success");

    assert_eq!(locality.as_deref(), Some("Patna"));
}

#[tokio::test]
async fn test_reverse_geocode_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let geocoder = NominatimGeocoder::new(&mock_server.uri()).expect("geocoder");
    let result = geocoder.reverse_geocode(Coordinates::new(0.0, 0.0)).await;

    assert!(result.is_err());
}

// ============================================================================
// Screen end to end
// ============================================================================

#[derive(Debug, Default)]
struct CapturingView {
    rendered: Vec<DisplayFields>,
    messages: Vec<String>,
}

impl WeatherView for CapturingView {
    fn show_loading(&mut self, _loading: bool) {}

    fn render(&mut self, fields: &DisplayFields) -> anyhow::Result<()> {
        self.rendered.push(fields.clone());
        Ok(())
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

#[tokio::test]
async fn test_screen_renders_device_location() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "town": "Patna" }
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/current.json"))
        .and(query_param("q", "Patna"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_current_response()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider: Arc<dyn WeatherProvider> = Arc::new(create_test_client(&mock_server, None));
    let geocoder = Arc::new(NominatimGeocoder::new(&mock_server.uri()).expect("geocoder"));
    let (screen, mut rx) =
        WeatherScreen::new(provider, Arc::new(AlwaysOnline), geocoder, LocationSource::Device);

    screen.start().await;
    screen.on_permission_result(true).await;
    screen.on_location_resolved(Some(Coordinates::new(25.6, 85.12))).await;
    drop(screen);

    let mut presenter = Presenter::new(CapturingView::default());
    while let Some(event) = rx.recv().await {
        presenter.handle(event);
    }

    let view = presenter.into_view();
    assert!(view.messages.is_empty(), "unexpected messages: {:?}", view.messages);
    assert_eq!(view.rendered.len(), 1);

    let fields = &view.rendered[0];
    let expected = DisplayFields::new(
        &WeatherReport {
            condition: Some("Patchy rain possible".into()),
            temperature_c: Some(18.4),
            humidity_pct: Some(82),
            visibility_km: Some(10.0),
            pressure_mb: Some(1012.0),
            wind_degree: Some(230),
            wind_kph: Some(13.7),
            wind_dir: Some("SW".into()),
        },
        "Patna",
        chrono::Local::now(),
    );
    assert_eq!(fields.city, expected.city);
    assert_eq!(fields.temperature, "18.4°C");
    assert_eq!(fields.humidity, "82 %");
    assert_eq!(fields.visibility, "10.0 km");
    assert_eq!(fields.pressure, "1012.0 mb");
    assert_eq!(fields.wind_degree, "230°");
    assert_eq!(fields.wind_speed, "13.7 km/h");
    assert_eq!(fields.wind_direction, "SW");
    assert_eq!(fields.icon, expected.icon);
}
