//! HTTP adapter for the diagnostic service (reqwest).

use std::path::Path;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::domain::{AnalysisResult, PatientRecord};
use crate::ports::{ApiError, CsvUpload, DiagnosticApi};

const ANALYZE_PATH: &str = "/api/analyze";
const UPLOAD_CSV_PATH: &str = "/api/upload_csv";
const GENERATE_SAMPLE_PATH: &str = "/api/generate_sample";

/// Client for the diagnostic service's JSON API.
pub struct HttpDiagnosticClient {
    base_url: String,
    client: reqwest::Client,
    timeout_secs: u64,
}

impl HttpDiagnosticClient {
    /// Build a client with the configured base URL and request timeout.
    ///
    /// # Errors
    /// Returns `ApiError::Transport` if the HTTP client cannot be constructed.
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            timeout_secs: config.request_timeout.as_secs(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send_error(&self, e: reqwest::Error) -> ApiError {
        if e.is_timeout() {
            ApiError::Timeout(self.timeout_secs)
        } else if e.is_connect() {
            ApiError::Transport(format!("cannot connect to {}", self.base_url))
        } else {
            ApiError::Transport(e.to_string())
        }
    }

    async fn read<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.send_error(e))?;
        decode_envelope(status, &body)
    }
}

/// Decode a service response.
///
/// A top-level `error` field wins over both the HTTP status and the rest of
/// the body.
fn decode_envelope<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ApiError::Decode(format!("HTTP {status}: body is not JSON ({e})")))?;

    if let Some(message) = error_message(&value) {
        return Err(ApiError::Application(message));
    }

    serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("HTTP {status}: {e}")))
}

fn error_message(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl DiagnosticApi for HttpDiagnosticClient {
    async fn analyze(&self, record: &PatientRecord) -> Result<AnalysisResult, ApiError> {
        tracing::debug!(endpoint = ANALYZE_PATH, "sending analysis request");
        let response = self
            .client
            .post(self.url(ANALYZE_PATH))
            .json(record)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read(response).await
    }

    async fn upload_csv(&self, path: &Path) -> Result<CsvUpload, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| ApiError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.csv".to_string());

        tracing::debug!(endpoint = UPLOAD_CSV_PATH, size = bytes.len(), "uploading CSV");

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("text/csv")
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(UPLOAD_CSV_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read(response).await
    }

    async fn generate_sample(&self) -> Result<PatientRecord, ApiError> {
        tracing::debug!(endpoint = GENERATE_SAMPLE_PATH, "requesting sample patient");
        let response = self
            .client
            .get(self.url(GENERATE_SAMPLE_PATH))
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        self.read(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Gender, RiskLevel};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    const ANALYZE_OK: &str = r##"{
        "rule_results": {
            "conditions": [], "risk_factors": [], "risk_level": "Normal",
            "risk_emoji": "🟢", "recommendations": ["Schedule regular check-ups with your healthcare provider"]
        },
        "ml_results": {"predicted_risk": "Normal", "confidence": 100.0},
        "visualization": {
            "metrics": ["Glucose", "Systolic BP", "Diastolic BP", "Cholesterol", "BMI"],
            "values": [90, 115, 75, 180, 22.5],
            "normal_ranges": [{"min": 70, "max": 100}, {"min": 90, "max": 120},
                {"min": 60, "max": 80}, {"min": 0, "max": 200}, {"min": 18.5, "max": 24.9}],
            "colors": ["#2ecc71", "#2ecc71", "#2ecc71", "#2ecc71", "#2ecc71"]
        }
    }"##;

    fn record() -> PatientRecord {
        PatientRecord {
            patient_id: "PAT_test00001".to_string(),
            age: 40,
            gender: Gender::Male,
            glucose: 90.0,
            systolic_bp: 115.0,
            diastolic_bp: 75.0,
            cholesterol: 180.0,
            bmi: 22.5,
        }
    }

    fn client_for(base_url: &str, timeout: Duration) -> HttpDiagnosticClient {
        let config = ClientConfig {
            base_url: base_url.to_string(),
            request_timeout: timeout,
            ..ClientConfig::default()
        };
        HttpDiagnosticClient::new(&config).expect("client")
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.expect("read");
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf).to_string();
            let Some(header_end) = text.find("\r\n\r\n") else {
                continue;
            };
            let headers = text[..header_end].to_ascii_lowercase();
            let body_len = buf.len() - (header_end + 4);

            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok());
            match content_length {
                Some(len) if body_len >= len => break,
                Some(_) => continue,
                None if headers.contains("transfer-encoding: chunked") => {
                    if text.ends_with("0\r\n\r\n") {
                        break;
                    }
                }
                None => break,
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    /// Accept one connection, capture the request, answer with `status` and `body`.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.expect("write");
            let _ = socket.shutdown().await;
            request
        });

        (format!("http://{addr}"), handle)
    }

    #[tokio::test]
    async fn test_analyze_posts_json_record() {
        let (url, server) = serve_once("200 OK", ANALYZE_OK).await;
        let client = client_for(&url, Duration::from_secs(5));

        let result = client.analyze(&record()).await.expect("analysis");
        assert_eq!(result.rule_results.risk_level, RiskLevel::Normal);
        assert!(result.rule_results.conditions.is_empty());

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /api/analyze HTTP/1.1"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.contains("\"patient_id\":\"PAT_test00001\""));
        assert!(request.contains("\"systolic_bp\":115.0"));
    }

    #[tokio::test]
    async fn test_error_field_wins_over_status() {
        let (url, _server) =
            serve_once("500 INTERNAL SERVER ERROR", r#"{"error": "No data provided"}"#).await;
        let client = client_for(&url, Duration::from_secs(5));

        let err = client.analyze(&record()).await.expect_err("should fail");
        assert_eq!(err, ApiError::Application("No data provided".to_string()));
        assert_eq!(err.to_string(), "Error: No data provided");
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let (url, _server) = serve_once("502 BAD GATEWAY", "<html>bad gateway</html>").await;
        let client = client_for(&url, Duration::from_secs(5));

        let err = client.generate_sample().await.expect_err("should fail");
        assert!(matches!(err, ApiError::Decode(ref m) if m.contains("HTTP 502")));
    }

    #[tokio::test]
    async fn test_generate_sample() {
        let (url, server) = serve_once(
            "200 OK",
            r#"{"patient_id": "SAMPLE_5678", "age": 63, "gender": "Female", "glucose": 121,
                "systolic_bp": 141, "diastolic_bp": 71, "cholesterol": 271, "bmi": 27.3}"#,
        )
        .await;
        let client = client_for(&url, Duration::from_secs(5));

        let sample = client.generate_sample().await.expect("sample");
        assert_eq!(sample.patient_id, "SAMPLE_5678");
        assert_eq!(sample.gender, Gender::Female);
        assert!((sample.glucose - 121.0).abs() < f64::EPSILON);

        let request = server.await.expect("server");
        assert!(request.starts_with("GET /api/generate_sample HTTP/1.1"));
    }

    #[tokio::test]
    async fn test_upload_csv_sends_multipart_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("patients.csv");
        std::fs::write(&path, "Patient_ID,Age\nP1,50\n").expect("write csv");

        let (url, server) = serve_once(
            "200 OK",
            r#"{"success": true, "patient_data": {"Patient_ID": "P1", "Age": 50}, "total_records": 1}"#,
        )
        .await;
        let client = client_for(&url, Duration::from_secs(5));

        let upload = client.upload_csv(&path).await.expect("upload");
        assert_eq!(upload.total_records, 1);
        assert_eq!(upload.patient_data["Patient_ID"], "P1");

        let request = server.await.expect("server");
        assert!(request.starts_with("POST /api/upload_csv HTTP/1.1"));
        assert!(request.contains("multipart/form-data"));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"patients.csv\""));
        assert!(request.contains("P1,50"));
    }

    #[tokio::test]
    async fn test_upload_missing_file_is_io_error() {
        let client = client_for("http://127.0.0.1:9", Duration::from_secs(1));
        let err = client
            .upload_csv(Path::new("/nonexistent/patients.csv"))
            .await
            .expect_err("should fail");
        assert!(matches!(err, ApiError::Io { ref path, .. } if path.contains("patients.csv")));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let client = client_for(&format!("http://{addr}"), Duration::from_secs(2));
        let err = client.analyze(&record()).await.expect_err("should fail");
        assert!(matches!(err, ApiError::Transport(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_unanswered_request_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let _server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.expect("accept");
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let client = client_for(&format!("http://{addr}"), Duration::from_secs(1));
        let err = client.analyze(&record()).await.expect_err("should time out");
        assert_eq!(err, ApiError::Timeout(1));
    }

    #[test]
    fn test_decode_envelope_ignores_empty_error() {
        let sample: Result<serde_json::Map<String, Value>, _> =
            decode_envelope(200, r#"{"error": null, "x": 1}"#);
        assert!(sample.is_ok());

        let err: Result<serde_json::Map<String, Value>, _> =
            decode_envelope(200, r#"{"error": {"code": 3}}"#);
        assert_eq!(err, Err(ApiError::Application(r#"{"code":3}"#.to_string())));
    }
}
