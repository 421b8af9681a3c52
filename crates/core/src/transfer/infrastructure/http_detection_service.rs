use std::time::Duration;

use reqwest::blocking::{multipart, Client, Response};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::shared::constants::UPLOAD_FIELD_NAME;
use crate::shared::detection_result::{DetectionResult, ResultId, UploadOutcome};
use crate::shared::endpoint::{BaseEndpoint, EndpointError};
use crate::transfer::domain::detection_service::DetectionService;
use crate::transfer::domain::image_upload::ImageUpload;
use crate::transfer::domain::transfer_error::{Operation, TransferError};

/// `DetectionService` backed by blocking HTTP requests.
///
/// Every request is a single attempt bounded by the configured timeout.
/// A service built without an endpoint fails every call with
/// [`TransferError::Configuration`] before touching the network.
pub struct HttpDetectionService {
    endpoint: Option<BaseEndpoint>,
    client: Client,
}

impl HttpDetectionService {
    pub fn new(endpoint: Option<BaseEndpoint>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    fn require_endpoint(&self) -> Result<&BaseEndpoint, TransferError> {
        self.endpoint
            .as_ref()
            .ok_or(TransferError::Configuration(EndpointError::Unset))
    }
}

impl DetectionService for HttpDetectionService {
    fn submit_image(&self, upload: &ImageUpload) -> Result<UploadOutcome, TransferError> {
        let op = Operation::Upload;
        let url = self.require_endpoint()?.join("upload");
        log::debug!("POST {url} ({}, {} bytes)", upload.mime_type(), upload.len());

        let part = multipart::Part::bytes(upload.bytes().to_vec())
            .file_name(upload.file_name().to_string())
            .mime_str(upload.mime_type())
            .map_err(|e| network(op, e))?;
        let form = multipart::Form::new().part(UPLOAD_FIELD_NAME, part);

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .map_err(|e| network(op, e))?;
        decode_json(op, require_success(op, response)?)
    }

    fn list_results(&self) -> Result<Vec<DetectionResult>, TransferError> {
        let op = Operation::ListResults;
        let url = self.require_endpoint()?.join("results");
        log::debug!("GET {url}");

        let response = self.client.get(&url).send().map_err(|e| network(op, e))?;
        decode_json(op, require_success(op, response)?)
    }

    fn delete_result(&self, id: ResultId) -> Result<(), TransferError> {
        let op = Operation::DeleteResult;
        let url = self.require_endpoint()?.join(&format!("results/{id}"));
        log::debug!("DELETE {url}");

        let response = self.client.delete(&url).send().map_err(|e| network(op, e))?;
        let status = response.status();
        if status != StatusCode::NO_CONTENT {
            log::warn!("DELETE {url} answered {status}, expected 204");
            return Err(TransferError::Status {
                operation: op,
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    fn fetch_image(&self, image_url: &str) -> Result<Vec<u8>, TransferError> {
        let op = Operation::FetchImage;
        let url = self.require_endpoint()?.resolve_image(image_url);
        log::debug!("GET {url}");

        let response = self.client.get(&url).send().map_err(|e| network(op, e))?;
        let bytes = require_success(op, response)?
            .bytes()
            .map_err(|e| network(op, e))?;
        Ok(bytes.to_vec())
    }
}

fn network(operation: Operation, error: reqwest::Error) -> TransferError {
    log::warn!("{operation} failed: {error}");
    TransferError::Network {
        operation,
        message: error.to_string(),
    }
}

fn require_success(operation: Operation, response: Response) -> Result<Response, TransferError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::warn!("{operation} answered {status}");
        Err(TransferError::Status {
            operation,
            status: status.as_u16(),
        })
    }
}

fn decode_json<T: DeserializeOwned>(operation: Operation, response: Response) -> Result<T, TransferError> {
    let body = response.text().map_err(|e| network(operation, e))?;
    serde_json::from_str(&body).map_err(|e| {
        log::warn!("{operation} body could not be decoded: {e}");
        TransferError::Decode {
            operation,
            message: e.to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread::{self, JoinHandle};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    // --- Canned server ---

    /// Accepts one connection, answers with the given status line and body,
    /// and hands back the raw request text.
    fn serve_once(status_line: &'static str, body: &'static str) -> (BaseEndpoint, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let request = read_request(&mut stream);
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            request
        });
        (BaseEndpoint::parse(&format!("http://{addr}")).unwrap(), handle)
    }

    fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stream.read(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if request_complete(&buf) {
                break;
            }
        }
        String::from_utf8_lossy(&buf).to_string()
    }

    fn request_complete(buf: &[u8]) -> bool {
        let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let headers = String::from_utf8_lossy(&buf[..header_end]).to_lowercase();
        let body = &buf[header_end + 4..];
        if headers.contains("transfer-encoding: chunked") {
            return body.ends_with(b"0\r\n\r\n");
        }
        let content_length = headers
            .lines()
            .find_map(|l| l.strip_prefix("content-length:"))
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(0);
        body.len() >= content_length
    }

    fn service(endpoint: BaseEndpoint) -> HttpDetectionService {
        HttpDetectionService::new(Some(endpoint), Duration::from_secs(5)).unwrap()
    }

    fn unconfigured() -> HttpDetectionService {
        HttpDetectionService::new(None, Duration::from_secs(5)).unwrap()
    }

    fn png_upload() -> ImageUpload {
        ImageUpload::from_bytes("group.png", PNG_MAGIC.to_vec()).unwrap()
    }

    // --- Upload ---

    #[test]
    fn test_submit_image_decodes_outcome() {
        let (endpoint, server) = serve_once("200 OK", r#"{"count": 3, "image_url": "/static/out1.jpg"}"#);

        let outcome = service(endpoint).submit_image(&png_upload()).unwrap();
        assert_eq!(outcome.count, 3);
        assert_eq!(outcome.image_url, "/static/out1.jpg");

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /upload "));
        assert!(request.contains("name=\"file\""));
        assert!(request.contains("filename=\"group.png\""));
        assert!(request.contains("image/png"));
    }

    #[test]
    fn test_submit_image_non_success_status() {
        let (endpoint, server) = serve_once("400 Bad Request", r#"{"detail": "Invalid image file type"}"#);

        let err = service(endpoint).submit_image(&png_upload()).unwrap_err();
        assert_eq!(
            err,
            TransferError::Status {
                operation: Operation::Upload,
                status: 400
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_submit_image_malformed_body() {
        let (endpoint, server) = serve_once("200 OK", r#"{"persons": 3}"#);

        let err = service(endpoint).submit_image(&png_upload()).unwrap_err();
        assert!(matches!(
            err,
            TransferError::Decode {
                operation: Operation::Upload,
                ..
            }
        ));
        server.join().unwrap();
    }

    // --- List ---

    #[test]
    fn test_list_results_decodes_array_in_order() {
        let (endpoint, server) = serve_once(
            "200 OK",
            r#"[{"id": 9, "timestamp": "2024-05-02T10:00:00", "count": 1, "image_url": "/static/9.jpg"},
                {"id": 4, "timestamp": "2024-05-01T10:00:00", "count": 0, "image_url": "/static/4.jpg"}]"#,
        );

        let results = service(endpoint).list_results().unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ResultId(9), ResultId(4)]);

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /results "));
    }

    #[test]
    fn test_list_results_server_error() {
        let (endpoint, server) = serve_once("500 Internal Server Error", "");

        let err = service(endpoint).list_results().unwrap_err();
        assert_eq!(
            err,
            TransferError::Status {
                operation: Operation::ListResults,
                status: 500
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_list_results_object_instead_of_array() {
        let (endpoint, server) = serve_once("200 OK", r#"{"results": []}"#);

        let err = service(endpoint).list_results().unwrap_err();
        assert!(matches!(err, TransferError::Decode { .. }));
        server.join().unwrap();
    }

    // --- Delete ---

    #[test]
    fn test_delete_result_accepts_no_content() {
        let (endpoint, server) = serve_once("204 No Content", "");

        service(endpoint).delete_result(ResultId(21)).unwrap();

        let request = server.join().unwrap();
        assert!(request.starts_with("DELETE /results/21 "));
    }

    #[test]
    fn test_delete_result_rejects_plain_ok() {
        let (endpoint, server) = serve_once("200 OK", "{}");

        let err = service(endpoint).delete_result(ResultId(21)).unwrap_err();
        assert_eq!(
            err,
            TransferError::Status {
                operation: Operation::DeleteResult,
                status: 200
            }
        );
        server.join().unwrap();
    }

    #[test]
    fn test_delete_unknown_id_is_error() {
        let (endpoint, server) = serve_once("404 Not Found", r#"{"detail": "Result not found"}"#);

        let err = service(endpoint).delete_result(ResultId(999)).unwrap_err();
        assert!(matches!(err, TransferError::Status { status: 404, .. }));
        server.join().unwrap();
    }

    // --- Image ---

    #[test]
    fn test_fetch_image_resolves_against_base() {
        let (endpoint, server) = serve_once("200 OK", "jpegbytes");

        let bytes = service(endpoint).fetch_image("/static/out1.jpg").unwrap();
        assert_eq!(bytes, b"jpegbytes");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /static/out1.jpg "));
    }

    // --- Configuration and network ---

    #[test]
    fn test_unconfigured_endpoint_fails_fast() {
        let svc = unconfigured();
        let expected = TransferError::Configuration(EndpointError::Unset);

        assert_eq!(svc.list_results().unwrap_err(), expected);
        assert_eq!(svc.delete_result(ResultId(1)).unwrap_err(), expected);
        assert_eq!(svc.submit_image(&png_upload()).unwrap_err(), expected);
        assert_eq!(svc.fetch_image("/static/a.jpg").unwrap_err(), expected);
    }

    #[test]
    fn test_unreachable_service_is_network_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let endpoint = BaseEndpoint::parse(&format!("http://{addr}")).unwrap();
        let err = service(endpoint).list_results().unwrap_err();
        assert!(matches!(
            err,
            TransferError::Network {
                operation: Operation::ListResults,
                ..
            }
        ));
    }
}
