//! Helpers for inspecting what the mock Bot API received

use wiremock::MockServer;
use wiremock::Request;

/// Requests received by `server`, in arrival order
pub async fn received(server: &MockServer) -> Vec<Request> {
    server
        .received_requests()
        .await
        .expect("request recording is enabled")
}

/// Bot API method names of the received requests, in arrival order
pub async fn received_methods(server: &MockServer) -> Vec<String> {
    received(server)
        .await
        .iter()
        .map(|r| {
            r.url
                .path()
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        })
        .collect()
}

/// Body of a request as lossy UTF-8
pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}

/// Value of a multipart text field, if present
pub fn multipart_field(request: &Request, name: &str) -> Option<String> {
    let body = body_text(request);
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let end = body[start..].find("\r\n--")? + start;
    Some(body[start..end].to_string())
}
