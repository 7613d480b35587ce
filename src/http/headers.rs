//! Response headers of the stream protocol.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue};

use crate::codec::CONTENT_TYPE;

/// Value of the `Server` header.
pub const SERVER: &str = "Promise Server/1.0";

/// File name suggested to clients saving the response body.
pub const DOWNLOAD_FILE_NAME: &str = "data.stream";

/// Advertises the media type the server accepts.
pub static ACCEPTS: HeaderName = HeaderName::from_static("accepts");

/// Headers sent on every response, accepted or not.
pub fn apply_common(headers: &mut HeaderMap) {
    headers.insert(header::SERVER, HeaderValue::from_static(SERVER));
    headers.insert(ACCEPTS.clone(), HeaderValue::from_static(CONTENT_TYPE));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Headers describing an accepted stream response body.
pub fn apply_stream(headers: &mut HeaderMap) {
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_static("attachment; filename=data.stream"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_headers() {
        let mut headers = HeaderMap::new();
        apply_common(&mut headers);
        assert_eq!(headers[header::SERVER], SERVER);
        assert_eq!(headers["accepts"], CONTENT_TYPE);
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::PRAGMA], "no-cache");
        assert_eq!(headers[header::EXPIRES], "0");
        assert!(headers.get(header::CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_stream_headers() {
        let mut headers = HeaderMap::new();
        apply_stream(&mut headers);
        assert_eq!(headers[header::CONTENT_TYPE], CONTENT_TYPE);
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            format!("attachment; filename={}", DOWNLOAD_FILE_NAME)
        );
    }
}
