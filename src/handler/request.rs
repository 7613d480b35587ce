//! Per-request values extracted at dispatch time.

use axum::http::{header, request::Parts, Method};

use crate::codec::CONTENT_TYPE;

/// Immutable view of an incoming stream request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamRequest {
    pub method: Method,
    /// Path relative to the mount point, `None` if outside of it.
    pub path: Option<String>,
    pub content_type: Option<String>,
}

impl StreamRequest {
    pub fn from_parts(parts: &Parts, mount_path: &str) -> Self {
        let content_type = parts
            .headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Self {
            method: parts.method.clone(),
            path: relative_path(parts.uri.path(), mount_path).map(str::to_string),
            content_type,
        }
    }

    /// True if the declared media type is the protocol media type.
    ///
    /// Parameters such as `charset` are ignored; the media type itself is
    /// compared case-insensitively.
    pub fn has_protocol_content_type(&self) -> bool {
        self.content_type
            .as_deref()
            .and_then(|ct| ct.split(';').next())
            .map(|media_type| media_type.trim().eq_ignore_ascii_case(CONTENT_TYPE))
            .unwrap_or(false)
    }
}

/// Strip the mount point from a request path.
///
/// Returns `None` when the path does not live under the mount point.
pub fn relative_path<'a>(path: &'a str, mount_path: &str) -> Option<&'a str> {
    let mount = mount_path.trim_end_matches('/');
    if mount.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(mount)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str, content_type: Option<&str>) -> Parts {
        let mut builder = Request::builder().method(Method::POST).uri(uri);
        if let Some(ct) = content_type {
            builder = builder.header(header::CONTENT_TYPE, ct);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_relative_path() {
        assert_eq!(relative_path("/ws/bytes", "/ws"), Some("/bytes"));
        assert_eq!(relative_path("/ws/bytes", "/ws/"), Some("/bytes"));
        assert_eq!(relative_path("/ws", "/ws"), Some(""));
        assert_eq!(relative_path("/wsx/bytes", "/ws"), None);
        assert_eq!(relative_path("/other", "/ws"), None);
        assert_eq!(relative_path("/bytes", "/"), Some("/bytes"));
        assert_eq!(relative_path("/bytes", ""), Some("/bytes"));
    }

    #[test]
    fn test_from_parts() {
        let req = StreamRequest::from_parts(&parts("/ws/echo?x=1", Some(CONTENT_TYPE)), "/ws");
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.path.as_deref(), Some("/echo"));
        assert!(req.has_protocol_content_type());
    }

    #[test]
    fn test_content_type_matching() {
        let with_params = format!("{}; charset=binary", CONTENT_TYPE);
        assert!(StreamRequest::from_parts(&parts("/ws/a", Some(&with_params)), "/ws")
            .has_protocol_content_type());
        assert!(!StreamRequest::from_parts(&parts("/ws/a", Some("text/plain")), "/ws")
            .has_protocol_content_type());
        assert!(!StreamRequest::from_parts(&parts("/ws/a", None), "/ws")
            .has_protocol_content_type());
    }

    #[test]
    fn test_content_type_is_lenient_about_case_and_parameters() {
        // Accepted even though a byte-exact comparison would reject them
        for ct in [
            "application/x-promise-stream; charset=x",
            "APPLICATION/X-Promise-Stream",
            " application/x-promise-stream ;q=1",
        ] {
            assert!(
                StreamRequest::from_parts(&parts("/ws/a", Some(ct)), "/ws").has_protocol_content_type(),
                "{}",
                ct
            );
        }
        for ct in ["application/x-promise-streams", "application/octet-stream", ""] {
            assert!(
                !StreamRequest::from_parts(&parts("/ws/a", Some(ct)), "/ws").has_protocol_content_type(),
                "{}",
                ct
            );
        }
    }
}
