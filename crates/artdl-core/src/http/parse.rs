//! Parse HTTP response header lines collected by curl.

/// Headers of interest from the final response in a redirect chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub content_type: Option<String>,
}

/// Parse collected header lines. A status line (`HTTP/...`) starts a new
/// response, so only headers from the last hop of a redirect chain survive.
pub(crate) fn parse_headers(lines: &[String]) -> ResponseHead {
    let mut head = ResponseHead::default();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            head = ResponseHead::default();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            let value = value.trim();
            if name.eq_ignore_ascii_case("content-type") && !value.is_empty() {
                head.content_type = Some(value.to_string());
            }
        }
    }

    head
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_headers_content_type() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: image/png".to_string(),
            "Content-Length: 12345".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_type.as_deref(), Some("image/png"));
    }

    #[test]
    fn parse_headers_keeps_last_hop_only() {
        let lines = [
            "HTTP/1.1 302 Found".to_string(),
            "Content-Type: text/html".to_string(),
            "Location: https://cdn.example.com/a.jpg".to_string(),
            "".to_string(),
            "HTTP/1.1 200 OK".to_string(),
            "content-type: image/jpeg".to_string(),
        ];
        let r = parse_headers(&lines);
        assert_eq!(r.content_type.as_deref(), Some("image/jpeg"));
    }

    #[test]
    fn parse_headers_missing() {
        let r = parse_headers(&["HTTP/1.1 200 OK".to_string()]);
        assert_eq!(r, ResponseHead::default());
    }
}
