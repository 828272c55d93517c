use crate::labels::LabelSet;

/// Header consulted for the `http_user_agent` label.
pub const USER_AGENT_HEADER: &str = "user-agent";

/// Edge-vendor ray header consulted for the `trace_id` label.
pub const TRACE_HEADER: &str = "cf-ray";

/// Header consulted for the `request_id` label.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Minimal view of an incoming HTTP request, enough to derive stream
/// labels from it. Implemented by whatever request type the host
/// runtime hands out; header lookup is case-insensitive by convention
/// of the implementor.
pub trait RequestLike: Send + Sync {
    fn method(&self) -> String;
    fn url(&self) -> String;
    fn header(&self, name: &str) -> Option<String>;
}

/// Derive labels from an optional request.
///
/// Produces `http_method` and `http_url` always, plus
/// `http_user_agent`, `trace_id` and `request_id` when the matching
/// headers are present. Missing headers yield absent keys, never
/// empty-string placeholders. An absent request yields an empty set.
pub fn extract(request: Option<&dyn RequestLike>) -> LabelSet {
    let mut labels = LabelSet::new();
    let req = match request {
        Some(req) => req,
        None => return labels,
    };

    labels.insert("http_method".to_string(), req.method());
    labels.insert("http_url".to_string(), req.url());

    if let Some(agent) = req.header(USER_AGENT_HEADER) {
        labels.insert("http_user_agent".to_string(), agent);
    }
    if let Some(ray) = req.header(TRACE_HEADER) {
        labels.insert("trace_id".to_string(), ray);
    }
    if let Some(id) = req.header(REQUEST_ID_HEADER) {
        labels.insert("request_id".to_string(), id);
    }

    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct FakeRequest {
        method: &'static str,
        url: &'static str,
        headers: BTreeMap<&'static str, &'static str>,
    }

    impl RequestLike for FakeRequest {
        fn method(&self) -> String {
            self.method.to_string()
        }

        fn url(&self) -> String {
            self.url.to_string()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.headers.get(name).map(|v| v.to_string())
        }
    }

    #[test]
    fn all_headers_present_yields_five_labels() {
        let req = FakeRequest {
            method: "POST",
            url: "https://app.example.com/api",
            headers: BTreeMap::from([
                (USER_AGENT_HEADER, "curl/8.0"),
                (TRACE_HEADER, "8a7f2e0c1b3d4f5a-AMS"),
                (REQUEST_ID_HEADER, "req-42"),
            ]),
        };

        let labels = extract(Some(&req));

        assert_eq!(labels.get("http_method"), Some(&"POST".to_string()));
        assert_eq!(labels.get("http_url"), Some(&"https://app.example.com/api".to_string()));
        assert_eq!(labels.get("http_user_agent"), Some(&"curl/8.0".to_string()));
        assert_eq!(labels.get("trace_id"), Some(&"8a7f2e0c1b3d4f5a-AMS".to_string()));
        assert_eq!(labels.get("request_id"), Some(&"req-42".to_string()));
    }

    #[test]
    fn missing_headers_yield_absent_keys() {
        let req = FakeRequest {
            method: "GET",
            url: "https://app.example.com/",
            headers: BTreeMap::new(),
        };

        let labels = extract(Some(&req));

        assert_eq!(labels.len(), 2);
        assert!(!labels.contains_key("http_user_agent"));
        assert!(!labels.contains_key("trace_id"));
        assert!(!labels.contains_key("request_id"));
    }

    #[test]
    fn absent_request_yields_empty_set() {
        assert!(extract(None).is_empty());
    }
}
