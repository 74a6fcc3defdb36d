//! Request forwarding.
//!
//! A request is forwarded when its path starts with a route prefix.
//! The upstream URL is the route target followed by the original path
//! and query, unchanged. Method, headers and body are passed through,
//! and the upstream status, headers and body are returned as-is.
//! Hop-by-hop headers are dropped in both directions.

use axum::body::{Body, Bytes};
use axum::extract::{FromRequest, Request};
use axum::http::header::{self, HeaderMap, HeaderName};
use axum::response::Response;
use url::Url;

use crate::config::{ConfigError, ProxyRoute};
use crate::errors::ProxyError;

/// Headers that describe a single connection and must not be forwarded.
static HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

/// A validated forwarding rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    prefix: String,
    target: Url,
}

impl Route {
    /// Validate a configured rule.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRoute`] if the prefix does not start
    /// with `/`, or the target is not an `http`/`https` URL with a host.
    pub fn new(route: &ProxyRoute) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidRoute {
            prefix: route.prefix.clone(),
            reason,
        };

        if !route.prefix.starts_with('/') {
            return Err(invalid("prefix must start with '/'".into()));
        }
        let target = Url::parse(&route.target)
            .map_err(|e| invalid(format!("target {:?}: {e}", route.target)))?;
        if !matches!(target.scheme(), "http" | "https") || target.host().is_none() {
            return Err(invalid(format!(
                "target {:?} is not an http(s) URL",
                route.target
            )));
        }

        Ok(Self {
            prefix: route.prefix.clone(),
            target,
        })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub const fn target(&self) -> &Url {
        &self.target
    }

    /// Whether a request for `path` is forwarded by this rule.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Upstream URL for a request with the given path and query.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidUpstream`] if the joined string is not
    /// a valid URL.
    pub fn upstream_url(&self, path_and_query: &str) -> Result<Url, ProxyError> {
        let base = self.target.as_str().trim_end_matches('/');
        let joined = format!("{base}{path_and_query}");
        Url::parse(&joined).map_err(|source| ProxyError::InvalidUpstream {
            url: joined,
            source,
        })
    }
}

/// Forwarding rules in match order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Validate every configured rule.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError::InvalidRoute`].
    pub fn new(routes: &[ProxyRoute]) -> Result<Self, ConfigError> {
        let routes = routes.iter().map(Route::new).collect::<Result<_, _>>()?;
        Ok(Self { routes })
    }

    /// First rule matching `path`.
    #[must_use]
    pub fn find(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }
}

/// Drop the fixed hop-by-hop headers and any header the `Connection`
/// header names.
fn strip_hop_by_hop(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::try_from(name.trim()).ok())
        .collect();

    for name in listed.iter().chain(&HOP_BY_HOP) {
        headers.remove(name);
    }
}

/// Forward `request` through `route` and relay the upstream response.
///
/// The request body is read fully before sending, up to the router's
/// `DefaultBodyLimit`; the response body is streamed back. `client`
/// must not follow redirects, so the browser sees them unchanged.
///
/// # Errors
///
/// Returns [`ProxyError::Body`] if the request body cannot be read or
/// exceeds the limit, and [`ProxyError::Upstream`] if the backend
/// cannot be reached.
#[tracing::instrument(skip_all, fields(method = %request.method(), uri = %request.uri(), prefix = %route.prefix))]
pub async fn forward(
    client: &reqwest::Client,
    route: &Route,
    request: Request,
) -> Result<Response, ProxyError> {
    let method = request.method().clone();
    let path_and_query = request
        .uri()
        .path_and_query()
        .map_or("/", axum::http::uri::PathAndQuery::as_str);
    let url = route.upstream_url(path_and_query)?;

    let mut headers = request.headers().clone();
    strip_hop_by_hop(&mut headers);
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);

    let body = Bytes::from_request(request, &()).await?;

    tracing::debug!(upstream = %url, bytes = body.len(), "forwarding request");

    let upstream = client
        .request(method, url.clone())
        .headers(headers)
        .body(body)
        .send()
        .await
        .map_err(|source| ProxyError::Upstream {
            url: url.to_string(),
            source,
        })?;

    let status = upstream.status();
    let mut response_headers = upstream.headers().clone();
    strip_hop_by_hop(&mut response_headers);

    tracing::debug!(upstream = %url, status = %status, "upstream responded");

    let mut response = Response::new(Body::from_stream(upstream.bytes_stream()));
    *response.status_mut() = status;
    *response.headers_mut() = response_headers;
    Ok(response)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn export_route() -> Route {
        Route::new(&ProxyRoute::new("/api/anki-export", "http://localhost:9000")).unwrap()
    }

    #[test]
    fn matches_export_path_by_prefix() {
        let route = export_route();
        assert!(route.matches("/api/anki-export"));
        assert!(route.matches("/api/anki-export/"));
        assert!(route.matches("/api/anki-export/deck.apkg"));
    }

    #[test]
    fn leaves_unrelated_paths_alone() {
        let route = export_route();
        assert!(!route.matches("/"));
        assert!(!route.matches("/api"));
        assert!(!route.matches("/api/other"));
        assert!(!route.matches("/index.html"));
        assert!(!route.matches("/API/anki-export"));
    }

    #[test]
    fn upstream_url_keeps_path_and_query() {
        let route = export_route();
        let url = route
            .upstream_url("/api/anki-export?file=My+Deck.apkg&format=xlsx")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:9000/api/anki-export?file=My+Deck.apkg&format=xlsx"
        );
    }

    #[test]
    fn upstream_url_prepends_target_path() {
        let route = Route::new(&ProxyRoute::new("/api", "http://backend:9000/v1/")).unwrap();
        let url = route.upstream_url("/api/anki-export").unwrap();
        assert_eq!(url.as_str(), "http://backend:9000/v1/api/anki-export");
    }

    #[test]
    fn first_matching_route_wins() {
        let table = RouteTable::new(&[
            ProxyRoute::new("/api/anki-export", "http://localhost:9000"),
            ProxyRoute::new("/api", "http://localhost:9100"),
        ])
        .unwrap();

        assert_eq!(table.len(), 2);
        let export = table.find("/api/anki-export").unwrap();
        assert_eq!(export.target().port(), Some(9000));
        let other = table.find("/api/other").unwrap();
        assert_eq!(other.target().port(), Some(9100));
        assert!(table.find("/assets/app.wasm").is_none());
    }

    #[test]
    fn rejects_bad_routes() {
        for (prefix, target) in [
            ("api", "http://localhost:9000"),
            ("/api", "localhost:9000"),
            ("/api", "file:///tmp/socket"),
            ("/api", "not a url"),
        ] {
            let err = Route::new(&ProxyRoute::new(prefix, target)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidRoute { .. }), "{prefix} {target}");
        }
    }

    #[test]
    fn strips_hop_by_hop_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "keep-alive".parse().unwrap());
        headers.insert(header::TRANSFER_ENCODING, "chunked".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "text/plain".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert_eq!(headers.len(), 1);
        assert!(headers.contains_key(header::CONTENT_TYPE));
    }

    #[test]
    fn strips_headers_named_by_connection() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONNECTION, "close, X-Debug-Hop".parse().unwrap());
        headers.insert("x-debug-hop", "1".parse().unwrap());
        headers.insert("x-request-id", "abc".parse().unwrap());

        strip_hop_by_hop(&mut headers);

        assert!(!headers.contains_key(header::CONNECTION));
        assert!(!headers.contains_key("x-debug-hop"));
        assert_eq!(headers.get("x-request-id").unwrap(), "abc");
    }
}
