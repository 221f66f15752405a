// Web URL validation.
//
// A URL passes when it looks like a URL, uses http(s) (or no scheme at all),
// and its host resolves to a public address. Resolution is bounded by a
// timeout passed in per call.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Url;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::OnceLock;
use std::time::Duration;

/// Default resolution timeout.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(3);

// Gruber's "liberal, accurate" URL pattern, anchored at the start.
const URL_PATTERN: &str = r#"(?i)^\b((?:[a-z][\w-]+:(?:/{1,3}|[a-z0-9%])|www\d{0,3}[.]|[a-z0-9.\-]+[.][a-z]{2,4}/)(?:[^\s()<>]+|\(([^\s()<>]+|(\([^\s()<>]+\)))*\))+(?:\(([^\s()<>]+|(\([^\s()<>]+\)))*\)|[^\s`!()\[\]{};:'".,<>?«»“”‘’]))"#;

// A bare hostname ("example.com", "example.com:8080/"), which the pattern
// above only accepts once a path follows.
const BARE_HOST_PATTERN: &str = r"(?i)^[a-z0-9-]+(?:\.[a-z0-9-]+)*\.[a-z]{2,}(?::\d{1,5})?/?$";

fn url_regex() -> &'static Regex {
    static URL_REGEX: OnceLock<Regex> = OnceLock::new();
    URL_REGEX.get_or_init(|| Regex::new(URL_PATTERN).expect("URL pattern is valid"))
}

fn bare_host_regex() -> &'static Regex {
    static BARE_HOST_REGEX: OnceLock<Regex> = OnceLock::new();
    BARE_HOST_REGEX.get_or_init(|| Regex::new(BARE_HOST_PATTERN).expect("host pattern is valid"))
}

/// Cheap shape check, no parsing or resolution.
pub fn looks_like_url(input: &str) -> bool {
    url_regex().is_match(input) || bare_host_regex().is_match(input)
}

/// Resolves a hostname to one address.
#[async_trait]
pub trait HostResolver: Send + Sync {
    async fn resolve(&self, host: &str) -> io::Result<IpAddr>;
}

/// Options for a single validation.
#[derive(Debug, Clone, Copy)]
pub struct ValidationOptions {
    /// Reject localhost and private address space.
    pub deny_localhost: bool,
    /// How long resolution may take.
    pub timeout: Duration,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            deny_localhost: true,
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

pub struct UrlValidator<R: HostResolver> {
    resolver: R,
}

impl<R: HostResolver> UrlValidator<R> {
    pub fn new(resolver: R) -> Self {
        Self { resolver }
    }

    /// Validate with the default options.
    pub async fn is_valid(&self, url: &str) -> bool {
        self.validate(url, ValidationOptions::default()).await
    }

    /// Validates a web URL and optionally rejects local/private hosts.
    pub async fn validate(&self, url: &str, options: ValidationOptions) -> bool {
        if !looks_like_url(url) {
            tracing::debug!("URL failed to match: {}", url);
            return false;
        }

        let Some(parsed) = parse_web_url(url) else {
            tracing::debug!("URL scheme is invalid: {}", url);
            return false;
        };

        let Some(host) = parsed.host_str() else {
            tracing::debug!("URL has no host: {}", url);
            return false;
        };

        let ip = match host_ip_literal(host) {
            Some(ip) => ip,
            None => {
                if host.eq_ignore_ascii_case("localhost") && options.deny_localhost {
                    tracing::debug!("URL is localhost: {}", url);
                    return false;
                }

                match tokio::time::timeout(options.timeout, self.resolver.resolve(host)).await {
                    Ok(Ok(ip)) => ip,
                    Ok(Err(err)) => {
                        tracing::debug!("Failed to resolve URL {}: {}", url, err);
                        return false;
                    }
                    Err(_) => {
                        tracing::debug!("Timed out resolving URL: {}", url);
                        return false;
                    }
                }
            }
        };

        if options.deny_localhost && is_private_address(ip) {
            tracing::debug!("URL resolves to a private address space: {}", url);
            return false;
        }

        tracing::debug!("URL successfully validated: {}", url);
        true
    }
}

/// Parses `input` as an http(s) URL. Inputs without a scheme are read as
/// `http://` URLs, any other scheme is refused.
pub fn parse_web_url(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(parsed),
        // `example.com:8080` parses with scheme `example.com`.
        Ok(_) if is_host_and_port(input) => Url::parse(&format!("http://{}", input)).ok(),
        Ok(_) => None,
        // No scheme at all.
        Err(_) => Url::parse(&format!("http://{}", input)).ok(),
    }
}

// `host:port` with an optional path, as opposed to `scheme:anything`.
fn is_host_and_port(input: &str) -> bool {
    let Some((_, rest)) = input.split_once(':') else {
        return false;
    };
    let port = rest.split_once('/').map_or(rest, |(port, _)| port);
    !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit())
}

// IPv6 hosts come back bracketed from `host_str`.
fn host_ip_literal(host: &str) -> Option<IpAddr> {
    host.trim_start_matches('[')
        .trim_end_matches(']')
        .parse()
        .ok()
}

/// Loopback, private, link-local, shared (CGNAT), documentation and reserved
/// ranges.
pub fn is_private_address(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_private_v4(v4),
        IpAddr::V6(v6) => is_private_v6(v6),
    }
}

fn is_private_v4(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    ip.is_private()
        || ip.is_loopback()
        || ip.is_link_local()
        || ip.is_unspecified()
        || ip.is_broadcast()
        || ip.is_documentation()
        || a == 0
        || (a == 100 && (b & 0xc0) == 64)
        || (a == 192 && b == 0 && c == 0)
        || (a == 198 && (b & 0xfe) == 18)
        || a >= 240
}

fn is_private_v6(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return is_private_v4(v4);
    }
    let first = ip.segments()[0];
    ip.is_loopback()
        || ip.is_unspecified()
        // fc00::/7 unique local
        || (first & 0xfe00) == 0xfc00
        // fe80::/10 link local
        || (first & 0xffc0) == 0xfe80
        // 2001:db8::/32 documentation
        || (first == 0x2001 && ip.segments()[1] == 0x0db8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Resolver backed by a fixed table, counting lookups.
    struct MockResolver {
        hosts: HashMap<String, IpAddr>,
        lookups: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    impl MockResolver {
        fn new(hosts: &[(&str, IpAddr)]) -> Self {
            Self {
                hosts: hosts
                    .iter()
                    .map(|(h, ip)| (h.to_string(), *ip))
                    .collect(),
                lookups: Arc::new(AtomicUsize::new(0)),
                delay: None,
            }
        }
    }

    #[async_trait]
    impl HostResolver for MockResolver {
        async fn resolve(&self, host: &str) -> io::Result<IpAddr> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.hosts
                .get(host)
                .copied()
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such host"))
        }
    }

    fn public() -> IpAddr {
        "93.184.216.34".parse().unwrap()
    }

    fn private() -> IpAddr {
        "192.168.1.20".parse().unwrap()
    }

    #[tokio::test]
    async fn test_public_https_url_is_valid() {
        let validator = UrlValidator::new(MockResolver::new(&[("example.com", public())]));
        assert!(validator.is_valid("https://example.com/page").await);
    }

    #[tokio::test]
    async fn test_localhost_denied_by_default() {
        let resolver = MockResolver::new(&[("localhost", "127.0.0.1".parse().unwrap())]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(!validator.is_valid("http://localhost").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_localhost_allowed_when_not_denied() {
        let validator =
            UrlValidator::new(MockResolver::new(&[("localhost", "127.0.0.1".parse().unwrap())]));
        let options = ValidationOptions {
            deny_localhost: false,
            ..Default::default()
        };
        assert!(validator.validate("http://localhost:8080/", options).await);
    }

    #[tokio::test]
    async fn test_schemeless_url_is_read_as_http() {
        let resolver = MockResolver::new(&[("example.com", public())]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(validator.is_valid("example.com").await);
        assert!(validator.is_valid("example.com/about").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 2);

        let parsed = parse_web_url("example.com").unwrap();
        assert_eq!(parsed.scheme(), "http");
        assert_eq!(parsed.host_str(), Some("example.com"));

        let with_port = parse_web_url("example.com:8080").unwrap();
        assert_eq!(with_port.host_str(), Some("example.com"));
        assert_eq!(with_port.port(), Some(8080));
    }

    #[tokio::test]
    async fn test_unsupported_scheme_rejected() {
        let resolver = MockResolver::new(&[("x.com", public())]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(!validator.is_valid("ftp://x.com").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_scheme_without_slashes_rejected() {
        let resolver = MockResolver::new(&[("example.com", public())]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(!validator.is_valid("mailto:admin@example.com").await);
        assert!(!validator.is_valid("skype:bob@example.com").await);
        assert!(!validator.is_valid("user:pass@example.com").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 0);

        assert!(parse_web_url("mailto:admin@example.com").is_none());
        assert!(parse_web_url("user:pass@example.com").is_none());
    }

    #[test]
    fn test_host_and_port_detection() {
        assert!(is_host_and_port("example.com:8080"));
        assert!(is_host_and_port("example.com:8080/about"));
        assert!(!is_host_and_port("example.com"));
        assert!(!is_host_and_port("mailto:admin@example.com"));
        assert!(!is_host_and_port("user:pass@example.com"));
        assert!(!is_host_and_port("example.com:/path"));
    }

    #[tokio::test]
    async fn test_malformed_string_never_resolves() {
        let resolver = MockResolver::new(&[]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(!validator.is_valid("not a url at all").await);
        assert!(!validator.is_valid("").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unresolvable_host_rejected() {
        let validator = UrlValidator::new(MockResolver::new(&[]));
        assert!(!validator.is_valid("https://does-not-exist.example").await);
    }

    #[tokio::test]
    async fn test_private_resolution_rejected() {
        let validator = UrlValidator::new(MockResolver::new(&[("intranet.corp.com", private())]));
        assert!(!validator.is_valid("http://intranet.corp.com/").await);

        let options = ValidationOptions {
            deny_localhost: false,
            ..Default::default()
        };
        assert!(validator.validate("http://intranet.corp.com/", options).await);
    }

    #[tokio::test]
    async fn test_ip_literal_skips_resolver() {
        let resolver = MockResolver::new(&[]);
        let lookups = Arc::clone(&resolver.lookups);
        let validator = UrlValidator::new(resolver);

        assert!(validator.is_valid("http://93.184.216.34/").await);
        assert!(!validator.is_valid("http://10.0.0.1/").await);
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_resolution_times_out() {
        let mut resolver = MockResolver::new(&[("slow.example.com", public())]);
        resolver.delay = Some(Duration::from_secs(10));
        let validator = UrlValidator::new(resolver);

        let options = ValidationOptions {
            deny_localhost: true,
            timeout: Duration::from_secs(1),
        };
        assert!(!validator.validate("https://slow.example.com", options).await);
    }

    #[test]
    fn test_url_shapes() {
        assert!(looks_like_url("https://example.com"));
        assert!(looks_like_url("www.example.com"));
        assert!(looks_like_url("example.com"));
        assert!(looks_like_url("example.com:8080/"));
        assert!(!looks_like_url("hello there"));
        assert!(!looks_like_url("example"));
        assert!(!looks_like_url(" https://example.com"));
    }

    #[test]
    fn test_private_ranges() {
        for ip in [
            "127.0.0.1",
            "10.1.2.3",
            "172.16.0.1",
            "192.168.0.1",
            "169.254.1.1",
            "100.64.0.1",
            "100.127.255.254",
            "0.0.0.0",
            "::1",
            "fd00::1",
            "fe80::1",
            "::ffff:192.168.0.1",
        ] {
            assert!(is_private_address(ip.parse().unwrap()), "{ip} should be private");
        }
        for ip in ["8.8.8.8", "93.184.216.34", "100.128.0.1", "2606:4700::1111"] {
            assert!(!is_private_address(ip.parse().unwrap()), "{ip} should be public");
        }
    }
}
