use std::fmt;

#[derive(Debug)]
pub enum FlightError {
    Timeout,
    ConnectionFailed(String),
    DnsResolution(String),
    ProxyError(String),
    RateLimited,
    Blocked(u16),
    HttpStatus(u16),
    TlsError(String),
    Decode(String),
    Schema(String),
    InvalidAirport(String),
    InvalidDate(String),
    Validation(String),
    Context {
        operation: String,
        source: Box<FlightError>,
    },
}

impl FlightError {
    /// Wraps the error with the operation that was running when it happened.
    pub fn during(self, operation: impl Into<String>) -> Self {
        Self::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, looking through any context wrappers.
    pub fn root(&self) -> &FlightError {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout
            | Self::ConnectionFailed(_)
            | Self::DnsResolution(_)
            | Self::ProxyError(_)
            | Self::RateLimited
            | Self::Blocked(_)
            | Self::HttpStatus(_)
            | Self::TlsError(_) => "transport",
            Self::Decode(_) => "decode",
            Self::Schema(_) => "schema",
            Self::InvalidAirport(_) | Self::InvalidDate(_) | Self::Validation(_) => "input",
            Self::Context { source, .. } => source.kind(),
        }
    }
}

impl fmt::Display for FlightError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(
                f,
                "request timed out, the fare service may be slow or unreachable. \
                 Try increasing --timeout or check your connection"
            ),
            Self::ConnectionFailed(detail) => write!(
                f,
                "connection failed, check your internet connection ({detail})"
            ),
            Self::DnsResolution(host) => write!(
                f,
                "DNS resolution failed for {host}, check your internet connection"
            ),
            Self::ProxyError(detail) => write!(
                f,
                "proxy error, check your --proxy URL is correct ({detail})"
            ),
            Self::RateLimited => write!(
                f,
                "rate limited by the fare service (HTTP 429), wait a few minutes before retrying"
            ),
            Self::Blocked(status) => write!(
                f,
                "request blocked by the fare service (HTTP {status}), \
                 this usually means bot detection. Try again later or use --proxy"
            ),
            Self::HttpStatus(status) => write!(f, "unexpected HTTP status {status}"),
            Self::TlsError(detail) => write!(f, "TLS/SSL error ({detail})"),
            Self::Decode(detail) => write!(f, "response is not valid JSON: {detail}"),
            Self::Schema(detail) => write!(
                f,
                "unexpected response shape: {detail}. The upstream format may have changed"
            ),
            Self::InvalidAirport(code) => write!(
                f,
                "invalid airport code \"{code}\", must be exactly 3 letters (e.g. POZ, ATH, STN)"
            ),
            Self::InvalidDate(date) => write!(
                f,
                "invalid date \"{date}\", must be YYYY-MM-DD format (e.g. 2020-06-25)"
            ),
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::Context { operation, source } => write!(f, "{operation}: {source}"),
        }
    }
}

impl std::error::Error for FlightError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

pub fn from_http_error(err: wreq::Error) -> FlightError {
    let msg = err.to_string();
    let lower = msg.to_lowercase();

    if err.is_timeout() {
        return FlightError::Timeout;
    }

    if err.is_connect() {
        if lower.contains("dns") || lower.contains("resolve") || lower.contains("getaddrinfo") {
            return FlightError::DnsResolution(msg);
        }
        return FlightError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return FlightError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return FlightError::TlsError(msg);
    }

    FlightError::ConnectionFailed(msg)
}

/// Splits serde_json failures into malformed text and well-formed text of the wrong shape.
pub fn from_json_error(err: serde_json::Error) -> FlightError {
    use serde_json::error::Category;

    match err.classify() {
        Category::Data => FlightError::Schema(err.to_string()),
        Category::Syntax | Category::Eof | Category::Io => FlightError::Decode(err.to_string()),
    }
}
