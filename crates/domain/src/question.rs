use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Record types the proxy is willing to cache and the loopback responder answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::AAAA => "AAAA",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "A" => Ok(RecordType::A),
            "AAAA" => Ok(RecordType::AAAA),
            other => Err(format!("unsupported record type: {}", other)),
        }
    }
}

/// Lowercase a domain and make it fully qualified.
///
/// `"MyApp.Dev"` becomes `"myapp.dev."`; the root stays `"."`.
pub fn fqdn(name: &str) -> String {
    let mut name = name.trim().to_ascii_lowercase();
    if !name.ends_with('.') {
        name.push('.');
    }
    name
}

/// A proxyable question: class is always IN.
///
/// The name is kept in canonical form (lowercase, trailing dot) so that two
/// questions that differ only in letter case share a cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Question {
    name: Arc<str>,
    record_type: RecordType,
}

impl Question {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: Arc::from(fqdn(name)),
            record_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn record_type(&self) -> RecordType {
        self.record_type
    }

    pub fn class(&self) -> &'static str {
        "IN"
    }

    /// Name, class and type joined with tabs; the input of the cache key.
    pub fn canonical(&self) -> String {
        format!("{}\t{}\t{}", self.name, self.class(), self.record_type)
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.name, self.class(), self.record_type)
    }
}
