use crate::utils::error::{EtlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// One kept row of the tier 1 mirror table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorRecord {
    pub domain: String,
    pub country: String,
    pub tier: String,
    pub supports_file_sync: bool,
    pub protocols: BTreeSet<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Http,
    Https,
    Rsync,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Http, Protocol::Https, Protocol::Rsync];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
            Protocol::Rsync => "rsync",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "http" => Ok(Protocol::Http),
            "https" => Ok(Protocol::Https),
            "rsync" => Ok(Protocol::Rsync),
            other => Err(other.to_string()),
        }
    }
}

/// A mirror URL from the status feed. Fields other than `url` and
/// `protocol` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub url: String,
    pub protocol: Protocol,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl StatusEntry {
    /// Builds an entry from one element of the feed's `urls` array.
    pub fn from_value(index: usize, value: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(mut details) = value else {
            return Err(EtlError::StatusFeedError {
                message: format!("urls[{}] is not an object", index),
            });
        };

        let url = match details.remove("url") {
            Some(serde_json::Value::String(url)) => url,
            _ => {
                return Err(EtlError::StatusFeedError {
                    message: format!("urls[{}] has no string 'url'", index),
                })
            }
        };

        let protocol = match details.remove("protocol") {
            Some(serde_json::Value::String(protocol)) => protocol,
            _ => {
                return Err(EtlError::StatusFeedError {
                    message: format!("urls[{}] ({}) has no string 'protocol'", index, url),
                })
            }
        };

        let protocol = protocol
            .parse::<Protocol>()
            .map_err(|protocol| EtlError::UnknownProtocolError {
                url: url.clone(),
                protocol,
            })?;

        Ok(Self {
            url,
            protocol,
            details,
        })
    }
}

/// Tier 1 status entries bucketed by protocol. Only the correlator appends;
/// everyone else gets slices.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TierOneIndex {
    http: Vec<StatusEntry>,
    https: Vec<StatusEntry>,
    rsync: Vec<StatusEntry>,
}

impl TierOneIndex {
    pub fn bucket(&self, protocol: Protocol) -> &[StatusEntry] {
        match protocol {
            Protocol::Http => &self.http,
            Protocol::Https => &self.https,
            Protocol::Rsync => &self.rsync,
        }
    }

    pub fn len(&self) -> usize {
        self.http.len() + self.https.len() + self.rsync.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub(crate) fn push(&mut self, entry: StatusEntry) {
        match entry.protocol {
            Protocol::Http => self.http.push(entry),
            Protocol::Https => self.https.push(entry),
            Protocol::Rsync => self.rsync.push(entry),
        }
    }
}

/// How a tier 1 domain is matched against a status feed URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The URL's host equals the domain, ignoring case.
    #[default]
    Host,
    /// The domain appears anywhere in the URL, ignoring case. A short domain
    /// can match an unrelated longer URL.
    Substring,
}

/// Output of the extract stage.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub mirrors: Vec<MirrorRecord>,
    pub status_feed: String,
}
