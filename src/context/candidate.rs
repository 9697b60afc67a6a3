//! Candidate access-point configurations and the queue they are tried from.

use std::collections::VecDeque;
use serde::{Deserialize, Serialize};
use crate::context::handle::ServiceType;

/// Authentication scheme for a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    #[default]
    None,
    Pap,
    Chap,
    PapOrChap,
}

/// IP protocol requested when bringing up the candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpProtocol {
    #[default]
    Ipv4,
    Ipv6,
    Ipv4v6,
}

/// One set of connection parameters to try for a service type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateConfig {
    /// Unique candidate identifier.
    pub id: u32,

    /// Carrier display name.
    #[serde(default)]
    pub carrier: String,

    /// Access point name.
    pub apn: String,

    /// Service types this candidate can carry. `"*"` matches all.
    pub service_types: Vec<ServiceType>,

    #[serde(default)]
    pub proxy: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,

    /// MMS center URL, only meaningful for MMS-capable candidates.
    #[serde(default)]
    pub mmsc: Option<String>,

    #[serde(default)]
    pub user: Option<String>,

    #[serde(default, skip_serializing)]
    pub password: Option<String>,

    #[serde(default)]
    pub auth: AuthType,

    #[serde(default)]
    pub protocol: IpProtocol,
}

impl CandidateConfig {
    /// Minimal candidate with defaults for every optional field.
    pub fn new(id: u32, apn: impl Into<String>, service_types: &[&str]) -> Self {
        Self {
            id,
            carrier: String::new(),
            apn: apn.into(),
            service_types: service_types.iter().map(|s| ServiceType::from(*s)).collect(),
            proxy: None,
            port: None,
            mmsc: None,
            user: None,
            password: None,
            auth: AuthType::None,
            protocol: IpProtocol::Ipv4,
        }
    }

    /// True if this candidate lists `service_type` or the wildcard.
    /// Comparison ignores ASCII case.
    pub fn can_handle(&self, service_type: &ServiceType) -> bool {
        self.service_types.iter().any(|t| {
            t.as_str() == ServiceType::WILDCARD
                || t.as_str().eq_ignore_ascii_case(service_type.as_str())
        })
    }
}

/// Ordered candidates, consumed from the front.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CandidateQueue {
    items: VecDeque<CandidateConfig>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First candidate, without removing it.
    pub fn peek(&self) -> Option<&CandidateConfig> {
        self.items.front()
    }

    /// Remove and return the first candidate, `None` if empty.
    pub fn pop(&mut self) -> Option<CandidateConfig> {
        self.items.pop_front()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Read-only view in trial order.
    pub fn iter(&self) -> impl Iterator<Item = &CandidateConfig> {
        self.items.iter()
    }
}

impl From<Vec<CandidateConfig>> for CandidateQueue {
    fn from(list: Vec<CandidateConfig>) -> Self {
        Self { items: list.into() }
    }
}

impl FromIterator<CandidateConfig> for CandidateQueue {
    fn from_iter<I: IntoIterator<Item = CandidateConfig>>(iter: I) -> Self {
        Self { items: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_can_handle() {
        let c = CandidateConfig::new(1, "internet", &["default", "SUPL"]);
        assert!(c.can_handle(&ServiceType::from("default")));
        assert!(c.can_handle(&ServiceType::from("supl")));
        assert!(!c.can_handle(&ServiceType::from("mms")));

        let any = CandidateConfig::new(2, "wap", &["*"]);
        assert!(any.can_handle(&ServiceType::from("mms")));
        assert!(any.can_handle(&ServiceType::from("dun")));
    }

    #[test]
    fn test_queue_front_consumption() {
        let mut q: CandidateQueue = vec![
            CandidateConfig::new(1, "a", &["*"]),
            CandidateConfig::new(2, "b", &["*"]),
        ]
        .into();

        assert_eq!(q.peek().map(|c| c.id), Some(1));
        assert_eq!(q.peek().map(|c| c.id), Some(1));
        assert_eq!(q.pop().map(|c| c.id), Some(1));
        assert_eq!(q.peek().map(|c| c.id), Some(2));
        assert_eq!(q.pop().map(|c| c.id), Some(2));
        assert!(q.pop().is_none());
        assert!(q.is_empty());
    }

    #[test]
    fn test_password_not_serialized() {
        let mut c = CandidateConfig::new(7, "corp", &["default"]);
        c.user = Some("alice".into());
        c.password = Some("hunter2".into());
        let json = serde_json::to_string(&c).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("hunter2"));
    }

    #[test]
    fn test_deserialize_minimal_toml() {
        let c: CandidateConfig = toml::from_str(
            r#"
            id = 3
            apn = "mms.example"
            service_types = ["mms"]
            mmsc = "http://mms.example/servlets/mms"
            auth = "pap_or_chap"
            protocol = "ipv4v6"
            "#,
        )
        .unwrap();
        assert_eq!(c.auth, AuthType::PapOrChap);
        assert_eq!(c.protocol, IpProtocol::Ipv4v6);
        assert!(c.proxy.is_none());
        assert!(c.can_handle(&ServiceType::from("mms")));
    }
}
