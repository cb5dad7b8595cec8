// src/agent.rs

//! Agent dispatch surface.
//!
//! The surrounding system selects an agent by type string and drives it
//! through a `validate`/`execute` pair. Agents form a closed set, so the
//! dispatch is a tagged union rather than open-ended trait objects: adding an
//! agent means adding a variant and the compiler walks every match. Only the
//! network scanner is a real engine today; the web agents are declared stubs
//! and answer with placeholder payloads.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::info;
use url::Url;

use crate::core::models::{AssessmentOptions, AssessmentReport};
use crate::core::scanner;
use crate::error::AssessError;

/// The closed set of agent types the system knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    WebClassifier,
    WebPentester,
    NetworkScanner,
}

/// Catalog entry describing an agent's capabilities to the caller.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AgentDescriptor {
    pub kind: AgentKind,
    pub name: &'static str,
    pub description: &'static str,
    pub engine: &'static str,
    pub target_types: &'static [&'static str],
    pub status: &'static str,
}

static AGENTS: &[AgentDescriptor] = &[
    AgentDescriptor {
        kind: AgentKind::WebClassifier,
        name: "Website Classification Agent",
        description: "Analyzes websites for phishing and malicious content",
        engine: "ai_based",
        target_types: &["url"],
        status: "development",
    },
    AgentDescriptor {
        kind: AgentKind::WebPentester,
        name: "Web Penetration Testing Agent",
        description: "Tests web applications for security vulnerabilities",
        engine: "ai_based",
        target_types: &["url"],
        status: "development",
    },
    AgentDescriptor {
        kind: AgentKind::NetworkScanner,
        name: "Network Security Scanner",
        description: "Scans network infrastructure for security issues",
        engine: "rule_based",
        target_types: &["ip", "hostname"],
        status: "active",
    },
];

/// Every agent the system exposes, with capability metadata.
pub fn available_agents() -> &'static [AgentDescriptor] {
    AGENTS
}

/// Placeholder result returned by the not-yet-implemented web agents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubReport {
    pub target: String,
    pub message: String,
    pub confidence: f64,
    pub recommendations: Vec<String>,
}

/// What an agent execution produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AgentReport {
    NetworkAssessment(Box<AssessmentReport>),
    Stub(StubReport),
}

impl AgentKind {
    /// Whether `target` is a plausible input for this agent. Web agents need
    /// a URL with scheme and host; the network scanner needs an IP literal or
    /// a resolvable hostname.
    pub async fn validate(&self, target: &str) -> bool {
        match self {
            AgentKind::WebClassifier | AgentKind::WebPentester => is_web_target(target),
            AgentKind::NetworkScanner => scanner::resolve_target(target).await.is_ok(),
        }
    }

    /// Runs this agent against `target`.
    ///
    /// The network scanner performs the full assessment; the web agents
    /// validate their target and return their declared stub payloads.
    pub async fn execute(
        &self,
        target: &str,
        options: &AssessmentOptions,
    ) -> Result<AgentReport, AssessError> {
        info!(agent = %self, target, "executing agent");
        match self {
            AgentKind::NetworkScanner => {
                let report = scanner::assess(target, options).await?;
                Ok(AgentReport::NetworkAssessment(Box::new(report)))
            }
            AgentKind::WebClassifier => {
                if !is_web_target(target) {
                    return Err(AssessError::InvalidTarget(target.to_string()));
                }
                Ok(AgentReport::Stub(StubReport {
                    target: target.to_string(),
                    message: "Web classification rules to be implemented".to_string(),
                    confidence: 0.0,
                    recommendations: vec!["Implement web classification rules".to_string()],
                }))
            }
            AgentKind::WebPentester => {
                if !is_web_target(target) {
                    return Err(AssessError::InvalidTarget(target.to_string()));
                }
                Ok(AgentReport::Stub(StubReport {
                    target: target.to_string(),
                    message: "Web penetration testing rules to be implemented".to_string(),
                    confidence: 0.0,
                    recommendations: vec![
                        "Implement web vulnerability assessment rules".to_string(),
                    ],
                }))
            }
        }
    }
}

fn is_web_target(target: &str) -> bool {
    Url::parse(target)
        .map(|url| url.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_kind_round_trips_through_its_wire_names() {
        assert_eq!(AgentKind::NetworkScanner.to_string(), "network_scanner");
        assert_eq!(AgentKind::WebClassifier.to_string(), "web_classifier");
        assert_eq!(AgentKind::WebPentester.to_string(), "web_pentester");
        assert_eq!(
            "network_scanner".parse::<AgentKind>().unwrap(),
            AgentKind::NetworkScanner
        );
        assert!("no_such_agent".parse::<AgentKind>().is_err());
    }

    #[test]
    fn catalog_lists_all_three_agents() {
        let agents = available_agents();
        assert_eq!(agents.len(), 3);
        let scanner = agents
            .iter()
            .find(|a| a.kind == AgentKind::NetworkScanner)
            .unwrap();
        assert_eq!(scanner.status, "active");
        assert_eq!(scanner.target_types, &["ip", "hostname"]);
        assert!(
            agents
                .iter()
                .filter(|a| a.kind != AgentKind::NetworkScanner)
                .all(|a| a.status == "development")
        );
    }

    #[test]
    fn web_targets_need_scheme_and_host() {
        assert!(is_web_target("https://example.com"));
        assert!(is_web_target("http://example.com/login"));
        assert!(!is_web_target("example.com"));
        assert!(!is_web_target("not a url"));
        assert!(!is_web_target(""));
    }

    #[tokio::test]
    async fn web_agents_validate_urls_not_hosts() {
        assert!(AgentKind::WebClassifier.validate("https://example.com").await);
        assert!(!AgentKind::WebClassifier.validate("10.0.0.1").await);
    }

    #[tokio::test]
    async fn web_classifier_returns_its_stub_payload() {
        let report = AgentKind::WebClassifier
            .execute("https://example.com", &AssessmentOptions::default())
            .await
            .unwrap();
        match report {
            AgentReport::Stub(stub) => {
                assert_eq!(stub.message, "Web classification rules to be implemented");
                assert_eq!(stub.confidence, 0.0);
            }
            AgentReport::NetworkAssessment(_) => panic!("expected stub"),
        }
    }

    #[tokio::test]
    async fn web_pentester_rejects_non_urls() {
        let result = AgentKind::WebPentester
            .execute("10.0.0.1", &AssessmentOptions::default())
            .await;
        assert!(matches!(result, Err(AssessError::InvalidTarget(_))));
    }
}
