// src/lib.rs

//! Rule-based network security assessment engine.
//!
//! Given an endpoint (IP literal or resolvable hostname) and a port range,
//! the engine discovers open TCP services with a bounded concurrent connect
//! scan, correlates them against a static knowledge base of service
//! vulnerabilities and MITRE ATT&CK techniques, estimates the remote OS from
//! the ICMP reply TTL, and folds everything into a single [`AssessmentReport`]
//! with a 0-100 risk score and defensive recommendations.
//!
//! The engine is a library with no CLI of its own: callers invoke
//! [`assess`] (or drive an [`AgentKind`]) and own persistence, run records
//! and transport. Each assessment is self-contained and stateless beyond the
//! static rule tables.
//!
//! ```no_run
//! use bastion_rs_engine::{assess, AssessmentOptions};
//!
//! # async fn run() -> Result<(), bastion_rs_engine::AssessError> {
//! let options = AssessmentOptions {
//!     port_range: "1-1000".to_string(),
//!     ..AssessmentOptions::default()
//! };
//! let report = assess("192.0.2.10", &options).await?;
//! println!("risk score: {}", report.risk_score);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod core;
pub mod error;
pub mod logging;

pub use agent::{AgentDescriptor, AgentKind, AgentReport, StubReport, available_agents};
pub use core::models::{
    AssessmentOptions, AssessmentReport, DetectedOs, MitreAnalysis, MitreTechniqueHit,
    OsFingerprint, PartialReason, PortRange, RiskAssessment, RiskLevel, ScanStatus, ScanTarget,
    ServiceRecord, VulnerabilityFinding,
};
pub use core::scanner::{assess, assess_with_cancel, resolve_target};
pub use error::AssessError;
