// src/core/models.rs

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

/// Hard ceiling on the number of ports a single scan may probe, regardless of
/// the requested range. Keeps worst-case scan duration bounded.
pub const MAX_PORTS_PER_SCAN: usize = 1000;

// --- Core Enumerations ---

/// Ordinal risk level shared by vulnerability findings, MITRE technique hits
/// and the overall risk tier. Ordering is `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display, Default,
)]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

/// Operating-system family inferred from the ICMP reply TTL.
///
/// This classification is a best-effort heuristic: default TTL conventions
/// overlap across vendors and intermediate hops lower the observed value, so
/// a wrong family is an accepted limitation, not a defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
pub enum DetectedOs {
    #[strum(to_string = "Linux/Unix")]
    #[serde(rename = "Linux/Unix")]
    LinuxUnix,
    Windows,
    #[strum(to_string = "Network Device/Router")]
    #[serde(rename = "Network Device/Router")]
    NetworkDevice,
    #[default]
    Unknown,
}

/// Why an assessment stopped before probing its whole port range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PartialReason {
    Timeout,
    Cancelled,
}

/// Completion marker carried by every report. A `Partial` report contains
/// whatever was gathered before the interruption and must never be read as a
/// complete clean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    Complete,
    Partial(PartialReason),
}

// --- Target & Range ---

/// A validated scan target: the address actually probed plus the identifier
/// the caller originally supplied, kept for reporting. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanTarget {
    pub original: String,
    pub address: IpAddr,
}

impl ScanTarget {
    pub fn new(original: &str, address: IpAddr) -> Self {
        Self {
            original: original.to_string(),
            address,
        }
    }
}

/// Inclusive TCP port range, as parsed from a `"start-end"` option string.
///
/// An inverted range (`end < start`) is represented as-is and yields zero
/// ports when iterated; it is not a parse error. The effective upper bound is
/// silently clamped so that at most [`MAX_PORTS_PER_SCAN`] ports are probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    /// Upper bound after the per-scan clamp.
    pub fn effective_end(&self) -> u16 {
        self.end
            .min(self.start.saturating_add(MAX_PORTS_PER_SCAN as u16 - 1))
    }

    /// Ports this range will actually probe, ascending. Empty for inverted
    /// ranges.
    pub fn ports(&self) -> Box<dyn Iterator<Item = u16> + Send> {
        if self.end < self.start {
            Box::new(std::iter::empty())
        } else {
            Box::new(self.start..=self.effective_end())
        }
    }

    /// Number of ports [`ports`](Self::ports) will yield.
    pub fn count(&self) -> usize {
        if self.end < self.start {
            0
        } else {
            (self.effective_end() - self.start) as usize + 1
        }
    }
}

// --- Service & Vulnerability Models ---

/// What the knowledge base knows about the service conventionally bound to a
/// port: identity, common weakness classes, associated MITRE technique IDs
/// and baseline remediation steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub port: u16,
    pub service_name: String,
    pub vulnerability_classes: Vec<String>,
    pub technique_ids: Vec<String>,
    pub recommendations: Vec<String>,
}

/// One finding per (open port, vulnerability class) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityFinding {
    pub port: u16,
    pub service: String,
    pub vulnerability: String,
    pub severity: RiskLevel,
}

// --- MITRE Correlation Models ---

/// A detected MITRE ATT&CK technique with its supporting evidence. At most
/// one hit per technique ID is emitted per scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MitreTechniqueHit {
    pub technique_id: String,
    pub technique_name: String,
    pub evidence: String,
    pub risk_level: RiskLevel,
}

/// Worst-case technique risk plus per-level counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiskAssessment {
    pub overall_risk: RiskLevel,
    pub high_risk_techniques: usize,
    pub medium_risk_techniques: usize,
    pub total_techniques: usize,
}

/// Aggregate output of the MITRE correlator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MitreAnalysis {
    pub techniques_detected: Vec<MitreTechniqueHit>,
    pub risk_assessment: RiskAssessment,
    pub defensive_recommendations: Vec<String>,
}

// --- OS Fingerprint Model ---

/// Result of the TTL-based OS estimate. On any probe failure the fingerprint
/// degrades to `Unknown` with zero confidence and the failure reason kept for
/// observability; it never aborts the assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OsFingerprint {
    pub detected_os: DetectedOs,
    pub confidence: f64,
    pub method: String,
    pub ttl: Option<u8>,
    pub error: Option<String>,
}

impl OsFingerprint {
    /// Fingerprint for a probe that produced no usable TTL.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            error: Some(reason.into()),
            ..Self::default()
        }
    }
}

impl Default for OsFingerprint {
    fn default() -> Self {
        Self {
            detected_os: DetectedOs::Unknown,
            confidence: 0.0,
            method: "TTL Analysis".to_string(),
            ttl: None,
            error: None,
        }
    }
}

// --- Assessment Options ---

/// Caller-tunable knobs for a single assessment. The defaults mirror the
/// engine's documented behavior: 1s per-port connect timeout, 10s ICMP
/// ceiling, 100 concurrent probes, port range `"1-1000"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentOptions {
    pub port_range: String,
    pub probe_timeout: Duration,
    pub ping_timeout: Duration,
    pub concurrency: usize,
    /// Overall assessment deadline. `None` derives one from the range size,
    /// probe timeout and concurrency.
    pub overall_timeout: Option<Duration>,
}

impl Default for AssessmentOptions {
    fn default() -> Self {
        Self {
            port_range: "1-1000".to_string(),
            probe_timeout: Duration::from_secs(1),
            ping_timeout: Duration::from_secs(10),
            concurrency: 100,
            overall_timeout: None,
        }
    }
}

// --- Assessment Report ---

/// The terminal aggregate of one assessment run. Built once at the end of the
/// pipeline and never mutated afterwards; `risk_score` is a pure function of
/// the other fields and can be recomputed from a stored report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentReport {
    /// Identifier the caller supplied (hostname or IP literal).
    pub target: String,
    /// Address the probes were actually sent to.
    pub resolved_ip: IpAddr,
    pub scan_type: String,
    /// Open ports in ascending order.
    pub open_ports: Vec<u16>,
    /// One record per open port, keyed by port.
    pub services: BTreeMap<u16, ServiceRecord>,
    pub vulnerabilities: Vec<VulnerabilityFinding>,
    pub mitre_analysis: MitreAnalysis,
    pub os_detection: OsFingerprint,
    pub security_findings: Vec<String>,
    /// Aggregate risk in `[0, 100]`.
    pub risk_score: u8,
    /// Engine confidence in its methodology, not a per-finding confidence.
    /// 0.9 for complete scans, scaled by probe completeness for partial ones.
    pub confidence: f64,
    pub recommendations: Vec<String>,
    pub status: ScanStatus,
    pub ports_probed: usize,
    pub ports_requested: usize,
    pub agent_version: String,
    pub scan_methodology: String,
    pub timestamp: DateTime<Utc>,
}

impl AssessmentReport {
    /// Serializes the report as the raw JSON payload callers store alongside
    /// their per-finding result rows.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
