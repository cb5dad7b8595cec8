// src/core/risk.rs

//! Heuristic risk weighting for a completed scan.
//!
//! The score formula is a design choice, not derived from first principles:
//! each term is independently capped before summing and the grand total is
//! capped last. Downstream consumers compare stored scores against
//! recomputed ones, so the caps and their ordering must stay exactly as
//! written.

use std::collections::BTreeMap;

use crate::core::knowledge_base::{self, HIGH_RISK_PORTS};
use crate::core::models::{MitreAnalysis, RiskLevel, ServiceRecord, VulnerabilityFinding};

/// Vulnerability text fragments that always escalate a finding to High.
const CRITICAL_VULN_MARKERS: &[&str] =
    &["default credentials", "anonymous", "cleartext", "unencrypted"];

/// Computes the aggregate risk score in `[0, 100]`.
///
/// Pure function: monotonically non-decreasing in open-port count, high-risk
/// port count, MITRE tier and vulnerability count.
///
/// # Arguments
///
/// * `open_ports` - Ports found open during the scan.
/// * `vulnerabilities` - All per-port vulnerability findings.
/// * `mitre_tier` - Overall risk tier derived by the MITRE correlator.
pub fn score(
    open_ports: &[u16],
    vulnerabilities: &[VulnerabilityFinding],
    mitre_tier: RiskLevel,
) -> u8 {
    let mut total: u32 = 0;

    // Base exposure from sheer number of open ports, capped at 30.
    total += (open_ports.len() as u32 * 5).min(30);

    // Uncapped bonus per high-risk service.
    let high_risk_count = open_ports
        .iter()
        .filter(|p| HIGH_RISK_PORTS.contains(p))
        .count() as u32;
    total += high_risk_count * 15;

    // Tier bonus from the MITRE correlation.
    total += match mitre_tier {
        RiskLevel::High => 25,
        RiskLevel::Medium => 15,
        RiskLevel::Low => 0,
    };

    // Vulnerability volume, capped at 20.
    total += (vulnerabilities.len() as u32 * 3).min(20);

    total.min(100) as u8
}

/// Severity of one vulnerability class on one port.
///
/// High-risk ports dominate; otherwise critical text markers escalate, then
/// the common remotely-reachable services rate Medium, everything else Low.
pub fn vulnerability_severity(port: u16, vulnerability: &str) -> RiskLevel {
    if HIGH_RISK_PORTS.contains(&port) {
        return RiskLevel::High;
    }

    let lowered = vulnerability.to_lowercase();
    if CRITICAL_VULN_MARKERS.iter().any(|m| lowered.contains(m)) {
        return RiskLevel::High;
    }

    if matches!(port, 22 | 80 | 443) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Expands open ports into one [`VulnerabilityFinding`] per (port,
/// vulnerability class) pair, in ascending port order.
pub fn collect_vulnerabilities(services: &BTreeMap<u16, ServiceRecord>) -> Vec<VulnerabilityFinding> {
    services
        .values()
        .flat_map(|record| {
            record
                .vulnerability_classes
                .iter()
                .map(|vuln| VulnerabilityFinding {
                    port: record.port,
                    service: record.service_name.clone(),
                    vulnerability: vuln.clone(),
                    severity: vulnerability_severity(record.port, vuln),
                })
        })
        .collect()
}

/// Human-readable findings summary for the report.
pub fn security_findings(open_ports: &[u16], mitre: &MitreAnalysis) -> Vec<String> {
    let mut findings = Vec::new();

    if open_ports.len() > 10 {
        findings.push(format!(
            "High number of open ports detected ({})",
            open_ports.len()
        ));
    }

    for &port in open_ports {
        if let Some(service) = knowledge_base::dangerous_service_name(port) {
            findings.push(format!(
                "Potentially dangerous service detected: {} on port {}",
                service, port
            ));
        }
    }

    if mitre.risk_assessment.overall_risk == RiskLevel::High {
        findings.push("High-risk MITRE ATT&CK techniques detected".to_string());
    }

    findings
}
