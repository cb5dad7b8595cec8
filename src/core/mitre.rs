// src/core/mitre.rs

//! MITRE ATT&CK correlation rules for network reconnaissance findings.
//!
//! The technique catalog and the per-technique defensive recommendations are
//! static rule tables; `correlate` is a pure function from an open-port set to
//! detected techniques, a derived risk tier and accumulated defenses. No rule
//! is mutually exclusive with another: every triggered condition fires.

use tracing::debug;

use crate::core::models::{MitreAnalysis, MitreTechniqueHit, RiskAssessment, RiskLevel};

/// Catalog entry describing an ATT&CK technique relevant to network
/// reconnaissance.
pub struct TechniqueInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub tactics: &'static [&'static str],
    pub detection: &'static str,
}

/// ATT&CK techniques this engine knows about. Only a subset is wired to
/// correlation rules; the rest are referenced by the service knowledge base.
static TECHNIQUES: &[TechniqueInfo] = &[
    TechniqueInfo {
        id: "T1046",
        name: "Network Service Scanning",
        description: "Adversaries may attempt to get a listing of services running on remote hosts",
        tactics: &["Discovery"],
        detection: "Monitor for port scanning activities",
    },
    TechniqueInfo {
        id: "T1040",
        name: "Network Sniffing",
        description: "Adversaries may sniff network traffic to capture information",
        tactics: &["Discovery", "Credential Access"],
        detection: "Monitor for promiscuous mode on network interfaces",
    },
    TechniqueInfo {
        id: "T1018",
        name: "Remote System Discovery",
        description: "Adversaries may attempt to get a listing of other systems",
        tactics: &["Discovery"],
        detection: "Monitor for network discovery commands",
    },
    TechniqueInfo {
        id: "T1082",
        name: "System Information Discovery",
        description: "Adversaries may attempt to get detailed information about the OS and hardware",
        tactics: &["Discovery"],
        detection: "Monitor for system information gathering commands",
    },
    TechniqueInfo {
        id: "T1021.001",
        name: "Remote Desktop Protocol",
        description: "Adversaries may use Valid Accounts to log into a computer using RDP",
        tactics: &["Lateral Movement"],
        detection: "Monitor RDP logon events",
    },
    TechniqueInfo {
        id: "T1021.004",
        name: "SSH",
        description: "Adversaries may use Valid Accounts to log into remote machines using SSH",
        tactics: &["Lateral Movement"],
        detection: "Monitor SSH connection attempts",
    },
    TechniqueInfo {
        id: "T1190",
        name: "Exploit Public-Facing Application",
        description: "Adversaries may attempt to take advantage of a weakness in an Internet-facing computer",
        tactics: &["Initial Access"],
        detection: "Monitor for suspicious web requests",
    },
];

/// Ports that indicate a public-facing web application.
const WEB_PORTS: &[u16] = &[80, 443, 8080, 8443];

/// Full catalog detail for a technique ID, if cataloged.
pub fn technique_info(id: &str) -> Option<&'static TechniqueInfo> {
    TECHNIQUES.iter().find(|t| t.id == id)
}

/// Correlates an open-port set against the ATT&CK rule table.
///
/// All matching rules fire independently; each technique ID appears at most
/// once per scan. The result depends only on set membership, not on the order
/// ports are supplied in.
///
/// # Arguments
///
/// * `open_ports` - Ports found open during the scan, ascending.
///
/// # Returns
///
/// A [`MitreAnalysis`] with the detected techniques, the derived risk tier
/// and the accumulated defensive recommendations.
pub fn correlate(open_ports: &[u16]) -> MitreAnalysis {
    let mut hits = Vec::new();

    // T1046 - the scan itself demonstrates service enumeration exposure.
    if !open_ports.is_empty() {
        let mut ports = open_ports.to_vec();
        ports.sort_unstable();
        hits.push(hit(
            "T1046",
            format!("Detected {} open ports on target: {:?}", ports.len(), ports),
            RiskLevel::Medium,
        ));
    }

    // T1021.001 - RDP exposure.
    if open_ports.contains(&3389) {
        hits.push(hit(
            "T1021.001",
            "RDP service detected on port 3389".to_string(),
            RiskLevel::High,
        ));
    }

    // T1021.004 - SSH exposure.
    if open_ports.contains(&22) {
        hits.push(hit(
            "T1021.004",
            "SSH service detected on port 22".to_string(),
            RiskLevel::Medium,
        ));
    }

    // T1190 - public-facing web applications.
    let mut detected_web: Vec<u16> = open_ports
        .iter()
        .copied()
        .filter(|p| WEB_PORTS.contains(p))
        .collect();
    detected_web.sort_unstable();
    detected_web.dedup();
    if !detected_web.is_empty() {
        hits.push(hit(
            "T1190",
            format!("Web services detected on ports: {:?}", detected_web),
            RiskLevel::High,
        ));
    }

    let risk_assessment = assess_risk(&hits);
    let defensive_recommendations = defensive_recommendations(&hits);

    debug!(
        techniques = hits.len(),
        tier = %risk_assessment.overall_risk,
        "MITRE correlation complete"
    );

    MitreAnalysis {
        techniques_detected: hits,
        risk_assessment,
        defensive_recommendations,
    }
}

fn hit(id: &str, evidence: String, risk_level: RiskLevel) -> MitreTechniqueHit {
    // The catalog is authoritative for names; rules only reference cataloged IDs.
    let name = technique_info(id).map(|t| t.name).unwrap_or(id);
    MitreTechniqueHit {
        technique_id: id.to_string(),
        technique_name: name.to_string(),
        evidence,
        risk_level,
    }
}

/// Worst-case tier across hits: High beats Medium beats Low.
fn assess_risk(hits: &[MitreTechniqueHit]) -> RiskAssessment {
    let high = hits
        .iter()
        .filter(|h| h.risk_level == RiskLevel::High)
        .count();
    let medium = hits
        .iter()
        .filter(|h| h.risk_level == RiskLevel::Medium)
        .count();

    let overall_risk = if high > 0 {
        RiskLevel::High
    } else if medium > 0 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    };

    RiskAssessment {
        overall_risk,
        high_risk_techniques: high,
        medium_risk_techniques: medium,
        total_techniques: hits.len(),
    }
}

/// Accumulates the per-technique defense blocks in fixed order. Blocks map to
/// disjoint technique IDs, so no cross-block deduplication is needed.
fn defensive_recommendations(hits: &[MitreTechniqueHit]) -> Vec<String> {
    let detected = |id: &str| hits.iter().any(|h| h.technique_id == id);
    let mut recommendations: Vec<String> = Vec::new();

    if detected("T1046") {
        recommendations.extend(
            [
                "Implement network segmentation to limit scanning scope",
                "Deploy intrusion detection systems to monitor for port scans",
                "Use firewalls to restrict unnecessary port access",
            ]
            .map(String::from),
        );
    }

    if detected("T1021.001") {
        recommendations.extend(
            [
                "Disable RDP if not required, or restrict access via VPN",
                "Enable Network Level Authentication for RDP",
                "Monitor RDP connections and failed authentication attempts",
                "Implement multi-factor authentication for RDP access",
            ]
            .map(String::from),
        );
    }

    if detected("T1021.004") {
        recommendations.extend(
            [
                "Use key-based authentication instead of passwords",
                "Disable root login and use sudo for administrative access",
                "Monitor SSH connections and implement fail2ban",
                "Regular SSH configuration audits",
            ]
            .map(String::from),
        );
    }

    if detected("T1190") {
        recommendations.extend(
            [
                "Regular web application security testing",
                "Implement Web Application Firewall (WAF)",
                "Keep web applications and frameworks updated",
                "Use HTTPS with proper TLS configuration",
            ]
            .map(String::from),
        );
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(analysis: &MitreAnalysis) -> Vec<&str> {
        analysis
            .techniques_detected
            .iter()
            .map(|h| h.technique_id.as_str())
            .collect()
    }

    #[test]
    fn empty_port_set_yields_no_techniques_and_low_tier() {
        let analysis = correlate(&[]);
        assert!(analysis.techniques_detected.is_empty());
        assert_eq!(analysis.risk_assessment.overall_risk, RiskLevel::Low);
        assert_eq!(analysis.risk_assessment.total_techniques, 0);
        assert!(analysis.defensive_recommendations.is_empty());
    }

    #[test]
    fn ssh_web_and_rdp_trigger_all_four_rules() {
        let analysis = correlate(&[22, 80, 3389]);
        assert_eq!(ids(&analysis), vec!["T1046", "T1021.001", "T1021.004", "T1190"]);
        assert_eq!(analysis.risk_assessment.overall_risk, RiskLevel::High);
        assert_eq!(analysis.risk_assessment.high_risk_techniques, 2);
        assert_eq!(analysis.risk_assessment.medium_risk_techniques, 2);

        let t1190 = analysis
            .techniques_detected
            .iter()
            .find(|h| h.technique_id == "T1190")
            .unwrap();
        assert!(t1190.evidence.contains("[80]"));
    }

    #[test]
    fn lone_unprofiled_port_still_emits_scanning_exposure() {
        let analysis = correlate(&[8000]);
        assert_eq!(ids(&analysis), vec!["T1046"]);
        assert_eq!(analysis.risk_assessment.overall_risk, RiskLevel::Medium);
    }

    #[test]
    fn multiple_web_ports_emit_a_single_t1190() {
        let analysis = correlate(&[80, 443, 8080, 8443]);
        let count = analysis
            .techniques_detected
            .iter()
            .filter(|h| h.technique_id == "T1190")
            .count();
        assert_eq!(count, 1);
        let t1190 = analysis
            .techniques_detected
            .iter()
            .find(|h| h.technique_id == "T1190")
            .unwrap();
        assert!(t1190.evidence.contains("[80, 443, 8080, 8443]"));
    }

    #[test]
    fn correlation_is_order_insensitive() {
        let a = correlate(&[22, 80, 3389]);
        let b = correlate(&[3389, 22, 80]);
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.risk_assessment, b.risk_assessment);
        assert_eq!(a.defensive_recommendations, b.defensive_recommendations);
    }

    #[test]
    fn correlation_is_idempotent() {
        let a = correlate(&[22, 443]);
        let b = correlate(&[22, 443]);
        assert_eq!(a, b);
    }

    #[test]
    fn ssh_only_derives_medium_tier() {
        let analysis = correlate(&[22]);
        assert_eq!(analysis.risk_assessment.overall_risk, RiskLevel::Medium);
        assert_eq!(analysis.risk_assessment.high_risk_techniques, 0);
    }

    #[test]
    fn recommendation_blocks_accumulate_in_rule_order() {
        let analysis = correlate(&[22, 3389]);
        // T1046 block (3) then T1021.001 block (4) then T1021.004 block (4).
        assert_eq!(analysis.defensive_recommendations.len(), 11);
        assert_eq!(
            analysis.defensive_recommendations[0],
            "Implement network segmentation to limit scanning scope"
        );
        assert_eq!(
            analysis.defensive_recommendations[3],
            "Disable RDP if not required, or restrict access via VPN"
        );
        assert_eq!(
            analysis.defensive_recommendations[7],
            "Use key-based authentication instead of passwords"
        );
    }

    #[test]
    fn catalog_holds_all_referenced_techniques() {
        for id in ["T1046", "T1040", "T1018", "T1082", "T1021.001", "T1021.004", "T1190"] {
            let info = technique_info(id).expect("missing catalog entry");
            assert!(!info.name.is_empty());
            assert!(!info.tactics.is_empty());
        }
        assert!(technique_info("T9999").is_none());
    }
}
