// src/core/knowledge_base.rs

//! This module is the engine's sole source of domain knowledge about network
//! services. It contains a static, read-only table mapping well-known ports to
//! service identity, common vulnerability classes, associated MITRE ATT&CK
//! technique IDs and baseline remediation steps, plus the fixed advisory lists
//! the orchestrator draws on when assembling recommendations.
//! Keeping this data-driven makes the correlation logic side-effect-free and
//! trivially testable.

use crate::core::models::{DetectedOs, ServiceRecord};

/// Static profile of a well-known service, the raw form behind
/// [`ServiceRecord`].
pub struct ServiceProfile {
    pub port: u16,
    pub service: &'static str,
    pub common_vulns: &'static [&'static str],
    pub mitre_techniques: &'static [&'static str],
    pub recommendations: &'static [&'static str],
}

/// The centralized service knowledge base. Ports absent from this table
/// resolve to a generic "unknown service" record via [`lookup`].
static SERVICES: &[ServiceProfile] = &[
    ServiceProfile {
        port: 21,
        service: "FTP",
        common_vulns: &[
            "Anonymous login",
            "Cleartext credentials",
            "Directory traversal",
        ],
        mitre_techniques: &["T1078", "T1552.001"],
        recommendations: &["Use SFTP/FTPS", "Disable anonymous access", "Regular updates"],
    },
    ServiceProfile {
        port: 22,
        service: "SSH",
        common_vulns: &["Weak passwords", "Outdated versions", "Default credentials"],
        mitre_techniques: &["T1021.004", "T1110"],
        recommendations: &["Key-based auth", "Disable password auth", "Update SSH"],
    },
    ServiceProfile {
        port: 23,
        service: "Telnet",
        common_vulns: &["Cleartext transmission", "No encryption", "Legacy protocol"],
        mitre_techniques: &["T1021.002", "T1040"],
        recommendations: &[
            "Replace with SSH",
            "Disable Telnet",
            "Use encrypted alternatives",
        ],
    },
    ServiceProfile {
        port: 80,
        service: "HTTP",
        common_vulns: &[
            "Unencrypted data",
            "Missing security headers",
            "Information disclosure",
        ],
        mitre_techniques: &["T1190", "T1040"],
        recommendations: &["Migrate to HTTPS", "Security headers", "Regular security scans"],
    },
    ServiceProfile {
        port: 443,
        service: "HTTPS",
        common_vulns: &["Weak TLS config", "Certificate issues", "Mixed content"],
        mitre_techniques: &["T1190", "T1040"],
        recommendations: &[
            "Strong TLS config",
            "Certificate monitoring",
            "Security headers",
        ],
    },
    ServiceProfile {
        port: 1433,
        service: "SQL Server",
        common_vulns: &[
            "Default credentials",
            "SQL injection",
            "Unencrypted connections",
        ],
        mitre_techniques: &["T1190", "T1078"],
        recommendations: &["Change defaults", "Network isolation", "Encryption"],
    },
    ServiceProfile {
        port: 3306,
        service: "MySQL",
        common_vulns: &[
            "Default credentials",
            "Remote root access",
            "Privilege escalation",
        ],
        mitre_techniques: &["T1190", "T1078"],
        recommendations: &["Secure installation", "Limit remote access", "Regular updates"],
    },
    ServiceProfile {
        port: 3389,
        service: "RDP",
        common_vulns: &["Weak passwords", "BlueKeep vulnerability", "No NLA"],
        mitre_techniques: &["T1021.001", "T1110"],
        recommendations: &["Strong passwords", "Enable NLA", "Regular patches"],
    },
];

/// Ports whose services carry elevated risk when exposed; drives both the
/// risk-score bonus and the per-port hardening advice.
pub const HIGH_RISK_PORTS: &[u16] = &[21, 23, 135, 139, 445, 1433, 3306, 3389];

/// Looks up the service knowledge for a port.
///
/// Pure function over the static table. Unknown ports yield a generic record
/// tagged with T1046 so downstream correlation still has something to anchor
/// on.
///
/// # Arguments
///
/// * `port` - The TCP port number to look up.
///
/// # Returns
///
/// A fully-populated [`ServiceRecord`], never an error.
pub fn lookup(port: u16) -> ServiceRecord {
    match SERVICES.iter().find(|s| s.port == port) {
        Some(profile) => ServiceRecord {
            port,
            service_name: profile.service.to_string(),
            vulnerability_classes: profile.common_vulns.iter().map(|v| v.to_string()).collect(),
            technique_ids: profile
                .mitre_techniques
                .iter()
                .map(|t| t.to_string())
                .collect(),
            recommendations: profile
                .recommendations
                .iter()
                .map(|r| r.to_string())
                .collect(),
        },
        None => ServiceRecord {
            port,
            service_name: format!("Unknown service on port {}", port),
            vulnerability_classes: vec!["Unknown service risks".to_string()],
            technique_ids: vec!["T1046".to_string()],
            recommendations: vec![
                "Identify service".to_string(),
                "Close if unnecessary".to_string(),
                "Security assessment".to_string(),
            ],
        },
    }
}

/// Every port explicitly profiled in the table, for exhaustive enumeration in
/// tests and catalogs.
pub fn known_ports() -> impl Iterator<Item = u16> {
    SERVICES.iter().map(|s| s.port)
}

/// Human-readable name of a service considered inherently dangerous to
/// expose, if the port maps to one.
pub fn dangerous_service_name(port: u16) -> Option<&'static str> {
    match port {
        21 => Some("FTP"),
        23 => Some("Telnet"),
        135 => Some("RPC"),
        139 => Some("NetBIOS"),
        445 => Some("SMB"),
        _ => None,
    }
}

/// Targeted hardening advice for an open high-risk port.
pub fn hardening_advice(port: u16) -> Option<&'static str> {
    match port {
        21 => Some("Replace FTP with SFTP or secure alternatives"),
        23 => Some("Replace Telnet with SSH immediately"),
        135 => Some("Disable RPC if not required, use firewall restrictions"),
        139 => Some("Disable NetBIOS or restrict access via firewall"),
        445 => Some("Secure SMB configuration, disable SMBv1"),
        1433 => Some("Secure SQL Server configuration, network isolation"),
        3306 => Some("Secure MySQL installation, restrict remote access"),
        3389 => Some("Secure RDP configuration, enable Network Level Authentication"),
        _ => None,
    }
}

/// Baseline recommendations appended to every assessment, independent of what
/// the scan found.
pub static GENERAL_RECOMMENDATIONS: &[&str] = &[
    "Implement network segmentation and micro-segmentation",
    "Deploy intrusion detection/prevention systems (IDS/IPS)",
    "Regular vulnerability assessments and penetration testing",
    "Monitor network traffic for anomalous behavior",
    "Implement zero-trust network architecture principles",
    "Regular security patches and updates for all systems",
    "Use strong authentication and access controls",
];

/// Recommendations specific to the detected OS family. Families without a
/// dedicated block get none.
pub fn os_recommendations(os: DetectedOs) -> &'static [&'static str] {
    match os {
        DetectedOs::Windows => &[
            "Enable Windows Defender and keep definitions updated",
            "Regular Windows Updates and security patches",
            "Implement PowerShell execution policies",
        ],
        DetectedOs::LinuxUnix => &[
            "Keep Linux kernel and packages updated",
            "Configure iptables or other firewall solutions",
            "Implement SELinux or AppArmor policies",
        ],
        DetectedOs::NetworkDevice | DetectedOs::Unknown => &[],
    }
}
