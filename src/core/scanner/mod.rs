// src/core/scanner/mod.rs

//! Assessment orchestration.
//!
//! This module sequences the specialized scanners and analysis passes into
//! one report: target validation/resolution, the concurrent port scan, the
//! ICMP OS probe (independent of the port set, so it runs alongside the
//! scan via `tokio::join!`), MITRE correlation, vulnerability expansion,
//! risk scoring and recommendation assembly.

pub mod os_scanner;
pub mod port_scanner;

use std::net::IpAddr;
use std::time::Duration;

use chrono::Utc;
use hickory_resolver::TokioAsyncResolver;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::core::knowledge_base;
use crate::core::mitre;
use crate::core::models::{
    AssessmentOptions, AssessmentReport, MitreAnalysis, OsFingerprint, ScanStatus, ScanTarget,
};
use crate::core::risk;
use crate::error::AssessError;

pub(crate) const ENGINE_VERSION: &str = "1.0";
pub(crate) const SCAN_METHODOLOGY: &str = "Rule-based with MITRE ATT&CK framework";
const SCAN_TYPE: &str = "network_security";

/// Static confidence in the engine's methodology for a complete scan. Not a
/// per-finding confidence.
const BASE_CONFIDENCE: f64 = 0.9;

/// Headroom added on top of the derived scan deadline.
const DEADLINE_SLACK: Duration = Duration::from_secs(5);

/// Runs a full assessment against `target` with a fresh cancellation token.
///
/// This is the engine's single inbound entry point: the caller owns run
/// records and result persistence, this function owns everything between
/// target validation and the finished [`AssessmentReport`].
pub async fn assess(
    target: &str,
    options: &AssessmentOptions,
) -> Result<AssessmentReport, AssessError> {
    assess_with_cancel(target, options, CancellationToken::new()).await
}

/// [`assess`] with caller-controlled cancellation.
///
/// Cancelling the token mid-scan abandons in-flight probes and yields
/// [`AssessError::Partial`] carrying the explicitly-marked partial report.
/// The assessment body runs in its own task so that any unexpected panic is
/// caught here and converted into a failed-run error instead of a crash.
pub async fn assess_with_cancel(
    target: &str,
    options: &AssessmentOptions,
    cancel: CancellationToken,
) -> Result<AssessmentReport, AssessError> {
    // Fails fast: no probing happens for an invalid target.
    let scan_target = resolve_target(target).await?;

    let handle = tokio::spawn(run_full_assessment(scan_target, options.clone(), cancel));
    match handle.await {
        Ok(result) => result,
        Err(join_error) => {
            error!(target, error = %join_error, "assessment task failed unexpectedly");
            Err(AssessError::Internal(join_error.to_string()))
        }
    }
}

/// Validates and resolves a target string.
///
/// An IP literal is used as-is; anything else must resolve via DNS, and the
/// first resolved address wins. Both failing is an [`AssessError::InvalidTarget`].
pub async fn resolve_target(target: &str) -> Result<ScanTarget, AssessError> {
    let trimmed = target.trim();
    if trimmed.is_empty() {
        return Err(AssessError::InvalidTarget(target.to_string()));
    }

    if let Ok(address) = trimmed.parse::<IpAddr>() {
        return Ok(ScanTarget::new(trimmed, address));
    }

    let resolver = TokioAsyncResolver::tokio(ResolverConfig::default(), ResolverOpts::default());
    match resolver.lookup_ip(trimmed).await {
        Ok(lookup) => match lookup.iter().next() {
            Some(address) => {
                info!(target = trimmed, ip = %address, "resolved hostname");
                Ok(ScanTarget::new(trimmed, address))
            }
            None => Err(AssessError::InvalidTarget(target.to_string())),
        },
        Err(e) => {
            warn!(target = trimmed, error = %e, "hostname resolution failed");
            Err(AssessError::InvalidTarget(target.to_string()))
        }
    }
}

/// Executes the assessment pipeline against an already-resolved target.
pub async fn run_full_assessment(
    target: ScanTarget,
    options: AssessmentOptions,
    cancel: CancellationToken,
) -> Result<AssessmentReport, AssessError> {
    let range = port_scanner::parse_port_range(&options.port_range)?;
    let overall = options
        .overall_timeout
        .unwrap_or_else(|| derived_timeout(range.count(), &options));
    let deadline = Instant::now() + overall;

    info!(
        target = %target.address,
        original = %target.original,
        start = range.start,
        end = range.end,
        "starting network assessment"
    );

    // The OS probe does not consume the port set, so it runs alongside the
    // scan. It respects cancellation but not the scan deadline; its own
    // 10s-class timeout bounds it.
    let os_probe = async {
        tokio::select! {
            _ = cancel.cancelled() => OsFingerprint::unavailable("assessment cancelled"),
            fp = os_scanner::fingerprint(target.address, options.ping_timeout) => fp,
        }
    };

    let (scan, os_detection) = tokio::join!(
        port_scanner::scan(
            target.address,
            range,
            options.probe_timeout,
            options.concurrency,
            deadline,
            &cancel,
        ),
        os_probe,
    );

    // Everything below the scan is pure: correlation, expansion, scoring.
    let mitre_analysis = mitre::correlate(&scan.open_ports);
    let vulnerabilities = risk::collect_vulnerabilities(&scan.services);
    let risk_score = risk::score(
        &scan.open_ports,
        &vulnerabilities,
        mitre_analysis.risk_assessment.overall_risk,
    );
    let security_findings = risk::security_findings(&scan.open_ports, &mitre_analysis);
    let recommendations = build_recommendations(&scan.open_ports, &mitre_analysis, &os_detection);

    let status = match scan.interrupted {
        None => ScanStatus::Complete,
        Some(reason) => ScanStatus::Partial(reason),
    };
    let confidence = report_confidence(scan.ports_probed, scan.ports_requested, &status);

    let report = AssessmentReport {
        target: target.original,
        resolved_ip: target.address,
        scan_type: SCAN_TYPE.to_string(),
        open_ports: scan.open_ports,
        services: scan.services,
        vulnerabilities,
        mitre_analysis,
        os_detection,
        security_findings,
        risk_score,
        confidence,
        recommendations,
        status,
        ports_probed: scan.ports_probed,
        ports_requested: scan.ports_requested,
        agent_version: ENGINE_VERSION.to_string(),
        scan_methodology: SCAN_METHODOLOGY.to_string(),
        timestamp: Utc::now(),
    };

    match scan.interrupted {
        None => {
            info!(
                target = %report.resolved_ip,
                open = report.open_ports.len(),
                score = report.risk_score,
                "assessment complete"
            );
            Ok(report)
        }
        Some(reason) => {
            warn!(
                target = %report.resolved_ip,
                %reason,
                probed = report.ports_probed,
                requested = report.ports_requested,
                "assessment interrupted, returning partial report"
            );
            Err(AssessError::Partial {
                reason,
                report: Box::new(report),
            })
        }
    }
}

/// Default overall deadline: one probe-timeout wave per `concurrency` ports,
/// plus the ICMP ceiling and fixed slack.
fn derived_timeout(port_count: usize, options: &AssessmentOptions) -> Duration {
    let workers = options.concurrency.max(1);
    let waves = port_count.div_ceil(workers).max(1) as u32;
    options.probe_timeout.saturating_mul(waves) + options.ping_timeout + DEADLINE_SLACK
}

/// A complete scan keeps the static methodology confidence; a partial one is
/// scaled by probe completeness so a barely-started report cannot masquerade
/// as a confident one. Deviation from the flat constant is deliberate and
/// documented.
fn report_confidence(probed: usize, requested: usize, status: &ScanStatus) -> f64 {
    match status {
        ScanStatus::Complete => BASE_CONFIDENCE,
        ScanStatus::Partial(_) if requested == 0 => BASE_CONFIDENCE,
        ScanStatus::Partial(_) => BASE_CONFIDENCE * probed as f64 / requested as f64,
    }
}

/// Assembles the report's recommendation list in fixed order: MITRE defenses,
/// open-port review, per-port hardening, the general baseline, then
/// OS-specific advice.
fn build_recommendations(
    open_ports: &[u16],
    mitre: &MitreAnalysis,
    os: &OsFingerprint,
) -> Vec<String> {
    let mut recommendations = mitre.defensive_recommendations.clone();

    if !open_ports.is_empty() {
        recommendations.push(format!(
            "Review {} open ports and close unnecessary services",
            open_ports.len()
        ));
    }

    for &port in open_ports {
        if let Some(advice) = knowledge_base::hardening_advice(port) {
            recommendations.push(advice.to_string());
        }
    }

    recommendations.extend(
        knowledge_base::GENERAL_RECOMMENDATIONS
            .iter()
            .map(|r| r.to_string()),
    );
    recommendations.extend(
        knowledge_base::os_recommendations(os.detected_os)
            .iter()
            .map(|r| r.to_string()),
    );

    recommendations
}
