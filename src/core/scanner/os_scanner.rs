// src/core/scanner/os_scanner.rs

use std::net::IpAddr;
use std::time::Duration;

use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::core::models::{DetectedOs, OsFingerprint};

/// Matches the TTL field in both `ttl=118` (Unix) and `TTL=128` (Windows,
/// lowercased before matching) ping output forms.
static TTL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"ttl[=\s]+(\d+)").unwrap());

/// Estimates the target's OS family from the TTL of a single ICMP echo reply.
///
/// Shells out to the system `ping` (unprivileged ICMP needs no raw socket
/// that way) with one echo request, bounded by `timeout`. Every failure mode
/// — spawn error, timeout, non-zero exit, missing TTL — degrades to an
/// `Unknown` fingerprint carrying the reason; the assessment continues either
/// way.
///
/// The TTL heuristic relies on default initial-TTL conventions (64 for
/// Linux/Unix, 128 for Windows, 255 for network gear) and is skewed by every
/// hop between scanner and target, hence the sub-1.0 confidence even on a
/// clean reply.
pub async fn fingerprint(address: IpAddr, timeout: Duration) -> OsFingerprint {
    info!(target = %address, "starting OS fingerprint probe");

    let output = match tokio::time::timeout(timeout, ping_command(address, timeout).output()).await
    {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!(target = %address, error = %e, "failed to execute ping");
            return OsFingerprint::unavailable(format!("Failed to execute ping: {}", e));
        }
        Err(_) => {
            warn!(target = %address, "ICMP probe timed out");
            return OsFingerprint::unavailable("ICMP probe timed out");
        }
    };

    if !output.status.success() {
        debug!(target = %address, status = %output.status, "ping reported no reply");
        return OsFingerprint::unavailable(format!("ping exited with status {}", output.status));
    }

    let stdout = String::from_utf8_lossy(&output.stdout).to_lowercase();
    match parse_ttl(&stdout) {
        Some(ttl) => {
            let (detected_os, confidence) = classify_ttl(ttl);
            info!(target = %address, ttl, os = %detected_os, "TTL classified");
            OsFingerprint {
                detected_os,
                confidence,
                ttl: Some(ttl),
                ..OsFingerprint::default()
            }
        }
        None => {
            warn!(target = %address, "ping reply carried no TTL field");
            OsFingerprint::unavailable("No TTL field in ping reply")
        }
    }
}

/// One echo request with a per-platform timeout flag.
fn ping_command(address: IpAddr, timeout: Duration) -> Command {
    let mut cmd = Command::new("ping");
    if cfg!(target_os = "windows") {
        cmd.args(["-n", "1", "-w", &timeout.as_millis().to_string()]);
    } else {
        cmd.args(["-c", "1", "-W", &timeout.as_secs().max(1).to_string()]);
    }
    cmd.arg(address.to_string());
    cmd
}

/// Extracts the first TTL value from lowercased ping output.
fn parse_ttl(output: &str) -> Option<u8> {
    TTL_RE
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// TTL -> (OS family, confidence) mapping.
pub(crate) fn classify_ttl(ttl: u8) -> (DetectedOs, f64) {
    match ttl {
        0..=64 => (DetectedOs::LinuxUnix, 0.7),
        65..=128 => (DetectedOs::Windows, 0.7),
        129..=255 => (DetectedOs::NetworkDevice, 0.6),
    }
}
