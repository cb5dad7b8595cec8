// src/core/scanner/port_scanner.rs

use std::collections::BTreeMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use tokio::net::TcpStream;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::core::knowledge_base;
use crate::core::models::{PartialReason, PortRange, ServiceRecord};
use crate::error::AssessError;

/// Parses a `"start-end"` port range string.
///
/// Malformed input (missing dash, non-numeric bounds, port 0 or > 65535)
/// fails with [`AssessError::InvalidPortRange`]. An inverted range parses
/// fine and simply probes nothing.
pub fn parse_port_range(input: &str) -> Result<PortRange, AssessError> {
    let invalid = |reason: &str| AssessError::InvalidPortRange {
        input: input.to_string(),
        reason: reason.to_string(),
    };

    let (start, end) = input
        .trim()
        .split_once('-')
        .ok_or_else(|| invalid("expected \"start-end\""))?;
    let start: u16 = start
        .trim()
        .parse()
        .map_err(|_| invalid("start is not a valid port number"))?;
    let end: u16 = end
        .trim()
        .parse()
        .map_err(|_| invalid("end is not a valid port number"))?;
    if start == 0 || end == 0 {
        return Err(invalid("ports must be between 1 and 65535"));
    }

    Ok(PortRange::new(start, end))
}

/// Attempts a single TCP connect to `(address, port)`.
///
/// Returns `true` iff the handshake completes within `timeout`. Timeouts,
/// refusals and every other socket-level error all read as "not open": from a
/// scanning perspective an unreachable port is indistinguishable in outcome
/// from a closed one, so the distinction is only logged. One attempt is
/// authoritative; there are no retries.
pub async fn probe(address: IpAddr, port: u16, timeout: Duration) -> bool {
    let addr = SocketAddr::new(address, port);
    match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
        Ok(Ok(_stream)) => {
            debug!(%addr, "port open");
            true
        }
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "port not open");
            false
        }
        Err(_) => {
            debug!(%addr, "probe timed out");
            false
        }
    }
}

/// What a host scan produced, including how far it got.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Open ports in ascending order.
    pub open_ports: Vec<u16>,
    /// Knowledge-base record for every open port.
    pub services: BTreeMap<u16, ServiceRecord>,
    pub ports_probed: usize,
    pub ports_requested: usize,
    /// `Some` when the scan stopped early; the other fields then hold partial
    /// data and must be flagged as such by the caller.
    pub interrupted: Option<PartialReason>,
}

/// Scans a port range against one host with a bounded worker pool.
///
/// Probes run concurrently through a sliding window of at most `concurrency`
/// in-flight connects: each completion admits the next pending port, keeping
/// wall-clock time proportional to the probe timeout rather than to
/// `ports x timeout`. Completion order is irrelevant; results are sorted
/// ascending before they are handed downstream.
///
/// The scan stops early when `deadline` passes or `cancel` fires; in-flight
/// connects are abandoned (dropped) on the spot and the outcome carries the
/// interruption reason instead of posing as complete.
pub async fn scan(
    address: IpAddr,
    range: PortRange,
    probe_timeout: Duration,
    concurrency: usize,
    deadline: Instant,
    cancel: &CancellationToken,
) -> ScanOutcome {
    let ports_requested = range.count();
    let mut pending = range.ports();
    let mut in_flight = FuturesUnordered::new();

    // Seed the sliding window.
    for port in pending.by_ref().take(concurrency.max(1)) {
        in_flight.push(probe_one(address, port, probe_timeout));
    }

    let mut open_ports: Vec<u16> = Vec::new();
    let mut ports_probed = 0usize;
    let mut interrupted = None;

    let expired = tokio::time::sleep_until(deadline);
    tokio::pin!(expired);

    while !in_flight.is_empty() {
        tokio::select! {
            _ = cancel.cancelled() => {
                interrupted = Some(PartialReason::Cancelled);
                break;
            }
            _ = &mut expired => {
                interrupted = Some(PartialReason::Timeout);
                break;
            }
            Some((port, is_open)) = in_flight.next() => {
                ports_probed += 1;
                if is_open {
                    open_ports.push(port);
                }
                if let Some(next) = pending.next() {
                    in_flight.push(probe_one(address, next, probe_timeout));
                }
            }
        }
    }

    // Dropping the set aborts whatever connects were still in flight.
    drop(in_flight);

    open_ports.sort_unstable();
    let services: BTreeMap<u16, ServiceRecord> = open_ports
        .iter()
        .map(|&port| (port, knowledge_base::lookup(port)))
        .collect();

    info!(
        target = %address,
        open = open_ports.len(),
        probed = ports_probed,
        requested = ports_requested,
        "port scan finished"
    );

    ScanOutcome {
        open_ports,
        services,
        ports_probed,
        ports_requested,
        interrupted,
    }
}

async fn probe_one(address: IpAddr, port: u16, timeout: Duration) -> (u16, bool) {
    (port, probe(address, port, timeout).await)
}
