// src/core/mod.rs

// This makes the engine's modules available to the rest of the crate. The
// `mod.rs` file acts as the root of the `core` module, exposing its
// sub-modules.

/// Contains all data structures and models used throughout the engine, such
/// as `AssessmentReport`, `RiskLevel`, `PortRange` and the per-scanner result
/// structs.
pub mod models;

/// The static service knowledge base: port-to-service identity, common
/// vulnerability classes, MITRE technique associations and the fixed
/// advisory lists. The engine's sole repository of service domain knowledge.
pub mod knowledge_base;

/// MITRE ATT&CK correlation rules: the technique catalog, the open-port rule
/// table, risk tier derivation and defensive recommendations.
pub mod mitre;

/// Risk scoring: the aggregate score formula, per-vulnerability severity
/// rules and the textual security findings summary.
pub mod risk;

/// The scanning layer: TCP port probing, TTL-based OS fingerprinting and the
/// orchestrator that sequences them into a full assessment.
pub mod scanner;
