//! Mathematical utilities for signature comparison

/// Jensen–Shannon divergence and its partial-signature variant
pub mod divergence;
