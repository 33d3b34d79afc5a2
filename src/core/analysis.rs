//! Read-only analysis of a completed scan result.
//!
//! Everything here is a pure function of an immutable `ScanResult`: the
//! severity breakdown, an overall risk score, and remediation advice grouped
//! by vulnerability type. The UI and the dashboard consume these; nothing is
//! sent back to the backend.

use std::collections::BTreeMap;
use std::fmt;

use strum::IntoEnumIterator;

use crate::core::models::{ScanResult, Severity, Vulnerability};

/// Fallback advice when the backend supplied none for a finding.
pub const DEFAULT_RECOMMENDATION: &str = "Apply security patches and updates";

/// Weight of each severity in the overall risk score.
fn severity_weight(severity: Severity) -> f64 {
    match severity {
        Severity::Critical => 10.0,
        Severity::High => 7.5,
        Severity::Medium => 5.0,
        Severity::Low => 2.5,
    }
}

/// Number of findings per severity, most severe first. Every severity is present, even at zero.
pub fn severity_distribution(result: &ScanResult) -> Vec<(Severity, usize)> {
    let mut counts: BTreeMap<Severity, usize> = Severity::iter().map(|s| (s, 0)).collect();
    for vuln in &result.vulnerabilities {
        *counts.entry(vuln.severity).or_default() += 1;
    }
    counts.into_iter().rev().collect()
}

/// Overall risk on a 0–10 scale.
///
/// Each finding contributes its severity weight times its CVSS score (a
/// missing score counts as 1.0); the average is capped at 10.
pub fn risk_score(vulnerabilities: &[Vulnerability]) -> f64 {
    if vulnerabilities.is_empty() {
        return 0.0;
    }
    let total: f64 = vulnerabilities
        .iter()
        .map(|v| {
            let cvss = if v.cvss_score > 0.0 { v.cvss_score } else { 1.0 };
            severity_weight(v.severity) * cvss
        })
        .sum();
    (total / vulnerabilities.len() as f64).min(10.0)
}

/// Qualitative band for a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 9.0 => RiskLevel::Critical,
            s if s >= 7.0 => RiskLevel::High,
            s if s >= 4.0 => RiskLevel::Medium,
            s if s > 0.0 => RiskLevel::Low,
            _ => RiskLevel::None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::None => write!(f, "No risk"),
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Critical => write!(f, "Critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Medium => write!(f, "MEDIUM"),
            Priority::High => write!(f, "HIGH"),
        }
    }
}

/// Remediation advice for every finding that shares a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub vulnerability_type: String,
    /// Distinct hosts carrying this finding.
    pub affected_hosts: usize,
    /// Instances rated high or critical.
    pub critical_instances: usize,
    pub recommendation: String,
    pub priority: Priority,
}

/// Groups findings by title, high priority groups first.
///
/// Within a priority, groups keep the order in which their first finding appears.
pub fn recommendations(result: &ScanResult) -> Vec<Recommendation> {
    let mut groups: Vec<(&str, Vec<&Vulnerability>)> = Vec::new();
    for vuln in &result.vulnerabilities {
        match groups.iter_mut().find(|(title, _)| *title == vuln.title) {
            Some((_, members)) => members.push(vuln),
            None => groups.push((vuln.title.as_str(), vec![vuln])),
        }
    }

    let mut recs: Vec<Recommendation> = groups
        .into_iter()
        .map(|(title, members)| {
            let critical_instances = members
                .iter()
                .filter(|v| v.severity >= Severity::High)
                .count();
            let mut hosts: Vec<&str> = members.iter().filter_map(|v| v.host.as_deref()).collect();
            hosts.sort_unstable();
            hosts.dedup();
            let recommendation = members
                .first()
                .map(|v| v.recommendation.trim())
                .filter(|r| !r.is_empty())
                .unwrap_or(DEFAULT_RECOMMENDATION)
                .to_string();
            Recommendation {
                vulnerability_type: title.to_string(),
                affected_hosts: hosts.len(),
                critical_instances,
                recommendation,
                priority: if critical_instances > 0 { Priority::High } else { Priority::Medium },
            }
        })
        .collect();

    // Stable sort keeps first-seen order within each priority.
    recs.sort_by(|a, b| b.priority.cmp(&a.priority));
    recs
}

/// Findings sorted most severe first, then by CVSS, optionally restricted to one severity.
pub fn sorted_vulnerabilities(result: &ScanResult, only: Option<Severity>) -> Vec<&Vulnerability> {
    let mut vulns: Vec<&Vulnerability> = result
        .vulnerabilities
        .iter()
        .filter(|v| only.is_none_or(|s| v.severity == s))
        .collect();
    vulns.sort_by(|a, b| {
        b.severity
            .cmp(&a.severity)
            .then_with(|| b.cvss_score.total_cmp(&a.cvss_score))
    });
    vulns
}
