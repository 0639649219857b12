//! Provisioning outcome report

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Which list an identity ended up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeBucket {
    Added,
    Invited,
    Failed,
}

impl OutcomeBucket {
    /// Heading the bucket is printed under
    pub fn label(self) -> &'static str {
        match self {
            OutcomeBucket::Added => "Added",
            OutcomeBucket::Invited => "Invited",
            OutcomeBucket::Failed => "Failed",
        }
    }
}

/// Summary of one provisioning run
///
/// Lists keep processing order and duplicates. Each identity request of the
/// run contributes exactly one entry to exactly one list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisioningOutcome {
    pub added: Vec<String>,
    pub invited: Vec<String>,
    pub failed: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

impl ProvisioningOutcome {
    pub fn total(&self) -> usize {
        self.added.len() + self.invited.len() + self.failed.len()
    }

    /// The three lists in report order
    pub fn sections(&self) -> [(OutcomeBucket, &[String]); 3] {
        [
            (OutcomeBucket::Added, self.added.as_slice()),
            (OutcomeBucket::Invited, self.invited.as_slice()),
            (OutcomeBucket::Failed, self.failed.as_slice()),
        ]
    }

    /// Human-readable multi-line summary
    ///
    /// Only non-empty sections are printed, each under a fixed label.
    pub fn render_summary(&self) -> String {
        let mut message = String::from("Completed\n");
        for (bucket, entries) in self.sections() {
            if !entries.is_empty() {
                message.push_str(&format!("{}: {}\n", bucket.label(), entries.join(", ")));
            }
        }
        message
    }
}

/// Accumulates outcome entries during a run
#[derive(Debug, Default)]
pub(crate) struct OutcomeBuilder {
    added: Vec<String>,
    invited: Vec<String>,
    failed: Vec<String>,
}

impl OutcomeBuilder {
    pub fn record(&mut self, bucket: OutcomeBucket, label: impl Into<String>) {
        let list = match bucket {
            OutcomeBucket::Added => &mut self.added,
            OutcomeBucket::Invited => &mut self.invited,
            OutcomeBucket::Failed => &mut self.failed,
        };
        list.push(label.into());
    }

    pub fn finish(self) -> ProvisioningOutcome {
        ProvisioningOutcome {
            added: self.added,
            invited: self.invited,
            failed: self.failed,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_skips_empty_sections() {
        let mut builder = OutcomeBuilder::default();
        builder.record(OutcomeBucket::Added, "a@x.com");
        builder.record(OutcomeBucket::Added, "b@x.com");
        builder.record(OutcomeBucket::Failed, "c@x.com");
        let outcome = builder.finish();

        assert_eq!(
            outcome.render_summary(),
            "Completed\nAdded: a@x.com, b@x.com\nFailed: c@x.com\n"
        );
        assert_eq!(outcome.total(), 3);
        assert!(outcome.sections()[1].1.is_empty());
    }

    #[test]
    fn test_summary_all_sections() {
        let mut builder = OutcomeBuilder::default();
        builder.record(OutcomeBucket::Invited, "new@x.com");
        builder.record(OutcomeBucket::Added, "Ada");
        builder.record(OutcomeBucket::Failed, "bad@x.com");
        let summary = builder.finish().render_summary();

        let lines: Vec<&str> = summary.lines().collect();
        assert_eq!(
            lines,
            vec!["Completed", "Added: Ada", "Invited: new@x.com", "Failed: bad@x.com"]
        );
    }

    #[test]
    fn test_serializes_lists() {
        let mut builder = OutcomeBuilder::default();
        builder.record(OutcomeBucket::Invited, "new@x.com");
        let json = serde_json::to_value(builder.finish()).unwrap();
        assert_eq!(json["invited"][0], "new@x.com");
        assert!(json["added"].as_array().unwrap().is_empty());
        assert!(json["completed_at"].is_string());
    }
}
