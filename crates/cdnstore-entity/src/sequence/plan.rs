//! Code computation for a sequence counter.
//!
//! Planning is pure: it reads a counter snapshot and today's tag and
//! returns the code together with the values to write back. The caller
//! decides whether and how to persist them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::date_tag::DateTag;
use super::model::SequenceCounter;

/// Lowest queue value.
pub const QUEUE_MIN: i32 = 1;

/// Highest queue value. Reaching it forces a rollover.
pub const QUEUE_MAX: i32 = 9999;

/// The outcome of planning one code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePlan {
    /// The generated code.
    pub code: String,
    /// Queue number embedded in the code.
    pub queue_used: i32,
    /// Queue value to store on commit.
    pub next_queue: i32,
    /// Separator value to store on commit.
    pub next_separator: String,
    /// Whether the counter was reset before generating.
    pub rolled_over: bool,
}

impl SequenceCounter {
    /// Plan the next code for `today`.
    ///
    /// The counter rolls over when its queue reached [`QUEUE_MAX`] or when
    /// the year+month part of its separator differs from today's. An
    /// unparseable separator is treated as today.
    pub fn plan(&self, today: &DateTag) -> CodePlan {
        let stored = DateTag::parse(&self.separator);
        let parsed = stored.as_ref().unwrap_or(today);

        let rolled_over = self.queue >= QUEUE_MAX
            || self.queue < QUEUE_MIN
            || today.year_month() != parsed.year_month();

        let queue_used = if rolled_over { QUEUE_MIN } else { self.queue };

        // A malformed separator is overwritten with today on commit so the
        // next plan compares against a real period.
        let next_separator = if rolled_over || stored.is_none() {
            today.as_str().to_string()
        } else {
            self.separator.clone()
        };

        CodePlan {
            code: self.format_code(today, queue_used),
            queue_used,
            next_queue: queue_used + 1,
            next_separator,
            rolled_over,
        }
    }

    fn format_code(&self, today: &DateTag, queue: i32) -> String {
        let prefix = self.prefix.as_deref().unwrap_or_default();
        let suffix = self.suffix.as_deref().unwrap_or_default();
        format!(
            "{prefix}{}{queue:04}{}{suffix}",
            today.year_month(),
            today.day()
        )
    }
}

/// A degraded code for when no counter is available: `ER-` followed by
/// five random digits.
pub fn fallback_code() -> String {
    format!("ER-{:05}", rand::rng().random_range(10000..100000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn counter(queue: i32, separator: &str) -> SequenceCounter {
        let now = Utc::now();
        SequenceCounter {
            id: Uuid::now_v7(),
            alias: "gallery_group".into(),
            prefix: None,
            suffix: None,
            queue,
            separator: separator.into(),
            created_at: now,
            updated_at: now,
        }
    }

    fn tag(raw: &str) -> DateTag {
        DateTag::parse(raw).unwrap()
    }

    #[test]
    fn test_same_period_uses_queue() {
        let plan = counter(42, "250603").plan(&tag("250615"));
        assert_eq!(plan.code, "2506004215");
        assert_eq!(plan.next_queue, 43);
        assert_eq!(plan.next_separator, "250603");
        assert!(!plan.rolled_over);
    }

    #[test]
    fn test_month_change_rolls_over_within_same_year() {
        let plan = counter(57, "250101").plan(&tag("250615"));
        assert!(plan.rolled_over);
        assert_eq!(plan.code, "2506000115");
        assert_eq!(plan.next_queue, 2);
        assert_eq!(plan.next_separator, "250615");
    }

    #[test]
    fn test_queue_max_rolls_over() {
        let plan = counter(QUEUE_MAX, "250610").plan(&tag("250615"));
        assert!(plan.rolled_over);
        assert_eq!(plan.queue_used, 1);
        assert_eq!(plan.next_separator, "250615");
    }

    #[test]
    fn test_malformed_separator_is_treated_as_today() {
        let plan = counter(7, "garbage").plan(&tag("250615"));
        assert!(!plan.rolled_over);
        assert_eq!(plan.code, "2506000715");
        assert_eq!(plan.next_separator, "250615");
    }

    #[test]
    fn test_committed_malformed_separator_becomes_a_real_period() {
        let mut c = counter(7, "garbage");
        let plan = c.plan(&tag("250615"));
        c.queue = plan.next_queue;
        c.separator = plan.next_separator;

        let next = c.plan(&tag("250701"));
        assert!(next.rolled_over);
        assert_eq!(next.code, "2507000101");
    }

    #[test]
    fn test_prefix_and_suffix() {
        let mut c = counter(1, "250615");
        c.prefix = Some("GL-".into());
        c.suffix = Some(String::new());
        assert_eq!(c.plan(&tag("250615")).code, "GL-2506000115");

        c.prefix = None;
        c.suffix = Some("-X".into());
        assert_eq!(c.plan(&tag("250615")).code, "2506000115-X");
    }

    #[test]
    fn test_fallback_code_format() {
        for _ in 0..50 {
            let code = fallback_code();
            assert_eq!(code.len(), 8);
            assert!(code.starts_with("ER-"));
            assert!(code[3..].bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
