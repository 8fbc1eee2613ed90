// src/utils/partition.rs

use std::collections::BTreeMap;

use serde_json::Value;

/// Raw answers as submitted: question key (string) to opaque answer value.
pub type AnswerMap = BTreeMap<String, Value>;

/// Answers keyed by parsed question number.
pub type NumberedAnswers = BTreeMap<u32, Value>;

/// Result of splitting an answer map at a question-number threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Partition {
    /// Questions numbered at or below the threshold.
    pub closed: NumberedAnswers,
    /// Questions numbered above the threshold.
    pub open: NumberedAnswers,
    /// Keys that are not a positive integer, or duplicate an earlier key's number.
    pub rejected: Vec<String>,
}

impl Partition {
    pub fn total(&self) -> usize {
        self.closed.len() + self.open.len()
    }
}

/// Parses a question key such as `"12"` or `" 7 "`. Zero is not a question number.
pub fn parse_question_number(key: &str) -> Option<u32> {
    key.trim().parse::<u32>().ok().filter(|n| *n > 0)
}

/// Splits `answers` into closed (`n <= threshold`) and open (`n > threshold`) buckets.
///
/// Malformed keys never fail the split; they are collected in `rejected`.
/// `answers` iterates in key order, so when `"01"` and `"1"` both appear the
/// lexicographically first one wins regardless of how the caller built the map.
pub fn partition(answers: &AnswerMap, threshold: u32) -> Partition {
    let mut out = Partition::default();

    for (key, value) in answers {
        let Some(number) = parse_question_number(key) else {
            out.rejected.push(key.clone());
            continue;
        };

        let bucket = if number <= threshold {
            &mut out.closed
        } else {
            &mut out.open
        };

        if bucket.contains_key(&number) {
            out.rejected.push(key.clone());
        } else {
            bucket.insert(number, value.clone());
        }
    }

    out
}
