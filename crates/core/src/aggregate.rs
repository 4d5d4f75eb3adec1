//! Aggregate counts over feedback records.
//!
//! Everything here is a pure function of the record slice it is given. Callers copy the records
//! out of the store first, so aggregation never holds a store lock.

use crate::record::{FeedbackRecord, YesNo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Positive/neutral/negative tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriCount {
    pub positive: usize,
    pub neutral: usize,
    pub negative: usize,
}

impl TriCount {
    pub fn total(&self) -> usize {
        self.positive + self.neutral + self.negative
    }
}

/// Positive/negative tally for yes/no answers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiCount {
    pub positive: usize,
    pub negative: usize,
}

impl BiCount {
    pub fn total(&self) -> usize {
        self.positive + self.negative
    }
}

/// Aggregate view over a set of records at a point in time.
///
/// Each tally only counts records that have the corresponding field, so `rating.total()` is
/// the number of rated records rather than the number of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub rating: TriCount,
    pub yes_no: BiCount,
    pub text: TriCount,
    pub total_records: usize,
}

/// Text sentiment of one record, for plotting sentiment over time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SentimentPoint {
    pub submitted_at: DateTime<Utc>,
    pub polarity: f64,
}

/// Computes the bucket counts for `records`.
///
/// - rating: 4 or 5 positive, 3 neutral, 1 or 2 negative
/// - yes/no: positive or negative
/// - text sentiment: `> 0` positive, `== 0` neutral, `< 0` negative
pub fn snapshot(records: &[FeedbackRecord]) -> AggregateSnapshot {
    let mut snap = AggregateSnapshot {
        total_records: records.len(),
        ..AggregateSnapshot::default()
    };

    for record in records {
        if let Some(rating) = record.rating {
            match rating.value() {
                4 | 5 => snap.rating.positive += 1,
                3 => snap.rating.neutral += 1,
                _ => snap.rating.negative += 1,
            }
        }

        match record.yes_no {
            Some(YesNo::Positive) => snap.yes_no.positive += 1,
            Some(YesNo::Negative) => snap.yes_no.negative += 1,
            None => {}
        }

        if let Some(polarity) = record.text_sentiment {
            let p = polarity.value();
            if p > 0.0 {
                snap.text.positive += 1;
            } else if p < 0.0 {
                snap.text.negative += 1;
            } else {
                snap.text.neutral += 1;
            }
        }
    }

    snap
}

/// Text sentiment of every record that has one, in insertion order.
pub fn feedback_over_time(records: &[FeedbackRecord]) -> Vec<SentimentPoint> {
    records
        .iter()
        .filter_map(|r| {
            r.text_sentiment.map(|p| SentimentPoint {
                submitted_at: r.submitted_at,
                polarity: p.value(),
            })
        })
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::record::FeedbackRecordBuilder;
    use pulse_types::{NonEmptyText, Polarity, Rating};

    pub(crate) fn record(
        rating: Option<i64>,
        yes_no: Option<YesNo>,
        sentiment: Option<f64>,
    ) -> FeedbackRecord {
        let mut b = FeedbackRecordBuilder::new(NonEmptyText::new("default").unwrap());
        if let Some(r) = rating {
            b = b.rating("Overall", Rating::new(r).unwrap());
        }
        if let Some(y) = yes_no {
            b = b.yes_no("Recommend?", y);
        }
        if let Some(s) = sentiment {
            b = b.text("Comments", "text", Some(Polarity::new(s)), None);
        }
        b.build().unwrap()
    }

    #[test]
    fn empty_input_gives_all_zero_buckets() {
        assert_eq!(snapshot(&[]), AggregateSnapshot::default());
        assert!(feedback_over_time(&[]).is_empty());
    }

    #[test]
    fn rating_only_record_touches_only_rating_bucket() {
        let snap = snapshot(&[record(Some(5), None, None)]);
        assert_eq!(
            snap.rating,
            TriCount {
                positive: 1,
                neutral: 0,
                negative: 0
            }
        );
        assert_eq!(snap.yes_no, BiCount::default());
        assert_eq!(snap.text, TriCount::default());
        assert_eq!(snap.total_records, 1);
    }

    #[test]
    fn rating_buckets() {
        let records: Vec<_> = (1..=5).map(|r| record(Some(r), None, None)).collect();
        let snap = snapshot(&records);
        assert_eq!(snap.rating.positive, 2);
        assert_eq!(snap.rating.neutral, 1);
        assert_eq!(snap.rating.negative, 2);
    }

    #[test]
    fn zero_sentiment_is_neutral() {
        let snap = snapshot(&[record(None, None, Some(0.0))]);
        assert_eq!(
            snap.text,
            TriCount {
                positive: 0,
                neutral: 1,
                negative: 0
            }
        );

        let snap = snapshot(&[
            record(None, None, Some(0.0001)),
            record(None, None, Some(-0.0001)),
        ]);
        assert_eq!(snap.text.positive, 1);
        assert_eq!(snap.text.negative, 1);
        assert_eq!(snap.text.neutral, 0);
    }

    #[test]
    fn bucket_sums_match_populated_fields_for_sparse_records() {
        let records = vec![
            record(Some(1), None, None),
            record(None, Some(YesNo::Positive), None),
            record(None, None, Some(-0.4)),
            record(Some(3), Some(YesNo::Negative), Some(0.2)),
            record(Some(4), None, Some(0.0)),
            record(None, Some(YesNo::Positive), Some(0.9)),
        ];
        let snap = snapshot(&records);

        let with_rating = records.iter().filter(|r| r.rating.is_some()).count();
        let with_yes_no = records.iter().filter(|r| r.yes_no.is_some()).count();
        let with_text = records.iter().filter(|r| r.text_sentiment.is_some()).count();

        assert_eq!(snap.rating.total(), with_rating);
        assert_eq!(snap.yes_no.total(), with_yes_no);
        assert_eq!(snap.text.total(), with_text);
        assert_eq!(snap.total_records, records.len());
        assert_ne!(snap.rating.total(), snap.total_records);
    }

    #[test]
    fn snapshot_is_idempotent() {
        let records = vec![
            record(Some(2), Some(YesNo::Negative), Some(-0.7)),
            record(Some(5), None, Some(0.3)),
        ];
        assert_eq!(snapshot(&records), snapshot(&records));
    }

    #[test]
    fn over_time_keeps_insertion_order_and_skips_absent() {
        let records = vec![
            record(None, None, Some(0.5)),
            record(Some(3), None, None),
            record(None, None, Some(-0.25)),
        ];
        let points: Vec<f64> = feedback_over_time(&records)
            .iter()
            .map(|p| p.polarity)
            .collect();
        assert_eq!(points, vec![0.5, -0.25]);
    }
}
