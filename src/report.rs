//! Per-label precision / recall / F1 / support, plus accuracy and the
//! macro and support-weighted averages.
//!
//! Serialises to a flat JSON object keyed by label, with `accuracy`,
//! `macro avg` and `weighted avg` after the labels. Ratios with a zero
//! denominator are reported as 0.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    #[serde(rename = "f1-score")]
    pub f1_score: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    #[serde(flatten)]
    pub labels: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    #[serde(rename = "macro avg")]
    pub macro_avg: ClassMetrics,
    #[serde(rename = "weighted avg")]
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

impl ClassificationReport {
    /// Labels are the union of `y_true` and `y_pred`, so a label that is only
    /// ever predicted still appears with support 0.
    pub fn from_predictions<S: AsRef<str>>(y_true: &[S], y_pred: &[S]) -> Self {
        debug_assert_eq!(y_true.len(), y_pred.len());
        let label_set: BTreeSet<&str> = y_true
            .iter()
            .chain(y_pred.iter())
            .map(AsRef::as_ref)
            .collect();

        let mut labels = BTreeMap::new();
        for label in &label_set {
            let mut true_positive = 0;
            let mut predicted = 0;
            let mut support = 0;
            for (truth, guess) in y_true.iter().zip(y_pred.iter()) {
                let (truth, guess) = (truth.as_ref(), guess.as_ref());
                if guess == *label {
                    predicted += 1;
                }
                if truth == *label {
                    support += 1;
                    if guess == *label {
                        true_positive += 1;
                    }
                }
            }
            let precision = ratio(true_positive, predicted);
            let recall = ratio(true_positive, support);
            labels.insert(
                label.to_string(),
                ClassMetrics {
                    precision,
                    recall,
                    f1_score: f1(precision, recall),
                    support,
                },
            );
        }

        let correct = y_true
            .iter()
            .zip(y_pred.iter())
            .filter(|(truth, guess)| truth.as_ref() == guess.as_ref())
            .count();
        let total_support = y_true.len();

        let count = labels.len().max(1) as f64;
        let macro_avg = ClassMetrics {
            precision: labels.values().map(|m| m.precision).sum::<f64>() / count,
            recall: labels.values().map(|m| m.recall).sum::<f64>() / count,
            f1_score: labels.values().map(|m| m.f1_score).sum::<f64>() / count,
            support: total_support,
        };

        let weight = |value: fn(&ClassMetrics) -> f64| -> f64 {
            if total_support == 0 {
                return 0.0;
            }
            labels
                .values()
                .map(|m| value(m) * m.support as f64)
                .sum::<f64>()
                / total_support as f64
        };
        let weighted_avg = ClassMetrics {
            precision: weight(|m| m.precision),
            recall: weight(|m| m.recall),
            f1_score: weight(|m| m.f1_score),
            support: total_support,
        };

        Self {
            accuracy: ratio(correct, total_support),
            labels,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
