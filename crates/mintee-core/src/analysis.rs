use chrono::NaiveDate;

use crate::models::InstanceDetail;
use crate::target::CompletionStatus;

/// Aggregated completion of a task's instances over a date range. Feeds the
/// stats view; rendering stays in the CLI.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSummary {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub satisfactory: u32,
    pub borderline: u32,
    pub unsatisfactory: u32,
    /// Instances with no owning target set (specific-date occurrences).
    pub untargeted: u32,
    /// Mean completion fraction across instances that have evaluable bounds.
    pub average_fraction: Option<f32>,
}

impl AnalysisSummary {
    pub fn total(&self) -> u32 {
        self.satisfactory + self.borderline + self.unsatisfactory + self.untargeted
    }
}

/// Folds instance details into per-status counts and a mean fill fraction.
/// Instances outside `range_start..=range_end` are ignored.
pub fn summarize_instances(
    range_start: NaiveDate,
    range_end: NaiveDate,
    details: &[InstanceDetail],
) -> AnalysisSummary {
    let mut summary = AnalysisSummary {
        range_start,
        range_end,
        satisfactory: 0,
        borderline: 0,
        unsatisfactory: 0,
        untargeted: 0,
        average_fraction: None,
    };

    let mut fraction_sum = 0.0f32;
    let mut fraction_count = 0u32;

    for detail in details {
        let date = detail.instance.date;
        if date < range_start || date > range_end {
            continue;
        }
        match &detail.bounds {
            Some(bounds) => {
                match bounds.completion_status(detail.instance.completion) {
                    CompletionStatus::Satisfactory => summary.satisfactory += 1,
                    CompletionStatus::Borderline => summary.borderline += 1,
                    CompletionStatus::Unsatisfactory => summary.unsatisfactory += 1,
                }
                if let Some(fraction) = bounds.completion_fraction(detail.instance.completion) {
                    fraction_sum += fraction;
                    fraction_count += 1;
                }
            }
            None => summary.untargeted += 1,
        }
    }

    if fraction_count > 0 {
        summary.average_fraction = Some(fraction_sum / fraction_count as f32);
    }
    summary
}
