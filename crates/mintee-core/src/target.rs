use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::error::CoreError;

/// Comparison operator on one side of a target range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TargetOperator {
    LessThan = 1,
    LessThanOrEqual = 2,
    Equal = 3,
    NotApplicable = 4,
}

impl TargetOperator {
    pub fn is_active(self) -> bool {
        !matches!(self, TargetOperator::NotApplicable)
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid target operator: {0}")]
pub struct ParseTargetOperatorError(String);

impl TryFrom<u8> for TargetOperator {
    type Error = ParseTargetOperatorError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(TargetOperator::LessThan),
            2 => Ok(TargetOperator::LessThanOrEqual),
            3 => Ok(TargetOperator::Equal),
            4 => Ok(TargetOperator::NotApplicable),
            _ => Err(ParseTargetOperatorError(raw.to_string())),
        }
    }
}

impl From<TargetOperator> for u8 {
    fn from(op: TargetOperator) -> u8 {
        op as u8
    }
}

impl FromStr for TargetOperator {
    type Err = ParseTargetOperatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lt" | "<" => Ok(TargetOperator::LessThan),
            "lte" | "<=" => Ok(TargetOperator::LessThanOrEqual),
            "eq" | "=" | "==" => Ok(TargetOperator::Equal),
            "na" | "none" => Ok(TargetOperator::NotApplicable),
            _ => Err(ParseTargetOperatorError(s.to_string())),
        }
    }
}

impl fmt::Display for TargetOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            TargetOperator::LessThan => "<",
            TargetOperator::LessThanOrEqual => "<=",
            TargetOperator::Equal => "=",
            TargetOperator::NotApplicable => "-",
        };
        write!(f, "{}", symbol)
    }
}

/// Tri-state judgement of a completion value against its target bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    Satisfactory,
    Borderline,
    Unsatisfactory,
}

impl fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CompletionStatus::Satisfactory => "satisfactory",
            CompletionStatus::Borderline => "borderline",
            CompletionStatus::Unsatisfactory => "unsatisfactory",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of checking one bound in isolation.
enum BoundCheck {
    Met,
    Missed,
    OnBoundary,
}

/// A completion acceptance range: two operator/value pairs, canonicalized at
/// construction by [`TargetBounds::validated`].
///
/// Canonical form carries at most one `Equal` operator (the other side is
/// forced `NotApplicable`), and values are meaningful only for active
/// operators. Evaluation functions assume that form; they fail soft on a
/// render path rather than panicking when handed an unvalidated pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetBounds {
    pub min_op: TargetOperator,
    pub max_op: TargetOperator,
    pub min_target: f32,
    pub max_target: f32,
}

impl TargetBounds {
    /// Collapses a user-entered pair of bound specifications into canonical,
    /// redundancy-free form, or rejects impossible/ambiguous combinations.
    ///
    /// # Behavior
    /// - both `NotApplicable`: rejected, a target needs at least one bound
    /// - both `Equal`: rejected unless the values agree, which degenerates to
    ///   a single equality bound
    /// - exactly one `Equal`: the equality bound supersedes the other side
    ///   regardless of value ordering
    /// - two inequalities: kept when `min < max`; a zero-width range is valid
    ///   only for `<=`/`<=` (degenerates to equality), impossible otherwise;
    ///   `min > max` is rejected
    /// - one inequality: passes through, the inactive side's stale value is
    ///   zeroed
    ///
    /// Successful output is a fixed point: re-validating it returns the same
    /// bounds. Rejections carry a human-readable reason and leave no partial
    /// state; the caller re-prompts.
    pub fn validated(
        min_op: TargetOperator,
        max_op: TargetOperator,
        min_target: f32,
        max_target: f32,
    ) -> Result<Self, CoreError> {
        use TargetOperator::*;

        match (min_op, max_op) {
            (NotApplicable, NotApplicable) => Err(CoreError::InvalidTarget(
                "a target needs at least one bound".to_string(),
            )),
            (Equal, Equal) => {
                if min_target == max_target {
                    Ok(Self::equal_to(min_target))
                } else {
                    Err(CoreError::InvalidTarget(
                        "only one bound may use the equal operator".to_string(),
                    ))
                }
            }
            (Equal, _) => Ok(Self::equal_to(min_target)),
            (_, Equal) => Ok(Self::equal_to(max_target)),
            (NotApplicable, _) => Ok(Self {
                min_op: NotApplicable,
                max_op,
                min_target: 0.0,
                max_target,
            }),
            (_, NotApplicable) => Ok(Self {
                min_op,
                max_op: NotApplicable,
                min_target,
                max_target: 0.0,
            }),
            _ => {
                if min_target < max_target {
                    Ok(Self {
                        min_op,
                        max_op,
                        min_target,
                        max_target,
                    })
                } else if min_target == max_target {
                    if min_op == LessThanOrEqual && max_op == LessThanOrEqual {
                        Ok(Self::equal_to(min_target))
                    } else {
                        Err(CoreError::InvalidTarget(
                            "no value can sit strictly between a bound and itself".to_string(),
                        ))
                    }
                } else {
                    Err(CoreError::InvalidTarget(
                        "minimum target is greater than maximum target".to_string(),
                    ))
                }
            }
        }
    }

    /// Canonical single-equality bound.
    fn equal_to(value: f32) -> Self {
        Self {
            min_op: TargetOperator::Equal,
            max_op: TargetOperator::NotApplicable,
            min_target: value,
            max_target: value,
        }
    }

    /// How full a progress meter should render for `completion`, in [0,1].
    ///
    /// Returns `None` when the operator pair is unusable for percentage math
    /// (both `NotApplicable` or both `Equal`) — that signals a caller that
    /// skipped [`TargetBounds::validated`], not a user-facing error.
    ///
    /// Equality bounds render hit-or-miss (1.0 or 0.0), never partial. A
    /// single inequality scales against its own target with sign-aware
    /// handling (a zero target is trivially full). A dual bound interpolates
    /// linearly between min and max.
    pub fn completion_fraction(&self, completion: f32) -> Option<f32> {
        use TargetOperator::*;

        match (self.min_op, self.max_op) {
            (NotApplicable, NotApplicable) | (Equal, Equal) => None,
            (Equal, _) => Some(if completion == self.min_target { 1.0 } else { 0.0 }),
            (_, Equal) => Some(if completion == self.max_target { 1.0 } else { 0.0 }),
            (NotApplicable, _) => Some(Self::single_bound_fraction(completion, self.max_target)),
            (_, NotApplicable) => Some(Self::single_bound_fraction(completion, self.min_target)),
            _ => {
                let fraction = if completion <= self.min_target {
                    0.0
                } else if completion >= self.max_target {
                    1.0
                } else {
                    (completion - self.min_target).abs() / (self.max_target - self.min_target).abs()
                };
                Some(fraction.clamp(0.0, 1.0))
            }
        }
    }

    fn single_bound_fraction(completion: f32, target: f32) -> f32 {
        if target == 0.0 {
            1.0
        } else if target > 0.0 {
            if completion > 0.0 {
                (completion / target).clamp(0.0, 1.0)
            } else {
                0.0
            }
        } else if completion < 0.0 {
            (completion / target).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Judges `completion` against the bounds.
    ///
    /// An `Equal` bound decides alone: exact hit is satisfactory, anything
    /// else unsatisfactory, no borderline state. For inequality bounds, an
    /// exact hit on a strict (`<`) boundary short-circuits the whole
    /// evaluation to borderline; otherwise both active sides must be met.
    /// `NotApplicable` sides are vacuously met.
    pub fn completion_status(&self, completion: f32) -> CompletionStatus {
        use TargetOperator::*;

        if self.min_op == Equal && self.max_op == Equal {
            debug_assert!(false, "bounds were not canonicalized");
            return CompletionStatus::Unsatisfactory;
        }

        if self.min_op == Equal || self.max_op == Equal {
            let target = if self.min_op == Equal {
                self.min_target
            } else {
                self.max_target
            };
            return if completion == target {
                CompletionStatus::Satisfactory
            } else {
                CompletionStatus::Unsatisfactory
            };
        }

        if !self.min_op.is_active() && !self.max_op.is_active() {
            debug_assert!(false, "bounds were not canonicalized");
            return CompletionStatus::Unsatisfactory;
        }

        let min_check = match self.min_op {
            NotApplicable => BoundCheck::Met,
            LessThan => {
                if completion == self.min_target {
                    BoundCheck::OnBoundary
                } else if completion > self.min_target {
                    BoundCheck::Met
                } else {
                    BoundCheck::Missed
                }
            }
            LessThanOrEqual => {
                if completion >= self.min_target {
                    BoundCheck::Met
                } else {
                    BoundCheck::Missed
                }
            }
            Equal => unreachable!("equality handled above"),
        };
        if matches!(min_check, BoundCheck::OnBoundary) {
            return CompletionStatus::Borderline;
        }

        let max_check = match self.max_op {
            NotApplicable => BoundCheck::Met,
            LessThan => {
                if completion == self.max_target {
                    BoundCheck::OnBoundary
                } else if completion < self.max_target {
                    BoundCheck::Met
                } else {
                    BoundCheck::Missed
                }
            }
            LessThanOrEqual => {
                if completion <= self.max_target {
                    BoundCheck::Met
                } else {
                    BoundCheck::Missed
                }
            }
            Equal => unreachable!("equality handled above"),
        };
        if matches!(max_check, BoundCheck::OnBoundary) {
            return CompletionStatus::Borderline;
        }

        match (min_check, max_check) {
            (BoundCheck::Met, BoundCheck::Met) => CompletionStatus::Satisfactory,
            _ => CompletionStatus::Unsatisfactory,
        }
    }
}

impl fmt::Display for TargetBounds {
    /// Renders from the completion value's point of view: a min bound shows
    /// as `>= 2`, a max bound as `<= 5`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TargetOperator::*;

        fn min_symbol(op: TargetOperator) -> &'static str {
            match op {
                LessThan => ">",
                LessThanOrEqual => ">=",
                Equal | NotApplicable => "-",
            }
        }

        match (self.min_op, self.max_op) {
            (Equal, _) => write!(f, "= {}", self.min_target),
            (_, Equal) => write!(f, "= {}", self.max_target),
            (NotApplicable, NotApplicable) => write!(f, "-"),
            (NotApplicable, max_op) => write!(f, "{} {}", max_op, self.max_target),
            (min_op, NotApplicable) => write!(f, "{} {}", min_symbol(min_op), self.min_target),
            (min_op, max_op) => write!(
                f,
                "{} {}, {} {}",
                min_symbol(min_op),
                self.min_target,
                max_op,
                self.max_target
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use TargetOperator::*;

    fn bounds(min_op: TargetOperator, max_op: TargetOperator, min: f32, max: f32) -> TargetBounds {
        TargetBounds {
            min_op,
            max_op,
            min_target: min,
            max_target: max,
        }
    }

    mod validation {
        use super::*;

        #[test]
        fn test_both_inactive_rejected() {
            assert!(TargetBounds::validated(NotApplicable, NotApplicable, 1.0, 2.0).is_err());
        }

        #[test]
        fn test_both_equal_rejected_unless_values_agree() {
            assert!(TargetBounds::validated(Equal, Equal, 3.0, 4.0).is_err());
            let agreed = TargetBounds::validated(Equal, Equal, 3.0, 3.0).unwrap();
            assert_eq!(agreed, bounds(Equal, NotApplicable, 3.0, 3.0));
        }

        #[test]
        fn test_equal_supersedes_other_side() {
            // min > max does not matter once one side is equal
            let canonical = TargetBounds::validated(Equal, NotApplicable, 5.0, 4.0).unwrap();
            assert_eq!(canonical, bounds(Equal, NotApplicable, 5.0, 5.0));

            let canonical = TargetBounds::validated(LessThanOrEqual, Equal, 1.0, 7.0).unwrap();
            assert_eq!(canonical, bounds(Equal, NotApplicable, 7.0, 7.0));
        }

        #[test]
        fn test_open_range_passes_through() {
            let canonical = TargetBounds::validated(LessThan, LessThanOrEqual, 2.0, 5.0).unwrap();
            assert_eq!(canonical, bounds(LessThan, LessThanOrEqual, 2.0, 5.0));
        }

        #[test]
        fn test_zero_width_range() {
            // <=/<= degenerates to equality
            let canonical =
                TargetBounds::validated(LessThanOrEqual, LessThanOrEqual, 4.0, 4.0).unwrap();
            assert_eq!(canonical, bounds(Equal, NotApplicable, 4.0, 4.0));

            // any strict side makes the zero-width range unsatisfiable
            assert!(TargetBounds::validated(LessThan, LessThan, 4.0, 4.0).is_err());
            assert!(TargetBounds::validated(LessThan, LessThanOrEqual, 4.0, 4.0).is_err());
            assert!(TargetBounds::validated(LessThanOrEqual, LessThan, 4.0, 4.0).is_err());
        }

        #[test]
        fn test_inverted_range_rejected_when_both_active() {
            assert!(TargetBounds::validated(LessThan, LessThan, 9.0, 2.0).is_err());
        }

        #[test]
        fn test_single_bound_ignores_stale_value() {
            // stale max above/below min is irrelevant, and gets zeroed
            let canonical = TargetBounds::validated(LessThan, NotApplicable, 5.0, 4.0).unwrap();
            assert_eq!(canonical, bounds(LessThan, NotApplicable, 5.0, 0.0));

            let canonical = TargetBounds::validated(NotApplicable, LessThanOrEqual, 9.0, 2.0).unwrap();
            assert_eq!(canonical, bounds(NotApplicable, LessThanOrEqual, 0.0, 2.0));
        }

        proptest! {
            #[test]
            fn prop_canonicalization_is_idempotent(
                min_op_raw in 1u8..=4,
                max_op_raw in 1u8..=4,
                min in -1000.0f32..1000.0,
                max in -1000.0f32..1000.0,
            ) {
                let min_op = TargetOperator::try_from(min_op_raw).unwrap();
                let max_op = TargetOperator::try_from(max_op_raw).unwrap();
                if let Ok(canonical) = TargetBounds::validated(min_op, max_op, min, max) {
                    let again = TargetBounds::validated(
                        canonical.min_op,
                        canonical.max_op,
                        canonical.min_target,
                        canonical.max_target,
                    )
                    .expect("canonical bounds must re-validate");
                    prop_assert_eq!(again, canonical);
                }
            }

            #[test]
            fn prop_canonical_form_has_at_most_one_equal(
                min_op_raw in 1u8..=4,
                max_op_raw in 1u8..=4,
                min in -1000.0f32..1000.0,
                max in -1000.0f32..1000.0,
            ) {
                let min_op = TargetOperator::try_from(min_op_raw).unwrap();
                let max_op = TargetOperator::try_from(max_op_raw).unwrap();
                if let Ok(canonical) = TargetBounds::validated(min_op, max_op, min, max) {
                    if canonical.min_op == Equal {
                        prop_assert_eq!(canonical.max_op, NotApplicable);
                    }
                    prop_assert_ne!(canonical.max_op, Equal);
                }
            }
        }
    }

    mod fraction {
        use super::*;

        #[test]
        fn test_uncanonical_pairs_yield_none() {
            assert_eq!(
                bounds(NotApplicable, NotApplicable, 0.0, 0.0).completion_fraction(1.0),
                None
            );
            assert_eq!(bounds(Equal, Equal, 2.0, 2.0).completion_fraction(2.0), None);
        }

        #[test]
        fn test_equality_is_binary() {
            let target = bounds(Equal, NotApplicable, 3.0, 3.0);
            assert_eq!(target.completion_fraction(3.0), Some(1.0));
            assert_eq!(target.completion_fraction(2.9), Some(0.0));
            assert_eq!(target.completion_fraction(4.0), Some(0.0));
        }

        #[test]
        fn test_dual_bound_interpolation() {
            let target = bounds(LessThan, LessThan, 0.0, 5.0);
            assert_eq!(target.completion_fraction(0.0), Some(0.0));
            assert_eq!(target.completion_fraction(5.0), Some(1.0));
            assert_eq!(target.completion_fraction(2.5), Some(0.5));
            assert_eq!(target.completion_fraction(-3.0), Some(0.0));
            assert_eq!(target.completion_fraction(11.0), Some(1.0));
        }

        #[test]
        fn test_single_positive_target_scales() {
            let target = bounds(LessThanOrEqual, NotApplicable, 8.0, 0.0);
            assert_eq!(target.completion_fraction(4.0), Some(0.5));
            assert_eq!(target.completion_fraction(8.0), Some(1.0));
            assert_eq!(target.completion_fraction(16.0), Some(1.0));
            assert_eq!(target.completion_fraction(0.0), Some(0.0));
            assert_eq!(target.completion_fraction(-4.0), Some(0.0));
        }

        #[test]
        fn test_single_negative_target_mirrors() {
            let target = bounds(NotApplicable, LessThanOrEqual, 0.0, -8.0);
            assert_eq!(target.completion_fraction(-4.0), Some(0.5));
            assert_eq!(target.completion_fraction(-8.0), Some(1.0));
            assert_eq!(target.completion_fraction(4.0), Some(0.0));
            assert_eq!(target.completion_fraction(0.0), Some(0.0));
        }

        #[test]
        fn test_zero_target_trivially_full() {
            let target = bounds(LessThanOrEqual, NotApplicable, 0.0, 0.0);
            assert_eq!(target.completion_fraction(-2.0), Some(1.0));
            assert_eq!(target.completion_fraction(5.0), Some(1.0));
        }
    }

    mod status {
        use super::*;

        #[test]
        fn test_strict_boundary_hit_is_borderline() {
            // exact hit on a strict min short-circuits, whatever the max says
            let target = bounds(LessThan, LessThanOrEqual, 10.0, 20.0);
            assert_eq!(target.completion_status(10.0), CompletionStatus::Borderline);

            let target = bounds(LessThan, NotApplicable, 10.0, 0.0);
            assert_eq!(target.completion_status(10.0), CompletionStatus::Borderline);
        }

        #[test]
        fn test_strict_max_boundary_hit_is_borderline() {
            let target = bounds(LessThanOrEqual, LessThan, 0.0, 5.0);
            assert_eq!(target.completion_status(5.0), CompletionStatus::Borderline);
        }

        #[test]
        fn test_equality_has_no_borderline() {
            let target = bounds(Equal, NotApplicable, 5.0, 5.0);
            assert_eq!(target.completion_status(5.0), CompletionStatus::Satisfactory);
            assert_eq!(
                target.completion_status(5.1),
                CompletionStatus::Unsatisfactory
            );
        }

        #[test]
        fn test_both_sides_must_be_met() {
            let target = bounds(LessThanOrEqual, LessThanOrEqual, 2.0, 5.0);
            assert_eq!(target.completion_status(3.0), CompletionStatus::Satisfactory);
            assert_eq!(target.completion_status(2.0), CompletionStatus::Satisfactory);
            assert_eq!(target.completion_status(5.0), CompletionStatus::Satisfactory);
            assert_eq!(
                target.completion_status(1.0),
                CompletionStatus::Unsatisfactory
            );
            assert_eq!(
                target.completion_status(6.0),
                CompletionStatus::Unsatisfactory
            );
        }

        #[test]
        fn test_inactive_side_is_vacuous() {
            let target = bounds(NotApplicable, LessThan, 0.0, 5.0);
            assert_eq!(
                target.completion_status(-100.0),
                CompletionStatus::Satisfactory
            );
            assert_eq!(
                target.completion_status(6.0),
                CompletionStatus::Unsatisfactory
            );
        }
    }
}
