use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Day of week in Mintee's fixed numbering: Sunday=1 through Saturday=7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfWeek {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid day of week: {0}")]
pub struct ParseDayOfWeekError(String);

impl TryFrom<u8> for DayOfWeek {
    type Error = ParseDayOfWeekError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(DayOfWeek::Sunday),
            2 => Ok(DayOfWeek::Monday),
            3 => Ok(DayOfWeek::Tuesday),
            4 => Ok(DayOfWeek::Wednesday),
            5 => Ok(DayOfWeek::Thursday),
            6 => Ok(DayOfWeek::Friday),
            7 => Ok(DayOfWeek::Saturday),
            _ => Err(ParseDayOfWeekError(raw.to_string())),
        }
    }
}

impl From<DayOfWeek> for u8 {
    fn from(day: DayOfWeek) -> u8 {
        day as u8
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        // num_days_from_sunday is 0-based with Sunday first
        DayOfWeek::try_from(weekday.num_days_from_sunday() as u8 + 1)
            .expect("chrono weekday maps onto 1..=7")
    }
}

impl FromStr for DayOfWeek {
    type Err = ParseDayOfWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sun" | "sunday" | "su" => Ok(DayOfWeek::Sunday),
            "mon" | "monday" | "m" => Ok(DayOfWeek::Monday),
            "tue" | "tuesday" | "tu" => Ok(DayOfWeek::Tuesday),
            "wed" | "wednesday" | "w" => Ok(DayOfWeek::Wednesday),
            "thu" | "thursday" | "th" => Ok(DayOfWeek::Thursday),
            "fri" | "friday" | "f" => Ok(DayOfWeek::Friday),
            "sat" | "saturday" | "sa" => Ok(DayOfWeek::Saturday),
            _ => Err(ParseDayOfWeekError(s.to_string())),
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Sunday => "Sunday",
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
        };
        write!(f, "{}", name)
    }
}

/// Week ordinal within a month. `Last` means the final occurrence of the
/// matched weekday in the month, whether the month has 4 or 5 of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum WeekOfMonth {
    First = 1,
    Second = 2,
    Third = 3,
    Fourth = 4,
    Last = 5,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid week of month: {0}")]
pub struct ParseWeekOfMonthError(String);

impl TryFrom<u8> for WeekOfMonth {
    type Error = ParseWeekOfMonthError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(WeekOfMonth::First),
            2 => Ok(WeekOfMonth::Second),
            3 => Ok(WeekOfMonth::Third),
            4 => Ok(WeekOfMonth::Fourth),
            5 => Ok(WeekOfMonth::Last),
            _ => Err(ParseWeekOfMonthError(raw.to_string())),
        }
    }
}

impl From<WeekOfMonth> for u8 {
    fn from(week: WeekOfMonth) -> u8 {
        week as u8
    }
}

impl FromStr for WeekOfMonth {
    type Err = ParseWeekOfMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "first" | "1st" | "1" => Ok(WeekOfMonth::First),
            "second" | "2nd" | "2" => Ok(WeekOfMonth::Second),
            "third" | "3rd" | "3" => Ok(WeekOfMonth::Third),
            "fourth" | "4th" | "4" => Ok(WeekOfMonth::Fourth),
            "last" => Ok(WeekOfMonth::Last),
            _ => Err(ParseWeekOfMonthError(s.to_string())),
        }
    }
}

impl fmt::Display for WeekOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WeekOfMonth::First => "first",
            WeekOfMonth::Second => "second",
            WeekOfMonth::Third => "third",
            WeekOfMonth::Fourth => "fourth",
            WeekOfMonth::Last => "last",
        };
        write!(f, "{}", name)
    }
}

/// Day of month selection. `Last` is the final calendar day of the month
/// (28/29/30/31 depending on month and leap year); raw encoding is 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DayOfMonth {
    Numbered(u8),
    Last,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid day of month: {0}")]
pub struct ParseDayOfMonthError(String);

impl TryFrom<u8> for DayOfMonth {
    type Error = ParseDayOfMonthError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(DayOfMonth::Last),
            1..=31 => Ok(DayOfMonth::Numbered(raw)),
            _ => Err(ParseDayOfMonthError(raw.to_string())),
        }
    }
}

impl From<DayOfMonth> for u8 {
    fn from(day: DayOfMonth) -> u8 {
        match day {
            DayOfMonth::Numbered(n) => n,
            DayOfMonth::Last => 0,
        }
    }
}

impl FromStr for DayOfMonth {
    type Err = ParseDayOfMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_lowercase();
        if trimmed == "last" {
            return Ok(DayOfMonth::Last);
        }
        trimmed
            .parse::<u8>()
            .ok()
            .filter(|n| (1..=31).contains(n))
            .map(DayOfMonth::Numbered)
            .ok_or_else(|| ParseDayOfMonthError(s.to_string()))
    }
}

impl fmt::Display for DayOfMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayOfMonth::Numbered(n) => write!(f, "{}", n),
            DayOfMonth::Last => write!(f, "last"),
        }
    }
}

/// Which of a pattern's selection sets drives matching. Derived from the
/// populated sets, but also persisted; the two must agree on decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PatternType {
    DayOfWeek = 1,
    WeekOfMonth = 2,
    DayOfMonth = 3,
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid pattern type: {0}")]
pub struct ParsePatternTypeError(String);

impl TryFrom<u8> for PatternType {
    type Error = ParsePatternTypeError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            1 => Ok(PatternType::DayOfWeek),
            2 => Ok(PatternType::WeekOfMonth),
            3 => Ok(PatternType::DayOfMonth),
            _ => Err(ParsePatternTypeError(raw.to_string())),
        }
    }
}

impl From<PatternType> for u8 {
    fn from(pattern_type: PatternType) -> u8 {
        pattern_type as u8
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatternType::DayOfWeek => "day-of-week",
            PatternType::WeekOfMonth => "week-of-month",
            PatternType::DayOfMonth => "day-of-month",
        };
        write!(f, "{}", name)
    }
}

/// A recurrence rule selecting calendar dates by weekday, week ordinal, or
/// day of month.
///
/// The populated sets decide the pattern's type: `days_of_month` wins over
/// `weeks_of_month`, which wins over `days_of_week`. Week-of-month patterns
/// read both `weeks_of_month` and `days_of_week` ("the second and last
/// Saturday"); the other two types read a single set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPattern {
    pub days_of_week: BTreeSet<DayOfWeek>,
    pub weeks_of_month: BTreeSet<WeekOfMonth>,
    pub days_of_month: BTreeSet<DayOfMonth>,
}

impl DayPattern {
    pub fn new(
        days_of_week: BTreeSet<DayOfWeek>,
        weeks_of_month: BTreeSet<WeekOfMonth>,
        days_of_month: BTreeSet<DayOfMonth>,
    ) -> Self {
        Self {
            days_of_week,
            weeks_of_month,
            days_of_month,
        }
    }

    /// Pattern over weekdays only.
    pub fn weekly(days_of_week: BTreeSet<DayOfWeek>) -> Self {
        Self::new(days_of_week, BTreeSet::new(), BTreeSet::new())
    }

    /// Pattern over week ordinals of selected weekdays.
    pub fn monthly_by_week(
        days_of_week: BTreeSet<DayOfWeek>,
        weeks_of_month: BTreeSet<WeekOfMonth>,
    ) -> Self {
        Self::new(days_of_week, weeks_of_month, BTreeSet::new())
    }

    /// Pattern over days of the month.
    pub fn monthly_by_day(days_of_month: BTreeSet<DayOfMonth>) -> Self {
        Self::new(BTreeSet::new(), BTreeSet::new(), days_of_month)
    }

    pub fn pattern_type(&self) -> PatternType {
        if !self.days_of_month.is_empty() {
            PatternType::DayOfMonth
        } else if !self.weeks_of_month.is_empty() {
            PatternType::WeekOfMonth
        } else {
            PatternType::DayOfWeek
        }
    }

    /// Tests one candidate calendar date against this rule.
    ///
    /// # Arguments
    /// * `day` - 1-based day of month of the candidate date
    /// * `weekday` - the candidate's day of week (Sunday=1 numbering)
    /// * `days_in_month` - total days in the candidate's month (28..=31)
    ///
    /// # Behavior
    /// - day-of-week patterns consult weekday membership only
    /// - day-of-month patterns compare numbered days by exact equality
    ///   (a 31 never matches inside a 30-day month) and satisfy `Last`
    ///   exactly when `day == days_in_month`
    /// - week-of-month patterns require weekday membership, then accept the
    ///   day if its ordinal (`ceil(day / 7)`) is selected or if `Last` is
    ///   selected and the day falls within the month's trailing 7-day
    ///   window. The window check is independent of the ordinal: a day can
    ///   satisfy `Last` without `Fourth` being selected.
    ///
    /// Total over its inputs: out-of-range values coming from a broken
    /// caller produce no match rather than a panic.
    pub fn check_day(&self, day: u32, weekday: DayOfWeek, days_in_month: u32) -> bool {
        match self.pattern_type() {
            PatternType::DayOfWeek => self.days_of_week.contains(&weekday),
            PatternType::DayOfMonth => self.days_of_month.iter().any(|d| match d {
                DayOfMonth::Numbered(n) => u32::from(*n) == day,
                DayOfMonth::Last => day == days_in_month,
            }),
            PatternType::WeekOfMonth => {
                if !self.days_of_week.contains(&weekday) {
                    return false;
                }
                let ordinal = (day + 6) / 7;
                self.weeks_of_month.iter().any(|week| match week {
                    WeekOfMonth::Last => day + 7 > days_in_month,
                    numbered => u32::from(u8::from(*numbered)) == ordinal,
                })
            }
        }
    }
}
