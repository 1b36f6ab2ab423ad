//! Meeting schedule derivation
//!
//! Turns a contract start date and duration into two meeting slots:
//!
//! 1. contract end = start + duration (calendar months)
//! 2. contract review anchor = contract end - review lead (5 weeks)
//! 3. contract meeting = next available weekday after that anchor
//! 4. salary anchor = start + 12 months
//! 5. salary meeting = next available weekday after that anchor
//!
//! Month addition uses chrono's `checked_add_months`: when the target month
//! is shorter, the day is clamped to its last day (31-01-2024 + 1 month is
//! 29-02-2024).
//!
//! "Next available weekday" collects the first five Monday–Friday dates that
//! follow the anchor, gives each one a random whole hour inside the working
//! window and then picks one of the five at random. All randomness comes from
//! a caller-supplied [`RandomSource`], so a scripted source makes the result
//! fully deterministic.

use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::{entities::ContractRecord, errors::DomainError};

/// Number of weekday candidates collected after an anchor date
pub const CANDIDATE_DAYS: usize = 5;

/// Source of uniformly distributed integers
pub trait RandomSource {
    /// Next value in `low..=high`
    fn next_in_range(&mut self, low: u32, high: u32) -> u32;
}

/// Tunable offsets and working hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRules {
    /// How long before the contract end the review is anchored
    pub review_lead_weeks: u32,
    /// Months after the contract start for the salary review
    pub salary_review_months: u32,
    /// Earliest meeting hour (inclusive)
    pub first_hour: u32,
    /// Latest meeting hour (inclusive)
    pub last_hour: u32,
}

impl Default for ScheduleRules {
    fn default() -> Self {
        Self {
            review_lead_weeks: 5,
            salary_review_months: 12,
            first_hour: 9,
            last_hour: 17,
        }
    }
}

impl ScheduleRules {
    /// Reject hour windows that cannot produce a valid time of day
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.first_hour > self.last_hour || self.last_hour > 23 {
            return Err(DomainError::ValidationError(format!(
                "meeting hours {}..={} must be an increasing range within 0..=23",
                self.first_hour, self.last_hour
            )));
        }
        Ok(())
    }
}

/// Dates derived for one contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingSchedule {
    pub contract_end: NaiveDate,
    pub contract_review_anchor: NaiveDate,
    pub contract_meeting: NaiveDateTime,
    pub salary_anchor: NaiveDate,
    pub salary_meeting: NaiveDateTime,
}

/// Pure schedule calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleEngine {
    rules: ScheduleRules,
}

impl ScheduleEngine {
    pub const fn new(rules: ScheduleRules) -> Self {
        Self { rules }
    }

    pub const fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    /// Derive both meetings for a contract record
    pub fn derive_for<R>(
        &self,
        record: &ContractRecord,
        rng: &mut R,
    ) -> Result<MeetingSchedule, DomainError>
    where
        R: RandomSource + ?Sized,
    {
        self.derive(record.start_date, record.duration_months, rng)
    }

    /// Derive both meetings from a start date and a duration in months
    ///
    /// The contract meeting is drawn before the salary meeting.
    pub fn derive<R>(
        &self,
        start: NaiveDate,
        duration_months: u32,
        rng: &mut R,
    ) -> Result<MeetingSchedule, DomainError>
    where
        R: RandomSource + ?Sized,
    {
        let contract_end = add_months(start, duration_months)?;
        let lead_days = u64::from(self.rules.review_lead_weeks) * 7;
        let contract_review_anchor = contract_end
            .checked_sub_days(Days::new(lead_days))
            .ok_or_else(|| {
                DomainError::InvalidDate(format!("{contract_end} minus {lead_days} days"))
            })?;
        let contract_meeting = self.next_available_weekday(contract_review_anchor, rng)?;

        let salary_anchor = add_months(start, self.rules.salary_review_months)?;
        let salary_meeting = self.next_available_weekday(salary_anchor, rng)?;

        Ok(MeetingSchedule {
            contract_end,
            contract_review_anchor,
            contract_meeting,
            salary_anchor,
            salary_meeting,
        })
    }

    /// Pick a weekday slot within the working week that follows `anchor`
    pub fn next_available_weekday<R>(
        &self,
        anchor: NaiveDate,
        rng: &mut R,
    ) -> Result<NaiveDateTime, DomainError>
    where
        R: RandomSource + ?Sized,
    {
        let candidates = self.weekday_candidates(anchor, rng)?;
        Self::pick(&candidates, rng)
    }

    /// The first [`CANDIDATE_DAYS`] weekdays strictly after `anchor`, each at
    /// a random hour of the working window
    pub fn weekday_candidates<R>(
        &self,
        anchor: NaiveDate,
        rng: &mut R,
    ) -> Result<[NaiveDateTime; CANDIDATE_DAYS], DomainError>
    where
        R: RandomSource + ?Sized,
    {
        let mut candidates = Vec::with_capacity(CANDIDATE_DAYS);
        let mut date = anchor;

        while candidates.len() < CANDIDATE_DAYS {
            date = date
                .succ_opt()
                .ok_or_else(|| DomainError::InvalidDate(format!("no day after {date}")))?;

            if date.weekday().number_from_monday() <= 5 {
                let hour = rng.next_in_range(self.rules.first_hour, self.rules.last_hour);
                candidates.push(date.and_time(self.meeting_time(hour)?));
            }
        }

        candidates
            .try_into()
            .map_err(|_| DomainError::InvalidDate(format!("no weekdays after {anchor}")))
    }

    /// Choose one candidate uniformly
    pub fn pick<R>(
        candidates: &[NaiveDateTime; CANDIDATE_DAYS],
        rng: &mut R,
    ) -> Result<NaiveDateTime, DomainError>
    where
        R: RandomSource + ?Sized,
    {
        #[allow(clippy::cast_possible_truncation)]
        let last = (CANDIDATE_DAYS - 1) as u32;
        let index = rng.next_in_range(0, last) as usize;
        candidates.get(index).copied().ok_or_else(|| {
            DomainError::InvalidDate(format!("candidate index {index} out of range"))
        })
    }

    fn meeting_time(&self, hour: u32) -> Result<NaiveTime, DomainError> {
        if !(self.rules.first_hour..=self.rules.last_hour).contains(&hour) {
            return Err(DomainError::InvalidDate(format!(
                "meeting hour {hour} outside {}..={}",
                self.rules.first_hour, self.rules.last_hour
            )));
        }
        NaiveTime::from_hms_opt(hour, 0, 0)
            .ok_or_else(|| DomainError::InvalidDate(format!("invalid hour {hour}")))
    }
}

/// Calendar month addition with end-of-month clamping
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate, DomainError> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| DomainError::InvalidDate(format!("{date} plus {months} months")))
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use chrono::Weekday;

    use super::*;

    /// Replays a fixed sequence of values
    struct Scripted(VecDeque<u32>);

    impl Scripted {
        fn new(values: &[u32]) -> Self {
            Self(values.iter().copied().collect())
        }
    }

    impl RandomSource for Scripted {
        fn next_in_range(&mut self, _low: u32, _high: u32) -> u32 {
            self.0.pop_front().unwrap_or_else(|| unreachable!("script exhausted"))
        }
    }

    /// Always returns the lower bound
    struct Lowest;

    impl RandomSource for Lowest {
        fn next_in_range(&mut self, low: u32, _high: u32) -> u32 {
            low
        }
    }

    fn date(day: u32, month: u32, year: i32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn at(day: NaiveDate, hour: u32) -> NaiveDateTime {
        day.and_hms_opt(hour, 0, 0).unwrap()
    }

    #[test]
    fn one_year_contract_scenario() {
        let engine = ScheduleEngine::default();
        // contract: five hours then index 4; salary: five hours then index 0
        let mut rng = Scripted::new(&[9, 10, 11, 12, 13, 4, 17, 16, 15, 14, 9, 0]);

        let schedule = engine.derive(date(1, 1, 2023), 12, &mut rng).unwrap();

        assert_eq!(schedule.contract_end, date(1, 1, 2024));
        assert_eq!(schedule.contract_review_anchor, date(27, 11, 2023));
        assert_eq!(schedule.salary_anchor, date(1, 1, 2024));
        // Tue 28, Wed 29, Thu 30, Fri 1 Dec, Mon 4 Dec
        assert_eq!(schedule.contract_meeting, at(date(4, 12, 2023), 13));
        // Tue 2 Jan is the first weekday after the Monday anchor
        assert_eq!(schedule.salary_meeting, at(date(2, 1, 2024), 17));
    }

    #[test]
    fn month_addition_clamps_to_end_of_month() {
        assert_eq!(add_months(date(31, 1, 2024), 1).unwrap(), date(29, 2, 2024));
        assert_eq!(add_months(date(31, 1, 2023), 1).unwrap(), date(28, 2, 2023));
        assert_eq!(add_months(date(31, 8, 2023), 6).unwrap(), date(29, 2, 2024));
        assert_eq!(add_months(date(15, 3, 2023), 0).unwrap(), date(15, 3, 2023));
    }

    #[test]
    fn month_addition_overflow_is_invalid_date() {
        let err = add_months(NaiveDate::MAX, 1).unwrap_err();
        assert!(matches!(err, DomainError::InvalidDate(_)));
    }

    #[test]
    fn candidates_skip_anchor_and_weekend() {
        let engine = ScheduleEngine::default();
        // Friday anchor
        let candidates = engine
            .weekday_candidates(date(1, 12, 2023), &mut Lowest)
            .unwrap();

        let days: Vec<NaiveDate> = candidates.iter().map(NaiveDateTime::date).collect();
        assert_eq!(
            days,
            vec![
                date(4, 12, 2023),
                date(5, 12, 2023),
                date(6, 12, 2023),
                date(7, 12, 2023),
                date(8, 12, 2023),
            ]
        );
        assert!(candidates.iter().all(|c| c.format("%H:%M").to_string() == "09:00"));
    }

    #[test]
    fn weekday_anchor_is_never_a_candidate() {
        let engine = ScheduleEngine::default();
        // Wednesday anchor
        let candidates = engine
            .weekday_candidates(date(6, 12, 2023), &mut Lowest)
            .unwrap();
        assert_eq!(candidates[0].date(), date(7, 12, 2023));
        assert_eq!(candidates[4].date(), date(13, 12, 2023));
    }

    #[test]
    fn saturday_anchor_starts_on_monday() {
        let engine = ScheduleEngine::default();
        let candidates = engine
            .weekday_candidates(date(2, 12, 2023), &mut Lowest)
            .unwrap();
        assert_eq!(candidates[0].date().weekday(), Weekday::Mon);
        assert_eq!(candidates[4].date().weekday(), Weekday::Fri);
    }

    #[test]
    fn hours_are_assigned_in_date_order() {
        let engine = ScheduleEngine::default();
        let mut rng = Scripted::new(&[9, 11, 13, 15, 17]);
        let candidates = engine.weekday_candidates(date(4, 12, 2023), &mut rng).unwrap();

        let hours: Vec<String> = candidates
            .iter()
            .map(|c| c.format("%H").to_string())
            .collect();
        assert_eq!(hours, vec!["09", "11", "13", "15", "17"]);
    }

    #[test]
    fn pick_returns_indexed_candidate() {
        let engine = ScheduleEngine::default();
        let candidates = engine
            .weekday_candidates(date(4, 12, 2023), &mut Lowest)
            .unwrap();

        for index in 0..5 {
            let picked = ScheduleEngine::pick(&candidates, &mut Scripted::new(&[index])).unwrap();
            assert_eq!(picked, candidates[index as usize]);
        }
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let engine = ScheduleEngine::default();
        let candidates = engine
            .weekday_candidates(date(4, 12, 2023), &mut Lowest)
            .unwrap();
        assert!(ScheduleEngine::pick(&candidates, &mut Scripted::new(&[5])).is_err());
    }

    #[test]
    fn out_of_window_hour_is_an_error() {
        let engine = ScheduleEngine::default();
        let mut rng = Scripted::new(&[8]);
        let err = engine
            .weekday_candidates(date(4, 12, 2023), &mut rng)
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidDate(_)));
    }

    #[test]
    fn custom_rules_change_offsets() {
        let engine = ScheduleEngine::new(ScheduleRules {
            review_lead_weeks: 2,
            salary_review_months: 6,
            first_hour: 10,
            last_hour: 10,
        });

        let schedule = engine.derive(date(1, 1, 2023), 12, &mut Lowest).unwrap();
        assert_eq!(schedule.contract_review_anchor, date(18, 12, 2023));
        assert_eq!(schedule.salary_anchor, date(1, 7, 2023));
        assert_eq!(schedule.contract_meeting, at(date(19, 12, 2023), 10));
        // 1 July 2023 is a Saturday
        assert_eq!(schedule.salary_meeting, at(date(3, 7, 2023), 10));
    }

    #[test]
    fn zero_duration_anchors_before_start() {
        let engine = ScheduleEngine::default();
        let schedule = engine.derive(date(1, 3, 2023), 0, &mut Lowest).unwrap();
        assert_eq!(schedule.contract_end, date(1, 3, 2023));
        assert_eq!(schedule.contract_review_anchor, date(25, 1, 2023));
    }

    #[test]
    fn rules_validation() {
        assert!(ScheduleRules::default().validate().is_ok());

        let inverted = ScheduleRules {
            first_hour: 18,
            last_hour: 9,
            ..ScheduleRules::default()
        };
        assert!(inverted.validate().is_err());

        let past_midnight = ScheduleRules {
            last_hour: 24,
            ..ScheduleRules::default()
        };
        assert!(past_midnight.validate().is_err());
    }
}
