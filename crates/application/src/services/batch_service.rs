//! Batch processing service
//!
//! Drives one run over the input directory: discover unprocessed files,
//! let the operator confirm each one, plan two meetings per contract, send the
//! invitations and mark the file as processed.

use std::sync::Arc;

use chrono::Duration;
use domain::{
    CalendarInvite, ContractRecord, MeetingEvent, MeetingKind, MeetingSchedule, RandomSource,
    ScheduleEngine, Timezone,
};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{
        CalendarExportPort, ConfirmationPort, ContractSourcePort, InputUnit, MeetingNotification,
        NotificationPort, ParsedUnit,
    },
};

/// Titles and timing used for every planned meeting
#[derive(Debug, Clone)]
pub struct MeetingSettings {
    pub contract_title: String,
    pub salary_title: String,
    pub timezone: Timezone,
    pub meeting_length: Duration,
}

impl Default for MeetingSettings {
    fn default() -> Self {
        Self {
            contract_title: "Contractbespreking".to_string(),
            salary_title: "Salarisbespreking".to_string(),
            timezone: Timezone::default(),
            meeting_length: Duration::minutes(60),
        }
    }
}

/// What happened to a single file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UnitOutcome {
    /// Confirmed and renamed; skipped rows did not block the rename
    Processed { dispatched: usize, skipped: usize },
    /// Operator declined, file left untouched
    Rejected,
    /// Reading, dispatching or renaming failed, file left untouched
    Failed { reason: String },
}

/// Per-file entry of a batch report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
    pub name: String,
    #[serde(flatten)]
    pub outcome: UnitOutcome,
}

/// Summary of one batch run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub units: Vec<UnitReport>,
    pub invites_built: usize,
    pub notifications_sent: usize,
}

impl BatchReport {
    /// Number of files that were renamed
    pub fn processed(&self) -> usize {
        self.units
            .iter()
            .filter(|u| matches!(u.outcome, UnitOutcome::Processed { .. }))
            .count()
    }

    /// Number of files left for a later run
    pub fn pending(&self) -> usize {
        self.units.len() - self.processed()
    }
}

/// Schedule derived for one row, used for previews
#[derive(Debug)]
pub struct PlannedRow {
    pub line: u64,
    pub employee_name: String,
    pub schedule: Result<MeetingSchedule, ApplicationError>,
}

/// Batch processing service
pub struct BatchService {
    source: Arc<dyn ContractSourcePort>,
    confirmation: Arc<dyn ConfirmationPort>,
    calendar: Arc<dyn CalendarExportPort>,
    notifier: Arc<dyn NotificationPort>,
    engine: ScheduleEngine,
    settings: MeetingSettings,
    random: Mutex<Box<dyn RandomSource + Send>>,
}

impl std::fmt::Debug for BatchService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchService")
            .field("engine", &self.engine)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl BatchService {
    /// Create a new batch service with default rules and settings
    pub fn new(
        source: Arc<dyn ContractSourcePort>,
        confirmation: Arc<dyn ConfirmationPort>,
        calendar: Arc<dyn CalendarExportPort>,
        notifier: Arc<dyn NotificationPort>,
        random: Box<dyn RandomSource + Send>,
    ) -> Self {
        Self {
            source,
            confirmation,
            calendar,
            notifier,
            engine: ScheduleEngine::default(),
            settings: MeetingSettings::default(),
            random: Mutex::new(random),
        }
    }

    /// Replace the schedule engine
    #[must_use]
    pub fn with_engine(mut self, engine: ScheduleEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Replace the meeting settings
    #[must_use]
    pub fn with_settings(mut self, settings: MeetingSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Process every unprocessed file in the input directory
    ///
    /// Only a missing input directory fails the run. Every other problem is
    /// confined to its file or row and shows up in the report.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<BatchReport, ApplicationError> {
        let units = self.source.discover().await?;
        Ok(self.process(units).await)
    }

    /// Process units that were already discovered, in the given order
    #[instrument(skip(self, units), fields(count = units.len()))]
    pub async fn process(&self, units: Vec<InputUnit>) -> BatchReport {
        let mut report = BatchReport::default();

        if units.is_empty() {
            info!("No files to process");
            return report;
        }

        info!(count = units.len(), "Found unprocessed files, start processing");

        for unit in units {
            let outcome = self.process_unit(&unit, &mut report).await;
            report.units.push(UnitReport {
                name: unit.name,
                outcome,
            });
        }

        info!(
            processed = report.processed(),
            pending = report.pending(),
            notifications = report.notifications_sent,
            "Batch finished"
        );
        report
    }

    /// Derive the schedule of every row in one file without sending anything
    #[instrument(skip(self), fields(unit = %unit.name))]
    pub async fn preview(&self, unit: &InputUnit) -> Result<Vec<PlannedRow>, ApplicationError> {
        let parsed = self.source.load(unit).await?;
        Ok(parsed
            .rows
            .into_iter()
            .map(|row| {
                let employee_name = row.fields.first().cloned().unwrap_or_default();
                let schedule = match row.record {
                    Ok(record) => self.plan(&record),
                    Err(e) => Err(e.into()),
                };
                PlannedRow {
                    line: row.line,
                    employee_name,
                    schedule,
                }
            })
            .collect())
    }

    /// Check that invitations can be delivered
    pub async fn delivery_available(&self) -> bool {
        self.notifier.is_available().await
    }

    async fn process_unit(&self, unit: &InputUnit, report: &mut BatchReport) -> UnitOutcome {
        info!(unit = %unit.name, "Current file");

        let parsed = match self.source.load(unit).await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(unit = %unit.name, error = %e, "Could not read file, skipping");
                return UnitOutcome::Failed {
                    reason: e.to_string(),
                };
            },
        };

        debug!(
            unit = %unit.name,
            delimiter = %parsed.delimiter,
            rows = parsed.rows.len(),
            "File loaded"
        );

        match self.confirmation.confirm(&parsed).await {
            Ok(true) => {},
            Ok(false) => {
                info!(unit = %unit.name, "File rejected, please check the file");
                return UnitOutcome::Rejected;
            },
            Err(e) => {
                warn!(unit = %unit.name, error = %e, "Confirmation failed");
                return UnitOutcome::Failed {
                    reason: e.to_string(),
                };
            },
        }

        let (dispatched, skipped) = match self.dispatch_unit(&parsed, report).await {
            Ok(counts) => counts,
            Err(e) => {
                warn!(unit = %unit.name, error = %e, "Dispatch failed, file stays unprocessed");
                return UnitOutcome::Failed {
                    reason: e.to_string(),
                };
            },
        };

        if let Err(e) = self.source.mark_processed(unit).await {
            warn!(unit = %unit.name, error = %e, "Could not mark file as processed");
            return UnitOutcome::Failed {
                reason: e.to_string(),
            };
        }

        info!(unit = %unit.name, dispatched, skipped, "File processed");
        UnitOutcome::Processed {
            dispatched,
            skipped,
        }
    }

    async fn dispatch_unit(
        &self,
        parsed: &ParsedUnit,
        report: &mut BatchReport,
    ) -> Result<(usize, usize), ApplicationError> {
        let mut dispatched = 0;
        let mut skipped = 0;

        for row in &parsed.rows {
            let record = match &row.record {
                Ok(record) => record,
                Err(e) if e.is_row_local() => {
                    warn!(line = row.line, error = %e, "Skipping row");
                    skipped += 1;
                    continue;
                },
                Err(e) => {
                    return Err(ApplicationError::DispatchFailure(format!(
                        "line {}: {e}",
                        row.line
                    )));
                },
            };

            match self.dispatch_record(record, report).await {
                Ok(()) => dispatched += 1,
                Err(e) if e.is_row_local() => {
                    warn!(line = row.line, error = %e, "Skipping row");
                    skipped += 1;
                },
                Err(e) => return Err(e),
            }
        }

        Ok((dispatched, skipped))
    }

    async fn dispatch_record(
        &self,
        record: &ContractRecord,
        report: &mut BatchReport,
    ) -> Result<(), ApplicationError> {
        let schedule = self.plan(record)?;

        let invites = [
            (
                MeetingKind::ContractReview,
                schedule.contract_meeting,
                &self.settings.contract_title,
            ),
            (
                MeetingKind::SalaryReview,
                schedule.salary_meeting,
                &self.settings.salary_title,
            ),
        ]
        .map(|(kind, starts_at, title)| {
            let meeting = MeetingEvent::new(
                kind,
                starts_at,
                record.employee_email.clone(),
                record.hr_email.clone(),
                title.as_str(),
            );
            CalendarInvite::build(&meeting, self.settings.timezone, self.settings.meeting_length)
        });
        report.invites_built += invites.len();

        let attachments = invites
            .iter()
            .map(|invite| self.calendar.export(invite))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApplicationError::into_dispatch_failure)?;

        let notification = MeetingNotification {
            employee_name: record.employee_name.clone(),
            to: record.employee_email.clone(),
            cc: record.hr_email.clone(),
            contract_title: self.settings.contract_title.clone(),
            contract_meeting: schedule.contract_meeting,
            salary_title: self.settings.salary_title.clone(),
            salary_meeting: schedule.salary_meeting,
            attachments,
        };

        self.notifier
            .notify(&notification)
            .await
            .map_err(ApplicationError::into_dispatch_failure)?;
        report.notifications_sent += 1;

        debug!(
            employee = %record.employee_name,
            contract_meeting = %schedule.contract_meeting,
            salary_meeting = %schedule.salary_meeting,
            "Invitation sent"
        );
        Ok(())
    }

    fn plan(&self, record: &ContractRecord) -> Result<MeetingSchedule, ApplicationError> {
        let mut random = self.random.lock();
        self.engine
            .derive_for(record, &mut **random)
            .map_err(|e| ApplicationError::InvalidDate(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, NaiveDateTime};
    use domain::{Delimiter, DomainError};

    use super::*;
    use crate::ports::{
        CalendarAttachment, MockCalendarExportPort, MockConfirmationPort, MockContractSourcePort,
        MockNotificationPort, ParsedRow,
    };

    /// Always draws the lowest value
    struct Lowest;

    impl RandomSource for Lowest {
        fn next_in_range(&mut self, low: u32, _high: u32) -> u32 {
            low
        }
    }

    /// Replays fixed draws, then falls back to the lowest value
    struct Scripted(Vec<u32>);

    impl RandomSource for Scripted {
        fn next_in_range(&mut self, low: u32, _high: u32) -> u32 {
            if self.0.is_empty() { low } else { self.0.remove(0) }
        }
    }

    fn unit(name: &str) -> InputUnit {
        InputUnit::new(name, PathBuf::from("files/csv").join(name))
    }

    fn fields(name: &str, start: &str, months: &str) -> Vec<String> {
        let email = format!("{}@example.nl", name.to_lowercase());
        vec![
            name.to_string(),
            email,
            "hr@bedrijf.nl".to_string(),
            start.to_string(),
            months.to_string(),
        ]
    }

    fn parsed(unit: &InputUnit, rows: Vec<Vec<String>>) -> ParsedUnit {
        ParsedUnit {
            unit: unit.clone(),
            delimiter: Delimiter::Comma,
            header: Vec::new(),
            rows: rows
                .into_iter()
                .zip(2u64..)
                .map(|(fields, line)| ParsedRow::from_fields(line, fields))
                .collect(),
        }
    }

    fn attachment(invite: &CalendarInvite) -> CalendarAttachment {
        CalendarAttachment {
            filename: invite.attachment_filename(),
            content_type: "text/calendar".to_string(),
            data: invite.uid.clone().into_bytes(),
        }
    }

    fn source_with(units: Vec<(&'static str, Vec<Vec<String>>)>) -> MockContractSourcePort {
        let names: Vec<InputUnit> = units.iter().map(|(name, _)| unit(name)).collect();
        let mut source = MockContractSourcePort::new();
        source.expect_discover().returning(move || Ok(names.clone()));
        source.expect_load().returning(move |u| {
            let rows = units
                .iter()
                .find(|(name, _)| *name == u.name)
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default();
            Ok(parsed(u, rows))
        });
        source
    }

    fn accept_all() -> MockConfirmationPort {
        let mut confirmation = MockConfirmationPort::new();
        confirmation.expect_confirm().returning(|_| Ok(true));
        confirmation
    }

    fn exporter() -> MockCalendarExportPort {
        let mut calendar = MockCalendarExportPort::new();
        calendar
            .expect_export()
            .returning(|invite| Ok(attachment(invite)));
        calendar
    }

    fn service(
        source: MockContractSourcePort,
        confirmation: MockConfirmationPort,
        calendar: MockCalendarExportPort,
        notifier: MockNotificationPort,
    ) -> BatchService {
        BatchService::new(
            Arc::new(source),
            Arc::new(confirmation),
            Arc::new(calendar),
            Arc::new(notifier),
            Box::new(Lowest),
        )
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn empty_directory_does_nothing() {
        let mut source = MockContractSourcePort::new();
        source.expect_discover().returning(|| Ok(Vec::new()));
        source.expect_load().never();
        source.expect_mark_processed().never();

        let mut confirmation = MockConfirmationPort::new();
        confirmation.expect_confirm().never();
        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().never();

        let report = service(source, confirmation, MockCalendarExportPort::new(), notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(report, BatchReport::default());
    }

    #[tokio::test]
    async fn missing_directory_fails_the_run() {
        let mut source = MockContractSourcePort::new();
        source
            .expect_discover()
            .returning(|| Err(ApplicationError::Configuration("files/csv not found".into())));

        let result = service(
            source,
            MockConfirmationPort::new(),
            MockCalendarExportPort::new(),
            MockNotificationPort::new(),
        )
        .run()
        .await;

        assert!(matches!(result, Err(ApplicationError::Configuration(_))));
    }

    #[tokio::test]
    async fn confirmed_unit_sends_one_message_per_row() {
        let mut source = source_with(vec![(
            "contracts.csv",
            vec![
                fields("Jan", "01-01-2023", "12"),
                fields("Piet", "15-03-2023", "6"),
                fields("Klaas", "31-01-2024", "1"),
            ],
        )]);
        source
            .expect_mark_processed()
            .withf(|u| u.name == "contracts.csv")
            .times(1)
            .returning(|_| Ok(()));

        let mut calendar = MockCalendarExportPort::new();
        calendar
            .expect_export()
            .times(6)
            .returning(|invite| Ok(attachment(invite)));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| n.attachments.len() == 2 && n.cc.as_str() == "hr@bedrijf.nl")
            .times(3)
            .returning(|_| Ok(()));

        let report = service(source, accept_all(), calendar, notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(report.invites_built, 6);
        assert_eq!(report.notifications_sent, 3);
        assert_eq!(
            report.units,
            vec![UnitReport {
                name: "contracts.csv".to_string(),
                outcome: UnitOutcome::Processed {
                    dispatched: 3,
                    skipped: 0
                },
            }]
        );
    }

    #[tokio::test]
    async fn scripted_draws_pick_expected_slots() {
        let mut source = source_with(vec![("a.csv", vec![fields("Jan", "01-01-2023", "12")])]);
        source.expect_mark_processed().returning(|_| Ok(()));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.employee_name == "Jan"
                    && n.to.as_str() == "jan@example.nl"
                    && n.contract_meeting == at(2023, 12, 4, 13)
                    && n.salary_meeting == at(2024, 1, 2, 17)
                    && n.attachments[0].filename == "Contractbespreking.ics"
                    && n.attachments[1].filename == "Salarisbespreking.ics"
            })
            .times(1)
            .returning(|_| Ok(()));

        let service = BatchService::new(
            Arc::new(source),
            Arc::new(accept_all()),
            Arc::new(exporter()),
            Arc::new(notifier),
            Box::new(Scripted(vec![9, 10, 11, 12, 13, 4, 17, 16, 15, 14, 9, 0])),
        );

        let report = service.run().await.unwrap();
        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn rejected_unit_is_left_alone_and_batch_continues() {
        let mut source = source_with(vec![
            ("a.csv", vec![fields("Jan", "01-01-2023", "12")]),
            ("b.csv", vec![fields("Piet", "01-02-2023", "12")]),
        ]);
        source
            .expect_mark_processed()
            .withf(|u| u.name == "b.csv")
            .times(1)
            .returning(|_| Ok(()));

        let mut confirmation = MockConfirmationPort::new();
        confirmation
            .expect_confirm()
            .returning(|parsed| Ok(parsed.unit.name == "b.csv"));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| n.employee_name == "Piet")
            .times(1)
            .returning(|_| Ok(()));

        let report = service(source, confirmation, exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(report.units[0].outcome, UnitOutcome::Rejected);
        assert_eq!(report.processed(), 1);
        assert_eq!(report.pending(), 1);
    }

    #[tokio::test]
    async fn dispatch_failure_keeps_unit_unprocessed() {
        let mut source = source_with(vec![
            (
                "a.csv",
                vec![
                    fields("Jan", "01-01-2023", "12"),
                    fields("Piet", "01-02-2023", "12"),
                ],
            ),
            ("b.csv", vec![fields("Klaas", "01-03-2023", "12")]),
        ]);
        source
            .expect_mark_processed()
            .withf(|u| u.name == "b.csv")
            .times(1)
            .returning(|_| Ok(()));

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 1 {
                Err(ApplicationError::DispatchFailure("connection reset".into()))
            } else {
                Ok(())
            }
        });

        let report = service(source, accept_all(), exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            report.units[0].outcome,
            UnitOutcome::Failed {
                reason: "Dispatch failed: connection reset".to_string()
            }
        );
        assert_eq!(report.processed(), 1);
        assert_eq!(report.notifications_sent, 2);
    }

    #[tokio::test]
    async fn export_error_is_a_dispatch_failure() {
        let mut source = source_with(vec![("a.csv", vec![fields("Jan", "01-01-2023", "12")])]);
        source.expect_mark_processed().never();

        let mut calendar = MockCalendarExportPort::new();
        calendar
            .expect_export()
            .returning(|_| Err(ApplicationError::Internal("serializer".into())));
        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().never();

        let report = service(source, accept_all(), calendar, notifier)
            .run()
            .await
            .unwrap();

        assert!(matches!(
            &report.units[0].outcome,
            UnitOutcome::Failed { reason } if reason.starts_with("Dispatch failed")
        ));
    }

    #[tokio::test]
    async fn invalid_rows_are_skipped_and_unit_still_marked() {
        let mut source = source_with(vec![(
            "a.csv",
            vec![
                fields("Jan", "2023-01-01", "12"),
                fields("Piet", "01-02-2023", "twelve"),
                fields("Klaas", "01-03-2023", "12"),
            ],
        )]);
        source
            .expect_mark_processed()
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| n.employee_name == "Klaas")
            .times(1)
            .returning(|_| Ok(()));

        let report = service(source, accept_all(), exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(
            report.units[0].outcome,
            UnitOutcome::Processed {
                dispatched: 1,
                skipped: 2
            }
        );
    }

    #[tokio::test]
    async fn undeliverable_address_keeps_unit_unprocessed() {
        let mut bad = fields("Piet", "01-02-2023", "12");
        bad[1] = "piet.example.nl".to_string();
        let mut source = source_with(vec![
            (
                "a.csv",
                vec![
                    fields("Jan", "01-01-2023", "12"),
                    bad,
                    fields("Klaas", "01-03-2023", "12"),
                ],
            ),
            ("b.csv", vec![fields("Kees", "01-04-2023", "12")]),
        ]);
        source
            .expect_mark_processed()
            .withf(|u| u.name == "b.csv")
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| n.employee_name == "Jan" || n.employee_name == "Kees")
            .times(2)
            .returning(|_| Ok(()));

        let report = service(source, accept_all(), exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert!(matches!(
            &report.units[0].outcome,
            UnitOutcome::Failed { reason }
                if reason.starts_with("Dispatch failed: line 3")
                    && reason.contains("piet.example.nl")
        ));
        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn malformed_unit_fails_and_batch_continues() {
        let mut source = MockContractSourcePort::new();
        source
            .expect_discover()
            .returning(|| Ok(vec![unit("broken.csv"), unit("good.csv")]));
        source.expect_load().returning(|u| {
            if u.name == "broken.csv" {
                Err(ApplicationError::MalformedInput(
                    "broken.csv: no delimiter found".into(),
                ))
            } else {
                Ok(parsed(u, vec![fields("Jan", "01-01-2023", "12")]))
            }
        });
        source
            .expect_mark_processed()
            .withf(|u| u.name == "good.csv")
            .times(1)
            .returning(|_| Ok(()));

        let mut confirmation = MockConfirmationPort::new();
        confirmation
            .expect_confirm()
            .withf(|p| p.unit.name == "good.csv")
            .times(1)
            .returning(|_| Ok(true));

        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let report = service(source, confirmation, exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert!(matches!(report.units[0].outcome, UnitOutcome::Failed { .. }));
        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn rename_failure_is_reported() {
        let mut source = source_with(vec![("a.csv", vec![fields("Jan", "01-01-2023", "12")])]);
        source
            .expect_mark_processed()
            .returning(|_| Err(ApplicationError::Internal("permission denied".into())));

        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().returning(|_| Ok(()));

        let report = service(source, accept_all(), exporter(), notifier)
            .run()
            .await
            .unwrap();

        assert_eq!(report.processed(), 0);
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test]
    async fn custom_settings_change_titles() {
        let mut source = source_with(vec![("a.csv", vec![fields("Jan", "01-01-2023", "12")])]);
        source.expect_mark_processed().returning(|_| Ok(()));

        let mut notifier = MockNotificationPort::new();
        notifier
            .expect_notify()
            .withf(|n| {
                n.attachments[0].filename == "Contract review.ics"
                    && n.contract_title == "Contract review"
                    && n.salary_title == "Salary review"
            })
            .times(1)
            .returning(|_| Ok(()));

        let settings = MeetingSettings {
            contract_title: "Contract review".to_string(),
            salary_title: "Salary review".to_string(),
            ..MeetingSettings::default()
        };
        let report = service(source, accept_all(), exporter(), notifier)
            .with_settings(settings)
            .run()
            .await
            .unwrap();

        assert_eq!(report.processed(), 1);
    }

    #[tokio::test]
    async fn processing_discovered_units_does_not_scan_again() {
        let mut source = MockContractSourcePort::new();
        source.expect_discover().never();
        source.expect_load().returning(|u| {
            Ok(parsed(u, vec![fields("Jan", "01-01-2023", "12")]))
        });
        source
            .expect_mark_processed()
            .times(1)
            .returning(|_| Ok(()));

        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().times(1).returning(|_| Ok(()));

        let report = service(source, accept_all(), exporter(), notifier)
            .process(vec![unit("a.csv")])
            .await;

        assert_eq!(report.processed(), 1);
        assert_eq!(report.notifications_sent, 1);
    }

    #[tokio::test]
    async fn preview_plans_without_sending() {
        let mut source = source_with(vec![(
            "a.csv",
            vec![
                fields("Jan", "01-01-2023", "12"),
                fields("Piet", "31-02-2023", "12"),
            ],
        )]);
        source.expect_mark_processed().never();
        let mut notifier = MockNotificationPort::new();
        notifier.expect_notify().never();

        let rows = service(source, MockConfirmationPort::new(), exporter(), notifier)
            .preview(&unit("a.csv"))
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].employee_name, "Jan");
        let schedule = rows[0].schedule.as_ref().unwrap();
        assert_eq!(
            schedule.contract_end,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(rows[1].line, 3);
        assert!(matches!(
            rows[1].schedule,
            Err(ApplicationError::Domain(DomainError::InvalidDate(_)))
        ));
    }

    #[tokio::test]
    async fn delivery_check_asks_notifier() {
        let mut notifier = MockNotificationPort::new();
        notifier.expect_is_available().returning(|| false);

        let service = service(
            MockContractSourcePort::new(),
            MockConfirmationPort::new(),
            MockCalendarExportPort::new(),
            notifier,
        );
        assert!(!service.delivery_available().await);
    }

    #[test]
    fn report_serializes_outcome_tag() {
        let report = UnitReport {
            name: "a.csv".to_string(),
            outcome: UnitOutcome::Rejected,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["name"], "a.csv");
        assert_eq!(json["outcome"], "rejected");
    }
}
