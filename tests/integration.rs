//! Integration tests for the Payroll Run Engine.
//!
//! This test suite covers:
//! - Per-employee failure isolation and run counts
//! - Re-runs superseding earlier calculation records
//! - Infrastructure failures aborting a run
//! - Period status after complete and partial runs
//! - Listener failures never reaching the run
//! - The HTTP surface

use std::collections::HashSet;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use payroll_engine::api::{create_router, AppState, USER_HEADER};
use payroll_engine::calculation::{
    AttendanceLedger, CalculationInputs, ConfigInputSource, HoursWorked, InputSource,
};
use payroll_engine::config::{ConfigLoader, EngineSettings};
use payroll_engine::error::{CalculationError, EngineError, EngineResult};
use payroll_engine::models::{
    CalculationStatus, Employee, EmploymentType, PayrollPeriod, PeriodStatus, RunOutcome,
};
use payroll_engine::notification::{
    AlertSeverity, AuditTrailListener, DispatcherBuilder, EventDispatcher, EventKind,
    ListenerError, PayrollEvent, PayrollListener, PayrollOfficerNotifier, ProgressState,
    RunProgressTracker,
};
use payroll_engine::orchestration::PayrollRunOrchestrator;
use payroll_engine::roster::{RosterSource, StaticRoster};
use payroll_engine::store::{CalculationStore, InMemoryStore};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn employee(id: &str, employment_type: EmploymentType, classification: &str) -> Employee {
    Employee {
        id: id.to_string(),
        name: format!("Employee {}", id),
        employment_type,
        classification_code: classification.to_string(),
        employment_start_date: date("2024-01-15"),
        termination_date: None,
        base_hourly_rate: None,
        tags: vec![],
    }
}

/// emp_002 has a classification with no configured rate.
fn roster() -> Vec<Employee> {
    vec![
        employee("emp_001", EmploymentType::FullTime, "level_1"),
        employee("emp_002", EmploymentType::FullTime, "level_9"),
        employee("emp_003", EmploymentType::Casual, "level_2"),
    ]
}

fn hours(ordinary: &str, overtime: &str) -> HoursWorked {
    HoursWorked {
        ordinary_hours: decimal(ordinary),
        overtime_hours: decimal(overtime),
    }
}

#[derive(Default)]
struct EventLog {
    events: Mutex<Vec<PayrollEvent>>,
}

impl EventLog {
    fn kinds(&self) -> Vec<EventKind> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(PayrollEvent::kind)
            .collect()
    }

    fn count(&self, kind: EventKind) -> usize {
        self.kinds().into_iter().filter(|k| *k == kind).count()
    }

    fn calculated_employees(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                PayrollEvent::EmployeeCalculated { employee, .. } => Some(employee.id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl PayrollListener for EventLog {
    fn name(&self) -> &str {
        "event_log"
    }

    fn handle(&self, event: &PayrollEvent) -> Result<(), ListenerError> {
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

struct PanickingListener;

impl PayrollListener for PanickingListener {
    fn name(&self) -> &str {
        "panicking"
    }

    fn handle(&self, _event: &PayrollEvent) -> Result<(), ListenerError> {
        panic!("notification template missing");
    }
}

struct UnreachableRoster;

impl RosterSource for UnreachableRoster {
    fn employees_for(&self, _period: &PayrollPeriod) -> EngineResult<Vec<Employee>> {
        Err(EngineError::RosterUnavailable {
            message: "HR system timed out".to_string(),
        })
    }
}

struct Engine {
    orchestrator: Arc<PayrollRunOrchestrator>,
    store: Arc<InMemoryStore>,
    ledger: Arc<AttendanceLedger>,
    log: Arc<EventLog>,
    period: PayrollPeriod,
}

fn build_engine(roster: Arc<dyn RosterSource>, events: DispatcherBuilder) -> Engine {
    let loader = ConfigLoader::load("./config/default").expect("Failed to load config");
    let store = Arc::new(InMemoryStore::new());
    let ledger = Arc::new(AttendanceLedger::new());
    let log = Arc::new(EventLog::default());
    let source = ConfigInputSource::new(loader.config().clone(), Arc::clone(&ledger));

    let orchestrator = Arc::new(PayrollRunOrchestrator::new(
        store.clone(),
        store.clone(),
        roster,
        Arc::new(source),
        events.subscribe_all(log.clone()).build().unwrap(),
        loader.settings().clone(),
    ));
    let period = orchestrator
        .create_period("July 2026 (1)", date("2026-07-01"), date("2026-07-14"), "admin")
        .unwrap();

    Engine {
        orchestrator,
        store,
        ledger,
        log,
        period,
    }
}

fn engine_with_attendance() -> Engine {
    let engine = build_engine(Arc::new(StaticRoster::new(roster())), DispatcherBuilder::new());
    for (id, ordinary, overtime) in [
        ("emp_001", "76", "4"),
        ("emp_002", "76", "0"),
        ("emp_003", "38", "0"),
    ] {
        engine
            .ledger
            .record(engine.period.id, id, hours(ordinary, overtime))
            .unwrap();
    }
    engine
}

// =============================================================================
// Run Behaviour
// =============================================================================

#[tokio::test]
async fn test_invalid_employee_does_not_stop_run() {
    let engine = engine_with_attendance();

    let summary = engine
        .orchestrator
        .run_period(engine.period.id, "officer_1")
        .await
        .unwrap();
    engine.orchestrator.events().flush().await;

    assert_eq!(summary.submitted_count, 3);
    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 1);
    assert_eq!(summary.failed_employees, vec!["emp_002".to_string()]);
    assert_eq!(summary.outcome, RunOutcome::PartiallyCompleted);

    let mut calculated = engine.log.calculated_employees();
    calculated.sort();
    assert_eq!(calculated, vec!["emp_001", "emp_003"]);
    assert_eq!(engine.log.count(EventKind::RunCompleted), 1);
    assert_eq!(engine.log.count(EventKind::RunFailed), 0);

    match engine.log.events.lock().unwrap().last().unwrap() {
        PayrollEvent::RunCompleted {
            success_count,
            failure_count,
            user_id,
            ..
        } => {
            assert_eq!(*success_count, 2);
            assert_eq!(*failure_count, 1);
            assert_eq!(user_id, "officer_1");
        }
        other => panic!("expected RunCompleted last, got {:?}", other.kind()),
    }
}

#[tokio::test]
async fn test_calculated_amounts() {
    let engine = engine_with_attendance();
    engine
        .orchestrator
        .run_period(engine.period.id, "officer_1")
        .await
        .unwrap();

    // level_1 at 25.70: 76h ordinary = 1953.20, 4h overtime at 1.5x = 154.20
    let full_time = engine
        .store
        .get_calculation(engine.period.id, "emp_001")
        .unwrap()
        .unwrap();
    let breakdown = full_time.breakdown.unwrap();
    assert_eq!(breakdown.gross, decimal("2107.40"));
    assert_eq!(breakdown.deductions, decimal("421.48"));
    assert_eq!(breakdown.net, decimal("1685.92"));
    assert_eq!(breakdown.pay_lines.len(), 2);

    // level_2 at 27.50 with 25% casual loading: 38h x 34.375 = 1306.25
    let casual = engine
        .store
        .get_calculation(engine.period.id, "emp_003")
        .unwrap()
        .unwrap();
    let breakdown = casual.breakdown.unwrap();
    assert_eq!(breakdown.gross, decimal("1306.25"));
    assert_eq!(breakdown.net, decimal("1045.00"));

    let failed = engine
        .store
        .get_calculation(engine.period.id, "emp_002")
        .unwrap()
        .unwrap();
    assert_eq!(failed.status, CalculationStatus::Failed);
    assert!(failed.breakdown.is_none());
    assert_eq!(failed.error.unwrap().code, "MISSING_RATE");
}

#[tokio::test]
async fn test_rerun_replaces_success_with_failure() {
    let engine = engine_with_attendance();
    let period_id = engine.period.id;
    engine
        .orchestrator
        .run_period(period_id, "officer_1")
        .await
        .unwrap();

    // emp_001 now has impossible hours
    engine
        .ledger
        .record(period_id, "emp_001", hours("-1", "0"))
        .unwrap();
    let summary = engine
        .orchestrator
        .run_period(period_id, "officer_2")
        .await
        .unwrap();
    assert_eq!(summary.success_count, 1);
    assert_eq!(summary.failure_count, 2);

    let records = engine.orchestrator.calculations(period_id).unwrap();
    assert_eq!(records.len(), 3);
    let ids: HashSet<_> = records.iter().map(|r| r.employee_id.as_str()).collect();
    assert_eq!(ids.len(), 3);

    let replaced = records.iter().find(|r| r.employee_id == "emp_001").unwrap();
    assert_eq!(replaced.status, CalculationStatus::Failed);
    assert_eq!(replaced.revision, 2);
    assert_eq!(replaced.calculated_by, "officer_2");
    assert_eq!(replaced.error.as_ref().unwrap().code, "INVALID_HOURS");
}

#[tokio::test]
async fn test_roster_unavailable_fails_run() {
    let engine = build_engine(Arc::new(UnreachableRoster), DispatcherBuilder::new());

    let result = engine
        .orchestrator
        .run_period(engine.period.id, "officer_1")
        .await;
    engine.orchestrator.events().flush().await;

    assert!(matches!(result, Err(EngineError::RosterUnavailable { .. })));
    assert_eq!(
        engine.orchestrator.period(engine.period.id).unwrap().status,
        PeriodStatus::Failed
    );
    assert_eq!(engine.log.count(EventKind::RunFailed), 1);
    assert_eq!(engine.log.count(EventKind::EmployeeCalculated), 0);
    assert_eq!(engine.log.count(EventKind::RunCompleted), 0);

    match engine.log.events.lock().unwrap().last().unwrap() {
        PayrollEvent::RunFailed {
            error_message,
            period,
            ..
        } => {
            assert!(error_message.contains("HR system timed out"));
            assert_eq!(period.status, PeriodStatus::Failed);
        }
        other => panic!("expected RunFailed last, got {:?}", other.kind()),
    }
}

#[tokio::test]
async fn test_period_without_rate_table_fails_run() {
    let engine = engine_with_attendance();
    let early = engine
        .orchestrator
        .create_period("July 2024 (1)", date("2024-07-01"), date("2024-07-14"), "admin")
        .unwrap();

    let result = engine.orchestrator.run_period(early.id, "officer_1").await;

    assert!(matches!(
        result,
        Err(EngineError::RuleSourceUnavailable { .. })
    ));
    assert_eq!(
        engine.orchestrator.period(early.id).unwrap().status,
        PeriodStatus::Failed
    );
}

#[tokio::test]
async fn test_partial_run_stays_processing_until_failures_resolved() {
    let engine = engine_with_attendance();
    engine
        .orchestrator
        .run_period(engine.period.id, "officer_1")
        .await
        .unwrap();
    assert_eq!(
        engine.orchestrator.period(engine.period.id).unwrap().status,
        PeriodStatus::Processing
    );

    // emp_002 keeps its failed record from the first run.
    let employees = vec![
        employee("emp_001", EmploymentType::FullTime, "level_1"),
        employee("emp_003", EmploymentType::Casual, "level_2"),
    ];
    let summary = engine
        .orchestrator
        .run_payroll(engine.period.id, employees, "officer_1")
        .await
        .unwrap();

    assert_eq!(summary.failure_count, 0);
    assert_eq!(summary.outcome, RunOutcome::PartiallyCompleted);
    assert_eq!(summary.period_status, PeriodStatus::Processing);
    assert_eq!(
        engine.orchestrator.period(engine.period.id).unwrap().status,
        PeriodStatus::Processing
    );
    let unresolved = engine
        .orchestrator
        .calculations(engine.period.id)
        .unwrap()
        .into_iter()
        .filter(|record| record.is_failed())
        .map(|record| record.employee_id)
        .collect::<Vec<_>>();
    assert_eq!(unresolved, vec!["emp_002".to_string()]);
}

#[tokio::test]
async fn test_panicking_listener_does_not_affect_run() {
    let audit = Arc::new(AuditTrailListener::new());
    let tracker = Arc::new(RunProgressTracker::new());
    let notifier = Arc::new(PayrollOfficerNotifier::new());
    let events = DispatcherBuilder::new()
        .subscribe_all(Arc::new(PanickingListener))
        .subscribe_all(audit.clone())
        .subscribe_all(tracker.clone())
        .subscribe(EventKind::RunCompleted, notifier.clone())
        .subscribe(EventKind::RunFailed, notifier.clone());
    let engine = build_engine(Arc::new(StaticRoster::new(roster())), events);
    for id in ["emp_001", "emp_002", "emp_003"] {
        engine
            .ledger
            .record(engine.period.id, id, hours("38", "0"))
            .unwrap();
    }

    let summary = engine
        .orchestrator
        .run_period(engine.period.id, "officer_1")
        .await
        .unwrap();
    engine.orchestrator.events().flush().await;

    assert_eq!(summary.success_count, 2);
    assert_eq!(summary.failure_count, 1);
    assert_eq!(
        engine.log.kinds(),
        vec![
            EventKind::PeriodCreated,
            EventKind::RunStarted,
            EventKind::EmployeeCalculated,
            EventKind::EmployeeCalculated,
            EventKind::RunCompleted,
        ]
    );

    assert_eq!(audit.entries().len(), 5);
    let progress = tracker.progress(engine.period.id).unwrap();
    assert_eq!(progress.state, ProgressState::Completed);
    assert_eq!(progress.calculated, 2);
    let alerts = notifier.drain_alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, AlertSeverity::Warning);
}

#[tokio::test]
async fn test_operator_review_flow() {
    let engine = engine_with_attendance();
    let period_id = engine.period.id;
    engine
        .orchestrator
        .run_period(period_id, "officer_1")
        .await
        .unwrap();

    assert!(matches!(
        engine.orchestrator.close_period(period_id, "officer_1"),
        Err(EngineError::UnresolvedCalculations { count: 1, .. })
    ));

    // Give emp_002 an explicit rate and recalculate
    let mut fixed = roster();
    fixed[1].base_hourly_rate = Some(decimal("26.00"));
    let fixed_engine = PayrollRunOrchestrator::new(
        engine.store.clone(),
        engine.store.clone(),
        Arc::new(StaticRoster::new(fixed)),
        Arc::new(ConfigInputSource::new(
            ConfigLoader::load("./config/default").unwrap().config().clone(),
            Arc::clone(&engine.ledger),
        )),
        EventDispatcher::disabled(),
        EngineSettings::default(),
    );
    let record = fixed_engine
        .recalculate_employee(period_id, "emp_002", "officer_1")
        .unwrap();
    assert_eq!(record.status, CalculationStatus::Succeeded);
    assert_eq!(record.breakdown.unwrap().gross, decimal("1976.00"));

    let closed = engine.orchestrator.close_period(period_id, "officer_1").unwrap();
    assert_eq!(closed.status, PeriodStatus::Closed);
    assert_eq!(closed.closed_by.as_deref(), Some("officer_1"));

    let rerun = engine.orchestrator.run_period(period_id, "officer_1").await;
    assert!(matches!(
        rerun,
        Err(EngineError::PeriodNotRunnable {
            status: PeriodStatus::Closed,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_runs_on_same_period() {
    let employees: Vec<Employee> = (1..=200)
        .map(|n| employee(&format!("emp_{:04}", n), EmploymentType::FullTime, "level_1"))
        .collect();
    let engine = build_engine(
        Arc::new(StaticRoster::new(employees.clone())),
        DispatcherBuilder::new(),
    );
    for employee in &employees {
        engine
            .ledger
            .record(engine.period.id, &employee.id, hours("76", "0"))
            .unwrap();
    }

    let first = {
        let orchestrator = Arc::clone(&engine.orchestrator);
        let period_id = engine.period.id;
        tokio::spawn(async move { orchestrator.run_period(period_id, "officer_1").await })
    };
    let second = {
        let orchestrator = Arc::clone(&engine.orchestrator);
        let period_id = engine.period.id;
        tokio::spawn(async move { orchestrator.run_period(period_id, "officer_2").await })
    };
    let results = [first.await.unwrap(), second.await.unwrap()];

    // The loser either overlaps the winner or finds the period already closed
    let succeeded: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(succeeded.len(), 1);
    for result in &results {
        if let Err(err) = result {
            assert!(matches!(
                err,
                EngineError::RunInProgress { .. } | EngineError::PeriodNotRunnable { .. }
            ));
        }
    }
    assert_eq!(succeeded[0].success_count, 200);
    assert_eq!(
        engine.orchestrator.calculations(engine.period.id).unwrap().len(),
        200
    );
}

// =============================================================================
// Count Invariant
// =============================================================================

/// Succeeds for every employee whose id is in `healthy`.
struct MixedSource {
    healthy: HashSet<String>,
}

impl InputSource for MixedSource {
    fn inputs_for(
        &self,
        employee: &Employee,
        _period: &PayrollPeriod,
    ) -> Result<CalculationInputs, CalculationError> {
        if !self.healthy.contains(&employee.id) {
            return Err(CalculationError::MissingAttendance {
                employee_id: employee.id.clone(),
            });
        }
        Ok(CalculationInputs {
            hourly_rate: decimal("30.00"),
            ordinary_hours: decimal("40"),
            overtime_hours: Decimal::ZERO,
            deductions: vec![],
        })
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_success_plus_failure_equals_submitted(
        outcomes in prop::collection::vec(any::<bool>(), 1..40),
        workers in 1usize..8,
    ) {
        let employees: Vec<Employee> = (0..outcomes.len())
            .map(|n| employee(&format!("emp_{:03}", n), EmploymentType::PartTime, "level_1"))
            .collect();
        let healthy: HashSet<String> = employees
            .iter()
            .zip(&outcomes)
            .filter(|(_, ok)| **ok)
            .map(|(employee, _)| employee.id.clone())
            .collect();
        let expected_success = healthy.len();

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .unwrap();
        let (summary, records, calculated) = runtime.block_on(async {
            let store = Arc::new(InMemoryStore::new());
            let log = Arc::new(EventLog::default());
            let orchestrator = PayrollRunOrchestrator::new(
                store.clone(),
                store.clone(),
                Arc::new(StaticRoster::default()),
                Arc::new(MixedSource { healthy }),
                DispatcherBuilder::new().subscribe_all(log.clone()).build().unwrap(),
                EngineSettings { max_concurrency: workers, ..EngineSettings::default() },
            );
            let period = orchestrator
                .create_period("prop", date("2026-07-01"), date("2026-07-14"), "admin")
                .unwrap();
            let summary = orchestrator
                .run_payroll(period.id, employees.clone(), "officer_1")
                .await
                .unwrap();
            orchestrator.events().flush().await;
            let records = orchestrator.calculations(period.id).unwrap();
            (summary, records, log.count(EventKind::EmployeeCalculated))
        });

        prop_assert_eq!(summary.success_count + summary.failure_count, employees.len());
        prop_assert_eq!(summary.success_count, expected_success);
        prop_assert_eq!(calculated, expected_success);
        prop_assert_eq!(records.len(), employees.len());
        prop_assert_eq!(
            records.iter().filter(|r| r.is_failed()).count(),
            summary.failure_count
        );
        let expected_status = if summary.failure_count == 0 {
            PeriodStatus::Closed
        } else {
            PeriodStatus::Processing
        };
        prop_assert_eq!(summary.period_status, expected_status);
    }
}

// =============================================================================
// HTTP API
// =============================================================================

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_HEADER, "officer_1");
    let request = match body {
        Some(body) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn test_api_run_review_and_close() {
    let engine = engine_with_attendance();
    let router = create_router(AppState::from_shared(Arc::clone(&engine.orchestrator)));
    let period_id = engine.period.id;

    let (status, summary) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/runs", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["success_count"], 2);
    assert_eq!(summary["failure_count"], 1);
    assert_eq!(summary["outcome"], "partially_completed");
    assert_eq!(summary["period_status"], "processing");

    let (status, records) = send(
        router.clone(),
        "GET",
        &format!("/periods/{}/calculations", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let records = records.as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[1]["employee_id"], "emp_002");
    assert_eq!(records[1]["status"], "failed");
    assert_eq!(records[1]["error"]["code"], "MISSING_RATE");

    let (status, error) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/close", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "UNRESOLVED_CALCULATIONS");

    let (status, error) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/employees/emp_404/recalculate", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["code"], "EMPLOYEE_NOT_FOUND");

    let (status, record) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/employees/emp_001/recalculate", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(record["revision"], 2);
    assert_eq!(record["status"], "succeeded");
}

#[tokio::test]
async fn test_api_create_list_and_rerun_closed_period() {
    let engine = build_engine(
        Arc::new(StaticRoster::new(vec![employee(
            "emp_001",
            EmploymentType::FullTime,
            "level_3",
        )])),
        DispatcherBuilder::new(),
    );
    let router = create_router(AppState::from_shared(Arc::clone(&engine.orchestrator)));

    let (status, created) = send(
        router.clone(),
        "POST",
        "/periods",
        Some(serde_json::json!({
            "name": "July 2026 (2)",
            "start_date": "2026-07-15",
            "end_date": "2026-07-28"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let period_id = created["id"].as_str().unwrap().to_string();

    let (status, periods) = send(router.clone(), "GET", "/periods", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(periods.as_array().unwrap().len(), 2);
    assert_eq!(periods[0]["id"], period_id.as_str());

    let parsed = uuid::Uuid::parse_str(&period_id).unwrap();
    engine
        .ledger
        .record(parsed, "emp_001", hours("76", "0"))
        .unwrap();

    let (status, summary) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/runs", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["outcome"], "completed");

    let (status, period) = send(router.clone(), "GET", &format!("/periods/{}", period_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(period["status"], "closed");
    assert_eq!(period["closed_by"], "officer_1");

    let (status, error) = send(
        router.clone(),
        "POST",
        &format!("/periods/{}/runs", period_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["code"], "PERIOD_NOT_RUNNABLE");
}

#[tokio::test]
async fn test_api_roster_unavailable_returns_502() {
    let engine = build_engine(Arc::new(UnreachableRoster), DispatcherBuilder::new());
    let router = create_router(AppState::from_shared(Arc::clone(&engine.orchestrator)));

    let (status, error) = send(
        router,
        "POST",
        &format!("/periods/{}/runs", engine.period.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["code"], "ROSTER_UNAVAILABLE");
    assert_eq!(
        engine.orchestrator.period(engine.period.id).unwrap().status,
        PeriodStatus::Failed
    );
}
