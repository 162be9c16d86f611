//! Changeset admission and precondition tests.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use changeguard::core::Table;
use changeguard::{
    accepts_all, ChangeError, ChangeSet, ChangeSetFilter, ChangeSetId, ContextFilter,
    CustomPreconditionWrapper, DbmsFilter, DialectCatalog, ExecutedAfterFilter,
    MemoryIntrospector, PreconditionRegistry, RanChangeSet, SnapshotProvider, TriggerConvention,
    DEFAULT_TABLE_PREFIX,
};

const CHANGELOG: &str = "path/changelog";

fn ran(id: &str, date_executed: Option<DateTime<Utc>>, order: u32) -> RanChangeSet {
    RanChangeSet {
        identity: ChangeSetId::new(id, "testAuthor", CHANGELOG),
        checksum: "12345".to_string(),
        date_executed,
        order_executed: order,
    }
}

fn changeset(id: &str) -> ChangeSet {
    ChangeSet::new(id, "testAuthor", CHANGELOG)
}

// =============================================================================
// Executed-after filter
// =============================================================================

#[test]
fn test_ledger_with_null_timestamp() {
    let now = Utc::now();
    let ledger = vec![
        ran("1", Some(now - Duration::hours(10)), 1),
        ran("2", None, 2),
        ran("3", Some(now - Duration::hours(4)), 3),
    ];
    let filter = ExecutedAfterFilter::new(now - Duration::hours(6), &ledger);

    assert!(!filter.accepts(&changeset("1")));
    assert!(!filter.accepts(&changeset("2")));
    assert!(filter.accepts(&changeset("3")));
}

#[test]
fn test_cutoff_now_accepts_nothing_older() {
    let now = Utc::now();
    let ledger = vec![ran("1", Some(now - Duration::hours(10)), 1)];
    let filter = ExecutedAfterFilter::new(now, &ledger);
    assert!(!filter.accepts(&changeset("1")));
}

#[test]
fn test_empty_ledger_accepts_nothing() {
    let now = Utc::now();
    for cutoff in [now, now - Duration::days(3650), now + Duration::days(1)] {
        let filter = ExecutedAfterFilter::new(cutoff, &[]);
        assert!(!filter.accepts(&changeset("1")));
    }
}

#[test]
fn test_unknown_changeset_not_accepted() {
    let now = Utc::now();
    let filter = ExecutedAfterFilter::new(
        now - Duration::hours(6),
        &[ran("3", Some(now - Duration::hours(1)), 1)],
    );
    assert!(!filter.accepts(&changeset("4")));
    assert!(!filter.accepts(&ChangeSet::new("3", "testAuthor", "other/changelog")));
}

#[test]
fn test_filters_combine() {
    let now = Utc::now();
    let ledger = vec![ran("3", Some(now - Duration::hours(1)), 1)];
    let executed = ExecutedAfterFilter::new(now - Duration::hours(6), &ledger);
    let dbms = DbmsFilter::new("mssql");
    let contexts = ContextFilter::new(["prod"]);

    let admitted = changeset("3").with_dbms("mssql").with_context("prod");
    let wrong_dialect = changeset("3").with_dbms("postgres");
    let wrong_context = changeset("3").with_context("test");

    let filters: [&dyn ChangeSetFilter; 3] = [&executed, &dbms, &contexts];
    assert!(accepts_all(&filters, &admitted));
    assert!(!accepts_all(&filters, &wrong_dialect));
    assert!(!accepts_all(&filters, &wrong_context));
}

// =============================================================================
// Preconditions
// =============================================================================

fn provider() -> SnapshotProvider {
    SnapshotProvider::new(
        Arc::new(MemoryIntrospector::new().with_table(Table::new("dbo", "cxml_folder"))),
        TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap(),
    )
}

#[tokio::test]
async fn test_preconditions_pass() {
    let registry = PreconditionRegistry::with_builtins();
    let db = DialectCatalog::with_builtins().descriptor("mssql", None);
    let changeset = changeset("1")
        .with_precondition(CustomPreconditionWrapper::new("tableExists").with_param("tableName", "cxml_folder"))
        .with_precondition(CustomPreconditionWrapper::new("dbms").with_param("type", "mssql"));

    changeset
        .check_preconditions(&registry, &db, &provider())
        .await
        .unwrap();
}

#[tokio::test]
async fn test_precondition_failures() {
    let registry = PreconditionRegistry::with_builtins();
    let db = DialectCatalog::with_builtins().descriptor("postgres", None);

    let wrong_dbms = changeset("1")
        .with_precondition(CustomPreconditionWrapper::new("dbms").with_param("type", "mssql"));
    let err = wrong_dbms
        .check_preconditions(&registry, &db, &provider())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ChangeError::PreconditionFailed(ref msg) if msg.starts_with("Custom Precondition Failed: ")
    ));

    let unknown = changeset("2").with_precondition(CustomPreconditionWrapper::new("com.acme.Check"));
    let err = unknown
        .check_preconditions(&registry, &db, &provider())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Precondition failed: Could not open custom precondition class com.acme.Check"
    );
}

#[tokio::test]
async fn test_no_preconditions_skip_capture() {
    let memory = Arc::new(MemoryIntrospector::new());
    let provider = SnapshotProvider::new(
        memory.clone(),
        TriggerConvention::new(DEFAULT_TABLE_PREFIX).unwrap(),
    );
    let db = DialectCatalog::with_builtins().descriptor("mssql", None);

    changeset("1")
        .check_preconditions(&PreconditionRegistry::with_builtins(), &db, &provider)
        .await
        .unwrap();
    assert_eq!(memory.capture_count(), 0);
}
