use chrono::{NaiveDate, Utc};
use dgc_core::db::open_db_in_memory;
use dgc_core::{
    recommend, Manual, ManualRepository, ManualService, Month, RepoError, RepoResult,
    SqliteManualRepository,
};
use rusqlite::Connection;

fn seed(conn: &Connection, month: Month, count: i64) {
    let repo = SqliteManualRepository::try_new(conn).unwrap();
    for order in 1..=count {
        let id = format!("{}_{order}", month.name().to_lowercase());
        repo.insert_manual(&Manual::new(id, format!("{month} {order}"), month, order, Utc::now()))
            .unwrap();
    }
}

fn ids(manuals: &[Manual]) -> Vec<&str> {
    manuals.iter().map(|manual| manual.id.as_str()).collect()
}

fn day(year: i32, ordinal: u32) -> NaiveDate {
    NaiveDate::from_yo_opt(year, ordinal).unwrap()
}

#[test]
fn full_primary_and_secondary_yield_three_plus_one() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, Month::January, 6);
    seed(&conn, Month::February, 2);

    let service = ManualService::new(SqliteManualRepository::try_new(&conn).unwrap());
    let recommendation = service.recommended(day(2026, 10)).unwrap();

    assert_eq!(recommendation.week_number, 1);
    assert_eq!(recommendation.primary_month, Month::January);
    assert_eq!(recommendation.secondary_month, Month::February);
    assert_eq!(
        ids(&recommendation.manuals),
        vec!["january_1", "january_2", "january_3", "february_1"]
    );
}

#[test]
fn empty_secondary_falls_back_to_fourth_primary() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, Month::August, 5);

    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    let recommendation = recommend(&repo, day(2026, 200)).unwrap();

    assert_eq!(recommendation.week_number, 28);
    assert_eq!(recommendation.primary_month, Month::August);
    assert_eq!(recommendation.secondary_month, Month::September);
    assert_eq!(
        ids(&recommendation.manuals),
        vec!["august_1", "august_2", "august_3", "august_4"]
    );
}

#[test]
fn empty_store_yields_empty_list() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteManualRepository::try_new(&conn).unwrap();

    let recommendation = recommend(&repo, day(2026, 45)).unwrap();
    assert!(recommendation.manuals.is_empty());
}

#[test]
fn december_wraps_secondary_to_january() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, Month::December, 2);
    seed(&conn, Month::January, 1);

    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    let recommendation = recommend(&repo, day(2026, 360)).unwrap();

    assert_eq!(recommendation.primary_month, Month::December);
    assert_eq!(recommendation.secondary_month, Month::January);
    assert_eq!(
        ids(&recommendation.manuals),
        vec!["december_1", "december_2", "january_1"]
    );
}

#[test]
fn same_day_and_data_give_identical_results() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, Month::March, 4);
    seed(&conn, Month::April, 1);

    let repo = SqliteManualRepository::try_new(&conn).unwrap();
    let today = day(2026, 70);
    assert_eq!(
        recommend(&repo, today).unwrap(),
        recommend(&repo, today).unwrap()
    );
}

/// Store whose secondary-month query fails, to pin down failure propagation.
struct FailingSecondary<'conn> {
    inner: SqliteManualRepository<'conn>,
    failing_month: Month,
}

impl ManualRepository for FailingSecondary<'_> {
    fn insert_manual(&self, manual: &Manual) -> RepoResult<()> {
        self.inner.insert_manual(manual)
    }
    fn get_manual(&self, id: &str) -> RepoResult<Option<Manual>> {
        self.inner.get_manual(id)
    }
    fn list_by_month(&self, month: Month, limit: Option<u32>) -> RepoResult<Vec<Manual>> {
        if month == self.failing_month {
            return Err(RepoError::InvalidData("store unavailable".to_string()));
        }
        self.inner.list_by_month(month, limit)
    }
    fn list_all(&self) -> RepoResult<Vec<Manual>> {
        self.inner.list_all()
    }
    fn find_by_month_and_order(&self, month: Month, order: i64) -> RepoResult<Option<Manual>> {
        self.inner.find_by_month_and_order(month, order)
    }
    fn update_manual(&self, manual: &Manual) -> RepoResult<()> {
        self.inner.update_manual(manual)
    }
    fn delete_manual(&self, id: &str) -> RepoResult<Option<Manual>> {
        self.inner.delete_manual(id)
    }
    fn delete_all(&self) -> RepoResult<usize> {
        self.inner.delete_all()
    }
    fn count(&self) -> RepoResult<usize> {
        self.inner.count()
    }
}

#[test]
fn secondary_query_failure_fails_the_whole_selection() {
    let conn = open_db_in_memory().unwrap();
    seed(&conn, Month::January, 4);

    let repo = FailingSecondary {
        inner: SqliteManualRepository::try_new(&conn).unwrap(),
        failing_month: Month::February,
    };
    let err = recommend(&repo, day(2026, 3)).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}
