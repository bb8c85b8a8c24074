use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sql_query;
use market_store::db::{connection::connect_sqlite, migrate};

mod common;

#[test]
fn migrations_are_idempotent_across_url_forms() {
    let (db, _conn) = common::setup_db();
    assert_eq!(migrate::run_all(&db.path).expect("bare path"), 0);
    assert_eq!(
        migrate::run_all(&format!("sqlite://{}", db.path)).expect("sqlite url"),
        0
    );
}

#[test]
fn unsupported_scheme_is_rejected() {
    let err = migrate::run_all("mysql://localhost/market").unwrap_err();
    assert!(err.to_string().contains("Unsupported DATABASE_URL"));
}

#[test]
fn sqlite_begin_immediate_locking_smoke() {
    let (db, mut conn_a) = common::setup_db();
    let mut conn_b = connect_sqlite(&db.path).expect("connect second");

    sql_query("BEGIN IMMEDIATE;")
        .execute(&mut conn_a)
        .expect("begin immediate on first connection");

    let err = sql_query("BEGIN IMMEDIATE;").execute(&mut conn_b);
    assert!(err.is_err(), "expected second BEGIN IMMEDIATE to block");
    if let Err(e) = err {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UnableToSendCommand, info) => {
                assert!(info.message().contains("database is locked"));
            }
            DieselError::DatabaseError(_, info) => {
                assert!(info.message().contains("database is locked"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    sql_query("ROLLBACK;")
        .execute(&mut conn_a)
        .expect("rollback first connection");

    sql_query("BEGIN IMMEDIATE;")
        .execute(&mut conn_b)
        .expect("begin immediate after release");
    sql_query("ROLLBACK;")
        .execute(&mut conn_b)
        .expect("rollback second connection");
}
