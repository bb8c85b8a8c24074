//! Reload and query statements.
//!
//! The three `replace_*` functions truncate their table and insert the new
//! contents inside one `BEGIN IMMEDIATE` transaction
//! (`SqliteConnection::immediate_transaction`): readers see either the old
//! table or the new one, never a half-written reload.

use anyhow::Context;
use chrono::{SecondsFormat, Utc};
use diesel::dsl::max;
use diesel::prelude::*;
use diesel::{SqliteConnection, insert_into};
use investment_scoring::{RawBar, ScoredBar};
use market_data_ingestor::models::{
    bar::BarSeries, company::CompanyOverview, indicator::TechnicalIndicatorRow,
};
use tracing::debug;

use crate::models::{CompanyRow, MergedRow, NewDailyBar, NewIndicatorRow, ScoreRow};
use crate::schema::{company_data, daily_data, investment_scores, technical_indicators};

/// Replace every row of `daily_data` with `series`. Returns rows written.
pub fn replace_daily_data(conn: &mut SqliteConnection, series: &[BarSeries]) -> anyhow::Result<usize> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let removed = diesel::delete(daily_data::table).execute(conn)?;
        let mut written = 0;
        for s in series {
            for bar in &s.bars {
                written += insert_into(daily_data::table)
                    .values(NewDailyBar::new(&s.symbol, bar))
                    .execute(conn)
                    .with_context(|| format!("insert daily bar {} {}", s.symbol, bar.date))?;
            }
        }
        debug!(removed, written, "daily_data reloaded");
        Ok(written)
    })
}

/// Replace every row of `technical_indicators` with `rows`. Returns rows written.
pub fn replace_technical_indicators(
    conn: &mut SqliteConnection,
    rows: &[TechnicalIndicatorRow],
) -> anyhow::Result<usize> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let removed = diesel::delete(technical_indicators::table).execute(conn)?;
        let mut written = 0;
        for row in rows {
            written += insert_into(technical_indicators::table)
                .values(NewIndicatorRow::from(row))
                .execute(conn)
                .with_context(|| format!("insert indicators {} {}", row.symbol, row.date))?;
        }
        debug!(removed, written, "technical_indicators reloaded");
        Ok(written)
    })
}

/// Replace every row of `investment_scores` with `rows`. Returns rows written.
pub fn replace_scores(conn: &mut SqliteConnection, rows: &[ScoredBar]) -> anyhow::Result<usize> {
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let removed = diesel::delete(investment_scores::table).execute(conn)?;
        let mut written = 0;
        for row in rows {
            written += insert_into(investment_scores::table)
                .values(ScoreRow::from(row))
                .execute(conn)
                .with_context(|| format!("insert score {} {}", row.symbol(), row.date()))?;
        }
        debug!(removed, written, "investment_scores reloaded");
        Ok(written)
    })
}

/// Insert or update company fundamentals by symbol. Returns rows affected.
pub fn upsert_companies(
    conn: &mut SqliteConnection,
    companies: &[CompanyOverview],
) -> anyhow::Result<usize> {
    let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let mut n = 0;
        for company in companies {
            let row = CompanyRow::new(company, &now);
            n += insert_into(company_data::table)
                .values(&row)
                .on_conflict(company_data::symbol)
                .do_update()
                .set(&row)
                .execute(conn)
                .with_context(|| format!("upsert company {}", company.symbol))?;
        }
        Ok(n)
    })
}

/// `daily_data ⋈ technical_indicators` on `(symbol, date)` as scoring input,
/// ordered by symbol then date.
///
/// Days present in only one of the two tables are left out. `None` loads
/// every symbol.
pub fn load_merged_rows(
    conn: &mut SqliteConnection,
    symbols: Option<&[String]>,
) -> anyhow::Result<Vec<RawBar>> {
    use crate::schema::daily_data::dsl as dd;
    use crate::schema::technical_indicators::dsl as ti;

    let mut query = dd::daily_data
        .inner_join(
            ti::technical_indicators.on(ti::symbol.eq(dd::symbol).and(ti::date.eq(dd::date))),
        )
        .select((
            dd::symbol,
            dd::date,
            dd::open,
            dd::high,
            dd::low,
            dd::close,
            dd::volume,
            ti::ema,
            ti::rsi,
        ))
        .order((dd::symbol.asc(), dd::date.asc()))
        .into_boxed::<diesel::sqlite::Sqlite>();
    if let Some(symbols) = symbols {
        query = query.filter(dd::symbol.eq_any(symbols.to_vec()));
    }

    let rows = query
        .load::<MergedRow>(conn)
        .context("load daily_data joined with technical_indicators")?;
    Ok(rows.into_iter().map(RawBar::from).collect())
}

/// Most recent `investment_scores` row of every symbol, ordered by symbol.
pub fn latest_scores(conn: &mut SqliteConnection) -> anyhow::Result<Vec<ScoreRow>> {
    use crate::schema::investment_scores::dsl as is;

    let newest: Vec<(String, Option<chrono::NaiveDate>)> = is::investment_scores
        .group_by(is::symbol)
        .select((is::symbol, max(is::date)))
        .order(is::symbol.asc())
        .load(conn)?;

    let mut out = Vec::with_capacity(newest.len());
    for (symbol, date) in newest {
        let Some(date) = date else { continue };
        let row = is::investment_scores
            .filter(is::symbol.eq(&symbol).and(is::date.eq(date)))
            .select(ScoreRow::as_select())
            .first(conn)
            .with_context(|| format!("load latest score for {symbol}"))?;
        out.push(row);
    }
    Ok(out)
}

/// Every stored company, ordered by symbol.
pub fn load_companies(conn: &mut SqliteConnection) -> anyhow::Result<Vec<crate::models::Company>> {
    use crate::schema::company_data::dsl as cd;

    Ok(cd::company_data
        .select(crate::models::Company::as_select())
        .order(cd::symbol.asc())
        .load(conn)?)
}
