use sea_orm::sea_query::Expr;
use sea_orm::{
    ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Order, PaginatorTrait, QueryOrder,
    QuerySelect, QueryTrait, Select,
};

use crate::domain::model::PageWindow;

const TOTAL_COUNT: &str = "total_count";

/// Fetch one page together with the total row count of `select`.
///
/// The total is carried on every row as `COUNT(*) OVER()`, so a non-empty page
/// costs one round trip. When the window starts past the last row the page is
/// empty and the total comes from a separate `COUNT(*)`.
pub(crate) async fn fetch_counted_page<E, C>(
    conn: &C,
    select: Select<E>,
    order_by: &[E::Column],
    window: PageWindow,
) -> Result<(u64, Vec<E::Model>), DbErr>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
    C: ConnectionTrait,
{
    let mut page_query = select
        .clone()
        .expr_as(Expr::cust("COUNT(*) OVER()"), TOTAL_COUNT);
    for col in order_by {
        page_query = page_query.order_by(*col, Order::Asc);
    }
    let stmt = page_query
        .offset(window.offset)
        .limit(window.limit)
        .build(conn.get_database_backend());

    let rows = conn.query_all(stmt).await?;

    let Some(first) = rows.first() else {
        let total = if window.offset > 0 {
            select.count(conn).await?
        } else {
            0
        };
        return Ok((total, Vec::new()));
    };

    let total = first.try_get::<i64>("", TOTAL_COUNT)?;
    let items = rows
        .iter()
        .map(|row| E::Model::from_query_result(row, ""))
        .collect::<Result<Vec<_>, _>>()?;

    Ok((u64::try_from(total).unwrap_or_default(), items))
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use chrono::Utc;
    use sea_orm::{ActiveModelTrait, Set};
    use uuid::Uuid;

    use super::*;
    use crate::infra::db::{DatabaseConfig, connect, run_migrations};
    use crate::infra::storage::entity::country;

    async fn seeded(n: usize) -> sea_orm::DatabaseConnection {
        let conn = connect(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&conn).await.unwrap();
        for i in 0..n {
            let now = Utc::now();
            country::ActiveModel {
                guid: Set(Uuid::new_v4()),
                title: Set(Some(format!("Country {i}"))),
                code: Set(None),
                continent: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&conn)
            .await
            .unwrap();
        }
        conn
    }

    const ORDER: [country::Column; 2] = [country::Column::CreatedAt, country::Column::Guid];

    #[tokio::test]
    async fn total_is_carried_with_page() {
        let conn = seeded(5).await;
        let (total, items) = fetch_counted_page(
            &conn,
            country::Entity::find(),
            &ORDER,
            PageWindow { offset: 1, limit: 2 },
        )
        .await
        .unwrap();
        assert_eq!(total, 5);
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn total_survives_offset_past_end() {
        let conn = seeded(3).await;
        let (total, items) = fetch_counted_page(
            &conn,
            country::Entity::find(),
            &ORDER,
            PageWindow {
                offset: 10,
                limit: 10,
            },
        )
        .await
        .unwrap();
        assert_eq!(total, 3);
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn empty_table_counts_zero() {
        let conn = seeded(0).await;
        let (total, items) = fetch_counted_page(
            &conn,
            country::Entity::find(),
            &ORDER,
            PageWindow { offset: 0, limit: 10 },
        )
        .await
        .unwrap();
        assert_eq!(total, 0);
        assert!(items.is_empty());
    }
}
