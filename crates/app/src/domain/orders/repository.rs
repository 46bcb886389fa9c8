//! Orders Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use sqlx::{Error, FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use uuid::Uuid;

use crate::domain::{
    orders::records::{OrderLineRecord, OrderRecord, OrderUuid},
    products::records::ProductUuid,
    users::records::UserUuid,
};

const INSERT_ORDER_SQL: &str = include_str!("sql/insert_order.sql");
const INSERT_ORDER_ITEM_SQL: &str = include_str!("sql/insert_order_item.sql");
const LIST_ORDERS_SQL: &str = include_str!("sql/list_orders.sql");
const LIST_ORDERS_BY_OWNER_SQL: &str = include_str!("sql/list_orders_by_owner.sql");
const LIST_ORDER_ITEMS_SQL: &str = include_str!("sql/list_order_items.sql");

/// Order header as stored; lines are loaded separately.
struct OrderRow {
    uuid: OrderUuid,
    user: UserUuid,
    total_items: u64,
    total: Decimal,
    date: String,
    created_at: jiff::Timestamp,
}

struct OrderItemRow {
    order: OrderUuid,
    line: OrderLineRecord,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOrdersRepository;

impl PgOrdersRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn insert_order(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        user: UserUuid,
        total_items: i64,
        total: Decimal,
        date: &str,
    ) -> Result<(), Error> {
        query(INSERT_ORDER_SQL)
            .bind(order.into_uuid())
            .bind(user.into_uuid())
            .bind(total_items)
            .bind(total)
            .bind(date)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn insert_order_item(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        order: OrderUuid,
        position: i32,
        line: &OrderLineRecord,
    ) -> Result<(), Error> {
        query(INSERT_ORDER_ITEM_SQL)
            .bind(order.into_uuid())
            .bind(position)
            .bind(line.item.into_uuid())
            .bind(&line.name)
            .bind(line.price)
            .bind(i64::from(line.quantity))
            .bind(line.image_url.as_deref())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Load orders (optionally restricted to one owner) together with their
    /// lines, oldest first.
    pub(crate) async fn list_orders(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        owner: Option<UserUuid>,
    ) -> Result<Vec<OrderRecord>, Error> {
        let rows = match owner {
            Some(owner) => {
                query_as::<Postgres, OrderRow>(LIST_ORDERS_BY_OWNER_SQL)
                    .bind(owner.into_uuid())
                    .fetch_all(&mut **tx)
                    .await?
            }
            None => {
                query_as::<Postgres, OrderRow>(LIST_ORDERS_SQL)
                    .fetch_all(&mut **tx)
                    .await?
            }
        };

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let uuids: Vec<Uuid> = rows.iter().map(|row| row.uuid.into_uuid()).collect();

        let items = query_as::<Postgres, OrderItemRow>(LIST_ORDER_ITEMS_SQL)
            .bind(uuids)
            .fetch_all(&mut **tx)
            .await?;

        let mut lines_by_order: FxHashMap<OrderUuid, Vec<OrderLineRecord>> =
            FxHashMap::default();

        for item in items {
            lines_by_order.entry(item.order).or_default().push(item.line);
        }

        Ok(rows
            .into_iter()
            .map(|row| OrderRecord {
                items: lines_by_order.remove(&row.uuid).unwrap_or_default(),
                uuid: row.uuid,
                user: row.user,
                total_items: row.total_items,
                total: row.total,
                date: row.date,
                created_at: row.created_at,
            })
            .collect())
    }
}

fn decode_count<T, S>(row: &PgRow, column: &str) -> sqlx::Result<T>
where
    T: TryFrom<i64, Error = S>,
    S: std::error::Error + Send + Sync + 'static,
{
    let value: i64 = row.try_get(column)?;

    T::try_from(value).map_err(|error| Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(error),
    })
}

impl<'r> FromRow<'r, PgRow> for OrderRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OrderUuid::from_uuid(row.try_get("uuid")?),
            user: UserUuid::from_uuid(row.try_get("user_uuid")?),
            total_items: decode_count(row, "total_items")?,
            total: row.try_get("total")?,
            date: row.try_get("date")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}

impl<'r> FromRow<'r, PgRow> for OrderItemRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            order: OrderUuid::from_uuid(row.try_get("order_uuid")?),
            line: OrderLineRecord {
                item: ProductUuid::from_uuid(row.try_get("item_uuid")?),
                name: row.try_get("name")?,
                price: row.try_get("price")?,
                quantity: decode_count(row, "quantity")?,
                image_url: row.try_get("image_url")?,
            },
        })
    }
}
