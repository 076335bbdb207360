use chrono::Utc;
use diesel::{
    pg::Pg, Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, QueryResult,
    RunQueryDsl, SelectableHelper
};
use uuid::Uuid;

use crate::{
    models::{Order, OrderItem, OrderStatus, OrderWithItems},
    repository::OrderFilter,
    schema::{order_items, orders},
    utils::PageRequest
};

// Loads the order_items of every given order in one query
fn attach_items(conn: &mut PgConnection, rows: Vec<Order>) -> QueryResult<Vec<OrderWithItems>> {
    let order_ids: Vec<Uuid> = rows.iter().map(|order| order.id).collect();

    let mut items: Vec<OrderItem> = order_items::table
        .filter(order_items::order_id.eq_any(order_ids))
        .select(OrderItem::as_select())
        .order(order_items::id.asc())
        .load(conn)?;

    Ok(rows.into_iter()
        .map(|order| {
            let (own, rest): (Vec<OrderItem>, Vec<OrderItem>) = items
                .drain(..)
                .partition(|item| item.order_id == order.id);
            items = rest;
            OrderWithItems{ order, items: own }
        })
        .collect())
}

fn find_one(conn: &mut PgConnection, order: Option<Order>) -> QueryResult<Option<OrderWithItems>> {
    match order {
        Some(order) => Ok(attach_items(conn, vec![order])?.pop()),
        None => Ok(None)
    }
}

#[tracing::instrument(
    "Getting order along with associated order_items",
    skip(conn)
)]
pub fn find_order(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<OrderWithItems>> {
    let order = orders::table
        .find(id)
        .select(Order::as_select())
        .first(conn)
        .optional()?;

    find_one(conn, order)
}

#[tracing::instrument(
    "Getting order by secret code",
    skip(conn)
)]
pub fn find_order_by_code(conn: &mut PgConnection, secret_code: &str) -> QueryResult<Option<OrderWithItems>> {
    let order = orders::table
        .filter(orders::secret_code.eq(secret_code))
        .select(Order::as_select())
        .first(conn)
        .optional()?;

    find_one(conn, order)
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();

    if let Some(user_id) = filter.user_id {
        query = query.filter(orders::user_id.eq(user_id));
    }

    if let Some(status) = filter.status {
        query = query.filter(orders::status.eq(status));
    }

    query
}

#[tracing::instrument(
    "Listing orders with their items",
    skip(conn)
)]
pub fn list_orders(
    conn: &mut PgConnection,
    filter: &OrderFilter,
    page: PageRequest
) -> QueryResult<(Vec<OrderWithItems>, i64)> {
    let total = filtered(filter)
        .count()
        .get_result::<i64>(conn)?;

    let rows = filtered(filter)
        .select(Order::as_select())
        .order((orders::created_at.desc(), orders::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .load(conn)?;

    Ok((attach_items(conn, rows)?, total))
}

#[tracing::instrument(
    "Creating order in order table with its order_items",
    skip_all
)]
pub fn insert_order_with_items(
    conn: &mut PgConnection,
    order: Order,
    items: Vec<OrderItem>
) -> QueryResult<OrderWithItems> {
    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let order = diesel::insert_into(orders::table)
            .values(&order)
            .returning(Order::as_returning())
            .get_result(conn)?;

        let items = diesel::insert_into(order_items::table)
            .values(&items)
            .returning(OrderItem::as_returning())
            .get_results(conn)?;

        Ok(OrderWithItems{ order, items })
    })
}

// Function to perform update order status operation
pub fn update_order_status(
    conn: &mut PgConnection,
    id: Uuid,
    status: OrderStatus
) -> QueryResult<OrderWithItems> {
    let order = diesel::update(orders::table.find(id))
        .set((
            orders::status.eq(status),
            orders::updated_at.eq(Utc::now())
        ))
        .returning(Order::as_returning())
        .get_result(conn)?;

    find_one(conn, Some(order))?.ok_or(diesel::result::Error::NotFound)
}

// Function to delete order from DB, order_items cascade
pub fn delete_order(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(orders::table.find(id)).execute(conn)
}
