use diesel::{
    pg::Pg, BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection,
    PgTextExpressionMethods, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper
};
use uuid::Uuid;

use super::like_pattern;
use crate::{
    models::{Dish, DishChanges},
    repository::DishFilter,
    schema::dishes,
    utils::PageRequest
};

pub fn find_dish(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Dish>> {
    dishes::table
        .find(id)
        .select(Dish::as_select())
        .first(conn)
        .optional()
}

// Batch lookup, missing ids are simply absent from the result
pub fn find_dishes(conn: &mut PgConnection, ids: &[Uuid]) -> QueryResult<Vec<Dish>> {
    dishes::table
        .filter(dishes::id.eq_any(ids.to_vec()))
        .select(Dish::as_select())
        .load(conn)
}

fn filtered(filter: &DishFilter) -> dishes::BoxedQuery<'static, Pg> {
    let mut query = dishes::table.into_boxed();

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query = query.filter(
            dishes::name.ilike(pattern.clone())
                .or(dishes::description.ilike(pattern))
        );
    }

    if let Some(min_price) = filter.min_price {
        query = query.filter(dishes::price.ge(min_price));
    }

    if let Some(max_price) = filter.max_price {
        query = query.filter(dishes::price.le(max_price));
    }

    if let Some(owner_id) = filter.owner_id {
        query = query.filter(dishes::user_id.eq(owner_id));
    }

    query
}

#[tracing::instrument(
    "Getting dishes from db",
    skip(conn)
)]
pub fn list_dishes(
    conn: &mut PgConnection,
    filter: &DishFilter,
    page: PageRequest
) -> QueryResult<(Vec<Dish>, i64)> {
    let total = filtered(filter)
        .count()
        .get_result::<i64>(conn)?;

    let rows = filtered(filter)
        .select(Dish::as_select())
        .order((dishes::created_at.desc(), dishes::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .load(conn)?;

    Ok((rows, total))
}

#[tracing::instrument(
    "Insert a dish to db",
    skip_all
)]
pub fn insert_dish(conn: &mut PgConnection, dish: &Dish) -> QueryResult<Dish> {
    diesel::insert_into(dishes::table)
        .values(dish)
        .returning(Dish::as_returning())
        .get_result(conn)
}

pub fn update_dish(conn: &mut PgConnection, id: Uuid, changes: &DishChanges) -> QueryResult<Dish> {
    diesel::update(dishes::table.find(id))
        .set(changes)
        .returning(Dish::as_returning())
        .get_result(conn)
}

// Reviews cascade; order_items restrict, surfacing as a foreign key violation
pub fn delete_dish(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(dishes::table.find(id)).execute(conn)
}
