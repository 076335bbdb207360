use std::collections::HashMap;

use diesel::{
    dsl::count_star, pg::Pg, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl,
    QueryResult, RunQueryDsl, SelectableHelper
};
use uuid::Uuid;

use crate::{
    models::{Review, ReviewChanges, ReviewReply},
    repository::ReviewFilter,
    schema::{review_replies, reviews},
    utils::PageRequest
};

pub fn find_review(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<Review>> {
    reviews::table
        .find(id)
        .select(Review::as_select())
        .first(conn)
        .optional()
}

pub fn find_review_by_author(
    conn: &mut PgConnection,
    user_id: Uuid,
    dish_id: Uuid
) -> QueryResult<Option<Review>> {
    reviews::table
        .filter(reviews::user_id.eq(user_id))
        .filter(reviews::dish_id.eq(dish_id))
        .select(Review::as_select())
        .first(conn)
        .optional()
}

fn filtered(filter: &ReviewFilter) -> reviews::BoxedQuery<'static, Pg> {
    let mut query = reviews::table.into_boxed();

    if let Some(dish_id) = filter.dish_id {
        query = query.filter(reviews::dish_id.eq(dish_id));
    }

    if let Some(user_id) = filter.user_id {
        query = query.filter(reviews::user_id.eq(user_id));
    }

    if let Some(status) = filter.status {
        query = query.filter(reviews::status.eq(status));
    }

    if let Some(featured) = filter.featured {
        query = query.filter(reviews::featured.eq(featured));
    }

    query
}

#[tracing::instrument(
    "Listing reviews from db",
    skip(conn)
)]
pub fn list_reviews(
    conn: &mut PgConnection,
    filter: &ReviewFilter,
    page: PageRequest
) -> QueryResult<(Vec<Review>, i64)> {
    let total = filtered(filter)
        .count()
        .get_result::<i64>(conn)?;

    let rows = filtered(filter)
        .select(Review::as_select())
        .order((reviews::featured.desc(), reviews::created_at.desc(), reviews::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .load(conn)?;

    Ok((rows, total))
}

pub fn count_reviews_by_dish(conn: &mut PgConnection, dish_ids: &[Uuid]) -> QueryResult<HashMap<Uuid, i64>> {
    let counts = reviews::table
        .filter(reviews::dish_id.eq_any(dish_ids.to_vec()))
        .group_by(reviews::dish_id)
        .select((reviews::dish_id, count_star()))
        .load::<(Uuid, i64)>(conn)?;

    Ok(counts.into_iter().collect())
}

#[tracing::instrument(
    "Inserting review into the database",
    skip_all
)]
pub fn insert_review(conn: &mut PgConnection, review: &Review) -> QueryResult<Review> {
    diesel::insert_into(reviews::table)
        .values(review)
        .returning(Review::as_returning())
        .get_result(conn)
}

pub fn update_review(conn: &mut PgConnection, id: Uuid, changes: &ReviewChanges) -> QueryResult<Review> {
    diesel::update(reviews::table.find(id))
        .set(changes)
        .returning(Review::as_returning())
        .get_result(conn)
}

// Replies cascade
pub fn delete_review(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(reviews::table.find(id)).execute(conn)
}

pub fn replies_for(conn: &mut PgConnection, review_ids: &[Uuid]) -> QueryResult<Vec<ReviewReply>> {
    review_replies::table
        .filter(review_replies::review_id.eq_any(review_ids.to_vec()))
        .select(ReviewReply::as_select())
        .order((review_replies::created_at.asc(), review_replies::id.asc()))
        .load(conn)
}

pub fn insert_reply(conn: &mut PgConnection, reply: &ReviewReply) -> QueryResult<ReviewReply> {
    diesel::insert_into(review_replies::table)
        .values(reply)
        .returning(ReviewReply::as_returning())
        .get_result(conn)
}
