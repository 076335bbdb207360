use diesel::{
    pg::Pg, BoolExpressionMethods, ExpressionMethods, OptionalExtension, PgConnection,
    PgTextExpressionMethods, QueryDsl, QueryResult, RunQueryDsl, SelectableHelper
};
use uuid::Uuid;

use super::like_pattern;
use crate::{
    models::{User, UserChanges},
    repository::UserFilter,
    schema::users,
    utils::PageRequest
};

pub fn find_user(conn: &mut PgConnection, id: Uuid) -> QueryResult<Option<User>> {
    users::table
        .find(id)
        .select(User::as_select())
        .first(conn)
        .optional()
}

// Function to query user from email id
pub fn find_user_by_email(conn: &mut PgConnection, email: &str) -> QueryResult<Option<User>> {
    users::table
        .filter(users::email.eq(email))
        .select(User::as_select())
        .first(conn)
        .optional()
}

pub fn find_users(conn: &mut PgConnection, ids: &[Uuid]) -> QueryResult<Vec<User>> {
    users::table
        .filter(users::id.eq_any(ids.to_vec()))
        .select(User::as_select())
        .load(conn)
}

fn filtered(filter: &UserFilter) -> users::BoxedQuery<'static, Pg> {
    let mut query = users::table.into_boxed();

    if let Some(role) = filter.role {
        query = query.filter(users::role.eq(role));
    }

    if let Some(search) = &filter.search {
        let pattern = like_pattern(search);
        query = query.filter(
            users::name.ilike(pattern.clone())
                .or(users::email.ilike(pattern))
        );
    }

    query
}

#[tracing::instrument(
    "Listing users from db",
    skip(conn)
)]
pub fn list_users(
    conn: &mut PgConnection,
    filter: &UserFilter,
    page: PageRequest
) -> QueryResult<(Vec<User>, i64)> {
    let total = filtered(filter)
        .count()
        .get_result::<i64>(conn)?;

    let rows = filtered(filter)
        .select(User::as_select())
        .order((users::created_at.desc(), users::id.asc()))
        .limit(page.limit)
        .offset(page.offset())
        .load(conn)?;

    Ok((rows, total))
}

#[tracing::instrument(
    "Inserting user into the database",
    skip_all
)]
pub fn insert_user(conn: &mut PgConnection, user: &User) -> QueryResult<User> {
    diesel::insert_into(users::table)
        .values(user)
        .returning(User::as_returning())
        .get_result(conn)
}

#[tracing::instrument(
    "Updating user in the database",
    skip(conn, changes)
)]
pub fn update_user(conn: &mut PgConnection, id: Uuid, changes: &UserChanges) -> QueryResult<User> {
    diesel::update(users::table.find(id))
        .set(changes)
        .returning(User::as_returning())
        .get_result(conn)
}

// Orders, reviews and replies cascade, owned dishes are orphaned
pub fn delete_user(conn: &mut PgConnection, id: Uuid) -> QueryResult<usize> {
    diesel::delete(users::table.find(id)).execute(conn)
}
