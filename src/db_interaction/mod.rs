//! Postgres implementation of [`Repository`] on top of diesel and an r2d2 pool.

pub mod dishes;
pub mod orders;
pub mod reviews;
pub mod users;

use std::collections::HashMap;

use anyhow::Context;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use uuid::Uuid;

use crate::{
    models::{
        Dish, DishChanges, Order, OrderItem, OrderStatus, OrderWithItems, Review, ReviewChanges,
        ReviewReply, User, UserChanges
    },
    repository::{DishFilter, OrderFilter, Repository, ReviewFilter, StoreError, StoreResult, UserFilter},
    utils::{DbConnection, DbPool, PageRequest}
};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("./migrations");

impl From<DieselError> for StoreError {
    fn from(error: DieselError) -> Self {
        match error {
            DieselError::NotFound => StoreError::NotFound,
            DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::ForeignKeyViolation,
                ref info
            ) => StoreError::Conflict(info.constraint_name().unwrap_or("unknown").to_string()),
            other => StoreError::UnexpectedError(anyhow::Error::new(other))
        }
    }
}

// Turns a search term into an ILIKE pattern, escaping wildcards
pub fn like_pattern(search: &str) -> String {
    let escaped = search
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");

    format!("%{}%", escaped)
}

// Fails with NotFound when a write touched no row
fn expect_affected(affected_rows: usize) -> StoreResult<()> {
    if affected_rows == 0 {
        return Err(StoreError::NotFound)
    }

    Ok(())
}

#[derive(Clone)]
pub struct PgRepository{
    pool: DbPool
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self{ pool }
    }

    fn conn(&self) -> StoreResult<DbConnection> {
        self.pool
            .get()
            .context("Failed to get connection from pool")
            .map_err(StoreError::UnexpectedError)
    }

    #[tracing::instrument(
        "Running pending migrations",
        skip_all
    )]
    pub fn run_migrations(&self) -> Result<(), anyhow::Error> {
        let mut conn = self.pool.get().context("Failed to get connection from pool")?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

        Ok(())
    }
}

impl Repository for PgRepository {
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(users::find_user(&mut *self.conn()?, id)?)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(users::find_user_by_email(&mut *self.conn()?, email)?)
    }

    fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        Ok(users::find_users(&mut *self.conn()?, ids)?)
    }

    fn list_users(&self, filter: &UserFilter, page: PageRequest) -> StoreResult<(Vec<User>, i64)> {
        Ok(users::list_users(&mut *self.conn()?, filter, page)?)
    }

    fn insert_user(&self, user: User) -> StoreResult<User> {
        Ok(users::insert_user(&mut *self.conn()?, &user)?)
    }

    fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User> {
        Ok(users::update_user(&mut *self.conn()?, id, &changes)?)
    }

    fn delete_user(&self, id: Uuid) -> StoreResult<()> {
        expect_affected(users::delete_user(&mut *self.conn()?, id)?)
    }

    fn find_dish(&self, id: Uuid) -> StoreResult<Option<Dish>> {
        Ok(dishes::find_dish(&mut *self.conn()?, id)?)
    }

    fn find_dishes(&self, ids: &[Uuid]) -> StoreResult<Vec<Dish>> {
        Ok(dishes::find_dishes(&mut *self.conn()?, ids)?)
    }

    fn list_dishes(&self, filter: &DishFilter, page: PageRequest) -> StoreResult<(Vec<Dish>, i64)> {
        Ok(dishes::list_dishes(&mut *self.conn()?, filter, page)?)
    }

    fn insert_dish(&self, dish: Dish) -> StoreResult<Dish> {
        Ok(dishes::insert_dish(&mut *self.conn()?, &dish)?)
    }

    fn update_dish(&self, id: Uuid, changes: DishChanges) -> StoreResult<Dish> {
        Ok(dishes::update_dish(&mut *self.conn()?, id, &changes)?)
    }

    fn delete_dish(&self, id: Uuid) -> StoreResult<()> {
        expect_affected(dishes::delete_dish(&mut *self.conn()?, id)?)
    }

    fn find_order(&self, id: Uuid) -> StoreResult<Option<OrderWithItems>> {
        Ok(orders::find_order(&mut *self.conn()?, id)?)
    }

    fn find_order_by_code(&self, secret_code: &str) -> StoreResult<Option<OrderWithItems>> {
        Ok(orders::find_order_by_code(&mut *self.conn()?, secret_code)?)
    }

    fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> StoreResult<(Vec<OrderWithItems>, i64)> {
        Ok(orders::list_orders(&mut *self.conn()?, filter, page)?)
    }

    fn insert_order(&self, order: Order, items: Vec<OrderItem>) -> StoreResult<OrderWithItems> {
        Ok(orders::insert_order_with_items(&mut *self.conn()?, order, items)?)
    }

    fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<OrderWithItems> {
        Ok(orders::update_order_status(&mut *self.conn()?, id, status)?)
    }

    fn delete_order(&self, id: Uuid) -> StoreResult<()> {
        expect_affected(orders::delete_order(&mut *self.conn()?, id)?)
    }

    fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>> {
        Ok(reviews::find_review(&mut *self.conn()?, id)?)
    }

    fn find_review_by_author(&self, user_id: Uuid, dish_id: Uuid) -> StoreResult<Option<Review>> {
        Ok(reviews::find_review_by_author(&mut *self.conn()?, user_id, dish_id)?)
    }

    fn list_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<(Vec<Review>, i64)> {
        Ok(reviews::list_reviews(&mut *self.conn()?, filter, page)?)
    }

    fn count_reviews_by_dish(&self, dish_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>> {
        Ok(reviews::count_reviews_by_dish(&mut *self.conn()?, dish_ids)?)
    }

    fn insert_review(&self, review: Review) -> StoreResult<Review> {
        Ok(reviews::insert_review(&mut *self.conn()?, &review)?)
    }

    fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Review> {
        Ok(reviews::update_review(&mut *self.conn()?, id, &changes)?)
    }

    fn delete_review(&self, id: Uuid) -> StoreResult<()> {
        expect_affected(reviews::delete_review(&mut *self.conn()?, id)?)
    }

    fn replies_for(&self, review_ids: &[Uuid]) -> StoreResult<Vec<ReviewReply>> {
        Ok(reviews::replies_for(&mut *self.conn()?, review_ids)?)
    }

    fn insert_reply(&self, reply: ReviewReply) -> StoreResult<ReviewReply> {
        Ok(reviews::insert_reply(&mut *self.conn()?, &reply)?)
    }
}
