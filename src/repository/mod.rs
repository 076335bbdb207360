//! Persistence contract shared by the postgres and in-memory backends.
//!
//! Every method is synchronous: handlers run them on the blocking pool through
//! [`run_blocking`]. Listing methods return the requested page together with
//! the total number of matching rows.

mod memory;

use std::{collections::HashMap, error::Error, fmt::Debug, sync::Arc};

use actix_web::web;
use thiserror::Error;
use uuid::Uuid;

pub use memory::InMemoryRepository;

use crate::{
    error::ApiError,
    models::{
        Dish, DishChanges, Order, OrderItem, OrderStatus, OrderWithItems, Review, ReviewChanges,
        ReviewReply, ReviewStatus, Role, User, UserChanges
    },
    telemetry::spawn_blocking_with_tracing,
    utils::{error_fmt_chain, PageRequest}
};

#[derive(Error)]
pub enum StoreError{
    #[error("Record not found")]
    NotFound,
    // Unique or foreign key violation, carries the constraint name
    #[error("Constraint violated: {0}")]
    Conflict(String),
    #[error("Unexpected database error")]
    UnexpectedError(#[from] anyhow::Error)
}

impl Debug for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)?;
        error_fmt_chain(f, &self.source())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// Constraint names reported through StoreError::Conflict
pub const USERS_EMAIL_KEY: &str = "users_email_key";
pub const ORDERS_SECRET_CODE_KEY: &str = "orders_secret_code_key";
pub const REVIEWS_USER_DISH_KEY: &str = "reviews_user_dish_key";
pub const ORDERS_USER_FKEY: &str = "orders_user_id_fkey";
pub const ORDER_ITEMS_DISH_FKEY: &str = "order_items_dish_id_fkey";

#[derive(Debug, Clone, Default)]
pub struct UserFilter{
    pub role: Option<Role>,
    // Case-insensitive match on name or email
    pub search: Option<String>
}

#[derive(Debug, Clone, Default)]
pub struct DishFilter{
    // Case-insensitive match on name or description
    pub search: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub owner_id: Option<Uuid>
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter{
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>
}

#[derive(Debug, Clone, Default)]
pub struct ReviewFilter{
    pub dish_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub status: Option<ReviewStatus>,
    pub featured: Option<bool>
}

pub trait Repository: Send + Sync + 'static {
    // users
    fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    fn find_users(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;
    fn list_users(&self, filter: &UserFilter, page: PageRequest) -> StoreResult<(Vec<User>, i64)>;
    fn insert_user(&self, user: User) -> StoreResult<User>;
    fn update_user(&self, id: Uuid, changes: UserChanges) -> StoreResult<User>;
    fn delete_user(&self, id: Uuid) -> StoreResult<()>;

    // dishes
    fn find_dish(&self, id: Uuid) -> StoreResult<Option<Dish>>;
    fn find_dishes(&self, ids: &[Uuid]) -> StoreResult<Vec<Dish>>;
    fn list_dishes(&self, filter: &DishFilter, page: PageRequest) -> StoreResult<(Vec<Dish>, i64)>;
    fn insert_dish(&self, dish: Dish) -> StoreResult<Dish>;
    fn update_dish(&self, id: Uuid, changes: DishChanges) -> StoreResult<Dish>;
    // Conflict while an order item still references the dish
    fn delete_dish(&self, id: Uuid) -> StoreResult<()>;

    // orders
    fn find_order(&self, id: Uuid) -> StoreResult<Option<OrderWithItems>>;
    fn find_order_by_code(&self, secret_code: &str) -> StoreResult<Option<OrderWithItems>>;
    fn list_orders(&self, filter: &OrderFilter, page: PageRequest) -> StoreResult<(Vec<OrderWithItems>, i64)>;
    // Order and items are written atomically, Conflict on a taken secret code
    fn insert_order(&self, order: Order, items: Vec<OrderItem>) -> StoreResult<OrderWithItems>;
    fn update_order_status(&self, id: Uuid, status: OrderStatus) -> StoreResult<OrderWithItems>;
    fn delete_order(&self, id: Uuid) -> StoreResult<()>;

    // reviews
    fn find_review(&self, id: Uuid) -> StoreResult<Option<Review>>;
    fn find_review_by_author(&self, user_id: Uuid, dish_id: Uuid) -> StoreResult<Option<Review>>;
    // Ordered featured first, then newest, then by id
    fn list_reviews(&self, filter: &ReviewFilter, page: PageRequest) -> StoreResult<(Vec<Review>, i64)>;
    fn count_reviews_by_dish(&self, dish_ids: &[Uuid]) -> StoreResult<HashMap<Uuid, i64>>;
    fn insert_review(&self, review: Review) -> StoreResult<Review>;
    fn update_review(&self, id: Uuid, changes: ReviewChanges) -> StoreResult<Review>;
    fn delete_review(&self, id: Uuid) -> StoreResult<()>;

    // review replies, oldest first
    fn replies_for(&self, review_ids: &[Uuid]) -> StoreResult<Vec<ReviewReply>>;
    fn insert_reply(&self, reply: ReviewReply) -> StoreResult<ReviewReply>;
}

// Runs `f` against the repository on the blocking pool
pub async fn run_blocking<F, T>(repo: &web::Data<dyn Repository>, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn Repository) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static
{
    let repo: Arc<dyn Repository> = repo.clone().into_inner();

    spawn_blocking_with_tracing(move || f(repo.as_ref())).await?
}
