//! JSON projections returned by the handlers.
//!
//! Rows coming out of the [`Repository`] are never serialised directly: the
//! loaders below batch the related users, dishes and replies of a page and
//! assemble camelCase views. No projection carries a password hash.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    models::{Dish, OrderStatus, OrderWithItems, Review, ReviewReply, ReviewStatus, Role, User},
    repository::{Repository, StoreError, StoreResult}
};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser{
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub telephone: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self{
            id: user.id,
            name: user.name,
            email: user.email,
            telephone: user.telephone,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserSummary{
    pub id: Uuid,
    pub name: String
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self{ id: user.id, name: user.name.clone() }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserContact{
    pub id: Uuid,
    pub name: String,
    pub email: String
}

impl From<&User> for UserContact {
    fn from(user: &User) -> Self {
        Self{ id: user.id, name: user.name.clone(), email: user.email.clone() }
    }
}

// Body of signup and signin
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthResponse{
    pub message: String,
    pub user: PublicUser,
    pub token: String
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishView{
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: i64,
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
    pub review_count: i64
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DishDetail{
    #[serde(flatten)]
    pub dish: DishView,
    pub reviews: Vec<ReviewView>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishSummary{
    pub id: Uuid,
    pub name: String,
    pub image_url: String
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DishCard{
    pub id: Uuid,
    pub name: String,
    pub image_url: String,
    pub price: i64
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyView{
    pub id: Uuid,
    pub review_id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserSummary>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView{
    pub id: Uuid,
    pub user_id: Uuid,
    pub dish_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub status: ReviewStatus,
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserSummary>,
    pub dish: Option<DishSummary>,
    pub replies: Vec<ReplyView>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView{
    pub id: Uuid,
    pub dish_id: Uuid,
    pub quantity: i32,
    pub price: i64,
    pub dish: Option<DishCard>
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderView{
    pub id: Uuid,
    pub user_id: Uuid,
    pub secret_code: String,
    pub total: i64,
    pub seats: i32,
    pub payment_method: Option<String>,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: Option<UserContact>,
    pub items: Vec<OrderItemView>
}

fn users_by_id(repo: &dyn Repository, mut ids: Vec<Uuid>) -> StoreResult<HashMap<Uuid, User>> {
    ids.sort();
    ids.dedup();

    Ok(repo.find_users(&ids)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect())
}

fn dishes_by_id(repo: &dyn Repository, mut ids: Vec<Uuid>) -> StoreResult<HashMap<Uuid, Dish>> {
    ids.sort();
    ids.dedup();

    Ok(repo.find_dishes(&ids)?
        .into_iter()
        .map(|dish| (dish.id, dish))
        .collect())
}

pub fn dish_views(repo: &dyn Repository, dishes: Vec<Dish>) -> StoreResult<Vec<DishView>> {
    let ids: Vec<Uuid> = dishes.iter().map(|dish| dish.id).collect();
    let counts = repo.count_reviews_by_dish(&ids)?;
    let owners = users_by_id(repo, dishes.iter().filter_map(|dish| dish.user_id).collect())?;

    Ok(dishes.into_iter()
        .map(|dish| DishView{
            user: dish.user_id.and_then(|id| owners.get(&id)).map(UserSummary::from),
            review_count: counts.get(&dish.id).copied().unwrap_or(0),
            id: dish.id,
            name: dish.name,
            description: dish.description,
            image_url: dish.image_url,
            price: dish.price,
            user_id: dish.user_id,
            created_at: dish.created_at,
            updated_at: dish.updated_at
        })
        .collect())
}

pub fn dish_view(repo: &dyn Repository, dish: Dish) -> StoreResult<DishView> {
    dish_views(repo, vec![dish])?
        .pop()
        .ok_or(StoreError::NotFound)
}

fn reply_views(repo: &dyn Repository, replies: Vec<ReviewReply>) -> StoreResult<Vec<ReplyView>> {
    let authors = users_by_id(repo, replies.iter().map(|reply| reply.user_id).collect())?;

    Ok(replies.into_iter()
        .map(|reply| ReplyView{
            user: authors.get(&reply.user_id).map(UserSummary::from),
            id: reply.id,
            review_id: reply.review_id,
            user_id: reply.user_id,
            content: reply.content,
            created_at: reply.created_at
        })
        .collect())
}

pub fn reply_view(repo: &dyn Repository, reply: ReviewReply) -> StoreResult<ReplyView> {
    reply_views(repo, vec![reply])?
        .pop()
        .ok_or(StoreError::NotFound)
}

// Reviews with author, dish and replies, in the given order
pub fn review_views(repo: &dyn Repository, reviews: Vec<Review>) -> StoreResult<Vec<ReviewView>> {
    let review_ids: Vec<Uuid> = reviews.iter().map(|review| review.id).collect();
    let mut replies: HashMap<Uuid, Vec<ReplyView>> = HashMap::new();
    for reply in reply_views(repo, repo.replies_for(&review_ids)?)? {
        replies.entry(reply.review_id).or_default().push(reply);
    }

    let authors = users_by_id(repo, reviews.iter().map(|review| review.user_id).collect())?;
    let dishes = dishes_by_id(repo, reviews.iter().map(|review| review.dish_id).collect())?;

    Ok(reviews.into_iter()
        .map(|review| ReviewView{
            user: authors.get(&review.user_id).map(UserSummary::from),
            dish: dishes.get(&review.dish_id).map(|dish| DishSummary{
                id: dish.id,
                name: dish.name.clone(),
                image_url: dish.image_url.clone()
            }),
            replies: replies.remove(&review.id).unwrap_or_default(),
            id: review.id,
            user_id: review.user_id,
            dish_id: review.dish_id,
            rating: review.rating,
            comment: review.comment,
            status: review.status,
            featured: review.featured,
            created_at: review.created_at,
            updated_at: review.updated_at
        })
        .collect())
}

pub fn review_view(repo: &dyn Repository, review: Review) -> StoreResult<ReviewView> {
    review_views(repo, vec![review])?
        .pop()
        .ok_or(StoreError::NotFound)
}

pub fn order_views(repo: &dyn Repository, orders: Vec<OrderWithItems>) -> StoreResult<Vec<OrderView>> {
    let customers = users_by_id(repo, orders.iter().map(|entry| entry.order.user_id).collect())?;
    let dishes = dishes_by_id(
        repo,
        orders.iter()
            .flat_map(|entry| entry.items.iter().map(|item| item.dish_id))
            .collect()
    )?;

    Ok(orders.into_iter()
        .map(|OrderWithItems{ order, items }| OrderView{
            user: customers.get(&order.user_id).map(UserContact::from),
            items: items.into_iter()
                .map(|item| OrderItemView{
                    dish: dishes.get(&item.dish_id).map(|dish| DishCard{
                        id: dish.id,
                        name: dish.name.clone(),
                        image_url: dish.image_url.clone(),
                        price: dish.price
                    }),
                    id: item.id,
                    dish_id: item.dish_id,
                    quantity: item.quantity,
                    price: item.price
                })
                .collect(),
            id: order.id,
            user_id: order.user_id,
            secret_code: order.secret_code,
            total: order.total,
            seats: order.seats,
            payment_method: order.payment_method,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at
        })
        .collect())
}

pub fn order_view(repo: &dyn Repository, order: OrderWithItems) -> StoreResult<OrderView> {
    order_views(repo, vec![order])?
        .pop()
        .ok_or(StoreError::NotFound)
}
