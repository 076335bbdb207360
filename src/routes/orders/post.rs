use std::collections::HashMap;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::generate_secret_code;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::{Dish, Order, OrderItem, OrderStatus},
    repository::{
        run_blocking, Repository, StoreError, ORDERS_SECRET_CODE_KEY, ORDERS_USER_FKEY,
        ORDER_ITEMS_DISH_FKEY
    },
    views::order_view
};

pub const MAX_CODE_ATTEMPTS: usize = 5;
const INVALID_DISHES: &str = "One or more dishes are invalid";
const MAX_PAYMENT_METHOD_LENGTH: usize = 50;

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemJson{
    pub dish_id: Uuid,
    pub quantity: i32
}

// A client supplied total is not part of the contract and is ignored
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderJson{
    pub items: Vec<OrderItemJson>,
    pub seats: Option<i32>,
    pub payment_method: Option<String>
}

#[derive(Debug, PartialEq)]
pub struct PricedItem{
    pub dish_id: Uuid,
    pub quantity: i32,
    pub price: i64
}

impl OrderJson {
    fn validate(&self) -> Result<(), ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::Validation("At least one item is required".into()))
        }

        if self.items.iter().any(|item| item.quantity < 1) {
            return Err(ApiError::Validation("quantity must be a positive integer".into()))
        }

        if self.seats.map_or(false, |seats| seats < 1) {
            return Err(ApiError::Validation("seats must be a positive integer".into()))
        }

        Ok(())
    }

    fn payment_method(&self) -> Result<Option<String>, ApiError> {
        match self.payment_method.as_deref().map(str::trim) {
            Some(method) if method.chars().count() > MAX_PAYMENT_METHOD_LENGTH => Err(ApiError::Validation(
                format!("paymentMethod must contain at most {} characters", MAX_PAYMENT_METHOD_LENGTH)
            )),
            Some(method) if !method.is_empty() => Ok(Some(method.to_string())),
            _ => Ok(None)
        }
    }
}

// Prices every line from the stored dishes, returns the order total and the
// price snapshots
pub fn price_items(items: &[OrderItemJson], dishes: &[Dish]) -> Result<(i64, Vec<PricedItem>), ApiError> {
    let prices: HashMap<Uuid, i64> = dishes.iter().map(|dish| (dish.id, dish.price)).collect();
    let too_large = || ApiError::Validation("order total is too large".into());

    let mut total: i64 = 0;
    let mut priced = Vec::with_capacity(items.len());
    for item in items {
        let price = *prices.get(&item.dish_id)
            .ok_or_else(|| ApiError::Validation(INVALID_DISHES.into()))?;
        let line = price.checked_mul(item.quantity as i64).ok_or_else(too_large)?;
        total = total.checked_add(line).ok_or_else(too_large)?;

        priced.push(PricedItem{ dish_id: item.dish_id, quantity: item.quantity, price });
    }

    Ok((total, priced))
}

#[tracing::instrument(
    "Posting order",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn create_order(
    repo: web::Data<dyn Repository>,
    json: web::Json<OrderJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::Order, Action::Create, Ownership::Own)?;

    let json = json.into_inner();
    json.validate()?;
    let payment_method = json.payment_method()?;
    let seats = json.seats.unwrap_or(1);
    let user_id = actor.user_id;

    let view = run_blocking(&repo, move |repo| {
        let mut dish_ids: Vec<Uuid> = json.items.iter().map(|item| item.dish_id).collect();
        dish_ids.sort();
        dish_ids.dedup();

        let dishes = repo.find_dishes(&dish_ids)?;
        if dishes.len() != dish_ids.len() {
            return Err(ApiError::Validation(INVALID_DISHES.into()))
        }

        let (total, priced) = price_items(&json.items, &dishes)?;

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let now = Utc::now();
            let order = Order{
                id: Uuid::new_v4(),
                user_id,
                secret_code: generate_secret_code(),
                total,
                seats,
                payment_method: payment_method.clone(),
                status: OrderStatus::Pending,
                created_at: now,
                updated_at: now
            };
            let items = priced.iter()
                .map(|item| OrderItem{
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    dish_id: item.dish_id,
                    quantity: item.quantity,
                    price: item.price
                })
                .collect();

            match repo.insert_order(order, items) {
                Ok(created) => return Ok(order_view(repo, created)?),
                Err(StoreError::Conflict(constraint)) if constraint == ORDERS_SECRET_CODE_KEY => {
                    tracing::warn!(attempt, "Secret code already taken, regenerating");
                },
                // A dish removed since the lookup
                Err(StoreError::Conflict(constraint)) if constraint == ORDER_ITEMS_DISH_FKEY => {
                    return Err(ApiError::Validation(INVALID_DISHES.into()))
                },
                // Account deleted while its token is still valid
                Err(StoreError::Conflict(constraint)) if constraint == ORDERS_USER_FKEY => {
                    return Err(ApiError::Unauthorized("User no longer exists".into()))
                },
                Err(StoreError::Conflict(constraint)) => {
                    tracing::warn!(%constraint, "Order insert violated a constraint");
                    return Err(ApiError::Conflict("Order could not be created".into()))
                },
                Err(e) => return Err(e.into())
            }
        }

        Err(ApiError::Conflict("Could not allocate a unique order code".into()))
    })
    .await?;

    Ok(HttpResponse::Created().json(view))
}
