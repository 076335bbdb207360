use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    domain::{bounded_text::BoundedText, image_url::ImageUrl},
    error::ApiError,
    models::Dish,
    repository::{run_blocking, Repository},
    views::dish_view
};

pub fn parse_dish_name(name: String) -> Result<String, ApiError> {
    BoundedText::parse(name, "name", 3, 100)
        .map(BoundedText::into_inner)
        .map_err(ApiError::Validation)
}

pub fn parse_dish_description(description: String) -> Result<String, ApiError> {
    BoundedText::parse(description, "description", 10, 2000)
        .map(BoundedText::into_inner)
        .map_err(ApiError::Validation)
}

pub fn parse_image_url(url: String) -> Result<String, ApiError> {
    ImageUrl::parse(url)
        .map(ImageUrl::into_inner)
        .map_err(ApiError::Validation)
}

pub fn parse_price(price: i64) -> Result<i64, ApiError> {
    if price > 0 {
        Ok(price)
    } else {
        Err(ApiError::Validation("price must be a positive amount".into()))
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct DishJson{
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub price: i64
}

#[tracing::instrument(
    "Posting dish",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn create_dish(
    repo: web::Data<dyn Repository>,
    json: web::Json<DishJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::Dish, Action::Create, Ownership::Own)?;

    let json = json.into_inner();
    let now = Utc::now();
    let dish = Dish{
        id: Uuid::new_v4(),
        name: parse_dish_name(json.name)?,
        description: parse_dish_description(json.description)?,
        image_url: parse_image_url(json.image_url)?,
        price: parse_price(json.price)?,
        user_id: Some(actor.user_id),
        created_at: now,
        updated_at: now
    };

    let view = run_blocking(&repo, move |repo| {
        let dish = repo.insert_dish(dish)?;
        Ok(dish_view(repo, dish)?)
    })
    .await?;

    Ok(HttpResponse::Created().json(view))
}
