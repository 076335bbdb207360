use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use super::{parse_dish_description, parse_dish_name, parse_image_url, parse_price, DISH_NOT_FOUND};
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::DishChanges,
    repository::{run_blocking, Repository},
    views::dish_view
};

// Only present fields change
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishJson{
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub price: Option<i64>
}

impl UpdateDishJson {
    fn into_changes(self) -> Result<DishChanges, ApiError> {
        Ok(DishChanges{
            name: self.name.map(parse_dish_name).transpose()?,
            description: self.description.map(parse_dish_description).transpose()?,
            image_url: self.image_url.map(parse_image_url).transpose()?,
            price: self.price.map(parse_price).transpose()?,
            updated_at: Some(Utc::now())
        })
    }
}

#[tracing::instrument(
    "Updating dish",
    skip(repo, json, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn update_dish(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    json: web::Json<UpdateDishJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let dish_id = path.into_inner();
    let changes = json.into_inner().into_changes()?;

    let view = run_blocking(&repo, move |repo| {
        let dish = repo.find_dish(dish_id)?
            .ok_or_else(|| ApiError::NotFound(DISH_NOT_FOUND.into()))?;
        let ownership = dish.user_id
            .map_or(Ownership::Other, |owner| Ownership::of(&actor, owner));
        authorize(&actor, Resource::Dish, Action::Update, ownership)?;

        let dish = repo.update_dish(dish_id, changes)
            .map_err(|e| ApiError::from_store(e, DISH_NOT_FOUND, "Dish could not be updated"))?;
        Ok(dish_view(repo, dish)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
