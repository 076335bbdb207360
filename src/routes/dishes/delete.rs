use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::DISH_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    repository::{run_blocking, Repository},
    utils::MessageResponse
};

#[tracing::instrument(
    "Deleting dish by id",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn delete_dish(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let dish_id = path.into_inner();

    run_blocking(&repo, move |repo| {
        let dish = repo.find_dish(dish_id)?
            .ok_or_else(|| ApiError::NotFound(DISH_NOT_FOUND.into()))?;
        let ownership = dish.user_id
            .map_or(Ownership::Other, |owner| Ownership::of(&actor, owner));
        authorize(&actor, Resource::Dish, Action::Delete, ownership)?;

        repo.delete_dish(dish_id)
            .map_err(|e| ApiError::from_store(e, DISH_NOT_FOUND, "Dish is part of existing orders"))
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Dish deleted successfully")))
}
