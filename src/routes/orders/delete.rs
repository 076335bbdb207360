use actix_web::{web, HttpResponse};
use uuid::Uuid;

use super::ORDER_NOT_FOUND;
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
    "Deleting order by id",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn delete_order(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();

    run_blocking(&repo, move |repo| {
        let order = repo.find_order(order_id)?
            .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
        authorize(&actor, Resource::Order, Action::Delete, Ownership::of(&actor, order.order.user_id))?;

        repo.delete_order(order_id)
            .map_err(|e| ApiError::from_store(e, ORDER_NOT_FOUND, "Order could not be deleted"))
    })
    .await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Order deleted successfully")))
}
