use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::ORDER_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::OrderStatus,
    repository::{run_blocking, Repository},
    views::order_view
};

// Any status may follow any other
#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusJson{
    pub status: Option<OrderStatus>
}

#[tracing::instrument(
    "Updating order status",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn update_order(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    json: web::Json<UpdateOrderStatusJson>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();
    let status = json.into_inner().status;

    let view = run_blocking(&repo, move |repo| {
        let order = repo.find_order(order_id)?
            .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
        authorize(&actor, Resource::Order, Action::UpdateStatus, Ownership::of(&actor, order.order.user_id))?;

        let order = match status {
            Some(status) => repo.update_order_status(order_id, status)
                .map_err(|e| ApiError::from_store(e, ORDER_NOT_FOUND, "Order could not be updated"))?,
            None => order
        };

        Ok(order_view(repo, order)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
