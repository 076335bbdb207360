use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::ORDER_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, is_allowed, Action, Ownership, Resource}
    },
    error::ApiError,
    models::OrderStatus,
    repository::{run_blocking, OrderFilter, Repository},
    utils::{PageQuery, PageRequest, Paginated, Pagination},
    views::{order_view, order_views}
};

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderQuery{
    pub user_id: Option<Uuid>,
    pub status: Option<OrderStatus>,
    pub page: Option<i64>,
    pub limit: Option<i64>
}

#[tracing::instrument(
    "Getting list of orders",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn list_orders(
    repo: web::Data<dyn Repository>,
    query: web::Query<OrderQuery>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let page = PageRequest::try_from(PageQuery{ page: query.page, limit: query.limit })?;

    // Callers limited to their own orders cannot widen the filter
    let user_id = if is_allowed(actor.role, Resource::Order, Action::Read, Ownership::Other) {
        query.user_id
    } else {
        Some(actor.user_id)
    };
    let filter = OrderFilter{ user_id, status: query.status };

    let body = run_blocking(&repo, move |repo| {
        let (orders, total) = repo.list_orders(&filter, page)?;

        Ok(Paginated{
            items: order_views(repo, orders)?,
            pagination: Pagination::new(page, total)
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(body))
}

#[tracing::instrument(
    "Getting order along with its items",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn get_order(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let order_id = path.into_inner();

    let view = run_blocking(&repo, move |repo| {
        let order = repo.find_order(order_id)?
            .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
        authorize(&actor, Resource::Order, Action::Read, Ownership::of(&actor, order.order.user_id))?;

        Ok(order_view(repo, order)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
