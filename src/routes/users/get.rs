use actix_web::{web, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;

use super::USER_NOT_FOUND;
use crate::{
    auth::{
        extractors::AuthenticatedUser,
        policy::{authorize, Action, Ownership, Resource}
    },
    error::ApiError,
    models::Role,
    repository::{run_blocking, Repository, UserFilter},
    utils::{PageQuery, PageRequest, Paginated, Pagination},
    views::PublicUser
};

#[derive(Deserialize, Debug)]
pub struct UserQuery{
    pub role: Option<Role>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>
}

#[tracing::instrument(
    "Get list of users",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn list_users(
    repo: web::Data<dyn Repository>,
    query: web::Query<UserQuery>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    authorize(&actor, Resource::User, Action::Read, Ownership::Other)?;

    let query = query.into_inner();
    let page = PageRequest::try_from(PageQuery{ page: query.page, limit: query.limit })?;
    let filter = UserFilter{
        role: query.role,
        search: query.search
            .map(|search| search.trim().to_string())
            .filter(|search| !search.is_empty())
    };

    let body = run_blocking(&repo, move |repo| {
        let (users, total) = repo.list_users(&filter, page)?;

        Ok(Paginated{
            items: users.into_iter().map(PublicUser::from).collect(),
            pagination: Pagination::new(page, total)
        })
    })
    .await?;

    Ok(HttpResponse::Ok().json(body))
}

#[tracing::instrument(
    "Get user by id",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn get_user(
    repo: web::Data<dyn Repository>,
    path: web::Path<Uuid>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    authorize(&actor, Resource::User, Action::Read, Ownership::of(&actor, id))?;

    let user = run_blocking(&repo, move |repo| {
        repo.find_user(id)?
            .ok_or_else(|| ApiError::NotFound(USER_NOT_FOUND.into()))
    })
    .await?;

    Ok(HttpResponse::Ok().json(PublicUser::from(user)))
}
