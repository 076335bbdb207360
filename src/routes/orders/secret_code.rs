use actix_web::{web, HttpResponse};
use chrono::Utc;
use rand::Rng;

use super::ORDER_NOT_FOUND;
use crate::{
    auth::extractors::AuthenticatedUser,
    error::ApiError,
    repository::{run_blocking, Repository},
    views::order_view
};

const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const CODE_SUFFIX_LENGTH: usize = 6;

// `FF-<unix millis>-<6 upper-case base36 chars>`, uniqueness is enforced by the store
pub fn generate_secret_code() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..CODE_SUFFIX_LENGTH)
        .map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char)
        .collect();

    format!("FF-{}-{}", Utc::now().timestamp_millis(), suffix)
}

#[tracing::instrument(
    "Getting order by secret code",
    skip(repo, actor),
    fields(user_id = %actor.user_id)
)]
pub async fn get_order_by_code(
    repo: web::Data<dyn Repository>,
    path: web::Path<String>,
    actor: AuthenticatedUser
) -> Result<HttpResponse, ApiError> {
    let secret_code = path.into_inner();

    let view = run_blocking(&repo, move |repo| {
        let order = repo.find_order_by_code(&secret_code)?
            .ok_or_else(|| ApiError::NotFound(ORDER_NOT_FOUND.into()))?;
        Ok(order_view(repo, order)?)
    })
    .await?;

    Ok(HttpResponse::Ok().json(view))
}
