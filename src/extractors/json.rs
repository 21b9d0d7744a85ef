//! JSON body extractor that runs the payload's schema before the handler sees it.

use crate::error::AppError;
use crate::validation::Schema;
use async_trait::async_trait;
use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde_json::Value;

/// A request body that passed [`Schema::load`]. A failed schema rejects with the
/// 400 field map; body-level rejections keep axum's status (400, 413, or 415).
#[derive(Clone, Debug)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: Schema + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Rejected(rejection.status(), rejection.body_text()))?;
        let payload = T::load(value)?;
        Ok(ValidatedJson(payload))
    }
}
