//! Register User Handler

use std::sync::Arc;

use salvo::{
    oapi::{ToSchema, extract::JsonBody},
    prelude::*,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use storefront_app::{
    auth::{generate_token, hash_token},
    domain::users::{
        data::NewUser,
        records::{Role, UserUuid},
    },
};

use crate::{extensions::*, state::State, users::errors::into_status_error};

/// Register User Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct RegisterUserRequest {
    pub email: String,
}

/// Registered User Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RegisteredUserResponse {
    #[serde(rename = "userID")]
    pub user_id: Uuid,

    pub email: String,

    pub role: String,

    /// Bearer token for the new account. Only returned once.
    pub api_token: String,
}

/// Register User Handler
///
/// Self-registration always creates a regular user. Admins are created with
/// the `storefront-app user create` command.
#[endpoint(
    tags("users"),
    summary = "Register User",
    responses(
        (status_code = StatusCode::CREATED, description = "User registered"),
        (status_code = StatusCode::CONFLICT, description = "Email is already registered"),
        (status_code = StatusCode::BAD_REQUEST, description = "Bad Request"),
        (status_code = StatusCode::INTERNAL_SERVER_ERROR, description = "Internal Server Error"),
    ),
)]
pub(crate) async fn handler(
    json: JsonBody<RegisterUserRequest>,
    depot: &mut Depot,
    res: &mut Response,
) -> Result<Json<RegisteredUserResponse>, StatusError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let email = json.into_inner().email.trim().to_lowercase();

    if email.is_empty() || !email.contains('@') {
        return Err(StatusError::bad_request().brief("A valid email is required"));
    }

    let token = generate_token();

    let user = state
        .app
        .users
        .register(NewUser {
            uuid: UserUuid::new(),
            email,
            role: Role::User,
            token_hash: hash_token(&token),
        })
        .await
        .map_err(into_status_error)?;

    res.status_code(StatusCode::CREATED);

    Ok(Json(RegisteredUserResponse {
        user_id: user.uuid.into_uuid(),
        email: user.email,
        role: user.role.to_string(),
        api_token: token,
    }))
}
