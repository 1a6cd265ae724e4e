//! Roster read endpoints: users, friends, pending friend requests.

use axum::Json;
use axum::extract::State;

use letstalk_entity::user::UserProfile;
use letstalk_service::roster::FriendRequestView;

use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users — verified users the caller could befriend.
pub async fn get_users(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, ApiError> {
    let users = state.roster.discoverable_users(user.context()).await?;
    Ok(Json(ApiResponse::ok(
        users,
        "All users fetched successfully!",
    )))
}

/// GET /api/friends — the caller's friends.
pub async fn get_friends(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserProfile>>>, ApiError> {
    let friends = state.roster.friends(user.context()).await?;
    Ok(Json(ApiResponse::ok(
        friends,
        "All friends fetched successfully!",
    )))
}

/// GET /api/friend-requests — requests pending for the caller.
pub async fn get_friend_requests(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApiResponse<Vec<FriendRequestView>>>, ApiError> {
    let requests = state.roster.pending_requests(user.context()).await?;
    Ok(Json(ApiResponse::ok(
        requests,
        "All requests fetched successfully!",
    )))
}
