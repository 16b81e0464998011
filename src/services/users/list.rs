use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::UserService;
use crate::models::{
    ApiResponse,
    users::requests::{UserListParams, UserListQuery},
};

pub async fn list_users(
    service: &UserService,
    query: UserListParams,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = query.pagination.normalized();
    let list_query = UserListQuery {
        page,
        size,
        role: query.role,
        status: query.status,
        search: query.search,
    };

    let response = service
        .get_storage(request)
        .list_users_with_pagination(list_query)
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::success(
        response,
        "User list retrieved successfully",
    )))
}
