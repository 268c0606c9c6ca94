use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, patch, post, put},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors, require_admin},
    routes::{category, health, menu, user},
};

/// 创建 API 路由，公开路由与需要访问令牌的路由共用同一路径前缀
pub fn create_router(state: AppState) -> Router {
    let auth = from_fn_with_state(state.clone(), auth_middleware);
    // route_layer 后加的先执行，先认证再检查角色
    let admin = from_fn(require_admin);

    let api = Router::new()
        // 公开路由
        .route("/health", get(health::health))
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/refresh-token", post(user::refresh_token))
        // 用户路由
        .route("/logout", post(user::logout).route_layer(auth.clone()))
        .route("/user/detail", get(user::get_user).route_layer(auth.clone()))
        .route("/user/update", patch(user::update_user).route_layer(auth.clone()))
        .route("/user/delete", delete(user::delete_user).route_layer(auth.clone()))
        // 分类路由，列表公开，写操作仅限管理员
        .route(
            "/categories",
            get(category::list_categories).merge(
                post(category::create_category)
                    .route_layer(admin.clone())
                    .route_layer(auth.clone()),
            ),
        )
        .route(
            "/categories/{id}",
            get(category::get_category).route_layer(auth.clone()).merge(
                put(category::update_category)
                    .delete(category::delete_category)
                    .route_layer(admin.clone())
                    .route_layer(auth.clone()),
            ),
        )
        // 菜单路由，读取公开，写操作仅限管理员
        .route(
            "/menu",
            get(menu::list_menus).merge(
                post(menu::create_menu)
                    .route_layer(admin.clone())
                    .route_layer(auth.clone()),
            ),
        )
        .route(
            "/menu/{id}",
            get(menu::get_menu).merge(
                patch(menu::update_menu)
                    .delete(menu::delete_menu)
                    .route_layer(admin)
                    .route_layer(auth),
            ),
        );

    let base = state.config.api_base_uri.trim_end_matches('/');
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(base, api)
    };

    router.layer(from_fn(log_errors)).with_state(state)
}
