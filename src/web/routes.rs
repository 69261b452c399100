//! Web 路由定义

use std::sync::Arc;

use axum::Router;

use crate::web::{handlers::proxy_handler, types::AppState};

/// 创建路由结构
///
/// 边缘代理不占用任何路径，所有请求（任意方法）都交给代理处理器。
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new().fallback(proxy_handler)
}
