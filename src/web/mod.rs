//! Web 服务器模块
//!
//! 边缘翻译代理：拦截源站响应，为带语言段的请求返回译文页面

pub mod config;
pub mod edge_cache;
pub mod handlers;
pub mod routes;
pub mod services;
pub mod types;

pub use config::WebConfig;
pub use edge_cache::EdgeCache;
pub use routes::create_routes;
pub use types::{AppState, CachedPage};

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::EdgeError;

const CACHE_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);

/// 边缘代理服务器
pub struct EdgeServer {
    config: WebConfig,
}

impl EdgeServer {
    pub fn new(config: WebConfig) -> Self {
        Self { config }
    }

    /// 启动服务器
    pub async fn start(&self) -> Result<(), EdgeError> {
        self.config
            .validate()
            .map_err(|e| EdgeError::new(&e.to_string()))?;

        let app_state = Arc::new(AppState::new(self.config.clone())?);
        spawn_cache_cleanup(app_state.clone());
        let app = create_router(app_state);

        let listener = tokio::net::TcpListener::bind(self.config.listen_address())
            .await
            .map_err(|e| EdgeError::new(&format!("Failed to bind server: {}", e)))?;

        tracing::info!(
            "Edge proxy listening at http://{} → {}",
            self.config.listen_address(),
            self.config.origin_url
        );

        axum::serve(listener, app)
            .await
            .map_err(|e| EdgeError::new(&format!("Server error: {}", e)))?;

        Ok(())
    }
}

/// 定期清理过期缓存
fn spawn_cache_cleanup(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            state.cleanup_expired();
        }
    });
}

/// 创建路由器
pub fn create_router(app_state: Arc<AppState>) -> Router {
    create_routes()
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
