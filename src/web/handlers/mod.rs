//! Web 路由处理器

pub mod proxy;

pub use proxy::proxy_handler;
