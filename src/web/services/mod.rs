//! 服务层模块
//!
//! 封装边缘代理依赖的上游服务

pub mod upstream;

pub use upstream::UpstreamClient;
