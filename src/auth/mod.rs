// 认证模块
// 令牌签发校验与会话生命周期

pub mod service;
pub mod token;

pub use service::{AuthService, LoginOutcome, ProfileUpdate, Registration};
pub use token::{Claims, TokenIssuer, TokenType};
