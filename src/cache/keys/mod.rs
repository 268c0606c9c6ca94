/// 刷新令牌缓存键前缀
const REFRESH_TOKEN_PREFIX: &str = "refresh:";

/// 生成用户刷新令牌缓存键
pub fn refresh_token_key(email: &str) -> String {
    format!("{}{}", REFRESH_TOKEN_PREFIX, email)
}

/// 生成限流计数键
pub fn rate_limit_key(ip: &str) -> String {
    format!("rate_limit:{}", ip)
}
