//! Setting value validation.

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "TWITCH_CLIENT_ID" | "TWITCH_CLIENT_SECRET" => {
            if value.trim().is_empty() {
                return Err("must not be empty".into());
            }
        }
        "PORT" => {
            let v: u16 = value.parse().map_err(|_| "must be a port number")?;
            if v == 0 {
                return Err("must be between 1 and 65535".into());
            }
        }
        "EMOTE_CACHE_TTL_SECS" => validate_int_range(value, 1, 7 * 24 * 3600)?,
        "TOKEN_REFRESH_MARGIN_SECS" => validate_int_range(value, 0, 3600)?,
        "REDIS_URL" => {
            let supported = ["memory://", "redis://", "rediss://"];
            if !supported.iter().any(|scheme| value.starts_with(scheme)) {
                return Err("must start with memory://, redis:// or rediss://".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: u64, max: u64) -> Result<(), String> {
    let v: u64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
