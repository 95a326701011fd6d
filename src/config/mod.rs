//! Configuration resolution.

/// Resolve the listen address: explicit flag, then `TEMPUS_ADDR`, then
/// `PORT` (original deployment convention), then the default.
pub fn resolve_bind_addr(explicit: Option<&str>) -> String {
    if let Some(addr) = explicit {
        return addr.to_string();
    }

    if let Ok(addr) = std::env::var("TEMPUS_ADDR") {
        return addr;
    }

    if let Ok(port) = std::env::var("PORT") {
        return format!("127.0.0.1:{port}");
    }

    "127.0.0.1:3000".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_addr_wins() {
        assert_eq!(resolve_bind_addr(Some("0.0.0.0:9999")), "0.0.0.0:9999");
    }
}
