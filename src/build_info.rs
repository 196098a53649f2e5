use serde::Serialize;

pub const SERVICE: &str = "health-connect";
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const COMMIT: &str = match option_env!("BUILD_COMMIT") {
    Some(c) => c,
    None => "unknown",
};

/// Build metadata reported by `GET /version`.
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
    pub commit: &'static str,
}

impl BuildInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            service: SERVICE,
            version: VERSION,
            commit: COMMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_build_info_is_populated() {
        let info = BuildInfo::current();
        assert_eq!(info.service, "health-connect");
        assert_eq!(info.version, VERSION);
        assert!(!info.commit.is_empty());
    }
}
