use config::ConfigError;
use serde::Deserialize;

#[derive(Deserialize, Clone, Debug)]
pub struct Settings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub log: LogSettings,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct SessionSettings {
    pub path: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct LogSettings {
    pub filter: String,
}

impl Settings {
    /// Defaults, then `foro.toml`, then `foro.{RUN_MODE}.toml`, then `FORO_*` variables
    /// (`FORO_API__BASE_URL` sets `api.base_url`). An explicit file replaces the two files.
    pub fn new(explicit_file: Option<&str>) -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let mut builder = config::Config::builder()
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default("api.timeout_secs", 15)?
            .set_default("session.path", ".foro/session.json")?
            .set_default("log.filter", "warn")?;

        builder = match explicit_file {
            Some(path) => builder.add_source(config::File::with_name(path)),
            None => builder
                .add_source(config::File::with_name("foro").required(false))
                .add_source(
                    config::File::with_name(&format!("foro.{}", run_mode)).required(false),
                ),
        };

        builder
            .add_source(
                config::Environment::with_prefix("FORO")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_point_at_local_api() {
        let s = Settings::new(None).unwrap();
        assert!(s.api.base_url.ends_with("/api"));
        assert!(s.api.timeout_secs > 0);
    }

    #[test]
    fn explicit_file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("foro-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("custom.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[api]\nbase_url = \"https://forum.example/api\"\ntimeout_secs = 3").unwrap();

        let s = Settings::new(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(s.api.base_url, "https://forum.example/api");
        assert_eq!(s.api.timeout_secs, 3);
        assert_eq!(s.session.path, ".foro/session.json");
        std::fs::remove_dir_all(&dir).ok();
    }
}
