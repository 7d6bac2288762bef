use anyhow::Context;
use domain::Viewer;
use std::{fs, path::PathBuf};

/// The signed-in viewer, kept on disk between invocations.
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> anyhow::Result<Option<Viewer>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session file {}", self.path.display()))?;
        match serde_json::from_str(&raw) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!("Ignoring corrupt session file {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    pub fn save(&self, viewer: &Viewer) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(viewer)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write session file {}", self.path.display()))
    }

    pub fn clear(&self) -> anyhow::Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.path)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::UserId;

    #[test]
    fn save_load_clear() {
        let dir = std::env::temp_dir().join(format!("foro-session-{}", std::process::id()));
        let file = SessionFile::new(dir.join("nested").join("session.json"));
        assert_eq!(file.load().unwrap(), None);

        let viewer = Viewer {
            id: UserId::new("4").unwrap(),
            username: "ana".to_string(),
            display_name: Some("Ana".to_string()),
        };
        file.save(&viewer).unwrap();
        assert_eq!(file.load().unwrap(), Some(viewer));

        assert!(file.clear().unwrap());
        assert!(!file.clear().unwrap());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn corrupt_file_reads_as_signed_out() {
        let dir = std::env::temp_dir().join(format!("foro-corrupt-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("session.json");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(SessionFile::new(&path).load().unwrap(), None);
        fs::remove_dir_all(&dir).ok();
    }
}
