//! Server-side configuration, loaded from a TOML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub server: ListenConfig,
    pub storage: StorageConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListenConfig {
    /// Listen address; the --listen flag wins when both are set.
    #[serde(default)]
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory for the database and uploaded files.
    pub data_dir: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// HMAC secret shared with the identity service.
    pub secret: String,
}

impl ServerConfig {
    /// A bare name resolves to `/etc/hosteld/<name>.toml`; anything with a
    /// path separator or an extension is used as-is.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from(format!("/etc/hosteld/{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&content)?;
        config.verify()?;
        Ok(config)
    }

    fn verify(&self) -> anyhow::Result<()> {
        if self.jwt.secret.is_empty() {
            anyhow::bail!("JWT secret is empty in configuration.");
        }
        if self.storage.data_dir.is_empty() {
            anyhow::bail!("Storage data_dir is empty in configuration.");
        }
        Ok(())
    }

    pub fn sqlite_path(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("hostel.db")
    }

    pub fn blob_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.data_dir).join("blob")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_name_resolves_to_etc() {
        assert_eq!(
            ServerConfig::resolve_path("prod"),
            PathBuf::from("/etc/hosteld/prod.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./local.toml"),
            PathBuf::from("./local.toml")
        );
    }

    #[test]
    fn load_rejects_missing_secret() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/var/lib/hosteld\"\n[jwt]\nsecret = \"\"\n",
        )
        .unwrap();
        assert!(ServerConfig::load(&path).is_err());
    }

    #[test]
    fn load_parses_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.toml");
        std::fs::write(
            &path,
            "[storage]\ndata_dir = \"/var/lib/hosteld\"\n[jwt]\nsecret = \"s3cret\"\n",
        )
        .unwrap();
        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.sqlite_path(), PathBuf::from("/var/lib/hosteld/hostel.db"));
        assert_eq!(config.blob_dir(), PathBuf::from("/var/lib/hosteld/blob"));
    }
}
