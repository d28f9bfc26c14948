use std::path::PathBuf;

use anyhow::Context as _;
use async_trait::async_trait;
use tokio::io::AsyncWriteExt as _;

/// Hands the finished archive to the user.
#[async_trait]
pub trait Saver: Send + Sync {
    async fn save(&self, blob: &[u8], file_name: &str) -> anyhow::Result<PathBuf>;
}

#[derive(Debug, Clone)]
pub struct LocalDirSaver {
    out_dir: PathBuf,
    force: bool,
}

impl LocalDirSaver {
    pub fn new(out_dir: impl Into<PathBuf>, force: bool) -> Self {
        Self {
            out_dir: out_dir.into(),
            force,
        }
    }
}

#[async_trait]
impl Saver for LocalDirSaver {
    async fn save(&self, blob: &[u8], file_name: &str) -> anyhow::Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) || file_name == ".." {
            anyhow::bail!("archive name must be a plain file name: {file_name:?}");
        }

        tokio::fs::create_dir_all(&self.out_dir)
            .await
            .with_context(|| format!("create output dir: {}", self.out_dir.display()))?;

        let path = self.out_dir.join(file_name);
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        if self.force {
            options.create(true).truncate(true);
        } else {
            options.create_new(true);
        }
        let mut file = options
            .open(&path)
            .await
            .with_context(|| format!("open archive output: {}", path.display()))?;
        file.write_all(blob)
            .await
            .with_context(|| format!("write archive: {}", path.display()))?;
        file.flush()
            .await
            .with_context(|| format!("flush archive: {}", path.display()))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn refuses_to_overwrite_without_force() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let saver = LocalDirSaver::new(temp.path(), false);

        let path = saver.save(b"one", "audio_files.zip").await?;
        assert_eq!(std::fs::read(&path)?, b"one");

        let err = saver.save(b"two", "audio_files.zip").await.unwrap_err();
        assert!(format!("{err:#}").contains("open archive output"));
        assert_eq!(std::fs::read(&path)?, b"one");
        Ok(())
    }

    #[tokio::test]
    async fn force_overwrites() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let saver = LocalDirSaver::new(temp.path().join("nested"), true);

        saver.save(b"one", "a.zip").await?;
        let path = saver.save(b"two", "a.zip").await?;
        assert_eq!(std::fs::read(path)?, b"two");
        Ok(())
    }

    #[tokio::test]
    async fn rejects_path_like_names() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let saver = LocalDirSaver::new(temp.path(), false);
        assert!(saver.save(b"x", "../escape.zip").await.is_err());
        Ok(())
    }
}
