//! Prompt template read from a local text file.

use crate::PromptSource;
use async_trait::async_trait;
use prompter_core::error::BotError;
use std::path::PathBuf;

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PromptSource for FileSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<String, BotError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| BotError::Prompt(format!("failed to read {}: {e}", self.path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_reads_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        std::fs::write(&path, "Answer: {{user_message}}\n").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), "Answer: {{user_message}}\n");
        assert!(source.describe().contains("prompt.txt"));
    }

    #[tokio::test]
    async fn test_missing_file_is_prompt_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("nope.txt"));
        let err = source.fetch().await.unwrap_err();
        assert!(matches!(err, BotError::Prompt(_)));
        assert!(err.to_string().contains("nope.txt"));
    }
}
