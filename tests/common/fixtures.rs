//! Artifact fixtures and canned Bot API replies

use std::path::PathBuf;
use tempfile::TempDir;

/// Successful `sendDocument` reply
pub const SEND_OK: &str = r#"{"ok":true,"result":{"message_id":77,"document":{"file_name":"build.zip"}}}"#;

/// Successful reopen reply
pub const REOPEN_OK: &str = r#"{"ok":true,"result":true}"#;

/// Reply for an upload into a closed forum topic
pub const TOPIC_CLOSED: &str =
    r#"{"ok":false,"error_code":400,"description":"Bad Request: TOPIC_CLOSED"}"#;

/// Reply for an upload to an unknown chat
pub const CHAT_NOT_FOUND: &str =
    r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#;

/// Reply for a reopen call that names no existing topic
pub const THREAD_NOT_FOUND: &str =
    r#"{"ok":false,"error_code":400,"description":"Bad Request: message thread not found"}"#;

/// Reply when the bot lacks the rights to manage topics
pub const NOT_ENOUGH_RIGHTS: &str = r#"{"ok":false,"error_code":400,"description":"Bad Request: not enough rights to manage topics"}"#;

/// Output directory holding one archive
pub struct ArtifactDir {
    /// Keeps the directory alive for the test
    pub dir: TempDir,
    /// Glob matching the archive
    pub pattern: String,
    /// Path of the archive
    pub path: PathBuf,
}

/// Create `output/<name>` with `contents` inside a fresh temp dir
pub fn artifact_dir(name: &str, contents: &[u8]) -> ArtifactDir {
    let dir = TempDir::new().expect("temp dir");
    let output = dir.path().join("output");
    std::fs::create_dir(&output).expect("create output dir");
    let path = output.join(name);
    std::fs::write(&path, contents).expect("write artifact");
    let pattern = output.join("*.zip").to_string_lossy().into_owned();
    ArtifactDir { dir, pattern, path }
}

/// Create an empty `output/` directory
pub fn empty_output_dir() -> ArtifactDir {
    let dir = TempDir::new().expect("temp dir");
    let output = dir.path().join("output");
    std::fs::create_dir(&output).expect("create output dir");
    let pattern = output.join("*.zip").to_string_lossy().into_owned();
    ArtifactDir {
        path: output.clone(),
        dir,
        pattern,
    }
}
