//! Headless LibreOffice conversion for legacy Word documents.
//!
//! `.doc` files are converted to `.docx` with `soffice --headless
//! --convert-to docx` and then decoded like any other OOXML package.
//! The binary is looked up in `DOCFLOW_LIBREOFFICE_PATH`, `SOFFICE_PATH`,
//! `LIBREOFFICE_PATH`, the usual install locations and finally `PATH`.

use crate::{DocflowError, Result};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::process::Command;
use tokio::time::{Duration, timeout};

pub use crate::core::config::DEFAULT_LIBREOFFICE_TIMEOUT_SECS;

/// Scratch directory removed when dropped.
struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    async fn create(prefix: &str) -> Result<Self> {
        let path = env::temp_dir().join(format!("docflow_{}_{}", prefix, uuid::Uuid::new_v4()));
        fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            tracing::debug!(path = %self.path.display(), error = %e, "Failed to remove scratch directory");
        }
    }
}

fn install_message() -> String {
    "LibreOffice (soffice) is required to decode legacy Word documents (.doc). \
Install it with your package manager, or set DOCFLOW_LIBREOFFICE_PATH to the soffice executable."
        .to_string()
}

fn soffice_candidates() -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    let mut push_candidate = |path: PathBuf| {
        if seen.insert(path.clone()) {
            candidates.push(path);
        }
    };

    for var in ["DOCFLOW_LIBREOFFICE_PATH", "SOFFICE_PATH", "LIBREOFFICE_PATH"] {
        if let Some(value) = env::var_os(var).filter(|v| !v.is_empty()) {
            push_candidate(PathBuf::from(value));
        }
    }

    if cfg!(target_os = "macos") {
        push_candidate(PathBuf::from("/Applications/LibreOffice.app/Contents/MacOS/soffice"));
    }

    if cfg!(target_os = "windows") {
        push_candidate(PathBuf::from("C:\\Program Files\\LibreOffice\\program\\soffice.exe"));
    }

    if let Some(path_env) = env::var_os("PATH") {
        for dir in env::split_paths(&path_env) {
            push_candidate(dir.join("soffice"));
            push_candidate(dir.join("libreoffice"));
            push_candidate(dir.join("soffice.exe"));
        }
    }

    candidates
}

/// First existing soffice executable, or `MissingDependency`.
pub fn locate_soffice() -> Result<PathBuf> {
    soffice_candidates()
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| DocflowError::MissingDependency(install_message()))
}

/// Convert `input_path` to `target_format` inside `output_dir`.
pub async fn convert_office_doc(
    soffice: &Path,
    input_path: &Path,
    output_dir: &Path,
    target_format: &str,
    timeout_secs: u64,
) -> Result<Vec<u8>> {
    let child = Command::new(soffice)
        .arg("--headless")
        .arg("--convert-to")
        .arg(target_format)
        .arg("--outdir")
        .arg(output_dir)
        .arg(input_path)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| DocflowError::parsing(format!("Failed to execute LibreOffice at '{}': {}", soffice.display(), e)))?;

    let output = match timeout(Duration::from_secs(timeout_secs), child.wait_with_output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => return Err(DocflowError::parsing(format!("Failed to wait for LibreOffice: {}", e))),
        Err(_) => {
            return Err(DocflowError::parsing(format!(
                "LibreOffice conversion timed out after {} seconds",
                timeout_secs
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(DocflowError::parsing(format!(
            "LibreOffice conversion failed with code {}: {}",
            output.status.code().unwrap_or(-1),
            if stderr.trim().is_empty() { stdout } else { stderr }
        )));
    }

    let stem = input_path
        .file_stem()
        .ok_or_else(|| DocflowError::parsing("Invalid input file name"))?;
    let expected_output = output_dir.join(format!("{}.{}", stem.to_string_lossy(), target_format));

    let converted = fs::read(&expected_output)
        .await
        .map_err(|e| DocflowError::parsing(format!("LibreOffice produced no output file: {}", e)))?;

    if converted.is_empty() {
        return Err(DocflowError::parsing("LibreOffice conversion produced an empty file"));
    }

    Ok(converted)
}

/// Convert legacy `.doc` bytes to `.docx` bytes.
pub async fn convert_doc_to_docx(doc_bytes: &[u8], timeout_secs: u64) -> Result<Vec<u8>> {
    let soffice = locate_soffice()?;

    let input_dir = ScratchDir::create("doc").await?;
    let output_dir = ScratchDir::create("doc_out").await?;

    let input_path = input_dir.path().join("input.doc");
    fs::write(&input_path, doc_bytes).await?;

    tracing::debug!(soffice = %soffice.display(), bytes = doc_bytes.len(), "Converting .doc via LibreOffice");
    convert_office_doc(&soffice, &input_path, output_dir.path(), "docx", timeout_secs).await
}
