// External tool plumbing
//
// Every external service the pipeline talks to (speech synthesis, duration
// probing, scene rendering) is a command-line program. This module holds the
// command representation and builders shared by the service implementations:
// - Commands: command builders and execution

pub mod commands;

pub use commands::*;

use tracing::{debug, info};

use crate::error::{Result, BlackboardError};

/// Check that a tool can be launched and report the first line of its version output
pub async fn check_tool(binary_path: &str, version_flag: &str) -> Result<String> {
    let output = MediaCommandBuilder::new(binary_path)
        .version_check(version_flag)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BlackboardError::ToolUnavailable(format!(
            "{} version check failed: {}",
            binary_path,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    // Some tools print their banner on stderr
    let version = stdout
        .lines()
        .chain(stderr.lines())
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("Unknown version")
        .to_string();

    debug!("{} reports: {}", binary_path, version);
    info!("{} is available", binary_path);
    Ok(version)
}

/// Write an executable `sh` script standing in for an external tool
#[cfg(all(test, unix))]
pub(crate) fn write_fake_tool(dir: &std::path::Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path.to_string_lossy().into_owned()
}
