use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use tether::TransportConfig;

use crate::cli::CommonArgs;

/// TOML config file structure
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Socket settings
    pub socket: SocketSection,

    /// Canned answers for two-way channels
    pub responses: ResponsesSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SocketSection {
    pub path: Option<PathBuf>,
    pub max_frame_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResponsesSection {
    pub window_focused: Option<bool>,
    pub open_external: Option<bool>,
    pub move_to_trash: Option<bool>,
    pub proxy: Option<String>,
    /// Index path picked from every contextual menu; absent means dismissed
    pub menu_selection: Option<Vec<usize>>,
    /// Paths picked from every open dialog; absent means cancelled
    pub open_dialog: Option<Vec<PathBuf>>,
}

/// Answers given by `serve`
#[derive(Debug, Clone)]
pub struct Responses {
    pub window_focused: bool,
    pub open_external: bool,
    pub move_to_trash: bool,
    pub proxy: String,
    pub menu_selection: Option<Vec<usize>>,
    pub open_dialog: Option<Vec<PathBuf>>,
}

impl Default for Responses {
    fn default() -> Self {
        Self {
            window_focused: true,
            open_external: true,
            move_to_trash: true,
            proxy: "DIRECT".to_string(),
            menu_selection: None,
            open_dialog: None,
        }
    }
}

/// Merged configuration from file + CLI
pub struct MergedConfig {
    pub transport: TransportConfig,
    pub responses: Responses,
}

/// Load config from file
pub fn load_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config file: {}", path.display()))?;
            let config: FileConfig = toml::from_str(&content)
                .with_context(|| format!("failed to parse config file: {}", path.display()))?;
            Ok(config)
        }
        None => Ok(FileConfig::default()),
    }
}

/// Merge file config with CLI args (CLI takes precedence)
pub fn merge_config(file: FileConfig, cli: &CommonArgs) -> Result<MergedConfig> {
    // Socket path: CLI (or env) > file
    let socket_path = cli
        .socket
        .clone()
        .or(file.socket.path)
        .with_context(|| {
            format!(
                "no socket path: pass --socket, set {}, or add [socket] path to the config",
                tether::SOCKET_ENV
            )
        })?;

    let mut builder = TransportConfig::builder(socket_path);
    if let Some(len) = cli.max_frame_len.or(file.socket.max_frame_len) {
        if len == 0 {
            anyhow::bail!("max_frame_len must be greater than zero");
        }
        builder = builder.max_frame_len(len);
    }

    let defaults = Responses::default();
    let file = file.responses;
    let responses = Responses {
        window_focused: file.window_focused.unwrap_or(defaults.window_focused),
        open_external: file.open_external.unwrap_or(defaults.open_external),
        move_to_trash: file.move_to_trash.unwrap_or(defaults.move_to_trash),
        proxy: file.proxy.unwrap_or(defaults.proxy),
        menu_selection: file.menu_selection,
        open_dialog: file.open_dialog,
    };

    Ok(MergedConfig {
        transport: builder.build(),
        responses,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(socket: Option<&str>) -> CommonArgs {
        CommonArgs {
            socket: socket.map(PathBuf::from),
            max_frame_len: None,
        }
    }

    #[test]
    fn test_parse_and_merge() {
        let file: FileConfig = toml::from_str(
            r#"
            [socket]
            path = "/tmp/from-file.sock"
            max_frame_len = 4096

            [responses]
            window_focused = false
            proxy = "PROXY corp:8080"
            menu_selection = [0, 2]
            "#,
        )
        .unwrap();

        let merged = merge_config(file, &args(None)).unwrap();
        assert_eq!(merged.transport.socket_path(), Path::new("/tmp/from-file.sock"));
        assert_eq!(merged.transport.max_frame_len(), 4096);
        assert!(!merged.responses.window_focused);
        assert!(merged.responses.open_external);
        assert_eq!(merged.responses.proxy, "PROXY corp:8080");
        assert_eq!(merged.responses.menu_selection, Some(vec![0, 2]));
        assert_eq!(merged.responses.open_dialog, None);
    }

    #[test]
    fn test_cli_socket_wins() {
        let file: FileConfig = toml::from_str("[socket]\npath = \"/tmp/file.sock\"").unwrap();
        let merged = merge_config(file, &args(Some("/tmp/cli.sock"))).unwrap();
        assert_eq!(merged.transport.socket_path(), Path::new("/tmp/cli.sock"));
    }

    #[test]
    fn test_missing_socket_is_an_error() {
        assert!(merge_config(FileConfig::default(), &args(None)).is_err());
    }
}
