//! Structured arguments carried by catalogue channels

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// X.509 certificate presented to the user in a trust dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    /// PEM encoded data
    pub data: String,
    pub issuer_name: String,
    pub subject_name: String,
    pub serial_number: String,
    /// Start date, seconds since the UNIX epoch
    pub valid_start: i64,
    /// Expiry date, seconds since the UNIX epoch
    pub valid_expiry: i64,
    pub fingerprint: String,
}

/// Labels the host uses when rebuilding the application menu
///
/// Menu item text depends on front-end preferences (the configured shell or
/// editor, whether a confirmation dialog follows), so the front-end pushes
/// them whenever they change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MenuLabels {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_shell: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_external_editor: Option<String>,
    pub ask_for_confirmation_on_repository_removal: bool,
    pub ask_for_confirmation_on_force_push: bool,
    pub ask_for_confirmation_when_stashing_all_changes: bool,
    pub is_force_push_for_current_repository: bool,
    pub is_stashed_changes_visible: bool,
    pub has_current_pull_request: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contribution_target_default_branch: Option<String>,
}

/// Options for the native open dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenDialogOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_label: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FileFilter>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<DialogProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl OpenDialogOptions {
    /// Whether the user may pick more than one entry
    pub fn allows_multiple(&self) -> bool {
        self.properties.contains(&DialogProperty::MultiSelections)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFilter {
    pub name: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DialogProperty {
    OpenFile,
    OpenDirectory,
    MultiSelections,
    ShowHiddenFiles,
    CreateDirectory,
    PromptToCreate,
}
