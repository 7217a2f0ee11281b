//! The channel catalogue
//!
//! Wire names are shared with the host implementation. Renaming one breaks
//! compatibility.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::channel::{Certificate, MenuLabels, OpenDialogOptions};
use crate::menu::SerializableMenuItem;
use crate::report::NormalizedError;

channels! {
    one_way {
        /// Select everything in the focused window
        SelectAllWindowContents = "select-all-window-contents"();

        /// Enable or disable an application menu item by id
        UpdateMenuState = "update-menu-state"(String, bool);

        /// The front-end finished loading and can receive events
        RendererReady = "renderer-ready"();

        ExecuteMenuItemById = "execute-menu-item-by-id"(String);

        /// Reveal a file in the platform file manager
        ShowItemInFolder = "show-item-in-folder"(PathBuf);

        /// Open a folder in the platform file manager
        ShowFolderContents = "show-folder-contents"(PathBuf);

        /// Ask the user whether to trust a certificate, with an explanation
        ShowCertificateTrustDialog = "show-certificate-trust-dialog"(Certificate, String);

        MoveToApplicationsFolder = "move-to-applications-folder"();

        /// Ask the host to push the current application menu
        GetAppMenu = "get-app-menu"();

        UpdatePreferredAppMenuItemLabels = "update-preferred-app-menu-item-labels"(MenuLabels);

        /// A panic or error nobody handled on the front-end
        UncaughtException = "uncaught-exception"(NormalizedError);

        /// Error report with extra context, fatal unless the flag says otherwise
        SendErrorReport = "send-error-report"(NormalizedError, BTreeMap<String, String>, bool);
    }
    two_way {
        IsWindowFocused = "is-window-focused"() -> bool;

        /// Open a URL in the user's browser; `false` when nothing handled it
        OpenExternal = "open-external"(String) -> bool;

        MoveToTrash = "move-to-trash"(PathBuf) -> bool;

        /// Show a context menu; replies with the index path of the chosen item
        ShowContextualMenu = "show-contextual-menu"(Vec<SerializableMenuItem>, bool) -> Option<Vec<usize>>;

        /// Resolve the proxy configuration for a URL
        ResolveProxy = "resolve-proxy"(String) -> String;

        ShowOpenDialog = "show-open-dialog"(OpenDialogOptions) -> Option<Vec<PathBuf>>;
    }
    blocking {
        /// Announce that the front-end intends to quit.
        ///
        /// Quit-related messages sent afterwards must not overtake it, so the
        /// sender halts until the host has handled it. See
        /// [`HostApi::send_will_quit_sync`](crate::HostApi::send_will_quit_sync).
        WillQuit = "will-quit"();
    }
}
