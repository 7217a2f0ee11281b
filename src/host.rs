//! Typed front-end API over every catalogue channel

use std::backtrace::Backtrace;
use std::collections::BTreeMap;
use std::panic;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::channel::{
    Certificate, Channel, ExecuteMenuItemById, GetAppMenu, IsWindowFocused, MenuLabels,
    MoveToApplicationsFolder, MoveToTrash, OneWay, OpenDialogOptions, OpenExternal, Reply,
    RendererReady, ResolveProxy, SelectAllWindowContents, SendErrorReport,
    ShowCertificateTrustDialog, ShowContextualMenu, ShowFolderContents, ShowItemInFolder,
    ShowOpenDialog, UncaughtException, UpdateMenuState, UpdatePreferredAppMenuItemLabels,
    WillQuit,
};
use crate::ipc::{IpcError, Transport};
use crate::menu::{MenuItem, invoke_selection, serialize_menu};
use crate::proxy::{Notifier, Requester, make_blocker, make_notifier, make_requester};
use crate::report::RaisedError;

/// Everything the front-end can ask of the host
///
/// One-way methods return immediately and never fail. Two-way methods are
/// `async` and return whatever the transport reports.
pub struct HostApi<T: Transport> {
    transport: Arc<T>,
}

impl<T: Transport> HostApi<T> {
    pub fn new(transport: T) -> Self {
        Self::from_shared(Arc::new(transport))
    }

    pub fn from_shared(transport: Arc<T>) -> Self {
        Self { transport }
    }

    fn notifier<C: Channel<Shape = OneWay>>(&self) -> Notifier<C, T> {
        make_notifier(Arc::clone(&self.transport))
    }

    fn requester<C>(&self) -> Requester<C, T>
    where
        C: Channel,
        C::Shape: Reply,
    {
        make_requester(Arc::clone(&self.transport))
    }

    pub fn select_all_window_contents(&self) {
        self.notifier::<SelectAllWindowContents>().send(());
    }

    pub fn update_menu_state(&self, id: impl Into<String>, enabled: bool) {
        self.notifier::<UpdateMenuState>().send((id.into(), enabled));
    }

    pub fn renderer_ready(&self) {
        self.notifier::<RendererReady>().send(());
    }

    pub fn execute_menu_item_by_id(&self, id: impl Into<String>) {
        self.notifier::<ExecuteMenuItemById>().send((id.into(),));
    }

    pub fn show_item_in_folder(&self, path: impl AsRef<Path>) {
        self.notifier::<ShowItemInFolder>()
            .send((path.as_ref().to_path_buf(),));
    }

    pub fn show_folder_contents(&self, path: impl AsRef<Path>) {
        self.notifier::<ShowFolderContents>()
            .send((path.as_ref().to_path_buf(),));
    }

    pub fn show_certificate_trust_dialog(&self, certificate: Certificate, message: impl Into<String>) {
        self.notifier::<ShowCertificateTrustDialog>()
            .send((certificate, message.into()));
    }

    /// Tell the host the front-end is about to quit, blocking this thread
    /// until the host has acknowledged it.
    ///
    /// This must stay synchronous: quit-related messages sent afterwards
    /// must not be processed by the host before this one.
    pub fn send_will_quit_sync(&self) -> Result<(), IpcError> {
        make_blocker::<WillQuit, _>(Arc::clone(&self.transport)).call()
    }

    pub fn move_to_applications_folder(&self) {
        self.notifier::<MoveToApplicationsFolder>().send(());
    }

    pub fn get_app_menu(&self) {
        self.notifier::<GetAppMenu>().send(());
    }

    pub fn update_preferred_app_menu_item_labels(&self, labels: MenuLabels) {
        self.notifier::<UpdatePreferredAppMenuItemLabels>()
            .send((labels,));
    }

    pub fn report_uncaught_exception(&self, error: &RaisedError) {
        self.notifier::<UncaughtException>().send((error.normalize(),));
    }

    pub fn send_error_report(
        &self,
        error: &RaisedError,
        extra: BTreeMap<String, String>,
        non_fatal: bool,
    ) {
        self.notifier::<SendErrorReport>()
            .send((error.normalize(), extra, non_fatal));
    }

    pub async fn is_window_focused(&self) -> Result<bool, IpcError> {
        self.requester::<IsWindowFocused>().call(()).await
    }

    /// Open a URL in the default browser; `false` if nothing handled it
    pub async fn open_external(&self, url: impl Into<String>) -> Result<bool, IpcError> {
        self.requester::<OpenExternal>().call((url.into(),)).await
    }

    pub async fn move_item_to_trash(&self, path: impl AsRef<Path>) -> Result<bool, IpcError> {
        self.requester::<MoveToTrash>()
            .call((path.as_ref().to_path_buf(),))
            .await
    }

    /// Show `items` as a context menu and run the chosen item's action
    ///
    /// `items` stays borrowed until the host replies, so the index path is
    /// resolved against the same tree that was sent. Cancelling, picking an
    /// item without an action, or a path that no longer resolves does nothing.
    pub async fn show_contextual_menu(
        &self,
        items: &[MenuItem],
        add_spell_check_menu: bool,
    ) -> Result<(), IpcError> {
        let serialized = serialize_menu(items);
        let selection = self
            .requester::<ShowContextualMenu>()
            .call((serialized, add_spell_check_menu))
            .await?;

        match selection {
            Some(path) => {
                invoke_selection(items, &path);
            }
            None => tracing::debug!("contextual menu dismissed"),
        }
        Ok(())
    }

    pub async fn resolve_proxy(&self, url: impl Into<String>) -> Result<String, IpcError> {
        self.requester::<ResolveProxy>().call((url.into(),)).await
    }

    /// `None` when the user cancelled the dialog
    pub async fn show_open_dialog(
        &self,
        options: OpenDialogOptions,
    ) -> Result<Option<Vec<PathBuf>>, IpcError> {
        self.requester::<ShowOpenDialog>().call((options,)).await
    }

    /// Report every panic on this process to the host as an uncaught exception
    ///
    /// The previously installed hook still runs afterwards.
    pub fn install_panic_hook(self: Arc<Self>) {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let raised = RaisedError::from_panic(info).backtrace(&Backtrace::force_capture());
            self.report_uncaught_exception(&raised);
            previous(info);
        }));
    }
}

impl<T: Transport> Clone for HostApi<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}
