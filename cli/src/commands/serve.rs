use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use executor_core::tokio::TokioGlobal;
use tokio::sync::mpsc;

use tether::channel::{
    ExecuteMenuItemById, GetAppMenu, IsWindowFocused, MoveToApplicationsFolder, MoveToTrash,
    OpenDialogOptions, OpenExternal, RendererReady, ResolveProxy, SelectAllWindowContents,
    SendErrorReport, ShowCertificateTrustDialog, ShowContextualMenu, ShowFolderContents,
    ShowItemInFolder, ShowOpenDialog, UncaughtException, UpdateMenuState,
    UpdatePreferredAppMenuItemLabels, WillQuit,
};
use tether::{HostRouter, IpcServer};

use crate::config::{MergedConfig, Responses};
use crate::error::CliResult;

/// Time left for the `will-quit` acknowledgement to reach the front-end
const QUIT_GRACE: Duration = Duration::from_millis(100);

pub async fn execute(config: MergedConfig) -> CliResult<()> {
    let (quit_tx, mut quit_rx) = mpsc::channel::<()>(1);
    let router = build_router(Arc::new(config.responses), quit_tx);

    let server = IpcServer::new(router, &config.transport, TokioGlobal)
        .await
        .with_context(|| {
            format!(
                "failed to listen on {}",
                config.transport.socket_path().display()
            )
        })?;

    tracing::info!(path = %server.socket_path().display(), "host ready");

    tokio::select! {
        _ = quit_rx.recv() => {
            tracing::info!("front-end announced quit");
            tokio::time::sleep(QUIT_GRACE).await;
        }
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            tracing::info!("interrupted");
        }
    }

    server.stop();
    Ok(())
}

fn build_router(responses: Arc<Responses>, quit: mpsc::Sender<()>) -> HostRouter {
    let focused = Arc::clone(&responses);
    let external = Arc::clone(&responses);
    let trash = Arc::clone(&responses);
    let menu = Arc::clone(&responses);
    let proxy = Arc::clone(&responses);
    let dialog = responses;

    HostRouter::new()
        .on_notify::<SelectAllWindowContents, _, _>(|()| async {
            tracing::info!("select all window contents");
        })
        .on_notify::<UpdateMenuState, _, _>(|(id, enabled)| async move {
            tracing::info!(%id, enabled, "update menu state");
        })
        .on_notify::<RendererReady, _, _>(|()| async {
            tracing::info!("renderer ready");
        })
        .on_notify::<ExecuteMenuItemById, _, _>(|(id,)| async move {
            tracing::info!(%id, "execute menu item");
        })
        .on_notify::<ShowItemInFolder, _, _>(|(path,)| async move {
            tracing::info!(path = %path.display(), "show item in folder");
        })
        .on_notify::<ShowFolderContents, _, _>(|(path,)| async move {
            tracing::info!(path = %path.display(), "show folder contents");
        })
        .on_notify::<ShowCertificateTrustDialog, _, _>(|(certificate, message)| async move {
            tracing::info!(
                subject = %certificate.subject_name,
                fingerprint = %certificate.fingerprint,
                %message,
                "certificate trust dialog"
            );
        })
        .on_blocking::<WillQuit, _, _>(move |()| {
            let quit = quit.clone();
            async move {
                let _ = quit.try_send(());
            }
        })
        .on_notify::<MoveToApplicationsFolder, _, _>(|()| async {
            tracing::info!("move to applications folder");
        })
        .on_notify::<GetAppMenu, _, _>(|()| async {
            tracing::info!("app menu requested");
        })
        .on_notify::<UpdatePreferredAppMenuItemLabels, _, _>(|(labels,)| async move {
            tracing::info!(?labels, "menu labels updated");
        })
        .on_notify::<UncaughtException, _, _>(|(error,)| async move {
            tracing::error!(name = %error.name, message = %error.message, stack = ?error.stack, "uncaught exception");
        })
        .on_notify::<SendErrorReport, _, _>(|(error, extra, non_fatal)| async move {
            tracing::warn!(
                name = %error.name,
                message = %error.message,
                ?extra,
                non_fatal,
                "error report"
            );
        })
        .on_request::<IsWindowFocused, _, _>(move |()| {
            let focused = focused.window_focused;
            async move { Ok(focused) }
        })
        .on_request::<OpenExternal, _, _>(move |(url,)| {
            let opened = external.open_external;
            async move {
                tracing::info!(%url, opened, "open external");
                Ok(opened)
            }
        })
        .on_request::<MoveToTrash, _, _>(move |(path,)| {
            let moved = trash.move_to_trash;
            async move {
                tracing::info!(path = %path.display(), moved, "move to trash");
                Ok(moved)
            }
        })
        .on_request::<ShowContextualMenu, _, _>(move |(items, add_spell_check_menu)| {
            let selection = menu.menu_selection.clone();
            async move {
                tracing::info!(
                    items = items.len(),
                    add_spell_check_menu,
                    ?selection,
                    "contextual menu"
                );
                Ok(selection)
            }
        })
        .on_request::<ResolveProxy, _, _>(move |(url,)| {
            let answer = proxy.proxy.clone();
            async move {
                tracing::debug!(%url, %answer, "resolve proxy");
                Ok(answer)
            }
        })
        .on_request::<ShowOpenDialog, _, _>(move |(options,)| {
            let picked = dialog_answer(&dialog, &options);
            async move {
                tracing::info!(title = ?options.title, ?picked, "open dialog");
                Ok(picked)
            }
        })
}

/// Configured dialog paths, cut to one unless multi-selection was asked for
fn dialog_answer(responses: &Responses, options: &OpenDialogOptions) -> Option<Vec<PathBuf>> {
    let mut picked = responses.open_dialog.clone()?;
    if !options.allows_multiple() {
        picked.truncate(1);
    }
    Some(picked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tether::channel::DialogProperty;

    #[test]
    fn test_router_covers_catalogue() {
        let (quit, _rx) = mpsc::channel(1);
        let router = build_router(Arc::new(Responses::default()), quit);

        let mut registered: Vec<_> = router.channels().collect();
        registered.sort();
        let mut expected: Vec<_> = tether::channel::catalogue()
            .iter()
            .map(|info| (info.name(), info.kind()))
            .collect();
        expected.sort();

        assert_eq!(registered, expected);
    }

    #[test]
    fn test_open_dialog_answer_respects_multi_selection() {
        let responses = Responses {
            open_dialog: Some(vec!["/tmp/a".into(), "/tmp/b".into()]),
            ..Responses::default()
        };

        assert_eq!(
            dialog_answer(&responses, &OpenDialogOptions::default()),
            Some(vec![PathBuf::from("/tmp/a")])
        );

        let multiple = OpenDialogOptions {
            properties: vec![DialogProperty::OpenFile, DialogProperty::MultiSelections],
            ..OpenDialogOptions::default()
        };
        assert_eq!(dialog_answer(&responses, &multiple).map(|p| p.len()), Some(2));
        assert_eq!(dialog_answer(&Responses::default(), &multiple), None);
    }
}
