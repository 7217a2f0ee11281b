//! Channel contracts between the front-end and the host
//!
//! Every message that crosses the process boundary travels on a named
//! channel. A channel is a zero-sized marker type implementing [`Channel`]:
//! its wire name, the ordered tuple of arguments it carries, and its
//! [`Shape`]: [`OneWay`] (fire-and-forget), [`TwoWay<O>`](TwoWay)
//! (request/response producing `O`) or [`Blocking`] (halts the sender until
//! the host acknowledges).
//!
//! Because a type has exactly one `Shape`, a channel can never be registered
//! as both a notification and a request. Proxies are only constructible from
//! the matching shape, see [`crate::proxy`].
//!
//! The full catalogue is declared once in `catalogue.rs`; the declaration
//! fails to compile if a wire name is used twice.

use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};

/// Declare the channel catalogue.
///
/// Generates one marker type per channel, the runtime listing used by
/// tooling, and a compile-time check that every wire name is unique.
macro_rules! channels {
    (
        one_way {
            $( $(#[$one_meta:meta])* $one:ident = $one_name:literal ( $($one_arg:ty),* $(,)? ); )*
        }
        two_way {
            $( $(#[$two_meta:meta])* $two:ident = $two_name:literal ( $($two_arg:ty),* $(,)? ) -> $out:ty; )*
        }
        blocking {
            $( $(#[$blk_meta:meta])* $blk:ident = $blk_name:literal (); )*
        }
    ) => {
        $(
            $(#[$one_meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $one;

            impl $crate::channel::Channel for $one {
                const NAME: &'static str = $one_name;
                type Args = ( $($one_arg,)* );
                type Shape = $crate::channel::OneWay;
            }
        )*

        $(
            $(#[$two_meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $two;

            impl $crate::channel::Channel for $two {
                const NAME: &'static str = $two_name;
                type Args = ( $($two_arg,)* );
                type Shape = $crate::channel::TwoWay<$out>;
            }
        )*

        $(
            $(#[$blk_meta])*
            #[derive(Debug, Clone, Copy, Default)]
            pub struct $blk;

            impl $crate::channel::Channel for $blk {
                const NAME: &'static str = $blk_name;
                type Args = ();
                type Shape = $crate::channel::Blocking;
            }
        )*

        pub(crate) const CATALOGUE: &[$crate::channel::ChannelInfo] = &[
            $( $crate::channel::ChannelInfo::new($one_name, $crate::channel::ChannelKind::OneWay), )*
            $( $crate::channel::ChannelInfo::new($two_name, $crate::channel::ChannelKind::TwoWay), )*
            $( $crate::channel::ChannelInfo::new($blk_name, $crate::channel::ChannelKind::Blocking), )*
        ];

        const _: () = assert!(
            $crate::channel::names_are_unique(&[ $($one_name,)* $($two_name,)* $($blk_name,)* ]),
            "channel names must be unique across all tables"
        );
    };
}

mod catalogue;
mod payload;

pub use catalogue::{
    ExecuteMenuItemById, GetAppMenu, IsWindowFocused, MoveToApplicationsFolder, MoveToTrash,
    OpenExternal, RendererReady, ResolveProxy, SelectAllWindowContents, SendErrorReport,
    ShowCertificateTrustDialog, ShowContextualMenu, ShowFolderContents, ShowItemInFolder,
    ShowOpenDialog, UncaughtException, UpdateMenuState, UpdatePreferredAppMenuItemLabels,
    WillQuit,
};
pub use payload::{Certificate, DialogProperty, FileFilter, MenuLabels, OpenDialogOptions};

/// A named channel and its contract
pub trait Channel: Send + Sync + 'static {
    /// Stable wire identifier shared with the host
    const NAME: &'static str;

    /// Ordered argument tuple carried by each message
    type Args: Serialize + DeserializeOwned + Send + 'static;

    /// How the channel is delivered and answered
    type Shape: Shape;
}

/// Runtime view of a channel's shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelKind {
    OneWay,
    TwoWay,
    Blocking,
}

/// Type-level shape of a channel, implemented only by [`OneWay`], [`TwoWay`]
/// and [`Blocking`]
pub trait Shape: sealed::Sealed + Send + Sync + 'static {
    const KIND: ChannelKind;
}

/// Fire-and-forget channel, no reply
#[derive(Debug)]
pub struct OneWay;

/// Request/response channel replying with `O`
#[derive(Debug)]
pub struct TwoWay<O>(PhantomData<fn() -> O>);

/// Argument-less channel whose sender blocks until the host acknowledges.
///
/// Neither [`make_notifier`](crate::make_notifier) nor
/// [`make_requester`](crate::make_requester) accept it; use
/// [`make_blocker`](crate::make_blocker).
#[derive(Debug)]
pub struct Blocking;

/// Reply type carried by a two-way shape
pub trait Reply: Shape {
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

impl Shape for OneWay {
    const KIND: ChannelKind = ChannelKind::OneWay;
}

impl Shape for Blocking {
    const KIND: ChannelKind = ChannelKind::Blocking;
}

impl<O> Shape for TwoWay<O>
where
    O: Serialize + DeserializeOwned + Send + 'static,
{
    const KIND: ChannelKind = ChannelKind::TwoWay;
}

impl<O> Reply for TwoWay<O>
where
    O: Serialize + DeserializeOwned + Send + 'static,
{
    type Output = O;
}

/// Output of the two-way channel `C`
pub type Output<C> = <<C as Channel>::Shape as Reply>::Output;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::OneWay {}
    impl<O> Sealed for super::TwoWay<O> {}
    impl Sealed for super::Blocking {}
}

/// Catalogue entry exposed for tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelInfo {
    name: &'static str,
    kind: ChannelKind,
}

impl ChannelInfo {
    pub(crate) const fn new(name: &'static str, kind: ChannelKind) -> Self {
        Self { name, kind }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> ChannelKind {
        self.kind
    }
}

/// Every channel the host understands: one-way, then two-way, then blocking
pub fn catalogue() -> &'static [ChannelInfo] {
    catalogue::CATALOGUE
}

/// Look up a channel's shape by wire name
pub fn lookup(name: &str) -> Option<ChannelKind> {
    catalogue::CATALOGUE
        .iter()
        .find(|info| info.name == name)
        .map(|info| info.kind)
}

pub(crate) const fn names_are_unique(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        let mut j = i + 1;
        while j < names.len() {
            if str_eq(names[i], names[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}
