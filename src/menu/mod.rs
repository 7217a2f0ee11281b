//! Menus shown by the host on behalf of the front-end
//!
//! A [`MenuItem`] tree may carry local actions that cannot leave the
//! front-end process. Before the tree is sent, [`serialize_menu`] derives a
//! [`SerializableMenuItem`] projection with the same shape and no actions.
//! The host replies with the index path of the chosen item, which
//! [`resolve_selection`] follows through the *original* tree so the local
//! action can run.

mod dispatch;
mod item;
mod serialize;

pub use dispatch::{MenuNode, invoke_selection, resolve_selection};
pub use item::{MenuAction, MenuItem, MenuItemBuilder, MenuItemKind};
pub use serialize::{SerializableMenuItem, ToSerializable, serialize_menu};
