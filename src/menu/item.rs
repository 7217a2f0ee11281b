use std::fmt;

use serde::{Deserialize, Serialize};

/// Local callback attached to a menu item
///
/// Owned by the front-end and never sent to the host.
pub type MenuAction = Box<dyn Fn() + Send + Sync>;

/// Visual kind of a menu item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuItemKind {
    #[default]
    Normal,
    Separator,
    Checkbox,
}

/// A menu item as built by the front-end, possibly carrying a local action
pub struct MenuItem {
    pub(crate) id: String,
    pub(crate) label: Option<String>,
    pub(crate) kind: MenuItemKind,
    pub(crate) enabled: bool,
    pub(crate) checked: bool,
    pub(crate) role: Option<String>,
    pub(crate) accelerator: Option<String>,
    pub(crate) submenu: Option<Vec<MenuItem>>,
    pub(crate) action: Option<MenuAction>,
}

impl MenuItem {
    /// Create a new builder for a menu item with the given identifier
    pub fn builder(id: impl Into<String>) -> MenuItemBuilder {
        MenuItemBuilder {
            inner: MenuItem {
                id: id.into(),
                label: None,
                kind: MenuItemKind::Normal,
                enabled: true,
                checked: false,
                role: None,
                accelerator: None,
                submenu: None,
                action: None,
            },
        }
    }

    /// A separator line
    pub fn separator(id: impl Into<String>) -> Self {
        Self::builder(id).kind(MenuItemKind::Separator).build()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn kind(&self) -> MenuItemKind {
        self.kind
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn checked(&self) -> bool {
        self.checked
    }

    pub fn role(&self) -> Option<&str> {
        self.role.as_deref()
    }

    pub fn accelerator(&self) -> Option<&str> {
        self.accelerator.as_deref()
    }

    /// Children in display order, if this item opens a submenu
    pub fn submenu(&self) -> Option<&[MenuItem]> {
        self.submenu.as_deref()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Run the local action, returning whether there was one
    pub(crate) fn run_action(&self) -> bool {
        match &self.action {
            Some(action) => {
                action();
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .field("enabled", &self.enabled)
            .field("checked", &self.checked)
            .field("role", &self.role)
            .field("accelerator", &self.accelerator)
            .field("submenu", &self.submenu)
            .field("action", &self.action.as_ref().map(|_| "<action>"))
            .finish()
    }
}

/// Builder for MenuItem
pub struct MenuItemBuilder {
    inner: MenuItem,
}

impl MenuItemBuilder {
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.inner.label = Some(label.into());
        self
    }

    pub fn kind(mut self, kind: MenuItemKind) -> Self {
        self.inner.kind = kind;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.inner.enabled = enabled;
        self
    }

    /// Mark as a checkbox item in the given state
    pub fn checked(mut self, checked: bool) -> Self {
        self.inner.kind = MenuItemKind::Checkbox;
        self.inner.checked = checked;
        self
    }

    /// Platform role, e.g. `copy` or `selectAll`
    pub fn role(mut self, role: impl Into<String>) -> Self {
        self.inner.role = Some(role.into());
        self
    }

    pub fn accelerator(mut self, accelerator: impl Into<String>) -> Self {
        self.inner.accelerator = Some(accelerator.into());
        self
    }

    /// Attach a local action, run when the user selects this item
    pub fn action(mut self, action: impl Fn() + Send + Sync + 'static) -> Self {
        self.inner.action = Some(Box::new(action));
        self
    }

    pub fn submenu(mut self, items: impl IntoIterator<Item = MenuItem>) -> Self {
        self.inner.submenu = Some(items.into_iter().collect());
        self
    }

    pub fn build(self) -> MenuItem {
        self.inner
    }
}
