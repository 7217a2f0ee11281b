//! Transportable projection of a menu tree

use serde::{Deserialize, Serialize};

use crate::menu::item::{MenuItem, MenuItemKind};

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn default_enabled() -> bool {
    true
}

/// A menu item with its local action removed, safe to send to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableMenuItem {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, rename = "type")]
    kind: MenuItemKind,
    #[serde(default = "default_enabled", skip_serializing_if = "is_true")]
    enabled: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    accelerator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    submenu: Option<Vec<SerializableMenuItem>>,
}

impl SerializableMenuItem {
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

    pub fn submenu(&self) -> Option<&[SerializableMenuItem]> {
        self.submenu.as_deref()
    }
}

/// Conversion into the transportable menu shape
///
/// Implemented for both node types so serializing an already serialized
/// tree yields the same tree.
pub trait ToSerializable {
    fn to_serializable(&self) -> SerializableMenuItem;
}

impl ToSerializable for MenuItem {
    fn to_serializable(&self) -> SerializableMenuItem {
        SerializableMenuItem {
            id: self.id.clone(),
            label: self.label.clone(),
            kind: self.kind,
            enabled: self.enabled,
            checked: self.checked,
            role: self.role.clone(),
            accelerator: self.accelerator.clone(),
            submenu: self.submenu.as_deref().map(serialize_menu),
        }
    }
}

impl ToSerializable for SerializableMenuItem {
    fn to_serializable(&self) -> SerializableMenuItem {
        self.clone()
    }
}

/// Strip local actions from every node of a menu tree
///
/// Identifiers, order and nesting are preserved. A node without a submenu
/// stays without one; an empty submenu stays empty.
pub fn serialize_menu<I: ToSerializable>(items: &[I]) -> Vec<SerializableMenuItem> {
    items.iter().map(ToSerializable::to_serializable).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::protocol::{decode, encode};

    fn sample_tree() -> Vec<MenuItem> {
        vec![
            MenuItem::builder("file")
                .label("File")
                .submenu([
                    MenuItem::builder("open").label("Open").action(|| {}).build(),
                    MenuItem::separator("sep"),
                    MenuItem::builder("recent")
                        .submenu([MenuItem::builder("recent-1").action(|| {}).build()])
                        .build(),
                ])
                .build(),
            MenuItem::builder("empty").submenu([]).build(),
            MenuItem::builder("wrap")
                .checked(true)
                .enabled(false)
                .accelerator("CmdOrCtrl+W")
                .action(|| {})
                .build(),
        ]
    }

    fn assert_same_shape(original: &[MenuItem], serialized: &[SerializableMenuItem]) {
        assert_eq!(original.len(), serialized.len());
        for (a, b) in original.iter().zip(serialized) {
            assert_eq!(a.id(), b.id());
            assert_eq!(a.label(), b.label());
            assert_eq!(a.kind(), b.kind());
            assert_eq!(a.enabled(), b.enabled());
            assert_eq!(a.checked(), b.checked());
            match (a.submenu(), b.submenu()) {
                (Some(a), Some(b)) => assert_same_shape(a, b),
                (None, None) => {}
                _ => panic!("submenu presence differs at {}", a.id()),
            }
        }
    }

    #[test]
    fn test_serialize_preserves_structure() {
        let tree = sample_tree();
        let serialized = serialize_menu(&tree);
        assert_same_shape(&tree, &serialized);
        assert_eq!(serialized[1].submenu(), Some(&[][..]));
        assert_eq!(serialized[2].submenu(), None);
    }

    #[test]
    fn test_serialize_is_idempotent() {
        let once = serialize_menu(&sample_tree());
        let twice = serialize_menu(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_wire_form_has_no_action_field() {
        let serialized = serialize_menu(&sample_tree());
        let bytes = encode(&serialized).unwrap();
        let value: serde_json::Value = decode(&bytes).unwrap();

        fn check(value: &serde_json::Value) {
            match value {
                serde_json::Value::Object(map) => {
                    assert!(!map.contains_key("action"));
                    map.values().for_each(check);
                }
                serde_json::Value::Array(items) => items.iter().for_each(check),
                _ => {}
            }
        }
        check(&value);

        // omitted defaults come back unchanged
        let decoded: Vec<SerializableMenuItem> = decode(&bytes).unwrap();
        assert_eq!(decoded, serialized);
        assert_eq!(value[0]["submenu"][1]["type"], "separator");
        assert_eq!(value[2]["enabled"], false);
        assert!(value[0].get("enabled").is_none());
    }
}
