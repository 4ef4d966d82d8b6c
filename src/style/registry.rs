//! # Style Registry
//!
//! An in-memory catalog of named style records in four independent id
//! namespaces (text, paragraph, border, fill), plus the custom font list.
//!
//! The registry is a plain value owned by whoever constructs it; the
//! designer in the app, a fresh instance per test. There is no global
//! instance. Built-in records are seeded at construction and cannot be
//! deleted; user-created records can. Insertion order is preserved so
//! style pickers and export bundles stay stable.

use crate::error::MaquetteError;
use crate::model::now_millis;
use crate::style::font::validate_font_blob;
use crate::style::{
    BorderPattern, BorderStyleProps, Color, FillStyleProps, ParagraphStyleProps, TextAlign,
    TextStyleProps,
};
use indexmap::IndexMap;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// The four style namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StyleKind {
    Text,
    Paragraph,
    Border,
    Fill,
}

impl StyleKind {
    pub fn name(&self) -> &'static str {
        match self {
            StyleKind::Text => "text",
            StyleKind::Paragraph => "paragraph",
            StyleKind::Border => "border",
            StyleKind::Fill => "fill",
        }
    }
}

/// A named, reusable style record. `props` carries the kind-specific bag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleRecord<P> {
    pub id: String,
    pub name: String,
    /// Built-in records carry a category; user-created ones don't.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    /// Milliseconds since the Unix epoch, stamped by the registry.
    #[serde(default)]
    pub created_at: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
    #[serde(flatten)]
    pub props: P,
}

impl<P> StyleRecord<P> {
    /// A user-created record (no category, `is_custom` stamped on insert).
    pub fn custom(id: &str, name: &str, props: P) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: None,
            is_custom: true,
            created_at: 0,
            updated_at: None,
            props,
        }
    }

    fn builtin(id: &str, name: &str, props: P) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            category: Some("builtin".to_string()),
            is_custom: false,
            created_at: 0,
            updated_at: None,
            props,
        }
    }
}

/// Implemented by the four property-bag types; ties each to its namespace
/// inside the registry so the CRUD surface stays generic.
pub trait StyleProps: Clone + Default + Serialize + DeserializeOwned {
    const KIND: StyleKind;

    fn namespace(registry: &StyleRegistry) -> &IndexMap<String, StyleRecord<Self>>;
    fn namespace_mut(registry: &mut StyleRegistry) -> &mut IndexMap<String, StyleRecord<Self>>;
}

macro_rules! impl_style_props {
    ($props:ty, $kind:expr, $field:ident) => {
        impl StyleProps for $props {
            const KIND: StyleKind = $kind;

            fn namespace(registry: &StyleRegistry) -> &IndexMap<String, StyleRecord<Self>> {
                &registry.$field
            }

            fn namespace_mut(
                registry: &mut StyleRegistry,
            ) -> &mut IndexMap<String, StyleRecord<Self>> {
                &mut registry.$field
            }
        }
    };
}

impl_style_props!(TextStyleProps, StyleKind::Text, text);
impl_style_props!(ParagraphStyleProps, StyleKind::Paragraph, paragraph);
impl_style_props!(BorderStyleProps, StyleKind::Border, border);
impl_style_props!(FillStyleProps, StyleKind::Fill, fill);

/// The style catalog. Construct one per document/application root.
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    text: IndexMap<String, StyleRecord<TextStyleProps>>,
    paragraph: IndexMap<String, StyleRecord<ParagraphStyleProps>>,
    border: IndexMap<String, StyleRecord<BorderStyleProps>>,
    fill: IndexMap<String, StyleRecord<FillStyleProps>>,
    custom_fonts: Vec<String>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    /// A registry seeded with the built-in defaults: every kind has at
    /// least one non-deletable record for new elements to resolve against.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.seed_defaults();
        registry
    }

    /// A completely empty registry. Useful for import round-trip tests;
    /// real applications want [`StyleRegistry::new`].
    pub fn empty() -> Self {
        Self {
            text: IndexMap::new(),
            paragraph: IndexMap::new(),
            border: IndexMap::new(),
            fill: IndexMap::new(),
            custom_fonts: Vec::new(),
        }
    }

    fn seed_defaults(&mut self) {
        let stamp = now_millis();
        let seed = |created_at: &mut u64| *created_at = stamp;

        for mut record in [
            StyleRecord::builtin(
                "heading",
                "Heading",
                TextStyleProps {
                    font_size: Some(24.0),
                    font_weight: Some(700),
                    ..Default::default()
                },
            ),
            StyleRecord::builtin(
                "body",
                "Body",
                TextStyleProps {
                    font_size: Some(14.0),
                    font_weight: Some(400),
                    ..Default::default()
                },
            ),
        ] {
            seed(&mut record.created_at);
            self.text.insert(record.id.clone(), record);
        }

        for mut record in [
            StyleRecord::builtin("normal", "Normal", ParagraphStyleProps::default()),
            StyleRecord::builtin(
                "centered",
                "Centered",
                ParagraphStyleProps {
                    text_align: Some(TextAlign::Center),
                    ..Default::default()
                },
            ),
        ] {
            seed(&mut record.created_at);
            self.paragraph.insert(record.id.clone(), record);
        }

        for mut record in [
            StyleRecord::builtin(
                "none",
                "None",
                BorderStyleProps {
                    width: Some(0.0),
                    pattern: Some(BorderPattern::None),
                    ..Default::default()
                },
            ),
            StyleRecord::builtin(
                "simple",
                "Simple",
                BorderStyleProps {
                    width: Some(1.0),
                    color: Some(Color::BLACK),
                    pattern: Some(BorderPattern::Solid),
                    ..Default::default()
                },
            ),
            StyleRecord::builtin(
                "rounded",
                "Rounded",
                BorderStyleProps {
                    width: Some(1.0),
                    color: Some(Color::BLACK),
                    radius: Some(8.0),
                    pattern: Some(BorderPattern::Solid),
                },
            ),
        ] {
            seed(&mut record.created_at);
            self.border.insert(record.id.clone(), record);
        }

        for mut record in [
            StyleRecord::builtin(
                "transparent",
                "Transparent",
                FillStyleProps {
                    color: Some(Color::TRANSPARENT),
                    ..Default::default()
                },
            ),
            StyleRecord::builtin(
                "light",
                "Light",
                FillStyleProps {
                    color: Some(Color::hex("#f5f5f5")),
                    ..Default::default()
                },
            ),
            StyleRecord::builtin(
                "primary",
                "Primary",
                FillStyleProps {
                    color: Some(Color::hex("#3b82f6")),
                    ..Default::default()
                },
            ),
        ] {
            seed(&mut record.created_at);
            self.fill.insert(record.id.clone(), record);
        }
    }

    /// Insert or overwrite a record. Stamps `created_at` (and `updated_at`
    /// on overwrite); records supplied without a category are treated as
    /// user-created.
    pub fn add_style<P: StyleProps>(&mut self, id: &str, mut record: StyleRecord<P>) {
        record.id = id.to_string();
        record.is_custom = record.category.is_none();
        let namespace = P::namespace_mut(self);
        match namespace.get(id) {
            Some(existing) => {
                record.created_at = existing.created_at;
                record.updated_at = Some(now_millis());
            }
            None => {
                record.created_at = now_millis();
                record.updated_at = None;
            }
        }
        namespace.insert(id.to_string(), record);
    }

    pub fn get_style<P: StyleProps>(&self, id: &str) -> Option<&StyleRecord<P>> {
        P::namespace(self).get(id)
    }

    /// All records of one kind, in insertion order.
    pub fn list_styles<P: StyleProps>(&self) -> Vec<&StyleRecord<P>> {
        P::namespace(self).values().collect()
    }

    /// Remove a user-created record. Returns true if it existed and was
    /// removed; built-ins are not deletable and return false.
    pub fn delete_style<P: StyleProps>(&mut self, id: &str) -> bool {
        let namespace = P::namespace_mut(self);
        match namespace.get(id) {
            Some(record) if !record.is_custom => {
                warn!(
                    "refusing to delete built-in {} style '{}'",
                    P::KIND.name(),
                    id
                );
                false
            }
            Some(_) => namespace.shift_remove(id).is_some(),
            None => false,
        }
    }

    pub fn has_custom_styles(&self) -> bool {
        self.text.values().any(|r| r.is_custom)
            || self.paragraph.values().any(|r| r.is_custom)
            || self.border.values().any(|r| r.is_custom)
            || self.fill.values().any(|r| r.is_custom)
    }

    /// Register a custom font blob under a display name. Returns false on
    /// an unsupported or unparseable blob, never panics.
    pub fn register_font(&mut self, data: &[u8], name: &str) -> bool {
        match validate_font_blob(data) {
            Ok(()) => {
                if !self.custom_fonts.iter().any(|f| f == name) {
                    self.custom_fonts.push(name.to_string());
                }
                true
            }
            Err(reason) => {
                warn!("font '{}' rejected: {}", name, reason);
                false
            }
        }
    }

    /// Display names of successfully registered custom fonts, in
    /// registration order.
    pub fn custom_fonts(&self) -> &[String] {
        &self.custom_fonts
    }

    /// Snapshot the whole registry as a serializable bundle.
    pub fn export_all(&self) -> StyleBundle {
        StyleBundle {
            text_styles: self.text.values().cloned().collect(),
            paragraph_styles: self.paragraph.values().cloned().collect(),
            border_styles: self.border.values().cloned().collect(),
            fill_styles: self.fill.values().cloned().collect(),
            custom_fonts: self.custom_fonts.clone(),
        }
    }

    /// Merge a bundle into this registry, overwriting by id. Ids not named
    /// in the bundle are left alone.
    pub fn import_all(&mut self, bundle: StyleBundle) {
        for record in bundle.text_styles {
            self.text.insert(record.id.clone(), record);
        }
        for record in bundle.paragraph_styles {
            self.paragraph.insert(record.id.clone(), record);
        }
        for record in bundle.border_styles {
            self.border.insert(record.id.clone(), record);
        }
        for record in bundle.fill_styles {
            self.fill.insert(record.id.clone(), record);
        }
        for font in bundle.custom_fonts {
            if !self.custom_fonts.contains(&font) {
                self.custom_fonts.push(font);
            }
        }
    }

    /// Parse-then-apply JSON import: a malformed payload mutates nothing.
    pub fn import_json(&mut self, json: &str) -> Result<(), MaquetteError> {
        let bundle: StyleBundle = serde_json::from_str(json)?;
        self.import_all(bundle);
        Ok(())
    }

    pub fn export_json(&self) -> String {
        // StyleBundle has no failing serialize paths.
        serde_json::to_string_pretty(&self.export_all()).unwrap_or_default()
    }
}

/// The export/import wire shape. Unknown extra fields in a bundle are
/// ignored on import for forward compatibility.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleBundle {
    pub text_styles: Vec<StyleRecord<TextStyleProps>>,
    pub paragraph_styles: Vec<StyleRecord<ParagraphStyleProps>>,
    pub border_styles: Vec<StyleRecord<BorderStyleProps>>,
    pub fill_styles: Vec<StyleRecord<FillStyleProps>>,
    pub custom_fonts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_defaults_present() {
        let registry = StyleRegistry::new();
        assert!(registry.get_style::<TextStyleProps>("heading").is_some());
        assert!(registry.get_style::<TextStyleProps>("body").is_some());
        assert!(registry
            .get_style::<ParagraphStyleProps>("centered")
            .is_some());
        assert!(registry.get_style::<BorderStyleProps>("rounded").is_some());
        assert!(registry.get_style::<FillStyleProps>("primary").is_some());
    }

    #[test]
    fn test_add_style_marks_custom() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "alert",
            StyleRecord::custom(
                "alert",
                "Alert",
                TextStyleProps {
                    color: Some(Color::hex("#dc2626")),
                    font_weight: Some(700),
                    ..Default::default()
                },
            ),
        );
        let record = registry.get_style::<TextStyleProps>("alert").unwrap();
        assert!(record.is_custom);
        assert!(record.created_at > 0);
        assert_eq!(record.updated_at, None);
    }

    #[test]
    fn test_overwrite_stamps_updated_at() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "alert",
            StyleRecord::custom("alert", "Alert", TextStyleProps::default()),
        );
        let created = registry
            .get_style::<TextStyleProps>("alert")
            .unwrap()
            .created_at;
        registry.add_style(
            "alert",
            StyleRecord::custom("alert", "Alert v2", TextStyleProps::default()),
        );
        let record = registry.get_style::<TextStyleProps>("alert").unwrap();
        assert_eq!(record.name, "Alert v2");
        assert_eq!(record.created_at, created);
        assert!(record.updated_at.is_some());
    }

    #[test]
    fn test_builtin_not_deletable() {
        let mut registry = StyleRegistry::new();
        assert!(!registry.delete_style::<TextStyleProps>("heading"));
        assert!(registry.get_style::<TextStyleProps>("heading").is_some());
    }

    #[test]
    fn test_custom_deletable() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "alert",
            StyleRecord::custom("alert", "Alert", TextStyleProps::default()),
        );
        assert!(registry.delete_style::<TextStyleProps>("alert"));
        assert!(registry.get_style::<TextStyleProps>("alert").is_none());
        assert!(!registry.delete_style::<TextStyleProps>("alert"));
    }

    #[test]
    fn test_list_preserves_insertion_order() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "zzz",
            StyleRecord::custom("zzz", "Zzz", TextStyleProps::default()),
        );
        registry.add_style(
            "aaa",
            StyleRecord::custom("aaa", "Aaa", TextStyleProps::default()),
        );
        let ids: Vec<&str> = registry
            .list_styles::<TextStyleProps>()
            .iter()
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(ids, vec!["heading", "body", "zzz", "aaa"]);
    }

    #[test]
    fn test_export_import_roundtrip() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "alert",
            StyleRecord::custom("alert", "Alert", TextStyleProps::default()),
        );
        let bundle = registry.export_all();

        let mut fresh = StyleRegistry::empty();
        fresh.import_all(bundle);

        let original: Vec<(String, String)> = registry
            .list_styles::<TextStyleProps>()
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect();
        let imported: Vec<(String, String)> = fresh
            .list_styles::<TextStyleProps>()
            .iter()
            .map(|r| (r.id.clone(), r.name.clone()))
            .collect();
        assert_eq!(original, imported);
    }

    #[test]
    fn test_import_merges_without_clearing() {
        let mut registry = StyleRegistry::new();
        registry.add_style(
            "mine",
            StyleRecord::custom("mine", "Mine", TextStyleProps::default()),
        );
        let mut incoming = StyleRegistry::empty();
        incoming.add_style(
            "theirs",
            StyleRecord::custom("theirs", "Theirs", TextStyleProps::default()),
        );
        registry.import_all(incoming.export_all());
        assert!(registry.get_style::<TextStyleProps>("mine").is_some());
        assert!(registry.get_style::<TextStyleProps>("theirs").is_some());
    }

    #[test]
    fn test_import_json_rejects_garbage_without_mutation() {
        let mut registry = StyleRegistry::new();
        let before = registry.export_json();
        assert!(registry.import_json("{not json").is_err());
        assert_eq!(registry.export_json(), before);
    }

    #[test]
    fn test_import_json_ignores_unknown_fields() {
        let mut registry = StyleRegistry::new();
        let payload = r#"{"textStyles": [], "futureThing": {"x": 1}}"#;
        assert!(registry.import_json(payload).is_ok());
    }

    #[test]
    fn test_register_font_rejects_garbage() {
        let mut registry = StyleRegistry::new();
        assert!(!registry.register_font(b"not a font", "Broken"));
        assert!(registry.custom_fonts().is_empty());
    }
}
