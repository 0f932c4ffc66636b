//! Per-invocation generation state.

use crate::config::Configuration;
use crate::error::CodegenError;
use crate::type_map::TypeMapper;
use eventgen_idl::flatten::{FlattenedInterface, dictionary_lineage, flatten, interface_lineage};
use eventgen_idl::ir::{Attribute, Dictionary, Idl, Interface};
use eventgen_idl::loader::{SchemaLoader, event_interface_name};
use std::path::PathBuf;
use std::rc::Rc;

/// A configured event with its loaded schema and flattened interface.
#[derive(Debug)]
pub struct EventSchema {
    /// Event name (`MouseEvent`), also the generated class name.
    pub name: String,
    /// Resolved schema file of the event.
    pub idl: Rc<Idl>,
    /// Event interface with its ancestors.
    pub flat: FlattenedInterface,
}

impl EventSchema {
    /// Returns the event interface.
    #[must_use]
    pub fn interface(&self) -> &Interface {
        &self.flat.leaf
    }

    /// Returns the name of the event interface (`nsIDOMMouseEvent`).
    #[must_use]
    pub fn interface_name(&self) -> &str {
        &self.flat.leaf.name
    }

    /// Returns the `{E}Init` dictionary declared in the event's own file.
    #[must_use]
    pub fn init_dictionary(&self) -> Option<&Rc<Dictionary>> {
        self.idl.dictionary(&format!("{}Init", self.name))
    }
}

/// State shared by all emitters during one generator run.
///
/// Owns the schema loader, the loaded events in configuration order, and the
/// insertion-ordered include and attribute-name sets accumulated across all
/// events.
#[derive(Debug)]
pub struct GenerationSession {
    config: Configuration,
    loader: SchemaLoader,
    events: Vec<EventSchema>,
    includes: Vec<String>,
    attribute_names: Vec<String>,
}

impl GenerationSession {
    /// Loads and flattens every configured event and collects includes.
    ///
    /// # Errors
    /// Returns `CodegenError::Schema` for lookup, parse or resolution
    /// failures and `CodegenError::MissingInterface` if an event file does
    /// not declare its interface.
    pub fn open(config: Configuration, loader: SchemaLoader) -> Result<Self, CodegenError> {
        let mut session = Self {
            config,
            loader,
            events: Vec::new(),
            includes: Vec::new(),
            attribute_names: Vec::new(),
        };

        let names = session.config.simple_events.clone();
        for name in &names {
            if session.events.iter().any(|e| &e.name == name) {
                tracing::warn!("event {} listed more than once", name);
                continue;
            }
            let event = session.load_event(name)?;
            session.events.push(event);
        }

        session.collect_includes()?;
        Ok(session)
    }

    fn load_event(&mut self, name: &str) -> Result<EventSchema, CodegenError> {
        let idl = self.loader.load_event(name)?;
        let interface = event_interface_name(name);
        let leaf = idl
            .interfaces()
            .find(|iface| iface.name == interface)
            .cloned()
            .ok_or_else(|| CodegenError::MissingInterface {
                interface: interface.clone(),
                file: idl.file.clone(),
            })?;
        let flat = flatten(&self.loader, leaf)?;
        Ok(EventSchema {
            name: name.to_string(),
            idl,
            flat,
        })
    }

    /// Builds the include list used by the class declarations header.
    ///
    /// Order: special includes (without `.h`), one `nsIDOM{E}` per event,
    /// then every pointer type reachable through the lineage of each
    /// interface and dictionary in the event files.
    fn collect_includes(&mut self) -> Result<(), CodegenError> {
        let mut includes = Vec::new();
        let mut names = Vec::new();

        for special in &self.config.special_includes {
            push_unique(&mut includes, special.strip_suffix(".h").unwrap_or(special));
        }
        for event in &self.events {
            push_unique(&mut includes, event.interface_name());
        }

        for event in &self.events {
            for iface in event.idl.interfaces() {
                for ancestor in interface_lineage(&self.loader, iface)? {
                    collect_attributes(ancestor.attributes(), &mut names, &mut includes);
                }
            }
            for dict in event.idl.dictionaries() {
                for ancestor in dictionary_lineage(&self.loader, dict)? {
                    collect_attributes(ancestor.members.iter(), &mut names, &mut includes);
                }
            }
        }

        tracing::debug!(
            "collected {} include(s) and {} attribute name(s)",
            includes.len(),
            names.len()
        );
        self.includes = includes;
        self.attribute_names = names;
        Ok(())
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Returns a type mapper over the configured overrides.
    #[must_use]
    pub fn mapper(&self) -> TypeMapper<'_> {
        TypeMapper::new(&self.config.xpidl_to_native)
    }

    /// Returns the loaded events in configuration order.
    #[must_use]
    pub fn events(&self) -> &[EventSchema] {
        &self.events
    }

    /// Returns a loaded event by name.
    #[must_use]
    pub fn event(&self, name: &str) -> Option<&EventSchema> {
        self.events.iter().find(|e| e.name == name)
    }

    /// Returns the deduplicated include list, before exclusions.
    #[must_use]
    pub fn includes(&self) -> &[String] {
        &self.includes
    }

    /// Returns the include list with the configured exclusions removed.
    pub fn emitted_includes(&self) -> impl Iterator<Item = &str> {
        self.includes
            .iter()
            .map(String::as_str)
            .filter(|include| {
                !self
                    .config
                    .exclude_automatic_type_include
                    .iter()
                    .any(|excluded| excluded == include)
            })
    }

    /// Returns every attribute name seen across all events.
    #[must_use]
    pub fn attribute_names(&self) -> &[String] {
        &self.attribute_names
    }

    /// Returns every schema file read during this session.
    #[must_use]
    pub fn dependencies(&self) -> &[PathBuf] {
        self.loader.dependencies()
    }
}

fn collect_attributes<'a>(
    attrs: impl Iterator<Item = &'a Attribute>,
    names: &mut Vec<String>,
    includes: &mut Vec<String>,
) {
    for attr in attrs {
        push_unique(names, &attr.name);
        if let Some(pointee) = attr.native.pointee() {
            push_unique(includes, pointee);
        }
    }
}

fn push_unique(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_string());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    pub(crate) const SUPPORTS_IDL: &str = r#"
[scriptable, uuid(00000000-0000-0000-c000-000000000046)]
interface nsISupports {
};
"#;

    pub(crate) const EVENT_IDL: &str = r#"
#include "nsISupports.idl"

interface nsIDOMEventTarget;

[scriptable, builtinclass, uuid(02d54f52-a1f5-4ad2-b560-36f14012935e)]
interface nsIDOMEvent : nsISupports
{
  const unsigned short NONE = 0;
  readonly attribute DOMString type;
  readonly attribute nsIDOMEventTarget target;
  [noscript] void initEvent(in DOMString eventTypeArg,
                            in boolean canBubbleArg,
                            in boolean cancelableArg);
};
"#;

    pub(crate) const UI_EVENT_IDL: &str = r#"
#include "nsIDOMEvent.idl"

interface nsIDOMWindow;

[scriptable, builtinclass, uuid(d73852f8-7bd6-477d-8233-117dbf83860b)]
interface nsIDOMUIEvent : nsIDOMEvent
{
  readonly attribute nsIDOMWindow view;
  readonly attribute long detail;
};
"#;

    pub(crate) const SCROLL_EVENT_IDL: &str = r#"
#include "nsIDOMUIEvent.idl"

[scriptable, builtinclass, uuid(327bdd54-f772-4015-b856-9692154a066c)]
interface nsIDOMScrollAreaEvent : nsIDOMUIEvent
{
  readonly attribute float x;
  readonly attribute float y;
  readonly attribute boolean horizontal;
  readonly attribute DOMString label;

  void initScrollAreaEvent(in DOMString aEventType,
                           in boolean aCanBubble,
                           in boolean aCancelable,
                           in nsIDOMWindow aView,
                           in long aDetail,
                           in float x,
                           in float y,
                           in boolean horizontal,
                           in DOMString label);
};

dictionary ScrollAreaEventInit
{
  DOMString label = "none";
  float y = Infinity;
  boolean horizontal;
  float x;
};
"#;

    pub(crate) const DATA_EVENT_IDL: &str = r#"
#include "nsIDOMEvent.idl"

interface nsIVariant;
interface nsIDOMDataTransfer;
interface nsIDOMWindow;

[scriptable, builtinclass, uuid(7c50e5e1-b9c2-4ec2-a4f2-6a1c1d4c5a11)]
interface nsIDOMDataEvent : nsIDOMEvent
{
  const long KIND_COPY = 1;
  const long KIND_MOVE = KIND_COPY << 1;

  readonly attribute nsIVariant data;
  readonly attribute nsIDOMDataTransfer dataTransfer;
  readonly attribute nsIDOMWindow source;
  readonly attribute ACString origin;
};
"#;

    /// Writes the shared fixture schemas plus `extra` into a fresh directory.
    pub(crate) fn fixtures(extra: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let standard = [
            ("nsISupports.idl", SUPPORTS_IDL),
            ("nsIDOMEvent.idl", EVENT_IDL),
            ("nsIDOMUIEvent.idl", UI_EVENT_IDL),
            ("nsIDOMScrollAreaEvent.idl", SCROLL_EVENT_IDL),
            ("nsIDOMDataEvent.idl", DATA_EVENT_IDL),
        ];
        for (name, contents) in standard.iter().chain(extra) {
            fs::write(dir.path().join(name), contents).expect("Failed to write fixture");
        }
        dir
    }

    pub(crate) fn config(events: &[&str]) -> Configuration {
        Configuration {
            simple_events: events.iter().map(|e| (*e).to_string()).collect(),
            ..Configuration::default()
        }
    }

    pub(crate) fn open(dir: &TempDir, config: Configuration) -> GenerationSession {
        GenerationSession::open(config, SchemaLoader::new([dir.path()]))
            .expect("Failed to open session")
    }

    #[test]
    fn test_open_loads_events_in_order() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["ScrollAreaEvent", "UIEvent"]));

        let names: Vec<_> = session.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["ScrollAreaEvent", "UIEvent"]);

        let scroll = session.event("ScrollAreaEvent").expect("event");
        assert_eq!(scroll.interface_name(), "nsIDOMScrollAreaEvent");
        assert_eq!(scroll.flat.base_class(), "UIEvent");
        assert!(scroll.init_dictionary().is_some());
        assert!(session.event("UIEvent").expect("event").init_dictionary().is_none());
    }

    #[test]
    fn test_includes_order() {
        let dir = fixtures(&[]);
        let mut cfg = config(&["UIEvent", "DataEvent"]);
        cfg.special_includes = vec!["nsContentUtils.h".to_string(), "nsContentUtils".to_string()];
        cfg.exclude_automatic_type_include = vec!["nsIDOMEventTarget".to_string()];
        let session = open(&dir, cfg);

        assert_eq!(
            session.includes(),
            &[
                "nsContentUtils",
                "nsIDOMUIEvent",
                "nsIDOMDataEvent",
                "nsIDOMEventTarget",
                "nsIDOMWindow",
                "nsIVariant",
                "nsIDOMDataTransfer",
            ]
        );
        let emitted: Vec<_> = session.emitted_includes().collect();
        assert!(!emitted.contains(&"nsIDOMEventTarget"));
        assert_eq!(emitted.len(), 6);
    }

    #[test]
    fn test_shared_types_and_names_recorded_once() {
        let alpha = r#"
#include "nsIDOMEvent.idl"
interface nsIWidget;
interface nsIDOMAlphaEvent : nsIDOMEvent { readonly attribute nsIWidget target; };
"#;
        let beta = r#"
#include "nsIDOMEvent.idl"
interface nsIWidget;
interface nsIDOMBetaEvent : nsIDOMEvent { readonly attribute nsIWidget target; };
"#;
        let dir = fixtures(&[("nsIDOMAlphaEvent.idl", alpha), ("nsIDOMBetaEvent.idl", beta)]);
        let session = open(&dir, config(&["AlphaEvent", "BetaEvent"]));

        let widgets = session.includes().iter().filter(|i| *i == "nsIWidget").count();
        assert_eq!(widgets, 1);
        let targets = session
            .attribute_names()
            .iter()
            .filter(|n| *n == "target")
            .count();
        assert_eq!(targets, 1);
    }

    #[test]
    fn test_duplicate_event_listed_once() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["UIEvent", "UIEvent"]));
        assert_eq!(session.events().len(), 1);
    }

    #[test]
    fn test_missing_interface() {
        let dir = fixtures(&[(
            "nsIDOMWrongEvent.idl",
            "#include \"nsIDOMEvent.idl\"\n\
             interface nsIDOMRightEvent : nsIDOMEvent { readonly attribute long x; };",
        )]);
        let err = GenerationSession::open(config(&["WrongEvent"]), SchemaLoader::new([dir.path()]))
            .expect_err("should fail");
        assert!(matches!(err, CodegenError::MissingInterface { .. }));
    }

    #[test]
    fn test_dependencies_recorded() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["UIEvent"]));
        let files: Vec<_> = session
            .dependencies()
            .iter()
            .filter_map(|p| p.file_name().and_then(|f| f.to_str()))
            .collect();
        assert_eq!(
            files,
            vec!["nsIDOMUIEvent.idl", "nsIDOMEvent.idl", "nsISupports.idl"]
        );
    }
}
