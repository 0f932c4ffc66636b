//! WebIDL binding file generation.

use crate::error::CodegenError;
use crate::session::{EventSchema, GenerationSession};
use crate::type_map::TypeMapper;
use eventgen_idl::ir::{Attribute, Constant, Dictionary, Member, NativeType};

const LICENSE_HEADER: &str = "\
/* -*- Mode: IDL; tab-width: 2; indent-tabs-mode: nil; c-basic-offset: 2 -*- */
/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * You can obtain one at http://mozilla.org/MPL/2.0/.
 */
";

/// Returns the WebIDL file name of an event (`MouseEvent.webidl`).
#[must_use]
pub fn webidl_file_name(event: &str) -> String {
    format!("{event}.webidl")
}

/// Generator for the per-event WebIDL files.
pub struct WebIdlGenerator<'a> {
    session: &'a GenerationSession,
}

impl<'a> WebIdlGenerator<'a> {
    /// Creates a new WebIDL generator.
    #[must_use]
    pub fn new(session: &'a GenerationSession) -> Self {
        Self { session }
    }

    /// Generates `(file name, contents)` for every event, in order.
    ///
    /// # Errors
    /// See [`WebIdlGenerator::generate_event`].
    pub fn generate(&self) -> Result<Vec<(String, String)>, CodegenError> {
        self.session
            .events()
            .iter()
            .map(|event| Ok((webidl_file_name(&event.name), self.generate_event(event)?)))
            .collect()
    }

    /// Generates the WebIDL file of one event.
    ///
    /// # Errors
    /// Returns `CodegenError::UnsupportedConstruct` for methods other than
    /// the event's `init{E}` method and `CodegenError::InvalidDefault` when a
    /// synthesized dictionary member has no zero default.
    pub fn generate_event(&self, event: &EventSchema) -> Result<String, CodegenError> {
        let mut output = String::new();
        let mapper = self.session.mapper();
        let name = &event.name;
        let base = event.flat.base_class();

        let init_method = format!("init{name}");
        let mut has_init = false;
        let mut constants: Vec<&Constant> = Vec::new();
        for member in &event.interface().members {
            match member {
                Member::Attribute(_) => {}
                Member::Constant(c) => constants.push(c),
                Member::Method(m) if m.name == init_method => {
                    has_init = m.is_script_visible();
                }
                Member::Method(m) => return Err(CodegenError::unsupported(name, &m.name)),
            }
        }

        output.push_str(LICENSE_HEADER);

        let mut forwards: Vec<String> = Vec::new();
        for attr in event.flat.own_attributes() {
            let Some(pointee) = attr.native.pointee() else {
                continue;
            };
            if mapper.is_overridden(pointee) {
                continue;
            }
            let interface = mapper.binding(attr, true);
            if interface != "any" && !forwards.contains(&interface) {
                forwards.push(interface);
            }
        }
        for interface in &forwards {
            output.push_str(&format!("interface {interface};\n"));
        }

        output.push('\n');
        output.push_str(&format!(
            "[Constructor(DOMString type, optional {name}Init eventInitDict), \
             HeaderFile=\"GeneratedEventClasses.h\"]\n"
        ));
        output.push_str(&format!("interface {name} : {base}\n"));
        output.push_str("{\n");

        for c in &constants {
            output.push_str(&format!("  const {} {} = {};\n", c.type_name, c.name, c.value));
        }
        if !constants.is_empty() {
            output.push('\n');
        }

        for attr in event.flat.own_attributes() {
            if attr.native == NativeType::Variant {
                output.push_str("  [Throws]\n");
            }
            output.push_str(&format!(
                "  readonly attribute {} {};\n",
                mapper.binding(attr, false),
                attr.name
            ));
        }

        if has_init {
            output.push_str("\n  [Throws]\n");
            let open = format!("  void {init_method}(");
            let separator = format!(",\n{}", " ".repeat(open.len()));
            let mut params = vec![
                "DOMString type".to_string(),
                "boolean canBubble".to_string(),
                "boolean cancelable".to_string(),
            ];
            params.extend(
                event
                    .flat
                    .all_attributes()
                    .map(|a| format!("{} {}", mapper.binding(a, false), a.name)),
            );
            output.push_str(&open);
            output.push_str(&params.join(&separator));
            output.push_str(");\n");
        }
        output.push_str("};\n\n");

        output.push_str(&format!("dictionary {name}Init : {base}Init\n"));
        output.push_str("{\n");
        match event.init_dictionary() {
            Some(dict) => output.push_str(&explicit_members(event, dict, &mapper)),
            None => output.push_str(&synthesized_members(event, &mapper)?),
        }
        output.push_str("};\n");

        Ok(output)
    }
}

/// Members of a declared `{E}Init` dictionary, in interface attribute order.
fn explicit_members(event: &EventSchema, dict: &Dictionary, mapper: &TypeMapper<'_>) -> String {
    let mut output = String::new();

    for attr in event.flat.own_attributes() {
        let Some(member) = dict.member(&attr.name) else {
            continue;
        };
        let type_name = &member.type_name;
        let name = &member.name;
        let nullable = if member.nullable { "?" } else { "" };
        let default = member.default.as_ref().map(|d| d.text());

        let line = match (&member.native, default) {
            (native, _) if native.is_pointer_like() => {
                format!("{} {name} = null", mapper.binding(member, true))
            }
            (NativeType::Text(_), None) if member.nullable => format!("{type_name}? {name} = null"),
            (NativeType::Text(_), None) => format!("{type_name} {name} = \"\""),
            (NativeType::Text(_), Some(value)) => {
                format!("{type_name}{nullable} {name} = \"{value}\"")
            }
            (_, None) if type_name == "boolean" => format!("{type_name} {name} = false"),
            (_, None) => format!("{type_name} {name} = 0"),
            (_, Some(value @ ("Infinity" | "-Infinity"))) => {
                format!("unrestricted {type_name} {name} = {value}")
            }
            (_, Some(value)) => format!("{type_name} {name} = {value}"),
        };
        output.push_str(&format!("  {line};\n"));
    }

    output
}

/// Zero-default members derived from the interface attributes.
fn synthesized_members(
    event: &EventSchema,
    mapper: &TypeMapper<'_>,
) -> Result<String, CodegenError> {
    let mut output = String::new();

    for attr in event.flat.own_attributes() {
        let name = &attr.name;
        let type_name = &attr.type_name;
        let line = match &attr.native {
            NativeType::Pointer(_) | NativeType::Variant => {
                format!("{} {name} = null", mapper.binding(attr, true))
            }
            NativeType::Text(_) => format!("{type_name}? {name} = \"\""),
            NativeType::ScriptValue => return Err(script_value_default(attr)),
            NativeType::Scalar(_) if type_name == "boolean" => {
                format!("{type_name} {name} = false")
            }
            NativeType::Scalar(_) => format!("{type_name} {name} = 0"),
        };
        output.push_str(&format!("  {line};\n"));
    }

    Ok(output)
}

fn script_value_default(attr: &Attribute) -> CodegenError {
    CodegenError::invalid_default(&attr.name, &attr.type_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeOverride;
    use crate::session::tests::{config, fixtures, open};

    #[test]
    fn test_explicit_dictionary_and_init() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["ScrollAreaEvent"]));
        let files = WebIdlGenerator::new(&session).generate().expect("Failed to generate");
        assert_eq!(files.len(), 1);
        let (file, text) = &files[0];
        assert_eq!(file, "ScrollAreaEvent.webidl");

        assert!(text.starts_with(LICENSE_HEADER));
        assert!(text.contains(
            "\n[Constructor(DOMString type, optional ScrollAreaEventInit eventInitDict), \
             HeaderFile=\"GeneratedEventClasses.h\"]\ninterface ScrollAreaEvent : UIEvent\n{\n"
        ));
        assert!(text.contains(
            "  readonly attribute float x;\n  readonly attribute float y;\n  \
             readonly attribute boolean horizontal;\n  readonly attribute DOMString? label;\n"
        ));
        let indent = " ".repeat("  void initScrollAreaEvent(".len());
        let params = [
            "boolean canBubble",
            "boolean cancelable",
            "Window? view",
            "long detail",
            "float x",
            "float y",
            "boolean horizontal",
            "DOMString? label",
        ];
        let mut expected = "\n  [Throws]\n  void initScrollAreaEvent(DOMString type".to_string();
        for param in params {
            expected.push_str(&format!(",\n{indent}{param}"));
        }
        expected.push_str(");\n};\n\n");
        assert!(text.contains(&expected), "{text}");
        assert!(text.ends_with(
            "dictionary ScrollAreaEventInit : UIEventInit\n{\n  float x = 0;\n  \
             unrestricted float y = Infinity;\n  boolean horizontal = false;\n  \
             DOMString label = \"none\";\n};\n"
        ));
    }

    #[test]
    fn test_synthesized_dictionary_and_forwards() {
        let dir = fixtures(&[]);
        let mut cfg = config(&["DataEvent"]);
        cfg.xpidl_to_native = vec![TypeOverride::new(
            "nsIDOMDataTransfer",
            "mozilla::dom::DataTransfer",
            "nsIDOMDataTransfer",
        )];
        let session = open(&dir, cfg);
        let event = session.event("DataEvent").expect("event");
        let text = WebIdlGenerator::new(&session)
            .generate_event(event)
            .expect("Failed to generate");

        assert!(text.contains(" */\ninterface Window;\n\n[Constructor"));
        assert!(!text.contains("interface DataTransfer;"));
        assert!(text.contains("  const long KIND_COPY = 1;\n  const long KIND_MOVE = 2;\n\n"));
        assert!(text.contains("  [Throws]\n  readonly attribute any data;\n"));
        assert!(text.contains("  readonly attribute DataTransfer? dataTransfer;\n"));
        assert!(!text.contains("void initDataEvent"));
        assert!(text.ends_with(
            "dictionary DataEventInit : EventInit\n{\n  any data = null;\n  \
             DataTransfer dataTransfer = null;\n  Window source = null;\n  \
             ACString? origin = \"\";\n};\n"
        ));
    }

    #[test]
    fn test_noscript_init_is_skipped() {
        let dir = fixtures(&[(
            "nsIDOMQuietEvent.idl",
            "#include \"nsIDOMEvent.idl\"\n\
             interface nsIDOMQuietEvent : nsIDOMEvent {\n\
               readonly attribute long level;\n\
               [noscript] void initQuietEvent(in DOMString type, in long level);\n\
             };",
        )]);
        let session = open(&dir, config(&["QuietEvent"]));
        let event = session.event("QuietEvent").expect("event");
        let text = WebIdlGenerator::new(&session)
            .generate_event(event)
            .expect("Failed to generate");

        assert!(!text.contains("initQuietEvent"));
        assert!(text.contains("  long level = 0;\n"));
    }

    #[test]
    fn test_unsupported_method() {
        let dir = fixtures(&[(
            "nsIDOMBusyEvent.idl",
            "#include \"nsIDOMEvent.idl\"\n\
             interface nsIDOMBusyEvent : nsIDOMEvent { void poke(); };",
        )]);
        let session = open(&dir, config(&["BusyEvent"]));

        let err = WebIdlGenerator::new(&session).generate().expect_err("should fail");
        assert_eq!(err.to_string(), "unsupported idl member BusyEvent::poke");
    }

    #[test]
    fn test_explicit_dictionary_defaults() {
        let dir = fixtures(&[(
            "nsIDOMNoteEvent.idl",
            "#include \"nsIDOMEvent.idl\"\n\
             interface nsIDOMWindow;\n\
             interface nsIDOMNoteEvent : nsIDOMEvent {\n\
               readonly attribute nsIDOMWindow author;\n\
               readonly attribute DOMString title;\n\
               readonly attribute DOMString body;\n\
               readonly attribute double weight;\n\
             };\n\
             dictionary NoteEventInit {\n\
               double weight = -Infinity;\n\
               DOMString? body = \"empty\";\n\
               DOMString? title;\n\
               nsIDOMWindow author;\n\
             };",
        )]);
        let session = open(&dir, config(&["NoteEvent"]));
        let event = session.event("NoteEvent").expect("event");
        let text = WebIdlGenerator::new(&session)
            .generate_event(event)
            .expect("Failed to generate");

        assert!(text.ends_with(
            "{\n  Window author = null;\n  DOMString? title = null;\n  \
             DOMString? body = \"empty\";\n  unrestricted double weight = -Infinity;\n};\n"
        ));
    }
}
