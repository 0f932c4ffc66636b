//! Event class declaration header generation.

use super::{INIT_PARAMS, context_param, native_params};
use crate::session::{EventSchema, GenerationSession};
use crate::type_map::{first_cap, member_name};
use eventgen_idl::flatten::class_name;
use eventgen_idl::ir::NativeType;

/// Generator for the header declaring one C++ class per event.
pub struct ClassDeclarationGenerator<'a> {
    session: &'a GenerationSession,
}

impl<'a> ClassDeclarationGenerator<'a> {
    /// Creates a new class declaration generator.
    #[must_use]
    pub fn new(session: &'a GenerationSession) -> Self {
        Self { session }
    }

    /// Generates the header text.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str("#ifndef _gen_mozilla_idl_generated_event_declarations_h_\n");
        output.push_str("#define _gen_mozilla_idl_generated_event_declarations_h_\n\n");
        output.push_str("#include \"mozilla/dom/Event.h\"\n");

        for include in self.session.emitted_includes() {
            output.push_str(&format!("#include \"{include}.h\"\n"));
        }
        for event in self.session.events() {
            output.push_str(&format!("#include \"mozilla/dom/{}Binding.h\"\n", event.name));
        }

        output.push_str("namespace mozilla {\n");
        output.push_str("namespace dom {\n");
        for event in self.session.events() {
            output.push_str(&self.generate_class(event));
        }
        output.push_str("} // namespace dom\n");
        output.push_str("} // namespace mozilla\n\n");
        output.push_str("#endif\n");

        output
    }

    /// Generates the declaration of one event class.
    fn generate_class(&self, event: &EventSchema) -> String {
        let mut output = String::new();
        let mapper = self.session.mapper();
        let flat = &event.flat;
        let name = &event.name;
        let base = flat.base_class();
        let has_variant = flat.has_variant();

        output.push_str(&format!(
            "\nclass {name} MOZ_FINAL : public {base}, public {}\n",
            event.interface_name()
        ));
        output.push_str("{\n");
        output.push_str("public:\n");
        output.push_str(&format!(
            "  {name}(mozilla::dom::EventTarget* aOwner, \
             nsPresContext* aPresContext = nullptr, mozilla::WidgetEvent* aEvent = nullptr);\n"
        ));
        output.push_str(&format!("  virtual ~{name}();\n\n"));
        output.push_str("  NS_DECL_ISUPPORTS_INHERITED\n");
        output.push_str(&format!(
            "  NS_DECL_CYCLE_COLLECTION_CLASS_INHERITED({name}, {base})\n"
        ));
        output.push_str("  NS_FORWARD_TO_EVENT\n");
        for ancestor in &flat.ancestors {
            output.push_str(&format!(
                "  NS_FORWARD_{}({}::)\n",
                ancestor.name.to_uppercase(),
                class_name(&ancestor.name)
            ));
        }
        output.push_str(&format!(
            "  NS_DECL_{}\n",
            event.interface_name().to_uppercase()
        ));

        output.push_str(&format!(
            "  static already_AddRefed<{name}> Constructor(const GlobalObject& aGlobal, \
             {}const nsAString& aType, const {name}Init& aParam, ErrorResult& aRv);\n\n",
            context_param(has_variant)
        ));

        output.push_str("  virtual JSObject* WrapObject(JSContext* aCx) MOZ_OVERRIDE\n");
        output.push_str("  {\n");
        output.push_str(&format!(
            "    return mozilla::dom::{name}Binding::Wrap(aCx, this);\n"
        ));
        output.push_str("  }\n\n");

        // String getters come from the XPCOM interface.
        for attr in flat.own_attributes() {
            let cap = first_cap(&attr.name);
            match &attr.native {
                NativeType::Text(_) => {}
                NativeType::Variant => {
                    output.push_str(&format!(
                        "  void Get{cap}(JSContext* aCx, JS::MutableHandle<JS::Value> aRetval, \
                         ErrorResult& aRv);\n\n"
                    ));
                }
                NativeType::Pointer(pointee) => {
                    let native = mapper.native_name(pointee);
                    output.push_str(&format!("  already_AddRefed<{native}> Get{cap}()\n"));
                    output.push_str("  {\n");
                    output.push_str(&format!(
                        "    nsCOMPtr<{}> {} = do_QueryInterface({});\n",
                        mapper.canonical_name(pointee),
                        attr.name,
                        member_name(attr)
                    ));
                    output.push_str(&format!(
                        "    return {}.forget().downcast<{native}>();\n",
                        attr.name
                    ));
                    output.push_str("  }\n\n");
                }
                NativeType::ScriptValue | NativeType::Scalar(_) => {
                    output.push_str(&format!("  {} {cap}()\n", mapper.storage(attr)));
                    output.push_str("  {\n");
                    output.push_str(&format!("    return {};\n", member_name(attr)));
                    output.push_str("  }\n\n");
                }
            }
        }

        output.push_str(&format!(
            "  void Init{name}({}{INIT_PARAMS}{}, ErrorResult& aRv);\n\n",
            context_param(has_variant),
            native_params(&mapper, flat.all_attributes())
        ));

        output.push_str("protected:\n");
        for attr in flat.own_attributes() {
            output.push_str(&format!(
                "  {} {};\n",
                mapper.storage(attr),
                member_name(attr)
            ));
        }
        output.push_str("};\n");

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeOverride;
    use crate::session::tests::{config, fixtures, open};

    #[test]
    fn test_includes_block() {
        let dir = fixtures(&[]);
        let mut cfg = config(&["UIEvent", "DataEvent"]);
        cfg.special_includes = vec!["nsContentUtils.h".to_string()];
        cfg.exclude_automatic_type_include = vec!["nsIVariant".to_string()];
        let session = open(&dir, cfg);
        let text = ClassDeclarationGenerator::new(&session).generate();

        let expected = "#include \"mozilla/dom/Event.h\"\n\
                        #include \"nsContentUtils.h\"\n\
                        #include \"nsIDOMUIEvent.h\"\n\
                        #include \"nsIDOMDataEvent.h\"\n\
                        #include \"nsIDOMEventTarget.h\"\n\
                        #include \"nsIDOMWindow.h\"\n\
                        #include \"nsIDOMDataTransfer.h\"\n\
                        #include \"mozilla/dom/UIEventBinding.h\"\n\
                        #include \"mozilla/dom/DataEventBinding.h\"\n";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn test_class_with_ancestor() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["ScrollAreaEvent"]));
        let text = ClassDeclarationGenerator::new(&session).generate();

        assert!(text.contains(
            "\nclass ScrollAreaEvent MOZ_FINAL : public UIEvent, public nsIDOMScrollAreaEvent\n"
        ));
        assert!(text.contains("  NS_DECL_CYCLE_COLLECTION_CLASS_INHERITED(ScrollAreaEvent, UIEvent)\n"));
        assert!(text.contains("  NS_FORWARD_NSIDOMUIEVENT(UIEvent::)\n"));
        assert!(text.contains("  NS_DECL_NSIDOMSCROLLAREAEVENT\n"));
        assert!(text.contains(
            "Constructor(const GlobalObject& aGlobal, const nsAString& aType, \
             const ScrollAreaEventInit& aParam, ErrorResult& aRv);"
        ));
        assert!(text.contains("  float X()\n  {\n    return mX;\n  }\n"));
        assert!(!text.contains("Label()"));
        assert!(text.contains(
            "  void InitScrollAreaEvent(const nsAString& aType, bool aCanBubble, bool aCancelable, \
             nsIDOMWindow* aView, int32_t aDetail, float aX, float aY, bool aHorizontal, \
             const nsAString& aLabel, ErrorResult& aRv);\n"
        ));
        assert!(text.contains(
            "protected:\n  float mX;\n  float mY;\n  bool mHorizontal;\n  nsString mLabel;\n};\n"
        ));
    }

    #[test]
    fn test_class_with_variant_and_override() {
        let dir = fixtures(&[]);
        let mut cfg = config(&["DataEvent"]);
        cfg.xpidl_to_native = vec![TypeOverride::new(
            "nsIDOMDataTransfer",
            "mozilla::dom::DataTransfer",
            "nsIDOMDataTransfer",
        )];
        let session = open(&dir, cfg);
        let text = ClassDeclarationGenerator::new(&session).generate();

        assert!(text.contains("Constructor(const GlobalObject& aGlobal, JSContext* aCx, "));
        assert!(text.contains(
            "  void GetData(JSContext* aCx, JS::MutableHandle<JS::Value> aRetval, ErrorResult& aRv);\n"
        ));
        assert!(text.contains(
            "  already_AddRefed<mozilla::dom::DataTransfer> GetDataTransfer()\n  {\n    \
             nsCOMPtr<nsIDOMDataTransfer> dataTransfer = do_QueryInterface(mDataTransfer);\n    \
             return dataTransfer.forget().downcast<mozilla::dom::DataTransfer>();\n  }\n"
        ));
        assert!(text.contains(
            "  void InitDataEvent(JSContext* aCx, const nsAString& aType, bool aCanBubble, \
             bool aCancelable, JS::Value aData, mozilla::dom::DataTransfer* aDataTransfer, \
             nsIDOMWindow* aSource, const nsACString& aOrigin, ErrorResult& aRv);\n"
        ));
        assert!(text.contains("  nsCOMPtr<nsIVariant> mData;\n"));
        assert!(text.contains("  nsCOMPtr<nsIDOMDataTransfer> mDataTransfer;\n"));
        assert!(text.contains("  nsCString mOrigin;\n"));
    }

    #[test]
    fn test_deterministic() {
        let dir = fixtures(&[]);
        let first = open(&dir, config(&["ScrollAreaEvent", "DataEvent"]));
        let second = open(&dir, config(&["ScrollAreaEvent", "DataEvent"]));
        assert_eq!(
            ClassDeclarationGenerator::new(&first).generate(),
            ClassDeclarationGenerator::new(&second).generate()
        );
    }
}
