//! Event class implementation generation.

use super::{INIT_PARAMS, context_param, native_params, xpcom_params};
use crate::error::CodegenError;
use crate::session::{EventSchema, GenerationSession};
use crate::type_map::{TypeMapper, arg_name, first_cap, member_name};
use eventgen_idl::ir::{Attribute, NativeType, TextKind, VARIANT_INTERFACE};

/// Generator for the C++ implementation of every event class.
pub struct SourceGenerator<'a> {
    session: &'a GenerationSession,
}

impl<'a> SourceGenerator<'a> {
    /// Creates a new source generator.
    #[must_use]
    pub fn new(session: &'a GenerationSession) -> Self {
        Self { session }
    }

    /// Generates the implementation file.
    ///
    /// # Errors
    /// Returns `CodegenError::InvalidDefault` if an event declares an
    /// attribute whose constructor default cannot be expressed.
    pub fn generate(&self) -> Result<String, CodegenError> {
        let mut output = String::new();

        output.push_str("/* THIS FILE IS AUTOGENERATED - DO NOT EDIT */\n\n");
        output.push_str("#include \"GeneratedEventClasses.h\"\n");
        output.push_str("#include \"xpcprivate.h\"\n");
        output.push_str("#include \"mozilla/dom/Event.h\"\n");
        output.push_str("#include \"mozilla/dom/EventTarget.h\"\n");

        for event in self.session.events() {
            output.push_str(&self.generate_event(event)?);
        }

        Ok(output)
    }

    fn generate_event(&self, event: &EventSchema) -> Result<String, CodegenError> {
        let mut output = String::new();
        let mapper = self.session.mapper();

        output.push_str("namespace mozilla {\n");
        output.push_str("namespace dom {\n\n");
        output.push_str(&generate_constructor(event, &mapper)?);
        output.push_str(&generate_lifecycle(event));
        output.push_str(&generate_static_constructor(event));
        output.push_str(&generate_xpcom_init(event, &mapper));
        output.push_str(&generate_native_init(event, &mapper));
        for attr in event.flat.own_attributes() {
            output.push_str(&generate_getter(&event.name, attr, &mapper));
        }
        output.push_str("} // namespace dom\n");
        output.push_str("} // namespace mozilla\n\n");
        output.push_str(&generate_factory(&event.name));

        Ok(output)
    }
}

/// Constructor, with every own attribute zero-initialized.
fn generate_constructor(
    event: &EventSchema,
    mapper: &TypeMapper<'_>,
) -> Result<String, CodegenError> {
    let mut output = String::new();
    let name = &event.name;

    output.push_str(&format!(
        "{name}::{name}(mozilla::dom::EventTarget* aOwner, \
         nsPresContext* aPresContext, mozilla::WidgetEvent* aEvent)\n"
    ));
    output.push_str(&format!(
        ": {}(aOwner, aPresContext, aEvent)",
        event.flat.base_class()
    ));
    for attr in event.flat.own_attributes() {
        output.push_str(&format!(
            ",\n  {}({})",
            member_name(attr),
            mapper.zero_default(attr)?
        ));
    }
    output.push_str("\n{\n");
    output.push_str("}\n\n");

    Ok(output)
}

/// Destructor, cycle collection, refcounting and the interface map.
fn generate_lifecycle(event: &EventSchema) -> String {
    let mut output = String::new();
    let name = &event.name;
    let base = event.flat.base_class();
    let collected: Vec<_> = event
        .flat
        .own_attributes()
        .filter(|a| a.native.is_pointer_like())
        .map(member_name)
        .collect();

    output.push_str(&format!("{name}::~{name}() {{}}\n\n"));

    output.push_str(&format!("NS_IMPL_CYCLE_COLLECTION_CLASS({name})\n"));
    output.push_str(&format!(
        "NS_IMPL_CYCLE_COLLECTION_UNLINK_BEGIN_INHERITED({name}, {base})\n"
    ));
    for member in &collected {
        output.push_str(&format!("  NS_IMPL_CYCLE_COLLECTION_UNLINK({member})\n"));
    }
    output.push_str("NS_IMPL_CYCLE_COLLECTION_UNLINK_END\n\n");
    output.push_str(&format!(
        "NS_IMPL_CYCLE_COLLECTION_TRAVERSE_BEGIN_INHERITED({name}, {base})\n"
    ));
    for member in &collected {
        output.push_str(&format!("  NS_IMPL_CYCLE_COLLECTION_TRAVERSE({member})\n"));
    }
    output.push_str("NS_IMPL_CYCLE_COLLECTION_TRAVERSE_END\n\n");

    output.push_str(&format!("NS_IMPL_ADDREF_INHERITED({name}, {base})\n"));
    output.push_str(&format!("NS_IMPL_RELEASE_INHERITED({name}, {base})\n\n"));

    output.push_str(&format!(
        "NS_INTERFACE_MAP_BEGIN_CYCLE_COLLECTION_INHERITED({name})\n"
    ));
    output.push_str(&format!(
        "  NS_INTERFACE_MAP_ENTRY({})\n",
        event.interface_name()
    ));
    output.push_str(&format!("NS_INTERFACE_MAP_END_INHERITING({base})\n\n"));

    output
}

/// Static WebIDL constructor forwarding the init dictionary.
fn generate_static_constructor(event: &EventSchema) -> String {
    let mut output = String::new();
    let name = &event.name;
    let has_variant = event.flat.has_variant();
    let context = context_param(has_variant);

    output.push_str(&format!("already_AddRefed<{name}>\n"));
    output.push_str(&format!(
        "{name}::Constructor(const GlobalObject& aGlobal, {context}\
         const nsAString& aType, const {name}Init& aParam, ErrorResult& aRv)\n"
    ));
    output.push_str("{\n");
    output.push_str(
        "  nsCOMPtr<mozilla::dom::EventTarget> t = do_QueryInterface(aGlobal.GetAsSupports());\n",
    );
    output.push_str(&format!(
        "  nsRefPtr<{name}> e = new {name}(t, nullptr, nullptr);\n"
    ));
    output.push_str("  bool trusted = e->Init(t);\n");

    let fields: String = event
        .flat
        .all_attributes()
        .map(|a| format!(", aParam.m{}", first_cap(&a.name)))
        .collect();
    output.push_str(&format!(
        "  e->Init{name}({}aType, aParam.mBubbles, aParam.mCancelable{fields}, aRv);\n",
        if has_variant { "aCx, " } else { "" }
    ));
    output.push_str("  e->SetTrusted(trusted);\n");
    output.push_str("  return e.forget();\n");
    output.push_str("}\n\n");

    output
}

/// XPCOM `Init{E}`: chains to the base initializer, then stores own values.
fn generate_xpcom_init(event: &EventSchema, mapper: &TypeMapper<'_>) -> String {
    let mut output = String::new();
    let name = &event.name;
    let base = event.flat.base_class();

    output.push_str("NS_IMETHODIMP\n");
    output.push_str(&format!(
        "{name}::Init{name}({INIT_PARAMS}{})\n",
        xpcom_params(mapper, event.flat.all_attributes())
    ));
    output.push_str("{\n");

    let base_args: String = event
        .flat
        .base_attributes()
        .map(|a| format!(", {}", arg_name(a)))
        .collect();
    output.push_str(&format!(
        "  nsresult rv = {base}::Init{base}(aType, aCanBubble, aCancelable{base_args});\n"
    ));
    output.push_str("  NS_ENSURE_SUCCESS(rv, rv);\n");

    for attr in event.flat.own_attributes() {
        let member = member_name(attr);
        let arg = arg_name(attr);
        if attr.native == NativeType::Text(TextKind::Wide) {
            output.push_str(&format!("  if (!{member}.Assign({arg}, fallible_t())) {{\n"));
            output.push_str("    return NS_ERROR_OUT_OF_MEMORY;\n");
            output.push_str("  }\n");
        } else {
            output.push_str(&format!("  {member} = {arg};\n"));
        }
    }

    output.push_str("  return NS_OK;\n");
    output.push_str("}\n\n");

    output
}

/// Native `Init{E}`: converts variants and overridden pointers, then calls
/// the XPCOM initializer.
fn generate_native_init(event: &EventSchema, mapper: &TypeMapper<'_>) -> String {
    let mut output = String::new();
    let name = &event.name;
    let has_variant = event.flat.has_variant();

    output.push_str("void\n");
    output.push_str(&format!(
        "{name}::Init{name}({}{INIT_PARAMS}{}, ErrorResult& aRv)\n",
        context_param(has_variant),
        native_params(mapper, event.flat.all_attributes())
    ));
    output.push_str("{\n");

    let mut args = String::new();
    for attr in event.flat.all_attributes() {
        let local = &attr.name;
        let arg = arg_name(attr);
        match &attr.native {
            NativeType::Variant => {
                output.push_str(&format!(
                    "  nsCOMPtr<{VARIANT_INTERFACE}> {local} = \
                     dont_AddRef(XPCVariant::newVariant(aCx, {arg}));\n"
                ));
                output.push_str(&format!("  if (!{local}) {{\n"));
                output.push_str("    aRv.Throw(NS_ERROR_FAILURE);\n");
                output.push_str("    return;\n");
                output.push_str("  }\n");
                args.push_str(&format!(", {local}"));
            }
            NativeType::Pointer(pointee) if mapper.needs_bridge(attr) => {
                output.push_str(&format!(
                    "  nsCOMPtr<{pointee}> {local} = do_QueryInterface(static_cast<{}*>({arg}));\n",
                    mapper.canonical_name(pointee)
                ));
                args.push_str(&format!(", {local}"));
            }
            _ => args.push_str(&format!(", {arg}")),
        }
    }

    output.push_str(&format!(
        "  aRv = Init{name}(aType, aCanBubble, aCancelable{args});\n"
    ));
    output.push_str("}\n\n");

    output
}

/// XPCOM getter for one own attribute, plus the script getter for variants.
fn generate_getter(class: &str, attr: &Attribute, mapper: &TypeMapper<'_>) -> String {
    let mut output = String::new();
    let cap = first_cap(&attr.name);
    let member = member_name(attr);
    let arg = arg_name(attr);

    output.push_str("NS_IMETHODIMP\n");
    output.push_str(&format!(
        "{class}::Get{cap}({})\n",
        mapper.getter_out_param(attr)
    ));
    output.push_str("{\n");
    match &attr.native {
        NativeType::Pointer(_) | NativeType::Variant => {
            output.push_str(&format!("  NS_IF_ADDREF(*{arg} = {member});\n"));
        }
        NativeType::Text(_) => output.push_str(&format!("  {arg} = {member};\n")),
        NativeType::ScriptValue | NativeType::Scalar(_) => {
            output.push_str(&format!("  *{arg} = {cap}();\n"));
        }
    }
    output.push_str("  return NS_OK;\n");
    output.push_str("}\n\n");

    if attr.native == NativeType::Variant {
        output.push_str("void\n");
        output.push_str(&format!(
            "{class}::Get{cap}(JSContext* aCx, JS::MutableHandle<JS::Value> aRetval, \
             ErrorResult& aRv)\n"
        ));
        output.push_str("{\n");
        output.push_str("  nsresult rv = NS_ERROR_UNEXPECTED;\n");
        output.push_str(&format!("  if (!{member}) {{\n"));
        output.push_str("    aRetval.setNull();\n");
        output.push_str(&format!(
            "  }} else if (!XPCVariant::VariantDataToJS({member}, &rv, aRetval)) {{\n"
        ));
        output.push_str("    aRv.Throw(NS_ERROR_FAILURE);\n");
        output.push_str("  }\n");
        output.push_str("}\n\n");
    }

    output
}

/// Free `NS_NewDOM{E}` factory.
fn generate_factory(name: &str) -> String {
    let mut output = String::new();

    output.push_str("nsresult\n");
    output.push_str(&format!(
        "NS_NewDOM{name}(nsIDOMEvent** aInstance, mozilla::dom::EventTarget* aOwner, \
         nsPresContext* aPresContext = nullptr, mozilla::WidgetEvent* aEvent = nullptr)\n"
    ));
    output.push_str("{\n");
    output.push_str(&format!(
        "  mozilla::dom::{name}* it = new mozilla::dom::{name}(aOwner, aPresContext, aEvent);\n"
    ));
    output.push_str("  NS_ADDREF(it);\n");
    output.push_str("  *aInstance = static_cast<mozilla::dom::Event*>(it);\n");
    output.push_str("  return NS_OK;\n");
    output.push_str("}\n\n");

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TypeOverride;
    use crate::session::tests::{config, fixtures, open};

    fn data_transfer_override() -> TypeOverride {
        TypeOverride::new(
            "nsIDOMDataTransfer",
            "mozilla::dom::DataTransfer",
            "nsIDOMDataTransfer",
        )
    }

    #[test]
    fn test_constructor_defaults() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["ScrollAreaEvent"]));
        let text = SourceGenerator::new(&session).generate().expect("Failed to generate");

        assert!(text.starts_with("/* THIS FILE IS AUTOGENERATED - DO NOT EDIT */\n\n"));
        assert!(text.contains(
            "ScrollAreaEvent::ScrollAreaEvent(mozilla::dom::EventTarget* aOwner, \
             nsPresContext* aPresContext, mozilla::WidgetEvent* aEvent)\n\
             : UIEvent(aOwner, aPresContext, aEvent),\n  mX(0),\n  mY(0),\n  \
             mHorizontal(false),\n  mLabel()\n{\n}\n"
        ));
    }

    #[test]
    fn test_xpcom_init_chains_to_base() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["ScrollAreaEvent"]));
        let text = SourceGenerator::new(&session).generate().expect("Failed to generate");

        assert!(text.contains(
            "NS_IMETHODIMP\nScrollAreaEvent::InitScrollAreaEvent(const nsAString& aType, \
             bool aCanBubble, bool aCancelable, nsIDOMWindow* aView, int32_t aDetail, \
             float aX, float aY, bool aHorizontal, const nsAString& aLabel)\n{\n  \
             nsresult rv = UIEvent::InitUIEvent(aType, aCanBubble, aCancelable, aView, aDetail);\n  \
             NS_ENSURE_SUCCESS(rv, rv);\n  mX = aX;\n  mY = aY;\n  mHorizontal = aHorizontal;\n  \
             if (!mLabel.Assign(aLabel, fallible_t())) {\n    return NS_ERROR_OUT_OF_MEMORY;\n  }\n  \
             return NS_OK;\n}\n"
        ));
        assert!(text.contains(
            "  e->InitScrollAreaEvent(aType, aParam.mBubbles, aParam.mCancelable, \
             aParam.mView, aParam.mDetail, aParam.mX, aParam.mY, aParam.mHorizontal, \
             aParam.mLabel, aRv);\n"
        ));
        assert!(text.contains("NS_IMPL_CYCLE_COLLECTION_UNLINK_BEGIN_INHERITED(ScrollAreaEvent, UIEvent)\nNS_IMPL_CYCLE_COLLECTION_UNLINK_END\n"));
    }

    #[test]
    fn test_variant_and_override_bridging() {
        let dir = fixtures(&[]);
        let mut cfg = config(&["DataEvent"]);
        cfg.xpidl_to_native = vec![data_transfer_override()];
        let session = open(&dir, cfg);
        let text = SourceGenerator::new(&session).generate().expect("Failed to generate");

        assert!(text.contains(
            "void\nDataEvent::InitDataEvent(JSContext* aCx, const nsAString& aType, \
             bool aCanBubble, bool aCancelable, JS::Value aData, \
             mozilla::dom::DataTransfer* aDataTransfer, nsIDOMWindow* aSource, \
             const nsACString& aOrigin, ErrorResult& aRv)\n{\n  \
             nsCOMPtr<nsIVariant> data = dont_AddRef(XPCVariant::newVariant(aCx, aData));\n  \
             if (!data) {\n    aRv.Throw(NS_ERROR_FAILURE);\n    return;\n  }\n  \
             nsCOMPtr<nsIDOMDataTransfer> dataTransfer = \
             do_QueryInterface(static_cast<nsIDOMDataTransfer*>(aDataTransfer));\n  \
             aRv = InitDataEvent(aType, aCanBubble, aCancelable, data, dataTransfer, \
             aSource, aOrigin);\n}\n"
        ));
        assert!(text.contains("  NS_IMPL_CYCLE_COLLECTION_UNLINK(mData)\n"));
        assert!(text.contains("  NS_IMPL_CYCLE_COLLECTION_TRAVERSE(mSource)\n"));
        assert!(text.contains("DataEvent::GetData(nsIVariant** aData)\n{\n  NS_IF_ADDREF(*aData = mData);\n"));
        assert!(text.contains(
            "DataEvent::GetData(JSContext* aCx, JS::MutableHandle<JS::Value> aRetval, ErrorResult& aRv)\n"
        ));
        assert!(text.contains("DataEvent::GetOrigin(nsACString& aOrigin)\n{\n  aOrigin = mOrigin;\n"));
        assert!(text.contains("  mOrigin = aOrigin;\n"));
    }

    #[test]
    fn test_scalar_getter_and_factory() {
        let dir = fixtures(&[]);
        let session = open(&dir, config(&["UIEvent"]));
        let text = SourceGenerator::new(&session).generate().expect("Failed to generate");

        assert!(text.contains(
            "NS_IMETHODIMP\nUIEvent::GetDetail(int32_t* aDetail)\n{\n  *aDetail = Detail();\n  return NS_OK;\n}\n"
        ));
        assert!(text.contains("nsresult rv = Event::InitEvent(aType, aCanBubble, aCancelable);\n"));
        assert!(text.contains("  NS_INTERFACE_MAP_ENTRY(nsIDOMUIEvent)\nNS_INTERFACE_MAP_END_INHERITING(Event)\n"));
        assert!(text.contains(
            "nsresult\nNS_NewDOMUIEvent(nsIDOMEvent** aInstance, mozilla::dom::EventTarget* aOwner, \
             nsPresContext* aPresContext = nullptr, mozilla::WidgetEvent* aEvent = nullptr)\n"
        ));
    }

    #[test]
    fn test_script_value_rejected() {
        let dir = fixtures(&[(
            "nsIDOMRawEvent.idl",
            "#include \"nsIDOMEvent.idl\"\n\
             interface nsIDOMRawEvent : nsIDOMEvent { readonly attribute jsval detail; };",
        )]);
        let session = open(&dir, config(&["UIEvent", "RawEvent"]));

        let err = SourceGenerator::new(&session).generate().expect_err("should fail");
        assert!(matches!(err, CodegenError::InvalidDefault { .. }));
    }
}
