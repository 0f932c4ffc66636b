//! Factory prototype header generation.

use crate::session::GenerationSession;

/// Generator for the header declaring one `NS_NewDOM{E}` factory per event.
pub struct HeaderGenerator<'a> {
    session: &'a GenerationSession,
}

impl<'a> HeaderGenerator<'a> {
    /// Creates a new header generator.
    #[must_use]
    pub fn new(session: &'a GenerationSession) -> Self {
        Self { session }
    }

    /// Generates the header text.
    #[must_use]
    pub fn generate(&self) -> String {
        let mut output = String::new();

        output.push_str("#ifndef _gen_mozilla_idl_generated_events_h_\n");
        output.push_str("#define _gen_mozilla_idl_generated_events_h_\n\n");
        output.push_str("/* THIS FILE IS AUTOGENERATED - DO NOT EDIT */\n");
        output.push_str("#include \"nscore.h\"\n");
        output.push_str("class nsIDOMEvent;\n");
        output.push_str("class nsPresContext;\n");
        output.push_str("namespace mozilla {\n");
        output.push_str("class WidgetEvent;\n");
        output.push_str("namespace dom {\n");
        output.push_str("class EventTarget;\n");
        output.push_str("}\n");
        output.push_str("}\n\n");

        for event in self.session.events() {
            output.push_str("nsresult\n");
            output.push_str(&format!(
                "NS_NewDOM{}(nsIDOMEvent** aInstance, \
                 mozilla::dom::EventTarget* aOwner, \
                 nsPresContext* aPresContext, mozilla::WidgetEvent* aEvent);\n",
                event.name
            ));
        }

        output.push_str("\n#endif\n");
        output
    }
}
