use dioxus::prelude::*;

#[component]
pub fn ContactPanel() -> Element {
    rsx! {
        section { class: "page contact",
            h2 { "Contact" }
            p { "Found a typo in a question or a wrong answer key? Let us know which exam and question number and we will fix it." }
            p { "Suggestions for new subjects and past papers are always welcome." }
        }
    }
}
