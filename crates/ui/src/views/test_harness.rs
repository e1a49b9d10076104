use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dioxus::core::NoOpMutations;
use dioxus::prelude::*;
use exam_core::navigation::Flow;
use exam_core::time::fixed_now;
use services::{AppServices, Clock, ExamSource, LoadError, ServiceOptions};
use storage::Storage;

use crate::context::{AppContext, Frame, UiAction, UiApp, build_app_context};
use crate::views::{ExamShellView, ShellFrame};

pub const TWO_QUESTIONS: &str = r#"{
    "passage": "<p>Answer <em>both</em> questions.</p>",
    "questions": [
        {"q": "H<sub>2</sub>O is?", "options": ["Water", "Salt"], "correct": 0},
        {"q": "2 + 3?", "options": ["4", "5"], "correct": 1, "image": "figs/sum.png"}
    ]
}"#;

/// Exam documents held in memory, keyed by relative path.
#[derive(Default)]
pub struct MemorySource {
    docs: HashMap<String, String>,
}

impl MemorySource {
    pub fn with(mut self, path: &str, body: &str) -> Self {
        self.docs.insert(path.to_string(), body.to_string());
        self
    }
}

#[async_trait]
impl ExamSource for MemorySource {
    async fn exists(&self, path: &str) -> bool {
        self.docs.contains_key(path)
    }

    async fn fetch(&self, path: &str) -> Result<String, LoadError> {
        self.docs.get(path).cloned().ok_or(LoadError::Unavailable {
            key: path.to_string(),
        })
    }

    fn describe(&self) -> String {
        "memory".into()
    }
}

struct TestApp {
    services: AppServices,
    query: String,
}

impl UiApp for TestApp {
    fn services(&self) -> AppServices {
        self.services.clone()
    }

    fn initial_query(&self) -> String {
        self.query.clone()
    }
}

#[derive(Props, Clone)]
struct ShellHarnessProps {
    ctx: AppContext,
}

impl PartialEq for ShellHarnessProps {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

#[component]
fn ShellHarness(props: ShellHarnessProps) -> Element {
    let ctx = props.ctx.clone();
    use_context_provider(|| ctx);
    rsx! { ExamShellView {} }
}

#[component]
fn FrameHarness(frame: Frame) -> Element {
    let on_action = use_callback(|_: UiAction| {});
    rsx! {
        ShellFrame { shell: frame.shell, error: frame.error, on_action }
    }
}

pub struct ViewHarness {
    pub storage: Storage,
    pub ctx: AppContext,
    pub clock: Clock,
}

impl ViewHarness {
    pub fn new(source: MemorySource, flow: Flow, query: &str) -> Self {
        let storage = Storage::in_memory();
        let clock = Clock::manual(fixed_now());
        let options = ServiceOptions {
            flow,
            ..ServiceOptions::default()
        };
        let services = AppServices::from_storage(&storage, Arc::new(source), options, clock.clone());
        let app: Arc<dyn UiApp> = Arc::new(TestApp {
            services,
            query: query.to_string(),
        });
        Self {
            storage,
            ctx: build_app_context(&app),
            clock,
        }
    }

    /// Mount the live shell and let its startup work settle.
    pub async fn mount(&self) -> VirtualDom {
        let mut dom = VirtualDom::new_with_props(
            ShellHarness,
            ShellHarnessProps {
                ctx: self.ctx.clone(),
            },
        );
        dom.rebuild_in_place();
        for _ in 0..4 {
            drive_async(&mut dom).await;
        }
        dom
    }
}

pub async fn drive_async(dom: &mut VirtualDom) {
    let _ = tokio::time::timeout(std::time::Duration::from_millis(50), dom.wait_for_work()).await;
    dom.render_immediate(&mut NoOpMutations);
    dom.process_events();
}

/// Static render of one frame.
pub fn render_frame(frame: Frame) -> String {
    let mut dom = VirtualDom::new_with_props(FrameHarness, FrameHarnessProps { frame });
    dom.rebuild_in_place();
    dioxus_ssr::render(&dom)
}
