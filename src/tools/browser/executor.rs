//! Action executor - applies backend commands to the UI tree
//!
//! Each call resolves the command's locator to one node and performs a single
//! manipulation. Every outcome is a boolean plus a log line; nothing is
//! thrown back at the caller.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::core::config::DispatcherConfig;
use crate::core::{Action, CobrowseError, Result, ToolAction};
use crate::dom::{
    Document, EventKind, NodeId, ScrollBehavior, ScrollBlock, SharedDocument, UiEvent, VisualState,
};

/// How long a highlight stays on before the ring is removed.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(2000);

/// Delay between removing the ring and restoring the transition.
pub const TRANSITION_RESTORE_DELAY: Duration = Duration::from_millis(300);

/// Gold ring applied by `highlight`.
pub const HIGHLIGHT_SHADOW: &str = "0 0 0 4px rgba(255, 215, 0, 0.7)";

/// Transition applied while highlighted so the ring fades.
pub const HIGHLIGHT_TRANSITION: &str = "box-shadow 0.3s ease";

/// Client-side router used for `navigate` when available.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

struct PendingHighlight {
    /// Visual state from before the first of any overlapping highlights
    baseline: VisualState,
    generation: u64,
    handle: JoinHandle<()>,
}

type PendingMap = Arc<Mutex<HashMap<NodeId, PendingHighlight>>>;

/// Executes [`ToolAction`]s against a shared document.
pub struct ActionExecutor {
    document: SharedDocument,
    config: DispatcherConfig,
    runtime: Handle,
    highlights: PendingMap,
    generation: AtomicU64,
}

impl ActionExecutor {
    /// Create an executor that schedules deferred effects on the current runtime.
    pub fn new(document: SharedDocument, config: DispatcherConfig) -> Result<Self> {
        let runtime = Handle::try_current().map_err(|_| CobrowseError::NoRuntime)?;
        Ok(Self::with_runtime(document, config, runtime))
    }

    /// Create an executor bound to an explicit runtime.
    pub fn with_runtime(document: SharedDocument, config: DispatcherConfig, runtime: Handle) -> Self {
        Self {
            document,
            config,
            runtime,
            highlights: Arc::new(Mutex::new(HashMap::new())),
            generation: AtomicU64::new(0),
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    /// Number of highlights whose rollback has not finished yet.
    pub fn pending_highlights(&self) -> usize {
        self.highlights.lock().len()
    }

    /// Execute one command. Returns whether it was carried out.
    pub fn execute(&self, command: &ToolAction, navigator: Option<&dyn Navigator>) -> bool {
        info!(action = %command.action, target = %command.target, "Executing tool");

        if command.action == Action::Navigate {
            self.navigate(&command.target, navigator);
            return true;
        }

        let mut doc = self.document.lock();
        let node = match doc.query_selector(&command.target) {
            Ok(Some(node)) => node,
            Ok(None) => {
                warn!(target = %command.target, "Element not found for selector");
                return false;
            }
            Err(e) => {
                warn!(target = %command.target, error = %e, "Invalid selector");
                return false;
            }
        };

        match &command.action {
            Action::Scroll => {
                doc.scroll_into_view(node, ScrollBehavior::Smooth, ScrollBlock::Center);
                true
            }
            Action::Click => {
                doc.dispatch_event(UiEvent {
                    target: node,
                    kind: EventKind::Click,
                    bubbles: true,
                });
                true
            }
            Action::Highlight => {
                self.highlight(&mut doc, node);
                true
            }
            Action::Input => self.input(&mut doc, node, command.value.as_deref()),
            Action::Focus => {
                doc.scroll_into_view(node, ScrollBehavior::Smooth, ScrollBlock::Start);
                doc.focus(node);
                true
            }
            // handled before locating
            Action::Navigate => true,
            Action::Other(name) => {
                warn!(action = %name, "Unknown tool action");
                false
            }
        }
    }

    fn navigate(&self, target: &str, navigator: Option<&dyn Navigator>) {
        match navigator {
            Some(router) => router.navigate(target),
            None => {
                let mut doc = self.document.lock();
                let next = resolve_location(doc.location(), target);
                debug!(from = %doc.location(), to = %next, "Full address change");
                doc.set_location(next);
            }
        }
    }

    fn input(&self, doc: &mut Document, node: NodeId, value: Option<&str>) -> bool {
        let Some(el) = doc.get_mut(node) else {
            return false;
        };
        if !el.is_text_entry() {
            warn!(tag = %el.tag, strict = self.config.strict_input, "Input target cannot hold text");
            return !self.config.strict_input;
        }
        el.value = value.unwrap_or_default().to_string();
        doc.dispatch_event(UiEvent {
            target: node,
            kind: EventKind::Input,
            bubbles: true,
        });
        true
    }

    fn highlight(&self, doc: &mut Document, node: NodeId) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let mut pending = self.highlights.lock();

        let baseline = match pending.remove(&node) {
            Some(previous) => {
                previous.handle.abort();
                debug!(node = node.index(), "Cancelled pending highlight rollback");
                previous.baseline
            }
            None => doc
                .get(node)
                .map(|el| el.visual.clone())
                .unwrap_or_default(),
        };

        if let Some(el) = doc.get_mut(node) {
            el.visual.transition = HIGHLIGHT_TRANSITION.to_string();
            el.visual.box_shadow = HIGHLIGHT_SHADOW.to_string();
        }
        doc.scroll_into_view(node, ScrollBehavior::Smooth, ScrollBlock::Center);

        let handle = self.runtime.spawn(rollback(
            self.document.clone(),
            self.highlights.clone(),
            node,
            generation,
            baseline.clone(),
        ));
        pending.insert(
            node,
            PendingHighlight {
                baseline,
                generation,
                handle,
            },
        );
    }
}

/// Two-stage restore: shadow first, transition shortly after.
async fn rollback(
    document: SharedDocument,
    highlights: PendingMap,
    node: NodeId,
    generation: u64,
    baseline: VisualState,
) {
    tokio::time::sleep(HIGHLIGHT_DURATION).await;
    {
        let mut doc = document.lock();
        let mut pending = highlights.lock();
        if pending.get(&node).map(|p| p.generation) != Some(generation) {
            return;
        }
        match doc.get_mut(node) {
            Some(el) => el.visual.box_shadow = baseline.box_shadow.clone(),
            None => {
                debug!(node = node.index(), "Highlighted node was removed; skipping rollback");
                pending.remove(&node);
                return;
            }
        }
    }

    tokio::time::sleep(TRANSITION_RESTORE_DELAY).await;
    let mut doc = document.lock();
    let mut pending = highlights.lock();
    if pending.get(&node).map(|p| p.generation) != Some(generation) {
        return;
    }
    pending.remove(&node);
    if let Some(el) = doc.get_mut(node) {
        el.visual.transition = baseline.transition;
    }
}

/// Resolve a route against the current address; fall back to the raw target.
fn resolve_location(current: &str, target: &str) -> String {
    Url::parse(current)
        .and_then(|base| base.join(target))
        .map(String::from)
        .unwrap_or_else(|_| target.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::NodeSpec;
    use tokio::sync::broadcast::error::TryRecvError;

    fn fixture() -> SharedDocument {
        Document::from_spec(
            &NodeSpec::new("html").child(
                NodeSpec::new("body")
                    .child(NodeSpec::new("section").id("x").text("Projects"))
                    .child(NodeSpec::new("input").id("field"))
                    .child(NodeSpec::new("div").id("card").text("Card"))
                    .child(NodeSpec::new("button").id("go").text("Go")),
            ),
        )
        .into_shared()
    }

    fn executor(strict_input: bool) -> ActionExecutor {
        ActionExecutor::new(fixture(), DispatcherConfig { strict_input }).unwrap()
    }

    fn node(exec: &ActionExecutor, selector: &str) -> NodeId {
        exec.document().lock().query_selector(selector).unwrap().unwrap()
    }

    fn visual(exec: &ActionExecutor, id: NodeId) -> VisualState {
        exec.document().lock().get(id).unwrap().visual.clone()
    }

    #[derive(Default)]
    struct RecordingRouter {
        routes: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingRouter {
        fn navigate(&self, route: &str) {
            self.routes.lock().push(route.to_string());
        }
    }

    #[test]
    fn test_requires_runtime() {
        let result = ActionExecutor::new(fixture(), DispatcherConfig::default());
        assert!(matches!(result, Err(CobrowseError::NoRuntime)));
    }

    #[tokio::test]
    async fn test_locate_failure_is_terminal() {
        let exec = executor(true);
        let mut rx = exec.document().lock().subscribe();

        assert!(!exec.execute(&ToolAction::new("click", "#does-not-exist"), None));
        assert!(!exec.execute(&ToolAction::new("scroll", "div >> p"), None));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(exec.document().lock().last_scroll(), None);
    }

    #[tokio::test]
    async fn test_unknown_action() {
        let exec = executor(true);
        let mut rx = exec.document().lock().subscribe();
        assert!(!exec.execute(&ToolAction::new("teleport", "#x"), None));
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(exec.document().lock().last_scroll(), None);
    }

    #[tokio::test]
    async fn test_scroll_centers_node() {
        let exec = executor(true);
        assert!(exec.execute(&ToolAction::new("scroll", "#x"), None));
        let scroll = exec.document().lock().last_scroll().unwrap();
        assert_eq!(scroll.target, node(&exec, "#x"));
        assert_eq!(scroll.behavior, ScrollBehavior::Smooth);
        assert_eq!(scroll.block, ScrollBlock::Center);
    }

    #[tokio::test]
    async fn test_click_dispatches_activation() {
        let exec = executor(true);
        let mut rx = exec.document().lock().subscribe();
        assert!(exec.execute(&ToolAction::new("click", "#go"), None));
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Click);
        assert_eq!(event.target, node(&exec, "#go"));
    }

    #[tokio::test]
    async fn test_navigate_prefers_router() {
        let exec = executor(true);
        let router = RecordingRouter::default();
        assert!(exec.execute(&ToolAction::new("navigate", "/projects"), Some(&router)));
        assert_eq!(*router.routes.lock(), vec!["/projects".to_string()]);
        assert_eq!(exec.document().lock().location(), "about:blank");
    }

    #[tokio::test]
    async fn test_navigate_falls_back_to_address_change() {
        let exec = executor(true);
        assert!(exec.execute(&ToolAction::new("navigate", "/projects"), None));
        assert_eq!(exec.document().lock().location(), "/projects");

        exec.document()
            .lock()
            .set_location("https://portfolio.example/about");
        assert!(exec.execute(&ToolAction::new("navigate", "/projects"), None));
        assert_eq!(
            exec.document().lock().location(),
            "https://portfolio.example/projects"
        );
    }

    #[tokio::test]
    async fn test_input_sets_value_and_notifies_once() {
        let exec = executor(true);
        let field = node(&exec, "#field");
        let mut rx = exec.document().lock().subscribe();

        let cmd = ToolAction::new("input", "#field").with_value("abc");
        assert!(exec.execute(&cmd, None));

        assert_eq!(exec.document().lock().get(field).unwrap().value, "abc");
        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, EventKind::Input);
        assert_eq!(event.target, field);
        assert!(event.bubbles);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_input_without_value_writes_empty_string() {
        let exec = executor(true);
        let field = node(&exec, "#field");
        exec.document().lock().get_mut(field).unwrap().value = "old".to_string();

        assert!(exec.execute(&ToolAction::new("input", "#field"), None));
        assert_eq!(exec.document().lock().get(field).unwrap().value, "");
    }

    #[tokio::test]
    async fn test_input_on_non_editable_node_strict() {
        let exec = executor(true);
        let card = node(&exec, "#card");
        let mut rx = exec.document().lock().subscribe();

        let cmd = ToolAction::new("input", "#card").with_value("abc");
        assert!(!exec.execute(&cmd, None));
        assert_eq!(exec.document().lock().get(card).unwrap().value, "");
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_input_on_non_editable_node_legacy() {
        let exec = executor(false);
        let card = node(&exec, "#card");
        let mut rx = exec.document().lock().subscribe();

        let cmd = ToolAction::new("input", "#card").with_value("abc");
        assert!(exec.execute(&cmd, None));
        assert_eq!(exec.document().lock().get(card).unwrap().value, "");
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_focus_scrolls_to_top_and_focuses() {
        let exec = executor(true);
        assert!(exec.execute(&ToolAction::new("focus", "#field"), None));
        let doc = exec.document().lock();
        let field = doc.query_selector("#field").unwrap().unwrap();
        assert_eq!(doc.focused(), Some(field));
        assert_eq!(doc.last_scroll().unwrap().block, ScrollBlock::Start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_rolls_back_in_two_stages() {
        let exec = executor(true);
        let target = node(&exec, "#x");
        exec.document().lock().get_mut(target).unwrap().visual = VisualState {
            box_shadow: "0 0 2px red".to_string(),
            transition: "none".to_string(),
        };
        let baseline = visual(&exec, target);

        assert!(exec.execute(&ToolAction::new("highlight", "#x"), None));
        let lit = visual(&exec, target);
        assert_eq!(lit.box_shadow, HIGHLIGHT_SHADOW);
        assert_eq!(lit.transition, HIGHLIGHT_TRANSITION);
        assert_eq!(
            exec.document().lock().last_scroll().unwrap().block,
            ScrollBlock::Center
        );

        tokio::time::sleep(Duration::from_millis(1999)).await;
        assert_eq!(visual(&exec, target).box_shadow, HIGHLIGHT_SHADOW);

        tokio::time::sleep(Duration::from_millis(2)).await;
        let restored = visual(&exec, target);
        assert_eq!(restored.box_shadow, baseline.box_shadow);
        assert_eq!(restored.transition, HIGHLIGHT_TRANSITION);

        tokio::time::sleep(TRANSITION_RESTORE_DELAY).await;
        assert_eq!(visual(&exec, target), baseline);
        assert_eq!(exec.pending_highlights(), 0);
    }

    #[tokio::test]
    async fn test_highlight_ring_and_transition_share_property() {
        let exec = executor(true);
        let target = node(&exec, "#x");
        assert!(exec.execute(&ToolAction::new("highlight", "#x"), None));

        let lit = visual(&exec, target);
        assert_eq!(lit.box_shadow, "0 0 0 4px rgba(255, 215, 0, 0.7)");
        assert_eq!(lit.transition, "box-shadow 0.3s ease");
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_highlight_cancels_previous_rollback() {
        let exec = executor(true);
        let target = node(&exec, "#x");
        exec.document().lock().get_mut(target).unwrap().visual.box_shadow =
            "0 0 2px red".to_string();
        let baseline = visual(&exec, target);

        assert!(exec.execute(&ToolAction::new("highlight", "#x"), None));
        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(exec.execute(&ToolAction::new("highlight", "#x"), None));
        assert_eq!(exec.pending_highlights(), 1);

        // The first rollback would have fired here.
        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(visual(&exec, target).box_shadow, HIGHLIGHT_SHADOW);

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(visual(&exec, target).box_shadow, baseline.box_shadow);

        tokio::time::sleep(TRANSITION_RESTORE_DELAY).await;
        assert_eq!(visual(&exec, target), baseline);
        assert_eq!(exec.pending_highlights(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_highlight_rollback_skips_removed_node() {
        let exec = executor(true);
        let target = node(&exec, "#x");

        assert!(exec.execute(&ToolAction::new("highlight", "#x"), None));
        exec.document().lock().remove(target).unwrap();

        tokio::time::sleep(HIGHLIGHT_DURATION + TRANSITION_RESTORE_DELAY).await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(exec.pending_highlights(), 0);
        assert!(!exec.document().lock().contains(target));
    }

    #[test]
    fn test_resolve_location() {
        assert_eq!(resolve_location("about:blank", "/projects"), "/projects");
        assert_eq!(
            resolve_location("https://a.dev/blog/post", "../contact"),
            "https://a.dev/contact"
        );
        assert_eq!(
            resolve_location("https://a.dev/", "https://b.dev/x"),
            "https://b.dev/x"
        );
    }
}
