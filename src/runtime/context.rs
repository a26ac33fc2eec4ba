//! Per-run execution state.

use rustc_hash::FxHashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::algebra::Diagram;

use super::printer::Sink;
use super::runtime_config::RuntimeConfig;

/// Mutable state owned by one top-level run.
///
/// The anchor table is the only shared mutable structure in the runtime: it
/// is written by `Anchor` boxes and read by `Alias` boxes, always as a
/// single lock-guarded operation (never across an await point), so
/// cooperative interleaving cannot observe a half-applied binding. It is
/// created fresh per run and cleared at every document boundary; nothing is
/// process-global.
pub struct ExecutionContext {
    anchors: Mutex<FxHashMap<String, Arc<Diagram>>>,
    alias_depth: AtomicUsize,
    config: RuntimeConfig,
    sink: Arc<dyn Sink>,
}

impl ExecutionContext {
    pub fn new(config: RuntimeConfig, sink: Arc<dyn Sink>) -> Self {
        Self {
            anchors: Mutex::new(FxHashMap::default()),
            alias_depth: AtomicUsize::new(0),
            config,
            sink,
        }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn sink(&self) -> &Arc<dyn Sink> {
        &self.sink
    }

    /// Bind `name` to a diagram for the rest of the current document.
    ///
    /// Binding happens before the anchored body runs, so the body can
    /// reference its own name (direct recursion). Rebinding replaces.
    pub fn bind(&self, name: &str, diagram: Arc<Diagram>) {
        debug!(anchor = name, "binding");
        self.anchors
            .lock()
            .expect("anchor table poisoned")
            .insert(name.to_string(), diagram);
    }

    /// Look up a live binding; `None` means "referenced before definition".
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<Diagram>> {
        self.anchors
            .lock()
            .expect("anchor table poisoned")
            .get(name)
            .cloned()
    }

    /// Drop every binding. Called at document boundaries of a stream so
    /// anchors never leak from one document into the next.
    pub fn clear_bindings(&self) {
        let mut anchors = self.anchors.lock().expect("anchor table poisoned");
        if !anchors.is_empty() {
            debug!(count = anchors.len(), "clearing anchor bindings at document boundary");
            anchors.clear();
        }
    }

    /// Enter an alias expansion; `None` when the recursion budget is spent.
    ///
    /// The returned guard releases the slot on drop, including across await
    /// points and early returns.
    #[must_use]
    pub fn enter_alias(&self) -> Option<AliasGuard<'_>> {
        let depth = self.alias_depth.fetch_add(1, Ordering::Relaxed);
        if depth >= self.config.recursion_limit {
            self.alias_depth.fetch_sub(1, Ordering::Relaxed);
            return None;
        }
        Some(AliasGuard {
            depth: &self.alias_depth,
        })
    }
}

/// RAII guard for one level of alias expansion.
pub struct AliasGuard<'a> {
    depth: &'a AtomicUsize,
}

impl Drop for AliasGuard<'_> {
    fn drop(&mut self) {
        self.depth.fetch_sub(1, Ordering::Relaxed);
    }
}
