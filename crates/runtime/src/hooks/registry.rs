//! Hook registry for managing and executing turn hooks.

use std::sync::Arc;

use tracing::{debug, error};

use super::{EnergyHook, HookContext, HookCriticality, HookError, PoisonHook, StatusDecayHook, TurnHook};

/// Registry that runs turn hooks in priority order.
pub struct HookRegistry {
    hooks: Vec<Arc<dyn TurnHook>>,
}

impl HookRegistry {
    /// Creates a registry; hooks are sorted by priority (lower values first).
    ///
    /// The sort is stable, so hooks sharing a priority keep their given order.
    pub fn new(mut hooks: Vec<Arc<dyn TurnHook>>) -> Self {
        hooks.sort_by_key(|h| h.priority());
        Self { hooks }
    }

    /// Creates a registry with the default set of hooks.
    ///
    /// Default hooks include:
    /// - PoisonHook: poison damage (priority -10)
    /// - StatusDecayHook: status and cloud decay (priority 0)
    /// - EnergyHook: energy regain (priority 10)
    pub fn default_hooks() -> Self {
        Self::new(vec![
            Arc::new(PoisonHook) as Arc<dyn TurnHook>,
            Arc::new(StatusDecayHook),
            Arc::new(EnergyHook),
        ])
    }

    /// Adds a hook, keeping priority order.
    pub fn register(&mut self, hook: Arc<dyn TurnHook>) {
        self.hooks.push(hook);
        self.hooks.sort_by_key(|h| h.priority());
    }

    /// Drops the hook with the given name. Returns whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|h| h.name() != name);
        before != self.hooks.len()
    }

    /// Runs every triggered hook in priority order.
    ///
    /// # Errors
    ///
    /// Hook execution errors are handled based on criticality level:
    /// - `Critical`: stops the remaining hooks and returns the error
    /// - `Important`: logs the error and continues (default)
    /// - `Optional`: logs at debug level and continues silently
    pub fn execute_hooks(
        &self,
        ctx: &mut HookContext<'_, '_>,
    ) -> Result<(), (&'static str, HookError)> {
        for hook in &self.hooks {
            if !hook.should_trigger(ctx) {
                continue;
            }
            if let Err(e) = hook.execute(ctx) {
                Self::handle_hook_error(hook.as_ref(), e)?;
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Returns an iterator over hook names and priorities (for debugging).
    pub fn hooks(&self) -> impl Iterator<Item = (&'static str, i32)> + '_ {
        self.hooks.iter().map(|h| (h.name(), h.priority()))
    }

    fn handle_hook_error(
        hook: &dyn TurnHook,
        error: HookError,
    ) -> Result<(), (&'static str, HookError)> {
        match hook.criticality() {
            HookCriticality::Critical => {
                error!(
                    target: "crawl_runtime::hooks",
                    hook = hook.name(),
                    criticality = "critical",
                    %error,
                    "Critical hook failed, aborting turn"
                );
                Err((hook.name(), error))
            }
            HookCriticality::Important => {
                error!(
                    target: "crawl_runtime::hooks",
                    hook = hook.name(),
                    criticality = "important",
                    %error,
                    "Hook failed, continuing"
                );
                Ok(())
            }
            HookCriticality::Optional => {
                debug!(
                    target: "crawl_runtime::hooks",
                    hook = hook.name(),
                    criticality = "optional",
                    %error,
                    "Optional hook failed"
                );
                Ok(())
            }
        }
    }
}

impl Default for HookRegistry {
    fn default() -> Self {
        Self::default_hooks()
    }
}
