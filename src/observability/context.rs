//! Thread-local context tracking for crash reports.
//!
//! Records which pipeline stage and which dump file the current thread is
//! working on. Rayon workers carry their own context, so a panic inside a
//! parallel parse still reports the file being read.

use std::cell::RefCell;

thread_local! {
    static CURRENT_CONTEXT: RefCell<GenerationContext> = const { RefCell::new(GenerationContext::new()) };
}

/// Snapshot of what the generator was doing on this thread.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationContext {
    pub stage: Option<String>,
    pub current_file: Option<String>,
}

impl GenerationContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            stage: None,
            current_file: None,
        }
    }
}

/// Restores the previous context on drop.
pub struct ContextGuard {
    previous: GenerationContext,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        let previous = std::mem::take(&mut self.previous);
        CURRENT_CONTEXT.with(|ctx| *ctx.borrow_mut() = previous);
    }
}

fn update(change: impl FnOnce(&mut GenerationContext)) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let previous = ctx.clone();
        change(&mut ctx);
        ContextGuard { previous }
    })
}

#[must_use]
pub fn set_stage(stage: &str) -> ContextGuard {
    update(|ctx| ctx.stage = Some(stage.to_string()))
}

#[must_use]
pub fn set_current_file(file: &str) -> ContextGuard {
    update(|ctx| ctx.current_file = Some(file.to_string()))
}

pub fn get_current_context() -> GenerationContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}
