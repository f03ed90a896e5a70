//! Crash reporting and log setup.
//!
//! ```ignore
//! use e2e_summary::observability::{init_tracing, install_panic_hook};
//!
//! fn main() -> anyhow::Result<()> {
//!     install_panic_hook();
//!     init_tracing(1)?;
//!     // ...
//! }
//! ```

pub mod context;
pub mod panic_hook;
pub mod tracing;

pub use context::{get_current_context, set_current_file, set_stage, ContextGuard, GenerationContext};
pub use panic_hook::install_panic_hook;
pub use self::tracing::{default_filter, init_tracing};
