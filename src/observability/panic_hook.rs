//! Panic hook that prints a crash report naming the stage and file in
//! progress when the generator died.

use super::context::{get_current_context, GenerationContext};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE: &str = "================================================================================";

pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("{}", crash_report(info, &get_current_context()));
    }));
}

fn crash_report(info: &PanicHookInfo<'_>, context: &GenerationContext) -> String {
    let mut lines = vec![
        RULE.to_string(),
        format!("e2e-summary {VERSION} crashed"),
        format!("  panic: {}", panic_message(info)),
    ];
    if let Some(location) = info.location() {
        lines.push(format!(
            "  location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ));
    }
    lines.extend(context_lines(context));
    if std::env::var("RUST_BACKTRACE").is_ok() {
        lines.push(std::backtrace::Backtrace::capture().to_string());
    } else {
        lines.push("  run with RUST_BACKTRACE=1 for a stack trace".to_string());
    }
    lines.push(RULE.to_string());
    lines.join("\n")
}

fn context_lines(context: &GenerationContext) -> Vec<String> {
    let stage = context
        .stage
        .as_deref()
        .unwrap_or("(none, crash happened outside the pipeline)");
    let mut lines = vec![format!("  stage: {stage}")];
    if let Some(file) = &context.current_file {
        lines.push(format!("  file: {file}"));
    }
    lines
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
