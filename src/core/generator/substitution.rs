use super::document::WorkflowJob;
use indexmap::IndexMap;
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid")
    })
}

/// Replace `${NAME}` using the job's own env first, then `global`.
/// Unknown names stay as written; replacements are not rescanned.
pub fn substitute_job(job: &mut WorkflowJob, global: &IndexMap<String, String>) {
    let local = job.env.clone();
    job.visit_strings_mut(&mut |text: &mut String| {
        if let Some(resolved) = substitute(text, &local, global) {
            *text = resolved;
        }
    });
}

/// Returns `None` when `text` contains nothing to replace.
fn substitute(
    text: &str,
    local: &IndexMap<String, String>,
    global: &IndexMap<String, String>,
) -> Option<String> {
    if !text.contains("${") {
        return None;
    }
    let replaced = placeholder_pattern().replace_all(text, |caps: &Captures<'_>| {
        let name = &caps[1];
        local
            .get(name)
            .or_else(|| global.get(name))
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    Some(replaced.into_owned())
}
