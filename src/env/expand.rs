//! `${NAME}` placeholder expansion

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder regex is valid"))
}

/// Expand every `${NAME}` in `arg` found in `table`
///
/// Unknown names are left as written.
pub fn expand_arg(arg: &str, table: &HashMap<String, String>) -> String {
    placeholder()
        .replace_all(arg, |caps: &Captures| match table.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// Expand placeholders in every argument
pub fn expand_args(args: &[String], table: &HashMap<String, String>) -> Vec<String> {
    args.iter().map(|arg| expand_arg(arg, table)).collect()
}
