use std::path::Path;

use screenflow_core::ScreenIndex;

use super::{load_index, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_compile(flow: &Path, output: OutputFormat, quiet: bool) {
    let index = load_index(flow, output, quiet);
    match output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "fingerprint": index.fingerprint(),
            "index": index,
        })),
        OutputFormat::Text => {
            for line in screen_lines(&index) {
                println!("{}", line);
            }
            if !quiet {
                println!(
                    "{} screens, {} sections, {} collection scopes",
                    index.len(),
                    index.sections().len(),
                    index.scopes().len()
                );
                println!("fingerprint: {}", index.fingerprint());
            }
        }
    }
}

/// One line per screen: route, enclosing collections, flags and
/// conditions.
fn screen_lines(index: &ScreenIndex) -> Vec<String> {
    index
        .entries()
        .iter()
        .map(|entry| {
            let mut line = entry.route.clone();
            let collections: Vec<String> = entry
                .scopes
                .iter()
                .map(|s| index.scope(*s).collection.to_string())
                .collect();
            if !collections.is_empty() {
                line.push_str(&format!("  in {}", collections.join(" > ")));
            }
            if entry.is_knockout {
                line.push_str("  [knockout]");
            }
            if !entry.route_automatically {
                line.push_str("  [manual]");
            }
            if let Some(hub) = &entry.hub_for {
                line.push_str(&format!("  [hub for {}]", hub));
            }
            if !entry.chain.is_empty() {
                let conditions: Vec<String> =
                    entry.chain.iter().map(|l| l.condition.to_string()).collect();
                line.push_str(&format!("  if {}", conditions.join(" && ")));
            }
            line
        })
        .collect()
}
