use screenflow_eval::{Explanation, Navigator, Position};

use super::{binding, exit_with_nav_error, load_facts, load_index, print_json, Context};
use crate::{OutputFormat, PositionArgs, QueryArgs};

pub(crate) fn cmd_explain(query: &QueryArgs, position: &PositionArgs, ctx: &Context) {
    let index = load_index(&query.flow, ctx.output, ctx.quiet);
    let facts = load_facts(&query.facts, ctx.output, ctx.quiet);
    let nav = Navigator::new(&index, &ctx.config);
    let at = Position::new(position.route.clone(), binding(&position.items));

    match nav.explain(&at, &facts) {
        Ok(explanation) => match ctx.output {
            OutputFormat::Json => print_json(&explanation),
            OutputFormat::Text => print!("{}", render_text(&explanation)),
        },
        Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
    }
}

fn render_text(ex: &Explanation) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", ex.position));
    out.push_str(&format!("  declared at {}\n", ex.site));
    if ex.is_knockout {
        out.push_str("  knockout screen\n");
    }
    if !ex.route_automatically {
        out.push_str("  reached by explicit route only\n");
    }
    if let Some(hub) = &ex.hub_for {
        out.push_str(&format!("  hub for loop '{}'\n", hub));
    }
    if ex.links.is_empty() {
        out.push_str("  no conditions\n");
    }
    for link in &ex.links {
        let mark = if link.result { "pass" } else { "FAIL" };
        out.push_str(&format!("  [{}] {}  ({})\n", mark, link.condition, link.site));
        for fact in &link.facts {
            let state = match (&fact.value, fact.complete) {
                (None, _) => "unanswered".to_string(),
                (Some(v), true) => v.to_string(),
                (Some(v), false) => format!("{} (placeholder)", v),
            };
            out.push_str(&format!("         {} = {}\n", fact.path, state));
        }
    }
    let verdict = if ex.live_knockout {
        "visible, knockout in force"
    } else if ex.visible {
        "visible"
    } else {
        "hidden"
    };
    out.push_str(&format!("  => {}\n", verdict));
    out
}
