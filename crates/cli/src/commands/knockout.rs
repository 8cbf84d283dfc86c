use screenflow_eval::{Navigator, Position};

use super::{binding, exit_with_nav_error, load_facts, load_index, print_json, Context};
use crate::{OutputFormat, QueryArgs};

pub(crate) fn cmd_knockout(
    query: &QueryArgs,
    reached: Option<&str>,
    items: &[String],
    ctx: &Context,
) {
    let index = load_index(&query.flow, ctx.output, ctx.quiet);
    let facts = load_facts(&query.facts, ctx.output, ctx.quiet);
    let nav = Navigator::new(&index, &ctx.config);
    let reached = reached.map(|route| Position::new(route, binding(items)));

    let knocked_out = match nav.is_knocked_out(&facts, reached.as_ref()) {
        Ok(k) => k,
        Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
    };

    match ctx.output {
        OutputFormat::Json => print_json(&serde_json::json!({ "knockedOut": knocked_out })),
        OutputFormat::Text => {
            if knocked_out {
                println!("knocked out");
            } else {
                println!("not knocked out");
            }
        }
    }
}
