use screenflow_eval::{Navigator, WalkEnd};

use super::{exit_with_nav_error, load_facts, load_index, print_json, Context};
use crate::{OutputFormat, QueryArgs};

pub(crate) fn cmd_walk(query: &QueryArgs, ctx: &Context) {
    let index = load_index(&query.flow, ctx.output, ctx.quiet);
    let facts = load_facts(&query.facts, ctx.output, ctx.quiet);
    let nav = Navigator::new(&index, &ctx.config);

    let walk = match nav.walk(&facts) {
        Ok(walk) => walk,
        Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
    };

    match ctx.output {
        OutputFormat::Json => print_json(&walk),
        OutputFormat::Text => {
            for step in &walk.steps {
                if step.terminal {
                    println!("{} (knockout)", step.position);
                } else {
                    println!("{}", step.position);
                }
            }
            if !ctx.quiet {
                let why = match walk.end {
                    WalkEnd::End => "end of flow",
                    WalkEnd::Knockout => "knocked out",
                    WalkEnd::Revisit => "returns to an earlier screen",
                };
                println!("-- {} screens, {}", walk.steps.len(), why);
            }
        }
    }
}
