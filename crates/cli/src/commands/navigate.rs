use screenflow_eval::{BackOutcome, NavOutcome, Navigator, Position};

use super::{binding, exit_with_nav_error, load_facts, load_index, print_json, Context};
use crate::{OutputFormat, PositionArgs, QueryArgs};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Next,
    Previous,
}

pub(crate) fn cmd_navigate(
    query: &QueryArgs,
    position: &PositionArgs,
    direction: Direction,
    ctx: &Context,
) {
    let index = load_index(&query.flow, ctx.output, ctx.quiet);
    let facts = load_facts(&query.facts, ctx.output, ctx.quiet);
    let nav = Navigator::new(&index, &ctx.config);
    let at = Position::new(position.route.clone(), binding(&position.items));

    match direction {
        Direction::Next => match nav.next(&at, &facts) {
            Ok(outcome) => match ctx.output {
                OutputFormat::Json => print_json(&outcome),
                OutputFormat::Text => println!("{}", next_line(&outcome)),
            },
            Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
        },
        Direction::Previous => match nav.previous(&at, &facts) {
            Ok(outcome) => match ctx.output {
                OutputFormat::Json => print_json(&outcome),
                OutputFormat::Text => println!("{}", previous_line(&outcome)),
            },
            Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
        },
    }
}

pub(crate) fn next_line(outcome: &NavOutcome) -> String {
    match outcome {
        NavOutcome::Screen(dest) if dest.terminal => format!("{} (knockout)", dest.position),
        NavOutcome::Screen(dest) => dest.position.to_string(),
        NavOutcome::End => "end".to_string(),
    }
}

fn previous_line(outcome: &BackOutcome) -> String {
    match outcome {
        BackOutcome::Screen(position) => position.to_string(),
        BackOutcome::Start => "start".to_string(),
    }
}
