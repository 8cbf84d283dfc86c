use screenflow_core::ItemBinding;
use screenflow_eval::{ActiveAssertion, MemoryFactGraph, NavError, Navigator};

use super::{binding, exit_with_nav_error, load_facts, load_index, print_json, Context};
use crate::{OutputFormat, QueryArgs};

pub(crate) fn cmd_section(query: &QueryArgs, section: &str, items: &[String], ctx: &Context) {
    let index = load_index(&query.flow, ctx.output, ctx.quiet);
    let facts = load_facts(&query.facts, ctx.output, ctx.quiet);
    let nav = Navigator::new(&index, &ctx.config);
    let items = binding(items);

    let (complete, displayed, assertions) = match section_report(&nav, section, &facts, &items) {
        Ok(r) => r,
        Err(e) => exit_with_nav_error(&e, ctx.output, ctx.quiet),
    };

    match ctx.output {
        OutputFormat::Json => print_json(&serde_json::json!({
            "section": section,
            "items": items,
            "complete": complete,
            "displayed": displayed,
            "assertions": assertions,
        })),
        OutputFormat::Text => {
            println!("section:   {}", section);
            println!("complete:  {}", yes_no(complete));
            println!("displayed: {}", yes_no(displayed));
            for a in &assertions {
                println!("{}", assertion_line(a));
            }
        }
    }
}

fn section_report(
    nav: &Navigator<'_>,
    section: &str,
    facts: &MemoryFactGraph,
    items: &ItemBinding,
) -> Result<(bool, bool, Vec<ActiveAssertion>), NavError> {
    Ok((
        nav.section_complete(section, facts, items)?,
        nav.section_displayed(section, facts, items)?,
        nav.assertions(section, facts, items)?,
    ))
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn assertion_line(a: &ActiveAssertion) -> String {
    let kind = serde_json::to_value(&a.kind)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();
    match &a.edit_route {
        Some(route) => format!("assert:    {} {} (edit {})", kind, a.i18n_key, route),
        None => format!("assert:    {} {}", kind, a.i18n_key),
    }
}
