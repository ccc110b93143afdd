//! Infix renderers for the arithmetic and rule heads.

use redex_core::{string_form, Expression, FormatParams, SymbolTable};

use crate::state::EvalState;

fn precedence(head: &str) -> Option<u8> {
    match head {
        "Rule" | "RuleDelayed" => Some(10),
        "Plus" => Some(30),
        "Times" => Some(40),
        "Power" => Some(50),
        _ => None,
    }
}

fn infix(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable, sep: &str) -> Option<String> {
    let head = e.head_name()?;
    if e.arg_count() < 2 {
        return None;
    }
    let inner = params.inside(head);
    let parts: Vec<String> = e.args().iter().map(|a| string_form(a, &inner, syms)).collect();
    let body = parts.join(sep);
    let outer = params.previous_head.as_deref().and_then(precedence);
    match (outer, precedence(head)) {
        (Some(o), Some(p)) if o >= p => Some(format!("({})", body)),
        _ => Some(body),
    }
}

fn render_plus(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> Option<String> {
    infix(e, params, syms, " + ")
}

fn render_times(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> Option<String> {
    infix(e, params, syms, "*")
}

fn render_power(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> Option<String> {
    if e.arg_count() != 2 {
        return None;
    }
    infix(e, params, syms, "^")
}

fn render_rule(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> Option<String> {
    if e.arg_count() != 2 {
        return None;
    }
    let sep = if e.has_head("RuleDelayed") { " :> " } else { " -> " };
    infix(e, params, syms, sep)
}

fn render_list(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> Option<String> {
    let inner = params.top_level();
    let parts: Vec<String> = e.args().iter().map(|a| string_form(a, &inner, syms)).collect();
    Some(format!("{{{}}}", parts.join(", ")))
}

pub fn register_standard_forms(st: &mut EvalState) {
    st.register_renderer("Plus", render_plus);
    st.register_renderer("Times", render_times);
    st.register_renderer("Power", render_power);
    st.register_renderer("Rule", render_rule);
    st.register_renderer("RuleDelayed", render_rule);
    st.register_renderer("List", render_list);
}
