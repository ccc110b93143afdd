use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::{Ex, Expression};
use crate::symbols::{EmptySymbols, SymbolTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Form {
    #[default]
    InputForm,
    FullForm,
    OutputForm,
    StandardForm,
    TraditionalForm,
    TeXForm,
}

impl Form {
    pub fn from_head(name: &str) -> Option<Form> {
        match name {
            "InputForm" => Some(Form::InputForm),
            "FullForm" => Some(Form::FullForm),
            "OutputForm" => Some(Form::OutputForm),
            "StandardForm" => Some(Form::StandardForm),
            "TraditionalForm" => Some(Form::TraditionalForm),
            "TeXForm" => Some(Form::TeXForm),
            _ => None,
        }
    }
}

/// Rendering context. `previous_head` names the operator the term is being
/// rendered inside (`None` at top level) so infix renderers can decide on
/// parentheses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatParams {
    pub form: Form,
    pub previous_head: Option<String>,
}

impl FormatParams {
    pub fn new(form: Form) -> Self { Self { form, previous_head: None } }

    pub fn inside(&self, head: &str) -> Self {
        Self { form: self.form, previous_head: Some(head.to_string()) }
    }

    pub fn top_level(&self) -> Self { Self { form: self.form, previous_head: None } }
}

pub fn string_form(ex: &Ex, params: &FormatParams, syms: &dyn SymbolTable) -> String {
    match ex {
        Ex::Expr(e) => expression_form(e, params, syms),
        Ex::Symbol(s) => s.name().to_string(),
        Ex::Integer(n) => n.to_string(),
        Ex::Real(f) => format_real(*f),
        Ex::String(s) => {
            if params.form == Form::OutputForm {
                s.to_string()
            } else {
                format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
            }
        }
    }
}

fn format_real(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 { format!("{:.1}", f) } else { f.to_string() }
}

fn expression_form(e: &Expression, params: &FormatParams, syms: &dyn SymbolTable) -> String {
    if let Some(head) = e.head_name() {
        if params.form != Form::FullForm {
            if let Some(render) = syms.renderer(head) {
                if let Some(s) = render(e, params, syms) {
                    return s;
                }
            }
        }
        if let (Some(form), [inner]) = (Form::from_head(head), e.args()) {
            return string_form(inner, &FormatParams::new(form), syms);
        }
    }
    let inner = params.top_level();
    let args: Vec<String> = e.args().iter().map(|a| string_form(a, &inner, syms)).collect();
    format!("{}[{}]", string_form(e.head(), params, syms), args.join(", "))
}

impl fmt::Display for Ex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&string_form(self, &FormatParams::new(Form::FullForm), &EmptySymbols))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&expression_form(self, &FormatParams::new(Form::FullForm), &EmptySymbols))
    }
}
