use crate::expr::{Ex, Expression};

fn embedded_condition(e: &Ex) -> Option<&Expression> {
    e.as_call("ConditionalExpression").filter(|c| c.arg_count() == 2)
}

impl Expression {
    /// Hoists `ConditionalExpression[value, cond]` arguments to the top:
    /// `f[ConditionalExpression[x, c], y]` becomes
    /// `ConditionalExpression[f[x, y], And[c]]`, conditions joined in
    /// argument order. `None` when no argument carries a condition.
    pub fn propagate_conditionals(&self) -> Option<Ex> {
        if !self.args().iter().any(|a| embedded_condition(a).is_some()) {
            return None;
        }
        let mut values = Vec::with_capacity(self.arg_count());
        let mut conditions = Vec::new();
        for a in self.args() {
            match embedded_condition(a) {
                Some(c) => {
                    values.push(c.args()[0].deep_copy());
                    conditions.push(c.args()[1].deep_copy());
                }
                None => values.push(a.deep_copy()),
            }
        }
        let value = Ex::expr(self.head().deep_copy(), values);
        Some(Ex::call("ConditionalExpression", vec![value, Ex::call("And", conditions)]))
    }
}
