//! Fixture generators

use refminer_core::shared::models::builders::{
    assign, call, declare, expr_stmt, if_then, infix, lit, method_call, ret, var, while_loop,
};
use refminer_core::shared::models::Statement;

/// `step_<i>(arg);` for i in `range`
pub fn fixture_steps(range: std::ops::Range<usize>, arg: &str) -> Vec<Statement> {
    range
        .map(|i| expr_stmt(call(&format!("step_{i}"), vec![var(arg)])))
        .collect()
}

/// Body of `n` distinct statements mixing declarations and calls
pub fn fixture_mixed_body(n: usize) -> Vec<Statement> {
    (0..n)
        .map(|i| {
            if i % 3 == 0 {
                declare("int", &format!("v{i}"), lit(&i.to_string()))
            } else {
                expr_stmt(method_call(var("sink"), &format!("accept{i}"), vec![var(&format!("v{}", i - i % 3))]))
            }
        })
        .collect()
}

/// The same body with every local `v<i>` renamed to `w<i>`
pub fn fixture_mixed_body_renamed(n: usize) -> Vec<Statement> {
    (0..n)
        .map(|i| {
            if i % 3 == 0 {
                declare("int", &format!("w{i}"), lit(&i.to_string()))
            } else {
                expr_stmt(method_call(var("sink"), &format!("accept{i}"), vec![var(&format!("w{}", i - i % 3))]))
            }
        })
        .collect()
}

/// Nested body whose locals are all `<prefix><i>`: call initializers, a
/// loop inside a conditional and a returned call
pub fn fixture_nested_calls(prefix: &str) -> Vec<Statement> {
    let v = |i: usize| format!("{prefix}{i}");
    vec![
        declare("Order", &v(0), call("load", vec![var("id")])),
        if_then(
            method_call(var(&v(0)), "isOpen", vec![]),
            vec![
                declare("int", &v(1), method_call(var(&v(0)), "total", vec![])),
                expr_stmt(call("audit", vec![var(&v(1))])),
                while_loop(
                    infix(var(&v(1)), "!=", lit("0")),
                    vec![
                        declare("int", &v(2), call("pending", vec![var(&v(0))])),
                        expr_stmt(assign(var(&v(1)), infix(var(&v(1)), "-", var(&v(2))))),
                    ],
                ),
            ],
        ),
        ret(call("summarize", vec![var(&v(0))])),
    ]
}
