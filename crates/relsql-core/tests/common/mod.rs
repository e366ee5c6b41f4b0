#![allow(dead_code)]

use relsql_core::{Dialect, GenericDialect, Layout, Node, SqlValue};

pub fn render(node: &mut dyn Node, layout: Layout) -> (String, Vec<SqlValue>) {
    render_in(node, &GenericDialect::new(), layout)
}

pub fn render_in(
    node: &mut dyn Node,
    dialect: &dyn Dialect,
    layout: Layout,
) -> (String, Vec<SqlValue>) {
    node.generate(dialect, layout)
        .unwrap_or_else(|e| panic!("Failed to generate {node:?}\nError: {e}"));
    (node.sql().to_string(), node.args().to_vec())
}

pub fn texts(values: &[&str]) -> Vec<SqlValue> {
    values.iter().map(|v| SqlValue::from(*v)).collect()
}

/// Checks that the number of placeholders matches the number of args.
pub fn assert_balanced(sql: &str, args: &[SqlValue], placeholder: &str) {
    assert_eq!(
        sql.matches(placeholder).count(),
        args.len(),
        "Placeholder count mismatch.\n  SQL:  {sql}\n  Args: {args:?}"
    );
}

/// Checks that rendering at `count` equals rendering at zero with every line
/// after the first shifted right by `indent * count` pads.
pub fn assert_shifted(node: &mut dyn Node, indent: usize, count: usize) {
    let (base, base_args) = render(node, Layout::indented(indent));
    let (shifted, shifted_args) = render(node, Layout::indented(indent).at(count));
    let pad = " ".repeat(indent * count);
    let expected: Vec<String> = base
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                line.to_string()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect();
    assert_eq!(shifted, expected.join("\n"));
    assert_eq!(base_args, shifted_args);
}
