//! Query sets shared by the benchmarks.

/// Single-clause statements of increasing size.
pub fn simple_queries() -> Vec<(&'static str, &'static str)> {
    vec![
        ("select_literal", "SELECT 1"),
        ("select_star", "SELECT * FROM users"),
        ("select_columns", "SELECT id, name, age FROM users"),
        ("select_alias", "SELECT id AS user_id, name n FROM users u"),
        ("select_where_eq", "SELECT * FROM users WHERE id = 1"),
        (
            "select_where_and",
            "SELECT * FROM users WHERE id > 1 AND age < 50",
        ),
        ("select_order_by", "SELECT * FROM users ORDER BY name ASC"),
        ("select_limit", "SELECT * FROM users LIMIT 10"),
    ]
}

/// Statements using joins, grouping and every optional clause.
pub fn complex_queries() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "left_join",
            "SELECT u.name, o.total FROM users u LEFT JOIN orders o ON u.id = o.user_id",
        ),
        (
            "three_way_join",
            "SELECT a.x, b.y, c.z FROM a INNER JOIN b ON a.id = b.a_id \
             RIGHT JOIN c ON b.id = c.b_id WHERE a.x > 10",
        ),
        (
            "group_having",
            "SELECT dept, COUNT(*) AS headcount FROM employees \
             GROUP BY dept HAVING COUNT(*) > 5",
        ),
        (
            "all_clauses",
            "SELECT u.id, SUM(o.amount) AS spent FROM users u \
             LEFT JOIN orders o ON u.id = o.user_id \
             WHERE u.active = 1 OR u.vip IS NOT NULL \
             GROUP BY u.id HAVING SUM(o.amount) > 100 \
             ORDER BY spent DESC LIMIT 20",
        ),
    ]
}

/// Builds `SELECT c0, c1, ... FROM wide WHERE c0 = 0 AND c1 = 1 ...` with
/// `columns` select items and as many conjuncts.
pub fn wide_select(columns: usize) -> String {
    let items: Vec<String> = (0..columns).map(|i| format!("c{i}")).collect();
    let conditions: Vec<String> = (0..columns).map(|i| format!("c{i} = {i}")).collect();

    let mut sql = format!("SELECT {} FROM wide", items.join(", "));
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    sql
}
