//! Statement compilation across the builder surface.

use oxide_query::builder::{
    call, col, count_all, rowid, Expressible, Expression, JoinKind, OnConflict, SqlValue, Table,
};

fn placeholders(sql: &str) -> usize {
    sql.matches('?').count()
}

fn assert_balanced(statement: &dyn Expressible) {
    let (sql, params) = statement.build();
    assert_eq!(
        placeholders(&sql),
        params.len(),
        "placeholder/binding mismatch in {sql}"
    );
}

#[test]
fn test_select_filter_compiles_with_one_binding() {
    let t = Table::new("t");
    let col_a = col::<i64>("colA");
    let col_b = col::<String>("colB");

    let query = t.select(&[&col_a, &col_b]).filter(col_a.eq(1));
    let (sql, params) = query.build();

    assert_eq!(sql, "SELECT \"colA\", \"colB\" FROM \"t\" WHERE (\"colA\" = ?)");
    assert_eq!(params, vec![SqlValue::Int(1)]);
    assert_eq!(
        query.as_sql(),
        "SELECT \"colA\", \"colB\" FROM \"t\" WHERE (\"colA\" = 1)"
    );
}

#[test]
fn test_optional_comparison_to_none_is_null_test() {
    let users = Table::new("users");
    let name = col::<Option<String>>("name");

    let (sql, params) = users.filter(name.eq(None::<String>)).build();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE (\"name\" IS NULL)");
    assert!(params.is_empty());

    let (sql, params) = users.filter(name.not_eq(None::<String>)).build();
    assert_eq!(sql, "SELECT * FROM \"users\" WHERE (\"name\" IS NOT NULL)");
    assert!(params.is_empty());
}

#[test]
fn test_limit_without_offset_clears_offset() {
    let users = Table::new("users");
    let query = users.limit_offset(10, 5).limit(20);
    assert_eq!(query.build().0, "SELECT * FROM \"users\" LIMIT 20");
}

#[test]
fn test_union_keeps_each_filter() {
    let users = Table::new("users");
    let email = col::<String>("email");

    let query = users
        .filter(email.eq("alice@example.com"))
        .union(&users.filter(email.eq("sally@example.com")));
    let (sql, params) = query.build();

    assert_eq!(
        sql,
        "SELECT * FROM \"users\" WHERE (\"email\" = ?) UNION SELECT * FROM \"users\" WHERE (\"email\" = ?)"
    );
    assert_eq!(
        params,
        vec![
            SqlValue::Text(String::from("alice@example.com")),
            SqlValue::Text(String::from("sally@example.com"))
        ]
    );
}

#[test]
fn test_clause_order_is_fixed() {
    let users = Table::new("users");
    let posts = Table::new("posts");
    let id = col::<i64>("id");
    let user_id = col::<i64>("user_id");
    let age = col::<Option<i64>>("age");

    // Built out of order on purpose.
    let query = users
        .limit_offset(5, 10)
        .order(&[&age.desc()])
        .union(&Table::new("admins"))
        .group_having(&[&age], count_all().gt(1))
        .filter(age.gt(18))
        .join(&posts, posts.namespace(&user_id).eq(&users.namespace(&id)))
        .select(&[&age, &count_all()]);

    assert_eq!(
        query.as_sql(),
        "SELECT \"age\", count(*) FROM \"users\" \
         INNER JOIN \"posts\" ON (\"posts\".\"user_id\" = \"users\".\"id\") \
         WHERE (\"age\" > 18) \
         GROUP BY \"age\" HAVING (count(*) > 1) \
         UNION SELECT * FROM \"admins\" \
         ORDER BY \"age\" DESC \
         LIMIT 5 OFFSET 10"
    );
    assert_balanced(&query);
}

#[test]
fn test_bindings_follow_clause_order() {
    let users = Table::new("users");
    let posts = Table::new("posts").filter(col::<bool>("published").eq(true));
    let id = col::<i64>("id");
    let user_id = col::<i64>("user_id");

    let query = users
        .filter(id.gt(100))
        .join_with(
            JoinKind::LeftOuter,
            &posts,
            posts.namespace(&user_id).eq(&users.namespace(&id)),
        )
        .select(&[&(&id * 2)]);

    let (_, params) = query.build();
    assert_eq!(
        params,
        vec![SqlValue::Int(2), SqlValue::Int(1), SqlValue::Int(100)]
    );
}

#[test]
fn test_operators_compose_and_stay_balanced() {
    let n = col::<i64>("n");
    let price = col::<Option<f64>>("price");
    let tags = col::<String>("tags");
    let flag = col::<bool>("flag");

    let statements: Vec<Expression<bool>> = vec![
        (&n + 1).gt(&n - 1),
        (n.clone() ^ 3).eq(0),
        n.in_range(1..10).and(flag.clone()),
        (!flag).or(n.in_list([1, 2, 3])),
        tags.concat("x").like("%x"),
        n.between(0, 9).and(n.not_eq(4)),
    ];
    for statement in &statements {
        assert_balanced(statement);
    }

    let optional = price.gt(1.5).and(price.lt_eq(9.0));
    assert_eq!(optional.template(), "((\"price\" > ?) AND (\"price\" <= ?))");
    assert_balanced(&optional);
}

#[test]
fn test_aggregates_cast_and_calls() {
    let users = Table::new("users");
    let age = col::<i64>("age");
    let name = col::<String>("name");

    let query = users.select(&[
        &age.max(),
        &age.average(),
        &name.distinct().count(),
        &age.cast::<String>(),
        &call::<String>("initials", &[&name]),
        &rowid(),
    ]);
    assert_eq!(
        query.build().0,
        "SELECT max(\"age\"), avg(\"age\"), count(DISTINCT \"name\"), CAST(\"age\" AS TEXT), \
         \"initials\"(\"name\"), ROWID FROM \"users\""
    );
}

#[test]
fn test_write_statements() {
    let users = Table::new("users");
    let id = col::<i64>("id");
    let email = col::<String>("email");
    let name = col::<Option<String>>("name");

    let insert = users.insert_or(
        OnConflict::Ignore,
        &[email.set("alice@example.com"), name.set(None::<String>)],
    );
    assert_eq!(
        insert.build().0,
        "INSERT OR IGNORE INTO \"users\" (\"email\", \"name\") VALUES (?, NULL)"
    );
    assert_balanced(&insert);

    let update = users.filter(id.eq(1)).update(&[name.set("Alice")]);
    assert_eq!(
        update.build().0,
        "UPDATE \"users\" SET \"name\" = ? WHERE (\"id\" = ?)"
    );
    assert_balanced(&update);

    let delete = users.filter(email.like("%@spam.test")).delete();
    assert_eq!(
        delete.build().0,
        "DELETE FROM \"users\" WHERE (\"email\" LIKE ?)"
    );
    assert_balanced(&delete);

    let exists = users.filter(id.eq(1)).exists();
    assert_eq!(
        exists.build().0,
        "SELECT EXISTS(SELECT * FROM \"users\" WHERE (\"id\" = ?))"
    );
}

#[test]
fn test_text_literals_are_escaped_when_inlined() {
    let users = Table::new("users");
    let name = col::<String>("name");
    let query = users.filter(name.eq("O'Brien"));
    assert_eq!(
        query.as_sql(),
        "SELECT * FROM \"users\" WHERE (\"name\" = 'O''Brien')"
    );
}

#[test]
fn test_quoted_identifiers_double_quotes() {
    let weird = Table::new("my \"table\"");
    let column = col::<i64>("a\"b");
    assert_eq!(
        weird.select(&[&column]).build().0,
        "SELECT \"a\"\"b\" FROM \"my \"\"table\"\"\""
    );
}
