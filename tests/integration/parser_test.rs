use anyhow::{anyhow, Result};
use typedsql::query::parser::ast::{ComparisonOperator, LiteralValue, WhereExpression};
use typedsql::query::parser::parser::ParseError;
use typedsql::query::parser::{parse, tokenize, Parser, TokenType};
use typedsql::ErrorKind;

#[test]
fn test_simple_select_query() -> Result<()> {
    let sql = "SELECT Name FROM $ WHERE city != 'Seattle'";
    let mut parser = Parser::new(sql).map_err(|e| anyhow!("Tokenize error: {:?}", e))?;

    let query = parser.parse_query().map_err(|e| anyhow!("Parse error: {:?}", e))?;

    assert!(!query.selection.select_all);
    assert_eq!(query.selection.column_identifiers, vec!["Name"]);

    match query.where_clause {
        Some(WhereExpression::Comparison { column, operator, literal }) => {
            assert_eq!(column, "city");
            assert_eq!(operator, ComparisonOperator::NotEqual);
            assert_eq!(literal, LiteralValue::String(Some("Seattle".to_string())));
        }
        other => panic!("Expected comparison in WHERE clause, got {:?}", other),
    }

    Ok(())
}

#[test]
fn test_compound_predicate() -> Result<()> {
    let query = parse("SELECT * FROM $ WHERE isManager = true AND age >= 40")?;
    assert!(query.selection.select_all);

    let expected = WhereExpression::and(
        WhereExpression::comparison("isManager", ComparisonOperator::Equals, LiteralValue::Boolean(true)),
        WhereExpression::comparison("age", ComparisonOperator::GreaterOrEqual, LiteralValue::Integer(40)),
    );
    assert_eq!(query.where_clause, Some(expected));

    Ok(())
}

#[test]
fn test_keywords_are_case_insensitive() -> Result<()> {
    let upper = parse("SELECT Name FROM $ WHERE NOT (a = TRUE OR b = NULL) AND c = 1")?;
    let lower = parse("select Name from $ where not (a = true or b = null) and c = 1")?;
    let mixed = parse("SeLeCt Name FrOm $ WhErE nOt (a = True oR b = Null) AnD c = 1")?;

    assert_eq!(upper, lower);
    assert_eq!(upper, mixed);
    Ok(())
}

#[test]
fn test_deep_nesting() -> Result<()> {
    let depth = 200;
    let sql = format!(
        "SELECT * FROM $ WHERE {}a = 1{}",
        "(".repeat(depth),
        ")".repeat(depth)
    );
    let query = parse(&sql)?;
    assert_eq!(
        query.where_clause,
        Some(WhereExpression::comparison("a", ComparisonOperator::Equals, LiteralValue::Integer(1)))
    );

    let nots = format!("SELECT * FROM $ WHERE {} a = 1", "NOT ".repeat(depth));
    let mut expression = parse(&nots)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;
    let mut count = 0;
    while let WhereExpression::Not(inner) = expression {
        count += 1;
        expression = *inner;
    }
    assert_eq!(count, depth);
    Ok(())
}

#[test]
fn test_string_escapes_and_separators() -> Result<()> {
    let query = parse("SELECT Name, City; FROM $ WHERE name = 'O''Brien, Jr.'")?;
    assert_eq!(query.selection.column_identifiers, vec!["Name", "City"]);
    assert_eq!(
        query.where_clause,
        Some(WhereExpression::comparison(
            "name",
            ComparisonOperator::Equals,
            LiteralValue::String(Some("O'Brien, Jr.".to_string()))
        ))
    );
    Ok(())
}

#[test]
fn test_tokenizer_operators() -> Result<()> {
    let tokens = tokenize("a>=1 b<=2 c!=3 d>4 e<5 f=6")?;
    let symbols: Vec<&str> = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Symbol)
        .map(|t| t.literal.as_str())
        .collect();
    assert_eq!(symbols, vec![">=", "<=", "!=", ">", "<", "="]);
    Ok(())
}

#[test]
fn test_error_kinds() {
    let deep_not = format!("SELECT * FROM $ WHERE {}age = 1", "NOT ".repeat(600));
    let cases: [(&str, ErrorKind); 12] = [
        ("SELECT * FROM $ WHERE city = 'Seattle", ErrorKind::Syntax),
        ("SELECT * FROM $ WHERE (age = 1", ErrorKind::Syntax),
        ("SELECT * FROM $ WHERE age =", ErrorKind::Syntax),
        ("SELECT * FROM $ WHERE age ~ 1", ErrorKind::Syntax),
        ("SELECT * FROM $ extra", ErrorKind::Syntax),
        ("SELECT * WHERE age = 1", ErrorKind::Syntax),
        ("SELECT * FROM people", ErrorKind::Semantic),
        ("SELECT Name, (City) FROM $", ErrorKind::Semantic),
        ("SELECT * name FROM $", ErrorKind::Semantic),
        ("SELECT FROM $", ErrorKind::Arity),
        ("SELECT * FROM $ WHERE age = forty", ErrorKind::Literal),
        (&deep_not, ErrorKind::Syntax),
    ];

    for (sql, kind) in cases {
        match parse(sql) {
            Ok(query) => panic!("Expected {} for `{}`, parsed {:?}", kind, sql, query),
            Err(err) => assert_eq!(err.kind(), kind, "`{}`: {}", sql, err),
        }
    }
}

#[test]
fn test_errors_name_the_offending_token() {
    let err = parse("SELECT * FROM $ WHERE age LIKE 3").unwrap_err();
    assert!(matches!(err, ParseError::UnknownOperator(_)));
    assert!(err.to_string().contains("'LIKE'"), "{}", err);

    let err = parse("SELECT * FROM $ ORDER BY age").unwrap_err();
    assert!(err.to_string().contains("'ORDER'"), "{}", err);

    let err = parse("SELECT * FROM $ WHERE (age = 1").unwrap_err();
    assert_eq!(err, ParseError::UnclosedParenthesis(22));
}

#[test]
fn test_render_round_trip() -> Result<()> {
    let queries = [
        "SELECT * FROM $ WHERE a = 1",
        "SELECT * FROM $ WHERE NOT NOT city = 'Seattle'",
        "SELECT * FROM $ WHERE NOT (city = 'Boston' OR city = 'Helsinki')",
        "SELECT * FROM $ WHERE a = 1 OR b = 2 AND NOT c = 'x''y' OR d != null",
        "SELECT * FROM $ WHERE (a = 1 OR b = 2) AND (c > 2.5 OR d <= -7)",
    ];

    for sql in queries {
        let original = parse(sql)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;
        let rendered = format!("SELECT * FROM $ WHERE {}", original);
        let reparsed = parse(&rendered)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;
        assert_eq!(reparsed, original, "`{}` rendered as `{}`", sql, rendered);
    }

    Ok(())
}
