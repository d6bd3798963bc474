use anyhow::Result;
use typedsql::demo::{self, Person};
use typedsql::query::parser::MAX_NESTING_DEPTH;
use typedsql::{compile, CompiledQuery, EngineConfig, ErrorKind, QueryEngine, Shape};

#[path = "../common/mod.rs"]
mod common;

fn engine() -> QueryEngine {
    QueryEngine::with_registry(common::registry(), EngineConfig::default())
}

#[test]
fn test_scenario_city_filter() -> Result<()> {
    let names: Vec<String> = engine().execute("SELECT Name FROM $ WHERE city != 'Seattle'", &common::scenario_rows())?;
    assert_eq!(names, vec!["Barbara", "Charles"]);
    Ok(())
}

#[test]
fn test_scenario_select_all() -> Result<()> {
    let rows = common::scenario_rows();
    let managers: Vec<Person> = engine().execute("SELECT * FROM $ WHERE isManager = true AND age >= 40", &rows)?;
    assert_eq!(managers, vec![rows[2].clone()]);
    Ok(())
}

#[test]
fn test_scenario_double_negation() -> Result<()> {
    let names: Vec<String> = engine().execute("SELECT Name FROM $ WHERE NOT NOT city = 'Seattle'", &common::scenario_rows())?;
    assert_eq!(names, vec!["Ada"]);
    Ok(())
}

#[test]
fn test_scenario_negated_disjunction() -> Result<()> {
    let names: Vec<String> = engine().execute(
        "SELECT Name FROM $ WHERE NOT (city = 'Boston' OR city = 'Helsinki')",
        &common::scenario_rows(),
    )?;
    assert_eq!(names, vec!["Ada"]);
    Ok(())
}

#[test]
fn test_scenario_empty_result() -> Result<()> {
    let query = engine().compile::<Person, (String, String)>("SELECT Name, City FROM $ WHERE age > 100")?;
    assert_eq!(query.public_shape(), &Shape::Tuple(vec![Shape::Text, Shape::Text]));

    let rows = query.execute(&common::scenario_rows())?;
    assert!(rows.is_empty());
    Ok(())
}

#[test]
fn test_demo_queries() -> Result<()> {
    let registry = demo::registry();
    let rows = demo::people();
    let sql = |i: usize| demo::DEMO_QUERIES[i].1;

    let names = compile::<Person, String>(&registry, sql(0))?.execute(&rows)?;
    assert_eq!(names, vec!["Barbara", "Charles", "David"]);

    let people = compile::<Person, Person>(&registry, sql(1))?.execute(&rows)?;
    assert_eq!(common::names(&people), vec!["Ada"]);

    let names = compile::<Person, String>(&registry, sql(2))?.execute(&rows)?;
    assert_eq!(names, vec!["Ada", "David"]);

    let names = compile::<Person, String>(&registry, sql(3))?.execute(&rows)?;
    assert_eq!(names, vec!["Charles"]);

    let tuples = compile::<Person, (String, String, String, Option<String>, String)>(&registry, sql(4))?.execute(&rows)?;
    let tuple_names: Vec<&str> = tuples.iter().map(|t| t.0.as_str()).collect();
    assert_eq!(tuple_names, vec!["Charles", "David"]);

    let names = compile::<Person, String>(&registry, sql(5))?.execute(&rows)?;
    assert_eq!(names, vec!["Ada", "Barbara", "David", "Eve"]);

    // Eve has no team; NULL compares unequal to both strings
    let names = compile::<Person, String>(&registry, sql(6))?.execute(&rows)?;
    assert_eq!(names, vec!["Barbara", "Eve"]);

    let people = compile::<Person, Person>(&registry, sql(7))?.execute(&rows)?;
    assert_eq!(common::names(&people), vec!["Ada"]);

    Ok(())
}

#[test]
fn test_null_handling() -> Result<()> {
    let rows = demo::people();
    let engine = engine();

    let teams: Vec<Option<String>> = engine.execute("SELECT team FROM $ WHERE team != null", &rows)?;
    assert_eq!(teams.len(), 4);
    assert!(teams.iter().all(Option::is_some));

    let missing: Vec<String> = engine.execute("SELECT Name FROM $ WHERE team = null", &rows)?;
    assert_eq!(missing, vec!["Eve"]);

    // NULL is never folded into an empty string
    let err = engine.compile::<Person, String>("SELECT team FROM $").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    let all_teams: Vec<Option<String>> = engine.execute("SELECT team FROM $", &rows)?;
    assert_eq!(all_teams.iter().filter(|t| t.is_none()).count(), 1);

    // Ordinal comparison is case-sensitive
    let exact: Vec<i32> = engine.execute("SELECT id FROM $ WHERE city = 'seattle'", &rows)?;
    assert!(exact.is_empty());
    Ok(())
}

#[test]
fn test_mixed_result_types() -> Result<()> {
    let rows = demo::people();
    let engine = engine();

    let salaries: Vec<f32> = engine.execute("SELECT salary FROM $ WHERE salary > 200000.0", &rows)?;
    assert_eq!(salaries, vec![210_000.0, 220_000.0]);

    let flags: Vec<(i32, bool)> = engine.execute("SELECT id, isManager FROM $ WHERE country = 'US'", &rows)?;
    assert_eq!(flags, vec![(1, true), (2, false), (4, false), (5, true)]);
    Ok(())
}

#[test]
fn test_nine_column_tuple() -> Result<()> {
    type Nine = (i32, String, i32, String, f32, String, bool, (i32, String));

    let rows = demo::people();
    let query: CompiledQuery<Person, Nine> = engine().compile(
        "SELECT id, name, age, city, salary, department, isManager, yearsAtCompany, country FROM $ WHERE age < 35",
    )?;
    let result = query.execute(&rows)?;

    assert_eq!(result.len(), 3);
    let (id, name, age, city, salary, department, manager, (years, country)) = &result[2];
    assert_eq!((*id, name.as_str(), *age, city.as_str()), (4, "David", 31, "Palo Alto"));
    assert_eq!((*salary, department.as_str(), *manager), (195_000.0, "Product", false));
    assert_eq!((*years, country.as_str()), (4, "US"));
    Ok(())
}

#[test]
fn test_execute_is_repeatable_and_order_preserving() -> Result<()> {
    let rows = demo::people();
    let query = engine().compile::<Person, i32>("SELECT id FROM $ WHERE age > 30")?;

    let first = query.execute(&rows)?;
    let second = query.execute(&rows)?;
    assert_eq!(first, second);
    assert_eq!(first, vec![1, 3, 4, 5]);

    let reversed: Vec<Person> = rows.iter().rev().cloned().collect();
    assert_eq!(query.execute(&reversed)?, vec![5, 4, 3, 1]);
    Ok(())
}

#[test]
fn test_concurrent_execution() -> Result<()> {
    let rows = demo::people();
    let query = engine().compile::<Person, (String, i32)>("SELECT name, age FROM $ WHERE isManager = true")?;
    let expected = query.execute(&rows)?;

    crossbeam::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|_| {
                    (0..100).all(|_| query.execute(&rows).map(|r| r == expected).unwrap_or(false))
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    })
    .unwrap();

    Ok(())
}

#[test]
fn test_compile_errors() {
    let engine = engine();
    let cases: [(&str, ErrorKind); 6] = [
        ("SELECT Name FROM $ WHERE city = 'Seattle", ErrorKind::Syntax),
        ("SELECT Name FROM people", ErrorKind::Semantic),
        ("SELECT Nickname FROM $", ErrorKind::UnknownColumn),
        ("SELECT Name FROM $ WHERE age = 'old'", ErrorKind::TypeMismatch),
        ("SELECT Name FROM $ WHERE age = 34.5", ErrorKind::TypeMismatch),
        ("SELECT Name FROM $ WHERE isManager = null", ErrorKind::TypeMismatch),
    ];

    for (sql, kind) in cases {
        let err = engine.compile::<Person, String>(sql).err();
        assert_eq!(err.map(|e| e.kind()), Some(kind), "`{}`", sql);
    }

    let err = engine.compile::<Person, i32>("SELECT Name FROM $").err().unwrap();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
    assert_eq!(err.to_string(), "Query produces String but i32 was requested");
}

#[test]
fn test_deeply_nested_predicates() -> Result<()> {
    let engine = engine();
    let rows = common::scenario_rows();
    let nots = |n: usize| format!("SELECT * FROM $ WHERE {}age = 34", "NOT ".repeat(n));

    // An even number of negations at the limit still compiles and runs
    let deepest = MAX_NESTING_DEPTH - 1;
    let even = if deepest % 2 == 0 { deepest } else { deepest - 1 };
    let matched: Vec<Person> = engine.execute(&nots(even), &rows)?;
    assert_eq!(common::names(&matched), vec!["Ada"]);

    for depth in [MAX_NESTING_DEPTH, 600, 5_000] {
        let err = engine.compile::<Person, Person>(&nots(depth)).err();
        assert_eq!(err.map(|e| e.kind()), Some(ErrorKind::Syntax), "{} negations", depth);
    }

    let chain = format!("SELECT * FROM $ WHERE age = 34{}", " OR age = 34".repeat(2 * MAX_NESTING_DEPTH));
    assert_eq!(engine.compile::<Person, Person>(&chain).err().map(|e| e.kind()), Some(ErrorKind::Syntax));
    Ok(())
}
