use anyhow::{anyhow, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use typedsql::demo::Person;
use typedsql::query::parser::parse;
use typedsql::query::planner::Predicate;
use typedsql::{EngineConfig, QueryEngine};

#[path = "../common/mod.rs"]
mod common;

const SEED: u64 = 0x7e57_5eed;
const ITERATIONS: usize = 300;

fn engine(config: EngineConfig) -> QueryEngine {
    QueryEngine::with_registry(common::registry(), config)
}

#[test]
fn test_filter_matches_reference_evaluator() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED);
    let engine = engine(EngineConfig::default());

    for _ in 0..ITERATIONS {
        let count = rng.gen_range(0..40);
        let rows = common::random_people(&mut rng, count);
        let predicate = common::random_predicate(&mut rng, 4);
        let sql = format!("SELECT * FROM $ WHERE {}", predicate);

        let expression = parse(&sql)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;
        let expected: Vec<Person> = rows
            .iter()
            .filter(|p| common::reference_eval(&expression, p))
            .cloned()
            .collect();

        let actual: Vec<Person> = engine.execute(&sql, &rows)?;
        assert_eq!(actual, expected, "`{}`", sql);
    }

    Ok(())
}

#[test]
fn test_output_never_exceeds_input() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED + 1);
    let engine = engine(EngineConfig::default());
    let selections = ["*", "name", "age, city", "id, name, age, city, salary, department, isManager, yearsAtCompany"];

    for _ in 0..ITERATIONS {
        let count = rng.gen_range(0..30);
        let rows = common::random_people(&mut rng, count);
        let selection = selections[rng.gen_range(0..selections.len())];
        let sql = if rng.gen_bool(0.2) {
            format!("SELECT {} FROM $", selection)
        } else {
            format!("SELECT {} FROM $ WHERE {}", selection, common::random_predicate(&mut rng, 3))
        };

        let buffer = engine.plan::<Person>(&sql)?.run(&rows);
        assert!(buffer.len() <= rows.len(), "`{}`", sql);
    }

    Ok(())
}

#[test]
fn test_fusion_is_transparent() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED + 2);
    let fused = engine(EngineConfig::default());
    let reference = engine(EngineConfig {
        optimize: false,
        batch_shortcut: false,
    });

    for _ in 0..ITERATIONS {
        let count = rng.gen_range(0..40);
        let rows = common::random_people(&mut rng, count);
        let sql = format!(
            "SELECT name, team, salary, isManager FROM $ WHERE {}",
            common::random_predicate(&mut rng, 3)
        );

        let fused_plan = fused.plan::<Person>(&sql)?;
        let reference_plan = reference.plan::<Person>(&sql)?;
        assert_eq!(fused_plan.root().node_names(), vec!["FilterProject", "Terminal"]);
        assert_eq!(reference_plan.root().node_names(), vec!["Filter", "Project", "Terminal"]);

        assert_eq!(fused_plan.run(&rows), reference_plan.run(&rows), "`{}`", sql);

        type Output = (String, Option<String>, f32, bool);
        let typed_fused: Vec<Output> = fused.execute(&sql, &rows)?;
        let typed_reference: Vec<Output> = reference.execute(&sql, &rows)?;
        assert_eq!(typed_fused, typed_reference, "`{}`", sql);
    }

    Ok(())
}

fn check_arity<T>(engine: &QueryEngine, columns: &[&str], rows: &[Person], expected: impl Fn(&Person) -> T) -> Result<()>
where
    T: typedsql::QueryOutput<Person> + PartialEq + std::fmt::Debug,
{
    let sql = format!("SELECT {} FROM $", columns.join(", "));
    let actual: Vec<T> = engine.execute(&sql, rows)?;
    let expected: Vec<T> = rows.iter().map(expected).collect();
    assert_eq!(actual, expected, "`{}`", sql);
    Ok(())
}

#[test]
fn test_projection_arities() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED + 3);
    let rows = common::random_people(&mut rng, 25);
    let engine = engine(EngineConfig::default());
    let columns = ["id", "name", "age", "city", "salary", "department", "isManager", "yearsAtCompany", "team"];

    check_arity(&engine, &columns[..1], &rows, |p| p.id)?;
    check_arity(&engine, &columns[..2], &rows, |p| (p.id, p.name.clone()))?;
    check_arity(&engine, &columns[..3], &rows, |p| (p.id, p.name.clone(), p.age))?;
    check_arity(&engine, &columns[..4], &rows, |p| (p.id, p.name.clone(), p.age, p.city.clone()))?;
    check_arity(&engine, &columns[..5], &rows, |p| {
        (p.id, p.name.clone(), p.age, p.city.clone(), p.salary)
    })?;
    check_arity(&engine, &columns[..6], &rows, |p| {
        (p.id, p.name.clone(), p.age, p.city.clone(), p.salary, p.department.clone())
    })?;
    check_arity(&engine, &columns[..7], &rows, |p| {
        (p.id, p.name.clone(), p.age, p.city.clone(), p.salary, p.department.clone(), p.is_manager)
    })?;
    check_arity(&engine, &columns[..8], &rows, |p| {
        (
            p.id,
            p.name.clone(),
            p.age,
            p.city.clone(),
            p.salary,
            p.department.clone(),
            p.is_manager,
            (p.years_at_company,),
        )
    })?;
    check_arity(&engine, &columns[..9], &rows, |p| {
        (
            p.id,
            p.name.clone(),
            p.age,
            p.city.clone(),
            p.salary,
            p.department.clone(),
            p.is_manager,
            (p.years_at_company, p.team.clone()),
        )
    })?;

    Ok(())
}

#[test]
fn test_predicate_render_round_trip() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(SEED + 4);
    let registry = common::registry();

    for _ in 0..ITERATIONS {
        let sql = format!("SELECT * FROM $ WHERE {}", common::random_predicate(&mut rng, 4));
        let expression = parse(&sql)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;

        let lowered = Predicate::<Person>::lower(&expression, &registry)?;
        let rendered = format!("SELECT * FROM $ WHERE {}", lowered);
        let reparsed = parse(&rendered)?.where_clause.ok_or_else(|| anyhow!("missing predicate"))?;

        assert_eq!(reparsed, expression, "`{}` rendered as `{}`", sql, rendered);
        assert_eq!(lowered.to_expression(), expression);
    }

    Ok(())
}
