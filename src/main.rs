use anyhow::Result;

use typedsql::demo::{self, Person, DEMO_QUERIES};
use typedsql::{compile, CompiledQuery, QueryOutput, SchemaRegistry};

fn compile_and_show<T: QueryOutput<Person>>(registry: &SchemaRegistry, query: &str) -> Result<CompiledQuery<Person, T>> {
    let compiled = compile::<Person, T>(registry, query)?;
    println!("Compiled query for `{}`:\n{}", query, compiled);
    Ok(compiled)
}

fn main() -> Result<()> {
    let registry = demo::registry();
    let rows = demo::people();

    println!("Input data:");
    for row in &rows {
        println!("{:?}", row);
    }
    println!();

    let [simple, managers, ics, non_us, tuple, double_not, de_morgan, duplicates] = DEMO_QUERIES.map(|(_, sql)| sql);

    // 1) Simple city filter
    for name in compile_and_show::<String>(&registry, simple)?.execute(&rows)? {
        println!(" -> {}", name);
    }
    println!();

    // 2) Senior, well-paid managers in engineering
    for person in compile_and_show::<Person>(&registry, managers)?.execute(&rows)? {
        println!(
            " -> {} ({}) [{}], Years={}, Level={}",
            person.name, person.city, person.department, person.years_at_company, person.level
        );
    }
    println!();

    // 3) US-based senior+ ICs on Runtime or ML teams
    for name in compile_and_show::<String>(&registry, ics)?.execute(&rows)? {
        println!(" -> {}", name);
    }
    println!();

    // 4) Non-US employees
    for name in compile_and_show::<String>(&registry, non_us)?.execute(&rows)? {
        println!(" -> {}", name);
    }
    println!();

    // 5) Tuple projection with a nullable column
    type Summary = (String, String, String, Option<String>, String);
    for (name, city, department, team, level) in compile_and_show::<Summary>(&registry, tuple)?.execute(&rows)? {
        println!(
            " -> {} ({}) - {}/{} [{}]",
            name,
            city,
            department,
            team.as_deref().unwrap_or("Unset"),
            level
        );
    }
    println!();

    // 6) Double negation
    for name in compile_and_show::<String>(&registry, double_not)?.execute(&rows)? {
        println!(" -> {}", name);
    }
    println!();

    // 7) De Morgan distribution over OR
    for name in compile_and_show::<String>(&registry, de_morgan)?.execute(&rows)? {
        println!(" -> {}", name);
    }
    println!();

    // 8) Duplicate predicates in AND/OR chains
    for person in compile_and_show::<Person>(&registry, duplicates)?.execute(&rows)? {
        println!(" -> {} ({}) [{}]", person.name, person.city, person.department);
    }
    println!();

    println!("All queries executed.");
    Ok(())
}
