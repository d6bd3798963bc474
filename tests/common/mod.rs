#![allow(dead_code)]

use std::cmp::Ordering;

use rand::Rng;
use rand::seq::SliceRandom;

use typedsql::demo::{self, Person};
use typedsql::query::parser::{ComparisonOperator, LiteralValue, WhereExpression};
use typedsql::SchemaRegistry;

// Registry with the Person schema
pub fn registry() -> SchemaRegistry {
    demo::registry()
}

// The three rows used by the documented scenarios
pub fn scenario_rows() -> Vec<Person> {
    vec![
        Person::new(1, "Ada", 34, "Seattle", 180_000.0, "Engineering", true, 6, "US", Some("Runtime"), "Senior"),
        Person::new(2, "Barbara", 28, "Boston", 150_000.0, "Engineering", false, 3, "US", Some("Compiler"), "Mid"),
        Person::new(3, "Charles", 44, "Helsinki", 210_000.0, "Research", true, 15, "FI", Some("ML"), "Principal"),
    ]
}

const NAMES: [&str; 6] = ["Ada", "Barbara", "Charles", "David", "Eve", "frank"];
const CITIES: [&str; 5] = ["Seattle", "Boston", "Helsinki", "Palo Alto", "seattle"];
const TEAMS: [&str; 3] = ["Runtime", "Compiler", "ML"];

// Generate people over small value domains so random predicates hit often
pub fn random_people<R: Rng>(rng: &mut R, count: usize) -> Vec<Person> {
    (0..count)
        .map(|i| {
            let team = if rng.gen_bool(0.25) { None } else { TEAMS.choose(rng).copied() };
            Person::new(
                i as i32,
                NAMES.choose(rng).copied().unwrap_or("Ada"),
                rng.gen_range(20..60),
                CITIES.choose(rng).copied().unwrap_or("Seattle"),
                rng.gen_range(0..8) as f32 * 25_000.0 + 100_000.0,
                ["Engineering", "Research", "Product"].choose(rng).copied().unwrap_or("Product"),
                rng.gen_bool(0.5),
                rng.gen_range(0..20),
                ["US", "FI"].choose(rng).copied().unwrap_or("US"),
                team,
                ["Mid", "Senior", "Staff"].choose(rng).copied().unwrap_or("Mid"),
            )
        })
        .collect()
}

const OPERATORS: [&str; 6] = ["=", "!=", ">", ">=", "<", "<="];

// Random comparison text that type-checks against the Person schema
pub fn random_comparison<R: Rng>(rng: &mut R) -> String {
    let op = OPERATORS.choose(rng).copied().unwrap_or("=");
    match rng.gen_range(0..7) {
        0 => format!("age {} {}", op, rng.gen_range(20..60)),
        1 => format!("salary {} {}", op, rng.gen_range(0..8) * 25_000 + 100_000),
        2 => format!("salary {} {}.5", op, rng.gen_range(100_000..300_000)),
        3 => format!("isManager {} {}", op, rng.gen_bool(0.5)),
        4 => format!("city {} '{}'", op, CITIES.choose(rng).copied().unwrap_or("Boston")),
        5 => {
            if rng.gen_bool(0.3) {
                format!("team {} null", op)
            } else {
                format!("team {} '{}'", op, TEAMS.choose(rng).copied().unwrap_or("ML"))
            }
        }
        _ => format!("Name {} '{}'", op, NAMES.choose(rng).copied().unwrap_or("Eve")),
    }
}

// Random predicate text of bounded depth
pub fn random_predicate<R: Rng>(rng: &mut R, depth: usize) -> String {
    if depth == 0 || rng.gen_bool(0.3) {
        return random_comparison(rng);
    }

    match rng.gen_range(0..4) {
        0 => format!("{} AND {}", random_predicate(rng, depth - 1), random_predicate(rng, depth - 1)),
        1 => format!("{} OR {}", random_predicate(rng, depth - 1), random_predicate(rng, depth - 1)),
        2 => format!("NOT {}", random_predicate(rng, depth - 1)),
        _ => format!("({})", random_predicate(rng, depth - 1)),
    }
}

// Column value read by name, independent of the compiled accessors
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Int(i32),
    Float(f32),
    Bool(bool),
    Text(Option<String>),
}

fn column_value(person: &Person, column: &str) -> Value {
    match column.to_lowercase().as_str() {
        "id" => Value::Int(person.id),
        "name" => Value::Text(Some(person.name.clone())),
        "age" => Value::Int(person.age),
        "city" => Value::Text(Some(person.city.clone())),
        "salary" => Value::Float(person.salary),
        "department" => Value::Text(Some(person.department.clone())),
        "ismanager" => Value::Bool(person.is_manager),
        "yearsatcompany" => Value::Int(person.years_at_company),
        "country" => Value::Text(Some(person.country.clone())),
        "team" => Value::Text(person.team.clone()),
        "level" => Value::Text(Some(person.level.clone())),
        other => panic!("unknown column {}", other),
    }
}

fn compare(value: &Value, literal: &LiteralValue) -> Ordering {
    match (value, literal) {
        (Value::Int(v), LiteralValue::Integer(l)) => v.cmp(l),
        (Value::Float(v), LiteralValue::Integer(l)) => v.partial_cmp(&(*l as f32)).unwrap_or(Ordering::Equal),
        (Value::Float(v), LiteralValue::Float(l)) => v.partial_cmp(l).unwrap_or(Ordering::Equal),
        (Value::Bool(v), LiteralValue::Boolean(l)) => v.cmp(l),
        (Value::Text(v), LiteralValue::String(l)) => v.cmp(l),
        (value, literal) => panic!("cannot compare {:?} with {:?}", value, literal),
    }
}

fn holds(operator: ComparisonOperator, ordering: Ordering) -> bool {
    match operator {
        ComparisonOperator::Equals => ordering == Ordering::Equal,
        ComparisonOperator::NotEqual => ordering != Ordering::Equal,
        ComparisonOperator::GreaterThan => ordering == Ordering::Greater,
        ComparisonOperator::GreaterOrEqual => ordering != Ordering::Less,
        ComparisonOperator::LessThan => ordering == Ordering::Less,
        ComparisonOperator::LessOrEqual => ordering != Ordering::Greater,
    }
}

// Straightforward interpreter over the parsed predicate tree
pub fn reference_eval(expression: &WhereExpression, person: &Person) -> bool {
    match expression {
        WhereExpression::Comparison { column, operator, literal } => {
            holds(*operator, compare(&column_value(person, column), literal))
        }
        WhereExpression::And(left, right) => reference_eval(left, person) && reference_eval(right, person),
        WhereExpression::Or(left, right) => reference_eval(left, person) || reference_eval(right, person),
        WhereExpression::Not(inner) => !reference_eval(inner, person),
    }
}

// Names of the people in `rows`
pub fn names(rows: &[Person]) -> Vec<String> {
    rows.iter().map(|p| p.name.clone()).collect()
}
