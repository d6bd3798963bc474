//! Demonstration data set: an employee row type, its schema and sample rows.

use crate::catalog::{ColumnMetadata, Row, SchemaRegistry, TableSchema};

/// An employee record
#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: i32,
    pub name: String,
    pub age: i32,
    pub city: String,
    pub salary: f32,
    pub department: String,
    pub is_manager: bool,
    pub years_at_company: i32,
    pub country: String,
    pub team: Option<String>,
    pub level: String,
}

impl Row for Person {}

impl Person {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i32,
        name: &str,
        age: i32,
        city: &str,
        salary: f32,
        department: &str,
        is_manager: bool,
        years_at_company: i32,
        country: &str,
        team: Option<&str>,
        level: &str,
    ) -> Self {
        Person {
            id,
            name: name.to_string(),
            age,
            city: city.to_string(),
            salary,
            department: department.to_string(),
            is_manager,
            years_at_company,
            country: country.to_string(),
            team: team.map(str::to_string),
            level: level.to_string(),
        }
    }
}

fn id(p: &Person) -> i32 {
    p.id
}

fn name(p: &Person) -> &str {
    &p.name
}

fn age(p: &Person) -> i32 {
    p.age
}

fn city(p: &Person) -> &str {
    &p.city
}

fn salary(p: &Person) -> f32 {
    p.salary
}

fn department(p: &Person) -> &str {
    &p.department
}

fn is_manager(p: &Person) -> bool {
    p.is_manager
}

fn years_at_company(p: &Person) -> i32 {
    p.years_at_company
}

fn country(p: &Person) -> &str {
    &p.country
}

fn team(p: &Person) -> Option<&str> {
    p.team.as_deref()
}

fn level(p: &Person) -> &str {
    &p.level
}

/// Column schema of [`Person`]
pub fn person_schema() -> TableSchema<Person> {
    TableSchema::new()
        .column(ColumnMetadata::integer("id", id))
        .column(ColumnMetadata::text("name", name))
        .column(ColumnMetadata::integer("age", age))
        .column(ColumnMetadata::text("city", city))
        .column(ColumnMetadata::float("salary", salary))
        .column(ColumnMetadata::text("department", department))
        .column(ColumnMetadata::boolean("isManager", is_manager))
        .column(ColumnMetadata::integer("yearsAtCompany", years_at_company))
        .column(ColumnMetadata::text("country", country))
        .column(ColumnMetadata::nullable_text("team", team))
        .column(ColumnMetadata::text("level", level))
}

/// Registry with the [`Person`] schema registered
pub fn registry() -> SchemaRegistry {
    let mut registry = SchemaRegistry::new();
    registry.register(person_schema());
    registry
}

/// Sample employees
pub fn people() -> Vec<Person> {
    vec![
        Person::new(1, "Ada", 34, "Seattle", 180_000.0, "Engineering", true, 6, "US", Some("Runtime"), "Senior"),
        Person::new(2, "Barbara", 28, "Boston", 150_000.0, "Engineering", false, 3, "US", Some("Compiler"), "Mid"),
        Person::new(3, "Charles", 44, "Helsinki", 210_000.0, "Research", true, 15, "FI", Some("ML"), "Principal"),
        Person::new(4, "David", 31, "Palo Alto", 195_000.0, "Product", false, 4, "US", Some("Runtime"), "Senior"),
        Person::new(5, "Eve", 39, "Seattle", 220_000.0, "Product", true, 10, "US", None, "Staff"),
    ]
}

/// Titled demonstration queries over [`people`]
pub const DEMO_QUERIES: [(&str, &str); 8] = [
    ("Simple city filter", "SELECT Name FROM $ WHERE city != 'Seattle'"),
    (
        "Senior, well-paid managers in engineering",
        "SELECT * FROM $ WHERE department = 'Engineering' AND isManager = true AND yearsAtCompany >= 5 AND salary > 170000",
    ),
    (
        "US-based senior+ ICs on Runtime or ML teams",
        "SELECT Name FROM $ WHERE country = 'US' AND (team = 'Runtime' OR team = 'ML') AND (level = 'Senior' OR level = 'Staff' OR level = 'Principal')",
    ),
    ("Non-US employees", "SELECT Name FROM $ WHERE NOT country = 'US'"),
    (
        "Tuple projection",
        "SELECT Name, City, Department, Team, Level FROM $ WHERE salary >= 195000 AND Team != null",
    ),
    ("Double negation", "SELECT Name FROM $ WHERE NOT NOT country = 'US'"),
    ("De Morgan over OR", "SELECT Name FROM $ WHERE NOT (team = 'Runtime' OR team = 'ML')"),
    (
        "Duplicate predicates",
        "SELECT * FROM $ WHERE department = 'Engineering' AND department = 'Engineering' AND (city = 'Seattle' OR city = 'Seattle')",
    ),
];
