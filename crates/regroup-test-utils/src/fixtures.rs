//! Reusable record fixtures.
//!
//! - [`Person`]: a record with a stored `homeTown` and a derived
//!   `uptown` attribute (the town upper-cased, computed on read).
//! - [`people`], [`men`], [`women`]: small hand-written populations.
//! - [`population`]: a deterministic large population for benches.

use regroup_core::{KeyValue, Record};

/// A person with an optional home town.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Person {
    pub name: &'static str,
    pub home_town: Option<&'static str>,
}

impl Person {
    pub fn new(name: &'static str, home_town: &'static str) -> Self {
        Self {
            name,
            home_town: Some(home_town),
        }
    }

    /// A person without a `homeTown` attribute.
    pub fn anonymous(name: &'static str) -> Self {
        Self {
            name,
            home_town: None,
        }
    }
}

impl Record for Person {
    fn field(&self, name: &str) -> Option<KeyValue> {
        match name {
            "name" => Some(self.name.into()),
            "homeTown" => self.home_town.map(KeyValue::from),
            "uptown" => self.home_town.map(|t| t.to_uppercase().into()),
            _ => None,
        }
    }
}

/// Shorthand for [`Person::new`].
pub fn person(name: &'static str, home_town: &'static str) -> Person {
    Person::new(name, home_town)
}

/// Five people across three towns, two of which repeat.
pub fn people() -> Vec<Person> {
    vec![
        person("Bob", "New York City"),
        person("Sam", "London"),
        person("Alice", "New York City"),
        person("Alex", "London"),
        person("Dave", "San Francisco"),
    ]
}

pub fn men() -> Vec<Person> {
    vec![
        person("Bob", "New York City"),
        person("Sam", "London"),
        person("Alex", "London"),
    ]
}

pub fn women() -> Vec<Person> {
    vec![
        person("Alice", "New York City"),
        person("Dorothy", "London"),
    ]
}

/// Names of `items`, in order.
pub fn names(items: &[Person]) -> Vec<&'static str> {
    items.iter().map(|p| p.name).collect()
}

const TOWNS: [&str; 16] = [
    "Amsterdam", "Berlin", "Cairo", "Dublin", "Edinburgh", "Florence", "Geneva", "Havana",
    "Istanbul", "Jakarta", "Kyoto", "Lima", "Madrid", "Nairobi", "Oslo", "Paris",
];

/// `count` people spread over `towns` towns (at most 16), with town
/// assignment driven by a fixed LCG so runs are reproducible.
pub fn population(count: usize, towns: usize, seed: u64) -> Vec<Person> {
    let towns = towns.clamp(1, TOWNS.len());
    let mut state = seed;
    (0..count)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let town = TOWNS[(state >> 33) as usize % towns];
            person("anon", town)
        })
        .collect()
}
