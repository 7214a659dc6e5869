// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use std::fmt::{self, Display};

/// Owned, non-`Copy` items for exercising publishers with heap data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TestData {
    Person { name: String, age: u32 },
    Animal { species: String, legs: u32 },
}

impl Display for TestData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person { name, age } => write!(f, "Person[name={name}, age={age}]"),
            Self::Animal { species, legs } => write!(f, "Animal[species={species}, legs={legs}]"),
        }
    }
}

fn person(name: &str, age: u32) -> TestData {
    TestData::Person {
        name: name.to_string(),
        age,
    }
}

fn animal(species: &str, legs: u32) -> TestData {
    TestData::Animal {
        species: species.to_string(),
        legs,
    }
}

#[must_use]
pub fn person_alice() -> TestData {
    person("Alice", 25)
}

#[must_use]
pub fn person_bob() -> TestData {
    person("Bob", 30)
}

#[must_use]
pub fn person_charlie() -> TestData {
    person("Charlie", 35)
}

#[must_use]
pub fn animal_dog() -> TestData {
    animal("Dog", 4)
}

#[must_use]
pub fn animal_spider() -> TestData {
    animal("Spider", 8)
}
