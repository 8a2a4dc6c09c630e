#![allow(dead_code)]

use introspect::TypeInfo;

pub trait Greeter {
    fn greet(&self) -> String;
}

#[derive(TypeInfo, Debug, Default, Clone, PartialEq)]
pub struct Town {
    pub int: i64,
    pub str: String,
    pub bool: bool,
    pub strs: Vec<String>,
}

#[derive(TypeInfo, Debug, Default, Clone, PartialEq)]
pub struct City {
    pub id: i64,
    pub ptr_town: Option<Box<Town>>,
    pub town: Town,
}

#[derive(TypeInfo, Debug, Default, Clone, PartialEq)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub city: City,
    pub ptr_city: Option<Box<City>>,
}

#[derive(TypeInfo, Debug, Default, Clone, PartialEq)]
#[introspect(implements(Greeter))]
pub struct Person {
    #[introspect(tag(json = "name", db = "person_name"))]
    pub name: String,
    #[introspect(tag(json = "age"))]
    pub age: i64,
    pub ptr_person: Option<Box<Person>>,
    phone: String,
    #[introspect(flatten)]
    pub country: Country,
}

impl Person {
    pub fn new(name: &str, age: i64) -> Self {
        Self {
            name: name.to_owned(),
            age,
            ..Default::default()
        }
    }

    pub fn with_phone(mut self, phone: &str) -> Self {
        self.phone = phone.to_owned();
        self
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }
}

impl Greeter for Person {
    fn greet(&self) -> String {
        format!("hello, {}", self.name)
    }
}

#[derive(TypeInfo, Debug, Default, Clone, PartialEq)]
pub struct Point(pub i32, pub i32);

#[derive(TypeInfo, Debug, Clone, PartialEq)]
pub enum Shape {
    Dot,
    Circle { radius: f64 },
    Segment(Point, Point),
}

pub fn country() -> Country {
    Country {
        id: 1,
        name: "Country".to_owned(),
        city: City {
            id: 2,
            ptr_town: Some(Box::new(Town {
                int: 3,
                str: "ptr town".to_owned(),
                bool: true,
                strs: vec!["a".to_owned(), "b".to_owned()],
            })),
            town: Town {
                int: 4,
                str: "town".to_owned(),
                ..Default::default()
            },
        },
        ptr_city: None,
    }
}

pub fn person() -> Person {
    let mut person = Person::new("John", 30).with_phone("555-0100");
    person.country = country();
    person
}
