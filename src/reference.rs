//! Static domain reference data: listing enumerations, the canonical brand
//! list, dealership policy facts and the keyword lists the chat pipeline
//! matches against.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyType {
    Sedan,
    Suv,
    Hatchback,
    Coupe,
    Convertible,
    Wagon,
    Pickup,
    Van,
}

impl BodyType {
    pub const ALL: [BodyType; 8] = [
        BodyType::Sedan,
        BodyType::Suv,
        BodyType::Hatchback,
        BodyType::Coupe,
        BodyType::Convertible,
        BodyType::Wagon,
        BodyType::Pickup,
        BodyType::Van,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BodyType::Sedan => "sedan",
            BodyType::Suv => "suv",
            BodyType::Hatchback => "hatchback",
            BodyType::Coupe => "coupe",
            BodyType::Convertible => "convertible",
            BodyType::Wagon => "wagon",
            BodyType::Pickup => "pickup",
            BodyType::Van => "van",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum(raw, &Self::ALL, Self::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuelType {
    Petrol,
    Diesel,
    Electric,
    Hybrid,
    Cng,
}

impl FuelType {
    pub const ALL: [FuelType; 5] = [
        FuelType::Petrol,
        FuelType::Diesel,
        FuelType::Electric,
        FuelType::Hybrid,
        FuelType::Cng,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FuelType::Petrol => "petrol",
            FuelType::Diesel => "diesel",
            FuelType::Electric => "electric",
            FuelType::Hybrid => "hybrid",
            FuelType::Cng => "cng",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum(raw, &Self::ALL, Self::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub const ALL: [Transmission; 2] = [Transmission::Automatic, Transmission::Manual];

    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "automatic",
            Transmission::Manual => "manual",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        parse_enum(raw, &Self::ALL, Self::as_str)
    }
}

fn parse_enum<T: Copy>(raw: &str, all: &[T], name: fn(&T) -> &'static str) -> Option<T> {
    let wanted = raw.trim();
    all.iter()
        .copied()
        .find(|value| name(value).eq_ignore_ascii_case(wanted))
}

/// Canonical brand spellings, scanned in order when the model leaves `make` empty.
pub const KNOWN_BRANDS: &[&str] = &[
    "Toyota",
    "Honda",
    "Suzuki",
    "Daihatsu",
    "Mitsubishi",
    "Nissan",
    "Mazda",
    "Hyundai",
    "Kia",
    "Wuling",
    "Chery",
    "BYD",
    "VinFast",
    "Isuzu",
    "Subaru",
    "Lexus",
    "Ford",
    "Chevrolet",
    "Jeep",
    "Tesla",
    "BMW",
    "Mercedes-Benz",
    "Mercedes",
    "Audi",
    "Volkswagen",
    "Porsche",
    "Volvo",
    "Peugeot",
    "Land Rover",
    "Range Rover",
];

/// Phrases that signal a price-driven query.
pub const BUDGET_KEYWORDS: &[&str] = &[
    "cheap",
    "cheapest",
    "affordable",
    "budget",
    "inexpensive",
    "low cost",
    "low-cost",
    "low price",
    "bargain",
];

/// Lower-cased substrings that make a message ineligible for an answer.
pub const DENYLIST: &[&str] = &[
    // violence and illegal activity
    "kill someone",
    "murder",
    "bomb",
    "terrorist",
    "run someone over",
    "hit and run",
    "steal a car",
    "stolen car",
    "hotwire",
    "chop shop",
    // adult content
    "porn",
    "nude",
    "escort service",
    "sexual",
    // hate speech
    "racial slur",
    "white power",
    "ethnic cleansing",
    "nazi",
    // fraud
    "fake documents",
    "forged documents",
    "counterfeit",
    "money laundering",
    "launder money",
    "roll back the odometer",
    "odometer rollback",
    "tamper with the odometer",
    // controlled substances
    "cocaine",
    "heroin",
    "methamphetamine",
    "smuggle drugs",
    "drug trafficking",
    // trafficking and exploitation
    "human trafficking",
    "child exploitation",
    "smuggle people",
];

/// Dealership facts quoted verbatim by the policy branch.
pub const POLICY_FACTS: &str = "\
- Warranty: every verified car carries a 12-month or 20,000 km warranty (whichever comes first) on engine and transmission.
- Returns: cars can be returned within 7 days of delivery if driven less than 500 km and undamaged.
- Financing: partner banks offer financing from 20% down payment with tenors of 12 to 60 months.
- Delivery: free delivery within 50 km of the dealer; beyond that a per-kilometre fee applies.
- Verification: listings are inspected and approved by our administrators before they appear in default search results.";
