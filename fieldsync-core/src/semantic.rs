//! Semantic ("special") column types and their subtype relation.
//!
//! The hierarchy is a static parent table rather than anything resolved at
//! runtime: every type names at most one direct parent, and [`SemanticType::is_a`]
//! walks that chain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticType {
    #[serde(rename = "type/Special")]
    Special,
    #[serde(rename = "type/PK")]
    PK,
    #[serde(rename = "type/FK")]
    FK,
    #[serde(rename = "type/Category")]
    Category,
    #[serde(rename = "type/Name")]
    Name,
    #[serde(rename = "type/Title")]
    Title,
    #[serde(rename = "type/Description")]
    Description,
    #[serde(rename = "type/Address")]
    Address,
    #[serde(rename = "type/City")]
    City,
    #[serde(rename = "type/State")]
    State,
    #[serde(rename = "type/Country")]
    Country,
    #[serde(rename = "type/ZipCode")]
    ZipCode,
    #[serde(rename = "type/Number")]
    Number,
    #[serde(rename = "type/Coordinate")]
    Coordinate,
    #[serde(rename = "type/Latitude")]
    Latitude,
    #[serde(rename = "type/Longitude")]
    Longitude,
    #[serde(rename = "type/Quantity")]
    Quantity,
    #[serde(rename = "type/Score")]
    Score,
    #[serde(rename = "type/URL")]
    URL,
    #[serde(rename = "type/ImageURL")]
    ImageURL,
    #[serde(rename = "type/AvatarURL")]
    AvatarURL,
    #[serde(rename = "type/Email")]
    Email,
    #[serde(rename = "type/Timestamp")]
    Timestamp,
    #[serde(rename = "type/CreationTimestamp")]
    CreationTimestamp,
    #[serde(rename = "type/SerializedJSON")]
    SerializedJSON,
}

/// `(child, parent)` pairs. Types absent from the left column are roots.
const PARENTS: &[(SemanticType, SemanticType)] = &[
    (SemanticType::PK, SemanticType::Special),
    (SemanticType::FK, SemanticType::Special),
    (SemanticType::Category, SemanticType::Special),
    (SemanticType::Name, SemanticType::Category),
    (SemanticType::Title, SemanticType::Special),
    (SemanticType::Description, SemanticType::Special),
    (SemanticType::Address, SemanticType::Special),
    (SemanticType::City, SemanticType::Address),
    (SemanticType::State, SemanticType::Address),
    (SemanticType::Country, SemanticType::Address),
    (SemanticType::ZipCode, SemanticType::Address),
    (SemanticType::Number, SemanticType::Special),
    (SemanticType::Coordinate, SemanticType::Number),
    (SemanticType::Latitude, SemanticType::Coordinate),
    (SemanticType::Longitude, SemanticType::Coordinate),
    (SemanticType::Quantity, SemanticType::Number),
    (SemanticType::Score, SemanticType::Number),
    (SemanticType::URL, SemanticType::Special),
    (SemanticType::ImageURL, SemanticType::URL),
    (SemanticType::AvatarURL, SemanticType::ImageURL),
    (SemanticType::Email, SemanticType::Special),
    (SemanticType::Timestamp, SemanticType::Special),
    (SemanticType::CreationTimestamp, SemanticType::Timestamp),
    (SemanticType::SerializedJSON, SemanticType::Special),
];

impl SemanticType {
    pub const ALL: &'static [SemanticType] = &[
        SemanticType::Special,
        SemanticType::PK,
        SemanticType::FK,
        SemanticType::Category,
        SemanticType::Name,
        SemanticType::Title,
        SemanticType::Description,
        SemanticType::Address,
        SemanticType::City,
        SemanticType::State,
        SemanticType::Country,
        SemanticType::ZipCode,
        SemanticType::Number,
        SemanticType::Coordinate,
        SemanticType::Latitude,
        SemanticType::Longitude,
        SemanticType::Quantity,
        SemanticType::Score,
        SemanticType::URL,
        SemanticType::ImageURL,
        SemanticType::AvatarURL,
        SemanticType::Email,
        SemanticType::Timestamp,
        SemanticType::CreationTimestamp,
        SemanticType::SerializedJSON,
    ];

    /// Direct parent in the hierarchy, if any.
    pub fn parent(self) -> Option<SemanticType> {
        PARENTS
            .iter()
            .find(|(child, _)| *child == self)
            .map(|(_, parent)| *parent)
    }

    /// `true` if `self` equals `ancestor` or descends from it.
    pub fn is_a(self, ancestor: SemanticType) -> bool {
        let mut current = Some(self);
        while let Some(t) = current {
            if t == ancestor {
                return true;
            }
            current = t.parent();
        }
        false
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SemanticType::Special => "type/Special",
            SemanticType::PK => "type/PK",
            SemanticType::FK => "type/FK",
            SemanticType::Category => "type/Category",
            SemanticType::Name => "type/Name",
            SemanticType::Title => "type/Title",
            SemanticType::Description => "type/Description",
            SemanticType::Address => "type/Address",
            SemanticType::City => "type/City",
            SemanticType::State => "type/State",
            SemanticType::Country => "type/Country",
            SemanticType::ZipCode => "type/ZipCode",
            SemanticType::Number => "type/Number",
            SemanticType::Coordinate => "type/Coordinate",
            SemanticType::Latitude => "type/Latitude",
            SemanticType::Longitude => "type/Longitude",
            SemanticType::Quantity => "type/Quantity",
            SemanticType::Score => "type/Score",
            SemanticType::URL => "type/URL",
            SemanticType::ImageURL => "type/ImageURL",
            SemanticType::AvatarURL => "type/AvatarURL",
            SemanticType::Email => "type/Email",
            SemanticType::Timestamp => "type/Timestamp",
            SemanticType::CreationTimestamp => "type/CreationTimestamp",
            SemanticType::SerializedJSON => "type/SerializedJSON",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemanticType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown semantic type '{s}'"))
    }
}
