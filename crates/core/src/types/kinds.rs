//! Enumerations shared with the listing and auth services.
//!
//! All of them travel as `SCREAMING_SNAKE_CASE` strings. Enumerations the
//! server may extend without notice (`ListingStatus`, `UserRole`) carry an
//! `Unknown` fallback so a new server value never breaks deserialization.

use serde::{Deserialize, Serialize};

/// Kind of property being rented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PropertyType {
    #[default]
    Apartment,
    House,
    Condo,
    Townhouse,
    Studio,
    Room,
    SharedRoom,
}

impl PropertyType {
    /// Every property type, in the order a selection control lists them.
    pub const ALL: [Self; 7] = [
        Self::Apartment,
        Self::House,
        Self::Condo,
        Self::Townhouse,
        Self::Studio,
        Self::Room,
        Self::SharedRoom,
    ];

    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Apartment => "APARTMENT",
            Self::House => "HOUSE",
            Self::Condo => "CONDO",
            Self::Townhouse => "TOWNHOUSE",
            Self::Studio => "STUDIO",
            Self::Room => "ROOM",
            Self::SharedRoom => "SHARED_ROOM",
        }
    }
}

/// Lease arrangement offered for a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaseType {
    Monthly,
    #[default]
    Semester,
    AcademicYear,
    Yearly,
    SummerOnly,
    Flexible,
}

impl LeaseType {
    /// Every lease type, in the order a selection control lists them.
    pub const ALL: [Self; 6] = [
        Self::Monthly,
        Self::Semester,
        Self::AcademicYear,
        Self::Yearly,
        Self::SummerOnly,
        Self::Flexible,
    ];

    /// Wire name of the variant.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monthly => "MONTHLY",
            Self::Semester => "SEMESTER",
            Self::AcademicYear => "ACADEMIC_YEAR",
            Self::Yearly => "YEARLY",
            Self::SummerOnly => "SUMMER_ONLY",
            Self::Flexible => "FLEXIBLE",
        }
    }
}

macro_rules! impl_wire_from_str {
    ($name:ident, $label:literal) => {
        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_uppercase().replace(['-', ' '], "_");
                Self::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| format!("invalid {}: {s}", $label))
            }
        }
    };
}

impl_wire_from_str!(PropertyType, "property type");
impl_wire_from_str!(LeaseType, "lease type");

/// Publication status of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ListingStatus {
    Active,
    Inactive,
    Rented,
    Pending,
    Draft,
    #[serde(other)]
    Unknown,
}

/// Role attached to an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserRole {
    #[default]
    Student,
    Landlord,
    Admin,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Student => write!(f, "STUDENT"),
            Self::Landlord => write!(f, "LANDLORD"),
            Self::Admin => write!(f, "ADMIN"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "LANDLORD" => Ok(Self::Landlord),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_property_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PropertyType::SharedRoom).unwrap(),
            "\"SHARED_ROOM\""
        );
        for kind in PropertyType::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn test_lease_type_from_str_is_forgiving() {
        assert_eq!(
            "academic-year".parse::<LeaseType>().unwrap(),
            LeaseType::AcademicYear
        );
        assert_eq!("summer only".parse::<LeaseType>().unwrap(), LeaseType::SummerOnly);
        assert!("weekly".parse::<LeaseType>().is_err());
    }

    #[test]
    fn test_defaults_match_new_listing_form() {
        assert_eq!(PropertyType::default(), PropertyType::Apartment);
        assert_eq!(LeaseType::default(), LeaseType::Semester);
    }

    #[test]
    fn test_unknown_status_and_role_are_tolerated() {
        let status: ListingStatus = serde_json::from_str("\"ARCHIVED\"").unwrap();
        assert_eq!(status, ListingStatus::Unknown);
        let role: UserRole = serde_json::from_str("\"SUPERUSER\"").unwrap();
        assert_eq!(role, UserRole::Unknown);
    }

    #[test]
    fn test_role_round_trip_through_display() {
        let role: UserRole = UserRole::Landlord.to_string().parse().unwrap();
        assert_eq!(role, UserRole::Landlord);
    }
}
