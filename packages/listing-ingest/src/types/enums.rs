//! Closed enumerations shared by searches, jobs and posts.
//!
//! Every enum serializes as its lowercase wire value and exposes the full
//! value set through `VALUES`, which the schema validator checks against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Declares a closed string enumeration with serde, `Display` and `FromStr`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $value:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            /// Every accepted wire value, in declaration order.
            pub const VALUES: &'static [&'static str] = &[$($value),+];

            /// Wire value of this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

/// Returned when a string is not a member of a closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

string_enum! {
    /// Marketplace a search or listing belongs to.
    Source {
        Craigslist => "craigslist",
        Facebook => "facebook",
    }
}

impl Source {
    /// Directory name under a search's cache folder.
    pub fn results_dir(&self) -> &'static str {
        match self {
            Source::Craigslist => "craigslist-results",
            Source::Facebook => "facebook-results",
        }
    }

    /// Region values accepted for posts of this source.
    pub fn region_values(&self) -> &'static [&'static str] {
        match self {
            Source::Craigslist => CraigslistRegion::VALUES,
            Source::Facebook => FacebookRegion::VALUES,
        }
    }
}

string_enum! {
    /// Craigslist site subdomains.
    CraigslistRegion {
        Bakersfield => "bakersfield",
        Chico => "chico",
        Fresno => "fresno",
        GoldCountry => "goldcountry",
        Humboldt => "humboldt",
        InlandEmpire => "inlandempire",
        LasVegas => "lasvegas",
        LosAngeles => "losangeles",
        Mendocino => "mendocino",
        Merced => "merced",
        Modesto => "modesto",
        Monterey => "monterey",
        OrangeCounty => "orangecounty",
        Portland => "portland",
        Redding => "redding",
        Reno => "reno",
        Sacramento => "sacramento",
        SanDiego => "sandiego",
        SanLuisObispo => "slo",
        SantaBarbara => "santabarbara",
        Seattle => "seattle",
        SfBay => "sfbay",
        Stockton => "stockton",
        Visalia => "visalia",
        YubaSutter => "yubasutter",
    }
}

string_enum! {
    /// Craigslist for-sale subcategories.
    CraigslistSubcategory {
        All => "all",
        AutoParts => "auto_parts",
        Bicycles => "bicycles",
        Boats => "boats",
        CarsAndTrucks => "cars_and_trucks",
        Electronics => "electronics",
        FarmAndGarden => "farm_and_garden",
        Furniture => "furniture",
        General => "general",
        HeavyEquipment => "heavy_equipment",
        Motorcycles => "motorcycles",
        RvsAndCamping => "rvs_and_camping",
        Sporting => "sporting",
        Tools => "tools",
        Trailers => "trailers",
    }
}

impl CraigslistSubcategory {
    /// Category code used in craigslist search URLs.
    pub fn code(&self) -> &'static str {
        match self {
            CraigslistSubcategory::All => "sss",
            CraigslistSubcategory::AutoParts => "pta",
            CraigslistSubcategory::Bicycles => "bia",
            CraigslistSubcategory::Boats => "boo",
            CraigslistSubcategory::CarsAndTrucks => "cta",
            CraigslistSubcategory::Electronics => "ela",
            CraigslistSubcategory::FarmAndGarden => "gra",
            CraigslistSubcategory::Furniture => "fua",
            CraigslistSubcategory::General => "foa",
            CraigslistSubcategory::HeavyEquipment => "hva",
            CraigslistSubcategory::Motorcycles => "mca",
            CraigslistSubcategory::RvsAndCamping => "rva",
            CraigslistSubcategory::Sporting => "sga",
            CraigslistSubcategory::Tools => "tla",
            CraigslistSubcategory::Trailers => "tra",
        }
    }
}

string_enum! {
    /// Facebook marketplace location slugs.
    FacebookRegion {
        Fresno => "fresno",
        LasVegas => "lasvegas",
        LosAngeles => "la",
        Modesto => "modesto",
        Oakland => "oakland",
        Portland => "portland",
        Reno => "reno",
        Sacramento => "sacramento",
        SanFrancisco => "sanfrancisco",
        SanJose => "sanjose",
        Seattle => "seattle",
        Stockton => "stockton",
    }
}

string_enum! {
    /// Facebook marketplace search radius in kilometers.
    FacebookRadius {
        Km1 => "1",
        Km2 => "2",
        Km5 => "5",
        Km10 => "10",
        Km20 => "20",
        Km40 => "40",
        Km60 => "60",
        Km80 => "80",
        Km100 => "100",
        Km250 => "250",
        Km500 => "500",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_str() {
        for value in CraigslistSubcategory::VALUES {
            let parsed: CraigslistSubcategory = value.parse().unwrap();
            assert_eq!(parsed.as_str(), *value);
        }
    }

    #[test]
    fn test_rejects_unknown_value() {
        let err = "atlantis".parse::<CraigslistRegion>().unwrap_err();
        assert_eq!(err.to_string(), "'atlantis' is not a valid CraigslistRegion");
    }

    #[test]
    fn test_serde_uses_wire_value() {
        let json = serde_json::to_string(&FacebookRadius::Km60).unwrap();
        assert_eq!(json, "\"60\"");
        let region: FacebookRegion = serde_json::from_str("\"la\"").unwrap();
        assert_eq!(region, FacebookRegion::LosAngeles);
    }

    #[test]
    fn test_region_values_follow_source() {
        assert!(Source::Craigslist.region_values().contains(&"reno"));
        assert!(!Source::Facebook.region_values().contains(&"sfbay"));
    }
}
