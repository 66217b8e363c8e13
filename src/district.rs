//! The fixed set of police districts the listing endpoint can be filtered by.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A Danish police district.
///
/// The display name is what the endpoint knows the district as; the query
/// form replaces spaces with hyphens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum District {
    Bornholm,
    Fyn,
    MidtOgVestsjaelland,
    Nordjylland,
    Nordsjaelland,
    SydsjaellandOgLollandFalster,
    Oestjylland,
}

impl District {
    pub const ALL: [District; 7] = [
        District::Bornholm,
        District::Fyn,
        District::MidtOgVestsjaelland,
        District::Nordjylland,
        District::Nordsjaelland,
        District::SydsjaellandOgLollandFalster,
        District::Oestjylland,
    ];

    pub fn name(self) -> &'static str {
        match self {
            District::Bornholm => "Bornholms Politi",
            District::Fyn => "Fyns Politi",
            District::MidtOgVestsjaelland => "Midt og Vestsjaellands Politi",
            District::Nordjylland => "Nordjyllands Politi",
            District::Nordsjaelland => "Nordsjaellands Politi",
            District::SydsjaellandOgLollandFalster => "Sydsjaellands og Lolland-Falsters Politi",
            District::Oestjylland => "OEstjyllands Politi",
        }
    }

    /// The value sent in `districtQuery`.
    pub fn query_value(self) -> String {
        self.name().replace(' ', "-")
    }
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
