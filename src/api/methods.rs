//! The catalogue of remote procedures.
//!
//! The API names its procedures in upper camel case (`GetCampaignsList`),
//! while callers conventionally spell them as method calls (`getCampaignsList`).
//! [`Method`] accepts both spellings and always sends the former.

use std::{fmt, str::FromStr};
use thiserror::Error;

macro_rules! remote_methods {
    ($($variant:ident),* $(,)?) => {
        /// A known remote procedure.
        ///
        /// Variants are named exactly as the API expects them on the wire.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Method {
            $($variant,)*
        }

        impl Method {
            pub const ALL: &'static [Method] = &[$(Method::$variant,)*];

            /// The wire name, as sent within the envelope.
            pub fn name(self) -> &'static str {
                match self {
                    $(Method::$variant => stringify!($variant),)*
                }
            }
        }
    };
}

remote_methods! {
    // Campaigns
    ArchiveCampaign,
    CreateOrUpdateCampaign,
    DeleteCampaign,
    GetCampaignParams,
    GetCampaignsList,
    GetCampaignsListFilter,
    GetCampaignsParams,
    ResumeCampaign,
    StopCampaign,
    UnArchiveCampaign,
    // Banners
    ArchiveBanners,
    CreateOrUpdateBanners,
    DeleteBanners,
    GetBanners,
    GetBannerPhrases,
    GetBannerPhrasesFilter,
    ModerateBanners,
    ResumeBanners,
    StopBanners,
    UnArchiveBanners,
    // Prices
    SetAutoPrice,
    UpdatePrices,
    // Statistics and reports
    GetBalance,
    GetSummaryStat,
    CreateNewReport,
    DeleteReport,
    GetReportList,
    CreateNewWordstatReport,
    DeleteWordstatReport,
    GetWordstatReport,
    GetWordstatReportList,
    CreateNewForecast,
    DeleteForecastReport,
    GetForecast,
    GetForecastList,
    // Clients
    CreateNewSubclient,
    GetClientInfo,
    GetClientsList,
    GetClientsUnits,
    GetSubClients,
    UpdateClientInfo,
    // Metadata
    GetAvailableVersions,
    GetChanges,
    GetRegions,
    GetRubrics,
    GetStatGoals,
    GetTimeZones,
    GetVersion,
    PingAPI,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown remote method: {0}")]
pub struct UnknownMethod(pub String);

impl FromStr for Method {
    type Err = UnknownMethod;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let wire_name = capitalize(name);
        Method::ALL
            .iter()
            .copied()
            .find(|method| method.name() == wire_name)
            .ok_or_else(|| UnknownMethod(name.to_string()))
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_only_touches_first_character() {
        assert_eq!(capitalize("getCampaignsList"), "GetCampaignsList");
        assert_eq!(capitalize("pingAPI"), "PingAPI");
        assert_eq!(capitalize("GetBalance"), "GetBalance");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn both_spellings_parse() {
        assert_eq!("getBannerPhrases".parse::<Method>(), Ok(Method::GetBannerPhrases));
        assert_eq!("GetBannerPhrases".parse::<Method>(), Ok(Method::GetBannerPhrases));
        assert_eq!("unArchiveCampaign".parse::<Method>(), Ok(Method::UnArchiveCampaign));
        assert_eq!(
            "getEverything".parse::<Method>(),
            Err(UnknownMethod("getEverything".to_string()))
        );
    }

    #[test]
    fn catalogue_names_are_unique_and_capitalized() {
        let mut names: Vec<_> = Method::ALL.iter().map(|method| method.name()).collect();
        assert_eq!(names.len(), 49);
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), Method::ALL.len());
        for name in names {
            assert_eq!(capitalize(name), name);
        }
    }
}
