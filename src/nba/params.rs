
    use core::fmt;
    use std::fmt::Display;
    use chrono::Datelike;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub enum PlayerID {
        ID(String)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum LeagueID {
        NBA,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(untagged)]
    pub enum Season {
        S(String)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum SeasonType {
        #[serde(rename = "Regular Season")]
        RegularSeason,
        #[serde(rename = "Pre Season")]
        PreSeason,
        Playoffs,
        #[serde(rename = "All Star")]
        AllStar,
    }

    /// Only-current-season flag for `commonallplayers`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct IsOnlyCurrentSeason(pub bool);

    impl Display for PlayerID {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            match self {
                PlayerID::ID(id) => write!(f, "PlayerID={}", id)
            }
        }
    }

    impl Display for Season {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            match self {
                Season::S(season) => write!(f, "Season={}", season)
            }
        }
    }

    impl Display for LeagueID {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            match self {
                LeagueID::NBA => write!(f, "LeagueID=00")
            }
        }
    }

    impl Display for SeasonType {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "SeasonType={}", self.label().replace(' ', "%20"))
        }
    }

    impl Display for IsOnlyCurrentSeason {
        fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
            write!(f, "IsOnlyCurrentSeason={}", self.0 as u8)
        }
    }

    impl Season {
        /// Season covering the given date. Seasons roll over in October.
        pub fn containing(date: chrono::NaiveDate) -> Self {
            let first_year = if date.month() >= 10 { date.year() } else { date.year() - 1 };
            Season::S(format!("{}-{:02}", first_year, (first_year + 1) % 100))
        }

        pub fn as_str(&self) -> &str {
            match self {
                Season::S(season) => season
            }
        }
    }

    impl SeasonType {
        pub fn label(&self) -> &'static str {
            match self {
                SeasonType::RegularSeason => "Regular Season",
                SeasonType::PreSeason => "Pre Season",
                SeasonType::Playoffs => "Playoffs",
                SeasonType::AllStar => "All Star",
            }
        }
    }

    impl Default for LeagueID {
        fn default() -> Self { LeagueID::NBA }
    }

    impl Default for Season {
        fn default() -> Self {
            Season::containing(chrono::Utc::now().date_naive())
        }
    }

    impl Default for SeasonType {
        fn default() -> Self { SeasonType::RegularSeason }
    }

    impl Default for IsOnlyCurrentSeason {
        fn default() -> Self { IsOnlyCurrentSeason(false) }
    }

    impl Default for PlayerID {
        fn default() -> Self { PlayerID::ID("".to_string()) }
    }
