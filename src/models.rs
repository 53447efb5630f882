use jiff::civil::Date;
use serde::Serialize;

use crate::entities::{actor, director, genre, movie, rating, review, user};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum Country {
    UnitedStates,
    UnitedKingdom,
    Poland,
    Canada,
    Italy,
    Japan,
    China,
}

impl Country {
    pub const ALL: [Country; 7] = [
        Country::UnitedStates,
        Country::UnitedKingdom,
        Country::Poland,
        Country::Canada,
        Country::Italy,
        Country::Japan,
        Country::China,
    ];

    pub fn as_code(self) -> &'static str {
        match self {
            Country::UnitedStates => "US",
            Country::UnitedKingdom => "UK",
            Country::Poland => "PL",
            Country::Canada => "CA",
            Country::Italy => "IT",
            Country::Japan => "JP",
            Country::China => "CN",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_code() == code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Country::UnitedStates => "United States",
            Country::UnitedKingdom => "United Kingdom",
            Country::Poland => "Poland",
            Country::Canada => "Canada",
            Country::Italy => "Italy",
            Country::Japan => "Japan",
            Country::China => "China",
        }
    }
}

/// Aggregate over all ratings of one movie.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RatingStats {
    pub average: Option<f64>,
    pub count: i64,
}

#[derive(Clone, Debug)]
pub struct MovieCard {
    pub movie: movie::Model,
    pub director: Option<director::Model>,
    pub avg_rating: Option<f64>,
}

#[derive(Clone, Debug)]
pub struct MovieDetail {
    pub movie: movie::Model,
    pub director: Option<director::Model>,
    pub actors: Vec<actor::Model>,
    pub genres: Vec<genre::Model>,
    pub stats: RatingStats,
    pub release_date: Option<Date>,
    /// The viewer's own rating; `None` for anonymous viewers too.
    pub own_rating: Option<rating::Model>,
}

#[derive(Clone, Debug)]
pub struct GenreCount {
    pub genre: genre::Model,
    pub number_of_movies: i64,
}

#[derive(Clone, Debug)]
pub struct ReviewEntry {
    pub review: review::Model,
    pub author: user::Model,
    pub rating: Option<rating::Model>,
}

#[derive(Clone, Debug, Default)]
pub struct SearchResults {
    pub actors: Vec<actor::Model>,
    pub directors: Vec<director::Model>,
    pub movies: Vec<movie::Model>,
}

impl SearchResults {
    pub fn number_of_results(&self) -> usize {
        self.actors.len() + self.directors.len() + self.movies.len()
    }
}

#[derive(Clone, Debug)]
pub struct MovieRow {
    pub movie: movie::Model,
    pub director_name: String,
    pub genres: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_codes_round_trip() {
        for country in Country::ALL {
            assert_eq!(Country::from_code(country.as_code()), Some(country));
        }
        assert_eq!(Country::from_code("GB"), None);
        assert_eq!(Country::from_code("us"), None);
    }
}
