use std::collections::BTreeMap;

use jiff::civil::Date;
use serde::Deserialize;

use crate::{models::Country, slug::slugify};

pub const REQUIRED: &str = "This field is required.";
pub const REVIEW_TOO_SHORT: &str = "Your review is too short.";
pub const USERNAME_TOO_SHORT: &str = "Username cannot be shorter than 6 characters.";
pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const EMAIL_TAKEN: &str = "User with this Email already exists.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn’t match.";
pub const INVALID_LOGIN: &str =
    "Please enter a correct email and password. Note that both fields may be case-sensitive.";
pub const EMAIL_HELP: &str = "Required. Enter a valid email address.";
pub const GENRES_HELP: &str = "A comma-separated list of genres.";

pub const RATING_CHOICES: std::ops::RangeInclusive<i16> = 0..=10;
pub const MIN_REVIEW_LENGTH: usize = 11;
pub const MIN_USERNAME_LENGTH: usize = 6;
pub const MAX_USERNAME_LENGTH: usize = 150;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_NAME_LENGTH: usize = 200;

/// Field name -> messages. `NON_FIELD` collects errors not tied to one input.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub const NON_FIELD: &'static str = "__all__";

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.add(field, message);
        errors
    }

    fn finish<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RatingInput {
    pub rating: Option<String>,
}

impl RatingInput {
    /// Accepts only the enumerated values 0 through 10; nothing is clamped.
    pub fn validate(&self) -> Result<i16, FormErrors> {
        let raw = self.rating.as_deref().unwrap_or_default();
        if raw.is_empty() {
            return Err(FormErrors::single("rating", REQUIRED));
        }
        match raw.parse::<i16>() {
            Ok(value) if RATING_CHOICES.contains(&value) => Ok(value),
            _ => Err(FormErrors::single(
                "rating",
                format!("Select a valid choice. {raw} is not one of the available choices."),
            )),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ReviewInput {
    pub content: Option<String>,
}

impl ReviewInput {
    /// Length is counted in characters on the raw submission.
    pub fn validate(&self) -> Result<String, FormErrors> {
        let content = self.content.clone().unwrap_or_default();
        if content.is_empty() {
            return Err(FormErrors::single("content", REQUIRED));
        }
        if content.chars().count() < MIN_REVIEW_LENGTH {
            return Err(FormErrors::single("content", REVIEW_TOO_SHORT));
        }
        Ok(content)
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password1: String,
    pub password2: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    /// Field-level checks only; uniqueness is checked against the store.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();
        let username = check_username(&self.username, &mut errors);
        let email = check_email(&self.email, &mut errors);

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }
        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", PASSWORD_MISMATCH);
            } else {
                check_password_strength(&self.password2, &mut errors);
            }
        }

        errors.finish(Registration { username, email, password: self.password1.clone() })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    /// Labelled "Email" on the page.
    pub username: String,
    pub password: String,
    pub next: Option<String>,
}

impl LoginInput {
    /// Returns the lowercased email and the password.
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();
        let email = self.username.trim().to_lowercase();
        if email.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors.finish((email, self.password.clone()))
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChangeUserInput {
    pub username: String,
    pub email: String,
}

impl ChangeUserInput {
    pub fn validate(&self) -> Result<(String, String), FormErrors> {
        let mut errors = FormErrors::default();
        let username = check_username(&self.username, &mut errors);
        let email = check_email(&self.email, &mut errors);
        errors.finish((username, email))
    }
}

fn check_username(raw: &str, errors: &mut FormErrors) -> String {
    let username = raw.trim().to_string();
    if username.is_empty() {
        errors.add("username", REQUIRED);
        return username;
    }
    let length = username.chars().count();
    if length > MAX_USERNAME_LENGTH {
        errors.add(
            "username",
            format!(
                "Ensure this value has at most {MAX_USERNAME_LENGTH} characters (it has {length})."
            ),
        );
    }
    if !username.chars().all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
    }
    if length < MIN_USERNAME_LENGTH {
        errors.add("username", USERNAME_TOO_SHORT);
    }
    username
}

fn check_email(raw: &str, errors: &mut FormErrors) -> String {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        errors.add("email", REQUIRED);
    } else if !is_valid_email(&email) {
        errors.add("email", "Enter a valid email address.");
    }
    email
}

fn check_password_strength(password: &str, errors: &mut FormErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            "password2",
            format!(
                "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
            ),
        );
    }
    if password.chars().all(|c| c.is_ascii_digit()) {
        errors.add("password2", "This password is entirely numeric.");
    }
}

pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

/// Only same-site absolute paths are followed after login.
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    local.then(|| next.to_string())
}

/// A display name plus the slug derived from it.
#[derive(Clone, Debug, PartialEq)]
pub struct NamedDraft {
    pub name: String,
    pub slug: String,
}

pub fn validate_name(field: &'static str, raw: &str, errors: &mut FormErrors) -> NamedDraft {
    let name = raw.trim().to_string();
    let slug = slugify(&name);
    if name.is_empty() {
        errors.add(field, REQUIRED);
    } else if name.chars().count() > MAX_NAME_LENGTH {
        errors.add(
            field,
            format!(
                "Ensure this value has at most {MAX_NAME_LENGTH} characters (it has {}).",
                name.chars().count()
            ),
        );
    } else if slug.is_empty() {
        errors.add(field, "Enter a value containing letters or digits.");
    }
    NamedDraft { name, slug }
}

#[derive(Clone, Debug, Default)]
pub struct MovieInput {
    pub title: String,
    pub synopsis: String,
    pub release_date: String,
    pub country: String,
    pub director: String,
    pub actors: Vec<String>,
    pub genres: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MovieDraft {
    pub title: NamedDraft,
    pub synopsis: String,
    pub release_date: Date,
    pub country: Country,
    pub director_id: i32,
    pub actor_ids: Vec<i32>,
    pub genres: Vec<NamedDraft>,
}

impl MovieInput {
    /// Checks field shapes; existence of referenced rows is the store's job.
    pub fn validate(&self, errors: &mut FormErrors) -> Option<MovieDraft> {
        let title = validate_name("title", &self.title, errors);

        if self.synopsis.trim().is_empty() {
            errors.add("synopsis", REQUIRED);
        }

        let release_date = match self.release_date.trim() {
            "" => {
                errors.add("release_date", REQUIRED);
                None
            },
            raw => match raw.parse::<Date>() {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("release_date", "Enter a valid date.");
                    None
                },
            },
        };

        let country = match self.country.trim() {
            "" => {
                errors.add("country", REQUIRED);
                None
            },
            code => {
                let country = Country::from_code(code);
                if country.is_none() {
                    errors.add(
                        "country",
                        format!("Select a valid choice. {code} is not one of the available choices."),
                    );
                }
                country
            },
        };

        let director_id = match self.director.trim() {
            "" => {
                errors.add("director", REQUIRED);
                None
            },
            raw => {
                let id = raw.parse::<i32>().ok();
                if id.is_none() {
                    errors.add("director", "Select a valid choice.");
                }
                id
            },
        };

        let mut actor_ids = Vec::with_capacity(self.actors.len());
        for raw in &self.actors {
            match raw.trim().parse::<i32>() {
                Ok(id) if !actor_ids.contains(&id) => actor_ids.push(id),
                Ok(_) => {},
                Err(_) => errors.add("actors", format!("“{raw}” is not a valid value.")),
            }
        }

        let mut genres = Vec::new();
        for tag in parse_tags(&self.genres) {
            let slug = slugify(&tag);
            if slug.is_empty() {
                errors.add("genres", format!("“{tag}” is not a valid genre."));
            } else if !genres.iter().any(|g: &NamedDraft| g.slug == slug) {
                genres.push(NamedDraft { name: tag, slug });
            }
        }

        if !errors.is_empty() {
            return None;
        }

        Some(MovieDraft {
            title,
            synopsis: self.synopsis.clone(),
            release_date: release_date?,
            country: country?,
            director_id: director_id?,
            actor_ids,
            genres,
        })
    }
}

/// Splits a tag list on commas, or on whitespace when there are no commas.
/// Tags are trimmed, de-duplicated and sorted.
pub fn parse_tags(raw: &str) -> Vec<String> {
    let parts: Vec<&str> =
        if raw.contains(',') { raw.split(',').collect() } else { raw.split_whitespace().collect() };

    let mut tags: Vec<String> = parts
        .into_iter()
        .map(|t| t.trim().trim_matches('"').trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(value: &str) -> RatingInput {
        RatingInput { rating: Some(value.to_string()) }
    }

    #[test]
    fn rating_accepts_enumerated_values() {
        assert_eq!(rating("0").validate(), Ok(0));
        assert_eq!(rating("10").validate(), Ok(10));
    }

    #[test]
    fn rating_rejects_values_outside_choices() {
        for raw in ["-1", "11", "7.5", "nine"] {
            let errors = rating(raw).validate().unwrap_err();
            assert_eq!(
                errors.get("rating"),
                [format!("Select a valid choice. {raw} is not one of the available choices.")]
            );
        }
    }

    #[test]
    fn rating_requires_a_value() {
        let errors = RatingInput::default().validate().unwrap_err();
        assert_eq!(errors.get("rating"), [REQUIRED]);
        assert_eq!(rating("").validate().unwrap_err().get("rating"), [REQUIRED]);
    }

    #[test]
    fn review_length_is_counted_raw() {
        let short = ReviewInput { content: Some("ten chars!".to_string()) };
        assert_eq!(short.validate().unwrap_err().get("content"), [REVIEW_TOO_SHORT]);

        let padded = ReviewInput { content: Some("    ok     ".to_string()) };
        assert!(padded.validate().is_ok());

        let accented = ReviewInput { content: Some("ééééééééééé".to_string()) };
        assert!(accented.validate().is_ok());

        let empty = ReviewInput { content: Some(String::new()) };
        assert_eq!(empty.validate().unwrap_err().get("content"), [REQUIRED]);
    }

    #[test]
    fn registration_checks_username_and_passwords() {
        let input = RegisterInput {
            username: "u".into(),
            email: "user12@gmail.com".into(),
            password1: "34password34".into(),
            password2: "34password34".into(),
        };
        let errors = input.validate().unwrap_err();
        assert!(errors.get("username").contains(&USERNAME_TOO_SHORT.to_string()));

        let input = RegisterInput {
            username: "user12".into(),
            email: "User12@Gmail.com".into(),
            password1: "34password34".into(),
            password2: "34password35".into(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("password2"), [PASSWORD_MISMATCH]);

        let input = RegisterInput {
            username: "user12".into(),
            email: "User12@Gmail.com".into(),
            password1: "34password34".into(),
            password2: "34password34".into(),
        };
        let ok = input.validate().unwrap();
        assert_eq!(ok.email, "user12@gmail.com");
    }

    #[test]
    fn registration_rejects_weak_passwords() {
        let input = RegisterInput {
            username: "user12".into(),
            email: "user12@gmail.com".into(),
            password1: "1234".into(),
            password2: "1234".into(),
        };
        let errors = input.validate().unwrap_err();
        assert_eq!(errors.get("password2").len(), 2);
    }

    #[test]
    fn login_lowercases_email() {
        let input = LoginInput {
            username: " SomeOne@Gmail.com ".into(),
            password: "pw".into(),
            next: None,
        };
        assert_eq!(input.validate().unwrap().0, "someone@gmail.com");
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("valid@gmail.com"));
        assert!(!is_valid_email("invalid"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@c.com"));
    }

    #[test]
    fn next_must_be_local() {
        assert_eq!(safe_next(Some("/movies/1/rate/")), Some("/movies/1/rate/".to_string()));
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn tags_split_on_commas_then_whitespace() {
        assert_eq!(parse_tags("drama, thriller,drama"), ["drama", "thriller"]);
        assert_eq!(parse_tags("crime drama"), ["crime", "drama"]);
        assert_eq!(parse_tags("science fiction, drama"), ["drama", "science fiction"]);
        assert!(parse_tags("  ").is_empty());
    }

    #[test]
    fn movie_input_collects_all_errors() {
        let mut errors = FormErrors::default();
        let input = MovieInput {
            title: String::new(),
            synopsis: "x".into(),
            release_date: "1999-13-40".into(),
            country: "GB".into(),
            director: "abc".into(),
            actors: vec![],
            genres: String::new(),
        };
        assert!(input.validate(&mut errors).is_none());
        assert!(errors.has("title"));
        assert!(errors.has("release_date"));
        assert!(errors.has("country"));
        assert!(errors.has("director"));
        assert!(!errors.has("synopsis"));
    }

    #[test]
    fn movie_input_builds_draft() {
        let mut errors = FormErrors::default();
        let input = MovieInput {
            title: "Fight Club".into(),
            synopsis: "An insomniac office worker...".into(),
            release_date: "1999-10-15".into(),
            country: "US".into(),
            director: "1".into(),
            actors: vec!["2".into(), "3".into(), "2".into()],
            genres: "Drama, Thriller".into(),
        };
        let draft = input.validate(&mut errors).unwrap();
        assert_eq!(draft.title.slug, "fight-club");
        assert_eq!(draft.actor_ids, [2, 3]);
        assert_eq!(draft.genres.len(), 2);
        assert_eq!(draft.genres[0].slug, "drama");
        assert_eq!(draft.country, Country::UnitedStates);
    }
}
