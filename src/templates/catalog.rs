use maud::{Markup, html};

use super::{
    BUTTON_CLASS, INPUT_CLASS, LINK_CLASS, actor_href, card, director_href, errors_for,
    format_rating, genre_href, movie_href, post_button, reviews_href, submit,
};
use crate::{
    entities::{genre, movie, rating},
    forms::{FormErrors, RATING_CHOICES},
    media::media_url,
    models::{Country, GenreCount, MovieCard, MovieDetail, ReviewEntry, SearchResults},
    store::PersonKind,
};

pub fn index(genres: &[GenreCount]) -> Markup {
    html! {
        h1 class="text-3xl font-bold text-gray-900" { "Genres" }
        @if genres.is_empty() {
            p class="mt-6 text-gray-600" { "No movies in the catalog yet." }
        } @else {
            ul class="mt-6 grid grid-cols-2 gap-4" {
                @for entry in genres {
                    li class="bg-white shadow rounded-lg p-4" {
                        a class=(LINK_CLASS) href=(genre_href(&entry.genre.slug)) {
                            (entry.genre.name)
                        }
                        span class="ml-2 text-sm text-gray-500" { "(" (entry.number_of_movies) ")" }
                    }
                }
            }
        }
    }
}

pub fn movies_by_genre(genre: &genre::Model, movies: &[MovieCard]) -> Markup {
    html! {
        h1 class="text-3xl font-bold text-gray-900" { (genre.name) }
        (movie_cards(movies))
    }
}

pub fn person_page(kind: PersonKind, name: &str, photo: &str, movies: &[MovieCard]) -> Markup {
    html! {
        div class="flex items-center gap-6" {
            @if !photo.is_empty() {
                img class="h-32 w-32 rounded-lg object-cover" src=(media_url(photo)) alt=(name);
            }
            div {
                p class="text-sm uppercase text-gray-500" { (kind.label()) }
                h1 class="text-3xl font-bold text-gray-900" { (name) }
            }
        }
        (movie_cards(movies))
    }
}

fn movie_cards(movies: &[MovieCard]) -> Markup {
    html! {
        @if movies.is_empty() {
            p class="mt-6 text-gray-600" { "No movies found." }
        } @else {
            div class="mt-6 space-y-4" {
                @for card in movies {
                    div class="bg-white shadow rounded-lg p-6 flex gap-6" {
                        @if !card.movie.poster.is_empty() {
                            img class="h-24 w-16 object-cover" src=(media_url(&card.movie.poster))
                                alt=(card.movie.title);
                        }
                        div {
                            a class="text-xl font-semibold text-gray-900 hover:text-blue-700"
                                href=(movie_href(&card.movie.slug)) { (card.movie.title) }
                            @if let Some(director) = &card.director {
                                p class="mt-1 text-gray-600" {
                                    "Directed by "
                                    a class=(LINK_CLASS) href=(director_href(&director.slugged_name)) {
                                        (director.name)
                                    }
                                }
                            }
                            p class="mt-1 text-sm text-gray-500" {
                                "Average rating: " (format_rating(card.avg_rating))
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn movie_detail(detail: &MovieDetail, signed_in: bool) -> Markup {
    let movie = &detail.movie;
    let country = Country::from_code(&movie.country).map(Country::label).unwrap_or("Unknown");
    html! {
        div class="bg-white shadow rounded-lg p-8" {
            div class="flex gap-8" {
                @if !movie.poster.is_empty() {
                    img class="h-64 w-44 object-cover" src=(media_url(&movie.poster)) alt=(movie.title);
                }
                div class="flex-1" {
                    h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                    p class="mt-2 text-gray-600" {
                        @if let Some(date) = detail.release_date {
                            (date.strftime("%B %-d, %Y").to_string()) " · "
                        }
                        (country)
                    }
                    @if let Some(director) = &detail.director {
                        p class="mt-2" {
                            "Directed by "
                            a class=(LINK_CLASS) href=(director_href(&director.slugged_name)) {
                                (director.name)
                            }
                        }
                    }
                    @if !detail.genres.is_empty() {
                        p class="mt-2 flex flex-wrap gap-2" {
                            @for genre in &detail.genres {
                                a class="rounded-full bg-gray-100 px-3 py-1 text-sm text-gray-700"
                                    href=(genre_href(&genre.slug)) { (genre.name) }
                            }
                        }
                    }
                    p class="mt-4 text-gray-700 whitespace-pre-line" { (movie.synopsis) }
                }
            }

            @if !detail.actors.is_empty() {
                h2 class="mt-8 text-xl font-semibold text-gray-900" { "Cast" }
                ul class="mt-2 flex flex-wrap gap-4" {
                    @for actor in &detail.actors {
                        li {
                            a class=(LINK_CLASS) href=(actor_href(&actor.slugged_name)) { (actor.name) }
                        }
                    }
                }
            }

            div class="mt-8 border-t pt-6" {
                p { "Average rating: " strong { (format_rating(detail.stats.average)) } }
                p class="text-sm text-gray-500" { "Number of ratings: " (detail.stats.count) }
                div class="mt-4 flex items-center gap-4" {
                    @if let Some(own) = &detail.own_rating {
                        span { "Your rating: " strong { (own.rating) } }
                        a class=(LINK_CLASS) href={ "/movies/" (movie.id) "/rate/update/" } {
                            "Update rating"
                        }
                        (post_button(&format!("/movies/{}/rate/delete/", movie.id), "Delete rating"))
                    } @else if signed_in {
                        a class=(LINK_CLASS) href={ "/movies/" (movie.id) "/rate/" } {
                            "Rate this movie"
                        }
                    } @else {
                        a class=(LINK_CLASS) href={ "/movies/" (movie.id) "/rate/" } {
                            "Log in to rate this movie"
                        }
                    }
                    a class=(LINK_CLASS) href=(reviews_href(movie.id)) { "Reviews" }
                }
            }
        }
    }
}

pub fn review_list(
    movie: &movie::Model,
    entries: &[ReviewEntry],
    user_has_review: bool,
    signed_in: bool,
) -> Markup {
    html! {
        div class="flex items-start justify-between gap-6" {
            div {
                h1 class="text-3xl font-bold text-gray-900" { "Reviews" }
                a class=(LINK_CLASS) href=(movie_href(&movie.slug)) { (movie.title) }
            }
            @if user_has_review {
                div class="flex items-center gap-4" {
                    a class=(LINK_CLASS) href={ "/movies/" (movie.id) "/reviews/detail/" } {
                        "Edit your review"
                    }
                    (post_button(&format!("/movies/{}/reviews/delete/", movie.id), "Delete review"))
                }
            } @else if signed_in {
                a class=(BUTTON_CLASS) href={ "/movies/" (movie.id) "/review/" } { "Write a review" }
            } @else {
                a class=(LINK_CLASS) href={ "/movies/" (movie.id) "/review/" } {
                    "Log in to write a review"
                }
            }
        }

        @if entries.is_empty() {
            p class="mt-6 text-gray-600" { "No reviews yet." }
        } @else {
            div class="mt-6 space-y-4" {
                @for entry in entries {
                    article class="bg-white shadow rounded-lg p-6" {
                        div class="flex items-center justify-between text-sm text-gray-500" {
                            span class="font-semibold text-gray-900" { (entry.author.username) }
                            span {
                                @match &entry.rating {
                                    Some(rating) => { "Rated " (rating.rating) "/10" },
                                    None => { "Not rated" },
                                }
                                " · " (timestamp_label(entry.review.published))
                                @if entry.review.updated != entry.review.published {
                                    " (edited)"
                                }
                            }
                        }
                        p class="mt-3 text-gray-700 whitespace-pre-line" { (entry.review.content) }
                    }
                }
            }
        }
    }
}

fn timestamp_label(seconds: i64) -> String {
    jiff::Timestamp::from_second(seconds)
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}

pub fn empty_search() -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Search" }
        p class="mt-4 text-gray-600" { "Type something to search for movies, directors and actors." }
    })
}

pub fn search_results(query: &str, results: &SearchResults) -> Markup {
    html! {
        h1 class="text-3xl font-bold text-gray-900" { "Results for “" (query) "”" }
        p class="mt-2 text-gray-600" { "Found " (results.number_of_results()) " results." }

        section class="mt-8" {
            h2 class="text-xl font-semibold text-gray-900" { "Movies" }
            ul class="mt-2 space-y-1" {
                @for movie in &results.movies {
                    li { a class=(LINK_CLASS) href=(movie_href(&movie.slug)) { (movie.title) } }
                }
            }
        }
        section class="mt-8" {
            h2 class="text-xl font-semibold text-gray-900" { "Directors" }
            ul class="mt-2 space-y-1" {
                @for director in &results.directors {
                    li {
                        a class=(LINK_CLASS) href=(director_href(&director.slugged_name)) {
                            (director.name)
                        }
                    }
                }
            }
        }
        section class="mt-8" {
            h2 class="text-xl font-semibold text-gray-900" { "Actors" }
            ul class="mt-2 space-y-1" {
                @for actor in &results.actors {
                    li { a class=(LINK_CLASS) href=(actor_href(&actor.slugged_name)) { (actor.name) } }
                }
            }
        }
    }
}

/// Create and update share the same form; only the wording and target differ.
pub struct RatingForm<'a> {
    pub heading: &'a str,
    pub action: String,
    pub selected: &'a str,
    pub errors: &'a FormErrors,
}

pub fn rating_form(movie: &movie::Model, form: RatingForm<'_>) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { (form.heading) }
        p class="mt-1 text-gray-600" { (movie.title) }
        form class="mt-6 space-y-6" method="post" action=(form.action) {
            div {
                label class="block text-sm font-medium text-gray-700" for="rating" { "Rating" }
                select class=(INPUT_CLASS) name="rating" id="rating" {
                    option value="" selected[form.selected.is_empty()] { "---------" }
                    @for value in RATING_CHOICES {
                        @let raw = value.to_string();
                        option value=(raw) selected[raw == form.selected] { (raw) }
                    }
                }
                (errors_for(form.errors, "rating"))
            }
            (submit("Save"))
        }
    })
}

pub struct ReviewForm<'a> {
    pub heading: &'a str,
    pub action: String,
    pub content: &'a str,
    pub own_rating: Option<&'a rating::Model>,
    pub errors: &'a FormErrors,
}

pub fn review_form(movie: &movie::Model, form: ReviewForm<'_>) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { (form.heading) }
        p class="mt-1 text-gray-600" { (movie.title) }
        @if let Some(own) = form.own_rating {
            p class="mt-2 text-sm text-gray-500" { "Your rating: " (own.rating) "/10" }
        }
        form class="mt-6 space-y-6" method="post" action=(form.action) {
            div {
                label class="block text-sm font-medium text-gray-700" for="content" { "Content" }
                textarea class=(INPUT_CLASS) name="content" id="content" rows="8" { (form.content) }
                (errors_for(form.errors, "content"))
            }
            (submit("Publish"))
        }
    })
}
