use maud::{Markup, html};

use super::{
    INPUT_CLASS, LINK_CLASS, card, errors_for, file_field, input_field, non_field_errors,
    post_button, submit,
};
use crate::{
    entities::{actor, director},
    forms::{FormErrors, GENRES_HELP, MovieInput},
    media::media_url,
    models::{Country, MovieRow},
    store::PersonKind,
};

pub fn dashboard(
    query: &str,
    directors: &[director::Model],
    actors: &[actor::Model],
    movies: &[MovieRow],
) -> Markup {
    html! {
        div class="flex items-center justify-between gap-6" {
            h1 class="text-3xl font-bold text-gray-900" { "Administration" }
            form method="get" action="/admin/" {
                input class="rounded-md border border-gray-300 px-3 py-1" type="search" name="q"
                    value=(query) placeholder="Filter";
            }
        }

        (section_header("Directors", "/admin/directors/new/", "Add director"))
        (people_table(
            PersonKind::Director,
            directors.iter().map(|d| (d.id, &d.name, &d.slugged_name, &d.photo)),
        ))

        (section_header("Actors", "/admin/actors/new/", "Add actor"))
        (people_table(
            PersonKind::Actor,
            actors.iter().map(|a| (a.id, &a.name, &a.slugged_name, &a.photo)),
        ))

        (section_header("Movies", "/admin/movies/new/", "Add movie"))
        table class="mt-4 w-full bg-white shadow rounded-lg text-sm" {
            thead class="text-left text-gray-500" {
                tr {
                    th class="p-3" { "Title" }
                    th class="p-3" { "Slug" }
                    th class="p-3" { "Release date" }
                    th class="p-3" { "Country" }
                    th class="p-3" { "Director" }
                    th class="p-3" { "Poster" }
                    th class="p-3" { "Genres" }
                    th class="p-3" {}
                }
            }
            tbody {
                @for row in movies {
                    tr class="border-t" {
                        td class="p-3" { (row.movie.title) }
                        td class="p-3" { (row.movie.slug) }
                        td class="p-3" { (row.movie.release_date) }
                        td class="p-3" { (row.movie.country) }
                        td class="p-3" { (row.director_name) }
                        td class="p-3" { (thumbnail(&row.movie.poster, &row.movie.title)) }
                        td class="p-3" { (row.genres.join(", ")) }
                        td class="p-3" {
                            (post_button(&format!("/admin/movies/{}/delete/", row.movie.id), "Delete"))
                        }
                    }
                }
            }
        }
    }
}

fn section_header(title: &str, new_href: &str, new_label: &str) -> Markup {
    html! {
        div class="mt-10 flex items-center justify-between" {
            h2 class="text-xl font-semibold text-gray-900" { (title) }
            a class=(LINK_CLASS) href=(new_href) { (new_label) }
        }
    }
}

fn people_table<'a>(
    kind: PersonKind,
    rows: impl Iterator<Item = (i32, &'a String, &'a String, &'a String)>,
) -> Markup {
    html! {
        table class="mt-4 w-full bg-white shadow rounded-lg text-sm" {
            thead class="text-left text-gray-500" {
                tr {
                    th class="p-3" { "Name" }
                    th class="p-3" { "Slug" }
                    th class="p-3" { "Photo" }
                    th class="p-3" {}
                }
            }
            tbody {
                @for (id, name, slug, photo) in rows {
                    tr class="border-t" {
                        td class="p-3" { (name) }
                        td class="p-3" { (slug) }
                        td class="p-3" { (thumbnail(photo, name)) }
                        td class="p-3" {
                            (post_button(&format!("/admin/{}/{id}/delete/", kind.path()), "Delete"))
                        }
                    }
                }
            }
        }
    }
}

fn thumbnail(path: &str, alt: &str) -> Markup {
    html! {
        @if !path.is_empty() {
            img class="h-12 w-12 object-cover rounded" src=(media_url(path)) alt=(alt);
        }
    }
}

pub fn person_form(kind: PersonKind, name: &str, errors: &FormErrors) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Add " (kind.label().to_lowercase()) }
        form class="mt-6 space-y-6" method="post" action={ "/admin/" (kind.path()) "/new/" }
            enctype="multipart/form-data" {
            (non_field_errors(errors))
            (input_field("text", "name", "Name", name, None, errors))
            (file_field("photo", "Photo", errors))
            (submit("Save"))
        }
    })
}

pub fn movie_form(
    input: &MovieInput,
    directors: &[director::Model],
    actors: &[actor::Model],
    errors: &FormErrors,
) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Add movie" }
        form class="mt-6 space-y-6" method="post" action="/admin/movies/new/"
            enctype="multipart/form-data" {
            (non_field_errors(errors))
            (input_field("text", "title", "Title", &input.title, None, errors))
            div {
                label class="block text-sm font-medium text-gray-700" for="synopsis" { "Synopsis" }
                textarea class=(INPUT_CLASS) name="synopsis" id="synopsis" rows="6" { (input.synopsis) }
                (errors_for(errors, "synopsis"))
            }
            (input_field("date", "release_date", "Release date", &input.release_date, None, errors))
            div {
                label class="block text-sm font-medium text-gray-700" for="country" { "Country" }
                select class=(INPUT_CLASS) name="country" id="country" {
                    option value="" { "---------" }
                    @for country in Country::ALL {
                        option value=(country.as_code()) selected[input.country == country.as_code()] {
                            (country.label())
                        }
                    }
                }
                (errors_for(errors, "country"))
            }
            (file_field("poster", "Poster", errors))
            div {
                label class="block text-sm font-medium text-gray-700" for="director" { "Director" }
                select class=(INPUT_CLASS) name="director" id="director" {
                    option value="" { "---------" }
                    @for director in directors {
                        @let id = director.id.to_string();
                        option value=(id) selected[input.director == id] { (director.name) }
                    }
                }
                (errors_for(errors, "director"))
            }
            div {
                label class="block text-sm font-medium text-gray-700" for="actors" { "Actors" }
                select class=(INPUT_CLASS) name="actors" id="actors" multiple {
                    @for actor in actors {
                        @let id = actor.id.to_string();
                        option value=(id) selected[input.actors.contains(&id)] { (actor.name) }
                    }
                }
                (errors_for(errors, "actors"))
            }
            (input_field("text", "genres", "Genres", &input.genres, Some(GENRES_HELP), errors))
            (submit("Save"))
        }
    })
}
