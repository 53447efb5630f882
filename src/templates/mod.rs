pub mod admin;
pub mod catalog;
pub mod users;

use maud::{DOCTYPE, Markup, html};

use crate::{
    ctx::{Level, Notice},
    entities::user,
    forms::FormErrors,
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT_CLASS: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON_CLASS: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";
const DANGER_BUTTON_CLASS: &str =
    "rounded-md bg-red-600 px-3 py-1 text-sm font-semibold text-white hover:bg-red-700";
const LINK_CLASS: &str = "text-blue-600 hover:text-blue-800";

pub fn movie_href(slug: &str) -> String {
    format!("/movies/{slug}/")
}

pub fn reviews_href(movie_id: i32) -> String {
    format!("/movies/{movie_id}/reviews/")
}

pub fn genre_href(slug: &str) -> String {
    format!("/genres/{slug}/")
}

pub fn director_href(slug: &str) -> String {
    format!("/directors/{slug}/")
}

pub fn actor_href(slug: &str) -> String {
    format!("/actors/{slug}/")
}

pub fn page(title: &str, user: Option<&user::Model>, notices: &[Notice], body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · Cinedex" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (navbar(user))
                main class="max-w-4xl mx-auto px-6 py-10" {
                    @if !notices.is_empty() {
                        ul id="messages" class="mb-6 space-y-2" {
                            @for notice in notices {
                                li class=(notice_class(notice.level)) { (notice.text) }
                            }
                        }
                    }
                    (body)
                }
            }
        }
    }
    .into_string()
}

pub fn error_page(title: &str, message: &str) -> String {
    page(
        title,
        None,
        &[],
        html! {
            div class="bg-white shadow rounded-lg p-8" {
                h1 class="text-2xl font-bold text-gray-900" { (title) }
                p class="mt-4 text-gray-700" { (message) }
                a class={ "mt-6 inline-block " (LINK_CLASS) } href="/" { "Back" }
            }
        },
    )
}

fn navbar(user: Option<&user::Model>) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-4xl mx-auto px-6 py-4 flex items-center justify-between gap-6" {
                a class="text-xl font-bold text-gray-900" href="/" { "Cinedex" }
                form class="flex-1" method="get" action="/search/" {
                    input class="w-full rounded-md border border-gray-300 px-3 py-1" type="search"
                        name="q" placeholder="Search movies, directors, actors";
                }
                div class="flex items-center gap-4 text-sm" {
                    @match user {
                        Some(user) => {
                            @if user.is_staff {
                                a class=(LINK_CLASS) href="/admin/" { "Admin" }
                            }
                            a class=(LINK_CLASS) href="/user/change/" { (user.username) }
                            a class=(LINK_CLASS) href="/logout" { "Log out" }
                        },
                        None => {
                            a class=(LINK_CLASS) href="/login/" { "Log in" }
                            a class=(LINK_CLASS) href="/register/" { "Register" }
                        },
                    }
                }
            }
        }
    }
}

fn notice_class(level: Level) -> &'static str {
    match level {
        Level::Info => "rounded-md bg-blue-50 px-4 py-2 text-blue-800",
        Level::Success => "rounded-md bg-green-50 px-4 py-2 text-green-800",
        Level::Warning => "rounded-md bg-yellow-50 px-4 py-2 text-yellow-800",
        Level::Error => "rounded-md bg-red-50 px-4 py-2 text-red-800",
    }
}

fn card(inner: Markup) -> Markup {
    html! {
        div class="bg-white shadow rounded-lg p-8" { (inner) }
    }
}

fn errors_for(errors: &FormErrors, field: &str) -> Markup {
    html! {
        @for message in errors.get(field) {
            p class="mt-1 text-sm text-red-600 errorlist" { (message) }
        }
    }
}

fn non_field_errors(errors: &FormErrors) -> Markup {
    errors_for(errors, FormErrors::NON_FIELD)
}

fn input_field(
    kind: &str,
    name: &str,
    label: &str,
    value: &str,
    help: Option<&str>,
    errors: &FormErrors,
) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type=(kind) name=(name) id=(name) value=(value);
            @if let Some(help) = help {
                p class="mt-1 text-xs text-gray-500" { (help) }
            }
            (errors_for(errors, name))
        }
    }
}

fn file_field(name: &str, label: &str, errors: &FormErrors) -> Markup {
    html! {
        div {
            label class="block text-sm font-medium text-gray-700" for=(name) { (label) }
            input class=(INPUT_CLASS) type="file" accept="image/*" name=(name) id=(name);
            (errors_for(errors, name))
        }
    }
}

fn submit(label: &str) -> Markup {
    html! {
        button class={ "w-full " (BUTTON_CLASS) } type="submit" { (label) }
    }
}

/// A one-button POST form.
fn post_button(action: &str, label: &str) -> Markup {
    html! {
        form class="inline" method="post" action=(action) {
            button class=(DANGER_BUTTON_CLASS) type="submit" { (label) }
        }
    }
}

fn format_rating(average: Option<f64>) -> String {
    match average {
        Some(avg) => format!("{avg:.1}"),
        None => "No ratings yet".to_string(),
    }
}
