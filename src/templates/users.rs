use maud::{Markup, html};

use super::{LINK_CLASS, card, input_field, non_field_errors, submit};
use crate::forms::{EMAIL_HELP, FormErrors};

pub fn register(username: &str, email: &str, errors: &FormErrors) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Register" }
        form class="mt-6 space-y-6" method="post" action="/register/" {
            (non_field_errors(errors))
            (input_field(
                "text",
                "username",
                "Username",
                username,
                Some("Required. 6 to 150 characters. Letters, digits and @/./+/-/_ only."),
                errors,
            ))
            (input_field("email", "email", "Email", email, Some(EMAIL_HELP), errors))
            (input_field("password", "password1", "Password", "", None, errors))
            (input_field(
                "password",
                "password2",
                "Password confirmation",
                "",
                Some("Enter the same password as before, for verification."),
                errors,
            ))
            (submit("Register"))
        }
        p class="mt-6 text-sm text-gray-600" {
            "Already have an account? "
            a class=(LINK_CLASS) href="/login/" { "Log in" }
        }
    })
}

pub fn login(email: &str, next: Option<&str>, errors: &FormErrors) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Log in" }
        form class="mt-6 space-y-6" method="post" action="/login/" {
            (non_field_errors(errors))
            (input_field("email", "username", "Email", email, None, errors))
            (input_field("password", "password", "Password", "", None, errors))
            @if let Some(next) = next {
                input type="hidden" name="next" value=(next);
            }
            (submit("Log in"))
        }
        p class="mt-6 text-sm text-gray-600" {
            "No account yet? "
            a class=(LINK_CLASS) href="/register/" { "Register" }
        }
    })
}

pub fn change_user(username: &str, email: &str, errors: &FormErrors) -> Markup {
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Change your credentials" }
        form class="mt-6 space-y-6" method="post" action="/user/change/" {
            (non_field_errors(errors))
            (input_field("text", "username", "Username", username, None, errors))
            (input_field("email", "email", "Email", email, Some(EMAIL_HELP), errors))
            (submit("Save"))
        }
    })
}

pub fn become_user(next: Option<&str>) -> Markup {
    let login = match next {
        Some(next) => format!("/login/?next={}", urlencoding::encode(next)),
        None => "/login/".to_string(),
    };
    card(html! {
        h1 class="text-2xl font-bold text-gray-900" { "Please log in" }
        p class="mt-4 text-gray-700" { "You need an account to do that." }
        div class="mt-6 flex gap-6" {
            a class=(LINK_CLASS) href=(login) { "Log in" }
            a class=(LINK_CLASS) href="/register/" { "Register" }
        }
    })
}
