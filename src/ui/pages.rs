//! Static marketing pages.

use axum::http::StatusCode;
use maud::{html, Markup};

use super::layout::public_page;

const SERVICES: &[(&str, &str)] = &[
    (
        "Event Staffing",
        "Ushers, registration desks and floor crews for conferences, launches and galas.",
    ),
    (
        "Security Personnel",
        "Licensed guards and crowd management for venues of every size.",
    ),
    (
        "General Labor",
        "Setup, teardown and logistics crews that arrive ready to work.",
    ),
    (
        "Technical Support",
        "AV technicians and IT staff for presentations and live events.",
    ),
    (
        "Administrative Staff",
        "Reception, data entry and coordination for offices and field teams.",
    ),
    (
        "Emergency Coverage",
        "Same-day replacements when a shift falls through.",
    ),
];

const STEPS: &[(&str, &str)] = &[
    (
        "Tell us what you need",
        "Request a quote or submit an emergency request with dates, location and headcount.",
    ),
    (
        "We match the team",
        "Our coordinators select vetted staff with the right skills for your event.",
    ),
    (
        "Confirm and plan",
        "You receive a tailored proposal and a single point of contact.",
    ),
    (
        "Staff on site",
        "Your team arrives briefed, on time, and supervised throughout.",
    ),
];

fn hero(title: &str, subtitle: &str) -> Markup {
    html! {
        section class="hero" {
            div class="container" {
                h1 { (title) }
                p class="lead" { (subtitle) }
            }
        }
    }
}

fn card(title: &str, body: &str) -> Markup {
    html! {
        div class="card" {
            h3 { (title) }
            p { (body) }
        }
    }
}

pub async fn home() -> Markup {
    public_page(
        "Home",
        None,
        html! {
            (hero(
                "Professional Staffing, On Demand",
                "Trusted teams for government, corporate and private events, available when you need them.",
            ))
            section class="container" {
                div class="grid" {
                    @for (title, body) in SERVICES.iter().take(3) {
                        (card(title, body))
                    }
                }
                div class="cta" {
                    a class="button button-primary" href="/quote" { "Request a Quote" }
                    a class="button button-danger" href="/emergency" { "Need Staff Now?" }
                }
            }
        },
    )
}

pub async fn services() -> Markup {
    public_page(
        "Services",
        None,
        html! {
            (hero("Our Services", "Flexible staffing across every kind of event and project."))
            section class="container grid" {
                @for (title, body) in SERVICES {
                    (card(title, body))
                }
            }
        },
    )
}

pub async fn how_it_works() -> Markup {
    public_page(
        "How It Works",
        None,
        html! {
            (hero("How It Works", "From request to a staffed event in four steps."))
            section class="container" {
                ol class="steps" {
                    @for (title, body) in STEPS {
                        li {
                            h3 { (title) }
                            p { (body) }
                        }
                    }
                }
            }
        },
    )
}

pub async fn about() -> Markup {
    public_page(
        "About",
        None,
        html! {
            (hero("About Sikati Solutions", "A staffing partner built on reliability."))
            section class="container prose" {
                p {
                    "Sikati Solutions supplies trained, vetted personnel to organisations that "
                    "cannot afford a no-show. We work with public agencies, corporate event teams "
                    "and private hosts, and we answer emergency requests around the clock."
                }
            }
        },
    )
}

pub async fn contact() -> Markup {
    public_page(
        "Contact",
        None,
        html! {
            (hero("Contact Us", "Questions about staffing? Our team is ready to help."))
            section class="container grid" {
                (card("Email", "info@sikatisolutions.com"))
                (card("Phone", "Available 24/7 for emergency requests"))
                div class="card" {
                    h3 { "Ready to start?" }
                    p {
                        a href="/quote" { "Request a quote" }
                        " or "
                        a href="/emergency" { "submit an emergency request" }
                        "."
                    }
                }
            }
        },
    )
}

pub async fn not_found() -> (StatusCode, Markup) {
    (
        StatusCode::NOT_FOUND,
        public_page(
            "Page Not Found",
            None,
            html! {
                section class="container not-found" {
                    h1 { "404" }
                    p { "Oops! Page not found" }
                    a href="/" { "Return to Home" }
                }
            },
        ),
    )
}
