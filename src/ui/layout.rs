//! Page chrome shared by the public site and the back-office.

use chrono::{Datelike, Utc};
use maud::{html, Markup, DOCTYPE};

use crate::guard::{ADMIN_ROUTE, HOME_ROUTE};
use crate::models::User;

const HTMX_SRC: &str = "https://unpkg.com/htmx.org@2.0.3";

/// Swap every response, including 4xx/5xx, so validation and error pages
/// render in place on boosted forms.
const HTMX_CONFIG: &str = r#"{"responseHandling":[{"code":"204","swap":false},{"code":"...","swap":true}]}"#;

const NAV_LINKS: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/services", "Services"),
    ("/how-it-works", "How It Works"),
    ("/about", "About"),
    ("/contact", "Contact"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// User-visible confirmation or failure message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: message.into(),
        }
    }
}

pub fn notice(notice: &Notice) -> Markup {
    let class = match notice.kind {
        NoticeKind::Success => "notice notice-success",
        NoticeKind::Error => "notice notice-error",
    };
    let role = match notice.kind {
        NoticeKind::Success => "status",
        NoticeKind::Error => "alert",
    };
    html! {
        div class=(class) role=(role) {
            strong { (notice.title) }
            " "
            span { (notice.message) }
        }
    }
}

pub fn base(title: &str, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                meta name="htmx-config" content=(HTMX_CONFIG);
                title { (title) " | Sikati Solutions" }
                link rel="stylesheet" href="/assets/site.css";
                script src=(HTMX_SRC) defer {}
            }
            body hx-boost="true" {
                (body)
            }
        }
    }
}

/// Public marketing page with site header and footer.
pub fn public_page(title: &str, flash: Option<&Notice>, content: Markup) -> Markup {
    base(
        title,
        html! {
            (site_header())
            main class="site-main" {
                @if let Some(n) = flash {
                    div class="container" { (notice(n)) }
                }
                (content)
            }
            (site_footer())
        },
    )
}

fn site_header() -> Markup {
    html! {
        header class="site-header" {
            div class="container nav" {
                a class="brand" href=(HOME_ROUTE) { "Sikati Solutions" }
                nav {
                    @for (href, label) in NAV_LINKS {
                        a href=(href) { (label) }
                    }
                }
                div class="nav-actions" {
                    a class="button button-outline" href="/quote" { "Get Quote" }
                    a class="button button-danger" href="/emergency" { "Emergency Staffing" }
                }
            }
        }
    }
}

fn site_footer() -> Markup {
    html! {
        footer class="site-footer" {
            div class="container" {
                p { "Reliable staffing for government, corporate and private events." }
                p class="muted" {
                    "© " (Utc::now().year()) " Sikati Solutions. All rights reserved."
                }
            }
        }
    }
}

/// Back-office page with the admin sidebar.
pub fn admin_page(title: &str, user: &User, flash: Option<&Notice>, content: Markup) -> Markup {
    base(
        title,
        html! {
            div class="admin" {
                aside class="admin-sidebar" {
                    a class="brand" href=(ADMIN_ROUTE) { "Sikati Admin" }
                    nav {
                        a href=(ADMIN_ROUTE) { "Dashboard" }
                        a href=(HOME_ROUTE) hx-boost="false" { "View Site" }
                    }
                    div class="admin-user" {
                        span { (user.display_name()) }
                        span class="badge" { (user.role.as_str()) }
                    }
                    form method="post" action="/logout" hx-disabled-elt="find button" {
                        button class="button button-outline" type="submit" {
                            span class="when-idle" { "Log out" }
                            span class="when-busy" { "Logging out…" }
                        }
                    }
                }
                main class="admin-main" {
                    @if let Some(n) = flash {
                        (notice(n))
                    }
                    (content)
                }
            }
        },
    )
}

/// Human date for ISO `YYYY-MM-DD` strings; anything else is shown as-is.
pub fn display_date(value: &str) -> String {
    chrono::NaiveDate::parse_from_str(value, crate::forms::DATE_FORMAT)
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_markup() {
        let html = notice(&Notice::error("Submission failed", "Try again <later>")).into_string();
        assert!(html.contains("notice-error"));
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("Try again &lt;later&gt;"));
    }

    #[test]
    fn test_public_page_has_nav_and_htmx() {
        let html = public_page("Home", None, html! { p { "hello" } }).into_string();
        assert!(html.contains("<title>Home | Sikati Solutions</title>"));
        assert!(html.contains("href=\"/how-it-works\""));
        assert!(html.contains("htmx.org"));
        assert!(html.contains("hello"));
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2025-06-01"), "Jun 1, 2025");
        assert_eq!(display_date("next week"), "next week");
    }
}
