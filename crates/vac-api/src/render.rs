//! Server-rendered HTML pages.
//!
//! The UI is a handful of small forms and one calendar table, so pages are
//! built as strings around a shared layout instead of pulling in a template
//! engine. Every interpolated user value goes through [`escape`].

use std::fmt::Write as _;

use time::{Date, Month};

use vac_core::calendar::Week;
use vac_core::color::user_color;
use vac_model::{Booking, SlotKind, User, format_date};

use crate::flash::Flash;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 0; background: #f5f6f8; color: #1c2330; }
nav { background: #243447; color: #fff; padding: 0.6rem 1rem; display: flex; gap: 1rem; align-items: baseline; }
nav a { color: #cdd9e5; text-decoration: none; }
nav a:hover { color: #fff; }
nav .who { margin-left: auto; font-size: 0.9rem; color: #9fb0c3; }
main { max-width: 64rem; margin: 1.5rem auto; padding: 0 1rem; }
.flash-error { background: #fbe3e4; border: 1px solid #d12f19; padding: 0.5rem 0.8rem; margin: 0.4rem 0; border-radius: 4px; }
.flash-success { background: #e6f4e6; border: 1px solid #2d8632; padding: 0.5rem 0.8rem; margin: 0.4rem 0; border-radius: 4px; }
form.card { background: #fff; border: 1px solid #d8dee7; border-radius: 6px; padding: 1rem; max-width: 26rem; }
form.card label { display: block; margin: 0.6rem 0 0.2rem; font-size: 0.9rem; }
form.card input, form.card select, form.card textarea { width: 100%; box-sizing: border-box; padding: 0.4rem; }
button { margin-top: 0.8rem; padding: 0.45rem 1rem; background: #2d6cdf; color: #fff; border: 0; border-radius: 4px; cursor: pointer; }
button.danger { background: #c0392b; }
table.calendar { border-collapse: collapse; width: 100%; background: #fff; }
table.calendar th, table.calendar td { border: 1px solid #d8dee7; vertical-align: top; width: 14.28%; height: 5.5rem; padding: 0.25rem; }
table.calendar td.empty { background: #eef1f5; }
table.calendar .day-num { font-size: 0.8rem; color: #66738a; }
table.calendar td.today .day-num { font-weight: bold; color: #2d6cdf; }
.entry { display: block; border-radius: 3px; padding: 0.1rem 0.3rem; margin: 0.15rem 0; font-size: 0.78rem; color: #fff; }
.month-nav { display: flex; align-items: baseline; gap: 1rem; margin: 0.5rem 0 1rem; }
.month-nav h2 { margin: 0; }
table.list { border-collapse: collapse; width: 100%; background: #fff; }
table.list th, table.list td { border: 1px solid #d8dee7; padding: 0.4rem 0.6rem; text-align: left; }
form.inline { display: inline; }
form.inline button { margin: 0; padding: 0.2rem 0.6rem; font-size: 0.8rem; }
"#;

/// Minimal HTML escaping for text nodes and attribute values.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn flashes_html(flashes: &[Flash]) -> String {
    let mut out = String::new();
    for flash in flashes {
        let _ = write!(
            out,
            r#"<div class="{}">{}</div>"#,
            flash.level.css_class(),
            escape(&flash.message)
        );
    }
    out
}

/// Wrap a page body in the shared chrome. `viewer` is `None` on the
/// pre-login pages, which get no navigation bar.
pub fn layout(title: &str, viewer: Option<(&str, bool)>, flashes: &[Flash], body: &str) -> String {
    let nav = match viewer {
        Some((username, is_admin)) => {
            let admin_links = if is_admin {
                r#"<a href="/admin/users">Users</a><a href="/admin/entra">SSO</a>"#
            } else {
                ""
            };
            format!(
                concat!(
                    r#"<nav><strong>Vacation</strong>"#,
                    r#"<a href="/calendar">Calendar</a>"#,
                    r#"<a href="/overview">Overview</a>"#,
                    r#"<a href="/change-password">Password</a>"#,
                    "{admin_links}",
                    r#"<span class="who">{username}</span>"#,
                    r#"<form class="inline" method="post" action="/logout"><button>Log out</button></form>"#,
                    r#"</nav>"#,
                ),
                admin_links = admin_links,
                username = escape(username),
            )
        }
        None => String::new(),
    };
    format!(
        concat!(
            "<!doctype html><html><head><meta charset=\"utf-8\">",
            "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
            "<title>{title} - Vacation</title><style>{style}</style></head>",
            "<body>{nav}<main>{flashes}{body}</main></body></html>",
        ),
        title = escape(title),
        style = STYLE,
        nav = nav,
        flashes = flashes_html(flashes),
        body = body,
    )
}

pub fn login_page(flashes: &[Flash], sso_ready: bool) -> String {
    let sso = if sso_ready {
        r#"<p><a href="/login/sso">Sign in with Microsoft</a></p>"#
    } else {
        ""
    };
    let body = format!(
        concat!(
            "<h1>Sign in</h1>",
            r#"<form class="card" method="post" action="/login">"#,
            r#"<label for="username">Username</label>"#,
            r#"<input id="username" name="username" autofocus required>"#,
            r#"<label for="password">Password</label>"#,
            r#"<input id="password" name="password" type="password" required>"#,
            "<button>Sign in</button></form>",
            "{sso}",
            r#"<p><a href="/register">Create an account</a></p>"#,
        ),
        sso = sso,
    );
    layout("Sign in", None, flashes, &body)
}

pub fn register_page(flashes: &[Flash], token_required: bool) -> String {
    let token_field = if token_required {
        concat!(
            r#"<label for="token">Registration token</label>"#,
            r#"<input id="token" name="token" required>"#,
        )
    } else {
        ""
    };
    let body = format!(
        concat!(
            "<h1>Create account</h1>",
            r#"<form class="card" method="post" action="/register">"#,
            r#"<label for="username">Username</label>"#,
            r#"<input id="username" name="username" autofocus required>"#,
            r#"<label for="password">Password</label>"#,
            r#"<input id="password" name="password" type="password" required>"#,
            r#"<label for="confirm">Confirm password</label>"#,
            r#"<input id="confirm" name="confirm" type="password" required>"#,
            "{token_field}",
            "<button>Create</button></form>",
            r#"<p><a href="/login">Back to sign in</a></p>"#,
        ),
        token_field = token_field,
    );
    layout("Create account", None, flashes, &body)
}

pub fn change_password_page(flashes: &[Flash], viewer: (&str, bool)) -> String {
    let body = concat!(
        "<h1>Change password</h1>",
        r#"<form class="card" method="post" action="/change-password">"#,
        r#"<label for="current">Current password</label>"#,
        r#"<input id="current" name="current" type="password" required>"#,
        r#"<label for="new">New password</label>"#,
        r#"<input id="new" name="new" type="password" required>"#,
        r#"<label for="confirm">Confirm new password</label>"#,
        r#"<input id="confirm" name="confirm" type="password" required>"#,
        "<button>Change</button></form>",
    );
    layout("Change password", Some(viewer), flashes, body)
}

fn slot_suffix(slot: SlotKind) -> &'static str {
    match slot {
        SlotKind::Full => "",
        SlotKind::Am => " (AM)",
        SlotKind::Pm => " (PM)",
    }
}

fn slot_options(selected: SlotKind) -> String {
    let mut out = String::new();
    for (kind, label) in [
        (SlotKind::Full, "Full day"),
        (SlotKind::Am, "Morning (AM)"),
        (SlotKind::Pm, "Afternoon (PM)"),
    ] {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            kind.as_str(),
            if kind == selected { " selected" } else { "" },
            label,
        );
    }
    out
}

/// Data the calendar page is rendered from.
pub struct CalendarView<'a> {
    pub year: i32,
    pub month: Month,
    pub today: Date,
    pub weeks: &'a [Week],
    /// All users, shown in the "book for" select when the viewer is admin.
    pub users: &'a [User],
    /// Bookings overlapping the shown month, for the list under the grid.
    pub month_bookings: &'a [Booking],
    /// Echoed back into the form when a submission was rejected.
    pub draft: Option<BookingDraft<'a>>,
}

/// Submitted booking-form values, kept so a rejected form does not lose
/// what the user typed.
#[derive(Clone, Copy)]
pub struct BookingDraft<'a> {
    pub for_user: &'a str,
    pub start_date: &'a str,
    pub end_date: &'a str,
    pub slot: SlotKind,
    pub comment: &'a str,
}

fn month_title(year: i32, month: Month) -> String {
    format!("{month} {year}")
}

/// Date-picker default: today when the shown month contains it, otherwise
/// the first of the shown month.
fn default_booking_date(view: &CalendarView<'_>) -> String {
    if view.today.year() == view.year && view.today.month() == view.month {
        return format_date(view.today);
    }
    Date::from_calendar_date(view.year, view.month, 1)
        .map(format_date)
        .unwrap_or_default()
}

pub fn calendar_page(view: &CalendarView<'_>, viewer: (&str, bool), flashes: &[Flash]) -> String {
    let (viewer_name, is_admin) = viewer;
    let (py, pm) = vac_core::calendar::prev_month(view.year, view.month);
    let (ny, nm) = vac_core::calendar::next_month(view.year, view.month);

    let default_date = default_booking_date(view);
    let (start_value, end_value, comment_value, slot_selected, selected_user) = match view.draft {
        Some(draft) => (
            draft.start_date.to_string(),
            draft.end_date.to_string(),
            draft.comment.to_string(),
            draft.slot,
            if draft.for_user.is_empty() { viewer_name } else { draft.for_user },
        ),
        None => (
            default_date.clone(),
            default_date,
            String::new(),
            SlotKind::Full,
            viewer_name,
        ),
    };

    let mut grid = String::from(concat!(
        r#"<table class="calendar"><tr>"#,
        "<th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th><th>Sun</th></tr>",
    ));
    for week in view.weeks {
        grid.push_str("<tr>");
        for cell in week {
            match cell {
                None => grid.push_str(r#"<td class="empty"></td>"#),
                Some(day) => {
                    let cls = if day.date == view.today { "today" } else { "" };
                    let _ = write!(
                        grid,
                        r#"<td class="{cls}"><span class="day-num">{}</span>"#,
                        day.date.day(),
                        cls = cls,
                    );
                    for entry in &day.entries {
                        let title = entry
                            .comment
                            .as_deref()
                            .map(|c| format!(r#" title="{}""#, escape(c)))
                            .unwrap_or_default();
                        let _ = write!(
                            grid,
                            r#"<span class="entry" style="background:{}"{title}>{}{}</span>"#,
                            user_color(&entry.username),
                            escape(&entry.username),
                            slot_suffix(entry.slot),
                            title = title,
                        );
                    }
                    grid.push_str("</td>");
                }
            }
        }
        grid.push_str("</tr>");
    }
    grid.push_str("</table>");

    let for_user = if is_admin {
        let mut options = String::new();
        for user in view.users {
            let _ = write!(
                options,
                r#"<option value="{name}"{sel}>{name}</option>"#,
                name = escape(&user.username),
                sel = if user.username == selected_user { " selected" } else { "" },
            );
        }
        format!(
            concat!(
                r#"<label for="for_user">Book for</label>"#,
                r#"<select id="for_user" name="for_user">{options}</select>"#,
            ),
            options = options,
        )
    } else {
        String::new()
    };

    // Bookings the viewer may act on, with edit/delete returning to this
    // month.
    let mut month_rows = String::new();
    for booking in view.month_bookings {
        if !is_admin && booking.username != viewer_name {
            continue;
        }
        let _ = write!(
            month_rows,
            concat!(
                "<tr><td>{user}</td><td>{range}</td><td>{comment}</td><td>",
                r#"<a href="/booking/{id}/edit">edit</a> "#,
                r#"<form class="inline" method="post" action="/booking/{id}/delete">"#,
                r#"<input type="hidden" name="year" value="{year}">"#,
                r#"<input type="hidden" name="month" value="{month_num}">"#,
                r#"<button class="danger">delete</button></form></td></tr>"#,
            ),
            user = escape(&booking.username),
            range = booking_range_label(booking),
            comment = escape(booking.comment.as_deref().unwrap_or("")),
            id = booking.id,
            year = view.year,
            month_num = view.month as u8,
        );
    }
    let month_list = if month_rows.is_empty() {
        String::new()
    } else {
        format!(
            concat!(
                "<h2>Bookings this month</h2>",
                r#"<table class="list">"#,
                "<tr><th>User</th><th>Dates</th><th>Comment</th><th></th></tr>",
                "{rows}</table>",
            ),
            rows = month_rows,
        )
    };

    let body = format!(
        concat!(
            r#"<div class="month-nav">"#,
            r#"<a href="/calendar?year={py}&month={pmn}">&laquo; prev</a>"#,
            "<h2>{title}</h2>",
            r#"<a href="/calendar?year={ny}&month={nmn}">next &raquo;</a>"#,
            "</div>",
            "{grid}",
            "<h2>New booking</h2>",
            r#"<form class="card" method="post" action="/calendar">"#,
            r#"<input type="hidden" name="year" value="{year}">"#,
            r#"<input type="hidden" name="month" value="{month_num}">"#,
            "{for_user}",
            r#"<label for="start_date">From</label>"#,
            r#"<input id="start_date" name="start_date" type="date" value="{start}" required>"#,
            r#"<label for="end_date">To</label>"#,
            r#"<input id="end_date" name="end_date" type="date" value="{end}" required>"#,
            r#"<label for="slot">Slot</label>"#,
            r#"<select id="slot" name="slot">{slots}</select>"#,
            r#"<label for="comment">Comment</label>"#,
            r#"<input id="comment" name="comment" maxlength="200" value="{comment}">"#,
            "<button>Book</button></form>",
            "{month_list}",
        ),
        py = py,
        pmn = pm as u8,
        ny = ny,
        nmn = nm as u8,
        title = month_title(view.year, view.month),
        grid = grid,
        year = view.year,
        month_num = view.month as u8,
        for_user = for_user,
        start = escape(&start_value),
        end = escape(&end_value),
        comment = escape(&comment_value),
        slots = slot_options(slot_selected),
        month_list = month_list,
    );
    layout(&month_title(view.year, view.month), Some(viewer), flashes, &body)
}

fn booking_range_label(booking: &Booking) -> String {
    let mut label = format!(
        "{} to {}",
        format_date(booking.start_date),
        format_date(booking.end_date)
    );
    label.push_str(slot_suffix(booking.slot));
    label
}

pub fn edit_booking_page(booking: &Booking, viewer: (&str, bool), flashes: &[Flash]) -> String {
    let body = format!(
        concat!(
            "<h1>Edit booking</h1>",
            "<p>{who}: {range}</p>",
            r#"<form class="card" method="post" action="/booking/{id}/edit">"#,
            r#"<label for="start_date">From</label>"#,
            r#"<input id="start_date" name="start_date" type="date" value="{start}" required>"#,
            r#"<label for="end_date">To</label>"#,
            r#"<input id="end_date" name="end_date" type="date" value="{end}" required>"#,
            r#"<label for="slot">Slot</label>"#,
            r#"<select id="slot" name="slot">{slots}</select>"#,
            r#"<label for="comment">Comment</label>"#,
            r#"<input id="comment" name="comment" maxlength="200" value="{comment}">"#,
            "<button>Save</button></form>",
            r#"<p><a href="/overview">Back to overview</a></p>"#,
        ),
        who = escape(&booking.username),
        range = booking_range_label(booking),
        id = booking.id,
        start = format_date(booking.start_date),
        end = format_date(booking.end_date),
        slots = slot_options(booking.slot),
        comment = escape(booking.comment.as_deref().unwrap_or("")),
    );
    layout("Edit booking", Some(viewer), flashes, &body)
}

/// Bookings list. Admins see everyone's rows; the owner column is shown
/// either way so an admin's own rows read the same.
pub fn overview_page(bookings: &[Booking], viewer: (&str, bool), flashes: &[Flash]) -> String {
    let (viewer_name, is_admin) = viewer;
    let mut rows = String::new();
    for booking in bookings {
        let editable = is_admin || booking.username == viewer_name;
        let actions = if editable {
            format!(
                concat!(
                    r#"<a href="/booking/{id}/edit">edit</a> "#,
                    r#"<form class="inline" method="post" action="/booking/{id}/delete">"#,
                    r#"<button class="danger">delete</button></form>"#,
                ),
                id = booking.id,
            )
        } else {
            String::new()
        };
        let edited = booking
            .edited_at
            .as_deref()
            .map(|at| format!("edited {}", escape(at)))
            .unwrap_or_default();
        let _ = write!(
            rows,
            concat!(
                "<tr><td>{user}</td><td>{range}</td><td>{comment}</td>",
                "<td>{created}{edited}</td><td>{actions}</td></tr>",
            ),
            user = escape(&booking.username),
            range = booking_range_label(booking),
            comment = escape(booking.comment.as_deref().unwrap_or("")),
            created = escape(&booking.created_at),
            edited = edited,
            actions = actions,
        );
    }
    let body = format!(
        concat!(
            "<h1>Bookings</h1>",
            r#"<table class="list">"#,
            "<tr><th>User</th><th>Dates</th><th>Comment</th><th>Created</th><th></th></tr>",
            "{rows}</table>",
        ),
        rows = rows,
    );
    layout("Bookings", Some(viewer), flashes, &body)
}

pub fn admin_users_page(users: &[User], viewer: (&str, bool), flashes: &[Flash]) -> String {
    let (viewer_name, _) = viewer;
    let mut rows = String::new();
    for user in users {
        let name = escape(&user.username);
        let (action, toggle_label) = if user.is_admin {
            ("revoke", "Revoke admin")
        } else {
            ("grant", "Make admin")
        };
        let delete = if user.username == viewer_name {
            String::new()
        } else {
            format!(
                r#"<a href="/admin/users/{name}/delete">delete</a>"#,
                name = name,
            )
        };
        let _ = write!(
            rows,
            concat!(
                "<tr><td>{name}</td><td>{admin}</td><td>{created}</td><td>",
                r#"<form class="inline" method="post" action="/admin/users/{name}/admin">"#,
                r#"<input type="hidden" name="action" value="{action}">"#,
                "<button>{toggle}</button></form> ",
                r#"<a href="/admin/users/{name}/password">set password</a> "#,
                "{delete}</td></tr>",
            ),
            name = name,
            admin = if user.is_admin { "admin" } else { "" },
            created = escape(&user.created_at),
            action = action,
            toggle = toggle_label,
            delete = delete,
        );
    }
    let body = format!(
        concat!(
            "<h1>Users</h1>",
            r#"<table class="list">"#,
            "<tr><th>Username</th><th>Role</th><th>Created</th><th></th></tr>",
            "{rows}</table>",
        ),
        rows = rows,
    );
    layout("Users", Some(viewer), flashes, &body)
}

pub fn admin_password_page(username: &str, viewer: (&str, bool), flashes: &[Flash]) -> String {
    let body = format!(
        concat!(
            "<h1>Set password for {name}</h1>",
            r#"<form class="card" method="post" action="/admin/users/{name}/password">"#,
            r#"<label for="new">New password</label>"#,
            r#"<input id="new" name="new" type="password" required>"#,
            r#"<label for="confirm">Confirm password</label>"#,
            r#"<input id="confirm" name="confirm" type="password" required>"#,
            "<button>Set password</button></form>",
        ),
        name = escape(username),
    );
    layout("Set password", Some(viewer), flashes, &body)
}

pub fn admin_delete_page(username: &str, viewer: (&str, bool), flashes: &[Flash]) -> String {
    let body = format!(
        concat!(
            "<h1>Delete {name}</h1>",
            "<p>This removes the account and all of its bookings. ",
            "Type <strong>delete</strong> to confirm.</p>",
            r#"<form class="card" method="post" action="/admin/users/{name}/delete">"#,
            r#"<label for="confirm">Confirmation</label>"#,
            r#"<input id="confirm" name="confirm" autofocus required>"#,
            r#"<button class="danger">Delete account</button></form>"#,
        ),
        name = escape(username),
    );
    layout("Delete user", Some(viewer), flashes, &body)
}

pub fn admin_entra_page(
    settings: &vac_model::EntraSettings,
    viewer: (&str, bool),
    flashes: &[Flash],
) -> String {
    let secret_hint = if settings.client_secret.as_deref().is_some_and(|s| !s.is_empty()) {
        "A secret is stored; leave blank to keep it."
    } else {
        "No secret stored."
    };
    let body = format!(
        concat!(
            "<h1>Entra ID single sign-on</h1>",
            r#"<form class="card" method="post" action="/admin/entra">"#,
            r#"<label for="enabled"><input id="enabled" name="enabled" type="checkbox" value="1"{enabled}> Enabled</label>"#,
            r#"<label for="tenant_id">Tenant ID</label>"#,
            r#"<input id="tenant_id" name="tenant_id" value="{tenant}">"#,
            r#"<label for="client_id">Client ID</label>"#,
            r#"<input id="client_id" name="client_id" value="{client}">"#,
            r#"<label for="client_secret">Client secret</label>"#,
            r#"<input id="client_secret" name="client_secret" type="password">"#,
            "<p>{secret_hint}</p>",
            r#"<label for="registration_token">Registration token</label>"#,
            r#"<input id="registration_token" name="registration_token" value="{token}">"#,
            "<button>Save</button></form>",
        ),
        enabled = if settings.enabled { " checked" } else { "" },
        tenant = escape(settings.tenant_id.as_deref().unwrap_or("")),
        client = escape(settings.client_id.as_deref().unwrap_or("")),
        secret_hint = secret_hint,
        token = escape(settings.registration_token.as_deref().unwrap_or("")),
    );
    layout("Single sign-on", Some(viewer), flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(
            escape(r#"<b a="1">&'x'"#),
            "&lt;b a=&quot;1&quot;&gt;&amp;&#39;x&#39;"
        );
    }

    #[test]
    fn login_page_offers_sso_only_when_ready() {
        assert!(login_page(&[], true).contains("/login/sso"));
        assert!(!login_page(&[], false).contains("/login/sso"));
    }

    #[test]
    fn flashes_are_rendered_escaped() {
        let page = login_page(&[Flash::error("<script>")], false);
        assert!(page.contains("flash-error"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(!page.contains("<script>"));
    }

    #[test]
    fn overview_hides_actions_on_foreign_rows() {
        let booking = Booking {
            id: vac_model::BookingId(7),
            username: "bob".into(),
            start_date: Date::from_calendar_date(2026, Month::March, 2).unwrap(),
            end_date: Date::from_calendar_date(2026, Month::March, 4).unwrap(),
            comment: None,
            slot: SlotKind::Full,
            created_at: "2026-02-01 09:00:00".into(),
            edited_at: None,
        };
        let own = overview_page(std::slice::from_ref(&booking), ("bob", false), &[]);
        assert!(own.contains("/booking/7/edit"));
        let foreign = overview_page(std::slice::from_ref(&booking), ("alice", false), &[]);
        assert!(!foreign.contains("/booking/7/edit"));
        let admin = overview_page(std::slice::from_ref(&booking), ("alice", true), &[]);
        assert!(admin.contains("/booking/7/delete"));
    }
}
