use colored::Colorize;
use serde::Serialize;

use crate::api::{CustomerRecord, PageInfo};
use crate::listing::ListController;
use crate::runner::Frame;
use crate::session::View;
use crate::utils::{json_or_na, text_or_na};

#[derive(Debug, Serialize)]
struct ListingDocument<'a> {
    data: &'a [CustomerRecord],
    meta: Option<&'a PageInfo>,
}

pub fn render_json(list: &ListController) -> Result<String, serde_json::Error> {
    let doc = ListingDocument {
        data: list.records(),
        meta: list.meta(),
    };
    serde_json::to_string_pretty(&doc)
}

fn cell(label: &str, value: &str) -> String {
    format!("{:<12} {:<24}", format!("{label}:").dimmed(), value)
}

fn render_record(out: &mut String, record: &CustomerRecord, expanded: bool) {
    let name = text_or_na(record.name.as_deref());
    out.push_str(&format!("{} {}\n", format!("#{}", record.id).cyan(), name.bold()));

    let verified = record
        .is_verified
        .map(|v| v.to_string())
        .unwrap_or_else(|| text_or_na(None));
    let rows = [
        [
            ("Name", name.clone()),
            ("Phone", text_or_na(record.phone_number.as_deref())),
            ("Gender", text_or_na(record.gender.as_deref())),
        ],
        [
            ("Email", text_or_na(record.email.as_deref())),
            ("Birthdate", text_or_na(record.birthdate.as_deref())),
            ("Nationality", text_or_na(record.nationality.as_deref())),
        ],
        [
            ("Sub", text_or_na(record.sub.as_deref())),
            ("Verified", verified),
            ("Status", text_or_na(record.residence_status.as_deref())),
        ],
    ];
    for row in rows {
        let line: Vec<String> = row.iter().map(|(l, v)| cell(l, v)).collect();
        out.push_str("  ");
        out.push_str(line.join(" ").trim_end());
        out.push('\n');
    }

    let address = record.address.clone().unwrap_or_default();
    out.push_str(&format!(
        "  {} {}  {}  {}\n",
        "Address".dimmed(),
        cell("Region", &text_or_na(address.region.as_deref())).trim_end(),
        cell("Zone", &text_or_na(address.zone.as_deref())).trim_end(),
        cell("Woreda", &text_or_na(address.woreda.as_deref())).trim_end(),
    ));

    if expanded {
        out.push_str(&format!("  {}\n", "▲ Hide Details".blue()));
        if record.user.is_empty() {
            out.push_str(&format!("    {}\n", text_or_na(None)));
        }
        for (key, value) in &record.user {
            out.push_str(&format!("    {:<20} {}\n", key.dimmed(), json_or_na(value)));
        }
    } else {
        out.push_str(&format!("  {}\n", "▼ Show Details".blue()));
    }
}

pub fn summary_line(meta: &PageInfo) -> String {
    format!(
        "Showing {} to {} of {} results",
        meta.from.unwrap_or(0),
        meta.to.unwrap_or(0),
        meta.total
    )
}

/// `Prev 1 [2] 3 Next`, with disabled edges in parentheses.
pub fn pager_line(list: &ListController) -> String {
    let mut parts: Vec<String> = Vec::new();
    parts.push(if list.can_go_prev() {
        "Prev".to_string()
    } else {
        "(Prev)".dimmed().to_string()
    });
    let current = list.filter().page();
    for n in list.page_numbers() {
        if n == current {
            parts.push(format!("[{n}]").green().bold().to_string());
        } else {
            parts.push(n.to_string());
        }
    }
    parts.push(if list.can_go_next() {
        "Next".to_string()
    } else {
        "(Next)".dimmed().to_string()
    });
    parts.join(" ")
}

pub fn render_text(list: &ListController) -> String {
    let mut out = String::new();
    let filter = list.filter();
    out.push_str(&format!(
        "{} phone={:?} name={:?} per-page={}\n",
        "::".dimmed(),
        filter.phone_substring,
        filter.name_substring,
        filter.page_size
    ));
    if let Some(meta) = list.meta() {
        out.push_str(&summary_line(meta));
        out.push('\n');
    }
    out.push('\n');

    if list.is_loading() {
        out.push_str("Loading users...\n");
        return out;
    }
    if list.records().is_empty() {
        out.push_str("No users found.");
        if filter.has_search() {
            out.push_str(" Try different search terms.");
        }
        out.push('\n');
        return out;
    }

    for record in list.records() {
        render_record(&mut out, record, list.is_expanded(record.id));
        out.push('\n');
    }
    if list.meta().is_some() {
        out.push_str(&pager_line(list));
        out.push('\n');
    }
    out
}

pub fn render_frame(frame: &Frame<'_>) -> String {
    let mut out = String::new();
    match frame.view {
        View::Login => {
            out.push_str(&format!("{}\n", "Login to Dashboard".bold()));
            if let Some(notice) = frame.notice {
                out.push_str(&format!("{}\n", notice.red()));
            }
            out.push_str("use: login <email> <password>\n");
        }
        View::Main => {
            out.push_str(&format!("{}\n", "Fayda Users List".bold()));
            if let Some(notice) = frame.notice {
                out.push_str(&format!("{}\n", notice.yellow()));
            }
            out.push_str(&render_text(frame.list));
        }
    }
    out
}
