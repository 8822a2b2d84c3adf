//! Email subject and HTML body for invoice emails.

use std::fmt::Write;

use dunning_domain::invoice::Invoice;

const PLACEHOLDER: &str = "—";

/// Subject used when the caller did not choose one.
#[must_use]
pub fn default_subject(invoice: &Invoice) -> String {
    format!(
        "Invoice #{} – {} – Payment due",
        invoice.id,
        invoice.customer_name()
    )
}

/// Format an amount as `$N.NN`.
///
/// Anything but digits and dots is stripped before parsing. Empty values
/// render as `—`; values that still do not parse are shown as written.
#[must_use]
pub fn format_amount(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match digits.parse::<f64>() {
        Ok(amount) => format!("${amount:.2}"),
        Err(_) => raw.to_string(),
    }
}

/// HTML invoice summary with a link back to the billing app.
#[must_use]
pub fn render_html(invoice: &Invoice, app_url: &str) -> String {
    let id = escape(invoice.id.as_str());
    let customer = escape(invoice.customer_name());
    let amount = escape(&format_amount(invoice.amount.as_deref()));
    let load = escape(or_placeholder(invoice.load_number.as_deref()));
    let reference = escape(or_placeholder(invoice.reference.as_deref()));
    let app_url = escape(app_url);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n");
    let _ = writeln!(
        html,
        "<head><meta charset=\"utf-8\"><title>Invoice #{id}</title></head>"
    );
    html.push_str(
        "<body style=\"font-family: sans-serif; max-width: 600px; margin: 0 auto; padding: 20px;\">\n",
    );
    let _ = writeln!(html, "  <h2>Invoice #{id} – {customer}</h2>");
    html.push_str(
        "  <p>Please find your freight invoice below. You can view details and pay online.</p>\n",
    );
    let _ = writeln!(html, "  <p><strong>Amount due:</strong> {amount}</p>");
    let _ = writeln!(html, "  <p><strong>Load #:</strong> {load}</p>");
    let _ = writeln!(html, "  <p><strong>Reference:</strong> {reference}</p>");
    let _ = writeln!(
        html,
        "  <p><a href=\"{app_url}\" style=\"display: inline-block; background: #22d3ee; color: #0f0f12; padding: 10px 20px; text-decoration: none; border-radius: 8px;\">View invoice &amp; pay online</a></p>"
    );
    html.push_str("  <p style=\"color: #666; font-size: 14px;\">Thank you.</p>\n");
    html.push_str("</body>\n</html>\n");
    html
}

fn or_placeholder(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(PLACEHOLDER)
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
