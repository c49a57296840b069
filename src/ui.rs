use crate::day_key::{display_date, start_of_day};
use crate::display::{display, label};
use crate::models::{Choice, EntryRecord};
use crate::trend::Trend;
use chrono::{DateTime, Local};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::fmt::Write;

const CHART_WIDTH: f64 = 560.0;
const CHART_HEIGHT: f64 = 180.0;
const AXIS_GUTTER: f64 = 28.0;
const LABEL_BAND: f64 = 18.0;

/// Everything outside RFC 3986 unreserved characters is encoded in a path segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct IndexView<'a> {
    pub now: &'a DateTime<Local>,
    pub today: Option<&'a EntryRecord>,
    pub entries: &'a [EntryRecord],
    pub trend: &'a Trend,
    pub saved: bool,
    pub seed_enabled: bool,
}

pub fn render_index(view: &IndexView<'_>) -> String {
    fill_slots(INDEX_HTML, |slot| match slot {
        "DATE" => Some(view.now.format("%A, %B %-d, %Y").to_string()),
        "CHOICES" => Some(render_choices(view.today)),
        "CAPTION" => Some(escape_html(
            view.today.map_or("", |entry| entry.caption.as_str()),
        )),
        "TOAST" => Some(if view.saved { TOAST_HTML } else { "" }.to_string()),
        "CHART" => Some(render_chart(view.trend)),
        "ROWS" => Some(render_rows(view.entries)),
        "SEED" => Some(if view.seed_enabled { SEED_HTML } else { "" }.to_string()),
        _ => None,
    })
}

/// Substitutes each `{{NAME}}` slot of `template` in one pass. Inserted text
/// is never scanned again, so user content that looks like a slot stays
/// literal. Unknown slots are left as they are.
fn fill_slots(template: &str, mut value: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let Some(close) = rest[open + 2..].find("}}") else {
            break;
        };
        let name = &rest[open + 2..open + 2 + close];
        out.push_str(&rest[..open]);
        match value(name) {
            Some(filled) => out.push_str(&filled),
            None => out.push_str(&rest[open..open + close + 4]),
        }
        rest = &rest[open + close + 4..];
    }
    out.push_str(rest);
    out
}

fn render_choices(today: Option<&EntryRecord>) -> String {
    let mut html = String::new();
    for choice in Choice::ALL {
        let meta = display(choice);
        let checked = if today.is_some_and(|entry| entry.choice == choice) {
            " checked"
        } else {
            ""
        };
        let _ = write!(
            html,
            r#"<label class="choice {class}"><input type="radio" name="choice" value="{slug}" required{checked} /><span class="symbol">{symbol}</span><span class="label">{label}</span></label>"#,
            class = meta.css_class,
            slug = choice.slug(),
            symbol = meta.symbol,
            label = label(meta.label_key),
        );
    }
    html
}

fn render_rows(entries: &[EntryRecord]) -> String {
    if entries.is_empty() {
        return r#"<p class="empty">No entries yet.</p>"#.to_string();
    }

    let mut html = String::new();
    for entry in entries {
        let meta = display(entry.choice);
        let caption = if entry.caption.is_empty() {
            String::new()
        } else {
            format!(r#"<p class="caption">{}</p>"#, escape_html(&entry.caption))
        };
        let _ = write!(
            html,
            r#"<li class="row"><div><p class="row-date">{date}</p>{caption}</div><span class="symbol {class}" aria-label="{label}">{symbol}</span><form method="post" action="/entries/{key}/delete"><button type="submit" class="delete" title="Delete">×</button></form></li>"#,
            date = display_date(&entry.day_key, &entry.created_at, &Local),
            class = meta.css_class,
            label = label(meta.label_key),
            symbol = meta.symbol,
            key = utf8_percent_encode(&entry.day_key, PATH_SEGMENT),
        );
    }
    format!("<ul class=\"rows\">{html}</ul>")
}

/// Inline SVG line chart of the cumulative trend.
fn render_chart(trend: &Trend) -> String {
    if trend.points.is_empty() {
        return r#"<p class="empty">No data</p>"#.to_string();
    }

    let plot_width = CHART_WIDTH - AXIS_GUTTER;
    let plot_height = CHART_HEIGHT - LABEL_BAND;
    let (low, high) = trend.y_domain();
    let span = (high - low).max(1) as f64;
    let y_of = |value: i64| plot_height - (value - low) as f64 / span * plot_height;

    let count = trend.points.len();
    let domain = trend.x_domain(&Local);
    let x_of = |index: usize| -> f64 {
        let fallback = (index as f64 + 0.5) / count as f64 * plot_width;
        let Some((start, end)) = &domain else {
            return fallback;
        };
        let Some(day) = start_of_day(trend.points[index].date, &Local) else {
            return fallback;
        };
        let total = (end.clone() - start.clone()).num_seconds().max(1) as f64;
        (day - start.clone()).num_seconds() as f64 / total * plot_width
    };

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg viewBox="0 0 {CHART_WIDTH} {CHART_HEIGHT}" role="img" aria-label="7 day trend">"#
    );

    for value in trend.y_axis_values() {
        let y = y_of(value);
        let _ = write!(
            svg,
            r#"<line class="grid" x1="0" x2="{plot_width}" y1="{y:.1}" y2="{y:.1}" /><text class="axis" x="{x:.1}" y="{ty:.1}">{value}</text>"#,
            x = plot_width + 6.0,
            ty = y + 4.0,
        );
    }

    let path: Vec<String> = trend
        .points
        .iter()
        .enumerate()
        .map(|(index, point)| format!("{:.1},{:.1}", x_of(index), y_of(point.value)))
        .collect();
    let _ = write!(svg, r#"<polyline class="line" points="{}" />"#, path.join(" "));

    for (index, point) in trend.points.iter().enumerate() {
        let x = x_of(index);
        let weekday: String = point.date.format("%a").to_string().chars().take(1).collect();
        let _ = write!(
            svg,
            r#"<circle class="dot" cx="{x:.1}" cy="{cy:.1}" r="4"><title>{date}: {value}</title></circle><text class="axis" x="{x:.1}" y="{ly:.1}" text-anchor="middle">{weekday}</text>"#,
            cy = y_of(point.value),
            date = point.date,
            value = point.value,
            ly = CHART_HEIGHT - 4.0,
        );
    }

    svg.push_str("</svg>");
    svg
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

const TOAST_HTML: &str = r#"<div class="toast" role="status">Saved.</div>"#;

const SEED_HTML: &str = r#"<form method="post" action="/settings/seed"><button type="submit" class="ghost">Seed test data</button></form>"#;

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Better Now</title>
  <style>
    :root {
      --bg: #f7f5f0;
      --ink: #26252a;
      --muted: #7a7784;
      --card: #ffffff;
      --accent: #d22edb;
      --down: #e5484d;
      --shadow: 0 18px 40px rgba(38, 37, 42, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: ui-rounded, "SF Pro Rounded", "Trebuchet MS", sans-serif;
      display: grid;
      justify-items: center;
      padding: 32px 18px 48px;
    }

    main {
      width: min(640px, 100%);
      display: grid;
      gap: 24px;
    }

    section {
      background: var(--card);
      border-radius: 12px;
      box-shadow: var(--shadow);
      padding: 20px 24px;
    }

    h1 {
      font-size: 1.1rem;
      margin: 0;
      font-weight: 600;
    }

    h2 {
      font-size: 1rem;
      margin: 0 0 12px;
    }

    .choices {
      display: flex;
      gap: 12px;
      margin: 16px 0;
    }

    .choice {
      flex: 1;
      display: grid;
      justify-items: center;
      gap: 4px;
      padding: 14px 0;
      border-radius: 10px;
      border: 1px solid #e4e1ea;
      cursor: pointer;
    }

    .choice input {
      display: none;
    }

    .choice:has(input:checked) {
      border-color: var(--accent);
      background: rgba(210, 46, 219, 0.08);
    }

    .symbol {
      font-size: 1.4rem;
      font-weight: 600;
    }

    .symbol.up {
      color: var(--accent);
    }

    .symbol.same {
      color: var(--muted);
    }

    .symbol.down {
      color: var(--down);
    }

    .label {
      font-size: 0.8rem;
      color: var(--muted);
    }

    input[type="text"] {
      width: 100%;
      padding: 10px 12px;
      border-radius: 8px;
      border: 1px solid #e4e1ea;
      font: inherit;
    }

    button {
      font: inherit;
      border: 0;
      border-radius: 999px;
      padding: 10px 20px;
      background: var(--ink);
      color: #fff;
      cursor: pointer;
    }

    button.ghost,
    button.delete {
      background: transparent;
      color: var(--muted);
      padding: 4px 10px;
    }

    .actions {
      display: flex;
      justify-content: flex-end;
      margin-top: 14px;
    }

    .toast {
      position: fixed;
      top: 12px;
      left: 50%;
      transform: translateX(-50%);
      padding: 10px 14px;
      border-radius: 999px;
      background: rgba(38, 37, 42, 0.1);
      font-size: 0.85rem;
      animation: fade 1s ease 1s forwards;
    }

    @keyframes fade {
      to {
        opacity: 0;
      }
    }

    svg {
      width: 100%;
      height: auto;
    }

    .grid {
      stroke: rgba(122, 119, 132, 0.2);
    }

    .axis {
      font-size: 10px;
      fill: var(--muted);
    }

    .line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2;
      stroke-linecap: round;
      stroke-linejoin: round;
    }

    .dot {
      fill: var(--accent);
    }

    .rows {
      list-style: none;
      padding: 0;
      margin: 0;
      display: grid;
      gap: 8px;
    }

    .row {
      display: flex;
      align-items: baseline;
      gap: 8px;
      padding: 12px 16px;
      border-radius: 8px;
      background: var(--bg);
    }

    .row > div {
      flex: 1;
    }

    .row p {
      margin: 0;
    }

    .row-date {
      font-weight: 500;
    }

    .caption {
      color: var(--muted);
      font-size: 0.9rem;
      margin-top: 4px;
    }

    .empty {
      color: var(--muted);
      text-align: center;
    }

    .settings {
      display: flex;
      gap: 8px;
      justify-content: flex-end;
    }
  </style>
</head>
<body>
  {{TOAST}}
  <main>
    <section>
      <h1>{{DATE}}</h1>
      <form method="post" action="/entries">
        <div class="choices">{{CHOICES}}</div>
        <input type="text" name="caption" value="{{CAPTION}}" placeholder="Caption (optional)" maxlength="200" />
        <div class="actions"><button type="submit">Save</button></div>
      </form>
    </section>
    <section>
      <h2>Trend</h2>
      {{CHART}}
    </section>
    <section>
      <h2>Log</h2>
      {{ROWS}}
    </section>
    <div class="settings">
      {{SEED}}
      <form method="post" action="/settings/clear" onsubmit="return confirm('Clear all data?');">
        <button type="submit" class="ghost">Clear all data</button>
      </form>
    </div>
  </main>
</body>
</html>
"#;
