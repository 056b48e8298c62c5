use pulldown_cmark::{html, Options, Parser as CmarkParser};

/// Page chrome around a rendered report. `{title}`, `{file_name}` and
/// `{body}` are substituted in that order.
const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - Discovery Report</title>
    <style>
        :root {
            --primary-bg: #0a0f1e;
            --panel-bg: #162030;
            --accent-bg: #2d3f5f;
            --border-color: #2d4560;
            --text-primary: #e8f4fd;
            --text-secondary: #a8c5e6;
            --text-muted: #6a8db3;
            --accent-gold: #ffd700;
            --accent-blue: #4fc3f7;
        }
        body {
            margin: 0;
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: var(--primary-bg);
            color: var(--text-primary);
            line-height: 1.6;
        }
        .container { max-width: 1200px; margin: 0 auto; padding: 20px; }
        .back-btn {
            display: inline-block;
            background: var(--accent-bg);
            color: var(--text-primary);
            padding: 10px 20px;
            border-radius: 8px;
            text-decoration: none;
            margin-bottom: 20px;
            border: 1px solid var(--border-color);
        }
        .header, .content {
            background: var(--panel-bg);
            padding: 20px 30px;
            border-radius: 12px;
            border: 2px solid var(--border-color);
            margin-bottom: 30px;
        }
        .header h1 { color: var(--accent-blue); margin: 0 0 10px 0; }
        .header .meta { color: var(--text-muted); font-size: 14px; }
        .content h1 { color: var(--accent-blue); border-bottom: 3px solid var(--accent-blue); }
        .content h2 { color: var(--accent-gold); border-left: 4px solid var(--accent-gold); padding-left: 15px; }
        .content p, .content li, .content td { color: var(--text-secondary); }
        .content code { background: var(--accent-bg); color: var(--accent-gold); padding: 2px 6px; border-radius: 4px; }
        .content pre { background: var(--accent-bg); padding: 20px; border-radius: 8px; overflow-x: auto; }
        .content pre code { background: none; padding: 0; }
        .content table { width: 100%; border-collapse: collapse; margin: 20px 0; }
        .content th, .content td { padding: 12px 15px; text-align: left; border-bottom: 1px solid var(--border-color); }
        .content th { background: var(--accent-bg); }
        .content a { color: var(--accent-blue); }
        .content img { max-width: 100%; }
    </style>
</head>
<body>
    <div class="container">
        <a href="javascript:history.back()" class="back-btn">&larr; Back to Visualizer</a>
        <div class="header">
            <h1>Discovery Report</h1>
            <div class="meta">Research Analysis &bull; {file_name}</div>
        </div>
        <div class="content">
{body}
        </div>
    </div>
</body>
</html>
"#;

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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

/// `report_TP53_summary.md` -> `Report Tp53 Summary`
pub fn title_from_file_name(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    stem.split(|c: char| c == '_' || c.is_whitespace())
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render markdown to a standalone HTML page.
///
/// Raw HTML inside the report is escaped rather than passed through.
pub fn render_markdown_page(markdown: &str, file_name: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = CmarkParser::new_ext(markdown, options).map(|event| match event {
        pulldown_cmark::Event::Html(raw) | pulldown_cmark::Event::InlineHtml(raw) => {
            pulldown_cmark::Event::Text(raw)
        }
        other => other,
    });

    let mut body = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut body, parser);

    PAGE_TEMPLATE
        .replacen("{title}", &escape_html(&title_from_file_name(file_name)), 1)
        .replacen("{file_name}", &escape_html(file_name), 1)
        .replacen("{body}", &body, 1)
}
