//! Server-rendered prediction form

use insurance_core::{group_thousands, CategoricalField, FeatureSchema, Prediction, RawRecord};

const STYLE: &str = r#"
        body {
            font-family: Arial, sans-serif;
            max-width: 640px;
            margin: 50px auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .container {
            background: white;
            padding: 30px;
            border-radius: 8px;
            box-shadow: 0 2px 4px rgba(0,0,0,0.1);
        }
        h1 {
            color: #333;
            border-bottom: 3px solid #4CAF50;
            padding-bottom: 10px;
        }
        label { display: block; margin-top: 12px; color: #555; }
        input { width: 100%; padding: 6px; box-sizing: border-box; }
        button { margin-top: 18px; padding: 8px 20px; background: #4CAF50; color: white; border: none; border-radius: 4px; }
        .result { margin-top: 20px; font-size: 1.4em; color: #2e7d32; }
        .error { margin-top: 20px; color: #c62828; }
        .note { color: #888; font-size: 0.9em; }
"#;

/// What to show below the form
#[derive(Debug)]
pub enum Outcome<'a> {
    Prediction(&'a Prediction),
    Error(&'a str),
}

/// Render the form, pre-filled with `form`, and an optional outcome
pub fn render_page(schema: &FeatureSchema, form: &RawRecord, outcome: Option<Outcome<'_>>) -> String {
    let mut page = String::with_capacity(4096);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n    <meta charset=\"utf-8\">\n");
    page.push_str("    <title>Insurance Cost Prediction</title>\n    <style>");
    page.push_str(STYLE);
    page.push_str("    </style>\n</head>\n<body>\n<div class=\"container\">\n");
    page.push_str("    <h1>Insurance Cost Prediction</h1>\n");
    page.push_str("    <form method=\"post\" action=\"/predict\">\n");

    page.push_str(&input("age", "Age", "number", form.age.as_deref(), None));
    page.push_str(&input("sex", "Sex", "text", form.sex.as_deref(), Some(CategoricalField::Sex)));
    page.push_str(&input("bmi", "BMI", "text", form.bmi.as_deref(), None));
    page.push_str(&input("children", "Children", "number", form.children.as_deref(), None));
    page.push_str(&input(
        "smoker",
        "Smoker",
        "text",
        form.smoker.as_deref(),
        Some(CategoricalField::Smoker),
    ));
    page.push_str(&input(
        "region",
        "Region",
        "text",
        form.region.as_deref(),
        Some(CategoricalField::Region),
    ));

    for levels in schema.categorical() {
        page.push_str(&format!("        <datalist id=\"{}-options\">", levels.field));
        for level in &levels.levels {
            page.push_str(&format!("<option value=\"{}\">", escape_html(level)));
        }
        page.push_str("</datalist>\n");
    }

    page.push_str("        <button type=\"submit\">Predict</button>\n    </form>\n");

    match outcome {
        Some(Outcome::Prediction(prediction)) => {
            page.push_str(&format!(
                "    <div class=\"result\">Predicted charges: ${}</div>\n",
                group_thousands(&prediction.formatted())
            ));
            for unseen in &prediction.unseen_categories {
                page.push_str(&format!(
                    "    <div class=\"note\">Unrecognised {} \"{}\"; treated as the baseline category.</div>\n",
                    unseen.field,
                    escape_html(&unseen.value)
                ));
            }
        }
        Some(Outcome::Error(message)) => {
            page.push_str(&format!("    <div class=\"error\">{}</div>\n", escape_html(message)));
        }
        None => {}
    }

    page.push_str("</div>\n</body>\n</html>\n");
    page
}

fn input(
    name: &str,
    label: &str,
    kind: &str,
    value: Option<&str>,
    options: Option<CategoricalField>,
) -> String {
    let list = options
        .map(|field| format!(" list=\"{field}-options\""))
        .unwrap_or_default();
    format!(
        "        <label for=\"{name}\">{label}</label>\n        <input id=\"{name}\" name=\"{name}\" type=\"{kind}\" value=\"{}\"{list} required>\n",
        escape_html(value.unwrap_or_default())
    )
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
            _ => escaped.push(ch),
        }
    }
    escaped
}
