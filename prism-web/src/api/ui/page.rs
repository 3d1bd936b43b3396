//! HTML rendering for the calculator page
//!
//! The page is assembled with `format!` into one string: shell header,
//! form, optional notice, optional result, then the static footer. The
//! shell and footer never depend on the request.

use prism_model::plot::escape;
use prism_model::Race;

use super::form::FormValues;
use super::Outcome;

pub const TITLE: &str = "Predicting the prevalence of preserved ratio impaired spirometry";

const INTRO: &str = "This tool estimates the probability of PRISm (Preserved Ratio Impaired \
Spirometry) based on demographic and dietary input. The model was trained on U.S. adults aged \
20–79 years. It is intended for educational and research use only, not for clinical \
decision-making.";

const RESULT_NOTE: &str =
    "Note: The model was trained on adults aged 20–79 years and is not intended for clinical use.";

const RACE_LABEL: &str = "Race (Mexican American = 1, Other Hispanic = 2, Non-Hispanic White = 3, \
Non-Hispanic Black = 4, Other race = 5)";

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            color: #262730;
            max-width: 1000px;
            margin: 0 auto;
            padding: 20px;
            line-height: 1.6;
        }
        h1 { text-align: center; }
        .intro { text-align: center; font-size: 16px; }
        form {
            border: 1px solid #e6e6e6;
            border-radius: 8px;
            padding: 20px;
            margin: 20px 0;
        }
        label { display: block; margin-top: 12px; font-size: 14px; }
        input, select { width: 100%; padding: 8px; font-size: 14px; }
        .buttons { margin-top: 16px; }
        button { padding: 8px 16px; margin-right: 8px; font-size: 14px; cursor: pointer; }
        .notice {
            background: #fdecea;
            border: 1px solid #f5c2c0;
            color: #8a1c1c;
            padding: 10px 14px;
            border-radius: 6px;
        }
        .result p { text-align: center; }
        .result .headline { font-size: 20px; font-weight: bold; }
        .result .note { font-size: 14px; color: gray; }
        .plot { overflow-x: auto; }
        footer { font-size: 14px; }
        .build-info { color: #888; font-family: 'Courier New', monospace; font-size: 12px; }
"#;

/// Render the full page.
///
/// `form` fills the inputs, `outcome` adds the result section and
/// `notice` adds an error message above it.
pub fn render(form: &FormValues, outcome: Option<&Outcome>, notice: Option<&str>) -> String {
    let notice_html = notice
        .map(|text| format!(r#"<div class="notice" role="alert">{}</div>"#, escape(text)))
        .unwrap_or_default();
    let result_html = outcome.map(result_section).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>the prevalence of preserved ratio impaired spirometry</title>
    <style>{style}</style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p class="intro">{intro}</p>
    </header>
{form}
{notice}
{result}
    <hr>
{footer}
</body>
</html>
"#,
        style = STYLE,
        title = TITLE,
        intro = INTRO,
        form = form_section(form),
        notice = notice_html,
        result = result_html,
        footer = footer(),
    )
}

fn form_section(values: &FormValues) -> String {
    let selected = values.selected_race();
    let options: String = Race::ALL
        .iter()
        .map(|&race| {
            format!(
                r#"<option value="{code}"{selected} title="{label}">{code}</option>"#,
                code = race.code(),
                selected = if selected == Some(race) { " selected" } else { "" },
                label = race.label(),
            )
        })
        .collect();

    format!(
        r#"    <form method="post" action="/">
        <label for="race">{race_label}</label>
        <select id="race" name="RACE">{options}</select>
        <label for="bmi">BMI (kg/m^2)</label>
        <input id="bmi" name="BMI" type="number" step="any" value="{bmi}">
        <label for="age">Age (years)</label>
        <input id="age" name="AGE" type="number" step="any" value="{age}">
        <label for="c4_0">dietary C4:0 fatty acid intake (g/day)</label>
        <input id="c4_0" name="C4_0" type="number" step="any" value="{c4_0}">
        <div class="buttons">
            <button type="submit" name="action" value="submit">Submit</button>
            <button type="submit" name="action" value="reset">Reset</button>
        </div>
    </form>"#,
        race_label = RACE_LABEL,
        options = options,
        bmi = escape(&values.bmi),
        age = escape(&values.age),
        c4_0 = escape(&values.c4_0),
    )
}

fn result_section(outcome: &Outcome) -> String {
    format!(
        r#"    <section class="result">
        <p class="headline">The model predicts the prevalence of preserved ratio impaired spirometry is {percentage}</p>
        <p class="note">{note}</p>
        <div class="plot">
{plot}        </div>
    </section>"#,
        percentage = outcome.prediction.percentage_text(),
        note = RESULT_NOTE,
        plot = outcome.plot_svg,
    )
}

fn footer() -> String {
    format!(
        r#"    <footer>
        <p><strong>Acknowledgments</strong><br>
        Developed by: Deng et al.<br>
        Contact: <a href="mailto:dengcy0758@163.com">dengcy0758@163.com</a></p>
        <p><strong>Terms of Use</strong><br>
        This tool is for research and educational use only.<br>
        It is not intended for clinical diagnosis or treatment decision-making.<br>
        The model was trained on individuals aged 20–79 years.</p>
        <p><strong>Data Privacy</strong><br>
        No input data is stored on the server.<br>
        All inputs are processed only temporarily and not used for any other purposes.</p>
        <p class="build-info">prism-web v{version} [{git_hash}] built {built}</p>
    </footer>"#,
        version = env!("CARGO_PKG_VERSION"),
        git_hash = env!("GIT_HASH"),
        built = env!("BUILD_TIMESTAMP"),
    )
}
