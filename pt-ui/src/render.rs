//! Server-side HTML rendering for the poem page

use crate::session::{Phase, Submission};
use html_escape::encode_text;
use pt_common::results::{MAX_RATING, MIN_RATING};
use pt_common::PoemRecord;

/// Everything shown on one page view
#[derive(Debug, Default)]
pub struct PageView<'a> {
    pub poem: Option<&'a PoemRecord>,
    pub phase: Option<Phase>,
    /// Statistics lines for the current poem (empty hides the block)
    pub stats_lines: Vec<String>,
    /// Feedback for a judgment made in this request
    pub submission: Option<&'a Submission>,
}

/// Poem text as HTML with line breaks preserved
pub fn format_poem(text: &str) -> String {
    encode_text(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Render the poem page
pub fn render_page(view: &PageView<'_>) -> String {
    let poem_block = match view.poem {
        Some(poem) => format!(
            r#"<div class="poem" style="background-color:darkgrey;padding:5px;">{}</div>"#,
            format_poem(&poem.text)
        ),
        None => r#"<p class="muted">No poem loaded.</p>"#.to_string(),
    };

    let stats_block = if view.stats_lines.is_empty() {
        String::new()
    } else {
        let lines: String = view
            .stats_lines
            .iter()
            .map(|line| format!("<p>{}</p>", encode_text(line)))
            .collect();
        format!(r#"<div class="stats">{}</div>"#, lines)
    };

    let feedback_block = match view.submission {
        Some(submission) => {
            let author = submission
                .author
                .map(|name| format!("<p>Author of the Poem: {}</p>", encode_text(name)))
                .unwrap_or_default();
            format!(
                r#"<div class="success">Thank you for your feedback! Your guess was {}.</div>{}"#,
                submission.verdict(),
                author
            )
        }
        None => String::new(),
    };

    let judgment_form = if view.phase == Some(Phase::Showing) {
        format!(
            r#"<form method="post" action="/submit">
        <label for="rating">Rate the quality of this poem from {min}-{max}</label>
        <input type="range" id="rating" name="rating" min="{min}" max="{max}" value="{min}"
               oninput="document.getElementById('rating-value').textContent = this.value">
        <span id="rating-value">{min}</span>
        <fieldset>
            <legend>Was this poem written by a human or AI?</legend>
            <label><input type="radio" name="guess" value="Human" checked> Human</label>
            <label><input type="radio" name="guess" value="AI"> AI</label>
        </fieldset>
        <button type="submit">Submit</button>
    </form>"#,
            min = MIN_RATING,
            max = MAX_RATING
        )
    } else {
        String::new()
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Human or AI?</title>
    <style>
        body {{
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background-color: #1a1a1a;
            color: #e0e0e0;
            line-height: 1.6;
            max-width: 760px;
            margin: 0 auto;
            padding: 20px;
        }}
        .poem {{
            color: #111;
            margin: 20px 0;
        }}
        .success {{
            background: #10b981;
            color: #fff;
            padding: 10px;
            border-radius: 4px;
        }}
        .muted {{
            color: #888;
        }}
        button {{
            padding: 10px 20px;
            background: #4a9eff;
            color: white;
            border: none;
            border-radius: 4px;
            font-weight: 600;
            margin: 10px 0;
        }}
        fieldset {{
            border: 1px solid #3a3a3a;
            margin: 10px 0;
        }}
    </style>
</head>
<body>
    <img src="/logo.png" alt="" width="300" onerror="this.style.display='none'">
    <form method="post" action="/new">
        <button type="submit">Show new poem</button>
    </form>
    {poem}
    {stats}
    {form}
    {feedback}
</body>
</html>
"#,
        poem = poem_block,
        stats = stats_block,
        form = judgment_form,
        feedback = feedback_block,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pt_common::{Category, ResultEntry};

    fn sample_poem() -> PoemRecord {
        PoemRecord {
            id: 95,
            category: Category::Human,
            path: "./real_poems/95.txt".to_string(),
            text: "Out of the ash\nI rise <with> my red hair".to_string(),
        }
    }

    #[test]
    fn test_format_poem_escapes_and_breaks_lines() {
        assert_eq!(
            format_poem("a < b\nc & d\r\ne"),
            "a &lt; b<br>c &amp; d<br>e"
        );
    }

    #[test]
    fn test_showing_page_has_form_and_poem() {
        let poem = sample_poem();
        let html = render_page(&PageView {
            poem: Some(&poem),
            phase: Some(Phase::Showing),
            ..Default::default()
        });

        assert!(html.contains("Out of the ash<br>I rise &lt;with&gt; my red hair"));
        assert!(html.contains(r#"action="/submit""#));
        assert!(html.contains("Show new poem"));
        assert!(!html.contains("Thank you for your feedback"));
    }

    #[test]
    fn test_feedback_with_author() {
        let poem = sample_poem();
        let submission = Submission {
            entry: ResultEntry::new(Category::Human, 9, Category::Ai, poem.path.clone()),
            correct: false,
            author: Some("Sylvia Plath"),
        };
        let html = render_page(&PageView {
            poem: Some(&poem),
            phase: Some(Phase::Submitted),
            stats_lines: vec!["Average Rating for this Poem: 9.00/10".to_string()],
            submission: Some(&submission),
        });

        assert!(html.contains("Thank you for your feedback! Your guess was Incorrect."));
        assert!(html.contains("Author of the Poem: Sylvia Plath"));
        assert!(html.contains("Average Rating for this Poem: 9.00/10"));
        assert!(!html.contains(r#"action="/submit""#));
    }
}
