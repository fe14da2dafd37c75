//! HTML rendering for the chat form.
//!
//! The page is a single form posting `query` back to `/`. After a
//! submission it shows the bot's response, then related questions and
//! follow-up ideas when there are any. All dynamic text is escaped.

use std::fmt::Write;

use crate::chat::ChatReply;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
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

/// Render the chat page. `reply` is `None` before the first submission.
pub fn render_chat(title: &str, query: &str, reply: Option<&ChatReply>) -> String {
    let mut body = String::new();

    if let Some(reply) = reply {
        let _ = write!(
            body,
            "\n    <p><strong>Bot:</strong> {}</p>\n",
            escape_html(&reply.response)
        );

        if !reply.suggestions.is_empty() {
            body.push_str("\n    <p><strong>Related questions:</strong></p>\n    <ul>");
            for s in &reply.suggestions {
                let _ = write!(body, "<li>{}</li>", escape_html(&s.question));
            }
            body.push_str("</ul>\n");
        }

        if !reply.followups.is_empty() {
            body.push_str("\n    <p><strong>Follow-up ideas:</strong></p>\n    <ul>");
            for f in &reply.followups {
                let _ = write!(body, "<li>{}</li>", escape_html(f));
            }
            body.push_str("</ul>\n");
        }
    }

    layout(
        title,
        &format!(
            r#"    <form method="post" action="/">
        <input name="query" value="{}" placeholder="Ask a question..." style="width:300px;" required>
        <button type="submit">Submit</button>
    </form>
{}"#,
            escape_html(query),
            body
        ),
    )
}

/// Render a page reporting a failed request.
pub fn render_error(title: &str, message: &str) -> String {
    layout(
        title,
        &format!(
            "    <p><strong>Something went wrong:</strong> {}</p>\n    <p><a href=\"/\">Back</a></p>\n",
            escape_html(message)
        ),
    )
}

fn layout(title: &str, content: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
</head>
<body>
    <h2>{title}</h2>
{content}</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::NO_EXACT_ANSWER;
    use faqbot_core::Suggestion;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_empty_form() {
        let html = render_chat("University Chatbot", "", None);
        assert!(html.contains("<title>University Chatbot</title>"));
        assert!(html.contains(r#"<form method="post" action="/">"#));
        assert!(html.contains(r#"name="query""#));
        assert!(!html.contains("Bot:"));
    }

    #[test]
    fn test_reply_sections() {
        let reply = ChatReply {
            response: NO_EXACT_ANSWER.to_string(),
            matched_question: None,
            suggestions: vec![Suggestion {
                index: 0,
                question: "Is <housing> guaranteed?".to_string(),
                score: 0.5,
            }],
            followups: vec!["Can I pay in installments?".to_string()],
        };
        let html = render_chat("University Chatbot", "housing", Some(&reply));
        assert!(html.contains("I couldn&#39;t find an exact answer."));
        assert!(html.contains("Related questions:"));
        assert!(html.contains("<li>Is &lt;housing&gt; guaranteed?</li>"));
        assert!(html.contains("Follow-up ideas:"));
        assert!(html.contains(r#"value="housing""#));
    }

    #[test]
    fn test_sections_hidden_when_empty() {
        let reply = ChatReply {
            response: "Building C.".to_string(),
            matched_question: Some("Where is the library?".to_string()),
            suggestions: Vec::new(),
            followups: Vec::new(),
        };
        let html = render_chat("Campus", "where is the library", Some(&reply));
        assert!(html.contains("<p><strong>Bot:</strong> Building C.</p>"));
        assert!(!html.contains("Related questions:"));
        assert!(!html.contains("Follow-up ideas:"));
    }

    #[test]
    fn test_error_page_escapes_message() {
        let html = render_error("Campus", "Ollama connection error (<url>)");
        assert!(html.contains("Ollama connection error (&lt;url&gt;)"));
    }
}
