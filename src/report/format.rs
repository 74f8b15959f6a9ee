use chrono::NaiveDate;

use crate::models::{MatchResult, Post};

const DISCLAIMER: &str = "Remember: decks are subject to change every two hours. \
Listed decks may not always correspond to the decks the top 10 started the Arena with.";

/// "Dec 11 2015 Arena TOP 10s"
pub fn format_title(date: NaiveDate) -> String {
    date.format("%b %d %Y Arena TOP 10s").to_string()
}

/// Reddit markdown body: one bullet per result, then the footer.
pub fn format_body(results: &[MatchResult], contact_line: &str) -> String {
    let mut body = String::new();
    for m in results {
        body.push_str(&format!(
            "\n* [{}]({}) - [Champion's Deck]({})\n\n ",
            m.description, m.match_url, m.deck_url
        ));
    }

    body.push_str(" \n-----------------\n ");
    body.push_str(&format!(" \n{}\n ", DISCLAIMER));
    body.push_str(" \n-----------------\n");
    body.push_str(contact_line);
    body
}

pub fn format_post(results: &[MatchResult], date: NaiveDate, contact_line: &str) -> Post {
    Post {
        title: format_title(date),
        body: format_body(results, contact_line),
    }
}
