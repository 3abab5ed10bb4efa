/// Render one tracking card. The fenced `cardlink` block is read back by
/// note-taking plugins, so the field layout and the watch URL shape are
/// load-bearing; double quotes in titles must be escaped before embedding.
pub(crate) fn make_card(playlist_id: &str, index: usize, video_id: &str, title: &str) -> String {
    let title = title.replace('"', "\\\"");
    format!(
        "{index}. [ ] **\"{title}\"**\n\
         ```cardlink\n\
         url: https://www.youtube.com/watch?v={video_id}&list={playlist_id}&index={index}\n\
         title: \"{title}\"\n\
         host: www.youtube.com\n\
         favicon: https://m.youtube.com/static/favicon.ico\n\
         image: https://i.ytimg.com/vi/{video_id}/hqdefault.jpg\n\
         ```"
    )
}

/// Make a safe filename from a playlist title: keep word characters, dots
/// and dashes, collapse whitespace runs into single underscores, and fall
/// back to the playlist id when nothing survives.
pub(crate) fn safe_filename(name: &str, playlist_id: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_us = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !last_us {
                out.push('_');
                last_us = true;
            }
        } else if ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-') {
            out.push(ch);
            last_us = ch == '_';
        }
    }
    let out = out.trim_matches('_');
    if out.is_empty() {
        format!("playlist - {playlist_id}")
    } else {
        out.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_matches_the_cardlink_template() {
        let card = make_card("PL123", 4, "abc999", "Intro to Nothing");
        let expected = "4. [ ] **\"Intro to Nothing\"**\n\
                        ```cardlink\n\
                        url: https://www.youtube.com/watch?v=abc999&list=PL123&index=4\n\
                        title: \"Intro to Nothing\"\n\
                        host: www.youtube.com\n\
                        favicon: https://m.youtube.com/static/favicon.ico\n\
                        image: https://i.ytimg.com/vi/abc999/hqdefault.jpg\n\
                        ```";
        assert_eq!(card, expected);
    }

    #[test]
    fn card_escapes_double_quotes_in_titles() {
        let card = make_card("PL123", 1, "v1", "Say \"hi\"");
        assert!(card.starts_with("1. [ ] **\"Say \\\"hi\\\"\"**\n"));
        assert!(card.contains("title: \"Say \\\"hi\\\"\"\n"));
    }

    #[test]
    fn filename_collapses_whitespace_and_drops_punctuation() {
        assert_eq!(
            safe_filename("Rust:  from zero / to hero!", "PL1"),
            "Rust_from_zero_to_hero"
        );
    }

    #[test]
    fn filename_keeps_dots_dashes_and_underscores() {
        assert_eq!(safe_filename("v1.2 - beta_run", "PL1"), "v1.2_-_beta_run");
    }

    #[test]
    fn filename_falls_back_to_the_playlist_id() {
        assert_eq!(safe_filename("!!!", "PL42"), "playlist - PL42");
        assert_eq!(safe_filename("   ", "PL42"), "playlist - PL42");
    }
}
