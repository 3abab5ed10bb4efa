use anyhow::{Context, Result};
use serde_json::Value;
use thiserror::Error;

use super::card::make_card;
use super::navigate::{Step, navigate};

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PlaylistUrlError {
    #[error("URL must start with http:// or https://")]
    Scheme,
    #[error("URL must be a YouTube URL")]
    Host,
    #[error("URL must be a YouTube playlist")]
    MissingListParam,
    #[error("invalid playlist URL: more than one list parameter")]
    DuplicateListParam,
}

/// Validate a playlist URL and pull out its `list` id. Runs before any
/// network activity.
pub(crate) fn playlist_id_from_url(url: &str) -> Result<String, PlaylistUrlError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or(PlaylistUrlError::Scheme)?;

    let host_end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let (host, tail) = rest.split_at(host_end);
    if !matches!(host, "www.youtube.com" | "youtube.com") {
        return Err(PlaylistUrlError::Host);
    }

    let tail = tail.split('#').next().unwrap_or("");
    let query = match tail.split_once('?') {
        Some((_, query)) => query,
        None => "",
    };

    let mut id = None;
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "list" && !value.is_empty() && id.replace(value).is_some() {
            return Err(PlaylistUrlError::DuplicateListParam);
        }
    }
    id.map(str::to_string)
        .ok_or(PlaylistUrlError::MissingListParam)
}

/// Network seam for pagination. The first page arrives as raw bytes with the
/// JSON embedded in markup and is handled before the walk starts; every later
/// page comes straight off the browse API as decoded JSON.
pub(crate) trait PageSource {
    fn fetch_continuation(&mut self, playlist_id: &str, token: &str) -> Result<Value>;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PageError {
    #[error("video list is not a list")]
    NotAList,
    #[error("continuation entry may appear at most once, as the final list element")]
    MisplacedContinuation,
}

const FIRST_PAGE_VIDEO_LIST: &[Step<'static>] = &[
    Step::Key("contents"),
    Step::Key("twoColumnBrowseResultsRenderer"),
    Step::Key("tabs"),
    Step::ExactlyOne,
    Step::Key("tabRenderer"),
    Step::Key("content"),
    Step::Key("sectionListRenderer"),
    Step::Key("contents"),
    Step::ExactlyOneChildWithKey("itemSectionRenderer"),
    Step::Key("contents"),
    Step::ExactlyOneChildWithKey("playlistVideoListRenderer"),
    Step::Key("contents"),
];

const CONTINUATION_VIDEO_LIST: &[Step<'static>] = &[
    Step::Key("onResponseReceivedActions"),
    Step::ExactlyOne,
    Step::Key("appendContinuationItemsAction"),
    Step::Key("continuationItems"),
];

// The token sits under different endpoints on the first page and on browse
// responses; both shapes are fixed upstream.
const FIRST_PAGE_TOKEN: &[Step<'static>] = &[
    Step::Key("continuationEndpoint"),
    Step::Key("commandExecutorCommand"),
    Step::Key("commands"),
    Step::ExactlyOneChildWithKey("continuationCommand"),
    Step::Key("token"),
];

const CONTINUATION_TOKEN: &[Step<'static>] = &[
    Step::Key("continuationEndpoint"),
    Step::Key("continuationCommand"),
    Step::Key("token"),
];

const VIDEO_TITLE: &[Step<'static>] = &[
    Step::Key("title"),
    Step::Key("runs"),
    Step::ExactlyOne,
    Step::Key("text"),
];

/// Walk the playlist from its already-decoded first page, following
/// continuation tokens until a page carries none, and return the rendered
/// cards in index order. One fetch per continuation page, none on the last.
pub(crate) fn collect_cards(
    source: &mut dyn PageSource,
    playlist_id: &str,
    initial: &Value,
) -> Result<Vec<String>> {
    let mut cards = Vec::new();
    let mut index = 1;

    let list = navigate(initial, FIRST_PAGE_VIDEO_LIST)
        .context("locating the playlist video list")?;
    let mut token = page_cards(list, FIRST_PAGE_TOKEN, playlist_id, &mut index, &mut cards)?;

    while let Some(current) = token {
        let page = source.fetch_continuation(playlist_id, &current)?;
        let list = navigate(&page, CONTINUATION_VIDEO_LIST)
            .context("locating the continuation video list")?;
        token = page_cards(list, CONTINUATION_TOKEN, playlist_id, &mut index, &mut cards)?;
    }

    Ok(cards)
}

/// Render one page worth of entries and return the page's continuation token,
/// if any. Video entries consume an index, the continuation entry does not,
/// and the continuation entry is only legal as the final element.
fn page_cards(
    list: &Value,
    token_path: &[Step<'_>],
    playlist_id: &str,
    index: &mut usize,
    cards: &mut Vec<String>,
) -> Result<Option<String>> {
    let items = list.as_array().ok_or(PageError::NotAList)?;

    let mut token = None;
    for item in items {
        if token.is_some() {
            return Err(PageError::MisplacedContinuation.into());
        }
        if let Some(marker) = item.get("continuationItemRenderer") {
            let value = navigate(marker, token_path)
                .context("extracting the continuation token")?
                .as_str()
                .context("continuation token is not a string")?;
            token = Some(value.to_string());
            continue;
        }

        let video = navigate(item, &[Step::Key("playlistVideoRenderer")])
            .context("classifying a video list entry")?;
        let video_id = navigate(video, &[Step::Key("videoId")])?
            .as_str()
            .context("videoId is not a string")?;
        let title = navigate(video, VIDEO_TITLE)
            .context("reading a video title")?
            .as_str()
            .context("video title is not a string")?;

        cards.push(make_card(playlist_id, *index, video_id, title));
        *index += 1;
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_playlist_urls() {
        let id = playlist_id_from_url("https://www.youtube.com/playlist?list=PLabc_123-xy")
            .expect("canonical URL");
        assert_eq!(id, "PLabc_123-xy");

        let id = playlist_id_from_url("http://youtube.com/playlist?list=PL0&index=2")
            .expect("bare host and extra params");
        assert_eq!(id, "PL0");
    }

    #[test]
    fn rejects_other_schemes() {
        let err = playlist_id_from_url("ftp://www.youtube.com/playlist?list=PL0")
            .expect_err("ftp is not allowed");
        assert_eq!(err, PlaylistUrlError::Scheme);
    }

    #[test]
    fn rejects_foreign_hosts() {
        let err = playlist_id_from_url("https://example.com/playlist?list=PL0")
            .expect_err("not a YouTube host");
        assert_eq!(err, PlaylistUrlError::Host);

        let err = playlist_id_from_url("https://m.youtube.com/playlist?list=PL0")
            .expect_err("mobile host is not canonical");
        assert_eq!(err, PlaylistUrlError::Host);
    }

    #[test]
    fn rejects_urls_without_a_list_param() {
        let err = playlist_id_from_url("https://www.youtube.com/watch?v=abc")
            .expect_err("watch URL carries no list");
        assert_eq!(err, PlaylistUrlError::MissingListParam);

        let err = playlist_id_from_url("https://www.youtube.com/playlist?list=")
            .expect_err("blank list value");
        assert_eq!(err, PlaylistUrlError::MissingListParam);
    }

    #[test]
    fn rejects_duplicate_list_params() {
        let err = playlist_id_from_url("https://www.youtube.com/playlist?list=A&list=B")
            .expect_err("ambiguous playlist");
        assert_eq!(err, PlaylistUrlError::DuplicateListParam);
    }

    #[test]
    fn ignores_the_fragment_when_reading_the_query() {
        let id = playlist_id_from_url("https://www.youtube.com/playlist?list=PL9#t=1")
            .expect("fragment after query");
        assert_eq!(id, "PL9");
    }
}
