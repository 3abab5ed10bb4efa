mod card;
mod extract;
mod navigate;
mod playlist;


use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde_json::{Value, json};

use crate::cache::PageCache;
use crate::cli::Cli;
use crate::http;

use self::card::safe_filename;
use self::navigate::{Step, navigate};
use self::playlist::{PageSource, collect_cards, playlist_id_from_url};

const BROWSE_URL: &str = "https://www.youtube.com/youtubei/v1/browse";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const READ_TIMEOUT: Duration = Duration::from_secs(30);
const ATTEMPTS: usize = 3;
const RETRY_DELAY: Duration = Duration::from_millis(750);

const PLAYLIST_TITLE: &[Step<'static>] = &[
    Step::Key("metadata"),
    Step::Key("playlistMetadataRenderer"),
    Step::Key("title"),
];

pub fn run(cli: Cli) -> Result<()> {
    let playlist_id = playlist_id_from_url(&cli.url)?;
    println!("playlist ID: {playlist_id}");

    let mut session = Session::new(cli.cached)?;

    let page = session.playlist_page(&playlist_id)?;
    let raw = extract::json_slice(&page, b"", b"var ytInitialData = ", b"")
        .context("locating the embedded playlist data")?;
    let data: Value =
        serde_json::from_slice(raw).context("decoding the embedded playlist data")?;

    let title = navigate(&data, PLAYLIST_TITLE)
        .context("reading the playlist title")?
        .as_str()
        .context("playlist title is not a string")?;
    println!("title: {title}");

    // Resolve (and veto) the output path before any continuation fetch.
    let out_path = if cli.stdout {
        None
    } else {
        Some(resolve_out_path(&cli, title, &playlist_id)?)
    };

    let cards = collect_cards(&mut session, &playlist_id, &data)?;
    let body = cards.join("\n");

    match out_path {
        None => println!("{body}"),
        Some(path) => {
            fs::write(&path, body)
                .with_context(|| format!("failed to write {}", path.display()))?;
            println!("Wrote {} cards -> {}", cards.len(), path.display());
        }
    }
    Ok(())
}

fn resolve_out_path(cli: &Cli, title: &str, playlist_id: &str) -> Result<PathBuf> {
    fs::create_dir_all(&cli.out_dir).with_context(|| {
        format!("failed to create output directory {}", cli.out_dir.display())
    })?;

    let file = match &cli.out {
        Some(out) => out.clone(),
        None if cli.id_filename => PathBuf::from(format!("playlist - {playlist_id}.md")),
        None => PathBuf::from(format!("{}.md", safe_filename(title, playlist_id))),
    };

    let path = cli.out_dir.join(file);
    if path.exists() && !cli.force {
        bail!("{} already exists. Use --force to overwrite.", path.display());
    }
    Ok(path)
}

/// HTTP session with an optional on-disk page cache behind it.
struct Session {
    cache: Option<PageCache>,
}

impl Session {
    fn new(cached: bool) -> Result<Self> {
        let cache = if cached { Some(PageCache::open()?) } else { None };
        Ok(Self { cache })
    }

    fn playlist_page(&self, playlist_id: &str) -> Result<Vec<u8>> {
        if let Some(cache) = &self.cache
            && let Some(bytes) = cache.load("playlist", playlist_id)
        {
            return Ok(bytes);
        }

        let url = playlist_url(playlist_id);
        let bytes = http::get_bytes_with_retries(
            &url,
            &[],
            CONNECT_TIMEOUT,
            READ_TIMEOUT,
            ATTEMPTS,
            RETRY_DELAY,
        )
        .map_err(anyhow::Error::msg)
        .with_context(|| format!("fetching {url}"))?;

        if let Some(cache) = &self.cache {
            cache.store("playlist", playlist_id, &bytes)?;
        }
        Ok(bytes)
    }

    fn browse(&mut self, playlist_id: &str, token: &str) -> Result<Value> {
        if let Some(cache) = &self.cache
            && let Some(bytes) = cache.load("browse", token)
        {
            return Ok(serde_json::from_slice(&bytes)
                .context("decoding a cached continuation page")?);
        }

        let referer = playlist_url(playlist_id);
        let query = [("prettyPrint".to_string(), "false".to_string())];
        let payload = browse_payload(playlist_id, token);
        let body = http::post_json_with_retries(
            BROWSE_URL,
            &referer,
            &query,
            &payload,
            CONNECT_TIMEOUT,
            READ_TIMEOUT,
            ATTEMPTS,
            RETRY_DELAY,
        )
        .map_err(anyhow::Error::msg)
        .context("fetching a continuation page")?;

        if let Some(cache) = &self.cache {
            cache.store("browse", token, body.as_bytes())?;
        }
        serde_json::from_str(&body).context("decoding a continuation page")
    }
}

impl PageSource for Session {
    fn fetch_continuation(&mut self, playlist_id: &str, token: &str) -> Result<Value> {
        self.browse(playlist_id, token)
    }
}

fn playlist_url(playlist_id: &str) -> String {
    format!("https://www.youtube.com/playlist?list={playlist_id}")
}

fn browse_payload(playlist_id: &str, token: &str) -> Value {
    json!({
        "context": {
            "client": {
                "userAgent": http::USER_AGENT,
                "clientName": "WEB",
                "clientVersion": "2.20260206.08.00",
                "osName": "X11",
                "osVersion": "",
                "originalUrl": playlist_url(playlist_id),
                "screenPixelDensity": 2,
                "platform": "DESKTOP",
                "clientFormFactor": "UNKNOWN_FORM_FACTOR",
            },
        },
        "continuation": token,
    })
}
