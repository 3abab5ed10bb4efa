use std::io::Read;
use std::thread;
use std::time::Duration;

use serde_json::Value;

pub(crate) const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:146.0) Gecko/20100101 Firefox/146.0";

fn should_retry_http_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..=599).contains(&status)
}

fn agent(connect_timeout: Duration, read_timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(connect_timeout)
        .timeout_read(read_timeout)
        .timeout_write(read_timeout)
        .build()
}

// The page fetch masquerades as a desktop browser navigation; the site
// serves a reduced document to unknown clients.
fn browser_headers(request: ureq::Request) -> ureq::Request {
    request
        .set("User-Agent", USER_AGENT)
        .set(
            "Accept",
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .set("Accept-Language", "en-US,en;q=0.5")
        .set("Upgrade-Insecure-Requests", "1")
        .set("Sec-Fetch-Dest", "document")
        .set("Sec-Fetch-Mode", "navigate")
        .set("Sec-Fetch-Site", "same-origin")
        .set("Sec-Fetch-User", "?1")
}

pub(crate) fn get_bytes_with_retries(
    url: &str,
    query: &[(String, String)],
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<Vec<u8>, String> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let agent = agent(connect_timeout, read_timeout);
        let mut request = browser_headers(agent.get(url));
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.call() {
            Ok(response) => {
                let mut body = Vec::new();
                return match response.into_reader().read_to_end(&mut body) {
                    Ok(_) => Ok(body),
                    Err(err) => Err(format!("request failed: response read failed: {err}")),
                };
            }
            Err(err) => match classify_error(err, attempt, attempts, retry_delay) {
                Retry::Wait => continue,
                Retry::Give(message) => return Err(message),
            },
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}

pub(crate) fn post_json_with_retries(
    url: &str,
    referer: &str,
    query: &[(String, String)],
    body: &Value,
    connect_timeout: Duration,
    read_timeout: Duration,
    attempts: usize,
    retry_delay: Duration,
) -> Result<String, String> {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let agent = agent(connect_timeout, read_timeout);
        let mut request = agent
            .post(url)
            .set("User-Agent", USER_AGENT)
            .set("Referer", referer);
        for (key, value) in query {
            request = request.query(key, value);
        }

        match request.send_json(body) {
            Ok(response) => {
                return match response.into_string() {
                    Ok(text) => Ok(text),
                    Err(err) => Err(format!("request failed: response decode failed: {err}")),
                };
            }
            Err(err) => match classify_error(err, attempt, attempts, retry_delay) {
                Retry::Wait => continue,
                Retry::Give(message) => return Err(message),
            },
        }
    }

    Err("request failed: exhausted attempts without a concrete error".to_string())
}

enum Retry {
    Wait,
    Give(String),
}

fn classify_error(
    err: ureq::Error,
    attempt: usize,
    attempts: usize,
    retry_delay: Duration,
) -> Retry {
    match err {
        ureq::Error::Status(status, response) => {
            let response_body = response.into_string().ok().unwrap_or_default();
            let body = response_body.trim();
            let status_error = if body.is_empty() {
                format!("HTTP status {status}")
            } else {
                let truncated = body.chars().take(240).collect::<String>();
                format!("HTTP status {status} ({truncated})")
            };

            if should_retry_http_status(status) && attempt < attempts {
                thread::sleep(retry_delay);
                return Retry::Wait;
            }

            if should_retry_http_status(status) {
                return Retry::Give(format!(
                    "request failed after {attempts} attempt(s): {status_error}"
                ));
            }

            Retry::Give(format!("request failed: {status_error}"))
        }
        ureq::Error::Transport(err) => {
            if attempt < attempts {
                thread::sleep(retry_delay);
                return Retry::Wait;
            }
            Retry::Give(format!(
                "request failed after {attempts} attempt(s): transport error: {err}"
            ))
        }
    }
}
