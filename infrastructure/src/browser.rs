//! A headless Chromium for pages that only exist after their scripts ran.

use chromiumoxide::{Browser, BrowserConfig};
use domain::ports::UpstreamError;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    /// Chromium binary, looked up on the `PATH` when unset.
    pub executable: Option<PathBuf>,
    /// Extra command line arguments, e.g. `--no-sandbox` inside containers.
    pub args: Vec<String>,
}

/// Launched on first use and shared by every page afterwards. A failed launch
/// is retried on the next render.
pub struct HeadlessBrowser {
    options: BrowserOptions,
    timeout: Duration,
    browser: OnceCell<Browser>,
}

impl HeadlessBrowser {
    #[instrument(level = "trace")]
    pub fn new(options: BrowserOptions, timeout: Duration) -> Self {
        Self {
            options,
            timeout,
            browser: OnceCell::new(),
        }
    }

    async fn browser(&self, service: &str) -> Result<&Browser, UpstreamError> {
        self.browser
            .get_or_try_init(|| launch(&self.options))
            .await
            .map_err(|reason| UpstreamError::Unreachable {
                service: service.to_string(),
                reason,
            })
    }

    /// Opens `url` and feeds the rendered HTML to `inspect` until it yields a
    /// value or the timeout passes.
    #[instrument(level = "debug", skip(self, inspect), fields(url = %url))]
    pub async fn render<T>(
        &self,
        service: &str,
        url: &Url,
        inspect: impl FnMut(&str) -> Result<Option<T>, UpstreamError>,
    ) -> Result<T, UpstreamError> {
        let unreachable = |error: chromiumoxide::error::CdpError| UpstreamError::Unreachable {
            service: service.to_string(),
            reason: error.to_string(),
        };

        let timed_out = || UpstreamError::Timeout {
            service: service.to_string(),
        };

        let browser = self.browser(service).await?;
        let page = tokio::time::timeout(self.timeout, browser.new_page(url.as_str()))
            .await
            .map_err(|_| timed_out())?
            .map_err(unreachable)?;

        let snapshot = || {
            let page = page.clone();
            async move { page.content().await.map_err(unreachable) }
        };
        let result = tokio::time::timeout(self.timeout, wait_for(snapshot, POLL_INTERVAL, inspect))
            .await
            .unwrap_or_else(|_| Err(timed_out()));

        if let Err(error) = page.close().await {
            debug!(error = %error, "Failed to close browser page");
        }
        result
    }
}

async fn launch(options: &BrowserOptions) -> Result<Browser, String> {
    let mut config = BrowserConfig::builder().args(options.args.iter().cloned());
    if let Some(executable) = &options.executable {
        config = config.chrome_executable(executable);
    }
    let config = config.build()?;

    let (browser, mut handler) = Browser::launch(config)
        .await
        .map_err(|error| format!("failed to launch headless browser: {error}"))?;
    tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(error) = event {
                debug!(error = %error, "Browser handler error");
            }
        }
        warn!("Headless browser connection closed");
    });

    info!("Headless browser launched");
    Ok(browser)
}

/// Takes snapshots every `interval` until `inspect` recognises one.
async fn wait_for<S, F, T>(
    mut snapshot: S,
    interval: Duration,
    mut inspect: impl FnMut(&str) -> Result<Option<T>, UpstreamError>,
) -> Result<T, UpstreamError>
where
    S: FnMut() -> F,
    F: Future<Output = Result<String, UpstreamError>>,
{
    loop {
        let html = snapshot().await?;
        if let Some(value) = inspect(&html)? {
            return Ok(value);
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn snapshots(pages: &[&str]) -> impl FnMut() -> std::future::Ready<Result<String, UpstreamError>> {
        let mut pages: VecDeque<String> = pages.iter().map(|page| page.to_string()).collect();
        move || {
            std::future::ready(pages.pop_front().ok_or(UpstreamError::Timeout {
                service: "test".into(),
            }))
        }
    }

    #[tokio::test]
    async fn waits_until_the_page_is_rendered() {
        let mut seen = 0;

        let value = wait_for(
            snapshots(&["<p>loading</p>", "<p>loading</p>", "<p>done</p>"]),
            Duration::from_millis(1),
            |html| {
                seen += 1;
                Ok(html.contains("done").then_some(seen))
            },
        )
        .await
        .unwrap();

        assert_eq!(value, 3);
    }

    #[tokio::test]
    async fn inspection_errors_stop_waiting() {
        let result: Result<(), _> = wait_for(
            snapshots(&["<p>broken</p>", "<p>done</p>"]),
            Duration::from_millis(1),
            |_| {
                Err(UpstreamError::Malformed {
                    service: "test".into(),
                    detail: "broken".into(),
                })
            },
        )
        .await;

        assert!(matches!(result, Err(UpstreamError::Malformed { .. })));
    }
}
