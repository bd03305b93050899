pub mod error;
pub mod types;

pub use error::{ApifyError, Result};
pub use types::{QuoteScraperInput, ReplyScraperInput, RunData, Tweet, TweetAuthor};

use serde::de::DeserializeOwned;
use serde::Serialize;
use types::ApiResponse;

const BASE_URL: &str = "https://api.apify.com/v2";

/// Actor that returns the replies of a conversation.
pub const TWEET_REPLY_SCRAPER: &str = "kaitoeasyapi/twitter-reply";

/// Actor that searches tweets; used in quote mode to find quote tweets.
pub const TWEET_QUOTE_SCRAPER: &str =
    "kaitoeasyapi/twitter-x-data-tweet-scraper-pay-per-result-cheapest";

pub struct ApifyClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl ApifyClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token: token.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Start an actor run. Returns immediately with run metadata.
    ///
    /// Actor names use the `user/name` form; the API path wants `user~name`.
    pub async fn start_run<I: Serialize + ?Sized>(&self, actor: &str, input: &I) -> Result<RunData> {
        let url = format!("{}/acts/{}/runs", self.base_url, actor.replace('/', "~"));
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(input)
            .send()
            .await?;

        let api_resp: ApiResponse<RunData> = check(resp).await?.json().await?;
        Ok(api_resp.data)
    }

    /// Poll until a run completes. Uses `waitForFinish=60` for efficient long-polling.
    pub async fn wait_for_run(&self, run_id: &str) -> Result<RunData> {
        loop {
            let url = format!("{}/actor-runs/{}?waitForFinish=60", self.base_url, run_id);
            let resp = self
                .client
                .get(&url)
                .bearer_auth(&self.token)
                .send()
                .await?;

            let api_resp: ApiResponse<RunData> = check(resp).await?.json().await?;
            match api_resp.data.status.as_str() {
                "SUCCEEDED" => return Ok(api_resp.data),
                "FAILED" | "ABORTED" | "TIMED-OUT" => {
                    return Err(ApifyError::RunFailed {
                        run_id: api_resp.data.id,
                        status: api_resp.data.status,
                    });
                }
                _ => {
                    tracing::debug!(run_id, status = %api_resp.data.status, "Run still in progress");
                    continue;
                }
            }
        }
    }

    /// Fetch dataset items from a completed run.
    pub async fn get_dataset_items<T: DeserializeOwned>(&self, dataset_id: &str) -> Result<Vec<T>> {
        let url = format!("{}/datasets/{}/items?format=json", self.base_url, dataset_id);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .await?;

        let items: Vec<T> = check(resp).await?.json().await?;
        Ok(items)
    }

    /// Run an actor end-to-end: start run, poll, fetch results.
    pub async fn run_actor<I, T>(&self, actor: &str, input: &I) -> Result<Vec<T>>
    where
        I: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let run = self.start_run(actor, input).await?;
        tracing::info!(actor, run_id = %run.id, "Apify run started, polling for completion");

        let completed = self.wait_for_run(&run.id).await?;
        tracing::info!(
            run_id = %completed.id,
            dataset_id = %completed.default_dataset_id,
            "Run completed, fetching results"
        );

        self.get_dataset_items(&completed.default_dataset_id).await
    }

    /// Scrape the replies of a conversation (thread rooted at `conversation_id`).
    pub async fn scrape_replies(&self, conversation_id: &str, max_items: u32) -> Result<Vec<Tweet>> {
        tracing::info!(conversation_id, max_items, "Starting reply scrape");

        let input = ReplyScraperInput {
            conversation_ids: vec![conversation_id.to_string()],
            max_items,
        };
        let tweets: Vec<Tweet> = self.run_actor(TWEET_REPLY_SCRAPER, &input).await?;
        tracing::info!(count = tweets.len(), "Fetched replies");

        Ok(tweets)
    }

    /// Scrape tweets that quote `tweet_id`.
    pub async fn scrape_quotes(&self, tweet_id: &str, max_items: u32) -> Result<Vec<Tweet>> {
        tracing::info!(tweet_id, max_items, "Starting quote scrape");

        let input = QuoteScraperInput {
            filter_quote: true,
            quoted_tweet_id: tweet_id.to_string(),
            max_items,
        };
        let tweets: Vec<Tweet> = self.run_actor(TWEET_QUOTE_SCRAPER, &input).await?;
        tracing::info!(count = tweets.len(), "Fetched quotes");

        Ok(tweets)
    }
}

/// Turn a non-2xx response into `ApifyError::Api` carrying the body text.
async fn check(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(ApifyError::Api {
        status: status.as_u16(),
        message: body,
    })
}
