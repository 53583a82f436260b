use anyhow::{Result, bail};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::fetch::{HttpClient, get_json, post_json};

pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/";
pub const STREETEASY_ACTOR: &str = "jupri/streeteasy-scraper";

/// Seconds the API may hold a request open waiting for a run to finish.
const WAIT_FOR_FINISH_SECS: &str = "60";

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING-KEBAB-CASE")]
pub enum RunStatus {
    Ready,
    Running,
    Succeeded,
    Failed,
    TimingOut,
    TimedOut,
    Aborting,
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Succeeded | RunStatus::Failed | RunStatus::TimedOut | RunStatus::Aborted
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorRun {
    pub id: String,
    pub status: RunStatus,
    pub default_dataset_id: String,
}

/// Minimal Apify v2 client: start an actor, wait for it, read its dataset.
///
/// Authentication is the wrapped [`HttpClient`]'s job (see
/// [`crate::fetch::auth::ApiKey::bearer`]).
pub struct ApifyClient<C> {
    http: C,
    base_url: Url,
}

impl<C: HttpClient> ApifyClient<C> {
    pub fn new(http: C, base_url: &str) -> Result<Self> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        Ok(Self {
            http,
            base_url: Url::parse(&base)?,
        })
    }

    /// `owner/name` actor ids are addressed as `owner~name` in URLs.
    fn actor_path(actor: &str) -> String {
        actor.replace('/', "~")
    }

    pub async fn start_run(&self, actor: &str, input: &Value) -> Result<ActorRun> {
        let mut url = self
            .base_url
            .join(&format!("v2/acts/{}/runs", Self::actor_path(actor)))?;
        url.query_pairs_mut()
            .append_pair("waitForFinish", WAIT_FOR_FINISH_SECS);

        let run: Envelope<ActorRun> = post_json(&self.http, url, input).await?;
        info!(actor, run_id = %run.data.id, status = ?run.data.status, "Actor run started");
        Ok(run.data)
    }

    /// Polls until the run reaches a terminal status. Each poll is a
    /// long-poll, so this does not spin.
    pub async fn wait_for_run(&self, mut run: ActorRun) -> Result<ActorRun> {
        while !run.status.is_terminal() {
            let mut url = self.base_url.join(&format!("v2/actor-runs/{}", run.id))?;
            url.query_pairs_mut()
                .append_pair("waitForFinish", WAIT_FOR_FINISH_SECS);

            let polled: Envelope<ActorRun> = get_json(&self.http, url).await?;
            run = polled.data;
            debug!(run_id = %run.id, status = ?run.status, "Actor run polled");
        }
        Ok(run)
    }

    pub async fn dataset_items(&self, dataset_id: &str) -> Result<Vec<Value>> {
        let mut url = self
            .base_url
            .join(&format!("v2/datasets/{dataset_id}/items"))?;
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("clean", "true");
        get_json(&self.http, url).await
    }

    /// Runs `actor` with `input` to completion and returns its dataset items.
    ///
    /// # Errors
    ///
    /// Fails if the run ends in any status other than `SUCCEEDED`.
    #[tracing::instrument(skip(self, input))]
    pub async fn call(&self, actor: &str, input: &Value) -> Result<(ActorRun, Vec<Value>)> {
        let run = self.start_run(actor, input).await?;
        let run = self.wait_for_run(run).await?;
        if run.status != RunStatus::Succeeded {
            bail!("actor run {} finished with status {:?}", run.id, run.status);
        }

        info!(
            dataset = %format!("https://console.apify.com/storage/datasets/{}", run.default_dataset_id),
            "Actor run finished"
        );
        let items = self.dataset_items(&run.default_dataset_id).await?;
        info!(items = items.len(), "Dataset items downloaded");
        Ok((run, items))
    }
}
