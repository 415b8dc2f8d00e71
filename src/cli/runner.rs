//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, FileConfig, PacingConfig, QueryConfig};
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::pagination::{Page, PageFetcher, PaginationDriver, StopReason};
use crate::queries;
use crate::types::JsonValue;
use serde_json::json;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let file = self.load_file_config()?;
        let client = self.build_client(&file)?;
        let query = self.build_query(&file);
        let pacing = self.pacing(&file);

        match &self.cli.command {
            Commands::Popular => {
                let call = queries::most_popular(&client)?;
                self.stream(call, query, pacing).await
            }
            Commands::Search {
                query: text,
                related_to,
            } => {
                let mut query = query;
                if let Some(text) = text {
                    query = query.with_query(text);
                }
                if let Some(id) = related_to {
                    query = query.with_related_entity(id);
                }
                let call = queries::search(&client, &query)?;
                self.stream(call, query, pacing).await
            }
            Commands::Videos { ids } => {
                let call = queries::by_ids(&client, ids.as_slice())?;
                self.stream(call, query, pacing).await
            }
        }
    }

    /// Load the config file, or defaults when none was given
    fn load_file_config(&self) -> Result<FileConfig> {
        match &self.cli.config {
            Some(path) => load_config(path),
            None => Ok(FileConfig::default()),
        }
    }

    /// Build the API client; the flag or environment wins over the file
    fn build_client(&self, file: &FileConfig) -> Result<ApiClient> {
        let key = self
            .cli
            .api_key
            .clone()
            .or_else(|| file.client.api_key.clone())
            .ok_or_else(|| {
                Error::config("API key not specified (use --api-key or YOUTUBE_API_KEY)")
            })?;
        ApiClient::new(file.client.to_client_config(key))
    }

    /// Merge command-line limits over the file's query settings
    fn build_query(&self, file: &FileConfig) -> QueryConfig {
        let mut query = file.query.clone();
        if let Some(max) = self.cli.max_pages {
            query = query.with_max_pages(max);
        }
        if let Some(max) = self.cli.per_page {
            query = query.with_max_items_per_page(max);
        }
        if let Some(max) = self.cli.max_items {
            query = query.with_max_total_items(max);
        }
        if let Some(token) = &self.cli.page_token {
            query = query.with_start_page_token(token);
        }
        query
    }

    fn pacing(&self, file: &FileConfig) -> PacingConfig {
        self.cli
            .pacing_ms
            .map_or_else(|| file.pacing(), PacingConfig::from_millis)
    }

    /// Drain one stream to stdout, failing if it ended with an error page
    async fn stream<F>(&self, fetcher: F, query: QueryConfig, pacing: PacingConfig) -> Result<()>
    where
        F: PageFetcher<Item = JsonValue>,
    {
        let mut stream = PaginationDriver::new(fetcher, query)?
            .with_pacing(pacing)
            .start();

        let mut failure = None;
        let mut items = 0usize;
        while let Some(mut page) = stream.next_page().await {
            items += page.len();
            self.output_message(&page_to_json(&page));
            if let Some(error) = page.error.take() {
                failure = Some(error);
            }
        }

        let reason = stream.finish().await?;
        info!(items, reason = %reason, "done");

        match failure {
            Some(error) => Err(error),
            None if reason == StopReason::Failed => Err(Error::Other("stream failed".into())),
            None => Ok(()),
        }
    }

    /// Output a message
    fn output_message(&self, msg: &JsonValue) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// JSON form of a page as printed by the CLI
fn page_to_json(page: &Page<JsonValue>) -> JsonValue {
    match &page.error {
        Some(error) => json!({
            "index": page.index,
            "error": error.to_string(),
        }),
        None => json!({
            "index": page.index,
            "items": page.items,
            "nextPageToken": page.next_page_token,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn runner(args: &[&str]) -> Runner {
        Runner::new(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_page_to_json() {
        let page = Page::new(2, vec![json!({"id": "a"})], Some("T3".to_string()));
        assert_eq!(
            page_to_json(&page),
            json!({"index": 2, "items": [{"id": "a"}], "nextPageToken": "T3"})
        );

        let page: Page<JsonValue> = Page::failed(3, Error::remote(500, "backendError"));
        assert_eq!(
            page_to_json(&page),
            json!({"index": 3, "error": "Remote error 500: backendError"})
        );
    }

    #[test]
    fn test_build_query_overrides_file() {
        let mut file = FileConfig::default();
        file.query = QueryConfig::new().with_max_pages(5).with_max_items_per_page(20);

        let runner = runner(&[
            "pagestream",
            "--max-pages",
            "2",
            "--page-token",
            "T1",
            "popular",
        ]);
        let query = runner.build_query(&file);

        assert_eq!(query.max_pages, 2);
        assert_eq!(query.max_items_per_page, 20);
        assert_eq!(query.start_page_token(), Some("T1"));
    }

    #[test]
    fn test_pacing_flag_overrides_file() {
        let file = FileConfig::default();
        assert_eq!(
            runner(&["pagestream", "popular"]).pacing(&file),
            PacingConfig::default()
        );
        assert_eq!(
            runner(&["pagestream", "--pacing-ms", "5", "popular"]).pacing(&file),
            PacingConfig::from_millis(5)
        );
    }

    #[test]
    fn test_build_client_key_sources() {
        let mut file = FileConfig::default();
        file.client.api_key = Some("from-file".to_string());

        let runner = runner(&["pagestream", "--api-key", "from-flag", "popular"]);
        let client = runner.build_client(&file).unwrap();
        assert_eq!(client.config().api_key, "from-flag");

        let runner = Runner::new(Cli {
            api_key: None,
            ..Cli::try_parse_from(["pagestream", "popular"]).unwrap()
        });
        let client = runner.build_client(&file).unwrap();
        assert_eq!(client.config().api_key, "from-file");

        let err = runner.build_client(&FileConfig::default()).unwrap_err();
        assert!(err.is_config());
    }
}
