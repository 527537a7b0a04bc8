//! The network seam: how a [`Query`] becomes a [`ResultPage`].

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::config::SelectConfig;
use crate::error::Result;
use crate::error::SelectError;
use crate::types::Query;
use crate::types::ResultPage;
use crate::types::SelectOption;

/// Performs `GET <url>` and returns the decoded JSON body.
///
/// Implementations should make the request future cancel-safe: dropping it
/// must abort the underlying connection where the platform allows.
#[async_trait]
pub trait OptionsTransport: Send + Sync {
    async fn get(&self, url: &str) -> Result<Value>;
}

/// Pulls the options out of a response body.
pub type OptionsExtractor = Arc<dyn Fn(&Value) -> Result<Vec<SelectOption>> + Send + Sync>;

/// Decides whether the page just received was the last one. Receives the
/// newly extracted options and the raw body.
pub type CompletionPredicate = Arc<dyn Fn(&[SelectOption], &Value) -> bool + Send + Sync>;

/// Reads `body[results_key]` as an array of options.
pub fn default_extractor(results_key: impl Into<String>) -> OptionsExtractor {
    let results_key = results_key.into();
    Arc::new(move |body: &Value| {
        let Some(results) = body.get(&results_key) else {
            return Err(SelectError::MalformedResponse(format!(
                "missing `{results_key}` field"
            )));
        };
        serde_json::from_value::<Vec<SelectOption>>(results.clone())
            .map_err(|e| SelectError::MalformedResponse(format!("`{results_key}`: {e}")))
    })
}

/// Complete unless `body[more_key]` is truthy.
pub fn default_completion(more_key: impl Into<String>) -> CompletionPredicate {
    let more_key = more_key.into();
    Arc::new(move |_items: &[SelectOption], body: &Value| {
        !body.get(&more_key).is_some_and(is_truthy)
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Everything needed to turn a query into a page, minus the transport.
#[derive(Clone)]
pub struct PageLoader {
    endpoint: String,
    extractor: OptionsExtractor,
    is_complete: CompletionPredicate,
}

impl PageLoader {
    pub fn new(
        endpoint: impl Into<String>,
        extractor: OptionsExtractor,
        is_complete: CompletionPredicate,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            extractor,
            is_complete,
        }
    }

    pub fn from_config(config: &SelectConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            default_extractor(config.results_key.clone()),
            default_completion(config.more_key.clone()),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn set_extractor(&mut self, extractor: OptionsExtractor) {
        self.extractor = extractor;
    }

    pub fn set_completion_predicate(&mut self, is_complete: CompletionPredicate) {
        self.is_complete = is_complete;
    }

    /// Fetch and decode one page.
    pub async fn load(&self, transport: &dyn OptionsTransport, query: &Query) -> Result<ResultPage> {
        let url = query.url(&self.endpoint);
        debug!(%url, page = query.page, "fetching options");
        let body = transport.get(&url).await?;
        self.decode(&body)
    }

    /// Apply the extractor and completeness predicate to a response body.
    pub fn decode(&self, body: &Value) -> Result<ResultPage> {
        let items = (self.extractor)(body)?;
        let complete = (self.is_complete)(&items, body);
        Ok(ResultPage::new(items, complete))
    }
}

/// One-shot helper around [`PageLoader::load`].
pub async fn load_page(
    transport: &dyn OptionsTransport,
    loader: &PageLoader,
    query: &Query,
) -> Result<ResultPage> {
    loader.load(transport, query).await
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Mutex;

    struct Recording {
        urls: Mutex<Vec<String>>,
        body: Value,
    }

    #[async_trait]
    impl OptionsTransport for Recording {
        async fn get(&self, url: &str) -> Result<Value> {
            self.urls.lock().unwrap().push(url.to_string());
            Ok(self.body.clone())
        }
    }

    fn loader() -> PageLoader {
        PageLoader::from_config(&SelectConfig::with_endpoint("/api/contacts?search="))
    }

    #[tokio::test]
    async fn loads_and_decodes_default_shape() {
        let transport = Recording {
            urls: Mutex::new(Vec::new()),
            body: json!({"results": [{"id": 1, "name": "Ann"}], "more": true}),
        };
        let page = load_page(&transport, &loader(), &Query::new("an n", 2))
            .await
            .unwrap();

        assert_eq!(vec![SelectOption::new("1", "Ann")], page.items);
        assert!(!page.complete);
        assert_eq!(
            vec!["/api/contacts?search=an%20n&page=2".to_string()],
            *transport.urls.lock().unwrap()
        );
    }

    #[test]
    fn missing_more_means_complete() {
        let page = loader().decode(&json!({"results": []})).unwrap();
        assert!(page.complete);
        let page = loader().decode(&json!({"results": [], "more": 0})).unwrap();
        assert!(page.complete);
        let page = loader().decode(&json!({"results": [], "more": "yes"})).unwrap();
        assert!(!page.complete);
    }

    #[test]
    fn missing_results_is_malformed() {
        assert_matches!(
            loader().decode(&json!({"items": []})),
            Err(SelectError::MalformedResponse(_))
        );
        assert_matches!(
            loader().decode(&json!({"results": "nope"})),
            Err(SelectError::MalformedResponse(_))
        );
    }

    #[test]
    fn custom_extractor_and_predicate() {
        let mut loader = loader();
        loader.set_extractor(Arc::new(|body: &Value| {
            let names = body["names"].as_array().cloned().unwrap_or_default();
            Ok(names
                .iter()
                .filter_map(Value::as_str)
                .map(SelectOption::anonymous)
                .collect())
        }));
        loader.set_completion_predicate(Arc::new(|items: &[SelectOption], _body: &Value| {
            items.len() < 2
        }));

        let page = loader.decode(&json!({"names": ["a", "b"]})).unwrap();
        assert_eq!(2, page.items.len());
        assert!(!page.complete);
    }
}
