//! Authors API client methods

use crate::error::ClientError;
use crate::gateway::{ApiGateway, RequestOptions};
use crate::response;
use crate::types::{Author, DataEnvelope};
use reqwest::Method;
use url::Url;

const AUTHORS_PATH: &str = "/autores";

impl ApiGateway {
    /// List all authors (public)
    pub async fn list_authors(&self) -> Result<Vec<Author>, ClientError> {
        let response = self.send(AUTHORS_PATH, RequestOptions::new()).await?;
        let envelope: DataEnvelope<Vec<Author>> =
            response::decode(response, "Failed to load authors").await?;
        Ok(envelope.data)
    }

    /// Fetch one author (protected)
    pub async fn get_author(&self, id: &str) -> Result<Author, ClientError> {
        let response = self.send(&author_path(id)?, RequestOptions::new()).await?;
        let envelope: DataEnvelope<Author> =
            response::decode(response, "Failed to load author").await?;
        Ok(envelope.data)
    }

    /// Delete an author (protected)
    pub async fn delete_author(&self, id: &str) -> Result<(), ClientError> {
        let response = self
            .send(
                &author_path(id)?,
                RequestOptions::with_method(Method::DELETE),
            )
            .await?;
        response::expect_success(response, "Failed to delete author").await?;
        Ok(())
    }
}

/// `/autores/<id>` with the id percent-encoded as exactly one segment.
///
/// Dot segments would be collapsed by URL normalization and escape the
/// collection, so they are refused outright.
fn author_path(id: &str) -> Result<String, ClientError> {
    if matches!(id, "" | "." | "..") {
        return Err(ClientError::InvalidId(id.to_string()));
    }

    let mut url = Url::parse("http://localhost")
        .map_err(|err| ClientError::Configuration(format!("author path: {err}")))?;
    url.path_segments_mut()
        .map_err(|()| ClientError::Configuration("author path: base has no segments".into()))?
        .clear()
        .push(&AUTHORS_PATH[1..])
        .push(id);

    Ok(url.path().to_string())
}
