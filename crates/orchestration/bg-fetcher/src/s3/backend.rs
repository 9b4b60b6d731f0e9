//! [`StorageBackend`] implementation over the AWS SDK.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use bg_error::{BgError, Result};
use futures::StreamExt;
use futures::stream;
use tracing::trace;

use crate::backend::{ObjectByteStream, StorageBackend};
use crate::entry::{ListingPage, ObjectEntry};

/// S3 backend using `ListObjectsV2` and `GetObject`.
#[derive(Clone)]
pub struct S3Backend {
    client: Client,
}

impl S3Backend {
    /// Wrap an existing S3 client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StorageBackend for S3Backend {
    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        delimiter: &str,
        continuation_token: Option<&str>,
    ) -> Result<ListingPage> {
        let mut req = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .delimiter(delimiter);

        if let Some(token) = continuation_token {
            req = req.continuation_token(token);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| BgError::listing(prefix, DisplayErrorContext(&e)))?;

        let contents = resp
            .contents
            .unwrap_or_default()
            .into_iter()
            .filter_map(|obj| {
                let size = obj.size.unwrap_or(0).max(0) as u64;
                obj.key.map(|key| ObjectEntry::new(key).with_size(size))
            })
            .collect();

        let common_prefixes = resp
            .common_prefixes
            .unwrap_or_default()
            .into_iter()
            .filter_map(|cp| cp.prefix)
            .collect();

        let next_continuation_token = if resp.is_truncated == Some(true) {
            resp.next_continuation_token
        } else {
            None
        };

        Ok(ListingPage {
            contents,
            common_prefixes,
            next_continuation_token,
        })
    }

    async fn open_object(&self, bucket: &str, key: &str) -> Result<ObjectByteStream> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| BgError::remote_read(key, DisplayErrorContext(&e)))?;

        trace!(
            bucket = bucket,
            key = key,
            content_length = ?output.content_length,
            "Opened object stream"
        );

        let body = stream::try_unfold(
            (output.body, key.to_string()),
            |(mut body, key)| async move {
                match body.try_next().await {
                    Ok(Some(chunk)) => Ok(Some((chunk, (body, key)))),
                    Ok(None) => Ok(None),
                    Err(e) => Err(BgError::remote_read(&key, e)),
                }
            },
        );

        Ok(body.boxed())
    }
}
