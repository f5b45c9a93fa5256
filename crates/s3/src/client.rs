//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the ObjectStore trait from s3deploy-core
//! for a single bucket.

use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;

use s3deploy_core::{
    ConnectionOptions, Credentials, Error, ListOptions, ListResult, ObjectStore, RemoteObjectInfo,
    Result, UploadRequest,
};

use crate::headers::ObjectHeader;

/// S3 client bound to one bucket
pub struct S3Client {
    inner: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Client {
    /// Create a new S3 client for `bucket` with static credentials
    pub async fn new(
        bucket: impl Into<String>,
        credentials: &Credentials,
        connection: &ConnectionOptions,
    ) -> Result<Self> {
        let credentials = aws_credential_types::Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            None, // session token
            None, // expiry
            "s3deploy-static-credentials",
        );

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(aws_config::Region::new(connection.region.clone()));

        if let Some(endpoint) = &connection.endpoint {
            loader = loader.endpoint_url(endpoint.as_str().trim_end_matches('/'));
        }

        let config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(connection.force_path_style)
            .build();

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
            bucket: bucket.into(),
        })
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

/// Map an SDK failure onto the core error taxonomy
///
/// HEAD responses carry no body, so the error code is often missing and the
/// HTTP status is all there is to go on.
fn transport_error<E>(err: SdkError<E, HttpResponse>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|response| response.status().as_u16());
    match (err.code(), status) {
        (None, None) => Error::Network(format!("{}", DisplayErrorContext(&err))),
        (code, status) => classify(code, status, err.message()),
    }
}

/// Classify a service response by error code, falling back to HTTP status
fn classify(code: Option<&str>, status: Option<u16>, message: Option<&str>) -> Error {
    let reason = match (code, message, status) {
        (Some(code), Some(message), _) => format!("{code}: {message}"),
        (Some(code), None, _) => code.to_string(),
        (None, _, Some(status)) => describe_status(status),
        (None, Some(message), None) => message.to_string(),
        (None, None, None) => "unknown service error".to_string(),
    };

    match code {
        Some("AccessDenied" | "InvalidAccessKeyId" | "SignatureDoesNotMatch") => {
            Error::Auth(reason)
        }
        Some("NoSuchBucket") => Error::NotFound(reason),
        _ => match status {
            Some(401 | 403) => Error::Auth(reason),
            Some(404) => Error::NotFound(reason),
            _ => Error::Network(reason),
        },
    }
}

fn describe_status(status: u16) -> String {
    match status {
        401 => "HTTP 401 Unauthorized".to_string(),
        403 => "HTTP 403 Forbidden (check the access key and its permissions)".to_string(),
        404 => "HTTP 404 Not Found".to_string(),
        other => format!("HTTP {other}"),
    }
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn bucket_exists(&self) -> Result<bool> {
        match self.inner.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(true),
            Err(e) => {
                let not_found = e
                    .as_service_error()
                    .is_some_and(|service| service.is_not_found());
                if not_found {
                    Ok(false)
                } else {
                    Err(transport_error(e))
                }
            }
        }
    }

    async fn list_objects(&self, options: ListOptions) -> Result<ListResult> {
        let mut request = self
            .inner
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(&options.prefix);

        // Set max keys
        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        // Set continuation token
        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(transport_error)?;

        let items = response
            .contents()
            .iter()
            .map(|object| RemoteObjectInfo {
                key: object.key().unwrap_or_default().to_string(),
                // Kept quoted: it is compared verbatim with the local fingerprint
                etag: object.e_tag().map(str::to_string),
                size_bytes: object.size().unwrap_or(0),
                last_modified: object
                    .last_modified()
                    .and_then(|modified| jiff::Timestamp::from_second(modified.secs()).ok()),
            })
            .collect();

        Ok(ListResult {
            items,
            truncated: response.is_truncated().unwrap_or(false),
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
        })
    }

    async fn put_object(&self, request: &UploadRequest) -> Result<()> {
        let body = ByteStream::from_path(&request.source)
            .await
            .map_err(|e| Error::local_io(&request.source, std::io::Error::other(e)))?;

        let mut put = self
            .inner
            .put_object()
            .bucket(&self.bucket)
            .key(&request.key)
            .body(body);

        for header in &request.headers {
            put = match ObjectHeader::parse(&header.name, &header.value)? {
                ObjectHeader::ContentType(v) => put.content_type(v),
                ObjectHeader::ContentMd5(v) => put.content_md5(v),
                ObjectHeader::CacheControl(v) => put.cache_control(v),
                ObjectHeader::Expires(v) => put.expires(v),
                ObjectHeader::ContentEncoding(v) => put.content_encoding(v),
                ObjectHeader::ContentDisposition(v) => put.content_disposition(v),
                ObjectHeader::ContentLanguage(v) => put.content_language(v),
                ObjectHeader::Metadata(k, v) => put.metadata(k, v),
            };
        }

        let response = put.send().await.map_err(transport_error)?;
        tracing::debug!(
            "uploaded s3://{}/{} (etag {:?})",
            self.bucket,
            request.key,
            response.e_tag()
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    /// Serve every connection with an empty response carrying `status_line`
    async fn serve_status(status_line: &'static str) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = [0u8; 8192];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("{status_line}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{addr}")
    }

    async fn client_for(endpoint: &str) -> S3Client {
        let credentials = Credentials {
            access_key_id: "accesskey".into(),
            secret_access_key: "wrongsecret".into(),
        };
        let connection = ConnectionOptions::new("us-east-1", Some(endpoint), true).unwrap();
        S3Client::new("site-bucket", &credentials, &connection)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_forbidden_head_bucket_is_auth_error() {
        let endpoint = serve_status("HTTP/1.1 403 Forbidden").await;
        let client = client_for(&endpoint).await;

        let err = client.bucket_exists().await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)), "unexpected error: {err:?}");
        assert_eq!(err.exit_code(), 4);
        assert!(err.to_string().contains("403"));
        assert!(!err.to_string().contains("ServiceError"));
    }

    #[test]
    fn test_classify_by_code() {
        assert!(matches!(
            classify(Some("InvalidAccessKeyId"), Some(403), Some("bad key")),
            Error::Auth(_)
        ));
        assert!(matches!(
            classify(Some("NoSuchBucket"), Some(404), None),
            Error::NotFound(_)
        ));
        let err = classify(Some("SlowDown"), Some(503), Some("Please reduce your request rate."));
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(
            err.to_string(),
            "Network error: SlowDown: Please reduce your request rate."
        );
    }

    #[test]
    fn test_classify_by_status_without_code() {
        assert!(matches!(classify(None, Some(401), None), Error::Auth(_)));
        assert!(matches!(classify(None, Some(403), None), Error::Auth(_)));
        assert!(matches!(classify(None, Some(404), None), Error::NotFound(_)));
        assert!(matches!(classify(None, Some(500), None), Error::Network(_)));
        assert_eq!(
            classify(None, Some(403), None).to_string(),
            "Authentication failed: HTTP 403 Forbidden (check the access key and its permissions)"
        );
    }

    #[tokio::test]
    async fn test_client_creation_with_endpoint() {
        let credentials = Credentials {
            access_key_id: "accesskey".into(),
            secret_access_key: "secretkey".into(),
        };
        let connection =
            ConnectionOptions::new("us-east-1", Some("http://localhost:9000"), true).unwrap();

        let client = S3Client::new("site-bucket", &credentials, &connection)
            .await
            .unwrap();
        assert_eq!(client.bucket(), "site-bucket");
    }
}
