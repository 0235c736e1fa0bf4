//! Thin wrappers over the S3 object API.
//!
//! Each operation maps to one SDK call. Failures carry the operation name
//! and the full error chain; listing helpers add client-side filtering by
//! prefix, suffix and file-name pattern.

use std::path::Path;
use std::str::FromStr;
use std::string::FromUtf8Error;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use regex::Regex;
use tracing::error;

/// Errors of the S3 component.
#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("s3 {operation} failed: {message}")]
    Service {
        operation: &'static str,
        message: String,
    },

    /// The object body is not valid UTF-8.
    #[error("object body is not valid utf-8")]
    InvalidBody(#[from] FromUtf8Error),

    /// A listing that was required to match at least one object matched
    /// none.
    #[error("no objects in bucket {bucket} match {description}")]
    NoMatches { bucket: String, description: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn remote_failure<E: std::error::Error>(operation: &'static str, err: E) -> S3Error {
    let message = format!("{}", DisplayErrorContext(&err));
    error!(operation, error = %message, "s3 request failed");
    S3Error::Service { operation, message }
}

/// Unit for reporting object sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    Bytes,
    Kilobytes,
    Megabytes,
    Gigabytes,
    Terabytes,
}

impl SizeUnit {
    fn divisor(self) -> f64 {
        match self {
            SizeUnit::Bytes => 1.0,
            SizeUnit::Kilobytes => 1e3,
            SizeUnit::Megabytes => 1e6,
            SizeUnit::Gigabytes => 1e9,
            SizeUnit::Terabytes => 1e12,
        }
    }

    /// Converts a byte count into this unit, rounded to three decimals.
    #[must_use]
    pub fn convert(self, bytes: i64) -> f64 {
        (bytes as f64 / self.divisor() * 1e3).round() / 1e3
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bytes" | "b" => Ok(SizeUnit::Bytes),
            "kilobytes" | "kb" => Ok(SizeUnit::Kilobytes),
            "megabytes" | "mb" => Ok(SizeUnit::Megabytes),
            "gigabytes" | "gb" => Ok(SizeUnit::Gigabytes),
            "terabytes" | "tb" => Ok(SizeUnit::Terabytes),
            other => Err(format!("unrecognized size unit: {other}")),
        }
    }
}

/// One object selected by [`S3::matching_objects`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMatch {
    pub bucket: String,
    /// Full key within the bucket.
    pub key: String,
    /// Final path segment of the key.
    pub file_name: String,
    /// Total number of objects the same listing matched.
    pub total_matches: usize,
}

/// S3 object operations for one account/region.
pub struct S3 {
    client: Client,
}

impl S3 {
    /// Connects through the ambient AWS credential chain.
    pub async fn connect(region: impl Into<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.into()))
            .load()
            .await;
        S3 {
            client: Client::new(&sdk_config),
        }
    }

    /// Uses an explicit client (tests, custom endpoints).
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        S3 { client }
    }

    /// Reads an object body as UTF-8 text. `byte_range` is an HTTP range
    /// such as `"bytes=0-9"`.
    pub async fn get_object(
        &self,
        bucket: &str,
        key: &str,
        byte_range: Option<&str>,
    ) -> Result<String, S3Error> {
        let mut request = self.client.get_object().bucket(bucket).key(key);
        if let Some(range) = byte_range {
            request = request.range(range);
        }
        let response = request
            .send()
            .await
            .map_err(|err| remote_failure("get_object", err))?;
        let bytes = response
            .body
            .collect()
            .await
            .map_err(|err| remote_failure("get_object", err))?
            .into_bytes();
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    pub async fn put_object(&self, bucket: &str, key: &str, body: Vec<u8>) -> Result<(), S3Error> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map(|_| ())
            .map_err(|err| remote_failure("put_object", err))
    }

    pub async fn delete_object(&self, bucket: &str, key: &str) -> Result<(), S3Error> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| remote_failure("delete_object", err))
    }

    /// Size of one object, converted to `unit`.
    pub async fn object_size(
        &self,
        bucket: &str,
        key: &str,
        unit: SizeUnit,
    ) -> Result<f64, S3Error> {
        let response = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote_failure("head_object", err))?;
        Ok(unit.convert(response.content_length().unwrap_or(0)))
    }

    /// Combined size of every object under each of `prefixes`, converted
    /// to `unit`. Fails with [`S3Error::NoMatches`] for the first prefix
    /// that selects nothing.
    pub async fn objects_size(
        &self,
        bucket: &str,
        prefixes: &[impl AsRef<str>],
        unit: SizeUnit,
    ) -> Result<f64, S3Error> {
        let mut listings = Vec::with_capacity(prefixes.len());
        for prefix in prefixes {
            let prefix = prefix.as_ref();
            let mut sizes = Vec::new();
            let mut pages = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(prefix)
                .into_paginator()
                .send();
            while let Some(page) = pages.next().await {
                let page = page.map_err(|err| remote_failure("list_objects_v2", err))?;
                for object in page.contents() {
                    sizes.push(object.size().unwrap_or(0));
                }
            }
            listings.push((prefix.to_string(), sizes));
        }

        Ok(unit.convert(sum_listed_sizes(bucket, &listings)?))
    }

    /// Lists objects under `prefix`, keeping keys that end with `suffix`
    /// and whose file name matches `file_pattern` when given.
    ///
    /// With `strict` set, zero matches is an error; otherwise an empty
    /// list is a normal result.
    pub async fn matching_objects(
        &self,
        bucket: &str,
        prefix: &str,
        suffix: &str,
        file_pattern: Option<&Regex>,
        strict: bool,
    ) -> Result<Vec<ObjectMatch>, S3Error> {
        let mut keys = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .into_paginator()
            .send();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|err| remote_failure("list_objects_v2", err))?;
            for object in page.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }
        }

        let matches = filter_matches(bucket, &keys, suffix, file_pattern);
        if strict && matches.is_empty() {
            return Err(S3Error::NoMatches {
                bucket: bucket.to_string(),
                description: format!(
                    "prefix {prefix:?}, suffix {suffix:?}, pattern {:?}",
                    file_pattern.map(Regex::as_str)
                ),
            });
        }
        Ok(matches)
    }

    /// Server-side copy within or across buckets.
    pub async fn copy_object(
        &self,
        source_bucket: &str,
        source_key: &str,
        target_bucket: &str,
        target_key: &str,
    ) -> Result<(), S3Error> {
        self.client
            .copy_object()
            .copy_source(format!("{source_bucket}/{source_key}"))
            .bucket(target_bucket)
            .key(target_key)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| remote_failure("copy_object", err))
    }

    /// Downloads an object to a local file.
    pub async fn download_object(
        &self,
        bucket: &str,
        key: &str,
        target: impl AsRef<Path>,
    ) -> Result<(), S3Error> {
        let response = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|err| remote_failure("get_object", err))?;
        let bytes = response
            .body
            .collect()
            .await
            .map_err(|err| remote_failure("get_object", err))?
            .into_bytes();
        tokio::fs::write(target, bytes).await?;
        Ok(())
    }

    /// Uploads a local file as an object.
    pub async fn upload_file(
        &self,
        source: impl AsRef<Path>,
        bucket: &str,
        key: &str,
    ) -> Result<(), S3Error> {
        let body = ByteStream::from_path(source)
            .await
            .map_err(|err| remote_failure("upload_file", err))?;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map(|_| ())
            .map_err(|err| remote_failure("put_object", err))
    }
}

/// Sums the listed object sizes across prefixes. Every prefix must have
/// matched at least one object.
fn sum_listed_sizes(bucket: &str, listings: &[(String, Vec<i64>)]) -> Result<i64, S3Error> {
    let mut total: i64 = 0;
    for (prefix, sizes) in listings {
        if sizes.is_empty() {
            return Err(S3Error::NoMatches {
                bucket: bucket.to_string(),
                description: format!("prefix {prefix:?}"),
            });
        }
        total += sizes.iter().sum::<i64>();
    }
    Ok(total)
}

/// Applies the suffix and file-name filters to a listed key set.
fn filter_matches(
    bucket: &str,
    keys: &[String],
    suffix: &str,
    file_pattern: Option<&Regex>,
) -> Vec<ObjectMatch> {
    let mut matches: Vec<ObjectMatch> = keys
        .iter()
        .filter(|key| key.ends_with(suffix))
        .filter_map(|key| {
            let file_name = key.rsplit('/').next().unwrap_or(key);
            if let Some(pattern) = file_pattern {
                if !pattern.is_match(file_name) {
                    return None;
                }
            }
            Some(ObjectMatch {
                bucket: bucket.to_string(),
                key: key.clone(),
                file_name: file_name.to_string(),
                total_matches: 0,
            })
        })
        .collect();

    let total = matches.len();
    for entry in &mut matches {
        entry.total_matches = total;
    }
    matches
}
