use async_trait::async_trait;
use eyre::eyre;
use rusoto_core::Region;
use rusoto_s3::{
    CreateBucketConfiguration, CreateBucketRequest, Delete, DeleteBucketRequest,
    DeleteObjectsRequest, ListObjectsV2Request, ObjectIdentifier, PutObjectRequest, S3Client, S3,
};
use std::collections::HashSet;

use super::Storage;
use crate::config::Config;

const MAX_DELETE_COUNT: usize = 1000;

#[derive(Clone)]
pub struct S3Storage {
    bucket_name: String,
    region_name: String,
    s3_client: S3Client,
}

impl S3Storage {
    /// Credentials come from the rusoto default provider chain (environment,
    /// profile or instance role), never from this crate.
    pub fn new(region: Region, bucket_name: &str) -> Self {
        let region_name = region.name().to_owned();
        let s3_client = S3Client::new(region);
        S3Storage {
            bucket_name: bucket_name.to_owned(),
            region_name,
            s3_client,
        }
    }

    pub fn from_config(config: &Config, bucket_name: &str) -> eyre::Result<Self> {
        let region = match &config.aws_endpoint {
            Some(endpoint) => Region::Custom {
                name: config.aws_region_name.clone(),
                endpoint: endpoint.clone(),
            },
            None => config
                .aws_region_name
                .parse()
                .map_err(|e| eyre!("Invalid region {}: {}", config.aws_region_name, e))?,
        };

        Ok(S3Storage::new(region, bucket_name))
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn create_bucket(&self) -> eyre::Result<()> {
        let create_req = CreateBucketRequest {
            bucket: self.bucket_name.to_string(),
            create_bucket_configuration: Some(CreateBucketConfiguration {
                location_constraint: Some(self.region_name.clone()),
            }),
            ..Default::default()
        };

        match self.s3_client.create_bucket(create_req).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not create bucket {}: {}",
                self.bucket_name,
                e
            )),
        }
    }

    async fn upload(&self, key: &str, data: &[u8]) -> eyre::Result<()> {
        let put_req = PutObjectRequest {
            bucket: self.bucket_name.to_string(),
            key: key.to_string(),
            body: Some(data.to_vec().into()),
            ..Default::default()
        };

        match self.s3_client.put_object(put_req).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not upload {} to bucket {}: {}",
                key,
                self.bucket_name,
                e
            )),
        }
    }

    async fn list(&self) -> eyre::Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation_token = None;

        loop {
            let list_req = ListObjectsV2Request {
                bucket: self.bucket_name.to_string(),
                continuation_token: continuation_token.clone(),
                ..Default::default()
            };

            let output = match self.s3_client.list_objects_v2(list_req).await {
                Ok(output) => output,
                Err(e) => {
                    return Err(eyre!(
                        "Could not list bucket {}: {}",
                        self.bucket_name,
                        e
                    ))
                }
            };

            for object in output.contents.unwrap_or_default() {
                if let Some(key) = object.key {
                    keys.push(key);
                }
            }

            if output.is_truncated.unwrap_or(false) {
                continuation_token = output.next_continuation_token;
            } else {
                return Ok(keys);
            }
        }
    }

    async fn batch_delete(&self, keys: HashSet<String>) -> eyre::Result<()> {
        let keys_vec: Vec<String> = keys.into_iter().collect();

        // DeleteObjects takes at most 1000 keys per request
        for chunk in keys_vec.chunks(MAX_DELETE_COUNT) {
            let objects: Vec<ObjectIdentifier> = chunk
                .iter()
                .map(|key| ObjectIdentifier {
                    key: key.clone(),
                    ..Default::default()
                })
                .collect();

            let delete_req = DeleteObjectsRequest {
                bucket: self.bucket_name.to_string(),
                delete: Delete {
                    objects,
                    ..Default::default()
                },
                ..Default::default()
            };

            match self.s3_client.delete_objects(delete_req).await {
                Ok(_) => continue,
                Err(e) => {
                    return Err(eyre!(
                        "Could not batch delete objects in bucket {}: {}",
                        self.bucket_name,
                        e
                    ))
                }
            }
        }

        Ok(())
    }

    async fn delete_bucket(&self) -> eyre::Result<()> {
        let delete_req = DeleteBucketRequest {
            bucket: self.bucket_name.to_string(),
            ..Default::default()
        };

        match self.s3_client.delete_bucket(delete_req).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not delete bucket {}: {}",
                self.bucket_name,
                e
            )),
        }
    }

    fn public_url(&self) -> Option<String> {
        Some(format!(
            "https://{}.s3.{}.amazonaws.com/",
            self.bucket_name, self.region_name
        ))
    }
}
