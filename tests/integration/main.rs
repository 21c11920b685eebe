
mod provider_v2;
mod s3_client;
